//! Single-purpose utility functions exposed to the agent as tools.
//!
//! Everything here is free of agent state so it can be called and tested
//! directly. The agent's dispatch layer lives in [`crate::agent`].

mod json;
mod math;
mod text;
mod web;

pub use json::{validate_json, JsonValidation};
pub use math::{advanced_calculator, calculator, format_number};
pub use text::{analyze_text, list_operation, string_operation, TextAnalysis};
pub use web::{
    check_url, current_time, fixed_weather, weather_report, wikipedia_brief, wikipedia_mock,
    UrlStatus,
};
