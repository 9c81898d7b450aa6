//! Doctor command: check the API key, storage paths and config file.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::{Settings, API_BASE_ENV, API_KEY_ENV};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Aide Doctor");
    println!();
    println!("Checking configuration and environment...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_checks = vec![check_openai_api_key(), check_api_base(settings)];
    for check in &api_checks {
        check.print();
    }
    checks.extend(api_checks);

    println!();

    println!("{}", style("Storage").bold());
    let storage_checks = check_storage(settings);
    for check in &storage_checks {
        check.print();
    }
    checks.extend(storage_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Aide.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Aide is ready to use.");
    }

    Ok(())
}

fn check_openai_api_key() -> CheckResult {
    match Settings::api_key() {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok(API_KEY_ENV, &format!("configured ({})", masked))
        }
        Some(_) => CheckResult::warning(
            API_KEY_ENV,
            "set but format looks unusual",
            "Expected format: sk-... (ignore this for OpenAI-compatible servers)",
        ),
        None => CheckResult::error(API_KEY_ENV, "not set", &preflight::api_key_hint()),
    }
}

fn check_api_base(settings: &Settings) -> CheckResult {
    match &settings.openai.api_base {
        None => CheckResult::ok("API base", "default (api.openai.com)"),
        Some(base) if url::Url::parse(base).is_ok() => CheckResult::ok("API base", base),
        Some(base) => CheckResult::error(
            "API base",
            &format!("{} is not a valid URL", base),
            &format!("Fix openai.api_base or {}", API_BASE_ENV),
        ),
    }
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    results.push(check_file(
        "Knowledge index",
        &settings.knowledge_path(),
        "Build it with: aide index <dir>",
    ));
    results.push(check_file(
        "Long-term memory",
        &settings.long_term_memory_path(),
        "Created when the agent first stores a memory",
    ));

    results
}

fn check_file(name: &str, path: &Path, hint: &str) -> CheckResult {
    if path.exists() {
        let size = std::fs::metadata(path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        CheckResult::ok(name, &format!("{} ({})", path.display(), size))
    } else {
        CheckResult::warning(name, &format!("{} (not created yet)", path.display()), hint)
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning("Config file", "using defaults", "Create with: aide config edit")
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_check_file_missing_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_file("Index", &dir.path().join("missing.db"), "build it");
        assert_eq!(result.status, CheckStatus::Warning);

        let present = dir.path().join("present.db");
        std::fs::write(&present, b"1234").unwrap();
        let result = check_file("Index", &present, "build it");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.message.ends_with("(4 B)"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
