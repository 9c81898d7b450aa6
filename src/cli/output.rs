//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Startup banner shown before model commands.
    pub fn banner(model: &str, toolset: &str) {
        println!(
            "{} {}",
            style("aide").bold().cyan(),
            style(format!("tool-calling assistant ({}, {} tools)", model, toolset)).dim()
        );
        println!("{}", style("=".repeat(50)).dim());
    }

    pub fn user(msg: &str) {
        println!("\n{} {}", style("User:").bold().blue(), msg);
    }

    pub fn tool_call(call: &str) {
        println!("{} {}", style("[Tool Call]").yellow(), call);
    }

    pub fn tool_result(result: &str) {
        println!("{} {}", style("[Tool Result]").green(), content_preview(result, 300));
    }

    pub fn assistant(msg: &str) {
        println!("{} {}", style("Assistant:").bold().magenta(), msg);
    }

    /// Numbered list entry, e.g. tool names.
    pub fn numbered(index: usize, msg: &str) {
        println!("  {}. {}", style(index).cyan(), msg);
    }

    /// Indexed source line.
    pub fn source_info(title: &str, id: &str, chunks: u32, chars: u64) {
        println!(
            "  {} {} ({}, {} chunks, {} chars)",
            style("*").cyan(),
            style(title).bold(),
            style(id).dim(),
            chunks,
            chars
        );
    }

    pub fn search_result(title: &str, id: &str, score: f32, content: &str) {
        println!(
            "\n{} {} [{}] (score: {:.2})",
            style(">>").green(),
            style(title).bold(),
            style(id).cyan(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Single-line preview, cut at `max_chars` characters.
pub(crate) fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("a\nb", 10), "a b");
        assert_eq!(content_preview("héllo world", 5), "héllo...");
    }
}
