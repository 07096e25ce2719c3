//! CLI output formatting

use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Spinner shown on stderr while az is busy
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        spinner.set_style(template);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn is_failure(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) == Some(false)
}

/// Headline for an error object, with its suggestion when present
pub fn format_error(value: &Value) -> String {
    let error = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
    match value.get("suggestion").and_then(Value::as_str) {
        Some(suggestion) => format!("{} {}\n   {}", CROSS, style(error).red(), style(suggestion).dim()),
        None => format!("{} {}", CROSS, style(error).red()),
    }
}

/// One line per trigger attempt plus a tally
pub fn format_trigger_batch(batch: &Value) -> String {
    let attempts = batch.as_array().map(Vec::as_slice).unwrap_or_default();
    let mut lines = Vec::with_capacity(attempts.len() + 1);
    let mut queued = 0;

    for attempt in attempts {
        if attempt.get("run_number").is_none() {
            lines.push(format_error(attempt));
            continue;
        }
        let number = &attempt["run_number"];
        if is_failure(attempt) {
            let error = attempt.get("error").and_then(Value::as_str).unwrap_or_default();
            lines.push(format!("{} Run {}: {}", CROSS, number, style(error).red()));
        } else {
            queued += 1;
            let run_id = attempt.get("run_id").map(Value::to_string).unwrap_or_default();
            let link = attempt.get("web_url").and_then(Value::as_str).unwrap_or_default();
            lines.push(format!(
                "{} Run {}: queued {} on {} {}",
                CHECK,
                number,
                style(run_id).cyan(),
                style(attempt["branch_used"].as_str().unwrap_or_default()).bold(),
                style(link).dim()
            ));
        }
    }

    if !attempts.is_empty() && attempts[0].get("run_number").is_some() {
        lines.push(format!(
            "{} {}/{} runs queued",
            ROCKET,
            style(queued).green(),
            attempts.len()
        ));
    }

    lines.join("\n")
}

/// Short human summary of a tool result
pub fn format_summary(value: &Value) -> String {
    if is_failure(value) {
        return format_error(value);
    }

    if let Some(count) = value.get("count") {
        return format!(
            "{} {} run(s) of {}",
            INFO,
            style(count).cyan(),
            style(value["pipeline_name"].as_str().unwrap_or_default()).bold()
        );
    }

    if let Some(status) = value.get("overall_status").and_then(Value::as_str) {
        let icon = if status == "ready" { CHECK } else { WARN };
        let notes = value["recommendations"]
            .as_array()
            .map(|r| r.iter().filter_map(Value::as_str).collect::<Vec<_>>().join("; "))
            .unwrap_or_default();
        return format!("{} {} - {}", icon, style(status).bold(), notes);
    }

    if let Some(total) = value.get("total_pipelines") {
        return format!("{} {} pipeline(s) configured", INFO, style(total).cyan());
    }

    if let Some(total) = value.get("total_repositories") {
        return format!("{} {} repositor(ies) configured", INFO, style(total).cyan());
    }

    if let Some(branch) = value.get("current_branch").and_then(Value::as_str) {
        return format!("{} On branch {}", CHECK, style(branch).bold());
    }

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return format!("{} {}", CHECK, message);
    }

    format!("{} Done", CHECK)
}
