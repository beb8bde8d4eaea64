use crate::cli::OutputFormat;
use colored::Colorize;
use marge_core::{MergeRequestInfo, MergeState};
use serde::Serialize;

pub fn output_result<T: Serialize + Displayable>(result: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            println!("{}", result.display());
        }
    }
}

pub fn output_list<T: Serialize + Displayable>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            for item in items {
                println!("{}", item.summary());
            }
        }
    }
}

/// Report a mutation the server accepted
pub fn output_done(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let done = serde_json::json!({ "ok": true, "message": message });
            println!("{}", done);
        }
        OutputFormat::Text => println!("{}", message),
    }
}

#[derive(Serialize)]
pub struct JsonError {
    pub error: bool,
    pub code: String,
    pub message: String,
}

pub fn output_error(err: &anyhow::Error, format: OutputFormat) {
    let message = match format {
        OutputFormat::Json => {
            let code = err
                .downcast_ref::<marge_core::Error>()
                .and_then(marge_core::Error::status)
                .map(|status| status.to_string())
                .unwrap_or_else(|| "error".to_string());
            let json_err = JsonError {
                error: true,
                code,
                message: format!("{:#}", err),
            };
            serde_json::to_string_pretty(&json_err).unwrap_or_else(|_| {
                format!(r#"{{"error": true, "message": "{}"}}"#, err)
            })
        }
        OutputFormat::Text => format!("{}: {:#}", "Error".red().bold(), err),
    };
    eprintln!("{}", message);
}

pub trait Displayable {
    fn display(&self) -> String;

    /// One-line form used in listings
    fn summary(&self) -> String {
        self.display()
    }
}

fn colorize_state(state: Option<&str>) -> String {
    let Some(state) = state else {
        return "unknown".dimmed().to_string();
    };
    match MergeState::from(state) {
        MergeState::Opened => state.green().to_string(),
        MergeState::Merged => state.blue().to_string(),
        MergeState::Closed | MergeState::Locked => state.red().to_string(),
        MergeState::Other(_) => state.to_string(),
    }
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string())
}

impl Displayable for MergeRequestInfo {
    fn display(&self) -> String {
        let assignee = self
            .assignee
            .as_ref()
            .and_then(|user| user.id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| "None".to_string());

        let mut output = format!(
            "{} - {}\n  {}: {}\n  {}: {} ({}) -> {} ({})\n  {}: {}\n  {}: {}",
            format!("!{}", self.iid).cyan().bold(),
            self.title.as_deref().unwrap_or("(untitled)").white().bold(),
            "State".dimmed(),
            colorize_state(self.state.as_deref()),
            "Branches".dimmed(),
            or_unknown(self.source_branch.as_deref()),
            or_unknown(self.source_project_id),
            or_unknown(self.target_branch.as_deref()),
            or_unknown(self.target_project_id),
            "SHA".dimmed(),
            or_unknown(self.sha.as_deref()),
            "Assignee".dimmed(),
            assignee,
        );

        if let Some(url) = &self.web_url {
            output.push_str(&format!("\n  {}: {}", "URL".dimmed(), url));
        }

        output
    }

    fn summary(&self) -> String {
        format!(
            "{} {} [{}]",
            format!("!{}", self.iid).cyan().bold(),
            self.title.as_deref().unwrap_or("(untitled)"),
            colorize_state(self.state.as_deref())
        )
    }
}
