//! JSON envelope and human rendition shared by every command.
//!
//! With `--json`, commands print one envelope on stdout: a `schema_version`
//! marker, the command path, a `status` discriminant, and either `data` or
//! `error`. Human output accumulates in [`HumanOutput`] and is suppressed by
//! `--quiet`; JSON output ignores quiet.

use std::fmt;

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

/// Envelope marker, bumped when the envelope shape changes
pub const SCHEMA_VERSION: &str = "tempo.v1";

/// Per-command output switches copied out of the parsed CLI
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Accumulator for the human-readable rendition of a command result.
///
/// Warnings and next steps double as envelope fields in JSON mode.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    /// Add a `key: value` line to the summary block; an empty value renders
    /// the key alone
    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, line: impl Into<String>) {
        self.details.push(line.into());
    }

    pub fn push_warning(&mut self, line: impl Into<String>) {
        self.warnings.push(line.into());
    }

    pub fn push_next_step(&mut self, line: impl Into<String>) {
        self.next_steps.push(line.into());
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;

        if !self.summary.is_empty() {
            write!(f, "\n\nSummary:")?;
            for (key, value) in &self.summary {
                if value.is_empty() {
                    write!(f, "\n- {key}")?;
                } else {
                    write!(f, "\n- {key}: {value}")?;
                }
            }
        }

        let sections = [
            ("Details", &self.details),
            ("Warnings", &self.warnings),
            ("Next steps", &self.next_steps),
        ];
        for (title, lines) in sections {
            if lines.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for line in lines {
                write!(f, "\n- {line}")?;
            }
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    error: ErrorBody<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

/// Print a command result: the JSON envelope in `--json` mode, otherwise
/// the human rendition unless `--quiet`
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let envelope = SuccessEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings: human.map(|human| human.warnings.clone()).unwrap_or_default(),
            next_steps: human.map(|human| human.next_steps.clone()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }
    if let Some(human) = human {
        println!("{human}");
    }
    Ok(())
}

/// Print a failure: the JSON error envelope on stdout, or `error:` plus an
/// optional `hint:` line on stderr
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);

    if json {
        let message = err.to_string();
        let envelope = ErrorEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &message,
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            next_steps,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Best-effort command path for the envelope when parsing itself fails.
///
/// Takes the first non-flag argument, and for the subcommand families the
/// one after it. Flag values are not distinguished from positionals; the
/// result is cosmetic only.
pub fn infer_command_name_from_args() -> String {
    let mut positionals = std::env::args().skip(1).filter(|arg| !arg.starts_with('-'));

    let command = match positionals.next() {
        Some(command) => command,
        None => return "tempo".to_string(),
    };

    if matches!(command.as_str(), "task" | "space" | "feed") {
        if let Some(sub) = positionals.next() {
            return format!("{command} {sub}");
        }
    }

    command
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        exit_codes::SERVICE_ERROR => "service_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::NotInitialized(_) => vec!["tempo init".to_string()],
        Error::TaskNotFound(_) => vec!["tempo task ls".to_string()],
        Error::SpaceNotFound(_) => vec!["tempo space ls".to_string()],
        Error::FeedNotFound(_) => vec!["tempo feed ls".to_string()],
        Error::FeedUnavailable { name, .. } => {
            vec![format!("tempo feed toggle {name}")]
        }
        Error::InvalidConfig(_) => vec!["fix config.toml then retry".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_rendition_orders_sections() {
        let mut human = HumanOutput::new("Task added");
        human.push_summary("id", "01ABC");
        human.push_summary("frozen", "");
        human.push_detail("slot kept");
        human.push_warning("deadline is in the past");
        human.push_next_step("tempo plan");

        assert_eq!(
            human.to_string(),
            "Task added\n\nSummary:\n- id: 01ABC\n- frozen\n\nDetails:\n- slot kept\n\nWarnings:\n- deadline is in the past\n\nNext steps:\n- tempo plan"
        );
    }

    #[test]
    fn bare_header_renders_without_sections() {
        let human = HumanOutput::new("Nothing to do");
        assert_eq!(human.to_string(), "Nothing to do");
    }

    #[test]
    fn kinds_follow_exit_codes() {
        assert_eq!(error_kind(&Error::InvalidArgument("x".into())), "user_error");
        let unavailable = Error::FeedUnavailable {
            name: "gym".into(),
            message: "gone".into(),
        };
        assert_eq!(error_kind(&unavailable), "service_error");
        assert_eq!(
            error_kind(&Error::OperationFailed("x".into())),
            "operation_failed"
        );
    }

    #[test]
    fn hints_point_at_the_fixing_command() {
        let err = Error::NotInitialized(std::path::PathBuf::from("/tmp/none"));
        assert_eq!(error_next_steps(&err), vec!["tempo init".to_string()]);

        let err = Error::FeedUnavailable {
            name: "gym".into(),
            message: "gone".into(),
        };
        assert_eq!(
            error_next_steps(&err),
            vec!["tempo feed toggle gym".to_string()]
        );
    }
}
