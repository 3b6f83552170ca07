//! Structured output handling for CLI commands.
//!
//! Commands produce an *artifact* (entries JSON, enriched JSON, SQL) and a
//! *report* about it. The artifact goes to `--out` when given. Otherwise it
//! is printed to stdout in human mode or embedded in the response envelope
//! in json/yaml mode.

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq, Copy)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn is_machine_readable(&self) -> bool {
        !matches!(self, OutputFormat::Human)
    }
}

/// Response envelope for machine outputs.
#[derive(Serialize)]
pub struct CommandResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub exit_code: i32,
    #[serde(flatten)]
    pub data: T,
}

impl<T> CommandResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            exit_code: 0,
            data,
        }
    }

    pub fn partial(message: String, exit_code: i32, data: T) -> Self {
        Self {
            status: "partial".to_string(),
            message: Some(message),
            exit_code,
            data,
        }
    }

    pub fn error(message: String, exit_code: i32, data: T) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message),
            exit_code,
            data,
        }
    }
}

/// Print `data` to stdout in the requested machine format.
pub fn print_output<T: Serialize>(format: OutputFormat, data: T) -> anyhow::Result<()> {
    match format {
        // Human output is written by the command itself.
        OutputFormat::Human => {}
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&data)?),
    }
    Ok(())
}

pub fn print_response<T: Serialize>(
    format: OutputFormat,
    response: CommandResponse<T>,
) -> anyhow::Result<()> {
    if format == OutputFormat::Human {
        return Ok(());
    }
    print_output(format, response)
}

/// Print a structured error response for machine outputs.
/// In human mode the error is printed to stderr by main's error handler.
pub fn print_error(format: OutputFormat, message: &str, exit_code: i32) -> anyhow::Result<()> {
    print_response(
        format,
        CommandResponse::error(message.to_string(), exit_code, serde_json::Map::new()),
    )
}

/// Write a JSON artifact to `path`.
pub fn write_artifact<T: Serialize>(path: &Path, artifact: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote artifact");
    Ok(())
}
