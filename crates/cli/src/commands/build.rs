//! `build`: feature entries → entries with a spatial query summary.

use super::helpers::read_json;
use super::offline::OfflineRunner;
use crate::exit_codes;
use crate::output::{self, CommandResponse, OutputFormat};
use anyhow::Result;
use overlap_common::config::AppConfig;
use overlap_core::{EntryFailure, FeatureSpecBuilder, FileFormatProbe, PayloadReport, SpecOutput};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct BuildReport<'a> {
    built: usize,
    failures: &'a [EntryFailure],
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a SpecOutput>,
}

pub fn build_payload(input: &Path, config: &AppConfig) -> Result<PayloadReport> {
    let payload = read_json(input)?;
    let builder = FeatureSpecBuilder::new(&OfflineRunner, &FileFormatProbe, config);
    Ok(builder.build_payload(payload)?)
}

pub fn build(
    input: &Path,
    out: Option<&Path>,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<()> {
    let report = build_payload(input, config)?;
    let built = report.output.entries().len();

    if let Some(path) = out {
        output::write_artifact(path, &report.output)?;
    }

    if format.is_machine_readable() {
        let data = BuildReport {
            built,
            failures: &report.failures,
            output_file: out.map(|p| p.display().to_string()),
            payload: out.is_none().then_some(&report.output),
        };
        let response = if report.failures.is_empty() {
            CommandResponse::success(data)
        } else {
            CommandResponse::partial(
                format!("{} entries skipped", report.failures.len()),
                exit_codes::PARTIAL_FAILURE,
                data,
            )
        };
        output::print_response(format, response)?;
    } else {
        match out {
            Some(path) => eprintln!(
                "{} {} entries → {}",
                "Built".bold().green(),
                built,
                path.display().yellow()
            ),
            None => println!("{}", serde_json::to_string_pretty(&report.output)?),
        }
        for failure in &report.failures {
            eprintln!(
                "{} entry {}: {}",
                "Skipped".bold().yellow(),
                failure.index,
                failure.error
            );
        }
    }

    if !report.failures.is_empty() {
        std::process::exit(exit_codes::PARTIAL_FAILURE);
    }
    Ok(())
}
