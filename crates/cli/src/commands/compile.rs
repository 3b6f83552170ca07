//! `compile`: spreadsheet rows → feature entries JSON.
//!
//! Each input file is one sheet exported as an array of row arrays. Sheets
//! are merged in the order given, so the common sheet goes first and its
//! categories carry into the regional one.

use super::helpers::{read_json, rows_from_json};
use crate::output::{self, CommandResponse, OutputFormat};
use anyhow::Result;
use overlap_common::models::FeatureEntry;
use overlap_core::{RawTable, SpreadsheetCompiler};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CompileReport<'a> {
    sheets: usize,
    entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table_summaries: Option<&'a [FeatureEntry]>,
}

pub fn compile_sheets(sheets: &[PathBuf], skip_rows: usize) -> Result<Vec<FeatureEntry>> {
    let tables = sheets
        .iter()
        .map(|path| {
            let table = rows_from_json(read_json(path)?)?;
            tracing::debug!(sheet = %path.display(), rows = table.len(), "Read sheet");
            Ok(table.skip_header_rows(skip_rows))
        })
        .collect::<overlap_error::Result<Vec<_>>>()?;

    Ok(SpreadsheetCompiler::new().compile(RawTable::concat(tables)))
}

pub fn compile(
    sheets: &[PathBuf],
    skip_rows: usize,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let entries = compile_sheets(sheets, skip_rows)?;

    if let Some(path) = out {
        output::write_artifact(path, &entries)?;
    }

    if format.is_machine_readable() {
        let report = CompileReport {
            sheets: sheets.len(),
            entries: entries.len(),
            output_file: out.map(|p| p.display().to_string()),
            table_summaries: out.is_none().then_some(entries.as_slice()),
        };
        return output::print_response(format, CommandResponse::success(report));
    }

    match out {
        Some(path) => eprintln!(
            "{} {} entries from {} sheet(s) → {}",
            "Compiled".bold().green(),
            entries.len(),
            sheets.len(),
            path.display().yellow()
        ),
        None => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(())
}
