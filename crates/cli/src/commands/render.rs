//! `render`: enriched entries + AOI → overlay SQL with binds.

use super::helpers::{entries_from_json, read_json};
use super::offline::OfflineRunner;
use crate::exit_codes;
use crate::output::{self, CommandResponse, OutputFormat};
use anyhow::{bail, Context, Result};
use overlap_common::config::AppConfig;
use overlap_common::models::FeatureEntry;
use overlap_core::spec_builder::normalize_feature_class;
use overlap_core::{EntryFailure, FeatureSpecBuilder, FileFormatProbe};
use overlap_sql::{AoiSource, BindValue, RenderedQuery};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the AOI comes from: registry keys or a WKB file.
#[derive(clap::Args, Debug, Clone)]
pub struct AoiArgs {
    /// Crown lands file number of the registry AOI
    #[arg(long, requires_all = ["disp_id", "parcel_id"], conflicts_with = "wkb_file")]
    pub file_nbr: Option<String>,
    /// Disposition transaction id of the registry AOI
    #[arg(long)]
    pub disp_id: Option<i64>,
    /// Parcel (interest) id of the registry AOI
    #[arg(long)]
    pub parcel_id: Option<i64>,
    /// File holding the AOI geometry as WKB
    #[arg(long)]
    pub wkb_file: Option<PathBuf>,
    /// SRID of the WKB geometry (defaults to the configured SRID)
    #[arg(long, requires = "wkb_file")]
    pub srid: Option<i32>,
}

impl AoiArgs {
    pub fn to_source(&self, config: &AppConfig) -> Result<AoiSource> {
        match (&self.file_nbr, self.disp_id, self.parcel_id, &self.wkb_file) {
            (Some(file_nbr), Some(disp_id), Some(parcel_id), None) => Ok(AoiSource::Keyed {
                file_nbr: file_nbr.clone(),
                disp_id,
                parcel_id,
            }),
            (None, _, _, Some(path)) => {
                let wkb = std::fs::read(path)
                    .with_context(|| format!("Failed to read WKB from {}", path.display()))?;
                Ok(AoiSource::Geometry {
                    wkb,
                    srid: self.srid.unwrap_or(config.defaults.srid),
                })
            }
            _ => bail!("Usage: pass either --file-nbr/--disp-id/--parcel-id or --wkb-file"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenderedFeature {
    pub feature_name: String,
    #[serde(flatten)]
    pub query: RenderedQuery,
}

/// Rendered queries plus the entries that could not be rendered.
/// Failure indexes point into the input array.
#[derive(Debug, Default, Serialize)]
pub struct RenderReport {
    pub queries: Vec<RenderedFeature>,
    pub failures: Vec<EntryFailure>,
}

fn matches_feature(entry: &FeatureEntry, wanted: &str) -> bool {
    let name = &entry.table_summary.feature_name;
    name == wanted || normalize_feature_class(name) == wanted
}

pub fn render_entries(
    entries: &[FeatureEntry],
    aoi: &AoiSource,
    feature: Option<&str>,
    config: &AppConfig,
) -> RenderReport {
    let builder = FeatureSpecBuilder::new(&OfflineRunner, &FileFormatProbe, config);
    let mut report = RenderReport::default();

    for (index, entry) in entries.iter().enumerate() {
        if !feature.map_or(true, |f| matches_feature(entry, f)) {
            continue;
        }
        match builder.render(entry, aoi) {
            Ok(query) => report.queries.push(RenderedFeature {
                feature_name: entry.table_summary.feature_name.clone(),
                query,
            }),
            Err(error) => {
                tracing::warn!(index, error = %error, "Skipping entry");
                report.failures.push(EntryFailure { index, error });
            }
        }
    }
    report
}

pub fn render(
    input: &Path,
    aoi: &AoiArgs,
    feature: Option<&str>,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<()> {
    let entries = entries_from_json(read_json(input)?)?;
    let aoi = aoi.to_source(config)?;

    if !entries
        .iter()
        .any(|e| feature.map_or(true, |f| matches_feature(e, f)))
    {
        bail!("No feature matches {:?}", feature.unwrap_or_default());
    }

    let report = render_entries(&entries, &aoi, feature, config);
    let skipped = report.failures.len();

    if format.is_machine_readable() {
        let response = if skipped == 0 {
            CommandResponse::success(report)
        } else {
            CommandResponse::partial(
                format!("{} entries skipped", skipped),
                exit_codes::PARTIAL_FAILURE,
                report,
            )
        };
        output::print_response(format, response)?;
    } else {
        for rendered in &report.queries {
            let query = &rendered.query;
            println!(
                "-- {} ({})",
                rendered.feature_name.bold(),
                query.template.dimmed()
            );
            println!("{}", query.sql.trim());
            for (name, value) in &query.binds {
                let shown = match value {
                    BindValue::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
                    other => serde_json::to_string(other)?,
                };
                println!("--   :{} = {}", name.cyan(), shown);
            }
            println!();
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

    if skipped > 0 {
        std::process::exit(exit_codes::PARTIAL_FAILURE);
    }
    Ok(())
}
