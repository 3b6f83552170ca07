//! Enrichment of feature entries with their spatial query summary.

use crate::probe::{TypeProbe, UNKNOWN_DATA_TYPE};
use once_cell::sync::Lazy;
use overlap_common::config::AppConfig;
use overlap_common::models::{FeatureEntry, SpatialQuerySummary};
use overlap_error::{ErrorCode, ErrorContext, OverlapError, Result};
use overlap_sql::overlay::{AoiSource, OverlaySpec, RenderedQuery};
use overlap_sql::{GeometryMetadataResolver, OverlayQueryBuilder, QueryRunner};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Feature name with surrounding whitespace removed and inner runs replaced by `_`.
pub fn normalize_feature_class(feature_name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(feature_name.trim(), "_")
        .into_owned()
}

/// An array element that could not be read as a feature entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryFailure {
    pub index: usize,
    pub error: OverlapError,
}

/// Enriched payload, shaped like the input.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SpecOutput {
    Single(FeatureEntry),
    Batch(Vec<FeatureEntry>),
}

impl SpecOutput {
    pub fn entries(&self) -> &[FeatureEntry] {
        match self {
            SpecOutput::Single(entry) => std::slice::from_ref(entry),
            SpecOutput::Batch(entries) => entries,
        }
    }
}

/// Result of [`FeatureSpecBuilder::build_payload`].
#[derive(Debug, Clone, Serialize)]
pub struct PayloadReport {
    pub output: SpecOutput,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<EntryFailure>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_entry(index: usize, value: Value) -> Result<FeatureEntry> {
    let feature_name = value
        .get("table_summary")
        .and_then(|ts| ts.get("feature_name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    serde_json::from_value(value).map_err(|e| {
        OverlapError::new(
            ErrorCode::InvalidEntry,
            format!("Entry {} is not a feature entry: {}", index, e),
        )
        .with_context(ErrorContext::Entry {
            index,
            feature_name,
        })
        .with_hint("Each entry needs a \"table_summary\" object")
    })
}

pub struct FeatureSpecBuilder<'a, R: QueryRunner, P: TypeProbe> {
    resolver: GeometryMetadataResolver<'a, R>,
    probe: &'a P,
    overlay: OverlayQueryBuilder,
}

impl<'a, R: QueryRunner, P: TypeProbe> FeatureSpecBuilder<'a, R, P> {
    pub fn new(runner: &'a R, probe: &'a P, config: &'a AppConfig) -> Self {
        Self {
            resolver: GeometryMetadataResolver::new(runner, &config.defaults),
            probe,
            overlay: OverlayQueryBuilder::from_config(config),
        }
    }

    fn data_type(&self, table: &str) -> String {
        match self.probe.probe_type(table) {
            Ok(driver) => driver,
            Err(e) => {
                tracing::debug!(table = %table, error = %e, "Type probe failed");
                UNKNOWN_DATA_TYPE.to_string()
            }
        }
    }

    /// Attach a spatial query summary. Lookup failures degrade to defaults.
    pub fn build_entry(&self, mut entry: FeatureEntry) -> FeatureEntry {
        let config = &entry.table_summary;
        let table = config.table.trim();

        let data_type = self.data_type(table);
        let meta = self.resolver.resolve(table);

        let overlay_intersection_query = self
            .overlay
            .overlay_fragment(&meta.geom_col, config.buffer, config.query.as_deref())
            .unwrap_or_else(|e| {
                tracing::warn!(
                    feature = %config.feature_name,
                    error = %e,
                    "Could not render overlay fragment"
                );
                String::new()
            });

        let summary = SpatialQuerySummary {
            data_type,
            feature_class: normalize_feature_class(&config.feature_name),
            source_table: table.to_string(),
            srid: meta.srid,
            overlay_intersection_query,
            schema: config.normalized_schema(),
        };

        tracing::debug!(
            feature = %summary.feature_class,
            srid = summary.srid,
            data_type = %summary.data_type,
            "Built spatial query summary"
        );

        entry.spatial_query_summary = Some(summary);
        entry
    }

    /// Enrich a single entry object or an array of them.
    pub fn build_payload(&self, payload: Value) -> Result<PayloadReport> {
        match payload {
            Value::Object(_) => {
                let entry = parse_entry(0, payload)?;
                Ok(PayloadReport {
                    output: SpecOutput::Single(self.build_entry(entry)),
                    failures: Vec::new(),
                })
            }
            Value::Array(items) => {
                let mut entries = Vec::with_capacity(items.len());
                let mut failures = Vec::new();

                for (index, item) in items.into_iter().enumerate() {
                    match parse_entry(index, item) {
                        Ok(entry) => entries.push(self.build_entry(entry)),
                        Err(error) => {
                            tracing::warn!(index, error = %error, "Skipping entry");
                            failures.push(EntryFailure { index, error });
                        }
                    }
                }

                tracing::info!(
                    built = entries.len(),
                    failed = failures.len(),
                    "Built feature specs"
                );
                Ok(PayloadReport {
                    output: SpecOutput::Batch(entries),
                    failures,
                })
            }
            other => Err(OverlapError::invalid_input_shape(json_kind(&other))),
        }
    }

    /// Full overlay SQL for an enriched entry against an AOI.
    ///
    /// The geometry column is resolved again; only the schema is taken from
    /// the summary when one is attached.
    pub fn render(&self, entry: &FeatureEntry, aoi: &AoiSource) -> Result<RenderedQuery> {
        let config = &entry.table_summary;
        let meta = self.resolver.resolve(config.table.trim());

        let mut spec = OverlaySpec::from_config(config, meta.geom_col);
        if let Some(summary) = &entry.spatial_query_summary {
            spec = spec.with_schema(summary.schema.clone());
        }

        self.overlay.build(&spec, aoi).map_err(OverlapError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlap_common::models::{Cell, FeatureConfig, TableSummaryRecord};
    use overlap_sql::{BindVars, QueryRow};
    use serde_json::json;

    struct CatalogRunner {
        geom_col: Option<&'static str>,
        srid: Option<i64>,
    }

    impl QueryRunner for CatalogRunner {
        fn run_query(&self, sql: &str, _binds: &BindVars) -> Result<Vec<QueryRow>> {
            let (key, value) = if sql.contains("ALL_SDO_GEOM_METADATA") {
                ("GEOM_NAME", self.geom_col.map(Cell::text))
            } else {
                ("SP_REF", self.srid.map(Cell::Int))
            };
            Ok(value
                .map(|v| {
                    let mut row = QueryRow::new();
                    row.insert(key.to_string(), v);
                    vec![row]
                })
                .unwrap_or_default())
        }
    }

    struct FixedProbe(Option<&'static str>);

    impl TypeProbe for FixedProbe {
        fn probe_type(&self, table_ref: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| OverlapError::type_probe_failure(table_ref, "not a file"))
        }
    }

    fn entry(feature_name: &str, table: &str, buffer: f64, query: Option<&str>) -> FeatureEntry {
        FeatureEntry::new(FeatureConfig::from(TableSummaryRecord {
            category: Some("Tenure".to_string()),
            feature_name: Some(feature_name.to_string()),
            table: Some(table.to_string()),
            query: query.map(str::to_string),
            buffer: Some(buffer),
            label_field: Some("LABEL".to_string()),
            summary_fields: Some(vec!["F1".to_string()]),
        }))
    }

    #[test]
    fn test_normalize_feature_class() {
        assert_eq!(normalize_feature_class("  Crown  Grant\tArea "), "Crown_Grant_Area");
        assert_eq!(normalize_feature_class("Parks"), "Parks");
        assert_eq!(normalize_feature_class(""), "");
    }

    #[test]
    fn test_build_entry_with_resolved_metadata() {
        let runner = CatalogRunner {
            geom_col: Some("GEOMETRY"),
            srid: Some(26910),
        };
        let probe = FixedProbe(Some("OCI"));
        let config = AppConfig::default();
        let builder = FeatureSpecBuilder::new(&runner, &probe, &config);

        let built = builder.build_entry(entry("Crown Grant", "WHSE_X.TAB", 50.0, None));
        let summary = built.spatial_query_summary.unwrap();
        assert_eq!(summary.data_type, "OCI");
        assert_eq!(summary.feature_class, "Crown_Grant");
        assert_eq!(summary.source_table, "WHSE_X.TAB");
        assert_eq!(summary.srid, 26910);
        assert_eq!(summary.schema, vec!["LABEL", "F1"]);
        assert!(summary
            .overlay_intersection_query
            .contains("SDO_DISTANCE(b.GEOMETRY, AOI, 0.5)"));
        assert!(summary.overlay_intersection_query.contains("'Within 50 m'"));
    }

    #[test]
    fn test_build_entry_degrades_to_defaults() {
        let runner = CatalogRunner {
            geom_col: None,
            srid: None,
        };
        let probe = FixedProbe(None);
        let config = AppConfig::default();
        let builder = FeatureSpecBuilder::new(&runner, &probe, &config);

        let built = builder.build_entry(entry("Parks", "WHSE_X.PARKS", 0.0, Some("A = 1")));
        let summary = built.spatial_query_summary.unwrap();
        assert_eq!(summary.data_type, "unknown");
        assert_eq!(summary.srid, 3005);
        assert!(summary.overlay_intersection_query.contains("b.SHAPE"));
        assert!(summary.overlay_intersection_query.ends_with("AND (b.A = 1)"));
    }

    #[test]
    fn test_payload_shapes() {
        let runner = CatalogRunner {
            geom_col: None,
            srid: None,
        };
        let probe = FixedProbe(None);
        let config = AppConfig::default();
        let builder = FeatureSpecBuilder::new(&runner, &probe, &config);

        let single = json!({"table_summary": {"feature_name": "A", "table": "WHSE_X.A"}});
        let report = builder.build_payload(single).unwrap();
        assert!(matches!(report.output, SpecOutput::Single(_)));
        assert!(report.failures.is_empty());

        let batch = json!([
            {"table_summary": {"feature_name": "A", "table": "WHSE_X.A"}},
            {"not_a_summary": true},
            42,
            {"table_summary": {"feature_name": "B", "table": "WHSE_X.B"}}
        ]);
        let report = builder.build_payload(batch).unwrap();
        assert_eq!(report.output.entries().len(), 2);
        let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![1, 2]);
        assert_eq!(report.failures[0].error.code, ErrorCode::InvalidEntry);

        let err = builder.build_payload(json!("just text")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInputShape);
        assert!(err.message.contains("string"));
    }

    #[test]
    fn test_batch_output_serializes_as_array() {
        let runner = CatalogRunner {
            geom_col: None,
            srid: None,
        };
        let probe = FixedProbe(None);
        let config = AppConfig::default();
        let builder = FeatureSpecBuilder::new(&runner, &probe, &config);

        let report = builder
            .build_payload(json!([{"table_summary": {"feature_name": "A", "table": "WHSE_X.A"}}]))
            .unwrap();
        let value = serde_json::to_value(&report.output).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["spatial_query_summary"]["feature_class"], "A");
    }

    #[test]
    fn test_render_uses_summary_schema() {
        let runner = CatalogRunner {
            geom_col: Some("SHAPE"),
            srid: Some(3005),
        };
        let probe = FixedProbe(None);
        let config = AppConfig::default();
        let builder = FeatureSpecBuilder::new(&runner, &probe, &config);

        let built = builder.build_entry(entry("Crown Grant", "WHSE_X.TAB", 25.0, None));
        let aoi = AoiSource::Geometry {
            wkb: vec![1, 3],
            srid: 3005,
        };
        let rendered = builder.render(&built, &aoi).unwrap();
        assert!(rendered.sql.contains("SELECT b.LABEL, b.F1,"));
        assert!(rendered.sql.contains("'Within 25 m'"));
    }
}
