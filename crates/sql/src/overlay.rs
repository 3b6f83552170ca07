//! Rendering of the two overlay query families.
//!
//! A feature is overlaid either against a registry AOI located by its tenure
//! keys, or against an AOI geometry already extracted as WKB. Both families
//! share the classification (`INTERSECT` at distance 0, otherwise
//! `Within {radius} m`), the `SDO_WITHIN_DISTANCE` threshold, and the
//! rewritten definition query.

use crate::columns::{column_list, select_prefix};
use crate::def_query::rewrite_definition_query;
use crate::error::SqlGenError;
use crate::sanitize::validate_identifier;
use crate::templates::{self, QueryTemplate};
use overlap_common::config::AppConfig;
use overlap_common::models::{FeatureConfig, SourceKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Value bound to a named parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BindValue {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

pub type BindVars = BTreeMap<String, BindValue>;

/// Final SQL text plus its bind set, ready for an external executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedQuery {
    pub template: &'static str,
    pub sql: String,
    pub binds: BindVars,
}

/// Where the AOI geometry comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum AoiSource {
    /// Row of the tenure registry.
    Keyed {
        file_nbr: String,
        disp_id: i64,
        parcel_id: i64,
    },
    /// Geometry already extracted from a source layer.
    Geometry { wkb: Vec<u8>, srid: i32 },
}

impl AoiSource {
    fn template(&self) -> QueryTemplate {
        match self {
            AoiSource::Keyed { .. } => templates::OVERLAY,
            AoiSource::Geometry { .. } => templates::OVERLAY_WKB,
        }
    }

    fn binds(&self) -> BindVars {
        let mut binds = BindVars::new();
        match self {
            AoiSource::Keyed {
                file_nbr,
                disp_id,
                parcel_id,
            } => {
                binds.insert("file_nbr".into(), BindValue::Text(file_nbr.clone()));
                binds.insert("disp_id".into(), BindValue::Int(*disp_id));
                binds.insert("parcel_id".into(), BindValue::Int(*parcel_id));
            }
            AoiSource::Geometry { wkb, srid } => {
                binds.insert("wkb_aoi".into(), BindValue::Bytes(wkb.clone()));
                binds.insert("srid".into(), BindValue::Int(i64::from(*srid)));
                binds.insert("srid_t".into(), BindValue::Int(i64::from(*srid)));
            }
        }
        binds
    }
}

/// Everything a single feature contributes to an overlay query.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub table: String,
    pub source_kind: SourceKind,
    pub geom_col: String,
    pub buffer: f64,
    pub query: Option<String>,
    pub schema: Vec<String>,
}

impl OverlaySpec {
    pub fn from_config(config: &FeatureConfig, geom_col: impl Into<String>) -> Self {
        Self {
            table: config.table.trim().to_string(),
            source_kind: config.source_kind,
            geom_col: geom_col.into(),
            buffer: config.buffer,
            query: config.query.clone(),
            schema: config.normalized_schema(),
        }
    }

    /// Use an already-normalized schema, e.g. from a spatial query summary.
    pub fn with_schema(mut self, schema: Vec<String>) -> Self {
        self.schema = schema;
        self
    }

    pub fn columns(&self) -> Vec<String> {
        column_list(self.source_kind, &self.schema)
    }
}

/// Buffer distance as it appears in SQL text and in the `Within {n} m` label.
pub fn format_radius(buffer: f64) -> String {
    if buffer.is_finite() && buffer > 0.0 {
        buffer.to_string()
    } else {
        "0".to_string()
    }
}

/// Renders overlay SQL for features.
#[derive(Debug, Clone)]
pub struct OverlayQueryBuilder {
    registry_table: String,
    tolerance: String,
}

impl Default for OverlayQueryBuilder {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl OverlayQueryBuilder {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            registry_table: config.registry.table.clone(),
            tolerance: config.defaults.distance_tolerance.to_string(),
        }
    }

    /// Standalone classification + predicate against the symbolic `AOI`.
    pub fn overlay_fragment(
        &self,
        geom_col: &str,
        buffer: f64,
        query: Option<&str>,
    ) -> Result<String, SqlGenError> {
        validate_identifier(geom_col)?;
        let radius = format_radius(buffer);
        let def_query = rewrite_definition_query(query);
        let def_query = if def_query.is_empty() {
            def_query
        } else {
            format!(" {}", def_query)
        };

        templates::OVERLAY_FRAGMENT.render(&[
            ("geom_col", geom_col),
            ("tolerance", self.tolerance.as_str()),
            ("radius", radius.as_str()),
            ("def_query", def_query.as_str()),
        ])
    }

    /// Full overlay statement for one feature and AOI.
    pub fn build(&self, spec: &OverlaySpec, aoi: &AoiSource) -> Result<RenderedQuery, SqlGenError> {
        validate_identifier(&spec.table)?;
        validate_identifier(&spec.geom_col)?;

        let cols = spec.columns();
        for col in &cols {
            validate_identifier(col)?;
        }

        let cols = select_prefix(&cols);
        let radius = format_radius(spec.buffer);
        let def_query = rewrite_definition_query(spec.query.as_deref());
        let template = aoi.template();

        let sql = template.render(&[
            ("cols", cols.as_str()),
            ("geom_col", spec.geom_col.as_str()),
            ("tolerance", self.tolerance.as_str()),
            ("radius", radius.as_str()),
            ("registry", self.registry_table.as_str()),
            ("tab", spec.table.as_str()),
            ("def_query", def_query.as_str()),
        ])?;

        tracing::debug!(
            template = template.name,
            table = %spec.table,
            radius = %radius,
            "Rendered overlay query"
        );

        Ok(RenderedQuery {
            template: template.name,
            sql,
            binds: aoi.binds(),
        })
    }

    /// Registry lookup returning the keyed AOI as WKT.
    pub fn aoi_lookup(
        &self,
        file_nbr: &str,
        disp_id: i64,
        parcel_id: i64,
    ) -> Result<RenderedQuery, SqlGenError> {
        let aoi = AoiSource::Keyed {
            file_nbr: file_nbr.to_string(),
            disp_id,
            parcel_id,
        };
        let sql = templates::AOI.render(&[("registry", self.registry_table.as_str())])?;
        Ok(RenderedQuery {
            template: templates::AOI.name,
            sql,
            binds: aoi.binds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(table: &str, buffer: f64, query: Option<&str>, schema: &[&str]) -> OverlaySpec {
        OverlaySpec {
            table: table.to_string(),
            source_kind: SourceKind::classify(table),
            geom_col: "SHAPE".to_string(),
            buffer,
            query: query.map(str::to_string),
            schema: schema.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn keyed() -> AoiSource {
        AoiSource::Keyed {
            file_nbr: "5406682".to_string(),
            disp_id: 907109,
            parcel_id: 12,
        }
    }

    #[test]
    fn test_fragment_with_buffer() {
        let builder = OverlayQueryBuilder::default();
        let fragment = builder.overlay_fragment("SHAPE", 50.0, None).unwrap();
        assert!(fragment.contains("ELSE 'Within 50 m'"));
        assert!(fragment.contains("'distance = 50'"));
        assert!(fragment.contains("THEN 'INTERSECT'"));
        assert!(!fragment.contains("AND ("));
    }

    #[test]
    fn test_fragment_zero_buffer_still_thresholds() {
        let builder = OverlayQueryBuilder::default();
        let fragment = builder.overlay_fragment("GEOMETRY", 0.0, None).unwrap();
        assert!(fragment.contains("SDO_DISTANCE(b.GEOMETRY, AOI, 0.5) = 0 THEN 'INTERSECT'"));
        assert!(fragment.contains("'distance = 0'"));
    }

    #[test]
    fn test_fragment_appends_definition_query() {
        let builder = OverlayQueryBuilder::default();
        let fragment = builder
            .overlay_fragment("SHAPE", 12.5, Some("STATUS = 'ACTIVE'"))
            .unwrap();
        assert!(fragment.contains("'Within 12.5 m'"));
        assert!(fragment.ends_with("= 'TRUE' AND (b.STATUS = 'ACTIVE')"));
    }

    #[test]
    fn test_keyed_family() {
        let builder = OverlayQueryBuilder::default();
        let rendered = builder
            .build(
                &spec("WHSE_X.TAB", 100.0, Some("STATUS = 'ACTIVE'"), &["LABEL", "F1"]),
                &keyed(),
            )
            .unwrap();

        assert_eq!(rendered.template, "overlay");
        assert!(rendered.sql.contains("SELECT b.LABEL, b.F1,"));
        assert!(rendered
            .sql
            .contains("FROM WHSE_TANTALIS.TA_CROWN_TENURES_SVW a, WHSE_X.TAB b"));
        assert!(rendered.sql.contains("'Within 100 m'"));
        assert!(rendered
            .sql
            .contains("SDO_WITHIN_DISTANCE(b.SHAPE, a.SHAPE, 'distance = 100') = 'TRUE'"));
        assert!(rendered.sql.contains("AND (b.STATUS = 'ACTIVE')"));
        assert_eq!(
            rendered.binds.get("file_nbr"),
            Some(&BindValue::Text("5406682".to_string()))
        );
        assert_eq!(rendered.binds.get("disp_id"), Some(&BindValue::Int(907109)));
        assert_eq!(rendered.binds.get("parcel_id"), Some(&BindValue::Int(12)));
        assert_eq!(rendered.binds.len(), 3);
    }

    #[test]
    fn test_geometry_family_has_no_registry_join() {
        let builder = OverlayQueryBuilder::default();
        let aoi = AoiSource::Geometry {
            wkb: vec![1, 3, 0, 0, 0],
            srid: 3005,
        };
        let rendered = builder
            .build(&spec("WHSE_X.TAB", 0.0, None, &["F1"]), &aoi)
            .unwrap();

        assert_eq!(rendered.template, "overlay_wkb");
        assert!(!rendered.sql.contains("TA_CROWN_TENURES_SVW"));
        assert!(rendered.sql.contains("SDO_GEOMETRY(:wkb_aoi, :srid_t)"));
        assert!(rendered.sql.contains("SDO_GEOMETRY(:wkb_aoi, :srid), 'distance = 0'"));
        assert!(!rendered.sql.contains("AND ("));
        assert_eq!(rendered.binds.get("srid"), Some(&BindValue::Int(3005)));
        assert_eq!(rendered.binds.get("srid_t"), Some(&BindValue::Int(3005)));
        assert!(rendered.binds.contains_key("wkb_aoi"));
    }

    #[test]
    fn test_external_empty_schema_selects_only_result_columns() {
        let builder = OverlayQueryBuilder::default();
        let rendered = builder
            .build(&spec("LOCAL.ROADS", 0.0, None, &[]), &keyed())
            .unwrap();
        let select = rendered.sql.trim_start();
        assert!(select.starts_with("SELECT \n    CASE WHEN"));
    }

    #[test]
    fn test_unsafe_table_rejected() {
        let builder = OverlayQueryBuilder::default();
        let err = builder
            .build(&spec("WHSE_X.TAB; DROP TABLE x", 0.0, None, &["F1"]), &keyed())
            .unwrap_err();
        assert!(matches!(err, SqlGenError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_aoi_lookup() {
        let builder = OverlayQueryBuilder::default();
        let rendered = builder.aoi_lookup("5406682", 907109, 1).unwrap();
        assert!(rendered.sql.contains("SDO_UTIL.TO_WKTGEOMETRY(a.SHAPE) SHAPE"));
        assert!(rendered.sql.contains("FROM WHSE_TANTALIS.TA_CROWN_TENURES_SVW a"));
        assert_eq!(rendered.binds.len(), 3);
    }

    #[test]
    fn test_format_radius() {
        assert_eq!(format_radius(0.0), "0");
        assert_eq!(format_radius(50.0), "50");
        assert_eq!(format_radius(12.5), "12.5");
        assert_eq!(format_radius(f64::NAN), "0");
    }
}
