//! Spreadsheet rows through to rendered overlay SQL.

use overlap_common::config::AppConfig;
use overlap_common::models::Cell;
use overlap_core::{FeatureSpecBuilder, RawTable, SpreadsheetCompiler, TypeProbe};
use overlap_error::{OverlapError, Result};
use overlap_sql::overlay::AoiSource;
use overlap_sql::{BindValue, BindVars, QueryRow, QueryRunner};
use std::cell::RefCell;

/// Catalog that knows nothing: every lookup comes back empty.
#[derive(Default)]
struct EmptyCatalog {
    queries: RefCell<Vec<String>>,
}

impl QueryRunner for EmptyCatalog {
    fn run_query(&self, sql: &str, _binds: &BindVars) -> Result<Vec<QueryRow>> {
        self.queries.borrow_mut().push(sql.to_string());
        Ok(Vec::new())
    }
}

struct NoFiles;

impl TypeProbe for NoFiles {
    fn probe_type(&self, table_ref: &str) -> Result<String> {
        Err(OverlapError::type_probe_failure(table_ref, "not a file"))
    }
}

fn crown_grant_sheet() -> RawTable {
    RawTable::new(vec![vec![
        Cell::text("Tenure"),
        Cell::text("Crown Grant"),
        Cell::text("WHSE_X.TAB"),
        Cell::text(""),
        Cell::Int(0),
        Cell::text("LABEL"),
        Cell::text("F1"),
    ]])
}

#[test]
fn compiled_row_builds_default_summary() {
    let entries = SpreadsheetCompiler::new().compile(crown_grant_sheet());
    assert_eq!(entries.len(), 1);

    let payload = serde_json::to_value(&entries).unwrap();
    assert_eq!(payload[0]["table_summary"]["category"], "Tenure");
    assert!(payload[0]["table_summary"].get("source_kind").is_none());

    let runner = EmptyCatalog::default();
    let config = AppConfig::default();
    let builder = FeatureSpecBuilder::new(&runner, &NoFiles, &config);
    let report = builder.build_payload(payload).unwrap();
    assert!(report.failures.is_empty());

    let entry = &report.output.entries()[0];
    let summary = entry.spatial_query_summary.as_ref().unwrap();
    assert_eq!(summary.schema, vec!["LABEL", "F1"]);
    assert_eq!(summary.srid, 3005);
    assert_eq!(summary.feature_class, "Crown_Grant");
    assert_eq!(summary.data_type, "unknown");
    assert!(!summary.overlay_intersection_query.contains("AND ("));
    assert!(summary.overlay_intersection_query.contains("'distance = 0'"));

    // Geometry column and SRID were both looked up before defaulting.
    let queries = runner.queries.borrow();
    assert!(queries.iter().any(|q| q.contains("ALL_SDO_GEOM_METADATA")));
    assert!(queries.iter().any(|q| q.contains("sdo_srid")));
}

#[test]
fn enriched_entry_renders_both_families() {
    let runner = EmptyCatalog::default();
    let config = AppConfig::default();
    let builder = FeatureSpecBuilder::new(&runner, &NoFiles, &config);

    let entries = SpreadsheetCompiler::new().compile(crown_grant_sheet());
    let enriched = builder.build_entry(entries.into_iter().next().unwrap());

    let keyed = AoiSource::Keyed {
        file_nbr: "5406682".to_string(),
        disp_id: 907109,
        parcel_id: 1,
    };
    let rendered = builder.render(&enriched, &keyed).unwrap();
    assert_eq!(rendered.template, "overlay");
    assert!(rendered.sql.contains("SELECT b.LABEL, b.F1,"));
    assert!(rendered.sql.contains("WHSE_X.TAB b"));
    assert_eq!(rendered.binds.get("disp_id"), Some(&BindValue::Int(907109)));

    let wkb = AoiSource::Geometry {
        wkb: vec![1, 3, 0, 0, 0],
        srid: 3005,
    };
    let rendered = builder.render(&enriched, &wkb).unwrap();
    assert_eq!(rendered.template, "overlay_wkb");
    assert!(!rendered.sql.contains(&config.registry.table));
}

#[test]
fn region_sheet_inherits_common_category() {
    let common = RawTable::new(vec![
        vec![Cell::text("notes")],
        vec![
            Cell::text("Water"),
            Cell::text("Wells"),
            Cell::text("WHSE_WATER.WELLS"),
            Cell::text("STATUS = 'ACTIVE'"),
            Cell::Int(100),
            Cell::text("WELL_TAG"),
        ],
    ])
    .skip_header_rows(1);
    let region = RawTable::new(vec![
        vec![Cell::text("notes")],
        vec![
            Cell::Missing,
            Cell::text("Local  Roads"),
            Cell::text("/data/roads.shp"),
            Cell::Missing,
            Cell::Missing,
            Cell::text("NAME"),
            Cell::text("CLASS"),
        ],
    ])
    .skip_header_rows(1);

    let entries = SpreadsheetCompiler::new().compile(RawTable::concat([common, region]));
    assert_eq!(entries.len(), 2);

    let runner = EmptyCatalog::default();
    let config = AppConfig::default();
    let builder = FeatureSpecBuilder::new(&runner, &NoFiles, &config);

    let wells = builder.build_entry(entries[0].clone());
    let summary = wells.spatial_query_summary.unwrap();
    assert!(summary
        .overlay_intersection_query
        .ends_with("AND (b.STATUS = 'ACTIVE')"));
    assert!(summary.overlay_intersection_query.contains("'Within 100 m'"));

    let roads = &entries[1].table_summary;
    assert_eq!(roads.category.as_deref(), Some("Water"));
    // The buffer column is all integers, so the gap is zero-filled.
    assert_eq!(roads.buffer, 0.0);
    assert_eq!(roads.normalized_schema(), vec!["NAME", "CLASS"]);
}
