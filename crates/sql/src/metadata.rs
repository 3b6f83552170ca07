//! Geometry column and SRID resolution through the spatial metadata catalog.
//!
//! Queries are executed by an injected [`QueryRunner`]; this module only
//! renders the probes and interprets their rows.

use crate::error::SqlGenError;
use crate::overlay::{BindValue, BindVars};
use crate::sanitize::{split_qualified, validate_identifier};
use crate::templates;
use overlap_common::config::SpatialDefaults;
use overlap_common::models::Cell;
use overlap_error::{ErrorCode, OverlapError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// One result row keyed by upper-case column name.
pub type QueryRow = BTreeMap<String, Cell>;

/// Synchronous query execution collaborator.
pub trait QueryRunner {
    fn run_query(&self, sql: &str, binds: &BindVars) -> Result<Vec<QueryRow>>;
}

impl<T: QueryRunner + ?Sized> QueryRunner for &T {
    fn run_query(&self, sql: &str, binds: &BindVars) -> Result<Vec<QueryRow>> {
        (**self).run_query(sql, binds)
    }
}

impl<T: QueryRunner + ?Sized> QueryRunner for Box<T> {
    fn run_query(&self, sql: &str, binds: &BindVars) -> Result<Vec<QueryRow>> {
        (**self).run_query(sql, binds)
    }
}

/// Resolved (or defaulted) geometry metadata for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeometryMetadata {
    pub geom_col: String,
    pub srid: i32,
}

pub struct GeometryMetadataResolver<'a, R: QueryRunner> {
    runner: &'a R,
    defaults: &'a SpatialDefaults,
}

impl<'a, R: QueryRunner> GeometryMetadataResolver<'a, R> {
    pub fn new(runner: &'a R, defaults: &'a SpatialDefaults) -> Self {
        Self { runner, defaults }
    }

    /// First geometry column registered for `OWNER.TABLE`.
    pub fn resolve_geometry_column(&self, table: &str) -> Result<String> {
        let (owner, tab_name) = split_qualified(table)?;

        let mut binds = BindVars::new();
        binds.insert("owner".into(), BindValue::Text(owner));
        binds.insert("tab_name".into(), BindValue::Text(tab_name));

        let sql = templates::GEOM_COL.render(&[])?;
        let rows = self
            .runner
            .run_query(&sql, &binds)
            .map_err(|e| OverlapError::metadata_not_found(table, e.message))?;

        rows.first()
            .and_then(|row| row.get("GEOM_NAME"))
            .and_then(Cell::as_string)
            .ok_or_else(|| OverlapError::metadata_not_found(table, "no catalog entry"))
    }

    /// SRID read from the first row of the table, or the configured default.
    pub fn resolve_srid(&self, table: &str, geom_col: &str) -> i32 {
        match self.probe_srid(table, geom_col) {
            Ok(srid) => srid,
            Err(e) => {
                tracing::warn!(
                    table = %table,
                    default_srid = self.defaults.srid,
                    error = %e,
                    "SRID probe failed, using default"
                );
                self.defaults.srid
            }
        }
    }

    fn probe_srid(&self, table: &str, geom_col: &str) -> Result<i32> {
        validate_identifier(table).map_err(SqlGenError::to_overlap_error)?;
        validate_identifier(geom_col).map_err(SqlGenError::to_overlap_error)?;

        let sql = templates::SRID.render(&[("geom_col", geom_col), ("tab", table.trim())])?;
        let rows = self.runner.run_query(&sql, &BindVars::new())?;

        let value = rows
            .first()
            .and_then(|row| row.get("SP_REF"))
            .ok_or_else(|| OverlapError::metadata_not_found(table, "SRID probe returned no rows"))?;

        value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| {
                OverlapError::new(
                    ErrorCode::MetadataNotFound,
                    format!("SRID for '{}' is not an integer: {:?}", table, value),
                )
            })
    }

    /// Geometry column (falling back to the default column name) and SRID.
    pub fn resolve(&self, table: &str) -> GeometryMetadata {
        let geom_col = match self.resolve_geometry_column(table) {
            Ok(col) => col,
            Err(e) => {
                tracing::warn!(
                    table = %table,
                    default_column = %self.defaults.geometry_column,
                    error = %e,
                    "Geometry column lookup failed, using default"
                );
                self.defaults.geometry_column.clone()
            }
        };
        let srid = self.resolve_srid(table, &geom_col);
        GeometryMetadata { geom_col, srid }
    }
}
