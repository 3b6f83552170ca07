//! # overlap-sql
//!
//! Spatial SQL generation for AOI overlays.
//!
//! - [`def_query`]: rewrites spreadsheet filters into alias-qualified fragments
//! - [`metadata`]: geometry column / SRID resolution via an injected [`metadata::QueryRunner`]
//! - [`templates`]: the Oracle Spatial statement templates
//! - [`columns`]: select-list construction per [`overlap_common::models::SourceKind`]
//! - [`overlay`]: renders the keyed and geometry overlay families
pub mod columns;
pub mod def_query;
pub mod error;
pub mod metadata;
pub mod overlay;
pub mod sanitize;
pub mod templates;

pub use def_query::rewrite_definition_query;
pub use error::SqlGenError;
pub use metadata::{GeometryMetadata, GeometryMetadataResolver, QueryRow, QueryRunner};
pub use overlay::{AoiSource, BindValue, BindVars, OverlayQueryBuilder, OverlaySpec, RenderedQuery};
