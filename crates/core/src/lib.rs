//! Overlap Core: spreadsheet compilation and feature spec building.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ Spreadsheet │ ──▶ │ FeatureEntry │ ──▶ │ + spatial      │
//! │   rows      │     │   (JSON)     │     │   query summary│
//! └─────────────┘     └──────────────┘     └────────────────┘
//!  SpreadsheetCompiler                      FeatureSpecBuilder
//! ```
//!
//! Database access and file probing are injected through
//! [`overlap_sql::QueryRunner`] and [`probe::TypeProbe`].

pub mod compiler;
pub mod probe;
pub mod spec_builder;

pub use compiler::{CategoryState, RawTable, SpreadsheetCompiler};
pub use probe::{FileFormatProbe, TypeProbe};
pub use spec_builder::{EntryFailure, FeatureSpecBuilder, PayloadReport, SpecOutput};
