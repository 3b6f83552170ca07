//! Common types and configuration shared across the overlap crates.
//!
//! - **Models**: spreadsheet cells and the feature entry JSON shapes (`models`).
//! - **Configuration**: spatial fallbacks, registry and logging settings (`config`).
//! - **Telemetry**: `tracing` subscriber setup (`telemetry`).
pub mod config;
pub mod models;
pub mod telemetry;
