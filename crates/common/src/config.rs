use anyhow::{Context, Result};
use serde::Deserialize;
use validator::Validate;

// Default constants
pub const DEFAULT_SRID: i32 = 3005;
pub const DEFAULT_GEOMETRY_COLUMN: &str = "SHAPE";
pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 0.5;
pub const DEFAULT_REGISTRY_TABLE: &str = "WHSE_TANTALIS.TA_CROWN_TENURES_SVW";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const ENV_PREFIX: &str = "OVERLAP";

#[derive(Debug, Deserialize, Default, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub defaults: SpatialDefaults,
    #[serde(default)]
    #[validate(nested)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fallbacks used when metadata resolution fails.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SpatialDefaults {
    #[serde(default = "default_srid")]
    #[validate(range(min = 1))]
    pub srid: i32,

    #[serde(default = "default_geometry_column")]
    #[validate(length(min = 1))]
    pub geometry_column: String,

    /// Tolerance passed to `SDO_GEOM.SDO_DISTANCE`.
    #[serde(default = "default_distance_tolerance")]
    #[validate(range(min = 0.0))]
    pub distance_tolerance: f64,
}

impl Default for SpatialDefaults {
    fn default() -> Self {
        Self {
            srid: default_srid(),
            geometry_column: default_geometry_column(),
            distance_tolerance: default_distance_tolerance(),
        }
    }
}

/// The tenure registry holding keyed AOI geometries.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_table")]
    #[validate(length(min = 1))]
    pub table: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            table: default_registry_table(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_srid() -> i32 {
    DEFAULT_SRID
}

fn default_geometry_column() -> String {
    DEFAULT_GEOMETRY_COLUMN.to_string()
}

fn default_distance_tolerance() -> f64 {
    DEFAULT_DISTANCE_TOLERANCE
}

fn default_registry_table() -> String {
    DEFAULT_REGISTRY_TABLE.to_string()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl AppConfig {
    /// Load from an optional file, then `OVERLAP_*` environment variables.
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(config::File::with_name(path))
        } else {
            builder
        };

        // OVERLAP_DEFAULTS__SRID maps to defaults.srid, etc.
        let builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;

        let app_config: AppConfig = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {:?}", e))?;

        Ok(app_config)
    }
}
