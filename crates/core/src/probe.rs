//! Data type probing for feature sources.

use overlap_error::{OverlapError, Result};
use std::path::Path;

/// Reported when a source cannot be identified.
pub const UNKNOWN_DATA_TYPE: &str = "unknown";

/// Identifies the storage driver behind a table reference.
pub trait TypeProbe {
    fn probe_type(&self, table_ref: &str) -> Result<String>;
}

impl<T: TypeProbe + ?Sized> TypeProbe for &T {
    fn probe_type(&self, table_ref: &str) -> Result<String> {
        (**self).probe_type(table_ref)
    }
}

/// Split `C:\data\roads.gdb\highways` into the geodatabase and the layer name.
///
/// Returns `None` when the path does not go through a `.gdb` directory. The
/// layer is `None` when the path names the geodatabase itself.
pub fn split_gdb_path(path: &str) -> Option<(String, Option<String>)> {
    let idx = path.to_ascii_lowercase().find(".gdb")?;
    let end = idx + ".gdb".len();
    let gdb = path[..end].to_string();
    let layer = path[end..]
        .trim_matches(|c: char| c == '/' || c == '\\')
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string);
    Some((gdb, layer))
}

/// Maps file-based sources to vector driver names by extension.
///
/// Only paths that exist are recognized; warehouse table names and anything
/// unreadable fail the probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFormatProbe;

impl FileFormatProbe {
    fn driver_for_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "shp" => Some("ESRI Shapefile"),
            "gdb" => Some("OpenFileGDB"),
            "gpkg" => Some("GPKG"),
            "geojson" => Some("GeoJSON"),
            "kml" => Some("KML"),
            _ => None,
        }
    }
}

impl TypeProbe for FileFormatProbe {
    fn probe_type(&self, table_ref: &str) -> Result<String> {
        let table_ref = table_ref.trim();

        let container = match split_gdb_path(table_ref) {
            Some((gdb, _)) => gdb,
            None => table_ref.to_string(),
        };
        let path = Path::new(&container);

        let driver = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::driver_for_extension)
            .ok_or_else(|| OverlapError::type_probe_failure(table_ref, "unrecognized format"))?;

        if !path.exists() {
            return Err(OverlapError::type_probe_failure(table_ref, "path does not exist"));
        }

        tracing::debug!(table = %table_ref, driver = driver, "Probed data type");
        Ok(driver.to_string())
    }
}
