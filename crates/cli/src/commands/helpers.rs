use overlap_common::models::{Cell, FeatureEntry};
use overlap_core::RawTable;
use overlap_error::{ErrorCode, ErrorContext, OverlapError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        OverlapError::from(e).with_hint(format!("Check that {} exists", path.display()))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// A sheet exported as a JSON array of row arrays.
pub fn rows_from_json(value: Value) -> Result<RawTable> {
    let Value::Array(rows) = value else {
        return Err(OverlapError::invalid_input_shape("a non-array sheet"));
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Array(cells) => Ok(cells.into_iter().map(Cell::from).collect()),
            Value::Null => Ok(Vec::new()),
            _ => Err(OverlapError::new(
                ErrorCode::MalformedRow,
                format!("Row {} is not an array of cells", index),
            )
            .with_context(ErrorContext::Row {
                index,
                missing_cells: Vec::new(),
            })),
        })
        .collect::<Result<Vec<_>>>()
        .map(RawTable::new)
}

/// A single entry object or an array of entries.
pub fn entries_from_json(value: Value) -> Result<Vec<FeatureEntry>> {
    let invalid = |e: serde_json::Error| {
        OverlapError::new(ErrorCode::InvalidEntry, format!("Not a feature entry: {}", e))
    };
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(invalid),
        Value::Object(_) => serde_json::from_value(value).map(|e| vec![e]).map_err(invalid),
        _ => Err(OverlapError::invalid_input_shape("a scalar")),
    }
}
