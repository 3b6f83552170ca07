use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace prefixes of tables published through the government data warehouse.
pub const WAREHOUSE_PREFIXES: [&str; 2] = ["WHSE", "REG"];

// --- Cells ---

/// A single spreadsheet or result-set value.
///
/// `Missing` is a gap reported by the reader; `Null` is the generic null
/// sentinel written during cleaning. The two are kept apart because only
/// nullable-integer columns get their remaining gaps zero-filled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Cell {
    #[default]
    Missing,
    Null,
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// True for `Missing`, `Null` and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Missing | Cell::Null => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Int(_) => false,
            Cell::Float(f) => f.is_nan(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Int(_)) || matches!(self, Cell::Float(f) if !f.is_nan())
    }

    /// Trimmed string form, `None` when blank.
    pub fn as_string(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        match self {
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Missing | Cell::Null => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if !f.is_nan() => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Cell::Missing,
            Value::Bool(b) => Cell::Text(b.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Missing),
            },
            Value::String(s) => Cell::Text(s),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<Cell> for serde_json::Value {
    fn from(cell: Cell) -> Self {
        use serde_json::Value;
        match cell {
            Cell::Missing | Cell::Null => Value::Null,
            Cell::Text(s) => Value::String(s),
            Cell::Int(i) => Value::from(i),
            Cell::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

// --- Source classification ---

/// How a target table is referenced in generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Warehouse table: columns are qualified with the target alias.
    Warehouse,
    /// File path or foreign table: columns are used as written.
    #[default]
    External,
}

impl SourceKind {
    pub fn classify(table: &str) -> Self {
        let table = table.trim();
        if WAREHOUSE_PREFIXES.iter().any(|p| table.starts_with(p)) {
            SourceKind::Warehouse
        } else {
            SourceKind::External
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Warehouse => write!(f, "warehouse"),
            SourceKind::External => write!(f, "external"),
        }
    }
}

// --- Feature configuration ---

/// Loose wire form of a `table_summary` object. Every field tolerates `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableSummaryRecord {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub feature_name: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub buffer: Option<f64>,
    #[serde(default)]
    pub label_field: Option<String>,
    #[serde(default)]
    pub summary_fields: Option<Vec<String>>,
}

/// One configured feature class of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableSummaryRecord")]
pub struct FeatureConfig {
    pub category: Option<String>,
    pub feature_name: String,
    pub table: String,
    pub query: Option<String>,
    pub buffer: f64,
    pub label_field: String,
    pub summary_fields: Vec<String>,
    #[serde(skip_serializing)]
    pub source_kind: SourceKind,
}

impl From<TableSummaryRecord> for FeatureConfig {
    fn from(record: TableSummaryRecord) -> Self {
        let table = record.table.unwrap_or_default();
        let buffer = match record.buffer {
            Some(b) if b.is_finite() && b > 0.0 => b,
            Some(b) if b < 0.0 => {
                tracing::warn!(table = %table, buffer = b, "Negative buffer distance clamped to 0");
                0.0
            }
            _ => 0.0,
        };

        Self {
            source_kind: SourceKind::classify(&table),
            category: record.category,
            feature_name: record.feature_name.unwrap_or_default(),
            table,
            query: record.query,
            buffer,
            label_field: record.label_field.unwrap_or_default(),
            summary_fields: record.summary_fields.unwrap_or_default(),
        }
    }
}

impl FeatureConfig {
    /// Summary fields with the label field present exactly once.
    ///
    /// The label goes to the front only when it was absent; later duplicates
    /// are dropped. A blank label adds nothing.
    pub fn normalized_schema(&self) -> Vec<String> {
        let label = self.label_field.trim();
        let mut schema = Vec::with_capacity(self.summary_fields.len() + 1);
        let mut label_seen = false;

        for field in &self.summary_fields {
            if !label.is_empty() && field == label {
                if label_seen {
                    continue;
                }
                label_seen = true;
            }
            schema.push(field.clone());
        }

        if !label.is_empty() && !label_seen {
            schema.insert(0, label.to_string());
        }
        schema
    }
}

/// Spatial metadata attached to a feature during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialQuerySummary {
    pub data_type: String,
    pub feature_class: String,
    pub source_table: String,
    pub srid: i32,
    pub overlay_intersection_query: String,
    pub schema: Vec<String>,
}

/// One entry of the intermediate/enriched JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub table_summary: FeatureConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_query_summary: Option<SpatialQuerySummary>,
}

impl FeatureEntry {
    pub fn new(table_summary: FeatureConfig) -> Self {
        Self {
            table_summary,
            spatial_query_summary: None,
        }
    }
}
