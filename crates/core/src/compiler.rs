//! Spreadsheet → feature entry compilation.
//!
//! # Column layout
//! | index | content |
//! |-------|---------|
//! | 0 | category (fill-down) |
//! | 1 | feature name |
//! | 2 | table or file path |
//! | 3 | definition query |
//! | 4 | buffer distance |
//! | 5 | label field |
//! | 6.. | additional summary fields |
//!
//! # Cleaning
//! Rows that are entirely blank are dropped, then nulls are handled in two
//! phases. Integer-valued columns are first cast to a nullable-integer
//! representation; a generic null substitution then turns the gaps of every
//! *other* column into `Null`; finally only the columns still in the
//! nullable-integer representation get their gaps zero-filled. A column that
//! mixes text and numbers is generic, so a missing buffer in such a column
//! stays `Null` rather than becoming 0.

use overlap_common::models::{Cell, FeatureConfig, FeatureEntry, TableSummaryRecord};
use overlap_error::{ErrorCode, ErrorContext, OverlapError};

pub const CATEGORY_COL: usize = 0;
pub const FEATURE_NAME_COL: usize = 1;
pub const TABLE_COL: usize = 2;
pub const QUERY_COL: usize = 3;
pub const BUFFER_COL: usize = 4;
pub const LABEL_FIELD_COL: usize = 5;
pub const SUMMARY_FIELDS_START: usize = 6;

/// Rows of cells as read from one or more worksheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Drop leading description rows that sit under the header.
    pub fn skip_header_rows(mut self, n: usize) -> Self {
        self.rows.drain(..n.min(self.rows.len()));
        self
    }

    /// Append the rows of several sheets, e.g. the common sheet then a regional one.
    pub fn concat(tables: impl IntoIterator<Item = RawTable>) -> Self {
        Self {
            rows: tables.into_iter().flat_map(|t| t.rows).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRepr {
    NullableInt,
    Generic,
}

fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

fn column_repr(rows: &[Vec<Cell>], col: usize) -> ColumnRepr {
    let mut present = rows
        .iter()
        .map(|r| &r[col])
        .filter(|c| !matches!(c, Cell::Missing))
        .peekable();

    // An all-missing column stays generic so its cells become Null. It is
    // never treated as integral and zero-filled.
    if present.peek().is_none() {
        return ColumnRepr::Generic;
    }

    let integral = present.all(|c| match c {
        Cell::Int(_) => true,
        Cell::Float(f) => f.is_finite() && f.fract() == 0.0,
        _ => false,
    });

    if integral {
        ColumnRepr::NullableInt
    } else {
        ColumnRepr::Generic
    }
}

/// Drop blank rows and apply the two-phase null handling.
pub fn clean_table(table: RawTable) -> RawTable {
    let width = table.width();
    let mut rows: Vec<Vec<Cell>> = table
        .rows
        .into_iter()
        .filter(|r| !is_blank_row(r))
        .map(|mut r| {
            r.resize(width, Cell::Missing);
            r
        })
        .collect();

    let reprs: Vec<ColumnRepr> = (0..width).map(|c| column_repr(&rows, c)).collect();

    // Phase 1: cast integer columns to the nullable-integer representation.
    for row in rows.iter_mut() {
        for (cell, repr) in row.iter_mut().zip(&reprs) {
            if *repr == ColumnRepr::NullableInt {
                if let Cell::Float(f) = *cell {
                    *cell = Cell::Int(f as i64);
                }
            }
        }
    }

    // Phase 2: generic null substitution, skipping nullable-integer columns.
    for row in rows.iter_mut() {
        for (cell, repr) in row.iter_mut().zip(&reprs) {
            if *repr == ColumnRepr::Generic && matches!(cell, Cell::Missing) {
                *cell = Cell::Null;
            }
        }
    }

    // Phase 3: zero-fill whatever is still missing in nullable-integer columns.
    for row in rows.iter_mut() {
        for (cell, repr) in row.iter_mut().zip(&reprs) {
            if *repr == ColumnRepr::NullableInt && matches!(cell, Cell::Missing) {
                *cell = Cell::Int(0);
            }
        }
    }

    RawTable { rows }
}

/// Fill-down accumulator for the category column.
///
/// Owned by a single compilation pass and threaded through the row fold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryState {
    current: Option<String>,
}

impl CategoryState {
    /// State after seeing `cell`: a non-blank cell replaces the category.
    pub fn advance(self, cell: &Cell) -> Self {
        match cell.as_string() {
            Some(category) => Self {
                current: Some(category),
            },
            None => self,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

fn cell_at(row: &[Cell], col: usize) -> &Cell {
    static MISSING: Cell = Cell::Missing;
    row.get(col).unwrap_or(&MISSING)
}

fn report_malformed(index: usize, row: &[Cell]) {
    let missing_cells: Vec<String> = [
        (FEATURE_NAME_COL, "feature_name"),
        (TABLE_COL, "table"),
        (LABEL_FIELD_COL, "label_field"),
    ]
    .iter()
    .filter(|(col, _)| cell_at(row, *col).is_blank())
    .map(|(_, name)| name.to_string())
    .collect();

    if missing_cells.is_empty() {
        return;
    }

    let err = OverlapError::new(
        ErrorCode::MalformedRow,
        format!("Row {} is missing {}", index, missing_cells.join(", ")),
    )
    .with_context(ErrorContext::Row {
        index,
        missing_cells,
    });
    tracing::warn!(error = %err, "Malformed spreadsheet row, using defaults");
}

/// Build the entry for one row under the given category state.
pub fn transform_row(state: &CategoryState, index: usize, row: &[Cell]) -> FeatureEntry {
    report_malformed(index, row);

    let summary_fields: Vec<String> = row
        .iter()
        .skip(SUMMARY_FIELDS_START)
        .filter_map(Cell::as_string)
        .collect();

    let record = TableSummaryRecord {
        category: state.current().map(str::to_string),
        feature_name: cell_at(row, FEATURE_NAME_COL).as_string(),
        table: cell_at(row, TABLE_COL).as_string(),
        query: cell_at(row, QUERY_COL).as_string(),
        buffer: cell_at(row, BUFFER_COL).as_f64(),
        label_field: cell_at(row, LABEL_FIELD_COL).as_string(),
        summary_fields: Some(summary_fields),
    };

    tracing::debug!(
        row = index,
        category = ?record.category,
        feature = ?record.feature_name,
        "Compiled spreadsheet row"
    );

    FeatureEntry::new(FeatureConfig::from(record))
}

/// Fold over the rows left to right, carrying the category accumulator.
pub fn compile_rows(rows: &[Vec<Cell>]) -> Vec<FeatureEntry> {
    rows.iter()
        .filter(|r| !is_blank_row(r))
        .enumerate()
        .scan(CategoryState::default(), |state, (index, row)| {
            let next = std::mem::take(state).advance(cell_at(row, CATEGORY_COL));
            let entry = transform_row(&next, index, row);
            *state = next;
            Some(entry)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetCompiler;

impl SpreadsheetCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Clean then compile. Every call starts from a fresh category state.
    pub fn compile(&self, table: RawTable) -> Vec<FeatureEntry> {
        let cleaned = clean_table(table);
        let entries = compile_rows(&cleaned.rows);
        tracing::info!(entries = entries.len(), "Compiled spreadsheet");
        entries
    }
}
