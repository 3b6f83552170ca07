//! Definition-query rewriting.
//!
//! Spreadsheet authors write filters against the target table with bare
//! column names (`STATUS = 'ACTIVE'`). The overlay templates alias the target
//! table as `b`, so those names are qualified textually before the filter is
//! appended to the WHERE clause.
//!
//! This is a text rewrite, not a parser. It assumes:
//! - columns carry no alias yet,
//! - every `AND`/`OR` is followed by a column name,
//! - parentheses only appear as one leading group, each `(` opening a
//!   comparison.
//!
//! Already-deployed spreadsheets depend on exactly these rules, including
//! their blind spots (`BETWEEN 1 AND 5` becomes `BETWEEN 1 AND b.5`).

use once_cell::sync::Lazy;
use regex::Regex;

pub const TARGET_ALIAS: &str = "b";

static KEYWORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(AND|OR)\b\s*").expect("static regex"));

/// Rewrite a raw filter into an `AND (...)` fragment qualified with the
/// target alias. Absent or blank input yields an empty string.
///
/// A leading group keeps its own parentheses inside the single `AND (...)`
/// wrapper: `(A = 1)` becomes `AND ((b.A = 1))`.
pub fn rewrite_definition_query(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let cleaned = raw.trim().replace('"', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return String::new();
    }

    let prefix = format!("{}.", TARGET_ALIAS);
    let rewritten = KEYWORD_REGEX.replace_all(cleaned, format!("${{1}} {}", prefix).as_str());

    let qualified = if rewritten.starts_with('(') {
        rewritten.replace('(', &format!("({}", prefix))
    } else {
        format!("{}{}", prefix, rewritten)
    };

    format!("AND ({})", qualified)
}
