//! Select-list construction for the overlay queries.

use crate::def_query::TARGET_ALIAS;
use overlap_common::models::SourceKind;

/// Selected when a warehouse feature has no usable summary fields.
pub const IDENTITY_COLUMN: &str = "OBJECTID";

/// Columns to select from the target table.
///
/// Warehouse tables get every non-blank field qualified with the target alias,
/// or the identity column if nothing is left. External tables use the
/// non-blank fields as written, possibly none.
pub fn column_list(kind: SourceKind, fields: &[String]) -> Vec<String> {
    match kind {
        SourceKind::Warehouse => {
            let cols: Vec<String> = fields
                .iter()
                .map(|f| f.trim())
                .filter(|f| !f.is_empty())
                .map(|f| format!("{}.{}", TARGET_ALIAS, f))
                .collect();
            if cols.is_empty() {
                vec![format!("{}.{}", TARGET_ALIAS, IDENTITY_COLUMN)]
            } else {
                cols
            }
        }
        SourceKind::External => fields
            .iter()
            .filter(|f| !f.trim().is_empty())
            .cloned()
            .collect(),
    }
}

/// The `{cols}` substitution: comma-terminated so the classification column
/// can follow, or empty.
pub fn select_prefix(cols: &[String]) -> String {
    if cols.is_empty() {
        String::new()
    } else {
        format!("{},", cols.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_warehouse_fields_are_qualified() {
        let kind = SourceKind::classify("WHSE_TANTALIS.TA_CROWN_TENURES_SVW");
        assert_eq!(column_list(kind, &fields(&["OBJECTID"])), vec!["b.OBJECTID"]);
        assert_eq!(
            column_list(kind, &fields(&["TENURE_STAGE", "TENURE_STATUS"])),
            vec!["b.TENURE_STAGE", "b.TENURE_STATUS"]
        );
    }

    #[test]
    fn test_warehouse_blank_falls_back_to_identity() {
        assert_eq!(
            column_list(SourceKind::Warehouse, &fields(&[" "])),
            vec!["b.OBJECTID"]
        );
        assert_eq!(column_list(SourceKind::Warehouse, &[]), vec!["b.OBJECTID"]);
    }

    #[test]
    fn test_external_fields_as_written() {
        let kind = SourceKind::classify("ROADS_LOCAL");
        assert!(column_list(kind, &[]).is_empty());
        assert!(column_list(kind, &fields(&["", " "])).is_empty());
        assert_eq!(column_list(kind, &fields(&["NAME", "CLASS"])), vec!["NAME", "CLASS"]);
    }

    #[test]
    fn test_external_blank_fields_dropped() {
        let kind = SourceKind::External;
        assert_eq!(column_list(kind, &fields(&["NAME", " ", "", "CLASS"])), vec!["NAME", "CLASS"]);
    }

    #[test]
    fn test_select_prefix() {
        assert_eq!(select_prefix(&[]), "");
        assert_eq!(
            select_prefix(&fields(&["b.A", "b.B"])),
            "b.A, b.B,"
        );
    }
}
