use super::error::SqlGenError;

/// Reject names that would break out of their slot in a textual template.
pub fn validate_identifier(name: &str) -> Result<(), SqlGenError> {
    if name.trim().is_empty() {
        return Err(SqlGenError::InvalidIdentifier("empty".to_string()));
    }
    if name.len() > 128 {
        return Err(SqlGenError::InvalidIdentifier(format!(
            "too long: {}",
            name.len()
        )));
    }
    if name.contains('"')
        || name.contains('\'')
        || name.contains('\x00')
        || name.contains(';')
        || name.contains('`')
        || name.contains('\\')
    {
        return Err(SqlGenError::InvalidIdentifier(format!(
            "forbidden characters in: {}",
            name
        )));
    }
    Ok(())
}

/// Split `OWNER.TABLE` into its trimmed components.
pub fn split_qualified(table: &str) -> Result<(String, String), SqlGenError> {
    match table.split_once('.') {
        Some((owner, name)) if !owner.trim().is_empty() && !name.trim().is_empty() => {
            Ok((owner.trim().to_string(), name.trim().to_string()))
        }
        _ => Err(SqlGenError::UnqualifiedTable(table.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("WHSE_TANTALIS.TA_CROWN_TENURES_SVW").is_ok());
        assert!(validate_identifier("b.OBJECTID").is_ok());

        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("foo\"bar").is_err());
        assert!(validate_identifier("x; DROP TABLE t").is_err());
        assert!(validate_identifier(r"C:\data\roads.shp").is_err());
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(
            split_qualified(" WHSE_X . TAB ").unwrap(),
            ("WHSE_X".to_string(), "TAB".to_string())
        );
        assert!(split_qualified("TAB").is_err());
        assert!(split_qualified(".TAB").is_err());
    }
}
