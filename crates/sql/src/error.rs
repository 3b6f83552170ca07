use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlGenError {
    #[error("Template '{template}' has unresolved placeholders: {missing:?}")]
    UnresolvedPlaceholder {
        template: &'static str,
        missing: Vec<String>,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Table name '{0}' is not schema-qualified (expected OWNER.TABLE)")]
    UnqualifiedTable(String),
}

impl SqlGenError {
    pub fn to_overlap_error(self) -> overlap_error::OverlapError {
        use overlap_error::{ErrorCode, ErrorContext, OverlapError};

        match self {
            SqlGenError::UnresolvedPlaceholder { template, missing } => OverlapError::new(
                ErrorCode::TemplateError,
                format!("Template '{}' could not be fully rendered", template),
            )
            .with_context(ErrorContext::Template {
                template: template.to_string(),
                unresolved: missing,
            })
            .with_hint("This indicates a bug in the query builder's substitution set"),
            SqlGenError::InvalidIdentifier(e) => OverlapError::new(
                ErrorCode::InvalidIdentifier,
                format!("Invalid SQL identifier: {}", e),
            )
            .with_hint("Table and column names are substituted into SQL text and must not contain quotes, semicolons or backslashes"),
            SqlGenError::UnqualifiedTable(table) => {
                OverlapError::metadata_not_found(&table, "table name has no owner component")
                    .with_hint("Use the OWNER.TABLE form, e.g. WHSE_TANTALIS.TA_CROWN_TENURES_SVW")
            }
        }
    }
}

impl From<SqlGenError> for overlap_error::OverlapError {
    fn from(err: SqlGenError) -> Self {
        err.to_overlap_error()
    }
}
