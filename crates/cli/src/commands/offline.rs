use overlap_error::{ErrorCode, OverlapError, Result};
use overlap_sql::{BindVars, QueryRow, QueryRunner};

/// Runner used when no database session is available.
///
/// Every catalog probe fails, so geometry metadata resolves to the
/// configured defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRunner;

impl QueryRunner for OfflineRunner {
    fn run_query(&self, sql: &str, _binds: &BindVars) -> Result<Vec<QueryRow>> {
        tracing::debug!(sql = %sql.trim(), "Skipping query, no database session");
        Err(
            OverlapError::new(ErrorCode::QueryExecution, "No database session")
                .with_hint("Metadata falls back to the configured defaults"),
        )
    }
}
