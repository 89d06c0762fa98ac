use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        table: Option<String>,
        column: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation { message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    // SQLite reports the qualified column in the message:
                    // "UNIQUE constraint failed: maintainers.email"
                    let (table, column) = extract_unique_target(db_err.message());
                    DbError::UniqueViolation {
                        table,
                        column,
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_foreign_key_violation() {
                    // SQLite gives no table/column detail for FK failures
                    DbError::ForeignKeyViolation {
                        message: db_err.message().to_string(),
                    }
                } else {
                    // All other database errors are non-recoverable - convert to anyhow
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Extract `(table, column)` from a SQLite unique violation message of the
/// form "UNIQUE constraint failed: <table>.<column>"
fn extract_unique_target(message: &str) -> (Option<String>, Option<String>) {
    let Some(qualified) = message.strip_prefix("UNIQUE constraint failed: ") else {
        return (None, None);
    };
    // Multi-column constraints list every column; the first is enough to
    // identify the offending field
    let first = qualified.split(',').next().unwrap_or(qualified).trim();
    match first.split_once('.') {
        Some((table, column)) => (Some(table.to_string()), Some(column.to_string())),
        None => (None, Some(first.to_string())),
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
