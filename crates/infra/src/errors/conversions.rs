//! Conversions from external infrastructure errors into domain errors.

use almanac_domain::AlmanacError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AlmanacError);

impl From<InfraError> for AlmanacError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AlmanacError> for InfraError {
    fn from(value: AlmanacError) -> Self {
        InfraError(value)
    }
}

impl std::fmt::Display for InfraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for InfraError {}

trait IntoAlmanacError {
    fn into_almanac(self) -> AlmanacError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → AlmanacError */
/* -------------------------------------------------------------------------- */

impl IntoAlmanacError for SqlError {
    fn into_almanac(self) -> AlmanacError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        AlmanacError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        AlmanacError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, _) => {
                        AlmanacError::InvalidInput(format!("constraint violation: {message}"))
                    }
                    _ => AlmanacError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => AlmanacError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                AlmanacError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                AlmanacError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => AlmanacError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => AlmanacError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_almanac())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → AlmanacError */
/* -------------------------------------------------------------------------- */

impl IntoAlmanacError for PoolError {
    fn into_almanac(self) -> AlmanacError {
        AlmanacError::Database(format!("connection pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_almanac())
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::ffi;

    use super::*;

    fn sqlite_failure(code: i32, message: &str) -> SqlError {
        SqlError::SqliteFailure(ffi::Error::new(code), Some(message.to_string()))
    }

    #[test]
    fn busy_database_maps_to_database_error() {
        let err: AlmanacError = InfraError::from(sqlite_failure(ffi::SQLITE_BUSY, "busy")).into();
        assert_eq!(err, AlmanacError::Database("database is busy".into()));
    }

    #[test]
    fn constraint_violation_is_invalid_input() {
        let err: AlmanacError =
            InfraError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_UNIQUE, "UNIQUE failed")).into();
        assert!(matches!(err, AlmanacError::InvalidInput(message) if message.contains("UNIQUE")));
    }

    #[test]
    fn missing_row_is_not_found() {
        let err: AlmanacError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(err, AlmanacError::NotFound(_)));
    }
}
