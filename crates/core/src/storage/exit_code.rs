//! Pure functions for mapping repository errors to process exit codes.
//!
//! Codes follow the BSD `sysexits.h` conventions so scripts driving the CLI
//! can tell caller mistakes apart from store failures.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to a process exit code.
///
/// - `Validation` -> 65 (EX_DATAERR)
/// - `NotFound` -> 66 (EX_NOINPUT)
/// - `Conflict` -> 75 (EX_TEMPFAIL)
/// - `ConnectionFailed` -> 69 (EX_UNAVAILABLE)
/// - `QueryFailed` -> 74 (EX_IOERR)
/// - `Serialization`, `InvalidData` -> 70 (EX_SOFTWARE)
///
/// # Examples
///
/// ```
/// use expensetrack_core::storage::{RepositoryError, repository_error_to_exit_code};
///
/// let error = RepositoryError::not_found("Expense", "abc-123");
/// assert_eq!(repository_error_to_exit_code(&error), 66);
/// ```
pub fn repository_error_to_exit_code(error: &RepositoryError) -> u8 {
    match error {
        RepositoryError::Validation(_) => 65,
        RepositoryError::NotFound { .. } => 66,
        RepositoryError::Conflict { .. } => 75,
        RepositoryError::ConnectionFailed(_) => 69,
        RepositoryError::QueryFailed(_) => 74,
        RepositoryError::Serialization(_) | RepositoryError::InvalidData(_) => 70,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_65() {
        let error = RepositoryError::Validation("Merchant cannot be empty".to_string());
        assert_eq!(repository_error_to_exit_code(&error), 65);
    }

    #[test]
    fn test_not_found_maps_to_66() {
        let error = RepositoryError::not_found("Expense", "expense-123");
        assert_eq!(repository_error_to_exit_code(&error), 66);
    }

    #[test]
    fn test_conflict_maps_to_75() {
        let error = RepositoryError::conflict("Expense", "expense-456");
        assert_eq!(repository_error_to_exit_code(&error), 75);
    }

    #[test]
    fn test_connection_failed_maps_to_69() {
        let error = RepositoryError::ConnectionFailed("endpoint unreachable".to_string());
        assert_eq!(repository_error_to_exit_code(&error), 69);
    }

    #[test]
    fn test_query_failed_maps_to_74() {
        let error = RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string());
        assert_eq!(repository_error_to_exit_code(&error), 74);
    }

    #[test]
    fn test_invalid_data_maps_to_70() {
        let error = RepositoryError::InvalidData("Missing or invalid field: amount".to_string());
        assert_eq!(repository_error_to_exit_code(&error), 70);
    }
}
