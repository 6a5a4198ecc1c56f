//! Repository errors shared by every read-only collaborator.

use thiserror::Error;

/// Failure reported by a catalog, profile, coupon or shipping lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record with the given key.
    #[error("{entity} {key} not found")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,

        /// Lookup key, rendered for display.
        key: String,
    },

    /// The backing store failed.
    #[error("repository backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Shorthand for [`RepositoryError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether this is a missing-record error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Turns a lookup that may legitimately find nothing into an `Option`.
///
/// # Errors
///
/// Returns the original error for anything other than
/// [`RepositoryError::NotFound`].
pub fn optional<T>(result: Result<T, RepositoryError>) -> Result<Option<T>, RepositoryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_maps_not_found_to_none() {
        let missing: Result<u8, _> = Err(RepositoryError::not_found("zone", "DE"));

        assert_eq!(optional(missing), Ok(None));
        assert_eq!(optional(Ok(3_u8)), Ok(Some(3)));
    }

    #[test]
    fn optional_keeps_backend_errors() {
        let failed: Result<u8, _> = Err(RepositoryError::Backend("down".to_string()));

        assert!(matches!(optional(failed), Err(RepositoryError::Backend(_))));
    }

    #[test]
    fn not_found_renders_entity_and_key() {
        let error = RepositoryError::not_found("product", 42);

        assert_eq!(error.to_string(), "product 42 not found");
    }
}
