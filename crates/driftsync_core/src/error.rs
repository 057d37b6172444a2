//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while querying or writing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure during a query or upsert.
    #[error("I/O error in store {store}: {message}")]
    Io {
        /// Name of the store.
        store: String,
        /// Description of the failure.
        message: String,
    },

    /// Write attempted against a read-only store.
    #[error("store {store} is read-only")]
    ReadOnly {
        /// Name of the store.
        store: String,
    },

    /// A raw last-updated value could not be normalized.
    #[error("cannot normalize field {field} in store {store}: {message}")]
    Normalize {
        /// Name of the store.
        store: String,
        /// Field holding the raw value.
        field: String,
        /// Description of the failure.
        message: String,
    },

    /// A document lacks a required field.
    #[error("document in store {store} is missing field {field}")]
    MissingField {
        /// Name of the store.
        store: String,
        /// The absent field.
        field: String,
    },
}

impl StoreError {
    /// Creates an I/O error.
    pub fn io(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Creates a read-only error.
    pub fn read_only(store: impl Into<String>) -> Self {
        Self::ReadOnly {
            store: store.into(),
        }
    }

    /// Creates a normalization error.
    pub fn normalize(
        store: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Normalize {
            store: store.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-field error.
    pub fn missing_field(store: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            store: store.into(),
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_store() {
        let err = StoreError::missing_field("tasks", "last_updated");
        assert_eq!(
            err.to_string(),
            "document in store tasks is missing field last_updated"
        );

        let err = StoreError::read_only("source");
        assert!(err.to_string().contains("source"));
    }
}
