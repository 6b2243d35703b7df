//! Shared storage types for wfport
//!
//! This module provides common storage-related types used across domain repositories.

use crate::error::Error;
use thiserror::Error;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Lock poisoned: {0}")]
    Poisoned(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl<T> From<std::sync::PoisonError<T>> for RepositoryError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        RepositoryError::Poisoned(err.to_string())
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Connection(e) => Error::Database(e),
            RepositoryError::Poisoned(msg) => Error::Storage(msg),
            RepositoryError::InvalidData(msg) => Error::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_poisoned_lock_maps_to_storage_error() {
        let lock = Arc::new(Mutex::new(0));
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err: RepositoryError = lock.lock().unwrap_err().into();
        assert!(matches!(err, RepositoryError::Poisoned(_)));
        assert!(matches!(Error::from(err), Error::Storage(_)));
    }

    #[test]
    fn test_invalid_data_maps_to_storage_error() {
        let err = Error::from(RepositoryError::InvalidData("bad event type".to_string()));
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
