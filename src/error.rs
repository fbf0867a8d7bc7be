//! Fatal load errors.
//!
//! Only structural failures surface here. Broken or missing individual
//! fragments are recovered during reconciliation and reported through
//! [`LoadReport`](crate::report::LoadReport) instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::SettingsError;
use crate::fragments::FragmentError;
use crate::relational::HandlerError;

/// Errors that abort loading a model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The root cube definition is not in the manifest
    #[error("No root cube fragment in manifest (expected a file matching {pattern})")]
    MissingRootFragment { pattern: String },

    /// The root cube definition is present but unusable
    #[error("Root cube fragment {file} could not be loaded: {source}")]
    RootFragment {
        file: String,
        #[source]
        source: FragmentError,
    },

    /// IO error opening a backend
    #[error("IO error: {0}")]
    Store(#[from] std::io::Error),

    /// The relational metadata store could not be opened
    #[error("Metadata store error: {0}")]
    Sqlite(#[from] HandlerError),

    /// Neither backend was recognised at the given path
    #[error("No metadata backend found at {}", path.display())]
    UnknownBackend { path: PathBuf },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Result type for model loading operations.
pub type LoadResult<T> = Result<T, LoadError>;
