use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogKind;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Failures that abort an identity-resolution request.
///
/// Per-target transport failures are not represented here: they are dropped
/// inside the probe worker and never reach the caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid handle '{handle}': {reason}")]
    InvalidHandle { handle: String, reason: String },

    #[error("Catalog '{catalog}' unavailable: {reason}")]
    CatalogUnavailable { catalog: CatalogKind, reason: String },

    #[error("Anonymizing relay {relay} unreachable: {reason}")]
    RelayUnreachable { relay: String, reason: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub fn catalog(catalog: CatalogKind, reason: impl Into<String>) -> Self {
        ResolveError::CatalogUnavailable {
            catalog,
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ResolveError::InvalidConfig {
            message: message.into(),
        }
    }
}
