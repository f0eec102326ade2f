// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy (spec §7).
//!
//! Crate-local error enums (`StorageError`, `ConfigError`, `PluginError`, ...)
//! convert into this one at crate boundaries via `#[from]`. Every variant
//! carries a short `kind()` and, where applicable, a cause chain via
//! `#[source]`.

use std::fmt;

/// The shared DevLog error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum DevLogError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Informational: callers commonly ignore this. Never surfaced as a
    /// user-visible failure.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("config invalid: {0}")]
    ConfigInvalid(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timeout: {0}")]
    Timeout(String),

    /// Ambient cancellation. Not really an error — callers should treat
    /// this as a clean early return, never log it as a failure.
    #[error("cancelled")]
    Cancelled,

    #[error("unmet dependency: {plugin} depends on {dependency}")]
    UnmetDependency { plugin: String, dependency: String },

    #[error("dependency cycle: {0:?}")]
    Cycle(Vec<String>),
}

impl DevLogError {
    /// Short machine-readable kind, stable across releases; used in HTTP
    /// error bodies and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DevLogError::Validation(_) => "validation",
            DevLogError::DuplicateId(_) => "duplicate-id",
            DevLogError::NotFound(_) => "not-found",
            DevLogError::ConfigInvalid(_) => "config-invalid",
            DevLogError::Io(_) => "io",
            DevLogError::Timeout(_) => "timeout",
            DevLogError::Cancelled => "cancelled",
            DevLogError::UnmetDependency { .. } => "unmet-dependency",
            DevLogError::Cycle(_) => "cycle",
        }
    }

    /// Whether this error kind should ever abort daemon startup (spec §7:
    /// "Fatal conditions ... abort startup before the HTTP surface is
    /// exposed"). Callers outside startup never need this.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            DevLogError::ConfigInvalid(_) | DevLogError::Io(_)
        )
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.detail)
    }
}

/// `{error, detail}` shape returned by the ingest HTTP surface on failure
/// (spec §4.J / §6.2).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl From<&DevLogError> for ErrorBody {
    fn from(e: &DevLogError) -> Self {
        ErrorBody {
            error: e.kind().to_string(),
            detail: e.to_string(),
        }
    }
}
