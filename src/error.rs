//! Error types for package resolution and suggestion
//!
//! This module provides structured error types using thiserror. Resolution
//! errors are ordinary values returned from importers; faults are what the
//! suggester catches at its boundary and never hands to callers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while classifying, locating or type-checking an import
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Import path is syntactically unusable
    #[error("invalid import path '{path}': {reason}")]
    InvalidImportPath { path: String, reason: String },

    /// No source root holds the package
    #[error("cannot find package '{path}' from '{}' (searched: {})", .source_dir.display(), format_searched(.searched))]
    NotFound {
        path: String,
        source_dir: PathBuf,
        searched: Vec<PathBuf>,
    },

    /// Directory exists but holds nothing that builds for the target
    #[error("no buildable Go source files in '{}' for '{path}'", .dir.display())]
    NoBuildableFiles { path: String, dir: PathBuf },

    /// Filesystem errors while probing source roots
    #[error("io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The import strategy failed to produce type information
    #[error("{strategy} importer failed for '{path}' from '{}': {cause}", .source_dir.display())]
    Import {
        path: String,
        source_dir: PathBuf,
        strategy: &'static str,
        cause: String,
    },
}

fn format_searched(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "no source roots configured".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ResolutionError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidImportPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }

    pub fn import(
        path: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        strategy: &'static str,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Import {
            path: path.into(),
            source_dir: source_dir.into(),
            strategy,
            cause: cause.to_string(),
        }
    }

    /// Import path this error refers to, when there is one
    pub fn import_path(&self) -> Option<&str> {
        match self {
            Self::InvalidImportPath { path, .. }
            | Self::NotFound { path, .. }
            | Self::NoBuildableFiles { path, .. }
            | Self::Import { path, .. } => Some(path),
            Self::Io { .. } => None,
        }
    }

    /// Stable code for programmatic handling in JSON responses
    pub fn status_code(&self) -> String {
        match self {
            Self::InvalidImportPath { .. } => "RESOLUTION_INVALID_IMPORT_PATH",
            Self::NotFound { .. } => "RESOLUTION_NOT_FOUND",
            Self::NoBuildableFiles { .. } => "RESOLUTION_NO_BUILDABLE_FILES",
            Self::Io { .. } => "RESOLUTION_IO",
            Self::Import { .. } => "RESOLUTION_IMPORT_FAILED",
        }
        .to_string()
    }

    /// Recovery suggestions list (mirrors project error conventions)
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidImportPath { .. } => vec![
                "Check the import statement for typos or stray characters",
                "Import paths use forward slashes and must not be absolute",
            ],
            Self::NotFound { .. } => vec![
                "Check that GOROOT and GOPATH point at the right trees",
                "Set [build] goroot/gopath in .gosuggest/settings.toml",
                "Run 'gosuggest locate <import>' to see where the package is searched",
            ],
            Self::NoBuildableFiles { .. } => vec![
                "Check GOOS/GOARCH and build tags in [build]",
                "Files ending in _test.go or starting with _ or . are never built",
            ],
            Self::Io { .. } => vec![
                "Check permissions on the source roots",
                "Ensure the directory was not removed while resolving",
            ],
            Self::Import { .. } => vec![
                "Rebuild the package so export data is current",
                "Enable source mode ([suggest] source = true) to type-check from source",
            ],
        }
    }
}

/// Unexpected failure surfacing from the completion engine or a strategy
/// during a suggest call. Always caught by the suggester.
#[derive(Error, Debug)]
pub enum Fault {
    #[error("completion engine failed: {message}")]
    Engine { message: String },

    /// `backtrace` is captured where the panic was caught, after unwinding,
    /// so it shows the suggester frames rather than the panic site.
    #[error("completion engine panicked: {message}")]
    Panic { message: String, backtrace: String },
}

impl Fault {
    /// Build a fault from a `catch_unwind` payload
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panic {
            message,
            backtrace: std::backtrace::Backtrace::force_capture().to_string(),
        }
    }

    /// Diagnostic trace for the log line, empty for plain engine errors
    pub fn trace(&self) -> &str {
        match self {
            Self::Engine { .. } => "",
            Self::Panic { backtrace, .. } => backtrace,
        }
    }
}

/// Result type alias for resolution operations
pub type ResolutionResult<T> = Result<T, ResolutionError>;
