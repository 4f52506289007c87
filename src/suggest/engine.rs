//! Completion engine interface
//!
//! The engine computes candidates for a cursor position and calls back into
//! the supplied importer for every import it needs.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ResolutionError;
use crate::resolver::Importer;

/// Kind of a proposed completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Const,
    Func,
    Package,
    Type,
    Var,
    Field,
    Method,
    Label,
    Keyword,
    Builtin,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Const => "const",
            Self::Func => "func",
            Self::Package => "package",
            Self::Type => "type",
            Self::Var => "var",
            Self::Field => "field",
            Self::Method => "method",
            Self::Label => "label",
            Self::Keyword => "keyword",
            Self::Builtin => "builtin",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub kind: CandidateKind,
    /// Type signature, empty when the engine has none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, kind: CandidateKind, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: signature.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signature.is_empty() {
            write!(f, "{} {}", self.kind, self.name)
        } else {
            write!(f, "{} {} {}", self.kind, self.name, self.signature)
        }
    }
}

/// Error reported by a completion engine
#[derive(Error, Debug)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ResolutionError> for EngineError {
    fn from(e: ResolutionError) -> Self {
        Self::new(e.to_string())
    }
}

/// Per-call engine configuration
pub struct EngineConfig<'a> {
    /// Cache-backed importer for this request
    pub importer: &'a mut dyn Importer,
    /// Match identifiers case-insensitively
    pub ignore_case: bool,
    /// Propose builtin identifiers
    pub builtin: bool,
    /// Debug log sink, present only when debug logging is on
    pub logf: Option<&'a dyn Fn(&str)>,
}

impl EngineConfig<'_> {
    pub fn log(&self, line: &str) {
        if let Some(logf) = self.logf {
            logf(line);
        }
    }
}

/// Completion algorithm consumed by the suggester
pub trait CompletionEngine: Send + Sync {
    fn suggest(
        &self,
        config: &mut EngineConfig<'_>,
        filename: &Path,
        src: &[u8],
        offset: usize,
    ) -> Result<Vec<Candidate>, EngineError>;
}
