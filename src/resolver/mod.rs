//! Package import resolver with a root-package cache
//!
//! Resolves import paths to type information for the completion engine.
//! Root (standard distribution) packages are identical for every request in a
//! process, so complete ones are cached by `(import path, source dir)`.
//! Everything else depends on the request's build environment and is resolved
//! afresh by a request-scoped strategy.
//!
//! - `provider`: collaborator traits (`BuildContext`, `ImportStrategy`, `StrategyFactory`)
//! - `strategy`: strategy selection from options and toolchain capabilities
//! - `importer`: the per-request importer enforcing the caching policy
//! - `providers`: filesystem build context over GOROOT/GOPATH

pub mod cache;
pub mod importer;
pub mod package;
pub mod provider;
pub mod providers;
pub mod strategy;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use cache::ResolutionCache;
pub use importer::{Importer, RequestImporter};
pub use package::{BasicPackage, Package, TypePackage, UNSAFE_PATH, unsafe_package};
pub use provider::{BuildContext, ImportStrategy, StrategyFactory};
pub use strategy::{StrategyKind, StrategyScope, ToolchainCapabilities};

/// Identifies one resolution context for a package
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub import_path: String,
    pub source_dir: PathBuf,
}

impl CacheKey {
    pub fn new(import_path: impl Into<String>, source_dir: impl AsRef<Path>) -> Self {
        Self {
            import_path: import_path.into(),
            source_dir: source_dir.as_ref().to_path_buf(),
        }
    }
}

/// Import mode flags, passed through to strategies untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportMode(pub u32);

/// Result of classifying an import path against a build context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedPackage {
    /// Canonical import path (e.g. `vendor/golang.org/x/net/http2` for a GOROOT-vendored package)
    pub import_path: String,
    /// Directory holding the package sources
    pub dir: PathBuf,
    /// Belongs to the toolchain's root distribution
    pub is_root: bool,
}
