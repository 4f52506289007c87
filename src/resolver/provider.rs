//! Collaborator traits for package discovery and type loading

use std::path::Path;

use super::package::Package;
use super::strategy::{StrategyKind, StrategyScope, ToolchainCapabilities};
use super::{ImportMode, LocatedPackage};
use crate::error::ResolutionResult;

/// Build environment for one request.
///
/// Decides where an import path lives and whether it belongs to the
/// toolchain's root distribution. Must be deterministic for a fixed
/// environment.
pub trait BuildContext: Send + Sync {
    /// Classify and locate `import_path` as seen from `source_dir`
    fn locate(&self, import_path: &str, source_dir: &Path) -> ResolutionResult<LocatedPackage>;
}

/// One way of turning an import path into type information
/// (compiled export data, source type-checking, or the toolchain default).
pub trait ImportStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn import_from(
        &self,
        import_path: &str,
        source_dir: &Path,
        mode: ImportMode,
    ) -> ResolutionResult<Package>;
}

/// Builds strategy instances and reports what the host toolchain supports
pub trait StrategyFactory: Send + Sync {
    /// Capability query, asked once per (re)initialization
    fn capabilities(&self) -> ToolchainCapabilities;

    /// Produce exactly one fresh strategy of `kind`
    fn create(&self, kind: StrategyKind, scope: StrategyScope) -> Box<dyn ImportStrategy>;
}
