//! Request-scoped importer backed by the shared resolution cache

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::cache::ResolutionCache;
use super::package::{Package, UNSAFE_PATH, unsafe_package};
use super::provider::{BuildContext, ImportStrategy};
use super::{CacheKey, ImportMode};
use crate::error::{ResolutionError, ResolutionResult};

/// Import callback interface handed to completion engines
pub trait Importer {
    /// Resolve `import_path` relative to the current directory
    fn import(&mut self, import_path: &str) -> ResolutionResult<Package> {
        self.import_from(import_path, Path::new("."), ImportMode::default())
    }

    fn import_from(
        &mut self,
        import_path: &str,
        source_dir: &Path,
        mode: ImportMode,
    ) -> ResolutionResult<Package>;
}

/// Importer for a single completion request.
///
/// Borrows the shared cache and root strategy for the duration of the request,
/// so it cannot outlive the lock that guards them. Owns the request's build
/// context and a strategy created for it.
pub struct RequestImporter<'a> {
    cache: &'a mut ResolutionCache,
    root: &'a dyn ImportStrategy,
    build: Arc<dyn BuildContext>,
    strategy: Box<dyn ImportStrategy>,
    debug: bool,
}

impl<'a> RequestImporter<'a> {
    pub fn new(
        cache: &'a mut ResolutionCache,
        root: &'a dyn ImportStrategy,
        build: Arc<dyn BuildContext>,
        strategy: Box<dyn ImportStrategy>,
        debug: bool,
    ) -> Self {
        Self {
            cache,
            root,
            build,
            strategy,
            debug,
        }
    }

    /// Number of packages currently cached
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl Importer for RequestImporter<'_> {
    fn import_from(
        &mut self,
        import_path: &str,
        source_dir: &Path,
        mode: ImportMode,
    ) -> ResolutionResult<Package> {
        if import_path.is_empty() {
            return Err(ResolutionError::invalid_path(import_path, "empty import path"));
        }

        let key = CacheKey::new(import_path, source_dir);
        if let Some(pkg) = self.cache.get(&key) {
            return Ok(pkg);
        }

        // Language-level singleton: no classification, no strategy, no cache.
        if import_path == UNSAFE_PATH {
            return Ok(unsafe_package());
        }

        let located = match self.build.locate(import_path, source_dir) {
            Ok(located) => located,
            Err(e) => {
                if self.debug {
                    debug!("gocode: locate({import_path:?}, {source_dir:?}): {e}");
                }
                return Err(e);
            }
        };

        if located.is_root && located.import_path == UNSAFE_PATH {
            return Ok(unsafe_package());
        }

        let strategy: &dyn ImportStrategy = if located.is_root {
            self.root
        } else {
            self.strategy.as_ref()
        };

        match strategy.import_from(import_path, source_dir, mode) {
            Ok(pkg) => {
                if located.is_root && pkg.is_complete() {
                    return Ok(self.cache.insert(key, pkg));
                }
                Ok(pkg)
            }
            Err(e) => {
                if self.debug {
                    debug!(
                        "gocode: {}.import_from({import_path:?}, {source_dir:?}): {e}",
                        strategy.kind()
                    );
                }
                Err(e)
            }
        }
    }
}
