//! Test doubles shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub use parking_lot::Mutex;

use gosuggest::{
    BasicPackage, BuildContext, Candidate, CandidateKind, CompletionEngine, EngineConfig,
    EngineError, ImportMode, ImportStrategy, LocatedPackage, Package, ResolutionError,
    ResolutionResult, StrategyFactory, StrategyKind, StrategyScope, ToolchainCapabilities,
};

// ============================================================================
// Build contexts
// ============================================================================

/// Build context with a fixed table of known packages
#[derive(Default)]
pub struct MapBuildContext {
    packages: HashMap<String, bool>,
    pub lookups: AtomicUsize,
}

impl MapBuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, path: &str) -> Self {
        self.packages.insert(path.to_string(), true);
        self
    }

    pub fn external(mut self, path: &str) -> Self {
        self.packages.insert(path.to_string(), false);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl BuildContext for MapBuildContext {
    fn locate(&self, import_path: &str, source_dir: &Path) -> ResolutionResult<LocatedPackage> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.packages.get(import_path) {
            Some(&is_root) => Ok(LocatedPackage {
                import_path: import_path.to_string(),
                dir: PathBuf::from("/src").join(import_path),
                is_root,
            }),
            None => Err(ResolutionError::NotFound {
                path: import_path.to_string(),
                source_dir: source_dir.to_path_buf(),
                searched: vec![PathBuf::from("/src")],
            }),
        }
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Call counters shared by every strategy a factory produces
#[derive(Default)]
pub struct Probe {
    pub calls: Mutex<HashMap<(StrategyKind, bool), usize>>,
    pub created: Mutex<Vec<(StrategyKind, bool)>>,
    pub active: AtomicBool,
    pub overlap: AtomicBool,
    pub hold: Mutex<Option<Duration>>,
    pub incomplete: Mutex<Vec<String>>,
}

impl Probe {
    /// Calls made by strategies of `kind`; `shared` selects the root strategy
    pub fn calls(&self, kind: StrategyKind, shared: bool) -> usize {
        self.calls.lock().get(&(kind, shared)).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn created(&self) -> Vec<(StrategyKind, bool)> {
        self.created.lock().clone()
    }
}

pub struct ProbeStrategy {
    kind: StrategyKind,
    shared: bool,
    probe: Arc<Probe>,
}

impl ImportStrategy for ProbeStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn import_from(
        &self,
        import_path: &str,
        _source_dir: &Path,
        _mode: ImportMode,
    ) -> ResolutionResult<Package> {
        if self.probe.active.swap(true, Ordering::SeqCst) {
            self.probe.overlap.store(true, Ordering::SeqCst);
        }
        if let Some(hold) = *self.probe.hold.lock() {
            std::thread::sleep(hold);
        }
        *self
            .probe
            .calls
            .lock()
            .entry((self.kind, self.shared))
            .or_default() += 1;
        self.probe.active.store(false, Ordering::SeqCst);

        if import_path.starts_with("broken/") {
            return Err(ResolutionError::import(
                import_path,
                ".",
                self.kind.as_str(),
                "corrupt export data",
            ));
        }

        let name = import_path.rsplit('/').next().unwrap_or(import_path);
        let pkg = BasicPackage::new(import_path, name)
            .with_members([format!("{name}Func"), format!("{name}Var")]);
        if self.probe.incomplete.lock().iter().any(|p| p == import_path) {
            Ok(pkg.incomplete().into_package())
        } else {
            Ok(pkg.into_package())
        }
    }
}

pub struct ProbeFactory {
    pub caps: ToolchainCapabilities,
    pub probe: Arc<Probe>,
}

impl ProbeFactory {
    pub fn new(export_data: bool) -> Self {
        Self {
            caps: ToolchainCapabilities { export_data },
            probe: Arc::new(Probe::default()),
        }
    }
}

impl StrategyFactory for ProbeFactory {
    fn capabilities(&self) -> ToolchainCapabilities {
        self.caps
    }

    fn create(&self, kind: StrategyKind, scope: StrategyScope) -> Box<dyn ImportStrategy> {
        let shared = scope.is_shared();
        self.probe.created.lock().push((kind, shared));
        Box::new(ProbeStrategy {
            kind,
            shared,
            probe: Arc::clone(&self.probe),
        })
    }
}

// ============================================================================
// Engines
// ============================================================================

/// Line-driven engine: `import <path>` resolves a package and proposes its
/// members, `panic` panics, `fail` returns an error.
#[derive(Default)]
pub struct ScriptEngine {
    pub calls: AtomicUsize,
    pub saw_debug_logger: AtomicBool,
}

impl CompletionEngine for ScriptEngine {
    fn suggest(
        &self,
        config: &mut EngineConfig<'_>,
        filename: &Path,
        src: &[u8],
        _offset: usize,
    ) -> Result<Vec<Candidate>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saw_debug_logger
            .store(config.logf.is_some(), Ordering::SeqCst);
        assert!(config.ignore_case);

        let dir = filename.parent().unwrap_or(Path::new("."));
        let text = String::from_utf8_lossy(src);
        let mut out = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line == "panic" {
                panic!("engine exploded");
            }
            if line == "fail" {
                return Err(EngineError::new("syntax error"));
            }
            if let Some(path) = line.strip_prefix("import ") {
                // Import failures are tolerated, like a real engine would
                match config.importer.import_from(path, dir, ImportMode::default()) {
                    Ok(pkg) => {
                        config.log(&format!("imported {path}"));
                        for name in pkg.scope_names() {
                            out.push(Candidate::new(name, CandidateKind::Func, "func()"));
                        }
                    }
                    Err(e) => config.log(&format!("import {path}: {e}")),
                }
            }
        }
        if config.builtin {
            out.push(Candidate::new("len", CandidateKind::Builtin, "func(v Type) int"));
        }
        Ok(out)
    }
}
