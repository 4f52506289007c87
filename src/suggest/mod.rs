//! Completion adapter over the package resolver
//!
//! `Suggester` serves one completion request at a time. It owns the shared
//! resolution cache and the shared root-package strategy, builds a
//! request-scoped importer for every call and contains any failure raised by
//! the completion engine.

pub mod engine;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Fault;
use crate::resolver::{
    BuildContext, ImportStrategy, RequestImporter, ResolutionCache, StrategyFactory, StrategyKind,
    StrategyScope,
};

pub use engine::{Candidate, CandidateKind, CompletionEngine, EngineConfig, EngineError};

/// Resolver options, fixed until the next `reconfigure`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestOptions {
    /// Propose builtin identifiers
    pub propose_builtins: bool,
    /// Emit debug traces from the importer and the engine
    pub debug: bool,
    /// Type-check from source instead of reading export data
    pub source: bool,
}

/// State shared by all requests, only touched under the suggester lock
struct SharedState {
    options: SuggestOptions,
    kind: StrategyKind,
    cache: ResolutionCache,
    root: Box<dyn ImportStrategy>,
}

impl SharedState {
    fn new(options: SuggestOptions, factory: &dyn StrategyFactory, cache: ResolutionCache) -> Self {
        let kind = StrategyKind::select(&options, &factory.capabilities());
        Self {
            options,
            kind,
            cache,
            root: factory.create(kind, StrategyScope::Shared),
        }
    }
}

/// Cache-backed completion adapter.
///
/// A single lock is held for the whole of `suggest`, so at most one request
/// runs the engine and the resolution machinery at a time.
pub struct Suggester {
    factory: Arc<dyn StrategyFactory>,
    engine: Arc<dyn CompletionEngine>,
    state: Mutex<SharedState>,
}

impl Suggester {
    pub fn new(
        options: SuggestOptions,
        factory: Arc<dyn StrategyFactory>,
        engine: Arc<dyn CompletionEngine>,
    ) -> Self {
        Self::with_cache(options, factory, engine, ResolutionCache::new())
    }

    /// Build around an existing cache
    pub fn with_cache(
        options: SuggestOptions,
        factory: Arc<dyn StrategyFactory>,
        engine: Arc<dyn CompletionEngine>,
        cache: ResolutionCache,
    ) -> Self {
        let state = SharedState::new(options, factory.as_ref(), cache);
        Self {
            factory,
            engine,
            state: Mutex::new(state),
        }
    }

    pub fn options(&self) -> SuggestOptions {
        self.state.lock().options
    }

    /// Strategy kind chosen at the last (re)initialization
    pub fn strategy_kind(&self) -> StrategyKind {
        self.state.lock().kind
    }

    /// Number of root packages currently cached
    pub fn cached_packages(&self) -> usize {
        self.state.lock().cache.len()
    }

    /// Apply new options: drops every cached package and rebuilds the shared
    /// root strategy.
    pub fn reconfigure(&self, options: SuggestOptions) {
        let mut state = self.state.lock();
        self.reinitialize(&mut state, options);
    }

    /// Reinitialize with the current options
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let options = state.options;
        self.reinitialize(&mut state, options);
    }

    fn reinitialize(&self, state: &mut SharedState, options: SuggestOptions) {
        *state = SharedState::new(options, self.factory.as_ref(), ResolutionCache::new());
        debug!("suggester reconfigured: {options:?}, strategy {}", state.kind);
    }

    /// Compute completions for `offset` in `src`.
    ///
    /// Never fails: engine errors and panics are logged and turned into an
    /// empty list.
    pub fn suggest(
        &self,
        build: Arc<dyn BuildContext>,
        filename: &Path,
        src: &[u8],
        offset: usize,
    ) -> Vec<Candidate> {
        if src.is_empty() {
            return Vec::new();
        }

        let mut state = self.state.lock();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.candidates(&mut state, build, filename, src, offset)
        }))
        .unwrap_or_else(|payload| Err(Fault::from_panic(payload)));

        match result {
            Ok(candidates) => candidates,
            Err(fault) => {
                warn!(
                    "gocode/suggest fault in {}: {fault}\n{}",
                    filename.display(),
                    fault.trace()
                );
                Vec::new()
            }
        }
    }

    fn candidates(
        &self,
        state: &mut SharedState,
        build: Arc<dyn BuildContext>,
        filename: &Path,
        src: &[u8],
        offset: usize,
    ) -> Result<Vec<Candidate>, Fault> {
        let SharedState {
            options,
            kind,
            cache,
            root,
        } = state;

        let strategy = self
            .factory
            .create(*kind, StrategyScope::Request(Arc::clone(&build)));
        let mut importer =
            RequestImporter::new(cache, &**root, build, strategy, options.debug);

        let logf = |line: &str| debug!("gocode: {line}");
        let mut config = EngineConfig {
            importer: &mut importer,
            ignore_case: true,
            builtin: options.propose_builtins,
            logf: options.debug.then_some(&logf as &dyn Fn(&str)),
        };

        let candidates = self
            .engine
            .suggest(&mut config, filename, src, offset)
            .map_err(|e| Fault::Engine { message: e.message })?;

        if options.debug {
            debug!(
                "gocode: {} candidates for {}:{offset}",
                candidates.len(),
                filename.display()
            );
        }
        Ok(candidates)
    }
}
