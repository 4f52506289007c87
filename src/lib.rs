//! Caching, context-aware package resolver for Go completion

pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod suggest;

// Explicit exports for better API clarity
pub use config::{BuildConfig, Settings, SuggestConfig};
pub use error::{Fault, ResolutionError, ResolutionResult};
pub use resolver::providers::GoBuildContext;
pub use resolver::{
    BasicPackage, BuildContext, CacheKey, ImportMode, ImportStrategy, Importer, LocatedPackage,
    Package, RequestImporter, ResolutionCache, StrategyFactory, StrategyKind, StrategyScope,
    ToolchainCapabilities, TypePackage,
};
pub use suggest::{
    Candidate, CandidateKind, CompletionEngine, EngineConfig, EngineError, SuggestOptions,
    Suggester,
};
