//! Import strategy selection

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::provider::BuildContext;
use crate::suggest::SuggestOptions;

/// How type information is obtained for a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Parse and type-check the package sources
    Source,
    /// Read precompiled export data
    ExportData,
    /// Whatever the toolchain provides by default
    Default,
}

impl StrategyKind {
    /// First match wins: forced source mode, then export data when the
    /// toolchain can read it, then the default strategy.
    pub fn select(options: &SuggestOptions, caps: &ToolchainCapabilities) -> Self {
        if options.source {
            Self::Source
        } else if caps.export_data {
            Self::ExportData
        } else {
            Self::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::ExportData => "export-data",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host toolchain can do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolchainCapabilities {
    /// Precompiled export data can be read without re-checking sources
    pub export_data: bool,
}

/// Lifetime a strategy instance is created for
#[derive(Clone)]
pub enum StrategyScope {
    /// Owned by the resolver and reused across requests for root packages
    Shared,
    /// Bound to one request's build environment
    Request(Arc<dyn BuildContext>),
}

impl StrategyScope {
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }

    pub fn build_context(&self) -> Option<&Arc<dyn BuildContext>> {
        match self {
            Self::Shared => None,
            Self::Request(ctx) => Some(ctx),
        }
    }
}

impl fmt::Debug for StrategyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => f.write_str("Shared"),
            Self::Request(_) => f.write_str("Request(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(source: bool) -> SuggestOptions {
        SuggestOptions {
            source,
            ..SuggestOptions::default()
        }
    }

    #[test]
    fn source_mode_wins_over_export_data() {
        let caps = ToolchainCapabilities { export_data: true };
        assert_eq!(StrategyKind::select(&options(true), &caps), StrategyKind::Source);
    }

    #[test]
    fn export_data_when_supported() {
        let caps = ToolchainCapabilities { export_data: true };
        assert_eq!(
            StrategyKind::select(&options(false), &caps),
            StrategyKind::ExportData
        );
    }

    #[test]
    fn default_fallback() {
        let caps = ToolchainCapabilities::default();
        assert_eq!(
            StrategyKind::select(&options(false), &caps),
            StrategyKind::Default
        );
        assert_eq!(StrategyKind::Default.to_string(), "default");
    }
}
