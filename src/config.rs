//! Configuration module for the suggestion resolver.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `GS_` and use double underscores
//! to separate nested levels:
//! - `GS_SUGGEST__SOURCE=true` sets `suggest.source`
//! - `GS_SUGGEST__DEBUG=true` sets `suggest.debug`
//! - `GS_BUILD__GOOS=windows` sets `build.goos`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::suggest::SuggestOptions;

const CONFIG_DIR: &str = ".gosuggest";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .gosuggest is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode (log level)
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Completion and resolver options
    #[serde(default)]
    pub suggest: SuggestConfig,

    /// Build environment used to locate packages
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SuggestConfig {
    /// Propose builtin identifiers (len, append, ...)
    #[serde(default = "default_true")]
    pub propose_builtins: bool,

    /// Trace importer and engine activity
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Type-check imports from source instead of export data
    #[serde(default = "default_false")]
    pub source: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Toolchain root, falls back to $GOROOT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goroot: Option<PathBuf>,

    /// Workspace trees, falls back to $GOPATH then ~/go
    #[serde(default)]
    pub gopath: Vec<PathBuf>,

    /// Target OS, falls back to $GOOS then the host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goos: Option<String>,

    /// Target architecture, falls back to $GOARCH then the host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goarch: Option<String>,

    /// Extra tags satisfied by //go:build constraints
    #[serde(default)]
    pub build_tags: Vec<String>,

    #[serde(default = "default_true")]
    pub cgo_enabled: bool,

    /// Toolchain release (`1.N`) bounding `go1.N` tags, falls back to
    /// GOROOT/VERSION
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_version: Option<String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            debug: false,
            suggest: SuggestConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            propose_builtins: true,
            debug: false,
            source: false,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            goroot: None,
            gopath: Vec::new(),
            goos: None,
            goarch: None,
            build_tags: Vec::new(),
            cgo_enabled: true,
            go_version: None,
        }
    }
}

impl SuggestConfig {
    pub fn options(&self) -> SuggestOptions {
        SuggestOptions {
            propose_builtins: self.propose_builtins,
            debug: self.debug,
            source: self.source,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .gosuggest directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscore stays
            .merge(Env::prefixed("GS_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the workspace config by looking for a .gosuggest directory
    /// from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .gosuggest is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, Self::template())?;
        Ok(config_path)
    }

    fn template() -> String {
        format!(
            r#"# gosuggest configuration

# Version of the configuration schema
version = 1

# Global debug mode (debug-level logging)
debug = false

[suggest]
# Propose builtin identifiers such as len, append and make
propose_builtins = true

# Trace importer and completion engine activity
debug = false

# Type-check imports from source instead of reading compiled export data.
# Slower, but works without an installed package cache.
source = false

[build]
# Toolchain root. Defaults to $GOROOT.
# goroot = "/usr/local/go"

# Workspace trees. Defaults to $GOPATH, then ~/go.
gopath = []

# Target platform. Defaults to $GOOS/$GOARCH, then the host ({os}/{arch}).
# goos = "{os}"
# goarch = "{arch}"

# Extra tags satisfied by //go:build constraints
build_tags = []

cgo_enabled = true

# Newest release whose go1.N tags are satisfied. Defaults to GOROOT/VERSION.
# go_version = "1.{release}"
"#,
            os = crate::resolver::providers::host_goos(),
            arch = crate::resolver::providers::host_goarch(),
            release = crate::resolver::providers::DEFAULT_GO_RELEASE,
        )
    }
}
