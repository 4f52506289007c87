//! Resolved package type information
//!
//! Packages are produced by import strategies and shared by reference. Once a
//! package reports itself complete it is treated as immutable.

use std::fmt;
use std::sync::{Arc, LazyLock};

/// Import path of the language-level pseudo-package for low-level operations
pub const UNSAFE_PATH: &str = "unsafe";

/// Type information for one package, as produced by an import strategy
pub trait TypePackage: Send + Sync + fmt::Debug {
    /// Canonical import path
    fn path(&self) -> &str;

    /// Declared package name
    fn name(&self) -> &str;

    /// Whether every dependency of the package was fully loaded
    fn is_complete(&self) -> bool;

    /// Exported names in the package scope
    fn scope_names(&self) -> Vec<String>;
}

/// Shared handle to resolved type information
pub type Package = Arc<dyn TypePackage>;

/// Plain immutable package built from a fixed member list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicPackage {
    path: String,
    name: String,
    complete: bool,
    members: Vec<String>,
}

impl BasicPackage {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            complete: true,
            members: Vec::new(),
        }
    }

    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the package as partially loaded
    pub fn incomplete(mut self) -> Self {
        self.complete = false;
        self
    }

    pub fn into_package(self) -> Package {
        Arc::new(self)
    }
}

impl TypePackage for BasicPackage {
    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn scope_names(&self) -> Vec<String> {
        self.members.clone()
    }
}

static UNSAFE: LazyLock<Package> = LazyLock::new(|| {
    BasicPackage::new(UNSAFE_PATH, "unsafe")
        .with_members([
            "Add",
            "Alignof",
            "Offsetof",
            "Pointer",
            "Sizeof",
            "Slice",
            "SliceData",
            "String",
            "StringData",
        ])
        .into_package()
});

/// The built-in `unsafe` package. Every call returns the same handle.
pub fn unsafe_package() -> Package {
    Arc::clone(&UNSAFE)
}
