//! Build context implementations
//!
//! Each implements the `BuildContext` trait to classify and locate import
//! paths for one build environment.

pub mod constraint;
pub mod go;

pub use constraint::BuildConstraint;
pub use go::{DEFAULT_GO_RELEASE, GoBuildContext, host_goarch, host_goos};
