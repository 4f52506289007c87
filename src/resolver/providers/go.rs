//! Filesystem build context over GOROOT and GOPATH
//!
//! Classifies import paths the way the Go toolchain's GOPATH mode does:
//! vendor directories first (walking up from the importing directory), then
//! `GOROOT/src`, then each `GOPATH` entry. Only directories with at least one
//! file that builds for the configured target count as packages.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::constraint::BuildConstraint;
use crate::config::BuildConfig;
use crate::error::{ResolutionError, ResolutionResult};
use crate::resolver::LocatedPackage;
use crate::resolver::provider::BuildContext;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

/// Go 1.N release assumed when neither settings nor `GOROOT/VERSION` say
pub const DEFAULT_GO_RELEASE: u32 = 25;

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// GOOS name for the host
pub fn host_goos() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// GOARCH name for the host
pub fn host_goarch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Build context backed by on-disk GOROOT/GOPATH trees
#[derive(Debug, Clone)]
pub struct GoBuildContext {
    goroot: Option<PathBuf>,
    gopath: Vec<PathBuf>,
    goos: String,
    goarch: String,
    build_tags: Vec<String>,
    cgo_enabled: bool,
    release: u32,
}

impl GoBuildContext {
    /// Context for the host OS/arch with the given roots
    pub fn new(goroot: Option<PathBuf>, gopath: Vec<PathBuf>) -> Self {
        Self {
            goroot,
            gopath,
            goos: host_goos().to_string(),
            goarch: host_goarch().to_string(),
            build_tags: Vec::new(),
            cgo_enabled: true,
            release: DEFAULT_GO_RELEASE,
        }
    }

    /// Build from settings, falling back to `GOROOT`/`GOPATH`/`GOOS`/`GOARCH`
    /// from the environment and then to the host defaults.
    pub fn from_config(config: &BuildConfig) -> Self {
        let goroot = config
            .goroot
            .clone()
            .or_else(|| std::env::var_os("GOROOT").map(PathBuf::from));

        let gopath = if !config.gopath.is_empty() {
            config.gopath.clone()
        } else if let Some(var) = std::env::var_os("GOPATH") {
            std::env::split_paths(&var)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        } else {
            dirs::home_dir()
                .map(|home| vec![home.join("go")])
                .unwrap_or_default()
        };

        let goos = config
            .goos
            .clone()
            .or_else(|| std::env::var("GOOS").ok())
            .unwrap_or_else(|| host_goos().to_string());
        let goarch = config
            .goarch
            .clone()
            .or_else(|| std::env::var("GOARCH").ok())
            .unwrap_or_else(|| host_goarch().to_string());

        let release = config
            .go_version
            .as_deref()
            .and_then(parse_release)
            .or_else(|| goroot.as_deref().and_then(toolchain_release))
            .unwrap_or(DEFAULT_GO_RELEASE);

        Self {
            goroot,
            gopath,
            goos,
            goarch,
            build_tags: config.build_tags.clone(),
            cgo_enabled: config.cgo_enabled,
            release,
        }
    }

    pub fn with_target(mut self, goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        self.goos = goos.into();
        self.goarch = goarch.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cgo(mut self, enabled: bool) -> Self {
        self.cgo_enabled = enabled;
        self
    }

    /// Satisfy release tags `go1.1` through `go1.{minor}`
    pub fn with_go_release(mut self, minor: u32) -> Self {
        self.release = minor;
        self
    }

    pub fn go_release(&self) -> u32 {
        self.release
    }

    pub fn goroot(&self) -> Option<&Path> {
        self.goroot.as_deref()
    }

    pub fn gopath(&self) -> &[PathBuf] {
        &self.gopath
    }

    pub fn goos(&self) -> &str {
        &self.goos
    }

    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    fn goroot_src(&self) -> Option<PathBuf> {
        self.goroot.as_ref().map(|root| root.join("src"))
    }

    /// Source trees in search order, each flagged as root or not
    fn trees(&self) -> Vec<(PathBuf, bool)> {
        let mut trees = Vec::with_capacity(self.gopath.len() + 1);
        if let Some(src) = self.goroot_src() {
            trees.push((src, true));
        }
        for path in &self.gopath {
            // GOPATH entries equal to GOROOT are ignored, as the toolchain does
            if self.goroot.as_deref() == Some(path.as_path()) {
                continue;
            }
            trees.push((path.join("src"), false));
        }
        trees
    }

    fn matches_os(&self, name: &str) -> bool {
        name == self.goos
            || (name == "linux" && self.goos == "android")
            || (name == "solaris" && self.goos == "illumos")
            || (name == "darwin" && self.goos == "ios")
    }

    /// Whether a constraint tag holds for this context
    pub fn tag_satisfied(&self, tag: &str) -> bool {
        if self.matches_os(tag) || tag == self.goarch || tag == "gc" {
            return true;
        }
        if tag == "unix" {
            return UNIX_OS.contains(&self.goos.as_str());
        }
        if tag == "cgo" {
            return self.cgo_enabled;
        }
        if let Some(minor) = tag.strip_prefix("go1.") {
            return minor
                .parse::<u32>()
                .is_ok_and(|minor| (1..=self.release).contains(&minor));
        }
        self.build_tags.iter().any(|t| t == tag)
    }

    /// Filename-level check: extension, test/ignored prefixes, and
    /// `_GOOS`/`_GOARCH` suffixes.
    pub fn is_buildable_name(&self, name: &str) -> bool {
        let Some(stem) = name.strip_suffix(".go") else {
            return false;
        };
        if stem.is_empty() || stem.starts_with(['_', '.']) || stem.ends_with("_test") {
            return false;
        }
        let Some(idx) = stem.find('_') else {
            return true;
        };
        let parts: Vec<&str> = stem[idx + 1..].split('_').collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_os(parts[n - 2]) && parts[n - 1] == self.goarch;
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) {
            return self.matches_os(last);
        }
        if KNOWN_ARCH.contains(&last) {
            return last == self.goarch;
        }
        true
    }

    fn is_buildable_file(&self, path: &Path) -> ResolutionResult<bool> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !self.is_buildable_name(name) {
            return Ok(false);
        }
        let src =
            std::fs::read_to_string(path).map_err(|e| ResolutionError::io(path.to_path_buf(), e))?;
        match BuildConstraint::from_source(&src) {
            Ok(Some(constraint)) => Ok(constraint.eval(&|tag| self.tag_satisfied(tag))),
            Ok(None) => Ok(true),
            Err(reason) => {
                debug!("skipping {}: {reason}", path.display());
                Ok(false)
            }
        }
    }

    fn has_buildable_files(&self, dir: &Path) -> ResolutionResult<bool> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| ResolutionError::io(dir.to_path_buf(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ResolutionError::io(dir.to_path_buf(), e))?;
            let path = entry.path();
            if path.is_file() && self.is_buildable_file(&path)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn located(
        &self,
        requested: &str,
        import_path: String,
        dir: PathBuf,
        is_root: bool,
    ) -> ResolutionResult<LocatedPackage> {
        if !self.has_buildable_files(&dir)? {
            return Err(ResolutionError::NoBuildableFiles {
                path: requested.to_string(),
                dir,
            });
        }
        Ok(LocatedPackage {
            import_path,
            dir,
            is_root,
        })
    }

    fn locate_local(&self, import_path: &str, source_dir: &Path) -> ResolutionResult<LocatedPackage> {
        let dir = normalize(&source_dir.join(import_path));
        if !dir.is_dir() {
            return Err(ResolutionError::NotFound {
                path: import_path.to_string(),
                source_dir: source_dir.to_path_buf(),
                searched: vec![dir],
            });
        }
        for (tree, is_root) in self.trees() {
            if let Ok(rel) = dir.strip_prefix(&tree) {
                let canonical = slash_path(rel);
                return self.located(import_path, canonical, dir, is_root);
            }
        }
        self.located(import_path, import_path.to_string(), dir, false)
    }

    /// Vendor directories between `source_dir` and the tree containing it,
    /// innermost first.
    fn locate_vendored(
        &self,
        import_path: &str,
        source_dir: &Path,
    ) -> ResolutionResult<Option<LocatedPackage>> {
        for (tree, is_root) in self.trees() {
            let Ok(rel) = source_dir.strip_prefix(&tree) else {
                continue;
            };
            let mut sub = Some(rel);
            while let Some(current) = sub {
                let candidate = tree.join(current).join("vendor").join(import_path);
                if candidate.is_dir() {
                    let prefix = slash_path(current);
                    let canonical = if prefix.is_empty() {
                        format!("vendor/{import_path}")
                    } else {
                        format!("{prefix}/vendor/{import_path}")
                    };
                    return self
                        .located(import_path, canonical, candidate, is_root)
                        .map(Some);
                }
                sub = current.parent();
            }
            return Ok(None);
        }
        Ok(None)
    }
}

impl BuildContext for GoBuildContext {
    fn locate(&self, import_path: &str, source_dir: &Path) -> ResolutionResult<LocatedPackage> {
        validate_import_path(import_path)?;

        if is_local(import_path) {
            return self.locate_local(import_path, source_dir);
        }

        if let Some(found) = self.locate_vendored(import_path, source_dir)? {
            return Ok(found);
        }

        let mut searched = Vec::new();
        for (tree, is_root) in self.trees() {
            let dir = tree.join(import_path);
            if dir.is_dir() {
                return self.located(import_path, import_path.to_string(), dir, is_root);
            }
            searched.push(dir);
        }

        Err(ResolutionError::NotFound {
            path: import_path.to_string(),
            source_dir: source_dir.to_path_buf(),
            searched,
        })
    }
}

fn is_local(import_path: &str) -> bool {
    import_path == "."
        || import_path == ".."
        || import_path.starts_with("./")
        || import_path.starts_with("../")
}

fn validate_import_path(import_path: &str) -> ResolutionResult<()> {
    if import_path.is_empty() {
        return Err(ResolutionError::invalid_path(import_path, "empty import path"));
    }
    if import_path == "C" {
        return Err(ResolutionError::invalid_path(
            import_path,
            "cgo pseudo-package has no source directory",
        ));
    }
    if let Some(bad) = import_path
        .chars()
        .find(|c| *c == '\\' || *c == '\0' || c.is_control())
    {
        return Err(ResolutionError::invalid_path(
            import_path,
            format!("invalid character {bad:?}"),
        ));
    }
    if import_path.starts_with('/') {
        return Err(ResolutionError::invalid_path(
            import_path,
            "absolute import paths are not allowed",
        ));
    }
    if !is_local(import_path) {
        for elem in import_path.split('/') {
            if elem.is_empty() || elem == "." || elem == ".." {
                return Err(ResolutionError::invalid_path(
                    import_path,
                    format!("invalid path element {elem:?}"),
                ));
            }
        }
    }
    Ok(())
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Minor release of a `go1.N[.P]` or `1.N` version string
fn parse_release(version: &str) -> Option<u32> {
    let version = version.trim();
    let rest = version.strip_prefix("go").unwrap_or(version).strip_prefix("1.")?;
    let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..digits].parse().ok()
}

/// Release recorded in the first line of `GOROOT/VERSION`
fn toolchain_release(goroot: &Path) -> Option<u32> {
    let version = std::fs::read_to_string(goroot.join("VERSION")).ok()?;
    parse_release(version.lines().next()?)
}
