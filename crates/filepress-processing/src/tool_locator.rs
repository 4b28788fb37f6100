//! Ghostscript discovery.
//!
//! Lookup order: an explicitly configured path, then each known executable
//! name on the search path, then the conventional Windows install folders.
//! The first hit wins; there is no attempt to pick the newest version.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Executable names tried on the search path, in order.
pub const GHOSTSCRIPT_NAMES: &[&str] = &["gswin64c", "gswin32c", "gs"];

/// Versioned install folders scanned when nothing is on the search path.
pub const GHOSTSCRIPT_INSTALL_PATTERNS: &[&str] = &[
    r"C:\Program Files\gs\gs*\bin\gswin64c.exe",
    r"C:\Program Files\gs\gs*\bin\gswin32c.exe",
    r"C:\Program Files (x86)\gs\gs*\bin\gswin64c.exe",
    r"C:\Program Files (x86)\gs\gs*\bin\gswin32c.exe",
];

/// The external tool could not be found anywhere it is looked for.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "{tool} não encontrado. Para comprimir PDF, instale o {tool} (procure por {}) e garanta que ele esteja no PATH.",
    .candidates.join(", ")
)]
pub struct ToolNotFound {
    pub tool: String,
    pub candidates: Vec<String>,
}

/// Resolves the path of an external executable.
pub trait ToolLocator: Send + Sync {
    fn locate(&self) -> Result<PathBuf, ToolNotFound>;
}

#[derive(Debug, Clone)]
pub struct GhostscriptLocator {
    explicit_path: Option<PathBuf>,
    names: Vec<String>,
    /// Overrides `PATH`; `None` reads the process environment on every lookup.
    search_path: Option<OsString>,
    install_patterns: Vec<String>,
}

impl Default for GhostscriptLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostscriptLocator {
    pub fn new() -> Self {
        let install_patterns = if cfg!(windows) {
            GHOSTSCRIPT_INSTALL_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect()
        } else {
            Vec::new()
        };

        Self {
            explicit_path: None,
            names: GHOSTSCRIPT_NAMES.iter().map(|n| n.to_string()).collect(),
            search_path: None,
            install_patterns,
        }
    }

    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn with_install_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    fn find_on_search_path(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.clone().or_else(|| env::var_os("PATH"))?;
        env::split_paths(&search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| executable_candidates(&dir, name))
            .find(|candidate| is_executable(candidate))
    }

    fn find_in_install_dirs(&self) -> Option<PathBuf> {
        for pattern in &self.install_patterns {
            let paths = match glob::glob(pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Invalid install pattern");
                    continue;
                }
            };
            if let Some(found) = paths.filter_map(Result::ok).find(|p| p.is_file()) {
                return Some(found);
            }
        }
        None
    }
}

impl ToolLocator for GhostscriptLocator {
    fn locate(&self) -> Result<PathBuf, ToolNotFound> {
        if let Some(explicit) = &self.explicit_path {
            if explicit.is_file() {
                tracing::debug!(path = %explicit.display(), "Using configured Ghostscript path");
                return Ok(explicit.clone());
            }
            tracing::warn!(
                path = %explicit.display(),
                "Configured Ghostscript path does not exist, falling back to discovery"
            );
        }

        for name in &self.names {
            if let Some(found) = self.find_on_search_path(name) {
                tracing::debug!(name = %name, path = %found.display(), "Ghostscript found on PATH");
                return Ok(found);
            }
        }

        if let Some(found) = self.find_in_install_dirs() {
            tracing::debug!(path = %found.display(), "Ghostscript found in install directory");
            return Ok(found);
        }

        Err(ToolNotFound {
            tool: "Ghostscript".to_string(),
            candidates: self.names.clone(),
        })
    }
}

fn executable_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut candidates = vec![dir.join(name)];
    if cfg!(windows) && Path::new(name).extension().is_none() {
        candidates.push(dir.join(format!("{}.exe", name)));
    }
    candidates
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Remembers the last resolved path and only searches again once that path
/// disappears (e.g. the tool was uninstalled or upgraded in place).
pub struct CachedToolLocator<L> {
    inner: L,
    cached: RwLock<Option<PathBuf>>,
}

impl<L: ToolLocator> CachedToolLocator<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cached: RwLock::new(None),
        }
    }

    fn store(&self, path: Option<PathBuf>) {
        if let Ok(mut slot) = self.cached.write() {
            *slot = path;
        }
    }
}

impl<L: ToolLocator> ToolLocator for CachedToolLocator<L> {
    fn locate(&self) -> Result<PathBuf, ToolNotFound> {
        let cached = self.cached.read().ok().and_then(|slot| slot.clone());
        if let Some(path) = cached {
            if path.is_file() {
                return Ok(path);
            }
            tracing::info!(path = %path.display(), "Cached tool path vanished, searching again");
        }

        match self.inner.locate() {
            Ok(path) => {
                self.store(Some(path.clone()));
                Ok(path)
            }
            Err(e) => {
                self.store(None);
                Err(e)
            }
        }
    }
}
