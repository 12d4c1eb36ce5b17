//! Module resolution for `import`.
//!
//! An import path is tried as given first, then against each registered
//! search path in order, appending the `.ghost` suffix when absent.
//! Loaded modules are cached per resolved path; a path re-entered while
//! still loading is a cycle.

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use super::value::Value;

/// Conventional source suffix for Ghost files.
pub const SOURCE_SUFFIX: &str = ".ghost";

/// Search paths plus the module cache and cycle guard.
#[derive(Default)]
pub struct ModuleLoader {
    search_paths: RefCell<Vec<PathBuf>>,
    cache: RefCell<FxHashMap<PathBuf, Value>>,
    loading: RefCell<FxHashSet<PathBuf>>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search path.
    pub fn add_search_path(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!(path = %path.display(), "search path registered");
        self.search_paths.borrow_mut().push(path);
    }

    /// Resolve an import path to a readable file.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let with_suffix = if path.ends_with(SOURCE_SUFFIX) {
            path.to_string()
        } else {
            format!("{}{}", path, SOURCE_SUFFIX)
        };

        let direct = PathBuf::from(&with_suffix);
        if direct.is_file() {
            return canonical(&direct);
        }

        for base in self.search_paths.borrow().iter() {
            let candidate = base.join(&with_suffix);
            if candidate.is_file() {
                tracing::debug!(
                    path,
                    resolved = %candidate.display(),
                    "import resolved via search path"
                );
                return canonical(&candidate);
            }
        }

        None
    }

    /// Look up a previously loaded module.
    pub fn cached(&self, path: &Path) -> Option<Value> {
        self.cache.borrow().get(path).cloned()
    }

    /// Store a loaded module.
    pub fn store(&self, path: PathBuf, module: Value) {
        self.cache.borrow_mut().insert(path, module);
    }

    /// Mark a path as in-flight. Returns false when the path is already
    /// loading, which means the import chain has a cycle.
    pub fn begin_loading(&self, path: &Path) -> bool {
        self.loading.borrow_mut().insert(path.to_path_buf())
    }

    pub fn finish_loading(&self, path: &Path) {
        self.loading.borrow_mut().remove(path);
    }
}

fn canonical(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_path() {
        let loader = ModuleLoader::new();
        assert!(loader.resolve("definitely/not/a/module").is_none());
    }

    #[test]
    fn test_cycle_guard() {
        let loader = ModuleLoader::new();
        let path = PathBuf::from("a.ghost");
        assert!(loader.begin_loading(&path));
        assert!(!loader.begin_loading(&path));
        loader.finish_loading(&path);
        assert!(loader.begin_loading(&path));
    }
}
