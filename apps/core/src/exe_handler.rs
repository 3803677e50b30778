use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use walkdir::WalkDir;

use crate::handler::{find_option, CommandHandler, ExecuteError, ExecuteResult};
use crate::launcher::{is_directly_executable, LaunchTarget, Launcher};
use crate::model::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Executable {
    name: String,
    path: PathBuf,
}

/// `exe`: programs found on the search path, scanned once per process.
pub struct ExeHandler {
    search_path: Option<OsString>,
    launcher: Arc<dyn Launcher>,
    executables: OnceLock<Vec<Executable>>,
}

impl ExeHandler {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self::with_search_path(std::env::var_os("PATH"), launcher)
    }

    pub fn with_search_path(search_path: Option<OsString>, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            search_path,
            launcher,
            executables: OnceLock::new(),
        }
    }

    fn executables(&self) -> &[Executable] {
        self.executables.get_or_init(|| {
            let found = scan_search_path(self.search_path.as_deref());
            tracing::debug!(count = found.len(), "search path scanned");
            found
        })
    }
}

impl CommandHandler for ExeHandler {
    fn prefix(&self) -> &str {
        "exe"
    }

    fn description(&self) -> &str {
        "executables on PATH"
    }

    fn options(&self) -> Vec<Entry> {
        self.executables()
            .iter()
            .map(|executable| Entry::bare(&executable.name))
            .collect()
    }

    fn has_option(&self, key: &str) -> bool {
        find_option(self.executables(), key, |e| e.name.as_str()).is_some()
    }

    fn execute(&self, key: &str) -> ExecuteResult {
        let Some(executable) = find_option(self.executables(), key, |e| e.name.as_str()) else {
            return Err(ExecuteError::NotFound {
                what: "executable",
                key: key.trim().to_string(),
            });
        };

        let program = executable.path.to_string_lossy();
        self.launcher.launch(&LaunchTarget::command(program, &[]))?;
        Ok(())
    }
}

/// First directory on the path wins when two share a name ignoring case.
fn scan_search_path(search_path: Option<&OsStr>) -> Vec<Executable> {
    let Some(search_path) = search_path else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for dir in std::env::split_paths(search_path) {
        if !dir.is_dir() {
            continue;
        }

        let entries = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| is_directly_executable(path));

        for path in entries {
            let Some(name) = executable_name(&path) else {
                continue;
            };
            if seen.insert(name.to_lowercase()) {
                found.push(Executable { name, path });
            }
        }
    }
    found
}

#[cfg(target_os = "windows")]
fn executable_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

#[cfg(not(target_os = "windows"))]
fn executable_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
