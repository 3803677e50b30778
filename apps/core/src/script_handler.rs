use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use walkdir::WalkDir;

use crate::handler::{find_option, CommandHandler, ExecuteError, ExecuteResult};
use crate::launcher::{is_directly_executable, LaunchTarget, Launcher};
use crate::model::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Script {
    name: String,
    path: PathBuf,
}

/// `script`: files directly inside the scripts folder, keyed by file stem.
pub struct ScriptHandler {
    dir: PathBuf,
    launcher: Arc<dyn Launcher>,
    scripts: OnceLock<Vec<Script>>,
}

impl ScriptHandler {
    pub fn new(dir: impl Into<PathBuf>, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            dir: dir.into(),
            launcher,
            scripts: OnceLock::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn scripts(&self) -> &[Script] {
        self.scripts.get_or_init(|| scan_scripts(&self.dir))
    }
}

fn scan_scripts(dir: &Path) -> Vec<Script> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "scripts folder missing");
        return Vec::new();
    }

    let mut seen = HashSet::new();
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.path().file_stem()?.to_str()?.to_string();
            seen.insert(name.to_lowercase()).then(|| Script {
                name,
                path: entry.into_path(),
            })
        })
        .collect()
}

impl CommandHandler for ScriptHandler {
    fn prefix(&self) -> &str {
        "script"
    }

    fn description(&self) -> &str {
        "user scripts"
    }

    fn options(&self) -> Vec<Entry> {
        self.scripts()
            .iter()
            .map(|script| Entry::bare(&script.name))
            .collect()
    }

    fn has_option(&self, key: &str) -> bool {
        find_option(self.scripts(), key, |script| script.name.as_str()).is_some()
    }

    fn execute(&self, key: &str) -> ExecuteResult {
        let Some(script) = find_option(self.scripts(), key, |script| script.name.as_str()) else {
            return Err(ExecuteError::NotFound {
                what: "script",
                key: key.trim().to_string(),
            });
        };

        let path = script.path.to_string_lossy();
        let target = if is_directly_executable(&script.path) {
            LaunchTarget::command(path, &[])
        } else {
            LaunchTarget::open(path)
        };
        self.launcher.launch(&target)?;
        Ok(())
    }
}
