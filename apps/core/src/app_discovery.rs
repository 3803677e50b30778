use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::launcher::LaunchTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    pub name: String,
    pub target: LaunchTarget,
}

impl InstalledApp {
    pub fn new(name: impl Into<String>, target: LaunchTarget) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Platform-specific enumeration of installed applications.
pub trait AppSource: Send + Sync {
    fn source_name(&self) -> &'static str;
    fn discover(&self) -> Result<Vec<InstalledApp>, SourceError>;
}

pub struct StaticAppSource {
    apps: Vec<InstalledApp>,
}

impl StaticAppSource {
    pub fn from_apps(apps: Vec<InstalledApp>) -> Self {
        Self { apps }
    }
}

impl AppSource for StaticAppSource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    fn discover(&self) -> Result<Vec<InstalledApp>, SourceError> {
        Ok(self.apps.clone())
    }
}

/// Start Menu `.lnk` shortcuts. The shell resolves the link when opened.
pub struct StartMenuSource {
    roots: Vec<PathBuf>,
}

impl StartMenuSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if let Some(data) = dirs::data_dir() {
            roots.push(data.join("Microsoft\\Windows\\Start Menu\\Programs"));
        }
        if let Some(program_data) = std::env::var_os("ProgramData") {
            roots.push(PathBuf::from(program_data).join("Microsoft\\Windows\\Start Menu\\Programs"));
        }
        roots
    }
}

impl AppSource for StartMenuSource {
    fn source_name(&self) -> &'static str {
        "start_menu"
    }

    fn discover(&self) -> Result<Vec<InstalledApp>, SourceError> {
        require_roots(&self.roots)?;
        Ok(collect_files(&self.roots, usize::MAX, "lnk")
            .into_iter()
            .filter_map(|path| {
                let name = file_stem(&path)?;
                Some(InstalledApp::new(name, LaunchTarget::open(path.to_string_lossy())))
            })
            .collect())
    }
}

/// XDG `.desktop` entries of type `Application`.
pub struct DesktopEntrySource {
    roots: Vec<PathBuf>,
}

impl DesktopEntrySource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if let Some(data) = dirs::data_dir() {
            roots.push(data.join("applications"));
        }
        let system_dirs = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
        roots.extend(
            system_dirs
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(|dir| Path::new(dir).join("applications")),
        );
        roots
    }
}

impl AppSource for DesktopEntrySource {
    fn source_name(&self) -> &'static str {
        "desktop_entries"
    }

    fn discover(&self) -> Result<Vec<InstalledApp>, SourceError> {
        require_roots(&self.roots)?;
        let mut apps = Vec::new();
        for path in collect_files(&self.roots, 2, "desktop") {
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(error) => {
                    tracing::debug!(path = %path.display(), %error, "skipping unreadable desktop entry");
                    continue;
                }
            };
            if let Some((name, argv)) = parse_desktop_entry(&raw) {
                let mut argv = argv.into_iter();
                let Some(program) = argv.next() else {
                    continue;
                };
                apps.push(InstalledApp::new(
                    name,
                    LaunchTarget::Command {
                        program,
                        args: argv.collect(),
                    },
                ));
            }
        }
        Ok(apps)
    }
}

/// `.app` bundles in the usual application folders.
pub struct BundleSource {
    roots: Vec<PathBuf>,
}

impl BundleSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = vec![
            PathBuf::from("/Applications"),
            PathBuf::from("/System/Applications"),
        ];
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join("Applications"));
        }
        roots
    }
}

impl AppSource for BundleSource {
    fn source_name(&self) -> &'static str {
        "bundles"
    }

    fn discover(&self) -> Result<Vec<InstalledApp>, SourceError> {
        require_roots(&self.roots)?;
        let mut apps = Vec::new();
        for root in self.roots.iter().filter(|root| root.is_dir()) {
            let bundles = WalkDir::new(root)
                .min_depth(1)
                .max_depth(2)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_dir() && has_extension(entry.path(), "app"));

            for bundle in bundles {
                if let Some(name) = file_stem(bundle.path()) {
                    apps.push(InstalledApp::new(
                        name,
                        LaunchTarget::open(bundle.path().to_string_lossy()),
                    ));
                }
            }
        }
        Ok(apps)
    }
}

pub fn platform_app_source() -> Box<dyn AppSource> {
    if cfg!(target_os = "windows") {
        Box::new(StartMenuSource::new(StartMenuSource::default_roots()))
    } else if cfg!(target_os = "macos") {
        Box::new(BundleSource::new(BundleSource::default_roots()))
    } else {
        Box::new(DesktopEntrySource::new(DesktopEntrySource::default_roots()))
    }
}

fn require_roots(roots: &[PathBuf]) -> Result<(), SourceError> {
    if roots.iter().any(|root| root.is_dir()) {
        return Ok(());
    }
    let listed: Vec<String> = roots.iter().map(|root| root.display().to_string()).collect();
    Err(SourceError::new(format!(
        "no application folder exists (searched: {})",
        listed.join(", ")
    )))
}

/// Files under `roots` with the given extension, sorted by path.
fn collect_files(roots: &[PathBuf], max_depth: usize, extension: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = roots
        .iter()
        .filter(|root| root.is_dir())
        .flat_map(|root| WalkDir::new(root).max_depth(max_depth).into_iter())
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), extension))
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    paths
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Returns `(Name, argv)` for a visible application entry.
pub fn parse_desktop_entry(raw: &str) -> Option<(String, Vec<String>)> {
    let mut in_main_group = false;
    let mut name = None;
    let mut exec = None;
    let mut entry_type = None;
    let mut hidden = false;

    for line in raw.lines().map(str::trim) {
        if line.starts_with('[') {
            in_main_group = line == "[Desktop Entry]";
            continue;
        }
        if !in_main_group || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Name" if name.is_none() => name = Some(value.to_string()),
            "Exec" if exec.is_none() => exec = Some(value.to_string()),
            "Type" => entry_type = Some(value.to_string()),
            "NoDisplay" | "Hidden" if value.eq_ignore_ascii_case("true") => hidden = true,
            _ => {}
        }
    }

    if hidden || entry_type.as_deref() != Some("Application") {
        return None;
    }
    let name = name.filter(|name| !name.is_empty())?;
    let argv = split_exec(&exec?);
    if argv.is_empty() {
        return None;
    }
    Some((name, argv))
}

/// Splits an `Exec` value into argv, honouring double quotes and dropping
/// `%f`-style field codes.
pub fn split_exec(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = exec.trim().chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            ch => {
                current.push(ch);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }

    args.into_iter()
        .filter_map(|arg| strip_field_codes(&arg))
        .collect()
}

fn strip_field_codes(arg: &str) -> Option<String> {
    let mut out = String::with_capacity(arg.len());
    let mut chars = arg.chars();
    let mut stripped = false;
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(_) => stripped = true,
            None => out.push('%'),
        }
    }

    if stripped && out.is_empty() {
        None
    } else {
        Some(out)
    }
}
