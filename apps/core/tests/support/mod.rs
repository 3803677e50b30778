#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use scry_core::app_discovery::{InstalledApp, StaticAppSource};
use scry_core::clipboard::{ClipboardAccess, ClipboardError};
use scry_core::clipboard_history::ClipboardHandler;
use scry_core::config::Config;
use scry_core::launcher::{LaunchError, LaunchTarget, Launcher};
use scry_core::registry::HandlerRegistry;
use scry_core::runtime::build_registry_with;

#[derive(Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<LaunchTarget>>,
    failure: Mutex<Option<LaunchError>>,
}

impl RecordingLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(error: LaunchError) -> Arc<Self> {
        let launcher = Self::default();
        *launcher.failure.lock() = Some(error);
        Arc::new(launcher)
    }

    pub fn launched(&self) -> Vec<LaunchTarget> {
        self.launched.lock().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, target: &LaunchTarget) -> Result<(), LaunchError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        self.launched.lock().push(target.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeClipboard {
    current: Mutex<Option<String>>,
    written: Mutex<Vec<String>>,
}

impl FakeClipboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, text: &str) {
        *self.current.lock() = Some(text.to_string());
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().clone()
    }
}

impl ClipboardAccess for FakeClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        Ok(self.current.lock().clone())
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.written.lock().push(text.to_string());
        *self.current.lock() = Some(text.to_string());
        Ok(())
    }
}

pub fn unique_temp_dir(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be valid")
        .as_nanos();
    std::env::temp_dir().join(format!("scry-{label}-{}-{unique}", std::process::id()))
}

pub fn test_config() -> Config {
    Config {
        web_shortcuts: BTreeMap::from([
            ("github".to_string(), "https://github.com".to_string()),
            ("youtube".to_string(), "https://youtube.com".to_string()),
        ]),
        run_targets: BTreeMap::from([("notepad".to_string(), "/usr/bin/notepad".to_string())]),
        scripts_dir: unique_temp_dir("no-scripts"),
        ..Config::default()
    }
}

pub fn test_apps() -> StaticAppSource {
    StaticAppSource::from_apps(vec![
        InstalledApp::new("Calculator", LaunchTarget::open("/apps/calculator")),
        InstalledApp::new("Terminal", LaunchTarget::open("/apps/terminal")),
    ])
}

pub fn test_registry(
    launcher: &Arc<RecordingLauncher>,
    clipboard: Option<Arc<ClipboardHandler>>,
) -> Arc<HandlerRegistry> {
    let launcher: Arc<dyn Launcher> = launcher.clone();
    let registry = build_registry_with(&test_config(), launcher, Box::new(test_apps()), clipboard)
        .expect("registry should build");
    Arc::new(registry)
}

/// Polls `check` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    check()
}
