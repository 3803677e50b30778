use std::sync::{Arc, OnceLock};

use crate::app_discovery::{AppSource, InstalledApp};
use crate::handler::{find_option, CommandHandler, ExecuteError, ExecuteResult};
use crate::launcher::Launcher;
use crate::model::Entry;

/// `app`: installed applications, discovered once per process.
pub struct AppHandler {
    source: Box<dyn AppSource>,
    launcher: Arc<dyn Launcher>,
    apps: OnceLock<Vec<InstalledApp>>,
}

impl AppHandler {
    pub fn new(source: Box<dyn AppSource>, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            source,
            launcher,
            apps: OnceLock::new(),
        }
    }

    fn apps(&self) -> &[InstalledApp] {
        self.apps.get_or_init(|| match self.source.discover() {
            Ok(apps) => {
                let apps = sorted_unique(apps);
                tracing::debug!(source = self.source.source_name(), count = apps.len(), "applications discovered");
                apps
            }
            Err(error) => {
                tracing::warn!(source = self.source.source_name(), %error, "application discovery failed");
                Vec::new()
            }
        })
    }
}

/// Sorted by name ignoring case; the first app wins among same-named ones.
fn sorted_unique(mut apps: Vec<InstalledApp>) -> Vec<InstalledApp> {
    apps.retain(|app| !app.name.trim().is_empty());
    apps.sort_by_cached_key(|app| app.name.to_lowercase());
    apps.dedup_by(|later, earlier| later.name.to_lowercase() == earlier.name.to_lowercase());
    apps
}

impl CommandHandler for AppHandler {
    fn prefix(&self) -> &str {
        "app"
    }

    fn description(&self) -> &str {
        "installed applications"
    }

    fn options(&self) -> Vec<Entry> {
        self.apps().iter().map(|app| Entry::bare(&app.name)).collect()
    }

    fn has_option(&self, key: &str) -> bool {
        find_option(self.apps(), key, |app| app.name.as_str()).is_some()
    }

    fn execute(&self, key: &str) -> ExecuteResult {
        let Some(app) = find_option(self.apps(), key, |app| app.name.as_str()) else {
            return Err(ExecuteError::NotFound {
                what: "application",
                key: key.trim().to_string(),
            });
        };
        self.launcher.launch(&app.target)?;
        Ok(())
    }
}
