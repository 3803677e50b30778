use std::collections::BTreeMap;
use std::sync::Arc;

use crate::handler::{find_option, CommandHandler, ExecuteError, ExecuteResult};
use crate::launcher::{LaunchTarget, Launcher};
use crate::model::Entry;

/// Fixed alias-to-target map opened through the shell (`run`, `web`).
pub struct ShortcutHandler {
    prefix: &'static str,
    description: &'static str,
    what: &'static str,
    targets: Vec<(String, String)>,
    launcher: Arc<dyn Launcher>,
}

impl ShortcutHandler {
    pub fn run(targets: &BTreeMap<String, String>, launcher: Arc<dyn Launcher>) -> Self {
        Self::new("run", "launch by path", "program", targets, launcher)
    }

    pub fn web(shortcuts: &BTreeMap<String, String>, launcher: Arc<dyn Launcher>) -> Self {
        Self::new("web", "web shortcuts", "site", shortcuts, launcher)
    }

    fn new(
        prefix: &'static str,
        description: &'static str,
        what: &'static str,
        targets: &BTreeMap<String, String>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            prefix,
            description,
            what,
            targets: targets
                .iter()
                .map(|(alias, target)| (alias.clone(), target.clone()))
                .collect(),
            launcher,
        }
    }
}

impl CommandHandler for ShortcutHandler {
    fn prefix(&self) -> &str {
        self.prefix
    }

    fn description(&self) -> &str {
        self.description
    }

    fn options(&self) -> Vec<Entry> {
        self.targets
            .iter()
            .map(|(alias, target)| Entry::new(alias, target))
            .collect()
    }

    fn has_option(&self, key: &str) -> bool {
        find_option(&self.targets, key, |(alias, _)| alias.as_str()).is_some()
    }

    fn execute(&self, key: &str) -> ExecuteResult {
        let Some((_, target)) = find_option(&self.targets, key, |(alias, _)| alias.as_str()) else {
            return Err(ExecuteError::NotFound {
                what: self.what,
                key: key.trim().to_string(),
            });
        };
        self.launcher.launch(&LaunchTarget::open(target.as_str()))?;
        Ok(())
    }
}
