use std::sync::Arc;

use crate::handler::{find_option, CommandHandler, ExecuteError, ExecuteResult};
use crate::launcher::{LaunchTarget, Launcher};
use crate::model::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

struct SystemAction {
    name: &'static str,
    label: &'static str,
    description: &'static str,
}

static ACTIONS: [SystemAction; 9] = [
    SystemAction {
        name: "lock",
        label: "Lock screen",
        description: "lock the screen",
    },
    SystemAction {
        name: "sleep",
        label: "Sleep",
        description: "put computer to sleep",
    },
    SystemAction {
        name: "shutdown",
        label: "Shutdown",
        description: "shutdown the computer",
    },
    SystemAction {
        name: "restart",
        label: "Restart",
        description: "restart the computer",
    },
    SystemAction {
        name: "mute",
        label: "Mute",
        description: "toggle mute",
    },
    SystemAction {
        name: "tasks",
        label: "Task manager",
        description: "open task manager",
    },
    SystemAction {
        name: "cpanel",
        label: "Control panel",
        description: "open control panel",
    },
    SystemAction {
        name: "devices",
        label: "Device manager",
        description: "open device manager",
    },
    SystemAction {
        name: "settings",
        label: "System settings",
        description: "open system settings",
    },
];

/// `sys`: fixed OS actions mapped to per-platform commands.
pub struct SystemHandler {
    platform: Platform,
    launcher: Arc<dyn Launcher>,
}

impl SystemHandler {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self::with_platform(Platform::current(), launcher)
    }

    pub fn with_platform(platform: Platform, launcher: Arc<dyn Launcher>) -> Self {
        Self { platform, launcher }
    }
}

impl CommandHandler for SystemHandler {
    fn prefix(&self) -> &str {
        "sys"
    }

    fn description(&self) -> &str {
        "OS shortcuts and controls"
    }

    fn options(&self) -> Vec<Entry> {
        ACTIONS
            .iter()
            .map(|action| Entry::new(action.name, action.description))
            .collect()
    }

    fn has_option(&self, key: &str) -> bool {
        find_option(&ACTIONS, key, |action| action.name).is_some()
    }

    fn execute(&self, key: &str) -> ExecuteResult {
        let key = key.trim();
        if key.is_empty() {
            return Err(ExecuteError::EmptyArgument("System command"));
        }
        let Some(action) = find_option(&ACTIONS, key, |action| action.name) else {
            return Err(ExecuteError::NotFound {
                what: "system command",
                key: key.to_string(),
            });
        };

        let steps = commands_for(self.platform, action.name);
        if steps.is_empty() {
            return Err(ExecuteError::Unsupported(action.label.to_string()));
        }
        for step in &steps {
            self.launcher.launch(step)?;
        }
        Ok(())
    }
}

fn commands_for(platform: Platform, action: &str) -> Vec<LaunchTarget> {
    let command = LaunchTarget::command;
    match (platform, action) {
        (Platform::Windows, "lock") => vec![command("rundll32.exe", &["user32.dll,LockWorkStation"])],
        (Platform::Windows, "sleep") => vec![
            command("powercfg", &["/hibernate", "off"]),
            command("rundll32.exe", &["powrprof.dll,SetSuspendState", "0,1,0"]),
        ],
        (Platform::Windows, "shutdown") => vec![command("shutdown", &["/s", "/t", "0"])],
        (Platform::Windows, "restart") => vec![command("shutdown", &["/r", "/t", "0"])],
        (Platform::Windows, "mute") => vec![command(
            "powershell",
            &[
                "-Command",
                "\"(New-Object -ComObject WScript.Shell).SendKeys([char]173)\"",
            ],
        )],
        (Platform::Windows, "tasks") => vec![command("taskmgr", &[])],
        (Platform::Windows, "cpanel") => vec![command("control", &[])],
        (Platform::Windows, "devices") => vec![LaunchTarget::open("devmgmt.msc")],
        (Platform::Windows, "settings") => vec![LaunchTarget::open("ms-settings:")],

        (Platform::Linux, "lock") => vec![command("loginctl", &["lock-session"])],
        (Platform::Linux, "sleep") => vec![command("systemctl", &["suspend"])],
        (Platform::Linux, "shutdown") => vec![command("systemctl", &["poweroff"])],
        (Platform::Linux, "restart") => vec![command("systemctl", &["reboot"])],
        (Platform::Linux, "mute") => {
            vec![command("pactl", &["set-sink-mute", "@DEFAULT_SINK@", "toggle"])]
        }
        (Platform::Linux, "tasks") => vec![command("gnome-system-monitor", &[])],

        (Platform::MacOs, "lock") => vec![command("pmset", &["displaysleepnow"])],
        (Platform::MacOs, "sleep") => vec![command("pmset", &["sleepnow"])],
        (Platform::MacOs, "shutdown") => {
            vec![command("osascript", &["-e", "tell app \"System Events\" to shut down"])]
        }
        (Platform::MacOs, "restart") => {
            vec![command("osascript", &["-e", "tell app \"System Events\" to restart"])]
        }
        (Platform::MacOs, "mute") => vec![command(
            "osascript",
            &["-e", "set volume output muted not (output muted of (get volume settings))"],
        )],
        (Platform::MacOs, "tasks") => vec![command("open", &["-a", "Activity Monitor"])],
        (Platform::MacOs, "settings") => {
            vec![command("open", &["x-apple.systempreferences:"])]
        }

        _ => Vec::new(),
    }
}
