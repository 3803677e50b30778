mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use scry_core::handler::{CommandHandler, ExecuteError};
use scry_core::launcher::{LaunchError, LaunchTarget, Launcher};
use scry_core::model::Entry;
use scry_core::registry::{HandlerRegistry, RegistryError};
use scry_core::shortcut_handler::ShortcutHandler;
use support::{test_registry, RecordingLauncher};

#[test]
fn lists_prefixes_in_registration_order() {
    let launcher = RecordingLauncher::new();
    let registry = test_registry(&launcher, None);

    let entries = registry.list_entries();

    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0], Entry::new("run", "launch by path"));
    assert_eq!(entries[5], Entry::new("search", "search the web"));
    assert_eq!(entries[6], Entry::new("sys", "OS shortcuts and controls"));
}

#[test]
fn handler_lookup_ignores_case() {
    let launcher = RecordingLauncher::new();
    let registry = test_registry(&launcher, None);

    let handler = registry.try_get_handler("WeB").expect("web should resolve");
    assert_eq!(handler.prefix(), "web");
    assert!(handler.has_option("YouTube"));
    assert!(!handler.has_option("you"));
    assert!(registry.try_get_handler("bogus").is_none());
    assert_eq!(
        registry.options("web"),
        vec![
            Entry::new("github", "https://github.com"),
            Entry::new("youtube", "https://youtube.com"),
        ]
    );
    assert!(registry.options("bogus").is_empty());
}

#[test]
fn malformed_commands_report_validation_messages() {
    let launcher = RecordingLauncher::new();
    let registry = test_registry(&launcher, None);

    let message = |command: &str| {
        registry
            .execute(command)
            .expect_err("command should fail")
            .to_string()
    };

    assert_eq!(message(""), "Empty command");
    assert_eq!(message("   "), "Empty command");
    assert_eq!(message("run"), "Must be `<prefix> <key>`");
    assert_eq!(message("run   "), "Must be `<prefix> <key>`");
    assert_eq!(message("bogus notepad"), "Unknown prefix: bogus");
    assert_eq!(message("web nope"), "Unknown site: nope");
    assert!(launcher.launched().is_empty());
}

#[test]
fn dispatches_to_handler_ignoring_case() {
    let launcher = RecordingLauncher::new();
    let registry = test_registry(&launcher, None);

    registry.execute("WEB YouTube").expect("web youtube should run");
    registry.execute("run notepad").expect("run notepad should run");
    registry.execute("app calculator").expect("app should run");

    assert_eq!(
        launcher.launched(),
        vec![
            LaunchTarget::open("https://youtube.com"),
            LaunchTarget::open("/usr/bin/notepad"),
            LaunchTarget::open("/apps/calculator"),
        ]
    );
}

#[test]
fn launch_failures_carry_the_native_message() {
    let launcher = RecordingLauncher::failing(LaunchError::Shell {
        target: "https://youtube.com".to_string(),
        code: 2,
    });
    let registry = test_registry(&launcher, None);

    let error = registry
        .execute("web youtube")
        .expect_err("launch should fail");

    assert!(matches!(error, ExecuteError::Launch(_)));
    assert_eq!(error.to_string(), "shell rejected 'https://youtube.com' (code=2)");
}

#[test]
fn duplicate_prefixes_are_rejected() {
    let launcher: Arc<dyn Launcher> = RecordingLauncher::new();
    let sites = BTreeMap::new();
    let handlers: Vec<Arc<dyn CommandHandler>> = vec![
        Arc::new(ShortcutHandler::web(&sites, Arc::clone(&launcher))),
        Arc::new(ShortcutHandler::web(&sites, launcher)),
    ];

    let error = HandlerRegistry::new(handlers).expect_err("duplicate prefix should fail");

    assert_eq!(error, RegistryError::DuplicatePrefix("web".to_string()));
}
