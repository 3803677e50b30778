mod support;

use scry_core::launcher::{LaunchError, LaunchTarget};
use scry_core::model::Entry;
use scry_core::resolver::{Phase, Resolver, ResolverEvent};
use support::{test_registry, RecordingLauncher};

fn resolver_with(launcher: &std::sync::Arc<RecordingLauncher>) -> Resolver {
    Resolver::new(test_registry(launcher, None))
}

fn values(resolver: &Resolver) -> Vec<&str> {
    resolver.items().iter().map(|entry| entry.value.as_str()).collect()
}

fn dismiss_count(events: &[ResolverEvent]) -> usize {
    events
        .iter()
        .filter(|event| **event == ResolverEvent::Dismiss)
        .count()
}

#[test]
fn starts_in_prefix_phase_with_first_entry_selected() {
    let launcher = RecordingLauncher::new();
    let resolver = resolver_with(&launcher);

    assert_eq!(resolver.phase(), Phase::Prefix);
    assert_eq!(resolver.command_text(), "");
    assert_eq!(
        values(&resolver),
        vec!["run", "exe", "app", "web", "script", "search", "sys"]
    );
    assert_eq!(resolver.selected_index(), Some(0));
    assert!(!resolver.is_execute_ready());
}

#[test]
fn partial_prefix_filters_registry_entries() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);

    let events = resolver.text_changed("we");

    assert_eq!(values(&resolver), vec!["web"]);
    assert_eq!(resolver.selected_index(), Some(0));
    assert_eq!(
        events,
        vec![ResolverEvent::ItemsChanged(vec![Entry::new("web", "web shortcuts")])]
    );
}

#[test]
fn typing_a_full_prefix_enters_argument_phase() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);

    let events = resolver.text_changed("WEB");

    assert_eq!(resolver.phase(), Phase::Argument);
    assert_eq!(resolver.command_text(), "web ");
    assert_eq!(values(&resolver), vec!["github", "youtube"]);
    assert_eq!(resolver.selected_index(), Some(0));
    assert_eq!(
        events,
        vec![
            ResolverEvent::TextReplaced("web ".to_string()),
            ResolverEvent::ItemsChanged(vec![
                Entry::new("github", "https://github.com"),
                Entry::new("youtube", "https://youtube.com"),
            ]),
            ResolverEvent::CaretToEnd,
        ]
    );
}

#[test]
fn commit_executes_selected_argument_and_resets() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web");
    resolver.text_changed("web yo");

    assert_eq!(values(&resolver), vec!["youtube"]);
    assert!(!resolver.is_execute_ready());

    let events = resolver.commit();

    assert_eq!(launcher.launched(), vec![LaunchTarget::open("https://youtube.com")]);
    assert_eq!(dismiss_count(&events), 1);
    assert_eq!(events.first(), Some(&ResolverEvent::TextReplaced(String::new())));
    assert_eq!(resolver.command_text(), "");
    assert_eq!(resolver.error_message(), None);
    assert!(!resolver.is_execute_ready());
    assert_eq!(resolver.phase(), Phase::Prefix);
    assert_eq!(resolver.items().len(), 7);
    assert_eq!(resolver.selected_index(), Some(0));
}

#[test]
fn unmatched_argument_is_not_ready_and_commit_reports_invalid() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web");
    resolver.text_changed("web zz");

    assert!(resolver.items().is_empty());
    assert_eq!(resolver.selected_index(), None);
    assert!(!resolver.is_execute_ready());

    let events = resolver.commit();

    assert_eq!(resolver.error_message(), Some("Invalid command"));
    assert_eq!(
        events,
        vec![ResolverEvent::ErrorChanged(Some("Invalid command".to_string()))]
    );
    assert!(launcher.launched().is_empty());

    let events = resolver.text_changed("web z");
    assert!(events.contains(&ResolverEvent::ErrorChanged(None)));
}

#[test]
fn exact_argument_ignoring_case_is_ready() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);

    resolver.text_changed("WEB YouTube ");

    assert_eq!(resolver.command_text(), "web YouTube ");
    assert!(resolver.is_execute_ready());

    resolver.commit();
    assert_eq!(launcher.launched(), vec![LaunchTarget::open("https://youtube.com")]);
}

#[test]
fn deleting_the_separator_of_an_exact_prefix_re_enters_argument_phase() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web");
    assert_eq!(resolver.command_text(), "web ");

    let events = resolver.text_changed("web");

    assert_eq!(resolver.phase(), Phase::Argument);
    assert_eq!(resolver.command_text(), "web ");
    assert_eq!(values(&resolver), vec!["github", "youtube"]);
    assert_eq!(
        events,
        vec![
            ResolverEvent::TextReplaced("web ".to_string()),
            ResolverEvent::CaretToEnd,
        ]
    );
}

#[test]
fn editing_the_prefix_returns_to_prefix_phase() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web");

    let events = resolver.text_changed("we");

    assert_eq!(resolver.phase(), Phase::Prefix);
    assert_eq!(resolver.command_text(), "we");
    assert_eq!(values(&resolver), vec!["web"]);
    assert!(!events
        .iter()
        .any(|event| matches!(event, ResolverEvent::TextReplaced(_))));
}

#[test]
fn tab_completes_argument_without_executing() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web");
    resolver.text_changed("web g");

    let events = resolver.complete();

    assert_eq!(resolver.command_text(), "web github");
    assert!(resolver.items().is_empty());
    assert!(resolver.is_execute_ready());
    assert!(events.contains(&ResolverEvent::CaretToEnd));
    assert!(launcher.launched().is_empty());

    resolver.commit();
    assert_eq!(launcher.launched(), vec![LaunchTarget::open("https://github.com")]);
}

#[test]
fn tab_in_prefix_phase_enters_selected_handler() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("sy");

    resolver.complete();

    assert_eq!(resolver.command_text(), "sys ");
    assert_eq!(resolver.items().len(), 9);
    assert_eq!(resolver.selected_index(), Some(0));
}

#[test]
fn enter_on_prefix_selection_enters_argument_phase() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);

    resolver.commit();

    assert_eq!(resolver.phase(), Phase::Argument);
    assert_eq!(resolver.command_text(), "run ");
    assert_eq!(values(&resolver), vec!["notepad"]);
    assert!(launcher.launched().is_empty());
}

#[test]
fn failed_execution_keeps_text_and_reports_error() {
    let launcher = RecordingLauncher::failing(LaunchError::Spawn {
        target: "https://youtube.com".to_string(),
        message: "no browser".to_string(),
    });
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web youtube");

    let events = resolver.commit();

    assert_eq!(resolver.command_text(), "web youtube");
    assert_eq!(
        resolver.error_message(),
        Some("Could not execute: failed to start 'https://youtube.com': no browser")
    );
    assert_eq!(dismiss_count(&events), 0);
    assert_eq!(resolver.phase(), Phase::Argument);
}

#[test]
fn entryless_handler_executes_free_text() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);

    let events = resolver.text_changed("search");
    assert_eq!(resolver.command_text(), "search ");
    assert!(resolver.items().is_empty());
    assert_eq!(resolver.selected_index(), None);
    assert!(events.contains(&ResolverEvent::SelectionChanged(None)));
    assert!(!resolver.is_execute_ready());

    resolver.text_changed("search weather tomorrow");
    assert!(resolver.is_execute_ready());
    assert!(resolver.items().is_empty());

    let events = resolver.commit();
    assert_eq!(dismiss_count(&events), 1);
    assert_eq!(
        launcher.launched(),
        vec![LaunchTarget::open("https://www.google.com/search?q=weather+tomorrow")]
    );
}

#[test]
fn entryless_handler_with_blank_argument_reports_shape_error() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("search");

    resolver.commit();

    assert_eq!(
        resolver.error_message(),
        Some("Could not execute: Must be `<prefix> <key>`")
    );
    assert_eq!(resolver.command_text(), "search ");
}

#[test]
fn selection_moves_are_clamped() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);

    assert!(resolver.move_up().is_empty());
    assert_eq!(resolver.selected_index(), Some(0));

    for _ in 0..10 {
        resolver.move_down();
    }
    assert_eq!(resolver.selected_index(), Some(6));
    assert!(resolver.move_down().is_empty());

    assert_eq!(
        resolver.move_up(),
        vec![ResolverEvent::SelectionChanged(Some(5))]
    );
}

#[test]
fn clicking_a_prefix_enters_its_argument_phase() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);

    resolver.item_selected(&Entry::new("web", "web shortcuts"));

    assert_eq!(resolver.phase(), Phase::Argument);
    assert_eq!(resolver.command_text(), "web ");
}

#[test]
fn clicking_an_argument_executes_when_it_is_an_option() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web");

    let events = resolver.item_selected(&Entry::bare("nope"));
    assert_eq!(resolver.command_text(), "web nope");
    assert_eq!(events.last(), Some(&ResolverEvent::CaretToEnd));
    assert!(launcher.launched().is_empty());

    resolver.text_changed("web ");
    let events = resolver.item_selected(&Entry::bare("github"));
    assert_eq!(dismiss_count(&events), 1);
    assert_eq!(launcher.launched(), vec![LaunchTarget::open("https://github.com")]);
}

#[test]
fn reset_restores_initial_state() {
    let launcher = RecordingLauncher::new();
    let mut resolver = resolver_with(&launcher);
    resolver.text_changed("web yo");
    resolver.commit();
    resolver.text_changed("app calc");

    let events = resolver.reset();

    assert_eq!(events.first(), Some(&ResolverEvent::TextReplaced(String::new())));
    assert_eq!(resolver.phase(), Phase::Prefix);
    assert_eq!(resolver.items().len(), 7);
    assert_eq!(resolver.selected_index(), Some(0));
    assert_eq!(resolver.error_message(), None);
}

#[test]
fn ranked_resolver_orders_arguments_by_score() {
    let launcher = RecordingLauncher::new();
    let mut resolver = Resolver::new(test_registry(&launcher, None)).with_ranking(true);

    resolver.text_changed("app t");

    assert_eq!(values(&resolver), vec!["Terminal", "Calculator"]);
}
