use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fuzzy;
use crate::handler::CommandHandler;
use crate::model::{split_command, strip_prefix_ignore_case, Entry};
use crate::registry::HandlerRegistry;

const INVALID_COMMAND: &str = "Invalid command";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No handler yet; items are registry prefixes.
    Prefix,
    /// A handler is committed; items are its filtered options.
    Argument,
}

/// Output published to the presentation layer after a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEvent {
    TextReplaced(String),
    ItemsChanged(Vec<Entry>),
    SelectionChanged(Option<usize>),
    ErrorChanged(Option<String>),
    CaretToEnd,
    Dismiss,
}

/// Two-phase resolution of typed text into a `"<prefix> <argument>"` command.
///
/// Every gesture method computes the complete next state first and then
/// returns the events describing what changed, in a fixed order: text, items,
/// selection, error, caret, dismiss. Programmatic text rewrites surface once,
/// as `TextReplaced`, and are never fed back through `text_changed`.
pub struct Resolver {
    registry: Arc<HandlerRegistry>,
    ranked: bool,
    command_text: String,
    published_text: String,
    current: Option<Arc<dyn CommandHandler>>,
    items: Vec<Entry>,
    selected: Option<usize>,
    error: Option<String>,
    caret_requested: bool,
    dismiss_requested: bool,
}

impl Resolver {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        let mut resolver = Self {
            registry,
            ranked: false,
            command_text: String::new(),
            published_text: String::new(),
            current: None,
            items: Vec::new(),
            selected: None,
            error: None,
            caret_requested: false,
            dismiss_requested: false,
        };
        resolver.restore_initial();
        resolver
    }

    /// Orders matches by relevance instead of enumeration order.
    pub fn with_ranking(mut self, ranked: bool) -> Self {
        self.ranked = ranked;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn command_text(&self) -> &str {
        &self.command_text
    }

    pub fn phase(&self) -> Phase {
        if self.current.is_some() {
            Phase::Argument
        } else {
            Phase::Prefix
        }
    }

    pub fn current_handler(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.current.as_ref()
    }

    pub fn items(&self) -> &[Entry] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.selected.and_then(|index| self.items.get(index))
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when the argument is non-empty and, for handlers with a fixed
    /// option set, names one of those options ignoring case.
    pub fn is_execute_ready(&self) -> bool {
        let Some(handler) = self.current.as_ref() else {
            return false;
        };
        let Some(argument) = self.argument_for(handler.as_ref()) else {
            return false;
        };

        let argument = argument.trim();
        if argument.is_empty() {
            return false;
        }
        if handler.is_entryless() {
            return true;
        }
        handler.has_option(argument)
    }

    pub fn text_changed(&mut self, text: &str) -> Vec<ResolverEvent> {
        self.published_text = text.to_string();
        self.transition(|state| state.apply_text(text))
    }

    /// Enter.
    pub fn commit(&mut self) -> Vec<ResolverEvent> {
        self.transition(Self::apply_commit)
    }

    /// Tab.
    pub fn complete(&mut self) -> Vec<ResolverEvent> {
        self.transition(Self::apply_complete)
    }

    pub fn move_up(&mut self) -> Vec<ResolverEvent> {
        self.transition(|state| state.step_selection(-1))
    }

    pub fn move_down(&mut self) -> Vec<ResolverEvent> {
        self.transition(|state| state.step_selection(1))
    }

    /// Pointer activation of `entry`.
    pub fn item_selected(&mut self, entry: &Entry) -> Vec<ResolverEvent> {
        self.transition(|state| state.apply_item_selected(entry))
    }

    pub fn reset(&mut self) -> Vec<ResolverEvent> {
        self.transition(Self::restore_initial)
    }

    fn transition(&mut self, change: impl FnOnce(&mut Self)) -> Vec<ResolverEvent> {
        let items_before = self.items.clone();
        let selected_before = self.selected;
        let error_before = self.error.clone();
        self.caret_requested = false;
        self.dismiss_requested = false;

        change(self);

        let mut events = Vec::new();
        if self.command_text != self.published_text {
            self.published_text = self.command_text.clone();
            events.push(ResolverEvent::TextReplaced(self.command_text.clone()));
        }
        if self.items != items_before {
            events.push(ResolverEvent::ItemsChanged(self.items.clone()));
        }
        if self.selected != selected_before {
            events.push(ResolverEvent::SelectionChanged(self.selected));
        }
        if self.error != error_before {
            events.push(ResolverEvent::ErrorChanged(self.error.clone()));
        }
        if std::mem::take(&mut self.caret_requested) {
            events.push(ResolverEvent::CaretToEnd);
        }
        if std::mem::take(&mut self.dismiss_requested) {
            events.push(ResolverEvent::Dismiss);
        }
        events
    }

    fn apply_text(&mut self, text: &str) {
        self.error = None;
        self.command_text = text.to_string();

        let left = self
            .current
            .as_ref()
            .is_some_and(|handler| self.argument_for(handler.as_ref()).is_none());
        if left {
            if let Some(handler) = self.current.take() {
                tracing::debug!(prefix = handler.prefix(), "left argument phase");
            }
        }

        if let Some(handler) = self.current.clone() {
            self.filter_arguments(handler.as_ref());
            return;
        }

        let (head, remainder) = split_command(text);
        if let Some(handler) = self.registry.try_get_handler(head) {
            self.enter_argument_phase(handler, remainder.unwrap_or(""));
            return;
        }

        let entries = self.registry.list_entries();
        self.rebuild_items(fuzzy::filter_entries(entries, head, self.ranked));
    }

    fn apply_commit(&mut self) {
        if self.is_execute_ready() {
            self.execute();
            return;
        }

        let entryless = self
            .current
            .as_ref()
            .is_some_and(|handler| handler.is_entryless());
        if entryless && !self.command_text.trim().is_empty() {
            self.execute();
            return;
        }

        let Some(entry) = self.selected_entry().cloned() else {
            self.error = Some(INVALID_COMMAND.to_string());
            return;
        };

        match self.current.clone() {
            None => self.resolve_prefix_entry(&entry),
            Some(handler) => {
                self.command_text = format!("{} {}", handler.prefix(), entry.value);
                self.execute();
            }
        }
    }

    fn apply_complete(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };

        match self.current.clone() {
            None => {
                if let Some(handler) = self.registry.try_get_handler(&entry.value) {
                    self.enter_argument_phase(handler, "");
                }
            }
            Some(handler) => {
                self.command_text = format!("{} {}", handler.prefix(), entry.value);
                self.caret_requested = true;
                self.items.clear();
                self.selected = None;
            }
        }
    }

    fn apply_item_selected(&mut self, entry: &Entry) {
        match self.current.clone() {
            None => self.resolve_prefix_entry(entry),
            Some(handler) => {
                self.command_text = format!("{} {}", handler.prefix(), entry.value);
                if self.is_execute_ready() {
                    self.execute();
                } else {
                    self.caret_requested = true;
                }
            }
        }
    }

    /// A prefix-phase entry either names a handler or is a whole command.
    fn resolve_prefix_entry(&mut self, entry: &Entry) {
        match self.registry.try_get_handler(&entry.value) {
            Some(handler) => self.enter_argument_phase(handler, ""),
            None => {
                self.command_text = entry.value.clone();
                self.execute();
            }
        }
    }

    fn enter_argument_phase(&mut self, handler: Arc<dyn CommandHandler>, remainder: &str) {
        let prefix = handler.prefix().to_lowercase();
        tracing::debug!(prefix = %prefix, "entered argument phase");

        self.command_text = format!("{prefix} {remainder}");
        self.caret_requested = true;

        if handler.is_entryless() {
            self.items.clear();
        } else {
            self.items = fuzzy::filter_entries(handler.options(), remainder.trim_start(), self.ranked);
        }
        self.selected = if self.items.is_empty() { None } else { Some(0) };
        self.current = Some(handler);
    }

    fn filter_arguments(&mut self, handler: &dyn CommandHandler) {
        if handler.is_entryless() {
            self.items.clear();
            self.selected = None;
            return;
        }

        let query = self
            .argument_for(handler)
            .unwrap_or_default()
            .trim_start()
            .to_string();
        self.rebuild_items(fuzzy::filter_entries(handler.options(), &query, self.ranked));
    }

    fn rebuild_items(&mut self, items: Vec<Entry>) {
        self.items = items;
        self.selected = None;
        self.step_selection(1);
    }

    fn step_selection(&mut self, direction: i32) {
        self.selected = next_selection_index(self.selected, self.items.len(), direction);
    }

    fn restore_initial(&mut self) {
        self.command_text.clear();
        self.current = None;
        self.error = None;
        self.items = self.registry.list_entries();
        self.selected = if self.items.is_empty() { None } else { Some(0) };
    }

    fn execute(&mut self) {
        let command = self.command_text.clone();
        let prefix = split_command(command.trim_start()).0;
        match self.registry.execute(&command) {
            Ok(()) => {
                tracing::info!(prefix, "command executed");
                self.restore_initial();
                self.dismiss_requested = true;
            }
            Err(error) => {
                tracing::warn!(prefix, %error, "command failed");
                self.error = Some(format!("Could not execute: {error}"));
            }
        }
    }

    /// Text after `"<prefix> "`, or `None` when the text no longer starts with it.
    fn argument_for(&self, handler: &dyn CommandHandler) -> Option<&str> {
        let expected = format!("{} ", handler.prefix());
        strip_prefix_ignore_case(&self.command_text, &expected)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("command_text", &self.command_text)
            .field("phase", &self.phase())
            .field("items", &self.items.len())
            .field("selected", &self.selected)
            .field("error", &self.error)
            .finish()
    }
}

fn next_selection_index(current: Option<usize>, len: usize, direction: i32) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let max = len - 1;
    match current {
        None if direction > 0 => Some(0),
        None => None,
        Some(index) if direction < 0 => Some(index.saturating_sub(1)),
        Some(index) if direction > 0 => Some((index + 1).min(max)),
        Some(index) => Some(index.min(max)),
    }
}

#[cfg(test)]
mod tests {
    use super::next_selection_index;

    #[test]
    fn selection_steps_are_clamped_to_bounds() {
        assert_eq!(next_selection_index(Some(0), 3, -1), Some(0));
        assert_eq!(next_selection_index(Some(0), 3, 1), Some(1));
        assert_eq!(next_selection_index(Some(2), 3, 1), Some(2));
        assert_eq!(next_selection_index(Some(5), 3, 0), Some(2));
    }

    #[test]
    fn empty_list_has_no_selection() {
        assert_eq!(next_selection_index(Some(1), 0, 1), None);
        assert_eq!(next_selection_index(None, 0, -1), None);
    }

    #[test]
    fn advancing_from_nothing_lands_on_first_item() {
        assert_eq!(next_selection_index(None, 4, 1), Some(0));
        assert_eq!(next_selection_index(None, 4, -1), None);
    }
}
