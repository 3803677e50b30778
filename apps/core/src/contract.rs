use serde::{Deserialize, Serialize};

use crate::model::Entry;
use crate::resolver::{Phase, Resolver, ResolverEvent};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryDto {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SessionRequest {
    TextChanged { text: String },
    Commit,
    Complete,
    MoveUp,
    MoveDown,
    ItemSelected(EntryDto),
    Reset,
    /// Snapshot only, no gesture.
    State,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    TextReplaced { text: String },
    ItemsChanged { items: Vec<EntryDto> },
    SelectionChanged { index: Option<usize> },
    ErrorChanged { message: Option<String> },
    CaretToEnd,
    Dismiss,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub command_text: String,
    pub phase: Phase,
    pub prefix: Option<String>,
    pub items: Vec<EntryDto>,
    pub selected_index: Option<usize>,
    pub error_message: Option<String>,
    pub execute_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionResponse {
    pub events: Vec<SessionEvent>,
    pub state: SessionState,
}

impl SessionState {
    pub fn capture(resolver: &Resolver) -> Self {
        Self {
            command_text: resolver.command_text().to_string(),
            phase: resolver.phase(),
            prefix: resolver
                .current_handler()
                .map(|handler| handler.prefix().to_lowercase()),
            items: resolver.items().iter().cloned().map(EntryDto::from).collect(),
            selected_index: resolver.selected_index(),
            error_message: resolver.error_message().map(str::to_string),
            execute_ready: resolver.is_execute_ready(),
        }
    }
}

impl From<Entry> for EntryDto {
    fn from(value: Entry) -> Self {
        Self {
            value: value.value,
            description: value.description,
        }
    }
}

impl From<EntryDto> for Entry {
    fn from(value: EntryDto) -> Self {
        Entry::from_owned(value.value, value.description)
    }
}

impl From<ResolverEvent> for SessionEvent {
    fn from(value: ResolverEvent) -> Self {
        match value {
            ResolverEvent::TextReplaced(text) => Self::TextReplaced { text },
            ResolverEvent::ItemsChanged(items) => Self::ItemsChanged {
                items: items.into_iter().map(EntryDto::from).collect(),
            },
            ResolverEvent::SelectionChanged(index) => Self::SelectionChanged { index },
            ResolverEvent::ErrorChanged(message) => Self::ErrorChanged { message },
            ResolverEvent::CaretToEnd => Self::CaretToEnd,
            ResolverEvent::Dismiss => Self::Dismiss,
        }
    }
}
