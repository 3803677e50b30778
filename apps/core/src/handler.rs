use thiserror::Error;

use crate::launcher::LaunchError;
use crate::model::{eq_ignore_case, Entry};

/// Failure outcome of executing a command. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error("Empty command")]
    EmptyCommand,
    #[error("Must be `<prefix> <key>`")]
    MalformedCommand,
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),
    #[error("Unknown {what}: {key}")]
    NotFound { what: &'static str, key: String },
    #[error("{0} cannot be empty")]
    EmptyArgument(&'static str),
    #[error("{0} not supported on this platform")]
    Unsupported(String),
    #[error("{0}")]
    Launch(#[from] LaunchError),
    #[error("failed to start background task: {0}")]
    Background(String),
}

pub type ExecuteResult = Result<(), ExecuteError>;

/// A named unit that can list what it runs and run one of those keys.
///
/// Implementations must turn every failure into an `ExecuteError`; nothing
/// they call may panic through `execute`.
pub trait CommandHandler: Send + Sync {
    /// Literal prefix such as `web` or `sys`. Compared case-insensitively.
    fn prefix(&self) -> &str;

    fn description(&self) -> &str;

    /// Entryless handlers accept any non-empty argument instead of a fixed option set.
    fn is_entryless(&self) -> bool {
        false
    }

    fn options(&self) -> Vec<Entry>;

    /// Whether `key` names one of the options, ignoring case and surrounding whitespace.
    fn has_option(&self, key: &str) -> bool {
        find_option(&self.options(), key, |entry| entry.value.as_str()).is_some()
    }

    fn execute(&self, key: &str) -> ExecuteResult;
}

/// Finds the option a key refers to, ignoring case and surrounding whitespace.
pub fn find_option<'a, T>(
    options: &'a [T],
    key: &str,
    name_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let key = key.trim();
    options
        .iter()
        .find(|option| eq_ignore_case(name_of(option).trim(), key))
}
