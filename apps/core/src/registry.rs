use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::handler::{CommandHandler, ExecuteError, ExecuteResult};
use crate::model::{split_command, Entry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("handler prefix is empty")]
    EmptyPrefix,
    #[error("handler prefix contains whitespace: '{0}'")]
    InvalidPrefix(String),
    #[error("duplicate handler prefix: {0}")]
    DuplicatePrefix(String),
}

/// Fixed, ordered set of handlers indexed by lower-cased prefix.
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn CommandHandler>>,
    by_prefix: HashMap<String, usize>,
}

impl HandlerRegistry {
    pub fn new(handlers: Vec<Arc<dyn CommandHandler>>) -> Result<Self, RegistryError> {
        let mut by_prefix = HashMap::with_capacity(handlers.len());
        for (index, handler) in handlers.iter().enumerate() {
            let prefix = handler.prefix();
            if prefix.is_empty() {
                return Err(RegistryError::EmptyPrefix);
            }
            if prefix.chars().any(char::is_whitespace) {
                return Err(RegistryError::InvalidPrefix(prefix.to_string()));
            }
            if by_prefix.insert(prefix.to_lowercase(), index).is_some() {
                return Err(RegistryError::DuplicatePrefix(prefix.to_string()));
            }
        }

        Ok(Self {
            handlers,
            by_prefix,
        })
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// One `(prefix, description)` entry per handler, in registration order.
    pub fn list_entries(&self) -> Vec<Entry> {
        self.handlers
            .iter()
            .map(|handler| Entry::new(handler.prefix(), handler.description()))
            .collect()
    }

    pub fn try_get_handler(&self, prefix: &str) -> Option<Arc<dyn CommandHandler>> {
        self.by_prefix
            .get(&prefix.to_lowercase())
            .map(|index| Arc::clone(&self.handlers[*index]))
    }

    pub fn options(&self, prefix: &str) -> Vec<Entry> {
        self.try_get_handler(prefix)
            .map(|handler| handler.options())
            .unwrap_or_default()
    }

    /// Runs a full `"prefix key"` command.
    pub fn execute(&self, command: &str) -> ExecuteResult {
        if command.trim().is_empty() {
            return Err(ExecuteError::EmptyCommand);
        }

        let (prefix, key) = split_command(command.trim_start());
        let Some(key) = key.filter(|key| !key.trim().is_empty()) else {
            return Err(ExecuteError::MalformedCommand);
        };

        let Some(handler) = self.try_get_handler(prefix) else {
            return Err(ExecuteError::UnknownPrefix(prefix.to_string()));
        };

        tracing::debug!(prefix = handler.prefix(), key, "dispatching command");
        handler.execute(key)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefixes: Vec<&str> = self.handlers.iter().map(|h| h.prefix()).collect();
        f.debug_struct("HandlerRegistry")
            .field("prefixes", &prefixes)
            .finish()
    }
}
