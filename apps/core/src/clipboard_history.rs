use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::clipboard::ClipboardAccess;
use crate::handler::{CommandHandler, ExecuteError, ExecuteResult};
use crate::model::{eq_ignore_case, Entry};

pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What recording a value that is already in the history does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Leave the existing entry where it is.
    #[default]
    Drop,
    /// Move the existing entry to the front.
    Promote,
}

/// Most-recent-first, capacity-bounded, exact-value-deduplicated text history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardHistory {
    entries: VecDeque<String>,
    capacity: usize,
    duplicates: DuplicatePolicy,
}

impl Default for ClipboardHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DuplicatePolicy::default())
    }
}

impl ClipboardHistory {
    pub fn new(capacity: usize, duplicates: DuplicatePolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            duplicates,
        }
    }

    /// Inserts `text` at the front. Returns whether the ordering changed.
    pub fn record(&mut self, text: &str) -> bool {
        if let Some(position) = self.entries.iter().position(|entry| entry == text) {
            return match self.duplicates {
                DuplicatePolicy::Drop => false,
                DuplicatePolicy::Promote => {
                    if position == 0 {
                        return false;
                    }
                    if let Some(existing) = self.entries.remove(position) {
                        self.entries.push_front(existing);
                    }
                    true
                }
            };
        }

        self.entries.push_front(text.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry == text)
    }

    /// Stored value `key` refers to, ignoring case and surrounding whitespace.
    /// The most recent match wins.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        self.entries
            .iter()
            .find(|entry| eq_ignore_case(entry.trim(), key))
            .map(String::as_str)
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// `clipboard` handler backed by a history the poll loop keeps filling.
pub struct ClipboardHandler {
    clipboard: Arc<dyn ClipboardAccess>,
    history: Arc<Mutex<ClipboardHistory>>,
}

impl ClipboardHandler {
    pub fn new(clipboard: Arc<dyn ClipboardAccess>, history: ClipboardHistory) -> Self {
        Self {
            clipboard,
            history: Arc::new(Mutex::new(history)),
        }
    }

    pub fn history_snapshot(&self) -> Vec<String> {
        self.history.lock().entries()
    }

    /// Reads the clipboard once. `last_seen` carries state between polls.
    ///
    /// Returns whether the history changed.
    pub fn poll_once(&self, last_seen: &mut Option<String>) -> bool {
        let current = match self.clipboard.read_text() {
            Ok(Some(text)) => text,
            Ok(None) => return false,
            Err(error) => {
                tracing::debug!(%error, "clipboard read skipped");
                return false;
            }
        };

        if current.trim().is_empty() || last_seen.as_deref() == Some(current.as_str()) {
            return false;
        }

        let changed = self.history.lock().record(&current);
        if changed {
            tracing::debug!(chars = current.chars().count(), "clipboard entry recorded");
        }
        *last_seen = Some(current);
        changed
    }

    /// Starts the background poll loop on its own thread.
    pub fn spawn_poller(self: &Arc<Self>, interval: Duration) -> ClipboardPoller {
        let stop = Arc::new(AtomicBool::new(false));
        let handler = Arc::clone(self);
        let stop_flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("scry-clipboard-poll".to_string())
            .spawn(move || {
                tracing::info!(interval_ms = (interval.as_millis() as u64), "clipboard poller started");
                let mut last_seen = None;
                while !stop_flag.load(Ordering::Relaxed) {
                    let started = Instant::now();
                    handler.poll_once(&mut last_seen);
                    let elapsed = started.elapsed();
                    if elapsed < interval {
                        thread::sleep(interval - elapsed);
                    }
                }
                tracing::info!("clipboard poller stopped");
            });

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::error!(%error, "failed to start clipboard poller");
                None
            }
        };
        ClipboardPoller { stop, thread }
    }
}

impl CommandHandler for ClipboardHandler {
    fn prefix(&self) -> &str {
        "clipboard"
    }

    fn description(&self) -> &str {
        "clipboard history"
    }

    fn options(&self) -> Vec<Entry> {
        self.history_snapshot()
            .into_iter()
            .map(|text| Entry::from_owned(text, None))
            .collect()
    }

    fn has_option(&self, key: &str) -> bool {
        self.history.lock().lookup(key).is_some()
    }

    fn execute(&self, key: &str) -> ExecuteResult {
        let Some(text) = self.history.lock().lookup(key).map(str::to_string) else {
            return Err(ExecuteError::NotFound {
                what: "clipboard entry",
                key: key.trim().to_string(),
            });
        };

        // Success covers starting the write, not the OS accepting it.
        let clipboard = Arc::clone(&self.clipboard);
        thread::Builder::new()
            .name("scry-clipboard-write".to_string())
            .spawn(move || {
                if let Err(error) = clipboard.write_text(&text) {
                    tracing::warn!(%error, "clipboard write-back failed");
                }
            })
            .map_err(|error| ExecuteError::Background(error.to_string()))?;
        Ok(())
    }
}

pub struct ClipboardPoller {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ClipboardPoller {
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Signals the loop and waits for its current sleep to end.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ClipboardPoller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
