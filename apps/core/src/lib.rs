pub mod app_discovery;
pub mod app_handler;
pub mod clipboard;
pub mod clipboard_history;
pub mod config;
pub mod contract;
pub mod exe_handler;
pub mod fuzzy;
pub mod handler;
pub mod launcher;
pub mod logging;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod script_handler;
pub mod search_handler;
pub mod shortcut_handler;
pub mod system_handler;
pub mod transport;

#[cfg(test)]
mod tests {
    mod filter_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/filter_latency_test.rs"
        ));
    }
}
