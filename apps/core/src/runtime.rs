use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app_discovery::{platform_app_source, AppSource};
use crate::app_handler::AppHandler;
use crate::clipboard::SystemClipboard;
use crate::clipboard_history::{ClipboardHandler, ClipboardHistory};
use crate::config::{self, Config, ConfigError};
use crate::exe_handler::ExeHandler;
use crate::handler::{CommandHandler, ExecuteError};
use crate::launcher::{Launcher, SystemLauncher};
use crate::logging;
use crate::registry::{HandlerRegistry, RegistryError};
use crate::resolver::Resolver;
use crate::script_handler::ScriptHandler;
use crate::search_handler::SearchHandler;
use crate::shortcut_handler::ShortcutHandler;
use crate::system_handler::SystemHandler;
use crate::transport;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("logging setup failed: {0}")]
    Logging(#[source] std::io::Error),
    #[error("session io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Execute(#[from] ExecuteError),
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),
}

#[derive(Debug, Parser)]
#[command(name = "scry-core")]
#[command(about = "Command resolution engine for the Scry quick-launcher")]
struct Cli {
    /// Config file (.toml, .json or .json5)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log filter such as `info` or `scry_core=debug`
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// JSON-lines session on stdin/stdout
    Session,
    /// Execute one `<prefix> <key>` command
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// List handler prefixes, or the options of one prefix
    List { prefix: Option<String> },
    /// Write the config file with every field filled in
    InitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub command: CliCommand,
}

/// Parses arguments without the program name.
pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, clap::Error> {
    let argv = std::iter::once("scry-core".to_string()).chain(args.iter().cloned());
    let cli = Cli::try_parse_from(argv)?;
    Ok(RuntimeOptions {
        config_path: cli.config,
        log_level: cli.log_level,
        command: cli.command.unwrap_or(CliCommand::Session),
    })
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let mut cfg = config::load(options.config_path.as_deref())?;
    if let Some(level) = options.log_level {
        cfg.log_level = level;
    }

    if options.command == CliCommand::InitConfig {
        config::save(&cfg)?;
        println!("[scry-core] wrote config to {}", cfg.config_path.display());
        return Ok(());
    }

    let _logging = logging::init(&cfg.log_level).map_err(RuntimeError::Logging)?;
    tracing::info!(config_path = %cfg.config_path.display(), command = ?options.command, "starting");

    let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher);
    match options.command {
        CliCommand::Session => run_session(&cfg, launcher),
        CliCommand::Exec { command } => {
            let registry = build_registry(&cfg, launcher, clipboard_handler_for(&cfg))?;
            registry.execute(&command.join(" "))?;
            Ok(())
        }
        CliCommand::List { prefix } => {
            let registry = build_registry(&cfg, launcher, clipboard_handler_for(&cfg))?;
            let entries = match prefix {
                Some(prefix) => registry
                    .try_get_handler(&prefix)
                    .ok_or(RuntimeError::UnknownPrefix(prefix))?
                    .options(),
                None => registry.list_entries(),
            };
            for entry in entries {
                match entry.description {
                    Some(description) => println!("{}\t{}", entry.value, description),
                    None => println!("{}", entry.value),
                }
            }
            Ok(())
        }
        CliCommand::InitConfig => Ok(()),
    }
}

fn run_session(cfg: &Config, launcher: Arc<dyn Launcher>) -> Result<(), RuntimeError> {
    let clipboard = clipboard_handler_for(cfg);
    let poller = clipboard.as_ref().map(|handler| {
        handler.spawn_poller(Duration::from_millis(cfg.clipboard_poll_interval_ms))
    });

    let registry = Arc::new(build_registry(cfg, launcher, clipboard)?);
    let mut resolver = Resolver::new(registry).with_ranking(cfg.ranked_matches);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let handled = serve_session(&mut resolver, stdin.lock(), stdout.lock())?;
    tracing::info!(requests = handled, "session ended");

    if let Some(poller) = poller {
        poller.stop();
    }
    Ok(())
}

/// Answers one JSON request per input line until EOF. Returns the number handled.
pub fn serve_session<R: BufRead, W: Write>(
    resolver: &mut Resolver,
    input: R,
    mut output: W,
) -> Result<usize, std::io::Error> {
    let mut handled = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = transport::handle_json(resolver, &line);
        writeln!(output, "{reply}")?;
        output.flush()?;
        handled += 1;
    }
    Ok(handled)
}

pub fn clipboard_handler_for(cfg: &Config) -> Option<Arc<ClipboardHandler>> {
    if !cfg.clipboard_enabled {
        return None;
    }
    let history = ClipboardHistory::new(cfg.clipboard_capacity, cfg.clipboard_duplicates);
    Some(Arc::new(ClipboardHandler::new(
        Arc::new(SystemClipboard::new()),
        history,
    )))
}

pub fn build_registry(
    cfg: &Config,
    launcher: Arc<dyn Launcher>,
    clipboard: Option<Arc<ClipboardHandler>>,
) -> Result<HandlerRegistry, RegistryError> {
    build_registry_with(cfg, launcher, platform_app_source(), clipboard)
}

/// Registers the handlers in listing order: run, exe, app, web, script, search, sys, clipboard.
pub fn build_registry_with(
    cfg: &Config,
    launcher: Arc<dyn Launcher>,
    apps: Box<dyn AppSource>,
    clipboard: Option<Arc<ClipboardHandler>>,
) -> Result<HandlerRegistry, RegistryError> {
    let mut handlers: Vec<Arc<dyn CommandHandler>> = vec![
        Arc::new(ShortcutHandler::run(&cfg.run_targets, Arc::clone(&launcher))),
        Arc::new(ExeHandler::new(Arc::clone(&launcher))),
        Arc::new(AppHandler::new(apps, Arc::clone(&launcher))),
        Arc::new(ShortcutHandler::web(&cfg.web_shortcuts, Arc::clone(&launcher))),
        Arc::new(ScriptHandler::new(cfg.scripts_dir.clone(), Arc::clone(&launcher))),
        Arc::new(SearchHandler::new(
            cfg.web_search_provider,
            &cfg.web_search_custom_template,
            Arc::clone(&launcher),
        )),
        Arc::new(SystemHandler::new(launcher)),
    ];
    if let Some(clipboard) = clipboard {
        handlers.push(clipboard);
    }
    HandlerRegistry::new(handlers)
}
