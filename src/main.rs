// SPDX-License-Identifier: MIT
//
// n-repl: a small interactive shell built on n-prompt.
//
// This is the binary that wires the crates together:
//
//   n-term   → raw mode, stdin reader + pump thread, VT100 writer, signals
//   n-prompt → document/buffer editing, completion, history, rendering
//
// Each keypress flows through:
//
//   stdin → InputPump → Engine::feed → Buffer/History/Completion → Renderer
//
// and each submitted line goes to `shell::execute` with the terminal back in
// cooked mode.
//
// Logging is off unless N_REPL_LOG names a file (the terminal itself is the
// UI, so nothing can go to stderr). RUST_LOG filters as usual.

mod settings;
mod shell;

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use n_prompt::{Config, Document, Engine};
use n_term::{TtyReader, Vt100Writer};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Names the log file; unset means no logging.
const LOG_ENV: &str = "N_REPL_LOG";

const USAGE: &str = "\
usage: n-repl [--config <path>]

  -c, --config <path>   settings file (default: ./n-repl.toml)
  -h, --help            show this help
  -V, --version         show the version

Type `help` at the prompt for the built-in commands.";

// ─── Command line ────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Cli {
    Run { config: Option<PathBuf> },
    Help,
    Version,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli> {
    let mut config = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "-V" | "--version" => return Ok(Cli::Version),
            "-c" | "--config" => {
                let path = args.next().with_context(|| format!("{arg} needs a path"))?;
                config = Some(PathBuf::from(path));
            }
            other => bail!("unexpected argument '{other}'\n\n{USAGE}"),
        }
    }
    Ok(Cli::Run { config })
}

// ─── Startup ─────────────────────────────────────────────────────────────────

/// Install the file subscriber if `N_REPL_LOG` is set. The guard must live
/// until exit or buffered lines are lost.
fn configure_logging() -> Result<Option<WorkerGuard>> {
    let Some(path) = env::var_os(LOG_ENV).map(PathBuf::from) else {
        return Ok(None);
    };
    let file = path
        .file_name()
        .with_context(|| format!("{LOG_ENV} must name a file, got '{}'", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(dir, file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    match tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // A subscriber is already installed; dropping the guard shuts the
        // writer down.
        Err(_) => Ok(None),
    }
}

/// The prompt config for `settings` plus the shell's hooks.
fn build_config(settings: Settings) -> Result<Config> {
    let mut config = settings.into_config()?;
    config.completer = Some(Box::new(shell::complete));
    config.exit_checker = Some(Box::new(|line: &str, submitted: bool| {
        submitted && shell::is_exit(line)
    }));
    config.execute_on_enter = Some(Box::new(|doc: &Document| !shell::is_continued(doc.text())));
    Ok(config)
}

fn run() -> Result<i32> {
    let config_path = match parse_args(env::args().skip(1))? {
        Cli::Help => {
            println!("{USAGE}");
            return Ok(0);
        }
        Cli::Version => {
            println!("n-repl {}", env!("CARGO_PKG_VERSION"));
            return Ok(0);
        }
        Cli::Run { config } => config,
    };

    let _log_guard = configure_logging()?;
    tracing::info!(target: "runtime", version = env!("CARGO_PKG_VERSION"), "startup");

    let settings = Settings::load(config_path.as_deref())?;
    let config = build_config(settings)?;
    let mut engine = Engine::new(config, TtyReader::new(), Vt100Writer::stdout())
        .context("setting up the prompt")?;

    let code = engine.run(|line| {
        if let Err(err) = shell::execute(line, &mut io::stdout()) {
            eprintln!("n-repl: {err}");
        }
    })?;
    tracing::info!(target: "runtime", code, "shutdown");
    Ok(code)
}

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("n-repl: {err:#}");
            process::exit(1);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
