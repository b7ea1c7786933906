// SPDX-License-Identifier: MIT
//
// n-repl.toml: user settings for the REPL.
//
// Every key is optional; a missing file means all defaults. Names that the
// prompt has to interpret (modes, colors, keys, actions) are checked when
// the settings are turned into a prompt `Config`, so a typo fails at
// startup with the offending key in the message.
//
// Example:
//
//   prefix = "$ "
//   key_bind_mode = "common"
//   history = ["ls", "cd src"]
//
//   [colors]
//   prefix_text = "green"
//
//   [keys]
//   ControlX = "cut-line-before"

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use n_prompt::config::{DEFAULT_INDENT_SIZE, DEFAULT_MAX_SUGGESTIONS};
use n_prompt::highlight::RustLexer;
use n_prompt::key_bind::{self, KeyBind};
use n_prompt::renderer::Prefix;
use n_prompt::{Colors, CompletionCycle, Config, KeyBindMode, Lexer};
use n_term::{Color, Key};
use serde::Deserialize;

use crate::shell;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_PATH: &str = "n-repl.toml";

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub prefix: String,
    /// Show the working directory's name instead of `prefix`.
    pub live_prefix: bool,
    pub title: Option<String>,
    pub max_suggestions: usize,
    pub indent_size: usize,
    pub key_bind_mode: String,
    pub completion_cycle: String,
    pub completion_on_down: bool,
    pub show_completion_at_start: bool,
    /// Seed history, oldest first.
    pub history: Vec<String>,
    pub lexer: LexerKind,
    /// Color slot name → color name.
    pub colors: BTreeMap<String, String>,
    /// Key name → edit action name.
    pub keys: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: "> ".to_owned(),
            live_prefix: false,
            title: Some("n-repl".to_owned()),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            indent_size: DEFAULT_INDENT_SIZE,
            key_bind_mode: "emacs".to_owned(),
            completion_cycle: "clamp".to_owned(),
            completion_on_down: false,
            show_completion_at_start: false,
            history: Vec::new(),
            lexer: LexerKind::default(),
            colors: BTreeMap::new(),
            keys: BTreeMap::new(),
        }
    }
}

/// Which highlighter paints the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexerKind {
    #[default]
    Shell,
    Rust,
    #[serde(rename = "none")]
    Plain,
}

impl Settings {
    /// Read settings from `path`, or [`DEFAULT_PATH`]. A missing file gives
    /// the defaults.
    ///
    /// # Errors
    ///
    /// The file exists but cannot be read or is not valid settings TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_PATH));
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(target: "config", path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        let settings: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        tracing::info!(
            target: "config",
            path = %path.display(),
            history = settings.history.len(),
            colors = settings.colors.len(),
            keys = settings.keys.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Build the prompt configuration these settings describe. Callbacks
    /// (completer, executor rules) are left for the caller.
    ///
    /// # Errors
    ///
    /// An unknown mode, color, key, or action name.
    pub fn into_config(self) -> Result<Config> {
        let key_bind_mode: KeyBindMode = self.key_bind_mode.parse().context("key_bind_mode")?;
        let completion_cycle: CompletionCycle =
            self.completion_cycle.parse().context("completion_cycle")?;

        let mut colors = Colors::default();
        for (slot, name) in &self.colors {
            let color: Color = name.parse().with_context(|| format!("colors.{slot}"))?;
            set_color(&mut colors, slot, color)?;
        }

        let key_bindings = self
            .keys
            .iter()
            .map(|(key, action)| -> Result<KeyBind> {
                let key: Key = key.parse().with_context(|| format!("keys.{key}"))?;
                let Some(func) = key_bind::action(action) else {
                    bail!(
                        "keys.{key:?}: unknown action '{action}' (expected one of: {})",
                        key_bind::action_names().collect::<Vec<_>>().join(", ")
                    );
                };
                Ok(KeyBind { key, func })
            })
            .collect::<Result<Vec<_>>>()?;

        let prefix = if self.live_prefix {
            Prefix::Live(Box::new(shell::cwd_prefix))
        } else {
            Prefix::Static(self.prefix)
        };

        let config = Config {
            prefix,
            title: self.title,
            colors,
            max_suggestions: self.max_suggestions,
            indent_size: self.indent_size,
            history: self.history,
            key_bind_mode,
            key_bindings,
            completion_cycle,
            completion_on_down: self.completion_on_down,
            show_completion_at_start: self.show_completion_at_start,
            lexer: build_lexer(self.lexer)?,
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }
}

fn build_lexer(kind: LexerKind) -> Result<Option<Box<dyn Lexer>>> {
    let lexer: Box<dyn Lexer> = match kind {
        LexerKind::Shell => Box::new(shell::lexer().context("shell highlighter")?),
        LexerKind::Rust => Box::new(RustLexer::new().context("the Rust grammar could not be loaded")?),
        LexerKind::Plain => return Ok(None),
    };
    Ok(Some(lexer))
}

fn set_color(colors: &mut Colors, slot: &str, color: Color) -> Result<()> {
    let field = match slot {
        "prefix_text" => &mut colors.prefix_text,
        "prefix_bg" => &mut colors.prefix_bg,
        "input_text" => &mut colors.input_text,
        "input_bg" => &mut colors.input_bg,
        "preview_text" => &mut colors.preview_text,
        "preview_bg" => &mut colors.preview_bg,
        "suggestion_text" => &mut colors.suggestion_text,
        "suggestion_bg" => &mut colors.suggestion_bg,
        "selected_suggestion_text" => &mut colors.selected_suggestion_text,
        "selected_suggestion_bg" => &mut colors.selected_suggestion_bg,
        "description_text" => &mut colors.description_text,
        "description_bg" => &mut colors.description_bg,
        "selected_description_text" => &mut colors.selected_description_text,
        "selected_description_bg" => &mut colors.selected_description_bg,
        "scrollbar_thumb" => &mut colors.scrollbar_thumb,
        "scrollbar_track" => &mut colors.scrollbar_track,
        _ => bail!("unknown color slot '{slot}'"),
    };
    *field = color;
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use n_prompt::Buffer;
    use pretty_assertions::assert_eq;

    use super::*;

    fn file(content: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(content.as_bytes()).unwrap();
        tmp
    }

    fn load(content: &str) -> Result<Settings> {
        let tmp = file(content);
        Settings::load(Some(tmp.path()))
    }

    fn config(content: &str) -> Result<Config> {
        load(content)?.into_config()
    }

    // ── Loading ─────────────────────────────────────────────────────────

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(load("").unwrap(), Settings::default());
    }

    #[test]
    fn parses_every_section() {
        let s = load(
            r#"
prefix = "$ "
title = "shell"
max_suggestions = 10
key_bind_mode = "common"
completion_cycle = "wrap"
completion_on_down = true
history = ["ls", "cd src"]
lexer = "none"

[colors]
prefix_text = "green"

[keys]
ControlX = "cut-line-before"
"#,
        )
        .unwrap();
        assert_eq!(s.prefix, "$ ");
        assert_eq!(s.title.as_deref(), Some("shell"));
        assert_eq!(s.max_suggestions, 10);
        assert_eq!(s.history, ["ls", "cd src"]);
        assert_eq!(s.lexer, LexerKind::Plain);
        assert_eq!(s.colors["prefix_text"], "green");
        assert_eq!(s.keys["ControlX"], "cut-line-before");
        assert!(s.completion_on_down);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = load("prefx = \"$ \"").unwrap_err();
        assert!(format!("{err:#}").contains("prefx"));
    }

    #[test]
    fn bad_type_names_the_file() {
        let tmp = file("max_suggestions = \"many\"");
        let err = Settings::load(Some(tmp.path())).unwrap_err();
        assert!(err.to_string().starts_with("parsing "));
    }

    // ── Into config ─────────────────────────────────────────────────────

    #[test]
    fn default_settings_build_default_prompt() {
        let c = Settings::default().into_config().unwrap();
        assert!(matches!(&c.prefix, Prefix::Static(p) if p == "> "));
        assert_eq!(c.title.as_deref(), Some("n-repl"));
        assert_eq!(c.key_bind_mode, KeyBindMode::Emacs);
        assert_eq!(c.colors, Colors::default());
        assert!(c.lexer.is_some());
    }

    #[test]
    fn modes_and_colors_apply() {
        let c = config(
            r#"
key_bind_mode = "common"
completion_cycle = "wrap"
[colors]
prefix_text = "green"
scrollbar_thumb = "dark-red"
"#,
        )
        .unwrap();
        assert_eq!(c.key_bind_mode, KeyBindMode::Common);
        assert_eq!(c.completion_cycle, CompletionCycle::Wrap);
        assert_eq!(c.colors.prefix_text, Color::Green);
        assert_eq!(c.colors.scrollbar_thumb, Color::DarkRed);
    }

    #[test]
    fn unknown_color_slot() {
        let err = config("[colors]\nbanner = \"red\"").unwrap_err();
        assert_eq!(err.to_string(), "unknown color slot 'banner'");
    }

    #[test]
    fn unknown_color_name_names_the_slot() {
        let err = config("[colors]\nprefix_text = \"mauve\"").unwrap_err();
        assert_eq!(err.to_string(), "colors.prefix_text");
    }

    #[test]
    fn unknown_mode_names_the_key() {
        let err = config("key_bind_mode = \"vi\"").unwrap_err();
        assert!(format!("{err:#}").starts_with("key_bind_mode: "));
    }

    #[test]
    fn key_binding_runs_named_action() {
        let c = config("[keys]\nControlX = \"cut-line-before\"").unwrap();
        assert_eq!(c.key_bindings.len(), 1);
        assert_eq!(c.key_bindings[0].key, Key::ControlX);
        let mut buf = Buffer::with_text("abc");
        (c.key_bindings[0].func)(&mut buf);
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn unknown_action_lists_choices() {
        let err = config("[keys]\nControlX = \"explode\"").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown action 'explode'"));
        assert!(msg.contains("cut-line-before"));
    }

    #[test]
    fn zero_suggestions_fail_validation() {
        assert!(config("max_suggestions = 0").is_err());
    }

    #[test]
    fn live_prefix_and_plain_lexer() {
        let c = config("live_prefix = true\nlexer = \"none\"").unwrap();
        assert!(matches!(c.prefix, Prefix::Live(_)));
        assert!(c.lexer.is_none());
    }

    // ── Logging ─────────────────────────────────────────────────────────

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn load_logs_the_file() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let tmp = file("history = [\"ls\"]");
        tracing::subscriber::with_default(subscriber, || {
            Settings::load(Some(tmp.path())).unwrap();
        });

        let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("settings loaded"));
        assert!(logs.contains("history=1"));
    }
}
