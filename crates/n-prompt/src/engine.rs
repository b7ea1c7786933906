//! The prompt loop: keys in, edits and frames out.
//!
//! An [`Engine`] owns every piece of editing state (buffer, history,
//! completion) plus the renderer, and is the only thing that mutates them.
//! Input arrives from an [`InputPump`] thread over a bounded channel; the
//! loop waits on it with a short timeout so pending signals are seen
//! promptly even when no key is pressed.
//!
//! [`feed`](Engine::feed) is one transition: decode a chunk, apply it,
//! refresh the suggestions, paint a frame. [`run`](Engine::run) loops until
//! the user exits and hands every submitted line to an executor;
//! [`read_line`](Engine::read_line) returns after the first one.
//!
//! While the executor runs, the pump is paused and the reader closed, so
//! the command sees a cooked terminal and never races the prompt for input.

use std::fmt;
use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};

use n_term::reader::IDLE_BACKOFF;
use n_term::signal::{self, Signals};
use n_term::{InputPump, Key, KeyDecoder, Reader, Writer};

use crate::buffer::Buffer;
use crate::completion::CompletionManager;
use crate::config::{Config, ExecuteOnEnter, ExitChecker};
use crate::error::{PromptError, PromptResult};
use crate::history::HistoryLog;
use crate::key_bind::{self, AsciiCodeBind, COMMON_KEY_BINDINGS, EMACS_KEY_BINDINGS, KeyBind, KeyBindMode};
use crate::lexer::Lexer;
use crate::renderer::Renderer;
use crate::units::rune_len;

/// Where pending signals come from. Defaults to [`signal::take`].
pub type SignalSource = Box<dyn FnMut() -> Signals>;

/// What a fed chunk asks of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Keep reading.
    Continue,
    /// A line was submitted.
    Execute(String),
    /// The user asked to leave.
    Exit,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine<R, W>
where
    R: Reader + Send + 'static,
    W: Writer,
{
    reader: Arc<Mutex<R>>,
    renderer: Renderer<W>,
    decoder: KeyDecoder,
    buffer: Buffer,
    history: HistoryLog,
    completion: CompletionManager,
    lexer: Option<Box<dyn Lexer>>,

    key_bind_mode: KeyBindMode,
    key_bindings: Vec<KeyBind>,
    ascii_code_bindings: Vec<AsciiCodeBind>,
    completion_on_down: bool,
    show_completion_at_start: bool,
    indent: String,
    exit_checker: Option<ExitChecker>,
    execute_on_enter: Option<ExecuteOnEnter>,
    signals: SignalSource,
}

impl<R, W> fmt::Debug for Engine<R, W>
where
    R: Reader + Send + 'static,
    W: Writer,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("buffer", &self.buffer)
            .field("history", &self.history.len())
            .field("completion", &self.completion)
            .field("key_bind_mode", &self.key_bind_mode)
            .finish_non_exhaustive()
    }
}

impl<R, W> Engine<R, W>
where
    R: Reader + Send + 'static,
    W: Writer,
{
    /// Build an engine from a validated `config`.
    ///
    /// # Errors
    ///
    /// [`PromptError::InvalidConfig`] if the config does not validate.
    pub fn new(config: Config, reader: R, writer: W) -> PromptResult<Self> {
        config.validate()?;
        let indent = config.indent();
        let Config {
            prefix,
            title,
            initial_text,
            completion_word_separator,
            colors,
            max_suggestions,
            history,
            key_bind_mode,
            key_bindings,
            ascii_code_bindings,
            completion_cycle,
            completion_on_down,
            show_completion_at_start,
            indent_size: _,
            break_line_callback,
            exit_checker,
            execute_on_enter,
            lexer,
            completer,
        } = config;

        let renderer = Renderer::new(writer, prefix, colors)
            .with_title(title)
            .with_break_line_callback(break_line_callback);

        let mut completion = CompletionManager::new(max_suggestions)
            .with_cycle(completion_cycle)
            .with_word_separator(completion_word_separator);
        if let Some(completer) = completer {
            completion = completion.with_completer(completer);
        }

        Ok(Self {
            reader: Arc::new(Mutex::new(reader)),
            renderer,
            decoder: KeyDecoder,
            buffer: Buffer::with_text(&initial_text),
            history: HistoryLog::with_entries(history),
            completion,
            lexer,
            key_bind_mode,
            key_bindings,
            ascii_code_bindings,
            completion_on_down,
            show_completion_at_start,
            indent,
            exit_checker,
            execute_on_enter,
            signals: Box::new(signal::take),
        })
    }

    /// Poll `source` for signals instead of the process-wide handlers.
    #[must_use]
    pub fn with_signal_source(mut self, source: impl FnMut() -> Signals + 'static) -> Self {
        self.signals = Box::new(source);
        self
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryLog {
        &self.history
    }

    #[must_use]
    pub const fn completion(&self) -> &CompletionManager {
        &self.completion
    }

    #[must_use]
    pub const fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    pub const fn renderer_mut(&mut self) -> &mut Renderer<W> {
        &mut self.renderer
    }

    /// The shared reader, as the input pump sees it.
    #[must_use]
    pub const fn reader(&self) -> &Arc<Mutex<R>> {
        &self.reader
    }

    // -- Loops --------------------------------------------------------------

    /// Prompt until the user exits, calling `executor` with every
    /// submitted line. Returns the process exit code: 0 for a normal exit,
    /// `128 + signo` for a terminating signal.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures and a poisoned reader lock.
    pub fn run(&mut self, mut executor: impl FnMut(&str)) -> PromptResult<i32> {
        signal::install();
        let result = self.start().and_then(|()| {
            let (mut pump, rx) = InputPump::spawn(Arc::clone(&self.reader))?;
            let code = self.run_loop(&pump, &rx, &mut executor);
            pump.stop();
            code
        });
        let closed = self.stop();
        signal::uninstall();
        let code = result?;
        closed?;
        tracing::debug!(target: "engine", code, "prompt finished");
        Ok(code)
    }

    /// Prompt for one line. Returns `None` if the user exits instead.
    ///
    /// # Errors
    ///
    /// Terminal I/O failures and a poisoned reader lock.
    pub fn read_line(&mut self) -> PromptResult<Option<String>> {
        signal::install();
        let result = self.start().and_then(|()| {
            let (mut pump, rx) = InputPump::spawn(Arc::clone(&self.reader))?;
            let line = self.read_loop(&rx);
            pump.stop();
            line
        });
        let closed = self.stop();
        signal::uninstall();
        let line = result?;
        closed?;
        Ok(line)
    }

    fn run_loop(
        &mut self,
        pump: &InputPump,
        rx: &Receiver<Vec<u8>>,
        executor: &mut dyn FnMut(&str),
    ) -> PromptResult<i32> {
        loop {
            if let Some(code) = self.poll_signals()? {
                return Ok(code);
            }
            let bytes = match rx.recv_timeout(IDLE_BACKOFF) {
                Ok(bytes) => bytes,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            };
            match self.feed(&bytes)? {
                Feed::Continue => {}
                Feed::Exit => return Ok(0),
                Feed::Execute(line) => {
                    self.execute(pump, &line, executor)?;
                    if self.exit_checker.as_ref().is_some_and(|f| f(&line, true)) {
                        tracing::debug!(target: "engine", "exit checker ended the prompt");
                        return Ok(0);
                    }
                }
            }
        }
    }

    fn read_loop(&mut self, rx: &Receiver<Vec<u8>>) -> PromptResult<Option<String>> {
        loop {
            if self.poll_signals()?.is_some() {
                return Ok(None);
            }
            let bytes = match rx.recv_timeout(IDLE_BACKOFF) {
                Ok(bytes) => bytes,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            };
            match self.feed(&bytes)? {
                Feed::Continue => {}
                Feed::Exit => return Ok(None),
                Feed::Execute(line) => return Ok(Some(line)),
            }
        }
    }

    /// Handle pending signals. Returns the exit code for a terminating one.
    fn poll_signals(&mut self) -> PromptResult<Option<i32>> {
        let pending = (self.signals)();
        if let Some(code) = pending.exit_code() {
            tracing::debug!(target: "engine", ?pending, code, "terminating signal");
            return Ok(Some(code));
        }
        if pending.contains(Signals::WINCH) {
            let size = self.with_reader(|r| Ok(r.window_size()))?;
            self.renderer.update_window_size(size);
            self.render()?;
        }
        Ok(None)
    }

    /// Raw mode on, title, first frame.
    fn start(&mut self) -> PromptResult<()> {
        self.with_reader(Reader::open)?;
        self.renderer.setup()?;
        let size = self.with_reader(|r| Ok(r.window_size()))?;
        self.renderer.update_window_size(size);
        if self.show_completion_at_start {
            self.completion.refresh(self.buffer.document());
        }
        self.render()
    }

    /// Clear the title and give the terminal back.
    fn stop(&mut self) -> PromptResult<()> {
        self.renderer.close()?;
        self.with_reader(Reader::close)
    }

    /// Run `executor` on a cooked terminal with the pump paused.
    fn execute(
        &mut self,
        pump: &InputPump,
        line: &str,
        executor: &mut dyn FnMut(&str),
    ) -> PromptResult<()> {
        pump.pause();
        self.with_reader(Reader::close)?;
        tracing::debug!(target: "engine", len = line.len(), "execute");
        executor(line);
        self.with_reader(Reader::open)?;
        pump.resume();

        self.completion.refresh(self.buffer.document());
        self.render()
    }

    fn with_reader<T>(&self, f: impl FnOnce(&mut R) -> io::Result<T>) -> PromptResult<T> {
        let mut reader = self.reader.lock().map_err(|_| PromptError::ReaderPoisoned)?;
        Ok(f(&mut reader)?)
    }

    // -- Transitions --------------------------------------------------------

    /// Apply one input chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if painting the frame fails.
    pub fn feed(&mut self, bytes: &[u8]) -> PromptResult<Feed> {
        let key = self.decoder.decode(bytes);
        tracing::trace!(target: "engine", ?key, len = bytes.len(), "key");

        let completing = self.completion.is_completing();
        self.handle_completion_key(key, completing);

        let mut outcome = Feed::Continue;
        match key {
            Key::Enter | Key::ControlJ | Key::ControlM => {
                let submit = self
                    .execute_on_enter
                    .as_ref()
                    .is_none_or(|f| f(self.buffer.document()));
                if submit {
                    outcome = Feed::Execute(self.submit()?);
                } else {
                    self.buffer.new_line(true);
                }
            }
            Key::ControlC => {
                self.renderer
                    .break_line(self.buffer.document(), self.lexer.as_deref_mut())?;
                self.buffer = Buffer::new();
                self.history.clear();
            }
            Key::Up | Key::ControlP if !completing => {
                if let Some(buf) = self.history.older(&self.buffer) {
                    self.buffer = buf;
                }
            }
            // Down that just opened the dropdown does not also walk history.
            Key::Down | Key::ControlN if !completing && !self.completion.is_completing() => {
                if let Some(buf) = self.history.newer(&self.buffer) {
                    self.buffer = buf;
                }
            }
            Key::ControlD if self.buffer.text().is_empty() => return self.exit(),
            Key::NotDefined => {
                if self.run_ascii_code_bindings(bytes) {
                    return self.refresh(outcome);
                }
                self.buffer
                    .insert_text(&String::from_utf8_lossy(bytes), false, true);
            }
            _ => {}
        }

        self.run_key_bindings(key);

        if outcome == Feed::Continue
            && self
                .exit_checker
                .as_ref()
                .is_some_and(|f| f(self.buffer.text(), false))
        {
            return self.exit();
        }
        self.refresh(outcome)
    }

    /// Paint the frame after a key that keeps the prompt going.
    fn refresh(&mut self, outcome: Feed) -> PromptResult<Feed> {
        if outcome == Feed::Continue {
            self.completion.refresh(self.buffer.document());
            self.render()?;
        }
        Ok(outcome)
    }

    fn exit(&mut self) -> PromptResult<Feed> {
        self.renderer
            .break_line(self.buffer.document(), self.lexer.as_deref_mut())?;
        Ok(Feed::Exit)
    }

    /// Break the line and start a new buffer. Returns the submitted text.
    fn submit(&mut self) -> PromptResult<String> {
        self.renderer
            .break_line(self.buffer.document(), self.lexer.as_deref_mut())?;
        let line = std::mem::take(&mut self.buffer).text().to_owned();
        if !line.is_empty() {
            self.history.add(line.clone());
        }
        Ok(line)
    }

    fn handle_completion_key(&mut self, key: Key, completing: bool) {
        match key {
            Key::Tab | Key::ControlI => {
                if self.completion.suggestions().is_empty() {
                    self.buffer.insert_text(&self.indent, false, true);
                } else {
                    self.completion.next();
                }
            }
            Key::BackTab => self.completion.previous(),
            Key::Down => {
                if completing || self.completion_on_down {
                    self.completion.next();
                }
            }
            Key::Up => {
                if completing {
                    self.completion.previous();
                }
            }
            _ => {
                if let Some(text) = self.completion.selected_suggestion().map(|s| s.text.clone()) {
                    let word = self
                        .buffer
                        .document()
                        .word_before_cursor_until_separator(self.completion.word_separator());
                    let n = rune_len(word).get();
                    if n > 0 {
                        self.buffer.delete_before_cursor(n);
                    }
                    self.buffer.insert_text(&text, false, true);
                }
                self.completion.reset();
            }
        }
    }

    fn run_ascii_code_bindings(&mut self, bytes: &[u8]) -> bool {
        let mut handled = false;
        for bind in self.ascii_code_bindings.iter().filter(|b| b.bytes == bytes) {
            (bind.func)(&mut self.buffer);
            handled = true;
        }
        handled
    }

    fn run_key_bindings(&mut self, key: Key) {
        key_bind::apply(COMMON_KEY_BINDINGS, key, &mut self.buffer);
        if self.key_bind_mode == KeyBindMode::Emacs {
            key_bind::apply(EMACS_KEY_BINDINGS, key, &mut self.buffer);
        }
        key_bind::apply(&self.key_bindings, key, &mut self.buffer);
    }

    fn render(&mut self) -> PromptResult<()> {
        self.renderer
            .render(self.buffer.document(), &self.completion, self.lexer.as_deref_mut())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
