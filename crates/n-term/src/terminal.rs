// SPDX-License-Identifier: MIT
//
// Terminal state for an inline prompt: raw mode and window size.
//
// A prompt draws in the normal screen below the shell's scrollback, so the
// only mode it ever changes is termios. `Terminal::enter` saves the current
// attributes and applies `cfmakeraw`; `leave` writes the saved copy back.
// The engine flips between the two around every executed command, so both
// are idempotent and cheap.
//
// Raw mode also clears OPOST: output bytes go out untranslated, and a bare
// "\n" only moves down a row. Writers that want a fresh line send "\r\n".
//
// If the process panics while raw, a hook resets SGR attributes, shows the
// cursor and restores the saved termios before the panic message prints.
// The bytes go straight to fd 1 so a panic while stdout is locked cannot
// deadlock.
//
// Everything here is termios, ioctl and isatty through `libc`.
#![allow(unsafe_code)]

use std::io;
#[cfg(not(unix))]
use std::io::Write;
use std::sync::{Mutex, Once};

// ─── Size ────────────────────────────────────────────────────────────────────

/// Window dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the window cannot be queried (pipes, CI).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// The window size of the terminal on stdin, or `None` if stdin is not a
/// terminal.
#[cfg(unix)]
#[must_use]
pub fn window_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDIN_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub const fn window_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub const fn is_tty() -> bool {
    false
}

// ─── Panic restore ───────────────────────────────────────────────────────────

/// Attributes to put back if we panic while raw. The hook cannot reach the
/// `Terminal`, so `enter` parks a copy here.
#[cfg(unix)]
static SAVED: Mutex<Option<libc::termios>> = Mutex::new(None);

static HOOK: Once = Once::new();

/// Reset colors, clear the title, show the cursor.
const RESTORE_SEQUENCE: &[u8] = b"\x1b[0m\x1b]2;\x07\x1b[?25h";

fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_restore_sequence();
            #[cfg(unix)]
            if let Ok(saved) = SAVED.lock() {
                if let Some(attrs) = saved.as_ref() {
                    let _ = set_attrs(attrs);
                }
            }
            previous(info);
        }));
    });
}

fn write_restore_sequence() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            RESTORE_SEQUENCE.as_ptr().cast(),
            RESTORE_SEQUENCE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(RESTORE_SEQUENCE);
        let _ = out.flush();
    }
}

// ─── termios ─────────────────────────────────────────────────────────────────

#[cfg(unix)]
fn get_attrs() -> io::Result<libc::termios> {
    let mut attrs: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut attrs) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(attrs)
}

#[cfg(unix)]
fn set_attrs(attrs: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, attrs) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// Raw-mode switch for stdin.
///
/// ```no_run
/// use n_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // read keys, draw the prompt
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
///
/// Dropping an entered `Terminal` leaves raw mode.
#[derive(Default)]
pub struct Terminal {
    /// Attributes from before `enter`; `Some` while raw.
    #[cfg(unix)]
    saved: Option<libc::termios>,
    active: bool,
}

impl Terminal {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            #[cfg(unix)]
            saved: None,
            active: false,
        }
    }

    /// Current window size, falling back to [`Size::FALLBACK`].
    #[must_use]
    pub fn size(&self) -> Size {
        window_size().unwrap_or(Size::FALLBACK)
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Switch stdin to raw mode. Does nothing when already raw, or when
    /// stdin is not a terminal (the handle still reports active).
    ///
    /// # Errors
    ///
    /// `tcgetattr` or `tcsetattr` failed.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        #[cfg(unix)]
        if is_tty() {
            let saved = get_attrs()?;
            let mut attrs = saved;
            unsafe { libc::cfmakeraw(&raw mut attrs) };
            // One byte is enough to return from read.
            attrs.c_cc[libc::VMIN] = 1;
            attrs.c_cc[libc::VTIME] = 0;
            set_attrs(&attrs)?;

            self.saved = Some(saved);
            if let Ok(mut parked) = SAVED.lock() {
                *parked = Some(saved);
            }
        }
        self.active = true;
        Ok(())
    }

    /// Put back the attributes saved by [`enter`](Self::enter).
    ///
    /// # Errors
    ///
    /// `tcsetattr` failed; the handle stays active.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        #[cfg(unix)]
        if let Some(saved) = self.saved.take() {
            if let Err(err) = set_attrs(&saved) {
                self.saved = Some(saved);
                return Err(err);
            }
            if let Ok(mut parked) = SAVED.lock() {
                *parked = None;
            }
        }
        self.active = false;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
