// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// OS signals the prompt cares about: resize and terminate.
//
// The handlers only OR a bit into a static `AtomicU8`, which is one of the
// few things that is async-signal-safe. The prompt loop wakes up at least
// every idle backoff, calls `take()`, and reacts: SIGWINCH re-renders with
// the new size, SIGINT / SIGTERM / SIGQUIT unwind the loop with exit code
// `128 + signo`.
//
// Raw mode clears ISIG, so Ctrl+C typed at the prompt arrives as byte 0x03,
// not as SIGINT. These handlers only see signals sent from outside (kill,
// a closing terminal) or raised while a command runs in cooked mode.

use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

bitflags! {
    /// Set of pending signals.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Signals: u8 {
        /// Window size changed.
        const WINCH = 1;
        /// Interrupt (SIGINT).
        const INT   = 1 << 1;
        /// Termination request (SIGTERM).
        const TERM  = 1 << 2;
        /// Quit (SIGQUIT).
        const QUIT  = 1 << 3;
    }
}

impl Signals {
    /// The terminating signals in the set, as a process exit code
    /// (`128 + signo`). INT wins over TERM, TERM over QUIT.
    #[must_use]
    pub const fn exit_code(self) -> Option<i32> {
        if self.contains(Self::INT) {
            Some(128 + 2)
        } else if self.contains(Self::TERM) {
            Some(128 + 15)
        } else if self.contains(Self::QUIT) {
            Some(128 + 3)
        } else {
            None
        }
    }
}

/// Bits set by the handlers, drained by [`take`].
static PENDING: AtomicU8 = AtomicU8::new(0);

/// Drain and return the pending signals.
pub fn take() -> Signals {
    Signals::from_bits_truncate(PENDING.swap(0, Ordering::SeqCst))
}

/// Mark signals as pending. The handlers record through this.
pub fn raise(signals: Signals) {
    PENDING.fetch_or(signals.bits(), Ordering::SeqCst);
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[cfg(unix)]
extern "C" fn on_signal(sig: libc::c_int) {
    let bit = match sig {
        libc::SIGWINCH => Signals::WINCH,
        libc::SIGINT => Signals::INT,
        libc::SIGTERM => Signals::TERM,
        libc::SIGQUIT => Signals::QUIT,
        _ => return,
    };
    raise(bit);
}

#[cfg(unix)]
const HANDLED: [libc::c_int; 4] = [libc::SIGWINCH, libc::SIGINT, libc::SIGTERM, libc::SIGQUIT];

/// Install the handlers for SIGWINCH, SIGINT, SIGTERM and SIGQUIT.
#[cfg(unix)]
pub fn install() {
    for sig in HANDLED {
        unsafe {
            let mut sa: libc::sigaction = std::mem::zeroed();
            sa.sa_sigaction = on_signal as *const () as usize;
            sa.sa_flags = libc::SA_RESTART;
            libc::sigemptyset(&raw mut sa.sa_mask);
            libc::sigaction(sig, &raw const sa, std::ptr::null_mut());
        }
    }
}

/// Put the default dispositions back.
#[cfg(unix)]
pub fn uninstall() {
    for sig in HANDLED {
        unsafe {
            libc::signal(sig, libc::SIG_DFL);
        }
    }
}

#[cfg(not(unix))]
pub fn install() {
    // No-op on non-unix platforms.
}

#[cfg(not(unix))]
pub fn uninstall() {}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(Signals::INT.exit_code(), Some(130));
        assert_eq!(Signals::TERM.exit_code(), Some(143));
        assert_eq!(Signals::QUIT.exit_code(), Some(131));
        assert_eq!(Signals::WINCH.exit_code(), None);
        assert_eq!(Signals::empty().exit_code(), None);
    }

    #[test]
    fn interrupt_wins_over_terminate() {
        assert_eq!((Signals::TERM | Signals::INT).exit_code(), Some(130));
    }

    #[test]
    fn raise_then_take_drains() {
        raise(Signals::WINCH);
        assert!(take().contains(Signals::WINCH));
        assert_eq!(take(), Signals::empty());
    }
}
