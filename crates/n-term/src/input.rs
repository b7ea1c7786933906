// SPDX-License-Identifier: MIT
//
// Terminal key decoder.
//
// Turns one raw stdin chunk into one `Key`. Decoding is a whole-chunk
// exact match against a static table: the terminal delivers a keypress's
// escape sequence in a single read, so the chunk *is* the sequence.
// Anything not in the table (plain letters, pasted text, multi-byte UTF-8)
// decodes to `Key::NotDefined` and the caller inserts the chunk as text.
//
// The table covers the dialects that matter in practice:
//
// - VT100 / xterm CSI and SS3 sequences (arrows, Home/End, editing keys)
// - xterm modifier sequences (`CSI 1 ; 5 A` = Ctrl+Up, `CSI 1 ; 2 A` = Shift+Up)
// - Linux console function keys (`CSI [ A` = F1)
// - rxvt-unicode function and Ctrl+arrow keys
//
// Entries are matched in order and the first match wins. Where dialects
// collide (tmux sends `ESC O A` for Ctrl+Up, Emacs ansi-term sends the same
// bytes for plain Up), table order is the only tie-breaker. A lone `ESC` is
// always `Escape`; there is no timeout waiting for the rest of a sequence.

use std::fmt;
use std::str::FromStr;

// ─── Key ─────────────────────────────────────────────────────────────────────

macro_rules! keys {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        /// A decoded keypress.
        ///
        /// Closed set: control keys, navigation keys, function keys and the
        /// `Ignore` / `NotDefined` sentinels.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Key {
            $($(#[$meta])* $name,)+
        }

        impl Key {
            /// Every key, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$name,)+];

            /// The variant name, e.g. `"ControlA"`.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)+
                }
            }
        }
    };
}

keys! {
    Escape,

    ControlA, ControlB, ControlC, ControlD, ControlE, ControlF, ControlG,
    ControlH, ControlI, ControlJ, ControlK, ControlL, ControlM, ControlN,
    ControlO, ControlP, ControlQ, ControlR, ControlS, ControlT, ControlU,
    ControlV, ControlW, ControlX, ControlY, ControlZ,

    ControlSpace,
    ControlBackslash,
    ControlSquareClose,
    ControlCircumflex,
    ControlUnderscore,
    ControlLeft,
    ControlRight,
    ControlUp,
    ControlDown,

    Up,
    Down,
    Right,
    Left,

    ShiftLeft,
    ShiftUp,
    ShiftDown,
    ShiftRight,

    Home,
    End,
    Delete,
    ShiftDelete,
    ControlDelete,
    PageUp,
    PageDown,
    BackTab,
    Insert,
    Backspace,

    /// 0x09. Same byte as Ctrl+I; the table reports it as `Tab`.
    Tab,
    /// 0x0a. Carriage return (0x0d) decodes as `ControlM`.
    Enter,

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    F13, F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24,

    /// Matches any key in a binding.
    Any,

    CprResponse,
    Vt100MouseEvent,
    WindowsMouseEvent,
    BracketedPaste,

    /// A sequence that is recognized but bound to nothing.
    Ignore,
    /// No table entry matched; the chunk is literal input.
    NotDefined,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}'", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for Key {
    type Err = UnknownKey;

    /// Parse a key by variant name, ignoring ASCII case (`"controla"`,
    /// `"ControlA"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

// ─── Sequence table ──────────────────────────────────────────────────────────

/// One table entry: the exact bytes a terminal sends for `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiCode {
    pub key: Key,
    pub bytes: &'static [u8],
}

const fn code(key: Key, bytes: &'static [u8]) -> AsciiCode {
    AsciiCode { key, bytes }
}

/// Known byte sequences in priority order.
pub static ASCII_SEQUENCES: &[AsciiCode] = &[
    code(Key::Escape, b"\x1b"),

    code(Key::ControlSpace, b"\x00"),
    code(Key::ControlA, b"\x01"),
    code(Key::ControlB, b"\x02"),
    code(Key::ControlC, b"\x03"),
    code(Key::ControlD, b"\x04"),
    code(Key::ControlE, b"\x05"),
    code(Key::ControlF, b"\x06"),
    code(Key::ControlG, b"\x07"),
    code(Key::ControlH, b"\x08"),
    // 0x09 and 0x0a are Tab and Enter, registered below.
    code(Key::ControlK, b"\x0b"),
    code(Key::ControlL, b"\x0c"),
    code(Key::ControlM, b"\x0d"),
    code(Key::ControlN, b"\x0e"),
    code(Key::ControlO, b"\x0f"),
    code(Key::ControlP, b"\x10"),
    code(Key::ControlQ, b"\x11"),
    code(Key::ControlR, b"\x12"),
    code(Key::ControlS, b"\x13"),
    code(Key::ControlT, b"\x14"),
    code(Key::ControlU, b"\x15"),
    code(Key::ControlV, b"\x16"),
    code(Key::ControlW, b"\x17"),
    code(Key::ControlX, b"\x18"),
    code(Key::ControlY, b"\x19"),
    code(Key::ControlZ, b"\x1a"),

    code(Key::ControlBackslash, b"\x1c"),
    code(Key::ControlSquareClose, b"\x1d"),
    code(Key::ControlCircumflex, b"\x1e"),
    code(Key::ControlUnderscore, b"\x1f"),
    code(Key::Backspace, b"\x7f"),

    code(Key::Up, b"\x1b[A"),
    code(Key::Down, b"\x1b[B"),
    code(Key::Right, b"\x1b[C"),
    code(Key::Left, b"\x1b[D"),
    code(Key::Home, b"\x1b[H"),
    code(Key::Home, b"\x1b0H"),
    code(Key::End, b"\x1b[F"),
    code(Key::End, b"\x1b0F"),

    code(Key::Enter, b"\x0a"),
    code(Key::Delete, b"\x1b[3~"),
    code(Key::ShiftDelete, b"\x1b[3;2~"),
    code(Key::ControlDelete, b"\x1b[3;5~"),
    code(Key::Home, b"\x1b[1~"),
    code(Key::End, b"\x1b[4~"),
    code(Key::PageUp, b"\x1b[5~"),
    code(Key::PageDown, b"\x1b[6~"),
    code(Key::Home, b"\x1b[7~"),
    code(Key::End, b"\x1b[8~"),
    code(Key::Tab, b"\x09"),
    code(Key::BackTab, b"\x1b[Z"),
    code(Key::Insert, b"\x1b[2~"),

    code(Key::F1, b"\x1bOP"),
    code(Key::F2, b"\x1bOQ"),
    code(Key::F3, b"\x1bOR"),
    code(Key::F4, b"\x1bOS"),

    // Linux console
    code(Key::F1, b"\x1bOPA"),
    code(Key::F2, b"\x1b[[B"),
    code(Key::F3, b"\x1b[[C"),
    code(Key::F4, b"\x1b[[D"),
    code(Key::F5, b"\x1b[[E"),

    // rxvt-unicode
    code(Key::F1, b"\x1b[\x11~"),
    code(Key::F2, b"\x1b[\x12~"),
    code(Key::F3, b"\x1b[\x13~"),
    code(Key::F4, b"\x1b[\x14~"),

    code(Key::F5, b"\x1b[15~"),
    code(Key::F6, b"\x1b[17~"),
    code(Key::F7, b"\x1b[18~"),
    code(Key::F8, b"\x1b[19~"),
    code(Key::F9, b"\x1b[20~"),
    code(Key::F10, b"\x1b[21~"),
    code(Key::F11, b"\x1b[22~"),
    code(Key::F12, b"\x1b[24~\x08"),
    code(Key::F13, b"\x1b[\x25~"),
    code(Key::F14, b"\x1b[\x26~"),
    code(Key::F15, b"\x1b[\x28~"),
    code(Key::F16, b"\x1b[\x29~"),
    // Shadowed by Home/End/Delete/Insert above; kept for dialect coverage.
    code(Key::F17, b"\x1b[1~"),
    code(Key::F18, b"\x1b[2~"),
    code(Key::F19, b"\x1b[3~"),
    code(Key::F20, b"\x1b[4~"),

    // xterm. `CSI 1 ; 2 R` is F15 on some keyboards but collides with a
    // cursor position report, so it is registered as F16 only.
    code(Key::F13, b"\x1b[1;2P"),
    code(Key::F14, b"\x1b[1;2Q"),
    code(Key::F16, b"\x1b[1;2R"),
    code(Key::F17, b"\x1b[\x15;2~"),
    code(Key::F18, b"\x1b[\x17;2~"),
    code(Key::F19, b"\x1b[\x18;2~"),
    code(Key::F20, b"\x1b[\x19;2~"),
    code(Key::F21, b"\x1b[\x20;2~"),
    code(Key::F22, b"\x1b[\x21;2~"),
    code(Key::F23, b"\x1b[\x23;2~"),
    code(Key::F24, b"\x1b[\x24;2~"),

    code(Key::ControlUp, b"\x1b[1;5A"),
    code(Key::ControlDown, b"\x1b[1;5B"),
    code(Key::ControlRight, b"\x1b[1;5C"),
    code(Key::ControlLeft, b"\x1b[1;5D"),

    code(Key::ShiftUp, b"\x1b[1;2A"),
    code(Key::ShiftDown, b"\x1b[1;2B"),
    code(Key::ShiftRight, b"\x1b[1;2C"),
    code(Key::ShiftLeft, b"\x1b[1;2D"),

    // tmux sends these for Ctrl+arrow, Emacs ansi-term for plain arrows.
    // Plain arrows win.
    code(Key::Up, b"\x1bOA"),
    code(Key::Down, b"\x1bOB"),
    code(Key::Right, b"\x1bOC"),
    code(Key::Left, b"\x1bOD"),

    code(Key::ControlUp, b"\x1b[5A"),
    code(Key::ControlDown, b"\x1b[5B"),
    code(Key::ControlRight, b"\x1b[5C"),
    code(Key::ControlLeft, b"\x1b[5D"),

    // rxvt
    code(Key::ControlRight, b"\x1b[Oc"),
    code(Key::ControlLeft, b"\x1b[Od"),

    code(Key::Ignore, b"\x1b[E"), // xterm
    code(Key::Ignore, b"\x1b[G"), // Linux console
];

// ─── KeyDecoder ──────────────────────────────────────────────────────────────

/// Stateless byte-chunk to [`Key`] decoder over [`ASCII_SEQUENCES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDecoder;

impl KeyDecoder {
    /// Decode one chunk. Unknown chunks (including printable text) are
    /// [`Key::NotDefined`].
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Key {
        decode(bytes)
    }
}

/// Decode one chunk against [`ASCII_SEQUENCES`]; first exact match wins.
#[must_use]
pub fn decode(bytes: &[u8]) -> Key {
    ASCII_SEQUENCES
        .iter()
        .find(|c| c.bytes == bytes)
        .map_or(Key::NotDefined, |c| c.key)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Single bytes ────────────────────────────────────────────────────

    #[test]
    fn lone_escape() {
        assert_eq!(decode(b"\x1b"), Key::Escape);
    }

    #[test]
    fn printable_is_not_defined() {
        assert_eq!(decode(b"a"), Key::NotDefined);
        assert_eq!(decode(b"hello"), Key::NotDefined);
    }

    #[test]
    fn utf8_is_not_defined() {
        assert_eq!(decode("あ".as_bytes()), Key::NotDefined);
    }

    #[test]
    fn empty_chunk_is_not_defined() {
        assert_eq!(decode(b""), Key::NotDefined);
    }

    #[test]
    fn control_letters() {
        assert_eq!(decode(b"\x01"), Key::ControlA);
        assert_eq!(decode(b"\x03"), Key::ControlC);
        assert_eq!(decode(b"\x1a"), Key::ControlZ);
    }

    #[test]
    fn tab_enter_and_carriage_return() {
        assert_eq!(decode(b"\x09"), Key::Tab);
        assert_eq!(decode(b"\x0a"), Key::Enter);
        assert_eq!(decode(b"\x0d"), Key::ControlM);
    }

    #[test]
    fn del_is_backspace() {
        assert_eq!(decode(b"\x7f"), Key::Backspace);
        assert_eq!(decode(b"\x08"), Key::ControlH);
    }

    // ── Escape sequences ────────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(decode(b"\x1b[A"), Key::Up);
        assert_eq!(decode(b"\x1b[B"), Key::Down);
        assert_eq!(decode(b"\x1b[C"), Key::Right);
        assert_eq!(decode(b"\x1b[D"), Key::Left);
    }

    #[test]
    fn ss3_arrows_are_plain_arrows() {
        assert_eq!(decode(b"\x1bOA"), Key::Up);
        assert_eq!(decode(b"\x1bOD"), Key::Left);
    }

    #[test]
    fn home_end_dialects() {
        for seq in [&b"\x1b[H"[..], b"\x1b0H", b"\x1b[1~", b"\x1b[7~"] {
            assert_eq!(decode(seq), Key::Home, "{seq:?}");
        }
        for seq in [&b"\x1b[F"[..], b"\x1b0F", b"\x1b[4~", b"\x1b[8~"] {
            assert_eq!(decode(seq), Key::End, "{seq:?}");
        }
    }

    #[test]
    fn editing_keys() {
        assert_eq!(decode(b"\x1b[3~"), Key::Delete);
        assert_eq!(decode(b"\x1b[3;2~"), Key::ShiftDelete);
        assert_eq!(decode(b"\x1b[3;5~"), Key::ControlDelete);
        assert_eq!(decode(b"\x1b[2~"), Key::Insert);
        assert_eq!(decode(b"\x1b[Z"), Key::BackTab);
        assert_eq!(decode(b"\x1b[5~"), Key::PageUp);
        assert_eq!(decode(b"\x1b[6~"), Key::PageDown);
    }

    #[test]
    fn function_keys() {
        assert_eq!(decode(b"\x1bOP"), Key::F1);
        assert_eq!(decode(b"\x1b[[B"), Key::F2);
        assert_eq!(decode(b"\x1b[15~"), Key::F5);
        assert_eq!(decode(b"\x1b[21~"), Key::F10);
        assert_eq!(decode(b"\x1b[1;2P"), Key::F13);
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(decode(b"\x1b[1;5A"), Key::ControlUp);
        assert_eq!(decode(b"\x1b[5D"), Key::ControlLeft);
        assert_eq!(decode(b"\x1b[Oc"), Key::ControlRight);
        assert_eq!(decode(b"\x1b[1;2C"), Key::ShiftRight);
    }

    #[test]
    fn ignored_sequences() {
        assert_eq!(decode(b"\x1b[E"), Key::Ignore);
        assert_eq!(decode(b"\x1b[G"), Key::Ignore);
    }

    #[test]
    fn arrow_followed_by_text_is_not_defined() {
        assert_eq!(decode(b"\x1b[Ax"), Key::NotDefined);
    }

    // ── Priority ────────────────────────────────────────────────────────

    #[test]
    fn first_entry_wins_on_collision() {
        // Registered both as Home and F17; Home comes first.
        assert_eq!(decode(b"\x1b[1~"), Key::Home);
        assert_eq!(decode(b"\x1b[3~"), Key::Delete);
    }

    #[test]
    fn decoder_struct_matches_function() {
        assert_eq!(KeyDecoder.decode(b"\x05"), Key::ControlE);
    }

    // ── Names ───────────────────────────────────────────────────────────

    #[test]
    fn parse_key_names() {
        assert_eq!("ControlA".parse::<Key>(), Ok(Key::ControlA));
        assert_eq!("backtab".parse::<Key>(), Ok(Key::BackTab));
        assert_eq!("f12".parse::<Key>(), Ok(Key::F12));
    }

    #[test]
    fn parse_unknown_key() {
        assert_eq!(
            "Hyper".parse::<Key>(),
            Err(UnknownKey("Hyper".to_string()))
        );
    }

    #[test]
    fn display_is_variant_name() {
        assert_eq!(Key::ControlSquareClose.to_string(), "ControlSquareClose");
    }

    #[test]
    fn every_table_key_is_listed() {
        for entry in ASCII_SEQUENCES {
            assert!(Key::ALL.contains(&entry.key));
        }
    }
}
