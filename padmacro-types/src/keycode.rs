use heapless::Vec;
use serde::{Deserialize, Serialize};
use strum::FromRepr;

use crate::MAX_COMBO_KEYS;

/// Ordered set of keys carried by a press action
pub type KeySet = Vec<HidKeyCode, MAX_COMBO_KEYS>;

/// Keyboard page usages from the HID usage tables.
///
/// Only the keys a macro can reasonably emit are listed: the standard 104-key
/// block plus the eight modifiers.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidKeyCode {
    /// Reserved, no-key.
    No = 0x00,
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,
    Kc1 = 0x1E,
    Kc2 = 0x1F,
    Kc3 = 0x20,
    Kc4 = 0x21,
    Kc5 = 0x22,
    Kc6 = 0x23,
    Kc7 = 0x24,
    Kc8 = 0x25,
    Kc9 = 0x26,
    Kc0 = 0x27,
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    /// `-` and `_`
    Minus = 0x2D,
    /// `=` and `+`
    Equal = 0x2E,
    /// `[` and `{`
    LeftBracket = 0x2F,
    /// `]` and `}`
    RightBracket = 0x30,
    /// `\` and `|`
    Backslash = 0x31,
    /// Non-US `#` and `~`
    NonusHash = 0x32,
    /// `;` and `:`
    Semicolon = 0x33,
    /// `'` and `"`
    Quote = 0x34,
    /// `` ` `` and `~`
    Grave = 0x35,
    /// `,` and `<`
    Comma = 0x36,
    /// `.` and `>`
    Dot = 0x37,
    /// `/` and `?`
    Slash = 0x38,
    CapsLock = 0x39,
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,
}

/// Named keys accepted in macro definitions, besides single letters and digits.
const KEY_NAMES: &[(&str, HidKeyCode)] = &[
    ("ENTER", HidKeyCode::Enter),
    ("RETURN", HidKeyCode::Enter),
    ("ESCAPE", HidKeyCode::Escape),
    ("ESC", HidKeyCode::Escape),
    ("BACKSPACE", HidKeyCode::Backspace),
    ("TAB", HidKeyCode::Tab),
    ("SPACE", HidKeyCode::Space),
    ("SPACEBAR", HidKeyCode::Space),
    ("MINUS", HidKeyCode::Minus),
    ("EQUALS", HidKeyCode::Equal),
    ("LEFT_BRACKET", HidKeyCode::LeftBracket),
    ("RIGHT_BRACKET", HidKeyCode::RightBracket),
    ("BACKSLASH", HidKeyCode::Backslash),
    ("POUND", HidKeyCode::NonusHash),
    ("SEMICOLON", HidKeyCode::Semicolon),
    ("QUOTE", HidKeyCode::Quote),
    ("GRAVE_ACCENT", HidKeyCode::Grave),
    ("COMMA", HidKeyCode::Comma),
    ("PERIOD", HidKeyCode::Dot),
    ("FORWARD_SLASH", HidKeyCode::Slash),
    ("CAPS_LOCK", HidKeyCode::CapsLock),
    ("F1", HidKeyCode::F1),
    ("F2", HidKeyCode::F2),
    ("F3", HidKeyCode::F3),
    ("F4", HidKeyCode::F4),
    ("F5", HidKeyCode::F5),
    ("F6", HidKeyCode::F6),
    ("F7", HidKeyCode::F7),
    ("F8", HidKeyCode::F8),
    ("F9", HidKeyCode::F9),
    ("F10", HidKeyCode::F10),
    ("F11", HidKeyCode::F11),
    ("F12", HidKeyCode::F12),
    ("PRINT_SCREEN", HidKeyCode::PrintScreen),
    ("SCROLL_LOCK", HidKeyCode::ScrollLock),
    ("PAUSE", HidKeyCode::Pause),
    ("INSERT", HidKeyCode::Insert),
    ("HOME", HidKeyCode::Home),
    ("PAGE_UP", HidKeyCode::PageUp),
    ("PAGEUP", HidKeyCode::PageUp),
    ("DELETE", HidKeyCode::Delete),
    ("END", HidKeyCode::End),
    ("PAGE_DOWN", HidKeyCode::PageDown),
    ("PAGEDOWN", HidKeyCode::PageDown),
    ("RIGHT", HidKeyCode::Right),
    ("RIGHT_ARROW", HidKeyCode::Right),
    ("LEFT", HidKeyCode::Left),
    ("LEFT_ARROW", HidKeyCode::Left),
    ("DOWN", HidKeyCode::Down),
    ("DOWN_ARROW", HidKeyCode::Down),
    ("UP", HidKeyCode::Up),
    ("UP_ARROW", HidKeyCode::Up),
    ("CTRL", HidKeyCode::LCtrl),
    ("CONTROL", HidKeyCode::LCtrl),
    ("LEFT_CONTROL", HidKeyCode::LCtrl),
    ("LEFT_CTRL", HidKeyCode::LCtrl),
    ("RIGHT_CONTROL", HidKeyCode::RCtrl),
    ("RIGHT_CTRL", HidKeyCode::RCtrl),
    ("SHIFT", HidKeyCode::LShift),
    ("LEFT_SHIFT", HidKeyCode::LShift),
    ("RIGHT_SHIFT", HidKeyCode::RShift),
    ("ALT", HidKeyCode::LAlt),
    ("OPTION", HidKeyCode::LAlt),
    ("LEFT_ALT", HidKeyCode::LAlt),
    ("RIGHT_ALT", HidKeyCode::RAlt),
    ("GUI", HidKeyCode::LGui),
    ("WIN", HidKeyCode::LGui),
    ("WINDOWS", HidKeyCode::LGui),
    ("CMD", HidKeyCode::LGui),
    ("COMMAND", HidKeyCode::LGui),
    ("LEFT_GUI", HidKeyCode::LGui),
    ("RIGHT_GUI", HidKeyCode::RGui),
];

impl HidKeyCode {
    /// Returns `true` if the keycode is a modifier keycode
    pub fn is_modifier(self) -> bool {
        HidKeyCode::LCtrl <= self && self <= HidKeyCode::RGui
    }

    /// Look a key up by its name, ignoring case and surrounding whitespace.
    ///
    /// Single letters and digits map to their own key, everything else goes
    /// through the alias table (`ESC`, `CMD`, `PAGE_UP`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let &[c] = name.as_bytes() {
            return match c {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => Some(from_ascii(c.to_ascii_lowercase())?.0),
                _ => None,
            };
        }
        KEY_NAMES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, key)| *key)
    }
}

/// Convert an ascii char to keycode, and whether the keycode should be shifted.
///
/// Assumes en-us keyboard mapping. Returns `None` for bytes with no key.
pub fn from_ascii(ascii: u8) -> Option<(HidKeyCode, bool)> {
    let mapped = match ascii {
        b'a'..=b'z' => (HidKeyCode::from_repr(ascii - b'a' + HidKeyCode::A as u8)?, false),
        b'A'..=b'Z' => (HidKeyCode::from_repr(ascii - b'A' + HidKeyCode::A as u8)?, true),
        b'1'..=b'9' => (HidKeyCode::from_repr(ascii - b'1' + HidKeyCode::Kc1 as u8)?, false),
        b'0' => (HidKeyCode::Kc0, false),
        b'!' => (HidKeyCode::Kc1, true),
        b'@' => (HidKeyCode::Kc2, true),
        b'#' => (HidKeyCode::Kc3, true),
        b'$' => (HidKeyCode::Kc4, true),
        b'%' => (HidKeyCode::Kc5, true),
        b'^' => (HidKeyCode::Kc6, true),
        b'&' => (HidKeyCode::Kc7, true),
        b'*' => (HidKeyCode::Kc8, true),
        b'(' => (HidKeyCode::Kc9, true),
        b')' => (HidKeyCode::Kc0, true),
        b'-' => (HidKeyCode::Minus, false),
        b'_' => (HidKeyCode::Minus, true),
        b'=' => (HidKeyCode::Equal, false),
        b'+' => (HidKeyCode::Equal, true),
        b'[' => (HidKeyCode::LeftBracket, false),
        b'{' => (HidKeyCode::LeftBracket, true),
        b']' => (HidKeyCode::RightBracket, false),
        b'}' => (HidKeyCode::RightBracket, true),
        b'\\' => (HidKeyCode::Backslash, false),
        b'|' => (HidKeyCode::Backslash, true),
        b';' => (HidKeyCode::Semicolon, false),
        b':' => (HidKeyCode::Semicolon, true),
        b'\'' => (HidKeyCode::Quote, false),
        b'"' => (HidKeyCode::Quote, true),
        b'`' => (HidKeyCode::Grave, false),
        b'~' => (HidKeyCode::Grave, true),
        b',' => (HidKeyCode::Comma, false),
        b'<' => (HidKeyCode::Comma, true),
        b'.' => (HidKeyCode::Dot, false),
        b'>' => (HidKeyCode::Dot, true),
        b'/' => (HidKeyCode::Slash, false),
        b'?' => (HidKeyCode::Slash, true),
        b' ' => (HidKeyCode::Space, false),
        b'\n' => (HidKeyCode::Enter, false),
        b'\t' => (HidKeyCode::Tab, false),
        b'\x08' => (HidKeyCode::Backspace, false),
        b'\x1B' => (HidKeyCode::Escape, false),
        b'\x7F' => (HidKeyCode::Delete, false),
        _ => return None,
    };
    Some(mapped)
}
