//! Key decoding.
//!
//! Turns one token (a raw escape sequence or a single character) into a
//! [`KeyEvent`]. Decoding never fails: anything unrecognised becomes
//! [`Key::Unknown`] carrying the raw text.

use std::fmt;

bitflags::bitflags! {
    /// Keyboard modifiers, in xterm parameter bit order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const META  = 1 << 3;
    }
}

/// Decode an xterm modifier parameter (`1 + bitmask`).
pub fn decode_modifier_param(param: u32) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1).min(u8::MAX as u32) as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char,
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
    Unknown,
}

impl Key {
    pub fn name(&self) -> String {
        match self {
            Key::Char => "char".into(),
            Key::Enter => "enter".into(),
            Key::Tab => "tab".into(),
            Key::Backspace => "backspace".into(),
            Key::Escape => "escape".into(),
            Key::Up => "up".into(),
            Key::Down => "down".into(),
            Key::Left => "left".into(),
            Key::Right => "right".into(),
            Key::Home => "home".into(),
            Key::End => "end".into(),
            Key::PageUp => "pageup".into(),
            Key::PageDown => "pagedown".into(),
            Key::Insert => "insert".into(),
            Key::Delete => "delete".into(),
            Key::F(n) => format!("f{n}"),
            Key::Unknown => "unknown".into(),
        }
    }
}

/// A decoded keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// The character for [`Key::Char`], the raw sequence for
    /// [`Key::Unknown`], `None` otherwise.
    pub ch: Option<String>,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            ch: None,
            modifiers,
        }
    }

    pub fn char(ch: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: Key::Char,
            ch: Some(ch.into()),
            modifiers,
        }
    }

    pub fn unknown(raw: impl Into<String>) -> Self {
        Self {
            key: Key::Unknown,
            ch: Some(raw.into()),
            modifiers: Modifiers::empty(),
        }
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    pub fn meta(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }

    /// The first character of `ch`, if any.
    pub fn first_char(&self) -> Option<char> {
        self.ch.as_deref().and_then(|s| s.chars().next())
    }

    pub fn is_ctrl_c(&self) -> bool {
        self.key == Key::Char && self.ctrl() && self.first_char() == Some('\x03')
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, label) in [
            (Modifiers::CTRL, "ctrl+"),
            (Modifiers::ALT, "alt+"),
            (Modifiers::SHIFT, "shift+"),
            (Modifiers::META, "meta+"),
        ] {
            if self.modifiers.contains(flag) {
                f.write_str(label)?;
            }
        }
        match (&self.key, self.first_char()) {
            (Key::Char, Some(c)) if (c as u32) < 0x20 => {
                write!(f, "{}", ((c as u8) + b'`') as char)
            }
            (Key::Char, Some(_)) => f.write_str(self.ch.as_deref().unwrap_or_default()),
            (key, _) => f.write_str(&key.name()),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one key token.
///
/// Fixed table first: `\r` is Enter, `\n` is Shift+Enter, `\t` is Tab and
/// both `\x7f` and `\x08` are Backspace. Terminals send `\x08` for
/// Backspace as well as Ctrl+H, so Ctrl+H is not reported as a control
/// character. Other bytes below `0x20` decode as `Char` with Ctrl set.
pub fn decode_key(raw: &str) -> KeyEvent {
    match raw {
        "\r" => return KeyEvent::new(Key::Enter, Modifiers::empty()),
        "\n" => return KeyEvent::new(Key::Enter, Modifiers::SHIFT),
        "\t" => return KeyEvent::new(Key::Tab, Modifiers::empty()),
        "\x7f" | "\x08" => return KeyEvent::new(Key::Backspace, Modifiers::empty()),
        "\x1b" => return KeyEvent::new(Key::Escape, Modifiers::empty()),
        "\x1b\x7f" => return KeyEvent::new(Key::Backspace, Modifiers::ALT),
        "\x1b\r" => return KeyEvent::new(Key::Enter, Modifiers::ALT),
        _ => {}
    }

    if let Some(body) = raw.strip_prefix("\x1b[") {
        return decode_csi(body).unwrap_or_else(|| KeyEvent::unknown(raw));
    }
    if let Some(body) = raw.strip_prefix("\x1bO") {
        if let Some(event) = decode_ss3(body) {
            return event;
        }
    }

    let mut chars = raw.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('\x1b'), Some(c), None) => decode_alt(c, raw),
        (Some(c), None, _) => decode_char(c),
        _ => KeyEvent::unknown(raw),
    }
}

fn decode_char(c: char) -> KeyEvent {
    let code = c as u32;
    if code < 0x20 {
        return KeyEvent::char(c, Modifiers::CTRL);
    }
    if (0x20..=0x7e).contains(&code) {
        let modifiers = if c.is_ascii_uppercase() {
            Modifiers::SHIFT
        } else {
            Modifiers::empty()
        };
        return KeyEvent::char(c, modifiers);
    }
    KeyEvent::char(c, Modifiers::empty())
}

fn decode_alt(c: char, raw: &str) -> KeyEvent {
    if (c as u32) < 0x20 || c == '\x7f' {
        return KeyEvent::unknown(raw);
    }
    let mut event = decode_char(c);
    event.modifiers |= Modifiers::ALT;
    event
}

/// SS3: `ESC O` + letter (application-mode arrows, F1-F4).
fn decode_ss3(body: &str) -> Option<KeyEvent> {
    let key = match body {
        "A" => Key::Up,
        "B" => Key::Down,
        "C" => Key::Right,
        "D" => Key::Left,
        "H" => Key::Home,
        "F" => Key::End,
        "P" => Key::F(1),
        "Q" => Key::F(2),
        "R" => Key::F(3),
        "S" => Key::F(4),
        _ => return None,
    };
    Some(KeyEvent::new(key, Modifiers::empty()))
}

/// CSI body (after `ESC [`): parameters then a final letter or `~`.
fn decode_csi(body: &str) -> Option<KeyEvent> {
    let final_byte = body.chars().last()?;
    let params_str = &body[..body.len() - final_byte.len_utf8()];

    let mut params: Vec<u32> = Vec::new();
    if !params_str.is_empty() {
        for part in params_str.split(';') {
            params.push(if part.is_empty() { 1 } else { part.parse().ok()? });
        }
    }
    let modifiers = params
        .get(1)
        .map(|&p| decode_modifier_param(p))
        .unwrap_or_else(Modifiers::empty);

    let key = match final_byte {
        'A' => Key::Up,
        'B' => Key::Down,
        'C' => Key::Right,
        'D' => Key::Left,
        'H' => Key::Home,
        'F' => Key::End,
        'P' => Key::F(1),
        'Q' => Key::F(2),
        'R' => Key::F(3),
        'S' => Key::F(4),
        'Z' => return Some(KeyEvent::new(Key::Tab, Modifiers::SHIFT | modifiers)),
        '~' => match *params.first()? {
            1 | 7 => Key::Home,
            2 => Key::Insert,
            3 => Key::Delete,
            4 | 8 => Key::End,
            5 => Key::PageUp,
            6 => Key::PageDown,
            n @ 11..=15 => Key::F((n - 10) as u8),
            n @ 17..=21 => Key::F((n - 11) as u8),
            n @ 23..=24 => Key::F((n - 12) as u8),
            _ => return None,
        },
        _ => return None,
    };

    // Letter finals only take the `1;N` parameter form.
    if final_byte != '~' && !params.is_empty() && params[0] != 1 {
        return None;
    }

    Some(KeyEvent::new(key, modifiers))
}

// =============================================================================
// Bindings
// =============================================================================

/// A key combination to match events against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBinding {
    /// Ctrl + letter, as sent by terminals (a control byte).
    Ctrl(char),
    /// Alt + character.
    Alt(char),
    /// A named key with exactly these modifiers.
    Key(Key, Modifiers),
}

impl KeyBinding {
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match self {
            KeyBinding::Ctrl(c) => {
                let control = ((c.to_ascii_lowercase() as u32) & 0x1f) as u8 as char;
                event.key == Key::Char && event.ctrl() && event.first_char() == Some(control)
            }
            KeyBinding::Alt(c) => {
                event.key == Key::Char && event.alt() && event.first_char() == Some(*c)
            }
            KeyBinding::Key(key, modifiers) => event.key == *key && event.modifiers == *modifiers,
        }
    }
}
