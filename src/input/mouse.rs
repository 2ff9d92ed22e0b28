//! Mouse decoding.
//!
//! Three report formats are understood:
//!
//! - SGR: `ESC [ < code ; x ; y (M|m)`, where `m` marks a release
//! - legacy decimal: `ESC [ code ; x ; y M`
//! - X10: `ESC [ M` followed by three raw bytes, each offset by 32
//!
//! Coordinates are kept 1-based as the terminal reports them; use
//! [`MouseEvent::cell`] for 0-based grid cells.

use super::keyboard::Modifiers;

const SHIFT_BIT: u16 = 4;
const ALT_BIT: u16 = 8;
const CTRL_BIT: u16 = 16;
const MOTION_BIT: u16 = 32;

const WHEEL_UP: u16 = 64;
const WHEEL_DOWN: u16 = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Click(MouseButton),
    Release(MouseButton),
    Drag(MouseButton),
    WheelUp,
    WheelDown,
    Unknown,
}

impl MouseAction {
    /// `left_click`, `right_release`, `drag`, `wheel_up`, ...
    pub fn name(&self) -> String {
        match self {
            Self::Click(b) => format!("{}_click", b.name()),
            Self::Release(b) => format!("{}_release", b.name()),
            Self::Drag(_) => "drag".into(),
            Self::WheelUp => "wheel_up".into(),
            Self::WheelDown => "wheel_down".into(),
            Self::Unknown => "unknown".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub action: MouseAction,
    /// 1-based column.
    pub x: u16,
    /// 1-based row.
    pub y: u16,
    pub modifiers: Modifiers,
    pub motion: bool,
    /// Button code as reported, modifier bits included.
    pub raw_code: u16,
}

impl MouseEvent {
    /// 0-based `(column, row)`.
    pub fn cell(&self) -> (u16, u16) {
        (self.x.saturating_sub(1), self.y.saturating_sub(1))
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
}

/// Classify a button code.
fn classify(code: u16, release: bool) -> (MouseAction, Modifiers, bool) {
    let mut modifiers = Modifiers::empty();
    if code & SHIFT_BIT != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if code & ALT_BIT != 0 {
        modifiers |= Modifiers::ALT;
    }
    if code & CTRL_BIT != 0 {
        modifiers |= Modifiers::CTRL;
    }
    let motion = code & MOTION_BIT != 0;
    let base = code & !(SHIFT_BIT | ALT_BIT | CTRL_BIT | MOTION_BIT);

    let action = match (base, MouseButton::from_code(base)) {
        (WHEEL_UP, _) => MouseAction::WheelUp,
        (WHEEL_DOWN, _) => MouseAction::WheelDown,
        (_, Some(button)) if motion => MouseAction::Drag(button),
        (_, Some(button)) if release => MouseAction::Release(button),
        (_, Some(button)) => MouseAction::Click(button),
        (_, None) => MouseAction::Unknown,
    };
    (action, modifiers, motion)
}

fn build(code: u16, x: u16, y: u16, release: bool) -> MouseEvent {
    let (action, modifiers, motion) = classify(code, release);
    MouseEvent {
        action,
        x,
        y,
        modifiers,
        motion,
        raw_code: code,
    }
}

/// Three `;`-separated decimal fields.
fn parse_fields(body: &[u8]) -> Option<(u16, u16, u16)> {
    let text = std::str::from_utf8(body).ok()?;
    let mut fields = text.split(';').map(|f| f.parse::<u16>().ok());
    let code = fields.next()??;
    let x = fields.next()??;
    let y = fields.next()??;
    if fields.next().is_some() {
        return None;
    }
    Some((code, x, y))
}

/// Decode one mouse report. `None` for anything that is not a well-formed
/// report.
pub fn decode_mouse(raw: &[u8]) -> Option<MouseEvent> {
    let body = raw.strip_prefix(b"\x1b[")?;

    if let Some(sgr) = body.strip_prefix(b"<") {
        let (&last, fields) = sgr.split_last()?;
        let release = match last {
            b'M' => false,
            b'm' => true,
            _ => return None,
        };
        let (code, x, y) = parse_fields(fields)?;
        return Some(build(code, x, y, release));
    }

    if let Some(x10) = body.strip_prefix(b"M") {
        let [code, x, y] = x10 else {
            return None;
        };
        let offset = |b: u8| u16::from(b).checked_sub(32);
        return Some(build(offset(*code)?, offset(*x)?, offset(*y)?, false));
    }

    let fields = body.strip_suffix(b"M")?;
    let (code, x, y) = parse_fields(fields)?;
    Some(build(code, x, y, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sgr_click_with_modifiers() {
        let ev = decode_mouse(b"\x1b[<20;12;8M").unwrap();
        assert_eq!(ev.action, MouseAction::Click(MouseButton::Left));
        assert_eq!(ev.action.name(), "left_click");
        assert_eq!((ev.x, ev.y), (12, 8));
        assert!(ev.shift() && ev.ctrl() && !ev.alt());
    }

    #[test]
    fn test_sgr_release() {
        let ev = decode_mouse(b"\x1b[<0;7;3m").unwrap();
        assert_eq!(ev.action.name(), "left_release");
        assert_eq!((ev.x, ev.y), (7, 3));
    }

    #[test]
    fn test_wheel_wins_over_motion() {
        let ev = decode_mouse(b"\x1b[<96;5;4M").unwrap();
        assert_eq!(ev.action, MouseAction::WheelUp);
        assert!(ev.motion);
    }

    #[test]
    fn test_legacy_wheel_down() {
        let ev = decode_mouse(b"\x1b[65;10;11M").unwrap();
        assert_eq!(ev.action.name(), "wheel_down");
        assert_eq!((ev.x, ev.y), (10, 11));
    }

    #[test]
    fn test_drag_and_right_button() {
        assert_eq!(
            decode_mouse(b"\x1b[<32;1;1M").unwrap().action,
            MouseAction::Drag(MouseButton::Left)
        );
        assert_eq!(decode_mouse(b"\x1b[<2;1;1M").unwrap().action.name(), "right_click");
        assert_eq!(decode_mouse(b"\x1b[<3;1;1M").unwrap().action, MouseAction::Unknown);
    }

    #[test]
    fn test_x10() {
        let ev = decode_mouse(&[0x1b, b'[', b'M', 32, 33 + 4, 33 + 2]).unwrap();
        assert_eq!(ev.action.name(), "left_click");
        assert_eq!((ev.x, ev.y), (5, 3));
        assert_eq!(ev.cell(), (4, 2));
    }

    #[test]
    fn test_malformed_is_none() {
        assert!(decode_mouse(b"\x1b[<0;7M").is_none());
        assert!(decode_mouse(b"\x1b[<0;7;3;1M").is_none());
        assert!(decode_mouse(b"\x1b[<a;7;3M").is_none());
        assert!(decode_mouse(b"\x1b[A").is_none());
        assert!(decode_mouse(b"hello").is_none());
        assert!(decode_mouse(&[0x1b, b'[', b'M', 10, 40, 40]).is_none());
    }
}
