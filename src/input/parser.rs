//! Input tokenizer.
//!
//! Splits the raw stdin byte stream into one token per event. Escape
//! sequences are recognised in this order:
//!
//! 1. SGR mouse: `ESC [ < digits ; digits ; digits (M|m)`
//! 2. X10 mouse: `ESC [ M` + three raw bytes
//! 3. legacy mouse: `ESC [ digits ; digits ; digits M`
//! 4. generic CSI: `ESC [` up to the first byte in `[A-Za-z~]`
//! 5. SS3: `ESC O` + letter
//! 6. Alt+key: `ESC` + one character
//! 7. a lone `ESC`
//!
//! Anything else is a single (possibly multi-byte) character. Prefixes that
//! could still become a longer sequence stay buffered until more bytes
//! arrive or [`InputTokenizer::flush_pending`] is called after a timeout.

const ESC: u8 = 0x1b;

/// Longest CSI accepted before the leading ESC is given up on.
const MAX_CSI_LEN: usize = 32;

/// One raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A key sequence or a single character.
    Key(String),
    /// A mouse report, as raw bytes (X10 reports are not valid UTF-8).
    Mouse(Vec<u8>),
}

enum Scan {
    Token(Token, usize),
    Incomplete,
}

/// Byte buffer state machine.
#[derive(Debug, Default)]
pub struct InputTokenizer {
    buf: Vec<u8>,
}

impl InputTokenizer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Append `data` and return every complete token at the buffer front.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Token> {
        self.buf.extend_from_slice(data);
        let mut tokens = Vec::new();

        while !self.buf.is_empty() {
            match scan(&self.buf) {
                Scan::Token(token, len) => {
                    self.buf.drain(..len);
                    tokens.push(token);
                }
                Scan::Incomplete => break,
            }
        }
        tokens
    }

    /// Whether bytes are waiting for the rest of a sequence.
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up waiting: tokenize what is buffered as if nothing more will
    /// arrive. A lone ESC becomes the Escape key.
    pub fn flush_pending(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while !self.buf.is_empty() {
            let (token, len) = match scan(&self.buf) {
                Scan::Token(token, len) => (token, len),
                Scan::Incomplete if self.buf[0] == ESC => (key_token(&self.buf[..1]), 1),
                Scan::Incomplete => (key_token(&self.buf), self.buf.len()),
            };
            self.buf.drain(..len);
            tokens.push(token);
        }
        tokens
    }
}

fn key_token(bytes: &[u8]) -> Token {
    Token::Key(String::from_utf8_lossy(bytes).into_owned())
}

fn scan(buf: &[u8]) -> Scan {
    if buf[0] == ESC {
        scan_escape(buf)
    } else {
        scan_char(buf)
    }
}

/// Length of the UTF-8 sequence introduced by `lead`, or `None` if `lead`
/// cannot start one.
fn utf8_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

fn scan_char(buf: &[u8]) -> Scan {
    let Some(len) = utf8_len(buf[0]) else {
        return Scan::Token(key_token(&buf[..1]), 1);
    };
    if buf.len() < len {
        return Scan::Incomplete;
    }
    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => Scan::Token(Token::Key(s.to_string()), len),
        Err(_) => Scan::Token(key_token(&buf[..1]), 1),
    }
}

fn lone_escape() -> Scan {
    Scan::Token(Token::Key("\x1b".into()), 1)
}

fn scan_escape(buf: &[u8]) -> Scan {
    let Some(&second) = buf.get(1) else {
        return Scan::Incomplete;
    };

    match second {
        b'[' => scan_csi(buf),
        b'O' => match buf.get(2) {
            None => Scan::Incomplete,
            Some(c) if c.is_ascii_alphabetic() => Scan::Token(key_token(&buf[..3]), 3),
            Some(_) => Scan::Token(key_token(&buf[..2]), 2),
        },
        ESC => lone_escape(),
        b'\r' | 0x7f => Scan::Token(key_token(&buf[..2]), 2),
        c if c < 0x20 => lone_escape(),
        c => {
            let Some(len) = utf8_len(c) else {
                return lone_escape();
            };
            if buf.len() < 1 + len {
                return Scan::Incomplete;
            }
            match std::str::from_utf8(&buf[1..1 + len]) {
                Ok(_) => Scan::Token(key_token(&buf[..1 + len]), 1 + len),
                Err(_) => lone_escape(),
            }
        }
    }
}

/// Outcome of matching `digits ; digits ; digits` followed by a terminator.
enum Fields {
    /// Terminated by `end` after this many bytes, with this many `;`.
    Done { len: usize, separators: usize },
    /// A byte outside the grammar.
    Mismatch,
    /// Ran out of bytes.
    Incomplete,
}

fn scan_fields(body: &[u8], terminators: &[u8]) -> Fields {
    let mut separators = 0;
    for (i, &b) in body.iter().enumerate() {
        match b {
            b'0'..=b'9' => {}
            b';' => separators += 1,
            _ if terminators.contains(&b) => {
                return Fields::Done {
                    len: i + 1,
                    separators,
                };
            }
            _ => return Fields::Mismatch,
        }
    }
    Fields::Incomplete
}

fn scan_csi(buf: &[u8]) -> Scan {
    // ESC [ <
    if buf.get(2) == Some(&b'<') {
        match scan_fields(&buf[3..], b"Mm") {
            Fields::Done { len, .. } => {
                let end = 3 + len;
                return Scan::Token(Token::Mouse(buf[..end].to_vec()), end);
            }
            Fields::Incomplete => return Scan::Incomplete,
            Fields::Mismatch => {}
        }
    }

    // ESC [ M b x y
    if buf.get(2) == Some(&b'M') {
        if buf.len() < 6 {
            return Scan::Incomplete;
        }
        return Scan::Token(Token::Mouse(buf[..6].to_vec()), 6);
    }

    // ESC [ code ; x ; y M
    if let Fields::Done { len, separators: 2 } = scan_fields(&buf[2..], b"M") {
        let end = 2 + len;
        return Scan::Token(Token::Mouse(buf[..end].to_vec()), end);
    }

    for (i, &b) in buf.iter().enumerate().skip(2) {
        if b.is_ascii_alphabetic() || b == b'~' {
            return Scan::Token(key_token(&buf[..=i]), i + 1);
        }
        if b == ESC || i >= MAX_CSI_LEN {
            return lone_escape();
        }
    }
    Scan::Incomplete
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Token {
        Token::Key(s.to_string())
    }

    #[test]
    fn test_plain_text_one_char_each() {
        let mut t = InputTokenizer::new();
        assert_eq!(t.feed(b"ab"), vec![key("a"), key("b")]);
        assert_eq!(t.feed("é日".as_bytes()), vec![key("é"), key("日")]);
        assert!(!t.has_pending());
    }

    #[test]
    fn test_split_utf8_waits() {
        let mut t = InputTokenizer::new();
        let bytes = "日".as_bytes();
        assert!(t.feed(&bytes[..1]).is_empty());
        assert!(t.has_pending());
        assert_eq!(t.feed(&bytes[1..]), vec![key("日")]);
    }

    #[test]
    fn test_csi_and_ss3() {
        let mut t = InputTokenizer::new();
        assert_eq!(
            t.feed(b"\x1b[A\x1b[1;6D\x1b[3~\x1bOP"),
            vec![key("\x1b[A"), key("\x1b[1;6D"), key("\x1b[3~"), key("\x1bOP")]
        );
    }

    #[test]
    fn test_sgr_mouse_split_across_chunks() {
        let mut t = InputTokenizer::new();
        assert!(t.feed(b"\x1b[<0;1").is_empty());
        assert!(t.has_pending());
        assert_eq!(
            t.feed(b"2;8Mx"),
            vec![Token::Mouse(b"\x1b[<0;12;8M".to_vec()), key("x")]
        );
    }

    #[test]
    fn test_legacy_and_x10_mouse() {
        let mut t = InputTokenizer::new();
        assert_eq!(t.feed(b"\x1b[65;10;11M"), vec![Token::Mouse(b"\x1b[65;10;11M".to_vec())]);

        let x10 = [0x1b, b'[', b'M', 32, 200, 40];
        assert!(t.feed(&x10[..4]).is_empty());
        assert_eq!(t.feed(&x10[4..]), vec![Token::Mouse(x10.to_vec())]);
    }

    #[test]
    fn test_alt_and_lone_escape() {
        let mut t = InputTokenizer::new();
        assert_eq!(t.feed(b"\x1bx"), vec![key("\x1bx")]);
        assert_eq!(t.feed(b"\x1b\x1b[B"), vec![key("\x1b"), key("\x1b[B")]);
        assert!(t.feed(b"\x1b").is_empty());
        assert_eq!(t.flush_pending(), vec![key("\x1b")]);
        assert!(!t.has_pending());
    }

    #[test]
    fn test_flush_partial_sequence() {
        let mut t = InputTokenizer::new();
        assert!(t.feed(b"\x1b[1;").is_empty());
        assert_eq!(t.flush_pending(), vec![key("\x1b"), key("["), key("1"), key(";")]);
    }

    #[test]
    fn test_runaway_csi_gives_up() {
        let mut t = InputTokenizer::new();
        let mut data = b"\x1b[".to_vec();
        data.extend(std::iter::repeat_n(b'1', 40));
        let tokens = t.feed(&data);
        assert_eq!(tokens[0], key("\x1b"));
        assert_eq!(tokens.len(), 1 + 1 + 40);
    }
}
