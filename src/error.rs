//! Error types.
//!
//! The render core is infallible: unknown input degrades to `Key::Unknown`,
//! missing handlers fall back to child concatenation, and cache misses simply
//! re-derive. Only geometry computation and terminal I/O can fail.

use thiserror::Error;

/// Errors surfaced by the layout provider and the terminal session.
#[derive(Debug, Error)]
pub enum Error {
    /// The geometry provider rejected the tree.
    #[error("layout computation failed: {0}")]
    Layout(#[from] taffy::TaffyError),

    /// Terminal or stdin I/O failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The terminal is not usable (for example stdin is not a tty).
    #[error("terminal unavailable: {0}")]
    Terminal(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_terminal_error_message() {
        let err = Error::Terminal("stdin is not a tty".into());
        assert_eq!(err.to_string(), "terminal unavailable: stdin is not a tty");
    }
}
