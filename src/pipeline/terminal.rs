//! Terminal setup and teardown.
//!
//! [`TerminalSession`] enters raw mode, the alternate screen and SGR mouse
//! reporting, and restores everything when dropped. Frames are written with
//! [`write_frame`], which homes the cursor, clears the screen and emits the
//! rendered lines with `\r\n` endings (raw mode disables output newline
//! translation).

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Write one frame to `out`.
pub fn write_frame(out: &mut impl Write, text: &str) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    let body = text.strip_suffix('\n').unwrap_or(text);
    for (i, line) in body.split('\n').enumerate() {
        if i > 0 {
            out.write_all(b"\r\n")?;
        }
        out.write_all(line.as_bytes())?;
    }
    out.flush()
}

/// Raw-mode fullscreen session on stdout.
pub struct TerminalSession {
    out: Stdout,
    mouse: bool,
    active: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen, optionally with mouse
    /// reporting.
    pub fn enter(mouse: bool) -> Result<Self> {
        if !terminal::is_raw_mode_enabled().unwrap_or(false) {
            enable_raw_mode().map_err(|e| Error::Terminal(format!("raw mode: {e}")))?;
        }

        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        if mouse {
            execute!(out, EnableMouseCapture)?;
        }
        debug!(mouse, "terminal session started");

        Ok(Self {
            out,
            mouse,
            active: true,
        })
    }

    pub fn draw(&mut self, text: &str) -> Result<()> {
        write_frame(&mut self.out, text)?;
        Ok(())
    }

    /// Restore the terminal. Called automatically on drop.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        if self.mouse {
            execute!(self.out, DisableMouseCapture)?;
        }
        execute!(self.out, Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        debug!("terminal session restored");
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}
