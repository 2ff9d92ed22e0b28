//! Stdin reader thread.
//!
//! Reads raw bytes from stdin on a dedicated thread and forwards each chunk
//! over a channel. The consumer feeds chunks to an
//! [`InputManager`](super::InputManager) and calls `flush_pending` when
//! `recv_timeout` expires with bytes still buffered.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

/// How long to wait for the rest of an escape sequence before treating a
/// buffered ESC as the Escape key.
pub const ESCAPE_TIMEOUT_MS: u64 = 10;

pub enum StdinMessage {
    Data(Vec<u8>),
    /// EOF or a read error.
    Closed,
}

pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl StdinReader {
    pub fn spawn() -> io::Result<(Self, Receiver<StdinMessage>)> {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::Builder::new()
            .name("termflow-stdin".to_string())
            .spawn(move || read_loop(io::stdin(), flag, tx))?;

        Ok((
            Self {
                handle: Some(handle),
                running,
            },
            rx,
        ))
    }

    /// Clear the running flag. A thread that already exited is joined;
    /// one still blocked in `read` is detached and ends on its next chunk
    /// or at EOF.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.is_finished() {
            if handle.join().is_err() {
                warn!("stdin reader panicked");
            }
        } else {
            debug!("stdin reader detached while blocked on read");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_loop(mut source: impl Read, running: Arc<AtomicBool>, tx: Sender<StdinMessage>) {
    let mut buf = [0u8; 256];

    while running.load(Ordering::SeqCst) {
        match source.read(&mut buf) {
            Ok(0) => {
                debug!("stdin closed");
                let _ = tx.send(StdinMessage::Closed);
                break;
            }
            Ok(n) => {
                if tx.send(StdinMessage::Data(buf[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                let _ = tx.send(StdinMessage::Closed);
                break;
            }
        }
    }
    running.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_loop_forwards_chunks_then_closes() {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        read_loop(&b"\x1b[A"[..], running.clone(), tx);

        let messages: Vec<StdinMessage> = rx.try_iter().collect();
        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], StdinMessage::Data(d) if d == b"\x1b[A"));
        assert!(matches!(messages[1], StdinMessage::Closed));
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stop_clears_flag_and_releases_handle() {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let mut reader = StdinReader {
            handle: Some(thread::spawn(move || read_loop(&b""[..], flag, mpsc::channel().0))),
            running,
        };

        reader.stop();
        assert!(!reader.is_running());
        assert!(reader.handle.is_none());
        reader.stop();
    }
}
