//! Barcode scan recognizer
//!
//! Scanners type far faster than people and finish every code with Enter.
//! Characters accumulate until Enter; a gap longer than the inactivity
//! timeout throws the partial buffer away, so slow human typing never turns
//! into a scan.

use tokio::time::{Duration, Instant};
use tracing::trace;

/// Default inactivity window between scanner keystrokes
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_millis(100);

/// Shortest buffer that Enter accepts as a scan
pub const MIN_SCAN_LEN: usize = 3;

/// Keyboard input as the recognizer sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character key
    Char(char),
    /// Completion key
    Enter,
    /// Shift on its own (scanners emit it around upper-case characters)
    Shift,
    /// Any other key without a character (arrows, function keys, ...)
    Other,
}

/// Stateful scan recognizer owned by the screen
#[derive(Debug)]
pub struct ScanRecognizer {
    buffer: String,
    deadline: Option<Instant>,
    timeout: Duration,
    min_len: usize,
    disposed: bool,
}

impl Default for ScanRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_TIMEOUT)
    }
}

impl ScanRecognizer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            buffer: String::new(),
            deadline: None,
            timeout,
            min_len: MIN_SCAN_LEN,
            disposed: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Characters accumulated since the last flush
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// When the pending buffer will be discarded, if anything is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Feed one key using the current clock
    pub fn on_key(&mut self, key: KeyInput) -> Option<String> {
        self.on_key_at(key, Instant::now())
    }

    /// Feed one key observed at `now`; returns the completed scan, if any
    pub fn on_key_at(&mut self, key: KeyInput, now: Instant) -> Option<String> {
        if self.disposed {
            return None;
        }

        match key {
            KeyInput::Shift => None,
            KeyInput::Enter => {
                self.flush_expired(now);
                if self.buffer.chars().count() < self.min_len {
                    trace!(len = self.buffer.len(), "Enter ignored, buffer too short");
                    return None;
                }
                self.deadline = None;
                Some(std::mem::take(&mut self.buffer))
            }
            KeyInput::Char(c) => {
                self.flush_expired(now);
                self.buffer.push(c);
                self.deadline = Some(now + self.timeout);
                None
            }
            KeyInput::Other => {
                self.flush_expired(now);
                self.deadline = Some(now + self.timeout);
                None
            }
        }
    }

    /// Discard the buffer if the inactivity deadline has passed
    ///
    /// Returns true when something was discarded.
    pub fn flush_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                if !self.buffer.is_empty() {
                    trace!(discarded = %self.buffer, "Scan buffer timed out");
                }
                self.buffer.clear();
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the pending deadline and stop accepting input
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.deadline = None;
        self.buffer.clear();
    }
}
