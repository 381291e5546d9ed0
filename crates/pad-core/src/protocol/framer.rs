//! Incremental splitter for the device's newline-delimited command stream.
//!
//! Wire format (device → host): ASCII, one command token per line, lines
//! terminated by a single `\n` byte. The framer consumes arbitrary byte
//! chunks and emits completed tokens with the newline stripped; a partial
//! token with no trailing newline is retained across calls, so the caller
//! can feed whatever the serial read happened to return.
//!
//! # Overflow policy
//!
//! The firmware never sends tokens longer than a few bytes, so an
//! accumulator that keeps growing means the link is corrupted (wrong baud
//! rate, noise). Rather than growing without bound, the framer caps the
//! token at [`MAX_TOKEN_LEN`] and discards the rest of that line; the next
//! `\n` resynchronizes the stream without emitting the damaged token.

use tracing::warn;

/// Longest accepted command token, in bytes.
pub const MAX_TOKEN_LEN: usize = 512;

/// Incremental newline framer. Restartable: state survives across `push`
/// calls, and `push(&[])` is a no-op.
#[derive(Debug, Default)]
pub struct CommandFramer {
    accumulator: Vec<u8>,
    /// Set while skipping the remainder of an oversized line.
    discarding: bool,
}

impl CommandFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `bytes` and returns every token completed by this chunk, in
    /// arrival order.
    ///
    /// An empty line still yields an empty token; dispatch harmlessly finds
    /// no match for it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut tokens = Vec::new();

        for &byte in bytes {
            if byte == b'\n' {
                if self.discarding {
                    // End of the damaged line; resynchronized.
                    self.discarding = false;
                } else {
                    tokens.push(String::from_utf8_lossy(&self.accumulator).into_owned());
                }
                self.accumulator.clear();
                continue;
            }

            if self.discarding {
                continue;
            }

            if self.accumulator.len() >= MAX_TOKEN_LEN {
                warn!(
                    limit = MAX_TOKEN_LEN,
                    "command token exceeded length limit; discarding line"
                );
                self.accumulator.clear();
                self.discarding = true;
                continue;
            }

            self.accumulator.push(byte);
        }

        tokens
    }

    /// Drops any partial token and overflow state.
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.discarding = false;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
