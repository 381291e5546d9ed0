//! Outbound LED frame encoding (host → device).
//!
//! Wire format, once per tick while connected:
//! ```text
//! [header: "LEDSDATA\n"][payload: N*3 raw bytes, one RGB triple per key]
//! ```
//! Payload order is row-major, matching the physical key layout. There is no
//! checksum and no length prefix beyond the fixed `N`; the firmware relies
//! on the byte count alone, so this shape must be preserved bit-exactly for
//! hardware compatibility.

use crate::domain::led::LedState;

/// Literal frame header, newline terminator included.
pub const FRAME_HEADER: &[u8] = b"LEDSDATA\n";

/// Total encoded size of a frame for an `n`-key grid.
pub const fn frame_len(n: usize) -> usize {
    FRAME_HEADER.len() + n * 3
}

/// Serializes a snapshot of `leds` into one complete frame.
pub fn encode_led_frame(leds: &LedState) -> Vec<u8> {
    let mut frame = Vec::with_capacity(frame_len(leds.len()));
    frame.extend_from_slice(FRAME_HEADER);
    for led in leds.as_slice() {
        frame.push(led.r);
        frame.push(led.g);
        frame.push(led.b);
    }
    frame
}

// ── Tests ─────────────────────────────────────────────────────────────────────
