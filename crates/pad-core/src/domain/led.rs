//! The in-memory LED grid mirrored to the device every tick.
//!
//! The pad exposes one RGB LED per physical key, arranged row-major. The
//! grid's capacity is fixed at construction: the wire protocol transmits
//! exactly `rows * cols * 3` payload bytes per frame, so growing or
//! shrinking the grid mid-session would desynchronize host and firmware.
//!
//! Ownership: the grid is a plain field of the session controller and is
//! touched only by the tick thread (script writes, frame-writer reads, UI
//! reads/writes). No interior synchronization is needed or provided.

use serde::{Deserialize, Serialize};

/// One 8-bit-per-channel RGB triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The stock pad boots showing this purple on every key.
pub const DEFAULT_LED_COLOR: Rgb = Rgb::new(175, 45, 246);

/// Grid dimensions of the stock 441-key macro pad.
pub const MACRO_PAD_ROWS: usize = 21;
/// Grid dimensions of the stock 441-key macro pad.
pub const MACRO_PAD_COLS: usize = 21;

/// Fixed-capacity row-major grid of per-key RGB values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedState {
    rows: usize,
    cols: usize,
    leds: Vec<Rgb>,
}

impl LedState {
    /// Creates a grid of `rows * cols` LEDs, all set to `color`.
    pub fn new(rows: usize, cols: usize, color: Rgb) -> Self {
        Self {
            rows,
            cols,
            leds: vec![color; rows * cols],
        }
    }

    /// Creates the stock 21x21 grid in the boot color.
    pub fn macro_pad() -> Self {
        Self::new(MACRO_PAD_ROWS, MACRO_PAD_COLS, DEFAULT_LED_COLOR)
    }

    /// Total number of LEDs (`rows * cols`).
    pub fn len(&self) -> usize {
        self.leds.len()
    }

    /// Whether the grid has zero LEDs.
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Reads the LED at `index` (row-major), `None` out of `[0, len)`.
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.leds.get(index).copied()
    }

    /// Writes the LED at `index`; returns `false` when out of `[0, len)`.
    pub fn set(&mut self, index: usize, color: Rgb) -> bool {
        match self.leds.get_mut(index) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    /// Sets every LED to `color`.
    pub fn fill(&mut self, color: Rgb) {
        self.leds.fill(color);
    }

    /// Iterates over the LEDs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Rgb> {
        self.leds.iter()
    }

    /// Row-major view of the grid, for the frame encoder and the UI.
    pub fn as_slice(&self) -> &[Rgb] {
        &self.leds
    }

    /// Mutable row-major view, for the UI editor.
    pub fn as_mut_slice(&mut self) -> &mut [Rgb] {
        &mut self.leds
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_pad_is_441_keys_of_boot_purple() {
        let leds = LedState::macro_pad();
        assert_eq!(leds.len(), 441);
        assert_eq!(leds.rows(), 21);
        assert_eq!(leds.cols(), 21);
        assert!(leds.as_slice().iter().all(|&c| c == DEFAULT_LED_COLOR));
    }

    #[test]
    fn test_get_and_set_are_bounds_checked() {
        let mut leds = LedState::new(2, 2, Rgb::default());
        assert!(leds.set(3, Rgb::new(1, 2, 3)));
        assert_eq!(leds.get(3), Some(Rgb::new(1, 2, 3)));

        assert!(!leds.set(4, Rgb::new(9, 9, 9)));
        assert_eq!(leds.get(4), None);
    }

    #[test]
    fn test_fill_overwrites_every_led() {
        let mut leds = LedState::new(3, 3, Rgb::default());
        leds.fill(Rgb::new(10, 20, 30));
        assert!(leds.as_slice().iter().all(|&c| c == Rgb::new(10, 20, 30)));
    }

    #[test]
    fn test_capacity_is_fixed_after_construction() {
        let mut leds = LedState::new(2, 3, Rgb::default());
        let before = leds.len();
        leds.fill(Rgb::new(1, 1, 1));
        leds.set(0, Rgb::new(2, 2, 2));
        assert_eq!(leds.len(), before);
    }
}
