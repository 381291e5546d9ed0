//! pad-host library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does pad-host do? (for beginners)
//!
//! The *host* is the desktop companion of a physical macro keypad connected
//! over a serial link. The keypad's firmware owns the keys and the LEDs but
//! nothing else; every interesting side effect happens on this side:
//!
//! 1. A background listener thread reads bytes from the serial port and
//!    splits them into newline-delimited command tokens ("VOLUMEUP\n").
//! 2. Each token is resolved against a configurable registry and, when a
//!    binding exists, executed: either a key-macro chord injected into the
//!    OS input queue or an external process launch.
//! 3. Once per frame, the tick thread runs an embedded Lua script that may
//!    repaint the in-memory LED grid, then mirrors that grid back to the
//!    device as a raw RGB frame.
//!
//! The registry persists to the same JSON config file the device's original
//! tooling used, via `pad-core`.

/// Application layer: use cases and port traits for the host.
pub mod application;

/// Infrastructure layer: serial, OS input, process, and scripting adapters.
pub mod infrastructure;
