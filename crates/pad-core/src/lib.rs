//! # pad-core
//!
//! Shared library for the macro-pad companion containing the command/LED
//! wire protocol, domain entities, and config persistence.
//!
//! This crate is used by the host application (`pad-host`) and by any future
//! configurator tooling. It has zero dependencies on OS APIs, serial handles,
//! or UI frameworks.
//!
//! # Architecture overview (for beginners)
//!
//! The companion process sits between a physical macro keypad (an Arduino-class
//! device on a serial link) and the desktop OS. The device sends short ASCII
//! command tokens ("VOLUMEUP\n"); the host maps each token to a configured
//! side effect and mirrors an in-memory RGB grid back to the device once per
//! frame.
//!
//! This crate (`pad-core`) is the shared foundation. It defines:
//!
//! - **`protocol`** – How bytes travel over the serial link. Inbound bytes
//!   are split into newline-delimited command tokens by [`CommandFramer`];
//!   outbound LED state is serialized into a header-plus-raw-RGB frame by
//!   [`encode_led_frame`].
//!
//! - **`domain`** – Pure business logic with no OS dependencies: the
//!   [`Action`] sum type (key macro or process launch), the
//!   [`ActionRegistry`] command map, and the [`LedState`] RGB grid.
//!
//! - **`config`** – (De)serialization of the registry to the JSON config
//!   file format shared with the device's original tooling.

pub mod config;
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `pad_core::ActionRegistry` instead of `pad_core::domain::action::ActionRegistry`.
pub use config::{
    deserialize_registry, load_registry, save_registry, serialize_registry, ConfigError,
    ConfigRecord,
};
pub use domain::action::{Action, ActionInvariantError, ActionRegistry, KeyCode};
pub use domain::led::{LedState, Rgb};
pub use protocol::frame::{encode_led_frame, frame_len, FRAME_HEADER};
pub use protocol::framer::CommandFramer;
