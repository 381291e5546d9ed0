//! Domain module containing the action model and the LED grid.

pub mod action;
pub mod led;

pub use action::{Action, ActionInvariantError, ActionRegistry, KeyCode};
pub use led::{LedState, Rgb};
