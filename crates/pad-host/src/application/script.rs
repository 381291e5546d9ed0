//! ScriptHost port: the boundary between the tick loop and the embedded
//! scripting runtime.
//!
//! The runtime is an injected capability, not a language-global: the host
//! implementation (mlua in the infrastructure layer) receives the LED grid
//! explicitly on every tick and exposes `set_led`/`get_led` to the script
//! for its duration. A fault inside the script surfaces as a
//! [`ScriptError`] here and goes no further: the tick loop logs it and
//! keeps running, and the grid stays in whatever state the script reached
//! before failing (no rollback).

use std::path::{Path, PathBuf};

use pad_core::LedState;
use thiserror::Error;

/// Name of the function the script must define to drive the LEDs.
pub const SCRIPT_ENTRY_POINT: &str = "update_leds";

/// Error type for script loading and execution.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read or its chunk failed to run.
    #[error("failed to load script {path}: {reason}", path = .path.display())]
    Load { path: PathBuf, reason: String },

    /// The per-tick call into the script raised an error.
    #[error("script execution failed: {0}")]
    Execution(String),
}

/// Port trait for the embedded LED scripting runtime.
///
/// Absence of a loaded script, or of the [`SCRIPT_ENTRY_POINT`] function
/// inside it, is not an error: `tick` is then a no-op for LED purposes.
pub trait LedScriptHost {
    /// Loads and runs the script chunk at `path`, replacing any previously
    /// loaded script.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Load`] when the file cannot be read or the
    /// chunk itself fails.
    fn load_script(&mut self, path: &Path) -> Result<(), ScriptError>;

    /// Invokes the script's entry point with the accumulated elapsed time,
    /// giving it bounds-checked read/write access to `leds`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Execution`] for faults raised inside the
    /// script. Never panics across this boundary.
    fn tick(&mut self, elapsed: f32, leds: &mut LedState) -> Result<(), ScriptError>;
}
