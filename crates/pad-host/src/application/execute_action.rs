//! ExecuteActionUseCase: performs the side effect a command token maps to.
//!
//! This use case sits at the application layer and delegates to the
//! [`KeyInjector`] and [`ProcessLauncher`] trait objects for OS-level work.
//! The platform-specific implementations are in the infrastructure layer.
//!
//! # Macro ordering contract
//!
//! For a macro of `k` keys, execution injects exactly `2k` events: the first
//! `k` are presses in listed order, the last `k` are releases in reverse
//! listed order. The LIFO release is what makes modifier chords work: for
//! `[LWIN, SHIFT, S]` the OS sees Win and Shift held while S is tapped, then
//! the chord unwinds innermost-first.

use std::path::Path;
use std::sync::Arc;

use pad_core::{Action, KeyCode};
use thiserror::Error;

/// Error type for key injection operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InjectionError {
    #[error("platform error: {0}")]
    Platform(String),
}

/// Error type for process launch operations.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The OS refused to spawn the process.
    #[error("failed to spawn {path}: {source}", path = .path.display())]
    Spawn {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error type for action execution, reported per action; the session
/// continues after any of these.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("key injection failed: {0}")]
    Injection(#[from] InjectionError),
    #[error("process launch failed: {0}")]
    Launch(#[from] LaunchError),
}

/// Platform-agnostic key injection trait.
///
/// Each supported OS provides an implementation in the infrastructure layer
/// (`SendInput` on Windows; the mock elsewhere and in tests).
pub trait KeyInjector: Send + Sync {
    /// Injects a key-down event for `key`.
    fn key_down(&self, key: KeyCode) -> Result<(), InjectionError>;

    /// Injects a key-up event for `key`.
    fn key_up(&self, key: KeyCode) -> Result<(), InjectionError>;
}

/// Platform-agnostic process launch trait.
pub trait ProcessLauncher: Send + Sync {
    /// Spawns the program at `path` with no arguments, without waiting for
    /// it to exit.
    fn spawn(&self, path: &Path) -> Result<(), LaunchError>;
}

/// The Execute Action use case.
///
/// Synchronous and blocking; returns success or failure, never panics
/// across the session boundary.
pub struct ExecuteActionUseCase {
    injector: Arc<dyn KeyInjector>,
    launcher: Arc<dyn ProcessLauncher>,
}

impl ExecuteActionUseCase {
    /// Creates a new use case with the given platform adapters.
    pub fn new(injector: Arc<dyn KeyInjector>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self { injector, launcher }
    }

    /// Performs the side effect described by `action`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when injection or spawning fails. A failure
    /// mid-macro aborts the remaining presses; keys already held are still
    /// released (reverse order, best effort) before the error is returned,
    /// so a failed macro never leaves modifiers stuck down.
    pub fn execute(&self, action: &Action) -> Result<(), ActionError> {
        match action {
            Action::KeyMacro(keys) => self.run_macro(keys),
            Action::LaunchProcess(path) => {
                self.launcher.spawn(path)?;
                Ok(())
            }
        }
    }

    fn run_macro(&self, keys: &[KeyCode]) -> Result<(), ActionError> {
        let mut held: Vec<KeyCode> = Vec::with_capacity(keys.len());

        for &key in keys {
            if let Err(e) = self.injector.key_down(key) {
                for &stuck in held.iter().rev() {
                    let _ = self.injector.key_up(stuck);
                }
                return Err(e.into());
            }
            held.push(key);
        }

        // Releases in reverse listed order; keep releasing even if one fails
        // and report the first failure.
        let mut first_err: Option<InjectionError> = None;
        for &key in keys.iter().rev() {
            if let Err(e) = self.injector.key_up(key) {
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
