//! DispatchUseCase: resolves a received command token and executes its action.
//!
//! Unknown tokens are not an error: the device happily sends commands the
//! host has no binding for (unconfigured keys), and the protocol says they
//! are silently ignored.

use pad_core::ActionRegistry;
use tracing::debug;

use crate::application::execute_action::{ActionError, ExecuteActionUseCase};

/// The Dispatch use case.
///
/// The registry is passed in per call rather than owned here: the session
/// controller is the registry's single owner, which keeps the "immutable
/// while running" rule enforceable in one place.
pub struct DispatchUseCase {
    executor: ExecuteActionUseCase,
}

impl DispatchUseCase {
    pub fn new(executor: ExecuteActionUseCase) -> Self {
        Self { executor }
    }

    /// Resolves `token` against `registry` and executes the bound action.
    ///
    /// Returns `Ok(true)` when an action ran, `Ok(false)` for an unknown
    /// token (zero executions, zero errors).
    ///
    /// # Errors
    ///
    /// Propagates [`ActionError`] from the executor; the caller logs it and
    /// keeps the session running.
    pub fn dispatch(&self, registry: &ActionRegistry, token: &str) -> Result<bool, ActionError> {
        match registry.resolve(token) {
            Some(action) => {
                debug!(command = token, "command received, executing action");
                self.executor.execute(action)?;
                Ok(true)
            }
            None => {
                debug!(command = token, "no action bound, ignoring");
                Ok(false)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
