//! PadController: the session facade owning all device-session state.
//!
//! One controller instance owns the action registry, the LED grid, the
//! elapsed-time accumulator, the script host, and the listener session as
//! plain fields, constructed once and torn down together, with no
//! process-wide state.
//!
//! # Threading
//!
//! The controller lives on the tick thread. `tick` drains command tokens
//! that the listener thread pushed onto the session's channel and dispatches
//! them here, so action execution, script ticks, frame writes, and UI access
//! to the LED grid all happen on one thread. The listener thread only reads
//! bytes and frames tokens.

use std::path::Path;
use std::sync::Arc;

use pad_core::{ActionRegistry, ConfigError, LedState};
use thiserror::Error;
use tracing::{info, warn};

use crate::application::dispatch::DispatchUseCase;
use crate::application::execute_action::{
    ActionError, ExecuteActionUseCase, KeyInjector, ProcessLauncher,
};
use crate::application::script::{LedScriptHost, ScriptError};
use crate::infrastructure::serial::{SerialConnector, SerialError};
use crate::infrastructure::session::{ListenerSession, SessionState};

/// Error type for config reloads through the controller.
#[derive(Debug, Error)]
pub enum ConfigReloadError {
    /// The registry is immutable while a listener session is running.
    #[error("cannot reload config while a session is running")]
    SessionRunning,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The device-session controller.
pub struct PadController {
    registry: ActionRegistry,
    leds: LedState,
    time: f32,
    script: Box<dyn LedScriptHost>,
    dispatch: DispatchUseCase,
    session: ListenerSession,
}

impl PadController {
    /// Builds a controller with the default registry and the stock LED grid.
    pub fn new(
        connector: Box<dyn SerialConnector>,
        injector: Arc<dyn KeyInjector>,
        launcher: Arc<dyn ProcessLauncher>,
        script: Box<dyn LedScriptHost>,
    ) -> Self {
        Self {
            registry: ActionRegistry::with_defaults(),
            leds: LedState::macro_pad(),
            time: 0.0,
            script,
            dispatch: DispatchUseCase::new(ExecuteActionUseCase::new(injector, launcher)),
            session: ListenerSession::new(connector),
        }
    }

    /// Opens the serial port and starts the listener thread.
    ///
    /// # Errors
    ///
    /// [`SerialError::Open`] when the port cannot be opened (the session
    /// stays `Idle`; the caller may retry), [`SerialError::AlreadyRunning`]
    /// when a listener is already running.
    pub fn connect(&mut self, port: &str, baud: u32) -> Result<(), SerialError> {
        self.session.connect(port, baud)
    }

    /// Stops the listener thread and releases the serial link. No-op when
    /// already `Idle`/`Stopped`.
    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Runs one frame: consume pending command tokens, tick the LED script,
    /// mirror the grid to the device, advance time.
    ///
    /// No failure here is fatal: action, script, and write errors are
    /// logged and the next tick proceeds normally.
    pub fn tick(&mut self, delta: f32) {
        for token in self.session.drain_commands() {
            if let Err(e) = self.dispatch.dispatch(&self.registry, &token) {
                warn!(command = %token, error = %e, "action execution failed");
            }
        }

        if let Err(e) = self.script.tick(self.time, &mut self.leds) {
            warn!(error = %e, "led script tick failed");
        }

        if let Err(e) = self.session.write_frame(&self.leds) {
            warn!(error = %e, "led frame write failed; disconnect to recover");
        }

        self.time += delta;
    }

    /// Manual command dispatch for the UI collaborator (on-screen buttons).
    ///
    /// # Errors
    ///
    /// Propagates [`ActionError`] so the UI can surface it.
    pub fn trigger_command(&self, name: &str) -> Result<bool, ActionError> {
        self.dispatch.dispatch(&self.registry, name)
    }

    /// Read access to the LED grid for the UI layer.
    pub fn leds(&self) -> &LedState {
        &self.leds
    }

    /// Write access to the LED grid for the UI editor.
    pub fn leds_mut(&mut self) -> &mut LedState {
        &mut self.leds
    }

    /// The current command bindings.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Loads bindings from the config file at `path`, overlaying them onto
    /// the current registry by name.
    ///
    /// # Errors
    ///
    /// [`ConfigReloadError::SessionRunning`] while a listener is running
    /// (the registry is read-only for the session's lifetime); otherwise any
    /// [`ConfigError`]. On error the registry is left untouched.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigReloadError> {
        if self.session.state() == SessionState::Running {
            return Err(ConfigReloadError::SessionRunning);
        }
        let loaded = pad_core::load_registry(path.as_ref())?;
        info!(
            entries = loaded.len(),
            path = %path.as_ref().display(),
            "config loaded"
        );
        self.registry.merge_from(loaded);
        Ok(())
    }

    /// Persists the current registry to the config file at `path`.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from serialization or file I/O.
    pub fn save_config(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        pad_core::save_registry(path, &self.registry)
    }

    /// Loads an LED script into the embedded runtime.
    ///
    /// # Errors
    ///
    /// Propagates [`ScriptError::Load`].
    pub fn load_script(&mut self, path: impl AsRef<Path>) -> Result<(), ScriptError> {
        self.script.load_script(path.as_ref())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input::mock::MockKeyInjector;
    use crate::infrastructure::process::mock::MockProcessLauncher;
    use crate::infrastructure::script::mock::MockScriptHost;
    use crate::infrastructure::script::NullScriptHost;
    use crate::infrastructure::serial::mock::MockSerialConnector;
    use pad_core::{Rgb, FRAME_HEADER};

    fn controller_with(script: Box<dyn LedScriptHost>) -> (PadController, MockSerialConnector) {
        let connector = MockSerialConnector::new();
        let handle = connector.clone();
        let controller = PadController::new(
            Box::new(connector),
            Arc::new(MockKeyInjector::new()),
            Arc::new(MockProcessLauncher::new()),
            script,
        );
        (controller, handle)
    }

    #[test]
    fn test_new_controller_is_idle_with_stock_defaults() {
        let (controller, _) = controller_with(Box::new(NullScriptHost));
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(controller.leds().len(), 441);
        assert!(controller.registry().resolve("VOLUMEUP").is_some());
    }

    #[test]
    fn test_tick_without_script_leaves_leds_unchanged_and_writes_frame() {
        // Scenario: no script loaded -> Tick then WriteFrame transmits the
        // previous LedState unchanged.
        let (mut controller, handle) = controller_with(Box::new(NullScriptHost));
        controller.connect("mock", 9600).unwrap();
        let before = controller.leds().clone();

        controller.tick(0.016);

        assert_eq!(*controller.leds(), before);
        let written = handle.written.lock().unwrap();
        assert_eq!(written.len(), FRAME_HEADER.len() + 441 * 3);
        assert!(written.starts_with(FRAME_HEADER));
        drop(written);
        controller.disconnect();
    }

    #[test]
    fn test_script_error_does_not_abort_the_tick_loop() {
        let script = MockScriptHost::new();
        script.fail_next_ticks();
        let ticks = script.ticks.clone();
        let (mut controller, _) = controller_with(Box::new(script));

        // Two ticks despite the failures; no panic crosses the boundary.
        controller.tick(0.016);
        controller.tick(0.016);

        assert_eq!(ticks.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_script_mutations_survive_a_failing_tick() {
        // No rollback: whatever the script painted before failing stays.
        let script = MockScriptHost::new();
        script.paint_then_fail(Rgb::new(9, 9, 9));
        let (mut controller, _) = controller_with(Box::new(script));

        controller.tick(0.016);

        assert_eq!(controller.leds().get(0), Some(Rgb::new(9, 9, 9)));
    }

    #[test]
    fn test_elapsed_time_accumulates_across_ticks() {
        let script = MockScriptHost::new();
        let ticks = script.ticks.clone();
        let (mut controller, _) = controller_with(Box::new(script));

        controller.tick(0.5);
        controller.tick(0.25);
        controller.tick(0.25);

        // The script sees the time accumulated *before* each tick.
        let seen: Vec<f32> = ticks.lock().unwrap().clone();
        assert_eq!(seen, vec![0.0, 0.5, 0.75]);
    }

    #[test]
    fn test_trigger_command_dispatches_without_a_connection() {
        let (controller, _) = controller_with(Box::new(NullScriptHost));
        assert!(controller.trigger_command("VOLUMEUP").unwrap());
        assert!(!controller.trigger_command("UNBOUND").unwrap());
    }

    #[test]
    fn test_load_config_rejected_while_running() {
        let (mut controller, _) = controller_with(Box::new(NullScriptHost));
        controller.connect("mock", 9600).unwrap();

        let result = controller.load_config("/tmp/whatever.json");
        assert!(matches!(result, Err(ConfigReloadError::SessionRunning)));

        controller.disconnect();
    }

    #[test]
    fn test_save_then_load_config_round_trips_through_controller() {
        let dir = std::env::temp_dir().join(format!("pad_ctl_{}", std::process::id()));
        let path = dir.join("config.json");

        let (controller, _) = controller_with(Box::new(NullScriptHost));
        controller.save_config(&path).expect("save");

        let (mut restored, _) = controller_with(Box::new(NullScriptHost));
        restored.load_config(&path).expect("load");
        assert_eq!(
            restored.registry().command_names(),
            controller.registry().command_names()
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_error_leaves_registry_untouched() {
        let (mut controller, _) = controller_with(Box::new(NullScriptHost));
        let before = controller.registry().clone();

        let result = controller.load_config("/nonexistent/config.json");

        assert!(result.is_err());
        assert_eq!(*controller.registry(), before);
    }
}
