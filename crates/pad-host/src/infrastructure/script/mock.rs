//! Mock script host for controller tests.
//!
//! Records every tick's elapsed time; can be told to paint an LED before
//! failing, which is how the "no rollback on script error" behavior is
//! asserted without a Lua interpreter in the loop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use pad_core::{LedState, Rgb};

use crate::application::script::{LedScriptHost, ScriptError};

/// A script host that records calls without running any script.
#[derive(Default)]
pub struct MockScriptHost {
    /// Elapsed time seen by each tick, in call order. Shared so tests keep
    /// a handle after the host is boxed into the controller.
    pub ticks: Arc<Mutex<Vec<f32>>>,
    /// Paths passed to `load_script`.
    pub loaded: Mutex<Vec<PathBuf>>,
    fail_ticks: AtomicBool,
    paint: Mutex<Option<Rgb>>,
}

impl MockScriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent tick return a `ScriptError`.
    pub fn fail_next_ticks(&self) {
        self.fail_ticks.store(true, Ordering::Relaxed);
    }

    /// Makes each tick paint LED 0 with `color` and then fail.
    pub fn paint_then_fail(&self, color: Rgb) {
        *self.paint.lock().unwrap() = Some(color);
        self.fail_next_ticks();
    }
}

impl LedScriptHost for MockScriptHost {
    fn load_script(&mut self, path: &Path) -> Result<(), ScriptError> {
        self.loaded.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn tick(&mut self, elapsed: f32, leds: &mut LedState) -> Result<(), ScriptError> {
        self.ticks.lock().unwrap().push(elapsed);
        if let Some(color) = *self.paint.lock().unwrap() {
            leds.set(0, color);
        }
        if self.fail_ticks.load(Ordering::Relaxed) {
            return Err(ScriptError::Execution("mock script failure".into()));
        }
        Ok(())
    }
}
