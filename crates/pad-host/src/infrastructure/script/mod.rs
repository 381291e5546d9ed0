//! Scripting runtime adapters: the mlua-backed host and a no-op stand-in.
//!
//! The Lua host deliberately avoids the classic embedding shortcut of
//! stashing a raw pointer to the LED grid in an upvalue. Instead, every
//! tick opens an mlua *scope*: `set_led`/`get_led` are created as scoped
//! functions closing over a `RefCell` borrow of the grid passed into that
//! call, and they die with the scope. The script can therefore never touch
//! LED memory outside a tick, and the borrow checker, not discipline,
//! enforces it.

pub mod mock;

use std::cell::RefCell;
use std::path::Path;

use mlua::{Function, Lua};
use pad_core::{LedState, Rgb};
use tracing::info;

use crate::application::script::{LedScriptHost, ScriptError, SCRIPT_ENTRY_POINT};

/// Lua 5.4 implementation of [`LedScriptHost`].
///
/// The script contract matches the stock firmware tooling: the chunk runs
/// once at load time, and an optional global `update_leds(time)` is called
/// every tick with the accumulated elapsed seconds. During that call the
/// globals `set_led(index, r, g, b)` and `get_led(index) -> r, g, b` are
/// available, bounds-checked against the grid.
pub struct LuaScriptHost {
    lua: Lua,
    loaded: bool,
}

impl LuaScriptHost {
    pub fn new() -> Self {
        Self {
            lua: Lua::new(),
            loaded: false,
        }
    }

    /// Loads a chunk from source text rather than a file. Used by tests and
    /// by tooling that embeds scripts.
    pub fn load_source(&mut self, name: &str, source: &str) -> Result<(), ScriptError> {
        self.lua
            .load(source)
            .set_name(name)
            .exec()
            .map_err(|e| ScriptError::Load {
                path: name.into(),
                reason: e.to_string(),
            })?;
        self.loaded = true;
        Ok(())
    }
}

impl Default for LuaScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LedScriptHost for LuaScriptHost {
    fn load_script(&mut self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|e| ScriptError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.load_source(&path.display().to_string(), &source)?;
        info!(path = %path.display(), "led script loaded");
        Ok(())
    }

    fn tick(&mut self, elapsed: f32, leds: &mut LedState) -> Result<(), ScriptError> {
        if !self.loaded {
            return Ok(());
        }

        let led_count = leds.len();
        let cell = RefCell::new(leds);

        let result = self.lua.scope(|scope| {
            let globals = self.lua.globals();

            let set_led = scope.create_function(|_, (index, r, g, b): (usize, u8, u8, u8)| {
                if cell.borrow_mut().set(index, Rgb::new(r, g, b)) {
                    Ok(())
                } else {
                    Err(mlua::Error::RuntimeError(format!(
                        "set_led: index {index} out of range [0, {led_count})"
                    )))
                }
            })?;
            globals.set("set_led", set_led)?;

            let get_led = scope.create_function(|_, index: usize| {
                match cell.borrow().get(index) {
                    Some(color) => Ok((color.r, color.g, color.b)),
                    None => Err(mlua::Error::RuntimeError(format!(
                        "get_led: index {index} out of range [0, {led_count})"
                    ))),
                }
            })?;
            globals.set("get_led", get_led)?;

            // Missing entry point is not an error; the tick is a no-op.
            let entry: Option<Function> = globals.get(SCRIPT_ENTRY_POINT)?;
            if let Some(update_leds) = entry {
                update_leds.call::<()>(elapsed)?;
            }
            Ok(())
        });

        result.map_err(|e| ScriptError::Execution(e.to_string()))
    }
}

/// No-op host for running without a script; every tick succeeds and leaves
/// the grid untouched.
pub struct NullScriptHost;

impl LedScriptHost for NullScriptHost {
    fn load_script(&mut self, _path: &Path) -> Result<(), ScriptError> {
        Ok(())
    }

    fn tick(&mut self, _elapsed: f32, _leds: &mut LedState) -> Result<(), ScriptError> {
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> LedState {
        LedState::new(2, 2, Rgb::default())
    }

    #[test]
    fn test_tick_without_loaded_script_is_a_noop() {
        let mut host = LuaScriptHost::new();
        let mut leds = grid();
        let before = leds.clone();

        host.tick(0.0, &mut leds).unwrap();

        assert_eq!(leds, before);
    }

    #[test]
    fn test_script_without_entry_point_is_a_noop() {
        let mut host = LuaScriptHost::new();
        host.load_source("inline", "local x = 1 + 1").unwrap();
        let mut leds = grid();

        host.tick(1.0, &mut leds).unwrap();

        assert_eq!(leds, grid());
    }

    #[test]
    fn test_entry_point_receives_elapsed_time_and_paints_leds() {
        let mut host = LuaScriptHost::new();
        host.load_source(
            "inline",
            r#"
            function update_leds(t)
                set_led(0, 255, 0, 0)
                set_led(3, 0, math.floor(t), 0)
            end
            "#,
        )
        .unwrap();
        let mut leds = grid();

        host.tick(42.0, &mut leds).unwrap();

        assert_eq!(leds.get(0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(leds.get(3), Some(Rgb::new(0, 42, 0)));
    }

    #[test]
    fn test_get_led_reads_back_grid_values() {
        let mut host = LuaScriptHost::new();
        host.load_source(
            "inline",
            r#"
            function update_leds(t)
                local r, g, b = get_led(1)
                set_led(2, r, g, b)
            end
            "#,
        )
        .unwrap();
        let mut leds = grid();
        leds.set(1, Rgb::new(7, 8, 9));

        host.tick(0.0, &mut leds).unwrap();

        assert_eq!(leds.get(2), Some(Rgb::new(7, 8, 9)));
    }

    #[test]
    fn test_out_of_range_index_is_a_script_error_not_a_panic() {
        let mut host = LuaScriptHost::new();
        host.load_source(
            "inline",
            r#"
            function update_leds(t)
                set_led(4, 1, 1, 1)
            end
            "#,
        )
        .unwrap();
        let mut leds = grid();

        let result = host.tick(0.0, &mut leds);

        assert!(matches!(result, Err(ScriptError::Execution(_))));
    }

    #[test]
    fn test_script_fault_is_isolated_and_next_tick_runs() {
        let mut host = LuaScriptHost::new();
        host.load_source(
            "inline",
            r#"
            first = true
            function update_leds(t)
                if first then
                    first = false
                    error("boom")
                end
                set_led(0, 1, 2, 3)
            end
            "#,
        )
        .unwrap();
        let mut leds = grid();

        assert!(host.tick(0.0, &mut leds).is_err());
        // The failure does not poison the host; the next tick succeeds.
        host.tick(0.1, &mut leds).unwrap();
        assert_eq!(leds.get(0), Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_mutations_before_a_fault_are_kept() {
        // No rollback: state reached before the error stays.
        let mut host = LuaScriptHost::new();
        host.load_source(
            "inline",
            r#"
            function update_leds(t)
                set_led(0, 50, 60, 70)
                error("after painting")
            end
            "#,
        )
        .unwrap();
        let mut leds = grid();

        assert!(host.tick(0.0, &mut leds).is_err());
        assert_eq!(leds.get(0), Some(Rgb::new(50, 60, 70)));
    }

    #[test]
    fn test_load_rejects_invalid_source() {
        let mut host = LuaScriptHost::new();
        let result = host.load_source("inline", "function ( broken");
        assert!(matches!(result, Err(ScriptError::Load { .. })));
    }

    #[test]
    fn test_load_missing_file_is_a_load_error() {
        let mut host = LuaScriptHost::new();
        let result = host.load_script(Path::new("/nonexistent/rainbow.lua"));
        assert!(matches!(result, Err(ScriptError::Load { .. })));
    }
}
