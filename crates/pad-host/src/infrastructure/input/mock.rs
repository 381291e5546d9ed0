//! Mock key injector for unit testing.
//!
//! # Why a mock injector?
//!
//! The real injector (`WindowsKeyInjector`) calls `SendInput`, which needs a
//! desktop session and actually presses keys on the test machine. The mock
//! records every event into a `Mutex<Vec<...>>` instead, so tests can assert
//! exactly what was injected and in what order; the press/release ordering
//! of a macro is the whole contract.
//!
//! # Failure injection
//!
//! `should_fail` makes every call fail; `fail_down_of(key)` makes only the
//! key-down of one specific key fail, which is how the mid-macro abort path
//! gets exercised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use pad_core::KeyCode;

use crate::application::execute_action::{InjectionError, KeyInjector};

/// Direction of a recorded key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A key injector that records all calls without touching the OS.
#[derive(Default)]
pub struct MockKeyInjector {
    /// Every injected event in call order.
    pub events: Mutex<Vec<(KeyEventKind, KeyCode)>>,
    /// When `true`, every method immediately fails.
    pub should_fail: AtomicBool,
    fail_down: Mutex<Option<KeyCode>>,
}

impl MockKeyInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `key_down` of `key` fail (and every one after).
    pub fn fail_down_of(&self, key: KeyCode) {
        *self.fail_down.lock().unwrap() = Some(key);
    }
}

impl KeyInjector for MockKeyInjector {
    fn key_down(&self, key: KeyCode) -> Result<(), InjectionError> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        if *self.fail_down.lock().unwrap() == Some(key) {
            return Err(InjectionError::Platform(format!(
                "mock failure pressing {key:?}"
            )));
        }
        self.events.lock().unwrap().push((KeyEventKind::Down, key));
        Ok(())
    }

    fn key_up(&self, key: KeyCode) -> Result<(), InjectionError> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        self.events.lock().unwrap().push((KeyEventKind::Up, key));
        Ok(())
    }
}
