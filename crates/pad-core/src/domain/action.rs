//! The action model: what happens when a command token arrives.
//!
//! Each command name known to the host maps to exactly one [`Action`]:
//! either a key macro (an ordered chord of virtual-key codes injected into
//! the OS) or a process launch. The mapping lives in an [`ActionRegistry`]
//! owned by the session controller.
//!
//! # Why press order matters (for beginners)
//!
//! A key macro like `[LWIN, SHIFT, 'S']` is a *chord*: the modifiers must be
//! held down while the final key is tapped, and released innermost-first for
//! the OS to see the chord rather than three separate keystrokes. The
//! executor therefore presses keys in listed order and releases them in
//! reverse (LIFO) order; that contract is part of the domain model, not an
//! implementation detail.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A platform virtual-key code as injected into the OS input queue.
///
/// The values follow the Windows VK namespace because that is what the
/// device's config files have always stored; the injection adapter for each
/// platform translates as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u8);

impl KeyCode {
    pub const SHIFT: KeyCode = KeyCode(0x10);
    pub const LWIN: KeyCode = KeyCode(0x5B);
    pub const VOLUME_MUTE: KeyCode = KeyCode(0xAD);
    pub const VOLUME_DOWN: KeyCode = KeyCode(0xAE);
    pub const VOLUME_UP: KeyCode = KeyCode(0xAF);
    pub const MEDIA_NEXT_TRACK: KeyCode = KeyCode(0xB0);
    pub const MEDIA_PREV_TRACK: KeyCode = KeyCode(0xB1);
    pub const MEDIA_PLAY_PAUSE: KeyCode = KeyCode(0xB3);

    /// Returns the raw VK value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for KeyCode {
    fn from(value: u8) -> Self {
        KeyCode(value)
    }
}

/// Error type for action invariant violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionInvariantError {
    /// A key macro must press at least one key.
    #[error("key macro must contain at least one key code")]
    EmptyKeySequence,

    /// A process launch must name a program.
    #[error("process path must not be empty")]
    EmptyProcessPath,
}

/// A named, configured side effect triggered by a command token.
///
/// Every consumption site (execution, serialization) matches exhaustively on
/// this enum, so adding a variant is a compile-enforced, repo-wide change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Press each key in listed order, then release all in reverse order.
    KeyMacro(Vec<KeyCode>),
    /// Spawn the process at the given path with no arguments.
    LaunchProcess(PathBuf),
}

impl Action {
    /// Builds a key macro, enforcing the non-empty invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ActionInvariantError::EmptyKeySequence`] for an empty chord.
    pub fn key_macro(keys: Vec<KeyCode>) -> Result<Self, ActionInvariantError> {
        if keys.is_empty() {
            return Err(ActionInvariantError::EmptyKeySequence);
        }
        Ok(Action::KeyMacro(keys))
    }

    /// Builds a process launch, enforcing the non-empty path invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ActionInvariantError::EmptyProcessPath`] for an empty path.
    pub fn launch_process(path: impl Into<PathBuf>) -> Result<Self, ActionInvariantError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ActionInvariantError::EmptyProcessPath);
        }
        Ok(Action::LaunchProcess(path))
    }

    /// Returns the process path for a `LaunchProcess`, `None` otherwise.
    pub fn process_path(&self) -> Option<&Path> {
        match self {
            Action::LaunchProcess(path) => Some(path),
            Action::KeyMacro(_) => None,
        }
    }
}

/// The command-name-to-action mapping consulted for every received token.
///
/// Lookup is exact and case-sensitive; an unknown name is not an error, just
/// "no action". The registry is built once at session construction and is
/// treated as immutable while a listener session is running: reload paths
/// must run only in the `Idle`/`Stopped` states (enforced by the controller
/// in `pad-host`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionRegistry {
    commands: HashMap<String, Action>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the stock media bindings the
    /// device ships with: volume, track transport, mute, and the screenshot
    /// chord on KEY5.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert("VOLUMEUP", Action::KeyMacro(vec![KeyCode::VOLUME_UP]));
        registry.insert("VOLUMEDOWN", Action::KeyMacro(vec![KeyCode::VOLUME_DOWN]));
        registry.insert("NEXTTRACK", Action::KeyMacro(vec![KeyCode::MEDIA_NEXT_TRACK]));
        registry.insert("PREVTRACK", Action::KeyMacro(vec![KeyCode::MEDIA_PREV_TRACK]));
        registry.insert("PLAYPAUSE", Action::KeyMacro(vec![KeyCode::MEDIA_PLAY_PAUSE]));
        registry.insert("MUTE", Action::KeyMacro(vec![KeyCode::VOLUME_MUTE]));
        registry.insert(
            "KEY5",
            Action::KeyMacro(vec![KeyCode::LWIN, KeyCode::SHIFT, KeyCode(b'S')]),
        );
        registry
    }

    /// Resolves a command token to its action, if any.
    pub fn resolve(&self, name: &str) -> Option<&Action> {
        self.commands.get(name)
    }

    /// Inserts or replaces a binding.
    pub fn insert(&mut self, name: impl Into<String>, action: Action) {
        self.commands.insert(name.into(), action);
    }

    /// Removes a binding, returning the previous action if present.
    pub fn remove(&mut self, name: &str) -> Option<Action> {
        self.commands.remove(name)
    }

    /// Merges another registry into this one; entries from `other` replace
    /// same-named entries here. Used when a loaded config file overlays the
    /// defaults.
    pub fn merge_from(&mut self, other: ActionRegistry) {
        self.commands.extend(other.commands);
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry has no bindings.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates over `(name, action)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.commands.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the command names in sorted order (stable for serialization
    /// and display).
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_macro_rejects_empty_sequence() {
        let result = Action::key_macro(vec![]);
        assert_eq!(result, Err(ActionInvariantError::EmptyKeySequence));
    }

    #[test]
    fn test_key_macro_accepts_single_key() {
        let action = Action::key_macro(vec![KeyCode::VOLUME_UP]).unwrap();
        assert_eq!(action, Action::KeyMacro(vec![KeyCode::VOLUME_UP]));
    }

    #[test]
    fn test_launch_process_rejects_empty_path() {
        let result = Action::launch_process("");
        assert_eq!(result, Err(ActionInvariantError::EmptyProcessPath));
    }

    #[test]
    fn test_launch_process_keeps_path() {
        let action = Action::launch_process("/usr/bin/foo").unwrap();
        assert_eq!(action.process_path(), Some(Path::new("/usr/bin/foo")));
    }

    #[test]
    fn test_resolve_is_exact_and_case_sensitive() {
        let registry = ActionRegistry::with_defaults();
        assert!(registry.resolve("VOLUMEUP").is_some());
        assert!(registry.resolve("volumeup").is_none());
        assert!(registry.resolve("VOLUMEUP ").is_none());
    }

    #[test]
    fn test_resolve_unknown_name_is_none_not_error() {
        let registry = ActionRegistry::with_defaults();
        assert!(registry.resolve("NO-SUCH-COMMAND").is_none());
    }

    #[test]
    fn test_defaults_contain_stock_media_bindings() {
        let registry = ActionRegistry::with_defaults();
        for name in ["VOLUMEUP", "VOLUMEDOWN", "NEXTTRACK", "PREVTRACK", "PLAYPAUSE", "MUTE"] {
            assert!(registry.resolve(name).is_some(), "missing default {name}");
        }
        // KEY5 carries the screenshot chord.
        assert_eq!(
            registry.resolve("KEY5"),
            Some(&Action::KeyMacro(vec![
                KeyCode::LWIN,
                KeyCode::SHIFT,
                KeyCode(b'S')
            ]))
        );
    }

    #[test]
    fn test_merge_from_replaces_same_named_entries() {
        let mut base = ActionRegistry::with_defaults();
        let mut overlay = ActionRegistry::new();
        overlay.insert("MUTE", Action::launch_process("/bin/true").unwrap());
        overlay.insert("EXTRA", Action::KeyMacro(vec![KeyCode(0x41)]));

        base.merge_from(overlay);

        assert_eq!(
            base.resolve("MUTE"),
            Some(&Action::LaunchProcess(PathBuf::from("/bin/true")))
        );
        assert!(base.resolve("EXTRA").is_some());
        // Untouched defaults survive the merge.
        assert!(base.resolve("VOLUMEUP").is_some());
    }

    #[test]
    fn test_command_names_are_sorted() {
        let mut registry = ActionRegistry::new();
        registry.insert("B", Action::KeyMacro(vec![KeyCode(1)]));
        registry.insert("A", Action::KeyMacro(vec![KeyCode(2)]));
        assert_eq!(registry.command_names(), vec!["A", "B"]);
    }
}
