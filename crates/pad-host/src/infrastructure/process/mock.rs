//! Mock process launcher for unit testing.
//!
//! Records every requested path instead of spawning anything; the failing
//! variant still records the attempt so tests can assert "one attempt, no
//! retry".

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::application::execute_action::{LaunchError, ProcessLauncher};

/// A launcher that records all calls without spawning processes.
#[derive(Default)]
pub struct MockProcessLauncher {
    /// Every path passed to `spawn`, in call order.
    pub spawned: Mutex<Vec<PathBuf>>,
    /// When `true`, every call records the attempt and then fails.
    pub should_fail: bool,
}

impl MockProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher whose every spawn fails.
    pub fn failing() -> Self {
        Self {
            spawned: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }
}

impl ProcessLauncher for MockProcessLauncher {
    fn spawn(&self, path: &Path) -> Result<(), LaunchError> {
        self.spawned.lock().unwrap().push(path.to_path_buf());
        if self.should_fail {
            return Err(LaunchError::Spawn {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock failure"),
            });
        }
        Ok(())
    }
}
