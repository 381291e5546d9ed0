//! Process launch adapters.

pub mod mock;

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::application::execute_action::{LaunchError, ProcessLauncher};

/// Production launcher: asks the OS to spawn the program and detaches.
///
/// The child handle is dropped immediately; the companion never waits on
/// or manages the processes it starts.
pub struct SystemProcessLauncher;

impl SystemProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for SystemProcessLauncher {
    fn spawn(&self, path: &Path) -> Result<(), LaunchError> {
        match Command::new(path).spawn() {
            Ok(child) => {
                info!(path = %path.display(), pid = child.id(), "process launched");
                Ok(())
            }
            Err(source) => Err(LaunchError::Spawn {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
