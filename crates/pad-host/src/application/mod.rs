//! Application layer: use cases for the host.
//!
//! Each use case depends on port traits (key injection, process launch,
//! script execution, serial transport) whose implementations live in the
//! infrastructure layer. That keeps this layer testable with the mock
//! adapters and free of OS APIs.

pub mod controller;
pub mod dispatch;
pub mod execute_action;
pub mod script;

pub use controller::{ConfigReloadError, PadController};
pub use dispatch::DispatchUseCase;
pub use execute_action::{
    ActionError, ExecuteActionUseCase, InjectionError, KeyInjector, LaunchError, ProcessLauncher,
};
pub use script::{LedScriptHost, ScriptError};
