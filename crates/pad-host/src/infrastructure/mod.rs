//! Infrastructure layer: adapters over OS services and the scripting runtime.
//!
//! Each submodule pairs a production adapter with a mock that records calls
//! in memory, so the application layer is testable without a serial device,
//! a desktop session, or a Lua interpreter.

pub mod input;
pub mod process;
pub mod script;
pub mod serial;
pub mod session;
