//! Macro-pad companion entry point.
//!
//! Wires together the serial session, action execution, and the Lua LED
//! script, then runs the blocking tick loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ PadController::new()      -- defaults + stock LED grid
//!  └─ load_config / load_script -- optional overlays
//!  └─ connect(port, baud)       -- spawns the listener thread
//!  └─ tick loop (~60 Hz)
//!       ├─ drain command tokens -> dispatch -> key macros / process launch
//!       ├─ update_leds(t)       -> Lua repaints the grid
//!       └─ LEDSDATA frame       -> serial writer
//! ```
//!
//! Usage: `pad-host [PORT [BAUD]]`. Without a port the companion runs
//! unconnected (scripts still tick; the UI collaborator can still trigger
//! commands manually).

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pad_host::application::controller::PadController;
use pad_host::application::execute_action::KeyInjector;
use pad_host::infrastructure::process::SystemProcessLauncher;
use pad_host::infrastructure::script::LuaScriptHost;
use pad_host::infrastructure::serial::SerialPortConnector;

const DEFAULT_BAUD: u32 = 9600;
const CONFIG_PATH: &str = "config.json";
const SCRIPT_PATH: &str = "assets/scripts/rainbow.lua";
const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Selects the key injector for the current platform.
#[cfg(target_os = "windows")]
fn platform_injector() -> Arc<dyn KeyInjector> {
    Arc::new(pad_host::infrastructure::input::windows::WindowsKeyInjector::new())
}

/// Non-Windows builds record injections instead of performing them until a
/// native adapter lands; macros are logged but not injected.
#[cfg(not(target_os = "windows"))]
fn platform_injector() -> Arc<dyn KeyInjector> {
    Arc::new(pad_host::infrastructure::input::mock::MockKeyInjector::new())
}

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("macro-pad companion starting");

    let mut args = std::env::args().skip(1);
    let port = args.next();
    let baud: u32 = match args.next() {
        Some(raw) => raw.parse()?,
        None => DEFAULT_BAUD,
    };

    let mut controller = PadController::new(
        Box::new(SerialPortConnector),
        platform_injector(),
        Arc::new(SystemProcessLauncher::new()),
        Box::new(LuaScriptHost::new()),
    );

    // Optional overlays: a config file and an LED script, when present.
    if Path::new(CONFIG_PATH).exists() {
        match controller.load_config(CONFIG_PATH) {
            Ok(()) => {}
            Err(e) => warn!(error = %e, "config load failed, keeping defaults"),
        }
    }
    if Path::new(SCRIPT_PATH).exists() {
        if let Err(e) = controller.load_script(SCRIPT_PATH) {
            warn!(error = %e, "led script load failed, leds stay static");
        }
    }

    match &port {
        Some(port) => {
            if let Err(e) = controller.connect(port, baud) {
                warn!(error = %e, "connect failed; running unconnected");
            }
        }
        None => info!("no port given, running unconnected"),
    }

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("shutdown signal received");
        running_flag.store(false, Ordering::Relaxed);
    })?;

    // ── Tick loop ─────────────────────────────────────────────────────────────
    let mut last = Instant::now();
    while running.load(Ordering::Relaxed) {
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;

        controller.tick(delta);
        std::thread::sleep(TICK_INTERVAL);
    }

    controller.disconnect();
    info!("macro-pad companion stopped");
    Ok(())
}
