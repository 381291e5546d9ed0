//! ListenerSession: the background read/dispatch loop bound to one serial
//! connection.
//!
//! # State machine
//!
//! ```text
//! Idle --connect(port,baud)--> Connecting --open ok--> Running
//!                                   |                     |
//!                                   | open fails          | read error, or
//!                                   v                     | disconnect()
//!                                 Idle                    v
//!                              (error reported)        Stopped
//! ```
//!
//! `Stopped -> Idle` is implicit: a fresh `connect` attempt is all it takes
//! to resume. There is no auto-reconnect and no connect timeout beyond the
//! OS open call.
//!
//! # Threading
//!
//! While `Running`, exactly one listener thread reads bytes, feeds the
//! [`CommandFramer`], and pushes completed tokens onto an `mpsc` channel.
//! Resolution and execution happen on the consumer side (the tick thread
//! draining [`ListenerSession::drain_commands`]), which keeps action side
//! effects, LED state, and frame writes on a single thread.
//!
//! Teardown is channel- and flag-based: `disconnect` raises the stop flag
//! and joins the thread (the reader's poll-style timeout guarantees the
//! flag is seen), and a dropped receiver likewise ends the loop. Only after
//! the join does the link get released, so no read ever races a closed
//! handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

use pad_core::{encode_led_frame, CommandFramer, LedState};
use tracing::{debug, info, warn};

use crate::infrastructure::serial::{SerialConnector, SerialError, SerialReader, SerialWriter};

/// Lifecycle of a serial session. Exactly one listener may be `Running`
/// per link at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Running,
    Stopped,
}

/// The serial session: owns the connector, the writer half while connected,
/// and the listener thread's handle and token channel.
pub struct ListenerSession {
    connector: Box<dyn SerialConnector>,
    state: Arc<Mutex<SessionState>>,
    stop: Arc<AtomicBool>,
    writer: Option<Box<dyn SerialWriter>>,
    listener: Option<JoinHandle<()>>,
    commands: Option<Receiver<String>>,
}

impl ListenerSession {
    pub fn new(connector: Box<dyn SerialConnector>) -> Self {
        Self {
            connector,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            stop: Arc::new(AtomicBool::new(false)),
            writer: None,
            listener: None,
            commands: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    /// Opens the port and starts the listener thread.
    ///
    /// # Errors
    ///
    /// [`SerialError::AlreadyRunning`] when a listener is active;
    /// [`SerialError::Open`] when the open fails (state reverts to `Idle`,
    /// the caller may retry).
    pub fn connect(&mut self, port: &str, baud: u32) -> Result<(), SerialError> {
        if self.state() == SessionState::Running {
            return Err(SerialError::AlreadyRunning);
        }

        // Reap the previous listener thread, if a stopped one is still held.
        self.disconnect();

        self.set_state(SessionState::Connecting);

        let (reader, writer) = match self.connector.open(port, baud) {
            Ok(halves) => halves,
            Err(e) => {
                self.set_state(SessionState::Idle);
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::channel();
        self.stop.store(false, Ordering::Relaxed);

        let stop = Arc::clone(&self.stop);
        let state = Arc::clone(&self.state);
        let spawn_result = std::thread::Builder::new()
            .name("pad-listener".into())
            .spawn(move || listener_loop(reader, tx, stop, state));
        let handle = match spawn_result {
            Ok(handle) => handle,
            Err(source) => {
                self.set_state(SessionState::Idle);
                return Err(SerialError::Open {
                    port: port.to_string(),
                    baud,
                    source,
                });
            }
        };

        self.writer = Some(writer);
        self.listener = Some(handle);
        self.commands = Some(rx);
        self.set_state(SessionState::Running);
        info!(port, baud, "listener session running");
        Ok(())
    }

    /// Stops the listener and releases the link. Safe to call repeatedly
    /// and in any state; on an already-`Idle`/`Stopped` session it is a
    /// no-op and never double-closes.
    pub fn disconnect(&mut self) {
        if self.listener.is_none() && self.writer.is_none() {
            return;
        }

        self.stop.store(true, Ordering::Relaxed);
        // Dropping the receiver also ends the loop if it is mid-send.
        self.commands = None;

        if let Some(handle) = self.listener.take() {
            if handle.join().is_err() {
                warn!("listener thread panicked during shutdown");
            }
        }

        // Link released only after the join: no read can race the close.
        self.writer = None;
        self.set_state(SessionState::Stopped);
        info!("listener session stopped");
    }

    /// Non-blocking drain of command tokens parsed since the last call.
    pub fn drain_commands(&mut self) -> Vec<String> {
        let mut tokens = Vec::new();
        if let Some(rx) = &self.commands {
            loop {
                match rx.try_recv() {
                    Ok(token) => tokens.push(token),
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
        }
        tokens
    }

    /// Writes one LED frame iff the link is connected; a disconnected
    /// session writes nothing and reports success.
    ///
    /// # Errors
    ///
    /// [`SerialError::Write`] on I/O failure. No retry, no buffering; the
    /// link is left in an undefined state for the caller to resolve via
    /// [`disconnect`](Self::disconnect).
    pub fn write_frame(&mut self, leds: &LedState) -> Result<(), SerialError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let frame = encode_led_frame(leds);
        writer.write_all(&frame).map_err(SerialError::Write)
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap() = state;
    }
}

impl Drop for ListenerSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Body of the listener thread: read, frame, forward.
///
/// The loop ends on the first real read error (state -> `Stopped`, no
/// auto-reconnect), on the stop flag, or on channel closure.
fn listener_loop(
    mut reader: Box<dyn SerialReader>,
    tx: Sender<String>,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
) {
    let mut framer = CommandFramer::new();
    let mut buf = [0u8; 256];

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        match reader.read(&mut buf) {
            // Poll-style timeout: no data, check the stop flag again.
            Ok(0) => continue,
            Ok(n) => {
                for token in framer.push(&buf[..n]) {
                    debug!(command = %token, "command token received");
                    if tx.send(token).is_err() {
                        // Receiver gone: the session is tearing down.
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "serial read failed, listener stopping");
                *state.lock().unwrap() = SessionState::Stopped;
                return;
            }
        }
    }

    *state.lock().unwrap() = SessionState::Stopped;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::serial::mock::MockSerialConnector;
    use std::io;
    use std::time::{Duration, Instant};

    fn session() -> (ListenerSession, MockSerialConnector) {
        let connector = MockSerialConnector::new();
        let handle = connector.clone();
        (ListenerSession::new(Box::new(connector)), handle)
    }

    /// Polls `cond` for up to two seconds.
    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_connect_reaches_running() {
        let (mut session, handle) = session();
        assert_eq!(session.state(), SessionState::Idle);

        session.connect("COM3", 9600).unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(handle.opens(), vec![("COM3".to_string(), 9600)]);
        session.disconnect();
    }

    #[test]
    fn test_failed_open_reverts_to_idle() {
        let (mut session, handle) = session();
        handle.fail_open();

        let result = session.connect("COM3", 9600);

        assert!(matches!(result, Err(SerialError::Open { .. })));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_connect_while_running_is_rejected() {
        let (mut session, _) = session();
        session.connect("COM3", 9600).unwrap();

        let result = session.connect("COM4", 9600);

        assert!(matches!(result, Err(SerialError::AlreadyRunning)));
        session.disconnect();
    }

    #[test]
    fn test_tokens_flow_from_reader_to_drain() {
        let (mut session, handle) = session();
        handle.push_read(b"VOLUMEUP\nMU");
        handle.push_read(b"TE\n");
        session.connect("COM3", 9600).unwrap();

        let mut received = Vec::new();
        assert!(wait_for(|| {
            received.extend(session.drain_commands());
            received.len() >= 2
        }));
        assert_eq!(received, vec!["VOLUMEUP", "MUTE"]);
        session.disconnect();
    }

    #[test]
    fn test_read_error_stops_the_session_without_reconnect() {
        let (mut session, handle) = session();
        handle.push_read(b"OK\n");
        handle.push_read_error(io::ErrorKind::BrokenPipe);
        session.connect("COM3", 9600).unwrap();

        assert!(wait_for(|| session.state() == SessionState::Stopped));
        // The token read before the failure is still delivered.
        assert_eq!(session.drain_commands(), vec!["OK"]);
        // One open only: no auto-reconnect happened.
        assert_eq!(handle.opens().len(), 1);
        session.disconnect();
    }

    #[test]
    fn test_disconnect_is_a_noop_when_idle_and_idempotent() {
        let (mut session, _) = session();
        session.disconnect();
        assert_eq!(session.state(), SessionState::Idle);

        session.connect("COM3", 9600).unwrap();
        session.disconnect();
        assert_eq!(session.state(), SessionState::Stopped);
        // Second disconnect must not panic or double-close.
        session.disconnect();
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn test_reconnect_after_stop_succeeds() {
        let (mut session, handle) = session();
        session.connect("COM3", 9600).unwrap();
        session.disconnect();

        session.connect("COM3", 115200).unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(handle.opens().len(), 2);
        session.disconnect();
    }

    #[test]
    fn test_write_frame_emits_header_plus_payload() {
        let (mut session, handle) = session();
        session.connect("COM3", 9600).unwrap();
        let leds = LedState::new(2, 2, pad_core::Rgb::new(1, 2, 3));

        session.write_frame(&leds).unwrap();

        let written = handle.written.lock().unwrap().clone();
        assert_eq!(written.len(), pad_core::FRAME_HEADER.len() + 4 * 3);
        assert!(written.starts_with(pad_core::FRAME_HEADER));
        assert_eq!(&written[pad_core::FRAME_HEADER.len()..][..3], &[1, 2, 3]);
        session.disconnect();
    }

    #[test]
    fn test_write_frame_while_disconnected_writes_nothing() {
        let (mut session, handle) = session();
        let leds = LedState::macro_pad();

        session.write_frame(&leds).unwrap();

        assert!(handle.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_write_failure_is_reported_for_caller_to_disconnect() {
        let (mut session, handle) = session();
        session.connect("COM3", 9600).unwrap();
        handle.fail_writes();

        let result = session.write_frame(&LedState::macro_pad());

        assert!(matches!(result, Err(SerialError::Write(_))));
        // Recovery path is an explicit disconnect.
        session.disconnect();
        assert_eq!(session.state(), SessionState::Stopped);
    }
}
