//! Mock serial transport for unit and integration testing.
//!
//! # Why a mock link?
//!
//! The real connector opens an OS serial device that does not exist on a CI
//! machine and cannot be scripted from test code. `MockSerialConnector`
//! replaces it with in-memory queues: tests push [`ReadStep`]s that the
//! listener thread will "read", and inspect every byte the session wrote.
//!
//! The connector is `Clone`; the test keeps one clone as an inspection
//! handle while the session owns the other, and both see the same shared
//! state.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{SerialConnector, SerialError, SerialReader, SerialWriter};

/// One scripted outcome for a listener-thread read call.
#[derive(Debug, Clone)]
pub enum ReadStep {
    /// The read returns these bytes.
    Data(Vec<u8>),
    /// The read fails with this error kind, ending the listener loop.
    Fail(io::ErrorKind),
}

/// Shared state behind a [`MockSerialConnector`] and the halves it hands out.
#[derive(Default)]
struct Shared {
    steps: Mutex<VecDeque<ReadStep>>,
    fail_open: AtomicBool,
    fail_write: AtomicBool,
    opens: Mutex<Vec<(String, u32)>>,
}

/// A scripted serial connector that records all traffic.
#[derive(Clone, Default)]
pub struct MockSerialConnector {
    shared: Arc<Shared>,
    /// Exposed for assertions: every byte written through the writer half.
    pub written: Arc<Mutex<Vec<u8>>>,
}

impl MockSerialConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes for the listener thread to read.
    pub fn push_read(&self, bytes: &[u8]) {
        self.shared
            .steps
            .lock()
            .unwrap()
            .push_back(ReadStep::Data(bytes.to_vec()));
    }

    /// Queues a read failure; the listener loop ends when it reaches it.
    pub fn push_read_error(&self, kind: io::ErrorKind) {
        self.shared
            .steps
            .lock()
            .unwrap()
            .push_back(ReadStep::Fail(kind));
    }

    /// Makes every subsequent `open` call fail.
    pub fn fail_open(&self) {
        self.shared.fail_open.store(true, Ordering::Relaxed);
    }

    /// Makes every subsequent frame write fail.
    pub fn fail_writes(&self) {
        self.shared.fail_write.store(true, Ordering::Relaxed);
    }

    /// The `(port, baud)` pairs passed to `open`, in call order.
    pub fn opens(&self) -> Vec<(String, u32)> {
        self.shared.opens.lock().unwrap().clone()
    }
}

impl SerialConnector for MockSerialConnector {
    fn open(
        &self,
        port: &str,
        baud: u32,
    ) -> Result<(Box<dyn SerialReader>, Box<dyn SerialWriter>), SerialError> {
        self.shared
            .opens
            .lock()
            .unwrap()
            .push((port.to_string(), baud));

        if self.shared.fail_open.load(Ordering::Relaxed) {
            return Err(SerialError::Open {
                port: port.to_string(),
                baud,
                source: io::Error::new(io::ErrorKind::NotFound, "mock open failure"),
            });
        }

        Ok((
            Box::new(MockReader {
                shared: Arc::clone(&self.shared),
            }),
            Box::new(MockWriter {
                shared: Arc::clone(&self.shared),
                sink: Arc::clone(&self.written),
            }),
        ))
    }
}

struct MockReader {
    shared: Arc<Shared>,
}

impl SerialReader for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let step = self.shared.steps.lock().unwrap().pop_front();
        match step {
            Some(ReadStep::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(ReadStep::Fail(kind)) => Err(io::Error::new(kind, "mock read failure")),
            None => {
                // Behave like a timed-out read so the listener polls its
                // stop flag instead of spinning.
                thread::sleep(Duration::from_millis(1));
                Ok(0)
            }
        }
    }
}

struct MockWriter {
    shared: Arc<Shared>,
    sink: Arc<Mutex<Vec<u8>>>,
}

impl SerialWriter for MockWriter {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.shared.fail_write.load(Ordering::Relaxed) {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock write failure",
            ));
        }
        self.sink.lock().unwrap().extend_from_slice(buf);
        Ok(())
    }
}
