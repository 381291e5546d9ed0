//! Serial transport adapters.
//!
//! The session code talks to three small traits rather than to the
//! `serialport` crate directly: a connector that opens a port by name and
//! baud rate, and the reader/writer halves of the resulting duplex link.
//! The split matters for threading: the reader half moves to the listener
//! thread while the writer half stays with the tick thread, and the two
//! sides never share a call path.
//!
//! # Read timeouts as the cancellation mechanism
//!
//! A listener thread parked forever in a blocking read can only be
//! interrupted by breaking the handle under it. Instead, the production
//! reader opens the port with a short timeout and reports a timed-out read
//! as `Ok(0)`, so the listener loop wakes regularly to poll its stop flag.
//! Real I/O errors pass through untouched and end the loop.

pub mod mock;

use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

/// Errors from the serial link layer.
#[derive(Debug, Error)]
pub enum SerialError {
    /// Opening or configuring the port failed. The session stays `Idle`.
    #[error("failed to open serial port {port} at {baud} baud: {source}")]
    Open {
        port: String,
        baud: u32,
        #[source]
        source: io::Error,
    },

    /// A listener session is already running on this link.
    #[error("a listener session is already running")]
    AlreadyRunning,

    /// Writing a LED frame failed; the link state is undefined until the
    /// caller disconnects.
    #[error("frame write failed: {0}")]
    Write(#[source] io::Error),
}

/// Read half of a serial link, owned by the listener thread.
///
/// `read` blocks for at most the link's configured timeout; `Ok(0)` means
/// "no data yet, poll again", any `Err` is a real link failure.
pub trait SerialReader: Send {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Write half of a serial link, owned by the tick thread.
pub trait SerialWriter: Send {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
}

/// Opens serial links by port name and baud rate.
pub trait SerialConnector: Send {
    /// Opens the port and returns its duplex halves.
    ///
    /// Blocks until the OS open call returns; there is no additional
    /// connect timeout and no retry.
    ///
    /// # Errors
    ///
    /// [`SerialError::Open`] when the port cannot be opened or configured.
    fn open(
        &self,
        port: &str,
        baud: u32,
    ) -> Result<(Box<dyn SerialReader>, Box<dyn SerialWriter>), SerialError>;
}

/// How long the production reader blocks before reporting `Ok(0)`.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Production connector over the `serialport` crate.
///
/// The duplex split uses `try_clone`; the crate guarantees cloned handles
/// are independently usable for concurrent read and write.
pub struct SerialPortConnector;

impl SerialConnector for SerialPortConnector {
    fn open(
        &self,
        port: &str,
        baud: u32,
    ) -> Result<(Box<dyn SerialReader>, Box<dyn SerialWriter>), SerialError> {
        let open_err = |source: serialport::Error| SerialError::Open {
            port: port.to_string(),
            baud,
            source: source.into(),
        };

        let writer = serialport::new(port, baud)
            .timeout(READ_POLL_INTERVAL)
            .open()
            .map_err(open_err)?;
        let reader = writer.try_clone().map_err(open_err)?;

        info!(port, baud, "serial port opened");
        Ok((
            Box::new(SerialPortReader { inner: reader }),
            Box::new(SerialPortWriter { inner: writer }),
        ))
    }
}

struct SerialPortReader {
    inner: Box<dyn serialport::SerialPort>,
}

impl SerialReader for SerialPortReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match io::Read::read(&mut self.inner, buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }
}

struct SerialPortWriter {
    inner: Box<dyn serialport::SerialPort>,
}

impl SerialWriter for SerialPortWriter {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut self.inner, buf)
    }
}
