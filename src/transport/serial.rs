//! # Serial Transport
//!
//! Sends the print stream over a serial or USB-serial link, e.g. a Zebra
//! label printer on `/dev/ttyACM0` or an HP printer behind a USB-serial
//! converter.
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary data (raster rows, barcode
//! escape sequences) is transmitted without modification:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity)
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON (no line buffering)
//! - **Baud rate**: applied to input and output speed
//!
//! ## Chunked Writes
//!
//! Large chunks are written in slices of 4096 bytes with a short pause
//! between slices so slow printers are not overrun. Each `send()` is
//! flushed to the device before returning.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::{AdapterState, PrinterAdapter};
use crate::error::{PrintStreamError, Result};

/// Default baud rate of Zebra and HP serial interfaces
pub const DEFAULT_BAUD: u32 = 9600;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Serial Printer Adapter
///
/// ## Example
///
/// ```no_run
/// use printstream::transport::{PrinterAdapter, SerialAdapter};
///
/// let mut adapter = SerialAdapter::new("/dev/ttyACM0").with_baud(9600);
/// adapter.open()?;
/// adapter.send(b"^XA\n^XZ\n")?;
/// adapter.close()?;
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
#[derive(Debug)]
pub struct SerialAdapter {
    device: PathBuf,
    baud: u32,
    chunk_size: usize,
    chunk_delay: Duration,
    file: Option<File>,
    state: AdapterState,
}

impl SerialAdapter {
    /// Create an adapter for a serial device path (e.g. "/dev/ttyUSB0").
    pub fn new<P: AsRef<Path>>(device: P) -> Self {
        Self {
            device: device.as_ref().to_path_buf(),
            baud: DEFAULT_BAUD,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
            file: None,
            state: AdapterState::new(),
        }
    }

    /// Set the baud rate (usually ignored by serial-over-USB links).
    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    /// Set the chunk size for large writes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }
}

impl PrinterAdapter for SerialAdapter {
    #[instrument(skip(self), fields(device = %self.device.display(), baud = self.baud))]
    fn open(&mut self) -> Result<()> {
        if self.state.is_open() {
            return Ok(());
        }
        if self.file.is_some() {
            return Err(PrintStreamError::AlreadyConnected(format!(
                "serial {} is already assigned",
                self.device.display()
            )));
        }

        let file = OpenOptions::new()
            .write(true)
            .open(&self.device)
            .map_err(|e| {
                PrintStreamError::Transport(format!(
                    "Failed to open {}: {}",
                    self.device.display(),
                    e
                ))
            })?;

        // The file is dropped (and the descriptor released) if this fails
        configure_tty_raw(&file, self.baud)?;

        info!("Serial link open");
        self.file = Some(file);
        self.state.mark_open();
        Ok(())
    }

    #[instrument(skip(self, data), fields(device = %self.device.display(), data_len = data.len()))]
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.state.begin_send()?;
        let file = self.file.as_mut().ok_or(PrintStreamError::AdapterNotOpen)?;

        if data.len() <= self.chunk_size {
            file.write_all(data)
                .map_err(|e| PrintStreamError::Transport(format!("Write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                file.write_all(chunk)
                    .map_err(|e| PrintStreamError::Transport(format!("Write failed: {}", e)))?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        file.flush()
            .map_err(|e| PrintStreamError::Transport(format!("Flush failed: {}", e)))?;
        debug!("Chunk written");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()
                .map_err(|e| PrintStreamError::Transport(format!("Flush failed: {}", e)))?;
        }
        self.state.mark_flushed();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let flushed = if self.state.needs_flush() {
            self.flush()
        } else {
            Ok(())
        };
        if self.file.take().is_some() {
            info!(device = %self.device.display(), "Serial link closed");
        }
        self.state.mark_closed();
        flushed
    }

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn is_flushed(&self) -> bool {
        self.state.is_flushed()
    }

    fn document_title(&self) -> String {
        self.state.title().to_string()
    }

    fn set_document_title(&mut self, title: &str) {
        self.state.set_title(title);
    }
}

impl Drop for SerialAdapter {
    fn drop(&mut self) {
        if self.state.is_open() || self.file.is_some() {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to close serial adapter");
            }
        }
    }
}

/// Map a numeric baud rate to its termios speed constant.
#[cfg(unix)]
fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        other => {
            return Err(PrintStreamError::InvalidParameter(format!(
                "Unsupported baud rate: {}",
                other
            )));
        }
    };
    Ok(speed)
}

/// Configure a file descriptor for raw TTY mode at the given baud rate.
///
/// Note: IXON/IXOFF/IXANY disable XON/XOFF software flow control. This is
/// critical because 0x11 (XON/DC1) and 0x13 (XOFF/DC3) can appear in raster
/// rows sent as binary items.
#[cfg(unix)]
fn configure_tty_raw(file: &File, baud: u32) -> Result<()> {
    use std::io;
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let speed = baud_constant(baud)?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PrintStreamError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let rc = unsafe {
        libc::cfsetispeed(&mut termios, speed) | libc::cfsetospeed(&mut termios, speed)
    };
    if rc != 0 {
        return Err(PrintStreamError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(PrintStreamError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File, _baud: u32) -> Result<()> {
    // Non-Unix serial devices keep their driver settings
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let adapter = SerialAdapter::new("/dev/ttyACM0");
        assert_eq!(adapter.baud(), DEFAULT_BAUD);
        assert_eq!(adapter.device(), Path::new("/dev/ttyACM0"));
        assert!(!adapter.is_open());
    }

    #[test]
    fn test_send_before_open() {
        let mut adapter = SerialAdapter::new("/dev/ttyACM0");
        assert!(matches!(
            adapter.send(b"^XA"),
            Err(PrintStreamError::AdapterNotOpen)
        ));
    }

    #[test]
    fn test_missing_device() {
        let mut adapter = SerialAdapter::new("/dev/does-not-exist-printstream");
        assert!(matches!(adapter.open(), Err(PrintStreamError::Transport(_))));
        assert!(!adapter.is_open());
        adapter.close().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_non_tty_is_rejected_and_released() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut adapter = SerialAdapter::new(file.path());
        // A regular file has no termios attributes
        assert!(matches!(adapter.open(), Err(PrintStreamError::Transport(_))));
        assert!(adapter.file.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_baud_constants() {
        assert_eq!(baud_constant(9600).unwrap(), libc::B9600);
        assert!(baud_constant(12345).is_err());
    }
}
