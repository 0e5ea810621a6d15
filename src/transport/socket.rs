//! # TCP Socket Transport
//!
//! Network printers (HP JetDirect, Zebra ZebraNet) accept a raw print
//! stream on TCP port 9100. Bytes are written straight to the socket, so
//! `flush()` only drains the kernel buffer.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::{AdapterState, PrinterAdapter};
use crate::error::{PrintStreamError, Result};

/// Raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Connection timeout unless overridden
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// # Socket Printer Adapter
///
/// ## Example
///
/// ```no_run
/// use printstream::transport::{PrinterAdapter, SocketAdapter};
///
/// let mut adapter = SocketAdapter::new("192.168.1.206", 9100)?;
/// adapter.open()?;
/// adapter.send(b"\x1bE")?;
/// adapter.close()?;
/// # Ok::<(), printstream::PrintStreamError>(())
/// ```
#[derive(Debug)]
pub struct SocketAdapter {
    addr: SocketAddr,
    timeout: Duration,
    stream: Option<TcpStream>,
    state: AdapterState,
}

impl SocketAdapter {
    /// Create an adapter for `host:port`. The host is resolved immediately.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| {
                PrintStreamError::InvalidParameter(format!("Invalid address {}:{}: {}", host, port, e))
            })?
            .next()
            .ok_or_else(|| {
                PrintStreamError::InvalidParameter(format!("No address for {}:{}", host, port))
            })?;
        Ok(Self::with_addr(addr))
    }

    /// Create from `"host:port"`, or a bare host on [`DEFAULT_PORT`].
    pub fn from_addr(addr: &str) -> Result<Self> {
        if let Ok(parsed) = addr.parse::<SocketAddr>() {
            return Ok(Self::with_addr(parsed));
        }
        match addr.rsplit_once(':') {
            // A colon inside the host means a bare IPv6 address
            Some((host, port)) if !host.contains(':') => {
                let port = port.parse::<u16>().map_err(|_| {
                    PrintStreamError::InvalidParameter(format!("Invalid port in address: {}", addr))
                })?;
                Self::new(host, port)
            }
            _ => Self::new(
                addr.trim_start_matches('[').trim_end_matches(']'),
                DEFAULT_PORT,
            ),
        }
    }

    fn with_addr(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
            stream: None,
            state: AdapterState::new(),
        }
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl PrinterAdapter for SocketAdapter {
    #[instrument(skip(self), fields(addr = %self.addr))]
    fn open(&mut self) -> Result<()> {
        if self.state.is_open() {
            return Ok(());
        }
        if self.stream.is_some() {
            return Err(PrintStreamError::AlreadyConnected(format!(
                "socket to {} is already assigned",
                self.addr
            )));
        }

        info!("Connecting to printer");
        let stream = TcpStream::connect_timeout(&self.addr, self.timeout)
            .map_err(|e| PrintStreamError::Transport(format!("{}: {}", self.addr, e)))?;
        self.stream = Some(stream);
        self.state.mark_open();
        Ok(())
    }

    #[instrument(skip(self, data), fields(addr = %self.addr, data_len = data.len()))]
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.state.begin_send()?;
        let stream = self
            .stream
            .as_mut()
            .ok_or(PrintStreamError::AdapterNotOpen)?;
        stream
            .write_all(data)
            .map_err(|e| PrintStreamError::Transport(format!("Write failed: {}", e)))?;
        debug!("Chunk written");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_mut() {
            stream
                .flush()
                .map_err(|e| PrintStreamError::Transport(format!("Flush failed: {}", e)))?;
        }
        self.state.mark_flushed();
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.addr))]
    fn close(&mut self) -> Result<()> {
        let flushed = if self.state.needs_flush() {
            self.flush()
        } else {
            Ok(())
        };

        // Release the socket whatever the flush outcome
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Write) {
                warn!(error = %e, "Socket shutdown failed");
            }
            info!("Connection closed");
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

impl Drop for SocketAdapter {
    fn drop(&mut self) {
        if self.state.is_open() || self.stream.is_some() {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to close socket adapter");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_socket_adapter_new() {
        let adapter = SocketAdapter::new("127.0.0.1", 9100).unwrap();
        assert_eq!(adapter.addr().port(), 9100);
    }

    #[test]
    fn test_from_addr_default_port() {
        let adapter = SocketAdapter::from_addr("127.0.0.1").unwrap();
        assert_eq!(adapter.addr().port(), DEFAULT_PORT);
        let adapter = SocketAdapter::from_addr("127.0.0.1:9101").unwrap();
        assert_eq!(adapter.addr().port(), 9101);
    }

    #[test]
    fn test_from_addr_bare_ipv6() {
        let adapter = SocketAdapter::from_addr("::1").unwrap();
        assert!(adapter.addr().is_ipv6());
        assert_eq!(adapter.addr().port(), DEFAULT_PORT);

        let adapter = SocketAdapter::from_addr("[::1]").unwrap();
        assert_eq!(adapter.addr().port(), DEFAULT_PORT);

        let adapter = SocketAdapter::from_addr("[::1]:9101").unwrap();
        assert_eq!(adapter.addr().port(), 9101);
    }

    #[test]
    fn test_stale_stream_refuses_open() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut adapter = SocketAdapter::new("127.0.0.1", port).unwrap();

        // Handle left behind while the adapter is flagged closed
        adapter.stream = Some(TcpStream::connect(("127.0.0.1", port)).unwrap());
        assert!(matches!(
            adapter.open(),
            Err(PrintStreamError::AlreadyConnected(_))
        ));
        assert!(!adapter.is_open());
    }

    #[test]
    fn test_invalid_port() {
        assert!(SocketAdapter::from_addr("127.0.0.1:printer").is_err());
    }

    #[test]
    fn test_send_before_open() {
        let mut adapter = SocketAdapter::new("127.0.0.1", 9100).unwrap();
        assert!(matches!(
            adapter.send(b"x"),
            Err(PrintStreamError::AdapterNotOpen)
        ));
    }

    #[test]
    fn test_failed_open_releases_handle() {
        // Bind then drop a listener to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut adapter = SocketAdapter::new("127.0.0.1", port)
            .unwrap()
            .with_timeout(Duration::from_millis(500));

        assert!(matches!(adapter.open(), Err(PrintStreamError::Transport(_))));
        assert!(!adapter.is_open());
        // A second attempt reports the transport again, not a stale handle
        assert!(matches!(adapter.open(), Err(PrintStreamError::Transport(_))));
    }

    #[test]
    fn test_round_trip_to_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            conn.read_to_end(&mut received).unwrap();
            received
        });

        let mut adapter = SocketAdapter::new("127.0.0.1", port).unwrap();
        adapter.open().unwrap();
        adapter.send(b"\x1bE").unwrap();
        adapter.send(b"Hello\r\n").unwrap();
        adapter.close().unwrap();
        assert!(adapter.is_flushed());

        assert_eq!(server.join().unwrap(), b"\x1bEHello\r\n".to_vec());
    }
}
