//! Printer adapters for sending raw label data
//!
//! Label printers (ZPL/EPL/PDF capable) accept the document bytes as-is on
//! the raw TCP port 9100.

use crate::error::{PrintError, PrintResult};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Default raw printing port
pub const RAW_PORT: u16 = 9100;

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw document bytes to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network printer (TCP port 9100)
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        Self::from_addr(&format!("{}:{}", host, port))
    }

    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    ///
    /// A bare IP gets the raw port appended.
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let parsed: SocketAddr = match addr.parse() {
            Ok(a) => a,
            Err(_) => format!("{}:{}", addr, RAW_PORT)
                .parse()
                .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr)))?,
        };

        Ok(Self {
            addr: parsed,
            timeout: Duration::from_secs(5),
        })
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

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to printer");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;
        stream.flush().await?;
        stream.shutdown().await?;

        info!("Print job sent");
        Ok(())
    }

    #[instrument(fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(check_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }
}
