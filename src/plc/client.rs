//! PlcClient struct and public API.

use super::io::{read_reply, write_frame};
use crate::error::{AppError, Result};
use crate::wms::{self, CommandFrame, ProtocolMode, RESPONSE_LEN, StatusRecord};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// TCP client for the Mobile Racking WMS interface.
///
/// Each command is answered with one 20-byte status block. There are no
/// retries; a failed exchange is reported to the caller as-is.
pub struct PlcClient {
    stream: Option<TcpStream>,
    host: String,
    port: u16,
    timeout_duration: Duration,
    mode: ProtocolMode,
    max_aisle: u8,
}

impl PlcClient {
    /// Create a new client. Nothing is opened until [`connect`](Self::connect).
    pub fn new(host: &str, port: u16, timeout_secs: u64, mode: ProtocolMode) -> Self {
        Self {
            stream: None,
            host: host.to_string(),
            port,
            timeout_duration: Duration::from_secs(timeout_secs),
            mode,
            max_aisle: 24,
        }
    }

    /// Set the highest aisle accepted by [`open_aisle`](Self::open_aisle).
    pub fn with_max_aisle(mut self, max_aisle: u8) -> Self {
        self.max_aisle = max_aisle;
        self
    }

    pub fn mode(&self) -> ProtocolMode {
        self.mode
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the TCP connection.
    pub async fn connect(&mut self) -> Result<()> {
        let addr = self.address();
        info!("TCP connecting to {} (timeout={:?})", addr, self.timeout_duration);

        let stream = timeout(self.timeout_duration, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                error!("Connection timeout to {addr}");
                AppError::TcpConnectionFailed(format!("Connection timeout to {addr}"))
            })?
            .map_err(|e| {
                error!("Failed to connect to {addr}: {e}");
                AppError::TcpConnectionFailed(format!("Failed to connect to {addr}: {e}"))
            })?;

        self.stream = Some(stream);
        info!("Connected to {addr}");
        Ok(())
    }

    /// Close the TCP connection.
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.stream.take().is_some() {
            info!("Disconnected from {}", self.address());
        }
        Ok(())
    }

    /// Check if connected to the controller.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Send a status request and decode the reply.
    pub async fn request_status(&mut self) -> Result<StatusRecord> {
        let frame = wms::encode_status_request(self.mode);
        self.exchange_status(&frame).await
    }

    /// Send an "open aisle" command and decode the status reply.
    pub async fn open_aisle(&mut self, aisle: i32) -> Result<StatusRecord> {
        self.check_aisle(aisle)?;
        let frame = wms::encode_open_aisle(aisle, self.mode)?;
        info!("Opening aisle {aisle} ({} protocol)", self.mode);
        self.exchange_status(&frame).await
    }

    /// Connect, request status and disconnect.
    pub async fn fetch_status(&mut self) -> Result<StatusRecord> {
        if !self.is_connected() {
            self.connect().await?;
        }
        let result = self.request_status().await;
        self.disconnect().await?;
        result
    }

    /// Reject aisles outside `1..=max_aisle` before anything is sent.
    pub fn check_aisle(&self, aisle: i32) -> Result<()> {
        if aisle < 1 || aisle > i32::from(self.max_aisle) {
            return Err(AppError::validation(format!(
                "Aisle {aisle} out of range 1..={}",
                self.max_aisle
            )));
        }
        Ok(())
    }

    /// Send a frame and return the raw reply bytes.
    pub async fn exchange(&mut self, frame: &CommandFrame) -> Result<Vec<u8>> {
        let timeout_duration = self.timeout_duration;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| AppError::TcpConnectionFailed("Not connected".to_string()))?;

        let result = match write_frame(stream, frame.as_bytes(), timeout_duration).await {
            Ok(()) => read_reply(stream, timeout_duration).await,
            Err(e) => Err(e),
        };

        // A broken exchange or a reply cut short by the peer leaves the stream unusable
        let stale = match &result {
            Ok(reply) => reply.len() < RESPONSE_LEN,
            Err(e) => e.is_transport(),
        };
        if stale {
            debug!("Dropping connection to {}", self.address());
            self.stream = None;
        }
        result
    }

    async fn exchange_status(&mut self, frame: &CommandFrame) -> Result<StatusRecord> {
        let reply = self.exchange(frame).await?;
        let status = wms::parse(&reply)?;
        debug!(
            "Status: version {}, {} active alarms",
            status.software_version,
            status.alarms.count()
        );
        Ok(status)
    }

    /// Diagnose connection issues. Returns detailed status info.
    ///
    /// The probe runs on its own connection; an existing one is left in place.
    pub async fn diagnose_connection(&mut self) -> ConnectionDiagnosis {
        let addr = self.address();
        let start = std::time::Instant::now();

        // Step 1: Try TCP connect
        let tcp_result = timeout(self.timeout_duration, TcpStream::connect(&addr)).await;
        let tcp_connect_ms = start.elapsed().as_millis() as u64;

        let mut diagnosis = ConnectionDiagnosis {
            address: addr,
            tcp_reachable: false,
            tcp_connect_ms,
            tcp_error: None,
            protocol_ok: false,
            protocol_error: None,
            exchange_ms: None,
            software_version: None,
        };

        let previous = match tcp_result {
            Err(_) => {
                diagnosis.tcp_error = Some("TCP connection timeout".to_string());
                return diagnosis;
            }
            Ok(Err(e)) => {
                diagnosis.tcp_error = Some(format!("TCP error: {e}"));
                return diagnosis;
            }
            Ok(Ok(stream)) => {
                diagnosis.tcp_reachable = true;
                self.stream.replace(stream)
            }
        };

        // Step 2: Try a status exchange
        let exchange_start = std::time::Instant::now();
        let result = self.request_status().await;
        diagnosis.exchange_ms = Some(exchange_start.elapsed().as_millis() as u64);

        match result {
            Ok(status) => {
                diagnosis.protocol_ok = true;
                diagnosis.software_version = Some(status.software_version.to_string());
            }
            Err(e) => diagnosis.protocol_error = Some(e.to_string()),
        }

        self.stream = previous;
        diagnosis
    }
}

/// Diagnostic information about connection attempt.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConnectionDiagnosis {
    /// Address that was probed
    pub address: String,
    /// Whether TCP port was reachable
    pub tcp_reachable: bool,
    /// Time to establish TCP connection (ms)
    pub tcp_connect_ms: u64,
    /// TCP-level error if any
    pub tcp_error: Option<String>,
    /// Whether a status request got a valid reply
    pub protocol_ok: bool,
    /// Protocol-level error if any
    pub protocol_error: Option<String>,
    /// Round trip of the status exchange (ms)
    pub exchange_ms: Option<u64>,
    /// Controller software version (if decoded)
    pub software_version: Option<String>,
}

impl std::fmt::Display for ConnectionDiagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Connection Diagnosis ===")?;
        writeln!(f, "Address: {}", self.address)?;
        writeln!(f, "TCP Reachable: {}", self.tcp_reachable)?;
        writeln!(f, "TCP Connect Time: {}ms", self.tcp_connect_ms)?;

        if let Some(ref err) = self.tcp_error {
            writeln!(f, "TCP Error: {err}")?;
        }

        if self.tcp_reachable {
            writeln!(f, "Protocol OK: {}", self.protocol_ok)?;
            if let Some(ms) = self.exchange_ms {
                writeln!(f, "Exchange Time: {ms}ms")?;
            }
            if let Some(ref err) = self.protocol_error {
                writeln!(f, "Protocol Error: {err}")?;
            }
            if let Some(ref version) = self.software_version {
                writeln!(f, "Software Version: {version}")?;
            }
        }

        Ok(())
    }
}
