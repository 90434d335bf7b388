//! Mobile Racking PLC TCP client.
//!
//! Sends WMS command frames over a plain TCP socket (port 2000 by default)
//! and decodes the 20-byte status block the controller answers with.

mod client;
mod io;

#[cfg(test)]
mod tests;

// Re-export public API
pub use client::{ConnectionDiagnosis, PlcClient};
