//! WMS protocol types and constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Status response
pub const RESPONSE_LEN: usize = 20;

// Simple protocol: [target, action]
pub const STATUS_TARGET: u8 = 0;
pub const ACTION_OPEN: u8 = 1;
pub const ACTION_STATUS: u8 = 2;

// Legacy protocol: [STX, LEN, CMD, TARGET, CHK, ETX]
pub const STX: u8 = 0x02;
pub const ETX: u8 = 0x03;
pub const LEGACY_LENGTH: u8 = 2;
pub const LEGACY_CMD_OPEN: u8 = 0x4F; // 'O'
pub const LEGACY_FRAME_LEN: usize = 6;
pub const SIMPLE_FRAME_LEN: usize = 2;

/// Wire format used for outbound commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolMode {
    /// 2-byte `[target, action]` frames.
    #[default]
    Simple,
    /// 6-byte STX/ETX framed commands with XOR checksum.
    Legacy,
}

impl fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for ProtocolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("Unknown protocol mode '{other}' (expected simple or legacy)")),
        }
    }
}

/// Logical request to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Ask for the 20-byte status block.
    Status,
    /// Open the given aisle.
    OpenAisle(i32),
}

/// Encoded command ready for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandFrame {
    Simple([u8; SIMPLE_FRAME_LEN]),
    Legacy([u8; LEGACY_FRAME_LEN]),
}

impl CommandFrame {
    /// Raw bytes to send.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Simple(bytes) => bytes,
            Self::Legacy(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Wire format this frame was encoded in.
    pub fn mode(&self) -> ProtocolMode {
        match self {
            Self::Simple(_) => ProtocolMode::Simple,
            Self::Legacy(_) => ProtocolMode::Legacy,
        }
    }

    /// Target id carried by the frame (aisle number, 0 for status).
    pub fn target(&self) -> u8 {
        match self {
            Self::Simple(bytes) => bytes[0],
            Self::Legacy(bytes) => bytes[3],
        }
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
