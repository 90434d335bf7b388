//! Mobile Racking WMS binary protocol codec.
//!
//! Commands go out as 2-byte `[target, action]` frames or 6-byte legacy
//! frames (`STX LEN 'O' TARGET CHK ETX`); every reply is a 20-byte status block.
//! The codec is pure: no I/O, no logging, no shared state.
//!
//! # Example
//!
//! ```
//! use mobile_racking::wms::{self, ProtocolMode};
//!
//! let frame = wms::encode_open_aisle(7, ProtocolMode::Legacy).unwrap();
//! assert_eq!(frame.as_bytes(), &[0x02, 0x02, 0x4F, 7, 0x02 ^ 0x4F ^ 7, 0x03]);
//!
//! let status = wms::parse(&[0u8; 20]).unwrap();
//! assert!(status.system_healthy());
//! ```

mod encoder;
mod error;
mod parser;
mod safety;
mod status;
mod types;


pub use encoder::{encode, encode_open_aisle, encode_status_request, legacy_checksum};
pub use error::{CodecError, Result};
pub use parser::parse;
pub use safety::{SafetyAssessment, Severity, safety_assessment};
pub use status::{
    AisleLighting, Alarm, Alarms, CommandFlags, LIGHTING_AISLES, OperatingFlags, SoftwareVersion, StatusRecord,
};
pub use types::{CommandFrame, ProtocolMode, RESPONSE_LEN, Request};
