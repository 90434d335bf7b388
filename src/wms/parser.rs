//! Status response decoding.

use super::error::{CodecError, Result};
use super::status::{AisleLighting, Alarms, CommandFlags, OperatingFlags, SoftwareVersion, StatusRecord};
use super::types::RESPONSE_LEN;

/// Decode a 20-byte status response.
///
/// Byte layout:
/// - 0: command echo, 1: command flags
/// - 2-3: software version (major, minor)
/// - 4: TCP messages received, 5: operating flags
/// - 6: trolley count, 7: forklift count
/// - 8-9: alarm bits, 10-13: aisle lighting bitmap
/// - 14: aisle to open, 15: last open aisle
/// - 16-17: MCC error (trolley, code), 18-19: trolley error (number, code)
///
/// Responses carry no checksum; the transport is trusted to deliver whole frames.
pub fn parse(buffer: &[u8]) -> Result<StatusRecord> {
    let raw: [u8; RESPONSE_LEN] = buffer.try_into().map_err(|_| CodecError::MalformedResponse {
        expected: RESPONSE_LEN,
        actual: buffer.len(),
    })?;

    Ok(StatusRecord {
        command_echo: raw[0],
        command_flags: CommandFlags::from_byte(raw[1]),
        software_version: SoftwareVersion {
            major: raw[2],
            minor: raw[3],
        },
        tcp_received_messages: raw[4],
        operating_flags: OperatingFlags::from_byte(raw[5]),
        trolley_count: raw[6],
        forklift_count: raw[7],
        alarms: Alarms::from_bytes(raw[8], raw[9]),
        aisle_lighting: AisleLighting::from_bytes([raw[10], raw[11], raw[12], raw[13]]),
        aisle_to_open: raw[14],
        last_open_aisle: raw[15],
        mcc_error_trolley: raw[16],
        mcc_error_code: raw[17],
        trolley_error_number: raw[18],
        trolley_error_code: raw[19],
        raw,
    })
}
