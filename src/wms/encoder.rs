//! Command frame encoding for both wire formats.

use super::error::{CodecError, Result};
use super::types::{
    ACTION_OPEN, ACTION_STATUS, CommandFrame, ETX, LEGACY_CMD_OPEN, LEGACY_LENGTH, ProtocolMode, Request, STATUS_TARGET,
    STX,
};

/// XOR checksum over the legacy frame body.
pub fn legacy_checksum(length: u8, command: u8, target: u8) -> u8 {
    length ^ command ^ target
}

/// Encode a logical request in the selected wire format.
pub fn encode(request: Request, mode: ProtocolMode) -> Result<CommandFrame> {
    match request {
        Request::Status => Ok(encode_status_request(mode)),
        Request::OpenAisle(aisle) => encode_open_aisle(aisle, mode),
    }
}

/// Encode a status request.
///
/// The legacy format has no dedicated status command; controllers answer any
/// framed command with a status block, so the open shape is sent with target 0.
pub fn encode_status_request(mode: ProtocolMode) -> CommandFrame {
    match mode {
        ProtocolMode::Simple => CommandFrame::Simple([STATUS_TARGET, ACTION_STATUS]),
        ProtocolMode::Legacy => legacy_frame(STATUS_TARGET),
    }
}

/// Encode an "open aisle" command.
///
/// Accepts any aisle that fits in a byte. The operational range (1..=24 on the
/// installations seen so far) is enforced by the caller.
pub fn encode_open_aisle(aisle: i32, mode: ProtocolMode) -> Result<CommandFrame> {
    let target = u8::try_from(aisle).map_err(|_| CodecError::InvalidAisle(aisle))?;

    Ok(match mode {
        ProtocolMode::Simple => CommandFrame::Simple([target, ACTION_OPEN]),
        ProtocolMode::Legacy => legacy_frame(target),
    })
}

fn legacy_frame(target: u8) -> CommandFrame {
    let checksum = legacy_checksum(LEGACY_LENGTH, LEGACY_CMD_OPEN, target);
    CommandFrame::Legacy([STX, LEGACY_LENGTH, LEGACY_CMD_OPEN, target, checksum, ETX])
}
