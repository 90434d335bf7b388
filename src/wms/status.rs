//! Decoded status block and its typed sub-records.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use super::types::RESPONSE_LEN;

/// Number of aisles covered by the lighting bitmap.
pub const LIGHTING_AISLES: u8 = 32;

/// Controller software version (bytes 2 and 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SoftwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Command flags echoed in byte 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CommandFlags {
    /// Bit 0: start opening.
    pub start_opening: bool,
    /// Bit 1: status requested.
    pub request_status: bool,
}

impl CommandFlags {
    pub(crate) fn from_byte(byte: u8) -> Self {
        Self {
            start_opening: byte & 0x01 != 0,
            request_status: byte & 0x02 != 0,
        }
    }
}

/// Operating mode flags packed into byte 5. Bit 7 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OperatingFlags {
    pub tcp_connection_ok: bool,
    pub auto_mode_active: bool,
    pub installation_released: bool,
    pub manual_mode_active: bool,
    pub nightmode_active: bool,
    pub installation_moving: bool,
    pub power_on: bool,
}

impl OperatingFlags {
    pub(crate) fn from_byte(byte: u8) -> Self {
        let bit = |n: u8| byte & (1 << n) != 0;
        Self {
            tcp_connection_ok: bit(0),
            auto_mode_active: bit(1),
            installation_released: bit(2),
            manual_mode_active: bit(3),
            nightmode_active: bit(4),
            installation_moving: bit(5),
            power_on: bit(6),
        }
    }

    /// Flags as `(name, value)` pairs in bit order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> {
        [
            ("tcp_connection_ok", self.tcp_connection_ok),
            ("auto_mode_active", self.auto_mode_active),
            ("installation_released", self.installation_released),
            ("manual_mode_active", self.manual_mode_active),
            ("nightmode_active", self.nightmode_active),
            ("installation_moving", self.installation_moving),
            ("power_on", self.power_on),
        ]
        .into_iter()
    }
}

/// Named alarm bits from bytes 8 and 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alarm {
    PdsFrontInterrupted,
    PdsBackInterrupted,
    PdsSideInterrupted,
    EmergencyShutdown,
    UnderdriveSensorDetection,
    FdsSensorIssue,
    PalletDetectionMaster,
    Relay50K1Off,
    EmergencyButtonSlave,
    UnderdriveSensorSlave,
    PdSlaveNotOk,
    Relay50K2Off,
    PalletDetectionSlave,
}

impl Alarm {
    /// All alarms in wire order (byte 8 bit 0 first).
    pub const ALL: [Alarm; 13] = [
        Alarm::PdsFrontInterrupted,
        Alarm::PdsBackInterrupted,
        Alarm::PdsSideInterrupted,
        Alarm::EmergencyShutdown,
        Alarm::UnderdriveSensorDetection,
        Alarm::FdsSensorIssue,
        Alarm::PalletDetectionMaster,
        Alarm::Relay50K1Off,
        Alarm::EmergencyButtonSlave,
        Alarm::UnderdriveSensorSlave,
        Alarm::PdSlaveNotOk,
        Alarm::Relay50K2Off,
        Alarm::PalletDetectionSlave,
    ];

    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::PdsFrontInterrupted => "pds_front_interrupted",
            Self::PdsBackInterrupted => "pds_back_interrupted",
            Self::PdsSideInterrupted => "pds_side_interrupted",
            Self::EmergencyShutdown => "emergency_shutdown",
            Self::UnderdriveSensorDetection => "underdrive_sensor_detection",
            Self::FdsSensorIssue => "fds_sensor_issue",
            Self::PalletDetectionMaster => "pallet_detection_master",
            Self::Relay50K1Off => "relay_50k1_off",
            Self::EmergencyButtonSlave => "emergency_button_slave",
            Self::UnderdriveSensorSlave => "underdrive_sensor_slave",
            Self::PdSlaveNotOk => "pd_slave_not_ok",
            Self::Relay50K2Off => "relay_50k2_off",
            Self::PalletDetectionSlave => "pallet_detection_slave",
        }
    }

    /// Position in the response as `(byte offset, bit)`.
    pub fn position(self) -> (usize, u8) {
        let index = self as u8;
        if index < 8 { (8, index) } else { (9, index - 8) }
    }

    fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Active alarm set. Reserved bits 5-7 of byte 9 are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alarms(u16);

impl Alarms {
    const USED_BITS: u16 = 0x1FFF;

    pub(crate) fn from_bytes(byte8: u8, byte9: u8) -> Self {
        Self(u16::from_le_bytes([byte8, byte9]) & Self::USED_BITS)
    }

    pub fn is_active(&self, alarm: Alarm) -> bool {
        self.0 & alarm.mask() != 0
    }

    /// Active alarms in wire order.
    pub fn active(&self) -> Vec<Alarm> {
        Alarm::ALL.into_iter().filter(|a| self.is_active(*a)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Alarm, bool)> + '_ {
        Alarm::ALL.into_iter().map(|a| (a, self.is_active(a)))
    }

    pub fn any(&self) -> bool {
        self.0 != 0
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Raw 13-bit mask (byte 8 in the low byte).
    pub fn bits(&self) -> u16 {
        self.0
    }
}

impl Serialize for Alarms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Alarm::ALL.len()))?;
        for (alarm, active) in self.iter() {
            map.serialize_entry(alarm.name(), &active)?;
        }
        map.end()
    }
}

/// Aisle lighting bitmap from bytes 10-13 (little endian, aisle 1 = lowest bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AisleLighting(u32);

impl AisleLighting {
    pub(crate) fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// Whether the light for `aisle` (1..=32) is on. Out of range is never lit.
    pub fn is_lit(&self, aisle: u8) -> bool {
        (1..=LIGHTING_AISLES).contains(&aisle) && self.0 & (1 << (aisle - 1)) != 0
    }

    /// Lit aisle numbers in ascending order.
    pub fn lit_aisles(&self) -> Vec<u8> {
        (1..=LIGHTING_AISLES).filter(|a| self.is_lit(*a)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, bool)> + '_ {
        (1..=LIGHTING_AISLES).map(|a| (a, self.is_lit(a)))
    }

    pub fn any_lit(&self) -> bool {
        self.0 != 0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl Serialize for AisleLighting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(LIGHTING_AISLES as usize))?;
        for (aisle, lit) in self.iter() {
            map.serialize_entry(&aisle, &lit)?;
        }
        map.end()
    }
}

/// Decoded 20-byte status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    /// Byte 0: echoed target id.
    pub command_echo: u8,
    /// Byte 1.
    pub command_flags: CommandFlags,
    /// Bytes 2-3.
    pub software_version: SoftwareVersion,
    /// Byte 4.
    pub tcp_received_messages: u8,
    /// Byte 5.
    pub operating_flags: OperatingFlags,
    /// Byte 6.
    pub trolley_count: u8,
    /// Byte 7.
    pub forklift_count: u8,
    /// Bytes 8-9.
    pub alarms: Alarms,
    /// Bytes 10-13.
    pub aisle_lighting: AisleLighting,
    /// Byte 14.
    pub aisle_to_open: u8,
    /// Byte 15.
    pub last_open_aisle: u8,
    /// Byte 16.
    pub mcc_error_trolley: u8,
    /// Byte 17.
    pub mcc_error_code: u8,
    /// Byte 18.
    pub trolley_error_number: u8,
    /// Byte 19.
    pub trolley_error_code: u8,
    #[serde(skip)]
    pub(crate) raw: [u8; RESPONSE_LEN],
}

impl StatusRecord {
    /// No alarm is active.
    pub fn system_healthy(&self) -> bool {
        !self.alarms.any()
    }

    /// Installation is released and powered.
    pub fn installation_ready(&self) -> bool {
        self.operating_flags.installation_released && self.operating_flags.power_on
    }

    pub fn any_aisle_lit(&self) -> bool {
        self.aisle_lighting.any_lit()
    }

    /// The response bytes this record was decoded from.
    pub fn raw(&self) -> &[u8; RESPONSE_LEN] {
        &self.raw
    }

    /// Response as ten little-endian 16-bit words.
    pub fn words(&self) -> [u16; RESPONSE_LEN / 2] {
        let mut words = [0u16; RESPONSE_LEN / 2];
        for (word, pair) in words.iter_mut().zip(self.raw.chunks_exact(2)) {
            *word = u16::from_le_bytes([pair[0], pair[1]]);
        }
        words
    }

    /// Upper-case hex of the raw response, no separators.
    pub fn hex(&self) -> String {
        self.raw.iter().map(|b| format!("{b:02X}")).collect()
    }
}
