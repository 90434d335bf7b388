//! Caller-owned monitoring state: last status and a bounded history.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{info, warn};

use crate::error::Result;
use crate::plc::PlcClient;
use crate::wms::{Alarm, StatusRecord};

/// A decoded status with the time the caller received it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub received_at: DateTime<Local>,
    pub record: StatusRecord,
}

/// Alarms that changed between two consecutive snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmChanges {
    pub raised: Vec<Alarm>,
    pub cleared: Vec<Alarm>,
}

impl AlarmChanges {
    pub fn is_empty(&self) -> bool {
        self.raised.is_empty() && self.cleared.is_empty()
    }
}

/// Status history, newest last.
#[derive(Debug, Clone)]
pub struct MonitorState {
    history: VecDeque<StatusSnapshot>,
    capacity: usize,
}

impl MonitorState {
    /// Create a state keeping at most `capacity` snapshots (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Store a snapshot, dropping the oldest one when full.
    pub fn record(&mut self, record: StatusRecord, received_at: DateTime<Local>) -> &StatusSnapshot {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(StatusSnapshot { received_at, record });
        &self.history[self.history.len() - 1]
    }

    pub fn last(&self) -> Option<&StatusSnapshot> {
        self.history.back()
    }

    pub fn history(&self) -> impl Iterator<Item = &StatusSnapshot> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Alarm changes between the two most recent snapshots.
    pub fn alarm_changes(&self) -> AlarmChanges {
        let len = self.history.len();
        if len < 2 {
            return AlarmChanges::default();
        }

        let before = &self.history[len - 2].record.alarms;
        let after = &self.history[len - 1].record.alarms;

        let mut changes = AlarmChanges::default();
        for alarm in Alarm::ALL {
            match (before.is_active(alarm), after.is_active(alarm)) {
                (false, true) => changes.raised.push(alarm),
                (true, false) => changes.cleared.push(alarm),
                _ => {}
            }
        }
        changes
    }
}

/// Perform one status exchange and record the result.
pub async fn poll_once(client: &mut PlcClient, state: &mut MonitorState) -> Result<StatusSnapshot> {
    let record = client.fetch_status().await?;
    let snapshot = state.record(record, Local::now()).clone();

    let changes = state.alarm_changes();
    for alarm in &changes.raised {
        warn!("Alarm raised: {alarm}");
    }
    for alarm in &changes.cleared {
        info!("Alarm cleared: {alarm}");
    }

    info!(
        "Status at {}: version {}, {} active alarms",
        snapshot.received_at.format("%H:%M:%S"),
        record.software_version,
        record.alarms.count()
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wms::parse;
    use chrono::TimeZone;

    fn status_with_alarm_bytes(byte8: u8, byte9: u8) -> StatusRecord {
        let mut data = [0u8; 20];
        data[5] = 0x44;
        data[8] = byte8;
        data[9] = byte9;
        parse(&data).unwrap()
    }

    fn at(second: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 31, 10, 0, second).unwrap()
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = MonitorState::new(3);
        for second in 0..5 {
            state.record(status_with_alarm_bytes(0, 0), at(second));
        }

        assert_eq!(state.len(), 3);
        let times: Vec<_> = state.history().map(|s| s.received_at).collect();
        assert_eq!(times, vec![at(2), at(3), at(4)]);
        assert_eq!(state.last().unwrap().received_at, at(4));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut state = MonitorState::new(0);
        state.record(status_with_alarm_bytes(0, 0), at(0));
        state.record(status_with_alarm_bytes(0, 0), at(1));
        assert_eq!(state.capacity(), 1);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_alarm_changes() {
        let mut state = MonitorState::new(10);
        assert!(state.alarm_changes().is_empty());

        state.record(status_with_alarm_bytes(0x01, 0x00), at(0));
        state.record(status_with_alarm_bytes(0x08, 0x10), at(1));

        let changes = state.alarm_changes();
        assert_eq!(changes.raised, vec![Alarm::EmergencyShutdown, Alarm::PalletDetectionSlave]);
        assert_eq!(changes.cleared, vec![Alarm::PdsFrontInterrupted]);
    }

    #[test]
    fn test_clear() {
        let mut state = MonitorState::new(5);
        state.record(status_with_alarm_bytes(0, 0), at(0));
        state.clear();
        assert!(state.is_empty());
        assert!(state.last().is_none());
    }
}
