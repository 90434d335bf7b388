//! Safety classification of a decoded status, used for colour coding.

use serde::Serialize;
use std::fmt;

use super::status::{Alarm, StatusRecord};

/// Severity of a safety assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Off,
    Caution,
    Ok,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::Off => "off",
            Self::Caution => "caution",
            Self::Ok => "ok",
        };
        f.write_str(s)
    }
}

/// Outcome of [`safety_assessment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyAssessment {
    pub severity: Severity,
    pub label: &'static str,
    pub advice: String,
}

impl SafetyAssessment {
    fn new(severity: Severity, label: &'static str, advice: impl Into<String>) -> Self {
        Self {
            severity,
            label,
            advice: advice.into(),
        }
    }
}

/// Classify a status record. Rules are checked in order, first match wins.
pub fn safety_assessment(record: &StatusRecord) -> SafetyAssessment {
    let flags = &record.operating_flags;
    let active = record.alarms.active();

    if !active.is_empty() {
        let names: Vec<&str> = active.iter().map(|a: &Alarm| a.name()).collect();
        return SafetyAssessment::new(
            Severity::Critical,
            "ALARM ACTIVE",
            format!("stop use; active alarms: {}", names.join(", ")),
        );
    }

    if !flags.power_on {
        return SafetyAssessment::new(Severity::Off, "POWERED DOWN", "enable power");
    }

    if !flags.installation_released {
        return SafetyAssessment::new(Severity::Caution, "NOT RELEASED", "installation not yet released for use");
    }

    if flags.installation_moving {
        return SafetyAssessment::new(Severity::Caution, "MOVING", "wait for motion to complete");
    }

    if record.installation_ready() {
        return SafetyAssessment::new(Severity::Ok, "READY", "safe to send aisle commands");
    }

    SafetyAssessment::new(Severity::Caution, "LIMITED READY", "verify status before proceeding")
}
