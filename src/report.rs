//! Plain-text rendering of status records.

use serde::Serialize;
use std::fmt;

use crate::wms::{SafetyAssessment, StatusRecord, safety_assessment};

/// Format bytes as space separated upper-case hex (`"00 02"`).
pub fn format_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ")
}

/// Parse a hex dump such as `"00 02 02 05"`, `"00020205"` or `"0x00,0x02"`.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ':')
        .map(|token| token.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();

    if !digits.is_ascii() {
        return Err("Hex dump contains non-ASCII characters".to_string());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("Odd number of hex digits ({})", digits.len()));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| format!("Invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}

fn on_off(value: bool) -> &'static str {
    if value { "ON" } else { "off" }
}

/// Status summary for terminal output.
pub struct StatusReport<'a>(pub &'a StatusRecord);

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.0;
        let safety = safety_assessment(status);
        let flags = &status.operating_flags;

        writeln!(f, "=== Mobile Racking Status ===")?;
        writeln!(f, "Status: [{}] {}", safety.severity, safety.label)?;
        writeln!(f, "Advice: {}", safety.advice)?;
        writeln!(f, "Software Version: {}", status.software_version)?;
        writeln!(f, "Raw: {}", format_hex(status.raw()))?;
        writeln!(f)?;

        writeln!(f, "--- Operating Mode ---")?;
        writeln!(f, "Power: {}", on_off(flags.power_on))?;
        writeln!(f, "Connection: {}", if flags.tcp_connection_ok { "OK" } else { "FAULT" })?;
        writeln!(f, "Auto Mode: {}", on_off(flags.auto_mode_active))?;
        writeln!(f, "Manual Mode: {}", on_off(flags.manual_mode_active))?;
        writeln!(f, "Night Mode: {}", on_off(flags.nightmode_active))?;
        writeln!(f, "Released: {}", if flags.installation_released { "yes" } else { "no" })?;
        writeln!(f, "Moving: {}", if flags.installation_moving { "yes" } else { "no" })?;
        writeln!(f)?;

        writeln!(f, "--- Alarms ---")?;
        let active = status.alarms.active();
        if active.is_empty() {
            writeln!(f, "No active alarms")?;
        } else {
            writeln!(f, "{} active:", active.len())?;
            for alarm in active {
                writeln!(f, "  - {alarm}")?;
            }
        }
        writeln!(f)?;

        writeln!(f, "--- Aisles ---")?;
        let lit = status.aisle_lighting.lit_aisles();
        if lit.is_empty() {
            writeln!(f, "Lit: none")?;
        } else {
            let list: Vec<String> = lit.iter().map(|a| a.to_string()).collect();
            writeln!(f, "Lit: {}", list.join(", "))?;
        }
        if status.aisle_to_open > 0 {
            writeln!(f, "Aisle To Open: {}", status.aisle_to_open)?;
        }
        if status.last_open_aisle > 0 {
            writeln!(f, "Last Open Aisle: {}", status.last_open_aisle)?;
        }
        writeln!(f, "Trolleys: {}", status.trolley_count)?;
        writeln!(f, "Forklifts Inside: {}", status.forklift_count)?;

        if status.mcc_error_code != 0 || status.trolley_error_code != 0 {
            writeln!(f)?;
            writeln!(f, "--- Errors ---")?;
            writeln!(
                f,
                "MCC: trolley {} code {}",
                status.mcc_error_trolley, status.mcc_error_code
            )?;
            writeln!(
                f,
                "Trolley: number {} code {}",
                status.trolley_error_number, status.trolley_error_code
            )?;
        }

        Ok(())
    }
}

/// JSON view of a status record including derived fields.
#[derive(Debug, Serialize)]
pub struct StatusView<'a> {
    #[serde(flatten)]
    pub status: &'a StatusRecord,
    pub hex: String,
    pub system_healthy: bool,
    pub installation_ready: bool,
    pub safety: SafetyAssessment,
}

impl<'a> StatusView<'a> {
    pub fn new(status: &'a StatusRecord) -> Self {
        Self {
            status,
            hex: status.hex(),
            system_healthy: status.system_healthy(),
            installation_ready: status.installation_ready(),
            safety: safety_assessment(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wms::parse;

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x02, 0x02, 0x4F]), "02 02 4F");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn test_parse_hex_formats() {
        assert_eq!(parse_hex("00 02 4f").unwrap(), vec![0x00, 0x02, 0x4F]);
        assert_eq!(parse_hex("00024F").unwrap(), vec![0x00, 0x02, 0x4F]);
        assert_eq!(parse_hex("0x00,0x02").unwrap(), vec![0x00, 0x02]);
        assert!(parse_hex("0").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_report_lists_alarms_and_errors() {
        let status = parse(&[0, 2, 2, 5, 9, 9, 0, 0, 223, 27, 0, 0, 0, 0, 0, 0, 0, 14, 0, 0]).unwrap();
        let text = StatusReport(&status).to_string();

        assert!(text.contains("Status: [critical] ALARM ACTIVE"));
        assert!(text.contains("11 active:"));
        assert!(text.contains("  - emergency_shutdown"));
        assert!(text.contains("MCC: trolley 0 code 14"));
        assert!(text.contains("Software Version: 2.5"));
    }

    #[test]
    fn test_report_ready_installation() {
        let mut data = [0u8; 20];
        data[5] = 0x44;
        data[10] = 0x05;
        let status = parse(&data).unwrap();
        let text = StatusReport(&status).to_string();

        assert!(text.contains("Status: [ok] READY"));
        assert!(text.contains("No active alarms"));
        assert!(text.contains("Lit: 1, 3"));
        assert!(!text.contains("--- Errors ---"));
    }

    #[test]
    fn test_status_view_json() {
        let mut data = [0u8; 20];
        data[5] = 0x44;
        let status = parse(&data).unwrap();
        let json = serde_json::to_value(StatusView::new(&status)).unwrap();

        assert_eq!(json["system_healthy"], true);
        assert_eq!(json["installation_ready"], true);
        assert_eq!(json["safety"]["severity"], "ok");
        assert_eq!(json["operating_flags"]["power_on"], true);
        assert_eq!(json["hex"].as_str().map(str::len), Some(40));
    }
}
