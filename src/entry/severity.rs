//! Log severity levels.
//!
//! Numeric values follow the backend's LogSeverity enum so that ordering
//! and wire values agree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a log entry, ordered from `Default` (lowest) to `Emergency`.
#[repr(u16)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// No assigned severity level.
    #[default]
    Default = 0,
    Debug = 100,
    Info = 200,
    /// Normal but significant events, such as start up or shut down.
    Notice = 300,
    Warning = 400,
    Error = 500,
    /// Severe events that cause more severe problems or brief outages.
    Critical = 600,
    /// A person must take an action immediately.
    Alert = 700,
    /// One or more systems are unusable.
    Emergency = 800,
}

impl Severity {
    /// All levels in ascending order.
    pub const ALL: [Severity; 9] = [
        Severity::Default,
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Alert,
        Severity::Emergency,
    ];

    /// Parse a severity name, ignoring case. Unknown names map to `Default`.
    pub fn parse(name: &str) -> Severity {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    /// Capitalised name, e.g. `"Alert"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Default => "Default",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Notice => "Notice",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
            Severity::Alert => "Alert",
            Severity::Emergency => "Emergency",
        }
    }

    /// Numeric value used by the backend.
    pub fn value(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
        assert_eq!(
            [Severity::Info, Severity::Alert, Severity::Error].into_iter().max(),
            Some(Severity::Alert)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(Severity::parse("Alert"), Severity::Alert);
        assert_eq!(Severity::parse("warning"), Severity::Warning);
        assert_eq!(Severity::parse("EMERGENCY"), Severity::Emergency);
        assert_eq!(Severity::parse("verbose"), Severity::Default);
        assert_eq!(Severity::parse(""), Severity::Default);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Severity::Alert.to_string(), "Alert");
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
        let parsed: Severity = serde_json::from_str("\"NOTICE\"").unwrap();
        assert_eq!(parsed, Severity::Notice);
        assert_eq!(Severity::Notice.value(), 300);
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(Severity::from(tracing::Level::TRACE), Severity::Debug);
        assert_eq!(Severity::from(tracing::Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(tracing::Level::ERROR), Severity::Error);
    }
}
