use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single query log record in the current on-disk format.
///
/// The legacy decoder only overwrites fields it can actually recover, so a
/// caller may pre-fill defaults and rely on them surviving for any key a
/// legacy line does not supply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "IP", default, skip_serializing_if = "String::is_empty")]
    pub ip: String,

    #[serde(rename = "T", default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    #[serde(rename = "QH", default, skip_serializing_if = "String::is_empty")]
    pub qhost: String,

    #[serde(rename = "QT", default, skip_serializing_if = "String::is_empty")]
    pub qtype: String,

    #[serde(rename = "QC", default, skip_serializing_if = "String::is_empty")]
    pub qclass: String,

    #[serde(rename = "CP", default, skip_serializing_if = "String::is_empty")]
    pub client_proto: String,

    /// Packed answer message, stored as base64 text on disk.
    #[serde(
        rename = "Answer",
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "base64_bytes"
    )]
    pub answer: Vec<u8>,

    /// Upstream round trip in nanoseconds.
    #[serde(rename = "Elapsed", default)]
    pub elapsed_ns: i64,

    #[serde(rename = "Upstream", default, skip_serializing_if = "String::is_empty")]
    pub upstream: String,
}

impl LogEntry {
    /// Serializes the entry as one current-format JSON line.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Serde adapter for byte fields the on-disk format stores as base64 text.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_json_line_round_trip() {
        let entry = LogEntry {
            ip: "127.0.0.1".to_string(),
            time: Some(Utc.with_ymd_and_hms(2025, 11, 3, 9, 12, 14).unwrap()),
            qhost: "example.org".to_string(),
            qtype: "A".to_string(),
            qclass: "IN".to_string(),
            client_proto: "doh".to_string(),
            answer: vec![0x00, 0x01, 0xff],
            elapsed_ns: 1_250_000,
            upstream: "8.8.8.8:53".to_string(),
        };

        let line = entry.to_json_line().unwrap();
        let parsed: LogEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_answer_serializes_as_base64_text() {
        let entry = LogEntry {
            answer: b"\x12\x34".to_vec(),
            ..LogEntry::default()
        };

        let line = entry.to_json_line().unwrap();
        assert!(line.contains(r#""Answer":"EjQ=""#), "got: {line}");
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let line = LogEntry::default().to_json_line().unwrap();
        assert_eq!(line, r#"{"Elapsed":0}"#);
    }
}
