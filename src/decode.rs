// Best-effort decoding of query log lines written by older format versions.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::entry::LogEntry;
use crate::scanner::{Scanner, TokenKind};
use crate::wire;

/// Populates `entry` from a single legacy log line.
///
/// Decoding is best effort: unknown keys are skipped, a field that fails to
/// convert keeps whatever value `entry` already had, and nothing is reported
/// to the caller. The one exception is the packed query payload under
/// `"Question"`: if its base64 or wire-format decoding fails, a single
/// diagnostic is logged and the rest of the line is abandoned, since the
/// fields derived from it are the ones downstream lookups need.
pub fn decode_log_entry(entry: &mut LogEntry, line: &str) {
    let mut scan = Scanner::new(line);
    loop {
        let tok = scan.next_token();
        match tok.kind {
            TokenKind::End => return,
            TokenKind::Object => {
                // Nested objects (the legacy "Result" block among them) are
                // drained, not interpreted, so the cursor stays on the
                // top-level pairs.
                scan.skip_object();
                continue;
            }
            TokenKind::String | TokenKind::Bool | TokenKind::Number => {}
        }

        match tok.key {
            "IP" => entry.ip = tok.value.to_string(),
            "T" | "Time" => {
                if let Ok(t) = DateTime::parse_from_rfc3339(tok.value) {
                    entry.time = Some(t.with_timezone(&Utc));
                }
            }
            "QH" => entry.qhost = tok.value.to_string(),
            "QT" => entry.qtype = tok.value.to_string(),
            "QC" => entry.qclass = tok.value.to_string(),
            "CP" => entry.client_proto = tok.value.to_string(),
            "Upstream" => entry.upstream = tok.value.to_string(),
            "Elapsed" => {
                if let Ok(ns) = tok.value.parse::<i64>() {
                    entry.elapsed_ns = ns;
                }
            }
            "Answer" => {
                if let Ok(bytes) = BASE64.decode(tok.value) {
                    entry.answer = bytes;
                }
            }
            "Question" => {
                let raw = match BASE64.decode(tok.value) {
                    Ok(raw) => raw,
                    Err(err) => {
                        debug!("decode_log_entry err: {err}");
                        return;
                    }
                };
                let msg = match wire::unpack(&raw) {
                    Ok(msg) => msg,
                    Err(err) => {
                        debug!("decode_log_entry err: {err}");
                        return;
                    }
                };
                // Some older versions wrote messages with an empty question
                // section; that is not worth a diagnostic.
                if let Some(q) = msg.questions.first() {
                    entry.qhost = q.name.strip_suffix('.').unwrap_or(&q.name).to_string();
                    entry.qtype = wire::type_to_string(q.qtype);
                    entry.qclass = wire::class_to_string(q.qclass);
                }
            }
            _ => {}
        }
    }
}
