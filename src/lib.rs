// Query log record handling.
//
// Log files are long-lived and rotated across format upgrades, so besides
// the current JSON format this crate keeps a best-effort decoder for lines
// written by older versions.

pub mod decode;
pub mod entry;
pub mod scanner;
pub mod wire;

// Re-export main types
pub use decode::decode_log_entry;
pub use entry::LogEntry;
pub use scanner::{Scanner, Token, TokenKind};
pub use wire::{Message, Question, WireError};
