//! # Error Types
//!
//! Every failure of a print session is classified where it originates and
//! surfaced as a single [`PrintError`]. Host-level Bluetooth failures are
//! described by [`TransportError`] and mapped onto the taxonomy by the
//! negotiator and the sender.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Position of a failed chunk within a transmission.
///
/// `chunk` is 1-based: a failure on the first chunk means nothing reached
/// the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkProgress {
    pub chunk: usize,
    pub total: usize,
}

impl ChunkProgress {
    /// Number of chunks the printer accepted before the failure.
    pub fn delivered(&self) -> usize {
        self.chunk.saturating_sub(1)
    }
}

impl fmt::Display for ChunkProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {} of {}", self.chunk, self.total)
    }
}

/// Classification of a failed print session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnsupportedTransport,
    DeviceNotFound,
    SecurityError,
    CharacteristicUnsupported,
    ConnectionLost,
    WriteFailed,
    InvalidInput,
}

/// Main error type for print sessions
#[derive(Debug, Error)]
pub enum PrintError {
    /// The host has no Bluetooth LE capability at all
    #[error("Bluetooth is not available on this device")]
    UnsupportedTransport,

    /// No matching printer was selected or found
    #[error("Printer not found: {0}")]
    DeviceNotFound(String),

    /// The execution context does not allow Bluetooth access
    #[error("Bluetooth access was blocked: {0}")]
    Security(String),

    /// None of the resolved services exposes a writable characteristic
    #[error("The printer does not expose a writable characteristic")]
    CharacteristicUnsupported,

    /// The link dropped before or during transmission
    #[error("Connection to the printer was lost{}: {reason}", progress_suffix(.progress))]
    ConnectionLost {
        reason: String,
        progress: Option<ChunkProgress>,
    },

    /// A chunk could not be written after the write-mode fallback
    #[error("Failed to send {progress} to the printer: {reason}")]
    WriteFailed {
        reason: String,
        progress: ChunkProgress,
    },

    /// The caller handed over an incomplete sale or merchant profile
    #[error("Invalid print request: {0}")]
    InvalidInput(String),
}

fn progress_suffix(progress: &Option<ChunkProgress>) -> String {
    match progress {
        Some(p) => format!(" at {}", p),
        None => String::new(),
    }
}

impl PrintError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrintError::UnsupportedTransport => ErrorKind::UnsupportedTransport,
            PrintError::DeviceNotFound(_) => ErrorKind::DeviceNotFound,
            PrintError::Security(_) => ErrorKind::SecurityError,
            PrintError::CharacteristicUnsupported => ErrorKind::CharacteristicUnsupported,
            PrintError::ConnectionLost { .. } => ErrorKind::ConnectionLost,
            PrintError::WriteFailed { .. } => ErrorKind::WriteFailed,
            PrintError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Chunk position for failures that happened mid-transmission.
    pub fn progress(&self) -> Option<ChunkProgress> {
        match self {
            PrintError::ConnectionLost { progress, .. } => *progress,
            PrintError::WriteFailed { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    /// True when part of the receipt already reached the printer.
    ///
    /// Callers use this to warn that the paper may hold a truncated receipt.
    pub fn is_partial(&self) -> bool {
        self.progress().is_some_and(|p| p.delivered() > 0)
    }

    /// Message meant to be shown verbatim to the cashier.
    pub fn user_message(&self) -> String {
        if self.is_partial() {
            format!("{}. The receipt may be incomplete, print it again.", self)
        } else {
            self.to_string()
        }
    }

    pub(crate) fn connection_lost(reason: impl Into<String>) -> Self {
        PrintError::ConnectionLost {
            reason: reason.into(),
            progress: None,
        }
    }
}

/// Failures reported by a Bluetooth host or device implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The host has no usable adapter
    #[error("no Bluetooth adapter available")]
    Unavailable,

    /// The user dismissed device selection
    #[error("device selection cancelled")]
    Cancelled,

    #[error("timed out: {0}")]
    Timeout(String),

    /// Context is not allowed to use Bluetooth (permissions, insecure origin)
    #[error("not permitted: {0}")]
    Insecure(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("device disconnected")]
    Disconnected,

    /// Characteristic or operation-level GATT failure
    #[error("GATT operation failed: {0}")]
    Gatt(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether a write failure is the kind a write-mode switch can fix.
    pub fn is_gatt_failure(&self) -> bool {
        matches!(self, TransportError::Gatt(_))
    }
}

/// Errors loading profiles or sale documents from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid profile: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(PrintError::UnsupportedTransport.kind(), ErrorKind::UnsupportedTransport);
        assert_eq!(
            PrintError::DeviceNotFound("x".into()).kind(),
            ErrorKind::DeviceNotFound
        );
        assert_eq!(PrintError::Security("x".into()).kind(), ErrorKind::SecurityError);
        assert_eq!(
            PrintError::CharacteristicUnsupported.kind(),
            ErrorKind::CharacteristicUnsupported
        );
        assert_eq!(
            PrintError::connection_lost("gone").kind(),
            ErrorKind::ConnectionLost
        );
    }

    #[test]
    fn test_connection_lost_message_includes_chunk() {
        let err = PrintError::ConnectionLost {
            reason: "device disconnected".into(),
            progress: Some(ChunkProgress { chunk: 3, total: 5 }),
        };
        assert_eq!(
            err.to_string(),
            "Connection to the printer was lost at chunk 3 of 5: device disconnected"
        );
    }

    #[test]
    fn test_connection_lost_without_progress() {
        let err = PrintError::connection_lost("link dropped");
        assert_eq!(err.to_string(), "Connection to the printer was lost: link dropped");
        assert!(!err.is_partial());
    }

    #[test]
    fn test_partial_only_after_first_chunk() {
        let first = PrintError::WriteFailed {
            reason: "x".into(),
            progress: ChunkProgress { chunk: 1, total: 4 },
        };
        assert!(!first.is_partial());

        let later = PrintError::WriteFailed {
            reason: "x".into(),
            progress: ChunkProgress { chunk: 2, total: 4 },
        };
        assert!(later.is_partial());
        assert!(later.user_message().contains("may be incomplete"));
    }

    #[test]
    fn test_gatt_failure_detection() {
        assert!(TransportError::Gatt("write not permitted".into()).is_gatt_failure());
        assert!(!TransportError::Disconnected.is_gatt_failure());
        assert!(!TransportError::Other("boom".into()).is_gatt_failure());
    }
}
