use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clipboard unavailable: {reason}")]
pub struct ClipboardError {
    pub reason: String,
}

/// Host seam for the system clipboard; the platform's own clipboard lives
/// with the presentation layer.
pub trait ClipboardSink: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Keeps the last written text in memory. Used by tests and headless hosts.
#[derive(Debug, Default)]
pub struct InMemoryClipboard {
    slot: Mutex<Option<String>>,
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_text(&self) -> Option<String> {
        self.slot.lock().expect("clipboard slot").clone()
    }
}

impl ClipboardSink for InMemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.slot.lock().expect("clipboard slot") = Some(text.to_string());
        Ok(())
    }
}

/// A host without clipboard access; every write is denied.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClipboard;

impl ClipboardSink for UnavailableClipboard {
    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError {
            reason: "platform denied access".to_string(),
        })
    }
}
