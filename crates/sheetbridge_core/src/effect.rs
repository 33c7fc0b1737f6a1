use crate::state::{Artifact, FileRef, Generation, Mode};

/// Immutable submit-time value describing the backend call to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionRequest {
    SpreadsheetToJson { file: FileRef },
    JsonToSpreadsheet { source: JsonPayload },
    SchemaGeneration { file: FileRef },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonPayload {
    Text(String),
    File(FileRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start a backend conversion for the given track.
    StartConversion {
        mode: Mode,
        generation: Generation,
        request: ConversionRequest,
    },
    /// Release a superseded or discarded binary artifact's object-URL.
    RevokeObjectUrl { object_url: String },
    /// Pretty-print and copy a JSON value to the system clipboard.
    CopyToClipboard { data: serde_json::Value },
    /// Persist the artifact to the host's download location.
    TriggerDownload { artifact: Artifact, prefix: String },
}
