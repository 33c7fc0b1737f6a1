use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

pub type Generation = u64;

/// Track key. The core crate defines its own copy; the host adapter maps
/// between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Raw,
    Enhanced,
}

/// A file payload ready for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonSource {
    Text(String),
    File(FilePart),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertRequest {
    SpreadsheetToJson { file: FilePart },
    JsonToSpreadsheet { source: JsonSource },
    GenerateSchema { file: FilePart },
}

impl ConvertRequest {
    /// Filename prefix for artifacts this request produces.
    pub fn artifact_prefix(&self, mode: Mode) -> &'static str {
        match (self, mode) {
            (ConvertRequest::GenerateSchema { .. }, _) => "schema",
            (_, Mode::Raw) => "converted",
            (_, Mode::Enhanced) => "ai-enhanced",
        }
    }
}

/// What a backend call yields before materialization.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutput {
    Json(serde_json::Value),
    Binary(Bytes),
}

/// A materialized conversion output. Binary artifacts reference bytes held
/// by the engine's object-URL registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Json {
        data: serde_json::Value,
    },
    Binary {
        object_url: String,
        filename: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No response from the backend at all.
    ConnectionFailed,
    /// The backend answered with a non-success status.
    RequestRejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ConversionDone {
        mode: Mode,
        generation: Generation,
        result: Result<Artifact, ApiError>,
    },
    CopyDone {
        result: Result<(), String>,
    },
    DownloadDone {
        result: Result<PathBuf, String>,
    },
}
