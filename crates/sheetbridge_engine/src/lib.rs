//! Sheetbridge engine: backend facade, artifact lifecycle and effect
//! execution.
mod api;
mod artifact;
mod blob;
mod clipboard;
mod engine;
mod filename;
mod persist;
mod types;

pub use api::{ApiClient, ApiSettings, ConvertBackend, CONNECTION_ERROR_MESSAGE};
pub use artifact::{ArtifactError, ArtifactStore, Clock};
pub use blob::ObjectUrlStore;
pub use clipboard::{ClipboardError, ClipboardSink, InMemoryClipboard, UnavailableClipboard};
pub use engine::{EngineCommand, EngineConfig, EngineHandle};
pub use filename::{artifact_filename, JSON_EXTENSION, SPREADSHEET_EXTENSION};
pub use persist::{ensure_download_dir, AtomicFileWriter, PersistError};
pub use types::{
    ApiError, ApiErrorKind, Artifact, ConvertOutput, ConvertRequest, EngineEvent, FilePart,
    Generation, JsonSource, Mode,
};
