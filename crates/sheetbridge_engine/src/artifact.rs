use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::blob::ObjectUrlStore;
use crate::clipboard::ClipboardSink;
use crate::filename::{artifact_filename, JSON_EXTENSION, SPREADSHEET_EXTENSION};
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{Artifact, ConvertOutput};

/// Injected wall clock, in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
    #[error("artifact has no text form")]
    NotText,
    #[error("object url is no longer live: {0}")]
    UrlRevoked(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Creates, resolves and releases conversion artifacts.
pub struct ArtifactStore {
    urls: Arc<ObjectUrlStore>,
    now_millis: Clock,
}

impl ArtifactStore {
    pub fn new(urls: Arc<ObjectUrlStore>, now_millis: Clock) -> Self {
        Self { urls, now_millis }
    }

    /// Wrap a conversion result. Binary payloads move into the URL registry
    /// and get their download name here.
    pub fn materialize(&self, output: ConvertOutput, prefix: &str) -> Artifact {
        match output {
            ConvertOutput::Json(data) => Artifact::Json { data },
            ConvertOutput::Binary(bytes) => {
                let object_url = self.urls.mint(bytes);
                let filename =
                    artifact_filename(prefix, (self.now_millis)(), SPREADSHEET_EXTENSION);
                Artifact::Binary {
                    object_url,
                    filename,
                }
            }
        }
    }

    /// Revoke the artifact's object-URL, if any. Safe to call repeatedly.
    pub fn release(&self, artifact: &Artifact) {
        if let Artifact::Binary { object_url, .. } = artifact {
            self.urls.revoke(object_url);
        }
    }

    pub fn revoke_url(&self, object_url: &str) {
        self.urls.revoke(object_url);
    }

    /// Number of live object-URLs; zero once everything is released.
    pub fn active_urls(&self) -> usize {
        self.urls.active_count()
    }

    /// Text form of a JSON artifact: 2-space indent, keys in stable sorted
    /// order.
    pub fn clipboard_text(data: &Value) -> String {
        serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
    }

    pub fn copy_to_clipboard(
        &self,
        clipboard: &dyn ClipboardSink,
        artifact: &Artifact,
    ) -> Result<(), ArtifactError> {
        match artifact {
            Artifact::Json { data } => clipboard
                .write_text(&Self::clipboard_text(data))
                .map_err(|err| ArtifactError::ClipboardUnavailable(err.reason)),
            Artifact::Binary { .. } => Err(ArtifactError::NotText),
        }
    }

    /// Write the artifact into `dir`. JSON artifacts are named at download
    /// time; binary artifacts keep their suggested filename. The object-URL
    /// stays live so the artifact can be downloaded again until superseded.
    pub fn trigger_download(
        &self,
        dir: &Path,
        artifact: &Artifact,
        prefix: &str,
    ) -> Result<PathBuf, ArtifactError> {
        let writer = AtomicFileWriter::new(dir.to_path_buf());
        match artifact {
            Artifact::Json { data } => {
                let filename = artifact_filename(prefix, (self.now_millis)(), JSON_EXTENSION);
                Ok(writer.write(&filename, Self::clipboard_text(data).as_bytes())?)
            }
            Artifact::Binary {
                object_url,
                filename,
            } => {
                let bytes = self
                    .urls
                    .resolve(object_url)
                    .ok_or_else(|| ArtifactError::UrlRevoked(object_url.clone()))?;
                Ok(writer.write(filename, &bytes)?)
            }
        }
    }
}
