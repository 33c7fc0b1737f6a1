use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use sheetbridge_engine::{ApiSettings, ClipboardSink, EngineConfig, UnavailableClipboard};

const BASE_URL_ENV: &str = "SHEETBRIDGE_API_BASE_URL";
const DOWNLOAD_DIR_ENV: &str = "SHEETBRIDGE_DOWNLOAD_DIR";

/// Host-level configuration, injected into the engine. The core state
/// machine never reads any of this.
#[derive(Clone)]
pub struct HostConfig {
    pub base_url: String,
    pub download_dir: PathBuf,
    pub clipboard: Arc<dyn ClipboardSink>,
}

impl HostConfig {
    pub fn new(base_url: impl Into<String>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            download_dir: download_dir.into(),
            clipboard: Arc::new(UnavailableClipboard),
        }
    }

    /// Environment-driven configuration with current-dir defaults.
    pub fn from_env() -> Self {
        let base_url =
            env::var(BASE_URL_ENV).unwrap_or_else(|_| ApiSettings::default().base_url);
        let download_dir = env::var(DOWNLOAD_DIR_ENV).map(PathBuf::from).unwrap_or_else(|_| {
            env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("downloads")
        });
        Self::new(base_url, download_dir)
    }

    /// Use the host's real clipboard implementation.
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub(crate) fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default_with_base_url(self.base_url.clone());
        config.download_dir = self.download_dir.clone();
        config.now_millis = Arc::new(|| Utc::now().timestamp_millis() as u64);
        config.clipboard = self.clipboard.clone();
        config
    }
}
