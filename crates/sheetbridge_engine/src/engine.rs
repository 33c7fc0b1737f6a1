use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use engine_logging::engine_warn;

use crate::api::{ApiClient, ApiSettings, ConvertBackend};
use crate::artifact::{ArtifactStore, Clock};
use crate::blob::ObjectUrlStore;
use crate::clipboard::{ClipboardSink, UnavailableClipboard};
use crate::{ApiError, Artifact, ConvertRequest, EngineEvent, Generation, Mode};

pub struct EngineConfig {
    pub api: ApiSettings,
    pub download_dir: PathBuf,
    pub now_millis: Clock,
    pub clipboard: Arc<dyn ClipboardSink>,
}

impl EngineConfig {
    pub fn default_with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiSettings::new(base_url),
            download_dir: PathBuf::from("downloads"),
            now_millis: Arc::new(system_millis),
            clipboard: Arc::new(UnavailableClipboard),
        }
    }
}

fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

pub enum EngineCommand {
    Convert {
        mode: Mode,
        generation: Generation,
        request: ConvertRequest,
    },
    RevokeUrl {
        object_url: String,
    },
    Copy {
        data: serde_json::Value,
    },
    Download {
        artifact: Artifact,
        prefix: String,
    },
}

/// Handle to the engine worker. Commands go in over a channel; events come
/// back via `try_recv`. Conversions run as their own tasks, so the raw and
/// enhanced tracks of a screen genuinely overlap; everything else executes
/// in receive order.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let backend = Arc::new(ApiClient::new(&config.api)?);
        Ok(Self::with_backend(config, backend))
    }

    /// Run against an arbitrary backend; lets tests stub the network.
    pub fn with_backend(config: EngineConfig, backend: Arc<dyn ConvertBackend>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let urls = Arc::new(ObjectUrlStore::new());
        let artifacts = Arc::new(ArtifactStore::new(urls, config.now_millis.clone()));
        let clipboard = config.clipboard.clone();
        let download_dir = config.download_dir.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Convert {
                        mode,
                        generation,
                        request,
                    } => {
                        let backend = backend.clone();
                        let artifacts = artifacts.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let prefix = request.artifact_prefix(mode);
                            let result = backend
                                .convert(&request, mode)
                                .await
                                .map(|output| artifacts.materialize(output, prefix));
                            let _ = event_tx.send(EngineEvent::ConversionDone {
                                mode,
                                generation,
                                result,
                            });
                        });
                    }
                    // Registry and host-side operations stay on the worker
                    // so a revoke is never overtaken by a later download.
                    EngineCommand::RevokeUrl { object_url } => {
                        artifacts.revoke_url(&object_url);
                    }
                    EngineCommand::Copy { data } => {
                        let artifact = Artifact::Json { data };
                        let result = artifacts
                            .copy_to_clipboard(clipboard.as_ref(), &artifact)
                            .map_err(|err| err.to_string());
                        let _ = event_tx.send(EngineEvent::CopyDone { result });
                    }
                    EngineCommand::Download { artifact, prefix } => {
                        let result = artifacts
                            .trigger_download(&download_dir, &artifact, &prefix)
                            .map_err(|err| err.to_string());
                        if let Err(message) = &result {
                            engine_warn!("download failed: {}", message);
                        }
                        let _ = event_tx.send(EngineEvent::DownloadDone { result });
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx
            .lock()
            .ok()
            .and_then(|rx| rx.try_recv().ok())
    }
}
