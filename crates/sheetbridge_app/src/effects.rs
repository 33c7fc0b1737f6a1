use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use sheetbridge_core::{
    Artifact as CoreArtifact, ConversionRequest, Effect, FileRef, JsonPayload, Mode as CoreMode,
    Msg,
};
use sheetbridge_engine::{
    ApiError, Artifact as EngineArtifact, ConvertRequest, EngineCommand, EngineEvent,
    EngineHandle, FilePart, JsonSource, Mode as EngineMode,
};

use crate::config::HostConfig;

/// Executes core effects against the engine and feeds engine events back to
/// the session as core messages. Core and engine each define their own
/// `Mode`/`Artifact`; this is where the two vocabularies meet.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: &HostConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, ApiError> {
        let engine = EngineHandle::new(config.engine_config())?;
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartConversion {
                    mode,
                    generation,
                    request,
                } => {
                    engine_info!(
                        "StartConversion mode={:?} generation={}",
                        mode,
                        generation
                    );
                    self.engine.send(EngineCommand::Convert {
                        mode: map_mode(mode),
                        generation,
                        request: map_request(request),
                    });
                }
                Effect::RevokeObjectUrl { object_url } => {
                    self.engine.send(EngineCommand::RevokeUrl { object_url });
                }
                Effect::CopyToClipboard { data } => {
                    self.engine.send(EngineCommand::Copy { data });
                }
                Effect::TriggerDownload { artifact, prefix } => {
                    self.engine.send(EngineCommand::Download {
                        artifact: map_artifact_out(artifact),
                        prefix,
                    });
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                let msg = match event {
                    EngineEvent::ConversionDone {
                        mode,
                        generation,
                        result,
                    } => Msg::ConversionFinished {
                        mode: map_mode_back(mode),
                        generation,
                        result: result.map(map_artifact_in).map_err(|err| {
                            engine_warn!("conversion failed: {}", err.message);
                            err.message
                        }),
                    },
                    EngineEvent::CopyDone { result } => Msg::CopyFinished { result },
                    EngineEvent::DownloadDone { result } => {
                        match result {
                            Ok(path) => engine_info!("download written to {:?}", path),
                            Err(message) => engine_warn!("download failed: {}", message),
                        }
                        Msg::NoOp
                    }
                };
                if msg_tx.send(msg).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_mode(mode: CoreMode) -> EngineMode {
    match mode {
        CoreMode::Raw => EngineMode::Raw,
        CoreMode::Enhanced => EngineMode::Enhanced,
    }
}

fn map_mode_back(mode: EngineMode) -> CoreMode {
    match mode {
        EngineMode::Raw => CoreMode::Raw,
        EngineMode::Enhanced => CoreMode::Enhanced,
    }
}

fn map_file(file: FileRef) -> FilePart {
    FilePart {
        name: file.name,
        media_type: file.media_type,
        bytes: file.bytes,
    }
}

fn map_request(request: ConversionRequest) -> ConvertRequest {
    match request {
        ConversionRequest::SpreadsheetToJson { file } => ConvertRequest::SpreadsheetToJson {
            file: map_file(file),
        },
        ConversionRequest::JsonToSpreadsheet { source } => ConvertRequest::JsonToSpreadsheet {
            source: match source {
                JsonPayload::Text(text) => JsonSource::Text(text),
                JsonPayload::File(file) => JsonSource::File(map_file(file)),
            },
        },
        ConversionRequest::SchemaGeneration { file } => ConvertRequest::GenerateSchema {
            file: map_file(file),
        },
    }
}

fn map_artifact_in(artifact: EngineArtifact) -> CoreArtifact {
    match artifact {
        EngineArtifact::Json { data } => CoreArtifact::Json { data },
        EngineArtifact::Binary {
            object_url,
            filename,
        } => CoreArtifact::Binary {
            object_url,
            filename,
        },
    }
}

fn map_artifact_out(artifact: CoreArtifact) -> EngineArtifact {
    match artifact {
        CoreArtifact::Json { data } => EngineArtifact::Json { data },
        CoreArtifact::Binary {
            object_url,
            filename,
        } => EngineArtifact::Binary {
            object_url,
            filename,
        },
    }
}
