use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde_json::json;
use sheetbridge_engine::{
    ApiError, Artifact, ConvertBackend, ConvertOutput, ConvertRequest, EngineCommand,
    EngineConfig, EngineEvent, EngineHandle, FilePart, InMemoryClipboard, JsonSource, Mode,
};
use tempfile::TempDir;

/// Backend stub: raw conversions are slow, enhanced ones fast, spreadsheet
/// requests yield binary output.
struct StubBackend;

#[async_trait::async_trait]
impl ConvertBackend for StubBackend {
    async fn convert(
        &self,
        request: &ConvertRequest,
        mode: Mode,
    ) -> Result<ConvertOutput, ApiError> {
        let delay = match mode {
            Mode::Raw => Duration::from_millis(200),
            Mode::Enhanced => Duration::from_millis(10),
        };
        tokio::time::sleep(delay).await;
        match request {
            ConvertRequest::JsonToSpreadsheet { .. } => {
                Ok(ConvertOutput::Binary(Bytes::from_static(b"xlsx")))
            }
            _ => Ok(ConvertOutput::Json(json!({"mode": format!("{mode:?}")}))),
        }
    }
}

fn test_config(download_dir: &TempDir, clipboard: Arc<InMemoryClipboard>) -> EngineConfig {
    let mut config = EngineConfig::default_with_base_url("http://localhost:0");
    config.download_dir = download_dir.path().to_path_buf();
    config.now_millis = Arc::new(|| 42);
    config.clipboard = clipboard;
    config
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        assert!(Instant::now() < deadline, "timed out waiting for engine event");
        thread::sleep(Duration::from_millis(5));
    }
}

fn xlsx_part() -> FilePart {
    FilePart {
        name: "input.xlsx".to_string(),
        media_type: None,
        bytes: Bytes::from_static(b"pk"),
    }
}

#[test]
fn concurrent_tracks_complete_independently() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::with_backend(
        test_config(&temp, Arc::new(InMemoryClipboard::new())),
        Arc::new(StubBackend),
    );

    engine.send(EngineCommand::Convert {
        mode: Mode::Raw,
        generation: 1,
        request: ConvertRequest::SpreadsheetToJson { file: xlsx_part() },
    });
    engine.send(EngineCommand::Convert {
        mode: Mode::Enhanced,
        generation: 1,
        request: ConvertRequest::SpreadsheetToJson { file: xlsx_part() },
    });

    // The fast enhanced track finishes first even though it was sent last.
    let first = next_event(&engine);
    match first {
        EngineEvent::ConversionDone {
            mode, generation, ..
        } => {
            assert_eq!(mode, Mode::Enhanced);
            assert_eq!(generation, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let second = next_event(&engine);
    match second {
        EngineEvent::ConversionDone { mode, result, .. } => {
            assert_eq!(mode, Mode::Raw);
            assert!(result.is_ok());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn binary_conversion_is_materialized_and_revocable() {
    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::with_backend(
        test_config(&temp, Arc::new(InMemoryClipboard::new())),
        Arc::new(StubBackend),
    );

    engine.send(EngineCommand::Convert {
        mode: Mode::Enhanced,
        generation: 3,
        request: ConvertRequest::JsonToSpreadsheet {
            source: JsonSource::Text("[]".to_string()),
        },
    });

    let artifact = match next_event(&engine) {
        EngineEvent::ConversionDone {
            generation: 3,
            result: Ok(artifact),
            ..
        } => artifact,
        other => panic!("unexpected event: {other:?}"),
    };
    let (object_url, filename) = match &artifact {
        Artifact::Binary {
            object_url,
            filename,
        } => (object_url.clone(), filename.clone()),
        Artifact::Json { .. } => panic!("expected binary artifact"),
    };
    assert_eq!(filename, "ai-enhanced-42.xlsx");

    // Download works while the URL is live.
    engine.send(EngineCommand::Download {
        artifact: artifact.clone(),
        prefix: "ai-enhanced".to_string(),
    });
    match next_event(&engine) {
        EngineEvent::DownloadDone { result: Ok(path) } => {
            assert!(path.ends_with("ai-enhanced-42.xlsx"));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // After revocation the same download fails.
    engine.send(EngineCommand::RevokeUrl {
        object_url: object_url.clone(),
    });
    engine.send(EngineCommand::Download {
        artifact,
        prefix: "ai-enhanced".to_string(),
    });
    match next_event(&engine) {
        EngineEvent::DownloadDone { result: Err(message) } => {
            assert!(message.contains("no longer live"), "message: {message}");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn copy_round_trips_through_the_clipboard() {
    let temp = TempDir::new().unwrap();
    let clipboard = Arc::new(InMemoryClipboard::new());
    let engine = EngineHandle::with_backend(
        test_config(&temp, clipboard.clone()),
        Arc::new(StubBackend),
    );

    engine.send(EngineCommand::Copy {
        data: json!({"b": 2, "a": 1}),
    });

    match next_event(&engine) {
        EngineEvent::CopyDone { result: Ok(()) } => {}
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(
        clipboard.last_text().as_deref(),
        Some("{\n  \"a\": 1,\n  \"b\": 2\n}")
    );
}
