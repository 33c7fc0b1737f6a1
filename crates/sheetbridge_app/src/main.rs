//! Headless command-line host: one conversion per invocation.
//!
//! Selects the given file, submits it on a single track and delivers the
//! artifact: JSON output is printed to stdout, spreadsheet output lands in
//! the configured download directory. Base URL and download directory come
//! from the environment, see `HostConfig::from_env`.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use sheetbridge_app::{initialize_logging, HostConfig, LogDestination, ScreenSession};
use sheetbridge_core::{Artifact, FileRef, Mode, Msg, Operation, TrackStatus};
use sheetbridge_engine::ArtifactStore;

const USAGE: &str =
    "usage: sheetbridge_app <excel-to-json|json-to-excel|generate-schema> <file> [--ai]";

/// Ample room beyond the transport's own request timeout.
const CONVERSION_DEADLINE: Duration = Duration::from_secs(120);
const DOWNLOAD_DEADLINE: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn main() -> ExitCode {
    initialize_logging(LogDestination::File);

    let Some((operation, path, mode)) = parse_args(env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    if mode == Mode::Enhanced && !operation.supports_enhanced() {
        eprintln!("schema generation has no AI-enhanced track");
        return ExitCode::FAILURE;
    }

    let bytes = match fs::read(&path) {
        Ok(bytes) => Bytes::from(bytes),
        Err(err) => {
            eprintln!("cannot read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let config = HostConfig::from_env();
    let mut session = match ScreenSession::new(operation, &config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    session.dispatch(Msg::FilesSelected(vec![FileRef {
        name,
        media_type: None,
        bytes,
    }]));
    if let Some(reason) = session.view().input_error {
        eprintln!("{reason}");
        return ExitCode::FAILURE;
    }

    session.dispatch(Msg::ConvertRequested { mode });

    let deadline = Instant::now() + CONVERSION_DEADLINE;
    let track = loop {
        session.pump();
        let track = session.view().track(mode).clone();
        if matches!(track.status, TrackStatus::Succeeded | TrackStatus::Failed) {
            break track;
        }
        if Instant::now() >= deadline {
            eprintln!("conversion timed out");
            return ExitCode::FAILURE;
        }
        thread::sleep(POLL_INTERVAL);
    };

    if track.status == TrackStatus::Failed {
        let message = track.error.unwrap_or_else(|| "conversion failed".to_string());
        eprintln!("{message}");
        return ExitCode::FAILURE;
    }

    match track.artifact {
        Some(Artifact::Json { data }) => {
            println!("{}", ArtifactStore::clipboard_text(&data));
        }
        Some(Artifact::Binary { filename, .. }) => {
            session.dispatch(Msg::DownloadRequested);
            let target = config.download_dir.join(&filename);
            let deadline = Instant::now() + DOWNLOAD_DEADLINE;
            while !target.exists() {
                session.pump();
                if Instant::now() >= deadline {
                    eprintln!("download did not complete");
                    return ExitCode::FAILURE;
                }
                thread::sleep(POLL_INTERVAL);
            }
            println!("{}", target.display());
        }
        None => {
            eprintln!("conversion finished without an artifact");
            return ExitCode::FAILURE;
        }
    }

    session.close();
    ExitCode::SUCCESS
}

fn parse_args(args: impl Iterator<Item = String>) -> Option<(Operation, PathBuf, Mode)> {
    let mut operation = None;
    let mut path = None;
    let mut mode = Mode::Raw;
    for arg in args {
        match arg.as_str() {
            "--ai" => mode = Mode::Enhanced,
            "excel-to-json" if operation.is_none() => {
                operation = Some(Operation::SpreadsheetToJson);
            }
            "json-to-excel" if operation.is_none() => {
                operation = Some(Operation::JsonToSpreadsheet);
            }
            "generate-schema" if operation.is_none() => {
                operation = Some(Operation::SchemaGeneration);
            }
            _ if operation.is_some() && path.is_none() => path = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }
    Some((operation?, path?, mode))
}
