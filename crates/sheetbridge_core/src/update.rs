use crate::gate;
use crate::state::{
    Artifact, EditorReport, FileRef, InputKind, InputState, Mode, Operation, ScreenState,
    TrackStatus,
};
use crate::{ConversionRequest, Effect, JsonPayload, Msg};

/// Pure update function: applies a message to screen state and returns any
/// effects for the host to execute.
pub fn update(mut state: ScreenState, msg: Msg) -> (ScreenState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => {
            // New input invalidates any previous output on both tracks.
            let effects = discard_outputs(&mut state);
            state.select_files(files);
            state.mark_dirty();
            effects
        }
        Msg::TextEdited(content) => {
            if !state.operation().accepts_text_input() {
                return (state, Vec::new());
            }
            let effects = discard_outputs(&mut state);
            state.edit_text(content);
            state.mark_dirty();
            effects
        }
        Msg::EditorReported {
            is_valid,
            first_error,
        } => {
            // File input bypasses the editor signal path entirely.
            let updated = match state.input_mut() {
                InputState::Text { editor, .. } => {
                    *editor = Some(EditorReport {
                        is_valid,
                        first_error,
                    });
                    true
                }
                InputState::File { .. } => false,
            };
            if updated {
                state.clear_notices();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::InputKindSelected(kind) => {
            if kind == state.input().kind() {
                return (state, Vec::new());
            }
            if kind == InputKind::Text && !state.operation().accepts_text_input() {
                return (state, Vec::new());
            }
            let effects = discard_outputs(&mut state);
            state.set_input_kind(kind);
            state.mark_dirty();
            effects
        }
        Msg::ConvertRequested { mode } => {
            if mode == Mode::Enhanced && !state.operation().supports_enhanced() {
                return (state, Vec::new());
            }
            // Re-submission of an in-flight track is a silent no-op.
            if state.track(mode).status == TrackStatus::Loading {
                return (state, Vec::new());
            }
            match gate::evaluate(state.operation(), state.input(), state.policy()) {
                Err(rejection) => {
                    state.set_input_error(rejection.to_string());
                    state.mark_dirty();
                    Vec::new()
                }
                Ok(()) => {
                    let Some(request) = build_request(state.operation(), state.input()) else {
                        return (state, Vec::new());
                    };
                    state.clear_notices();
                    let generation = state.track_mut(mode).begin();
                    state.mark_dirty();
                    vec![Effect::StartConversion {
                        mode,
                        generation,
                        request,
                    }]
                }
            }
        }
        Msg::ConversionFinished {
            mode,
            generation,
            result,
        } => {
            {
                let track = state.track(mode);
                if track.status != TrackStatus::Loading || track.generation != generation {
                    // Response for a superseded request. Drop it, but a
                    // binary artifact minted for it still owns an
                    // object-URL that nobody will ever display.
                    let mut effects = Vec::new();
                    if let Ok(Artifact::Binary { object_url, .. }) = result {
                        effects.push(Effect::RevokeObjectUrl { object_url });
                    }
                    return (state, effects);
                }
            }
            let effects = match result {
                Ok(artifact) => {
                    let mut effects = Vec::new();
                    let track = state.track_mut(mode);
                    // Supersede: the previous object-URL is revoked before
                    // the new artifact takes its place.
                    if let Some(Artifact::Binary { object_url, .. }) =
                        track.artifact.replace(artifact)
                    {
                        effects.push(Effect::RevokeObjectUrl { object_url });
                    }
                    track.status = TrackStatus::Succeeded;
                    track.error = None;
                    state.set_active_tab(mode);
                    effects
                }
                Err(message) => {
                    let track = state.track_mut(mode);
                    track.status = TrackStatus::Failed;
                    track.error = Some(message);
                    Vec::new()
                }
            };
            state.mark_dirty();
            effects
        }
        Msg::TabSelected(mode) => {
            if state.track(mode).artifact.is_some() && state.active_tab() != mode {
                state.set_active_tab(mode);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CopyRequested => {
            let data = match state.active_artifact() {
                Some(Artifact::Json { data }) => Some(data.clone()),
                _ => None,
            };
            match data {
                Some(data) => {
                    state.begin_copy();
                    state.mark_dirty();
                    vec![Effect::CopyToClipboard { data }]
                }
                None => Vec::new(),
            }
        }
        Msg::CopyFinished { result } => {
            match result {
                Ok(()) => state.set_copied(),
                Err(message) => state.set_clipboard_error(message),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::DownloadRequested => match state.active_artifact() {
            Some(artifact) => {
                let prefix = state
                    .operation()
                    .artifact_prefix(state.active_tab())
                    .to_string();
                vec![Effect::TriggerDownload {
                    artifact: artifact.clone(),
                    prefix,
                }]
            }
            None => Vec::new(),
        },
        Msg::ScreenClosed => {
            let effects = discard_outputs(&mut state);
            state.reset_screen();
            state.mark_dirty();
            effects
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Reset both tracks to `Idle` and emit a revoke for every owned binary
/// artifact. Also clears transient notices.
fn discard_outputs(state: &mut ScreenState) -> Vec<Effect> {
    let mut effects = Vec::new();
    for mode in [Mode::Raw, Mode::Enhanced] {
        if let Some(Artifact::Binary { object_url, .. }) = state.track_mut(mode).reset() {
            effects.push(Effect::RevokeObjectUrl { object_url });
        }
    }
    state.clear_notices();
    effects
}

fn build_request(operation: Operation, input: &InputState) -> Option<ConversionRequest> {
    match (operation, input) {
        (Operation::SpreadsheetToJson, InputState::File { files }) => first_file(files)
            .map(|file| ConversionRequest::SpreadsheetToJson { file }),
        (Operation::SchemaGeneration, InputState::File { files }) => {
            first_file(files).map(|file| ConversionRequest::SchemaGeneration { file })
        }
        (Operation::JsonToSpreadsheet, InputState::Text { content, .. }) => {
            Some(ConversionRequest::JsonToSpreadsheet {
                source: JsonPayload::Text(content.clone()),
            })
        }
        (Operation::JsonToSpreadsheet, InputState::File { files }) => {
            first_file(files).map(|file| ConversionRequest::JsonToSpreadsheet {
                source: JsonPayload::File(file),
            })
        }
        _ => None,
    }
}

fn first_file(files: &[FileRef]) -> Option<FileRef> {
    files.first().cloned()
}
