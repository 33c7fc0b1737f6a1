use std::sync::Once;

use bytes::Bytes;
use serde_json::json;
use sheetbridge_core::{
    update, Artifact, Effect, FileRef, InputKind, Mode, Msg, Operation, ScreenState, TrackStatus,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn json_file(name: &str) -> FileRef {
    FileRef {
        name: name.to_string(),
        media_type: Some("application/json".to_string()),
        bytes: Bytes::from_static(b"{}"),
    }
}

/// JSON screen with binary artifacts installed on both tracks.
fn screen_with_both_artifacts() -> ScreenState {
    let state = ScreenState::new(Operation::JsonToSpreadsheet);
    let (state, _effects) = update(state, Msg::TextEdited("[1]".to_string()));
    let (state, _effects) = update(
        state,
        Msg::EditorReported {
            is_valid: true,
            first_error: None,
        },
    );
    let (state, _effects) = update(state, Msg::ConvertRequested { mode: Mode::Raw });
    let (state, _effects) = update(state, Msg::ConvertRequested { mode: Mode::Enhanced });
    let (state, _effects) = update(
        state,
        Msg::ConversionFinished {
            mode: Mode::Raw,
            generation: 1,
            result: Ok(Artifact::Binary {
                object_url: "blob:sheetbridge/1".to_string(),
                filename: "converted-100.xlsx".to_string(),
            }),
        },
    );
    let (state, _effects) = update(
        state,
        Msg::ConversionFinished {
            mode: Mode::Enhanced,
            generation: 1,
            result: Ok(Artifact::Binary {
                object_url: "blob:sheetbridge/2".to_string(),
                filename: "ai-enhanced-100.xlsx".to_string(),
            }),
        },
    );
    state
}

#[test]
fn text_edit_resets_both_tracks_and_revokes_urls() {
    init_logging();
    let state = screen_with_both_artifacts();

    let (state, effects) = update(state, Msg::TextEdited("[2]".to_string()));

    assert_eq!(
        effects,
        vec![
            Effect::RevokeObjectUrl {
                object_url: "blob:sheetbridge/1".to_string(),
            },
            Effect::RevokeObjectUrl {
                object_url: "blob:sheetbridge/2".to_string(),
            },
        ]
    );
    let view = state.view();
    assert_eq!(view.raw.status, TrackStatus::Idle);
    assert_eq!(view.enhanced.status, TrackStatus::Idle);
    assert_eq!(view.raw.artifact, None);
    assert_eq!(view.enhanced.artifact, None);
}

#[test]
fn text_edit_keeps_last_known_editor_report() {
    init_logging();
    let state = ScreenState::new(Operation::JsonToSpreadsheet);
    let (state, _effects) = update(state, Msg::TextEdited("[1]".to_string()));
    let (state, _effects) = update(
        state,
        Msg::EditorReported {
            is_valid: true,
            first_error: None,
        },
    );

    // The report stays valid until the editor pushes a new one.
    let (state, _effects) = update(state, Msg::TextEdited("[1,2]".to_string()));
    assert!(state.view().submittable);
}

#[test]
fn selecting_files_switches_to_file_input() {
    init_logging();
    let state = ScreenState::new(Operation::JsonToSpreadsheet);
    assert_eq!(state.view().input_kind, InputKind::Text);

    let (state, _effects) = update(state, Msg::FilesSelected(vec![json_file("data.json")]));

    let view = state.view();
    assert_eq!(view.input_kind, InputKind::File);
    assert_eq!(view.file_names, vec!["data.json".to_string()]);
    assert!(view.submittable);
}

#[test]
fn switching_kind_discards_outputs() {
    init_logging();
    let state = screen_with_both_artifacts();

    let (state, effects) = update(state, Msg::InputKindSelected(InputKind::File));

    assert_eq!(effects.len(), 2);
    let view = state.view();
    assert_eq!(view.input_kind, InputKind::File);
    assert_eq!(view.raw.artifact, None);
    assert_eq!(view.enhanced.artifact, None);
    assert!(!view.submittable);
}

#[test]
fn selecting_the_current_kind_changes_nothing() {
    init_logging();
    let mut state = screen_with_both_artifacts();
    assert!(state.consume_dirty());
    let before = state.view();

    let (state, effects) = update(state, Msg::InputKindSelected(InputKind::Text));

    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
}

#[test]
fn file_only_screens_refuse_text_input() {
    init_logging();
    let state = ScreenState::new(Operation::SpreadsheetToJson);
    let before = state.view();

    let (state, effects) = update(state, Msg::InputKindSelected(InputKind::Text));
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);

    let (state, effects) = update(state, Msg::TextEdited("{}".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
}

#[test]
fn editor_report_is_ignored_in_file_mode() {
    init_logging();
    let state = ScreenState::new(Operation::SchemaGeneration);
    let before = state.view();

    let (state, effects) = update(
        state,
        Msg::EditorReported {
            is_valid: false,
            first_error: Some("noise".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
}

#[test]
fn screen_closed_releases_everything() {
    init_logging();
    let state = screen_with_both_artifacts();

    let (state, effects) = update(state, Msg::ScreenClosed);

    assert_eq!(effects.len(), 2);
    let view = state.view();
    assert_eq!(view.raw.artifact, None);
    assert_eq!(view.enhanced.artifact, None);
    assert_eq!(view.active_tab, Mode::Raw);
    assert_eq!(view.input_kind, InputKind::Text);

    // Closing again releases nothing further.
    let (_state, effects) = update(state, Msg::ScreenClosed);
    assert!(effects.is_empty());
}

#[test]
fn tab_selection_requires_an_artifact() {
    init_logging();
    let state = ScreenState::new(Operation::SpreadsheetToJson);
    let (state, _effects) = update(state, Msg::TabSelected(Mode::Enhanced));
    assert_eq!(state.view().active_tab, Mode::Raw);

    let state = screen_with_both_artifacts();
    assert_eq!(state.view().active_tab, Mode::Enhanced);
    let (state, _effects) = update(state, Msg::TabSelected(Mode::Raw));
    assert_eq!(state.view().active_tab, Mode::Raw);
}

#[test]
fn copy_flow_sets_and_clears_indicators() {
    init_logging();
    let state = ScreenState::new(Operation::SpreadsheetToJson);
    let (state, _effects) = update(
        state,
        Msg::FilesSelected(vec![FileRef {
            name: "in.xlsx".to_string(),
            media_type: None,
            bytes: Bytes::from_static(b"pk"),
        }]),
    );
    let (state, _effects) = update(state, Msg::ConvertRequested { mode: Mode::Raw });
    let (state, _effects) = update(
        state,
        Msg::ConversionFinished {
            mode: Mode::Raw,
            generation: 1,
            result: Ok(Artifact::Json {
                data: json!({"b": 2, "a": 1}),
            }),
        },
    );

    let (state, effects) = update(state, Msg::CopyRequested);
    assert_eq!(
        effects,
        vec![Effect::CopyToClipboard {
            data: json!({"b": 2, "a": 1}),
        }]
    );

    let (state, _effects) = update(state, Msg::CopyFinished { result: Ok(()) });
    assert!(state.view().copied);

    let (state, _effects) = update(
        state,
        Msg::CopyFinished {
            result: Err("clipboard unavailable: denied".to_string()),
        },
    );
    let view = state.view();
    assert!(!view.copied);
    assert_eq!(
        view.clipboard_error.as_deref(),
        Some("clipboard unavailable: denied")
    );
}

#[test]
fn copy_is_a_noop_for_binary_artifacts() {
    init_logging();
    let state = screen_with_both_artifacts();

    let (_state, effects) = update(state, Msg::CopyRequested);
    assert!(effects.is_empty());
}

#[test]
fn download_uses_the_active_track_prefix() {
    init_logging();
    let state = screen_with_both_artifacts();
    assert_eq!(state.view().active_tab, Mode::Enhanced);

    let (state, effects) = update(state, Msg::DownloadRequested);
    assert!(matches!(
        effects.as_slice(),
        [Effect::TriggerDownload { prefix, .. }] if prefix == "ai-enhanced"
    ));

    let (state, _effects) = update(state, Msg::TabSelected(Mode::Raw));
    let (_state, effects) = update(state, Msg::DownloadRequested);
    assert!(matches!(
        effects.as_slice(),
        [Effect::TriggerDownload { prefix, .. }] if prefix == "converted"
    ));
}

#[test]
fn schema_download_uses_schema_prefix() {
    init_logging();
    let state = ScreenState::new(Operation::SchemaGeneration);
    let (state, _effects) = update(
        state,
        Msg::FilesSelected(vec![FileRef {
            name: "in.xlsx".to_string(),
            media_type: None,
            bytes: Bytes::from_static(b"pk"),
        }]),
    );
    let (state, _effects) = update(state, Msg::ConvertRequested { mode: Mode::Raw });
    let (state, _effects) = update(
        state,
        Msg::ConversionFinished {
            mode: Mode::Raw,
            generation: 1,
            result: Ok(Artifact::Json {
                data: json!({"type": "object"}),
            }),
        },
    );

    let (_state, effects) = update(state, Msg::DownloadRequested);
    assert!(matches!(
        effects.as_slice(),
        [Effect::TriggerDownload { prefix, .. }] if prefix == "schema"
    ));
}

#[test]
fn download_without_output_is_a_noop() {
    init_logging();
    let state = ScreenState::new(Operation::SpreadsheetToJson);
    let (_state, effects) = update(state, Msg::DownloadRequested);
    assert!(effects.is_empty());
}
