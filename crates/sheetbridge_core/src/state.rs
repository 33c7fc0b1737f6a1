use bytes::Bytes;

use crate::gate::{self, UploadPolicy};
use crate::view_model::{ScreenViewModel, TrackView};

pub type Generation = u64;

/// One of the two independent conversion pipelines of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Raw,
    Enhanced,
}

/// The conversion a screen performs. One `ScreenState` per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SpreadsheetToJson,
    JsonToSpreadsheet,
    SchemaGeneration,
}

impl Operation {
    /// Schema generation has no separate AI track; its backend call is
    /// AI-backed already.
    pub fn supports_enhanced(self) -> bool {
        !matches!(self, Operation::SchemaGeneration)
    }

    /// Only the JSON input screen offers a text editor pane.
    pub fn accepts_text_input(self) -> bool {
        matches!(self, Operation::JsonToSpreadsheet)
    }

    /// Filename prefix for artifacts produced by the given track.
    pub fn artifact_prefix(self, mode: Mode) -> &'static str {
        match (self, mode) {
            (Operation::SchemaGeneration, _) => "schema",
            (_, Mode::Raw) => "converted",
            (_, Mode::Enhanced) => "ai-enhanced",
        }
    }

    pub fn upload_policy(self) -> UploadPolicy {
        match self {
            Operation::SpreadsheetToJson | Operation::SchemaGeneration => {
                UploadPolicy::spreadsheet()
            }
            Operation::JsonToSpreadsheet => UploadPolicy::json(),
        }
    }

    fn default_input(self) -> InputState {
        if self.accepts_text_input() {
            InputState::Text {
                content: String::new(),
                editor: None,
            }
        } else {
            InputState::File { files: Vec::new() }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    File,
    Text,
}

/// A file the host's picker handed over, with its full payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Bytes,
}

impl FileRef {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, ext)| ext)
    }
}

/// Last-known result of the editor collaborator's live syntax check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorReport {
    pub is_valid: bool,
    pub first_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputState {
    File {
        files: Vec<FileRef>,
    },
    /// `editor: None` means no syntax check has fired yet; the gate fails
    /// closed until the first report arrives.
    Text {
        content: String,
        editor: Option<EditorReport>,
    },
}

impl InputState {
    pub fn kind(&self) -> InputKind {
        match self {
            InputState::File { .. } => InputKind::File,
            InputState::Text { .. } => InputKind::Text,
        }
    }
}

/// The materialized output of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Json {
        data: serde_json::Value,
    },
    /// `object_url` references engine-held bytes and must be revoked when
    /// the artifact is superseded or the screen is torn down.
    Binary {
        object_url: String,
        filename: String,
    },
}

impl Artifact {
    pub fn object_url(&self) -> Option<&str> {
        match self {
            Artifact::Binary { object_url, .. } => Some(object_url),
            Artifact::Json { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// One conversion track. The owned artifact outlives a `Loading` retry or a
/// later `Failed` transition; it is only dropped on supersession or reset,
/// and the caller must revoke its object-URL at that point.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Track {
    pub(crate) status: TrackStatus,
    pub(crate) artifact: Option<Artifact>,
    pub(crate) error: Option<String>,
    pub(crate) generation: Generation,
}

impl Track {
    /// Move to `Loading` under a fresh generation; responses tagged with an
    /// older generation will no longer match.
    pub(crate) fn begin(&mut self) -> Generation {
        self.generation += 1;
        self.status = TrackStatus::Loading;
        self.error = None;
        self.generation
    }

    /// Back to `Idle`, handing any owned artifact to the caller for release.
    pub(crate) fn reset(&mut self) -> Option<Artifact> {
        self.status = TrackStatus::Idle;
        self.error = None;
        self.artifact.take()
    }

    pub(crate) fn view(&self) -> TrackView {
        TrackView {
            status: self.status,
            error: self.error.clone(),
            artifact: self.artifact.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState {
    operation: Operation,
    policy: UploadPolicy,
    input: InputState,
    raw: Track,
    enhanced: Track,
    active_tab: Mode,
    input_error: Option<String>,
    copied: bool,
    clipboard_error: Option<String>,
    dirty: bool,
}

impl ScreenState {
    pub fn new(operation: Operation) -> Self {
        Self::with_upload_policy(operation, operation.upload_policy())
    }

    pub fn with_upload_policy(operation: Operation, policy: UploadPolicy) -> Self {
        Self {
            operation,
            policy,
            input: operation.default_input(),
            raw: Track::default(),
            enhanced: Track::default(),
            active_tab: Mode::Raw,
            input_error: None,
            copied: false,
            clipboard_error: None,
            dirty: false,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn view(&self) -> ScreenViewModel {
        let file_names = match &self.input {
            InputState::File { files } => files.iter().map(|f| f.name.clone()).collect(),
            InputState::Text { .. } => Vec::new(),
        };
        ScreenViewModel {
            operation: self.operation,
            input_kind: self.input.kind(),
            file_names,
            submittable: gate::evaluate(self.operation, &self.input, &self.policy).is_ok(),
            input_error: self.input_error.clone(),
            active_tab: self.active_tab,
            raw: self.raw.view(),
            enhanced: self.enhanced.view(),
            copied: self.copied,
            clipboard_error: self.clipboard_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn input(&self) -> &InputState {
        &self.input
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub(crate) fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub(crate) fn track(&self, mode: Mode) -> &Track {
        match mode {
            Mode::Raw => &self.raw,
            Mode::Enhanced => &self.enhanced,
        }
    }

    pub(crate) fn track_mut(&mut self, mode: Mode) -> &mut Track {
        match mode {
            Mode::Raw => &mut self.raw,
            Mode::Enhanced => &mut self.enhanced,
        }
    }

    pub(crate) fn active_tab(&self) -> Mode {
        self.active_tab
    }

    pub(crate) fn set_active_tab(&mut self, mode: Mode) {
        self.active_tab = mode;
    }

    pub(crate) fn active_artifact(&self) -> Option<&Artifact> {
        self.track(self.active_tab).artifact.as_ref()
    }

    /// Install the given files as the current input, switching to file kind.
    /// A non-empty selection is checked immediately so the picker can show
    /// the rejection reason.
    pub(crate) fn select_files(&mut self, files: Vec<FileRef>) {
        let report_now = !files.is_empty();
        self.input = InputState::File { files };
        self.input_error = if report_now {
            gate::evaluate(self.operation, &self.input, &self.policy)
                .err()
                .map(|rejection| rejection.to_string())
        } else {
            None
        };
    }

    /// Replace the text content, keeping the last-known editor report until
    /// the editor pushes a fresh one.
    pub(crate) fn edit_text(&mut self, content: String) {
        let editor = match &self.input {
            InputState::Text { editor, .. } => editor.clone(),
            InputState::File { .. } => None,
        };
        self.input = InputState::Text { content, editor };
    }

    pub(crate) fn set_input_kind(&mut self, kind: InputKind) {
        self.input = match kind {
            InputKind::File => InputState::File { files: Vec::new() },
            InputKind::Text => InputState::Text {
                content: String::new(),
                editor: None,
            },
        };
    }

    pub(crate) fn set_input_error(&mut self, message: String) {
        self.input_error = Some(message);
    }

    /// Clear transient notices; called on every input mutation and on
    /// accepted submissions.
    pub(crate) fn clear_notices(&mut self) {
        self.input_error = None;
        self.copied = false;
        self.clipboard_error = None;
    }

    pub(crate) fn begin_copy(&mut self) {
        self.copied = false;
        self.clipboard_error = None;
    }

    pub(crate) fn set_copied(&mut self) {
        self.copied = true;
        self.clipboard_error = None;
    }

    pub(crate) fn set_clipboard_error(&mut self, message: String) {
        self.copied = false;
        self.clipboard_error = Some(message);
    }

    /// Back to the operation's default input; tracks are expected to have
    /// been reset (and artifacts released) by the caller.
    pub(crate) fn reset_screen(&mut self) {
        self.input = self.operation.default_input();
        self.active_tab = Mode::Raw;
    }
}
