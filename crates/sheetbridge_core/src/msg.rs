use crate::state::{Artifact, FileRef, Generation, InputKind, Mode};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Files chosen in the host's picker widget.
    FilesSelected(Vec<FileRef>),
    /// User edited the JSON text pane (debounced text).
    TextEdited(String),
    /// Live syntax report pushed by the editor collaborator.
    EditorReported {
        is_valid: bool,
        first_error: Option<String>,
    },
    /// User toggled between text entry and file upload.
    InputKindSelected(InputKind),
    /// User clicked convert for the given track.
    ConvertRequested { mode: Mode },
    /// Engine completion for a conversion started under this generation.
    ConversionFinished {
        mode: Mode,
        generation: Generation,
        result: Result<Artifact, String>,
    },
    /// User selected an output tab.
    TabSelected(Mode),
    /// User asked to copy the active JSON output.
    CopyRequested,
    /// Clipboard write finished.
    CopyFinished { result: Result<(), String> },
    /// User asked to download the active output.
    DownloadRequested,
    /// The screen is being torn down; owned artifacts are released.
    ScreenClosed,
    /// Fallback for placeholder wiring.
    NoOp,
}
