//! Sheetbridge core: pure per-screen state machine and view-model helpers.
mod effect;
mod gate;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{ConversionRequest, Effect, JsonPayload};
pub use gate::{
    evaluate, is_submittable, AcceptedType, InputRejection, UploadPolicy,
    DEFAULT_MAX_UPLOAD_BYTES, JSON_UPLOADS, SPREADSHEET_UPLOADS,
};
pub use msg::Msg;
pub use state::{
    Artifact, EditorReport, FileRef, Generation, InputKind, InputState, Mode, Operation,
    ScreenState, TrackStatus,
};
pub use update::update;
pub use view_model::{ScreenViewModel, TrackView};
