use crate::state::{Artifact, InputKind, Mode, Operation, TrackStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackView {
    pub status: TrackStatus,
    pub error: Option<String>,
    pub artifact: Option<Artifact>,
}

impl TrackView {
    pub fn loading(&self) -> bool {
        self.status == TrackStatus::Loading
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenViewModel {
    pub operation: Operation,
    pub input_kind: InputKind,
    pub file_names: Vec<String>,
    pub submittable: bool,
    pub input_error: Option<String>,
    pub active_tab: Mode,
    pub raw: TrackView,
    pub enhanced: TrackView,
    pub copied: bool,
    pub clipboard_error: Option<String>,
    pub dirty: bool,
}

impl ScreenViewModel {
    pub fn track(&self, mode: Mode) -> &TrackView {
        match mode {
            Mode::Raw => &self.raw,
            Mode::Enhanced => &self.enhanced,
        }
    }

    pub fn active_track(&self) -> &TrackView {
        self.track(self.active_tab)
    }
}
