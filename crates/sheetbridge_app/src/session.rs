use std::sync::mpsc;

use sheetbridge_core::{update, Msg, Operation, ScreenState, ScreenViewModel};
use sheetbridge_engine::ApiError;

use crate::config::HostConfig;
use crate::effects::EffectRunner;

/// Owns one conversion screen: its state, its engine wiring and the message
/// pump between them. Dropping the session tears the screen down and
/// releases every artifact it still owns.
pub struct ScreenSession {
    operation: Operation,
    state: ScreenState,
    runner: EffectRunner,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
    closed: bool,
}

impl ScreenSession {
    pub fn new(operation: Operation, config: &HostConfig) -> Result<Self, ApiError> {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::new(config, msg_tx.clone())?;
        Ok(Self {
            operation,
            state: ScreenState::new(operation),
            runner,
            msg_tx,
            msg_rx,
            closed: false,
        })
    }

    /// Apply one message and run whatever effects it produced.
    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::replace(&mut self.state, ScreenState::new(self.operation));
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Drain messages the engine has pushed since the last pump.
    pub fn pump(&mut self) {
        let mut inbox = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            inbox.push(msg);
        }
        for msg in inbox {
            self.dispatch(msg);
        }
    }

    pub fn view(&self) -> ScreenViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Sender half for external collaborators (the editor's syntax reports,
    /// the file picker) to push messages into this session.
    pub fn msg_sender(&self) -> mpsc::Sender<Msg> {
        self.msg_tx.clone()
    }

    /// Release all owned artifacts. Idempotent; also runs on drop.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.dispatch(Msg::ScreenClosed);
        }
    }
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        self.close();
    }
}
