//! Sheetbridge host adapter: wires the pure core state machine to the
//! engine runtime. The presentation layer on top of this is the host's
//! concern.
mod config;
mod effects;
mod logging;
mod session;

pub use config::HostConfig;
pub use effects::EffectRunner;
pub use logging::{initialize_logging, LogDestination};
pub use session::ScreenSession;
