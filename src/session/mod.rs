//! Game session: state machine, render contract, platform hooks and the
//! async runtime that drives them.

pub mod platform;
pub mod render;
pub mod runtime;
pub mod state;

pub use platform::{NoopPlatform, Platform};
pub use render::{RecordingSink, RenderSink, TracingSink};
pub use runtime::{RuntimeOptions, SessionRuntime};
pub use state::{Effect, Mode, Phase, Session, SessionEvent, SessionInit};
