pub mod controller;
pub mod errors;
pub mod state;

pub use controller::{SessionController, SessionEvent, SessionSnapshot};
pub use errors::SessionError;
pub use state::{
    active_segment_index, LiveAdjustment, LiveOverrides, ManualPlan, ProgramPlan, SessionMode,
    SessionPlan, SessionState, SessionStatus, Tick,
};
