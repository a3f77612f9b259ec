pub mod limits;
pub mod program;
pub mod record;

pub use program::{
    CompressionMode, Program, ProgramSegment, SegmentKind, Treatment, TreatmentMode,
};
pub use record::{ConfigSnapshot, RecordKind, SessionRecord};
