mod apply;
mod config;
mod confirm;
mod exif_reader;
mod metadata;
mod naming;
mod planner;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod testing;
mod validate;

pub use apply::{apply_plan, ApplyResult, MaterializeFailure};
pub use config::{ApplyOptions, FailurePolicy, Mode, SequencerOptions};
pub use confirm::{ask_for_confirmation, ConfirmError};
pub use exif_reader::read_capture_timestamp;
pub use metadata::{CaptureTimestamp, ImageFile};
pub use naming::{SequenceNamer, DEFAULT_PREFIX, SEQUENCE_WIDTH};
pub use planner::{
    collect_jpg_files, generate_plan, sort_by_capture, SequenceCandidate, SequencePlan,
    SequenceStats,
};
pub use validate::{validate_request, RunRequest, ValidationError};
