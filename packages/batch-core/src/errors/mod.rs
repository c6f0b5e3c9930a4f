pub mod types;

pub use types::{ArchiveError, PipelineError, RejectReason, TransformError};
