pub mod archive;
pub mod constants;
pub mod errors;
pub mod limits;
pub mod naming;
pub mod pipeline;
pub mod session;
pub mod transform;

// 公開API
pub use archive::{ArchiveEntry, write_archive};
pub use constants::{ALLOWED_EXTENSIONS, DEFAULT_MAX_DIMENSION, ENCODE_QUALITY};
pub use errors::{ArchiveError, PipelineError, RejectReason, TransformError};
pub use limits::{SizeLimits, verify_declared_size};
pub use naming::normalize;
pub use pipeline::{
    BatchOutcome, PipelineConfig, UploadedFile, has_allowed_extension, process_batch,
};
pub use session::Session;
pub use transform::{OutputFormat, TransformSpec, decode_image, encode_image, fit_within, resize_image};
