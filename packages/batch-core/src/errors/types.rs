use thiserror::Error;

/// バッチ処理の統合エラー型
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Rejected(#[from] RejectReason),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// クライアント起因の拒否かどうか（HTTP 400 相当）
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// クライアント起因の拒否理由
#[derive(Debug, Error)]
pub enum RejectReason {
    #[error("no files uploaded")]
    NoFiles,

    #[error("no file selected")]
    NoFileSelected,

    #[error("process_type is not specified")]
    MissingProcessType,

    #[error("unknown process_type: {value}")]
    UnknownProcessType { value: String },

    #[error("invalid value for {field}: {value}")]
    InvalidParameter { field: &'static str, value: String },

    #[error("unknown file extension: {filename}")]
    DisallowedExtension { filename: String },

    #[error("file {filename} exceeds the maximum size of {max_mib}MB")]
    SingleFileTooLarge { filename: String, max_mib: u64 },

    #[error("total size of all files exceeds the maximum of {max_mib}MB")]
    AggregateTooLarge { max_mib: u64 },

    #[error("file {filename} declared {declared} bytes but sent {actual}")]
    DeclaredSizeMismatch {
        filename: String,
        declared: u64,
        actual: u64,
    },
}

/// 画像変換エラー
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// アーカイブ作成エラー
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
