use std::env;
use std::path::PathBuf;

use batch_core::constants::{DEFAULT_MAX_SINGLE_FILE_MIB, DEFAULT_MAX_TOTAL_MIB};
use batch_core::{PipelineConfig, SizeLimits};

/// サーバ設定
///
/// 起動時に一度だけ環境変数から構築し、以後は参照のみ。
///
/// 対応する環境変数:
/// - MAX_SINGLE_FILE_SIZE（MiB、デフォルト10）
/// - MAX_TOTAL_SIZE（MiB、デフォルト500）
/// - UPLOAD_DIR / PROCESSED_DIR / DOWNLOAD_DIR
/// - BIND_ADDR（デフォルト 0.0.0.0:5000）
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let max_single_mib = parse_mib(
            env::var("MAX_SINGLE_FILE_SIZE").ok(),
            DEFAULT_MAX_SINGLE_FILE_MIB,
        );
        let max_total_mib = parse_mib(env::var("MAX_TOTAL_SIZE").ok(), DEFAULT_MAX_TOTAL_MIB);

        Self {
            pipeline: PipelineConfig {
                upload_root: env_path("UPLOAD_DIR", "uploads"),
                processed_dir: env_path("PROCESSED_DIR", "processed"),
                download_dir: env_path("DOWNLOAD_DIR", "downloads"),
                limits: SizeLimits::from_mib(max_single_mib, max_total_mib),
            },
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
        }
    }

    /// パイプラインが前提とするディレクトリを起動時に作成する
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [
            &self.pipeline.upload_root,
            &self.pipeline.processed_dir,
            &self.pipeline.download_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// MiB 単位の環境変数値をパースする（不正値はデフォルトに落とす）
fn parse_mib(value: Option<String>, default: u64) -> u64 {
    value
        .as_deref()
        .map(str::trim)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}
