pub mod config;
pub mod handler;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

pub use config::AppConfig;

/// ハンドラ間で共有する状態
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// ルータを構築する
pub fn app(config: AppConfig) -> Router {
    // multipart 全体の上限 = バッチ合計上限 + フォームメタデータ分の余裕
    let body_limit = config.pipeline.limits.max_total_bytes as usize + 1024 * 1024;

    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/health", get(handler::health))
        .route("/process", post(handler::process))
        .route("/download/{filename}", get(handler::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
