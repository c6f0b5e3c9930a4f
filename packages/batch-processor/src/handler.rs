use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::AppState;
use batch_core::{
    PipelineError, RejectReason, Session, TransformSpec, UploadedFile, process_batch,
};

/// /process の成功レスポンス
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub download_url: String,
    pub uploaded_filenames: Vec<String>,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// 画像バッチを受け取り、変換・アーカイブしてダウンロード先を返す
pub async fn process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart, &state).await?;

    // 変換指定はバッチ全体で一度だけ決める
    let spec = TransformSpec::from_form(
        form.process_type.as_deref(),
        form.max_size.as_deref(),
        form.new_format.as_deref(),
    )?;

    let session = Session::new();
    tracing::info!(
        session = %session.id(),
        files = form.files.len(),
        spec = ?spec,
        "processing batch"
    );

    // 画像処理は CPU バウンドなのでブロッキングプールで実行する
    let config = state.config.clone();
    let files = form.files;
    let outcome =
        tokio::task::spawn_blocking(move || process_batch(&config.pipeline, &session, &files, &spec))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok((
        StatusCode::OK,
        Json(ProcessResponse {
            success: true,
            download_url: format!("/download/{}", outcome.archive_filename),
            uploaded_filenames: outcome.uploaded_filenames,
        }),
    )
        .into_response())
}

/// 作成済みアーカイブを添付ファイルとして配信する
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    // ダウンロードディレクトリ外へ抜けられる名前は拒否する
    if !is_safe_download_name(&filename) {
        return Err(AppError::BadRequest("invalid filename".to_string()));
    }

    let path = state.config.pipeline.download_dir.join(&filename);
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| AppError::NotFound(format!("archive not found: {filename}")))?;

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// 単一のパス要素のみを許可する
fn is_safe_download_name(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '\0'])
}

/// /process のフォーム内容
#[derive(Default)]
struct ProcessForm {
    files: Vec<UploadedFile>,
    process_type: Option<String>,
    max_size: Option<String>,
    new_format: Option<String>,
}

/// multipart フォームを読み取る
///
/// ファイル本文はチャンク単位でバッファしつつ、その場でサイズ上限を
/// 検査して見込みのないバッチを早期に打ち切る
async fn read_form(mut multipart: Multipart, state: &AppState) -> Result<ProcessForm, AppError> {
    let limits = state.config.pipeline.limits;
    let mut form = ProcessForm::default();
    let mut running_total: u64 = 0;

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files[]" => {
                let raw_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let declared_len = field
                    .headers()
                    .get(header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());

                // 申告値があれば本文を読む前に検査する
                if let Some(declared) = declared_len {
                    limits.check(&raw_name, declared, running_total)?;
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
                    bytes.extend_from_slice(&chunk);
                    limits.check(&raw_name, bytes.len() as u64, running_total)?;
                }

                running_total += bytes.len() as u64;
                form.files.push(UploadedFile {
                    raw_name,
                    content_type,
                    declared_len,
                    bytes,
                });
            }
            "process_type" => form.process_type = Some(field.text().await.map_err(bad_multipart)?),
            "max_size" => form.max_size = Some(field.text().await.map_err(bad_multipart)?),
            "new_format" => form.new_format = Some(field.text().await.map_err(bad_multipart)?),
            _ => {
                // 未知のフィールドは読み捨てる
                let _ = field.bytes().await;
            }
        }
    }

    Ok(form)
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("failed to parse multipart data: {err}"))
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    TransformFailed(String),
    ArchiveFailed(String),
    Internal(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Rejected(reason) => {
                tracing::warn!(error = %reason, "batch rejected");
                AppError::BadRequest(reason.to_string())
            }
            PipelineError::Transform(e) => {
                tracing::error!(error = %e, "image transform failed");
                AppError::TransformFailed(e.to_string())
            }
            PipelineError::Archive(e) => {
                tracing::error!(error = %e, "archive creation failed");
                AppError::ArchiveFailed(e.to_string())
            }
            PipelineError::Io(e) => {
                tracing::error!(error = %e, "io error");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<RejectReason> for AppError {
    fn from(reason: RejectReason) -> Self {
        AppError::from(PipelineError::Rejected(reason))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::TransformFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("image processing failed: {msg}"),
            ),
            AppError::ArchiveFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("archive creation failed: {msg}"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("internal error: {msg}"),
            ),
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
