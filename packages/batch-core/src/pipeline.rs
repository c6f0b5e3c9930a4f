use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveEntry, write_archive};
use crate::constants::ALLOWED_EXTENSIONS;
use crate::errors::{PipelineError, RejectReason};
use crate::limits::{SizeLimits, verify_declared_size};
use crate::naming;
use crate::session::Session;
use crate::transform::{self, TransformSpec};

/// パイプラインが参照するディレクトリ群とサイズ上限
///
/// 起動時に一度だけ構築し、参照で受け渡す（グローバル状態は持たない）
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 原本を日付・セッション別に保存するルート
    pub upload_root: PathBuf,
    /// 全セッション共有のステージング領域
    pub processed_dir: PathBuf,
    /// 完成したアーカイブの置き場
    pub download_dir: PathBuf,
    pub limits: SizeLimits,
}

/// アップロードされた1ファイル
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub raw_name: String,
    pub content_type: String,
    /// クライアント申告のサイズ（申告が無ければ None）
    pub declared_len: Option<u64>,
    pub bytes: Vec<u8>,
}

/// 正常終了したバッチの結果
#[derive(Debug)]
pub struct BatchOutcome {
    pub archive_filename: String,
    /// 正規化後のファイル名（送信順を保つ）
    pub uploaded_filenames: Vec<String>,
}

/// バッチ全体を駆動する
///
/// Validating → PerFileLoop → Archiving の順に進み、途中のエラーは
/// バッチ全体の中断になる（部分的な成功は返さない）。ステージング上の
/// 中間ファイルは成否に関わらず必ず削除する。一方、保存済みの原本は
/// 中断時にも意図的に残す（調査用途での既存挙動の維持）
pub fn process_batch(
    config: &PipelineConfig,
    session: &Session,
    files: &[UploadedFile],
    spec: &TransformSpec,
) -> Result<BatchOutcome, PipelineError> {
    // 空バッチや不正な拡張子はディレクトリを作る前に弾く
    validate_batch(files)?;

    let upload_dir = session.upload_dir(&config.upload_root);
    fs::create_dir_all(&upload_dir)?;
    fs::create_dir_all(&config.processed_dir)?;
    fs::create_dir_all(&config.download_dir)?;

    // パニック時も含めてステージングの掃除を保証する
    let mut staged = scopeguard::guard(Vec::new(), |staged: Vec<ArchiveEntry>| {
        cleanup_staged(&staged);
    });

    let mut uploaded_filenames = Vec::with_capacity(files.len());
    let mut running_total = 0u64;

    for file in files {
        let (filename, entry) =
            process_file(config, session, file, spec, &upload_dir, &mut running_total)?;
        uploaded_filenames.push(filename);
        staged.push(entry);
    }

    let archive_filename = session.archive_filename();
    let archive_path = config.download_dir.join(&archive_filename);
    write_archive(&staged, &archive_path)?;

    tracing::info!(
        session = %session.id(),
        files = uploaded_filenames.len(),
        archive = %archive_filename,
        "batch archived"
    );

    Ok(BatchOutcome {
        archive_filename,
        uploaded_filenames,
    })
}

/// バッチ全体の事前検証
///
/// ファイルを1つも永続化する前に、拒否が確定する条件をまとめて弾く
fn validate_batch(files: &[UploadedFile]) -> Result<(), RejectReason> {
    if files.is_empty() {
        return Err(RejectReason::NoFiles);
    }
    if files[0].raw_name.trim().is_empty() {
        return Err(RejectReason::NoFileSelected);
    }
    for file in files {
        if !has_allowed_extension(&file.raw_name) {
            return Err(RejectReason::DisallowedExtension {
                filename: file.raw_name.clone(),
            });
        }
    }
    Ok(())
}

/// 1ファイル分の 正規化 → サイズ検査 → 保存 → 変換 → 記録
fn process_file(
    config: &PipelineConfig,
    session: &Session,
    file: &UploadedFile,
    spec: &TransformSpec,
    upload_dir: &Path,
    running_total: &mut u64,
) -> Result<(String, ArchiveEntry), PipelineError> {
    let filename = naming::normalize(&file.raw_name, &file.content_type);

    // 申告値で先に上限を確認し、実受信量と突き合わせる
    let actual = file.bytes.len() as u64;
    let declared = file.declared_len.unwrap_or(actual);
    *running_total = config.limits.check(&filename, declared, *running_total)?;
    verify_declared_size(&filename, declared, actual)?;

    // 原本をセッションのアップロードディレクトリへ保存
    // 同名ファイルが同一バッチにあると後勝ちで上書きされる（既知の制限）
    let upload_path = upload_dir.join(&filename);
    fs::write(&upload_path, &file.bytes)?;

    // 変換結果を共有ステージング領域へセッション前置名で書き出す
    let output = transform::apply(&file.bytes, spec)?;
    let entry_name = spec.output_filename(&filename);
    let staged_path = config.processed_dir.join(session.staged_name(&entry_name));
    fs::write(&staged_path, &output)?;

    tracing::debug!(
        session = %session.id(),
        file = %filename,
        bytes_in = actual,
        bytes_out = output.len(),
        "file processed"
    );

    Ok((filename, ArchiveEntry { path: staged_path, entry_name }))
}

/// 拡張子が許可リストに含まれるか（大文字小文字を区別しない）
pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// ステージング上の中間ファイルをベストエフォートで削除する
///
/// 削除の失敗はログに残すだけで、応答内容には影響させない
fn cleanup_staged(staged: &[ArchiveEntry]) {
    for entry in staged {
        if let Err(e) = fs::remove_file(&entry.path) {
            tracing::warn!(
                path = %entry.path.display(),
                error = %e,
                "failed to remove staged file"
            );
        }
    }
}
