use std::path::{Path, PathBuf};

use chrono::Local;
use uuid::Uuid;

/// 1リクエスト分の隔離された作業単位
///
/// 共有ステージング領域での衝突回避は 128bit ランダムな識別子の
/// 前置だけに依存しているため、ステージング名の生成は必ず
/// このオブジェクトを経由すること
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    date_bucket: String,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            date_bucket: Local::now().format("%Y%m%d").to_string(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn date_bucket(&self) -> &str {
        &self.date_bucket
    }

    /// 日付・セッション別のアップロードディレクトリ
    pub fn upload_dir(&self, upload_root: &Path) -> PathBuf {
        upload_root.join(&self.date_bucket).join(self.id.to_string())
    }

    /// ステージング領域に置くファイル名（セッション識別子を前置）
    pub fn staged_name(&self, filename: &str) -> String {
        format!("{}_{}", self.id, filename)
    }

    /// 成果物アーカイブのファイル名
    pub fn archive_filename(&self) -> String {
        format!("processed_{}_{}.zip", self.date_bucket, self.id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
