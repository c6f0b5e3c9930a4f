/// 受け付ける画像拡張子（小文字で比較する）
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// 再エンコード時の品質（1-100、非可逆フォーマットに適用）
pub const ENCODE_QUALITY: u8 = 85;

/// リサイズ時のデフォルト最大寸法
pub const DEFAULT_MAX_DIMENSION: u32 = 800;

/// フォールバック名生成時のランダム英数字の長さ
pub const RANDOM_NAME_LEN: usize = 10;

/// 単一ファイルのデフォルト上限（MiB）
pub const DEFAULT_MAX_SINGLE_FILE_MIB: u64 = 10;

/// バッチ合計のデフォルト上限（MiB）
pub const DEFAULT_MAX_TOTAL_MIB: u64 = 500;
