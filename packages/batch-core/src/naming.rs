use rand::{Rng, distr::Alphanumeric};

use crate::constants::RANDOM_NAME_LEN;

/// クライアント指定のファイル名を安全な単一パス要素に正規化する
///
/// パス区切りや非ポータブル文字を除去し、結果が空になった場合は
/// content_type 由来の拡張子を付けたランダム名を生成する
pub fn normalize(raw_name: &str, content_type: &str) -> String {
    let cleaned = sanitize(raw_name);
    if cleaned.is_empty() {
        random_filename(extension_from_content_type(content_type))
    } else {
        cleaned
    }
}

/// 英数字・ハイフン・アンダースコア・ドット以外を `_` に置換する
/// 最後のパス区切り以降のみを採用し、先頭・末尾のドットを落とす
fn sanitize(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");

    let mut out = String::with_capacity(base.len());
    for ch in base.trim().chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }

    out.trim_matches('.').to_string()
}

/// ランダム英数字 + 拡張子のフォールバック名を生成する
fn random_filename(extension: &str) -> String {
    let name: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_NAME_LEN)
        .map(char::from)
        .collect();
    format!("{name}.{extension}")
}

/// Content-Type のサブタイプを拡張子として採用する（`image/png` -> `png`）
fn extension_from_content_type(content_type: &str) -> &str {
    match content_type.rsplit('/').next() {
        Some(ext) if !ext.is_empty() => ext,
        _ => "bin",
    }
}
