/// 長辺が max_dimension に収まる出力寸法を計算する
///
/// 両辺とも収まっている場合は元の寸法をそのまま返す（拡大しない）。
/// 縮小時は長辺を max_dimension に合わせ、短辺はアスペクト比から
/// 丸めて求める
pub fn fit_within(src_w: u32, src_h: u32, max_dimension: u32) -> (u32, u32) {
    if src_w <= max_dimension && src_h <= max_dimension {
        return (src_w, src_h);
    }

    if src_w >= src_h {
        (max_dimension, scale_minor(src_h, src_w, max_dimension))
    } else {
        (scale_minor(src_w, src_h, max_dimension), max_dimension)
    }
}

/// 短辺を round(max * minor / major) で計算する（最小1px）
fn scale_minor(minor: u32, major: u32, max_dimension: u32) -> u32 {
    let scaled = (max_dimension as f64 * minor as f64 / major as f64).round() as u32;
    scaled.max(1)
}
