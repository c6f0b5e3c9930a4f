pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod params;
pub mod resize;

pub use decode::decode_image;
pub use dimensions::fit_within;
pub use encode::encode_image;
pub use params::{OutputFormat, TransformSpec};
pub use resize::resize_image;

use crate::constants::ENCODE_QUALITY;
use crate::errors::TransformError;

/// バッチの変換指定を1ファイルに適用し、エンコード済みバイト列を返す
///
/// resize は元フォーマットのまま再エンコードし（寸法が収まっていても
/// 再エンコードは行う）、convert は指定フォーマットへ書き換える
pub fn apply(input: &[u8], spec: &TransformSpec) -> Result<Vec<u8>, TransformError> {
    let (img, source_format) = decode_image(input)?;

    match spec {
        TransformSpec::Resize { max_dimension } => {
            let (src_w, src_h) = (img.width(), img.height());
            let (dst_w, dst_h) = fit_within(src_w, src_h, *max_dimension);

            let img = if (dst_w, dst_h) != (src_w, src_h) {
                resize_image(&img, dst_w, dst_h)?
            } else {
                img
            };

            let format = source_format
                .and_then(OutputFormat::from_image_format)
                .ok_or_else(|| {
                    TransformError::ProcessingFailed("unsupported source format".to_string())
                })?;

            encode_image(&img, format, ENCODE_QUALITY)
        }
        TransformSpec::Convert { format } => encode_image(&img, *format, ENCODE_QUALITY),
    }
}
