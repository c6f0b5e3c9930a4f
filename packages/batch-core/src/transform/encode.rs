use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;

use crate::errors::TransformError;
use crate::transform::params::OutputFormat;

/// 画像をエンコードする
///
/// アルファチャンネル非対応フォーマットへは RGB に潰してから書き込む
/// （RGBA を JPEG 等へそのまま渡すとエンコーダがエラーになる）
pub fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());

    // エンコーダが確実に受け付ける RGB8 / RGBA8 に正規化する
    let img = if img.color().has_alpha() && format.supports_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            img.write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::WebP => {
            // image クレートの WebP エンコーダはロスレスのみ対応（quality は無視）
            let encoder = WebPEncoder::new_lossless(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("WebP encode failed: {e}")))?;
        }
        OutputFormat::Png | OutputFormat::Gif | OutputFormat::Bmp | OutputFormat::Tiff => {
            img.write_to(&mut buf, format.image_format()).map_err(|e| {
                TransformError::ProcessingFailed(format!(
                    "{} encode failed: {e}",
                    format.extension()
                ))
            })?;
        }
    }

    Ok(buf.into_inner())
}
