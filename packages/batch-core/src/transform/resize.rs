use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::DynamicImage;

use crate::errors::TransformError;

/// 画像をリサイズする
///
/// fast_image_resize を使用して高品質なリサイズを行う（Lanczos3 フィルタ）。
/// アルファチャンネルを持つ画像は RGBA のまま処理して透過を保つ
pub fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    if img.color().has_alpha() {
        resize_rgba(img, target_w, target_h)
    } else {
        resize_rgb(img, target_w, target_h)
    }
}

fn resize_rgb(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = (rgb_img.width(), rgb_img.height());

    let src_image = Image::from_vec_u8(width, height, rgb_img.into_raw(), PixelType::U8x3)
        .map_err(|e| TransformError::ProcessingFailed(format!("failed to create source image: {e}")))?;

    let mut dst_image = Image::new(target_w, target_h, PixelType::U8x3);
    run_resizer(&src_image, &mut dst_image)?;

    let resized = image::RgbImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| {
            TransformError::ProcessingFailed("failed to convert resized image".to_string())
        })?;

    Ok(DynamicImage::ImageRgb8(resized))
}

fn resize_rgba(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    let rgba_img = img.to_rgba8();
    let (width, height) = (rgba_img.width(), rgba_img.height());

    let src_image = Image::from_vec_u8(width, height, rgba_img.into_raw(), PixelType::U8x4)
        .map_err(|e| TransformError::ProcessingFailed(format!("failed to create source image: {e}")))?;

    let mut dst_image = Image::new(target_w, target_h, PixelType::U8x4);
    run_resizer(&src_image, &mut dst_image)?;

    let resized = image::RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| {
            TransformError::ProcessingFailed("failed to convert resized image".to_string())
        })?;

    Ok(DynamicImage::ImageRgba8(resized))
}

fn run_resizer(src: &Image<'_>, dst: &mut Image<'_>) -> Result<(), TransformError> {
    let mut resizer = Resizer::new();
    resizer
        .resize(
            src,
            dst,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        )
        .map_err(|e| TransformError::ProcessingFailed(format!("resize failed: {e}")))
}
