use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::errors::TransformError;

/// バイト列をデコードし、DynamicImage と元のフォーマットを返す
///
/// フォーマットは拡張子ではなくマジックバイトから推測する
pub fn decode_image(input: &[u8]) -> Result<(DynamicImage, Option<ImageFormat>), TransformError> {
    let reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(e.to_string()))?;

    let source_format = reader.format();

    let img = reader
        .decode()
        .map_err(|e| TransformError::Decode(e.to_string()))?;

    Ok((img, source_format))
}
