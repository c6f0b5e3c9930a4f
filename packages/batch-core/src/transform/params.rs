use image::ImageFormat;

use crate::constants::DEFAULT_MAX_DIMENSION;
use crate::errors::RejectReason;

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl OutputFormat {
    /// 文字列から OutputFormat を作成（"jpg" は JPEG の別名）
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// 正規の拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
        }
    }

    /// デコード時に推測されたフォーマットから作成する
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Tiff => Some(Self::Tiff),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    /// image クレートのフォーマット識別子
    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
        }
    }

    /// アルファチャンネルを保持できるか
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, Self::Jpeg | Self::Bmp)
    }
}

/// バッチ全体に一度だけ選ばれる変換指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpec {
    /// アスペクト比を保って長辺を max_dimension 以内に収める
    Resize { max_dimension: u32 },
    /// 指定フォーマットへ変換する
    Convert { format: OutputFormat },
}

impl TransformSpec {
    /// フォームフィールドから変換指定を組み立てる
    ///
    /// `max_size` は resize 時のみ参照（デフォルト 800）、
    /// `new_format` は convert 時のみ参照（デフォルト jpg）
    pub fn from_form(
        process_type: Option<&str>,
        max_size: Option<&str>,
        new_format: Option<&str>,
    ) -> Result<Self, RejectReason> {
        match process_type.map(str::trim) {
            None | Some("") => Err(RejectReason::MissingProcessType),
            Some("resize") => {
                let max_dimension = match max_size.map(str::trim) {
                    None | Some("") => DEFAULT_MAX_DIMENSION,
                    Some(raw) => raw.parse::<u32>().ok().filter(|v| *v > 0).ok_or_else(|| {
                        RejectReason::InvalidParameter {
                            field: "max_size",
                            value: raw.to_string(),
                        }
                    })?,
                };
                Ok(Self::Resize { max_dimension })
            }
            Some("convert") => {
                let raw = match new_format.map(str::trim) {
                    None | Some("") => "jpg",
                    Some(raw) => raw,
                };
                let format = OutputFormat::parse(raw).ok_or_else(|| {
                    RejectReason::InvalidParameter {
                        field: "new_format",
                        value: raw.to_string(),
                    }
                })?;
                Ok(Self::Convert { format })
            }
            Some(other) => Err(RejectReason::UnknownProcessType {
                value: other.to_string(),
            }),
        }
    }

    /// 変換後の出力ファイル名
    ///
    /// resize は元の名前を保ち、convert は拡張子を差し替える
    pub fn output_filename(&self, filename: &str) -> String {
        match self {
            Self::Resize { .. } => filename.to_string(),
            Self::Convert { format } => {
                let base = filename
                    .rsplit_once('.')
                    .map(|(base, _)| base)
                    .unwrap_or(filename);
                format!("{base}.{}", format.extension())
            }
        }
    }
}
