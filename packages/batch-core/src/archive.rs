use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::errors::ArchiveError;

/// アーカイブに書き込む1エントリ
///
/// ステージング上のパスと、アーカイブ内で使う最終ファイル名を分けて持つ。
/// ステージング名にはセッション識別子が前置されているため、
/// そのままエントリ名には使えない
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub entry_name: String,
}

/// 変換済みファイル群を単一の ZIP（deflate 圧縮）にまとめる
///
/// エントリ順は入力順をそのまま保つ
pub fn write_archive(entries: &[ArchiveEntry], dest: &Path) -> Result<(), ArchiveError> {
    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.entry_name.as_str(), options)?;
        let mut src = File::open(&entry.path)?;
        io::copy(&mut src, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}
