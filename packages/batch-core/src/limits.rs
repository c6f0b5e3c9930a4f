use crate::constants::{DEFAULT_MAX_SINGLE_FILE_MIB, DEFAULT_MAX_TOTAL_MIB};
use crate::errors::RejectReason;

const MIB: u64 = 1024 * 1024;

/// ファイルサイズ上限の設定
///
/// 単一ファイル上限とバッチ合計上限をバイト単位で保持する
#[derive(Debug, Clone, Copy)]
pub struct SizeLimits {
    pub max_single_bytes: u64,
    pub max_total_bytes: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self::from_mib(DEFAULT_MAX_SINGLE_FILE_MIB, DEFAULT_MAX_TOTAL_MIB)
    }
}

impl SizeLimits {
    /// MiB 単位の設定値から上限を作成する
    pub fn from_mib(max_single_mib: u64, max_total_mib: u64) -> Self {
        Self {
            max_single_bytes: max_single_mib * MIB,
            max_total_bytes: max_total_mib * MIB,
        }
    }

    /// 申告サイズを上限と照合し、新しい累計を返す
    ///
    /// 永続化の前に呼び出すこと（上限超過が確定したバッチへの
    /// 無駄な書き込みを避ける）
    pub fn check(
        &self,
        filename: &str,
        declared: u64,
        running_total: u64,
    ) -> Result<u64, RejectReason> {
        if declared > self.max_single_bytes {
            return Err(RejectReason::SingleFileTooLarge {
                filename: filename.to_string(),
                max_mib: self.max_single_bytes / MIB,
            });
        }

        let new_total = running_total + declared;
        if new_total > self.max_total_bytes {
            return Err(RejectReason::AggregateTooLarge {
                max_mib: self.max_total_bytes / MIB,
            });
        }

        Ok(new_total)
    }
}

/// 申告サイズと実際に受信したバイト数を突き合わせる
///
/// Content-Length はクライアント申告値であり信用できないため、
/// 不一致はハードエラーとして扱う
pub fn verify_declared_size(
    filename: &str,
    declared: u64,
    actual: u64,
) -> Result<(), RejectReason> {
    if declared != actual {
        return Err(RejectReason::DeclaredSizeMismatch {
            filename: filename.to_string(),
            declared,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = SizeLimits::default();
        assert_eq!(limits.max_single_bytes, 10 * MIB);
        assert_eq!(limits.max_total_bytes, 500 * MIB);
    }

    #[test]
    fn test_check_accumulates() {
        let limits = SizeLimits::from_mib(10, 500);
        let total = limits.check("a.png", 4 * MIB, 0).unwrap();
        assert_eq!(total, 4 * MIB);
        let total = limits.check("b.png", 6 * MIB, total).unwrap();
        assert_eq!(total, 10 * MIB);
    }

    #[test]
    fn test_single_file_too_large() {
        let limits = SizeLimits::from_mib(10, 500);
        let err = limits.check("big.png", 10 * MIB + 1, 0).unwrap_err();
        match err {
            RejectReason::SingleFileTooLarge { filename, max_mib } => {
                assert_eq!(filename, "big.png");
                assert_eq!(max_mib, 10);
            }
            other => panic!("expected SingleFileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_too_large() {
        let limits = SizeLimits::from_mib(10, 20);
        let total = limits.check("a.png", 10 * MIB, 0).unwrap();
        let total = limits.check("b.png", 10 * MIB, total).unwrap();
        let err = limits.check("c.png", 1, total).unwrap_err();
        assert!(matches!(err, RejectReason::AggregateTooLarge { max_mib: 20 }));
    }

    #[test]
    fn test_verify_declared_size() {
        assert!(verify_declared_size("a.png", 100, 100).is_ok());
        let err = verify_declared_size("a.png", 100, 99).unwrap_err();
        assert!(matches!(err, RejectReason::DeclaredSizeMismatch { .. }));
    }
}
