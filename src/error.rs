//! Defines the custom error type for the `kem-kit` crate.
// 中文: `kem-kit` 的统一错误类型。

use crate::storage::ArtifactSlot;
use std::path::PathBuf;
use thiserror::Error;

/// 工作流可能遇到的错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 不支持的方案族或安全级别组合
    #[error("invalid scheme selection: family `{family}`, level {level}")]
    InvalidSelection { family: String, level: u32 },

    /// 所需的工件槽位不存在
    #[error("artifact `{slot}` not found at {}", .path.display())]
    NotFound { slot: ArtifactSlot, path: PathBuf },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 另一个动作正持有存储锁
    #[error("artifact store is locked by another action ({})", .path.display())]
    StoreLocked { path: PathBuf },

    /// 字节长度与所选方案不符（通常意味着前后两次调用选择了不同的方案）
    #[error("malformed {slot} for {scheme}: expected {expected} bytes, got {actual}")]
    MalformedMaterial {
        slot: ArtifactSlot,
        scheme: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error")]
    Configuration(#[source] Box<config::ConfigError>),

    #[error("KEM scheme error: {0}")]
    Scheme(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for the "required artifact is absent" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

// config::ConfigError 体积较大，装箱后再放入枚举
impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Configuration(Box::from(err))
    }
}

/// `kem-kit` 的结果类型别名
pub type Result<T, E = Error> = std::result::Result<T, E>;
