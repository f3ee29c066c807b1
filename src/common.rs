//! 通用模块，包含配置和工具函数

pub mod config;
pub mod utils;

pub use self::config::{SchemeConfig, Settings, StorageConfig, VerifyConfig};
pub use self::utils::constant_time_eq;
