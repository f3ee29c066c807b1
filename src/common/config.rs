//!
//! # 通用配置模块
//!
//! 包含工作流所使用的配置结构，以及基于 `config` crate 的分层加载：
//! 内置默认值 → 配置文件 → `KEMKIT_` 前缀的环境变量。命令行参数在最上层由调用方覆盖。
//!
use crate::error::Result;
use crate::scheme::SchemeSelector;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 默认配置文件的基础名（可为 `kem-kit.toml`、`kem-kit.json` 等）
pub const DEFAULT_CONFIG_NAME: &str = "kem-kit";

/// 环境变量前缀，嵌套键用 `__` 分隔，例如 `KEMKIT_STORAGE__ARTIFACT_ROOT`
pub const ENV_PREFIX: &str = "KEMKIT";

/// 方案选择配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SchemeConfig {
    /// 方案族：`ml-kem`（默认）或 `kyber`
    pub family: String,
    /// 安全级别：512（默认）、768 或 1024
    pub level: u32,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            family: "ml-kem".to_string(),
            level: 512,
        }
    }
}

/// 存储配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// 工件根目录
    pub artifact_root: PathBuf,
    /// 机密工件的文件权限（Unix文件模式，如0o600）
    #[serde(default = "default_file_permissions")]
    pub file_permissions: u32,
    /// 动作执行期间是否对存储加排他锁
    #[serde(default = "default_lock")]
    pub lock: bool,
}

fn default_file_permissions() -> u32 {
    0o600 // 等同于 -rw-------
}

fn default_lock() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from("."),
            file_permissions: default_file_permissions(),
            lock: default_lock(),
        }
    }
}

/// 校验配置
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct VerifyConfig {
    /// 为 true 时，校验不匹配或文件缺失会让进程以非零状态退出
    pub strict: bool,
}

/// 完整配置文件
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub scheme: SchemeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
}

impl Settings {
    /// Loads settings from defaults, an optional config file and the environment.
    ///
    /// With `path = None` the file `kem-kit.{toml,json,yaml,...}` in the working
    /// directory is used if present. An explicit `path` must exist.
    ///
    /// 中文: 分层加载配置。未指定路径时工作目录下的 `kem-kit.*` 可选；
    /// 显式指定的文件必须存在。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }

    /// 由配置构造方案选择器，非法组合返回 `InvalidSelection`
    pub fn selector(&self) -> Result<SchemeSelector> {
        SchemeSelector::parse(&self.scheme.family, self.scheme.level)
    }
}
