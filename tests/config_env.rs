//!
//! 环境变量配置层测试
//!
//! 环境变量在整个进程内共享，因此这里单独成一个测试二进制，且只有一个测试函数，
//! 避免与其他读取配置的测试并发。
//!

use kem_kit::prelude::*;
use std::env;
use std::fs;
use tempfile::tempdir;

const LEVEL_VAR: &str = "KEMKIT_SCHEME__LEVEL";
const ROOT_VAR: &str = "KEMKIT_STORAGE__ARTIFACT_ROOT";
const STRICT_VAR: &str = "KEMKIT_VERIFY__STRICT";

#[test]
fn test_environment_layer_precedence() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("kem.toml");
    let env_root = dir.path().join("from-env");
    fs::write(
        &config_path,
        "[scheme]\nfamily = \"kyber\"\nlevel = 1024\n\n[storage]\nartifact_root = \"/tmp/from-file\"\n",
    )
    .unwrap();

    // SAFETY: 本测试二进制只有这一个测试，没有其他线程读写环境变量
    unsafe {
        env::set_var(LEVEL_VAR, "768");
        env::set_var(ROOT_VAR, env_root.to_str().unwrap());
        env::set_var(STRICT_VAR, "true");
    }

    // 环境变量覆盖配置文件，文件中其余的键保持不变
    let settings = Settings::load(Some(config_path.as_path())).unwrap();
    assert_eq!(settings.scheme.family, "kyber");
    assert_eq!(settings.scheme.level, 768);
    assert_eq!(settings.storage.artifact_root, env_root);
    assert!(settings.verify.strict);
    assert_eq!(settings.selector().unwrap().scheme().name(), "Kyber768");

    // 命令行参数覆盖环境变量
    #[cfg(feature = "cli")]
    {
        use clap::Parser;
        use kem_kit::cli::{Cli, resolve_settings};
        use std::path::PathBuf;

        let cli = Cli::try_parse_from([
            "kem-kit",
            "--config",
            config_path.to_str().unwrap(),
            "--level",
            "512",
            "--artifact-root",
            "/tmp/from-flag",
            "info",
        ])
        .unwrap();
        let settings = resolve_settings(&cli).unwrap();
        assert_eq!(settings.scheme.level, 512);
        assert_eq!(settings.storage.artifact_root, PathBuf::from("/tmp/from-flag"));
        assert!(settings.verify.strict);
    }

    // 非法的环境变量值同样在方案选择时被拒绝
    unsafe {
        env::set_var(LEVEL_VAR, "2048");
    }
    let settings = Settings::load(Some(config_path.as_path())).unwrap();
    assert!(matches!(
        settings.selector(),
        Err(Error::InvalidSelection { level: 2048, .. })
    ));

    unsafe {
        env::remove_var(LEVEL_VAR);
        env::remove_var(ROOT_VAR);
        env::remove_var(STRICT_VAR);
    }
}
