//! 方案注册表：把 (方案族, 安全级别) 映射到具体的 KEM 实现。
//!
//! 注册表只做查找，不包含任何密码学逻辑。具体运算由 `pqcrypto-mlkem` 与
//! `pqcrypto-kyber` 提供，二者都通过 `pqcrypto-traits` 的字节接口接入。

use crate::error::{Error, Result};
use crate::storage::KeyMaterial;
use std::fmt;

pub mod kyber;
pub mod ml_kem;

/// KEM 方案族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemeFamily {
    /// FIPS 203 ML-KEM，默认方案族
    #[default]
    MlKem,
    /// 第三轮提交版本的 Kyber
    Kyber,
}

impl SchemeFamily {
    /// 按名称解析，大小写不敏感：`ml-kem` / `mlkem` / `kyber`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ml-kem" | "mlkem" | "ml_kem" => Some(SchemeFamily::MlKem),
            "kyber" => Some(SchemeFamily::Kyber),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SchemeFamily::MlKem => "ml-kem",
            SchemeFamily::Kyber => "kyber",
        }
    }
}

impl fmt::Display for SchemeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 安全级别（以 512 / 768 / 1024 参数集命名）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SecurityLevel {
    #[default]
    L512,
    L768,
    L1024,
}

impl SecurityLevel {
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            512 => Some(SecurityLevel::L512),
            768 => Some(SecurityLevel::L768),
            1024 => Some(SecurityLevel::L1024),
            _ => None,
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            SecurityLevel::L512 => 512,
            SecurityLevel::L768 => 768,
            SecurityLevel::L1024 => 1024,
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// An immutable choice of KEM variant.
///
/// Every value of this type names exactly one registered scheme, so
/// [`SchemeSelector::scheme`] cannot fail. Untyped input (a family name and a
/// level number from the command line or a config file) goes through
/// [`SchemeSelector::parse`], which rejects anything unregistered with
/// [`Error::InvalidSelection`].
///
/// 中文: 不可变的方案选择。类型化构造总能对应到唯一的已注册方案；
/// 来自命令行或配置文件的原始输入经由 `parse` 校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SchemeSelector {
    family: SchemeFamily,
    level: SecurityLevel,
}

impl SchemeSelector {
    /// 所有已注册的组合
    pub const ALL: [SchemeSelector; 6] = [
        SchemeSelector::new(SchemeFamily::MlKem, SecurityLevel::L512),
        SchemeSelector::new(SchemeFamily::MlKem, SecurityLevel::L768),
        SchemeSelector::new(SchemeFamily::MlKem, SecurityLevel::L1024),
        SchemeSelector::new(SchemeFamily::Kyber, SecurityLevel::L512),
        SchemeSelector::new(SchemeFamily::Kyber, SecurityLevel::L768),
        SchemeSelector::new(SchemeFamily::Kyber, SecurityLevel::L1024),
    ];

    pub const fn new(family: SchemeFamily, level: SecurityLevel) -> Self {
        Self { family, level }
    }

    /// 由原始的方案族名称与级别数字构造
    pub fn parse(family: &str, level: u32) -> Result<Self> {
        let invalid = || Error::InvalidSelection {
            family: family.to_string(),
            level,
        };
        let family = SchemeFamily::from_name(family).ok_or_else(invalid)?;
        let level = SecurityLevel::from_bits(level).ok_or_else(invalid)?;
        Ok(Self::new(family, level))
    }

    pub fn family(&self) -> SchemeFamily {
        self.family
    }

    pub fn level(&self) -> SecurityLevel {
        self.level
    }

    /// 返回该选择对应的 KEM 实现
    pub fn scheme(&self) -> &'static dyn KemScheme {
        use SchemeFamily::*;
        use SecurityLevel::*;

        match (self.family, self.level) {
            (MlKem, L512) => &ml_kem::MlKem512,
            (MlKem, L768) => &ml_kem::MlKem768,
            (MlKem, L1024) => &ml_kem::MlKem1024,
            (Kyber, L512) => &kyber::Kyber512,
            (Kyber, L768) => &kyber::Kyber768,
            (Kyber, L1024) => &kyber::Kyber1024,
        }
    }
}

impl fmt::Display for SchemeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme().name())
    }
}

/// 方案的各项字节长度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeSizes {
    pub public_key: usize,
    pub secret_key: usize,
    pub ciphertext: usize,
    pub shared_secret: usize,
}

/// The three opaque KEM operations the workflow depends on.
///
/// Implementations consume and produce whole byte strings. A key or ciphertext
/// whose length does not fit the scheme fails with [`Error::MalformedMaterial`].
///
/// 中文: 工作流依赖的三个不透明 KEM 操作。
pub trait KemScheme: fmt::Debug + Send + Sync {
    /// 对应的选择器
    fn selector(&self) -> SchemeSelector;

    /// 显示名称，例如 `ML-KEM-768`
    fn name(&self) -> &'static str;

    fn sizes(&self) -> SchemeSizes;

    /// 生成 (封装密钥, 解封装密钥)
    fn keygen(&self) -> Result<(KeyMaterial, KeyMaterial)>;

    /// 用封装密钥生成 (共享秘密, 密文)
    fn encapsulate(&self, encapsulation_key: &KeyMaterial) -> Result<(KeyMaterial, KeyMaterial)>;

    /// 用解封装密钥从密文恢复共享秘密
    fn decapsulate(
        &self,
        decapsulation_key: &KeyMaterial,
        ciphertext: &KeyMaterial,
    ) -> Result<KeyMaterial>;
}

/// 按原始输入查找方案；非法组合返回 `InvalidSelection`
pub fn resolve(family: &str, level: u32) -> Result<&'static dyn KemScheme> {
    SchemeSelector::parse(family, level).map(|selector| selector.scheme())
}

pub(crate) fn malformed(scheme: &'static str, material: &KeyMaterial, expected: usize) -> Error {
    Error::MalformedMaterial {
        slot: material.slot(),
        scheme,
        expected,
        actual: material.len(),
    }
}

/// 为一个 pqcrypto KEM 模块生成 [`KemScheme`] 实现
macro_rules! pqcrypto_kem {
    ($(#[$meta:meta])* $name:ident, $krate:ident :: $module:ident, $display:literal, $family:ident, $level:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $crate::scheme::KemScheme for $name {
            fn selector(&self) -> $crate::scheme::SchemeSelector {
                $crate::scheme::SchemeSelector::new(
                    $crate::scheme::SchemeFamily::$family,
                    $crate::scheme::SecurityLevel::$level,
                )
            }

            fn name(&self) -> &'static str {
                $display
            }

            fn sizes(&self) -> $crate::scheme::SchemeSizes {
                $crate::scheme::SchemeSizes {
                    public_key: $krate::$module::public_key_bytes(),
                    secret_key: $krate::$module::secret_key_bytes(),
                    ciphertext: $krate::$module::ciphertext_bytes(),
                    shared_secret: $krate::$module::shared_secret_bytes(),
                }
            }

            fn keygen(
                &self,
            ) -> $crate::error::Result<($crate::storage::KeyMaterial, $crate::storage::KeyMaterial)> {
                let (pk, sk) = $krate::$module::keypair();
                Ok((
                    $crate::storage::KeyMaterial::new($crate::storage::ArtifactSlot::PublicKey, pk.as_bytes()),
                    $crate::storage::KeyMaterial::new($crate::storage::ArtifactSlot::PrivateKey, sk.as_bytes()),
                ))
            }

            fn encapsulate(
                &self,
                encapsulation_key: &$crate::storage::KeyMaterial,
            ) -> $crate::error::Result<($crate::storage::KeyMaterial, $crate::storage::KeyMaterial)> {
                let pk = $krate::$module::PublicKey::from_bytes(encapsulation_key.as_bytes()).map_err(|_| {
                    $crate::scheme::malformed($display, encapsulation_key, $krate::$module::public_key_bytes())
                })?;
                let (ss, ct) = $krate::$module::encapsulate(&pk);
                Ok((
                    $crate::storage::KeyMaterial::new($crate::storage::ArtifactSlot::SharedSecret, ss.as_bytes()),
                    $crate::storage::KeyMaterial::new($crate::storage::ArtifactSlot::Ciphertext, ct.as_bytes()),
                ))
            }

            fn decapsulate(
                &self,
                decapsulation_key: &$crate::storage::KeyMaterial,
                ciphertext: &$crate::storage::KeyMaterial,
            ) -> $crate::error::Result<$crate::storage::KeyMaterial> {
                let sk = $krate::$module::SecretKey::from_bytes(decapsulation_key.as_bytes()).map_err(|_| {
                    $crate::scheme::malformed($display, decapsulation_key, $krate::$module::secret_key_bytes())
                })?;
                let ct = $krate::$module::Ciphertext::from_bytes(ciphertext.as_bytes()).map_err(|_| {
                    $crate::scheme::malformed($display, ciphertext, $krate::$module::ciphertext_bytes())
                })?;
                let ss = $krate::$module::decapsulate(&ct, &sk);
                Ok($crate::storage::KeyMaterial::new(
                    $crate::storage::ArtifactSlot::DecryptedSecret,
                    ss.as_bytes(),
                ))
            }
        }
    };
}

pub(crate) use pqcrypto_kem;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArtifactSlot;
    use std::collections::HashSet;

    #[test]
    fn test_every_selection_resolves_to_exactly_one_scheme() {
        let mut names = HashSet::new();
        for selector in SchemeSelector::ALL {
            let scheme = selector.scheme();
            assert_eq!(scheme.selector(), selector);
            assert!(names.insert(scheme.name()), "duplicate scheme {}", scheme.name());
        }
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_parse_accepts_family_aliases() {
        let a = SchemeSelector::parse("ML-KEM", 768).unwrap();
        let b = SchemeSelector::parse("mlkem", 768).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.scheme().name(), "ML-KEM-768");

        let k = SchemeSelector::parse("Kyber", 1024).unwrap();
        assert_eq!(k.family(), SchemeFamily::Kyber);
        assert_eq!(k.level(), SecurityLevel::L1024);
        assert_eq!(k.to_string(), "Kyber1024");
    }

    #[test]
    fn test_parse_rejects_unsupported_inputs() {
        match SchemeSelector::parse("ml-kem", 2048) {
            Err(Error::InvalidSelection { family, level }) => {
                assert_eq!(family, "ml-kem");
                assert_eq!(level, 2048);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            SchemeSelector::parse("rsa", 512),
            Err(Error::InvalidSelection { .. })
        ));
        assert!(resolve("kyber", 0).is_err());
    }

    #[test]
    fn test_default_selection() {
        let selector = SchemeSelector::default();
        assert_eq!(selector.family(), SchemeFamily::MlKem);
        assert_eq!(selector.level(), SecurityLevel::L512);
    }

    #[test]
    fn test_keygen_matches_declared_sizes() {
        for selector in SchemeSelector::ALL {
            let scheme = selector.scheme();
            let sizes = scheme.sizes();
            let (ek, dk) = scheme.keygen().unwrap();
            assert_eq!(ek.slot(), ArtifactSlot::PublicKey);
            assert_eq!(dk.slot(), ArtifactSlot::PrivateKey);
            assert_eq!(ek.len(), sizes.public_key, "{}", scheme.name());
            assert_eq!(dk.len(), sizes.secret_key, "{}", scheme.name());
        }
    }

    #[test]
    fn test_wrong_length_key_is_malformed() {
        let scheme = SchemeSelector::parse("ml-kem", 512).unwrap().scheme();
        let short = KeyMaterial::new(ArtifactSlot::PublicKey, vec![0u8; 10]);

        match scheme.encapsulate(&short) {
            Err(Error::MalformedMaterial {
                slot,
                scheme: name,
                expected,
                actual,
            }) => {
                assert_eq!(slot, ArtifactSlot::PublicKey);
                assert_eq!(name, "ML-KEM-512");
                assert_eq!(expected, scheme.sizes().public_key);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
