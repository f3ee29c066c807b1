//! Workflow orchestration over the artifact store.
//!
//! Each action is a short fixed sequence: read the prerequisite artifacts, run
//! one KEM operation, write the results. Ordering between invocations is only
//! enforced by artifact presence; there is no state ledger besides the files.
//!
//! 中文: 工作流编排。每个动作都是固定的步骤序列：读取前置工件、执行一次 KEM 运算、
//! 写回结果。跨调用的顺序只通过“所需工件是否存在”来约束。

use std::fmt;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::scheme::SchemeSelector;
use crate::storage::{ArtifactInfo, ArtifactSlot, KeyMaterial, KeyStore};

/// 会写入工件的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    Encapsulate,
    Decapsulate,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Generate => "keygen",
            Action::Encapsulate => "encapsulate",
            Action::Decapsulate => "decapsulate",
        };
        f.write_str(name)
    }
}

/// 一个已写入的工件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub slot: ArtifactSlot,
    pub path: PathBuf,
    pub len: usize,
}

/// 动作执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub action: Action,
    pub scheme: &'static str,
    pub written: Vec<WrittenArtifact>,
}

impl ActionReport {
    fn new(action: Action, selector: SchemeSelector) -> Self {
        Self {
            action,
            scheme: selector.scheme().name(),
            written: Vec::new(),
        }
    }

    pub fn slots(&self) -> Vec<ArtifactSlot> {
        self.written.iter().map(|w| w.slot).collect()
    }
}

/// Result of comparing the shared secret with the decrypted secret.
///
/// A mismatch or a missing file is a reported outcome, not an error.
///
/// 中文: 校验结果。不匹配与文件缺失都是结果值，而不是错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Match,
    Mismatch,
    Missing { slot: ArtifactSlot, path: PathBuf },
}

impl VerifyOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, VerifyOutcome::Match)
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyOutcome::Match => f.write_str("Decapsulation successful: secrets match!"),
            VerifyOutcome::Mismatch => {
                f.write_str("Error: decrypted secret does not match the original shared secret.")
            }
            VerifyOutcome::Missing { slot, path } => {
                write!(f, "File missing: {} ({} not found)", slot, path.display())
            }
        }
    }
}

/// 工作流编排器
///
/// 方案选择通过参数显式传入每一次调用，编排器本身不保存任何模式状态。
#[derive(Debug, Clone, Copy)]
pub struct Workflow<'a> {
    store: &'a KeyStore,
}

impl<'a> Workflow<'a> {
    pub fn new(store: &'a KeyStore) -> Self {
        Self { store }
    }

    /// 生成密钥对并写入公钥与私钥槽位
    #[instrument(skip(self), fields(scheme = %selector))]
    pub fn generate(&self, selector: SchemeSelector) -> Result<ActionReport> {
        let _lock = self.store.lock_if_enabled()?;

        let (ek, dk) = selector.scheme().keygen()?;

        let mut report = ActionReport::new(Action::Generate, selector);
        self.write(&mut report, &ek)?;
        self.write(&mut report, &dk)?;
        info!("key pair generated");
        Ok(report)
    }

    /// 读取公钥，封装出共享秘密与密文
    ///
    /// 公钥缺失时返回 `NotFound`，不会写入任何工件。
    #[instrument(skip(self), fields(scheme = %selector))]
    pub fn encapsulate(&self, selector: SchemeSelector) -> Result<ActionReport> {
        let _lock = self.store.lock_if_enabled()?;

        let ek = self.store.get(ArtifactSlot::PublicKey)?;
        let (shared_secret, ciphertext) = selector.scheme().encapsulate(&ek)?;

        let mut report = ActionReport::new(Action::Encapsulate, selector);
        self.write(&mut report, &shared_secret)?;
        self.write(&mut report, &ciphertext)?;
        info!(ciphertext = %ciphertext.fingerprint(), "shared secret encapsulated");
        Ok(report)
    }

    /// 读取私钥与密文，解封装出共享秘密
    #[instrument(skip(self), fields(scheme = %selector))]
    pub fn decapsulate(&self, selector: SchemeSelector) -> Result<ActionReport> {
        let _lock = self.store.lock_if_enabled()?;
        self.decapsulate_unlocked(selector)
    }

    /// 解封装后立即校验，整个过程只加一次锁
    #[instrument(skip(self), fields(scheme = %selector))]
    pub fn decapsulate_and_verify(
        &self,
        selector: SchemeSelector,
    ) -> Result<(ActionReport, VerifyOutcome)> {
        let _lock = self.store.lock_if_enabled()?;
        let report = self.decapsulate_unlocked(selector)?;
        let outcome = self.verify_unlocked()?;
        Ok((report, outcome))
    }

    /// Compares the shared secret with the decrypted secret.
    ///
    /// An absent artifact is turned into [`VerifyOutcome::Missing`]; only other
    /// I/O failures are returned as errors.
    ///
    /// 中文: 比较共享秘密与解封装得到的秘密。工件缺失时返回 `Missing` 而不是错误。
    #[instrument(skip(self))]
    pub fn verify(&self) -> Result<VerifyOutcome> {
        let _lock = self.store.lock_if_enabled()?;
        self.verify_unlocked()
    }

    /// 所有槽位的当前状态；只读，不加锁
    pub fn status(&self) -> Result<Vec<(ArtifactSlot, Option<ArtifactInfo>)>> {
        ArtifactSlot::ALL
            .into_iter()
            .map(|slot| self.store.inspect(slot).map(|info| (slot, info)))
            .collect()
    }

    fn decapsulate_unlocked(&self, selector: SchemeSelector) -> Result<ActionReport> {
        let dk = self.store.get(ArtifactSlot::PrivateKey)?;
        let ct = self.store.get(ArtifactSlot::Ciphertext)?;
        let decrypted = selector.scheme().decapsulate(&dk, &ct)?;

        let mut report = ActionReport::new(Action::Decapsulate, selector);
        self.write(&mut report, &decrypted)?;
        info!(ciphertext = %ct.fingerprint(), "shared secret decapsulated");
        Ok(report)
    }

    fn verify_unlocked(&self) -> Result<VerifyOutcome> {
        let shared = match self.store.get(ArtifactSlot::SharedSecret) {
            Ok(material) => material,
            Err(Error::NotFound { slot, path }) => return Ok(missing(slot, path)),
            Err(e) => return Err(e),
        };
        let decrypted = match self.store.get(ArtifactSlot::DecryptedSecret) {
            Ok(material) => material,
            Err(Error::NotFound { slot, path }) => return Ok(missing(slot, path)),
            Err(e) => return Err(e),
        };

        if shared.ct_eq(&decrypted) {
            info!("shared secret and decrypted secret match");
            Ok(VerifyOutcome::Match)
        } else {
            warn!(
                shared = %shared.fingerprint(),
                decrypted = %decrypted.fingerprint(),
                "decrypted secret does not match shared secret"
            );
            Ok(VerifyOutcome::Mismatch)
        }
    }

    fn write(&self, report: &mut ActionReport, material: &KeyMaterial) -> Result<()> {
        let path = self.store.put(material)?;
        info!(slot = %material.slot(), path = %path.display(), "artifact saved");
        report.written.push(WrittenArtifact {
            slot: material.slot(),
            path,
            len: material.len(),
        });
        Ok(())
    }
}

fn missing(slot: ArtifactSlot, path: PathBuf) -> VerifyOutcome {
    warn!(slot = %slot, path = %path.display(), "verification input missing");
    VerifyOutcome::Missing { slot, path }
}
