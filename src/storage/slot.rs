//! 工件槽位与密钥材料。
// 中文: 每一种密钥材料角色对应一个固定的槽位。

use crate::common::utils::constant_time_eq;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A stable logical name for one role of key material.
///
/// Each slot is backed by exactly one file in the artifact root. Writing to an
/// occupied slot replaces its content; there is no versioning.
///
/// 中文: 密钥材料角色对应的稳定逻辑名称。每个槽位对应工件根目录下的一个文件，
/// 写入已占用的槽位会直接覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactSlot {
    PublicKey,
    PrivateKey,
    Ciphertext,
    SharedSecret,
    DecryptedSecret,
}

impl ArtifactSlot {
    /// 所有槽位，按工作流顺序排列
    pub const ALL: [ArtifactSlot; 5] = [
        ArtifactSlot::PublicKey,
        ArtifactSlot::PrivateKey,
        ArtifactSlot::Ciphertext,
        ArtifactSlot::SharedSecret,
        ArtifactSlot::DecryptedSecret,
    ];

    /// 规范名称
    pub const fn name(self) -> &'static str {
        match self {
            ArtifactSlot::PublicKey => "public_key",
            ArtifactSlot::PrivateKey => "private_key",
            ArtifactSlot::Ciphertext => "ciphertext",
            ArtifactSlot::SharedSecret => "shared_secret",
            ArtifactSlot::DecryptedSecret => "decrypted_secret",
        }
    }

    /// 槽位在工件根目录下的文件名
    pub fn file_name(self) -> String {
        format!("{}.bin", self.name())
    }

    /// Whether the slot holds material that must stay private to its owner.
    ///
    /// 中文: 私钥与两个共享秘密以受限权限写入。
    pub const fn is_secret(self) -> bool {
        matches!(
            self,
            ArtifactSlot::PrivateKey | ArtifactSlot::SharedSecret | ArtifactSlot::DecryptedSecret
        )
    }
}

impl fmt::Display for ArtifactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque byte string tagged with the slot it belongs to.
///
/// The bytes are never inspected by the workflow; they are produced by a KEM
/// operation or read from the store, and consumed whole. Memory is wiped on drop.
///
/// 中文: 带有角色标签的不透明字节串，离开作用域时自动擦除。
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    #[zeroize(skip)]
    slot: ArtifactSlot,
    bytes: Vec<u8>,
}

impl KeyMaterial {
    pub fn new(slot: ArtifactSlot, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot,
            bytes: bytes.into(),
        }
    }

    pub fn slot(&self) -> ArtifactSlot {
        self.slot
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 与另一份材料做常量时间的字节比较（忽略角色）
    pub fn ct_eq(&self, other: &KeyMaterial) -> bool {
        constant_time_eq(&self.bytes, &other.bytes)
    }

    /// 前 8 字节 SHA-256 的十六进制表示，用于在日志与状态输出中辨认工件
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        hex::encode(&digest[..8])
    }
}

impl AsRef<[u8]> for KeyMaterial {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// 不打印字节内容
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("slot", &self.slot)
            .field("len", &self.bytes.len())
            .finish()
    }
}
