//! The storage module, defining how key material is persisted between invocations.
// 中文: 存储模块，定义了密钥材料在多次调用之间如何持久化。

pub mod file_store;
pub mod slot;

pub use file_store::{ArtifactInfo, KeyStore, StoreLock};
pub use slot::{ArtifactSlot, KeyMaterial};
