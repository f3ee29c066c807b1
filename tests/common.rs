//!
//! 集成测试的通用辅助函数
//!
#![allow(dead_code)]

use kem_kit::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

/// 创建一个位于临时目录中的独立存储
pub fn setup_store() -> (TempDir, KeyStore) {
    let dir = tempdir().unwrap();
    let store = KeyStore::new(dir.path().join("artifacts"));
    (dir, store)
}

/// 完整跑一遍 keygen → encapsulate → decapsulate
pub fn run_full_cycle(workflow: &Workflow<'_>, selector: SchemeSelector) {
    workflow.generate(selector).unwrap();
    workflow.encapsulate(selector).unwrap();
    workflow.decapsulate(selector).unwrap();
}

/// 翻转槽位文件中指定位置的一个字节
pub fn flip_byte(store: &KeyStore, slot: ArtifactSlot, index: usize) {
    let path = store.path(slot);
    let mut bytes = fs::read(&path).unwrap();
    bytes[index] ^= 0x01;
    fs::write(&path, bytes).unwrap();
}
