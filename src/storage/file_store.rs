//! File-backed key-material store: atomic writes, slot lookup and the store lock.
// 中文: 基于文件的密钥材料存储，负责原子写入、槽位读取与存储锁。

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::common::config::StorageConfig;
use crate::common::utils::format_mode;
use crate::error::{Error, Result};
use crate::storage::slot::{ArtifactSlot, KeyMaterial};

/// 存储锁文件名
pub const LOCK_FILE_NAME: &str = ".kem-kit.lock";

/// 非机密工件（公钥、密文）的文件权限
const PUBLIC_FILE_PERMISSIONS: u32 = 0o644;

/// 密钥材料文件存储
///
/// 每个 [`ArtifactSlot`] 对应工件根目录下的一个扁平二进制文件，没有头部也没有长度前缀。
/// 存储本身不保存任何状态，除了文件本身。
#[derive(Debug, Clone)]
pub struct KeyStore {
    /// 工件根目录
    root: PathBuf,
    /// 机密工件的 Unix 文件权限
    file_permissions: u32,
    /// 动作执行期间是否持有排他锁
    locking: bool,
}

/// 工件的概要信息，用于 `status` 输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub slot: ArtifactSlot,
    pub path: PathBuf,
    pub len: usize,
    pub fingerprint: String,
}

/// 存储排他锁的守卫，离开作用域时释放
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // 关闭文件句柄同样会释放锁，这里显式解锁只是为了让释放时机确定
        let _ = self.file.unlock();
        trace!(path = %self.path.display(), "store lock released");
    }
}

impl KeyStore {
    /// 创建新的密钥文件存储
    ///
    /// 不会触碰文件系统；根目录在第一次写入或加锁时才会被创建。
    ///
    /// # 参数
    ///
    /// * `root` - 存放工件文件的目录
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let defaults = StorageConfig::default();
        Self {
            root: root.as_ref().to_path_buf(),
            file_permissions: defaults.file_permissions,
            locking: defaults.lock,
        }
    }

    /// 根据存储配置创建
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.artifact_root)
            .with_file_permissions(config.file_permissions)
            .with_locking(config.lock)
    }

    pub fn with_file_permissions(mut self, mode: u32) -> Self {
        self.file_permissions = mode;
        self
    }

    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 槽位对应的文件路径
    pub fn path(&self, slot: ArtifactSlot) -> PathBuf {
        self.root.join(slot.file_name())
    }

    pub fn exists(&self, slot: ArtifactSlot) -> bool {
        self.path(slot).is_file()
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))
    }

    fn permissions_for(&self, slot: ArtifactSlot) -> u32 {
        if slot.is_secret() {
            self.file_permissions
        } else {
            PUBLIC_FILE_PERMISSIONS
        }
    }

    /// Writes `material` into the slot it is tagged with.
    ///
    /// The bytes go to a temporary file in the artifact root, are flushed to disk,
    /// and the file is then renamed over the slot file. An interrupted write never
    /// leaves a truncated artifact under the slot name. An occupied slot is
    /// overwritten unconditionally.
    ///
    /// 中文: 先写入同目录下的临时文件并落盘，再原子地重命名为槽位文件，
    /// 因此中断的写入不会留下被截断的工件。已存在的槽位会被直接覆盖。
    pub fn put(&self, material: &KeyMaterial) -> Result<PathBuf> {
        let slot = material.slot();
        self.ensure_root()?;
        let path = self.path(slot);

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", slot.name()))
            .suffix(".tmp")
            .tempfile_in(&self.root)
            .map_err(|e| Error::io(&self.root, e))?;

        set_mode(temp.as_file(), self.permissions_for(slot)).map_err(|e| Error::io(temp.path(), e))?;
        temp.write_all(material.as_bytes())
            .map_err(|e| Error::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::io(temp.path(), e))?;
        temp.persist(&path).map_err(|e| Error::io(&path, e.error))?;

        debug!(
            slot = %slot,
            path = %path.display(),
            len = material.len(),
            mode = %format_mode(self.permissions_for(slot)),
            "artifact written"
        );
        Ok(path)
    }

    /// Reads the whole content of a slot.
    ///
    /// Fails with [`Error::NotFound`] when the slot file does not exist. A read either
    /// returns every byte or fails; partial content is never returned.
    ///
    /// 中文: 读取整个槽位；文件不存在时返回 `NotFound`，不会返回部分内容。
    pub fn get(&self, slot: ArtifactSlot) -> Result<KeyMaterial> {
        let path = self.path(slot);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(slot = %slot, path = %path.display(), len = bytes.len(), "artifact read");
                Ok(KeyMaterial::new(slot, bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound { slot, path }),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// 返回槽位的大小与指纹；槽位为空时返回 `None`
    pub fn inspect(&self, slot: ArtifactSlot) -> Result<Option<ArtifactInfo>> {
        match self.get(slot) {
            Ok(material) => Ok(Some(ArtifactInfo {
                slot,
                path: self.path(slot),
                len: material.len(),
                fingerprint: material.fingerprint(),
            })),
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Acquires an exclusive advisory lock on the store.
    ///
    /// The lock is non-blocking: if another action already holds it, this fails
    /// immediately with [`Error::StoreLocked`]. The lock file itself is left in
    /// place after release.
    ///
    /// 中文: 获取存储的排他锁，不会等待；锁已被占用时立即返回 `StoreLocked`。
    pub fn lock(&self) -> Result<StoreLock> {
        self.ensure_root()?;
        let path = self.root.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        match file.try_lock() {
            Ok(()) => {
                trace!(path = %path.display(), "store lock acquired");
                Ok(StoreLock { file, path })
            }
            Err(TryLockError::WouldBlock) => Err(Error::StoreLocked { path }),
            Err(TryLockError::Error(e)) => Err(Error::io(path, e)),
        }
    }

    /// 按配置决定是否加锁
    pub fn lock_if_enabled(&self) -> Result<Option<StoreLock>> {
        if self.locking {
            self.lock().map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}
