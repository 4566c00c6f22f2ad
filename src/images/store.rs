//! File storage capability over the manager's private directory.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use moneytracker_common::{Error, Result};
use parking_lot::RwLock;

/// Read, write, remove and list files inside one exclusively-owned directory.
///
/// Paths handed in and out are absolute. `read` and `remove` accept any path,
/// `write` only paths directly under [`root`](FileStore::root).
pub trait FileStore: Send + Sync {
    /// Absolute path of the directory this store owns.
    fn root(&self) -> &Path;

    /// Read the whole file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create `path` with `bytes`.
    ///
    /// The file appears fully written or not at all. Fails if `path` already
    /// exists.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Remove the file at `path`. Returns `false` if there was nothing to remove.
    fn remove(&self, path: &Path) -> Result<bool>;

    /// Regular files directly under the root, symlinks to files included.
    fn list(&self) -> Result<Vec<PathBuf>>;

    /// Size in bytes of the file at `path`.
    fn size(&self, path: &Path) -> Result<u64>;

    /// Remove temporary files left by interrupted writes that are at least
    /// `older_than` old. Returns how many were removed.
    fn sweep_stale_temp(&self, older_than: Duration) -> Result<usize>;
}

/// Filename prefix of in-flight writes in the storage directory.
pub const TEMP_PREFIX: &str = ".tmp";

fn ensure_child_of(root: &Path, path: &Path) -> Result<()> {
    if path.parent() != Some(root) {
        return Err(Error::invalid_input(format!(
            "{} is not directly under {}",
            path.display(),
            root.display()
        )));
    }
    Ok(())
}

/// [`FileStore`] over a real directory.
#[derive(Debug, Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    /// Open (creating if needed) the storage directory at `root`.
    ///
    /// The root is canonicalized so every path this store hands out is absolute.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let root = root.canonicalize()?;
        Ok(Self { root })
    }
}

impl FileStore for FsFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(path.display().to_string()),
            _ => Error::Io(e),
        })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        ensure_child_of(&self.root, path)?;

        // Temp names never match the image convention
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove(&self, path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn size(&self, path: &Path) -> Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn sweep_stale_temp(&self, older_than: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let is_temp = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(TEMP_PREFIX));
            let metadata = entry.metadata()?;
            if !is_temp || !metadata.is_file() {
                continue;
            }

            let age = now
                .duration_since(metadata.modified()?)
                .unwrap_or(Duration::ZERO);
            if age >= older_than && self.remove(&entry.path())? {
                tracing::debug!("Removed stale temp file {}", entry.path().display());
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// In-memory [`FileStore`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    root: PathBuf,
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// Place a file directly, bypassing the create-only check of `write`.
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.write().insert(path.into(), bytes);
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl FileStore for MemoryFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::not_found(path.display().to_string()))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        ensure_child_of(&self.root, path)?;
        let mut files = self.files.write();
        if files.contains_key(path) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )));
        }
        files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    fn remove(&self, path: &Path) -> Result<bool> {
        Ok(self.files.write().remove(path).is_some())
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .read()
            .keys()
            .filter(|p| p.parent() == Some(self.root.as_path()))
            .cloned()
            .collect())
    }

    fn size(&self, path: &Path) -> Result<u64> {
        self.files
            .read()
            .get(path)
            .map(|b| b.len() as u64)
            .ok_or_else(|| Error::not_found(path.display().to_string()))
    }

    fn sweep_stale_temp(&self, _older_than: Duration) -> Result<usize> {
        // Writes land in the map in one step
        Ok(0)
    }
}
