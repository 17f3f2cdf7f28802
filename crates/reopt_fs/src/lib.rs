//! # REopt FileSystem Store
//! [![Crates.io](https://img.shields.io/crates/v/reopt_fs.svg)](https://crates.io/crates/reopt_fs)
//! [![Docs](https://docs.rs/reopt_fs/badge.svg)](https://docs.rs/reopt_fs/)
//!
//! A local filesystem [`ArtifactStore`].
//!
//! Every category is a directory below the root and every artifact a pretty-printed
//! `<name>.json` file inside it:
//!
//! ```text
//! reopt_data/
//! ├── inputs/abc-123.json
//! ├── results/abc-123.json
//! ├── load_profiles/
//! └── rates/
//! ```
//!
//! ## Features
//!
//! * **Atomic Writes**: Uses temporary files and rename operations so a document is never read half written.
//!
//! ## Usage
//!
//! ```no_run
//! use reopt_fs::FileSystemStore;
//!
//! let store = FileSystemStore::new("./reopt_data");
//! ```

use reopt_core::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::debug;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn atomic_write(path: &Path, data: Vec<u8>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_path = path.with_extension(format!("json.{}.{n}.tmp", std::process::id()));

    let written = match fs::write(&tmp_path, data).await {
        Ok(()) => fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        // A failed write can leave a partial temp file behind.
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }

    Ok(())
}

#[derive(Clone, Debug)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root and all category directories.
    pub async fn init(&self) -> Result<(), StorageError> {
        for category in Category::ALL {
            fs::create_dir_all(self.root.join(category.dir_name())).await?;
        }
        Ok(())
    }

    fn get_path(&self, category: Category, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self
            .root
            .join(category.dir_name())
            .join(format!("{name}.json")))
    }
}

impl ArtifactStore for FileSystemStore {
    async fn save(
        &self,
        category: Category,
        name: &str,
        document: &Value,
    ) -> Result<(), StorageError> {
        let path = self.get_path(category, name)?;
        let data = serde_json::to_vec_pretty(document)?;
        atomic_write(&path, data).await?;
        debug!(%category, name, path = %path.display(), "Saved artifact");
        Ok(())
    }

    async fn load(&self, category: Category, name: &str) -> Result<Value, StorageError> {
        let path = self.get_path(category, name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{category}/{name}")))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, category: Category, name: &str) -> Result<bool, StorageError> {
        let path = self.get_path(category, name)?;
        Ok(fs::try_exists(&path).await?)
    }
}
