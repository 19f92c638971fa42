use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// Manages uploaded files on local disk.
///
/// Files live at `{root}/{namespace}/{uuid}.{ext}`. Callers only ever see the
/// relative path (`courses/…`), which is what gets persisted and what the HTTP
/// layer serves under `/storage`.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        info!("File storage directory: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored relative path to its location on disk.
    ///
    /// Only plain relative paths are accepted; anything that could escape the
    /// storage root (`..`, absolute paths, prefixes) is rejected.
    pub fn full_path(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        if relative.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            bail!("Invalid storage path: {:?}", relative);
        }
        Ok(self.root.join(rel))
    }

    /// Write `data` under `namespace` with a generated name and the given
    /// extension, and return the relative path.
    pub async fn store(&self, namespace: &str, extension: &str, data: &[u8]) -> Result<String> {
        if extension.is_empty() || extension.len() > 5 || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            bail!("Invalid file extension: {:?}", extension);
        }
        let relative = format!("{}/{}.{}", namespace, Uuid::new_v4().simple(), extension);
        let path = self.full_path(&relative)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        info!("Stored {} ({} bytes)", relative, data.len());
        Ok(relative)
    }

    /// Delete a stored file. A file that is already gone is not an error.
    pub async fn delete(&self, relative: &str) -> Result<()> {
        let path = self.full_path(relative)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", relative);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("File {} already gone", relative);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, relative: &str) -> Result<bool> {
        let path = self.full_path(relative)?;
        Ok(fs::try_exists(&path).await?)
    }
}
