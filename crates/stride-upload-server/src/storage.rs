use std::path::PathBuf;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// On-disk blob store. Every upload is one flat file under the storage
/// directory, keyed by its generated filename; this service is the only
/// writer, other services hold filename references.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("upload storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub async fn save_file(&self, filename: &str, data: &[u8]) -> Result<()> {
        let path = self.file_path(filename);
        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    /// Removes a stored blob. `false` when no such file existed, so the
    /// route can answer 404 instead of pretending the delete did work.
    pub async fn delete_file(&self, filename: &str) -> Result<bool> {
        let path = self.file_path(filename);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, filename: &str) -> bool {
        fs::try_exists(self.file_path(filename)).await.unwrap_or(false)
    }
}
