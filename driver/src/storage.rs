use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use kernel::interface::storage::CoverStorage;
use kernel::prelude::entity::BookCover;
use kernel::KernelError;

use crate::env_or;

const COVER_STORAGE_DIR: &str = "COVER_STORAGE_DIR";

/// Cover images kept as plain files in one directory, named by asset id.
#[derive(Debug, Clone)]
pub struct LocalCoverStorage {
    root: PathBuf,
}

impl LocalCoverStorage {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        let root = env_or(COVER_STORAGE_DIR, PathBuf::from("./covers"))?;
        Ok(Self::at(root))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, asset_id: &str) -> Option<PathBuf> {
        // asset ids are file names, never paths
        Path::new(asset_id)
            .file_name()
            .map(|name| self.root.join(name))
    }
}

#[async_trait::async_trait]
impl CoverStorage for LocalCoverStorage {
    async fn remove(&self, cover: &BookCover) -> error_stack::Result<(), KernelError> {
        let Some(path) = cover.asset_id().as_deref().and_then(|id| self.locate(id)) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("removed cover asset {}", path.display());
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(Report::from(error))
                .change_context(KernelError::Internal)
                .attach_printable_lazy(|| format!("Failed to remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::storage::CoverStorage;
    use kernel::prelude::entity::BookCover;

    use super::LocalCoverStorage;

    fn scratch_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("covers-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn removes_owned_asset() {
        let dir = scratch_dir();
        std::fs::write(dir.join("cover.png"), b"png").unwrap();
        let storage = LocalCoverStorage::at(&dir);

        let cover = BookCover::new("/covers/cover.png", Some("cover.png".to_string()));
        storage.remove(&cover).await.unwrap();
        assert!(!dir.join("cover.png").exists());

        // already gone
        storage.remove(&cover).await.unwrap();
    }

    #[tokio::test]
    async fn ignores_external_urls_and_paths() {
        let dir = scratch_dir();
        std::fs::write(dir.join("keep.png"), b"png").unwrap();
        let storage = LocalCoverStorage::at(dir.join("nested"));

        let external = BookCover::new("https://example.com/cover.png", None);
        storage.remove(&external).await.unwrap();

        let escaping = BookCover::new("x", Some("../keep.png".to_string()));
        storage.remove(&escaping).await.unwrap();
        assert!(dir.join("keep.png").exists());
    }
}
