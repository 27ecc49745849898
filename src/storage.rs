//! Flat-file persistence for mock entities
//!
//! Every entity is kept as two sibling files in the data directory: a JSON
//! metadata artifact (`<id>.meta.json`) and the raw response body (`<id>.body`).

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::domain::entity::{Identifier, MockEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Metadata,
    Body,
}

impl Artifact {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Metadata => "meta.json",
            Self::Body => "body",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Body => "body",
        }
    }

    pub fn file_name(self, identifier: &Identifier) -> String {
        format!("{identifier}.{}", self.extension())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{path} does not exist: {source}")]
    NotFound {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode mock metadata: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub fn from_io(action: &'static str, path: &Path, source: io::Error) -> Self {
        let path = path.display().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path, source }
        } else {
            Self::Io {
                action,
                path,
                source,
            }
        }
    }
}

#[async_trait]
pub trait MockStore: Send + Sync {
    async fn read_resource(
        &self,
        identifier: &Identifier,
        artifact: Artifact,
    ) -> Result<Vec<u8>, StorageError>;

    /// Creates or replaces both artifacts. The identifier is derived from the
    /// entity's method and URI and returned to the caller.
    async fn write_entity(
        &self,
        entity: &MockEntity,
        body: &[u8],
    ) -> Result<Identifier, StorageError>;

    async fn remove(&self, identifier: &Identifier, artifact: Artifact)
        -> Result<(), StorageError>;

    /// Identifiers of every stored metadata artifact, sorted.
    async fn list(&self) -> Result<Vec<Identifier>, StorageError>;
}

#[derive(Debug)]
pub struct LocalFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFileStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|err| StorageError::from_io("create", &root, err))?;

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, identifier: &Identifier, artifact: Artifact) -> PathBuf {
        self.root.join(artifact.file_name(identifier))
    }

    // Readers see either the old or the new file, never a partial write.
    async fn replace_file(
        &self,
        identifier: &Identifier,
        artifact: Artifact,
        contents: &[u8],
    ) -> Result<(), StorageError> {
        let target = self.path_for(identifier, artifact);
        let staging = self
            .root
            .join(format!(".{}.tmp", artifact.file_name(identifier)));

        fs::write(&staging, contents)
            .await
            .map_err(|err| StorageError::from_io("write", &staging, err))?;

        if let Err(err) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::Io {
                action: "replace",
                path: target.display().to_string(),
                source: err,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl MockStore for LocalFileStore {
    async fn read_resource(
        &self,
        identifier: &Identifier,
        artifact: Artifact,
    ) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(identifier, artifact);
        fs::read(&path)
            .await
            .map_err(|err| StorageError::from_io("read", &path, err))
    }

    async fn write_entity(
        &self,
        entity: &MockEntity,
        body: &[u8],
    ) -> Result<Identifier, StorageError> {
        let identifier = entity.identifier();
        let metadata = serde_json::to_vec_pretty(entity)?;

        let _guard = self.write_lock.lock().await;
        self.replace_file(&identifier, Artifact::Metadata, &metadata)
            .await?;
        self.replace_file(&identifier, Artifact::Body, body).await?;
        debug!(identifier = %identifier, bytes = body.len(), "mock artifacts written");

        Ok(identifier)
    }

    async fn remove(
        &self,
        identifier: &Identifier,
        artifact: Artifact,
    ) -> Result<(), StorageError> {
        let path = self.path_for(identifier, artifact);
        let _guard = self.write_lock.lock().await;
        fs::remove_file(&path)
            .await
            .map_err(|err| StorageError::from_io("remove", &path, err))
    }

    async fn list(&self) -> Result<Vec<Identifier>, StorageError> {
        let suffix = format!(".{}", Artifact::Metadata.extension());
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|err| StorageError::from_io("list", &self.root, err))?;

        let mut identifiers = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| StorageError::from_io("list", &self.root, err))?
        {
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(suffix.as_str()))
            else {
                continue;
            };

            if let Ok(identifier) = Identifier::parse(stem) {
                identifiers.push(identifier);
            }
        }

        identifiers.sort();
        Ok(identifiers)
    }
}
