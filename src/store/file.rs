//! File-backed resource store (spec.md §4.B, §6): one JSON file per
//! resource under a base directory. Writes are atomic (write-to-temp,
//! rename), grounded in the teacher's `src/api/db.rs` discipline of
//! creating the backing directory lazily and never leaving a torn file on
//! disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ld::Resource;

use super::{filename_for_id, ResourceStore, StoreError};

pub struct FileStore {
    base_dir: PathBuf,
    /// Serializes writes so concurrent `put`s can't race on the same
    /// temp-file name; reads never take this lock.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", filename_for_id(id)))
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

fn is_not_found(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::NotFound
}

#[async_trait]
impl ResourceStore for FileStore {
    async fn get(&self, id: &str) -> Result<Option<Resource>, StoreError> {
        let path = self.path_for(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let resource = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                Ok(Some(resource))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    async fn put(&self, id: &str, resource: Resource) -> Result<(), StoreError> {
        self.ensure_dir().await?;
        let _guard = self.write_lock.lock().await;

        let path = self.path_for(id);
        let tmp_path = path.with_extension("json.tmp");
        let bytes =
            serde_json::to_vec_pretty(&resource).map_err(|e| StoreError::Serde(e.to_string()))?;

        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_dir().await?;
        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(bytes) = tokio::fs::read(&path).await {
                    if let Ok(resource) = serde_json::from_slice::<Resource>(&bytes) {
                        ids.push(resource.id);
                    }
                }
            }
        }
        Ok(ids)
    }

    async fn find_by_type(&self, ty: &str) -> Result<Vec<Resource>, StoreError> {
        self.ensure_dir().await?;
        let mut out = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(bytes) = tokio::fs::read(&path).await {
                    if let Ok(resource) = serde_json::from_slice::<Resource>(&bytes) {
                        if resource.is_of_type(ty) {
                            out.push(resource);
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

#[allow(dead_code)]
fn base_dir_ref(store: &FileStore) -> &Path {
    &store.base_dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = std::env::temp_dir().join(format!("hyprcat-test-{}", uuid::Uuid::new_v4()));
        let store = FileStore::new(&dir);
        let r = Resource::new("did:web:example.com:a", vec!["schema:Thing".into()]);
        store.put(&r.id, r.clone()).await.unwrap();
        let got = store.get(&r.id).await.unwrap().unwrap();
        assert_eq!(got.id, r.id);
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn missing_file_returns_none() {
        let dir = std::env::temp_dir().join(format!("hyprcat-test-{}", uuid::Uuid::new_v4()));
        let store = FileStore::new(&dir);
        assert!(store.get("https://x/missing").await.unwrap().is_none());
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
