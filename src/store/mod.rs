//! Resource store (spec.md §4.B): the resource store exclusively owns
//! resources; everything else holds IRIs and dereferences through it.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::ld::Resource;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

/// Any backend must provide this interface (spec.md §4.B).
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Resource>, StoreError>;
    async fn put(&self, id: &str, resource: Resource) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
    async fn list(&self) -> Result<Vec<String>, StoreError>;
    async fn find_by_type(&self, ty: &str) -> Result<Vec<Resource>, StoreError>;
}

pub use file::FileStore;
pub use memory::MemoryStore;

/// URL-encodes an id with `%` replaced by `_` so it is filesystem-safe
/// (spec.md §4.B, §6).
pub fn filename_for_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("_{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_escapes_percent_with_underscore_convention() {
        let name = filename_for_id("did:web:example.com/a b");
        assert!(!name.contains('%'));
        assert!(!name.contains('/'));
        assert!(!name.contains(' '));
    }
}
