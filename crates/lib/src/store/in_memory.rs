//! In-memory session store.

use std::fs;
use std::path::Path;
use std::sync::RwLock;

use crate::node::Node;
use crate::store::{SessionStore, StoreError};

/// A simple in-memory store holding the node array behind an `RwLock`.
///
/// This store is suitable for testing, for host environments without a
/// session-scoped medium, or where persistence is handled externally by
/// saving/loading the whole state to a file via
/// [`save_to_file`](Self::save_to_file) and
/// [`load_from_file`](Self::load_from_file).
#[derive(Debug, Default)]
pub struct InMemory {
    nodes: RwLock<Vec<Node>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves the stored node array to a file as JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let nodes = self.nodes.read().unwrap();
        let json = serde_json::to_string_pretty(&*nodes)
            .map_err(|source| StoreError::SerializationFailed { source })?;
        fs::write(path, json).map_err(|source| StoreError::FileIo { source })
    }

    /// Loads a node array previously written by
    /// [`save_to_file`](Self::save_to_file).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path).map_err(|source| StoreError::FileIo { source })?;
        let nodes: Vec<Node> = serde_json::from_str(&json)
            .map_err(|source| StoreError::DeserializationFailed { source })?;
        Ok(Self {
            nodes: RwLock::new(nodes),
        })
    }
}

impl SessionStore for InMemory {
    fn save(&self, nodes: &[Node]) -> Result<(), StoreError> {
        *self.nodes.write().unwrap() = nodes.to_vec();
        Ok(())
    }

    fn restore(&self) -> Result<Vec<Node>, StoreError> {
        Ok(self.nodes.read().unwrap().clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.nodes.write().unwrap().clear();
        Ok(())
    }
}
