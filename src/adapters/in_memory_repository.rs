//! In-memory table repository for testing.
//!
//! Tables are encoded exactly as on disk, so loading runs the same layout and
//! value checks as the MessagePack file adapter, without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result,
    error::Error,
    grid::GridLayout,
    ports::TableRepository,
    q_learning::{QTable, SavedQTable},
};

/// In-memory repository keyed by path.
///
/// # Examples
///
/// ```
/// use rescue::adapters::InMemoryRepository;
/// use rescue::config::LearningConfig;
/// use rescue::grid::Level;
/// use rescue::ports::TableRepository;
/// use rescue::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let layout = Level::Easy.layout();
/// let table = QTable::new(LearningConfig::default());
///
/// repo.save(&table, &layout, Path::new("q_table_easy.msgpack"))?;
/// let loaded = repo.load(&layout, Path::new("q_table_easy.msgpack"))?;
/// assert_eq!(loaded, table);
/// # Ok::<(), rescue::Error>(())
/// ```
///
/// # Thread Safety
///
/// Clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Check if a table is stored under the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }

    /// Drop all stored tables.
    pub fn clear(&self) {
        self.storage().clear();
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl TableRepository for InMemoryRepository {
    fn save(&self, table: &QTable, layout: &GridLayout, path: &Path) -> Result<()> {
        let saved = SavedQTable::from_table(table, layout);
        let bytes = rmp_serde::to_vec(&saved).map_err(|e| Error::Io {
            operation: format!("encode table for in-memory storage at {}", path.display()),
            source: std::io::Error::other(e),
        })?;
        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, layout: &GridLayout, path: &Path) -> Result<QTable> {
        let storage = self.storage();
        let bytes = storage
            .get(&key(path))
            .ok_or_else(|| Error::TableMissing {
                path: path.to_path_buf(),
                reason: "no table stored in memory".to_string(),
            })?;

        let saved: SavedQTable = rmp_serde::from_slice(bytes).map_err(|e| Error::TableMissing {
            path: path.to_path_buf(),
            reason: format!("corrupt table bytes: {e}"),
        })?;
        saved.to_table(layout, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::LearningConfig,
        grid::{Action, Level},
    };

    fn sample_table() -> QTable {
        let mut table = QTable::new(LearningConfig::default());
        table.set(Level::Hard.layout().initial_state(), Action::Left, -3.25);
        table
    }

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let layout = Level::Hard.layout();
        let path = Path::new("q_table_hard.msgpack");

        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&sample_table(), &layout, path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));
        assert_eq!(repo.load(&layout, path).unwrap(), sample_table());
    }

    #[test]
    fn test_load_nonexistent_returns_table_missing() {
        let repo = InMemoryRepository::new();
        let result = repo.load(&Level::Easy.layout(), Path::new("nonexistent"));
        assert!(matches!(result, Err(Error::TableMissing { .. })));
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let repo = InMemoryRepository::new();
        let path = Path::new("table");
        repo.save(&sample_table(), &Level::Hard.layout(), path).unwrap();
        assert!(matches!(
            repo.load(&Level::Easy.layout(), path),
            Err(Error::TableMissing { .. })
        ));
    }

    #[test]
    fn test_clone_shares_storage() {
        let first = InMemoryRepository::new();
        let second = first.clone();
        let layout = Level::Hard.layout();

        first.save(&sample_table(), &layout, Path::new("shared")).unwrap();
        assert_eq!(second.load(&layout, Path::new("shared")).unwrap(), sample_table());

        second.clear();
        assert_eq!(first.count(), 0);
    }
}
