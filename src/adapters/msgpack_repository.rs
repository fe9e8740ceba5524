//! MessagePack implementation of the table repository.
//!
//! This adapter implements the TableRepository port using rmp_serde for
//! compact binary serialization. Floats are written as 64-bit values, so a
//! load returns exactly what was saved.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{
    Result,
    error::Error,
    grid::GridLayout,
    ports::TableRepository,
    q_learning::{QTable, SavedQTable},
};

/// MessagePack-based table repository.
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a failed save never leaves a truncated table behind.
///
/// # Examples
///
/// ```no_run
/// use rescue::adapters::MsgPackRepository;
/// use rescue::config::LearningConfig;
/// use rescue::grid::Level;
/// use rescue::ports::TableRepository;
/// use rescue::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let layout = Level::Easy.layout();
/// let table = QTable::new(LearningConfig::default());
///
/// repo.save(&table, &layout, Path::new("q_table_easy.msgpack"))?;
/// let loaded = repo.load(&layout, Path::new("q_table_easy.msgpack"))?;
/// # Ok::<(), rescue::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_table(saved: &SavedQTable, tmp: &Path) -> Result<()> {
    let file = File::create(tmp).map_err(|source| Error::Io {
        operation: format!("create file {}", tmp.display()),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    rmp_serde::encode::write(&mut writer, saved).map_err(|e| Error::Io {
        operation: format!("write table to {}", tmp.display()),
        source: std::io::Error::other(e),
    })?;
    writer.flush().map_err(|source| Error::Io {
        operation: format!("flush {}", tmp.display()),
        source,
    })
}

impl TableRepository for MsgPackRepository {
    fn save(&self, table: &QTable, layout: &GridLayout, path: &Path) -> Result<()> {
        let saved = SavedQTable::from_table(table, layout);
        let tmp = temp_path(path);

        let written = write_table(&saved, &tmp).and_then(|()| {
            fs::rename(&tmp, path).map_err(|source| Error::Io {
                operation: format!("move table into place at {}", path.display()),
                source,
            })
        });
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written?;

        info!(
            "saved Q-table for '{}' ({} states) to {}",
            layout.name(),
            table.size(),
            path.display()
        );
        Ok(())
    }

    fn load(&self, layout: &GridLayout, path: &Path) -> Result<QTable> {
        let file = File::open(path).map_err(|e| Error::TableMissing {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let saved: SavedQTable = rmp_serde::decode::from_read(BufReader::new(file))
            .map_err(|e| {
                warn!("rejecting corrupt Q-table {}: {e}", path.display());
                Error::TableMissing {
                    path: path.to_path_buf(),
                    reason: format!("corrupt table file: {e}"),
                }
            })?;

        let table = saved.to_table(layout, path).inspect_err(|e| warn!("{e}"))?;
        info!(
            "loaded Q-table for '{}' ({} states) from {}",
            layout.name(),
            table.size(),
            path.display()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::LearningConfig,
        grid::{Action, Level},
    };

    fn sample_table() -> QTable {
        let mut table = QTable::new(LearningConfig::default());
        let start = Level::Easy.layout().initial_state();
        table.set(start, Action::Up, -1.75);
        table.set(start, Action::Left, 0.1 + 0.2);
        table
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("q_table_easy.msgpack");
        let layout = Level::Easy.layout();
        let table = sample_table();

        let repo = MsgPackRepository::new();
        repo.save(&table, &layout, &file_path).expect("Failed to save");
        let loaded = repo.load(&layout, &file_path).expect("Failed to load");

        assert_eq!(loaded, table);
        assert!(!temp_path(&file_path).exists());
    }

    #[test]
    fn test_resave_produces_identical_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.msgpack");
        let second = temp_dir.path().join("second.msgpack");
        let layout = Level::Easy.layout();
        let repo = MsgPackRepository::new();

        repo.save(&sample_table(), &layout, &first).unwrap();
        let loaded = repo.load(&layout, &first).unwrap();
        repo.save(&loaded, &layout, &second).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_load_nonexistent_returns_table_missing() {
        let repo = MsgPackRepository::new();
        let result = repo.load(
            &Level::Easy.layout(),
            Path::new("/tmp/nonexistent_rescue_12345.msgpack"),
        );
        assert!(matches!(result, Err(Error::TableMissing { .. })));
    }

    #[test]
    fn test_load_corrupt_file_fails_loudly() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("broken.msgpack");
        fs::write(&file_path, b"definitely not messagepack").unwrap();

        let result = MsgPackRepository::new().load(&Level::Easy.layout(), &file_path);
        assert!(matches!(result, Err(Error::TableMissing { .. })));
    }

    #[test]
    fn test_load_truncated_file_fails_loudly() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("truncated.msgpack");
        let layout = Level::Easy.layout();
        let repo = MsgPackRepository::new();
        repo.save(&sample_table(), &layout, &file_path).unwrap();

        let bytes = fs::read(&file_path).unwrap();
        fs::write(&file_path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(matches!(
            repo.load(&layout, &file_path),
            Err(Error::TableMissing { .. })
        ));
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A directory at the target makes the final rename fail after the
        // temporary file has been fully written.
        let target = temp_dir.path().join("occupied.msgpack");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        let result = MsgPackRepository::new().save(&sample_table(), &Level::Easy.layout(), &target);
        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(!temp_path(&target).exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_save_to_invalid_path_returns_io_error() {
        let repo = MsgPackRepository::new();
        let result = repo.save(
            &sample_table(),
            &Level::Easy.layout(),
            Path::new("/invalid_dir_12345/q_table.msgpack"),
        );
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
