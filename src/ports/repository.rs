//! Repository port for Q-table persistence.

use std::path::Path;

use crate::{Result, grid::GridLayout, q_learning::QTable};

/// Port for persisting and loading trained Q-tables.
///
/// A table is always stored together with the layout it was trained on, and
/// loading checks that the stored layout matches.
///
/// # Examples
///
/// ```no_run
/// use rescue::adapters::MsgPackRepository;
/// use rescue::grid::Level;
/// use rescue::ports::TableRepository;
/// use std::path::Path;
///
/// let layout = Level::Easy.layout();
/// let table = MsgPackRepository::new().load(&layout, Path::new("q_table_easy.msgpack"))?;
/// # Ok::<(), rescue::Error>(())
/// ```
pub trait TableRepository {
    /// Save a table trained on `layout` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be created or written.
    fn save(&self, table: &QTable, layout: &GridLayout, path: &Path) -> Result<()>;

    /// Load the table stored at `path` for `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TableMissing`] if the file does not exist,
    /// cannot be read, is corrupted, or belongs to a different layout.
    fn load(&self, layout: &GridLayout, path: &Path) -> Result<QTable>;
}
