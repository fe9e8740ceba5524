//! Subcommands of the `rescue` binary

pub mod mission;
pub mod train;

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::grid::{GridLayout, Level};

/// Pick the custom layout file when given, otherwise the level's built-in grid.
pub(crate) fn resolve_layout(level: Option<Level>, layout: Option<&Path>) -> Result<GridLayout> {
    match (layout, level) {
        (Some(path), _) => GridLayout::from_file(path)
            .with_context(|| format!("Failed to load layout {}", path.display())),
        (None, Some(level)) => Ok(level.layout()),
        (None, None) => bail!("either --level or --layout is required"),
    }
}
