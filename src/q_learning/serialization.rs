//! Persisted form of a trained Q-table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::LearningConfig,
    grid::{Cell, GridLayout, State, VictimSet},
    q_learning::q_table::{ActionValues, QTable},
};

/// One stored table row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub state: State,
    pub values: ActionValues,
}

/// Versioned, layout-tagged snapshot of a Q-table.
///
/// Entries are sorted by state so the same table always encodes to the same
/// bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQTable {
    pub version: u32,
    pub layout: String,
    pub fingerprint: String,
    pub learning: LearningConfig,
    pub entries: Vec<SavedEntry>,
}

impl SavedQTable {
    pub const VERSION: u32 = 1;

    pub fn from_table(table: &QTable, layout: &GridLayout) -> Self {
        Self {
            version: Self::VERSION,
            layout: layout.name().to_string(),
            fingerprint: layout.fingerprint(),
            learning: *table.learning(),
            entries: table
                .sorted_entries()
                .into_iter()
                .map(|(state, values)| SavedEntry { state, values })
                .collect(),
        }
    }

    /// Rebuild the table after checking it belongs to `layout`.
    ///
    /// `source` only labels the error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableMissing`] on a version or layout mismatch, a
    /// non-finite value, or a state that cannot occur on `layout`: one off
    /// the walkable cells, in fire, naming unknown victims, or standing on a
    /// victim who has not been rescued.
    pub fn to_table(&self, layout: &GridLayout, source: &Path) -> Result<QTable> {
        let reject = |reason: String| Error::TableMissing {
            path: source.to_path_buf(),
            reason,
        };

        if self.version != Self::VERSION {
            return Err(reject(format!(
                "unsupported table format version {} (expected {})",
                self.version,
                Self::VERSION
            )));
        }
        if self.fingerprint != layout.fingerprint() {
            return Err(reject(format!(
                "table was trained on layout '{}', not '{}'",
                self.layout,
                layout.name()
            )));
        }
        let all_victims = VictimSet::all(layout.victims().len()).bits();
        for entry in &self.entries {
            let state = entry.state;
            if state.remaining.bits() & !all_victims != 0 {
                return Err(reject(format!("state {state} names unknown victims")));
            }
            match layout.cell(state.position) {
                None | Some(Cell::Wall) => {
                    return Err(reject(format!(
                        "state {state} is not a walkable cell of '{}'",
                        layout.name()
                    )));
                }
                // Fire ends the episode, so no decision is ever made there.
                Some(Cell::Fire) => {
                    return Err(reject(format!("state {state} stands in fire")));
                }
                Some(Cell::Victim(_)) => {
                    let waiting = layout
                        .victim_index(state.position)
                        .is_some_and(|i| state.remaining.contains(i));
                    if waiting {
                        return Err(reject(format!(
                            "state {state} stands on a victim who is still waiting"
                        )));
                    }
                }
                Some(_) => {}
            }
            if let Some(value) = entry.values.iter().find(|v| !v.is_finite()) {
                return Err(reject(format!("state {state} holds non-finite value {value}")));
            }
        }

        Ok(QTable::from_entries(
            self.learning,
            self.entries.iter().map(|e| (e.state, e.values)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Action, Level, Position};

    fn trained_table() -> QTable {
        let mut table = QTable::new(LearningConfig::default());
        let start = Level::Easy.layout().initial_state();
        table.set(start, Action::Up, -0.123_456_789_012_345_67);
        table.set(
            State::new(Position::new(2, 3), start.remaining.without(0)),
            Action::Left,
            1.0 / 3.0,
        );
        table
    }

    #[test]
    fn test_roundtrip_preserves_every_bit() {
        let layout = Level::Easy.layout();
        let table = trained_table();

        let saved = SavedQTable::from_table(&table, &layout);
        let bytes = rmp_serde::to_vec(&saved).unwrap();
        let decoded: SavedQTable = rmp_serde::from_slice(&bytes).unwrap();
        let restored = decoded.to_table(&layout, Path::new("memory")).unwrap();

        assert_eq!(restored, table);
        for (state, values) in table.sorted_entries() {
            for action in Action::ALL {
                assert_eq!(
                    restored.get(&state, action).to_bits(),
                    values[action.index()].to_bits()
                );
            }
        }

        let again = rmp_serde::to_vec(&SavedQTable::from_table(&restored, &layout)).unwrap();
        assert_eq!(again, bytes);
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let saved = SavedQTable::from_table(&trained_table(), &Level::Easy.layout());
        let err = saved
            .to_table(&Level::Hard.layout(), Path::new("q_table_easy.msgpack"))
            .unwrap_err();
        assert!(matches!(err, Error::TableMissing { .. }));
    }

    #[test]
    fn test_non_finite_value_is_rejected() {
        let layout = Level::Easy.layout();
        let mut saved = SavedQTable::from_table(&trained_table(), &layout);
        saved.entries[0].values[2] = f64::NAN;
        assert!(saved.to_table(&layout, Path::new("x")).is_err());
    }

    #[test]
    fn test_foreign_state_is_rejected() {
        let layout = Level::Easy.layout();
        let mut saved = SavedQTable::from_table(&trained_table(), &layout);
        saved.entries[0].state = State::new(Position::new(9, 9), VictimSet::all(2));
        assert!(saved.to_table(&layout, Path::new("x")).is_err());

        let mut saved = SavedQTable::from_table(&trained_table(), &layout);
        saved.entries[0].state.remaining = VictimSet::all(3);
        assert!(saved.to_table(&layout, Path::new("x")).is_err());
    }

    #[test]
    fn test_unreachable_states_are_rejected() {
        let layout = Level::Easy.layout();
        let all = VictimSet::all(2);

        let mut saved = SavedQTable::from_table(&trained_table(), &layout);
        saved.entries[0].state = State::new(Position::new(0, 2), all);
        assert!(matches!(
            saved.to_table(&layout, Path::new("x")),
            Err(Error::TableMissing { .. })
        ));

        // Victim 0 stands at (1, 1); being there with them still waiting is impossible.
        let mut saved = SavedQTable::from_table(&trained_table(), &layout);
        saved.entries[0].state = State::new(Position::new(1, 1), all);
        assert!(saved.to_table(&layout, Path::new("x")).is_err());

        let mut saved = SavedQTable::from_table(&trained_table(), &layout);
        saved.entries[0].state = State::new(Position::new(1, 1), all.without(0));
        assert!(saved.to_table(&layout, Path::new("x")).is_ok());
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let layout = Level::Easy.layout();
        let mut saved = SavedQTable::from_table(&trained_table(), &layout);
        saved.version = 99;
        assert!(saved.to_table(&layout, Path::new("x")).is_err());
    }
}
