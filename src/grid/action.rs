//! The four directional moves available in every state

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A directional move on the grid
///
/// The set is closed and identical across all states. The declaration order
/// is the enumeration order used for greedy tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Number of actions
    pub const COUNT: usize = 4;

    /// All actions in enumeration order
    pub const ALL: [Action; Action::COUNT] =
        [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Index of this action in [`Action::ALL`]
    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }

    /// Look up an action by its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] if `index` is not in `0..Action::COUNT`.
    pub fn from_index(index: usize) -> Result<Self, Error> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or_else(|| Error::InvalidAction {
                value: index.to_string(),
            })
    }

    /// Row/column displacement of this move (row 0 is the top row)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Action::from_index(index)
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Action::Up),
            "down" | "d" => Ok(Action::Down),
            "left" | "l" => Ok(Action::Left),
            "right" | "r" => Ok(Action::Right),
            other => Err(Error::InvalidAction {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
