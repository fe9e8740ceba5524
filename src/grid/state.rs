//! Agent position and rescue progress

use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Action;

/// A cell coordinate; row 0 is the top row, column 0 the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbouring position in the direction of `action`, or `None` when it
    /// would leave a `rows` x `cols` grid.
    pub fn shifted(self, action: Action, rows: usize, cols: usize) -> Option<Position> {
        let (dr, dc) = action.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Position { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Bit set of victims still waiting for rescue, indexed by the layout's
/// victim order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct VictimSet(u32);

impl VictimSet {
    /// Largest number of victims a layout may hold
    pub const CAPACITY: usize = u32::BITS as usize;

    /// Set containing victims `0..count`.
    pub fn all(count: usize) -> Self {
        debug_assert!(count <= Self::CAPACITY);
        if count >= Self::CAPACITY {
            VictimSet(u32::MAX)
        } else {
            VictimSet((1u32 << count) - 1)
        }
    }

    pub fn contains(self, index: usize) -> bool {
        index < Self::CAPACITY && self.0 & (1 << index) != 0
    }

    /// Copy of this set with `index` removed
    pub fn without(self, index: usize) -> Self {
        if index < Self::CAPACITY {
            VictimSet(self.0 & !(1 << index))
        } else {
            self
        }
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Environment state: where the agent stands and who is still waiting.
///
/// Ordering is by position first, then by remaining victims, which gives the
/// persisted table a stable entry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State {
    pub position: Position,
    pub remaining: VictimSet,
}

impl State {
    pub fn new(position: Position, remaining: VictimSet) -> Self {
        Self {
            position,
            remaining,
        }
    }

    /// True once every victim has been rescued
    pub fn all_rescued(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} remaining={:#b}",
            self.position,
            self.remaining.bits()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_stays_inside_grid() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.shifted(Action::Up, 4, 4), None);
        assert_eq!(origin.shifted(Action::Left, 4, 4), None);
        assert_eq!(origin.shifted(Action::Down, 4, 4), Some(Position::new(1, 0)));

        let corner = Position::new(3, 3);
        assert_eq!(corner.shifted(Action::Right, 4, 4), None);
        assert_eq!(corner.shifted(Action::Down, 4, 4), None);
        assert_eq!(corner.shifted(Action::Up, 4, 4), Some(Position::new(2, 3)));
    }

    #[test]
    fn test_victim_set() {
        let set = VictimSet::all(3);
        assert_eq!(set.len(), 3);
        assert!(set.contains(0) && set.contains(2));
        assert!(!set.contains(3));

        let set = set.without(1);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(1));
        assert!(set.without(0).without(2).is_empty());
        assert!(VictimSet::all(0).is_empty());
    }
}
