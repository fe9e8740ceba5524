//! Static grid layouts and the built-in mission levels

use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use super::state::{Position, State, VictimSet};
use crate::{Error, Result};

const EASY_LAYOUT: &str = "
E.FF
Fv..
..V.
..FS
";

const HARD_LAYOUT: &str = "
E.v.FF
...V.F
F.F...
F.V.FF
F..F..
F.v..S
";

/// Victim category; the kinds carry different rescue rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictimKind {
    /// Trapped next to the fire
    Endangered,
    /// Stranded away from the fire
    Stranded,
}

/// Kind of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Open,
    Wall,
    Fire,
    Victim(VictimKind),
    Exit,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Open => '.',
            Cell::Wall => '#',
            Cell::Fire => 'F',
            Cell::Victim(VictimKind::Endangered) => 'V',
            Cell::Victim(VictimKind::Stranded) => 'v',
            Cell::Exit => 'E',
        }
    }

    /// Parse a layout character. `S` marks the start cell, which is open.
    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | 'S' | 's' => Some(Cell::Open),
            '#' => Some(Cell::Wall),
            'F' | 'f' => Some(Cell::Fire),
            'V' => Some(Cell::Victim(VictimKind::Endangered)),
            'v' => Some(Cell::Victim(VictimKind::Stranded)),
            'E' | 'e' => Some(Cell::Exit),
            _ => None,
        }
    }
}

/// Immutable description of a mission grid.
///
/// Rescue progress is never written back into the layout; it is tracked by
/// the [`VictimSet`] carried in each [`State`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    name: String,
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Position,
    exit: Position,
    victims: Vec<(Position, VictimKind)>,
}

impl GridLayout {
    /// Parse a layout drawn as ASCII art.
    ///
    /// One line per row; blank lines and whitespace inside a line are
    /// ignored. `.` open, `#` wall, `F` fire, `V` endangered victim,
    /// `v` stranded victim, `E` exit, `S` start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] for unknown characters, ragged rows,
    /// a missing or duplicated start/exit, or more victims than
    /// [`VictimSet::CAPACITY`].
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut cells = Vec::new();
        let mut cols = None;
        let mut rows = 0;
        let mut start = None;
        let mut exit = None;
        let mut victims = Vec::new();

        for line in text.lines() {
            let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if chars.is_empty() {
                continue;
            }
            match cols {
                None => cols = Some(chars.len()),
                Some(expected) if expected != chars.len() => {
                    return Err(Error::InvalidLayout {
                        message: format!(
                            "row {rows} has {} cells, expected {expected}",
                            chars.len()
                        ),
                    });
                }
                Some(_) => {}
            }

            for (col, &c) in chars.iter().enumerate() {
                let position = Position::new(rows, col);
                let cell = Cell::from_char(c).ok_or_else(|| Error::InvalidLayout {
                    message: format!("unknown cell character '{c}' at {position}"),
                })?;
                if matches!(c, 'S' | 's') && start.replace(position).is_some() {
                    return Err(Error::InvalidLayout {
                        message: "more than one start cell".to_string(),
                    });
                }
                match cell {
                    Cell::Exit if exit.replace(position).is_some() => {
                        return Err(Error::InvalidLayout {
                            message: "more than one exit cell".to_string(),
                        });
                    }
                    Cell::Victim(kind) => victims.push((position, kind)),
                    _ => {}
                }
                cells.push(cell);
            }
            rows += 1;
        }

        let cols = cols.ok_or_else(|| Error::InvalidLayout {
            message: "layout is empty".to_string(),
        })?;
        let start = start.ok_or_else(|| Error::InvalidLayout {
            message: "no start cell ('S')".to_string(),
        })?;
        let exit = exit.ok_or_else(|| Error::InvalidLayout {
            message: "no exit cell ('E')".to_string(),
        })?;
        if victims.len() > VictimSet::CAPACITY {
            return Err(Error::InvalidLayout {
                message: format!(
                    "{} victims exceed the limit of {}",
                    victims.len(),
                    VictimSet::CAPACITY
                ),
            });
        }

        Ok(Self {
            name: name.to_string(),
            rows,
            cols,
            cells,
            start,
            exit,
            victims,
        })
    }

    /// Read and parse a layout file; the file stem becomes the layout name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read layout {}", path.display()),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Self::parse(&name, &text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn exit(&self) -> Position {
        self.exit
    }

    pub fn victims(&self) -> &[(Position, VictimKind)] {
        &self.victims
    }

    /// Cell at `position`, or `None` outside the grid
    pub fn cell(&self, position: Position) -> Option<Cell> {
        (position.row < self.rows && position.col < self.cols)
            .then(|| self.cells[position.row * self.cols + position.col])
    }

    /// Index of the victim standing at `position`, if any
    pub fn victim_index(&self, position: Position) -> Option<usize> {
        self.victims.iter().position(|(p, _)| *p == position)
    }

    /// State at the beginning of every episode
    pub fn initial_state(&self) -> State {
        State::new(self.start, VictimSet::all(self.victims.len()))
    }

    /// Every cell an agent may occupy (not a wall), row-major
    pub fn walkable_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
            .filter(|&p| !matches!(self.cell(p), Some(Cell::Wall)))
    }

    /// Canonical one-line encoding of the layout, used to check that a saved
    /// table belongs to this grid.
    pub fn fingerprint(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows);
        for row in 0..self.rows {
            if row > 0 {
                out.push('/');
            }
            for col in 0..self.cols {
                let position = Position::new(row, col);
                if position == self.start {
                    out.push('S');
                } else {
                    out.push(self.cells[row * self.cols + col].to_char());
                }
            }
        }
        out
    }

    /// Draw the grid with the agent (`R`) at `state`; rescued victims are
    /// drawn as open floor.
    pub fn render(&self, state: &State) -> String {
        let mut out = String::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let position = Position::new(row, col);
                let c = if position == state.position {
                    'R'
                } else {
                    match self.cells[row * self.cols + col] {
                        Cell::Victim(_)
                            if self
                                .victim_index(position)
                                .is_some_and(|i| !state.remaining.contains(i)) =>
                        {
                            '.'
                        }
                        cell => cell.to_char(),
                    }
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for GridLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&self.initial_state()).replace('R', "S"))
    }
}

/// Built-in mission levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Easy,
    Hard,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Hard => "hard",
        }
    }

    /// Layout of this level
    pub fn layout(self) -> GridLayout {
        let text = match self {
            Level::Easy => EASY_LAYOUT,
            Level::Hard => HARD_LAYOUT,
        };
        match GridLayout::parse(self.as_str(), text) {
            Ok(layout) => layout,
            Err(e) => unreachable!("built-in {self} layout is malformed: {e}"),
        }
    }

    /// Default file name for this level's trained table
    pub fn table_file_name(self) -> String {
        format!("q_table_{}.msgpack", self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Level::Easy),
            "hard" => Ok(Level::Hard),
            other => Err(Error::InvalidLevel {
                input: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easy_level_matches_mission() {
        let layout = Level::Easy.layout();
        assert_eq!((layout.rows(), layout.cols()), (4, 4));
        assert_eq!(layout.start(), Position::new(3, 3));
        assert_eq!(layout.exit(), Position::new(0, 0));
        assert_eq!(
            layout.victims(),
            &[
                (Position::new(1, 1), VictimKind::Stranded),
                (Position::new(2, 2), VictimKind::Endangered),
            ]
        );
        for fire in [(0, 2), (0, 3), (1, 0), (3, 2)] {
            assert_eq!(
                layout.cell(Position::new(fire.0, fire.1)),
                Some(Cell::Fire)
            );
        }
    }

    #[test]
    fn test_hard_level_matches_mission() {
        let layout = Level::Hard.layout();
        assert_eq!((layout.rows(), layout.cols()), (6, 6));
        assert_eq!(layout.start(), Position::new(5, 5));
        assert_eq!(layout.victims().len(), 4);
        let fires = layout
            .walkable_positions()
            .filter(|&p| layout.cell(p) == Some(Cell::Fire))
            .count();
        assert_eq!(fires, 11);
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = GridLayout::parse("bad", "E..\n.S").unwrap_err();
        assert!(matches!(err, Error::InvalidLayout { .. }));
    }

    #[test]
    fn test_parse_requires_start_and_exit() {
        assert!(GridLayout::parse("no-start", "E..\n...").is_err());
        assert!(GridLayout::parse("no-exit", "S..\n...").is_err());
        assert!(GridLayout::parse("two-exits", "E.E\n..S").is_err());
        assert!(GridLayout::parse("unknown", "E.?\n..S").is_err());
    }

    #[test]
    fn test_parse_accepts_spaced_rows_and_walls() {
        let layout = GridLayout::parse("walls", "E # .\n. # S\n").unwrap();
        assert_eq!(layout.cell(Position::new(0, 1)), Some(Cell::Wall));
        assert_eq!(layout.cell(Position::new(1, 2)), Some(Cell::Open));
        assert_eq!(layout.cell(Position::new(2, 0)), None);
        assert_eq!(layout.walkable_positions().count(), 4);
    }

    #[test]
    fn test_fingerprint_and_render() {
        let layout = Level::Easy.layout();
        assert_eq!(layout.fingerprint(), "E.FF/Fv../..V./..FS");

        let state = State::new(Position::new(2, 2), layout.initial_state().remaining.without(1));
        assert_eq!(layout.render(&state), "E.FF\nFv..\n..R.\n..F.\n");
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Hard".parse::<Level>().unwrap(), Level::Hard);
        assert!(matches!(
            "medium".parse::<Level>(),
            Err(Error::InvalidLevel { .. })
        ));
        assert_eq!(Level::Easy.table_file_name(), "q_table_easy.msgpack");
    }
}
