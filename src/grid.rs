//! Search and rescue grid world

pub mod action;
pub mod environment;
pub mod layout;
pub mod state;

pub use action::Action;
pub use environment::{GridEnvironment, StepEvent, StepOutcome};
pub use layout::{Cell, GridLayout, Level, VictimKind};
pub use state::{Position, State, VictimSet};
