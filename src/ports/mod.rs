//! Ports (trait boundaries) for external dependencies.
//!
//! The training pipeline and the agent talk to persistence and to training
//! observers only through these traits.

pub mod learner;
pub mod observer;
pub mod repository;

pub use learner::{Learner, Transition};
pub use observer::{EpisodeOutcome, EpisodeSummary, Observer};
pub use repository::TableRepository;
