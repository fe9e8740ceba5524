//! Command-line interface for training rescue robots and replaying missions

pub mod commands;
pub mod output;
