//! World dynamics: transitions, rewards and terminal conditions

use serde::{Deserialize, Serialize};

use super::{
    action::Action,
    layout::{Cell, GridLayout},
    state::State,
};
use crate::{Error, Result, config::RewardConfig};

/// Which transition rule fired on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEvent {
    /// Blocked by a wall or the grid edge; the agent stays put
    Bump,
    /// Ordinary move
    Moved,
    /// Reached a victim and rescued them
    Rescued,
    /// Walked into fire; mission failed
    Burned,
    /// Reached the exit with everyone rescued; mission succeeded
    Escaped,
}

/// Result of a single environment step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: State,
    pub reward: f64,
    pub done: bool,
    pub event: StepEvent,
}

/// Grid world environment.
///
/// Holds the static layout, the reward table and the transient state of the
/// current episode.
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    layout: GridLayout,
    rewards: RewardConfig,
    state: State,
    done: bool,
}

impl GridEnvironment {
    pub fn new(layout: GridLayout, rewards: RewardConfig) -> Self {
        let state = layout.initial_state();
        Self {
            layout,
            rewards,
            state,
            done: false,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Put the agent back on the start cell with every victim waiting.
    pub fn reset(&mut self) -> State {
        self.state = self.layout.initial_state();
        self.done = false;
        self.state
    }

    /// Apply `action` to the current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpisodeFinished`] if the previous step was terminal.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome> {
        if self.done {
            return Err(Error::EpisodeFinished);
        }
        let outcome = self.peek(self.state, action);
        self.state = outcome.state;
        self.done = outcome.done;
        Ok(outcome)
    }

    /// Transition from an explicit `state` without touching the episode.
    pub fn peek(&self, state: State, action: Action) -> StepOutcome {
        let rows = self.layout.rows();
        let cols = self.layout.cols();
        let target = state
            .position
            .shifted(action, rows, cols)
            .and_then(|p| self.layout.cell(p).map(|cell| (p, cell)));

        let (position, cell) = match target {
            Some((_, Cell::Wall)) | None => {
                return StepOutcome {
                    state,
                    reward: self.rewards.bump,
                    done: false,
                    event: StepEvent::Bump,
                };
            }
            Some(hit) => hit,
        };

        let moved = State::new(position, state.remaining);
        match cell {
            Cell::Fire => StepOutcome {
                state: moved,
                reward: self.rewards.fire,
                done: true,
                event: StepEvent::Burned,
            },
            Cell::Victim(kind) => match self.layout.victim_index(position) {
                Some(index) if state.remaining.contains(index) => StepOutcome {
                    state: State::new(position, state.remaining.without(index)),
                    reward: self.rewards.rescue(kind),
                    done: false,
                    event: StepEvent::Rescued,
                },
                _ => self.ordinary_move(moved),
            },
            Cell::Exit if state.all_rescued() => StepOutcome {
                state: moved,
                reward: self.rewards.exit,
                done: true,
                event: StepEvent::Escaped,
            },
            _ => self.ordinary_move(moved),
        }
    }

    fn ordinary_move(&self, state: State) -> StepOutcome {
        StepOutcome {
            state,
            reward: self.rewards.step,
            done: false,
            event: StepEvent::Moved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Level, Position, VictimSet};

    fn env_for(text: &str) -> GridEnvironment {
        let layout = GridLayout::parse("test", text).unwrap();
        GridEnvironment::new(layout, RewardConfig::default())
    }

    #[test]
    fn test_reset_returns_start_with_all_victims() {
        let mut env = GridEnvironment::new(Level::Hard.layout(), RewardConfig::default());
        let state = env.reset();
        assert_eq!(state.position, Position::new(5, 5));
        assert_eq!(state.remaining, VictimSet::all(4));
    }

    #[test]
    fn test_bump_into_wall_keeps_state() {
        let mut env = env_for("E..\n.#S\n");
        let start = env.reset();
        let outcome = env.step(Action::Left).unwrap();
        assert_eq!(outcome.state, start);
        assert_eq!(outcome.reward, RewardConfig::default().bump);
        assert!(!outcome.done);
        assert_eq!(outcome.event, StepEvent::Bump);
    }

    #[test]
    fn test_bump_into_edge_keeps_state() {
        let mut env = env_for("E..\n..S\n");
        let start = env.reset();
        let outcome = env.step(Action::Down).unwrap();
        assert_eq!(outcome.state, start);
        assert_eq!(outcome.event, StepEvent::Bump);
        assert!(!outcome.done);
    }

    #[test]
    fn test_fire_terminates_regardless_of_victims() {
        let mut env = env_for("E.v\nF.S\n");
        env.reset();
        env.step(Action::Left).unwrap();
        let outcome = env.step(Action::Left).unwrap();
        assert!(outcome.done);
        assert_eq!(outcome.reward, RewardConfig::default().fire);
        assert_eq!(outcome.event, StepEvent::Burned);
        assert_eq!(outcome.state.remaining.len(), 1);
    }

    #[test]
    fn test_rescue_then_exit_succeeds() {
        let rewards = RewardConfig::default();
        let mut env = env_for("EVS\n");
        env.reset();

        let rescue = env.step(Action::Left).unwrap();
        assert_eq!(rescue.event, StepEvent::Rescued);
        assert_eq!(rescue.reward, rewards.endangered_victim);
        assert!(rescue.state.all_rescued());
        assert!(!rescue.done);

        let exit = env.step(Action::Left).unwrap();
        assert!(exit.done);
        assert_eq!(exit.reward, rewards.exit);
        assert_eq!(exit.event, StepEvent::Escaped);
    }

    #[test]
    fn test_exit_is_inert_while_victims_remain() {
        let mut env = env_for("vES\n");
        env.reset();
        let outcome = env.step(Action::Left).unwrap();
        assert!(!outcome.done);
        assert_eq!(outcome.reward, RewardConfig::default().step);
        assert_eq!(outcome.event, StepEvent::Moved);
        assert_eq!(outcome.state.position, Position::new(0, 1));
    }

    #[test]
    fn test_rescued_victim_cell_is_ordinary_floor() {
        let mut env = env_for("Ev.S\n");
        env.reset();
        env.step(Action::Left).unwrap();
        env.step(Action::Left).unwrap();
        env.step(Action::Right).unwrap();
        let outcome = env.step(Action::Left).unwrap();
        assert_eq!(outcome.event, StepEvent::Moved);
        assert_eq!(outcome.reward, RewardConfig::default().step);
    }

    #[test]
    fn test_step_after_terminal_is_rejected() {
        let mut env = env_for("ES\n");
        env.reset();
        assert!(env.step(Action::Left).unwrap().done);
        assert!(matches!(
            env.step(Action::Right),
            Err(Error::EpisodeFinished)
        ));
        env.reset();
        assert!(env.step(Action::Right).is_ok());
    }

    #[test]
    fn test_step_is_deterministic() {
        let env = GridEnvironment::new(Level::Hard.layout(), RewardConfig::default());
        let layout = env.layout().clone();
        for position in layout.walkable_positions() {
            let state = State::new(position, VictimSet::all(4).without(2));
            for action in Action::ALL {
                assert_eq!(env.peek(state, action), env.peek(state, action));
            }
        }

        let mut first = env.clone();
        let mut second = env.clone();
        first.reset();
        second.reset();
        for action in [Action::Left, Action::Left, Action::Left, Action::Up] {
            assert_eq!(first.step(action).unwrap(), second.step(action).unwrap());
        }
    }
}
