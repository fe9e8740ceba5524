//! Greedy playback of a trained table

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    grid::{Action, GridEnvironment, State, StepEvent},
    q_learning::QLearningAgent,
};

/// How a mission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Everyone rescued and the exit reached
    Succeeded,
    /// The robot walked into fire
    Failed,
    /// The step cap ran out, usually because the policy loops
    TimedOut,
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionStatus::Succeeded => f.write_str("Mission Succeeded!"),
            MissionStatus::Failed => f.write_str("Mission Failed!"),
            MissionStatus::TimedOut => f.write_str("Mission Timed Out"),
        }
    }
}

/// Record of a single greedy episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub layout: String,
    pub status: MissionStatus,
    /// Every state visited, starting with the initial one
    pub states: Vec<State>,
    pub actions: Vec<Action>,
    pub total_reward: f64,
    pub rescued: usize,
    pub victims: usize,
}

impl MissionReport {
    pub fn steps(&self) -> usize {
        self.actions.len()
    }
}

/// Run one episode following the agent's greedy policy.
///
/// The agent is only read; playback never changes the table.
pub fn run_mission(
    agent: &QLearningAgent,
    env: &mut GridEnvironment,
    max_steps: usize,
) -> Result<MissionReport> {
    let mut state = env.reset();
    let mut report = MissionReport {
        layout: env.layout().name().to_string(),
        status: MissionStatus::TimedOut,
        states: vec![state],
        actions: Vec::new(),
        total_reward: 0.0,
        rescued: 0,
        victims: env.layout().victims().len(),
    };

    info!("starting mission on '{}'", report.layout);
    for _ in 0..max_steps {
        let action = agent.greedy_action(&state);
        let step = env.step(action)?;
        debug!("{action} -> {} ({:?}, reward {})", step.state, step.event, step.reward);

        report.actions.push(action);
        report.states.push(step.state);
        report.total_reward += step.reward;
        state = step.state;

        match step.event {
            StepEvent::Rescued => report.rescued += 1,
            StepEvent::Escaped => report.status = MissionStatus::Succeeded,
            StepEvent::Burned => report.status = MissionStatus::Failed,
            StepEvent::Bump | StepEvent::Moved => {}
        }
        if step.done {
            break;
        }
    }

    info!(
        "{} after {} steps: rescued {}/{}, reward {:.1}",
        report.status,
        report.steps(),
        report.rescued,
        report.victims,
        report.total_reward
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ExplorationSchedule, LearningConfig, RewardConfig},
        grid::{GridLayout, Position},
    };

    fn untrained() -> QLearningAgent {
        QLearningAgent::new(LearningConfig::default(), ExplorationSchedule::constant(0.0))
    }

    #[test]
    fn test_untrained_agent_times_out_bumping() {
        // Greedy ties pick Up; from the top row that is a bump every step.
        let layout = GridLayout::parse("row", "E.S\n").unwrap();
        let mut env = GridEnvironment::new(layout, RewardConfig::default());
        let report = run_mission(&untrained(), &mut env, 5).unwrap();

        assert_eq!(report.status, MissionStatus::TimedOut);
        assert_eq!(report.steps(), 5);
        assert_eq!(report.total_reward, 5.0 * RewardConfig::default().bump);
        assert!(report.states.iter().all(|s| s.position == Position::new(0, 2)));
    }

    #[test]
    fn test_scripted_table_succeeds() {
        let layout = GridLayout::parse("row", "EvS\n").unwrap();
        let mut env = GridEnvironment::new(layout.clone(), RewardConfig::default());
        let mut agent = untrained();

        let start = layout.initial_state();
        let after_rescue = State::new(Position::new(0, 1), start.remaining.without(0));
        agent.update(start, Action::Left, 1.0, &start, true);
        agent.update(after_rescue, Action::Left, 1.0, &after_rescue, true);

        let report = run_mission(&agent, &mut env, 10).unwrap();
        assert_eq!(report.status, MissionStatus::Succeeded);
        assert_eq!(report.actions, vec![Action::Left, Action::Left]);
        assert_eq!(report.rescued, 1);
        assert_eq!(report.victims, 1);
        let rewards = RewardConfig::default();
        assert_eq!(report.total_reward, rewards.stranded_victim + rewards.exit);
    }

    #[test]
    fn test_playback_does_not_modify_table() {
        let layout = GridLayout::parse("fire", "EFS\n").unwrap();
        let mut env = GridEnvironment::new(layout, RewardConfig::default());
        let mut agent = untrained();
        let start = env.reset();
        agent.update(start, Action::Left, 1.0, &start, true);
        let before = agent.q_table().clone();

        let report = run_mission(&agent, &mut env, 10).unwrap();
        assert_eq!(report.status, MissionStatus::Failed);
        assert_eq!(agent.q_table(), &before);
    }
}
