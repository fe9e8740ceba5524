use rescue::{
    Action, ExplorationSchedule, GridEnvironment, GridLayout, LearningConfig, Level,
    QLearningAgent, RewardConfig,
    pipeline::{TrainingConfig, TrainingPipeline},
};
use tempfile::tempdir;

fn agent(seed: u64) -> QLearningAgent {
    QLearningAgent::new(LearningConfig::default(), ExplorationSchedule::default()).with_seed(seed)
}

#[test]
fn same_seed_gives_identical_tables() {
    let run = |seed| {
        let mut env = GridEnvironment::new(Level::Hard.layout(), RewardConfig::default());
        let mut agent = agent(seed);
        agent.train(&mut env, 50).unwrap();
        agent.q_table().clone()
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn saved_table_reloads_exactly_and_plays_greedily() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join(Level::Hard.table_file_name());
    let layout = Level::Hard.layout();
    let mut env = GridEnvironment::new(layout.clone(), RewardConfig::default());
    let mut trained = agent(5);
    trained.train(&mut env, 200).unwrap();
    trained.save(&path, &layout).unwrap();

    let loaded = QLearningAgent::load(&path, &layout).unwrap();
    assert_eq!(loaded.q_table(), trained.q_table());
    assert_eq!(loaded.epsilon(), 0.0);

    let start = layout.initial_state();
    assert_eq!(loaded.greedy_action(&start), trained.greedy_action(&start));
}

#[test]
fn unreachable_exit_truncates_every_episode() {
    let layout = GridLayout::parse("walled", "E#.\n##S\n").unwrap();
    let mut env = GridEnvironment::new(layout, RewardConfig::default());
    let mut agent = agent(2);
    let config = TrainingConfig {
        episodes: 20,
        max_steps_per_episode: 15,
        ..TrainingConfig::default()
    };

    let result = TrainingPipeline::new(config).run(&mut agent, &mut env).unwrap();
    assert_eq!(result.truncations, 20);
    assert_eq!(result.successes, 0);
    assert_eq!(result.success_rate, 0.0);
}

#[test]
fn fire_next_to_start_is_avoided() {
    let mut env = GridEnvironment::new(Level::Easy.layout(), RewardConfig::default());
    let mut agent = agent(11);
    agent.train(&mut env, 500).unwrap();

    // The start cell's left neighbour is on fire.
    let start = Level::Easy.layout().initial_state();
    assert!(agent.q_table().get(&start, Action::Left) < 0.0);
    assert_ne!(agent.greedy_action(&start), Action::Left);
}
