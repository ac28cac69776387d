//! End-to-end training, evaluation and persistence behaviour

mod common;

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use tempfile::TempDir;
use ttt_qlearning::{
    Error,
    adapters::{InMemoryRepository, MsgPackRepository},
    pipeline::{
        EvaluationConfig, OpponentMode, SeatPolicy, StopSignal, TrainingConfig, TrainingPipeline,
        evaluate_against_random, train,
    },
    ports::{EpisodeReport, Observer},
    q_learning::QLearningAgent,
    tictactoe::{BoardState, Player},
};

fn quiet(config: TrainingConfig) -> TrainingConfig {
    TrainingConfig {
        log_interval: 0,
        ..config
    }
}

struct EpsilonRecorder(Arc<Mutex<Vec<f64>>>);

impl Observer for EpsilonRecorder {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> ttt_qlearning::Result<()> {
        self.0.lock().unwrap().push(report.epsilon);
        Ok(())
    }
}

type RecordedMove = (BoardState, usize, bool);

struct MoveRecorder(Arc<Mutex<Vec<RecordedMove>>>);

impl Observer for MoveRecorder {
    fn on_move(
        &mut self,
        _episode: usize,
        state: &BoardState,
        action: usize,
        by_agent: bool,
    ) -> ttt_qlearning::Result<()> {
        self.0.lock().unwrap().push((*state, action, by_agent));
        Ok(())
    }
}

struct StopAfter {
    episodes: usize,
    signal: StopSignal,
}

impl Observer for StopAfter {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> ttt_qlearning::Result<()> {
        if report.episode + 1 == self.episodes {
            self.signal.stop();
        }
        Ok(())
    }
}

#[test]
fn untrained_greedy_agent_against_random_does_not_crash() {
    let agent = QLearningAgent::default();
    let config = EvaluationConfig {
        seed: Some(2024),
        ..EvaluationConfig::default()
    };
    let result = evaluate_against_random(&agent, &config).unwrap();

    assert_eq!(result.episodes, 200);
    assert_eq!(result.wins + result.losses + result.draws, 200);
    assert!(
        result.win_rate > 0.2 && result.win_rate < 0.95,
        "win rate {} not in the range of tie-broken play",
        result.win_rate
    );
}

#[test]
fn epsilon_reaches_end_exactly_on_final_episode() {
    let epsilons = Arc::new(Mutex::new(Vec::new()));
    let config = quiet(TrainingConfig {
        episode_count: 37,
        epsilon_start: 0.8,
        epsilon_end: 0.1,
        seed: Some(5),
        ..TrainingConfig::default()
    });

    let mut agent = config.build_agent();
    TrainingPipeline::new(config)
        .with_observer(Box::new(EpsilonRecorder(epsilons.clone())))
        .run(&mut agent)
        .unwrap();

    let epsilons = epsilons.lock().unwrap();
    assert_eq!(epsilons.len(), 37);
    assert_eq!(epsilons[0], 0.8);
    assert_eq!(*epsilons.last().unwrap(), 0.1);
    assert!(epsilons[..36].iter().all(|&e| e > 0.1));
    assert!(epsilons.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn losses_are_charged_to_the_learners_last_move() {
    // The first seed whose single episode ends in a loss for X.
    let (agent, moves) = (0..200)
        .find_map(|seed| {
            let moves = Arc::new(Mutex::new(Vec::new()));
            let config = quiet(TrainingConfig {
                episode_count: 1,
                opponent_mode: OpponentMode::Random,
                seat: SeatPolicy::X,
                seed: Some(seed),
                ..TrainingConfig::default()
            });
            let mut agent = config.build_agent();
            let result = TrainingPipeline::new(config)
                .with_observer(Box::new(MoveRecorder(moves.clone())))
                .run(&mut agent)
                .unwrap();
            let moves = moves.lock().unwrap().clone();
            (result.losses == 1).then_some((agent, moves))
        })
        .expect("no losing episode in 200 seeds");

    let agent_moves: Vec<_> = moves.iter().filter(|(_, _, by_agent)| *by_agent).collect();
    let (last_state, last_action, _) = *agent_moves[agent_moves.len() - 1];
    let (_, _, last_by_agent) = moves[moves.len() - 1];
    assert!(!last_by_agent, "the opponent must make the winning move");

    let alpha = agent.learning_rate();
    assert_eq!(agent.q_value(&last_state, last_action), -alpha);

    // Earlier moves bootstrap from an all-zero table, so they stay at zero.
    for &&(state, action, _) in &agent_moves[..agent_moves.len() - 1] {
        assert!(agent.q_table().contains(&state, action));
        assert_eq!(agent.q_value(&state, action), 0.0);
    }

    // Only the learner's transitions are stored.
    assert_eq!(agent.stats().q_table_size, agent_moves.len());
    let negative: Vec<_> = agent
        .q_table()
        .entries()
        .filter(|(_, _, value)| *value < 0.0)
        .map(|(state, action, _)| (*state, action))
        .collect();
    assert_eq!(negative, vec![(last_state, last_action)]);
}

#[test]
fn training_against_random_beats_random() {
    let config = quiet(TrainingConfig {
        episode_count: 20_000,
        opponent_mode: OpponentMode::Random,
        seat: SeatPolicy::X,
        seed: Some(3),
        ..TrainingConfig::default()
    });
    let mut agent = config.build_agent();
    train(&mut agent, &config).unwrap();

    let evaluation = evaluate_against_random(
        &agent,
        &EvaluationConfig {
            episodes: 500,
            agent_player: Player::X,
            seed: Some(99),
        },
    )
    .unwrap();

    assert!(evaluation.win_rate > 0.7, "{evaluation:?}");
    assert!(evaluation.loss_rate < 0.15, "{evaluation:?}");
}

#[test]
fn self_play_learns_both_seats() {
    let config = quiet(TrainingConfig {
        episode_count: 2_000,
        seat: SeatPolicy::Alternate,
        seed: Some(8),
        ..TrainingConfig::default()
    });
    let mut agent = config.build_agent();
    let result = train(&mut agent, &config).unwrap();

    assert_eq!(result.total_episodes, 2_000);
    assert_eq!(agent.training_episodes(), 2_000);
    let entries: Vec<_> = agent.q_table().entries().collect();
    assert!(entries.iter().any(|(s, _, _)| s.to_move() == Player::X));
    assert!(entries.iter().any(|(s, _, _)| s.to_move() == Player::O));
}

#[test]
fn stop_signal_returns_partial_result() {
    let signal = StopSignal::new();
    let config = quiet(TrainingConfig {
        episode_count: 100,
        seed: Some(1),
        ..TrainingConfig::default()
    });
    let mut agent = config.build_agent();
    let result = TrainingPipeline::new(config)
        .with_stop_signal(signal.clone())
        .with_observer(Box::new(StopAfter {
            episodes: 10,
            signal,
        }))
        .run(&mut agent)
        .unwrap();

    assert!(result.stopped_early);
    assert_eq!(result.total_episodes, 10);
    assert_eq!(agent.training_episodes(), 10);
}

#[test]
fn save_load_preserves_greedy_choices() {
    let config = quiet(TrainingConfig {
        episode_count: 3_000,
        seed: Some(21),
        ..TrainingConfig::default()
    });
    let mut agent = config.build_agent();
    train(&mut agent, &config).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("agent.msgpack");
    agent.save(&MsgPackRepository, &path).unwrap();
    let restored = QLearningAgent::load(&MsgPackRepository, &path).unwrap();

    assert_eq!(restored.stats(), agent.stats());
    assert_eq!(restored.learning_rate(), agent.learning_rate());
    assert_eq!(restored.discount_factor(), agent.discount_factor());

    for state in common::decision_states() {
        let legal = state.legal_actions();
        assert_eq!(
            restored.greedy_action(&state, &legal).unwrap(),
            agent.greedy_action(&state, &legal).unwrap(),
            "greedy choice differs for {}",
            state.encode()
        );
        for &action in &legal {
            assert_eq!(restored.q_value(&state, action), agent.q_value(&state, action));
        }
    }
}

#[test]
fn resumed_training_keeps_counting_episodes() {
    let repo = InMemoryRepository::new();
    let config = quiet(TrainingConfig {
        episode_count: 50,
        seed: Some(4),
        ..TrainingConfig::default()
    });
    let mut agent = config.build_agent();
    train(&mut agent, &config).unwrap();
    agent.save(&repo, Path::new("run")).unwrap();

    let mut resumed = QLearningAgent::load(&repo, Path::new("run")).unwrap();
    train(&mut resumed, &config).unwrap();
    assert_eq!(resumed.training_episodes(), 100);
    assert!(resumed.stats().q_table_size >= agent.stats().q_table_size);
}

#[test]
fn damaged_snapshot_is_reported_as_corrupt() {
    let repo = InMemoryRepository::new();
    repo.insert_raw(Path::new("bad"), b"not a snapshot".to_vec());
    assert!(matches!(
        QLearningAgent::load(&repo, Path::new("bad")),
        Err(Error::CorruptSnapshot { .. })
    ));

    assert!(matches!(
        QLearningAgent::load(&repo, Path::new("missing")),
        Err(Error::Io { .. })
    ));
}
