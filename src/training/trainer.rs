//! Episode loop driving the Q-learning solver over shuffled boards

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;

use crate::solver::{QLearningSolver, SolverError};

use super::env::PuzzleEnv;
use super::metrics::{EvaluationMetrics, TrainingMetrics};
use super::observer::{StepEvent, TrainingObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    Solved,
    /// Hit the environment's step limit
    Truncated,
    /// Stopped through the trainer's stop flag
    Aborted,
}

impl EpisodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeStatus::Solved => "solved",
            EpisodeStatus::Truncated => "truncated",
            EpisodeStatus::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EpisodeOutcome {
    pub episode: usize,
    pub status: EpisodeStatus,
    pub steps: usize,
    pub solvable: bool,
    pub total_reward: f64,
    /// Exploration rate after the end-of-episode decay
    pub exploration_rate: f64,
    pub table_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub solved: usize,
    pub truncated: usize,
    pub aborted: bool,
    pub exploration_rate: f64,
    pub table_size: usize,
}

/// Runs training episodes against a solver borrowed for the whole run.
pub struct Trainer<'a> {
    solver: &'a mut QLearningSolver,
    env: PuzzleEnv,
    rng: StdRng,
    observer: Box<dyn TrainingObserver>,
    metrics: TrainingMetrics,
    stop: Arc<AtomicBool>,
    log_interval: usize,
}

impl<'a> Trainer<'a> {
    /// Fails when the solver and the environment disagree on the grid side.
    pub fn new(
        solver: &'a mut QLearningSolver,
        env: PuzzleEnv,
        rng: StdRng,
        observer: impl TrainingObserver + 'static,
    ) -> Result<Self, SolverError> {
        if solver.config().side != env.side() {
            return Err(SolverError::SideMismatch {
                solver: solver.config().side,
                env: env.side(),
            });
        }
        Ok(Self {
            solver,
            env,
            rng,
            observer: Box::new(observer),
            metrics: TrainingMetrics::default(),
            stop: Arc::new(AtomicBool::new(false)),
            log_interval: 100,
        })
    }

    /// Log a metrics summary every `interval` episodes; 0 disables it.
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    /// Setting the returned flag stops training between two steps.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn train(&mut self, episodes: usize) -> Result<TrainingReport, SolverError> {
        self.observer.on_training_start(episodes, self.solver.config());

        let mut aborted = false;
        for episode in 0..episodes {
            if self.stop_requested() {
                aborted = true;
                break;
            }

            let outcome = self.run_episode(episode)?;
            self.metrics.record_episode(&outcome);
            self.observer.on_episode_finished(&outcome);

            if outcome.status == EpisodeStatus::Aborted {
                aborted = true;
                break;
            }
            if self.log_interval > 0 && (episode + 1) % self.log_interval == 0 {
                self.metrics.log_to_console();
            }
        }

        self.observer.on_training_finished(&self.metrics);

        Ok(TrainingReport {
            episodes: self.metrics.episodes,
            solved: self.metrics.solved,
            truncated: self.metrics.truncated,
            aborted,
            exploration_rate: self.solver.exploration_rate(),
            table_size: self.solver.table_len(),
        })
    }

    /// One episode from a fresh shuffle. The exploration rate decays once at
    /// the end unless the episode was aborted.
    pub fn run_episode(&mut self, episode: usize) -> Result<EpisodeOutcome, SolverError> {
        self.env.reset(&mut self.rng)?;
        self.observer.on_episode_start(
            episode,
            self.env.board(),
            self.solver.exploration_rate(),
        );

        let mut total_reward = 0.0;
        let status = loop {
            if self.env.board().is_solved() {
                break EpisodeStatus::Solved;
            }
            if self.stop_requested() {
                break EpisodeStatus::Aborted;
            }

            let board = self.env.board().clone();
            let moves = board.legal_moves();
            let Some(choice) = self.solver.select_action(&board, &moves) else {
                break EpisodeStatus::Solved;
            };
            let mv = moves[choice.index()];

            let result = self.env.step(mv)?;
            self.solver
                .update(&board, choice.index(), result.reward, &result.board)?;
            total_reward += result.reward;

            self.observer.on_step(&StepEvent {
                episode,
                step: result.info.steps,
                board: &board,
                choice,
                mv,
                reward: result.reward,
                next_board: &result.board,
            });

            if result.truncated {
                break EpisodeStatus::Truncated;
            }
        };

        let exploration_rate = if status == EpisodeStatus::Aborted {
            self.solver.exploration_rate()
        } else {
            self.solver.decay_exploration()
        };

        Ok(EpisodeOutcome {
            episode,
            status,
            steps: self.env.steps(),
            solvable: self.env.is_solvable(),
            total_reward,
            exploration_rate,
            table_size: self.solver.table_len(),
        })
    }

    /// Greedy rollouts with no learning and no exploration, each capped at
    /// `max_steps` moves.
    pub fn evaluate(
        &mut self,
        episodes: usize,
        max_steps: usize,
    ) -> Result<EvaluationMetrics, SolverError> {
        let mut metrics = EvaluationMetrics::new();

        for _ in 0..episodes {
            if self.stop_requested() {
                break;
            }
            self.env.reset(&mut self.rng)?;

            while !self.env.board().is_solved() && self.env.steps() < max_steps {
                let moves = self.env.legal_moves();
                let Some(&mv) = self
                    .solver
                    .greedy_action(self.env.board())
                    .and_then(|index| moves.get(index))
                else {
                    break;
                };
                self.env.step(mv)?;
            }

            metrics.record_episode(
                self.env.steps(),
                self.env.board().is_solved(),
                self.env.is_solvable(),
            );
        }

        Ok(metrics)
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn solver(&self) -> &QLearningSolver {
        &*self.solver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::ShuffleMode;
    use crate::solver::SolverConfig;
    use crate::training::env::EnvConfig;
    use crate::training::observer::DefaultObserver;
    use rand::SeedableRng;
    use std::cell::{OnceCell, RefCell};
    use std::rc::Rc;

    fn walk_env(max_steps: Option<usize>) -> PuzzleEnv {
        let config = EnvConfig {
            shuffle: ShuffleMode::RandomWalk(6),
            max_steps,
            ..EnvConfig::default()
        };
        PuzzleEnv::new(2, config).unwrap()
    }

    struct Recorder {
        outcomes: Rc<RefCell<Vec<EpisodeOutcome>>>,
        steps: Rc<RefCell<usize>>,
    }

    impl TrainingObserver for Recorder {
        fn on_step(&mut self, _event: &StepEvent<'_>) {
            *self.steps.borrow_mut() += 1;
        }

        fn on_episode_finished(&mut self, outcome: &EpisodeOutcome) {
            self.outcomes.borrow_mut().push(outcome.clone());
        }
    }

    #[test]
    fn test_training_solves_solvable_boards() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(2), 1).unwrap();
        let mut trainer = Trainer::new(
            &mut solver,
            walk_env(Some(10_000)),
            StdRng::seed_from_u64(2),
            DefaultObserver::new(),
        )
        .unwrap()
        .with_log_interval(0);

        let report = trainer.train(50).unwrap();
        assert_eq!(report.episodes, 50);
        assert_eq!(report.solved, 50);
        assert!(!report.aborted);
        assert!(report.table_size > 0);

        let expected_rate = 0.8 * 0.995f64.powi(50);
        assert!((trainer.solver().exploration_rate() - expected_rate).abs() < 1e-9);
    }

    #[test]
    fn test_observer_sees_every_step_and_episode() {
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let steps = Rc::new(RefCell::new(0));
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(2), 3).unwrap();
        let recorder = Recorder {
            outcomes: Rc::clone(&outcomes),
            steps: Rc::clone(&steps),
        };
        let mut trainer =
            Trainer::new(&mut solver, walk_env(None), StdRng::seed_from_u64(4), recorder)
                .unwrap()
                .with_log_interval(0);

        trainer.train(5).unwrap();

        let outcomes = outcomes.borrow();
        assert_eq!(outcomes.len(), 5);
        let total: usize = outcomes.iter().map(|o| o.steps).sum();
        assert_eq!(*steps.borrow(), total);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.episode, i);
            assert_eq!(outcome.status, EpisodeStatus::Solved);
            if outcome.steps > 0 {
                assert!((outcome.total_reward - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_truncated_episodes_still_decay() {
        let env_config = EnvConfig {
            shuffle: ShuffleMode::Uniform,
            max_steps: Some(3),
            ..EnvConfig::default()
        };
        let env = PuzzleEnv::new(3, env_config).unwrap();
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(3), 5).unwrap();
        let mut trainer = Trainer::new(
            &mut solver,
            env,
            StdRng::seed_from_u64(6),
            DefaultObserver::new(),
        )
        .unwrap()
        .with_log_interval(0);

        let report = trainer.train(4).unwrap();
        assert_eq!(report.episodes, 4);
        assert_eq!(report.solved + report.truncated, 4);
        assert!((report.exploration_rate - 0.8 * 0.995f64.powi(4)).abs() < 1e-9);
    }

    #[test]
    fn test_stop_flag_aborts_without_decay() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(2), 7).unwrap();
        let mut trainer = Trainer::new(
            &mut solver,
            walk_env(None),
            StdRng::seed_from_u64(8),
            DefaultObserver::new(),
        )
        .unwrap();
        trainer.stop_handle().store(true, Ordering::Relaxed);

        let report = trainer.train(10).unwrap();
        assert!(report.aborted);
        assert_eq!(report.episodes, 0);
        assert!((trainer.solver().exploration_rate() - 0.8).abs() < 1e-12);
    }

    /// Raises the trainer's stop flag from inside the first step.
    struct StopOnFirstStep {
        stop: Rc<OnceCell<Arc<AtomicBool>>>,
        outcomes: Rc<RefCell<Vec<EpisodeOutcome>>>,
    }

    impl TrainingObserver for StopOnFirstStep {
        fn on_step(&mut self, _event: &StepEvent<'_>) {
            if let Some(stop) = self.stop.get() {
                stop.store(true, Ordering::Relaxed);
            }
        }

        fn on_episode_finished(&mut self, outcome: &EpisodeOutcome) {
            self.outcomes.borrow_mut().push(outcome.clone());
        }
    }

    #[test]
    fn test_stop_during_episode_aborts_without_decay() {
        let stop = Rc::new(OnceCell::new());
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let observer = StopOnFirstStep {
            stop: Rc::clone(&stop),
            outcomes: Rc::clone(&outcomes),
        };
        // A uniform 4x4 shuffle is never one move from solved in practice.
        let env = PuzzleEnv::new(4, EnvConfig::default()).unwrap();
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(4), 11).unwrap();
        let mut trainer = Trainer::new(&mut solver, env, StdRng::seed_from_u64(12), observer)
            .unwrap()
            .with_log_interval(0);
        stop.set(trainer.stop_handle()).unwrap();

        let report = trainer.train(10).unwrap();

        assert!(report.aborted);
        assert_eq!(report.episodes, 1);
        assert_eq!(report.solved, 0);
        let outcomes = outcomes.borrow();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, EpisodeStatus::Aborted);
        assert_eq!(outcomes[0].steps, 1);
        assert_eq!(outcomes[0].exploration_rate, 0.8);
        assert_eq!(trainer.solver().exploration_rate(), 0.8);
        assert_eq!(trainer.solver().table_len(), 2);
    }

    #[test]
    fn test_mismatched_sides_rejected() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(3), 13).unwrap();
        let result = Trainer::new(
            &mut solver,
            walk_env(None),
            StdRng::seed_from_u64(14),
            DefaultObserver::new(),
        );
        assert_eq!(
            result.err(),
            Some(SolverError::SideMismatch { solver: 3, env: 2 })
        );
    }

    #[test]
    fn test_evaluate_after_training() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(2), 9).unwrap();
        let mut trainer = Trainer::new(
            &mut solver,
            walk_env(Some(10_000)),
            StdRng::seed_from_u64(10),
            DefaultObserver::new(),
        )
        .unwrap()
        .with_log_interval(0);

        trainer.train(300).unwrap();
        let metrics = trainer.evaluate(20, 50).unwrap();

        assert_eq!(metrics.num_episodes, 20);
        assert_eq!(metrics.solvability_stats[&true].attempts, 20);
        assert!(metrics.num_solved <= 20);
    }
}
