use tracing::{debug, info, trace};

use crate::puzzle::Board;
use crate::solver::{ActionChoice, SolverConfig};

use super::metrics::TrainingMetrics;
use super::trainer::EpisodeOutcome;

/// One applied move, as seen by observers.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    pub episode: usize,
    pub step: usize,
    pub board: &'a Board,
    pub choice: ActionChoice,
    /// Position moved into the empty slot
    pub mv: usize,
    pub reward: f64,
    pub next_board: &'a Board,
}

/// Trait for observing training events; the presentation layer hooks in here.
pub trait TrainingObserver {
    /// Called once before the first episode
    fn on_training_start(&mut self, _episodes: usize, _config: &SolverConfig) {}

    /// Called when a freshly shuffled episode begins
    fn on_episode_start(&mut self, _episode: usize, _board: &Board, _exploration_rate: f64) {}

    /// Called after every learning update
    fn on_step(&mut self, _event: &StepEvent<'_>) {}

    /// Called when an episode is solved, truncated or aborted
    fn on_episode_finished(&mut self, _outcome: &EpisodeOutcome) {}

    /// Called once after the last episode
    fn on_training_finished(&mut self, _metrics: &TrainingMetrics) {}
}

/// Logs training progress through `tracing`.
pub struct DefaultObserver {
    episodes: usize,
}

impl DefaultObserver {
    pub fn new() -> Self {
        Self { episodes: 0 }
    }
}

impl Default for DefaultObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingObserver for DefaultObserver {
    fn on_training_start(&mut self, episodes: usize, config: &SolverConfig) {
        self.episodes = episodes;
        info!("Training started");
        info!("- grid: {}x{}", config.side, config.side);
        info!("- episodes: {}", episodes);
        info!(
            "- alpha: {}, gamma: {}, exploration: {} (decay {}, min {})",
            config.learning_rate,
            config.discount_factor,
            config.initial_exploration,
            config.exploration_decay,
            config.min_exploration
        );
    }

    fn on_episode_start(&mut self, episode: usize, board: &Board, exploration_rate: f64) {
        debug!(
            "Episode {} start (exploration {:.4}):\n{}",
            episode + 1,
            exploration_rate,
            board.render_ascii()
        );
    }

    fn on_step(&mut self, event: &StepEvent<'_>) {
        trace!(
            "episode {} step {}: {:?} -> move {} (reward {})",
            event.episode + 1,
            event.step,
            event.choice,
            event.mv,
            event.reward
        );
    }

    fn on_episode_finished(&mut self, outcome: &EpisodeOutcome) {
        info!(
            "Episode {}/{}, {} in {} steps, Exploration Rate: {:.2}",
            outcome.episode + 1,
            self.episodes,
            outcome.status.as_str(),
            outcome.steps,
            outcome.exploration_rate
        );
    }

    fn on_training_finished(&mut self, metrics: &TrainingMetrics) {
        info!(
            "Training finished: {} episodes, {} solved, {} truncated, {} table entries",
            metrics.episodes, metrics.solved, metrics.truncated, metrics.table_size
        );
    }
}

/// Fans every event out to a list of observers.
pub struct CompositeObserver {
    observers: Vec<Box<dyn TrainingObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Box<dyn TrainingObserver>>) -> Self {
        Self { observers }
    }

    pub fn push(&mut self, observer: Box<dyn TrainingObserver>) {
        self.observers.push(observer);
    }
}

impl TrainingObserver for CompositeObserver {
    fn on_training_start(&mut self, episodes: usize, config: &SolverConfig) {
        for observer in &mut self.observers {
            observer.on_training_start(episodes, config);
        }
    }

    fn on_episode_start(&mut self, episode: usize, board: &Board, exploration_rate: f64) {
        for observer in &mut self.observers {
            observer.on_episode_start(episode, board, exploration_rate);
        }
    }

    fn on_step(&mut self, event: &StepEvent<'_>) {
        for observer in &mut self.observers {
            observer.on_step(event);
        }
    }

    fn on_episode_finished(&mut self, outcome: &EpisodeOutcome) {
        for observer in &mut self.observers {
            observer.on_episode_finished(outcome);
        }
    }

    fn on_training_finished(&mut self, metrics: &TrainingMetrics) {
        for observer in &mut self.observers {
            observer.on_training_finished(metrics);
        }
    }
}
