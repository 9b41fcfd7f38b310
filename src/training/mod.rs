//! Training driver for the Q-learning solver.
//!
//! ```text
//! PuzzleEnv::reset  ->  Board::legal_moves  ->  QLearningSolver::select_action
//!        ^                                               |
//!        |                                               v
//!  decay_exploration  <-  QLearningSolver::update  <-  PuzzleEnv::step (reward)
//! ```
//!
//! Everything runs on one thread. A stop flag is checked between steps, so
//! a transition is either fully applied and learned from, or not started.

pub mod env;
pub mod metrics;
pub mod observer;
pub mod trainer;

pub use env::{EnvConfig, PuzzleEnv, StepInfo, StepResult};
pub use metrics::{CsvLogger, EvaluationMetrics, MovingAverage, SolvabilityStats, TrainingMetrics};
pub use observer::{CompositeObserver, DefaultObserver, StepEvent, TrainingObserver};
pub use trainer::{EpisodeOutcome, EpisodeStatus, Trainer, TrainingReport};
