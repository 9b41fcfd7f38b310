pub mod config;
pub mod puzzle;
pub mod session;
pub mod solver;
pub mod training;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use puzzle::{Board, Position, PuzzleError, ShuffleMode};
pub use session::GameSession;
pub use solver::{ActionChoice, QLearningSolver, SolverConfig, SolverError};
pub use training::{DefaultObserver, EnvConfig, PuzzleEnv, Trainer, TrainingObserver};
