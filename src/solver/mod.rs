//! Tabular Q-learning over full board configurations.
//!
//! The solver owns the action-value table and the decaying exploration
//! rate. It never applies moves itself: a driver asks the board for its
//! legal moves, asks the solver to pick one, applies it, and feeds the
//! transition back through [`QLearningSolver::update`].

mod agent;
mod config;
mod error;
mod table;

pub use agent::{ActionChoice, QLearningSolver};
pub use config::SolverConfig;
pub use error::SolverError;
pub use table::{ActionValueTable, argmax};
