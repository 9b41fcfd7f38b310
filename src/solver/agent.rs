use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::puzzle::Board;

use super::config::SolverConfig;
use super::error::SolverError;
use super::table::{ActionValueTable, argmax};

/// Outcome of epsilon-greedy selection: an index into the legal-move list,
/// tagged with how it was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionChoice {
    Explore(usize),
    Exploit(usize),
}

impl ActionChoice {
    pub fn index(&self) -> usize {
        match *self {
            ActionChoice::Explore(i) | ActionChoice::Exploit(i) => i,
        }
    }

    pub fn is_exploration(&self) -> bool {
        matches!(self, ActionChoice::Explore(_))
    }
}

/// Tabular Q-learning agent for the sliding puzzle.
pub struct QLearningSolver {
    config: SolverConfig,
    table: ActionValueTable,
    exploration_rate: f64,
    rng: StdRng,
}

impl QLearningSolver {
    pub fn new(config: SolverConfig) -> Result<Self, SolverError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_seed(config: SolverConfig, seed: u64) -> Result<Self, SolverError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: SolverConfig, rng: StdRng) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self {
            exploration_rate: config.initial_exploration,
            config,
            table: ActionValueTable::new(),
            rng,
        })
    }

    /// Epsilon-greedy choice among `legal_moves`. Returns `None` when there
    /// is nothing to choose from.
    pub fn select_action(&mut self, board: &Board, legal_moves: &[usize]) -> Option<ActionChoice> {
        if legal_moves.is_empty() {
            return None;
        }

        let values = self.table.entry(board);
        debug_assert_eq!(
            values.len(),
            legal_moves.len(),
            "legal moves do not belong to this board"
        );

        if self.rng.random::<f64>() < self.exploration_rate {
            let index = self.rng.random_range(0..legal_moves.len());
            tracing::trace!("explore: action {} of {}", index, legal_moves.len());
            return Some(ActionChoice::Explore(index));
        }

        let index = argmax(values.as_slice()).unwrap_or(0);
        tracing::trace!("exploit: action {} of {}", index, legal_moves.len());
        Some(ActionChoice::Exploit(index))
    }

    /// Best known action for `board` without exploring or touching the table.
    /// Unseen configurations resolve to the first legal move.
    pub fn greedy_action(&self, board: &Board) -> Option<usize> {
        match self.table.get(board) {
            Some(values) => argmax(values),
            None if board.legal_moves().is_empty() => None,
            None => Some(0),
        }
    }

    /// One-step Q-learning update:
    /// `Q[s][a] += alpha * (reward + gamma * max(Q[s']) - Q[s][a])`.
    pub fn update(
        &mut self,
        board: &Board,
        action_index: usize,
        reward: f64,
        next_board: &Board,
    ) -> Result<(), SolverError> {
        let next_max = self.table.max_value(next_board);
        let alpha = self.config.learning_rate;
        let gamma = self.config.discount_factor;

        let values = self.table.entry(board);
        let actions = values.len();
        let value = values
            .get_mut(action_index)
            .ok_or(SolverError::ActionOutOfRange {
                action_index,
                actions,
            })?;

        let td_target = reward + gamma * next_max;
        let td_error = td_target - *value;
        *value += alpha * td_error;

        tracing::trace!(
            "update: action {} reward {} target {:.4} -> q {:.4}",
            action_index,
            reward,
            td_target,
            *value
        );
        Ok(())
    }

    /// Geometric decay of the exploration rate, floored at the minimum.
    /// Called once per completed episode.
    pub fn decay_exploration(&mut self) -> f64 {
        self.exploration_rate = (self.exploration_rate * self.config.exploration_decay)
            .max(self.config.min_exploration);
        self.exploration_rate
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn q_values(&self, board: &Board) -> Option<&[f64]> {
        self.table.get(board)
    }

    pub fn table(&self) -> &ActionValueTable {
        &self.table
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(tiles: &[usize]) -> Board {
        Board::from_tiles(2, tiles.to_vec()).unwrap()
    }

    fn greedy_config() -> SolverConfig {
        SolverConfig {
            initial_exploration: 0.0,
            min_exploration: 0.0,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_update_from_fresh_table() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::default(), 1).unwrap();
        let state = board(&[0, 1, 3, 2]);
        let solved = board(&[0, 1, 2, 3]);

        solver.update(&state, 0, 1.0, &solved).unwrap();

        let q = solver.q_values(&state).unwrap();
        assert!((q[0] - 0.1).abs() < 1e-12);
        assert_eq!(solver.q_values(&solved), Some(&[0.0, 0.0][..]));
        assert_eq!(solver.table_len(), 2);
    }

    #[test]
    fn test_update_shrinks_distance_to_target() {
        let config = SolverConfig {
            learning_rate: 0.3,
            discount_factor: 0.5,
            ..SolverConfig::default()
        };
        let mut solver = QLearningSolver::with_seed(config, 2).unwrap();
        let state = board(&[0, 3, 2, 1]);
        let next = board(&[3, 0, 2, 1]);

        solver.update(&next, 1, 2.0, &state).unwrap();
        solver.update(&state, 1, 0.0, &next).unwrap();
        let before = solver.q_values(&state).unwrap()[0];
        let target = 1.0 + 0.5 * solver.q_values(&next).unwrap()[1];

        solver.update(&state, 0, 1.0, &next).unwrap();
        let after = solver.q_values(&state).unwrap()[0];

        let expected = (target - before).abs() * (1.0 - 0.3);
        assert!(((target - after).abs() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_update_rejects_out_of_range_action() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::default(), 3).unwrap();
        let state = board(&[0, 3, 2, 1]);
        let err = solver.update(&state, 2, 1.0, &board(&[0, 1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            SolverError::ActionOutOfRange {
                action_index: 2,
                actions: 2
            }
        );
    }

    #[test]
    fn test_exploit_picks_first_maximum() {
        let mut solver = QLearningSolver::with_seed(greedy_config(), 4).unwrap();
        let state = board(&[0, 3, 2, 1]);
        let moves = state.legal_moves();

        assert_eq!(
            solver.select_action(&state, &moves),
            Some(ActionChoice::Exploit(0))
        );

        let solved = board(&[0, 1, 2, 3]);
        solver.update(&state, 1, 1.0, &solved).unwrap();
        assert_eq!(
            solver.select_action(&state, &moves),
            Some(ActionChoice::Exploit(1))
        );
        assert_eq!(solver.greedy_action(&state), Some(1));
    }

    #[test]
    fn test_select_action_creates_entry() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::default(), 5).unwrap();
        let state = board(&[3, 0, 2, 1]);
        let moves = state.legal_moves();
        assert!(solver.q_values(&state).is_none());

        let choice = solver.select_action(&state, &moves).unwrap();
        assert!(choice.index() < moves.len());
        assert_eq!(solver.q_values(&state).map(|q| q.len()), Some(moves.len()));
    }

    #[test]
    fn test_full_exploration_covers_all_actions() {
        let config = SolverConfig {
            initial_exploration: 1.0,
            ..SolverConfig::default()
        };
        let mut solver = QLearningSolver::with_seed(config, 6).unwrap();
        let state = Board::from_tiles(3, vec![0, 1, 2, 3, 8, 5, 6, 7, 4]).unwrap();
        let moves = state.legal_moves();

        let mut seen = [false; 4];
        for _ in 0..200 {
            let choice = solver.select_action(&state, &moves).unwrap();
            assert!(choice.is_exploration());
            seen[choice.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "legal moves do not belong to this board")]
    fn test_select_action_rejects_foreign_moves() {
        let mut solver = QLearningSolver::with_seed(greedy_config(), 10).unwrap();
        let corner = Board::solved(3).unwrap();
        solver.select_action(&corner, &[1, 3, 5, 7]);
    }

    #[test]
    fn test_select_action_without_moves() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::with_side(1), 7).unwrap();
        let single = Board::solved(1).unwrap();
        assert_eq!(solver.select_action(&single, &[]), None);
        assert_eq!(solver.greedy_action(&single), None);
    }

    #[test]
    fn test_decay_converges_to_minimum() {
        let mut solver = QLearningSolver::with_seed(SolverConfig::default(), 8).unwrap();
        let mut previous = solver.exploration_rate();
        for _ in 0..5000 {
            let rate = solver.decay_exploration();
            assert!(rate <= previous);
            assert!(rate >= 0.01);
            previous = rate;
        }
        assert!((solver.exploration_rate() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig {
            exploration_decay: 0.0,
            ..SolverConfig::default()
        };
        assert!(QLearningSolver::with_seed(config, 9).is_err());
    }
}
