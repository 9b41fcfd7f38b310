//! Puzzle environment - reset/step interface for the episode loop

use rand::Rng;

use crate::puzzle::{Board, PuzzleError, ShuffleMode};

/// Environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    /// How boards are scrambled on reset
    pub shuffle: ShuffleMode,
    /// Step limit per episode; `None` runs until solved
    pub max_steps: Option<usize>,
    /// Reward for a move that produces the solved board
    pub solved_reward: f64,
    /// Reward for every other move
    pub unsolved_reward: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            shuffle: ShuffleMode::Uniform,
            max_steps: None,
            solved_reward: 1.0,
            unsolved_reward: 0.0,
        }
    }
}

/// Step result from the environment
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Board after the move
    pub board: Board,
    pub reward: f64,
    /// The board is solved
    pub done: bool,
    /// Hit the step limit without solving
    pub truncated: bool,
    pub info: StepInfo,
}

/// Additional information from a step
#[derive(Debug, Clone, Default)]
pub struct StepInfo {
    /// Steps taken this episode
    pub steps: usize,
    /// The position that was moved into the empty slot
    pub moved_from: usize,
    /// Whether the episode's starting board can be solved at all
    pub solvable: bool,
}

pub struct PuzzleEnv {
    side: usize,
    board: Board,
    config: EnvConfig,
    steps: usize,
    solvable: bool,
}

impl PuzzleEnv {
    pub fn new(side: usize, config: EnvConfig) -> Result<Self, PuzzleError> {
        let board = Board::solved(side)?;
        Ok(Self {
            side,
            board,
            config,
            steps: 0,
            solvable: true,
        })
    }

    /// Start a new episode from a freshly shuffled board.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&Board, PuzzleError> {
        let board = Board::shuffled(self.side, self.config.shuffle, rng)?;
        Ok(self.reset_with_board(board))
    }

    /// Start a new episode from a given board.
    pub fn reset_with_board(&mut self, board: Board) -> &Board {
        self.solvable = board.is_solvable();
        if !self.solvable {
            tracing::warn!(
                "Shuffled board cannot be solved by sliding moves:\n{}",
                board.render_ascii()
            );
        }
        self.board = board;
        self.steps = 0;
        &self.board
    }

    /// Apply the move at position `mv`; it must be one of `legal_moves()`.
    pub fn step(&mut self, mv: usize) -> Result<StepResult, PuzzleError> {
        let next = self.board.apply_move(mv)?;
        self.steps += 1;

        let done = next.is_solved();
        let reward = self.reward(&next);
        let truncated = !done && self.config.max_steps.is_some_and(|max| self.steps >= max);

        self.board = next.clone();

        Ok(StepResult {
            board: next,
            reward,
            done,
            truncated,
            info: StepInfo {
                steps: self.steps,
                moved_from: mv,
                solvable: self.solvable,
            },
        })
    }

    /// Sparse terminal reward: solved or not.
    pub fn reward(&self, board: &Board) -> f64 {
        if board.is_solved() {
            self.config.solved_reward
        } else {
            self.config.unsolved_reward
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn legal_moves(&self) -> Vec<usize> {
        self.board.legal_moves()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_solvable(&self) -> bool {
        self.solvable
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }
}
