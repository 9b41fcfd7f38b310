//! Interactive play: a shuffled board driven by cell clicks.

use rand::Rng;

use crate::puzzle::{Board, Position, PuzzleError, ShuffleMode};
use crate::solver::QLearningSolver;

pub struct GameSession {
    initial: Board,
    board: Board,
    moves: usize,
}

impl GameSession {
    pub fn new<R: Rng + ?Sized>(
        side: usize,
        shuffle: ShuffleMode,
        rng: &mut R,
    ) -> Result<Self, PuzzleError> {
        let board = Board::shuffled(side, shuffle, rng)?;
        if !board.is_solvable() {
            tracing::warn!("Session board cannot be solved by sliding moves");
        }
        Ok(Self::from_board(board))
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            initial: board.clone(),
            board,
            moves: 0,
        }
    }

    /// Slide the tile at `index` into the empty slot. Returns whether the
    /// puzzle is solved afterwards.
    pub fn click(&mut self, index: usize) -> Result<bool, PuzzleError> {
        self.board = self.board.apply_move(index)?;
        self.moves += 1;
        let solved = self.board.is_solved();
        if solved {
            tracing::info!("Puzzle solved in {} moves", self.moves);
        }
        Ok(solved)
    }

    pub fn click_cell(&mut self, position: Position) -> Result<bool, PuzzleError> {
        let index = self
            .board
            .index_of(position)
            .ok_or(PuzzleError::OutOfBounds {
                row: position.row,
                col: position.col,
            })?;
        self.click(index)
    }

    /// The move a trained solver would make from the current board.
    pub fn hint(&self, solver: &QLearningSolver) -> Option<usize> {
        let moves = self.board.legal_moves();
        solver
            .greedy_action(&self.board)
            .and_then(|index| moves.get(index).copied())
    }

    /// Back to the board the session started with.
    pub fn restart(&mut self) {
        self.board = self.initial.clone();
        self.moves = 0;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn is_solved(&self) -> bool {
        self.board.is_solved()
    }
}
