use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::error::PuzzleError;
use super::position::Position;

/// How a fresh board is scrambled at the start of an episode or session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuffleMode {
    /// Uniform random permutation. Half of these boards cannot be solved by
    /// sliding moves; they are not filtered out.
    #[default]
    Uniform,
    /// A random walk of this many legal moves from the solved board.
    RandomWalk(usize),
}

/// One puzzle configuration: a permutation of `0..side*side` laid out in
/// row-major order, where identity `side*side - 1` is the empty slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    side: usize,
    tiles: Vec<usize>,
    empty: usize,
}

impl Board {
    /// The identity configuration.
    pub fn solved(side: usize) -> Result<Self, PuzzleError> {
        let len = Self::cell_count(side)?;
        Ok(Self {
            side,
            tiles: (0..len).collect(),
            empty: len - 1,
        })
    }

    pub fn from_tiles(side: usize, tiles: Vec<usize>) -> Result<Self, PuzzleError> {
        let len = Self::cell_count(side)?;
        if tiles.len() != len {
            return Err(PuzzleError::LengthMismatch {
                side,
                len: tiles.len(),
            });
        }

        let mut seen = vec![false; len];
        for &tile in &tiles {
            if tile >= len || seen[tile] {
                return Err(PuzzleError::NotAPermutation);
            }
            seen[tile] = true;
        }

        let empty = tiles
            .iter()
            .position(|&tile| tile == len - 1)
            .ok_or(PuzzleError::NotAPermutation)?;

        Ok(Self { side, tiles, empty })
    }

    pub fn shuffled<R: Rng + ?Sized>(
        side: usize,
        mode: ShuffleMode,
        rng: &mut R,
    ) -> Result<Self, PuzzleError> {
        let mut board = Self::solved(side)?;
        match mode {
            ShuffleMode::Uniform => {
                board.tiles.shuffle(rng);
                board.empty = board.locate_empty();
            }
            ShuffleMode::RandomWalk(steps) => {
                for _ in 0..steps {
                    let Some(&mv) = board.legal_moves().choose(rng) else {
                        break;
                    };
                    board.swap_with_empty(mv);
                }
            }
        }
        Ok(board)
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn tiles(&self) -> &[usize] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Position index of the empty slot.
    pub fn empty_index(&self) -> usize {
        self.empty
    }

    pub fn empty_tile(&self) -> usize {
        self.tiles.len() - 1
    }

    pub fn position_of(&self, index: usize) -> Position {
        Position::from_index(index, self.side)
    }

    pub fn index_of(&self, position: Position) -> Option<usize> {
        if position.row < self.side && position.col < self.side {
            Some(position.to_index(self.side))
        } else {
            None
        }
    }

    /// Positions edge-adjacent to the empty slot, in up, down, left, right
    /// order. Empty for a 1x1 grid.
    pub fn legal_moves(&self) -> Vec<usize> {
        self.position_of(self.empty)
            .neighbors(self.side)
            .into_iter()
            .map(|pos| pos.to_index(self.side))
            .collect()
    }

    pub fn is_legal_move(&self, mv: usize) -> bool {
        mv < self.tiles.len() && self.position_of(mv).is_adjacent(&self.position_of(self.empty))
    }

    /// Returns the board with the tile at `mv` swapped into the empty slot.
    /// `self` is left untouched.
    pub fn apply_move(&self, mv: usize) -> Result<Board, PuzzleError> {
        if !self.is_legal_move(mv) {
            return Err(PuzzleError::InvalidMove {
                position: mv,
                empty: self.empty,
            });
        }
        let mut next = self.clone();
        next.swap_with_empty(mv);
        Ok(next)
    }

    pub fn is_solved(&self) -> bool {
        self.tiles.iter().enumerate().all(|(i, &tile)| i == tile)
    }

    /// Whether sliding moves can bring this configuration back to the
    /// identity: permutation parity must match the parity of the empty
    /// slot's distance from its home cell.
    pub fn is_solvable(&self) -> bool {
        let home = self.position_of(self.tiles.len() - 1);
        let distance = self.position_of(self.empty).distance(&home);
        self.permutation_parity() == distance % 2
    }

    /// Renders the grid as text, one row per line, empty slot as `.`.
    pub fn render_ascii(&self) -> String {
        let width = (self.tiles.len() - 1).to_string().len();
        let empty_tile = self.empty_tile();
        self.tiles
            .chunks(self.side)
            .map(|row| {
                row.iter()
                    .map(|&tile| {
                        if tile == empty_tile {
                            format!("{:>width$}", ".")
                        } else {
                            format!("{:>width$}", tile)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn cell_count(side: usize) -> Result<usize, PuzzleError> {
        if side == 0 {
            return Err(PuzzleError::EmptyGrid);
        }
        side.checked_mul(side).ok_or(PuzzleError::GridTooLarge { side })
    }

    fn swap_with_empty(&mut self, mv: usize) {
        self.tiles.swap(self.empty, mv);
        self.empty = mv;
    }

    fn locate_empty(&self) -> usize {
        let empty_tile = self.empty_tile();
        self.tiles
            .iter()
            .position(|&tile| tile == empty_tile)
            .unwrap_or(empty_tile)
    }

    // 0 for even, 1 for odd; computed as (n - cycles) mod 2.
    fn permutation_parity(&self) -> usize {
        let mut visited = vec![false; self.tiles.len()];
        let mut cycles = 0;
        for start in 0..self.tiles.len() {
            if visited[start] {
                continue;
            }
            cycles += 1;
            let mut i = start;
            while !visited[i] {
                visited[i] = true;
                i = self.tiles[i];
            }
        }
        (self.tiles.len() - cycles) % 2
    }
}
