/// A cell on the grid, addressed by row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major position index to cell.
    pub fn from_index(index: usize, side: usize) -> Self {
        Self {
            row: index / side,
            col: index % side,
        }
    }

    pub fn to_index(&self, side: usize) -> usize {
        self.row * side + self.col
    }

    pub fn distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Edge neighbors inside a `side x side` grid, in up, down, left, right order.
    pub fn neighbors(&self, side: usize) -> Vec<Position> {
        let mut neighbors = Vec::with_capacity(4);
        if self.row > 0 {
            neighbors.push(Position::new(self.row - 1, self.col)); // Up
        }
        if self.row + 1 < side {
            neighbors.push(Position::new(self.row + 1, self.col)); // Down
        }
        if self.col > 0 {
            neighbors.push(Position::new(self.row, self.col - 1)); // Left
        }
        if self.col + 1 < side {
            neighbors.push(Position::new(self.row, self.col + 1)); // Right
        }
        neighbors
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }
}
