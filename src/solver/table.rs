use std::collections::HashMap;

use crate::puzzle::Board;

/// Tabular action values keyed by the full board configuration.
///
/// Each entry holds one value per legal move of its configuration, in the
/// order `Board::legal_moves` returns them. Entries are zero-initialized on
/// first access and never evicted.
#[derive(Debug, Clone, Default)]
pub struct ActionValueTable {
    entries: HashMap<Board, Vec<f64>>,
}

impl ActionValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, board: &Board) -> Option<&[f64]> {
        self.entries.get(board).map(Vec::as_slice)
    }

    /// Values for `board`, created on first visit.
    pub fn entry(&mut self, board: &Board) -> &mut Vec<f64> {
        self.entries
            .entry(board.clone())
            .or_insert_with(|| vec![0.0; board.legal_moves().len()])
    }

    /// Largest value for `board`, creating the entry if needed. Zero for a
    /// configuration without legal moves.
    pub fn max_value(&mut self, board: &Board) -> f64 {
        let values = self.entry(board);
        argmax(values.as_slice()).map(|i| values[i]).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, board: &Board) -> bool {
        self.entries.contains_key(board)
    }
}

/// Index of the first maximum, `None` for an empty slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}
