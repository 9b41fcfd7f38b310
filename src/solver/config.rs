use super::error::SolverError;

/// Q-learning hyperparameters, fixed for the lifetime of a solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Grid side length
    pub side: usize,
    /// Learning rate (alpha), in (0, 1]
    pub learning_rate: f64,
    /// Discount factor (gamma), in [0, 1]
    pub discount_factor: f64,
    /// Exploration rate at the first episode
    pub initial_exploration: f64,
    /// Multiplier applied to the exploration rate after each episode
    pub exploration_decay: f64,
    /// Floor for the exploration rate
    pub min_exploration: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            side: 2,
            learning_rate: 0.1,
            discount_factor: 0.9,
            initial_exploration: 0.8,
            exploration_decay: 0.995,
            min_exploration: 0.01,
        }
    }
}

impl SolverConfig {
    pub fn with_side(side: usize) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if self.side == 0 {
            return Err(SolverError::InvalidParameter {
                name: "side",
                value: 0.0,
            });
        }
        let checks: [(&'static str, f64, bool); 5] = [
            (
                "learning_rate",
                self.learning_rate,
                self.learning_rate > 0.0 && self.learning_rate <= 1.0,
            ),
            (
                "discount_factor",
                self.discount_factor,
                (0.0..=1.0).contains(&self.discount_factor),
            ),
            (
                "initial_exploration",
                self.initial_exploration,
                (0.0..=1.0).contains(&self.initial_exploration),
            ),
            (
                "exploration_decay",
                self.exploration_decay,
                self.exploration_decay > 0.0 && self.exploration_decay <= 1.0,
            ),
            (
                "min_exploration",
                self.min_exploration,
                (0.0..=self.initial_exploration).contains(&self.min_exploration),
            ),
        ];

        for (name, value, ok) in checks {
            if !ok {
                return Err(SolverError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}
