//! Runtime configuration read from `JIGSAW_*` environment variables.

use std::env;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::puzzle::ShuffleMode;
use crate::solver::SolverConfig;
use crate::training::EnvConfig;

/// Step limit applied by the binary when `JIGSAW_MAX_STEPS` is unset.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: String,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "Invalid value for {}: {:?}", self.key, self.value)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub solver: SolverConfig,
    pub env: EnvConfig,
    pub episodes: usize,
    pub eval_episodes: usize,
    pub seed: Option<u64>,
    pub log_folder: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SolverConfig::default();
        let side = get_parsed(&lookup, "JIGSAW_GRID_SIZE")?.unwrap_or(defaults.side);
        let solver = SolverConfig {
            side,
            learning_rate: get_parsed(&lookup, "JIGSAW_LEARNING_RATE")?
                .unwrap_or(defaults.learning_rate),
            discount_factor: get_parsed(&lookup, "JIGSAW_DISCOUNT")?
                .unwrap_or(defaults.discount_factor),
            initial_exploration: get_parsed(&lookup, "JIGSAW_EXPLORATION")?
                .unwrap_or(defaults.initial_exploration),
            exploration_decay: get_parsed(&lookup, "JIGSAW_EXPLORATION_DECAY")?
                .unwrap_or(defaults.exploration_decay),
            min_exploration: get_parsed(&lookup, "JIGSAW_MIN_EXPLORATION")?
                .unwrap_or(defaults.min_exploration),
        };

        let shuffle = match get_string(&lookup, "JIGSAW_SHUFFLE") {
            Some(value) => parse_shuffle(&value).ok_or(ConfigError {
                key: "JIGSAW_SHUFFLE".to_string(),
                value,
            })?,
            None => ShuffleMode::Uniform,
        };

        // 0 disables the limit.
        let max_steps = match get_parsed::<usize, _>(&lookup, "JIGSAW_MAX_STEPS")? {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => Some(DEFAULT_MAX_STEPS),
        };

        Ok(Self {
            solver,
            env: EnvConfig {
                shuffle,
                max_steps,
                ..EnvConfig::default()
            },
            episodes: get_parsed(&lookup, "JIGSAW_EPISODES")?.unwrap_or(1000),
            eval_episodes: get_parsed(&lookup, "JIGSAW_EVAL_EPISODES")?.unwrap_or(0),
            seed: get_parsed(&lookup, "JIGSAW_SEED")?,
            log_folder: get_string(&lookup, "JIGSAW_LOG_FOLDER"),
        })
    }
}

fn get_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn get_parsed<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse::<T>().map(Some).map_err(|_| ConfigError {
                key: key.to_string(),
                value,
            })
        }
        _ => Ok(None),
    }
}

/// `uniform` or `walk:<moves>`.
pub fn parse_shuffle(value: &str) -> Option<ShuffleMode> {
    let value = value.trim().to_ascii_lowercase();
    if value == "uniform" {
        return Some(ShuffleMode::Uniform);
    }
    value
        .strip_prefix("walk:")
        .and_then(|steps| steps.trim().parse::<usize>().ok())
        .map(ShuffleMode::RandomWalk)
}
