//! Metrics and CSV logging for Q-learning training

use std::collections::{BTreeMap, VecDeque};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use time::{OffsetDateTime, format_description};

use super::observer::TrainingObserver;
use super::trainer::{EpisodeOutcome, EpisodeStatus};

/// Moving average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.window_size {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Training metrics tracker
#[derive(Debug)]
pub struct TrainingMetrics {
    pub episode_lengths: MovingAverage,
    pub episode_rewards: MovingAverage,
    /// 1.0 per solved episode, 0.0 otherwise
    pub solve_rate: MovingAverage,
    /// Fraction of episodes that started from an unsolvable shuffle
    pub unsolvable_rate: MovingAverage,
    pub episodes: usize,
    pub solved: usize,
    pub truncated: usize,
    pub total_steps: usize,
    pub exploration_rate: f64,
    pub table_size: usize,
    start_time: Instant,
}

impl TrainingMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_lengths: MovingAverage::new(window_size),
            episode_rewards: MovingAverage::new(window_size),
            solve_rate: MovingAverage::new(window_size),
            unsolvable_rate: MovingAverage::new(window_size),
            episodes: 0,
            solved: 0,
            truncated: 0,
            total_steps: 0,
            exploration_rate: 0.0,
            table_size: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record_episode(&mut self, outcome: &EpisodeOutcome) {
        self.episodes += 1;
        self.total_steps += outcome.steps;
        match outcome.status {
            EpisodeStatus::Solved => self.solved += 1,
            EpisodeStatus::Truncated => self.truncated += 1,
            EpisodeStatus::Aborted => {}
        }

        self.episode_lengths.push(outcome.steps as f64);
        self.episode_rewards.push(outcome.total_reward);
        self.solve_rate
            .push(if outcome.status == EpisodeStatus::Solved { 1.0 } else { 0.0 });
        self.unsolvable_rate
            .push(if outcome.solvable { 0.0 } else { 1.0 });
        self.exploration_rate = outcome.exploration_rate;
        self.table_size = outcome.table_size;
    }

    pub fn training_duration_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn steps_per_second(&self) -> f64 {
        let duration = self.training_duration_secs();
        if duration > 0.0 {
            self.total_steps as f64 / duration
        } else {
            0.0
        }
    }

    pub fn log_to_console(&self) {
        tracing::info!(
            "Episode {} | Steps {} | SPS {:.1}",
            self.episodes,
            self.total_steps,
            self.steps_per_second()
        );
        tracing::info!(
            "  Recent: length={:.1}, reward={:.2}, solved={:.1}%, unsolvable shuffles={:.1}%",
            self.episode_lengths.average(),
            self.episode_rewards.average(),
            self.solve_rate.average() * 100.0,
            self.unsolvable_rate.average() * 100.0
        );
        tracing::info!(
            "  Exploration rate={:.4}, table size={}",
            self.exploration_rate,
            self.table_size
        );
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Per-episode CSV export. Each training run gets its own timestamped
/// directory under the configured log folder.
pub struct CsvLogger {
    log_dir: PathBuf,
    file: File,
}

impl CsvLogger {
    pub fn new(log_folder: impl AsRef<Path>) -> io::Result<Self> {
        let log_dir = log_folder.as_ref().join(format!("run-{}", run_timestamp()));
        Self::create(log_dir)
    }

    /// Write into exactly `log_dir`, creating it if needed.
    pub fn create(log_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&log_dir)?;
        let csv_path = log_dir.join("episodes.csv");
        let file_exists = csv_path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)?;
        if !file_exists {
            writeln!(
                file,
                "episode,status,steps,solvable,reward,exploration_rate,table_size"
            )?;
        }
        Ok(Self { log_dir, file })
    }

    pub fn log_episode(&mut self, outcome: &EpisodeOutcome) -> io::Result<()> {
        writeln!(
            self.file,
            "{},{},{},{},{},{},{}",
            outcome.episode,
            outcome.status.as_str(),
            outcome.steps,
            outcome.solvable,
            outcome.total_reward,
            outcome.exploration_rate,
            outcome.table_size
        )
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

impl TrainingObserver for CsvLogger {
    fn on_episode_finished(&mut self, outcome: &EpisodeOutcome) {
        if let Err(err) = self.log_episode(outcome) {
            tracing::warn!("Failed to write episode {} to CSV: {}", outcome.episode, err);
        }
    }

    fn on_training_finished(&mut self, _metrics: &TrainingMetrics) {
        if let Err(err) = self.file.flush() {
            tracing::warn!("Failed to flush episode log: {}", err);
        }
        tracing::info!("Episode log saved to {}", self.log_dir.display());
    }
}

fn run_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_description::parse("[year][month][day]-[hour][minute][second]")
        .ok()
        .and_then(|format| now.format(&format).ok())
        .unwrap_or_else(|| now.unix_timestamp().to_string())
}

/// Evaluation metrics for greedy runs of a trained solver
#[derive(Debug, Clone, Default)]
pub struct EvaluationMetrics {
    pub num_episodes: usize,
    pub num_solved: usize,
    /// Steps summed over solved episodes only
    pub solved_steps: usize,
    /// Keyed by whether the starting board was solvable
    pub solvability_stats: BTreeMap<bool, SolvabilityStats>,
}

#[derive(Debug, Clone, Default)]
pub struct SolvabilityStats {
    pub attempts: usize,
    pub solved: usize,
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_episode(&mut self, steps: usize, solved: bool, solvable: bool) {
        self.num_episodes += 1;
        if solved {
            self.num_solved += 1;
            self.solved_steps += steps;
        }

        let stats = self.solvability_stats.entry(solvable).or_default();
        stats.attempts += 1;
        if solved {
            stats.solved += 1;
        }
    }

    pub fn solve_rate(&self) -> f64 {
        if self.num_episodes > 0 {
            self.num_solved as f64 / self.num_episodes as f64
        } else {
            0.0
        }
    }

    /// Average length of the episodes that were solved.
    pub fn avg_solved_steps(&self) -> f64 {
        if self.num_solved > 0 {
            self.solved_steps as f64 / self.num_solved as f64
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        tracing::info!("=== Evaluation Summary ===");
        tracing::info!("Episodes: {}", self.num_episodes);
        tracing::info!("Solve Rate: {:.1}%", self.solve_rate() * 100.0);
        tracing::info!("Avg Steps (solved): {:.1}", self.avg_solved_steps());

        for (solvable, stats) in &self.solvability_stats {
            let rate = if stats.attempts > 0 {
                stats.solved as f64 / stats.attempts as f64 * 100.0
            } else {
                0.0
            };
            tracing::info!(
                "  {} boards: {} attempts, {:.1}% solved",
                if *solvable { "Solvable" } else { "Unsolvable" },
                stats.attempts,
                rate
            );
        }
    }
}
