use dotenv::dotenv;
use jigsaw_rl::config::{AppConfig, DEFAULT_MAX_STEPS};
use jigsaw_rl::training::{CompositeObserver, CsvLogger, DefaultObserver, PuzzleEnv, Trainer};
use jigsaw_rl::QLearningSolver;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jigsaw_rl=info,jigsaw=info,warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    tracing::info!("Shuffle mode: {:?}", config.env.shuffle);
    match config.env.max_steps {
        Some(limit) => tracing::info!("Step limit per episode: {}", limit),
        None => tracing::warn!("No step limit: unsolvable shuffles will never finish"),
    }

    let (mut solver, rng) = match config.seed {
        Some(seed) => {
            tracing::info!("Seed: {}", seed);
            (
                QLearningSolver::with_seed(config.solver.clone(), seed)?,
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            )
        }
        None => (
            QLearningSolver::new(config.solver.clone())?,
            StdRng::from_os_rng(),
        ),
    };

    let env = PuzzleEnv::new(config.solver.side, config.env.clone())?;

    let mut observer = CompositeObserver::new(vec![Box::new(DefaultObserver::new())]);
    if let Some(folder) = &config.log_folder {
        observer.push(Box::new(CsvLogger::new(folder)?));
    }

    let mut trainer = Trainer::new(&mut solver, env, rng, observer)?;
    let report = trainer.train(config.episodes)?;
    tracing::info!(
        "Solved {}/{} episodes ({} truncated), exploration rate {:.4}, {} table entries",
        report.solved,
        report.episodes,
        report.truncated,
        report.exploration_rate,
        report.table_size
    );

    if config.eval_episodes > 0 {
        let max_steps = config.env.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
        let metrics = trainer.evaluate(config.eval_episodes, max_steps)?;
        metrics.print_summary();
    }

    Ok(())
}
