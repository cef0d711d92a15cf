mod config;
mod feed;
mod session;
mod tracking;
mod web;

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::config::Config;
use crate::feed::{FeedRunner, FeedSettings, Sample};
use crate::session::{ObserverError, RecentRecords, Session, METRIC_NAMES};
use crate::tracking::{HERO_LOOK_BACK_SECONDS, HISTORY_CAPACITY, STALENESS_WINDOW_SECONDS};

const RECENT_RECORDS: usize = 1024;

#[derive(Parser)]
#[command(name = "herotrack")]
#[command(about = "Hero-relative kinematics of simulated traffic participants")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate { config: String },
    /// Replay recorded position samples and export the derived records
    Replay {
        config: String,
        samples: PathBuf,
        /// CSV file to append to (defaults to export.path from the config)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print every dispatched record to stdout
        #[arg(long)]
        print: bool,
    },
    /// Serve the HTTP API, optionally replaying samples in the background
    Serve {
        config: String,
        #[arg(long)]
        samples: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Replay {
            config,
            samples,
            out,
            print,
        } => replay(&config, &samples, out, print),
        Commands::Serve { config, samples } => serve(&config, samples.as_deref()),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Config error: {}", e);
            None
        }
    }
}

fn load_samples(path: &Path) -> Option<Vec<Sample>> {
    match feed::load_samples(path) {
        Ok(samples) => Some(samples),
        Err(e) => {
            eprintln!("Error reading samples: {}", e);
            None
        }
    }
}

fn feed_settings(config: &Config) -> Option<FeedSettings> {
    match config.feed.tick() {
        Ok(tick) => Some(FeedSettings {
            tick,
            paced: config.feed.paced,
            error_range: config.feed.error_range,
        }),
        Err(e) => {
            eprintln!("Config error: {}", e);
            None
        }
    }
}

fn start_session(config: &Config, samples: &[Sample]) -> Option<Arc<Session>> {
    let session = feed::select_hero(config, samples).and_then(|hero| feed::build_session(config, hero));
    match session {
        Ok(session) => Some(Arc::new(session)),
        Err(e) => {
            eprintln!("Session error: {}", e);
            None
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    println!(
        "Config is valid ({} road users of {} participants)",
        config.road_users().count(),
        config.participants.len()
    );
    for participant in config.road_users() {
        let hero = if config.session.hero_id == Some(participant.id) {
            " (hero)"
        } else {
            ""
        };
        println!(
            "  {}: {} -> {} [{}]{}",
            participant.id,
            participant.blueprint,
            participant.kind(),
            participant.kind().type_code(),
            hero
        );
    }
    println!(
        "  relevance radius {} m, {} entries per metric ({})",
        config.session.relevance_radius,
        config.session.max_entry_count,
        METRIC_NAMES.join(", ")
    );
    println!(
        "  history {} samples, staleness {} s, hero look-back {} s",
        HISTORY_CAPACITY, STALENESS_WINDOW_SECONDS, HERO_LOOK_BACK_SECONDS
    );
    ExitCode::SUCCESS
}

fn replay(path: &str, samples_path: &Path, out: Option<PathBuf>, print: bool) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(samples) = load_samples(samples_path) else {
        return ExitCode::FAILURE;
    };
    let Some(settings) = feed_settings(&config) else {
        return ExitCode::FAILURE;
    };
    let Some(session) = start_session(&config, &samples) else {
        return ExitCode::FAILURE;
    };

    if print {
        session.subscribe(Arc::new(|record: &str| -> Result<(), ObserverError> {
            writeln!(io::stdout(), "{}", record).map_err(|e| ObserverError::Rejected(e.to_string()))
        }));
    }

    let start_time = chrono::Utc::now();
    println!("Starting replay of {} samples at {}", samples.len(), start_time);

    let delivered = FeedRunner::start(session.clone(), &samples, settings).wait();

    let out = out.unwrap_or_else(|| config.export.path.clone());
    if let Err(e) = session.save_csv(&out) {
        eprintln!("Export error: {}", e);
        return ExitCode::FAILURE;
    }

    println!(
        "Replay completed: {} samples delivered, exported to {}",
        delivered,
        out.display()
    );
    ExitCode::SUCCESS
}

fn serve(path: &str, samples_path: Option<&Path>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let samples = match samples_path {
        Some(p) => match load_samples(p) {
            Some(samples) => samples,
            None => return ExitCode::FAILURE,
        },
        None => Vec::new(),
    };
    let Some(settings) = feed_settings(&config) else {
        return ExitCode::FAILURE;
    };
    let Some(session) = start_session(&config, &samples) else {
        return ExitCode::FAILURE;
    };

    let recent = Arc::new(RecentRecords::new(RECENT_RECORDS));
    session.subscribe(recent.clone());

    let runner = (!samples.is_empty()).then(|| FeedRunner::start(session.clone(), &samples, settings));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let state = web::AppState {
        session: session.clone(),
        recent,
        api_keys: Arc::new(config.api_keys.clone()),
    };
    let served = runtime.block_on(web::run_server(&config.web.bind, state));

    if let Some(runner) = runner {
        let delivered = runner.stop();
        log::info!("Feeds stopped after {} samples", delivered);
    }
    if let Err(e) = session.save_csv(&config.export.path) {
        eprintln!("Export error: {}", e);
        return ExitCode::FAILURE;
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
