//! Headless battle runner.
//!
//! Runs one battle to completion with no presentation attached and prints
//! the outcome and the battle log as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Built-in demo roster
//! cargo run -p medarot-headless -- --seed 7
//!
//! # Catalog, loadouts and settings from a directory
//! cargo run -p medarot-headless -- --data data/ --max-ticks 100000
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medarot_core::catalog::{Catalog, Loadout};
use medarot_core::config::{BattleConfig, GameConfig};
use medarot_core::error::Result;
use medarot_sim::battle_log::message_lines;
use medarot_sim::{loader, BattleEngine};

const DEMO_PARTS: &str = include_str!("../../../data/parts.json");
const DEMO_MEDALS: &str = include_str!("../../../data/medals.json");
const DEMO_FORMULAS: &str = include_str!("../../../data/formulas.json");
const DEMO_LOADOUTS: &str = include_str!("../../../data/loadouts.json");
const DEMO_SETTINGS: &str = include_str!("../../../data/game_settings.json");

#[derive(Parser)]
#[command(name = "medarot-headless")]
#[command(about = "Run a robot battle without presentation")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Battle RNG seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Directory holding parts, medals, formulas, loadouts and settings JSON
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Give up after this many ticks
    #[arg(long, default_value = "200000")]
    max_ticks: u64,

    /// Print battle messages as text instead of the JSON report
    #[arg(long)]
    messages: bool,
}

struct BattleData {
    catalog: Catalog,
    loadouts: Vec<Loadout>,
    config: GameConfig,
}

fn load_data(dir: Option<&PathBuf>) -> Result<BattleData> {
    match dir {
        Some(dir) => Ok(BattleData {
            catalog: loader::load_catalog(dir)?,
            loadouts: loader::load_loadouts(&dir.join(loader::LOADOUTS_FILE))?,
            config: loader::load_config(&dir.join(loader::SETTINGS_FILE))?,
        }),
        None => Ok(BattleData {
            catalog: loader::parse_catalog(DEMO_PARTS, DEMO_MEDALS, DEMO_FORMULAS)?,
            loadouts: loader::parse_loadouts(DEMO_LOADOUTS)?,
            config: loader::parse_config(DEMO_SETTINGS)?,
        }),
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let data = load_data(cli.data.as_ref())?;
    let battle = BattleConfig {
        seed: cli.seed,
        headless: true,
    };
    let mut engine = BattleEngine::new(Arc::new(data.catalog), data.config, battle, &data.loadouts)?;
    let outcome = engine.run_to_completion(cli.max_ticks);
    info!(ticks = engine.current_tick(), ?outcome, "battle finished");

    if cli.messages {
        for result in engine.log().results() {
            for line in message_lines(result) {
                println!("{line}");
            }
        }
        match outcome {
            Some(outcome) => println!("Result: {outcome:?}"),
            None => println!("No result after {} ticks", engine.current_tick()),
        }
    } else {
        let report = json!({
            "seed": cli.seed,
            "ticks": engine.current_tick(),
            "outcome": outcome,
            "snapshot": engine.snapshot(),
            "log": engine.log().entries(),
        });
        println!("{report:#}");
    }
    Ok(outcome.is_some())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!(max_ticks = cli.max_ticks, "battle did not finish");
            ExitCode::from(2)
        }
        Err(err) => {
            error!(%err, "battle setup failed");
            ExitCode::FAILURE
        }
    }
}
