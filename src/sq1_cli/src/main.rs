#![warn(clippy::pedantic)]

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::{LevelFilter, info};
use owo_colors::OwoColorize;
use sq1_scrambler::{
    Scrambler, ScramblerConfig,
    cases::{CaseFamily, case_names},
    pruning::PruningTable,
};
use std::{fs, path::PathBuf, sync::Arc};

/// Generates random state scrambles for Square-1 PBL cases
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The scrambler configuration file to use, in TOML format. Missing
    /// fields keep their defaults.
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed the random number generator to make scrambles reproducible
    #[arg(long)]
    seed: Option<u64>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    log_level: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scramble random states of a PBL case
    Case {
        /// The case as `top/bottom`, e.g. "Al/Ar" or "Adj/Opp"
        name: String,
        /// `+` for a swapped equator, `-` for a solved one, anything else for
        /// a random one
        #[arg(short, long, default_value = "random", allow_hyphen_values = true)]
        middle: String,
        /// How many scrambles to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Scramble a state given as 12 hex digits, `|` or `/`, and 12 hex digits
    State {
        /// e.g. "211455633077|99edd8bbaffc"
        state: String,
    },
    /// List every case name
    Cases,
}

fn load_config(path: Option<&PathBuf>) -> color_eyre::Result<ScramblerConfig> {
    let Some(path) = path else {
        return Ok(ScramblerConfig::default());
    };
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read configuration file {}", path.display()))?;
    toml::from_str(&text)
        .wrap_err_with(|| format!("Failed to parse configuration file {}", path.display()))
}

fn scrambler(cli: &Cli) -> color_eyre::Result<Scrambler> {
    let config = load_config(cli.config.as_ref())?;
    info!("Using {config:?}");
    let scrambler = Scrambler::new(Arc::new(PruningTable::square())).with_config(config);
    Ok(match cli.seed {
        Some(seed) => scrambler.with_seed(seed),
        None => scrambler,
    })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.log_level {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    match &cli.command {
        Commands::Case {
            name,
            middle,
            count,
        } => {
            let mut scrambler = scrambler(&cli)?;
            for _ in 0..*count {
                println!("{}", scrambler.get_scramble(name, middle)?);
            }
        }
        Commands::State { state } => {
            let scramble = scrambler(&cli)?.scramble_hex(state)?;
            println!("{}", scramble.to_string().trim());
            println!("{}", scramble.compact().dimmed());
            eprintln!(
                "{} slices, {} moves",
                scramble.slice_count(),
                scramble.solving_moves().len()
            );
        }
        Commands::Cases => {
            for (family, heading) in [
                (CaseFamily::NonParity, "Non-parity"),
                (CaseFamily::Parity, "Parity"),
            ] {
                println!("{}", heading.bold());
                for row in &case_names(family).chunks(8) {
                    println!("  {}", row.format(" "));
                }
            }
        }
    }

    Ok(())
}
