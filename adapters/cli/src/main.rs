#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Lane Defence session in the terminal.

mod board;
mod layout_transfer;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use lane_defence_core::{Difficulty, Outcome};
use lane_defence_session::{Session, SessionConfig, TurnSummary};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::layout_transfer::DefenseLayout;

/// Command-line options for the Lane Defence CLI.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", about = "Headless Lane Defence runner", version)]
struct CliArgs {
    /// TOML file holding a session configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Difficulty preset: easy, medium or hard.
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Seed for dodge rolls and spawn lanes.
    #[arg(long)]
    seed: Option<u64>,

    /// Turn counter value that wins the game.
    #[arg(long = "survival-turns", value_name = "TURNS")]
    survival_turns: Option<u64>,

    /// Number of lanes on the grid.
    #[arg(long)]
    lanes: Option<u32>,

    /// Number of tiles in each lane.
    #[arg(long = "lane-length", value_name = "TILES")]
    lane_length: Option<u32>,

    /// Layout string whose defenses are placed before the first turn.
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<String>,

    /// Stop after this many turns even if the game is undecided.
    #[arg(long = "max-turns", value_name = "TURNS")]
    max_turns: Option<u64>,

    /// Print the layout string of the seeded board and exit.
    #[arg(long = "export-layout")]
    export_layout: bool,

    /// Only print the final result.
    #[arg(long)]
    quiet: bool,

    /// Log filter directives, for example `debug` or `lane_defence_session=trace`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log.as_deref())?;

    let config = load_config(&args)?;
    let mut session = Session::new(config).context("invalid session configuration")?;

    if let Some(layout) = &args.layout {
        seed_layout(&mut session, layout)?;
    }

    if args.export_layout {
        let layout = DefenseLayout::capture(&session.snapshot())
            .encode()
            .context("failed to encode layout")?;
        println!("{layout}");
        return Ok(());
    }

    if !args.quiet {
        println!("{}", session.welcome_banner());
        print!("{}", board::render(&session.snapshot()));
    }

    let mut played = 0;
    while !session.outcome().is_terminal() {
        if args.max_turns.is_some_and(|limit| played >= limit) {
            info!(turns = played, "turn limit reached");
            break;
        }
        let summary = session.advance_turn().context("failed to advance turn")?;
        played += 1;
        if !args.quiet {
            println!("{}", describe(&summary));
            print!("{}", board::render(&session.snapshot()));
        }
    }

    let outcome = match session.outcome() {
        Outcome::InProgress => "undecided",
        Outcome::Victory => "victory",
        Outcome::Defeat => "defeat",
    };
    println!(
        "{outcome} after {} turns with {} resources",
        session.turn(),
        session.balance()
    );
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")
}

fn load_config(args: &CliArgs) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config at {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse config toml at {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(turns) = args.survival_turns {
        config.survival_turn_target = turns;
    }
    if let Some(lanes) = args.lanes {
        config.lane_count = lanes;
    }
    if let Some(length) = args.lane_length {
        config.lane_length = length;
    }
    Ok(config)
}

fn seed_layout(session: &mut Session, value: &str) -> Result<()> {
    let layout = DefenseLayout::decode(value).context("failed to decode layout")?;
    let snapshot = session.snapshot();
    if (layout.lane_count, layout.lane_length) != (snapshot.lane_count, snapshot.lane_length) {
        bail!(
            "layout is for a {}x{} grid but the session uses {}x{}",
            layout.lane_count,
            layout.lane_length,
            snapshot.lane_count,
            snapshot.lane_length
        );
    }

    for placement in &layout.placements {
        let _ = session
            .place_defense(
                placement.tile.lane(),
                placement.tile.position(),
                placement.kind,
            )
            .with_context(|| {
                format!(
                    "failed to place {} at lane {} position {}",
                    placement.kind.name(),
                    placement.tile.lane(),
                    placement.tile.position()
                )
            })?;
    }
    info!(defenses = layout.placements.len(), "layout seeded");
    Ok(())
}

fn describe(summary: &TurnSummary) -> String {
    format!(
        "turn {}: {} distracted, {} moved, {} neutralized, {} destroyed, {} spawned, +{} resources",
        summary.turn,
        summary.distractions.len(),
        summary.moved.len(),
        summary.neutralized.len(),
        summary.destroyed.len(),
        summary.spawned.len(),
        summary.credited
    )
}
