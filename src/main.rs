//! Reversi-MCTS: play Reversi against a Monte Carlo Tree Search engine.
//!
//! ## Usage
//!
//! - `reversi-mcts` - Play in the console
//! - `reversi-mcts play --computer-first` - Let the computer open
//! - `reversi-mcts search -n 10000` - Run one search on the opening and print statistics
//!
//! Set `RUST_LOG=debug` for per-search tree statistics.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use reversi_mcts::board::{format_point, Board, Stone};
use reversi_mcts::config::{EngineConfig, RolloutPolicy};
use reversi_mcts::console::Console;
use reversi_mcts::constants::{DEFAULT_BOARD_SIZE, DEFAULT_SIMULATIONS};
use reversi_mcts::mcts::Mcts;

/// Reversi-MCTS: a Reversi engine driven by Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "reversi-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine in the console
    Play {
        #[command(flatten)]
        engine: EngineArgs,
        /// Let the computer make the first move
        #[arg(long)]
        computer_first: bool,
    },
    /// Search the opening position once and print statistics
    Search {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// Board side length (even, 4 to 26)
    #[arg(short, long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,
    /// Search iterations per computer move
    #[arg(short = 'n', long, default_value_t = DEFAULT_SIMULATIONS)]
    simulations: usize,
    /// Which expanded child each iteration rolls out from
    #[arg(long, value_enum, default_value_t = RolloutPolicy::FirstChild)]
    rollout: RolloutPolicy,
    /// Seed for reproducible searches
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            simulations: DEFAULT_SIMULATIONS,
            rollout: RolloutPolicy::default(),
            seed: None,
        }
    }
}

impl EngineArgs {
    fn config(&self) -> anyhow::Result<EngineConfig> {
        let config = EngineConfig::default()
            .with_board_size(self.size)
            .with_simulations(self.simulations)
            .with_rollout(self.rollout)
            .with_seed(self.seed);
        config.validate().context("invalid engine configuration")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play {
            engine,
            computer_first,
        }) => run_console(&engine, computer_first),
        Some(Commands::Search { engine }) => run_search(&engine),
        None => run_console(&EngineArgs::default(), false),
    }
}

fn run_console(args: &EngineArgs, computer_first: bool) -> anyhow::Result<()> {
    let mut console = Console::new(args.config()?)?;
    println!("Reversi-MCTS: type 'list_commands' for help, 'quit' to leave\n");
    let opening = open_game(&mut console, if computer_first { "computer" } else { "human" })?;
    println!("{opening}\n");
    console.run()
}

/// Start a game with `first` ("human" or "computer") to move and return the
/// console's opening display.
fn open_game(console: &mut Console, first: &str) -> anyhow::Result<String> {
    let (ok, opening) = console.execute("new", &[first]);
    if !ok {
        bail!("could not start a new game: {opening}");
    }
    Ok(opening)
}

fn run_search(args: &EngineArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    let board = Board::with_opening(config.board_size);
    println!("{board}");

    let progress = create_search_progress(config.simulations as u64)?;
    let mut mcts = Mcts::from_config(&config).with_progress(progress.clone());
    println!("Running {} MCTS iterations...", mcts.simulations());
    let report = mcts.search(&board, Stone::Black);
    progress.finish_and_clear();
    let report = report?;

    println!(
        "Best move: {} for {}",
        format_point(report.best_move),
        report.mover.name()
    );
    for m in &report.moves {
        println!(
            "  {}: {} visits, win ratio {:.3}",
            format_point(m.mv),
            m.visits,
            m.win_ratio
        );
    }
    println!("Root visits: {}", report.root_visits);
    println!("Tree nodes: {}, depth: {}", report.nodes, report.depth);
    println!("Nodes per depth: {:?}", report.nodes_per_depth);
    println!("Time: {:.2}s", report.elapsed.as_secs_f64());
    Ok(())
}

/// Progress bar for a single search
fn create_search_progress(iterations: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(iterations);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} iterations ({per_sec})")
            .context("invalid progress bar template")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}
