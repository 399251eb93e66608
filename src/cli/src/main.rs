#![warn(clippy::pedantic)]

mod move_set;
mod render;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use env_logger::TimestampPrecision;
use itertools::Itertools;
use log::{LevelFilter, debug};
use owo_colors::OwoColorize;
use pyraminx_solver::{
    MoveTable, Puzzle, SearchOutcome, StateVector, facelets::Preset, solver::DEFAULT_MAX_DEPTH,
};
use std::path::PathBuf;

/// Play with and solve a facelet model of the pyraminx
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log verbosity. Can be given up to three times.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    log_level: u8,
    /// A TOML move set file replacing the built in pyraminx moves
    #[arg(long, global = true)]
    moves: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the faces of a state
    Show {
        #[command(flatten)]
        source: StateSource,
    },
    /// List the moves of the move set with their orders
    Moves,
    /// Apply a sequence of move tokens such as `r tt r` and print the result
    Apply {
        /// Whitespace separated tokens; `rr` applies `r` twice
        tokens: String,
        #[command(flatten)]
        source: StateSource,
    },
    /// Apply random moves to a state
    Scramble {
        /// How many random tokens to apply
        #[arg(short, long, default_value_t = 10)]
        count: usize,
        /// Seed for a reproducible scramble
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        source: StateSource,
    },
    /// Search for a move sequence that solves a state
    Solve {
        /// The longest move sequence to search
        #[arg(short = 'd', long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        #[command(flatten)]
        source: StateSource,
    },
}

/// Where the starting state comes from.
#[derive(Args)]
struct StateSource {
    /// Facelet colors in face order, e.g. "red yellow ..." or "r,y,..."
    #[arg(long, conflicts_with = "preset")]
    state: Option<String>,
    /// A built in starting state
    #[arg(long, value_enum, default_value_t = PresetArg::Solved)]
    preset: PresetArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Solved,
    Scrambled,
    TopSwap,
}

impl From<PresetArg> for Preset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Solved => Preset::Solved,
            PresetArg::Scrambled => Preset::Scrambled,
            PresetArg::TopSwap => Preset::TopSwap,
        }
    }
}

impl StateSource {
    fn load_into(&self, puzzle: &mut Puzzle) -> color_eyre::Result<()> {
        let state = match &self.state {
            Some(state) => state.parse::<StateVector>()?,
            None => match self.preset {
                PresetArg::Solved => puzzle.goal().clone(),
                preset => Preset::from(preset).state(),
            },
        };
        puzzle.initialize(state)?;
        Ok(())
    }
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

    let mut puzzle = match &cli.moves {
        Some(path) => {
            let (move_table, goal) = move_set::load(path)?;
            Puzzle::new(move_table, goal)?
        }
        None => Puzzle::pyraminx()?,
    };
    debug!("Using move set {}", puzzle.move_table());

    match cli.command {
        Commands::Show { source } => {
            source.load_into(&mut puzzle)?;
            print!("{}", render::faces(puzzle.state()));
        }
        Commands::Moves => print_moves(puzzle.move_table()),
        Commands::Apply { tokens, source } => {
            source.load_into(&mut puzzle)?;
            puzzle.apply_tokens(&tokens)?;
            print_state(&puzzle);
        }
        Commands::Scramble {
            count,
            seed,
            source,
        } => {
            source.load_into(&mut puzzle)?;
            let mut rng = match seed {
                Some(seed) => fastrand::Rng::with_seed(seed),
                None => fastrand::Rng::new(),
            };
            let tokens = puzzle.scramble(count, &mut rng);
            println!("Scramble: {}", tokens.iter().join(" "));
            print_state(&puzzle);
        }
        Commands::Solve { max_depth, source } => {
            source.load_into(&mut puzzle)?;
            print!("{}", render::faces(puzzle.state()));
            println!("Searching for solution...");
            let report = puzzle.solve(max_depth)?;
            match &report.outcome {
                SearchOutcome::Solved(solution) if solution.is_empty() => {
                    println!("{}", "Already solved".green());
                }
                SearchOutcome::Solved(solution) => {
                    println!("{} {solution}", "Solution:".green());
                }
                SearchOutcome::NotFound { max_depth } => {
                    println!(
                        "{}",
                        format!("No solution found within {max_depth} moves").red()
                    );
                }
            }
            println!(
                "{} in {:.3}s",
                render::stats(&report.stats),
                report.elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}

fn print_state(puzzle: &Puzzle) {
    println!("State: {}", puzzle.state());
    print!("{}", render::faces(puzzle.state()));
    if puzzle.is_solved() {
        println!("{}", "Solved".green());
    }
}

fn print_moves(move_table: &MoveTable) {
    println!(
        "{} ({} facelets)",
        move_table.name(),
        move_table.facelet_count()
    );
    for move_ in move_table.moves() {
        let note = if move_.is_identity() {
            " identity, never changes a state".yellow().to_string()
        } else {
            String::new()
        };
        println!("{:>4}  order {}{note}", move_.name(), move_.order());
    }
}
