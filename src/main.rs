//! Sente: a UCT+RAVE Monte Carlo Go engine.
//!
//! ## Usage
//!
//! - `sente` - Show a demo
//! - `sente demo` - Search one position and show the engine's analysis
//! - `sente selfplay` - Let the engine play a whole game against itself
//! - `sente bench` - Measure playout speed
//!
//! Add `-v` for search progress, `-vv` for debug output. `RUST_LOG`
//! overrides both.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use sente::board::Color;
use sente::constants::{DEFAULT_BOARD_SIZE, DEFAULT_KOMI, RESIGN_MOVE};
use sente::game::GameRecord;
use sente::position::parse_coord;
use sente::search::{PassPolicy, SearchConfig, SearchController};

/// Sente: a UCT+RAVE Monte Carlo Go engine
#[derive(Parser)]
#[command(name = "sente")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct EngineArgs {
    /// Board size
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE, global = true)]
    size: usize,

    /// Komi
    #[arg(long, default_value_t = DEFAULT_KOMI, global = true)]
    komi: f32,

    /// Search threads (defaults to the number of CPUs)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Random seed
    #[arg(long, default_value_t = 1, global = true)]
    seed: u64,

    /// Simulations per move
    #[arg(long, global = true)]
    playouts: Option<usize>,

    /// Never resign
    #[arg(long, global = true)]
    no_resign: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one position and show the engine's analysis
    Demo {
        /// Moves played before the search, alternating from Black
        #[arg(long, value_delimiter = ',')]
        moves: Vec<String>,
    },
    /// Let the engine play a whole game against itself
    Selfplay {
        /// Main time per player in seconds
        #[arg(long, default_value_t = 60)]
        main_time: i32,

        /// Canadian byoyomi period in seconds
        #[arg(long, default_value_t = 0)]
        byo_time: i32,

        /// Stones per byoyomi period
        #[arg(long, default_value_t = 0)]
        byo_stones: i32,

        /// Handicap stones for Black
        #[arg(long, default_value_t = 0)]
        handicap: usize,
    },
    /// Measure playout speed on an empty board
    Bench {
        /// Number of playouts
        #[arg(long, default_value_t = 2000)]
        games: usize,
    },
}

impl EngineArgs {
    fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig {
            seed: self.seed,
            playout_limit: self.playouts,
            allow_resign: !self.no_resign,
            ..SearchConfig::default()
        };
        if let Some(threads) = self.threads {
            config.threads = threads.max(1);
        }
        config
    }

    fn new_game(&self) -> Result<GameRecord> {
        GameRecord::new(self.size, self.komi).context("cannot set up the board")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Some(Commands::Demo { moves }) => run_demo(&cli.engine, &moves),
        Some(Commands::Selfplay {
            main_time,
            byo_time,
            byo_stones,
            handicap,
        }) => run_selfplay(&cli.engine, main_time, byo_time, byo_stones, handicap),
        Some(Commands::Bench { games }) => run_bench(&cli.engine, games),
        None => run_demo(&cli.engine, &[]),
    }
}

fn run_demo(args: &EngineArgs, moves: &[String]) -> Result<()> {
    let mut game = args.new_game()?;
    let mut color = Color::Black;
    for text in moves {
        let v = parse_coord(text, &game.state().board)
            .with_context(|| format!("bad move in --moves: {text}"))?;
        game.play_move(color, v)
            .with_context(|| format!("cannot play {text} for {color}"))?;
        color = color.opponent();
    }
    println!("{}", game.state());

    let mut config = args.search_config();
    config.playout_limit.get_or_insert(5000);
    let mut search = SearchController::with_default_scorer(config);
    let mv = search.think(&mut game, color, PassPolicy::Allowed);

    let stats = search.last_stats();
    println!(
        "{color} plays {} ({:.1}%, {} playouts, {:.0}/s)",
        game.state().move_to_text(mv),
        stats.winrate * 100.0,
        stats.playouts,
        stats.playouts_per_second()
    );
    Ok(())
}

fn run_selfplay(
    args: &EngineArgs,
    main_time: i32,
    byo_time: i32,
    byo_stones: i32,
    handicap: usize,
) -> Result<()> {
    let mut game = args.new_game()?;
    game.set_time_control(main_time * 100, byo_time * 100, byo_stones, 0);
    if handicap > 0 {
        game.set_fixed_handicap(handicap)
            .context("cannot place the handicap")?;
    }
    let mut search = SearchController::with_default_scorer(args.search_config());

    let max_moves = 3 * args.size * args.size;
    while !game.is_over() {
        if game.state().move_num() >= max_moves {
            bail!("game did not finish after {max_moves} moves");
        }
        let color = game.to_move();
        let mv = search.think(&mut game, color, PassPolicy::Allowed);
        if mv == RESIGN_MOVE {
            println!("{color} resigns");
            println!("{}", game.state());
            println!("Result: {}+R", color.opponent());
            return Ok(());
        }
        let text = game.state().move_to_text(mv);
        game.play_move(color, mv)
            .with_context(|| format!("engine chose an illegal move {text}"))?;
        if game.time_control().time_forfeit(color) {
            println!("{color} loses on time");
            return Ok(());
        }
        println!("{:>3}. {color} {text}", game.state().move_num());
    }

    println!("{}", game.state());
    println!("{}", game.time_control());
    let score = search.final_score(game.state());
    println!("Result: {}", result_text(score));
    Ok(())
}

fn result_text(score: f32) -> String {
    if score > 0.0 {
        format!("B+{score:.1}")
    } else if score < 0.0 {
        format!("W+{:.1}", -score)
    } else {
        "0".to_string()
    }
}

fn run_bench(args: &EngineArgs, games: usize) -> Result<()> {
    let game = args.new_game()?;
    let search = SearchController::with_default_scorer(args.search_config());
    let mut rng = fastrand::Rng::with_seed(args.seed);
    let report = search.engine().benchmark(game.state(), games, &mut rng);
    println!(
        "{} playouts in {:.2}s: {:.0} playouts/s, mean length {:.1}, black wins {:.1}%",
        report.games,
        report.elapsed.as_secs_f64(),
        report.playouts_per_second(),
        report.mean_length(),
        100.0 * report.black_wins / report.games.max(1) as f32
    );
    Ok(())
}
