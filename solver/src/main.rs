//! Generate a board, place the robots and print a shortest route to one goal.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ricochet::{BoardBuilder, GameConfig, Solver, TileCatalog};

#[derive(Parser)]
#[command(name = "solver")]
#[command(about = "Generate a board and solve one of its goals", long_about = None)]
struct Cli {
    /// Seed for the board, robots and goal; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Config file; only the solver settings are used
    #[arg(long, default_value = "ricochet.toml")]
    config: PathBuf,

    /// Search at most this many moves deep, overriding the config
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = GameConfig::load(&cli.config)?;

    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let board = BoardBuilder::generate(&TileCatalog::reference(), &mut rng)?;
    let positions = board.random_open_positions(&mut rng)?;
    let goal = board.random_goal(&mut rng).ok_or_else(|| anyhow!("board has no goals"))?;

    println!("{}", board.render(&positions));
    println!("goal: {} robot to {:?}", goal.color, goal.location(board.size()));

    let max_depth = cli.max_depth.unwrap_or(config.solver.max_depth);
    info!("searching up to {max_depth} moves");
    let route = Solver::from(&board).with_max_depth(max_depth).solve(&positions, &goal)?;

    println!("{} moves:", route.len());
    for mv in &route {
        println!("  {} -> {:?}", mv.robot, mv.to);
    }

    Ok(())
}
