/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    sync::{atomic::AtomicBool, Arc},
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stoat::{
    perft, splitperft, HistoryTable, LogInfo, Move, Position, Search, SearchConfig, TTable,
    FEN_STARTPOS,
};

/// Command-line driver for the stoat engine.
#[derive(Debug, Parser)]
#[command(about, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Count the leaf positions reachable from a position.
    Perft {
        /// Depth to enumerate to.
        depth: usize,

        /// Position to enumerate from, as a FEN string.
        #[arg(short, long, default_value = FEN_STARTPOS)]
        fen: String,

        /// Moves to apply to the position before enumerating, in coordinate
        /// notation (e2e4, e7e8q, ...).
        #[arg(short, long, num_args = 0.., value_name = "MOVE")]
        moves: Vec<String>,
    },

    /// Like perft, but report the subtree count under each root move.
    Divide {
        /// Depth to enumerate to.
        depth: usize,

        /// Position to enumerate from, as a FEN string.
        #[arg(short, long, default_value = FEN_STARTPOS)]
        fen: String,

        /// Moves to apply to the position before enumerating.
        #[arg(short, long, num_args = 0.., value_name = "MOVE")]
        moves: Vec<String>,
    },

    /// Search a position for the best move.
    Search {
        /// Position to search, as a FEN string.
        #[arg(short, long, default_value = FEN_STARTPOS)]
        fen: String,

        /// Moves to apply to the position before searching.
        #[arg(short, long, num_args = 0.., value_name = "MOVE")]
        moves: Vec<String>,

        /// Maximum depth to search to, in plies.
        #[arg(short, long)]
        depth: Option<u8>,

        /// Think time budget, in milliseconds.
        #[arg(short = 't', long)]
        movetime: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Perft { depth, fen, moves } => {
            let mut position = setup(&fen, &moves)?;

            let start = Instant::now();
            let nodes = perft(&mut position, depth);
            let elapsed = start.elapsed();

            let nps = nodes as f64 / elapsed.as_secs_f64();
            println!("{nodes}");
            println!("elapsed {}ms ({nps:.0} nps)", elapsed.as_millis());
        }

        Command::Divide { depth, fen, moves } => {
            let mut position = setup(&fen, &moves)?;
            let nodes = splitperft(&mut position, depth);
            println!("total {nodes}");
        }

        Command::Search {
            fen,
            moves,
            depth,
            movetime,
        } => {
            let mut position = setup(&fen, &moves)?;

            let mut config = match movetime {
                Some(ms) => SearchConfig::with_movetime(Duration::from_millis(ms)),
                None => SearchConfig::default(),
            };
            if let Some(depth) = depth {
                config.max_depth = depth;
            }
            if depth.is_none() && movetime.is_none() {
                // Neither bound supplied; pick a sane default budget
                config.max_depth = 9;
            }

            let is_searching = Arc::new(AtomicBool::new(true));
            let mut ttable = TTable::default();
            let mut history = HistoryTable::default();

            let search =
                Search::<LogInfo>::new(is_searching, config, Vec::new(), &mut ttable, &mut history);
            search.start(&mut position);
        }
    }

    Ok(())
}

/// Parse `fen`, then apply `moves` in order, rejecting any move that is not
/// legal in the position it is applied to.
fn setup(fen: &str, moves: &[String]) -> Result<Position> {
    let mut position =
        Position::from_fen(fen).with_context(|| format!("Invalid FEN {fen:?}"))?;

    for mv_str in moves {
        let mv = Move::from_coord(&position, mv_str)?;
        if !position.get_legal_moves().contains(&mv) {
            bail!("Move {mv_str:?} is not legal on {:?}", position.to_fen());
        }
        position.make_move(mv);
    }

    Ok(position)
}
