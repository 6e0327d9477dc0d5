/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::{perft, splitperft, GameState, Square, FEN_STARTPOS};

/// Inspect chess positions: legal moves, perft counts, and games played out move by move.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Position to start from, as a FEN string.
    #[arg(short, long, default_value = FEN_STARTPOS)]
    pub fen: String,

    /// Log filter, like `debug` or `kingsafe=trace`.
    ///
    /// If unset, `RUST_LOG` is used, and if that is unset too, only warnings are shown.
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do with the position.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "lower")]
pub enum Command {
    /// Print a visual representation of the position and whether the game is over.
    #[command(alias = "d")]
    Display,

    /// Shows all legal moves in the position, or for a specific piece.
    Moves {
        square: Option<Square>,

        /// If set, moves will be printed using their debug formatter, which displays the piece and any special flags.
        #[arg(short, long, default_value = "false")]
        debug: bool,
    },

    /// Performs a perft on the position at the supplied depth, printing total node count.
    Perft {
        depth: usize,

        /// If set, the node count below each root move is printed as well.
        #[arg(short, long, default_value = "false")]
        split: bool,
    },

    /// Plays a sequence of moves in coordinate notation (like `e2e4` or `e7e8q`), then prints the result.
    Play {
        moves: Vec<String>,

        /// Take back this many moves after playing them all.
        #[arg(short, long, default_value = "0")]
        undo: usize,
    },
}

impl Cli {
    /// Executes the parsed command against the starting position.
    pub fn run(self) -> Result<()> {
        let mut game = GameState::from_fen(&self.fen)
            .with_context(|| format!("Invalid FEN {:?}", self.fen))?;

        match self.command {
            Command::Display => {
                println!("{game}");
                println!("Status: {}", game.status());
            }

            Command::Moves { square, debug } => {
                let mut moves = match square {
                    Some(square) => game.get_valid_moves_from(square),
                    None => game.get_valid_moves(),
                };
                moves.sort_by_key(|mv| (mv.start(), mv.end()));

                let strings: Vec<_> = moves
                    .iter()
                    .map(|mv| if debug { format!("{mv:?}") } else { mv.to_uci() })
                    .collect();
                let sep = if debug { "\n" } else { " " };
                println!("{}", strings.join(sep));

                if debug {
                    let captures = moves.iter().filter(|mv| mv.is_capture()).count();
                    println!("{} moves, {captures} captures", moves.len());
                }
            }

            Command::Perft { depth, split } => {
                let now = Instant::now();
                let nodes = if split {
                    splitperft(&game, depth)?
                } else {
                    perft(&game, depth)?
                };
                let elapsed = now.elapsed();

                if split {
                    println!();
                }
                println!("{nodes}");
                tracing::info!(depth, nodes, ?elapsed, "perft finished");
            }

            Command::Play { moves, undo } => {
                for mv in &moves {
                    game.make_move_uci(mv)
                        .with_context(|| format!("Failed to play {mv:?}"))?;
                }
                for _ in 0..undo {
                    game.undo_move()?;
                }

                println!("{game}");
                println!("Status: {}", game.status());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["kingsafe", "perft", "3", "--split"]).unwrap();
        assert_eq!(cli.fen, FEN_STARTPOS);
        assert!(matches!(cli.command, Command::Perft { depth: 3, split: true }));

        let cli = Cli::try_parse_from(["kingsafe", "--fen", "8/8/8/8/8/8/8/K6k w - - 0 1", "moves", "a1"])
            .unwrap();
        assert!(matches!(cli.command, Command::Moves { square: Some(Square::A1), debug: false }));

        let cli = Cli::try_parse_from(["kingsafe", "play", "e2e4", "e7e5", "--undo", "1"]).unwrap();
        assert!(matches!(cli.command, Command::Play { ref moves, undo: 1 } if moves.len() == 2));

        assert!(Cli::try_parse_from(["kingsafe", "moves", "z9"]).is_err());
    }

    #[test]
    fn test_cli_play_rejects_illegal_moves() {
        let cli = Cli::try_parse_from(["kingsafe", "play", "e2e5"]).unwrap();
        assert!(cli.run().is_err());
    }
}
