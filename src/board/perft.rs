/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::ChessError;

use super::{GameState, PieceKind};

/// Every promotion choice, in the order perft expands them.
const PROMOTION_CHOICES: [Option<PieceKind>; 4] = [
    Some(PieceKind::Knight),
    Some(PieceKind::Bishop),
    Some(PieceKind::Rook),
    Some(PieceKind::Queen),
];

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// Each promotion counts once per piece it could become.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
///
/// # Example
/// ```
/// # use kingsafe::{perft, GameState};
/// let game = GameState::new();
/// assert_eq!(perft(&game, 2).unwrap(), 400);
/// ```
#[inline(always)]
pub fn perft(game: &GameState, depth: usize) -> Result<u64, ChessError> {
    perft_generic::<true, false>(&mut game.clone(), depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each move available at the root node.
///
/// Uses bulk counting below the root, like [`perft`].
#[inline(always)]
pub fn splitperft(game: &GameState, depth: usize) -> Result<u64, ChessError> {
    perft_generic::<true, true>(&mut game.clone(), depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will print each root move and its node count.
///
/// Moves are made and undone on `game` in place, so it ends in the position it started in.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    game: &mut GameState,
    depth: usize,
) -> Result<u64, ChessError> {
    // Recursion limit; return 1, since we're fathoming this node.
    if depth == 0 {
        return Ok(1);
    }

    let moves = game.get_valid_moves();

    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && !SPLIT && depth == 1 {
        let nodes = moves
            .iter()
            .map(|mv| if mv.is_promotion() { PROMOTION_CHOICES.len() as u64 } else { 1 })
            .sum();
        return Ok(nodes);
    }

    let mut nodes = 0;
    for mv in moves {
        let choices: &[Option<PieceKind>] = if mv.is_promotion() {
            &PROMOTION_CHOICES
        } else {
            &[None]
        };

        for &promotion in choices {
            game.make_move(mv, promotion)?;
            let new_nodes = perft_generic::<BULK, false>(game, depth - 1)?;
            game.undo_move()?;

            if SPLIT {
                println!("{}\t{new_nodes}", mv.to_uci_with(promotion));
            }

            nodes += new_nodes;
        }
    }

    Ok(nodes)
}
