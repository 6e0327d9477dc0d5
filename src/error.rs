/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use crate::{Move, PieceKind, Square};

/// Errors returned by the rules engine.
///
/// These are all caller errors: asking for something the current state cannot give.
/// Parsing errors (FEN strings, coordinate notation) are reported through [`anyhow::Error`] instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChessError {
    /// A coordinate pair fell outside of `[0, 7]`.
    #[error("Invalid square: ({row}, {col}) must both be within [0,7]")]
    InvalidSquare { row: i8, col: i8 },

    /// A move was requested from a square with no piece on it.
    #[error("There is no piece on {square} to move")]
    EmptySquare { square: Square },

    /// [`crate::GameState::undo_move`] was called with an empty move log.
    #[error("Nothing to undo: no moves have been made")]
    NothingToUndo,

    /// A promotion move was made without saying what the Pawn becomes.
    #[error("Move {mv} is a promotion, but no promotion piece was supplied")]
    MissingPromotionChoice { mv: Move },

    /// Pawns can only promote to a Knight, Bishop, Rook, or Queen.
    #[error("Cannot promote to a {}", .kind.name())]
    InvalidPromotionChoice { kind: PieceKind },

    /// A promotion piece was supplied for a move that does not promote.
    #[error("Move {mv} is not a promotion, but a promotion piece was supplied")]
    UnexpectedPromotionChoice { mv: Move },
}
