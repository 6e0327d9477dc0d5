/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::ChessError;

use super::{Board, CastleSide, Color, Piece, PieceKind, Square};

/// Maximum possible number of moves in a given chess position.
///
/// Found [here](<https://www.chessprogramming.org/Chess_Position#cite_note-4>)
pub const MAX_NUM_MOVES: usize = 218;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// Represents a move made on a chess board.
///
/// A [`Move`] remembers which piece moved and which piece (if any) it captured, as they were on the board it was created from.
/// That makes it self-contained: undoing it never needs to look anything up again.
///
/// Two moves are equal only if every field is equal. A promotion's chosen piece is *not* part of the move;
/// it is supplied separately to [`crate::GameState::make_move`].
/// If you only care about the squares, as a UI matching a click against the legal moves does, use [`Move::same_squares`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    start: Square,
    end: Square,
    piece_moved: Piece,
    piece_captured: Option<Piece>,
    is_en_passant: bool,
    is_castle: bool,
    is_promotion: bool,
}

impl Move {
    /// Creates a new [`Move`] for whatever piece stands on `start` in `board`.
    ///
    /// Special-move flags are inferred from the board, the same way a human reads them:
    /// a King travelling two files is castling, a Pawn moving diagonally onto an empty square is capturing en passant,
    /// and a Pawn reaching the far back row is promoting.
    ///
    /// Fails with [`ChessError::EmptySquare`] if there is nothing on `start` to move.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Board, Move, Piece, Square};
    /// let board = Board::default();
    /// let mv = Move::new(Square::E2, Square::E4, &board).unwrap();
    /// assert_eq!(mv.piece_moved(), Piece::WHITE_PAWN);
    /// assert_eq!(mv.to_string(), "e2e4");
    /// assert!(Move::new(Square::E4, Square::E5, &board).is_err());
    /// ```
    pub fn new(start: Square, end: Square, board: &Board) -> Result<Self, ChessError> {
        let piece = board
            .piece_at(start)
            .ok_or(ChessError::EmptySquare { square: start })?;

        let mv = match piece.kind() {
            PieceKind::King if start.col().abs_diff(end.col()) == 2 && start.row() == end.row() => {
                Self::castle(piece, start, end)
            }

            PieceKind::Pawn if start.col() != end.col() && !board.has(end) => {
                let victim = Square::new_unchecked(start.row(), end.col());
                Self::en_passant(piece, start, end, board.piece_at(victim))
            }

            _ => Self::with_piece(piece, start, end, board),
        };

        Ok(mv)
    }

    /// Creates a new [`Move`] from raw `(row, col)` coordinate pairs.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Board, ChessError, Move, Square};
    /// let board = Board::default();
    /// let mv = Move::from_coords((7, 6), (5, 5), &board).unwrap();
    /// assert_eq!(mv.start(), Square::G1);
    /// assert_eq!(mv.end(), Square::F3);
    /// assert_eq!(
    ///     Move::from_coords((7, 6), (8, 5), &board),
    ///     Err(ChessError::InvalidSquare { row: 8, col: 5 })
    /// );
    /// ```
    pub fn from_coords(start: (i8, i8), end: (i8, i8), board: &Board) -> Result<Self, ChessError> {
        let start = Square::new(start.0, start.1)?;
        let end = Square::new(end.0, end.1)?;
        Self::new(start, end, board)
    }

    /// A plain move or capture of `piece` from `start` to `end`.
    ///
    /// Promotion is detected structurally: a Pawn landing on its promotion row always promotes.
    #[inline(always)]
    pub(crate) fn with_piece(piece: Piece, start: Square, end: Square, board: &Board) -> Self {
        Self {
            start,
            end,
            piece_moved: piece,
            piece_captured: board.piece_at(end),
            is_en_passant: false,
            is_castle: false,
            is_promotion: piece.is_pawn() && end.row() == piece.color().promotion_row(),
        }
    }

    /// An en passant capture. `victim` is the Pawn beside `start`, not on `end`.
    #[inline(always)]
    pub(crate) fn en_passant(piece: Piece, start: Square, end: Square, victim: Option<Piece>) -> Self {
        Self {
            start,
            end,
            piece_moved: piece,
            piece_captured: victim,
            is_en_passant: true,
            is_castle: false,
            is_promotion: false,
        }
    }

    /// A castle, expressed as the King's two-file move.
    #[inline(always)]
    pub(crate) fn castle(king: Piece, start: Square, end: Square) -> Self {
        Self {
            start,
            end,
            piece_moved: king,
            piece_captured: None,
            is_en_passant: false,
            is_castle: true,
            is_promotion: false,
        }
    }

    /// The square this move starts from.
    #[inline(always)]
    pub const fn start(&self) -> Square {
        self.start
    }

    /// The square this move lands on.
    #[inline(always)]
    pub const fn end(&self) -> Square {
        self.end
    }

    /// The piece that moves.
    #[inline(always)]
    pub const fn piece_moved(&self) -> Piece {
        self.piece_moved
    }

    /// The piece this move removes from the board, if any.
    ///
    /// For en passant this is the Pawn standing beside the start square.
    #[inline(always)]
    pub const fn piece_captured(&self) -> Option<Piece> {
        self.piece_captured
    }

    /// The [`Color`] of the side making this move.
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.piece_moved.color()
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        self.is_en_passant
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        self.is_castle
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.is_promotion
    }

    /// Returns `true` if this move removes an enemy piece, en passant included.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.piece_captured.is_some()
    }

    /// Returns `true` if this is a Pawn advancing two squares from its starting row.
    #[inline(always)]
    pub const fn is_pawn_double_push(&self) -> bool {
        self.piece_moved.is_pawn() && self.start.row().abs_diff(self.end.row()) == 2
    }

    /// The square of the Pawn removed by an en passant capture: same row as `start`, same column as `end`.
    #[inline(always)]
    pub const fn en_passant_victim(&self) -> Square {
        Square::new_unchecked(self.start.row(), self.end.col())
    }

    /// Which side this move castles towards, if it is a castle.
    #[inline(always)]
    pub const fn castle_side(&self) -> Option<CastleSide> {
        if self.is_castle {
            Some(CastleSide::from_king_cols(self.start.col(), self.end.col()))
        } else {
            None
        }
    }

    /// Returns `true` if `other` travels between the same two squares, ignoring everything else.
    #[inline(always)]
    pub fn same_squares(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// Converts this move into coordinate notation, like `e2e4`.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Board, Move, Square};
    /// let mv = Move::new(Square::B1, Square::C3, &Board::default()).unwrap();
    /// assert_eq!(mv.to_uci(), "b1c3");
    /// ```
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.start, self.end)
    }

    /// Like [`Move::to_uci`], with the promotion letter appended if one is given, like `e7e8q`.
    pub fn to_uci_with(&self, promotion: Option<PieceKind>) -> String {
        match promotion {
            Some(kind) => format!("{}{}", self.to_uci(), kind.to_uci()),
            None => self.to_uci(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)
    }
}

impl fmt::Debug for Move {
    /// Debug formatting names the piece and any special flags, like `e5d6 (white pawn, en passant)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({}", self.piece_moved.name())?;
        if let Some(captured) = self.piece_captured {
            write!(f, ", takes {}", captured.name())?;
        }
        if self.is_en_passant {
            write!(f, ", en passant")?;
        }
        if self.is_castle {
            write!(f, ", castle")?;
        }
        if self.is_promotion {
            write!(f, ", promotion")?;
        }
        write!(f, ")")
    }
}
