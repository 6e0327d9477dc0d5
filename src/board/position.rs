/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{anyhow, bail, Result};

use super::{Color, Piece, PieceKind, Square};

/// Which side of the board a castle happens on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CastleSide {
    /// King side: the King lands on the g-file and the Rook on the f-file.
    Short,
    /// Queen side: the King lands on the c-file and the Rook on the d-file.
    Long,
}

impl CastleSide {
    /// Both sides, King side first.
    pub const ALL: [Self; 2] = [Self::Short, Self::Long];

    /// Column of the Rook that castles on this side, before castling.
    #[inline(always)]
    pub const fn rook_start_col(&self) -> u8 {
        match self {
            Self::Short => 7,
            Self::Long => 0,
        }
    }

    /// Column the Rook lands on after castling.
    #[inline(always)]
    pub const fn rook_end_col(&self) -> u8 {
        match self {
            Self::Short => 5,
            Self::Long => 3,
        }
    }

    /// Column the King lands on after castling.
    #[inline(always)]
    pub const fn king_end_col(&self) -> u8 {
        match self {
            Self::Short => 6,
            Self::Long => 2,
        }
    }

    /// The side a King move from column `from_col` to column `to_col` castles towards.
    #[inline(always)]
    pub const fn from_king_cols(from_col: u8, to_col: u8) -> Self {
        if to_col > from_col {
            Self::Short
        } else {
            Self::Long
        }
    }

    /// The Rook's starting square for `color` on this side.
    #[inline(always)]
    pub const fn rook_start(&self, color: Color) -> Square {
        Square::new_unchecked(color.back_row(), self.rook_start_col())
    }

    /// The Rook's destination square for `color` on this side.
    #[inline(always)]
    pub const fn rook_end(&self, color: Color) -> Square {
        Square::new_unchecked(color.back_row(), self.rook_end_col())
    }

    /// The King's destination square for `color` on this side.
    #[inline(always)]
    pub const fn king_end(&self, color: Color) -> Square {
        Square::new_unchecked(color.back_row(), self.king_end_col())
    }
}

/// The four independent castling rights: one per (color, side).
///
/// Rights only ever go from `true` to `false` during play. Undoing a move restores the snapshot taken before it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights {
    /// Indexed by [`Color`], then `[short, long]`.
    rights: [[bool; 2]; Color::COUNT],
}

impl CastlingRights {
    /// All four rights granted, as at the start of a game.
    pub const ALL: Self = Self {
        rights: [[true; 2]; Color::COUNT],
    };

    /// No rights at all.
    pub const NONE: Self = Self {
        rights: [[false; 2]; Color::COUNT],
    };

    #[inline(always)]
    const fn side_index(side: CastleSide) -> usize {
        match side {
            CastleSide::Short => 0,
            CastleSide::Long => 1,
        }
    }

    /// Returns `true` if `color` may still castle on `side`.
    #[inline(always)]
    pub const fn has(&self, color: Color, side: CastleSide) -> bool {
        self.rights[color.index()][Self::side_index(side)]
    }

    /// Revokes `color`'s right to castle on `side`.
    #[inline(always)]
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.rights[color][Self::side_index(side)] = false;
    }

    /// Revokes both of `color`'s rights.
    #[inline(always)]
    pub fn revoke_all(&mut self, color: Color) {
        self.rights[color] = [false; 2];
    }

    /// Revokes whichever right is tied to a Rook starting on `square`, if any.
    ///
    /// Used both when a Rook leaves its corner and when it is captured there.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{CastlingRights, Square};
    /// let mut rights = CastlingRights::ALL;
    /// rights.revoke_for_rook_square(Square::A8);
    /// assert_eq!(rights.to_string(), "KQk");
    /// rights.revoke_for_rook_square(Square::E4);
    /// assert_eq!(rights.to_string(), "KQk");
    /// ```
    pub fn revoke_for_rook_square(&mut self, square: Square) {
        for color in Color::all() {
            for side in CastleSide::ALL {
                if side.rook_start(color) == square {
                    self.revoke(color, side);
                }
            }
        }
    }

    /// Parses the castling field of a FEN string, like `"KQkq"` or `"-"`.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{CastlingRights, CastleSide, Color};
    /// let rights = CastlingRights::from_fen("Kq").unwrap();
    /// assert!(rights.has(Color::White, CastleSide::Short));
    /// assert!(!rights.has(Color::White, CastleSide::Long));
    /// assert!(rights.has(Color::Black, CastleSide::Long));
    /// ```
    pub fn from_fen(castling: &str) -> Result<Self> {
        let mut rights = Self::NONE;
        if castling == "-" {
            return Ok(rights);
        }

        for c in castling.chars() {
            let (color, side) = match c {
                'K' => (Color::White, CastleSide::Short),
                'Q' => (Color::White, CastleSide::Long),
                'k' => (Color::Black, CastleSide::Short),
                'q' => (Color::Black, CastleSide::Long),
                _ => bail!("Invalid castling char {c:?} in {castling:?}: must be one of KQkq"),
            };
            rights.rights[color][Self::side_index(side)] = true;
        }

        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    /// Displays rights in FEN order, `KQkq`, or `-` when none remain.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut any = false;
        for (color, side, c) in [
            (Color::White, CastleSide::Short, 'K'),
            (Color::White, CastleSide::Long, 'Q'),
            (Color::Black, CastleSide::Short, 'k'),
            (Color::Black, CastleSide::Long, 'q'),
        ] {
            if self.has(color, side) {
                write!(f, "{c}")?;
                any = true;
            }
        }

        if !any {
            write!(f, "-")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastlingRights({self})")
    }
}

/// All pieces and their locations on an `8x8` board.
///
/// Has no knowledge of castling rights, en passant, or side to move. If you need those, see [`crate::GameState`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Indexed by `[row][col]`.
    grid: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// Creates a new, empty [`Board`].
    ///
    /// # Example
    /// ```
    /// # use kingsafe::Board;
    /// let board = Board::new();
    /// assert_eq!(board.to_fen(), "8/8/8/8/8/8/8/8");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            grid: [[None; 8]; 8],
        }
    }

    /// Constructs a [`Board`] from the placement field of a FEN string.
    ///
    /// Anything after the first space is ignored.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Board, Piece, Square};
    /// let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    /// assert_eq!(board.piece_at(Square::H1), Some(Piece::WHITE_ROOK));
    /// assert_eq!(board.piece_at(Square::E8), Some(Piece::BLACK_KING));
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut board = Self::new();

        let placements = fen
            .split_whitespace()
            .next()
            .ok_or(anyhow!("FEN string must have piece placements"))?;

        let ranks: Vec<&str> = placements.split('/').collect();
        if ranks.len() != Square::SIDE as usize {
            bail!(
                "FEN must have piece placements for all 8 ranks. Got {} in {placements:?}",
                ranks.len()
            );
        }

        // FEN lists rank 8 first, which is row 0
        for (row, rank) in ranks.into_iter().enumerate() {
            let mut col = 0;
            for c in rank.chars() {
                if let Some(empty) = c.to_digit(10) {
                    col += empty as usize;
                    continue;
                }

                let piece = Piece::from_uci(c).map_err(|_| {
                    anyhow!("FEN placements must contain piece chars or digits. Got {c:?}")
                })?;
                if col >= Square::SIDE as usize {
                    bail!("Rank {rank:?} in FEN placements describes more than 8 squares");
                }
                board.grid[row][col] = Some(piece);
                col += 1;
            }

            if col != Square::SIDE as usize {
                bail!("Rank {rank:?} in FEN placements must describe exactly 8 squares");
            }
        }

        Ok(board)
    }

    /// Returns `true` if there is a piece at `square`.
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.grid[square.row() as usize][square.col() as usize].is_some()
    }

    /// Fetches the [`Piece`] at `square`, if there is one.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Board, Piece, Square};
    /// let board = Board::default();
    /// assert_eq!(board.piece_at(Square::E1), Some(Piece::WHITE_KING));
    /// assert!(board.piece_at(Square::E4).is_none());
    /// ```
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.grid[square.row() as usize][square.col() as usize]
    }

    /// Fetches the [`Color`] of the piece at `square`, if there is one.
    #[inline(always)]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.piece_at(square).map(|piece| piece.color())
    }

    /// Places `piece` on `square`, replacing whatever was there.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self[square] = Some(piece);
    }

    /// Removes and returns the [`Piece`] on `square`, if there is one.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Board, Piece, Square};
    /// let mut board = Board::default();
    /// assert_eq!(board.take(Square::G1), Some(Piece::WHITE_KNIGHT));
    /// assert!(!board.has(Square::G1));
    /// ```
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self[square].take()
    }

    /// Finds the square of `color`'s King, if it is on the board.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        Square::iter().find(|sq| self.piece_at(*sq) == Some(king))
    }

    /// Counts how many of `piece` are on the board.
    pub fn count(&self, piece: Piece) -> usize {
        self.iter().filter(|(_, p)| *p == piece).count()
    }

    /// Iterates over every occupied square and the piece on it, row by row from a8.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Rows of the board, for renderers. Row `0` is rank 8.
    #[inline(always)]
    pub const fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.grid
    }

    /// Generates the placement field of a FEN string for this [`Board`].
    pub fn to_fen(&self) -> String {
        let mut placements = String::with_capacity(72);

        for (row, rank) in self.grid.iter().enumerate() {
            let mut empty = 0;
            for square in rank {
                match square {
                    Some(piece) => {
                        if empty > 0 {
                            placements.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placements.push(piece.to_uci());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                placements.push_str(&empty.to_string());
            }
            if row != 7 {
                placements.push('/');
            }
        }

        placements
    }
}

impl Default for Board {
    /// The standard starting position.
    #[inline(always)]
    fn default() -> Self {
        let mut board = Self::new();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for color in Color::all() {
            for (col, kind) in back_rank.into_iter().enumerate() {
                let col = col as u8;
                board.place(
                    Piece::new(color, kind),
                    Square::new_unchecked(color.back_row(), col),
                );
                board.place(
                    Piece::new(color, PieceKind::Pawn),
                    Square::new_unchecked(color.pawn_row(), col),
                );
            }
        }

        board
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;
    /// Wrapper for [`Board::from_fen`].
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.grid[index.row() as usize][index.col() as usize]
    }
}

impl IndexMut<Square> for Board {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.grid[index.row() as usize][index.col() as usize]
    }
}

impl fmt::Display for Board {
    /// Draws the board from White's point of view, rank 8 at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, rank) in self.grid.iter().enumerate() {
            write!(f, "{}|", 8 - row)?;
            for square in rank {
                let c = square.map(|piece| piece.to_uci()).unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }

        write!(f, " +----------------\n   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_is_startpos() {
        let board = Board::default();
        assert_eq!(board.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        assert_eq!(board.find_king(Color::White), Some(Square::E1));
        assert_eq!(board.find_king(Color::Black), Some(Square::E8));
        assert_eq!(board.iter().count(), 32);
    }

    #[test]
    fn test_board_fen_roundtrip() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R";
        assert_eq!(Board::from_fen(fen).unwrap().to_fen(), fen);
    }

    #[test]
    fn test_board_fen_rejects_malformed_placements() {
        assert!(Board::from_fen("8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("ppppppppp/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("x7/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_castling_rights_fen() {
        assert_eq!(CastlingRights::from_fen("KQkq").unwrap(), CastlingRights::ALL);
        assert_eq!(CastlingRights::from_fen("-").unwrap(), CastlingRights::NONE);
        assert_eq!(CastlingRights::NONE.to_string(), "-");
        assert!(CastlingRights::from_fen("KX").is_err());

        let mut rights = CastlingRights::ALL;
        rights.revoke_all(Color::White);
        assert_eq!(rights.to_string(), "kq");
        rights.revoke(Color::Black, CastleSide::Short);
        assert_eq!(rights.to_string(), "q");
    }
}
