/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Neg, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};

use crate::ChessError;

/// Represents a single square on an `8x8` chess board, as a `(row, col)` pair.
///
/// Row `0` is Black's back rank (rank 8) and row `7` is White's back rank (rank 1).
/// Column `0` is the a-file. The board therefore reads top-down exactly as it is drawn:
/// ```text
///        col 0 1 2 3 4 5 6 7
/// row 0 | 8  r n b q k b n r
/// row 1 | 7  p p p p p p p p
///   ...
/// row 6 | 2  P P P P P P P P
/// row 7 | 1  R N B Q K B N R
///            a b c d e f g h
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Square {
    row: u8,
    col: u8,
}

/// Generates the 64 named square constants (`Square::A1` through `Square::H8`).
macro_rules! named_squares {
    ($($name:ident = ($row:literal, $col:literal)),* $(,)?) => {
        impl Square {
            $(pub const $name: Self = Self::new_unchecked($row, $col);)*
        }
    };
}

#[rustfmt::skip]
named_squares!(
    A8 = (0, 0), B8 = (0, 1), C8 = (0, 2), D8 = (0, 3), E8 = (0, 4), F8 = (0, 5), G8 = (0, 6), H8 = (0, 7),
    A7 = (1, 0), B7 = (1, 1), C7 = (1, 2), D7 = (1, 3), E7 = (1, 4), F7 = (1, 5), G7 = (1, 6), H7 = (1, 7),
    A6 = (2, 0), B6 = (2, 1), C6 = (2, 2), D6 = (2, 3), E6 = (2, 4), F6 = (2, 5), G6 = (2, 6), H6 = (2, 7),
    A5 = (3, 0), B5 = (3, 1), C5 = (3, 2), D5 = (3, 3), E5 = (3, 4), F5 = (3, 5), G5 = (3, 6), H5 = (3, 7),
    A4 = (4, 0), B4 = (4, 1), C4 = (4, 2), D4 = (4, 3), E4 = (4, 4), F4 = (4, 5), G4 = (4, 6), H4 = (4, 7),
    A3 = (5, 0), B3 = (5, 1), C3 = (5, 2), D3 = (5, 3), E3 = (5, 4), F3 = (5, 5), G3 = (5, 6), H3 = (5, 7),
    A2 = (6, 0), B2 = (6, 1), C2 = (6, 2), D2 = (6, 3), E2 = (6, 4), F2 = (6, 5), G2 = (6, 6), H2 = (6, 7),
    A1 = (7, 0), B1 = (7, 1), C1 = (7, 2), D1 = (7, 3), E1 = (7, 4), F1 = (7, 5), G1 = (7, 6), H1 = (7, 7),
);

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Length of one side of the board.
    pub const SIDE: u8 = 8;

    /// Creates a new [`Square`] from a `(row, col)` pair.
    ///
    /// Fails with [`ChessError::InvalidSquare`] if either coordinate is outside `[0,7]`.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Square, ChessError};
    /// assert_eq!(Square::new(6, 4), Ok(Square::E2));
    /// assert_eq!(Square::new(8, 0), Err(ChessError::InvalidSquare { row: 8, col: 0 }));
    /// assert!(Square::new(0, -1).is_err());
    /// ```
    #[inline(always)]
    pub const fn new(row: i8, col: i8) -> Result<Self, ChessError> {
        if row < 0 || row >= Self::SIDE as i8 || col < 0 || col >= Self::SIDE as i8 {
            return Err(ChessError::InvalidSquare { row, col });
        }

        Ok(Self::new_unchecked(row as u8, col as u8))
    }

    /// Creates a new [`Square`] without bounds checks.
    ///
    /// # Panics
    /// If either coordinate is out of range and debug assertions are enabled.
    #[inline(always)]
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        debug_assert!(row < Self::SIDE && col < Self::SIDE);
        Self { row, col }
    }

    /// Fetches the row of this [`Square`]. `0` is rank 8.
    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.row
    }

    /// Fetches the column of this [`Square`]. `0` is the a-file.
    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// Returns `row * 8 + col`, for indexing into flat lists of 64 elements.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.row as usize * Self::SIDE as usize + self.col as usize
    }

    /// Iterates over all 64 squares, row by row, starting at a8.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::SIDE).flat_map(|row| (0..Self::SIDE).map(move |col| Self::new_unchecked(row, col)))
    }

    /// Returns the square reached by stepping `(d_row, d_col)` from this one, if it is on the board.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::Square;
    /// assert_eq!(Square::E2.offset(-2, 0), Some(Square::E4));
    /// assert_eq!(Square::H1.offset(0, 1), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, d_row: i8, d_col: i8) -> Option<Self> {
        match Self::new(self.row as i8 + d_row, self.col as i8 + d_col) {
            Ok(square) => Some(square),
            Err(_) => None,
        }
    }

    /// Returns the next square along `direction`, if it is on the board.
    #[inline(always)]
    pub const fn step(&self, direction: Direction) -> Option<Self> {
        self.offset(direction.d_row, direction.d_col)
    }

    /// Iterates over every square along `direction`, excluding this one, until the board edge.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Direction, Square};
    /// let ray: Vec<_> = Square::F6.ray(Direction::SOUTH_EAST).collect();
    /// assert_eq!(ray, [Square::G5, Square::H4]);
    /// ```
    #[inline(always)]
    pub fn ray(self, direction: Direction) -> impl Iterator<Item = Self> {
        std::iter::successors(self.step(direction), move |sq| sq.step(direction))
    }

    /// Iterates over every square strictly between `self` and `other`.
    ///
    /// Empty if the squares are adjacent or do not share a rank, file, or diagonal.
    pub fn between(self, other: Self) -> impl Iterator<Item = Self> {
        let path = Direction::between(self, other)
            .map(|direction| self.ray(direction).take_while(move |sq| *sq != other));

        path.into_iter().flatten()
    }

    /// The file letter of this [`Square`], `'a'` through `'h'`.
    #[inline(always)]
    pub const fn file_char(&self) -> char {
        (b'a' + self.col) as char
    }

    /// The rank digit of this [`Square`], `'1'` through `'8'`.
    #[inline(always)]
    pub const fn rank_char(&self) -> char {
        (b'8' - self.row) as char
    }

    /// Parses a [`Square`] from file-letter + rank-number notation, like `"e4"`.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::Square;
    /// assert_eq!(Square::from_uci("e4").unwrap(), Square::E4);
    /// assert_eq!(Square::from_uci("a8").unwrap(), Square::new(0, 0).unwrap());
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Square must be a file letter followed by a rank digit. Got {square:?}");
        };

        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) {
            bail!("Invalid file {file:?} in square {square:?}: must be in [a,h]");
        }
        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .ok_or(anyhow!("Invalid rank {rank:?} in square {square:?}: must be in [1,8]"))?;

        let row = 8 - rank as i8;
        let col = (file as u8 - b'a') as i8;
        Self::new(row, col).with_context(|| format!("Parsing square {square:?}"))
    }

    /// Converts this [`Square`] to file-letter + rank-number notation, like `"e4"`.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    /// Wrapper for [`Square::from_uci`].
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Square {
    /// Debug formatting shows both notations, like `e2 (6, 4)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({}, {})", self.row, self.col)
    }
}

/// A unit step on the board, as a `(row, col)` delta.
///
/// Each component is in `[-1, 1]`, and at least one is non-zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Direction {
    d_row: i8,
    d_col: i8,
}

impl Direction {
    pub const NORTH: Self = Self::new(-1, 0);
    pub const SOUTH: Self = Self::new(1, 0);
    pub const EAST: Self = Self::new(0, 1);
    pub const WEST: Self = Self::new(0, -1);
    pub const NORTH_EAST: Self = Self::new(-1, 1);
    pub const NORTH_WEST: Self = Self::new(-1, -1);
    pub const SOUTH_EAST: Self = Self::new(1, 1);
    pub const SOUTH_WEST: Self = Self::new(1, -1);

    /// The four rook directions.
    pub const ORTHOGONALS: [Self; 4] = [Self::NORTH, Self::SOUTH, Self::EAST, Self::WEST];

    /// The four bishop directions.
    pub const DIAGONALS: [Self; 4] = [
        Self::NORTH_EAST,
        Self::NORTH_WEST,
        Self::SOUTH_EAST,
        Self::SOUTH_WEST,
    ];

    /// All eight directions: orthogonals first, then diagonals.
    pub const ALL: [Self; 8] = [
        Self::NORTH,
        Self::SOUTH,
        Self::EAST,
        Self::WEST,
        Self::NORTH_EAST,
        Self::NORTH_WEST,
        Self::SOUTH_EAST,
        Self::SOUTH_WEST,
    ];

    const fn new(d_row: i8, d_col: i8) -> Self {
        Self { d_row, d_col }
    }

    /// Row component of this step.
    #[inline(always)]
    pub const fn d_row(&self) -> i8 {
        self.d_row
    }

    /// Column component of this step.
    #[inline(always)]
    pub const fn d_col(&self) -> i8 {
        self.d_col
    }

    /// Returns `true` if this direction changes both row and column.
    #[inline(always)]
    pub const fn is_diagonal(&self) -> bool {
        self.d_row != 0 && self.d_col != 0
    }

    /// Returns `true` if `other` lies on the same line as `self`, in either sign.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::Direction;
    /// assert!(Direction::NORTH.is_same_axis(Direction::SOUTH));
    /// assert!(!Direction::NORTH.is_same_axis(Direction::NORTH_EAST));
    /// ```
    #[inline(always)]
    pub fn is_same_axis(&self, other: Self) -> bool {
        *self == other || *self == -other
    }

    /// The direction to walk from `from` to reach `to` in a straight line.
    ///
    /// Returns `None` if the squares are identical, or not on a shared rank, file, or diagonal.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{Direction, Square};
    /// assert_eq!(Direction::between(Square::A1, Square::H8), Some(Direction::NORTH_EAST));
    /// assert_eq!(Direction::between(Square::E1, Square::E8), Some(Direction::NORTH));
    /// assert_eq!(Direction::between(Square::B1, Square::C3), None);
    /// ```
    pub fn between(from: Square, to: Square) -> Option<Self> {
        let d_row = to.row() as i8 - from.row() as i8;
        let d_col = to.col() as i8 - from.col() as i8;

        let aligned = d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs();
        if (d_row, d_col) == (0, 0) || !aligned {
            return None;
        }

        Some(Self::new(d_row.signum(), d_col.signum()))
    }
}

impl Neg for Direction {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self::new(-self.d_row, -self.d_col)
    }
}

/// The eight `(row, col)` jumps of a Knight.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
