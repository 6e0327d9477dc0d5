/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};

use crate::ChessError;

use super::{
    is_attacked_by, pins_and_checks, Board, CastlingRights, CheckInfo, Color, Move,
    MoveGenerator, MoveList, Piece, PieceKind, Square,
};

/// Everything needed to take back one move exactly.
///
/// The history of a game is a single list of these, one per move made.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Ply {
    /// The move that was made.
    pub mv: Move,

    /// What the Pawn became, if `mv` was a promotion.
    pub promotion: Option<PieceKind>,

    /// Castling rights before `mv` was made.
    pub castling_rights: CastlingRights,

    /// En passant target before `mv` was made.
    pub ep_square: Option<Square>,
}

/// Whether the game can continue, and if not, how it ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    /// The side to move has at least one legal move.
    Ongoing,

    /// The side to move is in check and has no legal moves.
    Checkmate { winner: Color },

    /// The side to move is not in check, but has no legal moves.
    Stalemate,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => write!(f, "ongoing"),
            Self::Checkmate { winner } => write!(f, "checkmate, {} wins", winner.name()),
            Self::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// A game of chess.
///
/// Owns the [`Board`], whose turn it is, where each King is, the castling rights, the en passant target,
/// and the history needed to undo every move made so far.
/// It changes only through [`GameState::make_move`] and [`GameState::undo_move`].
///
/// The basic methods you're probably looking for are [`GameState::get_valid_moves`], [`GameState::make_move`], and [`GameState::undo_move`].
#[derive(Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,

    side_to_move: Color,

    /// Cached locations of both Kings, indexed by [`Color`].
    kings: [Square; Color::COUNT],

    castling_rights: CastlingRights,

    /// The square a Pawn skipped over on the previous move, if it advanced two squares.
    ep_square: Option<Square>,

    history: Vec<Ply>,
}

impl GameState {
    /// Creates a new game from the standard starting position.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::GameState;
    /// let game = GameState::new();
    /// assert_eq!(game.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
    /// assert_eq!(game.get_valid_moves().len(), 20);
    /// ```
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            side_to_move: Color::White,
            kings: [Square::E1, Square::E8],
            castling_rights: CastlingRights::ALL,
            ep_square: None,
            history: Vec::new(),
        }
    }

    /// Creates a new game from the provided FEN string.
    ///
    /// The placement, side-to-move, castling, and en passant fields are used. Move counters are accepted and ignored.
    /// Each side must have exactly one King, and the side that just moved may not be left in check.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{GameState, Color, Square};
    /// let game = GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
    /// assert_eq!(game.side_to_move(), Color::White);
    /// assert_eq!(game.ep_square(), Some(Square::D6));
    /// assert!(GameState::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut split = fen.split_whitespace();

        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements"))?;
        let board = Board::from_fen(placements)?;

        let mut kings = [Square::default(); Color::COUNT];
        for color in Color::all() {
            let king = Piece::new(color, PieceKind::King);
            let count = board.count(king);
            if count != 1 {
                bail!("FEN must have exactly one {} King. Found {count}", color.name());
            }
            kings[color] = board
                .find_king(color)
                .ok_or(anyhow!("FEN is missing the {} King", color.name()))?;
        }

        let active_color = split.next().unwrap_or("w");
        let side_to_move = Color::from_str(active_color)
            .with_context(|| format!("Invalid side to move in FEN {fen:?}"))?;

        // A King that can be taken means the previous move was illegal
        let waiting = side_to_move.opponent();
        if is_attacked_by(&board, kings[waiting], side_to_move) {
            bail!(
                "FEN leaves the {} King in check with {} to move",
                waiting.name(),
                side_to_move.name()
            );
        }

        let castling = split.next().unwrap_or("-");
        let castling_rights = CastlingRights::from_fen(castling)?;

        let ep_square = match split.next().unwrap_or("-") {
            "-" => None,
            square => {
                let square = Square::from_uci(square)?;

                // The skipped square is always one step in front of where the opponent's Pawns start
                let opponent = side_to_move.opponent();
                let ep_row = (opponent.pawn_row() as i8 + opponent.forward()) as u8;
                if square.row() != ep_row {
                    bail!(
                        "En passant square {square} is impossible with {} to move",
                        side_to_move.name()
                    );
                }
                Some(square)
            }
        };

        for counter in ["halfmove", "fullmove"] {
            if let Some(value) = split.next() {
                value.parse::<u32>().map_err(|_| {
                    anyhow!("FEN string must have a valid {counter} counter. Got {value:?}")
                })?;
            }
        }

        Ok(Self {
            board,
            side_to_move,
            kings,
            castling_rights,
            ep_square,
            history: Vec::new(),
        })
    }

    /// Generates the placement, side-to-move, castling, and en passant fields of a FEN string for this game.
    pub fn to_fen(&self) -> String {
        let ep = self
            .ep_square
            .map(|square| square.to_uci())
            .unwrap_or_else(|| String::from("-"));

        format!(
            "{} {} {} {ep}",
            self.board.to_fen(),
            self.side_to_move,
            self.castling_rights
        )
    }

    /// The [`Board`] of this game, for rendering.
    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Fetches the [`Piece`] at `square`, if there is one.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    /// Whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Where `color`'s King is.
    #[inline(always)]
    pub const fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// The square a Pawn may capture onto en passant this move, if any.
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Every move made so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[Ply] {
        &self.history
    }

    /// The most recently made move, if any.
    #[inline(always)]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|ply| ply.mv)
    }

    #[inline(always)]
    fn generator(&self) -> MoveGenerator<'_> {
        MoveGenerator::new(
            &self.board,
            self.side_to_move,
            self.king_square(self.side_to_move),
            self.ep_square,
        )
    }

    /// Pins and checks against the side-to-move's King.
    #[inline(always)]
    pub fn check_info(&self) -> CheckInfo {
        pins_and_checks(
            &self.board,
            self.king_square(self.side_to_move),
            self.side_to_move,
        )
    }

    /// Generates all legal moves for the side to move.
    ///
    /// A promotion appears once per destination square. The chosen piece is supplied to [`GameState::make_move`].
    ///
    /// # Example
    /// ```
    /// # use kingsafe::GameState;
    /// let game = GameState::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// let promotions = game.get_valid_moves().into_iter().filter(|mv| mv.is_promotion()).count();
    /// assert_eq!(promotions, 1);
    /// ```
    pub fn get_valid_moves(&self) -> MoveList {
        self.generator().legal_moves(self.castling_rights)
    }

    /// Generates the legal moves of the piece on `square`, if it belongs to the side to move.
    pub fn get_valid_moves_from(&self, square: Square) -> MoveList {
        self.generator().moves_from(square, self.castling_rights)
    }

    /// Returns `true` if the opponent of the side to move attacks `square`.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{GameState, Square};
    /// let game = GameState::new();
    /// assert!(game.square_under_attack(Square::F6));
    /// assert!(!game.square_under_attack(Square::E4));
    /// ```
    pub fn square_under_attack(&self, square: Square) -> bool {
        is_attacked_by(&self.board, square, self.side_to_move.opponent())
    }

    /// Returns `true` if the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        self.check_info().in_check()
    }

    /// Returns `true` if the side to move is in check and has no legal moves.
    pub fn is_checkmate(&self) -> bool {
        self.status() == GameStatus::Checkmate {
            winner: self.side_to_move.opponent(),
        }
    }

    /// Returns `true` if the side to move is not in check, but has no legal moves.
    pub fn is_stalemate(&self) -> bool {
        self.status() == GameStatus::Stalemate
    }

    /// Determines whether the game is over, and how.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{GameState, GameStatus, Color};
    /// let mut game = GameState::new();
    /// for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
    ///     game.make_move_uci(mv).unwrap();
    /// }
    /// assert_eq!(game.status(), GameStatus::Checkmate { winner: Color::Black });
    /// ```
    pub fn status(&self) -> GameStatus {
        let generator = self.generator();
        if !generator.legal_moves(self.castling_rights).is_empty() {
            GameStatus::Ongoing
        } else if generator.check_info().in_check() {
            GameStatus::Checkmate {
                winner: self.side_to_move.opponent(),
            }
        } else {
            GameStatus::Stalemate
        }
    }

    /// Applies `mv`, which must be one of the moves returned by [`GameState::get_valid_moves`].
    ///
    /// Legality is *not* re-checked. Use [`GameState::make_move_uci`] for a validating alternative.
    ///
    /// `promotion` must be `Some` exactly when `mv` is a promotion, and must name a Knight, Bishop, Rook, or Queen.
    /// If it does not, an error is returned and the game is left untouched.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{ChessError, GameState, Move, Piece, PieceKind, Square};
    /// let mut game = GameState::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// let mv = Move::new(Square::A7, Square::A8, game.board()).unwrap();
    ///
    /// assert_eq!(game.make_move(mv, None), Err(ChessError::MissingPromotionChoice { mv }));
    /// assert!(game.make_move(mv, Some(PieceKind::King)).is_err());
    ///
    /// game.make_move(mv, Some(PieceKind::Rook)).unwrap();
    /// assert_eq!(game.piece_at(Square::A8), Some(Piece::WHITE_ROOK));
    /// ```
    pub fn make_move(&mut self, mv: Move, promotion: Option<PieceKind>) -> Result<(), ChessError> {
        let placed = match (mv.is_promotion(), promotion) {
            (true, None) => return Err(ChessError::MissingPromotionChoice { mv }),
            (true, Some(kind)) if !kind.is_promotion_target() => {
                return Err(ChessError::InvalidPromotionChoice { kind })
            }
            (true, Some(kind)) => mv.piece_moved().promoted(kind),
            (false, Some(_)) => return Err(ChessError::UnexpectedPromotionChoice { mv }),
            (false, None) => mv.piece_moved(),
        };

        self.history.push(Ply {
            mv,
            promotion,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
        });

        let color = mv.color();
        self.board.take(mv.start());
        self.board.place(placed, mv.end());

        if mv.is_en_passant() {
            self.board.take(mv.en_passant_victim());
        }

        if let Some(side) = mv.castle_side() {
            if let Some(rook) = self.board.take(side.rook_start(color)) {
                self.board.place(rook, side.rook_end(color));
            }
        }

        if mv.piece_moved().is_king() {
            self.kings[color] = mv.end();
            self.castling_rights.revoke_all(color);
        }

        // Moving from a corner, or capturing on one, ends that corner's castling
        self.castling_rights.revoke_for_rook_square(mv.start());
        self.castling_rights.revoke_for_rook_square(mv.end());

        self.ep_square = if mv.is_pawn_double_push() {
            mv.start().offset(color.forward(), 0)
        } else {
            None
        };

        self.side_to_move = self.side_to_move.opponent();

        tracing::debug!(
            mv = %mv.to_uci_with(promotion),
            color = color.name(),
            castling = %self.castling_rights,
            ep = ?self.ep_square,
            "make_move"
        );

        Ok(())
    }

    /// Takes back the most recent move, restoring the game exactly as it was before, and returns that move.
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{ChessError, GameState};
    /// let mut game = GameState::new();
    /// assert_eq!(game.undo_move(), Err(ChessError::NothingToUndo));
    ///
    /// let mv = game.make_move_uci("e2e4").unwrap();
    /// assert_eq!(game.undo_move(), Ok(mv));
    /// assert_eq!(game, GameState::new());
    /// ```
    pub fn undo_move(&mut self) -> Result<Move, ChessError> {
        let ply = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        let mv = ply.mv;
        let color = mv.color();

        self.side_to_move = self.side_to_move.opponent();

        self.board.take(mv.end());
        self.board.place(mv.piece_moved(), mv.start());

        if let Some(captured) = mv.piece_captured() {
            // En passant victims stood beside the destination, not on it
            let square = if mv.is_en_passant() {
                mv.en_passant_victim()
            } else {
                mv.end()
            };
            self.board.place(captured, square);
        }

        if let Some(side) = mv.castle_side() {
            if let Some(rook) = self.board.take(side.rook_end(color)) {
                self.board.place(rook, side.rook_start(color));
            }
        }

        if mv.piece_moved().is_king() {
            self.kings[color] = mv.start();
        }

        self.castling_rights = ply.castling_rights;
        self.ep_square = ply.ep_square;

        tracing::debug!(mv = %mv.to_uci_with(ply.promotion), color = color.name(), "undo_move");

        Ok(mv)
    }

    /// Finds the legal move described by coordinate notation, like `e2e4` or `e7e8q`.
    ///
    /// Returns the move along with its promotion choice, ready to hand to [`GameState::make_move`].
    ///
    /// # Example
    /// ```
    /// # use kingsafe::{GameState, PieceKind, Square};
    /// let game = GameState::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// let (mv, promotion) = game.parse_move("a7a8n").unwrap();
    /// assert_eq!(mv.end(), Square::A8);
    /// assert_eq!(promotion, Some(PieceKind::Knight));
    ///
    /// assert!(game.parse_move("a7a6").is_err());
    /// ```
    pub fn parse_move(&self, mv: &str) -> Result<(Move, Option<PieceKind>)> {
        let (Some(start), Some(end), Some(promotion)) = (mv.get(0..2), mv.get(2..4), mv.get(4..))
        else {
            bail!("Move must be two squares and an optional promotion, like \"e7e8q\". Got {mv:?}");
        };

        let start = Square::from_uci(start)?;
        let end = Square::from_uci(end)?;
        let promotion = match promotion {
            "" => None,
            kind => Some(PieceKind::from_str(kind).with_context(|| format!("Parsing move {mv:?}"))?),
        };

        let legal = self
            .get_valid_moves()
            .into_iter()
            .find(|legal| legal.start() == start && legal.end() == end)
            .ok_or(anyhow!(
                "Illegal move {mv:?} for {} in position {}",
                self.side_to_move.name(),
                self.to_fen()
            ))?;

        Ok((legal, promotion))
    }

    /// Parses and applies a move in coordinate notation, returning the move made.
    ///
    /// Unlike [`GameState::make_move`], this refuses illegal moves.
    pub fn make_move_uci(&mut self, mv: &str) -> Result<Move> {
        let (legal, promotion) = self.parse_move(mv)?;
        self.make_move(legal, promotion)?;
        Ok(legal)
    }
}

impl Default for GameState {
    /// Standard starting position for Chess.
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for GameState {
    type Err = anyhow::Error;
    /// Wrapper for [`GameState::from_fen`].
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for GameState {
    /// Draws the board with the FEN, the side to move, and any checks beside it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.check_info();
        let checkers = info
            .checks
            .iter()
            .map(|check| check.square.to_uci())
            .collect::<Vec<_>>()
            .join(", ");
        let pinned = info
            .pins
            .iter()
            .map(|pin| pin.square.to_uci())
            .collect::<Vec<_>>()
            .join(", ");

        for (row, rank) in self.board.rows().iter().enumerate() {
            write!(f, "{}|", 8 - row)?;
            for square in rank {
                let c = square.map(|piece| piece.to_uci()).unwrap_or('.');
                write!(f, " {c}")?;
            }

            match row {
                1 => write!(f, "        FEN: {}", self.to_fen())?,
                2 => write!(f, "       Turn: {}", self.side_to_move.name())?,
                3 => write!(f, "   Checkers: {checkers}")?,
                4 => write!(f, "     Pinned: {pinned}")?,
                _ => {}
            }
            writeln!(f)?;
        }

        write!(f, " +----------------\n   a b c d e f g h")
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_push_sets_ep_for_one_ply() {
        let mut game = GameState::new();
        game.make_move_uci("e2e4").unwrap();
        assert_eq!(game.ep_square(), Some(Square::E3));
        game.make_move_uci("g8f6").unwrap();
        assert_eq!(game.ep_square(), None);
        game.undo_move().unwrap();
        assert_eq!(game.ep_square(), Some(Square::E3));
    }

    #[test]
    fn test_unexpected_promotion_choice_leaves_state_untouched() {
        let mut game = GameState::new();
        let (mv, _) = game.parse_move("e2e4").unwrap();
        let before = game.clone();
        assert_eq!(
            game.make_move(mv, Some(PieceKind::Queen)),
            Err(ChessError::UnexpectedPromotionChoice { mv })
        );
        assert_eq!(game, before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_fen_roundtrip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - -",
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3",
        ] {
            assert_eq!(GameState::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_fen_rejects_bad_fields() {
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w KQz - 0 1").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - e3 0 1").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - zero 1").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1").is_err());
    }

    #[test]
    fn test_fen_rejects_capturable_king() {
        // Black's King is attacked, but it is White's turn
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4RK2 w - - 0 1").is_err());
        assert!(GameState::from_fen("4k3/8/8/8/8/8/3p4/4K3 b - - 0 1").is_err());

        // The same placements are fine when the checked side is the one to move
        let game = GameState::from_fen("4k3/8/8/8/8/8/8/4RK2 b - - 0 1").unwrap();
        assert!(game.is_in_check());
        assert!(game
            .get_valid_moves()
            .iter()
            .all(|mv| mv.piece_captured().map_or(true, |piece| !piece.is_king())));
        assert!(GameState::from_fen("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").is_ok());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(GameStatus::Stalemate.to_string(), "stalemate");
        assert_eq!(
            GameStatus::Checkmate {
                winner: Color::White
            }
            .to_string(),
            "checkmate, white wins"
        );
    }
}
