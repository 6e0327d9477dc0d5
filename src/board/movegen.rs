/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use super::{
    is_attacked_by, pins_and_checks, Board, CastleSide, CastlingRights, CheckInfo, Color,
    Direction, Move, MoveList, Piece, PieceKind, Square, KNIGHT_OFFSETS,
};

/// Generates legal moves for one side of one position.
///
/// Holds the [`CheckInfo`] for the side's King, computed once on construction,
/// and the resolution squares if the King is in single check.
/// Each per-piece generator produces pseudo-legal moves that already respect pins;
/// [`MoveGenerator::push`] then narrows them by the check state.
pub struct MoveGenerator<'a> {
    board: &'a Board,
    color: Color,
    king: Square,
    ep_square: Option<Square>,
    info: CheckInfo,
    resolution: Option<ArrayVec<Square, 7>>,
}

impl<'a> MoveGenerator<'a> {
    /// Prepares to generate moves for `color`, whose King stands on `king`.
    pub fn new(board: &'a Board, color: Color, king: Square, ep_square: Option<Square>) -> Self {
        let info = pins_and_checks(board, king, color);

        let resolution = match info.checks.as_slice() {
            [check] => Some(check.resolution_squares(king)),
            _ => None,
        };

        Self {
            board,
            color,
            king,
            ep_square,
            info,
            resolution,
        }
    }

    /// The pins and checks this generator was built with.
    #[inline(always)]
    pub fn check_info(&self) -> &CheckInfo {
        &self.info
    }

    /// Generates every legal move, castling included if `rights` allows it.
    pub fn legal_moves(&self, rights: CastlingRights) -> MoveList {
        let mut moves = MoveList::new();

        // In double check, only the King may move
        if !self.info.in_double_check() {
            for (from, piece) in self.board.iter() {
                if piece.color() != self.color || piece.is_king() {
                    continue;
                }
                self.piece_moves(from, piece, &mut moves);
            }
        }

        self.king_moves(&mut moves);

        if !self.info.in_check() {
            self.castling_moves(rights, &mut moves);
        }

        moves
    }

    /// Generates the legal moves of the single piece on `from`.
    ///
    /// Yields nothing if `from` is empty or holds an enemy piece.
    pub fn moves_from(&self, from: Square, rights: CastlingRights) -> MoveList {
        let mut moves = MoveList::new();
        let Some(piece) = self.board.piece_at(from).filter(|p| p.color() == self.color) else {
            return moves;
        };

        if piece.is_king() {
            self.king_moves(&mut moves);
            if !self.info.in_check() {
                self.castling_moves(rights, &mut moves);
            }
        } else if !self.info.in_double_check() {
            self.piece_moves(from, piece, &mut moves);
        }

        moves
    }

    /// Dispatches to the pseudo-legal generator for a non-King `piece`.
    fn piece_moves(&self, from: Square, piece: Piece, moves: &mut MoveList) {
        match piece.kind() {
            PieceKind::Pawn => self.pawn_moves(from, piece, moves),
            PieceKind::Knight => self.knight_moves(from, piece, moves),
            PieceKind::Bishop => self.slider_moves(from, piece, &Direction::DIAGONALS, moves),
            PieceKind::Rook => self.slider_moves(from, piece, &Direction::ORTHOGONALS, moves),
            PieceKind::Queen => self.slider_moves(from, piece, &Direction::ALL, moves),
            PieceKind::King => {}
        }
    }

    /// Returns `true` if `piece` may move from `from` to `to` without breaking a pin.
    ///
    /// A pinned piece may only travel along its pin's axis. Knights never move along a line, so a pinned Knight never moves.
    #[inline(always)]
    fn respects_pin(&self, from: Square, to: Square) -> bool {
        match self.info.pin_on(from) {
            Some(axis) => Direction::between(from, to).is_some_and(|d| d.is_same_axis(axis)),
            None => true,
        }
    }

    /// Adds a pseudo-legal, pin-respecting non-King move if it is legal under the current check state.
    fn push(&self, mv: Move, moves: &mut MoveList) {
        if !self.respects_pin(mv.start(), mv.end()) {
            return;
        }

        // En passant removes two pieces from the board at once, so only a full replay can tell if it is safe
        if mv.is_en_passant() {
            if self.en_passant_is_safe(&mv) {
                moves.push(mv);
            }
            return;
        }

        if let Some(resolution) = &self.resolution {
            if !resolution.contains(&mv.end()) {
                return;
            }
        }

        moves.push(mv);
    }

    /// Plays the en passant capture on a scratch board and checks the King is not exposed.
    fn en_passant_is_safe(&self, mv: &Move) -> bool {
        let mut scratch = *self.board;
        scratch.take(mv.en_passant_victim());
        scratch.take(mv.start());
        scratch.place(mv.piece_moved(), mv.end());
        !pins_and_checks(&scratch, self.king, self.color).in_check()
    }

    /// Single and double pushes, diagonal captures, and en passant.
    fn pawn_moves(&self, from: Square, piece: Piece, moves: &mut MoveList) {
        let forward = self.color.forward();

        if let Some(one) = from.offset(forward, 0).filter(|sq| !self.board.has(*sq)) {
            self.push(Move::with_piece(piece, from, one, self.board), moves);

            if from.row() == self.color.pawn_row() {
                if let Some(two) = one.offset(forward, 0).filter(|sq| !self.board.has(*sq)) {
                    self.push(Move::with_piece(piece, from, two, self.board), moves);
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(to) = from.offset(forward, d_col) else {
                continue;
            };

            match self.board.color_at(to) {
                Some(color) if color != self.color => {
                    self.push(Move::with_piece(piece, from, to, self.board), moves)
                }
                None if self.ep_square == Some(to) => {
                    let victim = Square::new_unchecked(from.row(), to.col());
                    self.push(
                        Move::en_passant(piece, from, to, self.board.piece_at(victim)),
                        moves,
                    )
                }
                _ => {}
            }
        }
    }

    fn knight_moves(&self, from: Square, piece: Piece, moves: &mut MoveList) {
        for (d_row, d_col) in KNIGHT_OFFSETS {
            let Some(to) = from.offset(d_row, d_col) else {
                continue;
            };
            if self.board.color_at(to) != Some(self.color) {
                self.push(Move::with_piece(piece, from, to, self.board), moves);
            }
        }
    }

    /// Walks each ray until the board edge, a friendly piece (excluded), or an enemy piece (included).
    fn slider_moves(&self, from: Square, piece: Piece, directions: &[Direction], moves: &mut MoveList) {
        for &direction in directions {
            for to in from.ray(direction) {
                match self.board.color_at(to) {
                    None => self.push(Move::with_piece(piece, from, to, self.board), moves),
                    Some(color) => {
                        if color != self.color {
                            self.push(Move::with_piece(piece, from, to, self.board), moves);
                        }
                        break;
                    }
                }
            }
        }
    }

    /// One step in any direction, kept only if the King would not be attacked on arrival.
    ///
    /// Safety is tested by actually moving the King on a scratch board, so a King cannot
    /// retreat along the line of a slider that is checking it.
    fn king_moves(&self, moves: &mut MoveList) {
        let Some(king) = self.board.piece_at(self.king) else {
            return;
        };

        for direction in Direction::ALL {
            let Some(to) = self.king.step(direction) else {
                continue;
            };
            if self.board.color_at(to) == Some(self.color) {
                continue;
            }

            let mut scratch = *self.board;
            scratch.take(self.king);
            scratch.place(king, to);
            if !pins_and_checks(&scratch, to, self.color).in_check() {
                moves.push(Move::with_piece(king, self.king, to, self.board));
            }
        }
    }

    /// Castling, for each side the rights still allow.
    ///
    /// The King must be on its home square with its own Rook in the corner, every square between them empty,
    /// and none of the squares the King starts on, passes through, or lands on attacked.
    fn castling_moves(&self, rights: CastlingRights, moves: &mut MoveList) {
        let back_row = self.color.back_row();
        let home = Square::new_unchecked(back_row, 4);
        let king = Piece::new(self.color, PieceKind::King);
        if self.king != home || self.board.piece_at(home) != Some(king) {
            return;
        }

        let rook = Piece::new(self.color, PieceKind::Rook);
        for side in CastleSide::ALL {
            if !rights.has(self.color, side) || self.board.piece_at(side.rook_start(self.color)) != Some(rook) {
                continue;
            }

            if home.between(side.rook_start(self.color)).any(|sq| self.board.has(sq)) {
                continue;
            }

            let destination = side.king_end(self.color);
            let safe = [home, home.between(destination).next().unwrap_or(destination), destination]
                .into_iter()
                .all(|sq| !is_attacked_by(self.board, sq, self.color.opponent()));

            if safe {
                moves.push(Move::castle(king, home, destination));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(fen: &str, color: Color) -> MoveList {
        let board = Board::from_fen(fen).unwrap();
        let king = board.find_king(color).unwrap();
        MoveGenerator::new(&board, color, king, None).legal_moves(CastlingRights::ALL)
    }

    fn uci(moves: &MoveList) -> Vec<String> {
        let mut list: Vec<_> = moves.iter().map(|mv| mv.to_uci()).collect();
        list.sort();
        list
    }

    #[test]
    fn test_startpos_has_twenty_moves() {
        let moves = moves("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", Color::White);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn test_pinned_rook_slides_along_pin() {
        // Rook on e4 is pinned by the rook on e8; it may only move along the e-file
        let moves = moves("4r2k/8/8/8/4R3/8/8/4K3", Color::White);
        let rook: Vec<_> = moves.iter().filter(|mv| mv.start() == Square::E4).collect();
        assert_eq!(rook.len(), 6);
        assert!(rook.iter().all(|mv| mv.end().col() == 4));
    }

    #[test]
    fn test_pinned_knight_is_frozen() {
        let moves = moves("4r2k/8/8/8/4N3/8/8/4K3", Color::White);
        assert!(moves.iter().all(|mv| mv.start() != Square::E4));
    }

    #[test]
    fn test_king_cannot_retreat_along_check_ray() {
        let moves = moves("k7/8/8/8/4r3/8/4K3/8", Color::White);
        assert!(!uci(&moves).contains(&"e2e1".to_string()));
        assert!(uci(&moves).contains(&"e2d1".to_string()));
    }

    #[test]
    fn test_castling_through_pawn_attack() {
        // Black pawn on e2 attacks f1 and d1 (and checks nothing)
        let moves = moves("4k3/8/8/8/8/8/4p3/R3K2R", Color::White);
        let castles: Vec<_> = moves.iter().filter(|mv| mv.is_castle()).collect();
        assert!(castles.is_empty());

        let moves = self::moves("4k3/8/8/8/8/8/8/R3K2R", Color::White);
        let castles: Vec<_> = moves.iter().filter(|mv| mv.is_castle()).collect();
        assert_eq!(castles.len(), 2);
    }

    #[test]
    fn test_en_passant_rank_exposure() {
        // Capturing en passant would clear both pawns off the fifth rank and expose the King to the rook
        let board = Board::from_fen("8/8/8/K2pP2r/8/8/8/7k").unwrap();
        let gen = MoveGenerator::new(&board, Color::White, Square::A5, Some(Square::D6));
        let moves = gen.legal_moves(CastlingRights::NONE);
        assert!(moves.iter().all(|mv| !mv.is_en_passant()));

        let board = Board::from_fen("8/8/8/3pP3/8/8/8/K6k").unwrap();
        let gen = MoveGenerator::new(&board, Color::White, Square::A1, Some(Square::D6));
        let moves = gen.legal_moves(CastlingRights::NONE);
        assert_eq!(moves.iter().filter(|mv| mv.is_en_passant()).count(), 1);
    }
}
