/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use super::{Board, Color, Direction, Piece, PieceKind, Square, KNIGHT_OFFSETS};

/// Maximum number of squares a single piece can attack (a Queen in the center of an empty board).
pub const MAX_ATTACK_TARGETS: usize = 27;

/// A friendly piece that cannot leave the line between its King and an enemy slider.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pin {
    /// Where the pinned piece stands.
    pub square: Square,
    /// Direction from the King towards the pinned piece (and the pinner behind it).
    pub direction: Direction,
}

/// An enemy piece attacking the King.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Check {
    /// Where the checking piece stands.
    pub square: Square,
    /// Direction from the King towards the checker, or `None` for a Knight.
    pub direction: Option<Direction>,
}

impl Check {
    /// The squares that resolve this check when a non-King piece moves there.
    ///
    /// For a slider, every square strictly between King and checker, plus the checker's own square.
    /// For a Knight or Pawn, only the checker's square.
    pub fn resolution_squares(&self, king: Square) -> ArrayVec<Square, 7> {
        let mut squares: ArrayVec<Square, 7> = king.between(self.square).collect();
        squares.push(self.square);
        squares
    }
}

/// Everything the legality filter needs to know about one King's safety.
///
/// Produced fresh by [`pins_and_checks`] on every query. Never cached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckInfo {
    pub pins: ArrayVec<Pin, 8>,
    pub checks: ArrayVec<Check, 16>,
}

impl CheckInfo {
    /// Returns `true` if at least one enemy piece attacks the King.
    #[inline(always)]
    pub fn in_check(&self) -> bool {
        !self.checks.is_empty()
    }

    /// Returns `true` if two or more enemy pieces attack the King.
    #[inline(always)]
    pub fn in_double_check(&self) -> bool {
        self.checks.len() > 1
    }

    /// The axis `square` is pinned along, if it is pinned at all.
    #[inline(always)]
    pub fn pin_on(&self, square: Square) -> Option<Direction> {
        self.pins
            .iter()
            .find(|pin| pin.square == square)
            .map(|pin| pin.direction)
    }
}

/// Returns `true` if an enemy `piece` one step from the King along `direction` attacks the King by contact.
#[inline(always)]
fn attacks_adjacent(piece: Piece, direction: Direction) -> bool {
    match piece.kind() {
        PieceKind::King => true,
        // Pawns only attack forwards, so the King must be "ahead" of the enemy Pawn
        PieceKind::Pawn => direction.is_diagonal() && direction.d_row() == -piece.color().forward(),
        _ => false,
    }
}

/// Computes the check status and pins for the King of `color` standing on `king`.
///
/// Scans outward along all eight rays. The first friendly piece on a ray becomes a pin candidate;
/// a second friendly piece (or the board edge) ends the ray.
/// An enemy piece that can attack along the ray becomes a check if no candidate stands in front of it, or turns the candidate into a pin.
/// Pawns and Kings only count when adjacent. Knights are checked separately, and never pin.
///
/// `king` need not hold a King: this works equally well for "would the King be safe on this square", provided
/// the King has actually been moved there on `board`.
///
/// # Example
/// ```
/// # use kingsafe::{pins_and_checks, Board, Color, Square};
/// let board = Board::from_fen("4k3/4r3/8/8/8/8/4B3/4K3").unwrap();
/// let info = pins_and_checks(&board, Square::E1, Color::White);
/// assert!(!info.in_check());
/// assert_eq!(info.pin_on(Square::E2).map(|d| d.d_row()), Some(-1));
/// ```
pub fn pins_and_checks(board: &Board, king: Square, color: Color) -> CheckInfo {
    let mut info = CheckInfo::default();

    for direction in Direction::ALL {
        let mut candidate = None;

        for (distance, square) in king.ray(direction).enumerate() {
            let Some(piece) = board.piece_at(square) else {
                continue;
            };

            if piece.color() == color {
                if candidate.is_none() {
                    candidate = Some(square);
                    continue;
                }
                break;
            }

            let slides = if direction.is_diagonal() {
                piece.is_diagonal_slider()
            } else {
                piece.is_orthogonal_slider()
            };
            let attacks = slides || (distance == 0 && attacks_adjacent(piece, direction));

            if attacks {
                match candidate {
                    Some(pinned) => info.pins.push(Pin {
                        square: pinned,
                        direction,
                    }),
                    None => info.checks.push(Check {
                        square,
                        direction: Some(direction),
                    }),
                }
            }
            break;
        }
    }

    for (d_row, d_col) in KNIGHT_OFFSETS {
        let Some(square) = king.offset(d_row, d_col) else {
            continue;
        };
        if board.piece_at(square) == Some(Piece::new(color.opponent(), PieceKind::Knight)) {
            info.checks.push(Check {
                square,
                direction: None,
            });
        }
    }

    if info.in_check() || !info.pins.is_empty() {
        tracing::trace!(
            %king,
            checks = info.checks.len(),
            pins = info.pins.len(),
            "pins_and_checks"
        );
    }

    info
}

/// Every square the `piece` on `from` attacks, whether or not it could legally move there.
///
/// Pawns attack both forward diagonals, occupied or not. Sliders stop at (and include) the first piece in their path.
/// Pins are ignored: a pinned piece still controls the squares around it.
pub fn attack_targets(board: &Board, from: Square, piece: Piece) -> ArrayVec<Square, MAX_ATTACK_TARGETS> {
    let mut targets = ArrayVec::new();

    let slide = |directions: &[Direction], targets: &mut ArrayVec<Square, MAX_ATTACK_TARGETS>| {
        for &direction in directions {
            for square in from.ray(direction) {
                targets.push(square);
                if board.has(square) {
                    break;
                }
            }
        }
    };

    match piece.kind() {
        PieceKind::Pawn => {
            let forward = piece.color().forward();
            targets.extend([-1, 1].into_iter().filter_map(|d_col| from.offset(forward, d_col)));
        }
        PieceKind::Knight => {
            targets.extend(
                KNIGHT_OFFSETS
                    .into_iter()
                    .filter_map(|(d_row, d_col)| from.offset(d_row, d_col)),
            );
        }
        PieceKind::King => targets.extend(Direction::ALL.into_iter().filter_map(|d| from.step(d))),
        PieceKind::Bishop => slide(&Direction::DIAGONALS, &mut targets),
        PieceKind::Rook => slide(&Direction::ORTHOGONALS, &mut targets),
        PieceKind::Queen => slide(&Direction::ALL, &mut targets),
    }

    targets
}

/// Returns `true` if any piece of color `attacker` attacks `square` on `board`.
///
/// # Example
/// ```
/// # use kingsafe::{is_attacked_by, Board, Color, Square};
/// let board = Board::default();
/// assert!(is_attacked_by(&board, Square::F3, Color::White));
/// assert!(!is_attacked_by(&board, Square::F3, Color::Black));
/// assert!(is_attacked_by(&board, Square::F6, Color::Black));
/// ```
pub fn is_attacked_by(board: &Board, square: Square, attacker: Color) -> bool {
    board
        .iter()
        .filter(|(_, piece)| piece.color() == attacker)
        .any(|(from, piece)| attack_targets(board, from, piece).contains(&square))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(fen: &str, king: Square, color: Color) -> CheckInfo {
        pins_and_checks(&Board::from_fen(fen).unwrap(), king, color)
    }

    #[test]
    fn test_detects_slider_and_knight_checks() {
        let rook = info("4k3/8/8/8/4r3/8/8/4K3", Square::E1, Color::White);
        assert_eq!(rook.checks.len(), 1);
        assert_eq!(rook.checks[0].direction, Some(Direction::NORTH));
        assert_eq!(
            rook.checks[0].resolution_squares(Square::E1).as_slice(),
            [Square::E2, Square::E3, Square::E4]
        );

        let knight = info("4k3/8/8/8/8/3n4/8/4K3", Square::E1, Color::White);
        assert_eq!(knight.checks.len(), 1);
        assert_eq!(knight.checks[0].direction, None);
        assert_eq!(knight.checks[0].resolution_squares(Square::E1).as_slice(), [Square::D3]);

        let double = info("4k3/8/8/8/4r3/3n4/8/4K3", Square::E1, Color::White);
        assert!(double.in_double_check());
    }

    #[test]
    fn test_pawn_checks_only_forwards() {
        // Black pawn on d2 attacks e1; a white pawn on d2 would not attack a black king on e1
        assert!(info("4k3/8/8/8/8/8/3p4/4K3", Square::E1, Color::White).in_check());
        assert!(!info("4K3/8/8/8/8/8/3P4/4k3", Square::E1, Color::Black).in_check());
        // A pawn behind the King does not attack it
        assert!(!info("4k3/8/8/8/8/8/8/3pK3", Square::E1, Color::White).in_check());
        assert!(!info("4k3/8/8/8/8/8/8/4K3", Square::E1, Color::White).in_check());
        assert!(info("4k3/8/8/8/8/8/5p2/4K3", Square::E1, Color::White).in_check());
    }

    #[test]
    fn test_pins_need_exactly_one_blocker() {
        let pinned = info("4k3/8/8/b7/8/8/3N4/4K3", Square::E1, Color::White);
        assert!(!pinned.in_check());
        assert_eq!(pinned.pin_on(Square::D2), Some(Direction::NORTH_WEST));

        // Two friendly blockers: no pin
        let shielded = info("4k3/8/8/b7/8/2P5/3N4/4K3", Square::E1, Color::White);
        assert!(shielded.pins.is_empty());

        // A rook on a diagonal neither pins nor checks
        let wrong_axis = info("4k3/8/8/r7/8/8/3N4/4K3", Square::E1, Color::White);
        assert!(wrong_axis.pins.is_empty());
        assert!(!wrong_axis.in_check());
    }

    #[test]
    fn test_attack_targets() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3").unwrap();
        let rook = attack_targets(&board, Square::A1, Piece::WHITE_ROOK);
        assert!(rook.contains(&Square::A8));
        assert!(rook.contains(&Square::E1));
        assert!(!rook.contains(&Square::F1));

        // Pawns control both diagonals even when empty, but never the square in front
        let pawn = attack_targets(&board, Square::E2, Piece::WHITE_PAWN);
        assert_eq!(pawn.as_slice(), [Square::D3, Square::F3]);
        let edge = attack_targets(&board, Square::A7, Piece::BLACK_PAWN);
        assert_eq!(edge.as_slice(), [Square::B6]);

        assert!(is_attacked_by(&board, Square::D1, Color::White));
        assert!(!is_attacked_by(&board, Square::H1, Color::White));
    }
}
