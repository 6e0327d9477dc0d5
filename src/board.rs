/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Check and pin detection, and attacked-square queries.
mod attacks;

/// The game itself: applying and reversing moves, and asking what is legal.
mod game;

/// Per-piece move generators and the legality filter.
mod movegen;

/// The [`Move`] type and move lists.
mod moves;

/// Move-generation node counting.
mod perft;

/// Colors, pieces, and their kinds.
mod piece;

/// The board grid and castling rights.
mod position;

/// Board coordinates and directions.
mod square;

/// Misc constants.
mod utils;

pub use attacks::*;
pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
pub use utils::*;
