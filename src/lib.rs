/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// All board representation and rules: squares, pieces, moves, legality, and the game itself.
mod board;

/// Command-line interface for inspecting positions.
mod cli;

/// The engine's error type.
mod error;

pub use board::*;
pub use cli::*;
pub use error::*;
