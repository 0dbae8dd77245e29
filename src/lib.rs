//! A rules engine and referee for two-player chess.
//!
//! The crate validates player actions against the FIDE rules of movement,
//! applies them to a game state, maintains an incrementally-updated Zobrist
//! hash for repetition detection, and decides terminal outcomes: checkmate,
//! stalemate, resignation, draw agreement, claimed and automatic draws by
//! repetition or by the fifty/seventy-five-move rules.
//!
//! The crate is a pure value-oriented library. Command parsing, transports
//! and board rendering are the concern of the embedding application, which
//! drives the game through [`game_round`]:
//!
//! ```
//! use arbiter::{game_round, Action, GameHistory, Status};
//!
//! let mut history = GameHistory::new();
//!
//! // 1. e4
//! assert!(game_round(&mut history, Action::piece_move((4, 1), (4, 3))).is_ok());
//!
//! let entry = history.current().expect("history is never empty");
//! assert_eq!(entry.state().status(), Status::Active);
//! assert!(entry.state().board().black_turn());
//! ```
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]

use std::fmt;
use std::ops;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which side a piece or player is on, based on the color of the pieces for that side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The number of colors
    pub const COUNT: usize = 2;
}

impl ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color
    ///
    /// # Example
    /// ```
    /// use arbiter::Color;
    /// assert_eq!(!Color::White, Color::Black);
    /// assert_eq!(!Color::Black, Color::White);
    /// ```
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => "white".fmt(f),
            Color::Black => "black".fmt(f),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::White
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The type of a chess piece, independent of its color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// The number of piece types
    pub const COUNT: usize = 6;
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The contents of a single board square: empty, or a piece of a specific color and kind.
///
/// The thirteen cases are a single sum type; use [`color`](#method.color) and
/// [`kind`](#method.kind) to project out the parts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Piece {
    Empty = 0,

    WhiteKing = 1,
    WhiteQueen = 2,
    WhiteRook = 3,
    WhiteBishop = 4,
    WhiteKnight = 5,
    WhitePawn = 6,

    BlackKing = 7,
    BlackQueen = 8,
    BlackRook = 9,
    BlackBishop = 10,
    BlackKnight = 11,
    BlackPawn = 12,
}

impl Piece {
    /// The number of square states, the empty square included
    pub const COUNT: usize = 13;

    /// Returns the piece of the given color and kind.
    pub fn from_parts(color: Color, kind: PieceKind) -> Piece {
        use Color::*;
        use PieceKind::*;

        match (color, kind) {
            (White, King) => Piece::WhiteKing,
            (White, Queen) => Piece::WhiteQueen,
            (White, Rook) => Piece::WhiteRook,
            (White, Bishop) => Piece::WhiteBishop,
            (White, Knight) => Piece::WhiteKnight,
            (White, Pawn) => Piece::WhitePawn,
            (Black, King) => Piece::BlackKing,
            (Black, Queen) => Piece::BlackQueen,
            (Black, Rook) => Piece::BlackRook,
            (Black, Bishop) => Piece::BlackBishop,
            (Black, Knight) => Piece::BlackKnight,
            (Black, Pawn) => Piece::BlackPawn,
        }
    }

    /// Returns the color of the piece, or `None` for an empty square.
    pub fn color(self) -> Option<Color> {
        if self.is_white() {
            Some(Color::White)
        } else if self.is_black() {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Returns the kind of the piece, or `None` for an empty square.
    pub fn kind(self) -> Option<PieceKind> {
        use Piece::*;

        match self {
            Empty => None,
            WhiteKing | BlackKing => Some(PieceKind::King),
            WhiteQueen | BlackQueen => Some(PieceKind::Queen),
            WhiteRook | BlackRook => Some(PieceKind::Rook),
            WhiteBishop | BlackBishop => Some(PieceKind::Bishop),
            WhiteKnight | BlackKnight => Some(PieceKind::Knight),
            WhitePawn | BlackPawn => Some(PieceKind::Pawn),
        }
    }

    /// Returns `true` if this is the empty square.
    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }

    /// Returns `true` if this is a white piece.
    pub fn is_white(self) -> bool {
        self >= Piece::WhiteKing && self <= Piece::WhitePawn
    }

    /// Returns `true` if this is a black piece.
    pub fn is_black(self) -> bool {
        self >= Piece::BlackKing && self <= Piece::BlackPawn
    }

    /// Returns `true` if this is a piece of the given color.
    pub fn is_color(self, color: Color) -> bool {
        match color {
            Color::White => self.is_white(),
            Color::Black => self.is_black(),
        }
    }

    /// Returns a stable index in `0..Piece::COUNT`, suitable for table lookups.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Default for Piece {
    fn default() -> Self {
        Piece::Empty
    }
}

impl fmt::Display for Piece {
    /// Writes the piece as a single letter: uppercase for white, lowercase for black,
    /// `.` for an empty square.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Piece::*;

        match self {
            Empty => ".",
            WhiteKing => "K",
            WhiteQueen => "Q",
            WhiteRook => "R",
            WhiteBishop => "B",
            WhiteKnight => "N",
            WhitePawn => "P",
            BlackKing => "k",
            BlackQueen => "q",
            BlackRook => "r",
            BlackBishop => "b",
            BlackKnight => "n",
            BlackPawn => "p",
        }
        .fmt(f)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
pub mod error;
pub mod board;
pub mod moves;
pub mod game;

pub use board::{BoardState, CastlingRight, BoardWriter, ZobristTable};
pub use error::{Error, Result};
pub use game::{game_round, standard_opening, GameHistory, GameState, HistoryEntry, Status};
pub use moves::{for_each_pseudo_legal, validate_action, Action, DrawRequest};
