//! Defines the error type shared by the whole crate
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::error;
use std::fmt;
use std::result;

/// Short alias for a `Result` with this crate's [`Error`](enum.Error.html) type.
pub type Result<T> = result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The reasons an action can be rejected.
///
/// The validator produces everything up to [`DrawNotOffered`](#variant.DrawNotOffered);
/// the remaining variants come from [`game_round`](../fn.game_round.html) itself. Every
/// error leaves the game history unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// No piece on the source square (or the source square is off the board)
    EmptySource,
    /// Source and destination squares are the same
    ZeroLengthMove,
    /// The piece on the source square belongs to the player not on turn
    WrongTurn,
    /// Destination square is off the board
    DestinationOutOfRange,
    /// The king cannot step there
    InvalidKingMove,
    /// Castling is not available in this position
    InvalidKingCastle,
    /// A king only moves or castles
    InvalidKingAction,
    /// The queen cannot reach that square
    InvalidQueenMove,
    /// A queen only moves
    InvalidQueenAction,
    /// The bishop cannot reach that square
    InvalidBishopMove,
    /// A bishop only moves
    InvalidBishopAction,
    /// The rook cannot reach that square
    InvalidRookMove,
    /// A rook only moves
    InvalidRookAction,
    /// The knight cannot reach that square
    InvalidKnightMove,
    /// A knight only moves
    InvalidKnightAction,
    /// The pawn cannot reach that square
    InvalidPawnMove,
    /// A pawn reaching the last rank must promote, and only to a piece of its own color
    InvalidPawnPromotion,
    /// A pawn only moves or promotes
    InvalidPawnAction,
    /// The null action can never be played
    NullAction,
    /// Accepting a draw requires a standing offer
    DrawNotOffered,
    /// The action would leave the mover's own king attacked
    KingLeftInCheck,
    /// Neither threefold repetition nor the fifty-move rule supports the claim
    InvalidDrawClaim,
    /// The game has already ended
    GameOver,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            EmptySource => "no piece on the source square",
            ZeroLengthMove => "source and destination are the same square",
            WrongTurn => "not this player's turn",
            DestinationOutOfRange => "destination is off the board",
            InvalidKingMove => "invalid king move",
            InvalidKingCastle => "invalid castle",
            InvalidKingAction => "invalid king action",
            InvalidQueenMove => "invalid queen move",
            InvalidQueenAction => "invalid queen action",
            InvalidBishopMove => "invalid bishop move",
            InvalidBishopAction => "invalid bishop action",
            InvalidRookMove => "invalid rook move",
            InvalidRookAction => "invalid rook action",
            InvalidKnightMove => "invalid knight move",
            InvalidKnightAction => "invalid knight action",
            InvalidPawnMove => "invalid pawn move",
            InvalidPawnPromotion => "invalid pawn promotion",
            InvalidPawnAction => "invalid pawn action",
            NullAction => "null action not allowed",
            DrawNotOffered => "draw not offered",
            KingLeftInCheck => "king would be left in check",
            InvalidDrawClaim => "cannot claim a draw",
            GameOver => "the game is over",
        }
        .fmt(f)
    }
}

impl error::Error for Error {}
