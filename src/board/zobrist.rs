//! Contains Zobrist hashing of board states and the hash-coupled board mutator
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{BoardState, CastlingRight};
use crate::Piece;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The table of random values backing the Zobrist hash of a [`BoardState`](../struct.BoardState.html).
///
/// A hash is the XOR of one table entry per state component: the occupant of every
/// square (empty squares included), the side to move when black, each available
/// castling right, and the en-passant file when one is set.
///
/// The table is immutable once generated. Repetition bookkeeping indexes positions by
/// their hash, so a game history must keep the same table for its whole lifetime.
#[derive(Debug)]
pub struct ZobristTable {
    board: [[u64; Piece::COUNT]; BoardState::SIZE],
    black_turn: u64,
    castling: [u64; CastlingRight::COUNT],
    en_passant_column: [u64; BoardState::WIDTH as usize],
}

impl ZobristTable {
    /// Generates a fresh table, seeded from a high-resolution clock.
    pub fn generate() -> ZobristTable {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0);

        ZobristTable::with_seed(seed)
    }

    /// Generates the table determined by `seed`. Two tables built from the same seed
    /// hash every board state identically.
    pub fn with_seed(seed: u64) -> ZobristTable {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut table = ZobristTable {
            board: [[0; Piece::COUNT]; BoardState::SIZE],
            black_turn: 0,
            castling: [0; CastlingRight::COUNT],
            en_passant_column: [0; BoardState::WIDTH as usize],
        };

        for square in table.board.iter_mut() {
            for entry in square.iter_mut() {
                *entry = rng.gen();
            }
        }
        table.black_turn = rng.gen();
        for entry in table.castling.iter_mut() {
            *entry = rng.gen();
        }
        for entry in table.en_passant_column.iter_mut() {
            *entry = rng.gen();
        }

        table
    }

    /// Computes the hash of `state` from scratch.
    pub fn hash(&self, state: &BoardState) -> u64 {
        let mut hash = 0;

        for (square, piece) in state.board.iter().enumerate() {
            hash ^= self.board[square][piece.index()];
        }

        if state.black_turn {
            hash ^= self.black_turn;
        }

        for (right, &available) in state.castling.iter().enumerate() {
            if available {
                hash ^= self.castling[right];
            }
        }

        if state.en_passant_column >= 0 {
            hash ^= self.en_passant_column[state.en_passant_column as usize];
        }

        hash
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A mutable view of a [`BoardState`](../struct.BoardState.html) that keeps a running
/// hash in step with every write.
///
/// Starting from a hash equal to [`ZobristTable::hash`](struct.ZobristTable.html#method.hash)
/// of the wrapped state, any sequence of writes leaves the running hash equal to a fresh
/// hash of the mutated state. All board mutation in the crate goes through this type.
#[derive(Debug)]
pub struct BoardWriter<'a> {
    state: &'a mut BoardState,
    table: &'a ZobristTable,
    hash: u64,
}

impl<'a> BoardWriter<'a> {
    /// Wraps `state`, whose current hash under `table` must be `hash`.
    pub fn new(state: &'a mut BoardState, table: &'a ZobristTable, hash: u64) -> BoardWriter<'a> {
        BoardWriter { state, table, hash }
    }

    /// Returns the wrapped board for reading.
    pub fn state(&self) -> &BoardState {
        self.state
    }

    /// Places `piece` on square `(x, y)`.
    pub fn set_piece(&mut self, x: i32, y: i32, piece: Piece) {
        let square = BoardState::index(x, y);

        self.hash ^= self.table.board[square][self.state.board[square].index()];
        self.hash ^= self.table.board[square][piece.index()];
        self.state.board[square] = piece;
    }

    /// Hands the move to black (`true`) or white (`false`).
    pub fn set_black_turn(&mut self, black_turn: bool) {
        if self.state.black_turn != black_turn {
            self.hash ^= self.table.black_turn;
        }
        self.state.black_turn = black_turn;
    }

    /// Takes the given castling right away. Rights only ever decrease.
    pub fn clear_castle(&mut self, right: CastlingRight) {
        if self.state.castling[right as usize] {
            self.hash ^= self.table.castling[right as usize];
        }
        self.state.castling[right as usize] = false;
    }

    /// Sets the en-passant file, or clears it with `-1`.
    pub fn set_en_passant_column(&mut self, column: i32) {
        if self.state.en_passant_column >= 0 {
            self.hash ^= self.table.en_passant_column[self.state.en_passant_column as usize];
        }
        if column >= 0 {
            self.hash ^= self.table.en_passant_column[column as usize];
        }
        self.state.en_passant_column = column;
    }

    /// Consumes the writer and returns the updated hash.
    pub fn finish(self) -> u64 {
        self.hash
    }
}
