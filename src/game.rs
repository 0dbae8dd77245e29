//! Contains the game state, the game history, and the round orchestrator
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::board::{BoardState, BoardWriter, ZobristTable};
use crate::error::{Error, Result};
use crate::moves::{apply_action, count_legal_replies, validate_action, Action, DrawRequest};
use crate::Color;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The outcome of a game, or `Active` while it is still being played.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Status {
    Active,
    WhiteWin,
    BlackWin,
    Draw,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => "active",
            Status::WhiteWin => "white wins",
            Status::BlackWin => "black wins",
            Status::Draw => "draw",
        }
        .fmt(f)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A full snapshot of a game: the board plus everything the rules of termination need.
///
/// On top of the [`BoardState`](struct.BoardState.html) this carries the standing draw
/// offer, the no-capture-no-pawn-move streak feeding the fifty and seventy-five-move
/// rules, cached king coordinates, the check flag for the side to move, and the game
/// [`Status`](enum.Status.html).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) board: BoardState,
    pub(crate) draw_offer: bool,
    pub(crate) draw_plies: u32,
    pub(crate) white_king: (i32, i32),
    pub(crate) black_king: (i32, i32),
    pub(crate) check: bool,
    pub(crate) status: Status,
}

impl GameState {
    /// Returns the board.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Returns `true` if the opponent of the side to move has offered a draw.
    pub fn draw_offered(&self) -> bool {
        self.draw_offer
    }

    /// Returns the number of half-moves since the last capture or pawn move.
    pub fn draw_plies(&self) -> u32 {
        self.draw_plies
    }

    /// Returns the coordinates of the king of the given color.
    pub fn king(&self, color: Color) -> (i32, i32) {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    /// Returns `true` if the side to move stands in check.
    pub fn in_check(&self) -> bool {
        self.check
    }

    /// Returns the game status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The king of the side to move.
    pub(crate) fn friend_king(&self) -> (i32, i32) {
        if self.board.black_turn {
            self.black_king
        } else {
            self.white_king
        }
    }
}

/// Returns the game state of the standard opening: white to move, full castling
/// rights, no en-passant file, kings on e1 and e8.
pub fn standard_opening() -> GameState {
    GameState {
        board: BoardState::new(),
        draw_offer: false,
        draw_plies: 0,
        white_king: (4, 0),
        black_king: (4, 7),
        check: false,
        status: Status::Active,
    }
}

impl Default for GameState {
    /// Returns the game state of the standard opening.
    fn default() -> Self {
        standard_opening()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// One accepted action together with the game state and board hash it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    action: Action,
    state: GameState,
    hash: u64,
}

impl HistoryEntry {
    /// Returns the action that produced this entry. The initial entry holds
    /// [`Action::Null`](enum.Action.html#variant.Null).
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Returns the game state after the action.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the Zobrist hash of the board state after the action.
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The append-only record of a game, indexed for repetition counting.
///
/// Every accepted action appends one entry; rejected actions leave no trace. Entries
/// are additionally indexed by board hash so that counting how often a position has
/// occurred costs one bucket lookup plus a structural comparison per hash match.
///
/// The history owns the [`ZobristTable`](struct.ZobristTable.html) its hashes were
/// drawn from; the table never changes during the lifetime of the history, since the
/// index is only meaningful relative to it.
///
/// The history itself is single-threaded. When shared between connections, the
/// embedding application must serialize each whole [`game_round`](fn.game_round.html)
/// call, and any read of the current tail, under one critical section.
#[derive(Debug)]
pub struct GameHistory {
    entries: Vec<HistoryEntry>,
    by_hash: HashMap<u64, Vec<usize>>,
    table: ZobristTable,
}

impl GameHistory {
    /// Starts a new game from the standard opening, with a freshly generated table.
    pub fn new() -> GameHistory {
        let mut history = GameHistory {
            entries: Vec::new(),
            by_hash: HashMap::new(),
            table: ZobristTable::generate(),
        };

        let state = standard_opening();
        let hash = history.table.hash(&state.board);
        history.push_entry(Action::Null, state, hash);

        history
    }

    /// Returns the most recent entry, or `None` if the history is empty.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Returns all entries in playing order. Entry 0 is the initial state under a
    /// null action.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the history holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the hashing table used by this history.
    pub(crate) fn table(&self) -> &ZobristTable {
        &self.table
    }

    /// Counts the entries whose board state is structurally equal to `board`, which
    /// must hash to `hash` under this history's table.
    ///
    /// Equality covers everything the hash mixes: the full board, the side to move,
    /// the castling rights, and the en-passant file.
    pub fn count_repetitions(&self, board: &BoardState, hash: u64) -> usize {
        debug_assert_eq!(self.table.hash(board), hash, "stale board hash");

        match self.by_hash.get(&hash) {
            Some(indices) => indices
                .iter()
                .filter(|&&index| self.entries[index].state.board == *board)
                .count(),
            None => 0,
        }
    }

    fn push_entry(&mut self, action: Action, state: GameState, hash: u64) {
        debug_assert_eq!(
            self.table.hash(&state.board),
            hash,
            "incremental hash diverged from the board"
        );

        self.by_hash.entry(hash).or_insert_with(Vec::new).push(self.entries.len());
        self.entries.push(HistoryEntry { action, state, hash });
    }
}

impl Default for GameHistory {
    fn default() -> Self {
        GameHistory::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Plays one action: validates it, applies it, and appends the outcome to `history`.
///
/// On success the new entry carries the toggled turn, the refreshed check flag, and a
/// status reflecting checkmate, stalemate, accepted or claimed draws, the automatic
/// fivefold-repetition and seventy-five-move draws, or resignation. On error the
/// history is untouched.
///
/// A [`DrawRequest::Claim`](enum.DrawRequest.html#variant.Claim) annotation makes the
/// whole action conditional: it is accepted only if the position it creates completes a
/// threefold repetition or the streak has reached one hundred half-moves.
pub fn game_round(history: &mut GameHistory, action: Action) -> Result<()> {
    let (state, hash) = match history.current() {
        Some(entry) => (entry.state.clone(), entry.hash),
        None => return Err(Error::GameOver),
    };
    if state.status != Status::Active {
        return Err(Error::GameOver);
    }

    validate_action(&state, &action)?;

    let mut next = state;
    let mut next_hash = apply_action(&mut next, hash, &action, history.table());

    // the mover may not leave their own king attacked
    if next.status == Status::Active {
        let (king_x, king_y) = next.friend_king();
        if next.board.position_attacked(king_x, king_y, !next.board.black_turn) {
            return Err(Error::KingLeftInCheck);
        }
    }

    // hand the turn over
    let turn = next.board.black_turn;
    let mut writer = BoardWriter::new(&mut next.board, history.table(), next_hash);
    writer.set_black_turn(!turn);
    next_hash = writer.finish();

    // how often the new position will have stood on the board, itself included
    let occurrences = history.count_repetitions(&next.board, next_hash) + 1;

    if next.status == Status::Active && action.draw_request() == DrawRequest::Claim {
        if occurrences >= 3 || next.draw_plies >= 100 {
            next.status = Status::Draw;
        } else {
            return Err(Error::InvalidDrawClaim);
        }
    }

    if next.status == Status::Active {
        let (king_x, king_y) = next.friend_king();
        next.check = next.board.position_attacked(king_x, king_y, !next.board.black_turn);

        if count_legal_replies(&next, history.table(), next_hash) == 0 {
            next.status = if next.check {
                // checkmate: the mover, whose turn just ended, wins
                if next.board.black_turn {
                    Status::WhiteWin
                } else {
                    Status::BlackWin
                }
            } else {
                Status::Draw
            };
        } else if occurrences >= 5 || next.draw_plies >= 150 {
            // these draws need no claim
            next.status = Status::Draw;
        }
    }

    if next.status != Status::Active {
        debug!("game over: {}", next.status);
    }

    history.push_entry(action, next, next_hash);

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
impl GameState {
    /// Builds a game state around a hand-made board. Test setup only.
    pub(crate) fn with_board(
        board: BoardState,
        white_king: (i32, i32),
        black_king: (i32, i32),
    ) -> GameState {
        GameState {
            board,
            draw_offer: false,
            draw_plies: 0,
            white_king,
            black_king,
            check: false,
            status: Status::Active,
        }
    }
}

#[cfg(test)]
impl GameHistory {
    /// Builds a history whose initial entry is the given state. Test setup only.
    pub(crate) fn starting_at(state: GameState) -> GameHistory {
        let mut history = GameHistory {
            entries: Vec::new(),
            by_hash: HashMap::new(),
            table: ZobristTable::generate(),
        };

        let hash = history.table.hash(&state.board);
        history.push_entry(Action::Null, state, hash);

        history
    }
}
