//! Contains the player actions, the rules of movement, and action application
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::board::{BoardState, BoardWriter, CastlingRight, ZobristTable};
use crate::error::{Error, Result};
use crate::game::{GameState, Status};
use crate::{Piece, PieceKind};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A draw annotation carried by a move, castle, or promotion.
///
/// An offer stands for exactly one turn and lets the opponent play
/// [`Action::AcceptDraw`](enum.Action.html#variant.AcceptDraw). A claim asserts that
/// threefold repetition or the fifty-move rule applies once the annotated action is on
/// the board; an unsupported claim rejects the whole action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DrawRequest {
    None,
    Offer,
    Claim,
}

impl Default for DrawRequest {
    fn default() -> Self {
        DrawRequest::None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// One player action: a board operation, a resignation, or the acceptance of a draw.
///
/// Squares are `(x, y)` coordinates with `x` in `0..8` for files a through h and `y` in
/// `0..8` for ranks 1 through 8.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// A placeholder that is never playable; it marks the initial entry of a game history.
    Null,
    /// Relocate the piece on `from` to `to`, capturing whatever stood there
    Move {
        /// Source square
        from: (i32, i32),
        /// Destination square
        to: (i32, i32),
        /// Draw annotation
        draw: DrawRequest,
    },
    /// Castle: the king on `from` travels two squares to `to` and the rook jumps over
    Castle {
        /// The king's home square
        from: (i32, i32),
        /// The king's destination, on file c or g
        to: (i32, i32),
        /// Draw annotation
        draw: DrawRequest,
    },
    /// Advance the pawn on `from` to the last rank, replacing it with `target`
    Promote {
        /// Source square
        from: (i32, i32),
        /// Destination square on the promotion rank
        to: (i32, i32),
        /// The queen, rook, bishop or knight (of the mover's color) to place
        target: Piece,
        /// Draw annotation
        draw: DrawRequest,
    },
    /// Concede the game
    Resign,
    /// Accept the opponent's standing draw offer
    AcceptDraw,
}

impl Action {
    /// Returns a plain move from `from` to `to`.
    pub fn piece_move(from: (i32, i32), to: (i32, i32)) -> Action {
        Action::Move { from, to, draw: DrawRequest::None }
    }

    /// Returns a castling action for the king travelling from `from` to `to`.
    pub fn castle(from: (i32, i32), to: (i32, i32)) -> Action {
        Action::Castle { from, to, draw: DrawRequest::None }
    }

    /// Returns a promotion of the pawn on `from`, placing `target` on `to`.
    pub fn promotion(from: (i32, i32), to: (i32, i32), target: Piece) -> Action {
        Action::Promote { from, to, target, draw: DrawRequest::None }
    }

    /// Attaches a draw offer. Has no effect on resignations and draw acceptances.
    pub fn offering_draw(self) -> Action {
        self.with_draw(DrawRequest::Offer)
    }

    /// Attaches a draw claim. Has no effect on resignations and draw acceptances.
    pub fn claiming_draw(self) -> Action {
        self.with_draw(DrawRequest::Claim)
    }

    /// Returns the draw annotation carried by the action.
    pub fn draw_request(&self) -> DrawRequest {
        match *self {
            Action::Move { draw, .. }
            | Action::Castle { draw, .. }
            | Action::Promote { draw, .. } => draw,
            _ => DrawRequest::None,
        }
    }

    fn with_draw(mut self, request: DrawRequest) -> Action {
        match &mut self {
            Action::Move { draw, .. }
            | Action::Castle { draw, .. }
            | Action::Promote { draw, .. } => *draw = request,
            _ => {}
        }
        self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Checks `action` against the rules of movement in `state`.
///
/// The game must still be active. Whether the action would leave the mover's own king
/// attacked is *not* checked here; [`game_round`](../fn.game_round.html) verifies that
/// on the resulting position. Draw claims are likewise judged by `game_round` only.
pub fn validate_action(state: &GameState, action: &Action) -> Result<()> {
    let board = &state.board;
    let black_turn = board.black_turn;

    // resignations and draw acceptances need no board geometry
    let (from, to) = match *action {
        Action::Null => return Err(Error::NullAction),
        Action::Resign => return Ok(()),
        Action::AcceptDraw => {
            return if state.draw_offer {
                Ok(())
            } else {
                Err(Error::DrawNotOffered)
            };
        }
        Action::Move { from, to, .. }
        | Action::Castle { from, to, .. }
        | Action::Promote { from, to, .. } => (from, to),
    };

    let (x0, y0) = from;
    let (x1, y1) = to;

    if !BoardState::in_bounds(x0, y0) {
        return Err(Error::EmptySource);
    }
    let mover = board.piece_at(x0, y0);
    if mover.is_empty() {
        return Err(Error::EmptySource);
    }
    if from == to {
        return Err(Error::ZeroLengthMove);
    }
    if mover.is_white() == black_turn {
        return Err(Error::WrongTurn);
    }
    if !BoardState::in_bounds(x1, y1) {
        return Err(Error::DestinationOutOfRange);
    }

    let color = board.turn();
    let target = board.piece_at(x1, y1);
    let target_friend = target.is_color(color);
    let target_enemy = target.is_color(!color);

    let king_move_ok = || {
        (x1 - x0).abs() <= 1
            && (y1 - y0).abs() <= 1
            && !target_friend
            && !board.position_attacked(x1, y1, !black_turn)
    };

    let castle_ok = || {
        if state.check {
            return false;
        }
        let home = if black_turn { 7 } else { 0 };
        if (x0, y0) != (4, home) {
            return false;
        }
        let vacant = |x| board.piece_at(x, home).is_empty();
        let safe = |x| !board.position_attacked(x, home, !black_turn);
        if (x1, y1) == (2, home) {
            board.castle_right(CastlingRight::queen_side(color))
                && vacant(1)
                && vacant(2)
                && vacant(3)
                && safe(2)
                && safe(3)
        } else if (x1, y1) == (6, home) {
            board.castle_right(CastlingRight::king_side(color))
                && vacant(5)
                && vacant(6)
                && safe(5)
                && safe(6)
        } else {
            false
        }
    };

    let diag_move_ok = || {
        let dx = x1 - x0;
        let dy = y1 - y0;
        if target_friend || dx.abs() != dy.abs() {
            return false;
        }
        let (x_step, y_step) = (dx.signum(), dy.signum());
        (1..dx.abs()).all(|step| board.piece_at(x0 + step * x_step, y0 + step * y_step).is_empty())
    };

    let cross_move_ok = || {
        let dx = x1 - x0;
        let dy = y1 - y0;
        if target_friend || (dx != 0 && dy != 0) {
            return false;
        }
        let (x_step, y_step) = (dx.signum(), dy.signum());
        (1..dx.abs().max(dy.abs()))
            .all(|step| board.piece_at(x0 + step * x_step, y0 + step * y_step).is_empty())
    };

    let knight_move_ok = || {
        let (dx, dy) = ((x1 - x0).abs(), (y1 - y0).abs());
        !target_friend && dx.min(dy) == 1 && dx.max(dy) == 2
    };

    let pawn_move_ok = || {
        let forward = if black_turn { -1 } else { 1 };
        let home_rank = if black_turn { 6 } else { 1 };
        let en_passant_rank = if black_turn { 3 } else { 4 };
        let enemy_pawn = Piece::from_parts(!color, PieceKind::Pawn);

        // a single advance onto an empty square
        (y1 - y0 == forward && x1 == x0 && target.is_empty())
            // a double advance from the home rank, crossing an empty square
            || (y0 == home_rank
                && y1 == home_rank + 2 * forward
                && x1 == x0
                && target.is_empty()
                && board.piece_at(x0, y0 + forward).is_empty())
            // an ordinary capture
            || (y1 - y0 == forward && (x1 - x0).abs() == 1 && target_enemy)
            // an en-passant capture of a just-skipped enemy pawn
            || (y0 == en_passant_rank
                && y1 == en_passant_rank + forward
                && (x1 - x0).abs() == 1
                && x1 == board.en_passant_column
                && board.piece_at(x1, y0) == enemy_pawn
                && target.is_empty())
    };

    let promotion_target_ok = |promoted: Piece| {
        promoted.is_color(color)
            && match promoted.kind() {
                Some(PieceKind::Queen)
                | Some(PieceKind::Rook)
                | Some(PieceKind::Bishop)
                | Some(PieceKind::Knight) => true,
                _ => false,
            }
    };

    match mover.kind().expect("INFALLIBLE") {
        PieceKind::King => match action {
            Action::Move { .. } if king_move_ok() => Ok(()),
            Action::Move { .. } => Err(Error::InvalidKingMove),
            Action::Castle { .. } if castle_ok() => Ok(()),
            Action::Castle { .. } => Err(Error::InvalidKingCastle),
            _ => Err(Error::InvalidKingAction),
        },
        PieceKind::Queen => match action {
            Action::Move { .. } if diag_move_ok() || cross_move_ok() => Ok(()),
            Action::Move { .. } => Err(Error::InvalidQueenMove),
            _ => Err(Error::InvalidQueenAction),
        },
        PieceKind::Bishop => match action {
            Action::Move { .. } if diag_move_ok() => Ok(()),
            Action::Move { .. } => Err(Error::InvalidBishopMove),
            _ => Err(Error::InvalidBishopAction),
        },
        PieceKind::Rook => match action {
            Action::Move { .. } if cross_move_ok() => Ok(()),
            Action::Move { .. } => Err(Error::InvalidRookMove),
            _ => Err(Error::InvalidRookAction),
        },
        PieceKind::Knight => match action {
            Action::Move { .. } if knight_move_ok() => Ok(()),
            Action::Move { .. } => Err(Error::InvalidKnightMove),
            _ => Err(Error::InvalidKnightAction),
        },
        PieceKind::Pawn => {
            let promotion_rank = if black_turn { 0 } else { 7 };
            if y1 == promotion_rank {
                match action {
                    Action::Promote { target, .. }
                        if pawn_move_ok() && promotion_target_ok(*target) =>
                    {
                        Ok(())
                    }
                    _ => Err(Error::InvalidPawnPromotion),
                }
            } else {
                match action {
                    Action::Move { .. } if pawn_move_ok() => Ok(()),
                    Action::Move { .. } => Err(Error::InvalidPawnMove),
                    _ => Err(Error::InvalidPawnAction),
                }
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Applies a validated `action` to `state` in place and returns the updated board hash.
///
/// No legality checking happens here. Any action consumes a standing draw offer and
/// clears the en-passant file before taking effect; the no-capture-no-pawn-move streak
/// is reset or extended at the end. The turn is *not* handed over — that is the caller's
/// last step, so that the mover's king can first be checked for exposure.
pub fn apply_action(
    state: &mut GameState,
    hash: u64,
    action: &Action,
    table: &ZobristTable,
) -> u64 {
    use Piece::*;

    let black_turn = state.board.black_turn;

    // a draw offer lapses as soon as the opponent plays anything
    state.draw_offer = false;

    let mut writer = BoardWriter::new(&mut state.board, table, hash);
    writer.set_en_passant_column(-1);

    let mut pawn_moved = false;
    let mut capture_made = false;

    match *action {
        Action::Move { from: (x0, y0), to: (x1, y1), draw } => {
            let mover = writer.state().piece_at(x0, y0);
            let target = writer.state().piece_at(x1, y1);

            if mover.kind() == Some(PieceKind::Pawn) {
                // a diagonal step onto an empty square is an en-passant capture
                if target.is_empty() && x0 != x1 {
                    writer.set_piece(x1, y0, Empty);
                    capture_made = true;
                }
                // a double advance opens en passant when an enemy pawn stands beside it
                if (y1 - y0).abs() == 2 {
                    let enemy_pawn = if black_turn { WhitePawn } else { BlackPawn };
                    let beside = {
                        let pawn_at = |x| {
                            BoardState::in_bounds(x, y1)
                                && writer.state().piece_at(x, y1) == enemy_pawn
                        };
                        pawn_at(x1 - 1) || pawn_at(x1 + 1)
                    };
                    if beside {
                        writer.set_en_passant_column(x0);
                    }
                }
                pawn_moved = true;
            }

            match mover {
                WhiteRook => {
                    if (x0, y0) == (0, 0) {
                        writer.clear_castle(CastlingRight::WhiteQueenSide);
                    }
                    if (x0, y0) == (7, 0) {
                        writer.clear_castle(CastlingRight::WhiteKingSide);
                    }
                }
                BlackRook => {
                    if (x0, y0) == (0, 7) {
                        writer.clear_castle(CastlingRight::BlackQueenSide);
                    }
                    if (x0, y0) == (7, 7) {
                        writer.clear_castle(CastlingRight::BlackKingSide);
                    }
                }
                WhiteKing => {
                    writer.clear_castle(CastlingRight::WhiteQueenSide);
                    writer.clear_castle(CastlingRight::WhiteKingSide);
                    state.white_king = (x1, y1);
                }
                BlackKing => {
                    writer.clear_castle(CastlingRight::BlackQueenSide);
                    writer.clear_castle(CastlingRight::BlackKingSide);
                    state.black_king = (x1, y1);
                }
                _ => {}
            }

            if !target.is_empty() {
                capture_made = true;
            }

            writer.set_piece(x1, y1, mover);
            writer.set_piece(x0, y0, Empty);

            if draw == DrawRequest::Offer {
                state.draw_offer = true;
            }
        }

        Action::Castle { from: (x0, y0), to: (x1, _), draw } => {
            let home = y0;
            let (king, rook) = if black_turn {
                (BlackKing, BlackRook)
            } else {
                (WhiteKing, WhiteRook)
            };

            writer.set_piece(x0, y0, Empty);
            if x1 == 2 {
                writer.set_piece(0, home, Empty);
                writer.set_piece(2, home, king);
                writer.set_piece(3, home, rook);
            } else {
                writer.set_piece(7, home, Empty);
                writer.set_piece(6, home, king);
                writer.set_piece(5, home, rook);
            }

            if black_turn {
                writer.clear_castle(CastlingRight::BlackQueenSide);
                writer.clear_castle(CastlingRight::BlackKingSide);
                state.black_king = (x1, home);
            } else {
                writer.clear_castle(CastlingRight::WhiteQueenSide);
                writer.clear_castle(CastlingRight::WhiteKingSide);
                state.white_king = (x1, home);
            }

            if draw == DrawRequest::Offer {
                state.draw_offer = true;
            }
        }

        Action::Promote { from: (x0, y0), to: (x1, y1), target, draw } => {
            pawn_moved = true;
            if !writer.state().piece_at(x1, y1).is_empty() {
                capture_made = true;
            }

            writer.set_piece(x1, y1, target);
            writer.set_piece(x0, y0, Empty);

            if draw == DrawRequest::Offer {
                state.draw_offer = true;
            }
        }

        Action::Resign => {
            state.status = if black_turn {
                Status::WhiteWin
            } else {
                Status::BlackWin
            };
        }

        Action::AcceptDraw => {
            state.status = Status::Draw;
        }

        Action::Null => {}
    }

    let hash = writer.finish();

    if pawn_moved || capture_made {
        state.draw_plies = 0;
    } else {
        state.draw_plies += 1;
    }

    hash
}

////////////////////////////////////////////////////////////////////////////////////////////////////
const DIAGONAL_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];
const CROSS_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

fn push_rays(candidates: &mut Vec<Action>, x: i32, y: i32, directions: &[(i32, i32)]) {
    for &(x_dir, y_dir) in directions {
        for step in 1..BoardState::WIDTH.max(BoardState::HEIGHT) {
            candidates.push(Action::piece_move((x, y), (x + step * x_dir, y + step * y_dir)));
        }
    }
}

/// Geometric action candidates for every piece of the side to move. Off-board and
/// otherwise impossible candidates are included; the validator weeds them out.
fn candidate_actions(state: &GameState) -> Vec<Action> {
    let board = &state.board;
    let black_turn = board.black_turn;
    let color = board.turn();
    let mut candidates = Vec::new();

    for y in 0..BoardState::HEIGHT {
        for x in 0..BoardState::WIDTH {
            let piece = board.piece_at(x, y);
            if !piece.is_color(color) {
                continue;
            }

            match piece.kind().expect("INFALLIBLE") {
                PieceKind::King => {
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            if dx != 0 || dy != 0 {
                                candidates.push(Action::piece_move((x, y), (x + dx, y + dy)));
                            }
                        }
                    }
                    let home = if black_turn { 7 } else { 0 };
                    if (x, y) == (4, home) {
                        candidates.push(Action::castle((4, home), (2, home)));
                        candidates.push(Action::castle((4, home), (6, home)));
                    }
                }
                PieceKind::Queen => {
                    push_rays(&mut candidates, x, y, &CROSS_DIRECTIONS);
                    push_rays(&mut candidates, x, y, &DIAGONAL_DIRECTIONS);
                }
                PieceKind::Rook => push_rays(&mut candidates, x, y, &CROSS_DIRECTIONS),
                PieceKind::Bishop => push_rays(&mut candidates, x, y, &DIAGONAL_DIRECTIONS),
                PieceKind::Knight => {
                    for &(dx, dy) in KNIGHT_OFFSETS.iter() {
                        candidates.push(Action::piece_move((x, y), (x + dx, y + dy)));
                    }
                }
                PieceKind::Pawn => {
                    let forward = if black_turn { -1 } else { 1 };
                    let promotion_rank = if black_turn { 0 } else { 7 };

                    candidates.push(Action::piece_move((x, y), (x, y + 2 * forward)));
                    for dx in -1..=1 {
                        let dest = (x + dx, y + forward);
                        if dest.1 == promotion_rank {
                            // one promotion target stands in for all four: the
                            // underlying pawn move decides legality
                            let queen = Piece::from_parts(color, PieceKind::Queen);
                            candidates.push(Action::promotion((x, y), dest, queen));
                        } else {
                            candidates.push(Action::piece_move((x, y), dest));
                        }
                    }
                }
            }
        }
    }

    candidates
}

/// Calls `func` with every action of the side to move that passes the validator.
///
/// The emitted actions may still leave the mover's own king attacked; they are
/// pseudo-legal in exactly the sense the validator checks.
pub fn for_each_pseudo_legal<F: FnMut(Action)>(state: &GameState, mut func: F) {
    for action in candidate_actions(state) {
        if validate_action(state, &action).is_ok() {
            func(action);
        }
    }
}

/// Counts the fully legal replies available to the side to move: pseudo-legal actions
/// whose application does not leave the mover's king attacked. A count of zero means
/// checkmate or stalemate, depending on whether the king currently stands in check.
pub(crate) fn count_legal_replies(state: &GameState, table: &ZobristTable, hash: u64) -> usize {
    let mut count = 0;

    for_each_pseudo_legal(state, |action| {
        let mut probe = state.clone();
        apply_action(&mut probe, hash, &action, table);

        let (king_x, king_y) = probe.friend_king();
        if !probe.board.position_attacked(king_x, king_y, !probe.board.black_turn) {
            count += 1;
        }
    });

    count
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::standard_opening;
    use Piece::*;

    fn bare_kings() -> GameState {
        let mut board = BoardState::empty();
        board.put(4, 0, WhiteKing);
        board.put(4, 7, BlackKing);
        GameState::with_board(board, (4, 0), (4, 7))
    }

    mod validator {
        use super::*;

        #[test]
        fn resign_is_always_acceptable() {
            let state = standard_opening();
            assert!(validate_action(&state, &Action::Resign).is_ok());
        }

        #[test]
        fn null_action_is_never_acceptable() {
            let state = standard_opening();
            assert_eq!(validate_action(&state, &Action::Null), Err(Error::NullAction));
        }

        #[test]
        fn draw_acceptance_requires_a_standing_offer() {
            let state = standard_opening();
            assert_eq!(
                validate_action(&state, &Action::AcceptDraw),
                Err(Error::DrawNotOffered)
            );
        }

        #[test]
        fn generic_prechecks_fire_in_order() {
            let state = standard_opening();

            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 4), (4, 5))),
                Err(Error::EmptySource)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((-1, 0), (0, 0))),
                Err(Error::EmptySource)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((0, 0), (0, 0))),
                Err(Error::ZeroLengthMove)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((1, 7), (2, 5))),
                Err(Error::WrongTurn)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((6, 0), (8, 1))),
                Err(Error::DestinationOutOfRange)
            );
        }

        #[test]
        fn knight_moves_are_the_standard_l_leap() {
            let state = standard_opening();

            assert!(validate_action(&state, &Action::piece_move((1, 0), (2, 2))).is_ok());
            assert!(validate_action(&state, &Action::piece_move((1, 0), (0, 2))).is_ok());
            // a single diagonal step is not a knight move
            assert_eq!(
                validate_action(&state, &Action::piece_move((1, 0), (2, 1))),
                Err(Error::InvalidKnightMove)
            );
            // blocked by its own pawn
            assert_eq!(
                validate_action(&state, &Action::piece_move((1, 0), (3, 1))),
                Err(Error::InvalidKnightMove)
            );
        }

        #[test]
        fn pawn_advances_require_empty_squares() {
            let mut state = standard_opening();

            assert!(validate_action(&state, &Action::piece_move((4, 1), (4, 2))).is_ok());
            assert!(validate_action(&state, &Action::piece_move((4, 1), (4, 3))).is_ok());
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 1), (4, 4))),
                Err(Error::InvalidPawnMove)
            );

            // a piece on e3 blocks both the single and the double advance
            state.board.put(4, 2, BlackKnight);
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 1), (4, 2))),
                Err(Error::InvalidPawnMove)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 1), (4, 3))),
                Err(Error::InvalidPawnMove)
            );
            // but the knight itself can be captured diagonally
            assert!(validate_action(&state, &Action::piece_move((3, 1), (4, 2))).is_ok());
            assert!(validate_action(&state, &Action::piece_move((5, 1), (4, 2))).is_ok());
        }

        #[test]
        fn pawn_captures_require_an_enemy() {
            let state = standard_opening();
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 1), (5, 2))),
                Err(Error::InvalidPawnMove)
            );
        }

        #[test]
        fn double_advance_only_from_the_home_rank() {
            let mut state = bare_kings();
            state.board.put(4, 2, WhitePawn);
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 2), (4, 4))),
                Err(Error::InvalidPawnMove)
            );
        }

        #[test]
        fn en_passant_needs_the_column_flag() {
            let mut state = bare_kings();
            state.board.put(4, 4, WhitePawn);
            state.board.put(3, 4, BlackPawn);

            let capture = Action::piece_move((4, 4), (3, 5));
            assert_eq!(validate_action(&state, &capture), Err(Error::InvalidPawnMove));

            state.board.en_passant_column = 3;
            assert!(validate_action(&state, &capture).is_ok());
            // the flag names one file only
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 4), (5, 5))),
                Err(Error::InvalidPawnMove)
            );
        }

        #[test]
        fn promotion_must_be_declared_and_well_typed() {
            let mut state = bare_kings();
            state.board.put(0, 6, WhitePawn);

            assert_eq!(
                validate_action(&state, &Action::piece_move((0, 6), (0, 7))),
                Err(Error::InvalidPawnPromotion)
            );
            assert!(
                validate_action(&state, &Action::promotion((0, 6), (0, 7), WhiteQueen)).is_ok()
            );
            assert!(
                validate_action(&state, &Action::promotion((0, 6), (0, 7), WhiteKnight)).is_ok()
            );
            assert_eq!(
                validate_action(&state, &Action::promotion((0, 6), (0, 7), BlackQueen)),
                Err(Error::InvalidPawnPromotion)
            );
            assert_eq!(
                validate_action(&state, &Action::promotion((0, 6), (0, 7), WhiteKing)),
                Err(Error::InvalidPawnPromotion)
            );
            // promoting from the middle of the board is still a pawn move underneath
            assert_eq!(
                validate_action(&state, &Action::promotion((0, 6), (1, 7), WhiteQueen)),
                Err(Error::InvalidPawnPromotion)
            );
        }

        #[test]
        fn kings_may_not_step_into_attacks() {
            let mut state = bare_kings();
            state.board.put(3, 7, BlackRook);

            assert!(validate_action(&state, &Action::piece_move((4, 0), (5, 0))).is_ok());
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 0), (3, 0))),
                Err(Error::InvalidKingMove)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((4, 0), (3, 1))),
                Err(Error::InvalidKingMove)
            );
        }

        #[test]
        fn sliding_pieces_stop_at_blockers() {
            let state = standard_opening();

            assert_eq!(
                validate_action(&state, &Action::piece_move((3, 0), (3, 4))),
                Err(Error::InvalidQueenMove)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((0, 0), (0, 3))),
                Err(Error::InvalidRookMove)
            );
            assert_eq!(
                validate_action(&state, &Action::piece_move((2, 0), (4, 2))),
                Err(Error::InvalidBishopMove)
            );
        }

        #[test]
        fn only_moves_are_acceptable_for_sliding_pieces() {
            let state = standard_opening();
            assert_eq!(
                validate_action(&state, &Action::castle((0, 0), (3, 0))),
                Err(Error::InvalidRookAction)
            );
            assert_eq!(
                validate_action(&state, &Action::promotion((3, 0), (3, 4), WhiteQueen)),
                Err(Error::InvalidQueenAction)
            );
        }

        #[test]
        fn king_side_castle_requires_clear_and_safe_squares() {
            let mut state = bare_kings();
            state.board.put(7, 0, WhiteRook);

            let castle = Action::castle((4, 0), (6, 0));
            assert!(validate_action(&state, &castle).is_ok());

            // a rook eyeing f1 forbids the crossing
            state.board.put(5, 7, BlackRook);
            assert_eq!(validate_action(&state, &castle), Err(Error::InvalidKingCastle));
            state.board.put(5, 7, Empty);

            // a piece in the way forbids it too
            state.board.put(6, 0, WhiteKnight);
            assert_eq!(validate_action(&state, &castle), Err(Error::InvalidKingCastle));
            state.board.put(6, 0, Empty);

            // as does a lapsed right
            state.board.castling[CastlingRight::WhiteKingSide as usize] = false;
            assert_eq!(validate_action(&state, &castle), Err(Error::InvalidKingCastle));
        }

        #[test]
        fn queen_side_castle_checks_the_b_file_square_for_vacancy_only() {
            let mut state = bare_kings();
            state.board.put(0, 0, WhiteRook);

            let castle = Action::castle((4, 0), (2, 0));
            assert!(validate_action(&state, &castle).is_ok());

            // b1 must be vacant even though the king never crosses it
            state.board.put(1, 0, WhiteKnight);
            assert_eq!(validate_action(&state, &castle), Err(Error::InvalidKingCastle));
            state.board.put(1, 0, Empty);

            // but an attack on b1 alone does not forbid the castle
            state.board.put(1, 7, BlackRook);
            assert!(validate_action(&state, &castle).is_ok());
        }

        #[test]
        fn castling_out_of_check_is_forbidden() {
            let mut state = bare_kings();
            state.board.put(7, 0, WhiteRook);
            state.board.put(4, 6, BlackRook);
            state.check = true;

            assert_eq!(
                validate_action(&state, &Action::castle((4, 0), (6, 0))),
                Err(Error::InvalidKingCastle)
            );
        }

        #[test]
        fn black_king_side_castle_checks_its_own_back_rank() {
            let mut state = bare_kings();
            state.board.put(7, 7, BlackRook);
            state.board.black_turn = true;
            // white pieces on f1/g1 must not matter to black's castle
            state.board.put(5, 0, WhiteBishop);
            state.board.put(6, 0, WhiteKnight);

            assert!(validate_action(&state, &Action::castle((4, 7), (6, 7))).is_ok());

            state.board.put(5, 7, WhiteBishop);
            assert_eq!(
                validate_action(&state, &Action::castle((4, 7), (6, 7))),
                Err(Error::InvalidKingCastle)
            );
        }
    }

    mod applier {
        use super::*;

        fn opening_with_table() -> (GameState, ZobristTable, u64) {
            let state = standard_opening();
            let table = ZobristTable::with_seed(99);
            let hash = table.hash(&state.board);
            (state, table, hash)
        }

        #[test]
        fn pawn_advance_resets_the_streak_and_keeps_the_hash_current() {
            let (mut state, table, hash) = opening_with_table();
            state.draw_plies = 7;

            let hash = apply_action(&mut state, hash, &Action::piece_move((4, 1), (4, 3)), &table);

            assert_eq!(state.board.piece_at(4, 3), WhitePawn);
            assert_eq!(state.board.piece_at(4, 1), Empty);
            assert_eq!(state.draw_plies, 0);
            // no black pawn stands beside e4, so no en-passant file
            assert_eq!(state.board.en_passant_column(), -1);
            // the turn is handed over by the caller, not here
            assert!(!state.board.black_turn());
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn quiet_moves_extend_the_streak() {
            let (mut state, table, hash) = opening_with_table();

            apply_action(&mut state, hash, &Action::piece_move((6, 0), (5, 2)), &table);
            assert_eq!(state.draw_plies, 1);
        }

        #[test]
        fn double_advance_beside_an_enemy_pawn_opens_en_passant() {
            let table = ZobristTable::with_seed(99);
            let mut state = bare_kings();
            state.board.put(4, 1, WhitePawn);
            state.board.put(3, 3, BlackPawn);
            let hash = table.hash(&state.board);

            let hash = apply_action(&mut state, hash, &Action::piece_move((4, 1), (4, 3)), &table);

            assert_eq!(state.board.en_passant_column(), 4);
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn en_passant_capture_removes_the_passed_pawn() {
            let table = ZobristTable::with_seed(99);
            let mut state = bare_kings();
            state.board.put(4, 4, WhitePawn);
            state.board.put(3, 4, BlackPawn);
            state.board.en_passant_column = 3;
            let hash = table.hash(&state.board);

            let hash = apply_action(&mut state, hash, &Action::piece_move((4, 4), (3, 5)), &table);

            assert_eq!(state.board.piece_at(3, 5), WhitePawn);
            assert_eq!(state.board.piece_at(4, 4), Empty);
            assert_eq!(state.board.piece_at(3, 4), Empty);
            assert_eq!(state.draw_plies, 0);
            assert_eq!(state.board.en_passant_column(), -1);
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn king_side_castle_places_both_pieces_and_burns_the_rights() {
            let table = ZobristTable::with_seed(99);
            let mut state = bare_kings();
            state.board.put(7, 0, WhiteRook);
            let hash = table.hash(&state.board);

            let hash = apply_action(&mut state, hash, &Action::castle((4, 0), (6, 0)), &table);

            assert_eq!(state.board.piece_at(6, 0), WhiteKing);
            assert_eq!(state.board.piece_at(5, 0), WhiteRook);
            assert_eq!(state.board.piece_at(4, 0), Empty);
            assert_eq!(state.board.piece_at(7, 0), Empty);
            assert!(!state.board.castle_right(CastlingRight::WhiteKingSide));
            assert!(!state.board.castle_right(CastlingRight::WhiteQueenSide));
            assert_eq!(state.white_king, (6, 0));
            assert_eq!(state.draw_plies, 1);
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn queen_side_castle_uses_the_other_corner() {
            let table = ZobristTable::with_seed(99);
            let mut state = bare_kings();
            state.board.put(0, 7, BlackRook);
            state.board.black_turn = true;
            let hash = table.hash(&state.board);

            let hash = apply_action(&mut state, hash, &Action::castle((4, 7), (2, 7)), &table);

            assert_eq!(state.board.piece_at(2, 7), BlackKing);
            assert_eq!(state.board.piece_at(3, 7), BlackRook);
            assert_eq!(state.board.piece_at(0, 7), Empty);
            assert_eq!(state.black_king, (2, 7));
            assert!(!state.board.castle_right(CastlingRight::BlackQueenSide));
            assert!(!state.board.castle_right(CastlingRight::BlackKingSide));
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn a_rook_leaving_its_corner_burns_one_right() {
            let table = ZobristTable::with_seed(99);
            let mut state = standard_opening();
            state.board.put(0, 1, Empty); // lift the a2 pawn out of the way
            let hash = table.hash(&state.board);

            let hash = apply_action(&mut state, hash, &Action::piece_move((0, 0), (0, 3)), &table);

            assert!(!state.board.castle_right(CastlingRight::WhiteQueenSide));
            assert!(state.board.castle_right(CastlingRight::WhiteKingSide));
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn a_king_move_burns_both_rights_and_updates_the_cache() {
            let table = ZobristTable::with_seed(99);
            let mut state = bare_kings();
            let hash = table.hash(&state.board);

            let hash = apply_action(&mut state, hash, &Action::piece_move((4, 0), (5, 1)), &table);

            assert_eq!(state.white_king, (5, 1));
            assert!(!state.board.castle_right(CastlingRight::WhiteQueenSide));
            assert!(!state.board.castle_right(CastlingRight::WhiteKingSide));
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn promotion_replaces_the_pawn_and_may_capture() {
            let table = ZobristTable::with_seed(99);
            let mut state = bare_kings();
            state.board.put(0, 6, WhitePawn);
            state.board.put(1, 7, BlackRook);
            state.draw_plies = 31;
            let hash = table.hash(&state.board);

            let action = Action::promotion((0, 6), (1, 7), WhiteQueen);
            let hash = apply_action(&mut state, hash, &action, &table);

            assert_eq!(state.board.piece_at(1, 7), WhiteQueen);
            assert_eq!(state.board.piece_at(0, 6), Empty);
            assert_eq!(state.draw_plies, 0);
            assert_eq!(hash, table.hash(&state.board));
        }

        #[test]
        fn resignation_hands_the_win_to_the_opponent() {
            let (mut state, table, hash) = opening_with_table();
            apply_action(&mut state, hash, &Action::Resign, &table);
            assert_eq!(state.status, Status::BlackWin);

            let mut state = standard_opening();
            state.board.black_turn = true;
            let hash = table.hash(&state.board);
            apply_action(&mut state, hash, &Action::Resign, &table);
            assert_eq!(state.status, Status::WhiteWin);
        }

        #[test]
        fn any_action_consumes_a_standing_offer() {
            let (mut state, table, hash) = opening_with_table();
            state.draw_offer = true;

            apply_action(&mut state, hash, &Action::piece_move((6, 0), (5, 2)), &table);
            assert!(!state.draw_offer);
        }

        #[test]
        fn an_offer_survives_until_the_next_action() {
            let (mut state, table, hash) = opening_with_table();

            let action = Action::piece_move((4, 1), (4, 3)).offering_draw();
            apply_action(&mut state, hash, &action, &table);
            assert!(state.draw_offer);
        }
    }

    mod generator {
        use super::*;

        #[test]
        fn the_opening_position_has_twenty_legal_replies() {
            let state = standard_opening();
            let table = ZobristTable::with_seed(3);
            let hash = table.hash(&state.board);

            assert_eq!(count_legal_replies(&state, &table, hash), 20);
        }

        #[test]
        fn every_emitted_action_passes_the_validator() {
            let state = standard_opening();
            let mut emitted = 0;
            for_each_pseudo_legal(&state, |action| {
                assert!(validate_action(&state, &action).is_ok());
                emitted += 1;
            });
            assert_eq!(emitted, 20);
        }

        #[test]
        fn promotion_replies_are_seen() {
            let mut state = bare_kings();
            state.board.put(0, 6, WhitePawn);

            let mut promotions = Vec::new();
            for_each_pseudo_legal(&state, |action| {
                if let Action::Promote { .. } = action {
                    promotions.push(action);
                }
            });
            assert_eq!(
                promotions,
                vec![Action::promotion((0, 6), (0, 7), WhiteQueen)]
            );
        }

        #[test]
        fn pinned_pieces_do_not_count_as_replies() {
            // the bishop on e2 shields its king from the rook on e8
            let table = ZobristTable::with_seed(3);
            let mut state = bare_kings();
            state.board.castling = [false; CastlingRight::COUNT];
            state.board.put(4, 1, WhiteBishop);
            state.board.put(4, 6, BlackRook);
            let hash = table.hash(&state.board);

            let mut bishop_moves = 0;
            for_each_pseudo_legal(&state, |action| {
                if let Action::Move { from: (4, 1), .. } = action {
                    bishop_moves += 1;
                }
            });
            assert!(bishop_moves > 0);

            let legal = count_legal_replies(&state, &table, hash);
            let mut pseudo = 0;
            for_each_pseudo_legal(&state, |_| pseudo += 1);
            assert_eq!(legal, pseudo - bishop_moves);
        }
    }
}
