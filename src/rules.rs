//! Reversi move rules: legality, move generation, and game end.
//!
//! These functions are shared by the live game session and by search
//! rollouts. They are pure over the board they are given.

use crate::board::{Board, Point, Stone};
use crate::constants::{DIRECTIONS, DRAW_CREDIT};
use crate::error::MoveError;

/// Final result of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Black,
    White,
    Draw,
}

impl Outcome {
    /// The winning colour, or `None` for a draw.
    pub fn winner(self) -> Option<Stone> {
        match self {
            Outcome::Black => Some(Stone::Black),
            Outcome::White => Some(Stone::White),
            Outcome::Draw => None,
        }
    }

    /// Win credit this result gives to `player`: 1 for a win, 0.5 for a draw,
    /// 0 for a loss.
    #[inline]
    pub fn credit_for(self, player: Stone) -> f64 {
        match self.winner() {
            Some(w) if w == player => 1.0,
            Some(_) => 0.0,
            None => DRAW_CREDIT,
        }
    }
}

/// Whether `color` may place a stone at `(x, y)`.
///
/// The cell must be empty and at least one direction must hold a run of
/// opponent stones closed off by a `color` stone.
pub fn is_legal(board: &Board, color: Stone, x: usize, y: usize) -> bool {
    if !board.in_bounds(x, y) || board.get(x, y) != Stone::Empty {
        return false;
    }
    DIRECTIONS
        .iter()
        .any(|&dir| brackets(board, color, (x, y), dir))
}

/// Does a run of opponent stones starting next to `from` end on `color`?
fn brackets(board: &Board, color: Stone, from: Point, dir: (isize, isize)) -> bool {
    let opp = color.opponent();
    let mut seen_opponent = false;
    let mut cur = board.step(from, dir);
    while let Some((x, y)) = cur {
        let stone = board.get(x, y);
        if stone == opp {
            seen_opponent = true;
        } else {
            return stone == color && seen_opponent;
        }
        cur = board.step((x, y), dir);
    }
    false
}

/// All legal moves for `color`, `x` outermost then `y`.
pub fn legal_moves(board: &Board, color: Stone) -> Vec<Point> {
    board
        .points()
        .filter(|&(x, y)| is_legal(board, color, x, y))
        .collect()
}

/// Legal moves for `color` among `candidates`, in candidate order.
pub fn legal_moves_among(board: &Board, color: Stone, candidates: &[Point]) -> Vec<Point> {
    candidates
        .iter()
        .copied()
        .filter(|&(x, y)| is_legal(board, color, x, y))
        .collect()
}

/// Whether `color` has at least one legal move.
pub fn has_legal_move(board: &Board, color: Stone) -> bool {
    board.points().any(|(x, y)| is_legal(board, color, x, y))
}

/// True when neither colour can move, i.e. the game is over.
pub fn game_has_no_moves(board: &Board) -> bool {
    !has_legal_move(board, Stone::Black) && !has_legal_move(board, Stone::White)
}

/// Result by stone count. Meaningful once the game is over.
pub fn winner(board: &Board) -> Outcome {
    let black = board.count(Stone::Black);
    let white = board.count(Stone::White);
    match black.cmp(&white) {
        std::cmp::Ordering::Greater => Outcome::Black,
        std::cmp::Ordering::Less => Outcome::White,
        std::cmp::Ordering::Equal => Outcome::Draw,
    }
}

/// Validate and play `color` at `p`, returning the number of flipped stones.
///
/// On error the board is left unchanged.
pub fn try_move(board: &mut Board, color: Stone, (x, y): Point) -> Result<usize, MoveError> {
    if !board.in_bounds(x, y) {
        return Err(MoveError::OutOfBounds {
            x,
            y,
            size: board.size(),
        });
    }
    if board.get(x, y) != Stone::Empty {
        return Err(MoveError::Occupied { x, y });
    }
    if !is_legal(board, color, x, y) {
        return Err(MoveError::NoFlips { x, y });
    }
    Ok(board.apply_move(x, y, color))
}
