//! Random playouts (rollouts) used to evaluate tree leaves.
//!
//! A playout plays uniformly random legal moves, passing when a side has
//! none, until neither side can move. Candidate cells come from a
//! [`Frontier`] of empty cells next to stones, updated after every move
//! instead of rescanning the whole board.

use crate::board::{Board, Point, Stone};
use crate::constants::DIRECTIONS;
use crate::rules::{legal_moves_among, winner, Outcome};

/// Empty cells adjacent to at least one stone.
///
/// Only these cells can ever be legal moves. Flips never change which cells
/// are occupied, so placing a stone is the only event that updates the set.
#[derive(Clone, Debug)]
pub struct Frontier {
    size: usize,
    member: Vec<bool>,
    cells: Vec<Point>,
}

impl Frontier {
    /// Scan `board` once for the initial frontier.
    pub fn new(board: &Board) -> Self {
        let size = board.size();
        let mut frontier = Self {
            size,
            member: vec![false; size * size],
            cells: Vec::new(),
        };
        for p in board.empty_cells() {
            if touches_stone(board, p) {
                frontier.insert(p);
            }
        }
        frontier
    }

    #[inline]
    fn idx(&self, (x, y): Point) -> usize {
        x * self.size + y
    }

    fn insert(&mut self, p: Point) {
        let i = self.idx(p);
        if !self.member[i] {
            self.member[i] = true;
            self.cells.push(p);
        }
    }

    fn remove(&mut self, p: Point) {
        let i = self.idx(p);
        if self.member[i] {
            self.member[i] = false;
            if let Some(pos) = self.cells.iter().position(|&c| c == p) {
                self.cells.swap_remove(pos);
            }
        }
    }

    /// Update after a stone was placed at `p` on `board`.
    pub fn place(&mut self, board: &Board, p: Point) {
        self.remove(p);
        for dir in DIRECTIONS {
            if let Some((nx, ny)) = board.step(p, dir) {
                if board.get(nx, ny) == Stone::Empty {
                    self.insert((nx, ny));
                }
            }
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.member[self.idx(p)]
    }

    pub fn cells(&self) -> &[Point] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn touches_stone(board: &Board, p: Point) -> bool {
    DIRECTIONS.iter().any(|&dir| {
        board
            .step(p, dir)
            .is_some_and(|(x, y)| board.get(x, y) != Stone::Empty)
    })
}

/// Play a random game from `board` with `to_move` to move and return the
/// result.
pub fn rollout(board: &Board, to_move: Stone, rng: &mut fastrand::Rng) -> Outcome {
    let mut board = board.clone();
    let mut frontier = Frontier::new(&board);
    let mut color = to_move;

    loop {
        let mut moves = legal_moves_among(&board, color, frontier.cells());
        if moves.is_empty() {
            color = color.opponent();
            moves = legal_moves_among(&board, color, frontier.cells());
            if moves.is_empty() {
                return winner(&board);
            }
        }

        let (x, y) = moves[rng.usize(..moves.len())];
        board.apply_move(x, y, color);
        frontier.place(&board, (x, y));
        color = color.opponent();
    }
}
