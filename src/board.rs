//! Reversi board representation and flip resolution.
//!
//! The board is a flat `Vec` of [`Stone`] values indexed by `(x, y)`, where `x`
//! is the column and `y` the row. A [`Board`] is a plain value: cloning it
//! copies every cell, so search code can take private copies freely.

use std::fmt;

use crate::config::validate_board_size;
use crate::constants::{DIRECTIONS, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::ParseError;

/// Contents of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stone {
    #[default]
    Empty,
    Black,
    White,
}

impl Stone {
    /// The other colour. `Empty` stays `Empty`.
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Stone::Black => 'X',
            Stone::White => 'O',
            Stone::Empty => '.',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stone::Black => "black",
            Stone::White => "white",
            Stone::Empty => "empty",
        }
    }
}

/// A cell coordinate `(x, y)`.
pub type Point = (usize, usize);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Stone>,
}

impl Board {
    /// An empty `size` x `size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Stone::Empty; size * size],
        }
    }

    /// A board holding the standard four-stone opening.
    ///
    /// With `c = size / 2`, White sits on `(c-1, c-1)` and `(c, c)`, Black on
    /// `(c-1, c)` and `(c, c-1)`. Callers validate `size` first; see
    /// [`EngineConfig::validate`](crate::config::EngineConfig::validate).
    pub fn with_opening(size: usize) -> Self {
        debug_assert!(
            validate_board_size(size).is_ok(),
            "opening needs an even board size within {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}, got {size}"
        );
        let mut board = Self::new(size);
        let c = size / 2;
        board.set(c - 1, c - 1, Stone::White);
        board.set(c, c, Stone::White);
        board.set(c - 1, c, Stone::Black);
        board.set(c, c - 1, Stone::Black);
        board
    }

    /// Build a board from a diagram, one string per row (`y`), one character
    /// per column (`x`): `X` black, `O` white, `.` empty. Whitespace is ignored.
    pub fn from_rows(rows: &[&str]) -> Result<Self, ParseError> {
        let size = rows.len();
        let mut board = Self::new(size);
        for (y, row) in rows.iter().enumerate() {
            let cells: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != size {
                return Err(ParseError::RaggedRow {
                    row: y,
                    got: cells.len(),
                    expected: size,
                });
            }
            for (x, ch) in cells.into_iter().enumerate() {
                let stone = match ch {
                    'X' | 'x' | 'B' | 'b' => Stone::Black,
                    'O' | 'o' | 'W' | 'w' => Stone::White,
                    '.' | '-' => Stone::Empty,
                    other => return Err(ParseError::InvalidCell { character: other }),
                };
                board.set(x, y, stone);
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        x * self.size + y
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    /// Cell contents; out-of-range coordinates read as `Empty`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Stone {
        if !self.in_bounds(x, y) {
            return Stone::Empty;
        }
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, stone: Stone) {
        let i = self.idx(x, y);
        self.cells[i] = stone;
    }

    /// Step one cell from `(x, y)` in direction `(dx, dy)`, or `None` at the edge.
    #[inline]
    pub fn step(&self, (x, y): Point, (dx, dy): (isize, isize)) -> Option<Point> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.in_bounds(nx, ny).then_some((nx, ny))
    }

    /// Number of cells holding `stone`.
    pub fn count(&self, stone: Stone) -> usize {
        self.cells.iter().filter(|&&c| c == stone).count()
    }

    /// All empty cells, `x` outermost.
    pub fn empty_cells(&self) -> Vec<Point> {
        self.points()
            .filter(|&(x, y)| self.get(x, y) == Stone::Empty)
            .collect()
    }

    /// Every coordinate of the board, `x` outermost then `y`.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let size = self.size;
        (0..size).flat_map(move |x| (0..size).map(move |y| (x, y)))
    }

    /// Place `color` at `(x, y)` and flip every bracketed opponent run.
    ///
    /// Each direction is resolved on its own: a run of opponent stones is
    /// flipped only when it ends on a `color` stone. No legality check is made
    /// here; use [`rules::try_move`](crate::rules::try_move) for that.
    /// Returns the number of stones flipped.
    pub fn apply_move(&mut self, x: usize, y: usize, color: Stone) -> usize {
        self.set(x, y, color);
        let opp = color.opponent();
        let mut flipped = 0;

        for dir in DIRECTIONS {
            let mut run = 0;
            let mut cur = self.step((x, y), dir);
            while let Some((cx, cy)) = cur {
                if self.get(cx, cy) != opp {
                    break;
                }
                run += 1;
                cur = self.step((cx, cy), dir);
            }
            let closed = matches!(cur, Some((cx, cy)) if self.get(cx, cy) == color);
            if !closed || run == 0 {
                continue;
            }

            let mut p = (x, y);
            for _ in 0..run {
                // Bounded by the walk above.
                let Some(next) = self.step(p, dir) else { break };
                self.set(next.0, next.1, color);
                p = next;
            }
            flipped += run;
        }

        flipped
    }
}

/// Convert a coordinate string like "D3" to a point.
///
/// The letter names the column (`x`, `A` = 0), the number the row (`y`, 1-based).
pub fn parse_point(s: &str, size: usize) -> Result<Point, ParseError> {
    let invalid = || ParseError::InvalidPoint {
        input: s.to_string(),
    };
    let s = s.trim();
    let mut chars = s.chars();
    let col = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
    if !col.is_ascii_uppercase() {
        return Err(invalid());
    }
    let x = (col as u8 - b'A') as usize;
    let y: usize = chars.as_str().parse().map_err(|_| invalid())?;
    if y == 0 || x >= size || y > size {
        return Err(invalid());
    }
    Ok((x, y - 1))
}

/// Convert a point to its coordinate string, e.g. `(3, 2)` -> "D3".
pub fn format_point((x, y): Point) -> String {
    let col = (b'A' + x as u8) as char;
    format!("{col}{}", y + 1)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..self.size {
            write!(f, "{} ", (b'A' + x as u8) as char)?;
        }
        writeln!(f)?;
        for y in 0..self.size {
            write!(f, "{:>2} ", y + 1)?;
            for x in 0..self.size {
                write!(f, "{} ", self.get(x, y).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
