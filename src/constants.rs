//! Constants for board geometry, search parameters and defaults.
//!
//! Anything a user may want to change at runtime (board size, iteration
//! budget, seed) has its default here and an override in
//! [`EngineConfig`](crate::config::EngineConfig).

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board side length.
pub const DEFAULT_BOARD_SIZE: usize = 8;

/// Smallest board on which the four-stone opening is well defined.
pub const MIN_BOARD_SIZE: usize = 4;

/// Largest board whose columns can still be named with a single letter.
pub const MAX_BOARD_SIZE: usize = 26;

/// The 8 compass directions as (dx, dy).
/// Order: NW, N, NE, W, E, SW, S, SE
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of search iterations per computer move.
pub const DEFAULT_SIMULATIONS: usize = 60_000;

/// UCT exploration coefficient (sqrt 2).
pub const UCT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Number of iterations between progress log lines.
pub const REPORT_PERIOD: usize = 10_000;

/// Win credited to both sides when a game ends level.
pub const DRAW_CREDIT: f64 = 0.5;
