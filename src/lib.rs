//! Reversi-MCTS: a Reversi (Othello) engine driven by Monte Carlo Tree Search.
//!
//! The crate holds the game rules and the search that picks the computer's
//! move. A front-end (the bundled console, or a GUI) drives a
//! [`GameSession`](session::GameSession) and reads back the board, legal
//! moves and search statistics.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry and engine parameters
//! - [`config`] - Runtime engine configuration
//! - [`error`] - Error types
//! - [`board`] - Board representation and flip resolution
//! - [`rules`] - Legal moves, game end and winner
//! - [`tree`] - Arena-backed search tree with UCT priorities
//! - [`playout`] - Random rollouts with an incremental frontier
//! - [`mcts`] - Monte Carlo Tree Search
//! - [`worker`] - Background search thread
//! - [`session`] - Turn state machine, history and undo
//! - [`console`] - Line-oriented text front-end
//!
//! ## Example
//!
//! ```
//! use reversi_mcts::board::{Board, Stone};
//! use reversi_mcts::mcts::Mcts;
//! use reversi_mcts::rules::legal_moves;
//!
//! let board = Board::with_opening(8);
//! let report = Mcts::new(1_000).search(&board, Stone::Black).unwrap();
//! assert!(legal_moves(&board, Stone::Black).contains(&report.best_move));
//! assert_eq!(report.root_visits, 1_000);
//! ```

pub mod board;
pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod mcts;
pub mod playout;
pub mod rules;
pub mod session;
pub mod tree;
pub mod worker;
