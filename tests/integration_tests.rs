//! Integration tests for reversi-mcts
//!
//! Rules scenarios on hand-built boards, whole games through a
//! `GameSession`, search tree invariants, and property tests over positions
//! reached by random legal play.

use proptest::prelude::*;

use reversi_mcts::board::{Board, Point, Stone};
use reversi_mcts::config::{EngineConfig, RolloutPolicy};
use reversi_mcts::error::{MoveError, SearchError};
use reversi_mcts::mcts::Mcts;
use reversi_mcts::rules::{
    Outcome, game_has_no_moves, has_legal_move, is_legal, legal_moves, try_move, winner,
};
use reversi_mcts::session::GameSession;
use reversi_mcts::tree::Tree;

// =============================================================================
// Helper functions
// =============================================================================

/// Play from the opening, picking `choices[i] % n` among the `n` legal moves
/// at step `i`. A side without moves passes; play stops when neither can move.
/// Returns the board and the colour to move.
fn play_out(size: usize, choices: &[usize]) -> (Board, Stone) {
    let mut board = Board::with_opening(size);
    let mut color = Stone::Black;
    for &choice in choices {
        let mut moves = legal_moves(&board, color);
        if moves.is_empty() {
            color = color.opponent();
            moves = legal_moves(&board, color);
            if moves.is_empty() {
                break;
            }
        }
        let (x, y) = moves[choice % moves.len()];
        board.apply_move(x, y, color);
        color = color.opponent();
    }
    (board, color)
}

/// Check visit bookkeeping for every node of a finished search.
fn assert_visit_invariants(tree: &Tree, iterations: u32) {
    let root = tree.get(tree.root());
    assert_eq!(root.visits, iterations);
    let child_sum: u32 = root.children.iter().map(|&c| tree.get(c).visits).sum();
    assert_eq!(child_sum, iterations);

    for (id, node) in tree.nodes() {
        if id == tree.root() || node.children.is_empty() {
            continue;
        }
        let sum: u32 = node.children.iter().map(|&c| tree.get(c).visits).sum();
        // At most one rollout ran from this node before it was expanded.
        assert!(
            node.visits == sum || node.visits == sum + 1,
            "node {} has {} visits, children {}",
            id.index(),
            node.visits,
            sum
        );
    }
}

fn quick_config(size: usize) -> EngineConfig {
    EngineConfig::default()
        .with_board_size(size)
        .with_simulations(50)
        .with_seed(Some(3))
}

// =============================================================================
// Rules scenarios
// =============================================================================

#[test]
fn test_opening_moves_for_black() {
    let board = Board::with_opening(8);
    assert_eq!(board.get(3, 3), Stone::White);
    assert_eq!(board.get(4, 4), Stone::White);
    assert_eq!(board.get(3, 4), Stone::Black);
    assert_eq!(board.get(4, 3), Stone::Black);
    assert_eq!(
        legal_moves(&board, Stone::Black),
        vec![(2, 3), (3, 2), (4, 5), (5, 4)]
    );
}

#[test]
fn test_opening_move_flips_one_stone() {
    let mut board = Board::with_opening(8);
    let flipped = try_move(&mut board, Stone::Black, (2, 3)).unwrap();
    assert_eq!(flipped, 1);
    assert_eq!(board.get(3, 3), Stone::Black);
    assert_eq!(board.get(4, 4), Stone::White);
    assert_eq!(board.count(Stone::Black), 4);
    assert_eq!(board.count(Stone::White), 1);
}

#[test]
fn test_black_passes_white_continues() {
    let board = Board::from_rows(&["OX..", "....", "....", "...."]).unwrap();
    assert!(!has_legal_move(&board, Stone::Black));
    assert_eq!(legal_moves(&board, Stone::White), vec![(2, 0)]);
    assert!(!game_has_no_moves(&board));

    let session =
        GameSession::from_position(quick_config(4), board, Stone::Black, Stone::Black).unwrap();
    assert!(!session.is_over());
    assert_eq!(session.to_move(), Stone::White);
    assert!(session.is_computer_turn());
}

#[test]
fn test_no_moves_ends_game_by_count() {
    let board = Board::from_rows(&["XX..", "X...", "....", "...O"]).unwrap();
    assert!(game_has_no_moves(&board));
    assert_eq!(winner(&board), Outcome::Black);

    let session =
        GameSession::from_position(quick_config(4), board, Stone::White, Stone::White).unwrap();
    assert!(session.is_over());
    assert_eq!(session.outcome(), Some(Outcome::Black));
    assert_eq!(session.result_text(), Some("You lose"));
}

#[test]
fn test_equal_counts_is_a_draw() {
    let board = Board::from_rows(&["X..O", "....", "....", "O..X"]).unwrap();
    assert!(game_has_no_moves(&board));
    assert_eq!(winner(&board), Outcome::Draw);
}

// =============================================================================
// Flip resolution
// =============================================================================

#[test]
fn test_move_with_no_flipping_direction() {
    let mut board = Board::with_opening(8);
    let before = board.clone();
    assert_eq!(
        try_move(&mut board, Stone::Black, (0, 0)),
        Err(MoveError::NoFlips { x: 0, y: 0 })
    );
    assert_eq!(board, before);
    assert!(!is_legal(&board, Stone::Black, 0, 0));
}

#[test]
fn test_move_flips_in_one_direction_only() {
    // Only the run to the east ends in a black stone.
    let mut board = Board::from_rows(&[
        "......", //
        "..O...", //
        ".OOOX.", //
        "..O...", //
        "......", //
        "......",
    ])
    .unwrap();
    let flipped = try_move(&mut board, Stone::Black, (0, 2)).unwrap();
    assert_eq!(flipped, 3);
    for x in 0..5 {
        assert_eq!(board.get(x, 2), Stone::Black);
    }
    assert_eq!(board.get(2, 1), Stone::White);
    assert_eq!(board.get(2, 3), Stone::White);
}

#[test]
fn test_move_flips_in_all_eight_directions() {
    let mut board = Board::from_rows(&[
        "........", //
        ".X.X.X..", //
        "..OOO...", //
        ".XO.OX..", //
        "..OOO...", //
        ".X.X.X..", //
        "........", //
        "........",
    ])
    .unwrap();
    let flipped = try_move(&mut board, Stone::Black, (3, 3)).unwrap();
    assert_eq!(flipped, 8);
    assert_eq!(board.count(Stone::White), 0);
    assert_eq!(board.count(Stone::Black), 17);
}

#[test]
fn test_run_without_closing_stone_does_not_flip() {
    // The white run to the west reaches the edge unflanked.
    let mut board = Board::from_rows(&["OO.X", "....", "....", "...."]).unwrap();
    assert_eq!(
        try_move(&mut board, Stone::Black, (2, 0)),
        Err(MoveError::NoFlips { x: 2, y: 0 })
    );
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_opening_search_returns_legal_move() {
    let board = Board::with_opening(8);
    let report = Mcts::new(10_000)
        .with_seed(Some(42))
        .search(&board, Stone::Black)
        .unwrap();
    assert!(legal_moves(&board, Stone::Black).contains(&report.best_move));
    assert_eq!(report.root_visits, 10_000);
    assert_eq!(report.moves.len(), 4);
    let total: u32 = report.moves.iter().map(|m| m.visits).sum();
    assert_eq!(total, 10_000);
}

#[test]
fn test_visit_invariants_first_child() {
    let board = Board::with_opening(6);
    let tree = Mcts::new(2_000)
        .with_seed(Some(7))
        .build_tree(&board, Stone::Black);
    assert_visit_invariants(&tree, 2_000);
}

#[test]
fn test_visit_invariants_random_child() {
    let board = Board::with_opening(6);
    let tree = Mcts::new(2_000)
        .with_rollout(RolloutPolicy::RandomChild)
        .with_seed(Some(7))
        .build_tree(&board, Stone::Black);
    assert_visit_invariants(&tree, 2_000);
    assert!(tree.depth() > 2);
}

#[test]
fn test_visit_invariants_near_end_of_game() {
    // Few empty cells left, so the tree reaches terminal leaves.
    let (board, to_move) = play_out(4, &[0, 1, 2, 0, 1, 2, 0, 1]);
    assert!(!game_has_no_moves(&board));
    let tree = Mcts::new(500)
        .with_seed(Some(11))
        .build_tree(&board, to_move);
    assert_visit_invariants(&tree, 500);
}

#[test]
fn test_search_on_finished_game_is_error() {
    let board = Board::from_rows(&["XX..", "....", "....", "...."]).unwrap();
    assert_eq!(
        Mcts::new(10).search(&board, Stone::Black).unwrap_err(),
        SearchError::TerminalPosition
    );
}

#[test]
fn test_seeded_searches_agree() {
    let board = Board::with_opening(6);
    let a = Mcts::new(800)
        .with_seed(Some(5))
        .search(&board, Stone::Black)
        .unwrap();
    let b = Mcts::new(800)
        .with_seed(Some(5))
        .search(&board, Stone::Black)
        .unwrap();
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.moves, b.moves);
}

// =============================================================================
// Whole games
// =============================================================================

#[test]
fn test_full_game_through_session() {
    let mut session = GameSession::new(quick_config(6)).unwrap();
    let mut turns = 0;
    while !session.is_over() {
        if session.is_human_turn() {
            let (x, y) = session.legal_moves()[0];
            session.human_place(x, y).unwrap();
        } else {
            session.request_computer_move(false).unwrap();
            session.wait().unwrap();
        }
        turns += 1;
        assert!(turns <= 40, "game did not finish");
    }

    let board = session.board();
    assert!(game_has_no_moves(board));
    assert_eq!(session.outcome(), Some(winner(board)));
    assert!(session.legal_moves().is_empty());
    assert!(session.result_text().is_some());
    assert_eq!(
        session.count(Stone::Black) + session.count(Stone::White),
        board.count(Stone::Black) + board.count(Stone::White)
    );
}

#[test]
fn test_undo_back_to_opening() {
    let mut session = GameSession::new(quick_config(6)).unwrap();
    let (x, y) = session.legal_moves()[0];
    session.human_place(x, y).unwrap();
    session.request_computer_move(false).unwrap();
    session.wait().unwrap();
    assert!(session.is_human_turn() || session.is_over());

    session.undo().unwrap();
    assert_eq!(session.board(), &Board::with_opening(6));
    assert_eq!(session.to_move(), Stone::Black);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_undo_takes_back_consecutive_computer_moves() {
    let mut session = GameSession::new(quick_config(4)).unwrap();
    session.human_place(3, 2).unwrap();
    session.place((3, 1)).unwrap();
    let before = session.board().clone();
    assert_eq!(
        before,
        Board::from_rows(&["....", ".OOO", ".XXX", "...."]).unwrap()
    );

    session.human_place(1, 0).unwrap();
    session.place((3, 3)).unwrap();
    // Black has no move, so White moves again.
    assert_eq!(session.to_move(), Stone::White);
    session.place((0, 0)).unwrap();
    assert!(session.is_human_turn());
    assert_eq!(session.history().len(), 6);

    session.undo().unwrap();
    assert_eq!(session.board(), &before);
    assert_eq!(session.to_move(), Stone::Black);
    assert_eq!(session.history().len(), 3);
    assert_eq!(session.last_move(), Some((3, 1)));
    assert!(session.is_legal(1, 0));
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_legal_moves_consistent(
        choices in prop::collection::vec(0usize..64, 0..40),
    ) {
        let (board, color) = play_out(8, &choices);
        let moves = legal_moves(&board, color);
        for &(x, y) in &moves {
            prop_assert_eq!(board.get(x, y), Stone::Empty);
            prop_assert!(is_legal(&board, color, x, y));
        }
        let listed: Vec<Point> = board
            .points()
            .filter(|&(x, y)| is_legal(&board, color, x, y))
            .collect();
        prop_assert_eq!(moves, listed);
    }

    #[test]
    fn prop_legal_moves_idempotent(
        choices in prop::collection::vec(0usize..64, 0..40),
    ) {
        let (board, color) = play_out(8, &choices);
        let copy = board.clone();
        let first = legal_moves(&board, color);
        let second = legal_moves(&board, color);
        prop_assert_eq!(first, second);
        prop_assert_eq!(board, copy);
    }

    #[test]
    fn prop_legal_move_grows_counts(
        choices in prop::collection::vec(0usize..64, 0..40),
        pick in 0usize..64,
    ) {
        let (board, color) = play_out(8, &choices);
        let moves = legal_moves(&board, color);
        prop_assume!(!moves.is_empty());
        let p = moves[pick % moves.len()];

        let mover_before = board.count(color);
        let total_before = board.count(Stone::Black) + board.count(Stone::White);
        let mut after = board.clone();
        let flipped = try_move(&mut after, color, p).unwrap();

        prop_assert!(flipped >= 1);
        prop_assert_eq!(after.count(color), mover_before + flipped + 1);
        prop_assert_eq!(
            after.count(Stone::Black) + after.count(Stone::White),
            total_before + 1
        );
    }

    #[test]
    fn prop_illegal_move_leaves_board_unchanged(
        choices in prop::collection::vec(0usize..64, 0..40),
        x in 0usize..8,
        y in 0usize..8,
    ) {
        let (board, color) = play_out(8, &choices);
        prop_assume!(!is_legal(&board, color, x, y));
        let mut after = board.clone();
        prop_assert!(try_move(&mut after, color, (x, y)).is_err());
        prop_assert_eq!(after, board);
    }
}
