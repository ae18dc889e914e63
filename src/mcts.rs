//! Monte Carlo Tree Search with UCT selection.
//!
//! Each iteration runs four steps:
//! - Selection: descend by maximum UCT priority to a leaf
//! - Expansion: one child per legal move (passing if the side to move has none)
//! - Simulation: a random rollout from one fresh child
//! - Backpropagation: credit the result up to the root
//!
//! Terminal leaves skip expansion and simulation; their result is
//! backpropagated directly. The best move is the most visited root child.

use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use log::{debug, error, info};

use crate::board::{format_point, Board, Point, Stone};
use crate::config::{EngineConfig, RolloutPolicy};
use crate::constants::{DEFAULT_SIMULATIONS, REPORT_PERIOD};
use crate::error::SearchError;
use crate::playout::rollout;
use crate::rules::{legal_moves, winner};
use crate::tree::{NodeId, Tree};

/// Statistics of one root child.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStat {
    pub mv: Point,
    pub visits: u32,
    pub win_ratio: f64,
}

/// What a finished search reports.
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// Colour that plays `best_move`: the requested colour, or its opponent
    /// if the requested colour had to pass.
    pub mover: Stone,
    pub best_move: Point,
    pub root_visits: u32,
    /// Root children in construction order
    pub moves: Vec<MoveStat>,
    pub nodes: usize,
    pub depth: usize,
    pub nodes_per_depth: Vec<usize>,
    pub elapsed: Duration,
}

impl SearchReport {
    /// Statistics of the chosen move.
    pub fn best(&self) -> Option<&MoveStat> {
        self.moves.iter().find(|m| m.mv == self.best_move)
    }
}

/// Search engine state: budget, rollout policy and random source.
pub struct Mcts {
    simulations: usize,
    rollout: RolloutPolicy,
    rng: fastrand::Rng,
    progress: Option<ProgressBar>,
}

impl Default for Mcts {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATIONS)
    }
}

impl Mcts {
    pub fn new(simulations: usize) -> Self {
        Self {
            simulations,
            rollout: RolloutPolicy::default(),
            rng: fastrand::Rng::new(),
            progress: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.simulations)
            .with_rollout(config.rollout)
            .with_seed(config.seed)
    }

    pub fn with_rollout(mut self, rollout: RolloutPolicy) -> Self {
        self.rollout = rollout;
        self
    }

    /// Seed the random source; `None` keeps the entropy-seeded one.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.rng = fastrand::Rng::with_seed(seed);
        }
        self
    }

    /// Advance `progress` by one per iteration.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn simulations(&self) -> usize {
        self.simulations
    }

    /// Search for `to_move`'s best move on `board`.
    ///
    /// If `to_move` has no legal move the turn passes inside the search and
    /// the report carries the opponent's move; check [`SearchReport::mover`].
    ///
    /// Fails with [`SearchError::TerminalPosition`] when the root could not be
    /// expanded, which means the game was already over.
    pub fn search(&mut self, board: &Board, to_move: Stone) -> Result<SearchReport, SearchError> {
        if self.simulations == 0 {
            return Err(SearchError::NoIterations);
        }
        let start = Instant::now();
        let tree = self.build_tree(board, to_move);
        let elapsed = start.elapsed();

        let Some(best) = tree.most_visited_child() else {
            error!("search invoked on a terminal position:\n{board}");
            return Err(SearchError::TerminalPosition);
        };
        let root = tree.get(tree.root());
        let moves: Vec<MoveStat> = root
            .children
            .iter()
            .filter_map(|&c| {
                let node = tree.get(c);
                node.from_move.map(|mv| MoveStat {
                    mv,
                    visits: node.visits,
                    win_ratio: node.win_ratio(),
                })
            })
            .collect();
        let best_node = tree.get(best);
        let best_move = best_node.from_move.ok_or(SearchError::TerminalPosition)?;

        let mover = root.to_move;
        if mover != to_move {
            info!("{} has no move, searching for {}", to_move.name(), mover.name());
        }

        let report = SearchReport {
            mover,
            best_move,
            root_visits: root.visits,
            moves,
            nodes: tree.len(),
            depth: tree.depth(),
            nodes_per_depth: tree.nodes_per_depth(),
            elapsed,
        };

        info!(
            "{} plays {} (win ratio {:.1}/{} = {:.3}) after {:.2}s",
            mover.name(),
            format_point(best_move),
            best_node.wins,
            best_node.visits,
            best_node.win_ratio(),
            elapsed.as_secs_f64()
        );
        debug!(
            "root visits: {}, nodes: {}, depth: {}, nodes per depth: {:?}",
            report.root_visits, report.nodes, report.depth, report.nodes_per_depth
        );
        for m in &report.moves {
            debug!(
                "  {}: {:.1}/{} = {:.3}",
                format_point(m.mv),
                (m.win_ratio * m.visits as f64),
                m.visits,
                m.win_ratio
            );
        }

        Ok(report)
    }

    /// Run the configured number of iterations and return the whole tree.
    pub fn build_tree(&mut self, board: &Board, to_move: Stone) -> Tree {
        let mut tree = Tree::new(board.clone(), to_move);
        for i in 0..self.simulations {
            self.iterate(&mut tree);
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
            if (i + 1) % REPORT_PERIOD == 0 {
                debug!("search: {}/{} iterations", i + 1, self.simulations);
            }
        }
        tree
    }

    /// One selection / expansion / simulation / backpropagation cycle.
    fn iterate(&mut self, tree: &mut Tree) {
        let leaf = tree.select_leaf();

        let Some(child) = self.expand(tree, leaf) else {
            // Neither side can move: score the leaf as it stands.
            let outcome = winner(&tree.get(leaf).board);
            tree.backpropagate(leaf, outcome);
            return;
        };

        let node = tree.get(child);
        let outcome = rollout(&node.board, node.to_move, &mut self.rng);
        tree.backpropagate(child, outcome);
    }

    /// Create one child per legal move of `id` and return the child to roll
    /// out from, or `None` if the position is terminal.
    fn expand(&mut self, tree: &mut Tree, id: NodeId) -> Option<NodeId> {
        let node = tree.get(id);
        let mut mover = node.to_move;
        let mut moves = legal_moves(&node.board, mover);
        if moves.is_empty() {
            mover = mover.opponent();
            moves = legal_moves(&node.board, mover);
            if moves.is_empty() {
                return None;
            }
            // Pass: the opponent moves from this node.
            tree.get_mut(id).to_move = mover;
        }

        let board = tree.get(id).board.clone();
        let mut children = Vec::with_capacity(moves.len());
        for (x, y) in moves {
            let mut child_board = board.clone();
            child_board.apply_move(x, y, mover);
            children.push(tree.add_child(id, child_board, mover.opponent(), (x, y)));
        }

        match self.rollout {
            RolloutPolicy::FirstChild => children.first().copied(),
            RolloutPolicy::RandomChild => {
                let i = self.rng.usize(..children.len());
                children.get(i).copied()
            }
        }
    }
}
