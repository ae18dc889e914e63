//! Arena-backed search tree.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. Each
//! node owns a private board snapshot; nothing is shared between nodes.

use crate::board::{Board, Point, Stone};
use crate::constants::UCT_EXPLORATION;
use crate::rules::Outcome;

/// Index of a node in its [`Tree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct Node {
    /// Position after `from_move` was played
    pub board: Board,
    pub parent: Option<NodeId>,
    /// Colour to move from this position. Flipped in place when the node is
    /// expanded and this colour has to pass.
    pub to_move: Stone,
    /// Move that produced this node (`None` at the root)
    pub from_move: Option<Point>,
    /// Children in construction order
    pub children: Vec<NodeId>,
    pub visits: u32,
    /// Wins for the player who chose `from_move`; draws count half
    pub wins: f64,
}

impl Node {
    fn new(board: Board, parent: Option<NodeId>, to_move: Stone, from_move: Option<Point>) -> Self {
        Self {
            board,
            parent,
            to_move,
            from_move,
            children: Vec::new(),
            visits: 0,
            wins: 0.0,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Fraction of visits won, 0 if never visited.
    pub fn win_ratio(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }

    /// UCT priority given the parent's current visit count.
    ///
    /// Unvisited nodes score +inf so every child is tried once before any is
    /// tried twice.
    pub fn priority(&self, parent_visits: u32) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        let exploit = self.wins / visits;
        let explore = UCT_EXPLORATION * ((parent_visits as f64).ln() / visits).sqrt();
        exploit + explore
    }
}

#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// A tree holding only the root position.
    pub fn new(board: Board, to_move: Stone) -> Self {
        Self {
            nodes: vec![Node::new(board, None, to_move, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Append a child of `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, board: Board, to_move: Stone, mv: Point) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(board, Some(parent), to_move, Some(mv)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// UCT priority of `id` against its parent's current visit count.
    /// The root has no parent and scores 0.
    pub fn priority(&self, id: NodeId) -> f64 {
        let node = self.get(id);
        match node.parent {
            Some(p) => node.priority(self.get(p).visits),
            None => 0.0,
        }
    }

    /// The child of `id` with the highest UCT priority.
    ///
    /// Ties go to the earliest child in construction order. Priorities are
    /// computed from the current counts on every call, never cached.
    pub fn select_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &node.children {
            let score = self.get(child).priority(node.visits);
            match best {
                Some((_, s)) if score <= s => {}
                _ => best = Some((child, score)),
            }
        }
        best.map(|(c, _)| c)
    }

    /// Descend from the root by [`select_child`](Self::select_child) until a
    /// node without children.
    pub fn select_leaf(&self) -> NodeId {
        let mut id = self.root();
        while let Some(child) = self.select_child(id) {
            id = child;
        }
        id
    }

    /// Credit `outcome` to every node from `from` up to, but not including,
    /// the root, then count one more root visit.
    ///
    /// A node's win is judged from its parent's colour to move, the player
    /// who chose it.
    pub fn backpropagate(&mut self, from: NodeId, outcome: Outcome) {
        let root = self.root();
        let mut cur = from;
        while cur != root {
            let Some(parent) = self.get(cur).parent else {
                break;
            };
            let credit = outcome.credit_for(self.get(parent).to_move);
            let node = self.get_mut(cur);
            node.visits += 1;
            node.wins += credit;
            cur = parent;
        }
        self.get_mut(root).visits += 1;
    }

    /// The root child with the most visits; ties go to the earliest child.
    pub fn most_visited_child(&self) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &child in &self.get(self.root()).children {
            match best {
                Some(b) if self.get(child).visits <= self.get(b).visits => {}
                _ => best = Some(child),
            }
        }
        best
    }

    /// Number of levels, counting the root as one.
    pub fn depth(&self) -> usize {
        self.nodes_per_depth().len()
    }

    /// Node counts per level, root first.
    pub fn nodes_per_depth(&self) -> Vec<usize> {
        // Children are always pushed after their parent, so one forward pass
        // sees every parent's depth before its children.
        let mut depth = vec![0usize; self.nodes.len()];
        let mut counts: Vec<usize> = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(p) = node.parent {
                depth[i] = depth[p.0] + 1;
            }
            if depth[i] >= counts.len() {
                counts.resize(depth[i] + 1, 0);
            }
            counts[depth[i]] += 1;
        }
        counts
    }
}
