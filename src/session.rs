//! Game session: turn order, history, undo, and computer moves.
//!
//! A [`GameSession`] owns the authoritative board. The front-end calls
//! [`human_place`](GameSession::human_place) for clicks and
//! [`request_computer_move`](GameSession::request_computer_move) when the
//! computer is to move (or the human asks for a hint); the search runs on a
//! background thread and its result is applied by
//! [`poll`](GameSession::poll) or [`wait`](GameSession::wait).

use log::{debug, info, warn};

use crate::board::{format_point, Board, Point, Stone};
use crate::config::EngineConfig;
use crate::error::SessionError;
use crate::mcts::{Mcts, MoveStat};
use crate::rules::{has_legal_move, legal_moves, try_move, winner, Outcome};
use crate::worker::{Completed, SearchPurpose, SearchWorker};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    GameOver(Outcome),
}

/// One entry of the move history: the move and the board right after it.
/// The first entry is the opening with no move.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub mv: Option<Point>,
    pub mover: Option<Stone>,
    pub board: Board,
}

/// What a collected search did to the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    /// The computer played this move.
    Placed(Point),
    /// This move was suggested to the human.
    Hinted(Point),
}

pub struct GameSession {
    config: EngineConfig,
    board: Board,
    to_move: Stone,
    human: Stone,
    state: GameState,
    history: Vec<HistoryEntry>,
    legal: Vec<Point>,
    legal_flags: Vec<bool>,
    black_count: usize,
    white_count: usize,
    last_move: Option<Point>,
    hint: Option<Point>,
    move_stats: Vec<MoveStat>,
    searches: u64,
    worker: SearchWorker,
}

impl GameSession {
    /// Validate `config` and start a game with the human playing first.
    pub fn new(config: EngineConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let size = config.board_size;
        let mut session = Self {
            board: Board::new(size),
            to_move: Stone::Black,
            human: Stone::Black,
            state: GameState::Playing,
            history: Vec::new(),
            legal: Vec::new(),
            legal_flags: vec![false; size * size],
            black_count: 0,
            white_count: 0,
            last_move: None,
            hint: None,
            move_stats: Vec::new(),
            searches: 0,
            worker: SearchWorker::new(),
            config,
        };
        session.new_game(true)?;
        Ok(session)
    }

    /// Start from an arbitrary position with `to_move` to move.
    ///
    /// The board's size overrides `config.board_size`. If `to_move` has no
    /// legal move the turn passes at once; if neither side has one the game
    /// is already over.
    pub fn from_position(
        config: EngineConfig,
        board: Board,
        to_move: Stone,
        human: Stone,
    ) -> Result<Self, SessionError> {
        let config = config.with_board_size(board.size());
        let mut session = Self::new(config)?;
        session.board = board;
        session.to_move = to_move;
        session.human = human;
        session.history = vec![HistoryEntry {
            mv: None,
            mover: None,
            board: session.board.clone(),
        }];
        session.settle_turn(to_move.opponent());
        session.refresh();
        Ok(session)
    }

    /// Reset to the opening. The human plays Black when `human_first`.
    ///
    /// A search still in flight is waited for and its result discarded.
    pub fn new_game(&mut self, human_first: bool) -> Result<(), SessionError> {
        self.config.validate()?;
        if let Some(stale) = self.worker.wait() {
            debug!("discarding {:?} search from the previous game", stale.purpose);
        }

        let size = self.config.board_size;
        self.board = Board::with_opening(size);
        self.to_move = Stone::Black;
        self.human = if human_first { Stone::Black } else { Stone::White };
        self.state = GameState::Playing;
        self.history = vec![HistoryEntry {
            mv: None,
            mover: None,
            board: self.board.clone(),
        }];
        self.last_move = None;
        self.hint = None;
        self.move_stats.clear();
        self.refresh();
        info!(
            "new {size}x{size} game, human plays {}",
            self.human.name()
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Stone {
        self.to_move
    }

    pub fn human(&self) -> Stone {
        self.human
    }

    pub fn computer(&self) -> Stone {
        self.human.opponent()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            GameState::GameOver(outcome) => Some(outcome),
            GameState::Playing => None,
        }
    }

    pub fn is_human_turn(&self) -> bool {
        self.state == GameState::Playing && self.to_move == self.human
    }

    pub fn is_computer_turn(&self) -> bool {
        self.state == GameState::Playing && self.to_move != self.human
    }

    /// Legal moves of the colour to move, `x` outermost.
    pub fn legal_moves(&self) -> &[Point] {
        &self.legal
    }

    /// Whether `(x, y)` is a legal move for the colour to move.
    pub fn is_legal(&self, x: usize, y: usize) -> bool {
        self.board.in_bounds(x, y) && self.legal_flags[x * self.board.size() + y]
    }

    pub fn count(&self, stone: Stone) -> usize {
        match stone {
            Stone::Black => self.black_count,
            Stone::White => self.white_count,
            Stone::Empty => self.board.size().pow(2) - self.black_count - self.white_count,
        }
    }

    pub fn last_move(&self) -> Option<Point> {
        self.last_move
    }

    pub fn hint(&self) -> Option<Point> {
        self.hint
    }

    /// Per-move statistics of the latest search.
    pub fn move_stats(&self) -> &[MoveStat] {
        &self.move_stats
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_thinking(&self) -> bool {
        self.worker.is_busy()
    }

    /// "You win", "You lose" or "Draw" once the game is over.
    pub fn result_text(&self) -> Option<&'static str> {
        self.outcome().map(|outcome| match outcome.winner() {
            None => "Draw",
            Some(w) if w == self.human => "You win",
            Some(_) => "You lose",
        })
    }

    /// One-line status for display.
    pub fn status_text(&self) -> &'static str {
        if let Some(text) = self.result_text() {
            return text;
        }
        if self.is_human_turn() {
            "Your turn"
        } else {
            "Computer is thinking"
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Play `p` for the colour to move.
    ///
    /// Illegal moves are rejected with the board unchanged. After the move the
    /// turn passes to the opponent, stays with the mover if the opponent has
    /// no move, or the game ends if neither side can move.
    pub fn place(&mut self, p: Point) -> Result<(), SessionError> {
        if self.is_over() {
            return Err(SessionError::GameOver);
        }
        let mover = self.to_move;
        let flipped = try_move(&mut self.board, mover, p)?;
        debug!(
            "{} plays {}, flipping {flipped}",
            mover.name(),
            format_point(p)
        );

        self.history.push(HistoryEntry {
            mv: Some(p),
            mover: Some(mover),
            board: self.board.clone(),
        });
        self.last_move = Some(p);
        self.hint = None;

        self.settle_turn(mover);
        self.refresh();
        Ok(())
    }

    /// Decide who moves after `mover`: the opponent if they can, `mover`
    /// again if only they can, otherwise the game is over.
    fn settle_turn(&mut self, mover: Stone) {
        let opponent = mover.opponent();
        if has_legal_move(&self.board, opponent) {
            self.to_move = opponent;
        } else if has_legal_move(&self.board, mover) {
            info!("{} has no move and passes", opponent.name());
            self.to_move = mover;
        } else {
            let outcome = winner(&self.board);
            self.state = GameState::GameOver(outcome);
            info!(
                "game over: {outcome:?} ({} black, {} white)",
                self.board.count(Stone::Black),
                self.board.count(Stone::White)
            );
        }
    }

    /// A human click: like [`place`](Self::place), but only on the human's
    /// turn and not while a search is running.
    pub fn human_place(&mut self, x: usize, y: usize) -> Result<(), SessionError> {
        if self.is_over() {
            return Err(SessionError::GameOver);
        }
        if self.to_move != self.human {
            return Err(SessionError::NotHumanTurn);
        }
        if self.worker.is_busy() {
            return Err(SessionError::SearchInFlight);
        }
        self.place((x, y))
    }

    /// Start a background search for the colour to move.
    ///
    /// With `hint_only` the result is only suggested to the human (human's
    /// turn required); otherwise the computer plays it (computer's turn
    /// required). A search already in flight is waited for and applied first.
    pub fn request_computer_move(&mut self, hint_only: bool) -> Result<(), SessionError> {
        self.wait()?;
        if self.is_over() {
            return Err(SessionError::GameOver);
        }
        let purpose = if hint_only {
            if !self.is_human_turn() {
                return Err(SessionError::NotHumanTurn);
            }
            SearchPurpose::Hint
        } else {
            if !self.is_computer_turn() {
                return Err(SessionError::NotComputerTurn);
            }
            SearchPurpose::Move
        };

        let mut config = self.config.clone();
        config.seed = config.seed.map(|s| s.wrapping_add(self.searches));
        self.searches += 1;
        let mcts = Mcts::from_config(&config);
        if let Some(stale) = self
            .worker
            .start(mcts, self.board.clone(), self.to_move, purpose)
        {
            // wait() above already drained the worker.
            warn!("dropping unexpected {:?} search result", stale.purpose);
        }
        Ok(())
    }

    /// Apply the search result if it is ready, without blocking.
    pub fn poll(&mut self) -> Result<Option<SearchEvent>, SessionError> {
        match self.worker.poll() {
            Some(done) => self.apply(done).map(Some),
            None => Ok(None),
        }
    }

    /// Block until the search in flight finishes and apply its result.
    /// Returns `Ok(None)` when no search was running.
    pub fn wait(&mut self) -> Result<Option<SearchEvent>, SessionError> {
        match self.worker.wait() {
            Some(done) => self.apply(done).map(Some),
            None => Ok(None),
        }
    }

    fn apply(&mut self, done: Completed) -> Result<SearchEvent, SessionError> {
        let report = done.result?;
        if done.to_move != self.to_move || self.is_over() {
            warn!("search result no longer matches the position, ignoring it");
            return Err(SessionError::StaleSearch);
        }
        self.move_stats = report.moves;
        match done.purpose {
            SearchPurpose::Move => {
                self.place(report.best_move)?;
                Ok(SearchEvent::Placed(report.best_move))
            }
            SearchPurpose::Hint => {
                self.hint = Some(report.best_move);
                Ok(SearchEvent::Hinted(report.best_move))
            }
        }
    }

    /// Take back the human's last move and everything played after it.
    ///
    /// Only allowed on the human's turn (or after the game ended) with no
    /// search running, and only if the human has a move to take back.
    pub fn undo(&mut self) -> Result<(), SessionError> {
        if self.worker.is_busy() {
            return Err(SessionError::SearchInFlight);
        }
        if self.state == GameState::Playing && self.to_move != self.human {
            return Err(SessionError::NotHumanTurn);
        }
        let human = self.human;
        let Some(last_human) = self
            .history
            .iter()
            .rposition(|entry| entry.mover == Some(human))
        else {
            return Err(SessionError::NothingToUndo);
        };

        self.history.truncate(last_human);
        let Some(top) = self.history.last() else {
            return Err(SessionError::NothingToUndo);
        };
        self.board = top.board.clone();
        self.last_move = top.mv;
        self.to_move = human;
        self.state = GameState::Playing;
        self.hint = None;
        self.refresh();
        info!("took back {}'s last move", human.name());
        Ok(())
    }

    /// Recompute counts and the legal-move cache after the board changed.
    fn refresh(&mut self) {
        self.black_count = self.board.count(Stone::Black);
        self.white_count = self.board.count(Stone::White);
        self.legal = if self.is_over() {
            Vec::new()
        } else {
            legal_moves(&self.board, self.to_move)
        };
        let size = self.board.size();
        self.legal_flags = vec![false; size * size];
        for &(x, y) in &self.legal {
            self.legal_flags[x * size + y] = true;
        }
    }
}
