//! Background search worker.
//!
//! At most one search runs at a time, on its own thread. The board is moved
//! into the thread as a private copy, and the result comes back through a
//! single-shot channel. Starting a new search joins the previous thread
//! first; there is no cancellation.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::board::{Board, Stone};
use crate::error::SearchError;
use crate::mcts::{Mcts, SearchReport};

/// Why a search was started.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchPurpose {
    /// Play the result on the board.
    Move,
    /// Only suggest the result to the human.
    Hint,
}

/// A finished search as delivered by the worker.
#[derive(Debug)]
pub struct Completed {
    pub purpose: SearchPurpose,
    pub to_move: Stone,
    pub result: Result<SearchReport, SearchError>,
}

struct InFlight {
    purpose: SearchPurpose,
    to_move: Stone,
    handle: JoinHandle<()>,
    receiver: Receiver<Completed>,
}

#[derive(Default)]
pub struct SearchWorker {
    in_flight: Option<InFlight>,
}

impl SearchWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a search has been started and its result not yet collected.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Purpose of the search in flight, if any.
    pub fn purpose(&self) -> Option<SearchPurpose> {
        self.in_flight.as_ref().map(|f| f.purpose)
    }

    /// Start searching `board` for `to_move` on a new thread.
    ///
    /// Any previous search is waited for first; its result, if not yet
    /// collected, is returned so the caller can still apply it.
    pub fn start(
        &mut self,
        mut mcts: Mcts,
        board: Board,
        to_move: Stone,
        purpose: SearchPurpose,
    ) -> Option<Completed> {
        let previous = self.wait();

        let (sender, receiver) = mpsc::sync_channel(1);
        let handle = thread::spawn(move || {
            let result = mcts.search(&board, to_move);
            // The receiver is gone only if the worker was dropped mid-search.
            let _ = sender.send(Completed {
                purpose,
                to_move,
                result,
            });
        });
        debug!("started {purpose:?} search for {}", to_move.name());

        self.in_flight = Some(InFlight {
            purpose,
            to_move,
            handle,
            receiver,
        });
        previous
    }

    /// Collect the result if the search has finished, without blocking.
    pub fn poll(&mut self) -> Option<Completed> {
        let flight = self.in_flight.as_ref()?;
        match flight.receiver.try_recv() {
            Ok(done) => {
                self.finish();
                Some(done)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.panicked()),
        }
    }

    /// Block until the search in flight finishes and return its result.
    /// Returns `None` when nothing is running.
    pub fn wait(&mut self) -> Option<Completed> {
        let flight = self.in_flight.as_ref()?;
        match flight.receiver.recv() {
            Ok(done) => {
                self.finish();
                Some(done)
            }
            Err(_) => Some(self.panicked()),
        }
    }

    fn finish(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            if flight.handle.join().is_err() {
                warn!("search thread panicked after reporting its result");
            }
        }
    }

    fn panicked(&mut self) -> Completed {
        let flight = self.in_flight.take();
        let (purpose, to_move) = flight
            .as_ref()
            .map(|f| (f.purpose, f.to_move))
            .unwrap_or((SearchPurpose::Move, Stone::Empty));
        if let Some(flight) = flight {
            let _ = flight.handle.join();
        }
        warn!("search thread exited without a result");
        Completed {
            purpose,
            to_move,
            result: Err(SearchError::WorkerPanicked),
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            let _ = flight.handle.join();
        }
    }
}
