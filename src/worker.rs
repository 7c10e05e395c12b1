//! Message boundary around the engine
//!
//! The engine runs on its own thread so that a long search never blocks the
//! caller's loop. Requests go in over one channel and responses come back
//! over another, exactly one response per request and in request order.
//! A UI polls with [`EngineWorker::try_recv`]; a command-line caller simply
//! blocks on [`EngineWorker::recv`].

use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::board::{Board, Side};
use crate::config::EngineConfig;
use crate::engine::{Engine, MoveResult};
use crate::error::EngineError;
use crate::eval::Outcome;

/// Message to the engine thread.
#[derive(Debug, Clone)]
pub enum Request {
    /// Choose a move for `side` on `board`
    SelectMove { board: Board, side: Side },
    /// A game finished; `outcome` is from the engine's side
    GameOver { board: Board, outcome: Outcome },
    /// Stop the thread. No response is sent.
    Shutdown,
}

/// Message from the engine thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Move(Result<MoveResult, EngineError>),
    WeightsUpdated,
}

/// Handle to an engine running on a dedicated thread.
///
/// Dropping the handle shuts the thread down and joins it.
#[derive(Debug)]
pub struct EngineWorker {
    sender: Sender<Request>,
    receiver: Receiver<Response>,
    handle: Option<JoinHandle<()>>,
}

impl EngineWorker {
    /// Build an engine from `config` and move it onto a new thread.
    pub fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::from_engine(Engine::with_config(config)?))
    }

    /// Move an existing engine onto a new thread.
    pub fn from_engine(mut engine: Engine) -> Self {
        let (req_tx, req_rx) = channel::<Request>();
        let (resp_tx, resp_rx) = channel::<Response>();

        let handle = thread::spawn(move || {
            log::debug!("engine worker started");
            for request in req_rx {
                let response = match request {
                    Request::SelectMove { board, side } => Response::Move(engine.select_move(&board, side)),
                    Request::GameOver { board, outcome } => {
                        engine.on_game_end(&board, outcome);
                        Response::WeightsUpdated
                    }
                    Request::Shutdown => break,
                };
                if resp_tx.send(response).is_err() {
                    break;
                }
            }
            log::debug!("engine worker stopped");
        });

        Self {
            sender: req_tx,
            receiver: resp_rx,
            handle: Some(handle),
        }
    }

    /// Queue a request.
    pub fn send(&self, request: Request) -> Result<(), EngineError> {
        self.sender
            .send(request)
            .map_err(|_| EngineError::WorkerDisconnected)
    }

    pub fn request_move(&self, board: &Board, side: Side) -> Result<(), EngineError> {
        self.send(Request::SelectMove {
            board: board.clone(),
            side,
        })
    }

    pub fn report_game_over(&self, board: &Board, outcome: Outcome) -> Result<(), EngineError> {
        self.send(Request::GameOver {
            board: board.clone(),
            outcome,
        })
    }

    /// Next response if one is ready.
    pub fn try_recv(&self) -> Result<Option<Response>, EngineError> {
        match self.receiver.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EngineError::WorkerDisconnected),
        }
    }

    /// Block until the next response arrives.
    pub fn recv(&self) -> Result<Response, EngineError> {
        self.receiver.recv().map_err(|_| EngineError::WorkerDisconnected)
    }

    /// Request a move and wait for it.
    ///
    /// Only meaningful when no other response is pending.
    pub fn select_move(&self, board: &Board, side: Side) -> Result<MoveResult, EngineError> {
        self.request_move(board, side)?;
        loop {
            match self.recv()? {
                Response::Move(result) => return result,
                Response::WeightsUpdated => log::debug!("skipping stale weights acknowledgement"),
            }
        }
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.sender.send(Request::Shutdown);
            if handle.join().is_err() {
                log::warn!("engine worker panicked");
            }
        }
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
