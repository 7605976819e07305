//! Session controller
//!
//! Owns the per-session bookkeeping: at most one non-terminal turn per
//! session, cancellation, and idle-session pruning. Each turn runs on its
//! own tokio task and reports through a [`TurnHandle`].

use crate::use_cases::run_turn::{GENERIC_FAILURE_MESSAGE, RunTurnInput, RunTurnUseCase, TurnControl};
use chrono::{Duration as ChronoDuration, Utc};
use futures::future::join_all;
use planner_domain::{
    ConversationTurn, DomainError, ErrorKind, Session, SharedLifecycle, TurnEvent, TurnRequest,
    TurnStatus,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session {0} already has an active turn")]
    Busy(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("Turn task aborted: {0}")]
    TurnAborted(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Busy(_) => ErrorKind::SessionBusy,
            SessionError::InvalidRequest(e) => e.kind(),
            SessionError::TurnAborted(_) => ErrorKind::SynthesisFailure,
        }
    }
}

struct ActiveTurn {
    turn_id: String,
    lifecycle: SharedLifecycle,
    cancel: CancellationToken,
}

struct SessionSlot {
    session: Session,
    active: Option<ActiveTurn>,
}

impl SessionSlot {
    fn has_running_turn(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| !a.lifecycle.status().is_terminal())
    }
}

/// Caller's view of a running turn
pub struct TurnHandle {
    turn_id: String,
    session_id: String,
    events: mpsc::Receiver<TurnEvent>,
    lifecycle: SharedLifecycle,
    task: JoinHandle<ConversationTurn>,
    finished: bool,
}

impl TurnHandle {
    pub fn turn_id(&self) -> &str {
        &self.turn_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn status(&self) -> TurnStatus {
        self.lifecycle.status()
    }

    /// Next event of the turn, `None` after the terminal one.
    ///
    /// Once the turn has been cancelled nothing else is delivered: the
    /// next call yields a single `Cancelled`.
    pub async fn next_event(&mut self) -> Option<TurnEvent> {
        if self.finished {
            return None;
        }
        if self.lifecycle.status() == TurnStatus::Cancelled {
            self.finished = true;
            return Some(TurnEvent::Cancelled);
        }

        let event = self.events.recv().await;

        if self.lifecycle.status() == TurnStatus::Cancelled {
            self.finished = true;
            return Some(TurnEvent::Cancelled);
        }
        match event {
            Some(event) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Some(event)
            }
            None => {
                // The task ended without a terminal event, i.e. it panicked
                self.finished = true;
                Some(TurnEvent::Failed {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Wait for the turn task and return the finished turn.
    ///
    /// Undelivered events are discarded so a task blocked on a full
    /// channel can finish.
    pub async fn outcome(self) -> Result<ConversationTurn, SessionError> {
        let TurnHandle { events, task, .. } = self;
        drop(events);
        task.await
            .map_err(|e| SessionError::TurnAborted(e.to_string()))
    }
}

/// Entry point for callers: begin, cancel and end turns per session
pub struct SessionController {
    run_turn: RunTurnUseCase,
    sessions: Mutex<HashMap<String, SessionSlot>>,
    turn_counter: AtomicU64,
}

impl SessionController {
    pub fn new(run_turn: RunTurnUseCase) -> Self {
        Self {
            run_turn,
            sessions: Mutex::new(HashMap::new()),
            turn_counter: AtomicU64::new(0),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionSlot>> {
        // Every update is completed under the lock, so a poisoned map is
        // still consistent.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_turn_id(&self, session_id: &str) -> String {
        let n = self.turn_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-turn-{}", session_id, n)
    }

    /// Start a turn on its own task.
    ///
    /// Fails with [`SessionError::Busy`] while the session has a
    /// non-terminal turn; the new turn is then never created.
    pub fn begin_turn(&self, request: TurnRequest) -> Result<TurnHandle, SessionError> {
        request.constraints.validate()?;
        let session_id = request.session_id.clone();

        let mut sessions = self.sessions();
        let slot = sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionSlot {
                session: Session::new(session_id.clone()),
                active: None,
            });
        if slot.has_running_turn() {
            warn!("Rejected new turn: session {} is busy", session_id);
            return Err(SessionError::Busy(session_id));
        }
        if let Some(previous) = slot.active.take() {
            slot.session.finish_turn(&previous.turn_id);
        }

        let turn_id = self.next_turn_id(&session_id);
        let (tx, rx) = mpsc::channel(self.run_turn.params().event_buffer.max(1));
        let control = TurnControl::new(tx);
        let lifecycle = control.lifecycle.clone();

        slot.session.start_turn(turn_id.clone());
        slot.active = Some(ActiveTurn {
            turn_id: turn_id.clone(),
            lifecycle: lifecycle.clone(),
            cancel: control.cancel.clone(),
        });
        drop(sessions);

        info!("Session {}: beginning turn {}", session_id, turn_id);
        let run_turn = self.run_turn.clone();
        let input = RunTurnInput::new(turn_id.clone(), request);
        let task = tokio::spawn(async move { run_turn.execute(input, control).await });

        Ok(TurnHandle {
            turn_id,
            session_id,
            events: rx,
            lifecycle,
            task,
            finished: false,
        })
    }

    /// Cancel the session's active turn.
    ///
    /// Returns `true` only when this call moved a non-terminal turn to
    /// `cancelled`; repeated calls return `false`.
    pub fn cancel(&self, session_id: &str) -> bool {
        let sessions = self.sessions();
        let Some(active) = sessions.get(session_id).and_then(|s| s.active.as_ref()) else {
            return false;
        };
        let cancelled = active.lifecycle.cancel();
        if cancelled {
            active.cancel.cancel();
            info!("Session {}: cancelled turn {}", session_id, active.turn_id);
        }
        cancelled
    }

    /// Release the session slot held by `handle`, cancelling the turn if it
    /// is still running.
    pub fn end_turn(&self, handle: &TurnHandle) {
        let mut sessions = self.sessions();
        let Some(slot) = sessions.get_mut(&handle.session_id) else {
            return;
        };
        let Some(active) = slot.active.take_if(|a| a.turn_id == handle.turn_id) else {
            return;
        };
        if active.lifecycle.cancel() {
            active.cancel.cancel();
            debug!("Turn {} ended while still running", active.turn_id);
        }
        slot.session.finish_turn(&active.turn_id);
        slot.session.touch();
    }

    /// Status of the session's most recent turn, if any
    pub fn active_status(&self, session_id: &str) -> Option<TurnStatus> {
        self.sessions()
            .get(session_id)
            .and_then(|s| s.active.as_ref())
            .map(|a| a.lifecycle.status())
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    /// Forget sessions idle for longer than `max_idle` and drop their
    /// stored history. Sessions with a running turn are kept.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let Some(cutoff) = ChronoDuration::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };

        let pruned: Vec<String> = {
            let mut sessions = self.sessions();
            let idle: Vec<String> = sessions
                .iter()
                .filter(|(_, slot)| {
                    !slot.has_running_turn() && slot.session.last_activity_at() < cutoff
                })
                .map(|(id, _)| id.clone())
                .collect();
            for id in &idle {
                sessions.remove(id);
            }
            idle
        };

        if pruned.is_empty() {
            return 0;
        }

        let history = self.run_turn.history();
        let outcomes = join_all(pruned.iter().map(|id| history.forget_session(id))).await;
        for (id, outcome) in pruned.iter().zip(outcomes) {
            if let Err(e) = outcome {
                warn!("Failed to drop history for session {}: {}", id, e);
            }
        }
        info!("Pruned {} idle session(s)", pruned.len());
        pruned.len()
    }
}
