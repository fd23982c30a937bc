//! First-come, first-served mutual exclusion.

use crate::error::{LxqError, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// A mutex that admits waiters strictly in arrival order.
///
/// Each caller of [`FifoGate::enter`] takes a ticket and joins the queue; the
/// gate opens for the ticket at the front once the current holder's
/// [`GatePass`] is dropped. A waiter that times out leaves the queue without
/// disturbing the order of the others.
pub struct FifoGate {
    state: Mutex<GateState>,
    turn: Condvar,
    timeout: Option<Duration>,
}

#[derive(Default)]
struct GateState {
    held: bool,
    queue: VecDeque<u64>,
    next_ticket: u64,
}

impl FifoGate {
    /// Creates a gate; `timeout` bounds how long `enter` waits.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            turn: Condvar::new(),
            timeout,
        }
    }

    /// Blocks until it is this caller's turn.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorTimeout` if the configured timeout elapses first.
    pub fn enter(&self) -> Result<GatePass<'_>> {
        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);

        let mut state = self.state.lock();
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.queue.push_back(ticket);

        while state.held || state.queue.front() != Some(&ticket) {
            match deadline {
                Some(deadline) => {
                    let timed_out = self.turn.wait_until(&mut state, deadline).timed_out();
                    if timed_out && !self.is_turn(&state, ticket) {
                        state.queue.retain(|t| *t != ticket);
                        // the next waiter may now be at the front
                        self.turn.notify_all();
                        return Err(LxqError::CoordinatorTimeout {
                            waited_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                }
                None => self.turn.wait(&mut state),
            }
        }

        state.queue.pop_front();
        state.held = true;

        let waited = started.elapsed();
        if waited > Duration::from_millis(100) {
            debug!(ticket, waited_ms = waited.as_millis() as u64, "gate entered after wait");
        }

        Ok(GatePass { gate: self })
    }

    /// Number of callers waiting behind the current holder.
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Returns true while some caller holds the gate.
    pub fn is_held(&self) -> bool {
        self.state.lock().held
    }

    fn is_turn(&self, state: &GateState, ticket: u64) -> bool {
        !state.held && state.queue.front() == Some(&ticket)
    }

    fn leave(&self) {
        let mut state = self.state.lock();
        state.held = false;
        drop(state);
        self.turn.notify_all();
    }
}

/// Proof of holding a [`FifoGate`]; releases it on drop.
pub struct GatePass<'a> {
    gate: &'a FifoGate,
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}
