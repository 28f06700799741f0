use crate::input::Seed;
use crate::state::SeedState;
use thiserror::Error;

/// Raised when code tries to move a seed along an edge the state machine does not have
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition for seed {position}: {from} -> {to}")]
pub struct TransitionError {
    pub position: usize,
    pub from: SeedState,
    pub to: SeedState,
}

/// Tracks the lifecycle of a single seed
///
/// A `SeedRun` is owned by the orchestrator for exactly one seed and is never
/// shared, so transitions are plain mutations.
#[derive(Debug, Clone)]
pub struct SeedRun {
    position: usize,
    url: String,
    state: SeedState,
}

impl SeedRun {
    /// Creates a tracker in the `Init` state
    pub fn new(seed: &Seed) -> Self {
        Self {
            position: seed.position,
            url: seed.url.clone(),
            state: SeedState::Init,
        }
    }

    /// Returns the current state
    pub fn state(&self) -> SeedState {
        self.state
    }

    /// Moves the seed to `next`, rejecting edges the state machine does not allow
    pub fn advance(&mut self, next: SeedState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next) {
            return Err(TransitionError {
                position: self.position,
                from: self.state,
                to: next,
            });
        }

        tracing::debug!(
            position = self.position,
            url = %self.url,
            "Seed state {} -> {}",
            self.state,
            next
        );
        self.state = next;
        Ok(())
    }

    /// Marks the seed as failed from whatever phase it reached
    ///
    /// Returns the state the seed was in when it failed. A seed that already
    /// reached a terminal state keeps it.
    pub fn fail(&mut self) -> SeedState {
        let reached = self.state;
        if self.state.can_transition_to(SeedState::Failed) {
            self.state = SeedState::Failed;
        }
        reached
    }
}
