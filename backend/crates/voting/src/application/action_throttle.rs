//! Action Throttle Use Case

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::entities::ActionState;
use crate::domain::repository::SessionStore;
use crate::domain::services::{Clock, evaluate_allowance};
use crate::domain::value_objects::{ActionAllowance, DenialReason, SessionId, ThrottleConfig};
use crate::error::{VotingError, VotingResult};

/// One async lock per session with a gated action in flight
type Gates = Arc<parking_lot::Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>>;

/// Per-session daily action limit with site-wide blackout weekdays
pub struct ActionThrottle<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    config: Arc<ThrottleConfig>,
    clock: Arc<dyn Clock>,
    gates: Gates,
}

/// Exclusive right to perform one gated action for a session
///
/// Requests of the same session queue behind an outstanding permit, so the
/// permission check and the recorded action cannot interleave. Dropping the
/// permit without [`ActionThrottle::complete_action`] leaves the count as is.
pub struct ActionPermit {
    session_id: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
    gates: Gates,
}

impl Drop for ActionPermit {
    fn drop(&mut self) {
        let mut gates = self.gates.lock();
        drop(self.guard.take());

        // Nobody else holds or waits on the gate once only the map refers to it
        if gates
            .get(&self.session_id)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            gates.remove(&self.session_id);
        }
    }
}

impl<S> ActionThrottle<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>, config: Arc<ThrottleConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            config,
            clock,
            gates: Gates::default(),
        }
    }

    /// Remaining actions for today and the reason, if any, they are denied
    pub async fn allowance(&self, session_id: SessionId) -> VotingResult<ActionAllowance> {
        let state = self.sessions.get_or_create(session_id).await?;
        Ok(evaluate_allowance(&state, &self.config, self.clock.today()))
    }

    /// Fail with the denial reason when the session may not act now
    pub async fn ensure_permitted(&self, session_id: SessionId) -> VotingResult<ActionAllowance> {
        let allowance = self.allowance(session_id).await?;
        match allowance.denial {
            None => Ok(allowance),
            Some(DenialReason::BlackoutDay) => Err(VotingError::BlackoutDay),
            Some(DenialReason::DailyLimitReached) => Err(VotingError::DailyLimitReached),
        }
    }

    /// Wait for the session's gate, then check the allowance under it
    pub async fn begin_action(&self, session_id: SessionId) -> VotingResult<ActionPermit> {
        let gate = {
            let mut gates = self.gates.lock();
            // Left behind by requests cancelled while waiting
            gates.retain(|_, gate| Arc::strong_count(gate) > 1);
            gates.entry(session_id).or_default().clone()
        };
        let guard = gate.lock_owned().await;

        // Built before the check so a denial still releases the gate
        let permit = ActionPermit {
            session_id,
            guard: Some(guard),
            gates: self.gates.clone(),
        };
        self.ensure_permitted(session_id).await?;

        Ok(permit)
    }

    /// Count the action the permit was granted for, then release the gate
    pub async fn complete_action(&self, permit: ActionPermit) -> VotingResult<ActionAllowance> {
        self.record_action(permit.session_id).await
    }

    /// Count one successful gated action against today's allowance
    ///
    /// Callers must only invoke this after the action itself succeeded.
    pub async fn record_action(&self, session_id: SessionId) -> VotingResult<ActionAllowance> {
        let today = self.clock.today();
        let state: ActionState = self.sessions.record_action(session_id, today).await?;
        let allowance = evaluate_allowance(&state, &self.config, today);

        tracing::debug!(
            session_id = %session_id,
            used = state.action_count_today,
            remaining = allowance.remaining,
            "Action recorded"
        );

        Ok(allowance)
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }
}
