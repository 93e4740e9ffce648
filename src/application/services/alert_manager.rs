use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::entities::alert::{Alert, DeliveryChannels};
use crate::domain::entities::breach::{Breach, MetricKind, Scope};

/// Cooldown and delivery configuration the manager is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    pub cooldown_seconds: u64,
    pub channels: DeliveryChannels,
}

/// Cooldown clock of one `(metric, scope)` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    pub last_fired_at: Option<DateTime<Utc>>,
    pub cooldown_seconds: u64,
}

impl AlertState {
    const fn new(cooldown_seconds: u64) -> Self {
        Self {
            last_fired_at: None,
            cooldown_seconds,
        }
    }

    /// An instant earlier than the last firing counts as inside the window.
    fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.last_fired_at.is_none_or(|last| {
            let elapsed = now.signed_duration_since(last).num_seconds();
            u64::try_from(elapsed).is_ok_and(|secs| secs >= self.cooldown_seconds)
        })
    }
}

/// Turns breaches into alerts, at most one per key per cooldown window.
/// Keys are independent: firing one never touches another's clock.
pub struct AlertManager {
    policy: AlertPolicy,
    states: HashMap<(MetricKind, Scope), AlertState>,
}

impl AlertManager {
    #[must_use]
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            policy,
            states: HashMap::new(),
        }
    }

    /// Decide whether `breach` fires. The breach timestamp is the clock.
    /// A fired alert stamps the key immediately, whatever happens to its
    /// delivery afterwards.
    pub fn handle(&mut self, breach: &Breach) -> Option<Alert> {
        let now = breach.timestamp;
        let cooldown = self.policy.cooldown_seconds;
        let state = self
            .states
            .entry(breach.key())
            .or_insert_with(|| AlertState::new(cooldown));

        if !state.is_ready(now) {
            tracing::debug!(
                "Alert suppressed by cooldown: {} {}",
                breach.metric_kind,
                breach.scope
            );
            return None;
        }

        state.last_fired_at = Some(now);
        Some(Alert::new(breach.clone(), self.policy.channels))
    }

    /// Handle a whole tick worth of breaches, in order.
    pub fn handle_all(&mut self, breaches: &[Breach]) -> Vec<Alert> {
        breaches.iter().filter_map(|b| self.handle(b)).collect()
    }

    #[must_use]
    pub fn state(&self, metric_kind: MetricKind, scope: &Scope) -> Option<&AlertState> {
        self.states.get(&(metric_kind, scope.clone()))
    }

    /// Number of keys seen so far.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.states.len()
    }
}
