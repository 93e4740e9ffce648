use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::breach::Breach;
use crate::domain::value_objects::log_level::LogLevel;

/// Delivery channels an alert should additionally go out on.
/// Gated by configuration only, never by cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryChannels {
    pub sound: bool,
    pub email: bool,
}

/// An alert that passed the cooldown gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub fired_at: DateTime<Utc>,
    pub breach: Breach,
    pub message: String,
    pub channels: DeliveryChannels,
}

impl Alert {
    #[must_use]
    pub fn new(breach: Breach, channels: DeliveryChannels) -> Self {
        Self {
            fired_at: breach.timestamp,
            message: breach.describe(),
            breach,
            channels,
        }
    }

    /// Level the alert is written to sinks with.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.breach.severity.log_level()
    }
}
