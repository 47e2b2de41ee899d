//! Cold-storage sensor alert model.
//!
//! The fridge monitor lives alongside the bonus dashboard in the original
//! product; its records are colocated here the same way.
//!
//! # Invariants
//! - `min_temp < max_temp`.
//! - `status` is derived from the current reading against the bounds.

use super::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a monitored fridge.
pub type AlertId = Uuid;

/// Stable identifier for one history event.
pub type AlertEventId = Uuid;

/// Current reading classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Normal,
    Warning,
    Critical,
}

/// Severity of a recorded out-of-bounds event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// One out-of-bounds reading kept in the alert history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: AlertEventId,
    pub severity: AlertSeverity,
    pub temp: f64,
    pub timestamp_epoch_ms: i64,
    pub acknowledged: bool,
}

/// A monitored cold-storage unit with its event history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FridgeAlert {
    pub id: AlertId,
    pub fridge_name: String,
    pub location: String,
    pub current_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub status: AlertStatus,
    pub last_update_epoch_ms: i64,
    pub history: Vec<AlertEvent>,
}

impl FridgeAlert {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.fridge_name, "fridge_name")?;
        require_non_empty(&self.location, "location")?;
        if self.min_temp >= self.max_temp {
            return Err(ValidationError::InvalidTemperatureBounds {
                min: self.min_temp,
                max: self.max_temp,
            });
        }
        Ok(())
    }
}
