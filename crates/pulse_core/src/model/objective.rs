//! Objective and palier domain model.
//!
//! # Responsibility
//! - Define tracked targets and their unlockable bonus tiers.
//! - Validate tier ordering and reward coherence before persistence.
//!
//! # Invariants
//! - `progress` and `target` share the same `unit`; `target > 0`.
//! - Paliers are strictly ascending by threshold in array order.
//! - `reward_cents` equals the sum of palier rewards.
//! - `unlocked` flags are a derived projection of progress, never an input.

use super::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an objective.
pub type ObjectiveId = Uuid;

/// Stable identifier for a palier (bonus tier).
pub type PalierId = Uuid;

/// Objective weight in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// The single headline objective (monthly revenue in the original data).
    Principal,
    /// Supporting objectives shown below the main gauge.
    Secondary,
}

/// One unlockable bonus tier of an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palier {
    pub id: PalierId,
    /// 1-based rank inside the objective, ascending with `threshold`.
    pub level: u32,
    pub name: String,
    pub description: String,
    /// Progress value at which this tier unlocks, in the objective's unit.
    pub threshold: f64,
    /// Bonus granted when the tier unlocks, in euro cents.
    pub reward_cents: i64,
    /// Derived from progress on read paths; persisted only for display parity.
    pub unlocked: bool,
}

impl Palier {
    pub fn new(level: u32, name: impl Into<String>, threshold: f64, reward_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            name: name.into(),
            description: String::new(),
            threshold,
            reward_cents,
            unlocked: false,
        }
    }
}

/// A tracked numeric target tied to bonus tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    pub title: String,
    pub description: String,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: ObjectiveKind,
    /// Current progress in `unit`. Shares the unit with `target`.
    pub progress: f64,
    /// Goal value in `unit`. Strictly positive.
    pub target: f64,
    /// Display unit, e.g. `€`, `clients`, `%`.
    pub unit: String,
    pub paliers: Vec<Palier>,
    /// Total maximum bonus, in euro cents. Equals the sum of palier rewards.
    pub reward_cents: i64,
    pub is_active: bool,
    /// Optional deadline in unix epoch milliseconds.
    pub deadline_epoch_ms: Option<i64>,
}

impl Objective {
    /// Creates an objective with a generated stable id and no tiers.
    pub fn new(kind: ObjectiveKind, title: impl Into<String>, target: f64, unit: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            kind,
            progress: 0.0,
            target,
            unit: unit.into(),
            paliers: Vec::new(),
            reward_cents: 0,
            is_active: true,
            deadline_epoch_ms: None,
        }
    }

    /// Recomputes the header reward from the palier rewards.
    ///
    /// Intended for callers migrating legacy rows where the header figure
    /// drifted from the tier sum.
    pub fn reconcile_reward(&mut self) {
        self.reward_cents = self.paliers.iter().map(|p| p.reward_cents).sum();
    }

    /// Deactivates the objective without deleting its history.
    pub fn archive(&mut self) {
        self.is_active = false;
    }

    /// Checks all objective invariants.
    ///
    /// # Errors
    /// - `ZeroTarget` when `target <= 0`.
    /// - `NegativeProgress` when progress is below zero.
    /// - `UnsortedPaliers` / `DuplicatePalierLevel` on tier ordering issues.
    /// - `RewardMismatch` when the header reward differs from the tier sum.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.unit, "unit")?;
        if self.target <= 0.0 {
            return Err(ValidationError::ZeroTarget);
        }
        if self.progress < 0.0 {
            return Err(ValidationError::NegativeProgress(self.progress));
        }
        if self.reward_cents < 0 {
            return Err(ValidationError::NegativeAmount {
                cents: self.reward_cents,
            });
        }

        let mut seen_levels = Vec::with_capacity(self.paliers.len());
        let mut last_threshold = f64::NEG_INFINITY;
        let mut palier_sum: i64 = 0;
        for palier in &self.paliers {
            if palier.id.is_nil() {
                return Err(ValidationError::NilUuid);
            }
            require_non_empty(&palier.name, "palier.name")?;
            if palier.reward_cents < 0 {
                return Err(ValidationError::NegativeAmount {
                    cents: palier.reward_cents,
                });
            }
            if seen_levels.contains(&palier.level) {
                return Err(ValidationError::DuplicatePalierLevel {
                    level: palier.level,
                });
            }
            seen_levels.push(palier.level);
            if palier.threshold <= last_threshold {
                return Err(ValidationError::UnsortedPaliers {
                    level: palier.level,
                });
            }
            last_threshold = palier.threshold;
            palier_sum += palier.reward_cents;
        }

        if !self.paliers.is_empty() && palier_sum != self.reward_cents {
            return Err(ValidationError::RewardMismatch {
                header_cents: self.reward_cents,
                palier_sum_cents: palier_sum,
            });
        }

        Ok(())
    }
}
