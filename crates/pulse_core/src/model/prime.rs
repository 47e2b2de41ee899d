//! Paid bonus ("prime") domain model and lifecycle.
//!
//! # Responsibility
//! - Define monthly bonus statements with per-objective breakdown lines.
//! - Enforce the Pending -> Validated -> Paid state machine.
//!
//! # Invariants
//! - `month` is a `YYYY-MM` key; one prime per month.
//! - `amount_cents` equals the sum of breakdown line amounts.
//! - Status only ever moves forward; skips and rollbacks are rejected.

use super::objective::ObjectiveId;
use super::{require_non_empty, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a prime statement.
pub type PrimeId = Uuid;

static MONTH_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid month key regex"));

/// Checks a `YYYY-MM` month key.
pub fn is_valid_month_key(value: &str) -> bool {
    MONTH_KEY_RE.is_match(value)
}

/// Prime payment lifecycle.
///
/// Created pending at month start, validated on the 5th of the following
/// month, paid on the 15th. The core enforces the order, not the calendar;
/// transition timestamps are caller-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimeStatus {
    Pending,
    Validated,
    Paid,
}

impl PrimeStatus {
    /// Returns whether `next` is a legal forward transition from `self`.
    pub fn can_transition_to(self, next: PrimeStatus) -> bool {
        matches!(
            (self, next),
            (PrimeStatus::Pending, PrimeStatus::Validated)
                | (PrimeStatus::Validated, PrimeStatus::Paid)
        )
    }
}

/// One per-objective line of a prime breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeLine {
    pub objective_id: ObjectiveId,
    /// Title snapshot taken when the line was written; survives renames.
    pub objective_title: String,
    pub amount_cents: i64,
}

/// Monthly bonus statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prime {
    pub id: PrimeId,
    /// `YYYY-MM` month key, unique per statement.
    pub month: String,
    pub amount_cents: i64,
    pub status: PrimeStatus,
    pub breakdown: Vec<PrimeLine>,
}

impl Prime {
    /// Creates an empty pending statement for the given month.
    pub fn pending(month: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            month: month.into(),
            amount_cents: 0,
            status: PrimeStatus::Pending,
            breakdown: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        if !is_valid_month_key(&self.month) {
            return Err(ValidationError::InvalidMonthKey(self.month.clone()));
        }
        if self.amount_cents < 0 {
            return Err(ValidationError::NegativeAmount {
                cents: self.amount_cents,
            });
        }

        let mut line_sum: i64 = 0;
        for line in &self.breakdown {
            if line.objective_id.is_nil() {
                return Err(ValidationError::NilUuid);
            }
            require_non_empty(&line.objective_title, "breakdown.objective_title")?;
            if line.amount_cents < 0 {
                return Err(ValidationError::NegativeAmount {
                    cents: line.amount_cents,
                });
            }
            line_sum += line.amount_cents;
        }

        if !self.breakdown.is_empty() && line_sum != self.amount_cents {
            return Err(ValidationError::AmountMismatch {
                header_cents: self.amount_cents,
                line_sum_cents: line_sum,
            });
        }

        Ok(())
    }
}
