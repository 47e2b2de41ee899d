//! Team member domain model.
//!
//! # Invariants
//! - `contract_hours > 0` and `base_hours > 0` at write time.
//! - Members with `exclude_from_primes` stay visible in team listings but
//!   take no part in bonus math.

use super::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a team member.
pub type MemberId = Uuid;

/// One employee tracked by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    /// Free-text role label, e.g. `Manager`, `Commercial Junior`.
    pub role: String,
    /// Weekly contracted hours. Strictly positive.
    pub contract_hours: u32,
    /// Reference hour base for pro-rata math (35 in the original data).
    pub base_hours: u32,
    /// Counted for access, excluded from all bonus computation.
    pub exclude_from_primes: bool,
    pub objectives_assigned: u32,
    pub objectives_completed: u32,
}

impl TeamMember {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        contract_hours: u32,
        base_hours: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role: role.into(),
            contract_hours,
            base_hours,
            exclude_from_primes: false,
            objectives_assigned: 0,
            objectives_completed: 0,
        }
    }

    /// Ratio of contracted hours to the reference base.
    ///
    /// Only meaningful after `validate()`; a zero base would divide by zero.
    pub fn hours_ratio(&self) -> f64 {
        f64::from(self.contract_hours) / f64::from(self.base_hours)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.name, "name")?;
        require_non_empty(&self.email, "email")?;
        require_non_empty(&self.role, "role")?;
        if self.contract_hours == 0 {
            return Err(ValidationError::ZeroContractHours);
        }
        if self.base_hours == 0 {
            return Err(ValidationError::ZeroBaseHours);
        }
        Ok(())
    }
}
