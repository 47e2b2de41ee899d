//! Bonus ("prime") calculator.
//!
//! # Responsibility
//! - Pure bonus math: pool totals, pro-rata shares, tier unlocking,
//!   budget simulation, sensor alert filtering.
//! - No I/O, no clock reads, no global state; every input is a parameter.
//!
//! # Invariants
//! - Money stays in integer euro cents; rounding is half-up, done once per
//!   share.
//! - A zero hour base is a typed error, never a division by zero.
//! - Members excluded from primes receive no share but stay counted.

use crate::model::alert::{AlertStatus, FridgeAlert};
use crate::model::member::{MemberId, TeamMember};
use crate::model::objective::{Objective, ObjectiveId, Palier};
use crate::model::settings::{ObjectiveConfig, PilotageSettings};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reference full-time week used for the simulator's comparison figure.
pub const FULL_TIME_REFERENCE_HOURS: u32 = 35;

/// Readings this far outside the bounds stay a warning before turning
/// critical.
pub const WARNING_TOLERANCE_DEG: f64 = 0.5;

pub type CalcResult<T> = Result<T, PrimeCalcError>;

/// Calculator error for bonus math boundary cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimeCalcError {
    /// The reference hour base is zero; the ratio is undefined.
    InvalidBaseHours,
}

impl Display for PrimeCalcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseHours => {
                write!(f, "base hours must be > 0 for pro-rata computation")
            }
        }
    }
}

impl Error for PrimeCalcError {}

/// Sums the maximum reward across ALL objectives, active or not.
///
/// The original dashboard includes inactive objectives in this figure; the
/// behavior is kept and `active_potential_prime` exists for callers that
/// want the filtered number. An empty slice legitimately totals 0.
pub fn total_potential_prime(objectives: &[Objective]) -> i64 {
    objectives.iter().map(|obj| obj.reward_cents).sum()
}

/// Sums the maximum reward across active objectives only.
pub fn active_potential_prime(objectives: &[Objective]) -> i64 {
    objectives
        .iter()
        .filter(|obj| obj.is_active)
        .map(|obj| obj.reward_cents)
        .sum()
}

/// Pro-rata share of a bonus pool for one contract.
///
/// Returns `round_half_up(base_prime_cents * contract_hours / base_hours)`.
/// Zero contract hours yield zero; a zero base is rejected.
pub fn pro_rata_prime(
    base_prime_cents: i64,
    contract_hours: u32,
    base_hours: u32,
) -> CalcResult<i64> {
    if base_hours == 0 {
        return Err(PrimeCalcError::InvalidBaseHours);
    }
    Ok(scale_rounded(
        base_prime_cents,
        i64::from(contract_hours),
        i64::from(base_hours),
    ))
}

/// Recomputes `unlocked` for every tier from the live progress value.
///
/// Storage flags never win: a tier is unlocked exactly when
/// `progress >= threshold`.
pub fn derive_unlocked_tiers(progress: f64, paliers: &[Palier]) -> Vec<Palier> {
    paliers
        .iter()
        .map(|palier| {
            let mut tier = palier.clone();
            tier.unlocked = progress >= tier.threshold;
            tier
        })
        .collect()
}

/// Re-derives unlock flags on the objective in place.
pub fn derive_objective_unlocks(objective: &mut Objective) {
    for palier in &mut objective.paliers {
        palier.unlocked = objective.progress >= palier.threshold;
    }
}

/// First tier in array order that is still locked, `None` when all are
/// unlocked. Assumes tiers are stored ascending by threshold, which
/// `Objective::validate` enforces.
pub fn next_palier(objective: &Objective) -> Option<&Palier> {
    objective.paliers.iter().find(|palier| !palier.unlocked)
}

/// One member's computed share of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberShare {
    pub member_id: MemberId,
    pub name: String,
    pub contract_hours: u32,
    pub base_hours: u32,
    pub amount_cents: i64,
}

/// Pool distribution across a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDistribution {
    /// Everyone on the roster, including excluded members.
    pub members_total: usize,
    /// Members who actually receive a share.
    pub eligible_total: usize,
    pub shares: Vec<MemberShare>,
    /// Sum of all share amounts.
    pub total_cents: i64,
}

/// Distributes a pool across members, each at their own hour base.
///
/// Members flagged `exclude_from_primes` are counted in `members_total`
/// but receive no share.
pub fn team_distribution(
    base_prime_cents: i64,
    members: &[TeamMember],
) -> CalcResult<TeamDistribution> {
    let mut shares = Vec::new();
    let mut total_cents: i64 = 0;

    for member in members {
        if member.exclude_from_primes {
            continue;
        }
        let amount_cents =
            pro_rata_prime(base_prime_cents, member.contract_hours, member.base_hours)?;
        total_cents += amount_cents;
        shares.push(MemberShare {
            member_id: member.id,
            name: member.name.clone(),
            contract_hours: member.contract_hours,
            base_hours: member.base_hours,
            amount_cents,
        });
    }

    Ok(TeamDistribution {
        members_total: members.len(),
        eligible_total: shares.len(),
        shares,
        total_cents,
    })
}

/// Cost of one objective in a simulation: the sum of its tier rewards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveCost {
    pub objective_id: ObjectiveId,
    pub title: String,
    pub cost_cents: i64,
}

/// Result of a budget simulation over the steering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetSimulation {
    pub objective_costs: Vec<ObjectiveCost>,
    /// Pool per fully-achieving person before the multiplier.
    pub total_cost_cents: i64,
    /// Pool after the global multiplier.
    pub scaled_cost_cents: i64,
    /// Every eligible member at maximum achievement, pro-rata.
    pub team_total_cents: i64,
    /// Comparison figure for a 35h contract.
    pub full_time_reference_cents: i64,
    /// `budget_max - team_total`; negative when over budget.
    pub budget_delta_cents: i64,
    pub over_budget: bool,
}

/// Simulates the worst-case bonus cost of a tier configuration.
///
/// Mirrors the steering screen: every palier of every objective is assumed
/// reached, the pool is scaled by the global multiplier, then distributed
/// pro-rata over the roster at the settings' shared hour base.
pub fn simulate_budget(
    settings: &PilotageSettings,
    members: &[TeamMember],
    budget_max_cents: i64,
) -> CalcResult<BudgetSimulation> {
    if settings.base_hours == 0 {
        return Err(PrimeCalcError::InvalidBaseHours);
    }

    let objective_costs: Vec<ObjectiveCost> = settings
        .objectives
        .iter()
        .map(|config| ObjectiveCost {
            objective_id: config.id,
            title: config.title.clone(),
            cost_cents: config_cost(config),
        })
        .collect();
    let total_cost_cents: i64 = objective_costs.iter().map(|cost| cost.cost_cents).sum();
    let scaled_cost_cents = scale_rounded(
        total_cost_cents,
        i64::from(settings.global_multiplier_percent),
        100,
    );

    let mut team_total_cents: i64 = 0;
    for member in members {
        if member.exclude_from_primes {
            continue;
        }
        team_total_cents +=
            pro_rata_prime(scaled_cost_cents, member.contract_hours, settings.base_hours)?;
    }

    let full_time_reference_cents = pro_rata_prime(
        scaled_cost_cents,
        FULL_TIME_REFERENCE_HOURS,
        settings.base_hours,
    )?;

    Ok(BudgetSimulation {
        objective_costs,
        total_cost_cents,
        scaled_cost_cents,
        team_total_cents,
        full_time_reference_cents,
        budget_delta_cents: budget_max_cents - team_total_cents,
        over_budget: team_total_cents > budget_max_cents,
    })
}

/// Keeps alerts whose status demands attention (warning or critical).
pub fn critical_alerts(alerts: &[FridgeAlert]) -> Vec<&FridgeAlert> {
    alerts
        .iter()
        .filter(|alert| {
            matches!(alert.status, AlertStatus::Warning | AlertStatus::Critical)
        })
        .collect()
}

/// Classifies a temperature reading against the unit's bounds.
///
/// Within bounds (inclusive) is normal; up to `WARNING_TOLERANCE_DEG`
/// outside is a warning; beyond that is critical.
pub fn classify_temperature(current: f64, min_temp: f64, max_temp: f64) -> AlertStatus {
    if current >= min_temp && current <= max_temp {
        return AlertStatus::Normal;
    }
    let overshoot = if current > max_temp {
        current - max_temp
    } else {
        min_temp - current
    };
    if overshoot <= WARNING_TOLERANCE_DEG {
        AlertStatus::Warning
    } else {
        AlertStatus::Critical
    }
}

fn config_cost(config: &ObjectiveConfig) -> i64 {
    config.paliers.iter().map(|palier| palier.reward_cents).sum()
}

/// `round_half_up(amount * numerator / denominator)` on integers.
///
/// Uses an i128 intermediate so the widest realistic pools cannot
/// overflow; `div_euclid` keeps half-up semantics for any sign of
/// `amount`.
fn scale_rounded(amount: i64, numerator: i64, denominator: i64) -> i64 {
    debug_assert!(denominator > 0);
    let scaled = 2 * i128::from(amount) * i128::from(numerator) + i128::from(denominator);
    let rounded = scaled.div_euclid(2 * i128::from(denominator));
    rounded as i64
}
