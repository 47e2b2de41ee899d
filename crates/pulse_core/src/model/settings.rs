//! Pilotage (steering) settings used by the budget simulator.
//!
//! A value-object snapshot of the objective catalogue without progress
//! state, plus the two scalar knobs the simulator needs. Built from live
//! objectives rather than persisted separately.

use super::objective::{Objective, ObjectiveId, ObjectiveKind, PalierId};
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Tier snapshot for simulation: identity, threshold, adjustable reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalierConfig {
    pub id: PalierId,
    pub name: String,
    pub threshold: f64,
    pub reward_cents: i64,
}

/// Objective snapshot for simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    pub id: ObjectiveId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ObjectiveKind,
    pub is_active: bool,
    pub target: f64,
    pub unit: String,
    pub paliers: Vec<PalierConfig>,
}

/// Steering knobs for the bonus budget simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotageSettings {
    /// Reference hour base applied to every member during simulation.
    pub base_hours: u32,
    /// Percentage scaling applied to the simulated pool; 100 = neutral.
    pub global_multiplier_percent: u32,
    pub objectives: Vec<ObjectiveConfig>,
}

impl PilotageSettings {
    /// Snapshots live objectives into simulation configs.
    pub fn from_objectives(
        base_hours: u32,
        global_multiplier_percent: u32,
        objectives: &[Objective],
    ) -> Self {
        let configs = objectives
            .iter()
            .map(|obj| ObjectiveConfig {
                id: obj.id,
                title: obj.title.clone(),
                kind: obj.kind,
                is_active: obj.is_active,
                target: obj.target,
                unit: obj.unit.clone(),
                paliers: obj
                    .paliers
                    .iter()
                    .map(|p| PalierConfig {
                        id: p.id,
                        name: p.name.clone(),
                        threshold: p.threshold,
                        reward_cents: p.reward_cents,
                    })
                    .collect(),
            })
            .collect();

        Self {
            base_hours,
            global_multiplier_percent,
            objectives: configs,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_hours == 0 {
            return Err(ValidationError::ZeroBaseHours);
        }
        for config in &self.objectives {
            for palier in &config.paliers {
                if palier.reward_cents < 0 {
                    return Err(ValidationError::NegativeAmount {
                        cents: palier.reward_cents,
                    });
                }
            }
        }
        Ok(())
    }
}
