//! Control-center use-case service for cold-storage monitoring.
//!
//! # Responsibility
//! - Register monitored units and ingest temperature readings.
//! - Surface the alerts that demand attention.
//!
//! # Invariants
//! - Every stored reading carries a status re-derived from the unit's
//!   bounds; readings never trust a caller-supplied status.
//! - Out-of-bounds readings append a history event.

use crate::model::alert::{
    AlertEvent, AlertEventId, AlertId, AlertSeverity, AlertStatus, FridgeAlert,
};
use crate::prime::{classify_temperature, critical_alerts};
use crate::repo::alert_repo::AlertRepository;
use crate::repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for control-center use-cases.
#[derive(Debug)]
pub enum ControlServiceError {
    AlertNotFound(AlertId),
    Repo(RepoError),
}

impl Display for ControlServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlertNotFound(id) => write!(f, "fridge alert not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControlServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::AlertNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ControlServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::AlertNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ControlServiceResult<T> = Result<T, ControlServiceError>;

/// Use-case service wrapper for the control center.
pub struct ControlService<R: AlertRepository> {
    repo: R,
}

impl<R: AlertRepository> ControlService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a monitored unit; its status is derived from the initial
    /// reading before storage.
    pub fn register_unit(&mut self, alert: &FridgeAlert) -> ControlServiceResult<AlertId> {
        let mut unit = alert.clone();
        unit.status = classify_temperature(unit.current_temp, unit.min_temp, unit.max_temp);
        Ok(self.repo.create_alert(&unit)?)
    }

    /// Ingests a temperature reading and returns its classification.
    ///
    /// Warning and critical readings append an unacknowledged history
    /// event.
    pub fn record_reading(
        &mut self,
        id: AlertId,
        temp: f64,
        timestamp_epoch_ms: i64,
    ) -> ControlServiceResult<AlertStatus> {
        let unit = self
            .repo
            .get_alert(id)?
            .ok_or(ControlServiceError::AlertNotFound(id))?;

        let status = classify_temperature(temp, unit.min_temp, unit.max_temp);
        self.repo.update_reading(id, temp, status, timestamp_epoch_ms)?;

        let severity = match status {
            AlertStatus::Normal => None,
            AlertStatus::Warning => Some(AlertSeverity::Warning),
            AlertStatus::Critical => Some(AlertSeverity::Critical),
        };
        if let Some(severity) = severity {
            warn!(
                "event=fridge_reading module=control status={} unit={} temp={temp}",
                match severity {
                    AlertSeverity::Warning => "warning",
                    AlertSeverity::Critical => "critical",
                },
                unit.fridge_name
            );
            let event = AlertEvent {
                id: Uuid::new_v4(),
                severity,
                temp,
                timestamp_epoch_ms,
                acknowledged: false,
            };
            self.repo.append_event(id, &event)?;
        }

        Ok(status)
    }

    /// Every monitored unit with its history.
    pub fn list_units(&self) -> ControlServiceResult<Vec<FridgeAlert>> {
        Ok(self.repo.list_alerts()?)
    }

    /// Units currently in warning or critical state.
    pub fn attention_list(&self) -> ControlServiceResult<Vec<FridgeAlert>> {
        let alerts = self.repo.list_alerts()?;
        Ok(critical_alerts(&alerts).into_iter().cloned().collect())
    }

    /// Marks one history event as acknowledged.
    pub fn acknowledge(&mut self, event_id: AlertEventId) -> ControlServiceResult<()> {
        Ok(self.repo.acknowledge_event(event_id)?)
    }
}
