//! Fridge alert repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Alert history is append-only; events are never rewritten, only
//!   acknowledged.
//! - History loads newest-first for the alert drawer.

use crate::model::alert::{AlertEvent, AlertEventId, AlertId, AlertSeverity, AlertStatus, FridgeAlert};
use crate::repo::{ensure_connection_ready, int_to_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ALERT_SELECT_SQL: &str = "SELECT
    uuid,
    fridge_name,
    location,
    current_temp,
    min_temp,
    max_temp,
    status,
    last_update
FROM fridge_alerts";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "fridge_alerts",
        &["uuid", "fridge_name", "current_temp", "min_temp", "max_temp", "status"],
    ),
    (
        "alert_events",
        &["uuid", "alert_uuid", "severity", "temp", "timestamp", "acknowledged"],
    ),
];

/// Repository interface for cold-storage alerts.
pub trait AlertRepository {
    /// Registers a monitored unit; history starts empty.
    fn create_alert(&mut self, alert: &FridgeAlert) -> RepoResult<AlertId>;
    fn get_alert(&self, id: AlertId) -> RepoResult<Option<FridgeAlert>>;
    fn list_alerts(&self) -> RepoResult<Vec<FridgeAlert>>;
    /// Stores a classified reading on the alert row.
    fn update_reading(
        &mut self,
        id: AlertId,
        temp: f64,
        status: AlertStatus,
        timestamp_epoch_ms: i64,
    ) -> RepoResult<()>;
    fn append_event(&mut self, alert_id: AlertId, event: &AlertEvent) -> RepoResult<AlertEventId>;
    fn acknowledge_event(&mut self, event_id: AlertEventId) -> RepoResult<()>;
}

/// SQLite-backed alert repository.
pub struct SqliteAlertRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteAlertRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl AlertRepository for SqliteAlertRepository<'_> {
    fn create_alert(&mut self, alert: &FridgeAlert) -> RepoResult<AlertId> {
        alert.validate()?;

        self.conn.execute(
            "INSERT INTO fridge_alerts (
                uuid,
                fridge_name,
                location,
                current_temp,
                min_temp,
                max_temp,
                status,
                last_update
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                alert.id.to_string(),
                alert.fridge_name.as_str(),
                alert.location.as_str(),
                alert.current_temp,
                alert.min_temp,
                alert.max_temp,
                status_to_db(alert.status),
                alert.last_update_epoch_ms,
            ],
        )?;
        Ok(alert.id)
    }

    fn get_alert(&self, id: AlertId) -> RepoResult<Option<FridgeAlert>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ALERT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut alert = parse_alert_row(row)?;
            alert.history = load_events(self.conn, alert.id)?;
            return Ok(Some(alert));
        }
        Ok(None)
    }

    fn list_alerts(&self) -> RepoResult<Vec<FridgeAlert>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ALERT_SELECT_SQL} ORDER BY fridge_name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut alerts = Vec::new();
        while let Some(row) = rows.next()? {
            alerts.push(parse_alert_row(row)?);
        }
        for alert in &mut alerts {
            alert.history = load_events(self.conn, alert.id)?;
        }
        Ok(alerts)
    }

    fn update_reading(
        &mut self,
        id: AlertId,
        temp: f64,
        status: AlertStatus,
        timestamp_epoch_ms: i64,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE fridge_alerts
             SET current_temp = ?1, status = ?2, last_update = ?3
             WHERE uuid = ?4;",
            params![temp, status_to_db(status), timestamp_epoch_ms, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn append_event(&mut self, alert_id: AlertId, event: &AlertEvent) -> RepoResult<AlertEventId> {
        self.conn.execute(
            "INSERT INTO alert_events (uuid, alert_uuid, severity, temp, timestamp, acknowledged)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                event.id.to_string(),
                alert_id.to_string(),
                severity_to_db(event.severity),
                event.temp,
                event.timestamp_epoch_ms,
                i64::from(event.acknowledged),
            ],
        )?;
        Ok(event.id)
    }

    fn acknowledge_event(&mut self, event_id: AlertEventId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE alert_events SET acknowledged = 1 WHERE uuid = ?1;",
            [event_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(event_id));
        }
        Ok(())
    }
}

fn load_events(conn: &Connection, alert_id: AlertId) -> RepoResult<Vec<AlertEvent>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, severity, temp, timestamp, acknowledged
         FROM alert_events
         WHERE alert_uuid = ?1
         ORDER BY timestamp DESC, uuid ASC;",
    )?;
    let mut rows = stmt.query([alert_id.to_string()])?;
    let mut events = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        let severity_text: String = row.get("severity")?;
        let severity = parse_severity(&severity_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid alert severity `{severity_text}` in alert_events.severity"
            ))
        })?;
        events.push(AlertEvent {
            id: parse_uuid(&uuid_text, "alert_events.uuid")?,
            severity,
            temp: row.get("temp")?,
            timestamp_epoch_ms: row.get("timestamp")?,
            acknowledged: int_to_bool(row.get("acknowledged")?, "alert_events.acknowledged")?,
        });
    }
    Ok(events)
}

fn parse_alert_row(row: &Row<'_>) -> RepoResult<FridgeAlert> {
    let uuid_text: String = row.get("uuid")?;
    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid alert status `{status_text}` in fridge_alerts.status"
        ))
    })?;

    Ok(FridgeAlert {
        id: parse_uuid(&uuid_text, "fridge_alerts.uuid")?,
        fridge_name: row.get("fridge_name")?,
        location: row.get("location")?,
        current_temp: row.get("current_temp")?,
        min_temp: row.get("min_temp")?,
        max_temp: row.get("max_temp")?,
        status,
        last_update_epoch_ms: row.get("last_update")?,
        history: Vec::new(),
    })
}

fn status_to_db(status: AlertStatus) -> &'static str {
    match status {
        AlertStatus::Normal => "normal",
        AlertStatus::Warning => "warning",
        AlertStatus::Critical => "critical",
    }
}

fn parse_status(value: &str) -> Option<AlertStatus> {
    match value {
        "normal" => Some(AlertStatus::Normal),
        "warning" => Some(AlertStatus::Warning),
        "critical" => Some(AlertStatus::Critical),
        _ => None,
    }
}

fn severity_to_db(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Warning => "warning",
        AlertSeverity::Critical => "critical",
    }
}

fn parse_severity(value: &str) -> Option<AlertSeverity> {
    match value {
        "warning" => Some(AlertSeverity::Warning),
        "critical" => Some(AlertSeverity::Critical),
        _ => None,
    }
}
