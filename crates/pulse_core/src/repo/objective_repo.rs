//! Objective repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist objectives together with their palier rows.
//! - Keep palier replacement atomic with the parent write.
//!
//! # Invariants
//! - `Objective::validate()` runs before every SQL mutation.
//! - Paliers are stored and returned in ascending level order.
//! - Archiving flips `is_active`; objective rows are never hard-deleted.

use crate::model::objective::{Objective, ObjectiveId, ObjectiveKind, Palier};
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

const OBJECTIVE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    kind,
    progress,
    target,
    unit,
    reward_cents,
    is_active,
    deadline
FROM objectives";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "objectives",
        &[
            "uuid",
            "kind",
            "progress",
            "target",
            "unit",
            "reward_cents",
            "is_active",
        ],
    ),
    (
        "paliers",
        &["uuid", "objective_uuid", "level", "threshold", "reward_cents", "unlocked"],
    ),
];

/// Query options for listing objectives.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveListQuery {
    pub kind: Option<ObjectiveKind>,
    /// Archived (`is_active = 0`) rows are hidden unless requested.
    pub include_archived: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for objective CRUD operations.
pub trait ObjectiveRepository {
    fn create_objective(&mut self, objective: &Objective) -> RepoResult<ObjectiveId>;
    fn update_objective(&mut self, objective: &Objective) -> RepoResult<()>;
    fn get_objective(
        &self,
        id: ObjectiveId,
        include_archived: bool,
    ) -> RepoResult<Option<Objective>>;
    fn list_objectives(&self, query: &ObjectiveListQuery) -> RepoResult<Vec<Objective>>;
    fn set_progress(&mut self, id: ObjectiveId, progress: f64) -> RepoResult<()>;
    fn archive_objective(&mut self, id: ObjectiveId) -> RepoResult<()>;
}

/// SQLite-backed objective repository.
pub struct SqliteObjectiveRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteObjectiveRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl ObjectiveRepository for SqliteObjectiveRepository<'_> {
    fn create_objective(&mut self, objective: &Objective) -> RepoResult<ObjectiveId> {
        objective.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO objectives (
                uuid,
                title,
                description,
                kind,
                progress,
                target,
                unit,
                reward_cents,
                is_active,
                deadline
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                objective.id.to_string(),
                objective.title.as_str(),
                objective.description.as_str(),
                kind_to_db(objective.kind),
                objective.progress,
                objective.target,
                objective.unit.as_str(),
                objective.reward_cents,
                bool_to_int(objective.is_active),
                objective.deadline_epoch_ms,
            ],
        )?;
        insert_paliers(&tx, objective)?;
        tx.commit()?;

        Ok(objective.id)
    }

    fn update_objective(&mut self, objective: &Objective) -> RepoResult<()> {
        objective.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE objectives
             SET
                title = ?1,
                description = ?2,
                kind = ?3,
                progress = ?4,
                target = ?5,
                unit = ?6,
                reward_cents = ?7,
                is_active = ?8,
                deadline = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                objective.title.as_str(),
                objective.description.as_str(),
                kind_to_db(objective.kind),
                objective.progress,
                objective.target,
                objective.unit.as_str(),
                objective.reward_cents,
                bool_to_int(objective.is_active),
                objective.deadline_epoch_ms,
                objective.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(objective.id));
        }

        tx.execute(
            "DELETE FROM paliers WHERE objective_uuid = ?1;",
            [objective.id.to_string()],
        )?;
        insert_paliers(&tx, objective)?;
        tx.commit()?;

        Ok(())
    }

    fn get_objective(
        &self,
        id: ObjectiveId,
        include_archived: bool,
    ) -> RepoResult<Option<Objective>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OBJECTIVE_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_active = 1);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_archived)])?;
        if let Some(row) = rows.next()? {
            let mut objective = parse_objective_row(row)?;
            objective.paliers = load_paliers(self.conn, objective.id)?;
            return Ok(Some(objective));
        }

        Ok(None)
    }

    fn list_objectives(&self, query: &ObjectiveListQuery) -> RepoResult<Vec<Objective>> {
        let mut sql = format!("{OBJECTIVE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_archived {
            sql.push_str(" AND is_active = 1");
        }

        if let Some(kind) = query.kind {
            sql.push_str(" AND kind = ?");
            bind_values.push(Value::Text(kind_to_db(kind).to_string()));
        }

        // Principal objective first, then most recently touched.
        sql.push_str(
            " ORDER BY CASE kind WHEN 'principal' THEN 0 ELSE 1 END ASC,
                       updated_at DESC,
                       uuid ASC",
        );

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut objectives = Vec::new();
        while let Some(row) = rows.next()? {
            objectives.push(parse_objective_row(row)?);
        }

        for objective in &mut objectives {
            objective.paliers = load_paliers(self.conn, objective.id)?;
        }

        Ok(objectives)
    }

    fn set_progress(&mut self, id: ObjectiveId, progress: f64) -> RepoResult<()> {
        if progress < 0.0 {
            return Err(crate::model::ValidationError::NegativeProgress(progress).into());
        }

        let changed = self.conn.execute(
            "UPDATE objectives
             SET
                progress = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![progress, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn archive_objective(&mut self, id: ObjectiveId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE objectives
             SET
                is_active = 0,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn insert_paliers(tx: &rusqlite::Transaction<'_>, objective: &Objective) -> RepoResult<()> {
    for palier in &objective.paliers {
        tx.execute(
            "INSERT INTO paliers (
                uuid,
                objective_uuid,
                level,
                name,
                description,
                threshold,
                reward_cents,
                unlocked
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                palier.id.to_string(),
                objective.id.to_string(),
                palier.level,
                palier.name.as_str(),
                palier.description.as_str(),
                palier.threshold,
                palier.reward_cents,
                bool_to_int(palier.unlocked),
            ],
        )?;
    }
    Ok(())
}

fn load_paliers(conn: &Connection, objective_id: ObjectiveId) -> RepoResult<Vec<Palier>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, level, name, description, threshold, reward_cents, unlocked
         FROM paliers
         WHERE objective_uuid = ?1
         ORDER BY level ASC;",
    )?;
    let mut rows = stmt.query([objective_id.to_string()])?;
    let mut paliers = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        paliers.push(Palier {
            id: parse_uuid(&uuid_text, "paliers.uuid")?,
            level: row.get("level")?,
            name: row.get("name")?,
            description: row.get("description")?,
            threshold: row.get("threshold")?,
            reward_cents: row.get("reward_cents")?,
            unlocked: int_to_bool(row.get("unlocked")?, "paliers.unlocked")?,
        });
    }
    Ok(paliers)
}

fn parse_objective_row(row: &Row<'_>) -> RepoResult<Objective> {
    let uuid_text: String = row.get("uuid")?;
    let kind_text: String = row.get("kind")?;
    let kind = parse_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid objective kind `{kind_text}` in objectives.kind"))
    })?;

    Ok(Objective {
        id: parse_uuid(&uuid_text, "objectives.uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        kind,
        progress: row.get("progress")?,
        target: row.get("target")?,
        unit: row.get("unit")?,
        paliers: Vec::new(),
        reward_cents: row.get("reward_cents")?,
        is_active: int_to_bool(row.get("is_active")?, "objectives.is_active")?,
        deadline_epoch_ms: row.get("deadline")?,
    })
}

fn kind_to_db(kind: ObjectiveKind) -> &'static str {
    match kind {
        ObjectiveKind::Principal => "principal",
        ObjectiveKind::Secondary => "secondary",
    }
}

fn parse_kind(value: &str) -> Option<ObjectiveKind> {
    match value {
        "principal" => Some(ObjectiveKind::Principal),
        "secondary" => Some(ObjectiveKind::Secondary),
        _ => None,
    }
}
