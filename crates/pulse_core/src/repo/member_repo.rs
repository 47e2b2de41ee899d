//! Team member repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `TeamMember::validate()` runs before every SQL mutation.
//! - Listing is ordered by name, then uuid, for stable rendering.
//! - Removing a member cascades out of notification groups via FK.

use crate::model::member::{MemberId, TeamMember};
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    role,
    contract_hours,
    base_hours,
    exclude_from_primes,
    objectives_assigned,
    objectives_completed
FROM team_members";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[(
    "team_members",
    &[
        "uuid",
        "name",
        "email",
        "role",
        "contract_hours",
        "base_hours",
        "exclude_from_primes",
    ],
)];

/// Query options for listing team members.
#[derive(Debug, Clone, Default)]
pub struct MemberListQuery {
    /// Case-insensitive substring match on name or role.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for team member CRUD operations.
pub trait MemberRepository {
    fn create_member(&mut self, member: &TeamMember) -> RepoResult<MemberId>;
    fn update_member(&mut self, member: &TeamMember) -> RepoResult<()>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<TeamMember>>;
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<TeamMember>>;
    fn set_exclude_from_primes(&mut self, id: MemberId, exclude: bool) -> RepoResult<()>;
    fn delete_member(&mut self, id: MemberId) -> RepoResult<()>;
}

/// SQLite-backed team member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&mut self, member: &TeamMember) -> RepoResult<MemberId> {
        member.validate()?;

        self.conn.execute(
            "INSERT INTO team_members (
                uuid,
                name,
                email,
                role,
                contract_hours,
                base_hours,
                exclude_from_primes,
                objectives_assigned,
                objectives_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                member.id.to_string(),
                member.name.as_str(),
                member.email.as_str(),
                member.role.as_str(),
                member.contract_hours,
                member.base_hours,
                bool_to_int(member.exclude_from_primes),
                member.objectives_assigned,
                member.objectives_completed,
            ],
        )?;

        Ok(member.id)
    }

    fn update_member(&mut self, member: &TeamMember) -> RepoResult<()> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE team_members
             SET
                name = ?1,
                email = ?2,
                role = ?3,
                contract_hours = ?4,
                base_hours = ?5,
                exclude_from_primes = ?6,
                objectives_assigned = ?7,
                objectives_completed = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?9;",
            params![
                member.name.as_str(),
                member.email.as_str(),
                member.role.as_str(),
                member.contract_hours,
                member.base_hours,
                bool_to_int(member.exclude_from_primes),
                member.objectives_assigned,
                member.objectives_completed,
                member.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(member.id));
        }

        Ok(())
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<TeamMember>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<TeamMember>> {
        let mut sql = format!("{MEMBER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref() {
            sql.push_str(
                " AND (name LIKE '%' || ? || '%' COLLATE NOCASE
                    OR role LIKE '%' || ? || '%' COLLATE NOCASE)",
            );
            bind_values.push(Value::Text(search.to_string()));
            bind_values.push(Value::Text(search.to_string()));
        }

        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, uuid ASC");

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
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        Ok(members)
    }

    fn set_exclude_from_primes(&mut self, id: MemberId, exclude: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE team_members
             SET
                exclude_from_primes = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(exclude), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_member(&mut self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM team_members WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<TeamMember> {
    let uuid_text: String = row.get("uuid")?;
    Ok(TeamMember {
        id: parse_uuid(&uuid_text, "team_members.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role: row.get("role")?,
        contract_hours: row.get("contract_hours")?,
        base_hours: row.get("base_hours")?,
        exclude_from_primes: int_to_bool(
            row.get("exclude_from_primes")?,
            "team_members.exclude_from_primes",
        )?,
        objectives_assigned: row.get("objectives_assigned")?,
        objectives_completed: row.get("objectives_completed")?,
    })
}
