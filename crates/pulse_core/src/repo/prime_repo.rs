//! Prime (bonus statement) repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `Prime::validate()` runs before every SQL mutation.
//! - Breakdown lines are replaced atomically with their statement.
//! - Status updates enforce the Pending -> Validated -> Paid order inside
//!   one immediate transaction.

use crate::model::prime::{Prime, PrimeId, PrimeLine, PrimeStatus};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const PRIME_SELECT_SQL: &str = "SELECT uuid, month, amount_cents, status FROM primes";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("primes", &["uuid", "month", "amount_cents", "status"]),
    (
        "prime_lines",
        &["prime_uuid", "objective_uuid", "objective_title", "amount_cents"],
    ),
];

/// Repository interface for prime statements.
pub trait PrimeRepository {
    fn create_prime(&mut self, prime: &Prime) -> RepoResult<PrimeId>;
    /// Replaces the header amount and all breakdown lines.
    fn update_prime(&mut self, prime: &Prime) -> RepoResult<()>;
    fn get_prime(&self, id: PrimeId) -> RepoResult<Option<Prime>>;
    fn get_prime_by_month(&self, month: &str) -> RepoResult<Option<Prime>>;
    fn list_primes(&self, status: Option<PrimeStatus>) -> RepoResult<Vec<Prime>>;
    /// Moves the statement forward in its lifecycle.
    fn update_status(&mut self, id: PrimeId, next: PrimeStatus) -> RepoResult<()>;
    /// Sum of all `paid` statement amounts.
    fn paid_total_cents(&self) -> RepoResult<i64>;
}

/// SQLite-backed prime repository.
pub struct SqlitePrimeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqlitePrimeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl PrimeRepository for SqlitePrimeRepository<'_> {
    fn create_prime(&mut self, prime: &Prime) -> RepoResult<PrimeId> {
        prime.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO primes (uuid, month, amount_cents, status)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                prime.id.to_string(),
                prime.month.as_str(),
                prime.amount_cents,
                status_to_db(prime.status),
            ],
        )?;
        insert_lines(&tx, prime)?;
        tx.commit()?;

        Ok(prime.id)
    }

    fn update_prime(&mut self, prime: &Prime) -> RepoResult<()> {
        prime.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE primes
             SET
                month = ?1,
                amount_cents = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![prime.month.as_str(), prime.amount_cents, prime.id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(prime.id));
        }

        tx.execute(
            "DELETE FROM prime_lines WHERE prime_uuid = ?1;",
            [prime.id.to_string()],
        )?;
        insert_lines(&tx, prime)?;
        tx.commit()?;

        Ok(())
    }

    fn get_prime(&self, id: PrimeId) -> RepoResult<Option<Prime>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRIME_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut prime = parse_prime_row(row)?;
            prime.breakdown = load_lines(self.conn, prime.id)?;
            return Ok(Some(prime));
        }
        Ok(None)
    }

    fn get_prime_by_month(&self, month: &str) -> RepoResult<Option<Prime>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRIME_SELECT_SQL} WHERE month = ?1;"))?;
        let mut rows = stmt.query([month])?;
        if let Some(row) = rows.next()? {
            let mut prime = parse_prime_row(row)?;
            prime.breakdown = load_lines(self.conn, prime.id)?;
            return Ok(Some(prime));
        }
        Ok(None)
    }

    fn list_primes(&self, status: Option<PrimeStatus>) -> RepoResult<Vec<Prime>> {
        // Month keys are YYYY-MM, so lexicographic DESC is newest first.
        let mut sql = format!("{PRIME_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            bind_values.push(rusqlite::types::Value::Text(
                status_to_db(status).to_string(),
            ));
        }
        sql.push_str(" ORDER BY month DESC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind_values))?;
        let mut primes = Vec::new();
        while let Some(row) = rows.next()? {
            primes.push(parse_prime_row(row)?);
        }
        for prime in &mut primes {
            prime.breakdown = load_lines(self.conn, prime.id)?;
        }

        Ok(primes)
    }

    fn update_status(&mut self, id: PrimeId, next: PrimeStatus) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<String> = tx
            .query_row(
                "SELECT status FROM primes WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current_text) = current else {
            return Err(RepoError::NotFound(id));
        };
        let current = parse_status(&current_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid prime status `{current_text}` in primes.status"
            ))
        })?;

        if !current.can_transition_to(next) {
            return Err(RepoError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        tx.execute(
            "UPDATE primes
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![status_to_db(next), id.to_string()],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn paid_total_cents(&self) -> RepoResult<i64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM primes WHERE status = 'paid';",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}

fn insert_lines(tx: &Transaction<'_>, prime: &Prime) -> RepoResult<()> {
    for line in &prime.breakdown {
        tx.execute(
            "INSERT INTO prime_lines (prime_uuid, objective_uuid, objective_title, amount_cents)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                prime.id.to_string(),
                line.objective_id.to_string(),
                line.objective_title.as_str(),
                line.amount_cents,
            ],
        )?;
    }
    Ok(())
}

fn load_lines(conn: &Connection, prime_id: PrimeId) -> RepoResult<Vec<PrimeLine>> {
    let mut stmt = conn.prepare(
        "SELECT objective_uuid, objective_title, amount_cents
         FROM prime_lines
         WHERE prime_uuid = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([prime_id.to_string()])?;
    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        let objective_text: String = row.get("objective_uuid")?;
        lines.push(PrimeLine {
            objective_id: parse_uuid(&objective_text, "prime_lines.objective_uuid")?,
            objective_title: row.get("objective_title")?,
            amount_cents: row.get("amount_cents")?,
        });
    }
    Ok(lines)
}

fn parse_prime_row(row: &Row<'_>) -> RepoResult<Prime> {
    let uuid_text: String = row.get("uuid")?;
    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid prime status `{status_text}` in primes.status"))
    })?;

    Ok(Prime {
        id: parse_uuid(&uuid_text, "primes.uuid")?,
        month: row.get("month")?,
        amount_cents: row.get("amount_cents")?,
        status,
        breakdown: Vec::new(),
    })
}

fn status_to_db(status: PrimeStatus) -> &'static str {
    match status {
        PrimeStatus::Pending => "pending",
        PrimeStatus::Validated => "validated",
        PrimeStatus::Paid => "paid",
    }
}

fn parse_status(value: &str) -> Option<PrimeStatus> {
    match value {
        "pending" => Some(PrimeStatus::Pending),
        "validated" => Some(PrimeStatus::Validated),
        "paid" => Some(PrimeStatus::Paid),
        _ => None,
    }
}
