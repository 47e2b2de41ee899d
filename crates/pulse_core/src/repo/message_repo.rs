//! Messaging repository: notification groups and broadcasts.
//!
//! # Invariants
//! - Group membership is replaced atomically with its group row.
//! - Message audience rows are written in the same transaction as the
//!   message.
//! - `mark_sent` only moves draft/scheduled messages; sent is terminal.

use crate::model::message::{
    Audience, Channel, GroupId, Message, MessageId, MessageStatus, NotificationGroup,
};
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const MESSAGE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    audience_kind,
    status,
    channel_email,
    channel_push,
    sent_at,
    scheduled_for
FROM messages";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("notification_groups", &["uuid", "name", "color", "created_at"]),
    ("group_members", &["group_uuid", "member_uuid"]),
    (
        "messages",
        &[
            "uuid",
            "title",
            "content",
            "audience_kind",
            "status",
            "channel_email",
            "channel_push",
        ],
    ),
    ("message_audience", &["message_uuid", "target_uuid"]),
];

/// Repository interface for groups and broadcasts.
pub trait MessageRepository {
    fn create_group(&mut self, group: &NotificationGroup) -> RepoResult<GroupId>;
    /// Replaces the group row and its whole membership set.
    fn update_group(&mut self, group: &NotificationGroup) -> RepoResult<()>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<NotificationGroup>>;
    fn list_groups(&self) -> RepoResult<Vec<NotificationGroup>>;
    fn delete_group(&mut self, id: GroupId) -> RepoResult<()>;

    fn create_message(&mut self, message: &Message) -> RepoResult<MessageId>;
    fn get_message(&self, id: MessageId) -> RepoResult<Option<Message>>;
    fn list_messages(&self, status: Option<MessageStatus>) -> RepoResult<Vec<Message>>;
    fn mark_sent(&mut self, id: MessageId, sent_at_epoch_ms: i64) -> RepoResult<()>;
}

/// SQLite-backed messaging repository.
pub struct SqliteMessageRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl MessageRepository for SqliteMessageRepository<'_> {
    fn create_group(&mut self, group: &NotificationGroup) -> RepoResult<GroupId> {
        group.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notification_groups (uuid, name, description, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                group.id.to_string(),
                group.name.as_str(),
                group.description.as_str(),
                group.color.as_str(),
                group.created_at_epoch_ms,
            ],
        )?;
        insert_group_members(&tx, group)?;
        tx.commit()?;

        Ok(group.id)
    }

    fn update_group(&mut self, group: &NotificationGroup) -> RepoResult<()> {
        group.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notification_groups
             SET name = ?1, description = ?2, color = ?3
             WHERE uuid = ?4;",
            params![
                group.name.as_str(),
                group.description.as_str(),
                group.color.as_str(),
                group.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(group.id));
        }

        tx.execute(
            "DELETE FROM group_members WHERE group_uuid = ?1;",
            [group.id.to_string()],
        )?;
        insert_group_members(&tx, group)?;
        tx.commit()?;

        Ok(())
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<NotificationGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, description, color, created_at
             FROM notification_groups
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut group = parse_group_row(row)?;
            group.member_ids = load_group_members(self.conn, group.id)?;
            return Ok(Some(group));
        }
        Ok(None)
    }

    fn list_groups(&self) -> RepoResult<Vec<NotificationGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, description, color, created_at
             FROM notification_groups
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }
        for group in &mut groups {
            group.member_ids = load_group_members(self.conn, group.id)?;
        }
        Ok(groups)
    }

    fn delete_group(&mut self, id: GroupId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notification_groups WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn create_message(&mut self, message: &Message) -> RepoResult<MessageId> {
        message.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO messages (
                uuid,
                title,
                content,
                audience_kind,
                status,
                channel_email,
                channel_push,
                sent_at,
                scheduled_for
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                message.id.to_string(),
                message.title.as_str(),
                message.content.as_str(),
                audience_kind_to_db(&message.audience),
                status_to_db(message.status),
                bool_to_int(message.channels.contains(&Channel::Email)),
                bool_to_int(message.channels.contains(&Channel::Push)),
                message.sent_at_epoch_ms,
                message.scheduled_for_epoch_ms,
            ],
        )?;
        for target in audience_targets(&message.audience) {
            tx.execute(
                "INSERT OR IGNORE INTO message_audience (message_uuid, target_uuid)
                 VALUES (?1, ?2);",
                params![message.id.to_string(), target.to_string()],
            )?;
        }
        tx.commit()?;

        Ok(message.id)
    }

    fn get_message(&self, id: MessageId) -> RepoResult<Option<Message>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MESSAGE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut message = parse_message_row(row)?;
            fill_audience_targets(self.conn, &mut message)?;
            return Ok(Some(message));
        }
        Ok(None)
    }

    fn list_messages(&self, status: Option<MessageStatus>) -> RepoResult<Vec<Message>> {
        let mut sql = format!("{MESSAGE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            bind_values.push(rusqlite::types::Value::Text(
                status_to_db(status).to_string(),
            ));
        }
        sql.push_str(" ORDER BY created_at DESC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind_values))?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(parse_message_row(row)?);
        }
        for message in &mut messages {
            fill_audience_targets(self.conn, message)?;
        }
        Ok(messages)
    }

    fn mark_sent(&mut self, id: MessageId, sent_at_epoch_ms: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE messages
             SET status = 'sent', sent_at = ?1
             WHERE uuid = ?2
               AND status IN ('draft', 'scheduled');",
            params![sent_at_epoch_ms, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn insert_group_members(tx: &Transaction<'_>, group: &NotificationGroup) -> RepoResult<()> {
    for member_id in &group.member_ids {
        tx.execute(
            "INSERT OR IGNORE INTO group_members (group_uuid, member_uuid)
             VALUES (?1, ?2);",
            params![group.id.to_string(), member_id.to_string()],
        )?;
    }
    Ok(())
}

fn load_group_members(conn: &Connection, group_id: GroupId) -> RepoResult<Vec<uuid::Uuid>> {
    let mut stmt = conn.prepare(
        "SELECT member_uuid
         FROM group_members
         WHERE group_uuid = ?1
         ORDER BY member_uuid ASC;",
    )?;
    let mut rows = stmt.query([group_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "group_members.member_uuid")?);
    }
    Ok(ids)
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<NotificationGroup> {
    let uuid_text: String = row.get("uuid")?;
    Ok(NotificationGroup {
        id: parse_uuid(&uuid_text, "notification_groups.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        member_ids: Vec::new(),
        color: row.get("color")?,
        created_at_epoch_ms: row.get("created_at")?,
    })
}

fn fill_audience_targets(conn: &Connection, message: &mut Message) -> RepoResult<()> {
    let is_groups = match message.audience {
        Audience::All => return Ok(()),
        Audience::Groups(_) => true,
        Audience::Members(_) => false,
    };

    let mut stmt = conn.prepare(
        "SELECT target_uuid
         FROM message_audience
         WHERE message_uuid = ?1
         ORDER BY target_uuid ASC;",
    )?;
    let mut rows = stmt.query([message.id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "message_audience.target_uuid")?);
    }

    message.audience = if is_groups {
        Audience::Groups(ids)
    } else {
        Audience::Members(ids)
    };
    Ok(())
}

fn parse_message_row(row: &Row<'_>) -> RepoResult<Message> {
    let uuid_text: String = row.get("uuid")?;
    let kind_text: String = row.get("audience_kind")?;
    let audience = match kind_text.as_str() {
        "all" => Audience::All,
        "groups" => Audience::Groups(Vec::new()),
        "members" => Audience::Members(Vec::new()),
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid audience kind `{other}` in messages.audience_kind"
            )));
        }
    };

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid message status `{status_text}` in messages.status"
        ))
    })?;

    let mut channels = Vec::new();
    if int_to_bool(row.get("channel_email")?, "messages.channel_email")? {
        channels.push(Channel::Email);
    }
    if int_to_bool(row.get("channel_push")?, "messages.channel_push")? {
        channels.push(Channel::Push);
    }

    Ok(Message {
        id: parse_uuid(&uuid_text, "messages.uuid")?,
        title: row.get("title")?,
        content: row.get("content")?,
        audience,
        status,
        channels,
        sent_at_epoch_ms: row.get("sent_at")?,
        scheduled_for_epoch_ms: row.get("scheduled_for")?,
    })
}

fn audience_kind_to_db(audience: &Audience) -> &'static str {
    match audience {
        Audience::All => "all",
        Audience::Groups(_) => "groups",
        Audience::Members(_) => "members",
    }
}

fn audience_targets(audience: &Audience) -> &[uuid::Uuid] {
    match audience {
        Audience::All => &[],
        Audience::Groups(ids) | Audience::Members(ids) => ids,
    }
}

fn status_to_db(status: MessageStatus) -> &'static str {
    match status {
        MessageStatus::Draft => "draft",
        MessageStatus::Scheduled => "scheduled",
        MessageStatus::Sent => "sent",
    }
}

fn parse_status(value: &str) -> Option<MessageStatus> {
    match value {
        "draft" => Some(MessageStatus::Draft),
        "scheduled" => Some(MessageStatus::Scheduled),
        "sent" => Some(MessageStatus::Sent),
        _ => None,
    }
}
