//! Internal messaging and notification group model.
//!
//! # Invariants
//! - A `Scheduled` message carries its schedule timestamp, a `Sent` message
//!   its sent timestamp.
//! - Sending or scheduling requires at least one delivery channel; drafts
//!   may stay channel-less.
//! - Group and member audiences are non-empty id lists.

use super::member::MemberId;
use super::{require_non_empty, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a notification group.
pub type GroupId = Uuid;

/// Stable identifier for a broadcast message.
pub type MessageId = Uuid;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Named recipient set reusable across broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationGroup {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub member_ids: Vec<MemberId>,
    /// `#RRGGBB` badge color.
    pub color: String,
    pub created_at_epoch_ms: i64,
}

impl NotificationGroup {
    pub fn new(name: impl Into<String>, color: impl Into<String>, created_at_epoch_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            member_ids: Vec::new(),
            color: color.into(),
            created_at_epoch_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.name, "name")?;
        if !HEX_COLOR_RE.is_match(&self.color) {
            return Err(ValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

/// Delivery channel for a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Push,
}

/// Message lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Draft,
    Scheduled,
    Sent,
}

/// Recipient selection for a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum Audience {
    /// Every team member.
    All,
    /// Union of the listed groups' members.
    Groups(Vec<GroupId>),
    /// Explicit member list.
    Members(Vec<MemberId>),
}

/// One broadcast to a team audience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub title: String,
    pub content: String,
    pub audience: Audience,
    pub status: MessageStatus,
    pub channels: Vec<Channel>,
    pub sent_at_epoch_ms: Option<i64>,
    pub scheduled_for_epoch_ms: Option<i64>,
}

impl Message {
    /// Creates a channel-less draft addressed to everyone.
    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            audience: Audience::All,
            status: MessageStatus::Draft,
            channels: Vec::new(),
            sent_at_epoch_ms: None,
            scheduled_for_epoch_ms: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.content, "content")?;

        match &self.audience {
            Audience::All => {}
            Audience::Groups(ids) | Audience::Members(ids) => {
                if ids.is_empty() {
                    return Err(ValidationError::EmptyAudience);
                }
                if ids.iter().any(Uuid::is_nil) {
                    return Err(ValidationError::NilUuid);
                }
            }
        }

        match self.status {
            MessageStatus::Draft => {}
            MessageStatus::Scheduled => {
                if self.channels.is_empty() {
                    return Err(ValidationError::NoChannels);
                }
                if self.scheduled_for_epoch_ms.is_none() {
                    return Err(ValidationError::MissingSchedule);
                }
            }
            MessageStatus::Sent => {
                if self.channels.is_empty() {
                    return Err(ValidationError::NoChannels);
                }
                if self.sent_at_epoch_ms.is_none() {
                    return Err(ValidationError::MissingSentTimestamp);
                }
            }
        }

        Ok(())
    }
}
