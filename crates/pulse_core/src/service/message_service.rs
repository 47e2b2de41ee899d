//! Messaging use-case service.
//!
//! # Responsibility
//! - Group management and broadcast drafting/scheduling/sending.
//! - Resolve message audiences into concrete recipient lists.
//!
//! # Invariants
//! - Drafts may stay channel-less; scheduling and sending never do.
//! - Resolved recipient lists are deduplicated and sorted.

use crate::model::member::MemberId;
use crate::model::message::{
    Audience, Channel, GroupId, Message, MessageId, MessageStatus, NotificationGroup,
};
use crate::repo::message_repo::MessageRepository;
use crate::repo::RepoError;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for messaging use-cases.
#[derive(Debug)]
pub enum MessageServiceError {
    MessageNotFound(MessageId),
    GroupNotFound(GroupId),
    Repo(RepoError),
}

impl Display for MessageServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MessageNotFound(id) => write!(f, "message not found: {id}"),
            Self::GroupNotFound(id) => write!(f, "notification group not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MessageServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MessageServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::MessageNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type MessageServiceResult<T> = Result<T, MessageServiceError>;

/// Request model for composing a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRequest {
    pub title: String,
    pub content: String,
    pub audience: Audience,
    pub channels: Vec<Channel>,
}

impl BroadcastRequest {
    fn into_message(self, status: MessageStatus) -> Message {
        let mut message = Message::draft(self.title, self.content);
        message.audience = self.audience;
        message.channels = self.channels;
        message.status = status;
        message
    }
}

/// Use-case service wrapper for groups and broadcasts.
pub struct MessageService<R: MessageRepository> {
    repo: R,
}

impl<R: MessageRepository> MessageService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_group(&mut self, group: &NotificationGroup) -> MessageServiceResult<GroupId> {
        Ok(self.repo.create_group(group)?)
    }

    pub fn update_group(&mut self, group: &NotificationGroup) -> MessageServiceResult<()> {
        self.repo.update_group(group).map_err(|err| match err {
            RepoError::NotFound(id) => MessageServiceError::GroupNotFound(id),
            other => MessageServiceError::Repo(other),
        })
    }

    pub fn delete_group(&mut self, id: GroupId) -> MessageServiceResult<()> {
        self.repo.delete_group(id).map_err(|err| match err {
            RepoError::NotFound(id) => MessageServiceError::GroupNotFound(id),
            other => MessageServiceError::Repo(other),
        })
    }

    pub fn list_groups(&self) -> MessageServiceResult<Vec<NotificationGroup>> {
        Ok(self.repo.list_groups()?)
    }

    /// Stores a draft; channels may be chosen later.
    pub fn save_draft(&mut self, request: BroadcastRequest) -> MessageServiceResult<Message> {
        let message = request.into_message(MessageStatus::Draft);
        self.repo.create_message(&message)?;
        Ok(message)
    }

    /// Stores a broadcast scheduled for a future dispatch time.
    pub fn schedule_message(
        &mut self,
        request: BroadcastRequest,
        scheduled_for_epoch_ms: i64,
    ) -> MessageServiceResult<Message> {
        let mut message = request.into_message(MessageStatus::Scheduled);
        message.scheduled_for_epoch_ms = Some(scheduled_for_epoch_ms);
        self.repo.create_message(&message)?;
        Ok(message)
    }

    /// Stores an immediately-sent broadcast.
    pub fn send_message(
        &mut self,
        request: BroadcastRequest,
        sent_at_epoch_ms: i64,
    ) -> MessageServiceResult<Message> {
        let mut message = request.into_message(MessageStatus::Sent);
        message.sent_at_epoch_ms = Some(sent_at_epoch_ms);
        self.repo.create_message(&message)?;
        Ok(message)
    }

    /// Dispatches an existing draft or scheduled broadcast.
    pub fn dispatch(
        &mut self,
        id: MessageId,
        sent_at_epoch_ms: i64,
    ) -> MessageServiceResult<()> {
        Ok(self.repo.mark_sent(id, sent_at_epoch_ms)?)
    }

    pub fn get_message(&self, id: MessageId) -> MessageServiceResult<Option<Message>> {
        Ok(self.repo.get_message(id)?)
    }

    pub fn list_messages(
        &self,
        status: Option<MessageStatus>,
    ) -> MessageServiceResult<Vec<Message>> {
        Ok(self.repo.list_messages(status)?)
    }

    /// Resolves a message audience into concrete member ids.
    ///
    /// `roster` supplies the full member list for `Audience::All`; group
    /// audiences are expanded through stored membership.
    pub fn resolve_recipients(
        &self,
        message: &Message,
        roster: &[MemberId],
    ) -> MessageServiceResult<Vec<MemberId>> {
        let mut recipients: BTreeSet<MemberId> = BTreeSet::new();

        match &message.audience {
            Audience::All => {
                recipients.extend(roster.iter().copied());
            }
            Audience::Members(ids) => {
                recipients.extend(ids.iter().copied());
            }
            Audience::Groups(group_ids) => {
                for group_id in group_ids {
                    let group = self
                        .repo
                        .get_group(*group_id)?
                        .ok_or(MessageServiceError::GroupNotFound(*group_id))?;
                    recipients.extend(group.member_ids.iter().copied());
                }
            }
        }

        Ok(recipients.into_iter().collect())
    }
}
