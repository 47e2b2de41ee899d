use pulse_core::db::open_db_in_memory;
use pulse_core::model::message::{GroupId, MessageStatus, NotificationGroup};
use pulse_core::model::ValidationError;
use pulse_core::repo::message_repo::{MessageRepository, SqliteMessageRepository};
use pulse_core::service::message_service::{
    BroadcastRequest, MessageService, MessageServiceError,
};
use pulse_core::{
    Audience, Channel, MemberRepository, RepoError, SqliteMemberRepository, TeamMember,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_members(conn: &mut Connection, count: usize) -> Vec<TeamMember> {
    let mut repo = SqliteMemberRepository::try_new(conn).unwrap();
    (0..count)
        .map(|index| {
            let member = TeamMember::new(
                format!("Member {index}"),
                format!("member{index}@pulse.test"),
                "Commercial",
                35,
                35,
            );
            repo.create_member(&member).unwrap();
            member
        })
        .collect()
}

fn group_of(name: &str, members: &[TeamMember]) -> NotificationGroup {
    let mut group = NotificationGroup::new(name, "#D10FA8", 1_700_000_000_000);
    group.member_ids = members.iter().map(|m| m.id).collect();
    group
}

#[test]
fn group_roundtrip_and_membership_replacement() {
    let mut conn = open_db_in_memory().unwrap();
    let members = seed_members(&mut conn, 3);
    let mut repo = SqliteMessageRepository::try_new(&mut conn).unwrap();

    let mut group = group_of("Equipe Commerciale", &members[..2]);
    repo.create_group(&group).unwrap();

    let loaded = repo.get_group(group.id).unwrap().unwrap();
    assert_eq!(loaded.name, "Equipe Commerciale");
    assert_eq!(loaded.member_ids.len(), 2);

    group.member_ids = vec![members[2].id];
    repo.update_group(&group).unwrap();
    let reloaded = repo.get_group(group.id).unwrap().unwrap();
    assert_eq!(reloaded.member_ids, vec![members[2].id]);
}

#[test]
fn group_validation_rejects_bad_color() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteMessageRepository::try_new(&mut conn).unwrap();

    let mut group = NotificationGroup::new("Managers", "magenta", 1_700_000_000_000);
    group.member_ids = vec![Uuid::new_v4()];
    let err = repo.create_group(&group).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidColor(_))
    ));
}

#[test]
fn deleting_member_cascades_out_of_groups() {
    let mut conn = open_db_in_memory().unwrap();
    let members = seed_members(&mut conn, 2);

    {
        let mut repo = SqliteMessageRepository::try_new(&mut conn).unwrap();
        repo.create_group(&group_of("Equipe Logistique", &members))
            .unwrap();
    }

    {
        let mut member_repo = SqliteMemberRepository::try_new(&mut conn).unwrap();
        member_repo.delete_member(members[0].id).unwrap();
    }

    let repo = SqliteMessageRepository::try_new(&mut conn).unwrap();
    let groups = repo.list_groups().unwrap();
    assert_eq!(groups[0].member_ids, vec![members[1].id]);
}

#[test]
fn message_validation_enforces_channel_and_schedule_rules() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMessageRepository::try_new(&mut conn).unwrap();
    let mut service = MessageService::new(repo);

    // Drafts may stay channel-less.
    let draft = service
        .save_draft(BroadcastRequest {
            title: "Objectifs Janvier".to_string(),
            content: "Les nouveaux objectifs sont disponibles.".to_string(),
            audience: Audience::All,
            channels: Vec::new(),
        })
        .unwrap();
    assert_eq!(draft.status, MessageStatus::Draft);

    // Scheduling without a channel is rejected.
    let err = service
        .schedule_message(
            BroadcastRequest {
                title: "Rappel réunion".to_string(),
                content: "Réunion demain à 10h.".to_string(),
                audience: Audience::All,
                channels: Vec::new(),
            },
            1_770_000_000_000,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        MessageServiceError::Repo(RepoError::Validation(ValidationError::NoChannels))
    ));

    // An empty group audience is rejected.
    let err = service
        .send_message(
            BroadcastRequest {
                title: "Primes Décembre".to_string(),
                content: "Les primes ont été validées.".to_string(),
                audience: Audience::Groups(Vec::new()),
                channels: vec![Channel::Email],
            },
            1_770_000_000_000,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        MessageServiceError::Repo(RepoError::Validation(ValidationError::EmptyAudience))
    ));
}

#[test]
fn send_and_dispatch_set_lifecycle_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMessageRepository::try_new(&mut conn).unwrap();
    let mut service = MessageService::new(repo);

    let sent = service
        .send_message(
            BroadcastRequest {
                title: "Primes Décembre".to_string(),
                content: "Versées le 15 janvier.".to_string(),
                audience: Audience::All,
                channels: vec![Channel::Email],
            },
            1_768_000_000_000,
        )
        .unwrap();
    let loaded = service.get_message(sent.id).unwrap().unwrap();
    assert_eq!(loaded.status, MessageStatus::Sent);
    assert_eq!(loaded.sent_at_epoch_ms, Some(1_768_000_000_000));
    assert_eq!(loaded.channels, vec![Channel::Email]);

    let scheduled = service
        .schedule_message(
            BroadcastRequest {
                title: "Rappel réunion".to_string(),
                content: "Réunion demain à 10h.".to_string(),
                audience: Audience::All,
                channels: vec![Channel::Push],
            },
            1_769_000_000_000,
        )
        .unwrap();
    service.dispatch(scheduled.id, 1_769_100_000_000).unwrap();
    let dispatched = service.get_message(scheduled.id).unwrap().unwrap();
    assert_eq!(dispatched.status, MessageStatus::Sent);
    assert_eq!(dispatched.sent_at_epoch_ms, Some(1_769_100_000_000));

    // Sent is terminal for dispatch.
    let err = service.dispatch(scheduled.id, 1_769_200_000_000).unwrap_err();
    assert!(matches!(err, MessageServiceError::MessageNotFound(_)));

    let sent_only = service.list_messages(Some(MessageStatus::Sent)).unwrap();
    assert_eq!(sent_only.len(), 2);
}

#[test]
fn resolve_recipients_expands_groups_and_dedupes() {
    let mut conn = open_db_in_memory().unwrap();
    let members = seed_members(&mut conn, 4);
    let repo = SqliteMessageRepository::try_new(&mut conn).unwrap();
    let mut service = MessageService::new(repo);

    let commercial = group_of("Equipe Commerciale", &members[..3]);
    let logistics = group_of("Equipe Logistique", &members[1..]);
    service.create_group(&commercial).unwrap();
    service.create_group(&logistics).unwrap();

    let message = service
        .send_message(
            BroadcastRequest {
                title: "Objectifs Janvier".to_string(),
                content: "Consultez votre tableau de bord.".to_string(),
                audience: Audience::Groups(vec![commercial.id, logistics.id]),
                channels: vec![Channel::Email, Channel::Push],
            },
            1_768_000_000_000,
        )
        .unwrap();

    let roster: Vec<_> = members.iter().map(|m| m.id).collect();
    let recipients = service.resolve_recipients(&message, &roster).unwrap();
    // Overlapping groups cover the whole roster exactly once.
    assert_eq!(recipients.len(), 4);
    let mut expected = roster.clone();
    expected.sort();
    assert_eq!(recipients, expected);

    let missing: GroupId = Uuid::new_v4();
    let broken = service
        .send_message(
            BroadcastRequest {
                title: "Orphan".to_string(),
                content: "Groupe manquant.".to_string(),
                audience: Audience::Groups(vec![missing]),
                channels: vec![Channel::Email],
            },
            1_768_000_000_000,
        )
        .unwrap();
    let err = service.resolve_recipients(&broken, &roster).unwrap_err();
    assert!(matches!(err, MessageServiceError::GroupNotFound(id) if id == missing));
}
