use pulse_core::db::open_db_in_memory;
use pulse_core::model::ValidationError;
use pulse_core::{
    Objective, ObjectiveKind, ObjectiveListQuery, ObjectiveRepository, ObjectiveService, Palier,
    RepoError, SqliteObjectiveRepository,
};
use rusqlite::Connection;

fn sample_objective() -> Objective {
    let mut objective =
        Objective::new(ObjectiveKind::Principal, "Chiffre d'affaires mensuel", 100_000.0, "€");
    objective.description = "Atteindre les objectifs de ventes mensuels".to_string();
    objective.progress = 75_000.0;
    objective.deadline_epoch_ms = Some(1_769_817_600_000);
    objective.paliers = vec![
        Palier::new(1, "Bronze", 50_000.0, 10_000),
        Palier::new(2, "Argent", 75_000.0, 20_000),
        Palier::new(3, "Or", 100_000.0, 30_000),
    ];
    objective.reconcile_reward();
    objective
}

#[test]
fn create_and_get_roundtrip_with_paliers() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();

    let objective = sample_objective();
    let id = repo.create_objective(&objective).unwrap();

    let loaded = repo.get_objective(id, false).unwrap().unwrap();
    assert_eq!(loaded.title, "Chiffre d'affaires mensuel");
    assert_eq!(loaded.kind, ObjectiveKind::Principal);
    assert_eq!(loaded.reward_cents, 60_000);
    assert_eq!(loaded.paliers.len(), 3);
    assert_eq!(loaded.paliers[0].name, "Bronze");
    assert_eq!(loaded.paliers[2].threshold, 100_000.0);
    assert_eq!(loaded.deadline_epoch_ms, Some(1_769_817_600_000));
}

#[test]
fn update_replaces_palier_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();

    let mut objective = sample_objective();
    repo.create_objective(&objective).unwrap();

    objective.paliers.push(Palier::new(4, "Platine", 125_000.0, 50_000));
    objective.reconcile_reward();
    repo.update_objective(&objective).unwrap();

    let loaded = repo.get_objective(objective.id, false).unwrap().unwrap();
    assert_eq!(loaded.paliers.len(), 4);
    assert_eq!(loaded.reward_cents, 110_000);
    assert_eq!(loaded.paliers[3].name, "Platine");
}

#[test]
fn update_not_found_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();

    let objective = sample_objective();
    let err = repo.update_objective(&objective).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == objective.id));
}

#[test]
fn validation_failure_blocks_create() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();

    let mut unsorted = sample_objective();
    unsorted.paliers.swap(0, 2);
    let err = repo.create_objective(&unsorted).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::UnsortedPaliers { .. })));

    let mut mismatch = sample_objective();
    mismatch.reward_cents = 1;
    let err = repo.create_objective(&mismatch).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::RewardMismatch { .. })));

    let mut zero_target = sample_objective();
    zero_target.target = 0.0;
    let err = repo.create_objective(&zero_target).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::ZeroTarget)));
}

#[test]
fn archive_hides_objective_from_default_listing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();

    let objective = sample_objective();
    repo.create_objective(&objective).unwrap();
    repo.archive_objective(objective.id).unwrap();

    assert!(repo.get_objective(objective.id, false).unwrap().is_none());
    let archived = repo.get_objective(objective.id, true).unwrap().unwrap();
    assert!(!archived.is_active);

    let visible = repo.list_objectives(&ObjectiveListQuery::default()).unwrap();
    assert!(visible.is_empty());
    let all = repo
        .list_objectives(&ObjectiveListQuery {
            include_archived: true,
            ..ObjectiveListQuery::default()
        })
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn list_orders_principal_before_secondary() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();

    let secondary = Objective::new(ObjectiveKind::Secondary, "Nouveaux clients", 15.0, "clients");
    let principal = sample_objective();
    repo.create_objective(&secondary).unwrap();
    repo.create_objective(&principal).unwrap();

    let listed = repo.list_objectives(&ObjectiveListQuery::default()).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].kind, ObjectiveKind::Principal);
    assert_eq!(listed[1].kind, ObjectiveKind::Secondary);
}

#[test]
fn set_progress_rejects_negative_values() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();

    let objective = sample_objective();
    repo.create_objective(&objective).unwrap();

    let err = repo.set_progress(objective.id, -1.0).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NegativeProgress(_))
    ));

    repo.set_progress(objective.id, 80_000.0).unwrap();
    let loaded = repo.get_objective(objective.id, false).unwrap().unwrap();
    assert_eq!(loaded.progress, 80_000.0);
}

#[test]
fn service_derives_unlocks_and_next_palier() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteObjectiveRepository::try_new(&mut conn).unwrap();
    let mut service = ObjectiveService::new(repo);

    // Stored flags say nothing is unlocked; progress says Bronze and
    // Argent are.
    let objective = sample_objective();
    service.create_objective(&objective).unwrap();

    let overview = service.objective_overview(objective.id).unwrap();
    assert_eq!(overview.progress_percent, 75.0);
    assert_eq!(overview.unlocked_count, 2);
    assert_eq!(overview.next_palier.as_ref().unwrap().name, "Or");

    let principal = service.principal_objective().unwrap().unwrap();
    assert!(principal.paliers[0].unlocked);
    assert!(principal.paliers[1].unlocked);
    assert!(!principal.paliers[2].unlocked);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteObjectiveRepository::try_new(&mut conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        pulse_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqliteObjectiveRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("objectives"))
    ));
}
