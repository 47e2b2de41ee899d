use pulse_core::db::open_db_in_memory;
use pulse_core::repo::alert_repo::{AlertRepository, SqliteAlertRepository};
use pulse_core::service::control_service::{ControlService, ControlServiceError};
use pulse_core::{AlertSeverity, AlertStatus, FridgeAlert};
use uuid::Uuid;

fn unit(name: &str, location: &str, current: f64, min: f64, max: f64) -> FridgeAlert {
    FridgeAlert {
        id: Uuid::new_v4(),
        fridge_name: name.to_string(),
        location: location.to_string(),
        current_temp: current,
        min_temp: min,
        max_temp: max,
        status: AlertStatus::Normal,
        last_update_epoch_ms: 1_700_000_000_000,
        history: Vec::new(),
    }
}

#[test]
fn register_derives_status_from_initial_reading() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteAlertRepository::try_new(&mut conn).unwrap();
    let mut service = ControlService::new(repo);

    // Claimed Normal but the reading is far over bounds.
    let desserts = unit("Frigo Desserts", "Cuisine pâtisserie", 6.8, 2.0, 5.0);
    service.register_unit(&desserts).unwrap();

    let units = service.list_units().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].status, AlertStatus::Critical);
}

#[test]
fn out_of_bounds_readings_append_history_events() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteAlertRepository::try_new(&mut conn).unwrap();
    let mut service = ControlService::new(repo);

    let cold_room = unit("Chambre Froide 1", "Stock A", -20.0, -22.0, -18.0);
    service.register_unit(&cold_room).unwrap();

    let status = service
        .record_reading(cold_room.id, -17.5, 1_700_000_100_000)
        .unwrap();
    assert_eq!(status, AlertStatus::Warning);

    let status = service
        .record_reading(cold_room.id, -15.0, 1_700_000_200_000)
        .unwrap();
    assert_eq!(status, AlertStatus::Critical);

    let status = service
        .record_reading(cold_room.id, -19.0, 1_700_000_300_000)
        .unwrap();
    assert_eq!(status, AlertStatus::Normal);

    let units = service.list_units().unwrap();
    let history = &units[0].history;
    // Normal readings leave no trace; newest event first.
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].severity, AlertSeverity::Critical);
    assert_eq!(history[0].temp, -15.0);
    assert_eq!(history[1].severity, AlertSeverity::Warning);
    assert!(!history[0].acknowledged);

    assert_eq!(units[0].current_temp, -19.0);
    assert_eq!(units[0].status, AlertStatus::Normal);
    assert_eq!(units[0].last_update_epoch_ms, 1_700_000_300_000);
}

#[test]
fn attention_list_keeps_only_flagged_units() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteAlertRepository::try_new(&mut conn).unwrap();
    let mut service = ControlService::new(repo);

    let main = unit("Frigo Principal", "Cuisine centrale", 4.2, 2.0, 5.0);
    let cold_room = unit("Chambre Froide 1", "Stock A", -17.5, -22.0, -18.0);
    let desserts = unit("Frigo Desserts", "Cuisine pâtisserie", 6.8, 2.0, 5.0);
    service.register_unit(&main).unwrap();
    service.register_unit(&cold_room).unwrap();
    service.register_unit(&desserts).unwrap();

    let flagged = service.attention_list().unwrap();
    let names: Vec<&str> = flagged.iter().map(|a| a.fridge_name.as_str()).collect();
    assert_eq!(names, vec!["Chambre Froide 1", "Frigo Desserts"]);
}

#[test]
fn acknowledge_marks_single_event() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteAlertRepository::try_new(&mut conn).unwrap();
    let mut service = ControlService::new(repo);

    let cold_room = unit("Chambre Froide 1", "Stock A", -20.0, -22.0, -18.0);
    service.register_unit(&cold_room).unwrap();
    service
        .record_reading(cold_room.id, -17.5, 1_700_000_100_000)
        .unwrap();

    let units = service.list_units().unwrap();
    let event_id = units[0].history[0].id;
    service.acknowledge(event_id).unwrap();

    let units = service.list_units().unwrap();
    assert!(units[0].history[0].acknowledged);

    let err = service.acknowledge(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ControlServiceError::AlertNotFound(_)));
}

#[test]
fn reading_unknown_unit_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteAlertRepository::try_new(&mut conn).unwrap();
    let mut service = ControlService::new(repo);

    let missing = Uuid::new_v4();
    let err = service
        .record_reading(missing, 4.0, 1_700_000_000_000)
        .unwrap_err();
    assert!(matches!(err, ControlServiceError::AlertNotFound(id) if id == missing));
}

#[test]
fn repository_validates_bounds() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteAlertRepository::try_new(&mut conn).unwrap();

    let mut reversed = unit("Frigo", "Cuisine", 4.0, 5.0, 2.0);
    reversed.status = AlertStatus::Normal;
    let err = repo.create_alert(&reversed).unwrap_err();
    assert!(matches!(
        err,
        pulse_core::RepoError::Validation(
            pulse_core::ValidationError::InvalidTemperatureBounds { .. }
        )
    ));
}
