use pulse_core::db::open_db_in_memory;
use pulse_core::model::directory::{SiteCategory, Supplier, UsefulContact, UsefulSite, Weekday};
use pulse_core::model::ValidationError;
use pulse_core::repo::directory_repo::{DirectoryRepository, SqliteDirectoryRepository};
use pulse_core::service::directory_service::{DirectoryService, DirectoryServiceError};
use pulse_core::RepoError;
use uuid::Uuid;

fn category(id: &str, name: &str, admin_only: bool) -> SiteCategory {
    SiteCategory {
        id: id.to_string(),
        name: name.to_string(),
        icon: "heart-handshake".to_string(),
        color: "#10B981".to_string(),
        admin_only,
    }
}

fn site(name: &str, url: &str, category: &str, admin_only: bool) -> UsefulSite {
    UsefulSite {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: String::new(),
        url: url.to_string(),
        category: category.to_string(),
        logo: None,
        admin_only,
    }
}

#[test]
fn site_directory_separates_audiences() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    let mut service = DirectoryService::new(repo);

    service.upsert_category(&category("aides", "Aides", false)).unwrap();
    service
        .upsert_category(&category("livraison", "Livraison", true))
        .unwrap();

    service
        .add_site(&site("CAF", "https://www.caf.fr", "aides", false))
        .unwrap();
    service
        .add_site(&site(
            "Dood",
            "https://www.dood.com",
            "livraison",
            true,
        ))
        .unwrap();

    let employee = service.employee_sites(None).unwrap();
    assert_eq!(employee.len(), 1);
    assert_eq!(employee[0].name, "CAF");

    let admin = service.admin_sites(None).unwrap();
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0].name, "Dood");

    let filtered = service.employee_sites(Some("livraison")).unwrap();
    assert!(filtered.is_empty());
}

#[test]
fn add_site_rejects_unknown_category_and_bad_url() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();
    let mut service = DirectoryService::new(repo);

    service.upsert_category(&category("aides", "Aides", false)).unwrap();

    let err = service
        .add_site(&site("CAF", "https://www.caf.fr", "inconnu", false))
        .unwrap_err();
    assert!(matches!(err, DirectoryServiceError::UnknownCategory(slug) if slug == "inconnu"));

    let err = service
        .add_site(&site("CAF", "caf.fr", "aides", false))
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryServiceError::Repo(RepoError::Validation(ValidationError::InvalidUrl(_)))
    ));
}

#[test]
fn contact_phone_is_validated_and_listed_sorted() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let steve = UsefulContact {
        id: Uuid::new_v4(),
        name: "Steve".to_string(),
        phone: "06.09.98.28.45".to_string(),
        role: "Responsable".to_string(),
        category: "management".to_string(),
    };
    let heiko = UsefulContact {
        id: Uuid::new_v4(),
        name: "Fixe Heiko".to_string(),
        phone: "01.40.00.24.30".to_string(),
        role: "Siège".to_string(),
        category: "siege".to_string(),
    };
    repo.create_contact(&steve).unwrap();
    repo.create_contact(&heiko).unwrap();

    let listed = repo.list_contacts().unwrap();
    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Fixe Heiko", "Steve"]);

    let mut invalid = steve.clone();
    invalid.id = Uuid::new_v4();
    invalid.phone = "call me".to_string();
    let err = repo.create_contact(&invalid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidPhone(_))
    ));
}

#[test]
fn supplier_roundtrip_preserves_ordering_constraints() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let mut foodex = Supplier::new("FOODEX", "01.45.10.24.00");
    foodex.delivery_days = vec![
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];
    foodex.lead_time_days = 1;
    foodex.order_cutoff = Some("12:00".to_string());
    foodex.min_order_cents = Some(10_000);
    foodex.delivery_window = Some("Avant 10h".to_string());

    let mut terre_azur = Supplier::new("TERRE AZUR", "01.78.68.64.23");
    terre_azur.sales_contact = Some("Gregory".to_string());
    terre_azur.delivery_days = vec![Weekday::Monday, Weekday::Saturday];
    terre_azur.free_delivery_cents = Some(20_000);

    repo.create_supplier(&foodex).unwrap();
    repo.create_supplier(&terre_azur).unwrap();

    let loaded = repo.get_supplier(foodex.id).unwrap().unwrap();
    assert_eq!(loaded, foodex);

    let listed = repo.list_suppliers().unwrap();
    let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["FOODEX", "TERRE AZUR"]);
    assert_eq!(listed[1].sales_contact.as_deref(), Some("Gregory"));

    let mut updated = foodex.clone();
    updated.lead_time_days = 2;
    updated.order_cutoff = Some("16:00".to_string());
    repo.update_supplier(&updated).unwrap();
    let reloaded = repo.get_supplier(foodex.id).unwrap().unwrap();
    assert_eq!(reloaded.lead_time_days, 2);
    assert_eq!(reloaded.order_cutoff.as_deref(), Some("16:00"));
}

#[test]
fn supplier_cutoff_format_is_validated() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let mut bad = Supplier::new("METRO", "01.64.19.17.17");
    bad.order_cutoff = Some("14h00".to_string());
    let err = repo.create_supplier(&bad).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidCutoffTime(_))
    ));
}

#[test]
fn delete_paths_return_not_found_for_unknown_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteDirectoryRepository::try_new(&mut conn).unwrap();

    let missing = Uuid::new_v4();
    assert!(matches!(
        repo.delete_site(missing).unwrap_err(),
        RepoError::NotFound(id) if id == missing
    ));
    assert!(matches!(
        repo.delete_contact(missing).unwrap_err(),
        RepoError::NotFound(id) if id == missing
    ));
    assert!(matches!(
        repo.delete_supplier(missing).unwrap_err(),
        RepoError::NotFound(id) if id == missing
    ));
}
