//! Core domain logic for the Pulse business dashboard.
//! This crate is the single source of truth for bonus math and business
//! invariants; UI layers consume it and own nothing.

pub mod db;
pub mod logging;
pub mod model;
pub mod prime;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::alert::{AlertEvent, AlertSeverity, AlertStatus, FridgeAlert};
pub use model::directory::{
    SiteCategory, Supplier, UsefulContact, UsefulSite, Weekday,
};
pub use model::member::{MemberId, TeamMember};
pub use model::message::{
    Audience, Channel, Message, MessageStatus, NotificationGroup,
};
pub use model::objective::{Objective, ObjectiveId, ObjectiveKind, Palier};
pub use model::prime::{Prime, PrimeLine, PrimeStatus};
pub use model::settings::{ObjectiveConfig, PalierConfig, PilotageSettings};
pub use model::ValidationError;
pub use prime::{
    active_potential_prime, classify_temperature, critical_alerts, derive_unlocked_tiers,
    next_palier, pro_rata_prime, simulate_budget, team_distribution, total_potential_prime,
    BudgetSimulation, MemberShare, PrimeCalcError, TeamDistribution,
};
pub use repo::member_repo::{MemberListQuery, MemberRepository, SqliteMemberRepository};
pub use repo::objective_repo::{
    ObjectiveListQuery, ObjectiveRepository, SqliteObjectiveRepository,
};
pub use repo::prime_repo::{PrimeRepository, SqlitePrimeRepository};
pub use repo::{RepoError, RepoResult};
pub use service::objective_service::ObjectiveService;
pub use service::prime_service::PrimeService;
pub use service::team_service::TeamService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
