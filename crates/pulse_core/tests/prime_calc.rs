use pulse_core::model::member::TeamMember;
use pulse_core::model::objective::{Objective, ObjectiveKind, Palier};
use pulse_core::model::settings::PilotageSettings;
use pulse_core::prime::{
    active_potential_prime, classify_temperature, critical_alerts, derive_unlocked_tiers,
    next_palier, pro_rata_prime, simulate_budget, team_distribution, total_potential_prime,
    PrimeCalcError,
};
use pulse_core::AlertStatus;

fn objective_with_reward(reward_cents: i64) -> Objective {
    let mut objective = Objective::new(ObjectiveKind::Secondary, "objective", 100.0, "€");
    objective.reward_cents = reward_cents;
    objective
}

fn revenue_objective() -> Objective {
    let mut objective =
        Objective::new(ObjectiveKind::Principal, "Chiffre d'affaires mensuel", 100_000.0, "€");
    objective.progress = 75_000.0;
    objective.paliers = vec![
        Palier::new(1, "Bronze", 50_000.0, 10_000),
        Palier::new(2, "Argent", 75_000.0, 20_000),
        Palier::new(3, "Or", 100_000.0, 30_000),
        Palier::new(4, "Platine", 125_000.0, 50_000),
    ];
    objective.reconcile_reward();
    objective
}

#[test]
fn total_potential_sums_rewards_regardless_of_active_state() {
    // 500 + 150 + 100 + 75 euros = 825 euros.
    let mut objectives = vec![
        objective_with_reward(50_000),
        objective_with_reward(15_000),
        objective_with_reward(10_000),
        objective_with_reward(7_500),
    ];
    objectives[2].is_active = false;

    assert_eq!(total_potential_prime(&objectives), 82_500);
    assert_eq!(active_potential_prime(&objectives), 72_500);
}

#[test]
fn total_potential_of_empty_set_is_zero() {
    assert_eq!(total_potential_prime(&[]), 0);
}

#[test]
fn pro_rata_matches_rounded_ratio() {
    // 825€ at 28h/35h = 660€.
    assert_eq!(pro_rata_prime(82_500, 28, 35).unwrap(), 66_000);
    // 20h/35h lands between cents and rounds half-up.
    assert_eq!(pro_rata_prime(132_500, 20, 35).unwrap(), 75_714);
    assert_eq!(pro_rata_prime(101, 1, 2).unwrap(), 51);
}

#[test]
fn pro_rata_is_identity_at_the_base() {
    for amount in [0, 1, 82_500, 1_000_000] {
        assert_eq!(pro_rata_prime(amount, 35, 35).unwrap(), amount);
    }
}

#[test]
fn pro_rata_of_zero_contract_hours_is_zero() {
    assert_eq!(pro_rata_prime(82_500, 0, 35).unwrap(), 0);
}

#[test]
fn pro_rata_rejects_zero_base_hours() {
    assert_eq!(
        pro_rata_prime(82_500, 28, 0).unwrap_err(),
        PrimeCalcError::InvalidBaseHours
    );
}

#[test]
fn derive_unlocked_tiers_follows_progress() {
    let objective = revenue_objective();
    let tiers = derive_unlocked_tiers(objective.progress, &objective.paliers);

    let unlocked: Vec<bool> = tiers.iter().map(|t| t.unlocked).collect();
    assert_eq!(unlocked, vec![true, true, false, false]);
}

#[test]
fn derive_unlocked_tiers_unlocks_exactly_at_threshold() {
    let objective = revenue_objective();
    let tiers = derive_unlocked_tiers(100_000.0, &objective.paliers);

    let unlocked: Vec<bool> = tiers.iter().map(|t| t.unlocked).collect();
    assert_eq!(unlocked, vec![true, true, true, false]);
}

#[test]
fn next_palier_is_first_locked_tier_in_array_order() {
    let mut objective = revenue_objective();
    objective.paliers = derive_unlocked_tiers(objective.progress, &objective.paliers);

    let next = next_palier(&objective).unwrap();
    assert_eq!(next.name, "Or");
    assert_eq!(next.reward_cents, 30_000);
}

#[test]
fn next_palier_is_none_when_all_unlocked() {
    let mut objective = revenue_objective();
    objective.paliers = derive_unlocked_tiers(200_000.0, &objective.paliers);

    assert!(next_palier(&objective).is_none());
}

#[test]
fn team_distribution_skips_excluded_members() {
    let full_time = TeamMember::new("Marie Dupont", "marie@pulse.test", "Manager", 35, 35);
    let part_time = TeamMember::new("Sophie Bernard", "sophie@pulse.test", "Commercial", 28, 35);
    let mut excluded = TeamMember::new("Heiko Lafayette", "heiko@pulse.test", "Admin", 35, 35);
    excluded.exclude_from_primes = true;

    let distribution =
        team_distribution(82_500, &[full_time.clone(), part_time.clone(), excluded]).unwrap();

    assert_eq!(distribution.members_total, 3);
    assert_eq!(distribution.eligible_total, 2);
    assert_eq!(distribution.shares.len(), 2);
    assert_eq!(distribution.shares[0].member_id, full_time.id);
    assert_eq!(distribution.shares[0].amount_cents, 82_500);
    assert_eq!(distribution.shares[1].member_id, part_time.id);
    assert_eq!(distribution.shares[1].amount_cents, 66_000);
    assert_eq!(distribution.total_cents, 148_500);
}

#[test]
fn team_distribution_rejects_zero_member_base() {
    let mut broken = TeamMember::new("X", "x@pulse.test", "Commercial", 35, 35);
    broken.base_hours = 0;

    assert_eq!(
        team_distribution(82_500, &[broken]).unwrap_err(),
        PrimeCalcError::InvalidBaseHours
    );
}

#[test]
fn simulate_budget_distributes_worst_case_pool() {
    let mut secondary = Objective::new(ObjectiveKind::Secondary, "Nouveaux clients", 15.0, "clients");
    secondary.paliers = vec![
        Palier::new(1, "Démarrage", 5.0, 5_000),
        Palier::new(2, "Croissance", 10.0, 7_500),
        Palier::new(3, "Excellence", 15.0, 10_000),
    ];
    secondary.reconcile_reward();
    let objectives = vec![revenue_objective(), secondary];
    let settings = PilotageSettings::from_objectives(35, 100, &objectives);

    let members = vec![
        TeamMember::new("Marie", "marie@pulse.test", "Manager", 35, 35),
        TeamMember::new("Sophie", "sophie@pulse.test", "Commercial", 28, 35),
        TeamMember::new("Pierre", "pierre@pulse.test", "Commercial Junior", 20, 35),
    ];

    let simulation = simulate_budget(&settings, &members, 300_000).unwrap();

    // Pool per person: 110000 + 22500 cents.
    assert_eq!(simulation.total_cost_cents, 132_500);
    assert_eq!(simulation.scaled_cost_cents, 132_500);
    assert_eq!(simulation.objective_costs.len(), 2);
    assert_eq!(simulation.objective_costs[0].cost_cents, 110_000);
    // 132500 + 106000 + 75714.
    assert_eq!(simulation.team_total_cents, 314_214);
    assert_eq!(simulation.full_time_reference_cents, 132_500);
    assert!(simulation.over_budget);
    assert_eq!(simulation.budget_delta_cents, -14_214);
}

#[test]
fn simulate_budget_applies_global_multiplier() {
    let objectives = vec![revenue_objective()];
    let settings = PilotageSettings::from_objectives(35, 50, &objectives);
    let members = vec![TeamMember::new("Marie", "marie@pulse.test", "Manager", 35, 35)];

    let simulation = simulate_budget(&settings, &members, 100_000).unwrap();

    assert_eq!(simulation.total_cost_cents, 110_000);
    assert_eq!(simulation.scaled_cost_cents, 55_000);
    assert_eq!(simulation.team_total_cents, 55_000);
    assert!(!simulation.over_budget);
    assert_eq!(simulation.budget_delta_cents, 45_000);
}

#[test]
fn classify_temperature_matches_demo_readings() {
    // Frigo Principal: 4.2 in [2, 5].
    assert_eq!(classify_temperature(4.2, 2.0, 5.0), AlertStatus::Normal);
    // Chambre Froide 1: -17.5 in [-22, -18], half a degree warm.
    assert_eq!(classify_temperature(-17.5, -22.0, -18.0), AlertStatus::Warning);
    // Frigo Desserts: 6.8 in [2, 5], far out of bounds.
    assert_eq!(classify_temperature(6.8, 2.0, 5.0), AlertStatus::Critical);
    // Congélateur Viandes: -20 in [-25, -18].
    assert_eq!(classify_temperature(-20.0, -25.0, -18.0), AlertStatus::Normal);
}

#[test]
fn critical_alerts_keeps_warning_and_critical_units() {
    let mut normal = fridge("Frigo Principal", 4.2, 2.0, 5.0);
    normal.status = AlertStatus::Normal;
    let mut warning = fridge("Chambre Froide 1", -17.5, -22.0, -18.0);
    warning.status = AlertStatus::Warning;
    let mut critical = fridge("Frigo Desserts", 6.8, 2.0, 5.0);
    critical.status = AlertStatus::Critical;

    let alerts = vec![normal, warning, critical];
    let flagged = critical_alerts(&alerts);

    let names: Vec<&str> = flagged.iter().map(|a| a.fridge_name.as_str()).collect();
    assert_eq!(names, vec!["Chambre Froide 1", "Frigo Desserts"]);
}

fn fridge(name: &str, current: f64, min: f64, max: f64) -> pulse_core::FridgeAlert {
    pulse_core::FridgeAlert {
        id: uuid::Uuid::new_v4(),
        fridge_name: name.to_string(),
        location: "Cuisine".to_string(),
        current_temp: current,
        min_temp: min,
        max_temp: max,
        status: AlertStatus::Normal,
        last_update_epoch_ms: 1_700_000_000_000,
        history: Vec::new(),
    }
}
