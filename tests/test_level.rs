use yars_revenge::body::Rect;
use yars_revenge::cannon::CannonStateNumber;
use yars_revenge::canvas::Input;
use yars_revenge::config::GameConfig;
use yars_revenge::enemy_base::EnemyStateNumber;
use yars_revenge::level::{Level, LevelOutcome};
use yars_revenge::session::Session;
use yars_revenge::shield::{CellPos, Formation};
use yars_revenge::statemachine::Machine;
use yars_revenge::vector::Direction;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Default tuning with everything that moves on its own held still: the
/// base parks at rect (770, 150, 30, 30) with the homing bullet on its
/// center, and touching the base pays nothing.
fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.mover.speed = 0.0;
    config.mover.avg_transition_secs = 0.0;
    config.homer.speed = 0.0;
    config.energy.from_enemy = 0;
    config.ion_field.enabled = false;
    config
}

fn make_level(config: &GameConfig, layout: &[Vec<u8>]) -> Level {
    let formation = Formation::from_layout(layout, (0, 0)).unwrap();
    Level::new(config, &formation)
}

fn make_session(config: &GameConfig) -> Session {
    Session::new(config.lives.starting, config.energy.max)
}

/// Buys the cannon from the left edge, fires it level with the base's
/// middle and moves the ship out of its path.
fn fire_cannon(level: &mut Level, session: &mut Session, rng: &mut StdRng) {
    session.give_energy(100);
    level.player_mut().body_mut().set_left(0);
    assert_eq!(level.update(session, rng), None);
    level.handle_input(&Input::action());
    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Firing));
    level.player_mut().body_mut().set_mid_left(10, 100);
}

/// The base patrols rows 285..315, so it sits in the path of a cannon
/// fired from the ship's starting height.
fn cannon_row_config() -> GameConfig {
    let mut config = quiet_config();
    config.mover.top = 285;
    config.mover.bottom = 315;
    config
}

fn run_until_outcome(level: &mut Level, session: &mut Session, rng: &mut StdRng) -> Option<LevelOutcome> {
    for _ in 0..200 {
        let outcome = level.update(session, rng);
        if outcome.is_some() {
            return outcome;
        }
    }
    None
}

fn column_marks(level: &Level) -> Vec<bool> {
    (0..3)
        .map(|row| level.shield().get(CellPos::new(row, 0)).unwrap().is_marked())
        .collect()
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn level_starts_with_everything_in_place() {
    let config = quiet_config();
    let level = make_level(&config, &[vec![1, 1], vec![1, 1]]);

    assert_eq!(level.player().rect(), Rect::new(10, 285, 30, 30));
    assert_eq!(level.player().facing(), Direction::South);
    assert_eq!(level.enemy().rect(), Rect::new(770, 150, 30, 30));
    assert_eq!(level.enemy().state_number(), Some(EnemyStateNumber::Moving));
    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Deactivated));
    assert_eq!(level.homer().rect().center(), level.enemy().rect().center());
    assert_eq!(level.shield().len(), 4);
    assert!(level.bullets().is_empty());
    assert!(level.ion_field().is_none());
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn quit_stops_the_level() {
    let mut level = make_level(&quiet_config(), &[vec![0]]);
    assert!(level.handle_input(&Input::idle()));
    assert!(!level.handle_input(&Input::quit()));
}

#[test]
fn moving_turns_and_moves_the_ship() {
    let mut level = make_level(&quiet_config(), &[vec![0]]);
    assert!(level.handle_input(&Input::moving(Direction::NorthEast)));
    assert_eq!(level.player().facing(), Direction::NorthEast);
    assert_eq!(level.player().rect(), Rect::new(15, 280, 30, 30));
}

#[test]
fn ship_wraps_vertically_and_stops_at_the_sides() {
    let mut level = make_level(&quiet_config(), &[vec![0]]);
    level.player_mut().body_mut().set_top_left(0, 2);

    level.handle_input(&Input::moving(Direction::North));
    assert_eq!(level.player().rect().bottom(), 600);

    level.handle_input(&Input::moving(Direction::West));
    assert_eq!(level.player().rect().left, 0);
}

#[test]
fn bullets_are_capped() {
    let mut level = make_level(&quiet_config(), &[vec![0]]);
    level.handle_input(&Input::action());
    level.handle_input(&Input::action());
    assert_eq!(level.bullets().len(), 1);
    assert_eq!(level.bullets()[0].direction(), Direction::South);
}

// ── Collision rules ───────────────────────────────────────────────────────────

#[test]
fn ship_eats_a_lone_cell_on_the_second_bump() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![1]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    let cell = level.shield().cells().next().unwrap().rect();
    assert_eq!(cell, Rect::new(770, 150, 10, 10));
    assert!(level.shield().can_eat());

    for _ in 0..2 {
        let body = level.player_mut().body_mut();
        body.set_right(cell.left + 3);
        body.set_center_y(cell.center_y() as f64);
        assert_eq!(level.update(&mut session, &mut rng), None);
    }

    assert_eq!(level.shield().len(), 0);
    assert_eq!(session.score(), config.scoring.cell_eat);
    assert_eq!(session.energy(), config.energy.from_cell);
}

#[test]
fn bumping_a_cell_bounces_the_ship_west() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![1]]);
    let mut session = make_session(&config);

    let body = level.player_mut().body_mut();
    body.set_right(773);
    body.set_center_y(155.0);
    level.update(&mut session, &mut seeded_rng());

    assert_eq!(level.player().rect().right(), 770 - config.shield.bounceback);
    assert!(level.shield().cells().next().unwrap().is_marked());
    assert_eq!(session.score(), 0);
}

#[test]
fn firing_cannon_destroys_the_patrolling_base() {
    let mut config = quiet_config();
    config.mover.top = 285;
    config.mover.bottom = 315;
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    // Buy the cannon by touching the left edge.
    session.give_energy(config.energy.max);
    level.player_mut().body_mut().set_left(0);
    assert_eq!(level.update(&mut session, &mut rng), None);
    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Standby));
    assert_eq!(session.energy(), config.energy.max - config.cannon.energy_cost);

    level.handle_input(&Input::action());
    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Firing));
    assert!(level.bullets().is_empty());

    level.player_mut().body_mut().set_mid_left(10, 100);
    let mut outcome = None;
    for _ in 0..200 {
        outcome = level.update(&mut session, &mut rng);
        if outcome.is_some() {
            break;
        }
    }

    assert_eq!(outcome, Some(LevelOutcome::Cleared(EnemyStateNumber::Moving)));
    assert_eq!(session.score(), config.scoring.mover_destroy);
}

#[test]
fn cannon_needs_energy() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);

    session.give_energy(config.cannon.energy_cost - 1);
    level.player_mut().body_mut().set_left(0);
    level.update(&mut session, &mut seeded_rng());

    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Deactivated));
    assert_eq!(session.energy(), config.cannon.energy_cost - 1);
}

#[test]
fn firing_cannon_bounces_off_the_shield() {
    // The lone cell sits at rows 290..300, across the cannon's flight path.
    let mut config = quiet_config();
    config.mover.top = 290;
    config.mover.bottom = 320;
    let mut level = make_level(&config, &[vec![1]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    session.give_energy(config.energy.max);
    level.player_mut().body_mut().set_left(0);
    level.update(&mut session, &mut rng);
    level.handle_input(&Input::action());
    level.player_mut().body_mut().set_mid_left(10, 100);

    for _ in 0..200 {
        assert_eq!(level.update(&mut session, &mut rng), None);
        if level.cannon().state_number() != Some(CannonStateNumber::Firing) {
            break;
        }
    }

    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Returning));
    assert!(level.shield().is_empty());
    assert_eq!(session.score(), config.scoring.cell_shoot);
}

#[test]
fn catching_the_returning_cannon_refunds_energy() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    level.player_mut().body_mut().set_mid_left(10, 500);
    assert!(level.cannon_mut().start_transition(CannonStateNumber::Standby));
    assert!(level.cannon_mut().start_transition(CannonStateNumber::Firing));
    for _ in 0..20 {
        assert_eq!(level.update(&mut session, &mut rng), None);
    }
    assert!(level.cannon_mut().start_transition(CannonStateNumber::Returning));

    let cannon = level.cannon().rect();
    level.player_mut().body_mut().set_mid_left(cannon.left - 30, cannon.center_y());
    assert_eq!(level.update(&mut session, &mut rng), None);

    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Deactivated));
    assert_eq!(session.energy(), config.energy.from_cannon);
}

#[test]
fn homing_bullet_kills_the_ship() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);

    let homer = level.homer().rect();
    level
        .player_mut()
        .body_mut()
        .set_mid_left(homer.left - 10, homer.center_y());
    assert_eq!(
        level.update(&mut session, &mut seeded_rng()),
        Some(LevelOutcome::PlayerKilled)
    );
}

#[test]
fn homing_bullet_closes_in() {
    let mut config = quiet_config();
    config.homer.speed = 2.0;
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);

    let before = level.homer().rect().center().dist(level.player().rect().center());
    level.update(&mut session, &mut seeded_rng());
    let after = level.homer().rect().center().dist(level.player().rect().center());
    assert!(after < before);
}

#[test]
fn touching_the_patrolling_base_feeds_the_ship() {
    let mut config = quiet_config();
    config.energy.from_enemy = 1;
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    for _ in 0..3 {
        let body = level.player_mut().body_mut();
        body.set_right(775);
        body.set_center_y(165.0);
        assert_eq!(level.update(&mut session, &mut rng), None);
    }
    assert_eq!(session.energy(), 3);
}

#[test]
fn touching_the_spinning_base_kills_the_ship() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);

    assert!(level.enemy_mut().start_transition(EnemyStateNumber::Spinning));
    let body = level.player_mut().body_mut();
    body.set_right(775);
    body.set_center_y(165.0);
    assert_eq!(
        level.update(&mut session, &mut seeded_rng()),
        Some(LevelOutcome::PlayerKilled)
    );
}

#[test]
fn bullet_takes_out_a_cross_of_cells() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![1, 1, 1]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    level.player_mut().body_mut().set_mid_left(600, 155);
    level.player_mut().set_facing(Direction::East);
    level.handle_input(&Input::action());
    assert_eq!(level.bullets().len(), 1);

    for _ in 0..100 {
        assert_eq!(level.update(&mut session, &mut rng), None);
        if level.shield().is_empty() {
            break;
        }
    }

    assert!(level.shield().is_empty());
    assert!(level.bullets().is_empty());
    assert_eq!(session.score(), config.scoring.cell_shoot);
}

#[test]
fn only_the_cell_nearest_the_ship_center_is_struck() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![1], vec![1], vec![1]]);
    let mut session = make_session(&config);

    // Rows 160..190 overlap the cells centred at 165 and 175.
    let body = level.player_mut().body_mut();
    body.set_right(773);
    body.set_center_y(175.0);
    assert_eq!(level.update(&mut session, &mut seeded_rng()), None);

    assert_eq!(column_marks(&level), vec![false, false, true]);
    assert_eq!(level.player().rect().right(), 770 - config.shield.bounceback);
}

#[test]
fn equally_near_cells_strike_the_first_in_row_order() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![1], vec![1], vec![1]]);
    let mut session = make_session(&config);

    // Center 170 is 5 px from the cells centred at 165 and 175.
    let body = level.player_mut().body_mut();
    body.set_right(773);
    body.set_center_y(170.0);
    assert_eq!(level.update(&mut session, &mut seeded_rng()), None);

    assert_eq!(column_marks(&level), vec![false, true, false]);
}

#[test]
fn firing_cannon_destroys_the_spinning_base() {
    let mut config = cannon_row_config();
    config.spinner.targ_time = 1000;
    config.spinner.shoot_time = 1000;
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    fire_cannon(&mut level, &mut session, &mut rng);
    assert!(level.enemy_mut().start_transition(EnemyStateNumber::Spinning));

    assert_eq!(
        run_until_outcome(&mut level, &mut session, &mut rng),
        Some(LevelOutcome::Cleared(EnemyStateNumber::Spinning))
    );
    assert_eq!(session.score(), config.scoring.spinner_destroy);
    assert_eq!(session.lives(), config.lives.starting);
}

#[test]
fn firing_cannon_destroys_the_shooting_base_for_a_bonus_life() {
    let mut config = cannon_row_config();
    config.shooter.speed = 0.0;
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    fire_cannon(&mut level, &mut session, &mut rng);
    assert!(level.enemy_mut().start_transition(EnemyStateNumber::Spinning));
    assert!(level.enemy_mut().start_transition(EnemyStateNumber::Shooting));

    assert_eq!(
        run_until_outcome(&mut level, &mut session, &mut rng),
        Some(LevelOutcome::Cleared(EnemyStateNumber::Shooting))
    );
    assert_eq!(session.score(), config.scoring.shooter_destroy);
    assert_eq!(session.lives(), config.lives.starting + 1);
}

#[test]
fn firing_cannon_kills_the_ship_in_its_path() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);
    let mut rng = seeded_rng();

    session.give_energy(config.energy.max);
    level.player_mut().body_mut().set_left(0);
    assert_eq!(level.update(&mut session, &mut rng), None);
    level.handle_input(&Input::action());
    assert_eq!(level.cannon().state_number(), Some(CannonStateNumber::Firing));

    assert_eq!(
        level.update(&mut session, &mut rng),
        Some(LevelOutcome::PlayerKilled)
    );
}

#[test]
fn touching_the_shooting_base_kills_the_ship() {
    let mut config = quiet_config();
    config.shooter.speed = 0.0;
    let mut level = make_level(&config, &[vec![0]]);
    let mut session = make_session(&config);

    assert!(level.enemy_mut().start_transition(EnemyStateNumber::Spinning));
    assert!(level.enemy_mut().start_transition(EnemyStateNumber::Shooting));
    let body = level.player_mut().body_mut();
    body.set_right(775);
    body.set_center_y(165.0);
    assert_eq!(
        level.update(&mut session, &mut seeded_rng()),
        Some(LevelOutcome::PlayerKilled)
    );
}

// ── Restart ───────────────────────────────────────────────────────────────────

#[test]
fn reset_positions_keeps_shield_damage_and_score() {
    let config = quiet_config();
    let mut level = make_level(&config, &[vec![1, 1, 1]]);
    let mut session = make_session(&config);

    level.shield_mut().remove_cross(CellPos::new(0, 1));
    session.add_score(500);
    session.give_energy(40);
    level.player_mut().body_mut().set_top_left(400, 40);
    level.player_mut().set_facing(Direction::West);
    level.handle_input(&Input::action());

    level.reset_positions(&mut session);

    assert_eq!(level.player().rect(), Rect::new(10, 285, 30, 30));
    assert_eq!(level.player().facing(), Direction::South);
    assert!(level.bullets().is_empty());
    assert_eq!(level.shield().len(), 1);
    assert_eq!(session.energy(), 0);
    assert_eq!(session.score(), 500);
}
