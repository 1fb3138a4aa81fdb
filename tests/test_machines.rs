use std::rc::Rc;

use yars_revenge::body::{Body, Mask, Rect};
use yars_revenge::cannon::*;
use yars_revenge::enemy_base::*;
use yars_revenge::sprite::SpriteSheet;
use yars_revenge::statemachine::{Machine, Manager, State};
use yars_revenge::vector::{Direction, Vector2};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn sheet(name: &str, size: usize, frames: usize) -> Rc<SpriteSheet> {
    Rc::new(SpriteSheet::solid(name, size, size, 1, frames))
}

/// Patrols 150..450 on an 800-wide screen; starts at rect (770, 150, 30, 30).
fn make_enemy(probability: f64, targ_time: u32, shoot_time: u32) -> EnemyBase {
    EnemyBase::new(
        MoverArgs {
            sheet: sheet("mover", 30, 1),
            top: 150,
            bottom: 450,
            speed: 2.0,
            transition_probability: probability,
            screen_width: 800,
        },
        SpinnerArgs {
            sheet: sheet("spinner", 30, 4),
            delay: 5,
            targ_time,
            shoot_time,
        },
        ShooterArgs {
            sheet: sheet("shooter", 30, 4),
            delay: 3,
            speed: 2.0,
            screen_height: 600,
        },
    )
}

fn make_cannon() -> Cannon {
    Cannon::new(CannonArgs {
        standby_sheet: sheet("cannon", 10, 1),
        firing_sheet: sheet("cannon", 10, 1),
        speed: 9.0,
        screen_width: 800,
        screen_height: 600,
    })
}

fn mover(enemy: &EnemyBase) -> &Mover {
    match enemy.state() {
        Some(EnemyState::Moving(mover)) => mover,
        other => panic!("expected a patrolling base, got {other:?}"),
    }
}

fn spinner(enemy: &EnemyBase) -> &Spinner {
    match enemy.state() {
        Some(EnemyState::Spinning(spinner)) => spinner,
        other => panic!("expected a spinning base, got {other:?}"),
    }
}

fn shooter(enemy: &EnemyBase) -> &Shooter {
    match enemy.state() {
        Some(EnemyState::Shooting(shooter)) => shooter,
        other => panic!("expected a shooting base, got {other:?}"),
    }
}

fn assert_close(a: Vector2, b: Vector2) {
    assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
}

// ── Manager ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Lamp {
    on: bool,
    body: Body,
}

impl Lamp {
    fn new(on: bool) -> Self {
        let mut body = Body::new(Rc::new(Mask::filled(4, 4)), None);
        body.set_top_left(if on { 10 } else { 0 }, 0);
        Lamp { on, body }
    }
}

impl State for Lamp {
    type Number = bool;

    fn number(&self) -> bool {
        self.on
    }

    fn body(&self) -> &Body {
        &self.body
    }
}

#[test]
fn empty_manager_ignores_updates() {
    let mut manager: Manager<Lamp> = Manager::new();
    assert!(!manager.is_active());
    assert_eq!(manager.state_number(), None);
    assert!(manager.body().is_none());
    assert_eq!(manager.update_with(|_| Some(true)), None);
}

#[test]
fn change_state_returns_previous_and_refreshes_body() {
    let mut manager = Manager::with_state(Lamp::new(false));
    assert_eq!(manager.rect(), Some(Rect::new(0, 0, 4, 4)));

    let previous = manager.change_state(Lamp::new(true));
    assert_eq!(previous.map(|lamp| lamp.on), Some(false));
    assert_eq!(manager.state_number(), Some(true));
    assert_eq!(manager.rect(), Some(Rect::new(10, 0, 4, 4)));
}

#[test]
fn update_with_refreshes_the_cached_body() {
    let mut manager = Manager::with_state(Lamp::new(false));
    let request = manager.update_with(|lamp| {
        lamp.body.set_left(20);
        Some(!lamp.on)
    });
    assert_eq!(request, Some(true));
    assert_eq!(manager.rect().map(|r| r.left), Some(20));
}

// ── EnemyBase: Moving ─────────────────────────────────────────────────────────

#[test]
fn mover_starts_top_right_heading_south() {
    let enemy = make_enemy(0.0, 29, 30);
    assert_eq!(enemy.rect(), Rect::new(770, 150, 30, 30));
    assert_eq!(mover(&enemy).direction(), Direction::South);
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Moving));
}

#[test]
fn mover_turns_north_at_the_bottom_bound() {
    let mut enemy = make_enemy(0.0, 29, 30);
    let mut rng = seeded_rng();
    let target = Rect::new(0, 0, 30, 30);

    for _ in 0..1000 {
        enemy.update(&target, &mut rng);
        if enemy.rect().bottom() >= 450 {
            break;
        }
    }
    assert!(enemy.rect().bottom() >= 450);
    assert_eq!(mover(&enemy).direction(), Direction::North);

    let bottom = enemy.rect().bottom();
    enemy.update(&target, &mut rng);
    assert!(enemy.rect().bottom() < bottom);
}

#[test]
fn mover_turns_south_at_the_top_bound() {
    let mut enemy = make_enemy(0.0, 29, 30);
    let mut rng = seeded_rng();
    let target = Rect::new(0, 0, 30, 30);

    // Down to the bottom first, then back up.
    for _ in 0..1000 {
        enemy.update(&target, &mut rng);
        if enemy.rect().bottom() >= 450 {
            break;
        }
    }
    for _ in 0..1000 {
        enemy.update(&target, &mut rng);
        if enemy.rect().top <= 150 {
            break;
        }
    }
    assert!(enemy.rect().top <= 150);
    assert_eq!(mover(&enemy).direction(), Direction::South);
}

#[test]
fn certain_transition_spins_up_on_the_first_tick() {
    let mut enemy = make_enemy(1.0, 29, 30);
    enemy.update(&Rect::new(0, 0, 30, 30), &mut seeded_rng());
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Spinning));
}

#[test]
fn zero_probability_never_spins() {
    let mut enemy = make_enemy(0.0, 29, 30);
    let mut rng = seeded_rng();
    for _ in 0..2000 {
        enemy.update(&Rect::new(0, 0, 30, 30), &mut rng);
    }
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Moving));
}

#[test]
fn probability_for_turns_a_mean_wait_into_a_per_tick_chance() {
    assert!((MoverArgs::probability_for(6.0, 60) - 1.0 / 360.0).abs() < 1e-12);
    assert_eq!(MoverArgs::probability_for(0.0, 60), 0.0);
    assert_eq!(MoverArgs::probability_for(0.01, 60), 1.0);
}

// ── EnemyBase: Spinning / Shooting ────────────────────────────────────────────

#[test]
fn spinner_locks_on_at_targ_time_and_keeps_it() {
    let mut enemy = make_enemy(0.0, 5, 20);
    let mut rng = seeded_rng();
    assert!(enemy.start_transition(EnemyStateNumber::Spinning));
    assert_eq!(enemy.rect(), Rect::new(770, 150, 30, 30));

    let target = Rect::new(100, 300, 30, 30);
    for _ in 0..4 {
        enemy.update(&target, &mut rng);
    }
    assert_eq!(spinner(&enemy).target_direction(), None);

    enemy.update(&target, &mut rng);
    assert_eq!(spinner(&enemy).ticks(), 5);
    let expected = Vector2::new(115.0 - 785.0, 315.0 - 165.0).normalize();
    let locked = spinner(&enemy).target_direction().expect("locked at tick 5");
    assert_close(locked, expected);

    // The target runs away; the lock stays.
    let moved = Rect::new(400, 20, 30, 30);
    for _ in 0..14 {
        enemy.update(&moved, &mut rng);
    }
    assert_eq!(spinner(&enemy).ticks(), 19);
    assert_close(spinner(&enemy).target_direction().unwrap(), expected);

    enemy.update(&moved, &mut rng);
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Shooting));
    assert_close(shooter(&enemy).direction(), expected);
}

#[test]
fn late_targ_time_locks_at_the_shooting_tick() {
    let mut enemy = make_enemy(0.0, 50, 3);
    let mut rng = seeded_rng();
    assert!(enemy.start_transition(EnemyStateNumber::Spinning));

    let target = Rect::new(770, 400, 30, 30);
    for _ in 0..3 {
        enemy.update(&target, &mut rng);
    }
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Shooting));
    assert_close(shooter(&enemy).direction(), Vector2::new(0.0, 1.0));
}

#[test]
fn shot_returns_to_the_remembered_patrol() {
    let mut enemy = make_enemy(0.0, 2, 3);
    let mut rng = seeded_rng();
    let target = Rect::new(0, 170, 30, 30);

    for _ in 0..10 {
        enemy.update(&target, &mut rng);
    }
    let patrol_rect = enemy.rect();
    assert_eq!(patrol_rect, Rect::new(770, 170, 30, 30));

    assert!(enemy.start_transition(EnemyStateNumber::Spinning));
    for _ in 0..3 {
        enemy.update(&target, &mut rng);
    }
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Shooting));
    assert_close(shooter(&enemy).direction(), Vector2::new(-1.0, 0.0));

    for _ in 0..1000 {
        enemy.update(&target, &mut rng);
        if enemy.state_number() == Some(EnemyStateNumber::Moving) {
            break;
        }
    }
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Moving));
    let resumed = mover(&enemy);
    assert_eq!(resumed.top(), 150);
    assert_eq!(resumed.bottom(), 450);
    assert_eq!(resumed.speed(), 2.0);
    assert_eq!(enemy.rect(), patrol_rect);
}

#[test]
fn resume_mover_interrupts_a_shot() {
    let mut enemy = make_enemy(0.0, 1, 2);
    let mut rng = seeded_rng();
    let target = Rect::new(0, 0, 30, 30);

    assert!(enemy.start_transition(EnemyStateNumber::Spinning));
    enemy.update(&target, &mut rng);
    enemy.update(&target, &mut rng);
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Shooting));

    enemy.resume_mover();
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Moving));
    assert_eq!(enemy.rect(), Rect::new(770, 150, 30, 30));
}

#[test]
fn only_patrol_and_spin_are_followable() {
    let mut enemy = make_enemy(0.0, 1, 2);
    let mut rng = seeded_rng();
    let target = Rect::new(0, 0, 30, 30);
    assert!(enemy.is_followable());

    assert!(enemy.start_transition(EnemyStateNumber::Spinning));
    assert!(enemy.is_followable());

    enemy.update(&target, &mut rng);
    enemy.update(&target, &mut rng);
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Shooting));
    assert!(!enemy.is_followable());
}

#[test]
fn enemy_transition_whitelist() {
    let mut enemy = make_enemy(0.0, 29, 30);
    assert!(!enemy.start_transition(EnemyStateNumber::Shooting));
    assert!(!enemy.start_transition(EnemyStateNumber::Moving));
    assert_eq!(enemy.state_number(), Some(EnemyStateNumber::Moving));

    assert!(enemy.start_transition(EnemyStateNumber::Spinning));
    assert!(!enemy.start_transition(EnemyStateNumber::Moving));
    assert!(!enemy.start_transition(EnemyStateNumber::Spinning));
    assert!(enemy.start_transition(EnemyStateNumber::Shooting));
    assert!(enemy.start_transition(EnemyStateNumber::Spinning));
}

// ── Cannon ────────────────────────────────────────────────────────────────────

#[test]
fn cannon_starts_as_an_invisible_left_column() {
    let cannon = make_cannon();
    assert_eq!(cannon.state_number(), Some(CannonStateNumber::Deactivated));
    assert_eq!(cannon.rect(), Rect::new(0, 0, 1, 600));
    assert!(cannon.body().is_some_and(|body| body.frame().is_none()));
}

#[test]
fn standby_is_pinned_left_and_tracks_the_target() {
    let mut cannon = make_cannon();
    let mut target = Rect::new(50, 200, 30, 30);
    cannon.update(&target);
    assert!(cannon.start_transition(CannonStateNumber::Standby));
    assert_eq!(cannon.rect().left, 0);
    assert_eq!(cannon.rect().center_y(), 215);

    for top in [40, 310, 555, 120] {
        target.top = top;
        cannon.update(&target);
        assert_eq!(cannon.rect().left, 0);
        assert_eq!(cannon.rect().center_y(), target.center_y());
    }
}

#[test]
fn cannon_transition_whitelist() {
    let mut cannon = make_cannon();
    assert!(!cannon.start_transition(CannonStateNumber::Firing));
    assert!(!cannon.start_transition(CannonStateNumber::Returning));

    assert!(cannon.start_transition(CannonStateNumber::Standby));
    assert!(!cannon.start_transition(CannonStateNumber::Returning));
    assert!(!cannon.start_transition(CannonStateNumber::Standby));

    assert!(cannon.start_transition(CannonStateNumber::Firing));
    assert!(!cannon.start_transition(CannonStateNumber::Standby));

    assert!(cannon.start_transition(CannonStateNumber::Returning));
    assert!(!cannon.start_transition(CannonStateNumber::Firing));
    assert!(cannon.start_transition(CannonStateNumber::Deactivated));
    assert_eq!(cannon.rect(), Rect::new(0, 0, 1, 600));
}

#[test]
fn fired_cannon_switches_off_past_the_right_edge() {
    let mut cannon = make_cannon();
    let target = Rect::new(50, 200, 30, 30);
    cannon.update(&target);
    assert!(cannon.start_transition(CannonStateNumber::Standby));
    assert!(cannon.start_transition(CannonStateNumber::Firing));

    let mut last_left = cannon.rect().left;
    for _ in 0..200 {
        cannon.update(&target);
        if cannon.state_number() != Some(CannonStateNumber::Firing) {
            break;
        }
        assert!(cannon.rect().left > last_left);
        last_left = cannon.rect().left;
    }
    assert_eq!(cannon.state_number(), Some(CannonStateNumber::Deactivated));
}

#[test]
fn returning_cannon_heads_west_and_switches_off() {
    let mut cannon = make_cannon();
    let target = Rect::new(50, 200, 30, 30);
    cannon.update(&target);
    assert!(cannon.start_transition(CannonStateNumber::Standby));
    assert!(cannon.start_transition(CannonStateNumber::Firing));
    for _ in 0..10 {
        cannon.update(&target);
    }
    assert!(cannon.start_transition(CannonStateNumber::Returning));
    match cannon.state() {
        Some(CannonState::Returning(flight)) => assert_eq!(flight.direction(), Direction::West),
        other => panic!("expected a returning cannon, got {other:?}"),
    }

    for _ in 0..50 {
        cannon.update(&target);
    }
    assert_eq!(cannon.state_number(), Some(CannonStateNumber::Deactivated));
}

#[test]
fn deactivate_works_from_any_state() {
    let mut cannon = make_cannon();
    assert!(cannon.start_transition(CannonStateNumber::Standby));
    assert!(cannon.start_transition(CannonStateNumber::Firing));
    cannon.deactivate();
    assert_eq!(cannon.state_number(), Some(CannonStateNumber::Deactivated));
}
