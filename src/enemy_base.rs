/// The enemy base and its three-state machine.
///
/// 1. Moving: patrols up and down the right edge of the screen.
/// 2. Spinning: sits still, spinning up, and locks onto the player.
/// 3. Shooting: flies in a straight line at the locked direction.
///
/// A moving base turns into a spinner at random (see [`MoverArgs`]); the
/// spinner fires itself after a fixed number of ticks, and a shot that
/// reaches the left, top or bottom edge goes back to patrolling.
use std::rc::Rc;

use rand::Rng;
use tracing::debug;

use crate::body::{Body, Rect};
use crate::sprite::{Animation, SpriteSheet};
use crate::statemachine::{Machine, Manager, State, Transition};
use crate::vector::{get_direction, Direction, Vector2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyStateNumber {
    Moving,
    Spinning,
    Shooting,
}

// ── Construction arguments ────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct MoverArgs {
    pub sheet: Rc<SpriteSheet>,
    /// The patrol turns south once `rect.top <= top`.
    pub top: i32,
    /// The patrol turns north once `rect.bottom >= bottom`.
    pub bottom: i32,
    pub speed: f64,
    /// Chance per tick of starting to spin.
    pub transition_probability: f64,
    pub screen_width: i32,
}

impl MoverArgs {
    /// Per-tick probability giving a mean wait of `avg_seconds` at
    /// `framerate`. A wait of zero disables spinning up.
    pub fn probability_for(avg_seconds: f64, framerate: u32) -> f64 {
        let frames = avg_seconds * framerate as f64;
        if frames > 0.0 {
            (1.0 / frames).min(1.0)
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpinnerArgs {
    pub sheet: Rc<SpriteSheet>,
    pub delay: u32,
    /// Tick (counted from the spinner's start) at which the target is sampled.
    pub targ_time: u32,
    /// Tick at which the spinner launches.
    pub shoot_time: u32,
}

#[derive(Clone, Debug)]
pub struct ShooterArgs {
    pub sheet: Rc<SpriteSheet>,
    pub delay: u32,
    pub speed: f64,
    pub screen_height: i32,
}

// ── States ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Mover {
    body: Body,
    top: i32,
    bottom: i32,
    speed: f64,
    direction: Direction,
    probability: f64,
}

impl Mover {
    pub fn new(args: &MoverArgs) -> Self {
        let mut body = args.sheet.still_body();
        body.set_top_right(args.screen_width, args.top);
        Mover {
            body,
            top: args.top,
            bottom: args.bottom,
            speed: args.speed,
            direction: Direction::South,
            probability: args.transition_probability,
        }
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<EnemyStateNumber> {
        self.body.translate(self.direction.vector() * self.speed);

        let rect = self.body.rect();
        if rect.bottom() >= self.bottom {
            self.direction = Direction::North;
        } else if rect.top <= self.top {
            self.direction = Direction::South;
        }

        if self.probability > 0.0 && rng.gen::<f64>() <= self.probability {
            return Some(EnemyStateNumber::Spinning);
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct Spinner {
    body: Body,
    animation: Animation,
    targ_time: u32,
    shoot_time: u32,
    tick: u32,
    target_direction: Option<Vector2>,
}

impl Spinner {
    pub fn new(args: &SpinnerArgs, center: Vector2) -> Self {
        let animation = Animation::new(Rc::clone(&args.sheet), args.delay);
        let body = animation.body().with_center(center);
        Spinner {
            body,
            animation,
            targ_time: args.targ_time,
            shoot_time: args.shoot_time,
            tick: 0,
            target_direction: None,
        }
    }

    pub fn ticks(&self) -> u32 {
        self.tick
    }

    /// The locked firing direction, once sampled.
    pub fn target_direction(&self) -> Option<Vector2> {
        self.target_direction
    }

    fn update(&mut self, target: &Rect) -> Option<EnemyStateNumber> {
        self.animation.tick();
        self.animation.apply(&mut self.body);

        self.tick += 1;

        let late_lock = self.tick == self.shoot_time && self.target_direction.is_none();
        if self.tick == self.targ_time || late_lock {
            let aim = get_direction(self.body.rect().center(), target.center()).normalize();
            debug!(x = aim.x, y = aim.y, "enemy base locked on");
            self.target_direction = Some(aim);
        }
        if self.tick == self.shoot_time {
            return Some(EnemyStateNumber::Shooting);
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct Shooter {
    body: Body,
    animation: Animation,
    direction: Vector2,
    speed: f64,
    screen_height: i32,
}

impl Shooter {
    pub fn new(args: &ShooterArgs, center: Vector2, direction: Vector2) -> Self {
        let animation = Animation::new(Rc::clone(&args.sheet), args.delay);
        let body = animation.body().with_center(center);
        Shooter {
            body,
            animation,
            direction,
            speed: args.speed,
            screen_height: args.screen_height,
        }
    }

    pub fn direction(&self) -> Vector2 {
        self.direction
    }

    fn update(&mut self) -> Option<EnemyStateNumber> {
        self.animation.tick();
        self.animation.apply(&mut self.body);
        self.body.translate(self.direction * self.speed);

        // No right-edge check: a shot heading that way meets the cannon or
        // the shield first.
        let rect = self.body.rect();
        if rect.left <= 0 || rect.top <= 0 || rect.bottom() >= self.screen_height {
            return Some(EnemyStateNumber::Moving);
        }
        None
    }
}

#[derive(Clone, Debug)]
pub enum EnemyState {
    Moving(Mover),
    Spinning(Spinner),
    Shooting(Shooter),
}

impl State for EnemyState {
    type Number = EnemyStateNumber;

    fn number(&self) -> EnemyStateNumber {
        match self {
            EnemyState::Moving(_) => EnemyStateNumber::Moving,
            EnemyState::Spinning(_) => EnemyStateNumber::Spinning,
            EnemyState::Shooting(_) => EnemyStateNumber::Shooting,
        }
    }

    fn body(&self) -> &Body {
        match self {
            EnemyState::Moving(s) => &s.body,
            EnemyState::Spinning(s) => &s.body,
            EnemyState::Shooting(s) => &s.body,
        }
    }
}

impl EnemyState {
    /// Whether the shield should keep tracking the base in this state.
    pub fn is_followable(&self) -> bool {
        matches!(self, EnemyState::Moving(_) | EnemyState::Spinning(_))
    }
}

// ── Machine ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EnemyBase {
    manager: Manager<EnemyState>,
    spinner_args: SpinnerArgs,
    shooter_args: ShooterArgs,
    /// The patrol to resume after a shot.
    last_mover: Mover,
}

impl EnemyBase {
    pub fn new(mover_args: MoverArgs, spinner_args: SpinnerArgs, shooter_args: ShooterArgs) -> Self {
        let mover = Mover::new(&mover_args);
        EnemyBase {
            manager: Manager::with_state(EnemyState::Moving(mover.clone())),
            spinner_args,
            shooter_args,
            last_mover: mover,
        }
    }

    /// One tick. `target` is the rect the spinner aims at.
    pub fn update<R: Rng + ?Sized>(&mut self, target: &Rect, rng: &mut R) {
        let request = self.manager.update_with(|state| match state {
            EnemyState::Moving(mover) => mover.update(rng),
            EnemyState::Spinning(spinner) => spinner.update(target),
            EnemyState::Shooting(shooter) => shooter.update(),
        });
        if let Some(next) = request {
            self.start_transition(next);
        }
    }

    /// Forces the base back onto its remembered patrol, whatever it is doing.
    pub fn resume_mover(&mut self) {
        if matches!(self.manager.state(), Some(EnemyState::Moving(_))) {
            return;
        }
        let mover = self.last_mover.clone();
        if let Some(previous) = self.manager.change_state(EnemyState::Moving(mover)) {
            self.retire(previous);
        }
    }

    pub fn is_followable(&self) -> bool {
        self.manager.state().is_some_and(EnemyState::is_followable)
    }

    pub fn state(&self) -> Option<&EnemyState> {
        self.manager.state()
    }

    pub fn rect(&self) -> Rect {
        self.manager.rect().unwrap_or_default()
    }
}

impl Machine for EnemyBase {
    type State = EnemyState;

    const NAME: &'static str = "enemy_base";

    fn manager(&self) -> &Manager<EnemyState> {
        &self.manager
    }

    fn manager_mut(&mut self) -> &mut Manager<EnemyState> {
        &mut self.manager
    }

    fn transition_to(&self, from: &EnemyState, target: EnemyStateNumber) -> Transition<EnemyState> {
        use EnemyStateNumber as N;

        let center = from.body().center();
        match (from, target) {
            (EnemyState::Moving(_), N::Spinning) | (EnemyState::Shooting(_), N::Spinning) => {
                Transition::Accepted(EnemyState::Spinning(Spinner::new(&self.spinner_args, center)))
            }
            (EnemyState::Spinning(spinner), N::Shooting) => {
                // Forced launches before lock-on fly toward the player's side.
                let direction = spinner
                    .target_direction
                    .unwrap_or_else(|| Direction::West.vector());
                Transition::Accepted(EnemyState::Shooting(Shooter::new(
                    &self.shooter_args,
                    center,
                    direction,
                )))
            }
            (EnemyState::Shooting(_), N::Moving) => {
                Transition::Accepted(EnemyState::Moving(self.last_mover.clone()))
            }
            _ => Transition::Rejected,
        }
    }

    fn retire(&mut self, previous: EnemyState) {
        if let EnemyState::Moving(mover) = previous {
            self.last_mover = mover;
        }
    }
}
