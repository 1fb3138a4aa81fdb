/// The player's cannon, the only weapon that can destroy the enemy base.
///
/// 1. Deactivated: invisible; a one-pixel column down the left edge that
///    the player touches to buy the cannon with energy.
/// 2. Standby: parked on the left edge, tracking the player's height.
/// 3. Firing: crosses the screen eastward.
/// 4. Returning: bounced off the shield, heading back west.
///
/// Both flights switch themselves off once they leave the screen.
use std::rc::Rc;

use crate::body::{Body, Mask, Rect};
use crate::sprite::SpriteSheet;
use crate::statemachine::{Machine, Manager, State, Transition};
use crate::vector::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CannonStateNumber {
    Deactivated,
    Standby,
    Firing,
    Returning,
}

#[derive(Clone, Debug)]
pub struct CannonArgs {
    pub standby_sheet: Rc<SpriteSheet>,
    pub firing_sheet: Rc<SpriteSheet>,
    pub speed: f64,
    pub screen_width: i32,
    pub screen_height: i32,
}

// ── States ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Deactivated {
    body: Body,
}

impl Deactivated {
    fn new(screen_height: i32) -> Self {
        let mask = Rc::new(Mask::filled(1, screen_height.max(0) as usize));
        let mut body = Body::new(mask, None);
        body.set_top_left(0, 0);
        Deactivated { body }
    }
}

#[derive(Clone, Debug)]
pub struct Standby {
    body: Body,
}

impl Standby {
    fn new(sheet: &SpriteSheet, center_y: f64) -> Self {
        let mut body = sheet.still_body();
        body.set_left(0);
        body.set_center_y(center_y);
        Standby { body }
    }

    fn update(&mut self, target: &Rect) {
        self.body.set_left(0);
        self.body.set_center_y(target.center_y() as f64);
    }
}

/// A cannon in flight, either way.
#[derive(Clone, Debug)]
pub struct Flight {
    body: Body,
    direction: Direction,
    speed: f64,
    screen_width: i32,
}

impl Flight {
    fn new(args: &CannonArgs, from: &Body, direction: Direction) -> Self {
        let body = args.firing_sheet.still_body().with_center(from.center());
        Flight {
            body,
            direction,
            speed: args.speed,
            screen_width: args.screen_width,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn update(&mut self) -> Option<CannonStateNumber> {
        self.body.translate(self.direction.vector() * self.speed);

        let rect = self.body.rect();
        if rect.left < 0 || rect.right() >= self.screen_width {
            return Some(CannonStateNumber::Deactivated);
        }
        None
    }
}

#[derive(Clone, Debug)]
pub enum CannonState {
    Deactivated(Deactivated),
    Standby(Standby),
    Firing(Flight),
    Returning(Flight),
}

impl State for CannonState {
    type Number = CannonStateNumber;

    fn number(&self) -> CannonStateNumber {
        match self {
            CannonState::Deactivated(_) => CannonStateNumber::Deactivated,
            CannonState::Standby(_) => CannonStateNumber::Standby,
            CannonState::Firing(_) => CannonStateNumber::Firing,
            CannonState::Returning(_) => CannonStateNumber::Returning,
        }
    }

    fn body(&self) -> &Body {
        match self {
            CannonState::Deactivated(s) => &s.body,
            CannonState::Standby(s) => &s.body,
            CannonState::Firing(s) | CannonState::Returning(s) => &s.body,
        }
    }
}

// ── Machine ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Cannon {
    manager: Manager<CannonState>,
    args: CannonArgs,
    /// Vertical center of the followed target as of the last update.
    target_y: f64,
}

impl Cannon {
    pub fn new(args: CannonArgs) -> Self {
        let manager = Manager::with_state(CannonState::Deactivated(Deactivated::new(args.screen_height)));
        Cannon {
            manager,
            target_y: args.screen_height as f64 / 2.0,
            args,
        }
    }

    /// One tick. `target` is the rect a parked cannon follows.
    pub fn update(&mut self, target: &Rect) {
        self.target_y = target.center_y() as f64;

        let request = self.manager.update_with(|state| match state {
            CannonState::Deactivated(_) => None,
            CannonState::Standby(standby) => {
                standby.update(target);
                None
            }
            CannonState::Firing(flight) | CannonState::Returning(flight) => flight.update(),
        });
        if let Some(next) = request {
            self.start_transition(next);
        }
    }

    /// Switches the cannon off regardless of its state.
    pub fn deactivate(&mut self) {
        self.manager
            .change_state(CannonState::Deactivated(Deactivated::new(self.args.screen_height)));
    }

    pub fn state(&self) -> Option<&CannonState> {
        self.manager.state()
    }

    pub fn rect(&self) -> Rect {
        self.manager.rect().unwrap_or_default()
    }
}

impl Machine for Cannon {
    type State = CannonState;

    const NAME: &'static str = "cannon";

    fn manager(&self) -> &Manager<CannonState> {
        &self.manager
    }

    fn manager_mut(&mut self) -> &mut Manager<CannonState> {
        &mut self.manager
    }

    fn transition_to(&self, from: &CannonState, target: CannonStateNumber) -> Transition<CannonState> {
        use CannonStateNumber as N;

        let deactivated = || CannonState::Deactivated(Deactivated::new(self.args.screen_height));

        match (from, target) {
            (CannonState::Deactivated(_), N::Standby) => Transition::Accepted(CannonState::Standby(
                Standby::new(&self.args.standby_sheet, self.target_y),
            )),
            (CannonState::Standby(_), N::Deactivated)
            | (CannonState::Firing(_), N::Deactivated)
            | (CannonState::Returning(_), N::Deactivated) => Transition::Accepted(deactivated()),
            (CannonState::Standby(standby), N::Firing) => Transition::Accepted(CannonState::Firing(
                Flight::new(&self.args, &standby.body, Direction::East),
            )),
            (CannonState::Firing(flight), N::Returning) => Transition::Accepted(
                CannonState::Returning(Flight::new(&self.args, &flight.body, Direction::West)),
            ),
            _ => Transition::Rejected,
        }
    }
}
