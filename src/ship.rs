/// The player's ship and the two plain movers: player bullets and the
/// enemy's homing bullet.
use std::rc::Rc;

use crate::body::{Body, Rect};
use crate::sprite::{Animation, SpriteSheet};
use crate::vector::{get_direction, round_to_45, Direction};

// ── Ship ──────────────────────────────────────────────────────────────────────

/// Eight-way ship. Blocked by the left and right edges, wraps between the
/// top and bottom edges.
#[derive(Clone, Debug)]
pub struct Ship {
    body: Body,
    animation: Animation,
    speed: f64,
    screen_width: i32,
    screen_height: i32,
}

impl Ship {
    pub fn new(sheet: Rc<SpriteSheet>, delay: u32, speed: f64, screen_width: i32, screen_height: i32) -> Self {
        let animation = Animation::new(sheet, delay);
        let mut body = animation.body();
        body.set_top_left(0, 0);
        Ship {
            body,
            animation,
            speed,
            screen_width,
            screen_height,
        }
    }

    pub fn move_in(&mut self, direction: Direction) {
        self.animation.set_facing(direction);
        self.body.translate(direction.vector() * self.speed);

        let rect = self.body.rect();
        if rect.left < 0 {
            self.body.set_left(0);
        }
        if rect.right() > self.screen_width {
            self.body.set_right(self.screen_width);
        }

        if self.body.rect().top < 0 {
            self.body.set_bottom(self.screen_height);
        }
        if self.body.rect().bottom() > self.screen_height {
            self.body.set_top(0);
        }
    }

    /// Advances the animation and shows the frame for the current facing.
    pub fn update(&mut self) {
        self.animation.tick();
        self.animation.apply(&mut self.body);
    }

    /// Rotates 45° clockwise and shows the new facing at once.
    pub fn turn_right(&mut self) {
        let facing = self.animation.facing().turn_right();
        self.set_facing(facing);
    }

    pub fn set_facing(&mut self, facing: Direction) {
        self.animation.set_facing(facing);
        self.animation.apply(&mut self.body);
    }

    pub fn facing(&self) -> Direction {
        self.animation.facing()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}

// ── Player bullet ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    body: Body,
    direction: Direction,
    speed: f64,
    screen_width: i32,
    screen_height: i32,
}

impl Bullet {
    pub fn new(sheet: &SpriteSheet, ship: &Ship, speed: f64) -> Self {
        Bullet {
            body: sheet.still_body().with_center(ship.rect().center()),
            direction: ship.facing(),
            speed,
            screen_width: ship.screen_width,
            screen_height: ship.screen_height,
        }
    }

    /// Moves one step. Returns `false` once any edge has left the screen.
    pub fn update(&mut self) -> bool {
        self.body.translate(self.direction.vector() * self.speed);

        let rect = self.body.rect();
        !(rect.left < 0
            || rect.top < 0
            || rect.right() > self.screen_width
            || rect.bottom() > self.screen_height)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

// ── Homing bullet ─────────────────────────────────────────────────────────────

/// Chases its target along the nearest compass direction.
#[derive(Clone, Debug)]
pub struct HomingBullet {
    body: Body,
    speed: f64,
}

impl HomingBullet {
    pub fn new(sheet: &SpriteSheet, speed: f64) -> Self {
        HomingBullet {
            body: sheet.still_body(),
            speed,
        }
    }

    pub fn update(&mut self, target: &Rect) {
        let heading = round_to_45(get_direction(self.body.rect().center(), target.center()));
        self.body.translate(heading.vector() * self.speed);
    }

    pub fn place_at(&mut self, rect: &Rect) {
        self.body.set_center(rect.center());
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}
