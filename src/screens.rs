/// The top-level screens that are not a level: title, info card and the two
/// end-of-life / end-of-level animations.
///
/// Screens never switch themselves. Each `update` returns the [`Route`] it
/// wants and the game manager performs the swap once the tick is over.
use rand::Rng;

use crate::body::Rect;
use crate::canvas::{draw_body, Align, Canvas, Input};
use crate::config::{DeathAnimationConfig, WinAnimationConfig};
use crate::ion_field::{IonField, ShrinkingIonField, ION_PALETTE};
use crate::level::Level;
use crate::ship::Ship;

/// A change of top-level screen requested during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Start a fresh session at level one.
    NewGame,
    /// Leave the info card for the screen it announces.
    Proceed,
    /// The level reported the player dead; play the death animation.
    PlayerDied,
    /// The level reported the base destroyed; play the win animation.
    LevelCleared,
    /// The death animation is over; take a life.
    KillPlayer,
    /// The win animation is over; build the next level.
    NextLevel,
}

// ── Title ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Title {
    start: bool,
}

impl Title {
    pub fn new() -> Self {
        Title::default()
    }

    pub fn handle_input(&mut self, input: &Input) -> bool {
        if input.quit {
            return false;
        }
        self.start |= input.action;
        true
    }

    pub fn update(&mut self) -> Option<Route> {
        self.start.then_some(Route::NewGame)
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, width: i32, height: i32) {
        canvas.text("YARS' REVENGE", width / 2, height / 3, Align::Center);
        canvas.text("Press SPACE to start", width / 2, height / 2, Align::Center);
    }
}

// ── Info card ─────────────────────────────────────────────────────────────────

/// Shown between lives and levels, and once more after game over.
#[derive(Clone, Debug)]
pub struct InfoScreen {
    score: u32,
    /// `None` once the game is over.
    lives: Option<u32>,
    level_number: u32,
    proceed: bool,
}

impl InfoScreen {
    pub fn new(score: u32, lives: Option<u32>, level_number: u32) -> Self {
        InfoScreen {
            score,
            lives,
            level_number,
            proceed: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> Option<u32> {
        self.lives
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn handle_input(&mut self, input: &Input) -> bool {
        if input.quit {
            return false;
        }
        self.proceed |= input.action;
        true
    }

    pub fn update(&mut self) -> Option<Route> {
        self.proceed.then_some(Route::Proceed)
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, width: i32, height: i32) {
        let x = width / 2;
        let y = height / 3;
        canvas.text(&format!("Score: {}", self.score), x, y, Align::Center);
        match self.lives {
            Some(lives) => {
                canvas.text(&format!("Lives: {lives}"), x, y + 40, Align::Center);
                canvas.text(&format!("Level {}", self.level_number), x, y + 80, Align::Center);
            }
            None => canvas.text("GAME OVER", x, y + 40, Align::Center),
        }
        canvas.text("Press SPACE to continue", x, height * 2 / 3, Align::Center);
    }
}

// ── Death animation ───────────────────────────────────────────────────────────

/// The ship spins in place while the rest of the level stays frozen.
#[derive(Debug)]
pub struct DeathAnimation {
    level: Box<Level>,
    delay: u32,
    total_runtime: u32,
    tick: u32,
}

impl DeathAnimation {
    pub fn new(level: Box<Level>, config: &DeathAnimationConfig) -> Self {
        DeathAnimation {
            level,
            delay: config.delay.max(1),
            total_runtime: config.total_runtime,
            tick: 0,
        }
    }

    pub fn handle_input(&mut self, input: &Input) -> bool {
        !input.quit
    }

    pub fn update(&mut self) -> Option<Route> {
        self.tick += 1;
        if self.tick >= self.total_runtime {
            return Some(Route::KillPlayer);
        }
        if self.tick % self.delay == 0 {
            self.level.player_mut().turn_right();
        }
        None
    }

    pub fn ticks(&self) -> u32 {
        self.tick
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Hands the frozen level back for a restart.
    pub fn into_level(self) -> Box<Level> {
        self.level
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        self.level.draw(canvas);
    }
}

// ── Win animation ─────────────────────────────────────────────────────────────

/// A full-width band of ion noise centred on the ship that collapses onto it.
#[derive(Debug)]
pub struct WinAnimation {
    ship: Ship,
    field: ShrinkingIonField,
    total_runtime: u32,
    tick: u32,
}

impl WinAnimation {
    pub fn new(ship: Ship, config: &WinAnimationConfig, screen_width: i32) -> Self {
        let center_y = ship.rect().center_y();
        let area = Rect::new(0, center_y - config.height / 2, screen_width, config.height);
        let field = IonField::new(area, config.noise_width, config.noise_height, config.delay);
        WinAnimation {
            ship,
            field: ShrinkingIonField::new(field, config.shrink_rate),
            total_runtime: config.total_runtime,
            tick: 0,
        }
    }

    pub fn handle_input(&mut self, input: &Input) -> bool {
        !input.quit
    }

    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Route> {
        self.tick += 1;
        self.field.update(rng);
        (self.field.is_collapsed() || self.tick >= self.total_runtime).then_some(Route::NextLevel)
    }

    pub fn ticks(&self) -> u32 {
        self.tick
    }

    pub fn field(&self) -> &ShrinkingIonField {
        &self.field
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for (rect, colour) in self.field.field().blocks() {
            canvas.fill(rect, ION_PALETTE[colour as usize]);
        }
        draw_body(canvas, self.ship.body());
    }
}
