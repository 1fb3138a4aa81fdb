/// The meta game-state manager.
///
/// Owns the session and the one active [`Screen`], feeds it input and ticks,
/// and performs the screen swap a tick asked for once that tick is done.
///
/// ```text
/// Title ─▶ Info ─▶ Level ─▶ DeathAnimation ─▶ Info ─▶ same Level
///                    │                    └─▶ Info (game over) ─▶ Title
///                    └─▶ WinAnimation ─▶ Info ─▶ next Level
/// ```
use std::mem;

use rand::Rng;
use tracing::info;

use crate::canvas::{Align, Canvas, Input};
use crate::config::GameConfig;
use crate::error::Result;
use crate::level::{Level, LevelOutcome};
use crate::screens::{DeathAnimation, InfoScreen, Route, Title, WinAnimation};
use crate::session::Session;
use crate::shield::Formation;

#[derive(Debug)]
pub enum Screen {
    Title(Title),
    /// The card and the screen it leads to.
    Info(InfoScreen, Box<Screen>),
    Level(Box<Level>),
    Death(DeathAnimation),
    Win(WinAnimation),
}

#[derive(Debug)]
pub struct GameManager {
    config: GameConfig,
    formation: Formation,
    session: Session,
    level_number: u32,
    screen: Screen,
}

impl GameManager {
    /// Validates the configuration and the shield layout, then shows the
    /// title screen.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let formation = config.shield.formation()?;
        let session = Session::new(config.lives.starting, config.energy.max);
        Ok(GameManager {
            config,
            formation,
            session,
            level_number: 0,
            screen: Screen::Title(Title::new()),
        })
    }

    /// Hands input to the active screen. Returns `false` when the player
    /// asked to quit.
    pub fn handle_input(&mut self, input: &Input) -> bool {
        match &mut self.screen {
            Screen::Title(title) => title.handle_input(input),
            Screen::Info(card, _) => card.handle_input(input),
            Screen::Level(level) => level.handle_input(input),
            Screen::Death(death) => death.handle_input(input),
            Screen::Win(win) => win.handle_input(input),
        }
    }

    /// Updates the active screen, then applies the route it asked for.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let route = match &mut self.screen {
            Screen::Title(title) => title.update(),
            Screen::Info(card, _) => card.update(),
            Screen::Level(level) => match level.update(&mut self.session, rng) {
                Some(LevelOutcome::PlayerKilled) => Some(Route::PlayerDied),
                Some(LevelOutcome::Cleared(_)) => Some(Route::LevelCleared),
                None => None,
            },
            Screen::Death(death) => death.update(),
            Screen::Win(win) => win.update(rng),
        };
        if let Some(route) = route {
            self.apply(route);
        }
    }

    /// One full frame: input, then update. Returns `false` on quit, in which
    /// case nothing is updated.
    pub fn tick<R: Rng + ?Sized>(&mut self, input: &Input, rng: &mut R) -> bool {
        if !self.handle_input(input) {
            return false;
        }
        self.update(rng);
        true
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let (width, height) = (self.config.screen.width, self.config.screen.height);
        match &self.screen {
            Screen::Title(title) => title.draw(canvas, width, height),
            Screen::Info(card, _) => card.draw(canvas, width, height),
            Screen::Level(level) => {
                level.draw(canvas);
                self.draw_hud(canvas);
            }
            Screen::Death(death) => {
                death.draw(canvas);
                self.draw_hud(canvas);
            }
            Screen::Win(win) => win.draw(canvas),
        }
    }

    fn draw_hud<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let width = self.config.screen.width;
        canvas.text(&format!("Score {}", self.session.score()), 10, 10, Align::Left);
        canvas.text(
            &format!(
                "Energy {}/{}  Lives {}",
                self.session.energy(),
                self.session.max_energy(),
                self.session.lives()
            ),
            width - 10,
            10,
            Align::Right,
        );
    }

    // ── Routing ───────────────────────────────────────────────────────────────

    fn apply(&mut self, route: Route) {
        let current = mem::replace(&mut self.screen, Screen::Title(Title::new()));
        self.screen = match (route, current) {
            (Route::NewGame, _) => self.new_game(),
            (Route::Proceed, Screen::Info(_, next)) => *next,
            (Route::PlayerDied, Screen::Level(level)) => {
                Screen::Death(DeathAnimation::new(level, &self.config.death_animation))
            }
            (Route::LevelCleared, Screen::Level(level)) => Screen::Win(WinAnimation::new(
                level.player().clone(),
                &self.config.win_animation,
                self.config.screen.width,
            )),
            (Route::KillPlayer, Screen::Death(death)) => self.kill_player(death.into_level()),
            (Route::NextLevel, _) => self.next_level(),
            (_, current) => current,
        };
    }

    fn new_game(&mut self) -> Screen {
        self.session = Session::new(self.config.lives.starting, self.config.energy.max);
        self.level_number = 1;
        info!(lives = self.session.lives(), "new game");
        self.announce(self.fresh_level())
    }

    /// Takes a life. The same level resumes with its shield damage intact,
    /// or the game ends.
    fn kill_player(&mut self, mut level: Box<Level>) -> Screen {
        let lives = self.session.lose_life();
        if lives == 0 {
            info!(score = self.session.score(), level = self.level_number, "game over");
            let card = InfoScreen::new(self.session.score(), None, self.level_number);
            return Screen::Info(card, Box::new(Screen::Title(Title::new())));
        }
        info!(lives, "life lost");
        level.reset_positions(&mut self.session);
        self.announce(Screen::Level(level))
    }

    fn next_level(&mut self) -> Screen {
        self.level_number += 1;
        self.session.reset_energy();
        info!(level = self.level_number, score = self.session.score(), "next level");
        self.announce(self.fresh_level())
    }

    fn fresh_level(&self) -> Screen {
        Screen::Level(Box::new(Level::new(&self.config, &self.formation)))
    }

    /// Puts the score card in front of `next`.
    fn announce(&self, next: Screen) -> Screen {
        let card = InfoScreen::new(self.session.score(), Some(self.session.lives()), self.level_number);
        Screen::Info(card, Box::new(next))
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The level being played, if a level is the active screen.
    pub fn level(&self) -> Option<&Level> {
        match &self.screen {
            Screen::Level(level) => Some(&**level),
            _ => None,
        }
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        match &mut self.screen {
            Screen::Level(level) => Some(&mut **level),
            _ => None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
