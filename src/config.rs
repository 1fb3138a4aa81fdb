/// Game configuration, loadable from TOML.
///
/// Every section and field has a default, so a config file only needs the
/// values it changes. The defaults are the tuned values of the original
/// game: an 800x600 playfield at 60 frames per second.
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::shield::Formation;
use crate::sprite::SpriteSheet;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub mover: MoverConfig,
    pub spinner: SpinnerConfig,
    pub shooter: ShooterConfig,
    pub shield: ShieldConfig,
    pub homer: HomerConfig,
    pub bullet: BulletConfig,
    pub cannon: CannonConfig,
    pub scoring: ScoringConfig,
    pub energy: EnergyConfig,
    pub lives: LivesConfig,
    pub ion_field: IonFieldConfig,
    pub death_animation: DeathAnimationConfig,
    pub win_animation: WinAnimationConfig,
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values the game cannot run with. Formation problems are
    /// reported separately by [`ShieldConfig::formation`].
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, what: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidConfig(what.to_string()))
            }
        }

        check(self.screen.width > 0 && self.screen.height > 0, "screen size must be positive")?;
        check(self.screen.max_framerate > 0, "screen.max_framerate must be positive")?;
        for (name, sprite) in [
            ("player", &self.player.sprite),
            ("mover", &self.mover.sprite),
            ("spinner", &self.spinner.sprite),
            ("shooter", &self.shooter.sprite),
            ("shield", &self.shield.sprite),
            ("homer", &self.homer.sprite),
            ("bullet", &self.bullet.sprite),
            ("cannon standby", &self.cannon.standby_sprite),
            ("cannon firing", &self.cannon.firing_sprite),
        ] {
            check(
                sprite.width > 0 && sprite.height > 0 && sprite.frames > 0,
                &format!("{name} sprite needs a positive size and at least one frame"),
            )?;
        }
        check(self.mover.top < self.mover.bottom, "mover.top must be above mover.bottom")?;
        check(
            self.player.speed >= 0.0
                && self.mover.speed >= 0.0
                && self.shooter.speed >= 0.0
                && self.homer.speed >= 0.0
                && self.bullet.speed >= 0.0
                && self.cannon.speed >= 0.0,
            "speeds must not be negative",
        )?;
        check(self.mover.avg_transition_secs >= 0.0, "mover.avg_transition_secs must not be negative")?;
        check(self.spinner.shoot_time > 0, "spinner.shoot_time must be positive")?;
        check(self.death_animation.delay > 0, "death_animation.delay must be positive")?;
        check(self.lives.starting > 0, "lives.starting must be positive")?;
        Ok(())
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// A sprite sheet description. The core only needs the frame size and
/// layout; `file` is handed to the presentation layer untouched.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpriteConfig {
    pub file: String,
    pub width: usize,
    pub height: usize,
    pub rows: usize,
    pub frames: usize,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        SpriteConfig::new("", 10, 10, 1, 1)
    }
}

impl SpriteConfig {
    pub fn new(file: &str, width: usize, height: usize, rows: usize, frames: usize) -> Self {
        SpriteConfig {
            file: file.to_string(),
            width,
            height,
            rows,
            frames,
        }
    }

    pub fn sheet(&self) -> Rc<SpriteSheet> {
        Rc::new(SpriteSheet::solid(&self.file, self.width, self.height, self.rows, self.frames))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: i32,
    pub height: i32,
    pub max_framerate: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            width: 800,
            height: 600,
            max_framerate: 60,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Eight rows, one per facing, clockwise from north.
    pub sprite: SpriteConfig,
    pub animation_delay: u32,
    pub speed: f64,
    /// Distance of the ship's left edge from the screen edge at spawn.
    pub start_left: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            sprite: SpriteConfig::new("graphics/ship.png", 30, 30, 8, 2),
            animation_delay: 10,
            speed: 5.0,
            start_left: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoverConfig {
    pub sprite: SpriteConfig,
    pub top: i32,
    pub bottom: i32,
    pub speed: f64,
    /// Mean time spent patrolling before spinning up; 0 never spins.
    pub avg_transition_secs: f64,
}

impl Default for MoverConfig {
    fn default() -> Self {
        MoverConfig {
            sprite: SpriteConfig::new("graphics/mover_base.png", 30, 30, 1, 1),
            top: 150,
            bottom: 450,
            speed: 2.0,
            avg_transition_secs: 6.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpinnerConfig {
    pub sprite: SpriteConfig,
    pub animation_delay: u32,
    pub targ_time: u32,
    pub shoot_time: u32,
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        SpinnerConfig {
            sprite: SpriteConfig::new("graphics/spinner.png", 30, 30, 1, 4),
            animation_delay: 5,
            targ_time: 29,
            shoot_time: 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShooterConfig {
    pub sprite: SpriteConfig,
    pub animation_delay: u32,
    pub speed: f64,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        ShooterConfig {
            sprite: SpriteConfig::new("graphics/shooter.png", 30, 30, 1, 4),
            animation_delay: 3,
            speed: 2.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShieldConfig {
    pub sprite: SpriteConfig,
    /// Rows of `0` (empty) and `1` (cell).
    pub formation: Vec<Vec<u8>>,
    /// `[row, col]` of the formation cell pinned to the base's top-left.
    pub anchor: [usize; 2],
    /// Pixels the ship is pushed west of a cell it bumps into.
    pub bounceback: i32,
    /// Cooldown after eating a cell.
    pub frames_to_eat: u32,
    /// How long a bumped cell stays marked.
    pub mark_ticks: u32,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        ShieldConfig {
            sprite: SpriteConfig::new("graphics/cell.png", 10, 10, 1, 1),
            formation: vec![
                vec![0, 0, 0, 1, 1, 1, 1],
                vec![0, 0, 1, 1, 1, 1, 1],
                vec![0, 1, 1, 1, 1, 1, 1],
                vec![1, 1, 1, 1, 1, 1, 1],
                vec![1, 1, 1, 1, 0, 0, 0],
                vec![1, 1, 1, 1, 0, 0, 0],
                vec![1, 1, 1, 1, 0, 0, 0],
                vec![1, 1, 1, 1, 1, 1, 1],
                vec![0, 1, 1, 1, 1, 1, 1],
                vec![0, 0, 1, 1, 1, 1, 1],
                vec![0, 0, 0, 1, 1, 1, 1],
            ],
            anchor: [4, 4],
            bounceback: 15,
            frames_to_eat: 15,
            mark_ticks: 10,
        }
    }
}

impl ShieldConfig {
    pub fn formation(&self) -> Result<Formation> {
        Formation::from_layout(&self.formation, (self.anchor[0], self.anchor[1]))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HomerConfig {
    pub sprite: SpriteConfig,
    pub speed: f64,
}

impl Default for HomerConfig {
    fn default() -> Self {
        HomerConfig {
            sprite: SpriteConfig::new("graphics/homer.png", 6, 6, 1, 1),
            speed: 2.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BulletConfig {
    pub sprite: SpriteConfig,
    pub speed: f64,
    pub max_player_bullets: usize,
}

impl Default for BulletConfig {
    fn default() -> Self {
        BulletConfig {
            sprite: SpriteConfig::new("graphics/bullet.png", 4, 4, 1, 1),
            speed: 8.0,
            max_player_bullets: 1,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CannonConfig {
    pub standby_sprite: SpriteConfig,
    pub firing_sprite: SpriteConfig,
    pub speed: f64,
    /// Energy the ship pays to bring the cannon out.
    pub energy_cost: u32,
}

impl Default for CannonConfig {
    fn default() -> Self {
        CannonConfig {
            standby_sprite: SpriteConfig::new("graphics/cannon.png", 10, 10, 1, 1),
            firing_sprite: SpriteConfig::new("graphics/cannon.png", 10, 10, 1, 1),
            speed: 9.0,
            energy_cost: 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub cell_eat: u32,
    pub cell_shoot: u32,
    pub mover_destroy: u32,
    pub spinner_destroy: u32,
    pub shooter_destroy: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            cell_eat: 69,
            cell_shoot: 69,
            mover_destroy: 1000,
            spinner_destroy: 2000,
            shooter_destroy: 6000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnergyConfig {
    pub max: u32,
    /// Per tick of touching the patrolling base.
    pub from_enemy: u32,
    pub from_cell: u32,
    /// For catching the returning cannon.
    pub from_cannon: u32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        EnergyConfig {
            max: 100,
            from_enemy: 1,
            from_cell: 10,
            from_cannon: 20,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LivesConfig {
    pub starting: u32,
}

impl Default for LivesConfig {
    fn default() -> Self {
        LivesConfig { starting: 4 }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct IonFieldConfig {
    pub enabled: bool,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub noise_width: i32,
    pub noise_height: i32,
    pub delay: u32,
}

impl Default for IonFieldConfig {
    fn default() -> Self {
        IonFieldConfig {
            enabled: true,
            left: 340,
            top: 0,
            width: 80,
            height: 600,
            noise_width: 4,
            noise_height: 2,
            delay: 3,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeathAnimationConfig {
    /// Ticks between the ship's 45° turns.
    pub delay: u32,
    pub total_runtime: u32,
}

impl Default for DeathAnimationConfig {
    fn default() -> Self {
        DeathAnimationConfig {
            delay: 4,
            total_runtime: 64,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WinAnimationConfig {
    pub height: i32,
    pub shrink_rate: i32,
    pub total_runtime: u32,
    pub noise_width: i32,
    pub noise_height: i32,
    pub delay: u32,
}

impl Default for WinAnimationConfig {
    fn default() -> Self {
        WinAnimationConfig {
            height: 240,
            shrink_rate: 4,
            total_runtime: 90,
            noise_width: 8,
            noise_height: 4,
            delay: 2,
        }
    }
}
