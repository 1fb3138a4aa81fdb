/// One level: the actors, the per-tick update order and the collision rules.
///
/// Each tick the ship moves on input, every actor updates once, and then
/// [`Level::resolve_collisions`] walks the rule groups in a fixed order,
/// paying out score and energy through the [`Session`] and pushing the
/// enemy and cannon machines between states. A rule that kills the player
/// or destroys the base ends the tick's resolution.
use std::rc::Rc;

use rand::Rng;
use tracing::info;

use crate::body::{collide, Rect};
use crate::cannon::{Cannon, CannonArgs, CannonStateNumber};
use crate::canvas::{draw_body, Canvas, Input};
use crate::config::{EnergyConfig, GameConfig, ScoringConfig};
use crate::enemy_base::{EnemyBase, EnemyStateNumber, MoverArgs, ShooterArgs, SpinnerArgs};
use crate::ion_field::{IonField, ION_PALETTE};
use crate::session::Session;
use crate::shield::{CellPos, Formation, Shield, ShieldArgs, Strike};
use crate::ship::{Bullet, HomingBullet, Ship};
use crate::sprite::SpriteSheet;
use crate::statemachine::Machine;
use crate::vector::Direction;

/// How a level tick ended, when it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    PlayerKilled,
    /// The firing cannon hit the base while it was in this state.
    Cleared(EnemyStateNumber),
}

/// Numbers the collision rules need.
#[derive(Clone, Debug)]
struct Rules {
    scoring: ScoringConfig,
    energy: EnergyConfig,
    cannon_cost: u32,
    bounceback: i32,
    bullet_speed: f64,
    max_player_bullets: usize,
    start_left: i32,
    screen_height: i32,
}

#[derive(Debug)]
pub struct Level {
    player: Ship,
    enemy: EnemyBase,
    shield: Shield,
    homer: HomingBullet,
    cannon: Cannon,
    bullets: Vec<Bullet>,
    ion_field: Option<IonField>,
    bullet_sheet: Rc<SpriteSheet>,
    rules: Rules,
}

impl Level {
    pub fn new(config: &GameConfig, formation: &Formation) -> Self {
        let screen = &config.screen;

        let player = Ship::new(
            config.player.sprite.sheet(),
            config.player.animation_delay,
            config.player.speed,
            screen.width,
            screen.height,
        );

        let enemy = EnemyBase::new(
            MoverArgs {
                sheet: config.mover.sprite.sheet(),
                top: config.mover.top,
                bottom: config.mover.bottom,
                speed: config.mover.speed,
                transition_probability: MoverArgs::probability_for(
                    config.mover.avg_transition_secs,
                    screen.max_framerate,
                ),
                screen_width: screen.width,
            },
            SpinnerArgs {
                sheet: config.spinner.sprite.sheet(),
                delay: config.spinner.animation_delay,
                targ_time: config.spinner.targ_time,
                shoot_time: config.spinner.shoot_time,
            },
            ShooterArgs {
                sheet: config.shooter.sprite.sheet(),
                delay: config.shooter.animation_delay,
                speed: config.shooter.speed,
                screen_height: screen.height,
            },
        );

        let shield = Shield::new(
            formation,
            &ShieldArgs {
                sheet: config.shield.sprite.sheet(),
                eat_delay: config.shield.frames_to_eat,
                mark_ticks: config.shield.mark_ticks,
            },
            &enemy.rect(),
        );

        let homer = HomingBullet::new(&config.homer.sprite.sheet(), config.homer.speed);

        let cannon = Cannon::new(CannonArgs {
            standby_sheet: config.cannon.standby_sprite.sheet(),
            firing_sheet: config.cannon.firing_sprite.sheet(),
            speed: config.cannon.speed,
            screen_width: screen.width,
            screen_height: screen.height,
        });

        let field = &config.ion_field;
        let ion_field = field.enabled.then(|| {
            IonField::new(
                Rect::new(field.left, field.top, field.width, field.height),
                field.noise_width,
                field.noise_height,
                field.delay,
            )
        });

        let mut level = Level {
            player,
            enemy,
            shield,
            homer,
            cannon,
            bullets: Vec::new(),
            ion_field,
            bullet_sheet: config.bullet.sprite.sheet(),
            rules: Rules {
                scoring: config.scoring.clone(),
                energy: config.energy.clone(),
                cannon_cost: config.cannon.energy_cost,
                bounceback: config.shield.bounceback,
                bullet_speed: config.bullet.speed,
                max_player_bullets: config.bullet.max_player_bullets,
                start_left: config.player.start_left,
                screen_height: screen.height,
            },
        };
        level.place_actors();
        level
    }

    // ── Per-tick flow ─────────────────────────────────────────────────────────

    /// Applies decoded input. Returns `false` when the player asked to quit.
    pub fn handle_input(&mut self, input: &Input) -> bool {
        if input.quit {
            return false;
        }
        if let Some(direction) = input.direction {
            self.player.move_in(direction);
        }
        if input.action {
            self.shoot();
        }
        true
    }

    /// Updates every actor once, in order, then resolves collisions.
    pub fn update<R: Rng + ?Sized>(&mut self, session: &mut Session, rng: &mut R) -> Option<LevelOutcome> {
        self.player.update();
        let target = self.player.rect();

        self.enemy.update(&target, rng);
        self.shield.update(&self.enemy.rect(), self.enemy.is_followable());
        self.homer.update(&target);
        self.cannon.update(&target);
        self.bullets.retain_mut(Bullet::update);
        if let Some(field) = self.ion_field.as_mut() {
            field.update(rng);
        }

        self.resolve_collisions(session)
    }

    /// Fires the cannon if it is parked, otherwise a bullet if the cap
    /// allows.
    pub fn shoot(&mut self) {
        if self.cannon.start_transition(CannonStateNumber::Firing) {
            return;
        }
        if self.bullets.len() < self.rules.max_player_bullets {
            self.bullets
                .push(Bullet::new(&self.bullet_sheet, &self.player, self.rules.bullet_speed));
        }
    }

    /// Puts everything back at its starting place for a new life: the ship
    /// at the left facing south with no energy, the base on patrol, the
    /// cannon off and the homing bullet on the base. Shield damage and
    /// score are kept.
    pub fn reset_positions(&mut self, session: &mut Session) {
        session.reset_energy();
        self.place_actors();
    }

    fn place_actors(&mut self) {
        let mid = self.rules.screen_height / 2;
        self.player.body_mut().set_mid_left(self.rules.start_left, mid);
        self.player.set_facing(Direction::South);
        self.enemy.resume_mover();
        self.cannon.deactivate();
        self.homer.place_at(&self.enemy.rect());
        self.bullets.clear();
    }

    // ── Collision rules ───────────────────────────────────────────────────────

    pub fn resolve_collisions(&mut self, session: &mut Session) -> Option<LevelOutcome> {
        let scoring = &self.rules.scoring;
        let energy = &self.rules.energy;

        // ship ↔ homing bullet
        if collide(self.player.body(), self.homer.body()) {
            return Some(kill_player());
        }

        // ship ↔ enemy base: feeding off a patrolling base, dying to an
        // armed one.
        if let Some(enemy) = self.enemy.body() {
            if collide(self.player.body(), enemy) {
                match self.enemy.state_number() {
                    Some(EnemyStateNumber::Moving) => session.give_energy(energy.from_enemy),
                    Some(EnemyStateNumber::Spinning | EnemyStateNumber::Shooting) => {
                        return Some(kill_player());
                    }
                    None => {}
                }
            }
        }

        // ship ↔ shield: bounce off the centermost cell; a second bump on a
        // marked cell eats it.
        if let Some(pos) = self.centermost_cell() {
            if let Some(cell) = self.shield.get(pos) {
                let left = cell.rect().left;
                self.player.body_mut().set_right(left - self.rules.bounceback);
            }
            if self.shield.strike(pos) == Strike::Eaten {
                session.give_energy(energy.from_cell);
                session.add_score(scoring.cell_eat);
            }
        }

        // ship ↔ cannon
        if let Some(cannon) = self.cannon.body() {
            if collide(self.player.body(), cannon) {
                match self.cannon.state_number() {
                    Some(CannonStateNumber::Deactivated) => {
                        if session.spend_energy(self.rules.cannon_cost) {
                            self.cannon.start_transition(CannonStateNumber::Standby);
                        }
                    }
                    Some(CannonStateNumber::Firing) => return Some(kill_player()),
                    Some(CannonStateNumber::Returning) => {
                        self.cannon.start_transition(CannonStateNumber::Deactivated);
                        session.give_energy(energy.from_cannon);
                    }
                    Some(CannonStateNumber::Standby) | None => {}
                }
            }
        }

        // firing cannon ↔ shield: one cell goes, the cannon bounces back.
        if self.cannon.state_number() == Some(CannonStateNumber::Firing) {
            let hit = self
                .cannon
                .body()
                .and_then(|cannon| self.shield.first_colliding(cannon));
            if let Some(pos) = hit {
                self.shield.remove(pos);
                session.add_score(scoring.cell_shoot);
                self.cannon.start_transition(CannonStateNumber::Returning);
            }
        }

        // firing cannon ↔ enemy base: the level is won.
        if self.cannon.state_number() == Some(CannonStateNumber::Firing) {
            let hit = match (self.cannon.body(), self.enemy.body()) {
                (Some(cannon), Some(enemy)) => collide(cannon, enemy),
                _ => false,
            };
            if let Some(state) = self.enemy.state_number().filter(|_| hit) {
                match state {
                    EnemyStateNumber::Moving => session.add_score(scoring.mover_destroy),
                    EnemyStateNumber::Spinning => session.add_score(scoring.spinner_destroy),
                    EnemyStateNumber::Shooting => {
                        session.add_score(scoring.shooter_destroy);
                        session.give_life();
                    }
                }
                info!(enemy = ?state, score = session.score(), "level cleared");
                return Some(LevelOutcome::Cleared(state));
            }
        }

        // player bullets ↔ shield: each bullet that hits takes out a cross
        // of cells around the first cell it touches.
        let shield = &mut self.shield;
        self.bullets.retain(|bullet| match shield.first_colliding(bullet.body()) {
            Some(pos) => {
                session.add_score(scoring.cell_shoot);
                shield.remove_cross(pos);
                false
            }
            None => true,
        });

        None
    }

    /// The colliding cell whose vertical center is closest to the ship's;
    /// the first in row-major order wins ties.
    fn centermost_cell(&self) -> Option<CellPos> {
        let ship_y = self.player.rect().center_y();
        self.shield
            .colliding(self.player.body())
            .into_iter()
            .filter_map(|pos| self.shield.get(pos))
            .min_by_key(|cell| (cell.rect().center_y() - ship_y).abs())
            .map(|cell| cell.pos())
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        if let Some(field) = &self.ion_field {
            for (rect, colour) in field.blocks() {
                canvas.fill(rect, ION_PALETTE[colour as usize]);
            }
        }
        if let Some(enemy) = self.enemy.body() {
            draw_body(canvas, enemy);
        }
        for cell in self.shield.cells() {
            draw_body(canvas, cell.body());
        }
        draw_body(canvas, self.player.body());
        draw_body(canvas, self.homer.body());
        if let Some(cannon) = self.cannon.body() {
            draw_body(canvas, cannon);
        }
        for bullet in &self.bullets {
            draw_body(canvas, bullet.body());
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn player(&self) -> &Ship {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Ship {
        &mut self.player
    }

    pub fn enemy(&self) -> &EnemyBase {
        &self.enemy
    }

    pub fn enemy_mut(&mut self) -> &mut EnemyBase {
        &mut self.enemy
    }

    pub fn shield(&self) -> &Shield {
        &self.shield
    }

    pub fn shield_mut(&mut self) -> &mut Shield {
        &mut self.shield
    }

    pub fn homer(&self) -> &HomingBullet {
        &self.homer
    }

    pub fn cannon(&self) -> &Cannon {
        &self.cannon
    }

    pub fn cannon_mut(&mut self) -> &mut Cannon {
        &mut self.cannon
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn ion_field(&self) -> Option<&IonField> {
        self.ion_field.as_ref()
    }
}

fn kill_player() -> LevelOutcome {
    info!("player killed");
    LevelOutcome::PlayerKilled
}
