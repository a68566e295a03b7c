//! Player controller
//!
//! Input arrives as a `KeyState` snapshot per tick. The player walks on
//! platforms, jumps, fires straight shots, takes contact damage from hazards
//! and picks up healing items.

use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::entity::{Body, Entity, UpdateMode, first_dead};
use super::platform::{Item, Obstacle, Platform};
use super::projectile::Projectile;
use super::standing::{Footing, carry_of, land, resolve_standing, snap_to_surface};
use super::state::{KeyState, SimEvent};
use super::vector::Vector2;
use crate::tuning::{Playfield, PlayerTuning, Tuning};

/// Intro walk-on, driven by wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub start: Vector2,
    pub end: Vector2,
    /// Timestamp (seconds) the walk began
    pub started_at: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Entity,
    pub speed: f64,
    pub jump_power: f64,
    pub max_life: i32,
    /// Firing is allowed while this is `>= 0`
    pub shot_cooldown: i32,
    pub is_damaged: bool,
    pub damaged_at_frame: u64,
    /// Invulnerable and input-free while walking on
    pub is_entering: bool,
    pub entrance: Entrance,
}

/// Everything the player reads or writes in one update
pub struct PlayerContext<'a> {
    pub keys: &'a KeyState,
    /// Wall-clock time (seconds)
    pub now: f64,
    pub platforms: &'a [Platform],
    pub obstacles: &'a [Obstacle],
    pub enemies: &'a [Enemy],
    pub items: &'a mut [Item],
    pub shots: &'a mut [Projectile],
    pub tuning: &'a PlayerTuning,
    pub playfield: &'a Playfield,
    pub events: &'a mut Vec<SimEvent>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let player = &tuning.player;
        let start = Vector2::new(player.entrance_start.0, player.entrance_start.1);
        Self {
            body: Entity::new(player.width, player.height, &tuning.physics),
            speed: player.speed,
            jump_power: player.jump_power,
            max_life: player.max_life,
            shot_cooldown: 0,
            is_damaged: false,
            damaged_at_frame: 0,
            is_entering: false,
            entrance: Entrance {
                start,
                end: Vector2::new(player.entrance_end.0, player.entrance_end.1),
                started_at: 0.0,
            },
        }
    }

    /// Full life, cleared flags, and a fresh walk-on from `start` to `end`
    pub fn begin_entrance(&mut self, start: Vector2, end: Vector2, now: f64) {
        self.body.reset_for_spawn(start, self.max_life);
        self.shot_cooldown = 0;
        self.is_damaged = false;
        self.damaged_at_frame = 0;
        self.is_entering = true;
        self.entrance = Entrance {
            start,
            end,
            started_at: now,
        };
    }

    /// Lose `amount` life and start the invulnerability window
    pub fn take_damage(&mut self, amount: i32) {
        self.body.life -= amount;
        self.is_damaged = true;
        self.damaged_at_frame = self.body.frame;
    }

    pub fn update(&mut self, ctx: &mut PlayerContext<'_>) {
        if self.is_entering {
            self.walk_on(ctx.now, ctx.tuning.entrance_speed);
        } else {
            self.move_body(ctx.keys, ctx.platforms);
            if ctx.keys.fire {
                self.fire(ctx.tuning, ctx.shots);
            }
            self.shot_cooldown += 1;
            self.check_bumping(ctx);

            let half_width = self.body.width / 2.0;
            let pos = &mut self.body.position;
            pos.x = pos.x.max(half_width).min(ctx.playfield.width - half_width);
            pos.y = pos.y.min(ctx.playfield.height - ctx.tuning.floor_margin);
        }

        if !self.body.is_alive() {
            log::info!("Player down at {:?}", self.body.position);
            ctx.events.push(SimEvent::PlayerDied);
            self.body.begin_death();
            self.body.death_step(ctx.tuning.death_pop_speed);
        }
        self.body.frame += 1;
    }

    /// Terminal pop-and-fall after death
    pub fn update_death(&mut self, pop_speed: f64) {
        self.body.death_step(pop_speed);
        self.body.frame += 1;
    }

    fn walk_on(&mut self, now: f64, speed: f64) {
        let elapsed = now - self.entrance.started_at;
        let mut x = self.entrance.start.x + elapsed * speed;
        if x >= self.entrance.end.x {
            self.is_entering = false;
            x = self.entrance.end.x;
        }
        self.body.position.x = x;
    }

    fn move_body(&mut self, keys: &KeyState, platforms: &[Platform]) {
        resolve_standing(&mut self.body, platforms);
        let carry = carry_of(&self.body, platforms);
        let speed = self.speed;

        match Footing::of(&self.body) {
            Footing::Falling => {
                self.body.vector = Vector2::ZERO;
                snap_to_surface(&mut self.body, platforms);
            }
            Footing::StandingIdle if keys.jump => {
                self.body.is_jumping = true;
                self.body.is_standing = false;
                let run = if keys.left {
                    -speed
                } else if keys.right {
                    speed
                } else {
                    0.0
                };
                self.body.set_vector(run + carry.x, -self.jump_power);
                self.body.advance();
            }
            Footing::StandingIdle => {
                let vector = &mut self.body.vector;
                if keys.left {
                    vector.x -= speed / 8.0;
                } else if keys.right {
                    vector.x += speed / 8.0;
                } else {
                    vector.x = carry.x;
                }
                vector.y = carry.y;
                // Running speed is relative to the platform underfoot
                vector.x = carry.x + (vector.x - carry.x).max(-speed).min(speed);
                self.body.advance();
            }
            Footing::JumpFallingCheck => land(&mut self.body, platforms),
            Footing::JumpRising => {
                self.body.is_standing = false;
                self.steer_in_air(keys);
                self.body.vector.y += self.body.gravity;
                self.body.advance();
            }
            Footing::Airborne => {
                self.steer_in_air(keys);
                self.body.vector.y += self.body.gravity;
                self.body.advance();
                // Re-check after moving so a landing never sinks for a frame
                resolve_standing(&mut self.body, platforms);
                if self.body.is_standing {
                    if self.body.vector.y >= 0.0 {
                        land(&mut self.body, platforms);
                    } else {
                        self.body.is_standing = false;
                    }
                }
            }
        }
    }

    fn steer_in_air(&mut self, keys: &KeyState) {
        let speed = self.speed;
        let vx = &mut self.body.vector.x;
        if keys.left {
            if *vx > -speed {
                *vx -= speed / 64.0;
            }
        } else if keys.right && *vx < speed {
            *vx += speed / 64.0;
        }
    }

    fn fire(&mut self, tuning: &PlayerTuning, shots: &mut [Projectile]) {
        if self.shot_cooldown < 0 {
            return;
        }
        let Some(index) = first_dead(shots) else {
            log::trace!("Player shot pool exhausted");
            return;
        };
        let muzzle = self.body.position - Vector2::new(0.0, tuning.shot_offset_y);
        shots[index].place(muzzle, tuning.shot_speed, tuning.shot_power);
        self.shot_cooldown = -tuning.shot_interval;
    }

    /// Contact damage from hazards, then healing from items
    fn check_bumping(&mut self, ctx: &mut PlayerContext<'_>) {
        let tuning = ctx.tuning;
        let window_end = self.damaged_at_frame + tuning.invulnerability_ticks;
        if self.is_damaged && window_end <= self.body.frame {
            self.is_damaged = false;
        }

        if self.body.is_alive() && !self.is_damaged {
            let obstacles = ctx.obstacles.iter().map(|o| (&o.body, o.damage));
            let enemies = ctx.enemies.iter().map(|e| (&e.body, e.damage));
            let factor = tuning.hit_radius_factor;
            let hit = obstacles
                .chain(enemies)
                .find(|(hazard, _)| is_live_hazard(hazard) && self.touches(hazard, factor));
            if let Some((_, damage)) = hit {
                self.take_damage(damage);
                log::debug!("Player hit for {damage}, life {}", self.body.life);
                ctx.events.push(SimEvent::PlayerDamaged { damage });
            }
        }

        if self.body.is_alive() && self.body.life < self.max_life {
            let factor = tuning.hit_radius_factor;
            if let Some(item) = ctx
                .items
                .iter_mut()
                .find(|item| item.body.is_alive() && self.touches(&item.body, factor))
            {
                let before = self.body.life;
                self.body.life = (before + item.healing).min(tuning.heal_cap);
                item.body.life = 0;
                let amount = self.body.life - before;
                log::debug!("Player healed by {amount}");
                ctx.events.push(SimEvent::PlayerHealed { amount });
            }
        }
    }

    fn touches(&self, other: &Entity, factor: f64) -> bool {
        let radius = (self.body.width / 2.0 + other.width / 2.0) * factor;
        // Strictly inside, unlike projectile hits
        self.body.position.distance(other.position) < radius
    }
}

impl Body for Player {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

fn is_live_hazard(hazard: &Entity) -> bool {
    hazard.is_alive() && hazard.update_mode == UpdateMode::Normal
}
