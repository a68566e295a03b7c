//! Ground, flying and dust enemies

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, UpdateMode, first_dead};
use super::platform::Platform;
use super::projectile::Projectile;
use super::standing::{Footing, carry_of, land, resolve_standing, snap_to_surface};
use super::vector::Vector2;
use crate::tuning::{EnemyTuning, PhysicsTuning, Playfield};

/// Motion profile, carried by the pool slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Walks left on platforms and hops at random
    Ground {
        speed: f64,
        jump_power: f64,
        /// Hop period is drawn from `[0, hop_period)` every resting tick
        hop_period: u64,
    },
    /// Bobs along a sine path and drops arcing shots
    Flying {
        drift: f64,
        amplitude: f64,
        bob_divisor: f64,
        fire_interval: u64,
        shot_power: i32,
    },
    /// Flies on its own vector, touching nothing
    Dust,
}

impl EnemyKind {
    pub fn ground(tuning: &EnemyTuning) -> Self {
        EnemyKind::Ground {
            speed: tuning.ground_speed,
            jump_power: tuning.ground_jump_power,
            hop_period: tuning.ground_jump_period,
        }
    }

    pub fn flying(tuning: &EnemyTuning) -> Self {
        EnemyKind::Flying {
            drift: tuning.flying_drift,
            amplitude: tuning.flying_amplitude,
            bob_divisor: tuning.flying_bob_divisor,
            fire_interval: tuning.flying_fire_interval,
            shot_power: tuning.flying_shot_power,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Entity,
    pub kind: EnemyKind,
    /// Contact damage dealt to the player
    pub damage: i32,
}

/// Shared state an enemy reads or writes during its update
pub struct EnemyContext<'a> {
    pub platforms: &'a [Platform],
    /// Arcing shot pool used by flyers
    pub shots: &'a mut [Projectile],
    pub rng: &'a mut Pcg32,
    pub playfield: &'a Playfield,
}

impl Enemy {
    pub fn new(kind: EnemyKind, size: (f64, f64), damage: i32, physics: &PhysicsTuning) -> Self {
        Self {
            body: Entity::new(size.0, size.1, physics),
            kind,
            damage,
        }
    }

    /// Activate this slot; dust keeps moving along `body.vector`, set it after placing
    pub fn place(&mut self, position: Vector2, life: i32) {
        self.body.reset_for_spawn(position, life);
    }

    pub fn update(&mut self, ctx: &mut EnemyContext<'_>) {
        if !self.body.is_alive() {
            return;
        }
        let pos = self.body.position;
        if pos.x + self.body.width < 0.0 || pos.y - self.body.height > ctx.playfield.height {
            self.body.life = 0;
            return;
        }

        match self.kind {
            EnemyKind::Ground {
                speed,
                jump_power,
                hop_period,
            } => self.walk(speed, jump_power, hop_period, ctx),
            EnemyKind::Flying {
                drift,
                amplitude,
                bob_divisor,
                fire_interval,
                shot_power,
            } => {
                let phase = self.body.frame as f64 / bob_divisor;
                self.body.set_vector(-drift, phase.sin() * amplitude);
                self.body.advance();
                if fire_interval > 0 && self.body.frame % fire_interval == 0 {
                    self.drop_shot(shot_power, ctx.shots);
                }
            }
            EnemyKind::Dust => self.body.advance(),
        }
        self.body.frame += 1;
    }

    fn walk(&mut self, speed: f64, jump_power: f64, hop_period: u64, ctx: &mut EnemyContext<'_>) {
        let platforms = ctx.platforms;
        resolve_standing(&mut self.body, platforms);
        let carry = carry_of(&self.body, platforms);

        match Footing::of(&self.body) {
            Footing::Falling => {
                self.body.vector = Vector2::ZERO;
                snap_to_surface(&mut self.body, platforms);
            }
            Footing::StandingIdle => {
                if should_hop(self.body.frame, hop_period, ctx.rng) {
                    self.body.is_jumping = true;
                    self.body.is_standing = false;
                    self.body.set_vector(-speed + carry.x, -jump_power);
                } else {
                    self.body.set_vector(-speed + carry.x, carry.y);
                }
                self.body.advance();
            }
            Footing::JumpFallingCheck => land(&mut self.body, platforms),
            Footing::JumpRising => {
                self.body.vector.y += self.body.gravity;
                self.body.advance();
            }
            Footing::Airborne => {
                self.body.vector.y += self.body.gravity;
                self.body.advance();
                // Re-check right away so a landing never sinks for a frame
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

    fn drop_shot(&self, power: i32, shots: &mut [Projectile]) {
        let Some(index) = first_dead(shots) else {
            log::trace!("Arcing shot pool exhausted");
            return;
        };
        let position = self.body.position;
        let muzzle = Vector2::new(position.x, position.y + self.body.height / 2.0);
        shots[index].place(muzzle, 0.0, power);
    }

    /// Pop-and-fall exit; hands the slot back once it is off the playfield
    pub fn update_death(&mut self, tuning: &EnemyTuning, exit_y: f64) {
        if self.body.position.y > exit_y || self.body.position.x < tuning.death_exit_left {
            self.body.update_mode = UpdateMode::Normal;
            return;
        }
        self.body.death_step(tuning.death_pop_speed);
        self.body.frame += 1;
    }
}

impl Body for Enemy {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

/// Random hop rule: a period `p` is drawn from `[0, hop_period)` and the
/// walker hops when `p != 0` and the frame is a multiple of it
fn should_hop(frame: u64, hop_period: u64, rng: &mut Pcg32) -> bool {
    if hop_period == 0 {
        return false;
    }
    let p = rng.random_range(0..hop_period);
    p != 0 && frame % p == 0
}
