//! Boss phase machine
//!
//! Invade drifts in from the right, Attacking loops a fixed cycle of aimed
//! shots, homing launches and summons, Escape drifts back out.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::entity::{Body, Entity, UpdateMode, first_dead, first_free};
use super::projectile::Projectile;
use super::state::SimEvent;
use super::vector::{Vector2, VectorExt};
use crate::tuning::{BossTuning, Playfield, Tuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossMode {
    #[default]
    Invade,
    Attacking,
    Escape,
}

/// What the attack cycle does on a given frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttackPhase {
    Aimed,
    Homing,
    Summon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub body: Entity,
    pub mode: BossMode,
    pub speed: f64,
    /// Enemy pool slots the boss may summon into
    pub summon_pool: Range<usize>,
}

/// Pools and targets the boss acts on
pub struct BossContext<'a> {
    /// Position the aimed shots track
    pub target: Vector2,
    pub shots: &'a mut [Projectile],
    pub homing: &'a mut [Projectile],
    pub enemies: &'a mut [Enemy],
    pub tuning: &'a BossTuning,
    pub playfield: &'a Playfield,
    pub events: &'a mut Vec<SimEvent>,
}

impl Boss {
    pub fn new(tuning: &Tuning, summon_pool: Range<usize>) -> Self {
        let (width, height) = tuning.boss.size;
        Self {
            body: Entity::new(width, height, &tuning.physics),
            mode: BossMode::Invade,
            speed: tuning.boss.speed,
            summon_pool,
        }
    }

    pub fn place(&mut self, position: Vector2, life: i32) {
        self.body.reset_for_spawn(position, life);
        self.mode = BossMode::Invade;
    }

    pub fn set_mode(&mut self, mode: BossMode) {
        self.mode = mode;
    }

    pub fn update(&mut self, ctx: &mut BossContext<'_>) {
        if !self.body.is_alive() {
            return;
        }

        match self.mode {
            BossMode::Invade => {
                self.body.set_vector(-self.speed, 0.0);
                self.body.advance();
                if self.body.position.x < ctx.tuning.invade_stop_x {
                    self.body.vector = Vector2::ZERO;
                    self.mode = BossMode::Attacking;
                    log::info!("Boss attacking at x={:.1}", self.body.position.x);
                    ctx.events.push(SimEvent::BossAttacking);
                }
            }
            BossMode::Escape => {
                self.body.set_vector(self.speed, 0.0);
                self.body.advance();
                if self.body.position.x > ctx.playfield.width + self.body.width {
                    self.body.life = 0;
                    log::info!("Boss escaped");
                    ctx.events.push(SimEvent::BossEscaped);
                }
            }
            BossMode::Attacking => self.attack(ctx),
        }
        self.body.frame += 1;
    }

    fn attack(&mut self, ctx: &mut BossContext<'_>) {
        let tuning = ctx.tuning;
        let frame = self.body.frame;
        match attack_phase(frame, tuning) {
            AttackPhase::Aimed => {
                if frame % tuning.aimed_window_cycle > tuning.aimed_window_start
                    && frame % tuning.aimed_interval == 0
                {
                    self.fire_aimed(ctx.target, tuning, ctx.shots);
                }
            }
            AttackPhase::Homing => {
                if frame % tuning.homing_interval == 0 {
                    self.fire_homing(tuning, ctx.homing);
                }
            }
            AttackPhase::Summon => {
                if frame % tuning.summon_interval == 0 {
                    self.summon(tuning, ctx.playfield, ctx.enemies);
                }
            }
        }
    }

    fn muzzle(&self, tuning: &BossTuning) -> Vector2 {
        self.body.position + Vector2::new(tuning.muzzle_offset.0, tuning.muzzle_offset.1)
    }

    fn fire_aimed(&self, target: Vector2, tuning: &BossTuning, shots: &mut [Projectile]) {
        let Some(index) = first_dead(shots) else {
            log::trace!("Boss shot pool exhausted");
            return;
        };
        let offset = Vector2::new(tuning.aim_offset.0, tuning.aim_offset.1);
        let direction = (target - self.body.position + offset).normalized();
        let shot = &mut shots[index];
        shot.place(self.muzzle(tuning), tuning.aimed_shot_speed, tuning.aimed_shot_power);
        shot.body.vector = direction;
    }

    fn fire_homing(&self, tuning: &BossTuning, homing: &mut [Projectile]) {
        let Some(index) = first_dead(homing) else {
            log::trace!("Homing pool exhausted");
            return;
        };
        let shot = &mut homing[index];
        shot.place(self.muzzle(tuning), tuning.homing_launch_speed, 0);
        shot.body.set_vector(-1.0, 0.0);
    }

    fn summon(&self, tuning: &BossTuning, playfield: &Playfield, enemies: &mut [Enemy]) {
        let Some(pool) = enemies.get_mut(self.summon_pool.clone()) else {
            return;
        };
        let Some(index) = first_free(pool) else {
            log::trace!("No free slot to summon into");
            return;
        };
        let enemy = &mut pool[index];
        let x = playfield.width + enemy.body.width;
        let y = playfield.height - tuning.summon_clearance - enemy.body.height / 2.0;
        enemy.place(Vector2::new(x, y), 1);
    }

    /// Same exit as enemies: the slot is reusable once it leaves the playfield
    pub fn update_death(&mut self, pop_speed: f64, exit_y: f64, exit_left: f64) {
        if self.body.position.y > exit_y || self.body.position.x < exit_left {
            self.body.update_mode = UpdateMode::Normal;
            return;
        }
        self.body.death_step(pop_speed);
        self.body.frame += 1;
    }
}

impl Body for Boss {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

fn attack_phase(frame: u64, tuning: &BossTuning) -> AttackPhase {
    if frame % tuning.cycle_ticks < tuning.aimed_phase_ticks {
        AttackPhase::Aimed
    } else if frame % tuning.secondary_cycle < tuning.secondary_threshold {
        AttackPhase::Homing
    } else {
        AttackPhase::Summon
    }
}
