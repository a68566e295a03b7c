//! Projectiles: straight, arcing and homing shots
//!
//! A projectile checks its target list in order each tick and applies the
//! first qualifying hit only, then dies.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::collision::{circle_vs_rect, within_radius};
use super::enemy::{Enemy, EnemyKind};
use super::entity::{Body, Entity, TargetKind, TargetRef, first_free};
use super::platform::Platform;
use super::player::Player;
use super::state::SimEvent;
use super::vector::{Vector2, VectorExt, heading};
use crate::error::SimError;
use crate::tuning::{Playfield, PhysicsTuning};

/// Motion profile, fixed when the pool is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Constant direction scaled by `speed`
    Straight,
    /// Ballistic; hatches a ground enemy from `spawn_pool` when it lands on a platform
    Arcing { drift: f64, spawn_pool: Range<usize> },
    /// Steers toward the last target for `window` ticks, accelerating forever
    Homing {
        window: u64,
        /// Maximum turn per tick (radians)
        turn: f64,
        acceleration: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Entity,
    pub kind: ProjectileKind,
    pub speed: f64,
    pub power: i32,
    pub targets: Vec<TargetRef>,
}

/// Mutable view of everything a projectile can hit this tick
pub struct Targets<'a> {
    pub player: &'a mut Player,
    pub boss: &'a mut Boss,
    pub enemies: &'a mut [Enemy],
    pub platforms: &'a [Platform],
    pub playfield: &'a Playfield,
    pub events: &'a mut Vec<SimEvent>,
}

impl Projectile {
    /// Build a pool slot; an empty target list (or empty spawn pool) is rejected
    pub fn new(
        kind: ProjectileKind,
        width: f64,
        height: f64,
        targets: Vec<TargetRef>,
        physics: &PhysicsTuning,
    ) -> Result<Self, SimError> {
        if targets.is_empty() {
            return Err(SimError::EmptyTargetList);
        }
        if let ProjectileKind::Arcing { spawn_pool, .. } = &kind {
            if spawn_pool.is_empty() {
                return Err(SimError::EmptySpawnPool);
            }
        }
        Ok(Self {
            body: Entity::new(width, height, physics),
            kind,
            speed: 1.0,
            power: 1,
            targets,
        })
    }

    /// Default speed used when a launcher does not pass one
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Activate this slot
    ///
    /// Non-positive `speed` or `power` keep the slot's previous value.
    /// Straight shots head right and arcing shots start their lob; homing
    /// shots keep whatever vector the launcher sets afterwards.
    pub fn place(&mut self, position: Vector2, speed: f64, power: i32) {
        let vector = self.body.vector;
        self.body.reset_for_spawn(position, 1);
        if speed > 0.0 {
            self.speed = speed;
        }
        if power > 0 {
            self.power = power;
        }
        self.body.vector = match &self.kind {
            ProjectileKind::Straight => Vector2::new(1.0, 0.0),
            ProjectileKind::Arcing { drift, .. } => Vector2::new(-drift, self.speed),
            ProjectileKind::Homing { .. } => vector,
        };
    }

    pub fn update(&mut self, targets: &mut Targets<'_>) {
        if !self.body.is_alive() {
            return;
        }
        if targets
            .playfield
            .is_outside_expanded(self.body.position, self.body.width, self.body.height)
        {
            self.body.life = 0;
            return;
        }

        match self.kind {
            ProjectileKind::Straight => {
                self.body.translate(self.body.vector * self.speed);
            }
            ProjectileKind::Arcing { .. } => {
                self.body.vector.y += self.body.gravity;
                self.body.advance();
            }
            ProjectileKind::Homing {
                window,
                turn,
                acceleration,
            } => {
                if self.body.frame < window {
                    let aim = self.targets.last().and_then(|t| target_position(*t, targets));
                    if let Some(aim) = aim {
                        self.steer_toward(aim, turn);
                    }
                }
                self.speed += acceleration;
                self.body.translate(self.body.vector * self.speed);
                self.body.angle = heading(self.body.vector);
            }
        }

        self.resolve_hits(targets);

        if matches!(self.kind, ProjectileKind::Homing { .. }) {
            self.body.frame += 1;
        }
    }

    /// Rotate the heading by at most `turn` toward `aim`
    fn steer_toward(&mut self, aim: Vector2, turn: f64) {
        let to_target = (aim - self.body.position).normalized();
        self.body.vector = self.body.vector.normalized();
        let side = self.body.vector.cross(to_target);
        if side > 0.0 {
            self.body.vector = self.body.vector.rotated(turn);
        } else if side < 0.0 {
            self.body.vector = self.body.vector.rotated(-turn);
        }
    }

    fn resolve_hits(&mut self, targets: &mut Targets<'_>) {
        for i in 0..self.targets.len() {
            if !self.body.is_alive() {
                return;
            }
            match self.targets[i] {
                TargetRef::Player => self.hit_player(targets.player, targets.events),
                TargetRef::Boss => self.hit_boss(targets.boss, targets.events),
                TargetRef::Enemy(index) => {
                    if let Some(enemy) = targets.enemies.get_mut(index) {
                        self.hit_enemy(enemy, targets.events);
                    }
                }
                TargetRef::Platform(index) => {
                    if let Some(platform) = targets.platforms.get(index) {
                        self.hit_platform(platform, targets.enemies);
                    }
                }
            }
        }
    }

    fn hit_player(&mut self, player: &mut Player, events: &mut Vec<SimEvent>) {
        let body = &player.body;
        if !body.is_alive() {
            return;
        }
        let radius = (self.body.width + body.width) / 4.0;
        if !within_radius(self.body.position, body.position, radius) {
            return;
        }
        if player.is_damaged || player.is_entering {
            return;
        }
        player.take_damage(self.power);
        events.push(SimEvent::PlayerDamaged { damage: self.power });
        self.body.life = 0;
    }

    fn hit_boss(&mut self, boss: &mut Boss, events: &mut Vec<SimEvent>) {
        if !boss.body.is_alive() || !self.overlaps_box(&boss.body) {
            return;
        }
        boss.body.life -= self.power;
        if !boss.body.is_alive() {
            log::debug!("Boss destroyed");
            boss.body.begin_death();
            events.push(SimEvent::Killed {
                kind: TargetKind::Boss,
            });
        }
        self.body.life = 0;
    }

    fn hit_enemy(&mut self, enemy: &mut Enemy, events: &mut Vec<SimEvent>) {
        if !enemy.body.is_alive() {
            return;
        }
        match enemy.kind {
            EnemyKind::Ground { .. } => {
                let radius = (self.body.width + enemy.body.width) / 4.0;
                if !within_radius(self.body.position, enemy.body.position, radius) {
                    return;
                }
                // Any hit downs a walker, whatever life it had left
                enemy.body.life = (enemy.body.life - self.power).min(0);
                enemy.body.begin_death();
                log::debug!("Ground enemy downed at {:?}", enemy.body.position);
                events.push(SimEvent::Killed {
                    kind: TargetKind::GroundEnemy,
                });
                self.body.life = 0;
            }
            EnemyKind::Flying { .. } => {
                if !self.overlaps_box(&enemy.body) {
                    return;
                }
                enemy.body.life -= self.power;
                if !enemy.body.is_alive() {
                    enemy.body.begin_death();
                    log::debug!("Flying enemy downed at {:?}", enemy.body.position);
                    events.push(SimEvent::Killed {
                        kind: TargetKind::FlyingEnemy,
                    });
                }
                self.body.life = 0;
            }
            EnemyKind::Dust => {}
        }
    }

    fn hit_platform(&mut self, platform: &Platform, enemies: &mut [Enemy]) {
        let block = &platform.body;
        if !block.is_alive() || !self.overlaps_box(block) {
            return;
        }
        if let ProjectileKind::Arcing { spawn_pool, .. } = &self.kind {
            let x = self.body.position.x;
            if let Some(slot) = enemies.get_mut(spawn_pool.clone()) {
                match first_free(slot) {
                    Some(index) => {
                        let enemy = &mut slot[index];
                        let position = platform.resting_position(x, enemy.body.height);
                        enemy.place(position, 1);
                    }
                    None => log::trace!("No free enemy slot for a hatching shot"),
                }
            }
        }
        self.body.life = 0;
    }

    fn overlaps_box(&self, other: &Entity) -> bool {
        circle_vs_rect(
            self.body.position,
            self.body.width / 2.0,
            other.position,
            other.width,
            other.height,
        )
    }
}

impl Body for Projectile {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

fn target_position(target: TargetRef, targets: &Targets<'_>) -> Option<Vector2> {
    match target {
        TargetRef::Player => Some(targets.player.body.position),
        TargetRef::Boss => Some(targets.boss.body.position),
        TargetRef::Enemy(index) => targets.enemies.get(index).map(|e| e.body.position),
        TargetRef::Platform(index) => targets.platforms.get(index).map(|p| p.body.position),
    }
}
