//! Fields and operations shared by every simulated body
//!
//! All bodies live in fixed pools owned by the `World`. Cross references
//! between bodies are pool indices, never owning pointers.

use serde::{Deserialize, Serialize};

use super::vector::Vector2;
use crate::tuning::PhysicsTuning;

/// Which behaviour runs for a body this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateMode {
    #[default]
    Normal,
    /// Terminal "pop up then fall" exit motion after death
    DeathSequence,
}

/// The horizontal segment a body stands on, relative to its centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootSpan {
    pub left: f64,
    pub right: f64,
}

impl FootSpan {
    pub fn from_tuning(physics: &PhysicsTuning) -> Self {
        Self {
            left: physics.foot_left_offset,
            right: physics.foot_right_offset,
        }
    }
}

/// A simulated body: axis-aligned box centred at `position`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub position: Vector2,
    /// Displacement applied per tick
    pub vector: Vector2,
    /// Heading in radians (steered projectiles, rotated sprites)
    pub angle: f64,
    pub width: f64,
    pub height: f64,
    /// Hit points; `<= 0` means dead and reusable
    pub life: i32,
    pub frame: u64,
    pub previous_frame: u64,
    pub update_mode: UpdateMode,
    pub gravity: f64,
    pub is_jumping: bool,
    pub is_standing: bool,
    /// Index into the platform pool
    pub standing_on: Option<usize>,
    pub foot: FootSpan,
    /// Set on the first tick of a death sequence
    pub death_started: bool,
}

impl Entity {
    pub fn new(width: f64, height: f64, physics: &PhysicsTuning) -> Self {
        Self {
            position: Vector2::ZERO,
            vector: Vector2::ZERO,
            angle: 270.0_f64.to_radians(),
            width,
            height,
            life: 0,
            frame: 0,
            previous_frame: 0,
            update_mode: UpdateMode::Normal,
            gravity: physics.gravity,
            is_jumping: false,
            is_standing: true,
            standing_on: None,
            foot: FootSpan::from_tuning(physics),
            death_started: false,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Dead and not mid death-sequence, so a spawner may claim it
    #[inline]
    pub fn is_free(&self) -> bool {
        self.life <= 0 && self.update_mode == UpdateMode::Normal
    }

    pub fn set_vector(&mut self, x: f64, y: f64) {
        self.vector = Vector2::new(x, y);
    }

    /// Displace by an arbitrary vector (e.g. a carrying platform's drift)
    #[inline]
    pub fn translate(&mut self, by: Vector2) {
        self.position += by;
    }

    /// Displace by the body's own vector
    #[inline]
    pub fn advance(&mut self) {
        self.position += self.vector;
    }

    /// Reset per-life state when a pool slot is reactivated
    pub fn reset_for_spawn(&mut self, position: Vector2, life: i32) {
        self.position = position;
        self.life = life;
        self.frame = 0;
        self.previous_frame = 0;
        self.is_jumping = false;
        self.is_standing = true;
        self.standing_on = None;
        self.death_started = false;
        self.update_mode = UpdateMode::Normal;
        self.vector = Vector2::ZERO;
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.position.y - self.height / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.position.y + self.height / 2.0
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.position.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.position.x + self.width / 2.0
    }

    /// Endpoints of the foot segment along the bottom edge
    pub fn foot_segment(&self) -> (Vector2, Vector2) {
        let y = self.bottom();
        (
            Vector2::new(self.position.x - self.foot.left, y),
            Vector2::new(self.position.x + self.foot.right, y),
        )
    }

    /// Put the body's bottom edge on `surface`'s top edge
    pub fn snap_onto(&mut self, surface: &Entity) {
        self.position.y = surface.top() - self.height / 2.0;
    }

    /// One step of the death exit: pop upward on the first tick, then fall
    pub fn death_step(&mut self, pop_speed: f64) {
        if !self.death_started {
            self.set_vector(0.0, -pop_speed);
            self.death_started = true;
        } else {
            self.vector.y += self.gravity;
        }
        self.advance();
    }

    /// Enter the death sequence (idempotent)
    pub fn begin_death(&mut self) {
        if self.update_mode != UpdateMode::DeathSequence {
            self.update_mode = UpdateMode::DeathSequence;
            self.death_started = false;
        }
    }
}

/// Anything that can report its shared body
pub trait Body {
    fn body(&self) -> &Entity;
    fn body_mut(&mut self) -> &mut Entity;
}

/// Index of the first claimable slot in a pool
pub fn first_free<T: Body>(pool: &[T]) -> Option<usize> {
    pool.iter().position(|slot| slot.body().is_free())
}

/// Index of the first dead slot, regardless of update mode
pub fn first_dead<T: Body>(pool: &[T]) -> Option<usize> {
    pool.iter().position(|slot| !slot.body().is_alive())
}

/// A body another body checks itself against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    Player,
    Boss,
    Enemy(usize),
    Platform(usize),
}

/// Scoring category reported when a target dies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    GroundEnemy,
    FlyingEnemy,
    Boss,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Entity {
        Entity::new(64.0, 64.0, &PhysicsTuning::default())
    }

    #[test]
    fn test_new_entity_is_dead_and_free() {
        let e = body();
        assert!(!e.is_alive());
        assert!(e.is_free());
    }

    #[test]
    fn test_foot_segment_on_bottom_edge() {
        let mut e = body();
        e.position = Vector2::new(100.0, 200.0);
        let (f1, f2) = e.foot_segment();
        assert_eq!(f1, Vector2::new(76.0, 232.0));
        assert_eq!(f2, Vector2::new(115.0, 232.0));
    }

    #[test]
    fn test_death_step_pops_then_falls() {
        let mut e = body();
        e.position = Vector2::new(0.0, 100.0);
        e.begin_death();
        e.death_step(10.0);
        assert_eq!(e.position.y, 90.0);
        e.death_step(10.0);
        assert!((e.vector.y - (-8.8)).abs() < 1e-9);
        assert_eq!(e.update_mode, UpdateMode::DeathSequence);
        assert!(!e.is_free());
    }

    #[test]
    fn test_reset_for_spawn_clears_flags() {
        let mut e = body();
        e.begin_death();
        e.is_jumping = true;
        e.frame = 42;
        e.reset_for_spawn(Vector2::new(5.0, 6.0), 1);
        assert!(e.is_alive());
        assert_eq!(e.update_mode, UpdateMode::Normal);
        assert_eq!(e.frame, 0);
        assert!(!e.is_jumping);
    }
}
