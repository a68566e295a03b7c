//! Game balance and tunables
//!
//! Every section is `#[serde(default)]`, so a JSON file only needs to list
//! the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::sim::Vector2;

/// Playfield bounds (the canvas the renderer draws into)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    /// True once a box centred at `position` has fully left the playfield,
    /// using a margin of one extra box size on every side
    pub fn is_outside_expanded(&self, position: Vector2, width: f64, height: f64) -> bool {
        position.x + width < 0.0
            || position.x - width > self.width
            || position.y + height < 0.0
            || position.y - height > self.height
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f64,
    pub foot_left_offset: f64,
    pub foot_right_offset: f64,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            foot_left_offset: FOOT_LEFT_OFFSET,
            foot_right_offset: FOOT_RIGHT_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f64,
    pub height: f64,
    pub max_life: i32,
    /// Horizontal speed (pixels per tick)
    pub speed: f64,
    /// Initial upward speed of a jump
    pub jump_power: f64,
    /// Ticks between shots
    pub shot_interval: i32,
    pub shot_power: i32,
    pub shot_speed: f64,
    /// Shots leave this far above the body centre
    pub shot_offset_y: f64,
    pub invulnerability_ticks: u64,
    /// Contact radius is this fraction of the summed half-widths
    pub hit_radius_factor: f64,
    /// The body centre never goes lower than `height - floor_margin`
    pub floor_margin: f64,
    /// Entrance walk speed (pixels per second of wall-clock time)
    pub entrance_speed: f64,
    /// Healing never raises life above this
    pub heal_cap: i32,
    pub death_pop_speed: f64,
    pub entrance_start: (f64, f64),
    pub entrance_end: (f64, f64),
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 64.0,
            max_life: 3,
            speed: 5.5,
            jump_power: 19.0,
            shot_interval: 20,
            shot_power: 2,
            shot_speed: 16.0,
            shot_offset_y: 10.0,
            invulnerability_ticks: INVULNERABILITY_TICKS,
            hit_radius_factor: 0.8,
            floor_margin: 52.0,
            entrance_speed: 50.0,
            heal_cap: 3,
            death_pop_speed: DEATH_POP_SPEED,
            entrance_start: (0.0, PLAYFIELD_HEIGHT - 54.0),
            entrance_end: (100.0, PLAYFIELD_HEIGHT - 54.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub ground_size: (f64, f64),
    pub flying_size: (f64, f64),
    pub dust_size: (f64, f64),
    pub ground_speed: f64,
    pub ground_jump_power: f64,
    /// Upper bound (exclusive) of the random hop period
    pub ground_jump_period: u64,
    pub contact_damage: i32,
    pub flying_drift: f64,
    pub flying_amplitude: f64,
    /// Sine phase advances by `frame / flying_bob_divisor`
    pub flying_bob_divisor: f64,
    pub flying_fire_interval: u64,
    pub flying_shot_power: i32,
    pub flying_life: i32,
    pub death_pop_speed: f64,
    /// Death sequence ends once the body is this far below the playfield
    pub death_exit_below: f64,
    pub death_exit_left: f64,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            ground_size: (64.0, 64.0),
            flying_size: (64.0, 153.0),
            dust_size: (64.0, 64.0),
            ground_speed: 4.0,
            ground_jump_power: 19.0,
            ground_jump_period: 300,
            contact_damage: 1,
            flying_drift: 4.5,
            flying_amplitude: 5.0,
            flying_bob_divisor: 10.0,
            flying_fire_interval: 50,
            flying_shot_power: 1,
            flying_life: 10,
            death_pop_speed: DEATH_POP_SPEED,
            death_exit_below: 70.0,
            death_exit_left: -64.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub size: (f64, f64),
    pub speed: f64,
    /// Invade ends once the boss is left of this x
    pub invade_stop_x: f64,
    pub cycle_ticks: u64,
    /// Ticks `[0, aimed_phase_ticks)` of each cycle are the aimed-shot phase
    pub aimed_phase_ticks: u64,
    /// The remaining ticks split by `frame % secondary_cycle < secondary_threshold`
    pub secondary_cycle: u64,
    pub secondary_threshold: u64,
    pub aimed_window_cycle: u64,
    pub aimed_window_start: u64,
    pub aimed_interval: u64,
    pub aim_offset: (f64, f64),
    pub muzzle_offset: (f64, f64),
    pub aimed_shot_speed: f64,
    pub aimed_shot_power: i32,
    pub homing_interval: u64,
    pub homing_launch_speed: f64,
    pub summon_interval: u64,
    pub summon_clearance: f64,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            size: (250.0, 340.0),
            speed: 2.0,
            invade_stop_x: 900.0,
            cycle_ticks: 3000,
            aimed_phase_ticks: 1000,
            secondary_cycle: 1500,
            secondary_threshold: 1000,
            aimed_window_cycle: 200,
            aimed_window_start: 100,
            aimed_interval: 30,
            aim_offset: (100.0, 20.0),
            muzzle_offset: (-100.0, -20.0),
            aimed_shot_speed: 10.0,
            aimed_shot_power: 1,
            homing_interval: 150,
            homing_launch_speed: 5.0,
            summon_interval: 30,
            summon_clearance: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub size: (f64, f64),
    pub arcing_drift: f64,
    pub arcing_launch_speed: f64,
    pub homing_window: u64,
    /// Maximum turn per tick (degrees)
    pub homing_turn_degrees: f64,
    pub homing_acceleration: f64,
    pub homing_power: i32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            size: (32.0, 32.0),
            arcing_drift: 4.5,
            arcing_launch_speed: 5.0,
            homing_window: 100,
            homing_turn_degrees: 1.0,
            homing_acceleration: 0.1,
            homing_power: 1,
        }
    }
}

/// Sizes of the platform-borne bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTuning {
    pub size: (f64, f64),
    /// The ground spans this many playfield widths
    pub ground_width_factor: f64,
    pub ground_height: f64,
    pub obstacle_size: (f64, f64),
    pub item_size: (f64, f64),
}

impl Default for PlatformTuning {
    fn default() -> Self {
        Self {
            size: (200.0, 30.0),
            ground_width_factor: 2.0,
            ground_height: 20.0,
            obstacle_size: (32.0, 32.0),
            item_size: (32.0, 32.0),
        }
    }
}

/// Fixed pool capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSizes {
    pub player_shots: usize,
    pub boss_shots: usize,
    pub arcing_shots: usize,
    pub homing_shots: usize,
    /// Moving platforms; one ground slot is always appended after these
    pub platforms: usize,
    pub obstacles: usize,
    pub items: usize,
    pub ground_enemies: usize,
    pub flying_enemies: usize,
    pub dust_enemies: usize,
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            player_shots: 10,
            boss_shots: 30,
            arcing_shots: 20,
            homing_shots: 50,
            platforms: 20,
            obstacles: 40,
            items: 10,
            ground_enemies: 30,
            flying_enemies: 10,
            dust_enemies: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield: Playfield,
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub boss: BossTuning,
    pub projectile: ProjectileTuning,
    pub platform: PlatformTuning,
    pub pools: PoolSizes,
    /// Seed for the ground-enemy hop RNG
    pub seed: u64,
}

impl Tuning {
    /// Parse tuning from JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning (seed {})", tuning.seed);
        Ok(tuning)
    }

    /// Death sequences end once a body's centre passes below this y
    pub fn death_exit_y(&self) -> f64 {
        self.playfield.height + self.enemy.death_exit_below
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player": { "speed": 7.0 }, "seed": 9 }"#).unwrap();
        assert_eq!(tuning.player.speed, 7.0);
        assert_eq!(tuning.player.jump_power, 19.0);
        assert_eq!(tuning.seed, 9);
        assert_eq!(tuning.playfield, Playfield::default());
        assert_eq!(tuning.pools.homing_shots, 50);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::InvalidTuning(_)));
    }

    #[test]
    fn test_expanded_bounds() {
        let field = Playfield::default();
        assert!(!field.is_outside_expanded(Vector2::new(-20.0, 100.0), 32.0, 32.0));
        assert!(field.is_outside_expanded(Vector2::new(-40.0, 100.0), 32.0, 32.0));
        assert!(field.is_outside_expanded(Vector2::new(500.0, 520.0), 32.0, 32.0));
    }
}
