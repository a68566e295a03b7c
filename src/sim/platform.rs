//! Platforms and the bodies that ride on them
//!
//! Obstacles and items keep the index of the platform they sit on and
//! move by that platform's vector each tick.

use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity};
use super::vector::Vector2;
use crate::tuning::PhysicsTuning;

/// Platform behaviour, fixed at placement time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Drifts by its vector and dies once fully past the left edge
    #[default]
    Moving,
    /// Static floor
    Ground,
}

/// Back-reference from a platform to something placed on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attachment {
    Obstacle(usize),
    Item(usize),
}

/// A block entity the player and walkers can stand on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub body: Entity,
    pub kind: PlatformKind,
    /// Lookup only: the obstacle and item pools own these slots
    pub attachments: Vec<Attachment>,
}

impl Platform {
    pub fn new(width: f64, height: f64, physics: &PhysicsTuning) -> Self {
        Self {
            body: Entity::new(width, height, physics),
            kind: PlatformKind::Moving,
            attachments: Vec::new(),
        }
    }

    /// Activate this slot at `position` with its drift vector
    pub fn place(&mut self, position: Vector2, kind: PlatformKind, vector: Vector2) {
        self.body.reset_for_spawn(position, 1);
        self.body.vector = vector;
        self.kind = kind;
        self.attachments.clear();
    }

    pub fn update(&mut self) {
        if !self.body.is_alive() {
            return;
        }
        match self.kind {
            PlatformKind::Moving => {
                self.body.advance();
                if self.body.position.x + self.body.width < 0.0 {
                    self.body.life = 0;
                }
            }
            PlatformKind::Ground => {}
        }
        self.body.frame += 1;
    }

    /// Centre position for a body of `height` resting on top at `x`
    pub fn resting_position(&self, x: f64, height: f64) -> Vector2 {
        Vector2::new(x, self.body.top() - height / 2.0)
    }

    /// Drift applied to whatever rides this platform
    pub fn carry_vector(&self) -> Vector2 {
        self.body.vector
    }
}

impl Body for Platform {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

/// Contact-damage body riding a platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub body: Entity,
    pub platform: usize,
    pub damage: i32,
}

impl Obstacle {
    pub fn new(width: f64, height: f64, physics: &PhysicsTuning) -> Self {
        Self {
            body: Entity::new(width, height, physics),
            platform: 0,
            damage: 1,
        }
    }

    pub fn place(&mut self, position: Vector2, platform: usize, damage: i32) {
        self.body.reset_for_spawn(position, 1);
        self.platform = platform;
        self.damage = damage;
    }

    pub fn update(&mut self, platforms: &[Platform]) {
        if !self.body.is_alive() {
            return;
        }
        let carry = platforms
            .get(self.platform)
            .map(Platform::carry_vector)
            .unwrap_or(Vector2::ZERO);
        self.body.translate(carry);
        if self.body.position.x + self.body.width < 0.0 {
            self.body.life = 0;
        }
        self.body.frame += 1;
    }
}

impl Body for Obstacle {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

/// How an item moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemMotion {
    /// Rides the platform at this index
    RidesPlatform(usize),
    /// Drifts on its own vector
    Free,
}

/// Heal-on-contact pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub body: Entity,
    pub motion: ItemMotion,
    pub healing: i32,
}

impl Item {
    pub fn new(width: f64, height: f64, physics: &PhysicsTuning) -> Self {
        Self {
            body: Entity::new(width, height, physics),
            motion: ItemMotion::Free,
            healing: 1,
        }
    }

    pub fn place(&mut self, position: Vector2, motion: ItemMotion, healing: i32) {
        self.body.reset_for_spawn(position, 1);
        self.motion = motion;
        self.healing = healing;
    }

    pub fn update(&mut self, platforms: &[Platform]) {
        if !self.body.is_alive() {
            return;
        }
        match self.motion {
            ItemMotion::RidesPlatform(index) => {
                let carry = platforms
                    .get(index)
                    .map(Platform::carry_vector)
                    .unwrap_or(Vector2::ZERO);
                self.body.translate(carry);
            }
            ItemMotion::Free => self.body.advance(),
        }
        if self.body.position.x + self.body.width < 0.0 {
            self.body.life = 0;
        }
        self.body.frame += 1;
    }
}

impl Body for Item {
    fn body(&self) -> &Entity {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Entity {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> PhysicsTuning {
        PhysicsTuning::default()
    }

    #[test]
    fn test_moving_platform_dies_past_left_edge() {
        let mut platform = Platform::new(200.0, 30.0, &physics());
        platform.place(Vector2::new(-195.0, 300.0), PlatformKind::Moving, Vector2::new(-3.0, 0.0));
        platform.update();
        assert!(platform.body.is_alive());
        platform.update();
        assert!(!platform.body.is_alive());
    }

    #[test]
    fn test_ground_platform_is_static() {
        let mut ground = Platform::new(2000.0, 20.0, &physics());
        ground.place(Vector2::new(500.0, 470.0), PlatformKind::Ground, Vector2::ZERO);
        for _ in 0..10 {
            ground.update();
        }
        assert_eq!(ground.body.position, Vector2::new(500.0, 470.0));
        assert!(ground.body.is_alive());
    }

    #[test]
    fn test_obstacle_rides_platform() {
        let mut platform = Platform::new(200.0, 30.0, &physics());
        platform.place(Vector2::new(500.0, 300.0), PlatformKind::Moving, Vector2::new(-3.0, 0.0));
        let mut obstacle = Obstacle::new(32.0, 32.0, &physics());
        obstacle.place(platform.resting_position(520.0, 32.0), 0, 1);
        assert_eq!(obstacle.body.position.y, 269.0);

        let platforms = vec![platform];
        obstacle.update(&platforms);
        assert_eq!(obstacle.body.position.x, 517.0);
    }

    #[test]
    fn test_item_rides_its_platform_not_its_vector() {
        let still = Platform::new(200.0, 30.0, &physics());
        let mut platform = Platform::new(200.0, 30.0, &physics());
        platform.place(Vector2::new(500.0, 300.0), PlatformKind::Moving, Vector2::new(-3.0, 0.0));
        let mut item = Item::new(32.0, 32.0, &physics());
        item.place(platform.resting_position(480.0, 32.0), ItemMotion::RidesPlatform(1), 1);
        item.body.set_vector(-10.0, 0.0);

        let platforms = vec![still, platform];
        item.update(&platforms);
        item.update(&platforms);
        assert_eq!(item.body.position, Vector2::new(474.0, 269.0));
        assert!(item.body.is_alive());
    }

    #[test]
    fn test_free_item_uses_own_vector() {
        let mut item = Item::new(32.0, 32.0, &physics());
        item.place(Vector2::new(100.0, 100.0), ItemMotion::Free, 1);
        item.body.set_vector(-5.0, 0.0);
        item.update(&[]);
        assert_eq!(item.body.position.x, 95.0);
    }
}
