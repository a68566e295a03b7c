//! World state and core simulation types
//!
//! Every body lives in a fixed pool allocated by `World::new`. Spawning writes
//! into a free slot; nothing is allocated or freed while the game runs.

use std::ops::Range;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, BossMode};
use super::enemy::{Enemy, EnemyKind};
use super::entity::{Body, TargetKind, TargetRef, UpdateMode, first_free};
use super::platform::{Attachment, Item, ItemMotion, Obstacle, Platform, PlatformKind};
use super::player::Player;
use super::projectile::{Projectile, ProjectileKind};
use super::vector::Vector2;
use crate::error::SimError;
use crate::tuning::Tuning;

/// Logical keys the player reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Jump,
    Fire,
}

/// Held state of every logical key, polled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
}

impl KeyState {
    pub fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Jump => self.jump = held,
            Key::Fire => self.fire = held,
        }
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: KeyState,
    /// Monotonic wall-clock time (seconds) for timestamp-driven effects
    pub now: f64,
    /// Observed only while the player is in its death sequence
    pub restart: bool,
}

/// Things collaborators react to (score, scene changes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A target died to a projectile; scoring is up to the listener
    Killed { kind: TargetKind },
    PlayerDamaged { damage: i32 },
    PlayerHealed { amount: i32 },
    PlayerDied,
    BossAttacking,
    BossEscaped,
    Restarted,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Moving platform slots, then the ground slot last
    pub platforms: Vec<Platform>,
    pub obstacles: Vec<Obstacle>,
    pub items: Vec<Item>,
    pub player_shots: Vec<Projectile>,
    pub boss_shots: Vec<Projectile>,
    pub arcing_shots: Vec<Projectile>,
    pub homing_shots: Vec<Projectile>,
    pub player: Player,
    pub boss: Boss,
    /// Ground slots, then flying slots, then dust slots
    pub enemies: Vec<Enemy>,
    /// Events raised during the last tick
    pub events: Vec<SimEvent>,
    pub(crate) rng: Pcg32,
    ground_enemies: Range<usize>,
    flying_enemies: Range<usize>,
    dust_enemies: Range<usize>,
}

impl World {
    /// Allocate every pool and place the ground
    pub fn new(tuning: Tuning) -> Result<Self, SimError> {
        let pools = &tuning.pools;
        require(pools.player_shots, "player_shots")?;
        require(pools.boss_shots, "boss_shots")?;
        require(pools.arcing_shots, "arcing_shots")?;
        require(pools.homing_shots, "homing_shots")?;
        require(pools.ground_enemies, "ground_enemies")?;

        let physics = &tuning.physics;
        let ground_enemies = 0..pools.ground_enemies;
        let flying_enemies = ground_enemies.end..ground_enemies.end + pools.flying_enemies;
        let dust_enemies = flying_enemies.end..flying_enemies.end + pools.dust_enemies;

        let mut enemies = Vec::with_capacity(dust_enemies.end);
        let ground_kind = EnemyKind::ground(&tuning.enemy);
        let flying_kind = EnemyKind::flying(&tuning.enemy);
        let damage = tuning.enemy.contact_damage;
        let sizes = &tuning.enemy;
        enemies.extend(
            ground_enemies
                .clone()
                .map(|_| Enemy::new(ground_kind, sizes.ground_size, damage, physics)),
        );
        enemies.extend(
            flying_enemies
                .clone()
                .map(|_| Enemy::new(flying_kind, sizes.flying_size, damage, physics)),
        );
        enemies.extend(
            dust_enemies
                .clone()
                .map(|_| Enemy::new(EnemyKind::Dust, sizes.dust_size, damage, physics)),
        );

        let (block_w, block_h) = tuning.platform.size;
        let mut platforms: Vec<Platform> = (0..pools.platforms)
            .map(|_| Platform::new(block_w, block_h, physics))
            .collect();
        platforms.push(Platform::new(
            tuning.playfield.width * tuning.platform.ground_width_factor,
            tuning.platform.ground_height,
            physics,
        ));

        let (obstacle_w, obstacle_h) = tuning.platform.obstacle_size;
        let obstacles = (0..pools.obstacles)
            .map(|_| Obstacle::new(obstacle_w, obstacle_h, physics))
            .collect();
        let (item_w, item_h) = tuning.platform.item_size;
        let items = (0..pools.items).map(|_| Item::new(item_w, item_h, physics)).collect();

        // Target lists, in check order
        let platform_refs = (0..platforms.len()).map(TargetRef::Platform);
        let mut player_targets: Vec<TargetRef> = (0..enemies.len()).map(TargetRef::Enemy).collect();
        player_targets.push(TargetRef::Boss);
        let mut lobbed_targets: Vec<TargetRef> = platform_refs.collect();
        // Homing always chases the last entry
        lobbed_targets.push(TargetRef::Player);

        let shot = &tuning.projectile;
        let (shot_w, shot_h) = shot.size;
        let player_shots = pool(pools.player_shots, || {
            let targets = player_targets.clone();
            Projectile::new(ProjectileKind::Straight, shot_w, shot_h, targets, physics)
                .map(|p| p.with_speed(tuning.player.shot_speed))
        })?;
        let boss_shots = pool(pools.boss_shots, || {
            let targets = vec![TargetRef::Player];
            Projectile::new(ProjectileKind::Straight, shot_w, shot_h, targets, physics)
                .map(|p| p.with_speed(tuning.boss.aimed_shot_speed))
        })?;
        let arcing_shots = pool(pools.arcing_shots, || {
            let kind = ProjectileKind::Arcing {
                drift: shot.arcing_drift,
                spawn_pool: ground_enemies.clone(),
            };
            Projectile::new(kind, shot_w, shot_h, lobbed_targets.clone(), physics)
                .map(|p| p.with_speed(shot.arcing_launch_speed))
        })?;
        let homing_shots = pool(pools.homing_shots, || {
            let kind = ProjectileKind::Homing {
                window: shot.homing_window,
                turn: shot.homing_turn_degrees.to_radians(),
                acceleration: shot.homing_acceleration,
            };
            Projectile::new(kind, shot_w, shot_h, lobbed_targets.clone(), physics).map(|mut p| {
                p.power = shot.homing_power;
                p.with_speed(tuning.boss.homing_launch_speed)
            })
        })?;

        let player = Player::new(&tuning);
        let boss = Boss::new(&tuning, ground_enemies.clone());
        let rng = Pcg32::seed_from_u64(tuning.seed);

        let mut world = Self {
            tuning,
            time_ticks: 0,
            platforms,
            obstacles,
            items,
            player_shots,
            boss_shots,
            arcing_shots,
            homing_shots,
            player,
            boss,
            enemies,
            events: Vec::new(),
            rng,
            ground_enemies,
            flying_enemies,
            dust_enemies,
        };
        world.place_ground();
        world.start_entrance(0.0);
        log::info!(
            "World ready: {} platforms, {} enemies, seed {}",
            world.platforms.len(),
            world.enemies.len(),
            world.tuning.seed
        );
        Ok(world)
    }

    /// Index of the static ground slot in `platforms`
    pub fn ground_index(&self) -> usize {
        self.platforms.len() - 1
    }

    pub fn ground_enemy_slots(&self) -> Range<usize> {
        self.ground_enemies.clone()
    }

    pub fn flying_enemy_slots(&self) -> Range<usize> {
        self.flying_enemies.clone()
    }

    pub fn dust_enemy_slots(&self) -> Range<usize> {
        self.dust_enemies.clone()
    }

    /// Put the ground along the bottom edge of the playfield
    pub fn place_ground(&mut self) {
        let height = self.tuning.playfield.height;
        let index = self.ground_index();
        let ground = &mut self.platforms[index];
        let position = Vector2::new(
            self.tuning.playfield.width / 2.0,
            height - ground.body.height / 2.0,
        );
        ground.place(position, PlatformKind::Ground, Vector2::ZERO);
    }

    /// Activate a free moving platform
    pub fn spawn_platform(&mut self, position: Vector2, vector: Vector2) -> Option<usize> {
        let moving = self.ground_index();
        let Some(index) = first_free(&self.platforms[..moving]) else {
            log::trace!("Platform pool exhausted");
            return None;
        };
        self.platforms[index].place(position, PlatformKind::Moving, vector);
        Some(index)
    }

    /// Place an obstacle on top of `platform`, centred at `x`
    pub fn attach_obstacle(&mut self, platform: usize, x: f64, damage: i32) -> Option<usize> {
        if !self.platforms.get(platform)?.body.is_alive() {
            return None;
        }
        let Some(index) = first_free(&self.obstacles) else {
            log::trace!("Obstacle pool exhausted");
            return None;
        };
        let block = &mut self.platforms[platform];
        let obstacle = &mut self.obstacles[index];
        obstacle.place(block.resting_position(x, obstacle.body.height), platform, damage);
        block.attachments.push(Attachment::Obstacle(index));
        Some(index)
    }

    /// Place a healing item on top of `platform`, centred at `x`
    pub fn attach_item(&mut self, platform: usize, x: f64, healing: i32) -> Option<usize> {
        if !self.platforms.get(platform)?.body.is_alive() {
            return None;
        }
        let Some(index) = first_free(&self.items) else {
            log::trace!("Item pool exhausted");
            return None;
        };
        let block = &mut self.platforms[platform];
        let item = &mut self.items[index];
        item.place(
            block.resting_position(x, item.body.height),
            ItemMotion::RidesPlatform(platform),
            healing,
        );
        block.attachments.push(Attachment::Item(index));
        Some(index)
    }

    /// Place a healing item that drifts on its own vector
    pub fn spawn_item(
        &mut self,
        position: Vector2,
        vector: Vector2,
        healing: i32,
    ) -> Option<usize> {
        let Some(index) = first_free(&self.items) else {
            log::trace!("Item pool exhausted");
            return None;
        };
        let item = &mut self.items[index];
        item.place(position, ItemMotion::Free, healing);
        item.body.vector = vector;
        Some(index)
    }

    pub fn spawn_ground_enemy(&mut self, position: Vector2) -> Option<usize> {
        self.spawn_enemy(self.ground_enemy_slots(), position, 1, Vector2::ZERO)
    }

    pub fn spawn_flying_enemy(&mut self, position: Vector2) -> Option<usize> {
        let life = self.tuning.enemy.flying_life;
        self.spawn_enemy(self.flying_enemy_slots(), position, life, Vector2::ZERO)
    }

    pub fn spawn_dust(&mut self, position: Vector2, vector: Vector2) -> Option<usize> {
        self.spawn_enemy(self.dust_enemy_slots(), position, 1, vector)
    }

    fn spawn_enemy(
        &mut self,
        slots: Range<usize>,
        position: Vector2,
        life: i32,
        vector: Vector2,
    ) -> Option<usize> {
        let start = slots.start;
        let Some(offset) = first_free(&self.enemies[slots]) else {
            log::trace!("Enemy pool exhausted");
            return None;
        };
        let enemy = &mut self.enemies[start + offset];
        enemy.place(position, life);
        enemy.body.vector = vector;
        Some(start + offset)
    }

    /// Bring the boss in from the right edge
    pub fn spawn_boss(&mut self, position: Vector2, life: i32) -> bool {
        if !self.boss.body.is_free() {
            return false;
        }
        self.boss.place(position, life);
        true
    }

    /// Tell a live boss to leave
    pub fn order_boss_escape(&mut self) {
        if self.boss.body.is_alive() {
            self.boss.set_mode(BossMode::Escape);
        }
    }

    /// Back to the opening state: every pool dead, ground in place, player walking on
    pub fn reset(&mut self, now: f64) {
        clear_pool(&mut self.platforms);
        clear_pool(&mut self.obstacles);
        clear_pool(&mut self.items);
        clear_pool(&mut self.player_shots);
        clear_pool(&mut self.boss_shots);
        clear_pool(&mut self.arcing_shots);
        clear_pool(&mut self.homing_shots);
        clear_pool(&mut self.enemies);
        clear_pool(std::slice::from_mut(&mut self.boss));
        for platform in &mut self.platforms {
            platform.attachments.clear();
        }
        self.place_ground();
        self.start_entrance(now);
        log::info!("World reset at tick {}", self.time_ticks);
    }

    fn start_entrance(&mut self, now: f64) {
        let player = &self.tuning.player;
        let start = Vector2::new(player.entrance_start.0, player.entrance_start.1);
        let end = Vector2::new(player.entrance_end.0, player.entrance_end.1);
        self.player.begin_entrance(start, end, now);
    }

    /// Take the events raised by the last tick
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

fn require(size: usize, pool: &'static str) -> Result<(), SimError> {
    if size == 0 {
        return Err(SimError::EmptyPool { pool });
    }
    Ok(())
}

fn pool<T>(
    size: usize,
    mut build: impl FnMut() -> Result<T, SimError>,
) -> Result<Vec<T>, SimError> {
    (0..size).map(|_| build()).collect()
}

fn clear_pool<T: Body>(pool: &mut [T]) {
    for slot in pool {
        let body = slot.body_mut();
        body.life = 0;
        body.update_mode = UpdateMode::Normal;
        body.death_started = false;
        body.vector = Vector2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_layout() {
        let world = World::new(Tuning::default()).unwrap();
        assert_eq!(world.platforms.len(), 21);
        assert_eq!(world.enemies.len(), 50);
        assert_eq!(world.ground_enemy_slots(), 0..30);
        assert_eq!(world.flying_enemy_slots(), 30..40);
        assert_eq!(world.dust_enemy_slots(), 40..50);

        let ground = &world.platforms[world.ground_index()];
        assert!(ground.body.is_alive());
        assert_eq!(ground.kind, PlatformKind::Ground);
        assert_eq!(ground.body.top(), 460.0);
        assert!(world.player.is_entering);
        assert_eq!(world.player.body.life, 3);

        // Homing shots chase the player
        assert_eq!(world.homing_shots[0].targets.last(), Some(&TargetRef::Player));
        assert_eq!(world.player_shots[0].targets.last(), Some(&TargetRef::Boss));
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.pools.player_shots = 0;
        let err = World::new(tuning).unwrap_err();
        assert!(matches!(err, SimError::EmptyPool { pool: "player_shots" }));
    }

    #[test]
    fn test_attachments_sit_on_platform() {
        let mut world = World::new(Tuning::default()).unwrap();
        let block = world
            .spawn_platform(Vector2::new(1200.0, 330.0), Vector2::new(-3.0, 0.0))
            .unwrap();
        let obstacle = world.attach_obstacle(block, 1150.0, 1).unwrap();
        let item = world.attach_item(block, 1250.0, 1).unwrap();

        assert_eq!(world.obstacles[obstacle].body.position, Vector2::new(1150.0, 299.0));
        assert_eq!(world.items[item].motion, ItemMotion::RidesPlatform(block));
        assert_eq!(
            world.platforms[block].attachments,
            vec![Attachment::Obstacle(obstacle), Attachment::Item(item)]
        );
    }

    #[test]
    fn test_spawn_respects_pool_partition() {
        let mut world = World::new(Tuning::default()).unwrap();
        assert_eq!(world.spawn_flying_enemy(Vector2::new(1064.0, 180.0)), Some(30));
        assert_eq!(world.enemies[30].body.life, 10);
        let dust = world.spawn_dust(Vector2::new(1064.0, 300.0), Vector2::new(-6.0, 0.0));
        assert_eq!(dust, Some(40));
        assert_eq!(world.enemies[40].body.vector, Vector2::new(-6.0, 0.0));
        assert_eq!(world.spawn_ground_enemy(Vector2::new(1064.0, 396.0)), Some(0));
    }

    #[test]
    fn test_reset_clears_pools() {
        let mut world = World::new(Tuning::default()).unwrap();
        world.spawn_platform(Vector2::new(500.0, 300.0), Vector2::new(-3.0, 0.0));
        world.spawn_ground_enemy(Vector2::new(600.0, 396.0));
        world.enemies[1].body.begin_death();
        world.spawn_boss(Vector2::new(1250.0, 290.0), 180);

        world.reset(42.0);
        assert!(world.platforms[..world.ground_index()].iter().all(|p| p.body.is_free()));
        assert!(world.enemies.iter().all(|e| e.body.is_free()));
        assert!(world.boss.body.is_free());
        assert!(world.platforms[world.ground_index()].body.is_alive());
        assert_eq!(world.player.entrance.started_at, 42.0);
    }

    #[test]
    fn test_key_state() {
        let mut keys = KeyState::default();
        keys.set(Key::Fire, true);
        keys.set(Key::Left, true);
        keys.set(Key::Left, false);
        assert_eq!(
            keys,
            KeyState {
                fire: true,
                ..Default::default()
            }
        );
    }
}
