//! Fixed timestep simulation tick
//!
//! Update order is part of the contract: platforms, then obstacles and items,
//! then projectiles, then the player, the boss and the enemies. Projectiles
//! resolve their hits before the bodies they hit get to act this tick.

use super::boss::BossContext;
use super::enemy::EnemyContext;
use super::entity::UpdateMode;
use super::player::PlayerContext;
use super::projectile::Targets;
use super::state::{SimEvent, TickInput, World};

/// Advance the world by one tick
pub fn tick(world: &mut World, input: &TickInput) {
    world.events.clear();
    world.time_ticks += 1;

    if input.restart && world.player.body.update_mode == UpdateMode::DeathSequence {
        world.reset(input.now);
        world.events.push(SimEvent::Restarted);
        return;
    }

    let World {
        tuning,
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
        events,
        rng,
        ..
    } = world;
    let playfield = &tuning.playfield;

    // The scenery stops once the player is down
    if player.body.is_alive() {
        for platform in platforms.iter_mut() {
            platform.update();
        }
        for obstacle in obstacles.iter_mut() {
            obstacle.update(platforms);
        }
        for item in items.iter_mut() {
            item.update(platforms);
        }
    }

    {
        let mut targets = Targets {
            player: &mut *player,
            boss: &mut *boss,
            enemies: enemies.as_mut_slice(),
            platforms: platforms.as_slice(),
            playfield,
            events: &mut *events,
        };
        let shots = player_shots
            .iter_mut()
            .chain(boss_shots.iter_mut())
            .chain(arcing_shots.iter_mut())
            .chain(homing_shots.iter_mut());
        for shot in shots {
            shot.update(&mut targets);
        }
    }

    match player.body.update_mode {
        UpdateMode::Normal => {
            let mut ctx = PlayerContext {
                keys: &input.keys,
                now: input.now,
                platforms,
                obstacles,
                enemies,
                items: items.as_mut_slice(),
                shots: player_shots.as_mut_slice(),
                tuning: &tuning.player,
                playfield,
                events: &mut *events,
            };
            player.update(&mut ctx);
        }
        UpdateMode::DeathSequence => player.update_death(tuning.player.death_pop_speed),
    }

    let exit_y = tuning.death_exit_y();
    match boss.body.update_mode {
        UpdateMode::Normal => {
            let mut ctx = BossContext {
                target: player.body.position,
                shots: boss_shots.as_mut_slice(),
                homing: homing_shots.as_mut_slice(),
                enemies: enemies.as_mut_slice(),
                tuning: &tuning.boss,
                playfield,
                events: &mut *events,
            };
            boss.update(&mut ctx);
        }
        UpdateMode::DeathSequence => {
            boss.update_death(tuning.enemy.death_pop_speed, exit_y, tuning.enemy.death_exit_left)
        }
    }

    let mut ctx = EnemyContext {
        platforms,
        shots: arcing_shots.as_mut_slice(),
        rng,
        playfield,
    };
    for enemy in enemies.iter_mut() {
        match enemy.body.update_mode {
            UpdateMode::Normal => enemy.update(&mut ctx),
            UpdateMode::DeathSequence => enemy.update_death(&tuning.enemy, exit_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::TargetKind;
    use crate::sim::platform::PlatformKind;
    use crate::sim::vector::Vector2;
    use crate::tuning::Tuning;

    fn world() -> World {
        World::new(Tuning::default()).unwrap()
    }

    /// Skip the walk-on and stand the player on the ground at `x`
    fn stand_player(world: &mut World, x: f64) {
        let ground = &world.platforms[world.ground_index()];
        let y = ground.body.top() - world.player.body.height / 2.0;
        world.player.is_entering = false;
        world.player.body.position = Vector2::new(x, y);
        world.player.body.vector = Vector2::ZERO;
    }

    #[test]
    fn test_resting_equilibrium() {
        let mut tuning = Tuning::default();
        tuning.playfield.height = 600.0;
        tuning.platform.ground_height = 40.0;
        let mut world = World::new(tuning).unwrap();
        let ground = world.ground_index();
        world.platforms[ground].place(
            Vector2::new(500.0, 500.0),
            PlatformKind::Ground,
            Vector2::ZERO,
        );
        world.player.is_entering = false;
        world.player.body.position = Vector2::new(100.0, 480.0);
        world.player.body.vector = Vector2::ZERO;

        tick(&mut world, &TickInput::default());

        assert!(world.player.body.is_standing);
        assert_eq!(world.player.body.standing_on, Some(ground));
        assert_eq!(world.player.body.vector, Vector2::ZERO);
        assert_eq!(world.player.body.position, Vector2::new(100.0, 480.0));
    }

    #[test]
    fn test_shot_kills_ground_enemy_same_tick() {
        let mut world = world();
        let enemy = world.spawn_ground_enemy(Vector2::new(516.0, 428.0)).unwrap();
        world.player_shots[0].place(Vector2::new(500.0, 428.0), 16.0, 2);

        tick(&mut world, &TickInput::default());

        assert_eq!(world.player_shots[0].body.life, 0);
        assert!(!world.enemies[enemy].body.is_alive());
        assert_eq!(world.enemies[enemy].body.update_mode, UpdateMode::DeathSequence);
        assert_eq!(
            world.drain_events(),
            vec![SimEvent::Killed {
                kind: TargetKind::GroundEnemy
            }]
        );
    }

    #[test]
    fn test_entering_player_ignores_boss_shots() {
        let mut world = world();
        let position = world.player.body.position;
        world.boss_shots[0].place(position, 10.0, 1);
        world.boss_shots[0].body.vector = Vector2::ZERO;

        tick(&mut world, &TickInput::default());
        assert_eq!(world.player.body.life, 3);
        assert!(world.boss_shots[0].body.is_alive());
    }

    #[test]
    fn test_boss_invades_then_attacks() {
        let mut world = world();
        assert!(world.spawn_boss(Vector2::new(1250.0, 290.0), 180));

        let mut attacking = 0;
        for _ in 0..200 {
            tick(&mut world, &TickInput::default());
            attacking += world
                .drain_events()
                .iter()
                .filter(|e| **e == SimEvent::BossAttacking)
                .count();
        }
        assert_eq!(attacking, 1);
        assert!(world.boss_shots.iter().any(|s| s.body.is_alive()));
    }

    #[test]
    fn test_player_death_freezes_scenery_and_restart_resets() {
        let mut world = world();
        stand_player(&mut world, 300.0);
        let block = world
            .spawn_platform(Vector2::new(700.0, 300.0), Vector2::new(-3.0, 0.0))
            .unwrap();
        world.player.body.life = 0;

        tick(&mut world, &TickInput::default());
        assert_eq!(world.player.body.update_mode, UpdateMode::DeathSequence);
        assert_eq!(world.drain_events(), vec![SimEvent::PlayerDied]);

        let x = world.platforms[block].body.position.x;
        tick(&mut world, &TickInput::default());
        assert_eq!(world.platforms[block].body.position.x, x);

        let input = TickInput {
            restart: true,
            now: 5.0,
            ..Default::default()
        };
        tick(&mut world, &input);
        assert_eq!(world.drain_events(), vec![SimEvent::Restarted]);
        assert!(world.player.is_entering);
        assert_eq!(world.player.body.life, 3);
        assert_eq!(world.player.body.update_mode, UpdateMode::Normal);
        assert!(!world.platforms[block].body.is_alive());
    }

    #[test]
    fn test_restart_ignored_while_alive() {
        let mut world = world();
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut world, &input);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_riding_player_moves_with_platform() {
        let mut world = world();
        let block = world
            .spawn_platform(Vector2::new(300.0, 300.0), Vector2::new(-3.0, 0.0))
            .unwrap();
        world.player.is_entering = false;
        // Bottom edge on the platform's top
        world.player.body.position = Vector2::new(300.0, 253.0);
        world.player.body.vector = Vector2::ZERO;

        for _ in 0..5 {
            tick(&mut world, &TickInput::default());
        }
        assert_eq!(world.player.body.standing_on, Some(block));
        assert_eq!(world.player.body.position.y, 253.0);
        assert!(world.player.body.position.x < 300.0);
    }

    #[test]
    fn test_boss_kill_reported_then_slot_freed() {
        let mut world = world();
        assert!(world.spawn_boss(Vector2::new(700.0, 290.0), 2));
        world.player_shots[0].place(Vector2::new(684.0, 290.0), 16.0, 2);

        tick(&mut world, &TickInput::default());
        assert_eq!(
            world.drain_events(),
            vec![SimEvent::Killed {
                kind: TargetKind::Boss
            }]
        );
        assert_eq!(world.boss.body.update_mode, UpdateMode::DeathSequence);
        assert!(!world.boss.body.is_free());
        assert!(!world.spawn_boss(Vector2::new(1250.0, 290.0), 180));

        // Pops up first, then falls out of the playfield
        tick(&mut world, &TickInput::default());
        assert!(world.boss.body.vector.y < 0.0);
        for _ in 0..200 {
            if world.boss.body.is_free() {
                break;
            }
            tick(&mut world, &TickInput::default());
        }
        assert!(world.boss.body.is_free());
        assert!(world.boss.body.position.y > world.tuning.death_exit_y());
        assert!(world.spawn_boss(Vector2::new(1250.0, 290.0), 180));
    }

    #[test]
    fn test_drifting_item_heals_on_contact() {
        let mut world = world();
        stand_player(&mut world, 300.0);
        world.player.body.life = 2;
        let item = world
            .spawn_item(Vector2::new(380.0, 428.0), Vector2::new(-5.0, 0.0), 1)
            .unwrap();

        let mut healed = Vec::new();
        for _ in 0..12 {
            tick(&mut world, &TickInput::default());
            healed.extend(world.drain_events());
        }
        assert_eq!(healed, vec![SimEvent::PlayerHealed { amount: 1 }]);
        assert_eq!(world.player.body.life, 3);
        assert!(!world.items[item].body.is_alive());
    }

    #[test]
    fn test_time_advances() {
        let mut world = world();
        for _ in 0..3 {
            tick(&mut world, &TickInput::default());
        }
        assert_eq!(world.time_ticks, 3);
    }
}
