//! Medama Run headless driver
//!
//! Runs a scripted stage against the simulation and logs what happens.
//! Usage: `medama-run [tuning.json] [ticks]`

use medama_run::sim::{Key, SimEvent, TickInput, Vector2, World, tick};
use medama_run::{SimError, Tuning};

/// Simulation rate (ticks per second)
const TICK_RATE: f64 = 60.0;
const DEFAULT_TICKS: u64 = 3600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Medama Run (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<(), SimError> {
    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => {
            log::info!("Loading tuning from {path}");
            Tuning::load(path)?
        }
        None => Tuning::default(),
    };
    let ticks = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    let mut world = World::new(tuning)?;
    let mut stats = Stats::default();
    let mut input = TickInput::default();

    for n in 0..ticks {
        input.now = n as f64 / TICK_RATE;
        script(&mut world, n);

        // Run right and shoot; jump now and then
        input.keys.set(Key::Right, n % 240 < 120);
        input.keys.set(Key::Left, n % 240 >= 200);
        input.keys.set(Key::Fire, true);
        input.keys.set(Key::Jump, n % 90 == 0);
        input.restart = n % 300 == 0;

        tick(&mut world, &input);
        for event in world.drain_events() {
            stats.record(&event);
            log::debug!("tick {n}: {event:?}");
        }
    }

    log::info!(
        "Ran {ticks} ticks: {} kills, {} hits taken, {} healed, {} deaths, boss escaped: {}",
        stats.kills,
        stats.hits,
        stats.healed,
        stats.deaths,
        stats.boss_escaped
    );
    Ok(())
}

/// Stage script: scrolling platforms with hazards, enemy waves, then the boss
fn script(world: &mut World, n: u64) {
    let width = world.tuning.playfield.width;
    let height = world.tuning.playfield.height;

    if n % 70 == 0 {
        let y = height - 150.0 - (n % 140) as f64;
        let x = width + 100.0;
        if let Some(block) = world.spawn_platform(Vector2::new(x, y), Vector2::new(-3.0, 0.0)) {
            if n % 210 == 0 {
                world.attach_obstacle(block, x, 1);
            } else if n % 350 == 0 {
                world.attach_item(block, x + 40.0, 1);
            }
        }
    }
    if n % 120 == 60 {
        let h = world.tuning.enemy.ground_size.1;
        world.spawn_ground_enemy(Vector2::new(width + 64.0, height - 100.0 - h));
    }
    if n % 400 == 200 {
        world.spawn_flying_enemy(Vector2::new(width + 64.0, 120.0));
    }
    if n % 600 == 300 {
        let heal = Vector2::new(width + 16.0, height - 140.0);
        world.spawn_item(heal, Vector2::new(-2.5, 0.0), 1);
    }
    if n % 50 == 25 {
        world.spawn_dust(Vector2::new(width + 32.0, height - 40.0), Vector2::new(-6.0, 0.0));
    }
    if n == 1800 {
        let (w, h) = world.tuning.boss.size;
        world.spawn_boss(Vector2::new(width + w, height - h / 2.0 - 20.0), 180);
    }
    if n == 3300 {
        world.order_boss_escape();
    }
}

#[derive(Debug, Default)]
struct Stats {
    kills: u32,
    hits: u32,
    healed: i32,
    deaths: u32,
    boss_escaped: bool,
}

impl Stats {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Killed { .. } => self.kills += 1,
            SimEvent::PlayerDamaged { .. } => self.hits += 1,
            SimEvent::PlayerHealed { amount } => self.healed += amount,
            SimEvent::PlayerDied => {
                self.deaths += 1;
                log::info!("Player died, restarting");
            }
            SimEvent::BossEscaped => self.boss_escaped = true,
            SimEvent::BossAttacking | SimEvent::Restarted => {}
        }
    }
}
