//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool index)
//! - No rendering, audio or input-device dependencies

pub mod boss;
pub mod collision;
pub mod enemy;
pub mod entity;
pub mod platform;
pub mod player;
pub mod projectile;
pub mod standing;
pub mod state;
pub mod tick;
pub mod vector;

pub use boss::{Boss, BossMode};
pub use enemy::{Enemy, EnemyKind};
pub use entity::{Body, Entity, TargetKind, TargetRef, UpdateMode};
pub use platform::{Attachment, Item, ItemMotion, Obstacle, Platform, PlatformKind};
pub use player::Player;
pub use projectile::{Projectile, ProjectileKind};
pub use standing::Footing;
pub use state::{Key, KeyState, SimEvent, TickInput, World};
pub use tick::tick;
pub use vector::{Vector2, VectorExt, heading};
