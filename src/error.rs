//! Errors raised while building or configuring a world
//!
//! Nothing in here is produced during a tick: per-tick failures are
//! modelled as "no collision" or "no free slot" and never surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A projectile was built without anything to collide against
    #[error("projectile target list must not be empty")]
    EmptyTargetList,

    /// An arcing projectile needs somewhere to spawn its impact enemy
    #[error("arcing projectile spawn pool must not be empty")]
    EmptySpawnPool,

    #[error("pool `{pool}` must have at least one slot")]
    EmptyPool { pool: &'static str },

    #[error("invalid tuning: {0}")]
    InvalidTuning(#[from] serde_json::Error),

    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
}
