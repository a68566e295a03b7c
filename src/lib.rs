//! Medama Run - simulation core of a side-scrolling platform shooter
//!
//! Core modules:
//! - `sim`: Fixed-step entity simulation (standing, collisions, behaviours)
//! - `tuning`: Data-driven game balance
//! - `error`: Construction and configuration errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f64 = 1000.0;
    pub const PLAYFIELD_HEIGHT: f64 = 480.0;

    /// Downward acceleration applied per tick
    pub const GRAVITY: f64 = 1.2;

    /// Foot segment extends this far left and right of the body centre
    pub const FOOT_LEFT_OFFSET: f64 = 24.0;
    pub const FOOT_RIGHT_OFFSET: f64 = 15.0;

    /// Vertical speed of the "pop" at the start of a death sequence
    pub const DEATH_POP_SPEED: f64 = 10.0;

    /// Post-hit invulnerability (ticks)
    pub const INVULNERABILITY_TICKS: u64 = 120;
}
