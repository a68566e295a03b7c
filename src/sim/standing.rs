//! Standing / ground resolution
//!
//! Gravity steps are many pixels per tick, so a plain overlap test either
//! lets a falling body sink into a platform or "lands" it while it is still
//! beside the platform. Instead, when the foot penetrates a platform we solve
//! the fall backwards in time to the moment the foot crossed the top edge and
//! check that the foot was over the platform at that moment.

use serde::{Deserialize, Serialize};

use super::collision::{hseg_vs_rect, seg_vs_seg};
use super::entity::{Body, Entity};
use super::vector::Vector2;

/// Movement state derived each tick from `(is_standing, is_jumping, vector.y)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Footing {
    /// Standing, not jumping, still moving down: snap onto the surface
    Falling,
    /// Standing and at rest on the surface
    StandingIdle,
    /// Standing while a jump is still rising
    JumpRising,
    /// Standing while a jump is coming down: land
    JumpFallingCheck,
    /// Not standing on anything
    Airborne,
}

impl Footing {
    pub fn of(body: &Entity) -> Self {
        match (body.is_standing, body.is_jumping) {
            (false, _) => Footing::Airborne,
            (true, false) if body.vector.y > 0.0 => Footing::Falling,
            (true, false) => Footing::StandingIdle,
            (true, true) if body.vector.y >= 0.0 => Footing::JumpFallingCheck,
            (true, true) => Footing::JumpRising,
        }
    }
}

/// Decide whether `body` rests on one of `candidates`
///
/// Sets `is_standing` and `standing_on` (an index into `candidates`). The
/// first accepted candidate wins, so candidate order matters. A candidate
/// whose backward-corrected check fails ends the search: the body is treated
/// as not standing this tick.
pub fn resolve_standing<T: Body>(body: &mut Entity, candidates: &[T]) {
    let (foot1, foot2) = body.foot_segment();

    if body.is_alive() {
        for (index, candidate) in candidates.iter().enumerate() {
            let block = candidate.body();
            if !block.is_alive() {
                continue;
            }

            let overlaps = hseg_vs_rect(foot1, foot2, block.position, block.width, block.height)
                == Some(true);

            // Overlap covers both the slow case and the "platform thinner than
            // this tick's fall" case; they share the same corrected check
            if overlaps {
                if body.vector.y > 0.0 && !crossed_top_over(body, block, foot1, foot2) {
                    break;
                }
                stand_on(body, index);
                return;
            }

            // Fell clean through a thin platform within one tick
            if body.vector.y > 0.0 && body.vector.y >= block.height {
                let previous_foot_y = foot1.y - body.vector.y + body.gravity;
                if previous_foot_y <= block.top() && foot1.y >= block.bottom() {
                    if !crossed_top_over(body, block, foot1, foot2) {
                        break;
                    }
                    stand_on(body, index);
                    return;
                }
            }
        }
    }

    body.is_standing = false;
    body.standing_on = None;
}

/// The surface `body` currently stands on, if it is still in `candidates`
pub fn surface_of<'a, T: Body>(body: &Entity, candidates: &'a [T]) -> Option<&'a Entity> {
    body.standing_on
        .and_then(|index| candidates.get(index))
        .map(|candidate| candidate.body())
}

/// Drift of the surface under `body`, zero when airborne
pub fn carry_of<T: Body>(body: &Entity, candidates: &[T]) -> Vector2 {
    surface_of(body, candidates)
        .map(|surface| surface.vector)
        .unwrap_or(Vector2::ZERO)
}

/// Put the bottom edge of `body` on its surface's top edge
pub fn snap_to_surface<T: Body>(body: &mut Entity, candidates: &[T]) {
    if let Some(surface) = surface_of(body, candidates) {
        body.snap_onto(surface);
    }
}

/// End a jump or fall: ride the surface horizontally and stop vertically
pub fn land<T: Body>(body: &mut Entity, candidates: &[T]) {
    let carry = carry_of(body, candidates);
    body.is_jumping = false;
    body.set_vector(carry.x, 0.0);
    snap_to_surface(body, candidates);
}

fn stand_on(body: &mut Entity, index: usize) {
    body.is_standing = true;
    body.standing_on = Some(index);
}

/// Time (ticks, counted backwards from now) since the foot was at `top_y`
///
/// Solves `d = v*t - g*t^2/2` for the smaller root, where `d` is how far the
/// foot is below the top edge and `v` the current vertical speed. Returns
/// `None` when no such time exists under this body's kinematics.
pub fn time_since_crossing(foot_y: f64, top_y: f64, vy: f64, gravity: f64) -> Option<f64> {
    let depth = foot_y - top_y;
    if gravity <= 0.0 {
        return (vy > 0.0).then(|| depth / vy);
    }
    let ratio = vy / gravity;
    let discriminant = ratio * ratio - 2.0 * depth / gravity;
    if discriminant < 0.0 {
        return None;
    }
    Some(ratio - discriminant.sqrt())
}

/// Reconstruct the foot segment at the moment it crossed the block's top
/// edge and test it against that edge
fn crossed_top_over(body: &Entity, block: &Entity, foot1: Vector2, foot2: Vector2) -> bool {
    let top_y = block.top();
    let Some(t) = time_since_crossing(foot1.y, top_y, body.vector.y, body.gravity) else {
        return false;
    };
    let top1 = Vector2::new(block.left(), top_y);
    let top2 = Vector2::new(block.right(), top_y);
    // Horizontal motion is unaffected by gravity
    let shift = body.vector.x * t;
    let p1 = Vector2::new(foot1.x - shift, top_y);
    let p2 = Vector2::new(foot2.x - shift, top_y);
    seg_vs_seg(top1, top2, p1, p2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::{Platform, PlatformKind};
    use crate::tuning::PhysicsTuning;

    fn platform_at(x: f64, y: f64, w: f64, h: f64) -> Platform {
        let mut p = Platform::new(w, h, &PhysicsTuning::default());
        p.place(Vector2::new(x, y), PlatformKind::Moving, Vector2::ZERO);
        p
    }

    fn falling_body(x: f64, foot_y: f64, vx: f64, vy: f64) -> Entity {
        let mut body = Entity::new(64.0, 64.0, &PhysicsTuning::default());
        body.life = 1;
        body.position = Vector2::new(x, foot_y - 32.0);
        body.vector = Vector2::new(vx, vy);
        body
    }

    #[test]
    fn test_footing_from_flags() {
        let mut body = falling_body(0.0, 0.0, 0.0, 3.0);
        body.is_standing = true;
        assert_eq!(Footing::of(&body), Footing::Falling);
        body.vector.y = 0.0;
        assert_eq!(Footing::of(&body), Footing::StandingIdle);
        body.is_jumping = true;
        assert_eq!(Footing::of(&body), Footing::JumpFallingCheck);
        body.vector.y = -4.0;
        assert_eq!(Footing::of(&body), Footing::JumpRising);
        body.is_standing = false;
        assert_eq!(Footing::of(&body), Footing::Airborne);
    }

    #[test]
    fn test_fast_fall_lands_when_over_platform() {
        // Platform spans x 0..200, top edge at y=300
        let platforms = vec![platform_at(100.0, 315.0, 200.0, 30.0)];
        // The foot was 15 above the top edge and fell 20 this tick
        let mut body = falling_body(100.0, 305.0, 0.0, 20.0);
        resolve_standing(&mut body, &platforms);
        assert!(body.is_standing);
        assert_eq!(body.standing_on, Some(0));
    }

    #[test]
    fn test_fast_fall_beside_platform_does_not_land() {
        let platforms = vec![platform_at(100.0, 315.0, 200.0, 30.0)];
        let mut body = falling_body(260.0, 305.0, 0.0, 20.0);
        resolve_standing(&mut body, &platforms);
        assert!(!body.is_standing);
        assert_eq!(body.standing_on, None);
    }

    #[test]
    fn test_fast_diagonal_entry_from_the_side_is_rejected() {
        // The foot overlaps now, but at the crossing time it was left of the platform
        let platforms = vec![platform_at(100.0, 315.0, 200.0, 30.0)];
        let mut body = falling_body(10.0, 305.0, 200.0, 20.0);
        resolve_standing(&mut body, &platforms);
        assert!(!body.is_standing);
    }

    #[test]
    fn test_tunnel_through_thin_platform_is_caught() {
        // 10-pixel platform, top 300 / bottom 310; foot fell from 290 to 311
        let platforms = vec![platform_at(100.0, 305.0, 200.0, 10.0)];
        let mut body = falling_body(100.0, 311.0, 0.0, 22.2);
        resolve_standing(&mut body, &platforms);
        assert!(body.is_standing);
    }

    #[test]
    fn test_resting_body_stands_without_correction() {
        let platforms = vec![platform_at(100.0, 315.0, 200.0, 30.0)];
        let mut body = falling_body(100.0, 300.0, 0.0, 0.0);
        resolve_standing(&mut body, &platforms);
        assert!(body.is_standing);
    }

    #[test]
    fn test_dead_candidates_and_first_match() {
        let mut dead = platform_at(100.0, 315.0, 200.0, 30.0);
        dead.body.life = 0;
        let platforms = vec![
            dead,
            platform_at(100.0, 315.0, 200.0, 30.0),
            platform_at(100.0, 315.0, 200.0, 30.0),
        ];
        let mut body = falling_body(100.0, 300.0, 0.0, 0.0);
        resolve_standing(&mut body, &platforms);
        assert_eq!(body.standing_on, Some(1));
    }

    #[test]
    fn test_time_since_crossing() {
        let t = time_since_crossing(305.0, 300.0, 20.0, 1.2).unwrap();
        // Walking back t ticks from v=20 under g=1.2 covers exactly the depth
        let covered = 20.0 * t - 0.5 * 1.2 * t * t;
        assert!((covered - 5.0).abs() < 1e-9);
        assert!(time_since_crossing(400.0, 300.0, 1.0, 1.2).is_none());
    }
}
