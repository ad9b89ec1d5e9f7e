//! Shared steering primitives.
//!
//! Every mobile agent moves through these four behaviors plus
//! [`integrate`]. Velocity is scaled by [`DAMPING`] once per tick
//! regardless of state, then clamped. The damping is applied per tick,
//! not per second: the resulting drift-and-overshoot feel sets combat
//! stand-off distances and must not be "fixed" into a dt-scaled decay.

use rand::Rng;

use crate::components::Body;
use crate::math::Vec2;

/// Per-tick velocity damping factor.
pub const DAMPING: f32 = 0.82;

/// Acceleration, as a multiple of the body's speed cap, per second.
const SEEK_ACCEL: f32 = 4.0;

/// Distance at which a waypoint counts as reached.
pub const ARRIVE_RADIUS: f32 = 24.0;

/// Accelerate toward a target point. Returns the remaining distance.
pub fn seek(body: &mut Body, target: Vec2, dt: f32) -> f32 {
    let to_target = target - body.position;
    let dist = to_target.length();
    if dist > f32::EPSILON {
        body.velocity += to_target.normalize() * (body.max_speed * SEEK_ACCEL * dt);
    }
    dist
}

/// Accelerate directly away from a point, with `speed_mod` scaling the
/// burn (fleeing agents pass their class boost). Returns the current
/// distance.
pub fn move_away(body: &mut Body, threat: Vec2, dt: f32, speed_mod: f32) -> f32 {
    let from_threat = body.position - threat;
    let dist = from_threat.length();
    let dir = if dist > f32::EPSILON {
        from_threat.normalize()
    } else {
        // Sitting exactly on the threat: pick a fixed axis and go
        Vec2::new(1.0, 0.0)
    };
    body.velocity += dir * (body.max_speed * SEEK_ACCEL * speed_mod * dt);
    dist
}

/// Accelerate perpendicular to the line toward a target, holding range.
pub fn circle_strafe(body: &mut Body, target: Vec2, dt: f32) {
    let to_target = target - body.position;
    if to_target.length_squared() <= f32::EPSILON {
        return;
    }
    let tangent = to_target.normalize().perp();
    body.velocity += tangent * (body.max_speed * SEEK_ACCEL * dt);
}

/// Seek the current waypoint; re-pick a random one within `radius` of
/// `home` on arrival.
pub fn patrol<R: Rng>(
    body: &mut Body,
    waypoint: &mut Vec2,
    home: Vec2,
    radius: f32,
    dt: f32,
    rng: &mut R,
) {
    if body.position.distance(*waypoint) <= ARRIVE_RADIUS {
        *waypoint = random_point_near(home, radius, rng);
    }
    seek(body, *waypoint, dt);
}

/// Uniform random point inside a disc around `center`.
pub fn random_point_near<R: Rng>(center: Vec2, radius: f32, rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    // sqrt keeps the distribution uniform over the disc area
    let r = radius * rng.gen_range(0.0_f32..=1.0).sqrt();
    center + Vec2::from_angle(angle) * r
}

/// Apply per-tick damping, clamp to the (possibly boosted) speed cap,
/// and advance position.
pub fn integrate(body: &mut Body, dt: f32, speed_mult: f32) {
    body.velocity = (body.velocity * DAMPING).clamp_length(body.max_speed * speed_mult);
    body.position += body.velocity * dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 0.05;

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), 100.0)
    }

    #[test]
    fn test_seek_closes_distance() {
        let mut body = body_at(0.0, 0.0);
        let target = Vec2::new(200.0, 0.0);

        let start = body.position.distance(target);
        for _ in 0..40 {
            seek(&mut body, target, DT);
            integrate(&mut body, DT, 1.0);
        }
        assert!(body.position.distance(target) < start);
        assert!(body.velocity.x > 0.0);
    }

    #[test]
    fn test_seek_returns_remaining_distance() {
        let mut body = body_at(0.0, 0.0);
        let dist = seek(&mut body, Vec2::new(30.0, 40.0), DT);
        assert!((dist - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_move_away_opens_distance() {
        let mut body = body_at(10.0, 0.0);
        let threat = Vec2::ZERO;
        for _ in 0..20 {
            move_away(&mut body, threat, DT, 1.0);
            integrate(&mut body, DT, 1.0);
        }
        assert!(body.position.distance(threat) > 10.0);
    }

    #[test]
    fn test_speed_mod_outruns_unboosted_flight() {
        let mut plain = body_at(10.0, 0.0);
        let mut boosted = body_at(10.0, 0.0);
        let threat = Vec2::ZERO;
        for _ in 0..60 {
            move_away(&mut plain, threat, DT, 1.0);
            integrate(&mut plain, DT, 1.0);
            move_away(&mut boosted, threat, DT, 1.5);
            integrate(&mut boosted, DT, 1.5);
        }
        assert!(boosted.velocity.length() > plain.velocity.length());
        assert!(boosted.position.x > plain.position.x);
    }

    #[test]
    fn test_damping_decays_velocity_without_input() {
        let mut body = body_at(0.0, 0.0);
        body.velocity = Vec2::new(100.0, 0.0);
        integrate(&mut body, DT, 1.0);
        assert!((body.velocity.x - 82.0).abs() < 1e-4);
        integrate(&mut body, DT, 1.0);
        assert!(body.velocity.x < 82.0);
    }

    #[test]
    fn test_integrate_clamps_to_boosted_cap() {
        let mut body = body_at(0.0, 0.0);
        body.velocity = Vec2::new(1000.0, 0.0);

        integrate(&mut body, DT, 1.0);
        assert!(body.velocity.length() <= 100.0 + 1e-3);

        body.velocity = Vec2::new(1000.0, 0.0);
        integrate(&mut body, DT, 1.5);
        assert!(body.velocity.length() > 100.0);
        assert!(body.velocity.length() <= 150.0 + 1e-3);
    }

    #[test]
    fn test_circle_strafe_moves_perpendicular() {
        let mut body = body_at(0.0, 0.0);
        let target = Vec2::new(100.0, 0.0);
        circle_strafe(&mut body, target, DT);
        // All added velocity is along the perpendicular axis
        assert_eq!(body.velocity.x, 0.0);
        assert!(body.velocity.y.abs() > 0.0);
    }

    #[test]
    fn test_patrol_repicks_waypoint_on_arrival() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut body = body_at(0.0, 0.0);
        let home = Vec2::ZERO;
        let mut waypoint = Vec2::new(5.0, 0.0); // already within arrive radius

        patrol(&mut body, &mut waypoint, home, 300.0, DT, &mut rng);
        assert!(waypoint.distance(home) <= 300.0);
        assert_ne!(waypoint, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_random_point_stays_in_disc() {
        let mut rng = StdRng::seed_from_u64(11);
        let center = Vec2::new(50.0, -20.0);
        for _ in 0..200 {
            let p = random_point_near(center, 75.0, &mut rng);
            assert!(p.distance(center) <= 75.0 + 1e-3);
        }
    }
}
