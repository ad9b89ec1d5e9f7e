//! Ship class definitions and tuning.
//!
//! One canonical stat table per class. Variant-specific numbers (detection
//! ranges, fire rates, cargo sizes) live here as data keyed by
//! [`ShipClass`] rather than being spread across per-class code.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tagged ship variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    /// Raider that hunts undocked traffic.
    Pirate,
    /// Patrol ship that responds to beacons and intercepts pirates.
    Police,
    /// Order-servicing merchant.
    Trader,
    /// Ore hauler working the asteroid fields.
    Miner,
    /// Civilian freighter cruising between stations and gates.
    Freighter,
    /// The player's ship.
    Player,
}

impl ShipClass {
    /// Stable name for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pirate => "pirate",
            Self::Police => "police",
            Self::Trader => "trader",
            Self::Miner => "miner",
            Self::Freighter => "freighter",
            Self::Player => "player",
        }
    }
}

/// Relative spread applied to spawn speed rolls.
const SPEED_JITTER: f32 = 0.15;

/// Relative spread applied to spawn hull rolls.
const HULL_JITTER: f32 = 0.20;

/// Per-class tuning constants.
///
/// Classes ignore the fields they have no use for (a miner never fires;
/// a pirate has no cargo hold).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipSpec {
    /// Base speed cap (units/s).
    pub max_speed: f32,
    /// Base hull points.
    pub max_hull: i32,
    /// Target-scan radius.
    pub detection_range: f32,
    /// Range at which the class opens or breaks off an engagement.
    pub attack_range: f32,
    /// Preferred stand-off distance while attacking.
    pub optimal_range: f32,
    /// Seconds between shots (or bursts, for police).
    pub fire_cooldown: f32,
    /// Damage per projectile.
    pub projectile_damage: i32,
    /// Projectile muzzle speed.
    pub projectile_speed: f32,
    /// Cargo hold capacity in units.
    pub cargo_capacity: u32,
    /// Liveness timeout: seconds in one state before a forced reset.
    pub state_timeout: f32,
    /// Speed multiplier applied while fleeing.
    pub flee_boost: f32,
}

impl ShipSpec {
    /// Roll a spawn speed within the documented jitter range.
    pub fn roll_speed<R: Rng>(&self, rng: &mut R) -> f32 {
        self.max_speed * rng.gen_range(1.0 - SPEED_JITTER..=1.0 + SPEED_JITTER)
    }

    /// Roll spawn hull points within the documented jitter range.
    pub fn roll_hull<R: Rng>(&self, rng: &mut R) -> i32 {
        let lo = ((self.max_hull as f32) * (1.0 - HULL_JITTER)) as i32;
        let hi = ((self.max_hull as f32) * (1.0 + HULL_JITTER)) as i32;
        rng.gen_range(lo.max(1)..=hi.max(1))
    }
}

/// Look up the canonical spec for a class.
#[must_use]
pub fn spec(class: ShipClass) -> &'static ShipSpec {
    match class {
        ShipClass::Pirate => &PIRATE_SPEC,
        ShipClass::Police => &POLICE_SPEC,
        ShipClass::Trader => &TRADER_SPEC,
        ShipClass::Miner => &MINER_SPEC,
        ShipClass::Freighter => &FREIGHTER_SPEC,
        ShipClass::Player => &PLAYER_SPEC,
    }
}

/// Pirate raider tuning.
pub const PIRATE_SPEC: ShipSpec = ShipSpec {
    max_speed: 95.0,
    max_hull: 30,
    detection_range: 220.0,
    attack_range: 160.0,
    optimal_range: 90.0,
    fire_cooldown: 1.2,
    projectile_damage: 8,
    projectile_speed: 380.0,
    cargo_capacity: 0,
    state_timeout: 30.0,
    flee_boost: 1.5,
};

/// Police patrol ship tuning.
pub const POLICE_SPEC: ShipSpec = ShipSpec {
    max_speed: 110.0,
    max_hull: 60,
    detection_range: 260.0,
    attack_range: 180.0,
    optimal_range: 120.0,
    fire_cooldown: 1.5,
    projectile_damage: 10,
    projectile_speed: 420.0,
    cargo_capacity: 0,
    state_timeout: 40.0,
    flee_boost: 1.0,
};

/// Trading ship tuning.
pub const TRADER_SPEC: ShipSpec = ShipSpec {
    max_speed: 80.0,
    max_hull: 40,
    detection_range: 180.0,
    attack_range: 0.0,
    optimal_range: 0.0,
    fire_cooldown: 0.0,
    projectile_damage: 0,
    projectile_speed: 0.0,
    cargo_capacity: 20,
    state_timeout: 45.0,
    flee_boost: 1.2,
};

/// Mining ship tuning.
pub const MINER_SPEC: ShipSpec = ShipSpec {
    max_speed: 70.0,
    max_hull: 35,
    detection_range: 400.0,
    attack_range: 0.0,
    optimal_range: 0.0,
    fire_cooldown: 0.0,
    projectile_damage: 0,
    projectile_speed: 0.0,
    cargo_capacity: 10,
    state_timeout: 60.0,
    flee_boost: 1.0,
};

/// Civilian freighter tuning.
pub const FREIGHTER_SPEC: ShipSpec = ShipSpec {
    max_speed: 75.0,
    max_hull: 45,
    detection_range: 150.0,
    attack_range: 0.0,
    optimal_range: 0.0,
    fire_cooldown: 0.0,
    projectile_damage: 0,
    projectile_speed: 0.0,
    cargo_capacity: 0,
    state_timeout: 50.0,
    flee_boost: 1.3,
};

/// Player ship tuning.
pub const PLAYER_SPEC: ShipSpec = ShipSpec {
    max_speed: 130.0,
    max_hull: 100,
    detection_range: 300.0,
    attack_range: 0.0,
    optimal_range: 0.0,
    fire_cooldown: 0.25,
    projectile_damage: 12,
    projectile_speed: 460.0,
    cargo_capacity: 0,
    state_timeout: 0.0,
    flee_boost: 1.0,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spec_lookup_matches_class() {
        assert_eq!(spec(ShipClass::Pirate).max_hull, PIRATE_SPEC.max_hull);
        assert_eq!(spec(ShipClass::Trader).cargo_capacity, 20);
        assert_eq!(spec(ShipClass::Miner).cargo_capacity, 10);
    }

    #[test]
    fn test_spawn_rolls_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let spec = spec(ShipClass::Pirate);
        for _ in 0..100 {
            let speed = spec.roll_speed(&mut rng);
            assert!(speed >= spec.max_speed * 0.85 && speed <= spec.max_speed * 1.15);

            let hull = spec.roll_hull(&mut rng);
            assert!(hull >= 24 && hull <= 36);
        }
    }

    #[test]
    fn test_spawn_rolls_are_seeded() {
        let spec = spec(ShipClass::Police);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(spec.roll_hull(&mut a), spec.roll_hull(&mut b));
    }
}
