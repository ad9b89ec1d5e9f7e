//! Zone configuration and session spawning.
//!
//! A [`ZoneConfig`] describes the stations, asteroid field, gates and
//! starting populations of a play session; [`Zone`] owns every top-level
//! entity collection for the running simulation. Cross-entity references
//! are ids into these collections and nothing else.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::Projectile;
use crate::components::{Asteroid, DistressBeacon, EntityId, Gate};
use crate::error::{Result, SimError};
use crate::friendly::Freighter;
use crate::math::Vec2;
use crate::miner::Miner;
use crate::movement::random_point_near;
use crate::orders::OrderBook;
use crate::pirate::Pirate;
use crate::player::PlayerShip;
use crate::police::Police;
use crate::ships::{spec, ShipClass};
use crate::station::{Station, StationKind};
use crate::trader::Trader;

/// Starting state for one station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSetup {
    /// Specialization.
    pub kind: StationKind,
    /// World position.
    pub position: Vec2,
    /// Starting materials.
    pub materials: f32,
    /// Starting food.
    pub food: f32,
    /// Starting credits.
    pub credits: i64,
}

/// Procedural asteroid field parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteroidField {
    /// Field center.
    pub center: Vec2,
    /// Field radius.
    pub radius: f32,
    /// Number of rocks.
    pub count: usize,
    /// Minimum ore per rock.
    pub ore_min: u32,
    /// Maximum ore per rock.
    pub ore_max: u32,
}

/// Complete description of a play session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone name.
    pub name: String,
    /// Stations to place.
    pub stations: Vec<StationSetup>,
    /// Jump gate positions.
    pub gates: Vec<Vec2>,
    /// Asteroid field.
    pub asteroid_field: AsteroidField,
    /// Starting trader count.
    pub traders: usize,
    /// Starting miner count.
    pub miners: usize,
    /// Starting freighter count.
    pub freighters: usize,
    /// Starting pirate count.
    pub pirates: usize,
    /// Starting police count.
    pub police: usize,
    /// Credits each trader starts with.
    pub trader_starting_credits: i64,
    /// Whether to spawn the player ship.
    pub spawn_player: bool,
    /// Player spawn position.
    pub player_start: Vec2,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            name: "frontier".to_string(),
            stations: vec![
                StationSetup {
                    kind: StationKind::Mining,
                    position: Vec2::new(-600.0, 0.0),
                    materials: 50.0,
                    food: 200.0,
                    credits: 5000,
                },
                StationSetup {
                    kind: StationKind::Agricultural,
                    position: Vec2::new(600.0, 0.0),
                    materials: 150.0,
                    food: 60.0,
                    credits: 5000,
                },
                StationSetup {
                    kind: StationKind::Pirate,
                    position: Vec2::new(0.0, -700.0),
                    materials: 40.0,
                    food: 80.0,
                    credits: 2000,
                },
                StationSetup {
                    kind: StationKind::Police,
                    position: Vec2::new(0.0, 700.0),
                    materials: 40.0,
                    food: 80.0,
                    credits: 3000,
                },
            ],
            gates: vec![Vec2::new(-1000.0, 800.0), Vec2::new(1000.0, -800.0)],
            asteroid_field: AsteroidField {
                center: Vec2::new(-200.0, -300.0),
                radius: 250.0,
                count: 12,
                ore_min: 6,
                ore_max: 14,
            },
            traders: 3,
            miners: 2,
            freighters: 2,
            pirates: 2,
            police: 1,
            trader_starting_credits: 1000,
            spawn_player: true,
            player_start: Vec2::ZERO,
        }
    }
}

impl ZoneConfig {
    /// Parse a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| SimError::ConfigParseError(e.to_string()))
    }
}

/// All live entities of a running session.
#[derive(Debug, Clone, Default)]
pub struct Zone {
    /// Stations.
    pub stations: Vec<Station>,
    /// The global order pool.
    pub orders: OrderBook,
    /// Pirate raiders.
    pub pirates: Vec<Pirate>,
    /// Police patrol ships.
    pub police: Vec<Police>,
    /// Trading ships.
    pub traders: Vec<Trader>,
    /// Mining ships.
    pub miners: Vec<Miner>,
    /// Civilian freighters.
    pub freighters: Vec<Freighter>,
    /// Asteroid field.
    pub asteroids: Vec<Asteroid>,
    /// Jump gates.
    pub gates: Vec<Gate>,
    /// Active distress beacons.
    pub beacons: Vec<DistressBeacon>,
    /// Projectiles in flight.
    pub projectiles: Vec<Projectile>,
    /// The player ship, if spawned and alive.
    pub player: Option<PlayerShip>,
    pub(crate) next_id: EntityId,
}

impl Zone {
    /// Build a session from a config, rolling spawn stats from `rng`.
    pub fn from_config<R: Rng>(config: &ZoneConfig, rng: &mut R) -> Self {
        let mut zone = Self {
            orders: OrderBook::new(),
            next_id: 1,
            ..Default::default()
        };

        for setup in &config.stations {
            let id = zone.alloc_id();
            zone.stations.push(Station::new(
                id,
                setup.kind,
                setup.position,
                setup.materials,
                setup.food,
                setup.credits,
            ));
        }

        for &position in &config.gates {
            let id = zone.alloc_id();
            zone.gates.push(Gate { id, position });
        }

        let field = &config.asteroid_field;
        for _ in 0..field.count {
            let id = zone.alloc_id();
            zone.asteroids.push(Asteroid {
                id,
                position: random_point_near(field.center, field.radius, rng),
                ore: rng.gen_range(field.ore_min..=field.ore_max),
            });
        }

        if config.spawn_player {
            let id = zone.alloc_id();
            zone.player = Some(PlayerShip::new(id, config.player_start));
        }

        let civilian_anchors: Vec<Vec2> = zone
            .stations
            .iter()
            .filter(|s| s.kind != StationKind::Pirate)
            .map(|s| s.position)
            .collect();

        for i in 0..config.traders {
            let anchor = civilian_anchors
                .get(i % civilian_anchors.len().max(1))
                .copied()
                .unwrap_or(Vec2::ZERO);
            let position = random_point_near(anchor, 120.0, rng);
            zone.spawn_trader(position, config.trader_starting_credits, rng);
        }

        let mining_homes: Vec<(EntityId, Vec2)> = zone
            .stations
            .iter()
            .filter(|s| s.kind == StationKind::Mining)
            .map(|s| (s.id, s.position))
            .collect();
        for i in 0..config.miners {
            let (home, anchor) = mining_homes
                .get(i % mining_homes.len().max(1))
                .copied()
                .unwrap_or((0, Vec2::ZERO));
            let position = random_point_near(anchor, 120.0, rng);
            zone.spawn_miner(position, home, rng);
        }

        for i in 0..config.freighters {
            let anchor = civilian_anchors
                .get(i % civilian_anchors.len().max(1))
                .copied()
                .unwrap_or(Vec2::ZERO);
            let position = random_point_near(anchor, 200.0, rng);
            zone.spawn_freighter(position, rng);
        }

        let pirate_anchor = zone
            .stations
            .iter()
            .find(|s| s.kind == StationKind::Pirate)
            .map_or(Vec2::ZERO, |s| s.position);
        for _ in 0..config.pirates {
            let position = random_point_near(pirate_anchor, 200.0, rng);
            zone.spawn_pirate(position, rng);
        }

        let police_anchor = zone
            .stations
            .iter()
            .find(|s| s.kind == StationKind::Police)
            .map_or(Vec2::ZERO, |s| s.position);
        for _ in 0..config.police {
            let position = random_point_near(police_anchor, 150.0, rng);
            zone.spawn_police(position, rng);
        }

        zone
    }

    /// Allocate a fresh entity id. Ids are never reused.
    pub fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a pirate with rolled stats.
    pub fn spawn_pirate<R: Rng>(&mut self, position: Vec2, rng: &mut R) -> EntityId {
        let spec = spec(ShipClass::Pirate);
        let id = self.alloc_id();
        self.pirates.push(Pirate::new(
            id,
            position,
            spec.roll_speed(rng),
            spec.roll_hull(rng),
        ));
        id
    }

    /// Spawn a police ship with rolled stats.
    pub fn spawn_police<R: Rng>(&mut self, position: Vec2, rng: &mut R) -> EntityId {
        let spec = spec(ShipClass::Police);
        let id = self.alloc_id();
        self.police.push(Police::new(
            id,
            position,
            spec.roll_speed(rng),
            spec.roll_hull(rng),
        ));
        id
    }

    /// Spawn a trader with rolled stats.
    pub fn spawn_trader<R: Rng>(
        &mut self,
        position: Vec2,
        credits: i64,
        rng: &mut R,
    ) -> EntityId {
        let spec = spec(ShipClass::Trader);
        let id = self.alloc_id();
        self.traders.push(Trader::new(
            id,
            position,
            spec.roll_speed(rng),
            spec.roll_hull(rng),
            credits,
        ));
        id
    }

    /// Spawn a miner homed at a station, with rolled stats.
    pub fn spawn_miner<R: Rng>(&mut self, position: Vec2, home: EntityId, rng: &mut R) -> EntityId {
        let spec = spec(ShipClass::Miner);
        let id = self.alloc_id();
        self.miners.push(Miner::new(
            id,
            position,
            spec.roll_speed(rng),
            spec.roll_hull(rng),
            home,
        ));
        id
    }

    /// Spawn a freighter with rolled stats.
    pub fn spawn_freighter<R: Rng>(&mut self, position: Vec2, rng: &mut R) -> EntityId {
        let spec = spec(ShipClass::Freighter);
        let id = self.alloc_id();
        self.freighters.push(Freighter::new(
            id,
            position,
            spec.roll_speed(rng),
            spec.roll_hull(rng),
        ));
        id
    }

    /// Raise a distress beacon.
    pub fn raise_beacon(&mut self, position: Vec2, source: EntityId) -> EntityId {
        let id = self.alloc_id();
        self.beacons.push(DistressBeacon::new(id, position, source));
        id
    }

    /// The designated police station, if the zone has one.
    #[must_use]
    pub fn police_station(&self) -> Option<EntityId> {
        self.stations
            .iter()
            .find(|s| s.kind == StationKind::Police)
            .map(|s| s.id)
    }

    /// Station positions, for the police patrol circuit.
    #[must_use]
    pub fn station_positions(&self) -> Vec<Vec2> {
        self.stations.iter().map(|s| s.position).collect()
    }

    /// Station and gate positions, for freighter cruising.
    #[must_use]
    pub fn cruise_waypoints(&self) -> Vec<Vec2> {
        self.stations
            .iter()
            .map(|s| s.position)
            .chain(self.gates.iter().map(|g| g.position))
            .collect()
    }

    /// Total live ship count (player included).
    #[must_use]
    pub fn ship_count(&self) -> usize {
        self.pirates.len()
            + self.police.len()
            + self.traders.len()
            + self.miners.len()
            + self.freighters.len()
            + usize::from(self.player.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_config_spawns_populations() {
        let config = ZoneConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let zone = Zone::from_config(&config, &mut rng);

        assert_eq!(zone.stations.len(), 4);
        assert_eq!(zone.gates.len(), 2);
        assert_eq!(zone.asteroids.len(), 12);
        assert_eq!(zone.traders.len(), 3);
        assert_eq!(zone.miners.len(), 2);
        assert_eq!(zone.freighters.len(), 2);
        assert_eq!(zone.pirates.len(), 2);
        assert_eq!(zone.police.len(), 1);
        assert!(zone.player.is_some());
        assert!(zone.police_station().is_some());
    }

    #[test]
    fn test_ids_are_unique() {
        let config = ZoneConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let zone = Zone::from_config(&config, &mut rng);

        let mut ids: Vec<EntityId> = Vec::new();
        ids.extend(zone.stations.iter().map(|s| s.id));
        ids.extend(zone.gates.iter().map(|g| g.id));
        ids.extend(zone.asteroids.iter().map(|a| a.id));
        ids.extend(zone.traders.iter().map(|t| t.id));
        ids.extend(zone.miners.iter().map(|m| m.id));
        ids.extend(zone.freighters.iter().map(|f| f.id));
        ids.extend(zone.pirates.iter().map(|p| p.id));
        ids.extend(zone.police.iter().map(|p| p.id));
        ids.extend(zone.player.iter().map(|p| p.id));

        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_miners_are_homed_at_mining_stations() {
        let config = ZoneConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let zone = Zone::from_config(&config, &mut rng);

        for miner in &zone.miners {
            let home = zone.stations.iter().find(|s| s.id == miner.home).unwrap();
            assert_eq!(home.kind, StationKind::Mining);
        }
    }

    #[test]
    fn test_config_ron_round_trip() {
        let config = ZoneConfig::default();
        let ron = ron::to_string(&config).unwrap();
        let parsed = ZoneConfig::from_ron_str(&ron).unwrap();
        assert_eq!(parsed.stations.len(), config.stations.len());
        assert_eq!(parsed.name, config.name);
    }

    #[test]
    fn test_bad_ron_is_a_config_error() {
        let err = ZoneConfig::from_ron_str("(not a zone").unwrap_err();
        assert!(matches!(err, SimError::ConfigParseError(_)));
    }
}
