//! # Starhaul Core
//!
//! Trade-and-combat simulation core for the Starhaul arcade game.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No wall clock (the embedding layer supplies delta time)
//! - No unseeded randomness (one seeded RNG owned by the simulation)
//!
//! This separation enables:
//! - Headless balance runs and CI verification
//! - Deterministic replays from a seed
//! - A thin renderer/UI layer that just consumes tick reports
//!
//! ## Crate Structure
//!
//! - [`components`] - shared entity data (bodies, health, cargo, beacons)
//! - [`ships`] - per-class tuning table
//! - [`movement`] - steering primitives and per-tick damping
//! - [`station`] / [`orders`] - the station economy and the order pool
//! - [`pirate`], [`police`], [`trader`], [`miner`], [`friendly`] - agent
//!   state machines
//! - [`combat`] - projectiles, homing, splash, collision
//! - [`player`] - the input-driven player ship
//! - [`zone`] - zone config and session spawning
//! - [`simulation`] - the fixed-order tick orchestrator

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod components;
pub mod error;
pub mod events;
pub mod friendly;
pub mod math;
pub mod miner;
pub mod movement;
pub mod orders;
pub mod pirate;
pub mod player;
pub mod police;
pub mod ships;
pub mod simulation;
pub mod station;
pub mod trader;
pub mod zone;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{Impact, Projectile};
    pub use crate::components::{
        Asteroid, Body, Cargo, DistressBeacon, EntityId, Gate, Health, Resource,
    };
    pub use crate::error::{Result, SimError};
    pub use crate::events::{EventCategory, Notice, NoticeCategory, ZoneEvent};
    pub use crate::math::Vec2;
    pub use crate::orders::{Order, OrderBook, OrderId, OrderKind};
    pub use crate::player::{PlayerIntent, PlayerShip};
    pub use crate::ships::{spec, ShipClass, ShipSpec};
    pub use crate::simulation::{Simulation, TickReport};
    pub use crate::station::{Station, StationKind};
    pub use crate::zone::{Zone, ZoneConfig};
}
