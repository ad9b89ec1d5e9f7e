//! Simulation events and UI notices.
//!
//! The core never touches presentation state. Anything the outer layers
//! might care about - trades, kills, beacons, AI decisions - is emitted as
//! a [`ZoneEvent`] and collected into the tick report. Downstream tooling
//! filters on [`EventCategory`], so every variant maps to exactly one.
//!
//! [`Notice`] is the fire-and-forget "show this to the player" channel.

use crate::components::{EntityId, Resource};
use crate::orders::{OrderId, OrderKind};
use crate::ships::ShipClass;

/// Category tags for event filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Trades, orders, credits.
    Economic,
    /// Damage, kills, projectiles.
    Combat,
    /// Station production and spawning duties.
    Station,
    /// Agent state transitions.
    AiDecision,
    /// Beacons and threat reports.
    Security,
    /// Player-specific outcomes.
    Player,
}

impl EventCategory {
    /// Stable name for reports and log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Economic => "economic",
            Self::Combat => "combat",
            Self::Station => "station",
            Self::AiDecision => "ai_decision",
            Self::Security => "security",
            Self::Player => "player",
        }
    }
}

/// Events generated during a simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneEvent {
    /// A station posted a new order to the global pool.
    OrderCreated {
        /// The order.
        order: OrderId,
        /// Issuing station.
        station: EntityId,
        /// Order kind.
        kind: OrderKind,
        /// Traded resource (meaningless for police funding).
        resource: Resource,
        /// Units requested.
        quantity: u32,
        /// Credits per unit.
        unit_price: i64,
    },
    /// A trader claimed an order.
    OrderClaimed {
        /// The order.
        order: OrderId,
        /// Claiming trader.
        trader: EntityId,
    },
    /// A trader released its claim (abandonment or failed pickup).
    OrderReleased {
        /// The order.
        order: OrderId,
        /// Releasing trader.
        trader: EntityId,
    },
    /// An order was fulfilled and removed from the pool.
    OrderCompleted {
        /// The order.
        order: OrderId,
        /// Fulfilling trader.
        trader: EntityId,
    },
    /// A trader bought cargo at a station.
    CargoPickedUp {
        /// The trader.
        trader: EntityId,
        /// The station sold from.
        station: EntityId,
        /// Resource moved.
        resource: Resource,
        /// Units moved.
        quantity: u32,
        /// Credits the trader paid.
        paid: i64,
    },
    /// A trader delivered cargo to a station.
    CargoDelivered {
        /// The trader.
        trader: EntityId,
        /// The receiving station.
        station: EntityId,
        /// Resource moved.
        resource: Resource,
        /// Units moved.
        quantity: u32,
        /// Credits the trader earned.
        earned: i64,
    },
    /// A police-funding donation arrived at the police station.
    PoliceFunded {
        /// Donating station.
        from: EntityId,
        /// Receiving police station.
        to: EntityId,
        /// Credits transferred.
        amount: i64,
    },
    /// A trader ran out of credits and was removed.
    TraderBankrupt {
        /// The trader.
        trader: EntityId,
    },

    /// A station spawned a new ship (pirate raider or funded police).
    ShipCommissioned {
        /// Spawning station.
        station: EntityId,
        /// The new ship.
        ship: EntityId,
        /// Ship class.
        class: ShipClass,
    },
    /// A docked miner converted ore into station materials.
    OreRefined {
        /// Receiving station.
        station: EntityId,
        /// The miner.
        miner: EntityId,
        /// Ore units converted.
        amount: u32,
    },

    /// A projectile struck an entity.
    ProjectileHit {
        /// The entity hit.
        target: EntityId,
        /// Damage applied (after shields, for the player).
        damage: i32,
    },
    /// A ship was destroyed.
    ShipDestroyed {
        /// The ship.
        ship: EntityId,
        /// Ship class.
        class: ShipClass,
    },
    /// An asteroid was mined out or shot apart.
    AsteroidDepleted {
        /// The asteroid.
        asteroid: EntityId,
    },
    /// The player earned a kill bounty.
    BountyPaid {
        /// Destroyed ship.
        ship: EntityId,
        /// Credits awarded.
        amount: i64,
    },

    /// An agent changed state.
    StateChanged {
        /// The agent.
        ship: EntityId,
        /// Agent class.
        class: ShipClass,
        /// Name of the state entered.
        state: &'static str,
    },

    /// A distress beacon was raised.
    BeaconRaised {
        /// The beacon.
        beacon: EntityId,
        /// Ship or station that raised it.
        source: EntityId,
    },
    /// A police ship reached a beacon.
    BeaconAnswered {
        /// The beacon.
        beacon: EntityId,
        /// Responding police ship.
        police: EntityId,
    },

    /// The player took damage.
    PlayerHit {
        /// Hull damage applied.
        damage: i32,
        /// Portion absorbed by the shield.
        shield_absorbed: i32,
    },
    /// The player's hull reached zero.
    PlayerDestroyed,
}

impl ZoneEvent {
    /// The category this event belongs to.
    #[must_use]
    pub const fn category(&self) -> EventCategory {
        match self {
            Self::OrderCreated { .. }
            | Self::OrderClaimed { .. }
            | Self::OrderReleased { .. }
            | Self::OrderCompleted { .. }
            | Self::CargoPickedUp { .. }
            | Self::CargoDelivered { .. }
            | Self::PoliceFunded { .. }
            | Self::TraderBankrupt { .. } => EventCategory::Economic,

            Self::ShipCommissioned { .. } | Self::OreRefined { .. } => EventCategory::Station,

            Self::ProjectileHit { .. }
            | Self::ShipDestroyed { .. }
            | Self::AsteroidDepleted { .. }
            | Self::BountyPaid { .. } => EventCategory::Combat,

            Self::StateChanged { .. } => EventCategory::AiDecision,

            Self::BeaconRaised { .. } | Self::BeaconAnswered { .. } => EventCategory::Security,

            Self::PlayerHit { .. } | Self::PlayerDestroyed => EventCategory::Player,
        }
    }
}

/// Category of a player-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeCategory {
    /// Informational messages.
    Info,
    /// Trade confirmations.
    Trade,
    /// Warnings (low hull, nearby pirates).
    Warning,
    /// Combat outcomes.
    Combat,
}

/// A transient message for the UI collaborator. Fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Message text.
    pub text: String,
    /// Display category.
    pub category: NoticeCategory,
}

impl Notice {
    /// Create a new notice.
    #[must_use]
    pub fn new(text: impl Into<String>, category: NoticeCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}
