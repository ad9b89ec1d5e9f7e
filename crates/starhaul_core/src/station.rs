//! Stations and the station economy engine.
//!
//! Each station consumes an input resource, produces an output resource
//! while fed, accrues credits while comfortably stocked, and periodically
//! posts buy/sell orders to the global pool. Prices are scarcity-adjusted
//! in three tiers, and a station never buys a unit for more than it sells
//! one.

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, Resource};
use crate::events::ZoneEvent;
use crate::math::Vec2;
use crate::orders::{OrderBook, OrderId, OrderKind};

/// Per-resource storage cap.
pub const STATION_RESOURCE_MAX: f32 = 250.0;

/// Input stock required before production runs.
pub const FEED_THRESHOLD: f32 = 10.0;

/// Stock level above which a resource counts as comfortably held.
pub const COMFORT_THRESHOLD: f32 = 25.0;

/// Credits accrued per second while both resources are comfortable.
const CREDIT_ACCRUAL_RATE: f32 = 2.0;

/// Seconds between order evaluations.
pub const ORDER_COOLDOWN: f32 = 15.0;

/// Units per posted order.
pub const ORDER_QUANTITY: u32 = 20;

/// Output stock above which a producer posts a sell order.
pub const SELL_THRESHOLD: f32 = 80.0;

/// Stock below which a station posts a buy order.
pub const BUY_THRESHOLD: f32 = 40.0;

/// Scarcity low-water mark: below this, prices spike.
pub const LOW_WATER: f32 = 5.0;

/// Scarcity high-water mark: above this, prices sag.
pub const HIGH_WATER: f32 = 18.0;

/// Credits at or above which a station funds the police.
pub const FUND_POLICE_THRESHOLD: i64 = 8000;

/// Fixed police donation, escrowed at order creation.
pub const POLICE_DONATION: i64 = 1000;

/// Seconds between pirate-station raider spawns.
pub const PIRATE_SPAWN_INTERVAL: f32 = 20.0;

/// Zone-wide pirate population cap.
pub const PIRATE_CAP: usize = 6;

/// Credits a police station converts into one patrol ship.
pub const POLICE_SHIP_COST: i64 = 2500;

/// Zone-wide police population cap.
pub const POLICE_CAP: usize = 4;

/// Radius within which a loitering pirate counts as a station threat.
pub const STATION_THREAT_RADIUS: f32 = 200.0;

/// Minimum seconds between distress beacons from one source.
pub const BEACON_REARM: f32 = 8.0;

/// Station specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationKind {
    /// Consumes food, produces materials.
    Mining,
    /// Consumes materials, produces food.
    Agricultural,
    /// Raider base; consumes food, spawns pirates.
    Pirate,
    /// Patrol base; consumes food, commissions police from donations.
    Police,
}

impl StationKind {
    /// The resource this station burns, and its rate per second.
    #[must_use]
    pub const fn consumption(self) -> (Resource, f32) {
        match self {
            Self::Mining => (Resource::Food, 0.5),
            Self::Agricultural => (Resource::Materials, 0.4),
            Self::Pirate | Self::Police => (Resource::Food, 0.3),
        }
    }

    /// The resource this station produces while fed, and its rate.
    #[must_use]
    pub const fn production(self) -> Option<(Resource, f32)> {
        match self {
            Self::Mining => Some((Resource::Materials, 0.8)),
            Self::Agricultural => Some((Resource::Food, 0.9)),
            Self::Pirate | Self::Police => None,
        }
    }

    /// Stable name for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mining => "mining",
            Self::Agricultural => "agricultural",
            Self::Pirate => "pirate",
            Self::Police => "police",
        }
    }
}

/// A stationary producer/consumer that trades through the order pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Station entity id.
    pub id: EntityId,
    /// Specialization.
    pub kind: StationKind,
    /// World position.
    pub position: Vec2,
    /// Materials stock, clamped to [0, [`STATION_RESOURCE_MAX`]].
    pub materials: f32,
    /// Food stock, clamped to [0, [`STATION_RESOURCE_MAX`]].
    pub food: f32,
    /// Credit balance. Never negative: escrow checks affordability first.
    pub credits: i64,
    /// Sub-credit accrual remainder.
    credit_fraction: f32,
    /// Time since the last order evaluation.
    pub order_timer: f32,
    /// Orders this station issued and has not yet retired.
    pub my_orders: Vec<OrderId>,
    /// Pirate-station raider spawn timer.
    pub spawn_timer: f32,
    /// Seconds until this station may raise another distress beacon.
    pub beacon_rearm: f32,
}

impl Station {
    /// Create a station with a starting stockpile.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: StationKind,
        position: Vec2,
        materials: f32,
        food: f32,
        credits: i64,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            materials,
            food,
            credits,
            credit_fraction: 0.0,
            order_timer: 0.0,
            my_orders: Vec::new(),
            spawn_timer: 0.0,
            beacon_rearm: 0.0,
        }
    }

    /// Current stock of one resource.
    #[must_use]
    pub const fn stock(&self, resource: Resource) -> f32 {
        match resource {
            Resource::Materials => self.materials,
            Resource::Food => self.food,
        }
    }

    fn stock_mut(&mut self, resource: Resource) -> &mut f32 {
        match resource {
            Resource::Materials => &mut self.materials,
            Resource::Food => &mut self.food,
        }
    }

    /// Add stock, clamped to the storage cap.
    pub fn add_stock(&mut self, resource: Resource, amount: f32) {
        let slot = self.stock_mut(resource);
        *slot = (*slot + amount).clamp(0.0, STATION_RESOURCE_MAX);
    }

    /// Remove `quantity` whole units if present. Returns false (and
    /// changes nothing) when the stock cannot cover the request.
    pub fn take_stock(&mut self, resource: Resource, quantity: u32) -> bool {
        let slot = self.stock_mut(resource);
        let requested = quantity as f32;
        if *slot + 1e-3 < requested {
            return false;
        }
        *slot = (*slot - requested).max(0.0);
        true
    }

    /// Re-clamp both stocks. Run every tick: debug tooling may have
    /// poked the fields directly since the last pass.
    pub fn clamp_stocks(&mut self) {
        self.materials = self.materials.clamp(0.0, STATION_RESOURCE_MAX);
        self.food = self.food.clamp(0.0, STATION_RESOURCE_MAX);
    }

    /// Scarcity-adjusted sell price for one unit.
    #[must_use]
    pub fn sell_price(&self, resource: Resource) -> i64 {
        let mult = match self.stock(resource) {
            s if s < LOW_WATER => 1.6,
            s if s > HIGH_WATER => 0.75,
            _ => 1.0,
        };
        (((resource.base_price() as f32) * mult).round() as i64).max(2)
    }

    /// Scarcity-adjusted buy price for one unit. Always strictly below
    /// the sell price.
    #[must_use]
    pub fn buy_price(&self, resource: Resource) -> i64 {
        let mult = match self.stock(resource) {
            s if s < LOW_WATER => 1.4,
            s if s > HIGH_WATER => 0.65,
            _ => 0.9,
        };
        let sell = self.sell_price(resource);
        let raw = ((resource.base_price() as f32) * mult).round() as i64;
        let ceiling = ((sell as f32) * 0.9) as i64;
        raw.min(ceiling).min(sell - 1).max(1)
    }

    /// Check the station can cover a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: i64) -> bool {
        self.credits >= cost
    }

    /// Drop a retired order id from the own-orders list. Idempotent.
    pub fn retire_order(&mut self, id: OrderId) {
        self.my_orders.retain(|&o| o != id);
    }

    /// Check whether this station already has an open order of the given
    /// kind and resource in the pool.
    fn has_open_order(&self, book: &OrderBook, kind: OrderKind, resource: Resource) -> bool {
        self.my_orders.iter().any(|&id| {
            book.get(id)
                .is_some_and(|o| o.kind == kind && (kind == OrderKind::FundPolice || o.resource == resource))
        })
    }
}

/// Advance every station's economy by one tick and post any due orders.
///
/// `police_station` designates the funding recipient; with no police
/// station in the zone, no funding orders are created.
pub fn economy_system(
    dt: f32,
    game_time: f64,
    stations: &mut [Station],
    book: &mut OrderBook,
    police_station: Option<EntityId>,
) -> Vec<ZoneEvent> {
    let mut events = Vec::new();

    for station in stations.iter_mut() {
        // Consume input
        let (input, consumption_rate) = station.kind.consumption();
        station.add_stock(input, -(consumption_rate * dt));

        // Produce output while fed
        if let Some((output, production_rate)) = station.kind.production() {
            if station.stock(input) > FEED_THRESHOLD {
                station.add_stock(output, production_rate * dt);
            }
        }

        // Efficient operation pays
        if station.materials > COMFORT_THRESHOLD && station.food > COMFORT_THRESHOLD {
            station.credit_fraction += CREDIT_ACCRUAL_RATE * dt;
            let whole = station.credit_fraction.floor();
            station.credits += whole as i64;
            station.credit_fraction -= whole;
        }

        station.clamp_stocks();

        // Order evaluation on a fixed cooldown
        station.order_timer += dt;
        if station.order_timer >= ORDER_COOLDOWN {
            station.order_timer = 0.0;
            evaluate_orders(station, book, game_time, police_station, &mut events);
        }
    }

    events
}

/// Post the orders a station's thresholds call for.
fn evaluate_orders(
    station: &mut Station,
    book: &mut OrderBook,
    game_time: f64,
    police_station: Option<EntityId>,
    events: &mut Vec<ZoneEvent>,
) {
    // Producers offload surplus output
    if let Some((output, _)) = station.kind.production() {
        if station.stock(output) > SELL_THRESHOLD
            && !station.has_open_order(book, OrderKind::Sell, output)
        {
            let price = station.sell_price(output);
            let id = book.create(
                OrderKind::Sell,
                output,
                ORDER_QUANTITY,
                price,
                station.id,
                game_time,
            );
            station.my_orders.push(id);
            events.push(ZoneEvent::OrderCreated {
                order: id,
                station: station.id,
                kind: OrderKind::Sell,
                resource: output,
                quantity: ORDER_QUANTITY,
                unit_price: price,
            });
        }
    }

    // Anything running low gets restocked, escrow permitting
    for resource in Resource::ALL {
        if station.stock(resource) >= BUY_THRESHOLD {
            continue;
        }
        // Producers never buy their own output
        if station.kind.production().is_some_and(|(out, _)| out == resource) {
            continue;
        }
        if station.has_open_order(book, OrderKind::Buy, resource) {
            continue;
        }
        let price = station.buy_price(resource);
        let escrow = price * ORDER_QUANTITY as i64;
        if !station.can_afford(escrow) {
            continue;
        }
        station.credits -= escrow;
        let id = book.create(
            OrderKind::Buy,
            resource,
            ORDER_QUANTITY,
            price,
            station.id,
            game_time,
        );
        station.my_orders.push(id);
        events.push(ZoneEvent::OrderCreated {
            order: id,
            station: station.id,
            kind: OrderKind::Buy,
            resource,
            quantity: ORDER_QUANTITY,
            unit_price: price,
        });
    }

    // Wealthy civilian stations bankroll the police
    if station.kind != StationKind::Police
        && station.credits >= FUND_POLICE_THRESHOLD
        && police_station.is_some()
        && !station.has_open_order(book, OrderKind::FundPolice, Resource::Materials)
    {
        station.credits -= POLICE_DONATION;
        let id = book.create(
            OrderKind::FundPolice,
            Resource::Materials,
            1,
            POLICE_DONATION,
            station.id,
            game_time,
        );
        station.my_orders.push(id);
        events.push(ZoneEvent::OrderCreated {
            order: id,
            station: station.id,
            kind: OrderKind::FundPolice,
            resource: Resource::Materials,
            quantity: 1,
            unit_price: POLICE_DONATION,
        });
    }
}
