//! Trading ship state machine.
//!
//! Traders claim orders from the global pool, haul goods between
//! stations, and courier police donations. Every claim is released on
//! abandonment so another trader can retry, and every state carries the
//! class timeout as its liveness backstop.

use rand::Rng;

use crate::components::{Body, Cargo, EntityId, Health};
use crate::events::ZoneEvent;
use crate::math::Vec2;
use crate::movement;
use crate::orders::{OrderBook, OrderId, OrderKind};
use crate::ships::{ShipClass, TRADER_SPEC};
use crate::station::Station;

/// Arrival radius for docking at a station.
pub const DOCK_RADIUS: f32 = 30.0;

/// Minimum dock duration in seconds.
pub const DOCK_TIME_MIN: f32 = 2.0;

/// Maximum dock duration in seconds.
pub const DOCK_TIME_MAX: f32 = 5.0;

/// Stock above which a station counts as a sourcing surplus.
pub const SURPLUS_STOCK: f32 = 30.0;

/// Courier fee paid by the police station on a funding delivery.
pub const COURIER_FEE: i64 = 50;

/// Wander radius while waiting for work.
const IDLE_PATROL_RADIUS: f32 = 150.0;

/// Trader behavior states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraderState {
    /// Scanning the pool for a serviceable order.
    SeekingOrder,
    /// En route to the pickup station.
    TravelingToPickup,
    /// Docked, executing the pickup.
    PickingUp,
    /// En route to the delivery station.
    TravelingToDelivery,
    /// Docked, executing the delivery.
    Delivering,
    /// Heading back to the issuing station after a funding run.
    ReturningToOrigin,
}

impl TraderState {
    /// Stable name for AI-decision events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SeekingOrder => "seeking_order",
            Self::TravelingToPickup => "traveling_to_pickup",
            Self::PickingUp => "picking_up",
            Self::TravelingToDelivery => "traveling_to_delivery",
            Self::Delivering => "delivering",
            Self::ReturningToOrigin => "returning_to_origin",
        }
    }
}

/// A merchant ship servicing the order pool.
#[derive(Debug, Clone)]
pub struct Trader {
    /// Entity id.
    pub id: EntityId,
    /// Position/velocity/speed cap.
    pub body: Body,
    /// Hull.
    pub health: Health,
    /// Credit balance. At or below zero the trader is removed.
    pub credits: i64,
    /// Cargo hold.
    pub cargo: Cargo,
    /// Current behavior state.
    pub state: TraderState,
    /// The claimed order, if any.
    pub order: Option<OrderId>,
    /// Station for the pickup leg.
    pub pickup_station: Option<EntityId>,
    /// Station for the delivery leg.
    pub delivery_station: Option<EntityId>,
    /// Issuing station of a funding run, for the return leg.
    pub origin_station: Option<EntityId>,
    /// Escrowed donation credits being couriered.
    pub carrying_donation: i64,
    /// Remaining dock time; positive only while docked.
    pub dock_timer: f32,
    /// The planned dock action has been attempted this dock.
    pub dock_action_done: bool,
    /// Seconds spent in the current state.
    pub state_timer: f32,
    /// Idle wander waypoint.
    pub waypoint: Vec2,
    /// Seconds until this trader may raise another distress beacon.
    pub beacon_rearm: f32,
}

impl Trader {
    /// Create a trader at a position.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, max_speed: f32, hull: i32, credits: i64) -> Self {
        Self {
            id,
            body: Body::new(position, max_speed),
            health: Health {
                hull,
                max_hull: hull,
            },
            credits,
            cargo: Cargo::new(TRADER_SPEC.cargo_capacity),
            state: TraderState::SeekingOrder,
            order: None,
            pickup_station: None,
            delivery_station: None,
            origin_station: None,
            carrying_donation: 0,
            dock_timer: 0.0,
            dock_action_done: false,
            state_timer: 0.0,
            waypoint: position,
            beacon_rearm: 0.0,
        }
    }

    /// Docked traders are immobile and not valid pirate prey.
    #[must_use]
    pub const fn is_docked(&self) -> bool {
        matches!(self.state, TraderState::PickingUp | TraderState::Delivering)
    }

    fn set_state(&mut self, state: TraderState, events: &mut Vec<ZoneEvent>) {
        if self.state != state {
            self.state = state;
            self.state_timer = 0.0;
            events.push(ZoneEvent::StateChanged {
                ship: self.id,
                class: ShipClass::Trader,
                state: state.name(),
            });
        }
    }

    /// Release any held claim and fall back to seeking.
    ///
    /// Used by the per-state timeout, failed trades, and by the
    /// orchestrator when the trader is destroyed.
    pub fn abandon(&mut self, book: &mut OrderBook, events: &mut Vec<ZoneEvent>) {
        if let Some(order) = self.order.take() {
            if book.release(order, self.id) {
                events.push(ZoneEvent::OrderReleased {
                    order,
                    trader: self.id,
                });
            }
        }
        self.pickup_station = None;
        self.delivery_station = None;
        self.origin_station = None;
        self.carrying_donation = 0;
        self.dock_timer = 0.0;
        self.dock_action_done = false;
        self.set_state(TraderState::SeekingOrder, events);
    }

    fn start_dock<R: Rng>(&mut self, state: TraderState, rng: &mut R, events: &mut Vec<ZoneEvent>) {
        self.dock_timer = rng.gen_range(DOCK_TIME_MIN..=DOCK_TIME_MAX);
        self.dock_action_done = false;
        self.body.velocity = Vec2::ZERO;
        self.set_state(state, events);
    }
}

fn station_position(stations: &[Station], id: EntityId) -> Option<Vec2> {
    stations.iter().find(|s| s.id == id).map(|s| s.position)
}

fn station_mut(stations: &mut [Station], id: EntityId) -> Option<&mut Station> {
    stations.iter_mut().find(|s| s.id == id)
}

/// The legs of a claimed order.
struct Plan {
    order: OrderId,
    pickup: Option<EntityId>,
    delivery: Option<EntityId>,
    origin: Option<EntityId>,
}

/// Find the nearest serviceable order for a trader.
fn select_order(
    trader: &Trader,
    stations: &[Station],
    book: &OrderBook,
    police_station: Option<EntityId>,
) -> Option<Plan> {
    let mut best: Option<(f32, Plan)> = None;

    for id in book.sorted_ids() {
        let Some(order) = book.get(id) else { continue };
        if !order.is_open() {
            continue;
        }
        let Some(issuer_pos) = station_position(stations, order.station) else {
            continue;
        };

        let candidate = match order.kind {
            OrderKind::Sell => {
                // Buy the goods up front, so both credits and space must fit
                if trader.credits < order.total_value()
                    || trader.cargo.space() < order.quantity
                {
                    None
                } else {
                    Some((
                        trader.body.distance_to(issuer_pos),
                        Plan {
                            order: id,
                            pickup: Some(order.station),
                            delivery: None,
                            origin: None,
                        },
                    ))
                }
            }
            OrderKind::Buy => {
                if trader.cargo.amount(order.resource) >= order.quantity {
                    // Already carrying the goods: deliver directly
                    Some((
                        trader.body.distance_to(issuer_pos),
                        Plan {
                            order: id,
                            pickup: None,
                            delivery: Some(order.station),
                            origin: None,
                        },
                    ))
                } else if trader.cargo.space() >= order.quantity {
                    // Source from the nearest surplus station
                    stations
                        .iter()
                        .filter(|s| s.id != order.station)
                        .filter(|s| {
                            s.stock(order.resource) > SURPLUS_STOCK
                                && s.stock(order.resource) >= order.quantity as f32
                        })
                        .filter(|s| {
                            trader.credits
                                >= s.sell_price(order.resource) * order.quantity as i64
                        })
                        .map(|s| (trader.body.distance_to(s.position), s.id))
                        .min_by(|a, b| a.0.total_cmp(&b.0))
                        .map(|(dist, source)| {
                            (
                                dist,
                                Plan {
                                    order: id,
                                    pickup: Some(source),
                                    delivery: Some(order.station),
                                    origin: None,
                                },
                            )
                        })
                } else {
                    None
                }
            }
            OrderKind::FundPolice => police_station.map(|police| {
                (
                    trader.body.distance_to(issuer_pos),
                    Plan {
                        order: id,
                        pickup: Some(order.station),
                        delivery: Some(police),
                        origin: Some(order.station),
                    },
                )
            }),
        };

        if let Some((dist, plan)) = candidate {
            if best.as_ref().map_or(true, |(d, _)| dist < *d) {
                best = Some((dist, plan));
            }
        }
    }

    best.map(|(_, plan)| plan)
}

/// After buying from a sell order, find a matching buy order to deliver to.
fn select_delivery(
    trader: &Trader,
    stations: &[Station],
    book: &OrderBook,
    resource: crate::components::Resource,
) -> Option<OrderId> {
    book.sorted_ids()
        .into_iter()
        .filter_map(|id| book.get(id).copied())
        .filter(|o| o.kind == OrderKind::Buy && o.is_open() && o.resource == resource)
        .filter(|o| trader.cargo.amount(resource) >= o.quantity)
        .filter_map(|o| {
            station_position(stations, o.station).map(|p| (trader.body.distance_to(p), o.id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

/// Advance every trader by one tick.
pub fn trader_system<R: Rng>(
    traders: &mut [Trader],
    stations: &mut [Station],
    book: &mut OrderBook,
    police_station: Option<EntityId>,
    dt: f32,
    rng: &mut R,
    events: &mut Vec<ZoneEvent>,
) {
    for trader in traders.iter_mut() {
        trader.state_timer += dt;
        trader.beacon_rearm = (trader.beacon_rearm - dt).max(0.0);

        // Liveness: no state may outlive the class timeout
        if trader.state != TraderState::SeekingOrder
            && trader.state_timer > TRADER_SPEC.state_timeout
        {
            trader.abandon(book, events);
        }

        match trader.state {
            TraderState::SeekingOrder => {
                if let Some(plan) = select_order(trader, stations, book, police_station) {
                    if book.claim(plan.order, trader.id) {
                        events.push(ZoneEvent::OrderClaimed {
                            order: plan.order,
                            trader: trader.id,
                        });
                        trader.order = Some(plan.order);
                        trader.pickup_station = plan.pickup;
                        trader.delivery_station = plan.delivery;
                        trader.origin_station = plan.origin;
                        let next = if plan.pickup.is_some() {
                            TraderState::TravelingToPickup
                        } else {
                            TraderState::TravelingToDelivery
                        };
                        trader.set_state(next, events);
                    }
                } else {
                    let home = trader.body.position;
                    movement::patrol(
                        &mut trader.body,
                        &mut trader.waypoint,
                        home,
                        IDLE_PATROL_RADIUS,
                        dt,
                        rng,
                    );
                }
                movement::integrate(&mut trader.body, dt, 1.0);
            }

            TraderState::TravelingToPickup => {
                let destination = trader
                    .order
                    .filter(|&o| book.get(o).is_some_and(|ord| ord.claimed_by == Some(trader.id)))
                    .and(trader.pickup_station)
                    .and_then(|s| station_position(stations, s));
                let Some(destination) = destination else {
                    trader.abandon(book, events);
                    movement::integrate(&mut trader.body, dt, 1.0);
                    continue;
                };

                let dist = movement::seek(&mut trader.body, destination, dt);
                if dist <= DOCK_RADIUS {
                    trader.start_dock(TraderState::PickingUp, rng, events);
                } else {
                    movement::integrate(&mut trader.body, dt, 1.0);
                }
            }

            TraderState::PickingUp => {
                if !trader.dock_action_done {
                    trader.dock_action_done = true;
                    execute_pickup(trader, stations, book, events);
                }
                trader.dock_timer -= dt;
                if trader.dock_timer <= 0.0 {
                    trader.dock_timer = 0.0;
                    if trader.order.is_some() && trader.delivery_station.is_some() {
                        trader.set_state(TraderState::TravelingToDelivery, events);
                    } else {
                        trader.set_state(TraderState::SeekingOrder, events);
                    }
                }
            }

            TraderState::TravelingToDelivery => {
                let destination = trader
                    .order
                    .filter(|&o| book.get(o).is_some_and(|ord| ord.claimed_by == Some(trader.id)))
                    .and(trader.delivery_station)
                    .and_then(|s| station_position(stations, s));
                let Some(destination) = destination else {
                    trader.abandon(book, events);
                    movement::integrate(&mut trader.body, dt, 1.0);
                    continue;
                };

                let dist = movement::seek(&mut trader.body, destination, dt);
                if dist <= DOCK_RADIUS {
                    trader.start_dock(TraderState::Delivering, rng, events);
                } else {
                    movement::integrate(&mut trader.body, dt, 1.0);
                }
            }

            TraderState::Delivering => {
                if !trader.dock_action_done {
                    trader.dock_action_done = true;
                    execute_delivery(trader, stations, book, events);
                }
                trader.dock_timer -= dt;
                if trader.dock_timer <= 0.0 {
                    trader.dock_timer = 0.0;
                    if trader.origin_station.is_some() {
                        trader.set_state(TraderState::ReturningToOrigin, events);
                    } else {
                        trader.set_state(TraderState::SeekingOrder, events);
                    }
                }
            }

            TraderState::ReturningToOrigin => {
                let Some(destination) = trader
                    .origin_station
                    .and_then(|s| station_position(stations, s))
                else {
                    trader.origin_station = None;
                    trader.set_state(TraderState::SeekingOrder, events);
                    movement::integrate(&mut trader.body, dt, 1.0);
                    continue;
                };

                let dist = movement::seek(&mut trader.body, destination, dt);
                movement::integrate(&mut trader.body, dt, 1.0);
                if dist <= DOCK_RADIUS {
                    trader.origin_station = None;
                    trader.set_state(TraderState::SeekingOrder, events);
                }
            }
        }
    }
}

/// Run the planned pickup exactly once per dock.
fn execute_pickup(
    trader: &mut Trader,
    stations: &mut [Station],
    book: &mut OrderBook,
    events: &mut Vec<ZoneEvent>,
) {
    let Some(order_id) = trader.order else { return };
    let Some(order) = book.get(order_id).copied() else {
        trader.abandon(book, events);
        return;
    };
    let Some(station_id) = trader.pickup_station else {
        return;
    };
    let Some(station) = station_mut(stations, station_id) else {
        trader.abandon(book, events);
        return;
    };

    match order.kind {
        OrderKind::Sell => {
            let cost = order.total_value();
            if trader.credits >= cost && station.take_stock(order.resource, order.quantity) {
                trader.credits -= cost;
                station.credits += cost;
                trader.cargo.load(order.resource, order.quantity);
                events.push(ZoneEvent::CargoPickedUp {
                    trader: trader.id,
                    station: station_id,
                    resource: order.resource,
                    quantity: order.quantity,
                    paid: cost,
                });

                // The sell side is done; retire it
                if book.complete(order_id).is_some() {
                    station.retire_order(order_id);
                    events.push(ZoneEvent::OrderCompleted {
                        order: order_id,
                        trader: trader.id,
                    });
                }
                trader.order = None;

                // Chain into a matching buy order if one is open
                if let Some(buy) = select_delivery(trader, stations, book, order.resource) {
                    if book.claim(buy, trader.id) {
                        events.push(ZoneEvent::OrderClaimed {
                            order: buy,
                            trader: trader.id,
                        });
                        trader.order = Some(buy);
                        trader.delivery_station = book.get(buy).map(|o| o.station);
                    }
                }
            } else {
                // Stock ran dry since the claim: release and leave the
                // order for another attempt
                if book.release(order_id, trader.id) {
                    events.push(ZoneEvent::OrderReleased {
                        order: order_id,
                        trader: trader.id,
                    });
                }
                trader.order = None;
                trader.delivery_station = None;
            }
        }

        OrderKind::Buy => {
            // Sourcing leg: buy at the surplus station's current price
            let cost = station.sell_price(order.resource) * order.quantity as i64;
            if trader.credits >= cost && station.take_stock(order.resource, order.quantity) {
                trader.credits -= cost;
                station.credits += cost;
                trader.cargo.load(order.resource, order.quantity);
                events.push(ZoneEvent::CargoPickedUp {
                    trader: trader.id,
                    station: station_id,
                    resource: order.resource,
                    quantity: order.quantity,
                    paid: cost,
                });
            } else {
                if book.release(order_id, trader.id) {
                    events.push(ZoneEvent::OrderReleased {
                        order: order_id,
                        trader: trader.id,
                    });
                }
                trader.order = None;
                trader.delivery_station = None;
            }
        }

        OrderKind::FundPolice => {
            // Collect the escrowed donation voucher
            trader.carrying_donation = order.total_value();
        }
    }
}

/// Run the planned delivery exactly once per dock.
fn execute_delivery(
    trader: &mut Trader,
    stations: &mut [Station],
    book: &mut OrderBook,
    events: &mut Vec<ZoneEvent>,
) {
    let Some(order_id) = trader.order else { return };
    let Some(order) = book.get(order_id).copied() else {
        trader.abandon(book, events);
        return;
    };
    let Some(station_id) = trader.delivery_station else {
        return;
    };
    let Some(station) = station_mut(stations, station_id) else {
        trader.abandon(book, events);
        return;
    };

    match order.kind {
        OrderKind::Buy => {
            if trader.cargo.amount(order.resource) >= order.quantity {
                trader.cargo.unload(order.resource, order.quantity);
                station.add_stock(order.resource, order.quantity as f32);
                // Payment was escrowed when the order was created
                trader.credits += order.total_value();
                events.push(ZoneEvent::CargoDelivered {
                    trader: trader.id,
                    station: station_id,
                    resource: order.resource,
                    quantity: order.quantity,
                    earned: order.total_value(),
                });
                if book.complete(order_id).is_some() {
                    station.retire_order(order_id);
                    events.push(ZoneEvent::OrderCompleted {
                        order: order_id,
                        trader: trader.id,
                    });
                }
                trader.order = None;
                trader.delivery_station = None;
            } else {
                if book.release(order_id, trader.id) {
                    events.push(ZoneEvent::OrderReleased {
                        order: order_id,
                        trader: trader.id,
                    });
                }
                trader.order = None;
                trader.delivery_station = None;
            }
        }

        OrderKind::FundPolice => {
            let donation = trader.carrying_donation;
            station.credits += donation;
            station.credits -= COURIER_FEE;
            trader.credits += COURIER_FEE;
            trader.carrying_donation = 0;
            events.push(ZoneEvent::PoliceFunded {
                from: order.station,
                to: station_id,
                amount: donation,
            });
            if book.complete(order_id).is_some() {
                if let Some(issuer) = station_mut(stations, order.station) {
                    issuer.retire_order(order_id);
                }
                events.push(ZoneEvent::OrderCompleted {
                    order: order_id,
                    trader: trader.id,
                });
            }
            trader.order = None;
            trader.delivery_station = None;
        }

        OrderKind::Sell => {
            // A sell order never reaches the delivery leg
            trader.abandon(book, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Resource;
    use crate::station::StationKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 0.05;

    fn world() -> (Vec<Station>, OrderBook) {
        let stations = vec![
            Station::new(1, StationKind::Mining, Vec2::new(0.0, 0.0), 100.0, 100.0, 5000),
            Station::new(2, StationKind::Agricultural, Vec2::new(400.0, 0.0), 100.0, 100.0, 5000),
            Station::new(3, StationKind::Police, Vec2::new(0.0, 400.0), 50.0, 50.0, 1000),
        ];
        (stations, OrderBook::new())
    }

    fn trader_at(x: f32, y: f32) -> Trader {
        Trader::new(10, Vec2::new(x, y), TRADER_SPEC.max_speed, TRADER_SPEC.max_hull, 1000)
    }

    fn run_system(
        traders: &mut [Trader],
        stations: &mut [Station],
        book: &mut OrderBook,
        police_station: Option<EntityId>,
        dt: f32,
    ) -> Vec<ZoneEvent> {
        let mut rng = StdRng::seed_from_u64(5);
        let mut events = Vec::new();
        trader_system(traders, stations, book, police_station, dt, &mut rng, &mut events);
        events
    }

    #[test]
    fn test_claims_nearest_serviceable_order() {
        let (mut stations, mut book) = world();
        let near = book.create(OrderKind::Sell, Resource::Materials, 20, 45, 1, 0.0);
        let far = book.create(OrderKind::Sell, Resource::Food, 20, 18, 2, 0.0);
        let mut traders = vec![trader_at(10.0, 0.0)];

        run_system(&mut traders, &mut stations, &mut book, None, DT);
        assert_eq!(traders[0].order, Some(near));
        assert_eq!(traders[0].state, TraderState::TravelingToPickup);
        assert_eq!(book.get(near).unwrap().claimed_by, Some(10));
        assert!(book.get(far).unwrap().is_open());
    }

    #[test]
    fn test_unaffordable_order_is_skipped() {
        let (mut stations, mut book) = world();
        book.create(OrderKind::Sell, Resource::Materials, 20, 45, 1, 0.0);
        let mut traders = vec![trader_at(10.0, 0.0)];
        traders[0].credits = 100; // cannot cover 900

        run_system(&mut traders, &mut stations, &mut book, None, DT);
        assert_eq!(traders[0].order, None);
        assert_eq!(traders[0].state, TraderState::SeekingOrder);
    }

    #[test]
    fn test_single_order_goes_to_one_of_two_traders() {
        let (mut stations, mut book) = world();
        let order = book.create(OrderKind::Sell, Resource::Materials, 20, 45, 1, 0.0);
        let mut traders = vec![trader_at(10.0, 0.0), trader_at(20.0, 0.0)];
        traders[1].id = 11;

        run_system(&mut traders, &mut stations, &mut book, None, DT);
        let claimers: Vec<_> = traders.iter().filter(|t| t.order == Some(order)).collect();
        assert_eq!(claimers.len(), 1);
        let idle = traders.iter().find(|t| t.order.is_none()).unwrap();
        assert_eq!(idle.state, TraderState::SeekingOrder);
    }

    #[test]
    fn test_sell_pickup_moves_goods_and_credits() {
        let (mut stations, mut book) = world();
        let order = book.create(OrderKind::Sell, Resource::Materials, 20, 45, 1, 0.0);
        book.claim(order, 10);

        let mut traders = vec![trader_at(0.0, 0.0)];
        traders[0].order = Some(order);
        traders[0].pickup_station = Some(1);
        traders[0].state = TraderState::PickingUp;
        traders[0].dock_timer = 3.0;

        let events = run_system(&mut traders, &mut stations, &mut book, None, DT);
        assert_eq!(traders[0].cargo.amount(Resource::Materials), 20);
        assert_eq!(traders[0].credits, 1000 - 900);
        assert_eq!(stations[0].materials, 80.0);
        assert_eq!(stations[0].credits, 5900);
        assert!(!book.contains(order));
        assert!(events
            .iter()
            .any(|e| matches!(e, ZoneEvent::OrderCompleted { .. })));
    }

    #[test]
    fn test_depleted_pickup_releases_claim_for_retry() {
        let (mut stations, mut book) = world();
        stations[0].materials = 5.0; // cannot cover 20 units
        let order = book.create(OrderKind::Sell, Resource::Materials, 20, 45, 1, 0.0);
        book.claim(order, 10);

        let mut traders = vec![trader_at(0.0, 0.0)];
        traders[0].order = Some(order);
        traders[0].pickup_station = Some(1);
        traders[0].state = TraderState::PickingUp;
        traders[0].dock_timer = 3.0;

        let events = run_system(&mut traders, &mut stations, &mut book, None, DT);
        // Order stays in the pool, unclaimed, for another attempt
        assert!(book.contains(order));
        assert!(book.get(order).unwrap().is_open());
        assert_eq!(traders[0].cargo.total(), 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, ZoneEvent::OrderReleased { .. })));
    }

    #[test]
    fn test_buy_delivery_pays_from_escrow() {
        let (mut stations, mut book) = world();
        let order = book.create(OrderKind::Buy, Resource::Food, 20, 16, 1, 0.0);
        book.claim(order, 10);

        let mut traders = vec![trader_at(0.0, 0.0)];
        traders[0].cargo.load(Resource::Food, 20);
        traders[0].order = Some(order);
        traders[0].delivery_station = Some(1);
        traders[0].state = TraderState::Delivering;
        traders[0].dock_timer = 3.0;
        let station_credits = stations[0].credits;
        let food_before = stations[0].food;

        run_system(&mut traders, &mut stations, &mut book, None, DT);
        assert_eq!(traders[0].credits, 1000 + 320);
        assert_eq!(traders[0].cargo.amount(Resource::Food), 0);
        assert_eq!(stations[0].food, food_before + 20.0);
        // Station paid at order creation, not at delivery
        assert_eq!(stations[0].credits, station_credits);
        assert!(!book.contains(order));
    }

    #[test]
    fn test_sell_chain_claims_matching_buy() {
        let (mut stations, mut book) = world();
        let sell = book.create(OrderKind::Sell, Resource::Materials, 20, 40, 1, 0.0);
        let buy = book.create(OrderKind::Buy, Resource::Materials, 20, 38, 2, 0.0);
        book.claim(sell, 10);

        let mut traders = vec![trader_at(0.0, 0.0)];
        traders[0].order = Some(sell);
        traders[0].pickup_station = Some(1);
        traders[0].state = TraderState::PickingUp;
        traders[0].dock_timer = 3.0;

        run_system(&mut traders, &mut stations, &mut book, None, DT);
        assert_eq!(traders[0].order, Some(buy));
        assert_eq!(traders[0].delivery_station, Some(2));
        assert_eq!(book.get(buy).unwrap().claimed_by, Some(10));
    }

    #[test]
    fn test_timeout_abandons_and_releases() {
        let (mut stations, mut book) = world();
        let order = book.create(OrderKind::Sell, Resource::Materials, 20, 45, 1, 0.0);
        book.claim(order, 10);

        let mut traders = vec![trader_at(5000.0, 5000.0)];
        traders[0].order = Some(order);
        traders[0].pickup_station = Some(1);
        traders[0].state = TraderState::TravelingToPickup;
        traders[0].state_timer = TRADER_SPEC.state_timeout + 1.0;

        run_system(&mut traders, &mut stations, &mut book, None, DT);
        assert_eq!(traders[0].state, TraderState::SeekingOrder);
        assert_eq!(traders[0].order, None);
        assert!(book.get(order).unwrap().is_open());
    }

    #[test]
    fn test_fund_police_run() {
        let (mut stations, mut book) = world();
        let order = book.create(OrderKind::FundPolice, Resource::Materials, 1, 1000, 1, 0.0);
        book.claim(order, 10);

        // Pickup collects the voucher
        let mut traders = vec![trader_at(0.0, 0.0)];
        traders[0].order = Some(order);
        traders[0].pickup_station = Some(1);
        traders[0].delivery_station = Some(3);
        traders[0].origin_station = Some(1);
        traders[0].state = TraderState::PickingUp;
        traders[0].dock_timer = 0.01;

        run_system(&mut traders, &mut stations, &mut book, Some(3), DT);
        assert_eq!(traders[0].carrying_donation, 1000);
        assert_eq!(traders[0].state, TraderState::TravelingToDelivery);

        // Deliver to the police station
        traders[0].state = TraderState::Delivering;
        traders[0].dock_timer = 0.01;
        traders[0].dock_action_done = false;
        let police_before = stations[2].credits;
        let events = run_system(&mut traders, &mut stations, &mut book, Some(3), DT);

        assert_eq!(stations[2].credits, police_before + 1000 - COURIER_FEE);
        assert_eq!(traders[0].credits, 1000 + COURIER_FEE);
        assert!(!book.contains(order));
        assert!(events
            .iter()
            .any(|e| matches!(e, ZoneEvent::PoliceFunded { amount: 1000, .. })));
        // Funding runs end with the return leg
        assert_eq!(traders[0].state, TraderState::ReturningToOrigin);
    }

    #[test]
    fn test_docked_trader_does_not_move() {
        let (mut stations, mut book) = world();
        let order = book.create(OrderKind::Sell, Resource::Materials, 20, 45, 1, 0.0);
        book.claim(order, 10);

        let mut traders = vec![trader_at(0.0, 0.0)];
        traders[0].order = Some(order);
        traders[0].pickup_station = Some(1);
        traders[0].state = TraderState::PickingUp;
        traders[0].dock_timer = 3.0;
        traders[0].dock_action_done = true;
        traders[0].body.velocity = Vec2::ZERO;
        let position = traders[0].body.position;

        for _ in 0..10 {
            run_system(&mut traders, &mut stations, &mut book, None, DT);
        }
        assert!(traders[0].is_docked());
        assert_eq!(traders[0].body.position, position);
    }

    #[test]
    fn test_buy_order_sources_from_surplus_station() {
        let (mut stations, mut book) = world();
        // Issuer is station 2 and lacks food; station 1 holds a surplus
        stations[1].food = 0.0;
        let order = book.create(OrderKind::Buy, Resource::Food, 20, 16, 2, 0.0);
        let mut traders = vec![trader_at(0.0, 0.0)];

        run_system(&mut traders, &mut stations, &mut book, None, DT);
        assert_eq!(traders[0].order, Some(order));
        assert_eq!(traders[0].pickup_station, Some(1));
        assert_eq!(traders[0].delivery_station, Some(2));
        assert_eq!(traders[0].state, TraderState::TravelingToPickup);
    }
}
