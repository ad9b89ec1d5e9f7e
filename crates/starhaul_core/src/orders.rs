//! Trade orders and the global order pool.
//!
//! Stations post orders; traders claim, service, and complete or abandon
//! them. The pool enforces the claim invariant: an order is claimed by at
//! most one trader at a time, and completion is idempotent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, Resource};

/// Unique identifier for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

/// What a station is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Station wants to receive goods; payment is escrowed at creation.
    Buy,
    /// Station wants to offload surplus stock.
    Sell,
    /// Station donates credits to the police station; the donation is
    /// escrowed at creation and couriered by a trader.
    FundPolice,
}

impl OrderKind {
    /// Stable name for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::FundPolice => "fund_police",
        }
    }
}

/// A standing request posted by a station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id.
    pub id: OrderId,
    /// Request kind.
    pub kind: OrderKind,
    /// Traded resource. For [`OrderKind::FundPolice`] this is unused and
    /// conventionally `Materials`.
    pub resource: Resource,
    /// Units requested (or credits, for police funding).
    pub quantity: u32,
    /// Credits per unit at creation time.
    pub unit_price: i64,
    /// Issuing station.
    pub station: EntityId,
    /// Game time the order was created, in seconds.
    pub created_at: f64,
    /// Set once the order has been fulfilled.
    pub completed: bool,
    /// Trader currently servicing this order, if any.
    pub claimed_by: Option<EntityId>,
}

impl Order {
    /// Total credits this order moves when fulfilled.
    #[must_use]
    pub const fn total_value(&self) -> i64 {
        self.unit_price * self.quantity as i64
    }

    /// Check whether a trader may claim this order right now.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.completed && self.claimed_by.is_none()
    }
}

/// The global order pool.
///
/// Owns every live order. Stations keep only the ids of orders they
/// issued so they can retire them on completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBook {
    orders: HashMap<u64, Order>,
    next_id: u64,
}

impl OrderBook {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            next_id: 1,
        }
    }

    /// Post a new order. Returns its id.
    pub fn create(
        &mut self,
        kind: OrderKind,
        resource: Resource,
        quantity: u32,
        unit_price: i64,
        station: EntityId,
        created_at: f64,
    ) -> OrderId {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        self.orders.insert(
            id.0,
            Order {
                id,
                kind,
                resource,
                quantity,
                unit_price,
                station,
                created_at,
                completed: false,
                claimed_by: None,
            },
        );
        id
    }

    /// Get an order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id.0)
    }

    /// Check if an order is still in the pool.
    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id.0)
    }

    /// Number of live orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterate over all live orders (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Sorted order ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<OrderId> {
        let mut ids: Vec<_> = self.orders.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(OrderId).collect()
    }

    /// Claim an order for a trader.
    ///
    /// Returns false if the order is gone, completed, or already claimed
    /// (including by the same trader - claiming is not reentrant).
    pub fn claim(&mut self, id: OrderId, trader: EntityId) -> bool {
        match self.orders.get_mut(&id.0) {
            Some(order) if order.is_open() => {
                order.claimed_by = Some(trader);
                true
            }
            _ => false,
        }
    }

    /// Release a trader's claim so another trader may retry the order.
    ///
    /// Only the holding trader can release; anything else is a no-op.
    /// Returns true if a claim was actually released.
    pub fn release(&mut self, id: OrderId, trader: EntityId) -> bool {
        match self.orders.get_mut(&id.0) {
            Some(order) if order.claimed_by == Some(trader) => {
                order.claimed_by = None;
                true
            }
            _ => false,
        }
    }

    /// Complete an order, removing it from the pool.
    ///
    /// Idempotent: the first call returns the fulfilled order (with its
    /// completed flag set) so the caller can retire it from the issuing
    /// station's list; any later call returns `None` and changes nothing.
    pub fn complete(&mut self, id: OrderId) -> Option<Order> {
        let mut order = self.orders.remove(&id.0)?;
        order.completed = true;
        Some(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with_one_order() -> (OrderBook, OrderId) {
        let mut book = OrderBook::new();
        let id = book.create(OrderKind::Buy, Resource::Materials, 20, 45, 7, 0.0);
        (book, id)
    }

    #[test]
    fn test_create_and_lookup() {
        let (book, id) = book_with_one_order();
        let order = book.get(id).unwrap();
        assert_eq!(order.total_value(), 900);
        assert!(order.is_open());
    }

    #[test]
    fn test_at_most_one_claim() {
        let (mut book, id) = book_with_one_order();
        assert!(book.claim(id, 100));
        // Second trader loses the race
        assert!(!book.claim(id, 200));
        assert_eq!(book.get(id).unwrap().claimed_by, Some(100));
    }

    #[test]
    fn test_release_requires_holder() {
        let (mut book, id) = book_with_one_order();
        book.claim(id, 100);

        assert!(!book.release(id, 200));
        assert_eq!(book.get(id).unwrap().claimed_by, Some(100));

        assert!(book.release(id, 100));
        assert!(book.get(id).unwrap().is_open());

        // Another trader may now retry
        assert!(book.claim(id, 200));
    }

    #[test]
    fn test_complete_is_idempotent() {
        let (mut book, id) = book_with_one_order();
        book.claim(id, 100);

        let order = book.complete(id).unwrap();
        assert!(order.completed);
        assert!(!book.contains(id));

        // Second completion is a no-op
        assert!(book.complete(id).is_none());
    }

    #[test]
    fn test_sorted_ids_are_ordered() {
        let mut book = OrderBook::new();
        for _ in 0..5 {
            book.create(OrderKind::Sell, Resource::Food, 20, 18, 1, 0.0);
        }
        let ids = book.sorted_ids();
        for window in ids.windows(2) {
            assert!(window[0] < window[1]);
        }
    }
}
