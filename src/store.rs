//! Data-access seam between the optimization core and persistent storage.
//!
//! The core pulls available couriers and pending orders through
//! [`DeliveryStore`], works on its own snapshots, and writes assignment
//! statuses back at the end of a run. The store owns concurrency and
//! transactions; [`InMemoryStore`] backs tests and embedders without a
//! relational store.

use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{Courier, Order, OrderStatus};

/// The three operations the core needs from storage.
pub trait DeliveryStore: Send + Sync {
    /// Couriers that can be planned today.
    fn list_available_couriers(&self) -> Result<Vec<Courier>>;

    /// Orders waiting to be planned, with client contact joined in.
    fn list_pending_orders(&self) -> Result<Vec<Order>>;

    /// Marks each order assigned to the courier.
    fn assign_orders(&self, courier_id: &str, order_ids: &[String]) -> Result<()>;
}

struct StoreState {
    couriers: Vec<Courier>,
    orders: Vec<Order>,
}

/// Mutex-guarded in-memory store.
///
/// # Examples
///
/// ```
/// use lastmile::geo::GeoPoint;
/// use lastmile::models::{Courier, Order, Priority};
/// use lastmile::store::{DeliveryStore, InMemoryStore};
///
/// let store = InMemoryStore::new(
///     vec![Courier::new("L1", GeoPoint::new(48.85, 2.35), 100.0)],
///     vec![Order::new("C1", GeoPoint::new(48.86, 2.35), 10.0, Priority::Urgent)],
/// );
/// assert_eq!(store.list_pending_orders().unwrap().len(), 1);
/// store.assign_orders("L1", &["C1".to_string()]).unwrap();
/// assert!(store.list_pending_orders().unwrap().is_empty());
/// ```
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Creates a store over the given couriers and orders.
    pub fn new(couriers: Vec<Courier>, orders: Vec<Order>) -> Self {
        Self {
            state: Mutex::new(StoreState { couriers, orders }),
        }
    }

    /// Snapshot of every order regardless of status.
    pub fn all_orders(&self) -> Vec<Order> {
        self.state.lock().expect("store lock").orders.clone()
    }
}

impl DeliveryStore for InMemoryStore {
    fn list_available_couriers(&self) -> Result<Vec<Courier>> {
        let state = self.state.lock().expect("store lock");
        Ok(state
            .couriers
            .iter()
            .filter(|c| c.is_available())
            .cloned()
            .collect())
    }

    fn list_pending_orders(&self) -> Result<Vec<Order>> {
        let state = self.state.lock().expect("store lock");
        Ok(state
            .orders
            .iter()
            .filter(|o| o.status() == OrderStatus::Pending)
            .cloned()
            .collect())
    }

    fn assign_orders(&self, courier_id: &str, order_ids: &[String]) -> Result<()> {
        let mut state = self.state.lock().expect("store lock");
        for id in order_ids {
            let order = state
                .orders
                .iter_mut()
                .find(|o| o.id() == id)
                .ok_or_else(|| Error::InvalidInput(format!("unknown order {id:?}")))?;
            order.mark_assigned(courier_id);
        }
        Ok(())
    }
}
