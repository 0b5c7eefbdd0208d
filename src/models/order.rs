//! Order and priority types.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::time::TimeWindow;

/// Delivery urgency. Level 1 is urgent, level 3 is flexible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Same-day, penalized hardest when late.
    Urgent,
    /// Default service level.
    Standard,
    /// Can slip with little cost.
    Flexible,
}

impl Priority {
    /// Numeric level in {1, 2, 3}.
    pub fn level(&self) -> u8 {
        match self {
            Priority::Urgent => 1,
            Priority::Standard => 2,
            Priority::Flexible => 3,
        }
    }

    /// Parses a numeric level. Fails on anything outside {1, 2, 3}.
    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            1 => Ok(Priority::Urgent),
            2 => Ok(Priority::Standard),
            3 => Ok(Priority::Flexible),
            other => Err(Error::InvalidInput(format!(
                "priority level {other} outside 1..=3"
            ))),
        }
    }

    /// Additive penalty used by the greedy assignment costs.
    pub fn penalty(&self) -> f64 {
        match self {
            Priority::Urgent => 0.0,
            Priority::Standard => 2.0,
            Priority::Flexible => 5.0,
        }
    }

    /// Multiplier applied to lateness minutes in the tour fitness.
    pub fn lateness_weight(&self) -> f64 {
        match self {
            Priority::Urgent => 6.0,
            Priority::Standard => 3.0,
            Priority::Flexible => 1.5,
        }
    }
}

/// Lifecycle state of an order within the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Waiting to be planned.
    Pending,
    /// Planned onto a courier's tour.
    Assigned,
    /// Dropped off.
    Delivered,
    /// Planned but pushed past the workday end; re-enters the next run.
    Deferred,
}

/// A delivery request. Immutable within one optimization run.
///
/// # Examples
///
/// ```
/// use lastmile::geo::GeoPoint;
/// use lastmile::models::{Order, Priority};
///
/// let order = Order::new("C1", GeoPoint::new(48.86, 2.35), 10.0, Priority::Urgent)
///     .with_address("12 rue de Rivoli");
/// assert_eq!(order.id(), "C1");
/// assert_eq!(order.weight_kg(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: String,
    location: GeoPoint,
    weight_kg: f64,
    priority: Priority,
    window: TimeWindow,
    service_minutes: f64,
    address: Option<String>,
    client_name: Option<String>,
    client_phone: Option<String>,
    status: OrderStatus,
    assigned_courier: Option<String>,
}

impl Order {
    /// Creates a pending order.
    ///
    /// Defaults: delivery window 08:00–20:00, five minutes of service time,
    /// no display metadata.
    pub fn new(id: impl Into<String>, location: GeoPoint, weight_kg: f64, priority: Priority) -> Self {
        Self {
            id: id.into(),
            location,
            weight_kg,
            priority,
            window: TimeWindow::new(8 * 60, 20 * 60).expect("constant window is valid"),
            service_minutes: 5.0,
            address: None,
            client_name: None,
            client_phone: None,
            status: OrderStatus::Pending,
            assigned_courier: None,
        }
    }

    /// Sets the delivery window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets the per-stop service time in minutes.
    pub fn with_service_minutes(mut self, minutes: f64) -> Self {
        self.service_minutes = minutes;
        self
    }

    /// Sets the display address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the client contact shown alongside the order.
    pub fn with_client(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self.client_phone = Some(phone.into());
        self
    }

    /// Opaque unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Delivery coordinates.
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Parcel weight in kilograms.
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// Delivery urgency.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Delivery window.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Per-stop service time in minutes.
    pub fn service_minutes(&self) -> f64 {
        self.service_minutes
    }

    /// Display address, if any.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Client name, if any.
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// Client phone, if any.
    pub fn client_phone(&self) -> Option<&str> {
        self.client_phone.as_deref()
    }

    /// Lifecycle state.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Courier this order was assigned to, once written back.
    pub fn assigned_courier(&self) -> Option<&str> {
        self.assigned_courier.as_deref()
    }

    /// Marks the order assigned to a courier.
    pub fn mark_assigned(&mut self, courier_id: impl Into<String>) {
        self.status = OrderStatus::Assigned;
        self.assigned_courier = Some(courier_id.into());
    }
}
