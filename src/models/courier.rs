//! Courier and battery types.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::time::hhmm_to_minutes;

/// Electric-vehicle battery, measured in minutes of driving autonomy.
///
/// # Examples
///
/// ```
/// use lastmile::models::Battery;
///
/// let b = Battery::new(480.0, 300.0, 1.5);
/// assert_eq!(b.max_minutes(), 480.0);
/// assert_eq!(b.remaining_minutes(), 300.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    max_minutes: f64,
    remaining_minutes: f64,
    recharge_rate: f64,
}

impl Battery {
    /// Creates a battery. Remaining autonomy is clamped to `[0, max]`.
    pub fn new(max_minutes: f64, remaining_minutes: f64, recharge_rate: f64) -> Self {
        Self {
            max_minutes,
            remaining_minutes: remaining_minutes.clamp(0.0, max_minutes),
            recharge_rate,
        }
    }

    /// Full autonomy in minutes of driving.
    pub fn max_minutes(&self) -> f64 {
        self.max_minutes
    }

    /// Remaining autonomy in minutes of driving.
    pub fn remaining_minutes(&self) -> f64 {
        self.remaining_minutes
    }

    /// Minutes of autonomy recovered per minute plugged in.
    pub fn recharge_rate(&self) -> f64 {
        self.recharge_rate
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::new(480.0, 480.0, 1.0)
    }
}

/// A delivery vehicle plus driver. Immutable within one optimization run
/// except for battery depletion, which the executor simulates on its own
/// copy of the remaining autonomy.
///
/// # Examples
///
/// ```
/// use lastmile::geo::GeoPoint;
/// use lastmile::models::Courier;
///
/// let c = Courier::new("L1", GeoPoint::new(48.8566, 2.3522), 100.0)
///     .with_work_window("08:00", "18:00")
///     .unwrap()
///     .with_speed(30.0)
///     .with_cost_per_km(0.5);
/// assert_eq!(c.id(), "L1");
/// assert_eq!(c.work_start(), 480);
/// assert!(c.is_available());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    id: String,
    name: Option<String>,
    depot: GeoPoint,
    capacity_kg: f64,
    work_start: u32,
    work_end: u32,
    speed_kmh: f64,
    cost_per_km: f64,
    available: bool,
    battery: Battery,
}

impl Courier {
    /// Creates an available courier.
    ///
    /// Defaults: workday 08:00–18:00, 30 km/h average speed, 0.5 monetary
    /// units per kilometer, a default [`Battery`].
    pub fn new(id: impl Into<String>, depot: GeoPoint, capacity_kg: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            depot,
            capacity_kg,
            work_start: 8 * 60,
            work_end: 18 * 60,
            speed_kmh: 30.0,
            cost_per_km: 0.5,
            available: true,
            battery: Battery::default(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the workday from "HH:MM" bounds.
    pub fn with_work_window(mut self, start: &str, end: &str) -> Result<Self> {
        self.work_start = hhmm_to_minutes(start)?;
        self.work_end = hhmm_to_minutes(end)?;
        Ok(self)
    }

    /// Sets the average speed in km/h, used when the oracle is unavailable.
    pub fn with_speed(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    /// Sets the monetary cost per kilometer.
    pub fn with_cost_per_km(mut self, cost: f64) -> Self {
        self.cost_per_km = cost;
        self
    }

    /// Sets the availability flag.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Sets the battery state.
    pub fn with_battery(mut self, battery: Battery) -> Self {
        self.battery = battery;
        self
    }

    /// Opaque unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Start and end location of every tour.
    pub fn depot(&self) -> GeoPoint {
        self.depot
    }

    /// Maximum simultaneous load in kilograms.
    pub fn capacity_kg(&self) -> f64 {
        self.capacity_kg
    }

    /// Start of day, minutes since midnight.
    pub fn work_start(&self) -> u32 {
        self.work_start
    }

    /// End of day, minutes since midnight.
    pub fn work_end(&self) -> u32 {
        self.work_end
    }

    /// Average speed in km/h.
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Monetary cost per kilometer driven.
    pub fn cost_per_km(&self) -> f64 {
        self.cost_per_km
    }

    /// Whether the courier can be planned today.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Battery state at the start of the run.
    pub fn battery(&self) -> Battery {
        self.battery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_clamps_remaining() {
        let b = Battery::new(90.0, 120.0, 1.5);
        assert_eq!(b.remaining_minutes(), 90.0);
        let b = Battery::new(90.0, -5.0, 1.5);
        assert_eq!(b.remaining_minutes(), 0.0);
    }

    #[test]
    fn test_courier_defaults() {
        let c = Courier::new("L1", GeoPoint::new(48.8566, 2.3522), 100.0);
        assert_eq!(c.work_start(), 480);
        assert_eq!(c.work_end(), 1080);
        assert_eq!(c.speed_kmh(), 30.0);
        assert!(c.is_available());
        assert_eq!(c.battery().max_minutes(), 480.0);
    }

    #[test]
    fn test_courier_builder() {
        let c = Courier::new("L2", GeoPoint::new(31.63, -7.99), 500.0)
            .with_name("Yassine")
            .with_work_window("06:30", "14:00")
            .unwrap()
            .with_speed(40.0)
            .with_cost_per_km(0.8)
            .with_availability(false)
            .with_battery(Battery::new(90.0, 10.0, 1.5));
        assert_eq!(c.name(), Some("Yassine"));
        assert_eq!(c.work_start(), 390);
        assert_eq!(c.work_end(), 840);
        assert!(!c.is_available());
        assert_eq!(c.battery().remaining_minutes(), 10.0);
    }

    #[test]
    fn test_courier_invalid_window() {
        let r = Courier::new("L3", GeoPoint::new(0.0, 0.0), 10.0).with_work_window("8h", "18:00");
        assert!(r.is_err());
    }
}
