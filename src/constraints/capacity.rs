//! Weight capacity rule.

use serde::Serialize;

use crate::models::{Courier, Order};

/// Capacity usage summary for one courier's load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityUtilisation {
    /// Kilograms currently loaded.
    pub used_kg: f64,
    /// Courier capacity in kilograms.
    pub capacity_kg: f64,
    /// Kilograms still available.
    pub remaining_kg: f64,
    /// Used share of capacity, 0–100.
    pub percent: f64,
}

/// Validates total carried weight against a courier's capacity.
///
/// Weight only: parcel volume is not part of the capacity model.
///
/// # Examples
///
/// ```
/// use lastmile::constraints::CapacityRule;
/// use lastmile::geo::GeoPoint;
/// use lastmile::models::{Courier, Order, Priority};
///
/// let courier = Courier::new("L1", GeoPoint::new(48.85, 2.35), 100.0);
/// let carried = vec![Order::new("A", GeoPoint::new(48.86, 2.35), 50.0, Priority::Urgent)];
/// let candidate = Order::new("B", GeoPoint::new(48.87, 2.35), 60.0, Priority::Standard);
///
/// let (ok, reason) = CapacityRule.can_add(&courier, &carried, &candidate);
/// assert!(!ok);
/// assert!(reason.contains("Poids dépassé"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityRule;

impl CapacityRule {
    /// Returns whether `candidate` fits on top of `carried`, with a reason
    /// when it does not.
    pub fn can_add(
        &self,
        courier: &Courier,
        carried: &[Order],
        candidate: &Order,
    ) -> (bool, String) {
        let total: f64 =
            carried.iter().map(Order::weight_kg).sum::<f64>() + candidate.weight_kg();
        self.check_total(courier, total)
    }

    /// Returns whether a whole load fits, with a reason when it does not.
    pub fn fits(&self, courier: &Courier, orders: &[Order]) -> (bool, String) {
        let total: f64 = orders.iter().map(Order::weight_kg).sum();
        self.check_total(courier, total)
    }

    fn check_total(&self, courier: &Courier, total_kg: f64) -> (bool, String) {
        if total_kg <= courier.capacity_kg() {
            (true, String::new())
        } else {
            (
                false,
                format!(
                    "Livreur {}: Poids dépassé: {:.1} kg > {:.0} kg",
                    courier.id(),
                    total_kg,
                    courier.capacity_kg()
                ),
            )
        }
    }

    /// Capacity usage summary for diagnostics.
    pub fn utilisation(&self, courier: &Courier, orders: &[Order]) -> CapacityUtilisation {
        let used_kg: f64 = orders.iter().map(Order::weight_kg).sum();
        let capacity_kg = courier.capacity_kg();
        CapacityUtilisation {
            used_kg,
            capacity_kg,
            remaining_kg: capacity_kg - used_kg,
            percent: if capacity_kg > 0.0 {
                used_kg / capacity_kg * 100.0
            } else {
                0.0
            },
        }
    }
}
