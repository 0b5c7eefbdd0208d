//! Courier work-window rule.

use crate::models::Courier;
use crate::time::{minutes_to_hhmm, time_in_window};

/// Validates that a courier can work at a given time of day.
///
/// # Examples
///
/// ```
/// use lastmile::constraints::ScheduleRule;
/// use lastmile::geo::GeoPoint;
/// use lastmile::models::Courier;
///
/// let courier = Courier::new("L1", GeoPoint::new(48.85, 2.35), 100.0)
///     .with_work_window("08:00", "18:00")
///     .unwrap();
///
/// let (ok, _) = ScheduleRule.is_available(&courier, 9 * 60);
/// assert!(ok);
/// let (ok, reason) = ScheduleRule.is_available(&courier, 19 * 60);
/// assert!(!ok);
/// assert!(reason.contains("non disponible"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleRule;

impl ScheduleRule {
    /// Returns whether the courier may operate at `at_minutes` (minutes
    /// since midnight), with a reason when they may not.
    ///
    /// The work window is a closed interval; an unavailable courier fails
    /// regardless of the time.
    pub fn is_available(&self, courier: &Courier, at_minutes: u32) -> (bool, String) {
        if !courier.is_available() {
            return (
                false,
                format!("Livreur {} non disponible", courier.id()),
            );
        }

        if time_in_window(at_minutes, courier.work_start(), courier.work_end()) {
            (true, String::new())
        } else {
            (
                false,
                format!(
                    "Livreur {} non disponible à {} (plage: {}-{})",
                    courier.id(),
                    minutes_to_hhmm(at_minutes),
                    minutes_to_hhmm(courier.work_start()),
                    minutes_to_hhmm(courier.work_end())
                ),
            )
        }
    }
}
