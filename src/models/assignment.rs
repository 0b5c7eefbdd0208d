//! Assignment in id form: courier → ordered order ids, plus the unassigned set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The output of the assignment stage, reduced to identifiers.
///
/// Every input order appears exactly once: either in one courier's list or
/// in `unassigned`. The map is ordered so serialized results are stable.
///
/// # Examples
///
/// ```
/// use lastmile::models::Assignment;
///
/// let mut a = Assignment::new();
/// a.push_order("L1", "C1");
/// a.push_unassigned("C2");
/// assert_eq!(a.orders_for("L1"), &["C1".to_string()]);
/// assert_eq!(a.num_assigned(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    routes: BTreeMap<String, Vec<String>>,
    unassigned: Vec<String>,
}

impl Assignment {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an order to a courier's list, creating the list if needed.
    pub fn push_order(&mut self, courier_id: impl Into<String>, order_id: impl Into<String>) {
        self.routes
            .entry(courier_id.into())
            .or_default()
            .push(order_id.into());
    }

    /// Records an order no courier could take.
    pub fn push_unassigned(&mut self, order_id: impl Into<String>) {
        self.unassigned.push(order_id.into());
    }

    /// Courier → ordered order ids.
    pub fn routes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.routes
    }

    /// Order ids for one courier; empty when the courier has none.
    pub fn orders_for(&self, courier_id: &str) -> &[String] {
        self.routes.get(courier_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Orders excluded by capacity or availability.
    pub fn unassigned(&self) -> &[String] {
        &self.unassigned
    }

    /// Total number of assigned orders across all couriers.
    pub fn num_assigned(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let a = Assignment::new();
        assert_eq!(a.num_assigned(), 0);
        assert!(a.unassigned().is_empty());
        assert!(a.orders_for("L1").is_empty());
    }

    #[test]
    fn test_push_preserves_order() {
        let mut a = Assignment::new();
        a.push_order("L1", "C3");
        a.push_order("L1", "C1");
        a.push_order("L2", "C2");
        assert_eq!(a.orders_for("L1"), &["C3".to_string(), "C1".to_string()]);
        assert_eq!(a.num_assigned(), 3);
    }

    #[test]
    fn test_stable_serialization() {
        let mut a = Assignment::new();
        a.push_order("L2", "C2");
        a.push_order("L1", "C1");
        let json = serde_json::to_string(&a).expect("serializes");
        // BTreeMap keys come out sorted regardless of insertion order.
        assert!(json.find("L1").unwrap() < json.find("L2").unwrap());
    }
}
