//! Route executor: drives a refined tour against real oracle measurements.
//!
//! Unlike the fitness simulation, the executor queries the oracle per
//! segment, inserts real recharge detours when the battery cannot cover a
//! leg, and truncates the tour at the workday end — everything past the
//! cutoff moves to the deferred set and re-enters the next optimization.

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::models::{
    nearest_station, Courier, Order, RealizedRoute, RechargeEvent, RechargeStation,
};
use crate::oracle::{Leg, TravelOracle};

/// Walks tours for one oracle and station catalogue.
pub struct RouteExecutor<'a> {
    oracle: &'a dyn TravelOracle,
    stations: &'a [RechargeStation],
    estimate_on_error: bool,
}

impl<'a> RouteExecutor<'a> {
    /// Creates an executor. Oracle failures propagate unless the estimate
    /// fallback is enabled.
    pub fn new(oracle: &'a dyn TravelOracle, stations: &'a [RechargeStation]) -> Self {
        Self {
            oracle,
            stations,
            estimate_on_error: false,
        }
    }

    /// Replaces failed oracle legs with haversine/speed estimates instead
    /// of surfacing the error. Off by default.
    pub fn with_estimate_fallback(mut self, enabled: bool) -> Self {
        self.estimate_on_error = enabled;
        self
    }

    fn measure(&self, courier: &Courier, from: GeoPoint, to: GeoPoint) -> Result<Leg> {
        match self.oracle.leg(from, to) {
            Ok(leg) => Ok(leg),
            Err(err) if self.estimate_on_error => {
                tracing::warn!(courier = courier.id(), %err, "oracle leg failed, estimating");
                let distance_km = from.distance_km(to);
                let speed = courier.speed_kmh().max(1.0);
                Ok(Leg {
                    distance_km,
                    duration_min: distance_km / speed * 60.0,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Executes `route` (a depot-rooted index permutation over
    /// `[depot, orders...]`) and emits the realized tour.
    pub fn execute(
        &self,
        courier: &Courier,
        orders: &[Order],
        route: &[usize],
    ) -> Result<RealizedRoute> {
        let coord = |idx: usize| -> GeoPoint {
            if idx == 0 {
                courier.depot()
            } else {
                orders[idx - 1].location()
            }
        };

        let battery_cfg = courier.battery();
        let work_end = courier.work_end() as f64;

        let mut prev = coord(route.first().copied().unwrap_or(0));
        let mut current_time = courier.work_start() as f64;
        let mut battery = battery_cfg.remaining_minutes();
        let mut distance_km = 0.0;
        let mut duration_min = 0.0;
        let mut delivered = Vec::new();
        let mut deferred = Vec::new();
        let mut gps = vec![prev];
        let mut recharges = Vec::new();

        for (pos, &idx) in route.iter().enumerate().skip(1) {
            let target = coord(idx);
            let mut leg = self.measure(courier, prev, target)?;

            if leg.duration_min > battery {
                match nearest_station(self.stations, prev) {
                    Some(station) => {
                        let detour = self.measure(courier, prev, station.location())?;
                        distance_km += detour.distance_km;
                        duration_min += detour.duration_min;
                        current_time += detour.duration_min;
                        battery = (battery - detour.duration_min).max(0.0);

                        let recharge_minutes = if battery_cfg.recharge_rate() > 0.0 {
                            (battery_cfg.max_minutes() - battery) / battery_cfg.recharge_rate()
                        } else {
                            0.0
                        };
                        duration_min += recharge_minutes;
                        current_time += recharge_minutes;
                        battery = battery_cfg.max_minutes();

                        gps.push(station.location());
                        recharges.push(RechargeEvent {
                            station_id: station.id.clone(),
                            station_name: station.name.clone(),
                            location: station.location(),
                            recharge_minutes,
                        });
                        prev = station.location();
                        leg = self.measure(courier, prev, target)?;
                    }
                    None => {
                        tracing::warn!(
                            courier = courier.id(),
                            "battery short of next leg and no station in catalogue"
                        );
                    }
                }
            }

            if current_time + leg.duration_min > work_end {
                for &rest in &route[pos..] {
                    if rest >= 1 {
                        deferred.push(orders[rest - 1].id().to_string());
                    }
                }
                break;
            }

            distance_km += leg.distance_km;
            duration_min += leg.duration_min;
            current_time += leg.duration_min;
            battery = (battery - leg.duration_min).max(0.0);
            gps.push(target);
            if idx >= 1 {
                delivered.push(orders[idx - 1].id().to_string());
            }
            prev = target;
        }

        // Displayable geometry is diagnostic; a failed shape call must not
        // discard an otherwise valid tour.
        let shape = match self.oracle.shape(&gps) {
            Ok(shape) => shape.geometry,
            Err(err) => {
                tracing::warn!(courier = courier.id(), %err, "route shape unavailable");
                Vec::new()
            }
        };

        Ok(RealizedRoute {
            courier_id: courier.id().to_string(),
            cost: distance_km * courier.cost_per_km(),
            delivered,
            deferred,
            distance_km,
            duration_min,
            gps,
            recharges,
            end_minutes: current_time,
            shape,
        })
    }
}
