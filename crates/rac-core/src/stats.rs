//! Journey statistics, recomputed from current state on every call.

use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;
use crate::occupancy::OccupancyStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyStats {
    pub total_passengers: usize,
    /// Confirmed passengers, including upgraded RAC passengers.
    pub confirmed_passengers: usize,
    /// Passengers still waiting on the RAC queue.
    pub rac_passengers: usize,
    pub current_onboard: usize,
    pub total_deboarded: usize,
    pub total_no_shows: usize,
    pub total_rac_upgraded: usize,
    /// Berths free on the segment leaving the current station.
    pub vacant_berths: usize,
    pub occupied_berths: usize,
}

impl JourneyStats {
    pub fn compute(store: &OccupancyStore, manifest: &Manifest, at_station: usize) -> Self {
        let counts = manifest.counts();
        let vacant_berths = store.vacant_on(at_station);
        Self {
            total_passengers: counts.total,
            confirmed_passengers: counts.confirmed,
            rac_passengers: counts.rac,
            current_onboard: counts.onboard,
            total_deboarded: manifest.iter().filter(|p| p.deboarded).count(),
            total_no_shows: counts.no_show,
            total_rac_upgraded: manifest.iter().filter(|p| p.is_upgraded()).count(),
            vacant_berths,
            occupied_berths: store.berth_count() - vacant_berths,
        }
    }
}

/// Position along the route, 1-based for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: f64,
}

impl Progress {
    pub fn new(current_idx: usize, total_stations: usize) -> Self {
        let current = current_idx + 1;
        #[allow(clippy::cast_precision_loss)]
        let percentage = if total_stations == 0 {
            0.0
        } else {
            (current as f64 / total_stations as f64 * 1000.0).round() / 10.0
        };
        Self {
            current,
            total: total_stations,
            percentage,
        }
    }
}
