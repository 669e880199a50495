//! Station arrival processing.
//!
//! Arriving at station `i` runs five steps in order:
//!
//! 1. mark passengers who did not turn up for boarding at `i` as no-shows
//!    and free their berths
//! 2. deboard passengers whose journey ends at `i`
//! 3. upgrade RAC passengers boarding at `i` into free berths
//! 4. board confirmed passengers whose journey starts at `i`
//! 5. report the berths left vacant on the segment leaving `i`

use serde::{Deserialize, Serialize};

use crate::error::JourneyError;
use crate::journey::{Station, TrainJourney};
use crate::manifest::{Manifest, PassengerStatus};
use crate::occupancy::OccupancyStore;
use crate::reallocation::{self, Allocation};
use crate::stats::JourneyStats;
use crate::types::{BerthId, Pnr};
use crate::views::VacantBerth;

/// What happened at one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationReport {
    pub station: Station,
    pub deboarded: Vec<Pnr>,
    pub no_shows: Vec<Pnr>,
    pub upgrades: Vec<Allocation>,
    pub boarded: Vec<Pnr>,
    pub vacancies: Vec<VacantBerth>,
    pub stats: JourneyStats,
}

/// Marks `pnr` as a no-show and frees their berth from `station` onwards.
///
/// Returns the berth that was released, if the passenger held one.
pub(crate) fn release_no_show(
    store: &mut OccupancyStore,
    manifest: &mut Manifest,
    pnr: &Pnr,
    station: usize,
) -> Result<Option<BerthId>, JourneyError> {
    let passenger = manifest.by_id(pnr)?;
    let released = passenger.berth().cloned();
    if let (Some(berth), Some(remaining)) = (&released, passenger.window.remaining_from(station)) {
        store.vacate(berth, remaining)?;
    }
    manifest.by_id_mut(pnr)?.status = PassengerStatus::NoShow {
        released: released.clone(),
    };
    tracing::info!(%pnr, station, released = ?released.as_ref().map(ToString::to_string), "passenger marked no-show");
    Ok(released)
}

fn deboard(manifest: &mut Manifest, station: usize) -> Vec<Pnr> {
    let leaving: Vec<Pnr> = manifest
        .alighting_at(station)
        .filter(|p| p.is_onboard())
        .map(|p| p.pnr.clone())
        .collect();
    for pnr in &leaving {
        if let Ok(passenger) = manifest.by_id_mut(pnr) {
            passenger.deboarded = true;
        }
    }
    leaving
}

fn detect_no_shows(store: &mut OccupancyStore, manifest: &mut Manifest, station: usize) -> Vec<Pnr> {
    let absent: Vec<Pnr> = manifest
        .boarding_at(station)
        .filter(|p| p.absent && !p.is_no_show())
        .map(|p| p.pnr.clone())
        .collect();
    absent
        .into_iter()
        .filter(|pnr| match release_no_show(store, manifest, pnr, station) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(%pnr, error = %err, "could not release no-show berth");
                false
            }
        })
        .collect()
}

fn board(manifest: &mut Manifest, station: usize) -> Vec<Pnr> {
    let boarding: Vec<Pnr> = manifest
        .boarding_at(station)
        .filter(|p| p.is_confirmed() && !p.boarded && !p.absent)
        .map(|p| p.pnr.clone())
        .collect();
    for pnr in &boarding {
        if let Ok(passenger) = manifest.by_id_mut(pnr) {
            passenger.boarded = true;
        }
    }
    boarding
}

/// Runs the arrival steps for the journey's current station.
pub(crate) fn process_station_arrival(journey: &mut TrainJourney) -> StationReport {
    let station = journey.state().current_station_idx;

    let no_shows = detect_no_shows(&mut journey.occupancy, &mut journey.manifest, station);
    let deboarded = deboard(&mut journey.manifest, station);
    let upgrades = reallocation::auto_upgrade(&mut journey.occupancy, &mut journey.manifest, station);
    let boarded = board(&mut journey.manifest, station);
    let vacancies = journey.vacant_berths_at(station).unwrap_or_default();

    let report = StationReport {
        station: journey.current_station().clone(),
        deboarded,
        no_shows,
        upgrades,
        boarded,
        vacancies,
        stats: journey.stats(),
    };
    tracing::info!(
        station = %report.station.name,
        deboarded = report.deboarded.len(),
        no_shows = report.no_shows.len(),
        upgrades = report.upgrades.len(),
        boarded = report.boarded.len(),
        vacant = report.vacancies.len(),
        "station processed"
    );
    report
}
