//! RAC reallocation engine.
//!
//! Three operations over the occupancy store and the manifest:
//!
//! - [`compute_eligibility`] lists, for each waiting RAC passenger who has not
//!   yet started travelling, every berth free for their whole window. It never
//!   writes, so repeated calls agree with each other.
//! - [`apply_reallocation`] commits one passenger to one berth, re-checking
//!   the berth at commit time.
//! - [`auto_upgrade`] walks the RAC queue for passengers boarding at the
//!   current station and gives each the first berth that fits.
//!
//! Berths are always scanned in coach order then berth number, so results are
//! deterministic for a given state.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::JourneyError;
use crate::manifest::{Manifest, Passenger, PassengerStatus};
use crate::occupancy::{OccupancyStore, TravelWindow};
use crate::types::{BerthId, BerthType, Pnr};

/// A committed RAC upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub pnr: Pnr,
    pub name: String,
    pub berth: BerthId,
    pub berth_type: BerthType,
    pub window: TravelWindow,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityEntry {
    pub pnr: Pnr,
    pub name: String,
    pub priority: u32,
    pub window: TravelWindow,
    pub eligible_berths: Vec<BerthId>,
}

/// RAC passengers in queue order, each with the berths they could take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityMatrix {
    pub at_station: usize,
    pub entries: Vec<EligibilityEntry>,
}

impl EligibilityMatrix {
    pub fn entry(&self, pnr: &Pnr) -> Option<&EligibilityEntry> {
        self.entries.iter().find(|entry| &entry.pnr == pnr)
    }

    /// Entries with at least one eligible berth.
    pub fn with_options(&self) -> impl Iterator<Item = &EligibilityEntry> + '_ {
        self.entries.iter().filter(|entry| !entry.eligible_berths.is_empty())
    }
}

fn free_berths(store: &OccupancyStore, window: TravelWindow) -> Result<Vec<BerthId>, JourneyError> {
    let mut free = Vec::new();
    for b in store.berths() {
        if b.berth.occupancy.is_free(window)? {
            free.push(b.id());
        }
    }
    Ok(free)
}

/// Builds the eligibility matrix as of `at_station`.
///
/// Only RAC passengers with `from >= at_station` are listed; someone whose
/// journey has already begun cannot be moved onto a berth. Fails if a
/// waiting passenger's window runs past the route.
pub fn compute_eligibility(
    store: &OccupancyStore,
    manifest: &Manifest,
    at_station: usize,
) -> Result<EligibilityMatrix, JourneyError> {
    let waiting: Vec<&Passenger> = manifest
        .rac_queue()
        .into_iter()
        .filter(|p| p.window.from >= at_station)
        .collect();

    // Indexed collect keeps queue order.
    let entries: Vec<EligibilityEntry> = waiting
        .par_iter()
        .filter_map(|p| {
            let priority = p.rac_priority()?;
            Some(free_berths(store, p.window).map(|eligible_berths| EligibilityEntry {
                pnr: p.pnr.clone(),
                name: p.name.clone(),
                priority,
                window: p.window,
                eligible_berths,
            }))
        })
        .collect::<Result<_, _>>()?;

    Ok(EligibilityMatrix { at_station, entries })
}

/// Assigns `berth` to the RAC passenger `pnr` for their whole window.
///
/// Fails without changing anything when the passenger is not on the RAC
/// queue, their journey began before `at_station`, the berth does not exist,
/// or any segment of the window is no longer free.
pub fn apply_reallocation(
    store: &mut OccupancyStore,
    manifest: &mut Manifest,
    pnr: &Pnr,
    berth: &BerthId,
    at_station: usize,
) -> Result<Allocation, JourneyError> {
    let passenger = manifest.by_id(pnr)?;
    let ineligible = |reason| JourneyError::Ineligible {
        pnr: pnr.clone(),
        action: "reallocated",
        reason,
    };
    let Some(priority) = passenger.rac_priority() else {
        return Err(ineligible("not on the RAC queue"));
    };
    if passenger.window.from < at_station {
        return Err(ineligible("journey already begun"));
    }
    let window = passenger.window;
    let name = passenger.name.clone();
    let berth_type = store.find(berth)?.berth.berth_type;

    store.occupy(berth, window, pnr)?;
    manifest.by_id_mut(pnr)?.status = PassengerStatus::Confirmed {
        berth: berth.clone(),
        upgraded: true,
    };

    tracing::info!(%pnr, %berth, from = window.from, to = window.to, "RAC passenger upgraded");
    Ok(Allocation {
        pnr: pnr.clone(),
        name,
        berth: berth.clone(),
        berth_type,
        window,
        priority,
    })
}

/// Upgrades RAC passengers boarding at `at_station`, in queue order.
///
/// Each passenger gets the first berth free for their whole window. Anyone
/// who does not fit stays on the queue.
pub fn auto_upgrade(store: &mut OccupancyStore, manifest: &mut Manifest, at_station: usize) -> Vec<Allocation> {
    let boarding: Vec<(Pnr, TravelWindow)> = manifest
        .rac_queue()
        .into_iter()
        .filter(|p| p.window.from == at_station)
        .map(|p| (p.pnr.clone(), p.window))
        .collect();

    let mut upgrades = Vec::new();
    for (pnr, window) in boarding {
        let berth = match free_berths(store, window) {
            Ok(free) => free.into_iter().next(),
            Err(err) => {
                tracing::warn!(%pnr, error = %err, "cannot search berths for window");
                continue;
            }
        };
        let Some(berth) = berth else {
            tracing::debug!(%pnr, "no berth free for whole window");
            continue;
        };
        match apply_reallocation(store, manifest, &pnr, &berth, at_station) {
            Ok(allocation) => upgrades.push(allocation),
            Err(err) if err.is_conflict() => {
                tracing::debug!(%pnr, %berth, error = %err, "berth taken, skipping");
            }
            Err(err) => {
                tracing::warn!(%pnr, %berth, error = %err, "auto-upgrade failed");
            }
        }
    }
    upgrades
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::Coach;
    use crate::test_support::{berth, cnf, pnr, rac};
    use crate::types::{CoachClass, CoachNo};

    fn store(berths: u16, segments: usize) -> OccupancyStore {
        let coach = Coach::with_berths(CoachNo::new("S1").unwrap(), CoachClass::Sleeper, berths, segments);
        OccupancyStore::new(vec![coach], segments)
    }

    fn seat(store: &mut OccupancyStore, manifest: &Manifest) {
        for p in manifest.iter() {
            if let Some(b) = p.berth() {
                store.occupy(b, p.window, &p.pnr).unwrap();
            }
        }
    }

    #[test]
    fn eligibility_lists_berths_free_for_whole_window() {
        let mut store = store(3, 4);
        let manifest = Manifest::new(vec![
            cnf("C1", 0, 2, "S1-1"),
            cnf("C2", 2, 4, "S1-2"),
            rac("R1", 1, 3, 1),
            rac("R2", 2, 4, 2),
        ])
        .unwrap();
        seat(&mut store, &manifest);

        let matrix = compute_eligibility(&store, &manifest, 0).unwrap();
        assert_eq!(matrix.entries.len(), 2);
        assert_eq!(matrix.entry(&pnr("R1")).unwrap().eligible_berths, vec![berth("S1-3")]);
        assert_eq!(
            matrix.entry(&pnr("R2")).unwrap().eligible_berths,
            vec![berth("S1-1"), berth("S1-3")]
        );
    }

    #[test]
    fn eligibility_skips_passengers_already_travelling() {
        let store = store(1, 3);
        let manifest = Manifest::new(vec![rac("R1", 0, 3, 1), rac("R2", 1, 3, 2)]).unwrap();

        let matrix = compute_eligibility(&store, &manifest, 1).unwrap();
        let listed: Vec<&str> = matrix.entries.iter().map(|e| e.pnr.as_str()).collect();
        assert_eq!(listed, vec!["R2"]);
    }

    #[test]
    fn eligibility_is_in_priority_order() {
        let store = store(1, 2);
        let manifest = Manifest::new(vec![rac("R3", 0, 2, 3), rac("R1", 0, 2, 1), rac("R2", 0, 2, 2)]).unwrap();

        let matrix = compute_eligibility(&store, &manifest, 0).unwrap();
        let order: Vec<u32> = matrix.entries.iter().map(|e| e.priority).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn window_past_route_is_reported_not_hidden() {
        let mut store = store(1, 2);
        let mut manifest = Manifest::new(vec![rac("R1", 0, 3, 1)]).unwrap();

        assert!(matches!(
            compute_eligibility(&store, &manifest, 0),
            Err(JourneyError::InvalidWindow { .. })
        ));
        assert!(auto_upgrade(&mut store, &mut manifest, 0).is_empty());
        assert!(manifest.by_id(&pnr("R1")).unwrap().is_rac());
    }

    #[test]
    fn apply_commits_berth_and_status() {
        let mut store = store(1, 3);
        let mut manifest = Manifest::new(vec![rac("R1", 1, 3, 1)]).unwrap();

        let allocation = apply_reallocation(&mut store, &mut manifest, &pnr("R1"), &berth("S1-1"), 0).unwrap();
        assert_eq!(allocation.berth_type, BerthType::Lower);
        assert_eq!(allocation.priority, 1);
        assert!(manifest.by_id(&pnr("R1")).unwrap().is_upgraded());
        assert!(!store.is_free(&berth("S1-1"), TravelWindow::new(1, 3)).unwrap());
        assert!(store.is_free(&berth("S1-1"), TravelWindow::new(0, 1)).unwrap());
        assert!(manifest.rac_queue().is_empty());
    }

    #[test]
    fn apply_rejects_stale_eligibility() {
        let mut store = store(1, 3);
        let mut manifest = Manifest::new(vec![rac("R1", 0, 3, 1), rac("R2", 1, 2, 2)]).unwrap();
        let matrix = compute_eligibility(&store, &manifest, 0).unwrap();
        assert_eq!(matrix.entry(&pnr("R2")).unwrap().eligible_berths, vec![berth("S1-1")]);

        apply_reallocation(&mut store, &mut manifest, &pnr("R1"), &berth("S1-1"), 0).unwrap();
        let err = apply_reallocation(&mut store, &mut manifest, &pnr("R2"), &berth("S1-1"), 0).unwrap_err();
        assert!(err.is_conflict());
        assert!(manifest.by_id(&pnr("R2")).unwrap().is_rac());
    }

    #[test]
    fn apply_rejects_non_rac_and_started_journeys() {
        let mut store = store(2, 3);
        let mut manifest = Manifest::new(vec![cnf("C1", 0, 3, "S1-1"), rac("R1", 0, 3, 1)]).unwrap();
        seat(&mut store, &manifest);

        assert!(matches!(
            apply_reallocation(&mut store, &mut manifest, &pnr("C1"), &berth("S1-2"), 0),
            Err(JourneyError::Ineligible { reason: "not on the RAC queue", .. })
        ));
        assert!(matches!(
            apply_reallocation(&mut store, &mut manifest, &pnr("R1"), &berth("S1-2"), 1),
            Err(JourneyError::Ineligible { reason: "journey already begun", .. })
        ));
        assert_eq!(
            apply_reallocation(&mut store, &mut manifest, &pnr("R1"), &berth("S1-9"), 0).unwrap_err(),
            JourneyError::BerthNotFound(berth("S1-9"))
        );
        assert!(store.is_free(&berth("S1-2"), TravelWindow::new(0, 3)).unwrap());
    }

    #[test]
    fn auto_upgrade_serves_queue_in_priority_order() {
        let mut store = store(1, 2);
        let mut manifest = Manifest::new(vec![rac("R2", 0, 2, 2), rac("R1", 0, 2, 1)]).unwrap();

        let upgrades = auto_upgrade(&mut store, &mut manifest, 0);
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades[0].pnr, pnr("R1"));
        assert!(manifest.by_id(&pnr("R2")).unwrap().is_rac());
    }

    #[test]
    fn auto_upgrade_only_considers_boarding_station() {
        let mut store = store(1, 3);
        let mut manifest = Manifest::new(vec![rac("R1", 1, 3, 1), rac("R2", 0, 3, 2)]).unwrap();

        let upgrades = auto_upgrade(&mut store, &mut manifest, 1);
        let upgraded: Vec<&str> = upgrades.iter().map(|a| a.pnr.as_str()).collect();
        assert_eq!(upgraded, vec!["R1"]);
    }

    #[test]
    fn auto_upgrade_fills_around_existing_bookings() {
        let mut store = store(2, 4);
        let mut manifest = Manifest::new(vec![
            cnf("C1", 0, 2, "S1-1"),
            rac("R1", 0, 4, 1),
            rac("R2", 0, 1, 2),
        ])
        .unwrap();
        seat(&mut store, &manifest);

        let upgrades = auto_upgrade(&mut store, &mut manifest, 0);
        assert_eq!(upgrades[0].berth, berth("S1-2"));
        assert_eq!(upgrades.len(), 1, "R2 finds no berth");
        assert!(manifest.by_id(&pnr("R2")).unwrap().is_rac());
    }
}
