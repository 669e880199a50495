//! Train journey aggregate and its state machine.
//!
//! A [`TrainJourney`] owns everything that changes while the train runs: berth
//! occupancy, the passenger manifest and the current station index. It moves
//! through three phases:
//!
//! ```text
//! NOT_STARTED --start()--> IN_PROGRESS --advance() x (N-1)--> COMPLETE
//! ```
//!
//! Each `advance()` processes the arrival at the current station and then
//! moves to the next one. Once the index reaches the terminal station further
//! advances are rejected without touching any state.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::arrival::{self, StationReport};
use crate::error::JourneyError;
use crate::manifest::{Manifest, Passenger, PassengerFilter};
use crate::occupancy::{Coach, OccupancyStore};
use crate::reallocation::{self, Allocation, EligibilityMatrix};
use crate::stats::{JourneyStats, Progress};
use crate::types::{BerthId, Pnr};
use crate::views::RacQueueEntry;

/// Identifies one run of a train.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainKey {
    pub train_no: String,
    pub journey_date: NaiveDate,
}

impl TrainKey {
    pub fn new(train_no: impl Into<String>, journey_date: NaiveDate) -> Self {
        Self {
            train_no: train_no.into(),
            journey_date,
        }
    }
}

impl fmt::Display for TrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.train_no, self.journey_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub idx: usize,
    pub code: String,
    pub name: String,
}

impl Station {
    pub fn new(idx: usize, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            idx,
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Everything the load collaborator provides for one train run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainManifest {
    pub key: TrainKey,
    pub train_name: String,
    pub stations: Vec<Station>,
    pub coaches: Vec<Coach>,
    pub passengers: Vec<Passenger>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JourneyPhase {
    NotStarted,
    InProgress,
    Complete,
}

impl fmt::Display for JourneyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyState {
    pub current_station_idx: usize,
    pub journey_started: bool,
}

/// Result of a successful `advance()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    pub report: StationReport,
    /// Present when this advance brought the train to its terminal station.
    pub completed: Option<JourneySummary>,
}

/// Totals reported when the train reaches its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneySummary {
    pub final_station: Station,
    pub total_passengers: usize,
    pub deboarded_at_destination: usize,
    pub total_deboarded: usize,
    pub total_no_shows: usize,
    pub total_rac_upgraded: usize,
}

/// Result of marking a passenger as a no-show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoShowOutcome {
    pub pnr: Pnr,
    pub name: String,
    pub station: Station,
    /// Berth whose remaining segments were freed.
    pub released: Option<BerthId>,
    /// RAC passengers upgraded into the freed capacity.
    pub upgrades: Vec<Allocation>,
}

/// Train identity plus headline numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainSummary {
    pub train_no: String,
    pub train_name: String,
    pub journey_date: NaiveDate,
    pub total_stations: usize,
    pub current_station: Station,
    pub phase: JourneyPhase,
    pub stats: JourneyStats,
}

/// Full serialisable view of a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneySnapshot {
    pub train_no: String,
    pub train_name: String,
    pub journey_date: NaiveDate,
    pub state: JourneyState,
    pub phase: JourneyPhase,
    pub stations: Vec<Station>,
    pub coaches: Vec<Coach>,
    pub rac_queue: Vec<RacQueueEntry>,
    pub stats: JourneyStats,
}

/// The train-journey aggregate.
#[derive(Debug, Clone)]
pub struct TrainJourney {
    key: TrainKey,
    train_name: String,
    pub(crate) stations: Vec<Station>,
    pub(crate) occupancy: OccupancyStore,
    pub(crate) manifest: Manifest,
    state: JourneyState,
}

impl TrainJourney {
    /// Validates a loaded manifest and seats its confirmed passengers.
    ///
    /// Fails on routes shorter than two stations, duplicate PNRs, travel
    /// windows outside the route, unknown berths, and overlapping bookings.
    pub fn from_manifest(manifest: TrainManifest) -> Result<Self, JourneyError> {
        let TrainManifest {
            key,
            train_name,
            mut stations,
            coaches,
            passengers,
        } = manifest;

        if stations.len() < 2 {
            return Err(JourneyError::TooFewStations(stations.len()));
        }
        for (idx, station) in stations.iter_mut().enumerate() {
            station.idx = idx;
        }
        let segments = stations.len() - 1;

        let mut occupancy = OccupancyStore::new(coaches, segments);
        let manifest = Manifest::new(passengers)?;
        for passenger in manifest.iter() {
            passenger.window.validate(segments)?;
            if let Some(berth) = passenger.berth() {
                occupancy.occupy(berth, passenger.window, &passenger.pnr)?;
            }
        }

        tracing::debug!(
            train = %key,
            stations = stations.len(),
            berths = occupancy.berth_count(),
            passengers = manifest.len(),
            "journey loaded"
        );

        Ok(Self {
            key,
            train_name,
            stations,
            occupancy,
            manifest,
            state: JourneyState::default(),
        })
    }

    pub const fn key(&self) -> &TrainKey {
        &self.key
    }

    pub fn train_name(&self) -> &str {
        &self.train_name
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub const fn occupancy(&self) -> &OccupancyStore {
        &self.occupancy
    }

    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub const fn state(&self) -> JourneyState {
        self.state
    }

    const fn terminal_idx(&self) -> usize {
        self.occupancy.segment_count()
    }

    pub const fn phase(&self) -> JourneyPhase {
        if !self.state.journey_started {
            JourneyPhase::NotStarted
        } else if self.state.current_station_idx >= self.terminal_idx() {
            JourneyPhase::Complete
        } else {
            JourneyPhase::InProgress
        }
    }

    pub fn current_station(&self) -> &Station {
        &self.stations[self.state.current_station_idx]
    }

    pub fn final_station(&self) -> &Station {
        &self.stations[self.terminal_idx()]
    }

    fn ensure_not_complete(&self) -> Result<(), JourneyError> {
        if self.phase() == JourneyPhase::Complete {
            return Err(JourneyError::JourneyComplete {
                station: self.final_station().name.clone(),
            });
        }
        Ok(())
    }

    /// NOT_STARTED -> IN_PROGRESS.
    pub fn start(&mut self) -> Result<Station, JourneyError> {
        if self.state.journey_started {
            return Err(JourneyError::AlreadyStarted);
        }
        self.state.journey_started = true;
        tracing::info!(train = %self.key, station = %self.current_station().name, "journey started");
        Ok(self.current_station().clone())
    }

    /// Processes the arrival at the current station and moves to the next one.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, JourneyError> {
        if self.phase() == JourneyPhase::NotStarted {
            return Err(JourneyError::NotStarted);
        }
        self.ensure_not_complete()?;

        let report = arrival::process_station_arrival(self);
        self.state.current_station_idx += 1;

        let completed = (self.phase() == JourneyPhase::Complete).then(|| self.arrive_at_destination());
        Ok(AdvanceOutcome { report, completed })
    }

    /// Deboards everyone still aboard at the terminal station.
    fn arrive_at_destination(&mut self) -> JourneySummary {
        let terminal = self.terminal_idx();
        let arriving: Vec<Pnr> = self
            .manifest
            .alighting_at(terminal)
            .filter(|p| p.is_onboard())
            .map(|p| p.pnr.clone())
            .collect();
        for pnr in &arriving {
            if let Ok(passenger) = self.manifest.by_id_mut(pnr) {
                passenger.deboarded = true;
            }
        }

        let stats = self.stats();
        tracing::info!(
            train = %self.key,
            station = %self.final_station().name,
            deboarded = arriving.len(),
            "journey complete"
        );
        JourneySummary {
            final_station: self.final_station().clone(),
            total_passengers: stats.total_passengers,
            deboarded_at_destination: arriving.len(),
            total_deboarded: stats.total_deboarded,
            total_no_shows: stats.total_no_shows,
            total_rac_upgraded: stats.total_rac_upgraded,
        }
    }

    /// Marks a passenger as a no-show at the current station.
    ///
    /// A confirmed passenger frees their berth from the current station
    /// onwards (segments already travelled are left as they were), then the
    /// auto-upgrade pass runs for RAC passengers boarding here.
    pub fn mark_no_show(&mut self, pnr: &Pnr) -> Result<NoShowOutcome, JourneyError> {
        self.ensure_not_complete()?;
        let station_idx = self.state.current_station_idx;
        let passenger = self.manifest.by_id(pnr)?;
        let ineligible = |reason| JourneyError::Ineligible {
            pnr: pnr.clone(),
            action: "marked no-show",
            reason,
        };
        if passenger.is_no_show() {
            return Err(ineligible("already marked as no-show"));
        }
        if passenger.boarded {
            return Err(ineligible("already boarded"));
        }
        if passenger.window.to <= station_idx {
            return Err(ineligible("journey already over"));
        }
        let name = passenger.name.clone();

        let released = arrival::release_no_show(&mut self.occupancy, &mut self.manifest, pnr, station_idx)?;
        let upgrades = reallocation::auto_upgrade(&mut self.occupancy, &mut self.manifest, station_idx);

        Ok(NoShowOutcome {
            pnr: pnr.clone(),
            name,
            station: self.current_station().clone(),
            released,
            upgrades,
        })
    }

    /// RAC passengers and the berths free for their whole window, as of the
    /// current station. Read-only.
    pub fn eligibility(&self) -> Result<EligibilityMatrix, JourneyError> {
        reallocation::compute_eligibility(&self.occupancy, &self.manifest, self.state.current_station_idx)
    }

    /// Commits a RAC passenger to a berth, re-checking that it is still free.
    pub fn apply_reallocation(&mut self, pnr: &Pnr, berth: &BerthId) -> Result<Allocation, JourneyError> {
        self.ensure_not_complete()?;
        reallocation::apply_reallocation(
            &mut self.occupancy,
            &mut self.manifest,
            pnr,
            berth,
            self.state.current_station_idx,
        )
    }

    pub fn stats(&self) -> JourneyStats {
        JourneyStats::compute(&self.occupancy, &self.manifest, self.state.current_station_idx)
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.state.current_station_idx, self.stations.len())
    }

    pub fn passenger(&self, pnr: &Pnr) -> Result<&Passenger, JourneyError> {
        self.manifest.by_id(pnr)
    }

    pub fn passengers(&self, filter: PassengerFilter) -> Vec<Passenger> {
        self.manifest.with_filter(filter).cloned().collect()
    }

    pub fn summary(&self) -> TrainSummary {
        TrainSummary {
            train_no: self.key.train_no.clone(),
            train_name: self.train_name.clone(),
            journey_date: self.key.journey_date,
            total_stations: self.stations.len(),
            current_station: self.current_station().clone(),
            phase: self.phase(),
            stats: self.stats(),
        }
    }

    pub fn snapshot(&self) -> JourneySnapshot {
        JourneySnapshot {
            train_no: self.key.train_no.clone(),
            train_name: self.train_name.clone(),
            journey_date: self.key.journey_date,
            state: self.state,
            phase: self.phase(),
            stations: self.stations.clone(),
            coaches: self.occupancy.coaches().to_vec(),
            rac_queue: self.rac_queue(),
            stats: self.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::PassengerStatus;
    use crate::occupancy::{Slot, TravelWindow};
    use crate::test_support::{berth, cnf, journey, pnr, rac};

    use proptest::prelude::*;

    /// Stations A..D, one single-berth coach, P1 confirmed [0,3), P2 RAC [1,3).
    fn scenario() -> TrainJourney {
        journey(
            &["A", "B", "C", "D"],
            1,
            vec![cnf("P1", 0, 3, "S1-1"), rac("P2", 1, 3, 1)],
        )
    }

    #[test]
    fn from_manifest_seats_confirmed_passengers() {
        let journey = scenario();
        let slots = journey.occupancy().find(&berth("S1-1")).unwrap().berth.occupancy.slots().to_vec();
        assert_eq!(slots, vec![Slot::Held(pnr("P1")); 3]);
        assert_eq!(journey.phase(), JourneyPhase::NotStarted);
        assert_eq!(journey.current_station().code, "A");
    }

    #[test]
    fn from_manifest_rejects_overlapping_bookings() {
        let manifest = crate::test_support::train_manifest(
            &["A", "B", "C"],
            1,
            vec![cnf("P1", 0, 2, "S1-1"), cnf("P2", 1, 2, "S1-1")],
        );
        let err = TrainJourney::from_manifest(manifest).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn from_manifest_rejects_window_past_route() {
        let manifest = crate::test_support::train_manifest(&["A", "B"], 1, vec![cnf("P1", 0, 2, "S1-1")]);
        assert!(matches!(
            TrainJourney::from_manifest(manifest),
            Err(JourneyError::InvalidWindow { from: 0, to: 2, segments: 1 })
        ));
    }

    #[test]
    fn from_manifest_rejects_single_station_route() {
        let manifest = crate::test_support::train_manifest(&["A"], 1, vec![]);
        assert_eq!(
            TrainJourney::from_manifest(manifest).unwrap_err(),
            JourneyError::TooFewStations(1)
        );
    }

    #[test]
    fn start_twice_fails() {
        let mut journey = scenario();
        assert_eq!(journey.start().unwrap().code, "A");
        assert_eq!(journey.start().unwrap_err(), JourneyError::AlreadyStarted);
    }

    #[test]
    fn advance_before_start_fails() {
        let mut journey = scenario();
        assert_eq!(journey.advance().unwrap_err(), JourneyError::NotStarted);
        assert_eq!(journey.state().current_station_idx, 0);
    }

    #[test]
    fn advance_n_minus_one_times_completes_journey() {
        let mut journey = scenario();
        journey.start().unwrap();

        for expected in 1..=3 {
            let outcome = journey.advance().unwrap();
            assert_eq!(journey.state().current_station_idx, expected);
            assert_eq!(outcome.completed.is_some(), expected == 3);
        }
        assert_eq!(journey.phase(), JourneyPhase::Complete);

        let before = journey.snapshot();
        let err = journey.advance().unwrap_err();
        assert_eq!(
            err,
            JourneyError::JourneyComplete {
                station: "Station D".to_string()
            }
        );
        assert_eq!(journey.snapshot(), before);
    }

    #[test]
    fn passenger_who_turns_up_keeps_berth_at_origin() {
        let mut journey = scenario();
        journey.start().unwrap();
        let outcome = journey.advance().unwrap();

        assert!(outcome.report.no_shows.is_empty());
        assert_eq!(outcome.report.boarded, vec![pnr("P1")]);
        let slots = journey.occupancy().find(&berth("S1-1")).unwrap().berth.occupancy.slots().to_vec();
        assert_eq!(slots, vec![Slot::Held(pnr("P1")); 3]);
        assert!(journey.passenger(&pnr("P2")).unwrap().is_rac());
    }

    #[test]
    fn no_show_frees_berth_for_rac_passenger_at_their_origin() {
        let mut journey = scenario();
        journey.start().unwrap();

        let outcome = journey.mark_no_show(&pnr("P1")).unwrap();
        assert_eq!(outcome.released, Some(berth("S1-1")));
        assert!(outcome.upgrades.is_empty(), "P2 boards at B, not A");
        assert!(journey.occupancy().is_free(&berth("S1-1"), TravelWindow::new(0, 3)).unwrap());

        let at_a = journey.advance().unwrap();
        assert!(at_a.report.upgrades.is_empty());
        assert!(journey.passenger(&pnr("P2")).unwrap().is_rac());

        let at_b = journey.advance().unwrap();
        assert_eq!(at_b.report.upgrades.len(), 1);
        assert_eq!(at_b.report.upgrades[0].pnr, pnr("P2"));
        assert_eq!(at_b.report.boarded, vec![pnr("P2")]);

        let p2 = journey.passenger(&pnr("P2")).unwrap();
        assert_eq!(
            p2.status,
            PassengerStatus::Confirmed {
                berth: berth("S1-1"),
                upgraded: true
            }
        );
        assert!(p2.boarded);
        let slots = journey.occupancy().find(&berth("S1-1")).unwrap().berth.occupancy.slots().to_vec();
        assert_eq!(slots, vec![Slot::Vacant, Slot::Held(pnr("P2")), Slot::Held(pnr("P2"))]);
    }

    #[test]
    fn no_show_ahead_of_origin_frees_whole_window() {
        let mut journey = journey(
            &["A", "B", "C", "D"],
            1,
            vec![cnf("P0", 0, 1, "S1-1"), cnf("P1", 2, 3, "S1-1")],
        );
        journey.start().unwrap();
        journey.advance().unwrap();

        let outcome = journey.mark_no_show(&pnr("P1")).unwrap();
        assert_eq!(outcome.station.code, "B");
        let slots = journey.occupancy().find(&berth("S1-1")).unwrap().berth.occupancy.slots().to_vec();
        assert_eq!(slots, vec![Slot::Held(pnr("P0")), Slot::Vacant, Slot::Vacant]);
    }

    #[test]
    fn boarded_passenger_cannot_be_no_show() {
        let mut journey = journey(
            &["A", "B", "C", "D"],
            1,
            vec![cnf("P0", 0, 1, "S1-1"), cnf("P1", 1, 3, "S1-1")],
        );
        journey.start().unwrap();
        journey.advance().unwrap();
        journey.advance().unwrap();

        let err = journey.mark_no_show(&pnr("P1")).unwrap_err();
        assert!(matches!(err, JourneyError::Ineligible { reason: "already boarded", .. }));
    }

    #[test]
    fn no_show_rejects_repeat_and_unknown() {
        let mut journey = scenario();
        journey.mark_no_show(&pnr("P1")).unwrap();
        assert!(matches!(
            journey.mark_no_show(&pnr("P1")),
            Err(JourneyError::Ineligible { reason: "already marked as no-show", .. })
        ));
        assert_eq!(
            journey.mark_no_show(&pnr("P9")).unwrap_err(),
            JourneyError::PassengerNotFound(pnr("P9"))
        );
    }

    #[test]
    fn absent_passenger_detected_at_origin() {
        let mut absent = cnf("P1", 0, 3, "S1-1");
        absent.absent = true;
        let mut journey = journey(&["A", "B", "C", "D"], 1, vec![absent, rac("P2", 0, 2, 1)]);
        journey.start().unwrap();

        let outcome = journey.advance().unwrap();
        assert_eq!(outcome.report.no_shows, vec![pnr("P1")]);
        assert_eq!(outcome.report.upgrades.len(), 1);
        assert_eq!(outcome.report.boarded, vec![pnr("P2")]);
        assert_eq!(outcome.report.stats.total_no_shows, 1);
        assert_eq!(outcome.report.stats.total_rac_upgraded, 1);
    }

    #[test]
    fn destination_deboards_remaining_passengers() {
        let mut journey = scenario();
        journey.start().unwrap();
        journey.advance().unwrap();
        journey.advance().unwrap();
        let outcome = journey.advance().unwrap();

        let summary = outcome.completed.unwrap();
        assert_eq!(summary.final_station.code, "D");
        assert_eq!(summary.deboarded_at_destination, 1);
        assert_eq!(summary.total_deboarded, 1);
        assert_eq!(journey.stats().current_onboard, 0);
    }

    #[test]
    fn reallocation_after_completion_is_rejected() {
        let mut journey = journey(&["A", "B"], 1, vec![rac("P2", 0, 1, 1)]);
        journey.start().unwrap();
        journey.advance().unwrap();
        assert!(matches!(
            journey.apply_reallocation(&pnr("P2"), &berth("S1-1")),
            Err(JourneyError::JourneyComplete { .. })
        ));
    }

    #[test]
    fn eligibility_is_side_effect_free() {
        let mut journey = journey(
            &["A", "B", "C", "D"],
            2,
            vec![cnf("P1", 0, 2, "S1-1"), rac("R1", 1, 3, 1), rac("R2", 2, 3, 2)],
        );
        journey.start().unwrap();
        let before = journey.snapshot();

        let first = journey.eligibility().unwrap();
        for _ in 0..5 {
            assert_eq!(journey.eligibility().unwrap(), first);
        }
        assert_eq!(journey.snapshot(), before);
        journey.advance().unwrap();
    }

    // ========== Randomized invariants ==========

    #[derive(Debug, Clone)]
    enum Op {
        Advance,
        NoShow(usize),
        Apply(usize, usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Advance),
            (0usize..8).prop_map(Op::NoShow),
            (0usize..8, 0usize..3).prop_map(|(p, b)| Op::Apply(p, b)),
        ]
    }

    fn passenger_spec() -> impl Strategy<Value = (usize, usize, bool, bool)> {
        (0usize..4, 1usize..5, any::<bool>(), prop::bool::weighted(0.2))
            .prop_map(|(from, len, wants_berth, absent)| (from, (from + len).min(5), wants_berth, absent))
            .prop_filter("non-empty window", |(from, to, _, _)| from < to)
    }

    /// Seats passengers greedily; whoever does not fit goes on the RAC queue.
    fn random_journey(specs: &[(usize, usize, bool, bool)]) -> TrainJourney {
        let mut seated: Vec<Vec<bool>> = vec![vec![false; 5]; 3];
        let mut passengers = Vec::new();
        for (i, &(from, to, wants_berth, absent)) in specs.iter().enumerate() {
            let id = format!("P{i}");
            let free = (0..3).find(|&b| (from..to).all(|s| !seated[b][s]));
            let mut passenger = match free {
                Some(b) if wants_berth => {
                    for slot in &mut seated[b][from..to] {
                        *slot = true;
                    }
                    cnf(&id, from, to, &format!("S1-{}", b + 1))
                }
                _ => rac(&id, from, to, u32::try_from(i).unwrap()),
            };
            passenger.absent = absent;
            passengers.push(passenger);
        }
        journey(&["A", "B", "C", "D", "E", "F"], 3, passengers)
    }

    fn assert_consistent(journey: &TrainJourney) {
        for berth_ref in journey.occupancy().berths() {
            let id = berth_ref.id();
            for (segment, slot) in berth_ref.berth.occupancy.slots().iter().enumerate() {
                if let Slot::Held(holder) = slot {
                    let passenger = journey.passenger(holder).unwrap();
                    assert_eq!(passenger.berth(), Some(&id), "{holder} holds {id} without booking");
                    assert!(passenger.window.covers(segment), "{holder} overextends on {id}");
                }
            }
        }
        for passenger in journey.manifest().iter() {
            if let Some(id) = passenger.berth() {
                let occupancy = &journey.occupancy().find(id).unwrap().berth.occupancy;
                for segment in passenger.window.segments() {
                    assert_eq!(occupancy.holder(segment), Some(&passenger.pnr), "gap on {id}");
                }
            }
        }
    }

    proptest! {
        #[test]
        fn random_operations_never_double_book(
            specs in prop::collection::vec(passenger_spec(), 1..8),
            ops in prop::collection::vec(op(), 0..20),
        ) {
            let mut journey = random_journey(&specs);
            journey.start().unwrap();
            assert_consistent(&journey);

            for op in ops {
                let station = journey.state().current_station_idx;
                match op {
                    Op::Advance => {
                        if let Ok(outcome) = journey.advance() {
                            for upgrade in &outcome.report.upgrades {
                                prop_assert!(upgrade.window.from >= station);
                            }
                        }
                    }
                    Op::NoShow(p) => {
                        if let Ok(outcome) = journey.mark_no_show(&pnr(&format!("P{p}"))) {
                            for upgrade in &outcome.upgrades {
                                prop_assert!(upgrade.window.from >= station);
                            }
                        }
                    }
                    Op::Apply(p, b) => {
                        let _ = journey.apply_reallocation(&pnr(&format!("P{p}")), &berth(&format!("S1-{}", b + 1)));
                    }
                }
                assert_consistent(&journey);
            }
        }
    }
}
