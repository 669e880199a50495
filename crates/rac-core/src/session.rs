//! Shared journey session.
//!
//! A [`JourneySession`] owns at most one [`TrainJourney`] and serialises access
//! to it: reads share an `RwLock`, every mutation takes it exclusively for the
//! whole read-check-write. Loading and event delivery go through the
//! [`TrainLoader`] and [`EventSink`] seams. The store lock is taken before
//! the journey lock is released, so events reach the sink in commit order.
//! Locks are always taken journey first, then store. Delivery is best
//! effort: a failing sink is logged and never rolls back a committed change.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::JourneyError;
use crate::event::JourneyEvent;
use crate::journey::{
    AdvanceOutcome, JourneySnapshot, NoShowOutcome, Station, TrainJourney, TrainKey, TrainManifest, TrainSummary,
};
use crate::manifest::{Passenger, PassengerCounts, PassengerFilter};
use crate::reallocation::{Allocation, EligibilityMatrix};
use crate::stats::{JourneyStats, Progress};
use crate::types::{BerthId, Pnr};
use crate::views::{BerthTimeline, RacQueueEntry, SegmentMatrix, VacantBerth};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no manifest for train {train_no} on {journey_date}")]
    NotFound { train_no: String, journey_date: NaiveDate },

    #[error("train store unavailable: {0}")]
    Connection(#[source] BoxError),

    /// The store answered but its data does not form a manifest.
    #[error("stored manifest is invalid: {0}")]
    Invalid(#[source] BoxError),
}

#[derive(Debug, Error)]
#[error("event delivery failed: {0}")]
pub struct SinkError(#[source] pub BoxError);

/// Source of train manifests.
pub trait TrainLoader {
    fn load_train(&self, key: &TrainKey) -> Result<TrainManifest, LoadError>;
}

/// Destination for journey events.
pub trait EventSink {
    fn publish(&self, key: &TrainKey, event: &JourneyEvent) -> Result<(), SinkError>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Journey(#[from] JourneyError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl SessionError {
    pub const fn journey(&self) -> Option<&JourneyError> {
        match self {
            Self::Journey(err) => Some(err),
            Self::Load(_) => None,
        }
    }
}

pub struct JourneySession<S> {
    store: Mutex<S>,
    journey: RwLock<Option<TrainJourney>>,
}

impl<S: TrainLoader + EventSink> JourneySession<S> {
    pub const fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
            journey: RwLock::new(None),
        }
    }

    fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the underlying store.
    pub fn with_store<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.store())
    }

    fn publish(store: &S, key: &TrainKey, events: &[JourneyEvent]) {
        for event in events {
            if let Err(err) = store.publish(key, event) {
                tracing::warn!(train = %key, kind = %event.kind(), error = %err, "failed to publish journey event");
            }
        }
    }

    fn load(&self, key: &TrainKey) -> Result<TrainJourney, SessionError> {
        let manifest = self.store().load_train(key)?;
        Ok(TrainJourney::from_manifest(manifest)?)
    }

    fn install(&self, journey: TrainJourney, event: fn(TrainSummary) -> JourneyEvent) -> TrainSummary {
        let summary = journey.summary();
        let key = journey.key().clone();
        let mut slot = self.journey.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(journey);
        let store = self.store();
        drop(slot);
        Self::publish(&store, &key, &[event(summary.clone())]);
        summary
    }

    /// Loads `key` and replaces any journey currently held.
    ///
    /// On failure the previous journey, if any, is kept.
    pub fn initialize(&self, key: &TrainKey) -> Result<TrainSummary, SessionError> {
        let journey = self.load(key)?;
        tracing::info!(train = %key, "train initialized");
        Ok(self.install(journey, JourneyEvent::TrainInitialized))
    }

    /// Reloads the current train from the store, discarding all progress.
    pub fn reset(&self) -> Result<TrainSummary, SessionError> {
        let key = self.read(|journey| journey.key().clone())?;
        let journey = self.load(&key)?;
        tracing::info!(train = %key, "train reset");
        Ok(self.install(journey, JourneyEvent::TrainReset))
    }

    pub fn is_initialized(&self) -> bool {
        self.journey
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Runs a read-only query against the journey.
    pub fn read<T>(&self, f: impl FnOnce(&TrainJourney) -> T) -> Result<T, SessionError> {
        let guard = self.journey.read().unwrap_or_else(PoisonError::into_inner);
        let journey = guard.as_ref().ok_or(JourneyError::NotInitialized)?;
        Ok(f(journey))
    }

    /// Runs a mutation under the write lock, then publishes its events.
    ///
    /// The store is locked before the journey is released so that a later
    /// mutation cannot publish ahead of this one.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut TrainJourney) -> Result<(T, Vec<JourneyEvent>), JourneyError>,
    ) -> Result<T, SessionError> {
        let mut guard = self.journey.write().unwrap_or_else(PoisonError::into_inner);
        let journey = guard.as_mut().ok_or(JourneyError::NotInitialized)?;
        let (value, events) = f(journey)?;
        let key = journey.key().clone();
        let store = self.store();
        drop(guard);
        Self::publish(&store, &key, &events);
        Ok(value)
    }

    pub fn state(&self) -> Result<JourneySnapshot, SessionError> {
        self.read(TrainJourney::snapshot)
    }

    pub fn summary(&self) -> Result<TrainSummary, SessionError> {
        self.read(TrainJourney::summary)
    }

    pub fn stats(&self) -> Result<JourneyStats, SessionError> {
        self.read(TrainJourney::stats)
    }

    pub fn progress(&self) -> Result<Progress, SessionError> {
        self.read(TrainJourney::progress)
    }

    pub fn eligibility_matrix(&self) -> Result<EligibilityMatrix, SessionError> {
        self.read(TrainJourney::eligibility)?.map_err(SessionError::from)
    }

    /// Vacant berths at `station`, or at the current station when `None`.
    pub fn vacant_berths(&self, station: Option<usize>) -> Result<Vec<VacantBerth>, SessionError> {
        self.read(|journey| match station {
            Some(idx) => journey.vacant_berths_at(idx),
            None => Ok(journey.vacant_berths()),
        })?
        .map_err(SessionError::from)
    }

    pub fn rac_queue(&self) -> Result<Vec<RacQueueEntry>, SessionError> {
        self.read(TrainJourney::rac_queue)
    }

    pub fn passenger(&self, pnr: &Pnr) -> Result<Passenger, SessionError> {
        self.read(|journey| journey.passenger(pnr).cloned())?
            .map_err(SessionError::from)
    }

    pub fn passengers(&self, filter: PassengerFilter) -> Result<Vec<Passenger>, SessionError> {
        self.read(|journey| journey.passengers(filter))
    }

    pub fn passenger_counts(&self) -> Result<PassengerCounts, SessionError> {
        self.read(|journey| journey.manifest().counts())
    }

    pub fn segment_matrix(&self) -> Result<SegmentMatrix, SessionError> {
        self.read(TrainJourney::segment_matrix)
    }

    pub fn berth_timeline(&self, berth: &BerthId) -> Result<BerthTimeline, SessionError> {
        self.read(|journey| journey.berth_timeline(berth))?
            .map_err(SessionError::from)
    }

    pub fn start(&self) -> Result<Station, SessionError> {
        self.mutate(|journey| {
            let station = journey.start()?;
            let event = JourneyEvent::JourneyStarted {
                station: station.clone(),
            };
            Ok((station, vec![event]))
        })
    }

    pub fn advance(&self) -> Result<AdvanceOutcome, SessionError> {
        self.mutate(|journey| {
            let outcome = journey.advance()?;
            let mut events = vec![JourneyEvent::StationArrival(outcome.report.clone())];
            if let Some(summary) = &outcome.completed {
                events.push(JourneyEvent::JourneyComplete(summary.clone()));
            }
            Ok((outcome, events))
        })
    }

    pub fn mark_no_show(&self, pnr: &Pnr) -> Result<NoShowOutcome, SessionError> {
        self.mutate(|journey| {
            let outcome = journey.mark_no_show(pnr)?;
            Ok((outcome.clone(), vec![JourneyEvent::NoShowMarked(outcome)]))
        })
    }

    pub fn apply_reallocation(&self, pnr: &Pnr, berth: &BerthId) -> Result<Allocation, SessionError> {
        self.mutate(|journey| {
            let allocation = journey.apply_reallocation(pnr, berth)?;
            Ok((allocation.clone(), vec![JourneyEvent::ReallocationApplied(allocation)]))
        })
    }
}
