//! Core domain logic for RAC berth reallocation on a train journey.
//!
//! This crate contains:
//! - Occupancy: per-berth, per-segment booking state
//! - Manifest: passengers and the RAC queue
//! - Reallocation: eligibility, manual commits and automatic upgrades
//! - Journey: the station-by-station state machine and its views
//! - Session: locking, loading and event publication around a journey

mod arrival;
mod error;
pub mod event;
pub mod journey;
pub mod manifest;
pub mod occupancy;
pub mod reallocation;
pub mod session;
pub mod stats;
pub mod types;
pub mod views;

#[cfg(test)]
mod test_support;

pub use arrival::StationReport;
pub use error::JourneyError;
pub use event::{EventKind, JourneyEvent, UnknownEventKind};
pub use journey::{
    AdvanceOutcome, JourneyPhase, JourneySnapshot, JourneyState, JourneySummary, NoShowOutcome, Station,
    TrainJourney, TrainKey, TrainManifest, TrainSummary,
};
pub use manifest::{Manifest, Passenger, PassengerCounts, PassengerFilter, PassengerStatus};
pub use occupancy::{Coach, OccupancyStore, Slot, TravelWindow};
pub use reallocation::{Allocation, EligibilityEntry, EligibilityMatrix};
pub use session::{EventSink, JourneySession, LoadError, SessionError, SinkError, TrainLoader};
pub use stats::{JourneyStats, Progress};
pub use types::{BerthId, BerthType, CoachClass, CoachNo, Gender, Pnr, ValidationError};
pub use views::{BerthTimeline, RacQueueEntry, SegmentMatrix, VacantBerth};
