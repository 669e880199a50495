//! Journey events published after each state change.
//!
//! Events travel as `{"kind": "...", "payload": {...}}`. [`EventKind`] is the
//! single source of truth for the kind strings, which the event log stores in
//! its own column.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arrival::StationReport;
use crate::journey::{JourneySummary, NoShowOutcome, Station, TrainSummary};
use crate::reallocation::Allocation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JourneyEvent {
    TrainInitialized(TrainSummary),
    JourneyStarted { station: Station },
    StationArrival(StationReport),
    JourneyComplete(JourneySummary),
    NoShowMarked(NoShowOutcome),
    ReallocationApplied(Allocation),
    TrainReset(TrainSummary),
}

impl JourneyEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TrainInitialized(_) => EventKind::TrainInitialized,
            Self::JourneyStarted { .. } => EventKind::JourneyStarted,
            Self::StationArrival(_) => EventKind::StationArrival,
            Self::JourneyComplete(_) => EventKind::JourneyComplete,
            Self::NoShowMarked(_) => EventKind::NoShowMarked,
            Self::ReallocationApplied(_) => EventKind::ReallocationApplied,
            Self::TrainReset(_) => EventKind::TrainReset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TrainInitialized,
    JourneyStarted,
    StationArrival,
    JourneyComplete,
    NoShowMarked,
    ReallocationApplied,
    TrainReset,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TrainInitialized => "TRAIN_INITIALIZED",
            Self::JourneyStarted => "JOURNEY_STARTED",
            Self::StationArrival => "STATION_ARRIVAL",
            Self::JourneyComplete => "JOURNEY_COMPLETE",
            Self::NoShowMarked => "NO_SHOW_MARKED",
            Self::ReallocationApplied => "REALLOCATION_APPLIED",
            Self::TrainReset => "TRAIN_RESET",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRAIN_INITIALIZED" => Ok(Self::TrainInitialized),
            "JOURNEY_STARTED" => Ok(Self::JourneyStarted),
            "STATION_ARRIVAL" => Ok(Self::StationArrival),
            "JOURNEY_COMPLETE" => Ok(Self::JourneyComplete),
            "NO_SHOW_MARKED" => Ok(Self::NoShowMarked),
            "REALLOCATION_APPLIED" | "RAC_REALLOCATION_APPROVED" => Ok(Self::ReallocationApplied),
            "TRAIN_RESET" => Ok(Self::TrainReset),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event kind strings.
#[derive(Debug, Clone)]
pub struct UnknownEventKind(String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}
