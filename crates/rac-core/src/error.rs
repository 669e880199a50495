//! Errors reported by journey operations.

use thiserror::Error;

use crate::types::{BerthId, Pnr};

/// Failure of a journey operation.
///
/// Every variant carries enough context for a caller to retry or to explain the
/// failure to a user. The core never retries on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JourneyError {
    /// No train has been loaded into the session.
    #[error("train not initialized")]
    NotInitialized,

    #[error("journey already started")]
    AlreadyStarted,

    #[error("journey not started")]
    NotStarted,

    /// The train is at its terminal station.
    #[error("train has reached final destination {station}")]
    JourneyComplete { station: String },

    #[error("passenger {0} not found")]
    PassengerNotFound(Pnr),

    #[error("berth {0} not found")]
    BerthNotFound(BerthId),

    /// A segment in the requested range is held by another passenger.
    #[error("berth {berth} segment {segment} is already held by {holder}")]
    Conflict {
        berth: BerthId,
        segment: usize,
        holder: Pnr,
    },

    /// `from >= to`, or the range runs past the last segment.
    #[error("invalid travel window [{from}, {to}) for a route of {segments} segments")]
    InvalidWindow {
        from: usize,
        to: usize,
        segments: usize,
    },

    /// The passenger's current status does not allow the operation.
    #[error("passenger {pnr} cannot be {action}: {reason}")]
    Ineligible {
        pnr: Pnr,
        action: &'static str,
        reason: &'static str,
    },

    #[error("passenger {0} appears more than once in the manifest")]
    DuplicatePassenger(Pnr),

    #[error("a journey needs at least two stations, got {0}")]
    TooFewStations(usize),
}

impl JourneyError {
    /// True when the error is a lost race on a berth range.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
