//! Passenger manifest and its derived views.
//!
//! The manifest keeps passengers in registration order. Nothing derived from
//! it is cached: the RAC queue and the per-station views are recomputed on
//! every call so they can never go stale after an upgrade or a no-show.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JourneyError;
use crate::occupancy::TravelWindow;
use crate::types::{BerthId, Gender, Pnr};

/// Booking status of a passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerStatus {
    /// Holds `berth` for the whole travel window.
    Confirmed {
        berth: BerthId,
        /// Whether the berth came from a RAC upgrade.
        #[serde(default)]
        upgraded: bool,
    },
    /// Waiting for a berth; lower priority numbers are served first.
    Rac { priority: u32 },
    /// Did not board at the origin station.
    NoShow {
        /// Berth the passenger held before being marked, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        released: Option<BerthId>,
    },
}

impl PassengerStatus {
    /// Short code used in listings (`CNF`, `RAC`, `NO_SHOW`).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "CNF",
            Self::Rac { .. } => "RAC",
            Self::NoShow { .. } => "NO_SHOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub pnr: Pnr,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub window: TravelWindow,
    #[serde(flatten)]
    pub status: PassengerStatus,
    /// Set when the passenger boards at their origin station.
    #[serde(default)]
    pub boarded: bool,
    /// Set when a boarded passenger leaves the train at their destination.
    #[serde(default)]
    pub deboarded: bool,
    /// Check-in marker: the passenger did not present at the origin station.
    #[serde(default)]
    pub absent: bool,
}

impl Passenger {
    pub fn confirmed(pnr: Pnr, name: impl Into<String>, window: TravelWindow, berth: BerthId) -> Self {
        Self::with_status(
            pnr,
            name,
            window,
            PassengerStatus::Confirmed {
                berth,
                upgraded: false,
            },
        )
    }

    pub fn rac(pnr: Pnr, name: impl Into<String>, window: TravelWindow, priority: u32) -> Self {
        Self::with_status(pnr, name, window, PassengerStatus::Rac { priority })
    }

    fn with_status(pnr: Pnr, name: impl Into<String>, window: TravelWindow, status: PassengerStatus) -> Self {
        Self {
            pnr,
            name: name.into(),
            age: 0,
            gender: Gender::Other,
            window,
            status,
            boarded: false,
            deboarded: false,
            absent: false,
        }
    }

    /// Berth held by a confirmed passenger.
    pub const fn berth(&self) -> Option<&BerthId> {
        match &self.status {
            PassengerStatus::Confirmed { berth, .. } => Some(berth),
            _ => None,
        }
    }

    pub const fn rac_priority(&self) -> Option<u32> {
        match self.status {
            PassengerStatus::Rac { priority } => Some(priority),
            _ => None,
        }
    }

    pub const fn is_confirmed(&self) -> bool {
        matches!(self.status, PassengerStatus::Confirmed { .. })
    }

    pub const fn is_rac(&self) -> bool {
        matches!(self.status, PassengerStatus::Rac { .. })
    }

    pub const fn is_no_show(&self) -> bool {
        matches!(self.status, PassengerStatus::NoShow { .. })
    }

    pub const fn is_upgraded(&self) -> bool {
        matches!(self.status, PassengerStatus::Confirmed { upgraded: true, .. })
    }

    /// On the train right now.
    pub const fn is_onboard(&self) -> bool {
        self.boarded && !self.deboarded
    }
}

/// Filter for passenger listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerFilter {
    #[default]
    All,
    Confirmed,
    Rac,
    NoShow,
    Onboard,
}

impl PassengerFilter {
    pub const fn matches(self, passenger: &Passenger) -> bool {
        match self {
            Self::All => true,
            Self::Confirmed => passenger.is_confirmed(),
            Self::Rac => passenger.is_rac(),
            Self::NoShow => passenger.is_no_show(),
            Self::Onboard => passenger.is_onboard(),
        }
    }
}

impl fmt::Display for PassengerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Confirmed => "cnf",
            Self::Rac => "rac",
            Self::NoShow => "no-show",
            Self::Onboard => "onboard",
        };
        write!(f, "{s}")
    }
}

/// Error type for unknown passenger filter strings.
#[derive(Debug, Clone)]
pub struct UnknownPassengerFilter(String);

impl fmt::Display for UnknownPassengerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown passenger filter: {}", self.0)
    }
}

impl std::error::Error for UnknownPassengerFilter {}

impl FromStr for PassengerFilter {
    type Err = UnknownPassengerFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "cnf" | "confirmed" => Ok(Self::Confirmed),
            "rac" => Ok(Self::Rac),
            "no-show" | "no_show" | "noshow" => Ok(Self::NoShow),
            "onboard" => Ok(Self::Onboard),
            _ => Err(UnknownPassengerFilter(s.to_string())),
        }
    }
}

/// Passenger counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerCounts {
    pub total: usize,
    pub confirmed: usize,
    pub rac: usize,
    pub no_show: usize,
    pub onboard: usize,
}

/// Passengers indexed by PNR, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Passenger>", into = "Vec<Passenger>")]
pub struct Manifest {
    passengers: Vec<Passenger>,
    index: HashMap<Pnr, usize>,
}

impl Manifest {
    /// Builds the index; fails on duplicate PNRs.
    pub fn new(passengers: Vec<Passenger>) -> Result<Self, JourneyError> {
        let mut index = HashMap::with_capacity(passengers.len());
        for (position, passenger) in passengers.iter().enumerate() {
            if index.insert(passenger.pnr.clone(), position).is_some() {
                return Err(JourneyError::DuplicatePassenger(passenger.pnr.clone()));
            }
        }
        Ok(Self { passengers, index })
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    /// Passengers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Passenger> + '_ {
        self.passengers.iter()
    }

    pub fn by_id(&self, pnr: &Pnr) -> Result<&Passenger, JourneyError> {
        self.index
            .get(pnr)
            .map(|&position| &self.passengers[position])
            .ok_or_else(|| JourneyError::PassengerNotFound(pnr.clone()))
    }

    pub(crate) fn by_id_mut(&mut self, pnr: &Pnr) -> Result<&mut Passenger, JourneyError> {
        match self.index.get(pnr) {
            Some(&position) => Ok(&mut self.passengers[position]),
            None => Err(JourneyError::PassengerNotFound(pnr.clone())),
        }
    }

    /// RAC passengers by ascending priority, ties in registration order.
    pub fn rac_queue(&self) -> Vec<&Passenger> {
        let mut queue: Vec<(u32, &Passenger)> = self
            .passengers
            .iter()
            .filter_map(|p| p.rac_priority().map(|priority| (priority, p)))
            .collect();
        // Stable sort keeps registration order within a priority.
        queue.sort_by_key(|(priority, _)| *priority);
        queue.into_iter().map(|(_, p)| p).collect()
    }

    pub fn boarding_at(&self, station: usize) -> impl Iterator<Item = &Passenger> + '_ {
        self.passengers.iter().filter(move |p| p.window.from == station)
    }

    pub fn alighting_at(&self, station: usize) -> impl Iterator<Item = &Passenger> + '_ {
        self.passengers.iter().filter(move |p| p.window.to == station)
    }

    pub fn with_filter(&self, filter: PassengerFilter) -> impl Iterator<Item = &Passenger> + '_ {
        self.passengers.iter().filter(move |p| filter.matches(p))
    }

    pub fn counts(&self) -> PassengerCounts {
        self.passengers
            .iter()
            .fold(PassengerCounts::default(), |mut counts, p| {
                counts.total += 1;
                match p.status {
                    PassengerStatus::Confirmed { .. } => counts.confirmed += 1,
                    PassengerStatus::Rac { .. } => counts.rac += 1,
                    PassengerStatus::NoShow { .. } => counts.no_show += 1,
                }
                if p.is_onboard() {
                    counts.onboard += 1;
                }
                counts
            })
    }
}

impl TryFrom<Vec<Passenger>> for Manifest {
    type Error = JourneyError;

    fn try_from(passengers: Vec<Passenger>) -> Result<Self, Self::Error> {
        Self::new(passengers)
    }
}

impl From<Manifest> for Vec<Passenger> {
    fn from(manifest: Manifest) -> Self {
        manifest.passengers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pnr(s: &str) -> Pnr {
        Pnr::new(s).unwrap()
    }

    fn rac(id: &str, from: usize, to: usize, priority: u32) -> Passenger {
        Passenger::rac(pnr(id), id, TravelWindow::new(from, to), priority)
    }

    fn cnf(id: &str, from: usize, to: usize, berth: &str) -> Passenger {
        Passenger::confirmed(pnr(id), id, TravelWindow::new(from, to), berth.parse().unwrap())
    }

    #[test]
    fn by_id_finds_passenger_or_reports_not_found() {
        let manifest = Manifest::new(vec![cnf("P1", 0, 2, "S1-1")]).unwrap();
        assert_eq!(manifest.by_id(&pnr("P1")).unwrap().name, "P1");
        assert_eq!(
            manifest.by_id(&pnr("P9")).unwrap_err(),
            JourneyError::PassengerNotFound(pnr("P9"))
        );
    }

    #[test]
    fn duplicate_pnr_is_rejected() {
        let err = Manifest::new(vec![cnf("P1", 0, 2, "S1-1"), rac("P1", 0, 1, 1)]).unwrap_err();
        assert_eq!(err, JourneyError::DuplicatePassenger(pnr("P1")));
    }

    #[test]
    fn rac_queue_orders_by_priority_then_registration() {
        let manifest = Manifest::new(vec![
            rac("R3", 0, 2, 3),
            cnf("C1", 0, 2, "S1-1"),
            rac("R1a", 1, 2, 1),
            rac("R2", 0, 1, 2),
            rac("R1b", 0, 2, 1),
        ])
        .unwrap();

        let order: Vec<&str> = manifest.rac_queue().iter().map(|p| p.pnr.as_str()).collect();
        assert_eq!(order, vec!["R1a", "R1b", "R2", "R3"]);
    }

    #[test]
    fn rac_queue_reflects_status_changes() {
        let mut manifest = Manifest::new(vec![rac("R1", 0, 2, 1), rac("R2", 0, 2, 2)]).unwrap();
        manifest.by_id_mut(&pnr("R1")).unwrap().status = PassengerStatus::Confirmed {
            berth: "S1-1".parse().unwrap(),
            upgraded: true,
        };

        let order: Vec<&str> = manifest.rac_queue().iter().map(|p| p.pnr.as_str()).collect();
        assert_eq!(order, vec!["R2"]);
    }

    #[test]
    fn boarding_and_alighting_views() {
        let manifest = Manifest::new(vec![
            cnf("A", 0, 2, "S1-1"),
            cnf("B", 1, 3, "S1-2"),
            rac("C", 0, 3, 1),
        ])
        .unwrap();

        let boarding: Vec<&str> = manifest.boarding_at(0).map(|p| p.pnr.as_str()).collect();
        assert_eq!(boarding, vec!["A", "C"]);
        let alighting: Vec<&str> = manifest.alighting_at(3).map(|p| p.pnr.as_str()).collect();
        assert_eq!(alighting, vec!["B", "C"]);
    }

    #[test]
    fn counts_by_status() {
        let mut manifest = Manifest::new(vec![
            cnf("A", 0, 2, "S1-1"),
            cnf("B", 1, 3, "S1-2"),
            rac("C", 0, 3, 1),
        ])
        .unwrap();
        manifest.by_id_mut(&pnr("A")).unwrap().boarded = true;
        manifest.by_id_mut(&pnr("B")).unwrap().status = PassengerStatus::NoShow { released: None };

        assert_eq!(
            manifest.counts(),
            PassengerCounts {
                total: 3,
                confirmed: 1,
                rac: 1,
                no_show: 1,
                onboard: 1,
            }
        );
    }

    #[test]
    fn passenger_filter_parses() {
        assert_eq!("CNF".parse::<PassengerFilter>().unwrap(), PassengerFilter::Confirmed);
        assert_eq!("no-show".parse::<PassengerFilter>().unwrap(), PassengerFilter::NoShow);
        assert!("waitlist".parse::<PassengerFilter>().is_err());
    }

    #[test]
    fn passenger_serializes_status_inline() {
        let passenger = rac("R1", 1, 3, 2);
        let json = serde_json::to_value(&passenger).unwrap();
        assert_eq!(json["status"], "RAC");
        assert_eq!(json["priority"], 2);
        assert_eq!(json["window"]["from"], 1);

        let parsed: Passenger = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, passenger);
    }
}
