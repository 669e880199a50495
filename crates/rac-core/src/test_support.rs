//! Builders shared by unit tests.

use chrono::NaiveDate;

use crate::journey::{Station, TrainJourney, TrainKey, TrainManifest};
use crate::manifest::Passenger;
use crate::occupancy::{Coach, TravelWindow};
use crate::types::{BerthId, CoachClass, CoachNo, Pnr};

pub fn pnr(s: &str) -> Pnr {
    Pnr::new(s).unwrap()
}

pub fn berth(s: &str) -> BerthId {
    s.parse().unwrap()
}

pub fn cnf(id: &str, from: usize, to: usize, berth_id: &str) -> Passenger {
    Passenger::confirmed(pnr(id), format!("Passenger {id}"), TravelWindow::new(from, to), berth(berth_id))
}

pub fn rac(id: &str, from: usize, to: usize, priority: u32) -> Passenger {
    Passenger::rac(pnr(id), format!("Passenger {id}"), TravelWindow::new(from, to), priority)
}

pub fn key() -> TrainKey {
    TrainKey::new("12951", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
}

/// Route of `codes` with a single sleeper coach `S1` of `berths` berths.
pub fn train_manifest(codes: &[&str], berths: u16, passengers: Vec<Passenger>) -> TrainManifest {
    let stations = codes
        .iter()
        .enumerate()
        .map(|(idx, code)| Station::new(idx, *code, format!("Station {code}")))
        .collect();
    let segments = codes.len().saturating_sub(1);
    TrainManifest {
        key: key(),
        train_name: "Test Express".to_string(),
        stations,
        coaches: vec![Coach::with_berths(
            CoachNo::new("S1").unwrap(),
            CoachClass::Sleeper,
            berths,
            segments,
        )],
        passengers,
    }
}

pub fn journey(codes: &[&str], berths: u16, passengers: Vec<Passenger>) -> TrainJourney {
    TrainJourney::from_manifest(train_manifest(codes, berths, passengers)).unwrap()
}
