//! Simulate command: run a journey from origin to destination in one go.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use rac_core::{
    EventSink, JourneySession, JourneySummary, NoShowOutcome, Pnr, StationReport, TrainKey, TrainLoader,
    TrainSummary,
};

use super::render;

#[derive(Debug, Serialize)]
pub struct Simulation {
    pub train: TrainSummary,
    pub no_shows: Vec<NoShowOutcome>,
    pub stations: Vec<StationReport>,
    pub summary: JourneySummary,
}

/// Marks the given passengers as no-shows at the origin, then advances
/// station by station until the train reaches its destination.
pub fn simulate<S: TrainLoader + EventSink>(
    session: &JourneySession<S>,
    key: &TrainKey,
    no_shows: &[Pnr],
) -> Result<Simulation> {
    let train = session
        .initialize(key)
        .with_context(|| format!("failed to load train {key}"))?;

    let no_shows = no_shows
        .iter()
        .map(|pnr| {
            session
                .mark_no_show(pnr)
                .with_context(|| format!("failed to mark {pnr} as no-show"))
        })
        .collect::<Result<Vec<_>>>()?;

    session.start()?;
    let mut stations = Vec::new();
    let summary = loop {
        let outcome = session.advance()?;
        stations.push(outcome.report);
        if let Some(summary) = outcome.completed {
            break summary;
        }
    };

    Ok(Simulation {
        train,
        no_shows,
        stations,
        summary,
    })
}

pub fn run<W: Write, S: TrainLoader + EventSink>(
    writer: &mut W,
    session: &JourneySession<S>,
    key: &TrainKey,
    no_shows: &[Pnr],
    json: bool,
) -> Result<()> {
    let simulation = simulate(session, key, no_shows)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&simulation)?)?;
        return Ok(());
    }

    let stations = session.read(|journey| journey.stations().to_vec())?;
    render::train_summary(writer, &simulation.train)?;
    for outcome in &simulation.no_shows {
        render::no_show(writer, &stations, outcome)?;
    }
    for report in &simulation.stations {
        writeln!(writer)?;
        render::station_report(writer, &stations, report)?;
    }
    writeln!(writer)?;
    render::journey_summary(writer, &simulation.summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use rac_db::{Database, PassengerRecord, StationRecord, TrainRecord};

    fn key() -> TrainKey {
        TrainKey::new("12951", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
    }

    fn booking(pnr: &str, from: &str, to: &str, status: &str) -> PassengerRecord {
        PassengerRecord {
            pnr: pnr.to_string(),
            name: format!("Passenger {pnr}"),
            age: 30,
            gender: "M".to_string(),
            from_station: from.to_string(),
            to_station: to.to_string(),
            pnr_status: status.to_string(),
            coach: None,
            berth: None,
            rac_priority: None,
            absent: false,
        }
    }

    fn session() -> JourneySession<Database> {
        let mut db = Database::open_in_memory().unwrap();
        let stations: Vec<StationRecord> = [("NDLS", "New Delhi"), ("KOTA", "Kota"), ("BCT", "Mumbai Central")]
            .into_iter()
            .map(|(code, name)| StationRecord {
                code: code.to_string(),
                name: name.to_string(),
            })
            .collect();
        db.upsert_train(
            &TrainRecord {
                train_no: "12951".to_string(),
                train_name: "Rajdhani".to_string(),
                sleeper_coaches: 1,
                three_ac_coaches: 0,
            },
            &stations,
        )
        .unwrap();

        let mut full = booking("P1", "NDLS", "BCT", "CNF");
        full.coach = Some("S1".to_string());
        full.berth = Some(1);
        let mut rac = booking("R1", "NDLS", "BCT", "RAC");
        rac.rac_priority = Some(1);
        db.insert_passengers("12951", key().journey_date, &[full, rac]).unwrap();
        JourneySession::new(db)
    }

    #[test]
    fn simulate_runs_to_destination() {
        let session = session();
        let simulation = simulate(&session, &key(), &[]).unwrap();

        assert_eq!(simulation.stations.len(), 2);
        assert_eq!(simulation.summary.final_station.code, "BCT");
        assert_eq!(simulation.summary.deboarded_at_destination, 2);
        // The coach has 71 free berths, so R1 is seated at the origin.
        assert_eq!(simulation.summary.total_rac_upgraded, 1);
    }

    #[test]
    fn simulate_applies_no_shows_before_departure() {
        let session = session();
        let p1 = Pnr::new("P1").unwrap();
        let simulation = simulate(&session, &key(), &[p1.clone()]).unwrap();

        assert_eq!(simulation.no_shows.len(), 1);
        assert_eq!(simulation.no_shows[0].pnr, p1);
        assert_eq!(simulation.summary.total_no_shows, 1);
        assert_eq!(simulation.summary.deboarded_at_destination, 1);
    }

    #[test]
    fn simulate_logs_events_in_order() {
        let session = session();
        simulate(&session, &key(), &[]).unwrap();
        let kinds: Vec<String> = session
            .with_store(|db| db.list_events(Some(&key())))
            .unwrap()
            .into_iter()
            .map(|event| event.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                "TRAIN_INITIALIZED",
                "JOURNEY_STARTED",
                "STATION_ARRIVAL",
                "STATION_ARRIVAL",
                "JOURNEY_COMPLETE"
            ]
        );
    }

    #[test]
    fn unknown_train_reports_key() {
        let session = session();
        let missing = TrainKey::new("99999", key().journey_date);
        let err = simulate(&session, &missing, &[]).unwrap_err();
        assert!(format!("{err:#}").contains("99999"));
    }

    #[test]
    fn text_output_ends_with_summary() {
        let session = session();
        let mut out = Vec::new();
        run(&mut out, &session, &key(), &[], false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Train 12951 Rajdhani on 2025-01-15: 3 stations, 2 passengers (1 RAC)\n"));
        assert!(text.contains("== Kota (KOTA) =="));
        assert!(text.trim_end().ends_with("RAC upgraded 1"));
    }
}
