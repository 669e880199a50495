//! Trains command: list stored trains and their booked journey dates.

use std::io::Write;

use anyhow::Result;

use rac_db::{Database, TrainListing};

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let trains = db.list_trains()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&trains)?)?;
    } else {
        write_text(writer, &trains)?;
    }
    Ok(())
}

fn write_text<W: Write>(writer: &mut W, trains: &[TrainListing]) -> Result<()> {
    if trains.is_empty() {
        writeln!(writer, "No trains imported. Run `rac import --file <manifest.json>` first.")?;
        return Ok(());
    }
    for train in trains {
        writeln!(
            writer,
            "{} {} ({} stations, {} SL + {} 3A coaches)",
            train.train_no, train.train_name, train.stations, train.sleeper_coaches, train.three_ac_coaches
        )?;
        if train.journeys.is_empty() {
            writeln!(writer, "  no bookings")?;
        }
        for journey in &train.journeys {
            writeln!(writer, "  {}: {} passengers", journey.journey_date, journey.passengers)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use rac_db::{PassengerRecord, StationRecord, TrainRecord};

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_train(
            &TrainRecord {
                train_no: "12951".to_string(),
                train_name: "Rajdhani".to_string(),
                sleeper_coaches: 2,
                three_ac_coaches: 1,
            },
            &[
                StationRecord {
                    code: "NDLS".to_string(),
                    name: "New Delhi".to_string(),
                },
                StationRecord {
                    code: "BCT".to_string(),
                    name: "Mumbai Central".to_string(),
                },
            ],
        )
        .unwrap();
        db.insert_passengers(
            "12951",
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            &[PassengerRecord {
                pnr: "R1".to_string(),
                name: "Meena".to_string(),
                age: 41,
                gender: "F".to_string(),
                from_station: "NDLS".to_string(),
                to_station: "BCT".to_string(),
                pnr_status: "RAC".to_string(),
                coach: None,
                berth: None,
                rac_priority: Some(1),
                absent: false,
            }],
        )
        .unwrap();
        db
    }

    #[test]
    fn text_listing_shows_journeys() {
        let db = seeded();
        let mut out = Vec::new();
        run(&mut out, &db, false).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        12951 Rajdhani (2 stations, 2 SL + 1 3A coaches)
          2025-01-15: 1 passengers
        ");
    }

    #[test]
    fn empty_store_points_at_import() {
        let db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        run(&mut out, &db, false).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("rac import"));
    }

    #[test]
    fn json_listing_round_trips_fields() {
        let db = seeded();
        let mut out = Vec::new();
        run(&mut out, &db, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["train_no"], "12951");
        assert_eq!(value[0]["journeys"][0]["passengers"], 1);
    }
}
