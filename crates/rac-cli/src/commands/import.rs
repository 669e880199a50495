//! Import command for loading a train manifest document into the `SQLite` store.

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;

use rac_db::{Database, PassengerRecord, StationRecord, TrainRecord};

use super::util::parse_pnr;

/// A train, its route and optionally the bookings for one journey date.
#[derive(Debug, Deserialize)]
pub struct ManifestDocument {
    pub train: TrainRecord,
    pub stations: Vec<StationRecord>,
    #[serde(default)]
    pub journey_date: Option<NaiveDate>,
    #[serde(default)]
    pub passengers: Vec<PassengerRecord>,
}

/// What an import wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub train_no: String,
    pub stations: usize,
    pub journey_date: Option<NaiveDate>,
    pub passengers: usize,
    pub inserted: usize,
}

pub fn run(db: &mut Database, file: Option<&Path>) -> Result<ImportSummary> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read manifest from stdin")?;
            buf
        }
    };
    let document = parse_document(&input)?;
    import(db, &document)
}

pub fn parse_document(input: &str) -> Result<ManifestDocument> {
    let document: ManifestDocument = serde_json::from_str(input).context("invalid manifest JSON")?;
    if document.journey_date.is_none() && !document.passengers.is_empty() {
        bail!("manifest lists passengers but no journey_date");
    }
    for record in &document.passengers {
        parse_pnr(&record.pnr).with_context(|| format!("invalid booking for {}", record.name))?;
    }
    Ok(document)
}

pub fn import(db: &mut Database, document: &ManifestDocument) -> Result<ImportSummary> {
    db.upsert_train(&document.train, &document.stations)
        .with_context(|| format!("failed to store train {}", document.train.train_no))?;

    let inserted = match document.journey_date {
        Some(date) => db
            .insert_passengers(&document.train.train_no, date, &document.passengers)
            .with_context(|| format!("failed to store bookings for {date}"))?,
        None => 0,
    };
    tracing::info!(
        train = %document.train.train_no,
        passengers = document.passengers.len(),
        inserted,
        "manifest imported"
    );

    Ok(ImportSummary {
        train_no: document.train.train_no.clone(),
        stations: document.stations.len(),
        journey_date: document.journey_date,
        passengers: document.passengers.len(),
        inserted,
    })
}
