//! Events command for querying the journey event log.
//!
//! This module outputs logged events from the local database as JSONL.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use rac_core::TrainKey;
use rac_db::Database;

/// Runs the events command, writing one JSON object per line.
pub fn run<W: Write>(writer: &mut W, db: &Database, train: Option<&str>, date: Option<NaiveDate>) -> Result<()> {
    let key = train.zip(date).map(|(train_no, date)| TrainKey::new(train_no, date));
    let events = db.list_events(key.as_ref())?;

    for event in events
        .iter()
        .filter(|event| train.is_none_or(|train_no| event.train_no == train_no))
    {
        let json = serde_json::to_string(event)?;
        writeln!(writer, "{json}")?;
    }

    Ok(())
}
