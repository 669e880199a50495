//! Storage layer for the RAC journey simulator.
//!
//! Persists train manifests and the journey event log using `rusqlite`, and
//! plugs both into the core as its [`TrainLoader`] and [`EventSink`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. A `JourneySession` keeps its store behind a `Mutex`, which is enough
//! to share one `Database` across threads.
//!
//! # Schema
//!
//! - `trains`: one row per train with its coach counts. Coaches are rebuilt
//!   from the standard layout on load (`S1..Sn` sleeper, `B1..Bm` 3A).
//! - `stations`: the route, ordered by `idx`.
//! - `passengers`: bookings per train and journey date. Stations are stored
//!   by code; `seq` keeps registration order for RAC tie-breaking.
//! - `journey_events`: append-only log of published events, numbered per
//!   train run.
//!
//! Dates are stored as `YYYY-MM-DD` text and timestamps as RFC 3339 UTC.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, SecondsFormat, Utc};
use rac_core::{
    BerthId, Coach, CoachClass, CoachNo, EventSink, Gender, JourneyEvent, LoadError, Passenger, Pnr, SinkError,
    Station, TrainJourney, TrainKey, TrainLoader, TrainManifest, TravelWindow,
};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid event payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("train {0} not found")]
    TrainNotFound(String),
    #[error("no passengers booked on train {train_no} for {journey_date}")]
    ManifestNotFound {
        train_no: String,
        journey_date: NaiveDate,
    },
    /// A stored or imported row does not describe a valid booking.
    #[error("invalid record {context}: {message}")]
    InvalidRecord { context: String, message: String },
}

impl DbError {
    fn invalid(context: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidRecord {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRecord {
    pub train_no: String,
    pub train_name: String,
    #[serde(default)]
    pub sleeper_coaches: u16,
    #[serde(default)]
    pub three_ac_coaches: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    pub code: String,
    pub name: String,
}

/// A booking as imported: stations by code, status as `CNF` or `RAC`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub pnr: String,
    pub name: String,
    #[serde(default)]
    pub age: u8,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(rename = "from")]
    pub from_station: String,
    #[serde(rename = "to")]
    pub to_station: String,
    #[serde(rename = "status")]
    pub pnr_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berth: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rac_priority: Option<u32>,
    /// Did not present at the origin station.
    #[serde(default)]
    pub absent: bool,
}

fn default_gender() -> String {
    Gender::Other.code().to_string()
}

/// A train with the journey dates it has bookings for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainListing {
    pub train_no: String,
    pub train_name: String,
    pub sleeper_coaches: u16,
    pub three_ac_coaches: u16,
    pub stations: usize,
    pub journeys: Vec<JourneyListing>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyListing {
    pub journey_date: NaiveDate,
    pub passengers: usize,
}

/// A logged journey event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyEventRecord {
    pub id: String,
    pub train_no: String,
    pub journey_date: NaiveDate,
    pub seq: i64,
    pub kind: String,
    pub payload: serde_json::Value,
    pub recorded_at: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS trains (
                train_no TEXT PRIMARY KEY,
                train_name TEXT NOT NULL,
                sleeper_coaches INTEGER NOT NULL DEFAULT 0,
                three_ac_coaches INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stations (
                train_no TEXT NOT NULL,
                idx INTEGER NOT NULL,
                code TEXT NOT NULL,
                name TEXT NOT NULL,
                PRIMARY KEY (train_no, idx),
                FOREIGN KEY (train_no) REFERENCES trains(train_no) ON DELETE CASCADE
            );

            -- from_station / to_station: station codes
            -- pnr_status: 'CNF' or 'RAC'
            CREATE TABLE IF NOT EXISTS passengers (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                train_no TEXT NOT NULL,
                journey_date TEXT NOT NULL,
                pnr TEXT NOT NULL,
                name TEXT NOT NULL,
                age INTEGER NOT NULL DEFAULT 0,
                gender TEXT NOT NULL DEFAULT 'O',
                from_station TEXT NOT NULL,
                to_station TEXT NOT NULL,
                pnr_status TEXT NOT NULL,
                coach_no TEXT,
                berth_no INTEGER,
                rac_priority INTEGER,
                absent INTEGER NOT NULL DEFAULT 0,
                UNIQUE (train_no, journey_date, pnr),
                FOREIGN KEY (train_no) REFERENCES trains(train_no) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_passengers_journey ON passengers(train_no, journey_date);

            -- payload: JSON body of the event, kind: e.g. 'STATION_ARRIVAL'
            CREATE TABLE IF NOT EXISTS journey_events (
                id TEXT PRIMARY KEY,
                train_no TEXT NOT NULL,
                journey_date TEXT NOT NULL,
                seq INTEGER NOT NULL,
                kind TEXT NOT NULL,
                payload TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                UNIQUE (train_no, journey_date, seq)
            );

            CREATE INDEX IF NOT EXISTS idx_journey_events_kind ON journey_events(kind);
            ",
        )?;
        Ok(())
    }

    /// Inserts or replaces a train and its route.
    ///
    /// Bookings already stored for the train must still fit the new route
    /// and coaches, otherwise nothing is changed.
    pub fn upsert_train(&mut self, train: &TrainRecord, stations: &[StationRecord]) -> Result<(), DbError> {
        if stations.len() < 2 {
            return Err(DbError::invalid(
                format!("train {}", train.train_no),
                "a route needs at least two stations",
            ));
        }
        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO trains (train_no, train_name, sleeper_coaches, three_ac_coaches, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(train_no) DO UPDATE SET
                train_name = excluded.train_name,
                sleeper_coaches = excluded.sleeper_coaches,
                three_ac_coaches = excluded.three_ac_coaches,
                updated_at = excluded.updated_at
            ",
            params![
                train.train_no,
                train.train_name,
                train.sleeper_coaches,
                train.three_ac_coaches,
                now_timestamp(),
            ],
        )?;
        tx.execute("DELETE FROM stations WHERE train_no = ?", [&train.train_no])?;
        {
            let mut stmt = tx.prepare("INSERT INTO stations (train_no, idx, code, name) VALUES (?, ?, ?, ?)")?;
            for (idx, station) in stations.iter().enumerate() {
                stmt.execute(params![train.train_no, idx, station.code, station.name])?;
            }
        }
        for journey_date in booked_dates(&tx, &train.train_no)? {
            check_bookings(&tx, &TrainKey::new(train.train_no.as_str(), journey_date))?;
        }
        tx.commit()?;
        tracing::debug!(train = %train.train_no, stations = stations.len(), "train stored");
        Ok(())
    }

    /// Inserts bookings for one train run, ignoring PNRs already present.
    ///
    /// The run is checked as a whole before committing: every berth must
    /// exist on the train and no two confirmed bookings may share a berth on
    /// the same segment. Returns the number of rows inserted.
    pub fn insert_passengers(
        &mut self,
        train_no: &str,
        journey_date: NaiveDate,
        passengers: &[PassengerRecord],
    ) -> Result<usize, DbError> {
        let codes = self.station_codes(train_no)?;
        for record in passengers {
            validate_record(record, &codes)?;
        }
        if passengers.is_empty() {
            return Ok(0);
        }

        let date = journey_date.to_string();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO passengers
                (train_no, journey_date, pnr, name, age, gender, from_station, to_station,
                 pnr_status, coach_no, berth_no, rac_priority, absent)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for record in passengers {
                inserted += stmt.execute(params![
                    train_no,
                    date,
                    record.pnr.trim(),
                    record.name,
                    record.age,
                    record.gender,
                    record.from_station,
                    record.to_station,
                    record.pnr_status.to_ascii_uppercase(),
                    record.coach,
                    record.berth,
                    record.rac_priority,
                    record.absent,
                ])?;
            }
        }
        check_bookings(&tx, &TrainKey::new(train_no, journey_date))?;
        tx.commit()?;
        tracing::debug!(train = %train_no, %journey_date, inserted, "passengers stored");
        Ok(inserted)
    }

    /// Station code to route index; fails if the train is unknown.
    fn station_codes(&self, train_no: &str) -> Result<HashMap<String, usize>, DbError> {
        read_train(&self.conn, train_no)?;
        Ok(read_stations(&self.conn, train_no)?
            .into_iter()
            .enumerate()
            .map(|(idx, station)| (station.code, idx))
            .collect())
    }

    /// Lists trains ordered by number, with their booked journey dates.
    pub fn list_trains(&self) -> Result<Vec<TrainListing>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT t.train_no, t.train_name, t.sleeper_coaches, t.three_ac_coaches,
                   (SELECT COUNT(*) FROM stations s WHERE s.train_no = t.train_no)
            FROM trains t
            ORDER BY t.train_no ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TrainListing {
                train_no: row.get(0)?,
                train_name: row.get(1)?,
                sleeper_coaches: row.get(2)?,
                three_ac_coaches: row.get(3)?,
                stations: row.get(4)?,
                journeys: Vec::new(),
            })
        })?;
        let mut trains = Vec::new();
        for row in rows {
            trains.push(row?);
        }
        for train in &mut trains {
            train.journeys = self.journeys(&train.train_no)?;
        }
        Ok(trains)
    }

    fn journeys(&self, train_no: &str) -> Result<Vec<JourneyListing>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT journey_date, COUNT(*)
            FROM passengers
            WHERE train_no = ?
            GROUP BY journey_date
            ORDER BY journey_date ASC
            ",
        )?;
        let rows = stmt.query_map([train_no], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
        })?;
        let mut journeys = Vec::new();
        for row in rows {
            let (date, passengers) = row?;
            journeys.push(JourneyListing {
                journey_date: parse_date(&date, train_no)?,
                passengers,
            });
        }
        Ok(journeys)
    }

    /// Builds the manifest for one train run.
    pub fn load_manifest(&self, key: &TrainKey) -> Result<TrainManifest, DbError> {
        read_manifest(&self.conn, key)
    }

    /// Appends an event to the log of a train run.
    ///
    /// Sequence numbers start at 1 per run; ids are derived from train, date
    /// and sequence so the same log always gets the same ids.
    pub fn append_event(&self, key: &TrainKey, event: &JourneyEvent) -> Result<JourneyEventRecord, DbError> {
        let date = key.journey_date.to_string();
        let seq: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM journey_events WHERE train_no = ? AND journey_date = ?",
            params![key.train_no, date],
            |row| row.get(0),
        )?;
        let id = deterministic_event_id(key, seq);
        let kind = event.kind().to_string();
        let mut payload = serde_json::to_value(event)?;
        let payload = payload
            .get_mut("payload")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);
        let recorded_at = now_timestamp();

        self.conn.execute(
            "
            INSERT INTO journey_events (id, train_no, journey_date, seq, kind, payload, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
            params![id, key.train_no, date, seq, kind, payload.to_string(), recorded_at],
        )?;
        Ok(JourneyEventRecord {
            id,
            train_no: key.train_no.clone(),
            journey_date: key.journey_date,
            seq,
            kind,
            payload,
            recorded_at,
        })
    }

    /// Lists logged events, optionally for a single train run, in log order.
    pub fn list_events(&self, key: Option<&TrainKey>) -> Result<Vec<JourneyEventRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, train_no, journey_date, seq, kind, payload, recorded_at
            FROM journey_events
            WHERE (?1 IS NULL OR train_no = ?1) AND (?2 IS NULL OR journey_date = ?2)
            ORDER BY train_no ASC, journey_date ASC, seq ASC
            ",
        )?;
        let train_no = key.map(|k| k.train_no.clone());
        let date = key.map(|k| k.journey_date.to_string());
        let rows = stmt.query_map(params![train_no, date], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let mut events = Vec::new();
        for row in rows {
            let (id, train_no, date, seq, kind, payload, recorded_at) = row?;
            events.push(JourneyEventRecord {
                journey_date: parse_date(&date, &id)?,
                payload: serde_json::from_str(&payload)?,
                id,
                train_no,
                seq,
                kind,
                recorded_at,
            });
        }
        Ok(events)
    }
}

impl TrainLoader for Database {
    fn load_train(&self, key: &TrainKey) -> Result<TrainManifest, LoadError> {
        self.load_manifest(key).map_err(|err| match err {
            DbError::TrainNotFound(_) | DbError::ManifestNotFound { .. } => LoadError::NotFound {
                train_no: key.train_no.clone(),
                journey_date: key.journey_date,
            },
            err @ (DbError::InvalidRecord { .. } | DbError::Json(_)) => LoadError::Invalid(Box::new(err)),
            err @ DbError::Sqlite(_) => LoadError::Connection(Box::new(err)),
        })
    }
}

impl EventSink for Database {
    fn publish(&self, key: &TrainKey, event: &JourneyEvent) -> Result<(), SinkError> {
        self.append_event(key, event)
            .map(|_| ())
            .map_err(|err| SinkError(Box::new(err)))
    }
}

fn read_train(conn: &Connection, train_no: &str) -> Result<TrainRecord, DbError> {
    conn.query_row(
        "SELECT train_no, train_name, sleeper_coaches, three_ac_coaches FROM trains WHERE train_no = ?",
        [train_no],
        |row| {
            Ok(TrainRecord {
                train_no: row.get(0)?,
                train_name: row.get(1)?,
                sleeper_coaches: row.get(2)?,
                three_ac_coaches: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| DbError::TrainNotFound(train_no.to_string()))
}

fn read_stations(conn: &Connection, train_no: &str) -> Result<Vec<StationRecord>, DbError> {
    let mut stmt = conn.prepare("SELECT code, name FROM stations WHERE train_no = ? ORDER BY idx ASC")?;
    let rows = stmt.query_map([train_no], |row| {
        Ok(StationRecord {
            code: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    let mut stations = Vec::new();
    for row in rows {
        stations.push(row?);
    }
    Ok(stations)
}

fn read_manifest(conn: &Connection, key: &TrainKey) -> Result<TrainManifest, DbError> {
    let train = read_train(conn, &key.train_no)?;
    let stations: Vec<Station> = read_stations(conn, &key.train_no)?
        .into_iter()
        .enumerate()
        .map(|(idx, s)| Station::new(idx, s.code, s.name))
        .collect();
    let codes: HashMap<&str, usize> = stations.iter().map(|s| (s.code.as_str(), s.idx)).collect();

    let mut stmt = conn.prepare(
        "
        SELECT pnr, name, age, gender, from_station, to_station, pnr_status,
               coach_no, berth_no, rac_priority, absent
        FROM passengers
        WHERE train_no = ? AND journey_date = ?
        ORDER BY seq ASC
        ",
    )?;
    let rows = stmt.query_map(params![key.train_no, key.journey_date.to_string()], |row| {
        Ok(PassengerRecord {
            pnr: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            gender: row.get(3)?,
            from_station: row.get(4)?,
            to_station: row.get(5)?,
            pnr_status: row.get(6)?,
            coach: row.get(7)?,
            berth: row.get(8)?,
            rac_priority: row.get(9)?,
            absent: row.get(10)?,
        })
    })?;
    let mut passengers = Vec::new();
    for row in rows {
        passengers.push(to_passenger(&row?, &codes)?);
    }
    if passengers.is_empty() {
        return Err(DbError::ManifestNotFound {
            train_no: key.train_no.clone(),
            journey_date: key.journey_date,
        });
    }

    let segments = stations.len().saturating_sub(1);
    let coaches = build_coaches(&train, segments)?;
    Ok(TrainManifest {
        key: key.clone(),
        train_name: train.train_name,
        coaches,
        stations,
        passengers,
    })
}

fn booked_dates(conn: &Connection, train_no: &str) -> Result<Vec<NaiveDate>, DbError> {
    let mut stmt = conn.prepare("SELECT DISTINCT journey_date FROM passengers WHERE train_no = ? ORDER BY 1")?;
    let rows = stmt.query_map([train_no], |row| row.get::<_, String>(0))?;
    let mut dates = Vec::new();
    for row in rows {
        dates.push(parse_date(&row?, train_no)?);
    }
    Ok(dates)
}

/// Seats the stored bookings of one run on its coaches.
///
/// Fails on berths the train does not have and on confirmed bookings that
/// overlap on the same berth.
fn check_bookings(conn: &Connection, key: &TrainKey) -> Result<(), DbError> {
    let manifest = match read_manifest(conn, key) {
        Ok(manifest) => manifest,
        Err(DbError::ManifestNotFound { .. }) => return Ok(()),
        Err(err) => return Err(err),
    };
    TrainJourney::from_manifest(manifest)
        .map(|_| ())
        .map_err(|err| DbError::invalid(format!("bookings for train {key}"), err))
}

fn validate_record(record: &PassengerRecord, codes: &HashMap<String, usize>) -> Result<(), DbError> {
    let context = || format!("for passenger {}", record.pnr);
    Pnr::new(record.pnr.as_str()).map_err(|err| DbError::invalid(context(), err))?;
    record
        .gender
        .parse::<Gender>()
        .map_err(|err| DbError::invalid(context(), err))?;
    let station = |code: &str| {
        codes
            .get(code)
            .copied()
            .ok_or_else(|| DbError::invalid(context(), format!("unknown station {code}")))
    };
    let from = station(&record.from_station)?;
    let to = station(&record.to_station)?;
    if from >= to {
        return Err(DbError::invalid(
            context(),
            format!("{} does not come before {}", record.from_station, record.to_station),
        ));
    }
    match record.pnr_status.to_ascii_uppercase().as_str() {
        "CNF" if record.coach.is_some() && record.berth.is_some() => Ok(()),
        "CNF" => Err(DbError::invalid(context(), "confirmed booking without coach and berth")),
        "RAC" if record.rac_priority.is_some() => Ok(()),
        "RAC" => Err(DbError::invalid(context(), "RAC booking without priority")),
        other => Err(DbError::invalid(context(), format!("unknown status {other}"))),
    }
}

fn to_passenger(record: &PassengerRecord, codes: &HashMap<&str, usize>) -> Result<Passenger, DbError> {
    let context = || format!("for passenger {}", record.pnr);
    let station = |code: &str| {
        codes
            .get(code)
            .copied()
            .ok_or_else(|| DbError::invalid(context(), format!("unknown station {code}")))
    };
    let pnr = Pnr::new(record.pnr.as_str()).map_err(|err| DbError::invalid(context(), err))?;
    let window = TravelWindow::new(station(&record.from_station)?, station(&record.to_station)?);

    let mut passenger = match (record.pnr_status.as_str(), &record.coach, record.berth, record.rac_priority) {
        ("CNF", Some(coach), Some(berth_no), _) => {
            let coach = CoachNo::new(coach.as_str()).map_err(|err| DbError::invalid(context(), err))?;
            Passenger::confirmed(pnr, record.name.clone(), window, BerthId::new(coach, berth_no))
        }
        ("RAC", _, _, Some(priority)) => Passenger::rac(pnr, record.name.clone(), window, priority),
        (status, ..) => return Err(DbError::invalid(context(), format!("incomplete {status} booking"))),
    };
    passenger.age = record.age;
    passenger.gender = record
        .gender
        .parse()
        .map_err(|err| DbError::invalid(context(), err))?;
    passenger.absent = record.absent;
    Ok(passenger)
}

fn build_coaches(train: &TrainRecord, segments: usize) -> Result<Vec<Coach>, DbError> {
    let classes = [
        (CoachClass::Sleeper, train.sleeper_coaches),
        (CoachClass::ThreeTierAc, train.three_ac_coaches),
    ];
    let mut coaches = Vec::new();
    for (class, count) in classes {
        for n in 1..=count {
            let coach_no = CoachNo::new(format!("{}{n}", class.coach_prefix()))
                .map_err(|err| DbError::invalid(format!("train {}", train.train_no), err))?;
            coaches.push(Coach::with_layout(coach_no, class, segments));
        }
    }
    Ok(coaches)
}

fn deterministic_event_id(key: &TrainKey, seq: i64) -> String {
    let content = format!("journey_event|{}|{}|{seq}", key.train_no, key.journey_date);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes()).to_string()
}

fn parse_date(date: &str, context: &str) -> Result<NaiveDate, DbError> {
    date.parse()
        .map_err(|err| DbError::invalid(format!("date for {context}"), err))
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
