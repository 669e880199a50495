//! Human-readable rendering of journey results.

use std::io::{self, Write};

use rac_core::{
    Allocation, BerthTimeline, EligibilityMatrix, JourneyStats, JourneySummary, NoShowOutcome, Passenger,
    PassengerStatus, Progress, RacQueueEntry, SegmentMatrix, Station, StationReport, TrainSummary, TravelWindow,
    VacantBerth,
};

/// Berths listed per RAC passenger before the rest are summarised.
const MAX_LISTED_BERTHS: usize = 6;

fn code(stations: &[Station], idx: usize) -> &str {
    stations.get(idx).map_or("?", |s| s.code.as_str())
}

fn route(stations: &[Station], window: TravelWindow) -> String {
    format!("{}-{}", code(stations, window.from), code(stations, window.to))
}

fn join_or_dash<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

pub fn train_summary<W: Write>(w: &mut W, summary: &TrainSummary) -> io::Result<()> {
    writeln!(
        w,
        "Train {} {} on {}: {} stations, {} passengers ({} RAC)",
        summary.train_no,
        summary.train_name,
        summary.journey_date,
        summary.total_stations,
        summary.stats.total_passengers,
        summary.stats.rac_passengers,
    )
}

pub fn allocation<W: Write>(w: &mut W, stations: &[Station], allocation: &Allocation) -> io::Result<()> {
    writeln!(
        w,
        "Upgraded {} ({}) to {} {} for {}",
        allocation.pnr,
        allocation.name,
        allocation.berth,
        allocation.berth_type,
        route(stations, allocation.window),
    )
}

pub fn no_show<W: Write>(w: &mut W, stations: &[Station], outcome: &NoShowOutcome) -> io::Result<()> {
    match &outcome.released {
        Some(berth) => writeln!(
            w,
            "Marked {} ({}) as no-show at {}; released {berth}",
            outcome.pnr, outcome.name, outcome.station.code
        )?,
        None => writeln!(
            w,
            "Marked {} ({}) as no-show at {}",
            outcome.pnr, outcome.name, outcome.station.code
        )?,
    }
    for upgrade in &outcome.upgrades {
        allocation(w, stations, upgrade)?;
    }
    Ok(())
}

pub fn station_report<W: Write>(w: &mut W, stations: &[Station], report: &StationReport) -> io::Result<()> {
    writeln!(w, "== {} ({}) ==", report.station.name, report.station.code)?;
    writeln!(w, "Deboarded: {}", join_or_dash(&report.deboarded))?;
    writeln!(w, "No-shows:  {}", join_or_dash(&report.no_shows))?;
    if report.upgrades.is_empty() {
        writeln!(w, "Upgrades:  -")?;
    } else {
        writeln!(w, "Upgrades:")?;
        for upgrade in &report.upgrades {
            write!(w, "  ")?;
            allocation(w, stations, upgrade)?;
        }
    }
    writeln!(w, "Boarded:   {}", join_or_dash(&report.boarded))?;
    writeln!(
        w,
        "Onboard {} | vacant berths {} | RAC waiting {}",
        report.stats.current_onboard,
        report.vacancies.len(),
        report.stats.rac_passengers,
    )
}

pub fn journey_summary<W: Write>(w: &mut W, summary: &JourneySummary) -> io::Result<()> {
    writeln!(
        w,
        "Journey complete at {} ({})",
        summary.final_station.name, summary.final_station.code
    )?;
    writeln!(
        w,
        "Passengers {} | deboarded {} ({} at destination) | no-shows {} | RAC upgraded {}",
        summary.total_passengers,
        summary.total_deboarded,
        summary.deboarded_at_destination,
        summary.total_no_shows,
        summary.total_rac_upgraded,
    )
}

pub fn stats<W: Write>(
    w: &mut W,
    station: &Station,
    progress: &Progress,
    stats: &JourneyStats,
) -> io::Result<()> {
    writeln!(
        w,
        "Station {} ({}) [{}/{}, {:.1}%]",
        station.name, station.code, progress.current, progress.total, progress.percentage
    )?;
    writeln!(
        w,
        "Passengers {} | confirmed {} | RAC {} | no-shows {}",
        stats.total_passengers, stats.confirmed_passengers, stats.rac_passengers, stats.total_no_shows
    )?;
    writeln!(
        w,
        "Onboard {} | deboarded {} | RAC upgraded {}",
        stats.current_onboard, stats.total_deboarded, stats.total_rac_upgraded
    )?;
    writeln!(
        w,
        "Berths vacant {} | occupied {}",
        stats.vacant_berths, stats.occupied_berths
    )
}

pub fn eligibility<W: Write>(w: &mut W, stations: &[Station], matrix: &EligibilityMatrix) -> io::Result<()> {
    if matrix.entries.is_empty() {
        return writeln!(w, "No RAC passengers awaiting a berth.");
    }
    writeln!(w, "RAC eligibility at {}:", code(stations, matrix.at_station))?;
    for entry in &matrix.entries {
        let berths = match entry.eligible_berths.len() {
            0 => "no berth free".to_string(),
            n if n <= MAX_LISTED_BERTHS => join_or_dash(&entry.eligible_berths),
            n => format!(
                "{} (+{} more)",
                join_or_dash(&entry.eligible_berths[..MAX_LISTED_BERTHS]),
                n - MAX_LISTED_BERTHS
            ),
        };
        writeln!(
            w,
            "  #{} {} ({}) {}: {berths}",
            entry.priority,
            entry.pnr,
            entry.name,
            route(stations, entry.window),
        )?;
    }
    Ok(())
}

pub fn vacant_berths<W: Write>(w: &mut W, station: &str, berths: &[VacantBerth]) -> io::Result<()> {
    writeln!(w, "Vacant berths leaving {station}: {}", berths.len())?;
    for berth in berths {
        writeln!(
            w,
            "  {:<6} {} {:<2} {}-{}",
            berth.berth.to_string(),
            berth.berth_type,
            berth.class,
            berth.vacant_from_station,
            berth.vacant_to_station,
        )?;
    }
    Ok(())
}

pub fn rac_queue<W: Write>(w: &mut W, queue: &[RacQueueEntry]) -> io::Result<()> {
    if queue.is_empty() {
        return writeln!(w, "RAC queue is empty.");
    }
    writeln!(w, "RAC queue: {}", queue.len())?;
    for entry in queue {
        writeln!(
            w,
            "  {}. {} ({}) {}-{} priority {}",
            entry.position, entry.pnr, entry.name, entry.from_station, entry.to_station, entry.priority
        )?;
    }
    Ok(())
}

fn status(passenger: &Passenger) -> String {
    match &passenger.status {
        PassengerStatus::Confirmed { berth, upgraded: true } => format!("CNF {berth} (upgraded)"),
        PassengerStatus::Confirmed { berth, .. } => format!("CNF {berth}"),
        PassengerStatus::Rac { priority } => format!("RAC #{priority}"),
        PassengerStatus::NoShow { .. } => "NO_SHOW".to_string(),
    }
}

fn travel_state(passenger: &Passenger) -> &'static str {
    if passenger.deboarded {
        "deboarded"
    } else if passenger.boarded {
        "onboard"
    } else {
        "-"
    }
}

pub fn passenger<W: Write>(w: &mut W, stations: &[Station], passenger: &Passenger) -> io::Result<()> {
    writeln!(
        w,
        "{:<12} {:<20} {}/{:<3} {:<12} {:<22} {}",
        passenger.pnr.as_str(),
        passenger.name,
        passenger.gender,
        passenger.age,
        route(stations, passenger.window),
        status(passenger),
        travel_state(passenger),
    )
}

pub fn passengers<W: Write>(w: &mut W, stations: &[Station], passengers: &[Passenger]) -> io::Result<()> {
    if passengers.is_empty() {
        return writeln!(w, "No passengers match.");
    }
    for p in passengers {
        passenger(w, stations, p)?;
    }
    writeln!(w, "{} passenger(s)", passengers.len())
}

pub fn berth_timeline<W: Write>(w: &mut W, timeline: &BerthTimeline) -> io::Result<()> {
    writeln!(w, "{} ({}, {})", timeline.berth, timeline.berth_type, timeline.class)?;
    for run in &timeline.runs {
        let holder = run.holder.as_ref().map_or("vacant", |pnr| pnr.as_str());
        writeln!(w, "  {}-{} {holder}", run.from_station, run.to_station)?;
    }
    Ok(())
}

/// Booked berths against segments; berths never booked are only counted.
pub fn segment_matrix<W: Write>(w: &mut W, matrix: &SegmentMatrix) -> io::Result<()> {
    let width = matrix
        .rows
        .iter()
        .flat_map(|row| row.holders.iter().flatten().map(|p| p.as_str().len()))
        .chain(matrix.segments.iter().map(String::len))
        .max()
        .unwrap_or(1);

    let mut line = format!("{:<7}", "Berth");
    for segment in &matrix.segments {
        line.push_str(&format!(" {segment:<width$}"));
    }
    writeln!(w, "{}", line.trim_end())?;

    let mut unbooked = 0;
    for row in &matrix.rows {
        if row.booked_segments() == 0 {
            unbooked += 1;
            continue;
        }
        let mut line = format!("{:<7}", row.berth.to_string());
        for holder in &row.holders {
            let cell = holder.as_ref().map_or(".", |pnr| pnr.as_str());
            line.push_str(&format!(" {cell:<width$}"));
        }
        writeln!(w, "{}", line.trim_end())?;
    }
    writeln!(w, "({unbooked} berths unbooked on every segment)")
}
