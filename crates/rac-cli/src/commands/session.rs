//! Interactive session: drive a journey one command per line.
//!
//! Commands are read from any `BufRead` so the same loop serves a terminal
//! and piped scripts. A failed command prints `error: ...` and the loop
//! carries on.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

use rac_core::{BerthId, EventSink, JourneySession, PassengerFilter, Pnr, TrainLoader};

use super::render;
use super::util::{parse_berth, parse_pnr};

const HELP: &str = "\
Commands:
  start                  depart from the origin station
  advance                arrive at the next station
  no-show <PNR>          mark a passenger as not boarding
  eligibility            RAC passengers and the berths free for them
  apply <PNR> <BERTH>    seat a RAC passenger on a berth
  stats                  journey statistics
  state                  train and journey status
  vacant [STATION]       vacant berths leaving a station (default: current)
  queue                  RAC queue in priority order
  search <PNR>           look up one passenger
  passengers [FILTER]    list passengers (all, cnf, rac, no-show, onboard)
  timeline <BERTH>       segment-by-segment holders of one berth
  matrix                 booked berths against segments
  reset                  reload the train and discard progress
  help                   show this help
  quit                   leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Advance,
    NoShow(Pnr),
    Eligibility,
    Apply(Pnr, BerthId),
    Stats,
    State,
    Vacant(Option<usize>),
    Queue,
    Search(Pnr),
    Passengers(PassengerFilter),
    Timeline(BerthId),
    Matrix,
    Reset,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let first = words.next();
        let second = words.next();

        let command = match verb.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "advance" | "next" => Self::Advance,
            "no-show" | "noshow" => Self::NoShow(parse_pnr(required(verb, first, "a PNR")?)?),
            "eligibility" => Self::Eligibility,
            "apply" => Self::Apply(
                parse_pnr(required(verb, first, "a PNR")?)?,
                parse_berth(required(verb, second, "a berth")?)?,
            ),
            "stats" => Self::Stats,
            "state" => Self::State,
            "vacant" => Self::Vacant(
                first
                    .map(|s| s.parse().with_context(|| format!("invalid station index: {s}")))
                    .transpose()?,
            ),
            "queue" => Self::Queue,
            "search" => Self::Search(parse_pnr(required(verb, first, "a PNR")?)?),
            "passengers" => Self::Passengers(
                first
                    .map(str::parse::<PassengerFilter>)
                    .transpose()?
                    .unwrap_or_default(),
            ),
            "timeline" => Self::Timeline(parse_berth(required(verb, first, "a berth")?)?),
            "matrix" => Self::Matrix,
            "reset" => Self::Reset,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command {other:?}; type `help` for a list"),
        };
        Ok(command)
    }
}

fn required<'a>(verb: &str, arg: Option<&'a str>, what: &str) -> Result<&'a str> {
    arg.ok_or_else(|| anyhow!("{verb} needs {what}"))
}

/// Reads commands until `quit` or end of input.
pub fn run<R, W, S>(reader: R, writer: &mut W, session: &JourneySession<S>) -> Result<()>
where
    R: BufRead,
    W: Write,
    S: TrainLoader + EventSink,
{
    for line in reader.lines() {
        let line = line.context("failed to read command")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let result = line
            .parse::<SessionCommand>()
            .and_then(|command| match command {
                SessionCommand::Quit => Ok(false),
                command => execute(writer, session, &command).map(|()| true),
            });
        match result {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => writeln!(writer, "error: {err:#}")?,
        }
    }
    Ok(())
}

/// Runs one command against the session and renders its result.
pub fn execute<W, S>(writer: &mut W, session: &JourneySession<S>, command: &SessionCommand) -> Result<()>
where
    W: Write,
    S: TrainLoader + EventSink,
{
    if *command == SessionCommand::Help {
        writeln!(writer, "{HELP}")?;
        return Ok(());
    }
    let stations = session.read(|journey| journey.stations().to_vec())?;
    match command {
        SessionCommand::Start => {
            let station = session.start()?;
            writeln!(writer, "Journey started at {} ({})", station.name, station.code)?;
        }
        SessionCommand::Advance => {
            let outcome = session.advance()?;
            render::station_report(writer, &stations, &outcome.report)?;
            if let Some(summary) = &outcome.completed {
                render::journey_summary(writer, summary)?;
            }
        }
        SessionCommand::NoShow(pnr) => {
            let outcome = session.mark_no_show(pnr)?;
            render::no_show(writer, &stations, &outcome)?;
        }
        SessionCommand::Eligibility => {
            render::eligibility(writer, &stations, &session.eligibility_matrix()?)?;
        }
        SessionCommand::Apply(pnr, berth) => {
            let allocation = session.apply_reallocation(pnr, berth)?;
            render::allocation(writer, &stations, &allocation)?;
        }
        SessionCommand::Stats => {
            let station = session.read(|journey| journey.current_station().clone())?;
            render::stats(writer, &station, &session.progress()?, &session.stats()?)?;
        }
        SessionCommand::State => {
            let summary = session.summary()?;
            render::train_summary(writer, &summary)?;
            writeln!(
                writer,
                "Phase {} at {} ({})",
                summary.phase, summary.current_station.name, summary.current_station.code
            )?;
        }
        SessionCommand::Vacant(station) => {
            let idx = match station {
                Some(idx) => *idx,
                None => session.read(|journey| journey.state().current_station_idx)?,
            };
            let berths = session.vacant_berths(Some(idx))?;
            let code = stations.get(idx).map_or("?", |s| s.code.as_str());
            render::vacant_berths(writer, code, &berths)?;
        }
        SessionCommand::Queue => render::rac_queue(writer, &session.rac_queue()?)?,
        SessionCommand::Search(pnr) => render::passenger(writer, &stations, &session.passenger(pnr)?)?,
        SessionCommand::Passengers(filter) => {
            render::passengers(writer, &stations, &session.passengers(*filter)?)?;
        }
        SessionCommand::Timeline(berth) => render::berth_timeline(writer, &session.berth_timeline(berth)?)?,
        SessionCommand::Matrix => render::segment_matrix(writer, &session.segment_matrix()?)?,
        SessionCommand::Reset => {
            let summary = session.reset()?;
            writeln!(writer, "Train reset")?;
            render::train_summary(writer, &summary)?;
        }
        SessionCommand::Help | SessionCommand::Quit => {}
    }
    Ok(())
}
