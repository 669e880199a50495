//! Read-only projections of a journey for listings and reports.

use serde::{Deserialize, Serialize};

use crate::error::JourneyError;
use crate::journey::TrainJourney;
use crate::occupancy::{BerthRef, TravelWindow};
use crate::types::{BerthId, BerthType, CoachClass, Pnr};

/// A berth free on the segment leaving a station, with the extent of the
/// vacancy around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacantBerth {
    pub berth: BerthId,
    pub berth_type: BerthType,
    pub class: CoachClass,
    /// First station of the contiguous vacant run.
    pub vacant_from: usize,
    /// Station where the run ends: the next booking, or the terminal.
    pub vacant_to: usize,
    pub vacant_from_station: String,
    pub vacant_to_station: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacQueueEntry {
    /// 1-based position in the queue.
    pub position: usize,
    pub pnr: Pnr,
    pub name: String,
    pub priority: u32,
    pub window: TravelWindow,
    pub from_station: String,
    pub to_station: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRow {
    pub berth: BerthId,
    pub berth_type: BerthType,
    pub holders: Vec<Option<Pnr>>,
}

/// Every berth against every segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMatrix {
    /// `"A-B"` labels, one per segment.
    pub segments: Vec<String>,
    pub rows: Vec<SegmentRow>,
}

/// A run of consecutive segments with the same holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRun {
    pub from: usize,
    pub to: usize,
    pub from_station: String,
    pub to_station: String,
    pub holder: Option<Pnr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BerthTimeline {
    pub berth: BerthId,
    pub berth_type: BerthType,
    pub class: CoachClass,
    pub runs: Vec<TimelineRun>,
}

impl TrainJourney {
    fn station_code(&self, idx: usize) -> String {
        self.stations.get(idx).map(|s| s.code.clone()).unwrap_or_default()
    }

    /// Berths whose segment leaving `station` is vacant.
    ///
    /// At the terminal station nothing departs, so the list is empty.
    pub fn vacant_berths_at(&self, station: usize) -> Result<Vec<VacantBerth>, JourneyError> {
        let segments = self.occupancy.segment_count();
        if station > segments {
            return Err(JourneyError::InvalidWindow {
                from: station,
                to: station + 1,
                segments,
            });
        }
        if station == segments {
            return Ok(Vec::new());
        }

        Ok(self
            .occupancy
            .berths()
            .filter(|b| b.berth.occupancy.holder(station).is_none())
            .map(|b| self.vacant_run(b, station))
            .collect())
    }

    /// Vacant berths at the current station.
    pub fn vacant_berths(&self) -> Vec<VacantBerth> {
        self.vacant_berths_at(self.state().current_station_idx)
            .unwrap_or_default()
    }

    fn vacant_run(&self, berth: BerthRef<'_>, station: usize) -> VacantBerth {
        let slots = berth.berth.occupancy.slots();
        let vacant_from = slots[..station]
            .iter()
            .rposition(|slot| !slot.is_vacant())
            .map_or(0, |held| held + 1);
        let vacant_to = slots[station..]
            .iter()
            .position(|slot| !slot.is_vacant())
            .map_or(slots.len(), |held| station + held);
        VacantBerth {
            berth: berth.id(),
            berth_type: berth.berth.berth_type,
            class: berth.coach.class,
            vacant_from,
            vacant_to,
            vacant_from_station: self.station_code(vacant_from),
            vacant_to_station: self.station_code(vacant_to),
        }
    }

    /// The RAC queue in service order.
    pub fn rac_queue(&self) -> Vec<RacQueueEntry> {
        self.manifest
            .rac_queue()
            .into_iter()
            .enumerate()
            .filter_map(|(i, p)| {
                Some(RacQueueEntry {
                    position: i + 1,
                    pnr: p.pnr.clone(),
                    name: p.name.clone(),
                    priority: p.rac_priority()?,
                    window: p.window,
                    from_station: self.station_code(p.window.from),
                    to_station: self.station_code(p.window.to),
                })
            })
            .collect()
    }

    pub fn segment_matrix(&self) -> SegmentMatrix {
        let segments = self
            .stations
            .windows(2)
            .map(|pair| format!("{}-{}", pair[0].code, pair[1].code))
            .collect();
        let rows = self
            .occupancy
            .berths()
            .map(|b| SegmentRow {
                berth: b.id(),
                berth_type: b.berth.berth_type,
                holders: b.berth.occupancy.slots().iter().map(|s| s.holder().cloned()).collect(),
            })
            .collect();
        SegmentMatrix { segments, rows }
    }

    pub fn berth_timeline(&self, berth: &BerthId) -> Result<BerthTimeline, JourneyError> {
        let found = self.occupancy.find(berth)?;
        let mut runs: Vec<TimelineRun> = Vec::new();
        for (segment, slot) in found.berth.occupancy.slots().iter().enumerate() {
            let holder = slot.holder();
            match runs.last_mut() {
                Some(run) if run.holder.as_ref() == holder => {
                    run.to = segment + 1;
                }
                _ => runs.push(TimelineRun {
                    from: segment,
                    to: segment + 1,
                    from_station: String::new(),
                    to_station: String::new(),
                    holder: holder.cloned(),
                }),
            }
        }
        for run in &mut runs {
            run.from_station = self.station_code(run.from);
            run.to_station = self.station_code(run.to);
        }
        Ok(BerthTimeline {
            berth: found.id(),
            berth_type: found.berth.berth_type,
            class: found.coach.class,
            runs,
        })
    }
}

impl SegmentRow {
    /// Number of segments with a holder.
    pub fn booked_segments(&self) -> usize {
        self.holders.iter().filter(|h| h.is_some()).count()
    }
}
