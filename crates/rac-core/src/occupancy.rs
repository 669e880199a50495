//! Segment occupancy store.
//!
//! Every berth carries one slot per inter-station segment: slot `s` covers
//! travel between station `s` and station `s + 1`. A slot is either vacant or
//! held by exactly one passenger, and the slots a passenger holds on a berth
//! always form the contiguous range of their travel window.
//!
//! Writes (`occupy`, `vacate`) validate the whole range before touching any
//! slot, so a failed call leaves the berth unchanged.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::JourneyError;
use crate::types::{BerthId, BerthType, CoachClass, CoachNo, Pnr};

/// Half-open range of station indices `[from, to)` a passenger travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TravelWindow {
    pub from: usize,
    pub to: usize,
}

impl TravelWindow {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Segment indices covered by the window.
    pub const fn segments(self) -> Range<usize> {
        self.from..self.to
    }

    /// Checks `from < to` and that the window fits a route of `segments` segments.
    pub fn validate(self, segments: usize) -> Result<Self, JourneyError> {
        if self.from >= self.to || self.to > segments {
            return Err(JourneyError::InvalidWindow {
                from: self.from,
                to: self.to,
                segments,
            });
        }
        Ok(self)
    }

    /// Whether the passenger is travelling on segment `segment`.
    pub const fn covers(self, segment: usize) -> bool {
        self.from <= segment && segment < self.to
    }

    /// The part of the window from `station` onwards, if any remains.
    pub const fn remaining_from(self, station: usize) -> Option<Self> {
        let from = if station > self.from { station } else { self.from };
        if from < self.to {
            Some(Self { from, to: self.to })
        } else {
            None
        }
    }
}

/// State of one segment on one berth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "pnr", rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Vacant,
    Held(Pnr),
}

impl Slot {
    pub const fn is_vacant(&self) -> bool {
        matches!(self, Self::Vacant)
    }

    pub const fn holder(&self) -> Option<&Pnr> {
        match self {
            Self::Vacant => None,
            Self::Held(pnr) => Some(pnr),
        }
    }
}

/// Per-berth slot array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentOccupancy {
    slots: Vec<Slot>,
}

impl SegmentOccupancy {
    pub fn new(segments: usize) -> Self {
        Self {
            slots: vec![Slot::Vacant; segments],
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn segment_count(&self) -> usize {
        self.slots.len()
    }

    pub fn holder(&self, segment: usize) -> Option<&Pnr> {
        self.slots.get(segment).and_then(Slot::holder)
    }

    /// True iff every slot in the window is vacant.
    pub fn is_free(&self, window: TravelWindow) -> Result<bool, JourneyError> {
        let window = window.validate(self.slots.len())?;
        Ok(self.slots[window.segments()].iter().all(Slot::is_vacant))
    }

    /// First segment in the window held by someone other than `pnr`.
    fn first_foreign_hold(&self, window: TravelWindow, pnr: &Pnr) -> Option<(usize, &Pnr)> {
        window
            .segments()
            .filter_map(|segment| self.slots[segment].holder().map(|holder| (segment, holder)))
            .find(|(_, holder)| *holder != pnr)
    }

    fn occupy(&mut self, berth: &BerthId, window: TravelWindow, pnr: &Pnr) -> Result<(), JourneyError> {
        let window = window.validate(self.slots.len())?;
        if let Some((segment, holder)) = self.first_foreign_hold(window, pnr) {
            return Err(JourneyError::Conflict {
                berth: berth.clone(),
                segment,
                holder: holder.clone(),
            });
        }
        for slot in &mut self.slots[window.segments()] {
            *slot = Slot::Held(pnr.clone());
        }
        Ok(())
    }

    fn vacate(&mut self, window: TravelWindow) -> Result<(), JourneyError> {
        let window = window.validate(self.slots.len())?;
        for slot in &mut self.slots[window.segments()] {
            *slot = Slot::Vacant;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Berth {
    pub berth_no: u16,
    pub berth_type: BerthType,
    pub occupancy: SegmentOccupancy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
    pub coach_no: CoachNo,
    pub class: CoachClass,
    pub berths: Vec<Berth>,
}

impl Coach {
    /// Builds a coach with the standard berth layout for its class.
    pub fn with_layout(coach_no: CoachNo, class: CoachClass, segments: usize) -> Self {
        Self::with_berths(coach_no, class, class.capacity(), segments)
    }

    /// Builds a coach with the first `berths` berths of the standard layout.
    pub fn with_berths(coach_no: CoachNo, class: CoachClass, berths: u16, segments: usize) -> Self {
        let berths = (1..=berths)
            .map(|berth_no| Berth {
                berth_no,
                berth_type: BerthType::for_berth_no(berth_no),
                occupancy: SegmentOccupancy::new(segments),
            })
            .collect();
        Self {
            coach_no,
            class,
            berths,
        }
    }

    pub fn berth_id(&self, berth: &Berth) -> BerthId {
        BerthId::new(self.coach_no.clone(), berth.berth_no)
    }
}

/// A berth together with its coach, as yielded by [`OccupancyStore::berths`].
#[derive(Debug, Clone, Copy)]
pub struct BerthRef<'a> {
    pub coach: &'a Coach,
    pub berth: &'a Berth,
}

impl BerthRef<'_> {
    pub fn id(&self) -> BerthId {
        self.coach.berth_id(self.berth)
    }
}

/// All berths of a train with their segment occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyStore {
    segments: usize,
    coaches: Vec<Coach>,
}

impl OccupancyStore {
    /// Creates a store for a route of `segments` segments.
    ///
    /// Coaches are kept in the given order and berths sorted by number, which
    /// fixes the scan order used by the reallocation engine. Berth slot arrays
    /// are resized to the route length.
    pub fn new(mut coaches: Vec<Coach>, segments: usize) -> Self {
        for coach in &mut coaches {
            coach.berths.sort_by_key(|berth| berth.berth_no);
            for berth in &mut coach.berths {
                if berth.occupancy.segment_count() != segments {
                    berth.occupancy = SegmentOccupancy::new(segments);
                }
            }
        }
        Self { segments, coaches }
    }

    pub const fn segment_count(&self) -> usize {
        self.segments
    }

    pub fn coaches(&self) -> &[Coach] {
        &self.coaches
    }

    /// Berths in stable order: coach order, then berth number.
    pub fn berths(&self) -> impl Iterator<Item = BerthRef<'_>> + '_ {
        self.coaches
            .iter()
            .flat_map(|coach| coach.berths.iter().map(move |berth| BerthRef { coach, berth }))
    }

    pub fn berth_count(&self) -> usize {
        self.coaches.iter().map(|coach| coach.berths.len()).sum()
    }

    pub fn find(&self, id: &BerthId) -> Result<BerthRef<'_>, JourneyError> {
        self.coaches
            .iter()
            .filter(|coach| coach.coach_no == id.coach)
            .find_map(|coach| {
                coach
                    .berths
                    .iter()
                    .find(|berth| berth.berth_no == id.berth_no)
                    .map(|berth| BerthRef { coach, berth })
            })
            .ok_or_else(|| JourneyError::BerthNotFound(id.clone()))
    }

    fn occupancy_mut(&mut self, id: &BerthId) -> Result<&mut SegmentOccupancy, JourneyError> {
        self.coaches
            .iter_mut()
            .filter(|coach| coach.coach_no == id.coach)
            .find_map(|coach| {
                coach
                    .berths
                    .iter_mut()
                    .find(|berth| berth.berth_no == id.berth_no)
                    .map(|berth| &mut berth.occupancy)
            })
            .ok_or_else(|| JourneyError::BerthNotFound(id.clone()))
    }

    /// Writes `pnr` into every slot of the window.
    ///
    /// Fails with [`JourneyError::Conflict`] if any slot is held by a different
    /// passenger; slots already held by `pnr` are accepted.
    pub fn occupy(&mut self, id: &BerthId, window: TravelWindow, pnr: &Pnr) -> Result<(), JourneyError> {
        self.occupancy_mut(id)?.occupy(id, window, pnr)
    }

    /// Clears every slot of the window. Idempotent.
    pub fn vacate(&mut self, id: &BerthId, window: TravelWindow) -> Result<(), JourneyError> {
        self.occupancy_mut(id)?.vacate(window)
    }

    pub fn is_free(&self, id: &BerthId, window: TravelWindow) -> Result<bool, JourneyError> {
        self.find(id)?.berth.occupancy.is_free(window)
    }

    /// Number of berths with segment `segment` vacant.
    ///
    /// Past the last segment the train is empty and every berth counts as vacant.
    pub fn vacant_on(&self, segment: usize) -> usize {
        if segment >= self.segments {
            return self.berth_count();
        }
        self.berths()
            .filter(|b| b.berth.occupancy.holder(segment).is_none())
            .count()
    }
}
