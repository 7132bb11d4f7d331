//! The fixed, chronological set of reporting windows in a 24-hour cycle.
use crate::error::RainfallError;
use serde::{Deserialize, Serialize};

/// One reporting window. Ordering is by `index`, i.e. by time of day
/// counted from the schedule's start hour, never by label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeSlot {
    pub index: usize,
    pub label: String,
}

/// Same-width windows covering a full day, starting at `start_hour` and
/// wrapping past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlotSchedule {
    pub start_hour: u32,
    pub width_hours: u32,
}

impl Default for SlotSchedule {
    fn default() -> Self {
        Self { start_hour: 6, width_hours: 2 }
    }
}

impl SlotSchedule {
    pub fn new(start_hour: u32, width_hours: u32) -> Result<Self, RainfallError> {
        let schedule = Self { start_hour, width_hours };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<(), RainfallError> {
        if self.start_hour >= 24 {
            return Err(RainfallError::InvalidSchedule(format!(
                "start hour {} is not within 0..24",
                self.start_hour
            )));
        }
        if self.width_hours == 0 || 24 % self.width_hours != 0 {
            return Err(RainfallError::InvalidSchedule(format!(
                "slot width {}h does not divide a 24h day",
                self.width_hours
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        match self.width_hours {
            0 => 0,
            w => (24 / w) as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bounds_of(&self, index: usize) -> (u32, u32) {
        let start = (self.start_hour + index as u32 * self.width_hours) % 24;
        (start, (start + self.width_hours) % 24)
    }

    /// The slot at `index`, or `None` past the end of the day.
    pub fn slot(&self, index: usize) -> Option<TimeSlot> {
        if index >= self.len() {
            return None;
        }
        let (start, end) = self.bounds_of(index);
        Some(TimeSlot {
            index,
            label: format!("{:02}-{:02}", start, end),
        })
    }

    /// All slots in chronological order.
    pub fn slots(&self) -> Vec<TimeSlot> {
        (0..self.len()).filter_map(|i| self.slot(i)).collect()
    }

    /// Resolve a column header like `"06-08"` (or `" 6-8 "`) to its slot.
    pub fn slot_for_label(&self, header: &str) -> Option<TimeSlot> {
        let (start, end) = parse_hours(header)?;
        (0..self.len())
            .find(|&i| self.bounds_of(i) == (start, end))
            .and_then(|i| self.slot(i))
    }
}

fn parse_hours(header: &str) -> Option<(u32, u32)> {
    let (a, b) = header.trim().split_once('-')?;
    let start: u32 = a.trim().parse().ok()?;
    let end: u32 = b.trim().parse().ok()?;
    // "24" is accepted as a spelling of midnight.
    if start > 24 || end > 24 {
        return None;
    }
    Some((start % 24, end % 24))
}
