//! Everything one day's display needs, computed in a single pass from a
//! parsed table.

use crate::aggregate::{
    count_above, group_means, latest_available_slot, slot_summaries, to_long_form, unit_totals,
    GroupBy,
};
use crate::error::RainfallError;
use crate::slots::{SlotSchedule, TimeSlot};
use crate::summary::DailySummary;
use crate::types::{GroupMean, RainfallTable, SlotSummary, TimeSlotReading, UnitTotal};

#[derive(Debug)]
pub struct Dashboard {
    pub totals: Vec<UnitTotal>,
    pub long_form: Vec<TimeSlotReading>,
    pub groups: Vec<GroupMean>,
    pub zones: Vec<GroupMean>,
    pub slots: Vec<SlotSummary>,
    pub latest_slot: Result<TimeSlot, RainfallError>,
    pub threshold_mm: f64,
    pub units_above_threshold: usize,
    pub summary: DailySummary,
    has_slot_columns: bool,
}

impl Dashboard {
    pub fn build(
        table: &RainfallTable,
        schedule: &SlotSchedule,
        zones: &GroupBy<'_>,
        threshold_mm: f64,
    ) -> Self {
        let totals = unit_totals(table);
        let long_form = to_long_form(table);
        let groups = group_means(&totals, &GroupBy::Parent);
        let zone_means = match zones {
            GroupBy::Zone(map) if !map.is_empty() => group_means(&totals, zones),
            _ => Vec::new(),
        };
        let latest_slot = latest_available_slot(&long_form, schedule);
        let summary = DailySummary::from_totals(
            &totals,
            &groups,
            latest_slot.as_ref().ok().map(|s| s.label.clone()),
        );
        Dashboard {
            units_above_threshold: count_above(&totals, threshold_mm),
            slots: if table.has_slot_columns() { slot_summaries(&long_form, schedule) } else { Vec::new() },
            has_slot_columns: table.has_slot_columns(),
            totals,
            long_form,
            groups,
            zones: zone_means,
            latest_slot,
            threshold_mm,
            summary,
        }
    }

    /// Whether there is anything worth showing for the day. A slot sheet
    /// with no readings at all counts as no data even if it lists units.
    pub fn has_data(&self) -> bool {
        if self.totals.is_empty() {
            return false;
        }
        !self.has_slot_columns || self.latest_slot.is_ok()
    }
}
