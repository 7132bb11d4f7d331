use crate::config::ColumnConfig;
use crate::error::{DataIssue, RainfallError};
use crate::slots::{SlotSchedule, TimeSlot};
use crate::types::{RainfallTable, UnitRow};
use crate::util::{parse_rainfall_cell, Cell};
use csv::{ByteRecord, ReaderBuilder};
use std::borrow::Cow;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub issues: Vec<DataIssue>,
}

impl LoadReport {
    pub fn malformed_values(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, DataIssue::MalformedValue { .. }))
            .count()
    }

    pub fn unknown_columns(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|i| match i {
                DataIssue::UnknownSlotColumn { column } => Some(column.as_str()),
                DataIssue::MalformedValue { .. } => None,
            })
            .collect()
    }
}

/// Caller supplied spelling fixes for unit names (`Morvi` -> `Morbi`).
/// Matching is exact, after trimming.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AliasTable {
    pub version: u32,
    pub names: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        let name = name.trim();
        self.names.get(name).map(String::as_str).unwrap_or(name)
    }
}

struct ColumnMap {
    unit: usize,
    parent: Option<usize>,
    total: Option<usize>,
    slots: Vec<(usize, TimeSlot, String)>,
}

fn map_columns(
    headers: &[Cow<'_, str>],
    columns: &ColumnConfig,
    schedule: &SlotSchedule,
    issues: &mut Vec<DataIssue>,
) -> Result<ColumnMap, RainfallError> {
    let find = |name: &str| headers.iter().position(|h| h.trim() == name.trim());
    let unit = find(&columns.unit).ok_or_else(|| RainfallError::MissingColumn(columns.unit.clone()))?;
    let parent = find(&columns.parent);
    let total = find(&columns.total);

    let mut slots = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == unit || Some(idx) == parent || Some(idx) == total {
            continue;
        }
        match schedule.slot_for_label(header) {
            Some(slot) => slots.push((idx, slot, header.trim().to_string())),
            None => {
                warn!(column = %header, "ignoring column that is not a known time slot");
                issues.push(DataIssue::UnknownSlotColumn { column: header.trim().to_string() });
            }
        }
    }
    debug!(slot_columns = slots.len(), has_total = total.is_some(), "mapped sheet columns");
    Ok(ColumnMap { unit, parent, total, slots })
}

/// Cells are decoded lossily so one bad byte spoils only its own cell.
fn decode(record: &ByteRecord) -> Vec<Cow<'_, str>> {
    record.iter().map(String::from_utf8_lossy).collect()
}

fn read_value(
    cells: &[Cow<'_, str>],
    idx: usize,
    row: usize,
    column: &str,
    issues: &mut Vec<DataIssue>,
) -> Option<f64> {
    let raw = cells.get(idx).map(|c| c.as_ref()).unwrap_or("");
    match parse_rainfall_cell(raw) {
        Cell::Malformed => {
            debug!(row, column, raw, "treating unparseable cell as missing");
            issues.push(DataIssue::MalformedValue {
                row,
                column: column.to_string(),
                raw: raw.to_string(),
            });
            None
        }
        cell => cell.value(),
    }
}

/// Parse a sheet export into a [`RainfallTable`].
///
/// Bad cells and unknown columns are recovered and listed in the
/// [`LoadReport`]; only a missing unit column (or unreadable CSV) fails.
pub fn parse_table<R: Read>(
    reader: R,
    columns: &ColumnConfig,
    schedule: &SlotSchedule,
    aliases: Option<&AliasTable>,
) -> Result<(RainfallTable, LoadReport), RainfallError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let header_record = rdr.byte_headers()?.clone();
    let headers = decode(&header_record);
    let mut report = LoadReport::default();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok((RainfallTable::default(), report));
    }

    let map = map_columns(&headers, columns, schedule, &mut report.issues)?;
    let canonical = |name: &str| -> String {
        match aliases {
            Some(a) => a.resolve(name).to_string(),
            None => name.trim().to_string(),
        }
    };

    let mut rows = Vec::new();
    for (i, result) in rdr.byte_records().enumerate() {
        report.total_rows += 1;
        let row_no = i + 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = row_no, error = %e, "skipping unreadable row");
                report.skipped_rows += 1;
                continue;
            }
        };
        let cells = decode(&record);
        let unit_name = cells.get(map.unit).map(|c| c.trim()).unwrap_or("");
        if unit_name.is_empty() {
            report.skipped_rows += 1;
            continue;
        }
        let parent_name = map
            .parent
            .and_then(|idx| cells.get(idx))
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(&canonical);
        let total_mm = map
            .total
            .and_then(|idx| read_value(&cells, idx, row_no, &columns.total, &mut report.issues));
        let slots = map
            .slots
            .iter()
            .map(|(idx, slot, header)| {
                (slot.clone(), read_value(&cells, *idx, row_no, header, &mut report.issues))
            })
            .collect();

        rows.push(UnitRow {
            unit_name: canonical(unit_name),
            parent_name,
            total_mm,
            slots,
        });
    }

    report.loaded_rows = rows.len();
    let malformed = report.malformed_values();
    if malformed > 0 {
        warn!(count = malformed, "unparseable cells treated as missing");
    }
    let table = RainfallTable { has_total_column: map.total.is_some(), rows };
    Ok((table, report))
}

pub fn load_table(
    path: &Path,
    columns: &ColumnConfig,
    schedule: &SlotSchedule,
    aliases: Option<&AliasTable>,
) -> Result<(RainfallTable, LoadReport), RainfallError> {
    let file = File::open(path)?;
    let (table, report) = parse_table(file, columns, schedule, aliases)?;
    info!(
        path = %path.display(),
        rows = report.total_rows,
        loaded = report.loaded_rows,
        skipped = report.skipped_rows,
        "loaded rainfall sheet"
    );
    Ok((table, report))
}

struct CachedTable {
    loaded_at: Instant,
    table: RainfallTable,
    report: LoadReport,
}

/// Keeps loaded sheets around for `ttl` so repeated reports over the same
/// day don't re-read the source. Owned by whoever drives the loading.
pub struct TableCache {
    ttl: Duration,
    entries: HashMap<PathBuf, CachedTable>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// Return the cached table for `path`, calling `load` when there is no
    /// entry or the entry is at least `ttl` old. Failed loads are not cached.
    pub fn get_or_load<F>(
        &mut self,
        path: &Path,
        load: F,
    ) -> Result<(RainfallTable, LoadReport), RainfallError>
    where
        F: FnOnce(&Path) -> Result<(RainfallTable, LoadReport), RainfallError>,
    {
        if let Some(hit) = self.entries.get(path) {
            if hit.loaded_at.elapsed() < self.ttl {
                debug!(path = %path.display(), "sheet served from cache");
                return Ok((hit.table.clone(), hit.report.clone()));
            }
        }
        let (table, report) = load(path)?;
        self.entries.insert(
            path.to_path_buf(),
            CachedTable { loaded_at: Instant::now(), table: table.clone(), report: report.clone() },
        );
        Ok((table, report))
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as Counter;

    fn parse(csv: &str) -> (RainfallTable, LoadReport) {
        parse_table(csv.as_bytes(), &ColumnConfig::default(), &SlotSchedule::default(), None).unwrap()
    }

    #[test]
    fn daily_sheet_uses_total_column() {
        let (table, report) = parse("District,Taluka,Rain_Last_24_Hrs\nKutch,Bhuj,12.5\nKutch,Mandvi,NA\n");
        assert!(table.has_total_column);
        assert!(!table.has_slot_columns());
        assert_eq!(table.rows[0].total_mm, Some(12.5));
        assert_eq!(table.rows[1].total_mm, None);
        assert_eq!(report.malformed_values(), 1);
        assert_eq!(report.loaded_rows, 2);
    }

    #[test]
    fn slot_columns_are_recognised_and_others_reported() {
        let (table, report) = parse("Sr,District,Taluka,06-08,08-10\n1,Kutch,Bhuj,1.0,\n");
        assert!(!table.has_total_column);
        let labels: Vec<&str> = table.rows[0].slots.iter().map(|(s, _)| s.label.as_str()).collect();
        assert_eq!(labels, vec!["06-08", "08-10"]);
        assert_eq!(table.rows[0].slots[1].1, None);
        assert_eq!(report.unknown_columns(), vec!["Sr"]);
        assert_eq!(report.malformed_values(), 0);
    }

    #[test]
    fn invalid_utf8_spoils_only_its_cell() {
        let mut sheet = b"Taluka,06-08,08-10\nBhuj,".to_vec();
        sheet.extend_from_slice(&[0xff, b'3']);
        sheet.extend_from_slice(b",4.5\nMandvi,1,2\n");
        let (table, report) = parse_table(
            sheet.as_slice(),
            &ColumnConfig::default(),
            &SlotSchedule::default(),
            None,
        )
        .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(table.rows[0].unit_name, "Bhuj");
        assert_eq!(table.rows[0].slots[0].1, None);
        assert_eq!(table.rows[0].slots[1].1, Some(4.5));
        assert_eq!(report.malformed_values(), 1);
    }

    #[test]
    fn blank_units_are_skipped_and_names_trimmed() {
        let (table, report) = parse("Taluka,06-08\n  Bhuj ,2\n ,3\n");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].unit_name, "Bhuj");
        assert_eq!(table.rows[0].parent_name, None);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.total_rows, 2);
    }

    #[test]
    fn missing_unit_column_fails() {
        let err = parse_table(
            "District,06-08\nKutch,1\n".as_bytes(),
            &ColumnConfig::default(),
            &SlotSchedule::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RainfallError::MissingColumn(c) if c == "Taluka"));
    }

    #[test]
    fn empty_input_is_an_empty_table() {
        let (table, report) = parse("");
        assert!(table.is_empty());
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn aliases_canonicalise_names() {
        let aliases = AliasTable {
            version: 1,
            names: [("Morvi".to_string(), "Morbi".to_string())].into_iter().collect(),
        };
        let (table, _) = parse_table(
            "District,Taluka,Rain_Last_24_Hrs\nMorvi,Morvi ,5\n".as_bytes(),
            &ColumnConfig::default(),
            &SlotSchedule::default(),
            Some(&aliases),
        )
        .unwrap();
        assert_eq!(table.rows[0].unit_name, "Morbi");
        assert_eq!(table.rows[0].parent_name.as_deref(), Some("Morbi"));
    }

    #[test]
    fn cache_reuses_until_ttl_expires() {
        let calls = Counter::new(0);
        let load = |_: &Path| {
            calls.set(calls.get() + 1);
            Ok::<_, RainfallError>((RainfallTable::default(), LoadReport::default()))
        };
        let path = Path::new("day.csv");

        let mut cache = TableCache::new(Duration::from_secs(3600));
        cache.get_or_load(path, load).unwrap();
        cache.get_or_load(path, load).unwrap();
        assert_eq!(calls.get(), 1);
        cache.invalidate(path);
        cache.get_or_load(path, load).unwrap();
        assert_eq!(calls.get(), 2);

        let mut uncached = TableCache::new(Duration::ZERO);
        uncached.get_or_load(path, load).unwrap();
        uncached.get_or_load(path, load).unwrap();
        assert_eq!(calls.get(), 4);
        assert_eq!(uncached.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let mut cache = TableCache::new(Duration::from_secs(60));
        let res = cache.get_or_load(Path::new("missing.csv"), |p| {
            load_table(p, &ColumnConfig::default(), &SlotSchedule::default(), None)
        });
        assert!(matches!(res, Err(RainfallError::Io(_))));
        assert!(cache.is_empty());
    }
}
