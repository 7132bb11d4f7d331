use rainfall_report::aggregate::{
    count_above, latest_available_slot, mean_total, to_long_form, top_n, unit_total, unit_totals,
    GroupBy,
};
use rainfall_report::config::{AppConfig, ColumnConfig};
use rainfall_report::dashboard::Dashboard;
use rainfall_report::loader::{load_table, parse_table, LoadReport, TableCache};
use rainfall_report::slots::SlotSchedule;
use rainfall_report::types::RainfallTable;
use rainfall_report::{classify, reports, RainfallCategory, RainfallError};
use std::time::Duration;

fn parse(csv: &str) -> (RainfallTable, LoadReport) {
    parse_table(csv.as_bytes(), &ColumnConfig::default(), &SlotSchedule::default(), None)
        .expect("sheet should parse")
}

#[test]
fn daily_sheet_tiles() {
    let (table, report) = parse(
        "District,Taluka,Rain_Last_24_Hrs\n\
         D1,A,10.0\n\
         D1,B,0\n\
         D2,C,\n",
    );
    assert!(report.issues.is_empty());
    let totals = unit_totals(&table);

    assert_eq!(count_above(&totals, 5.0), 1);
    let avg = mean_total(&totals).unwrap();
    assert!((avg - 5.0).abs() < 1e-9);
    assert_eq!(classify(Some(avg)), RainfallCategory::Light);
}

#[test]
fn slot_sheet_sums_available_slots() {
    let (table, _) = parse("Taluka,06-08,08-10,10-12\nX,3.0,,5.0\n");
    let total = unit_total(&table, "X");
    assert_eq!(total, Some(8.0));
    assert_eq!(classify(total), RainfallCategory::Moderate);
}

#[test]
fn empty_sheet_has_nothing_to_rank() {
    let (table, _) = parse("");
    let totals = unit_totals(&table);
    assert!(top_n(&totals, None).is_empty());
    assert!(matches!(
        latest_available_slot(&to_long_form(&table), &SlotSchedule::default()),
        Err(RainfallError::NoDataAvailable)
    ));
}

#[test]
fn duplicate_rows_are_summed() {
    let (table, _) = parse("Taluka,06-08,08-10\nY,2.0,\nY,3.0,1.0\n");
    let long = to_long_form(&table);
    let first: Vec<f64> = long
        .iter()
        .filter(|r| r.unit_name == "Y" && r.slot.label == "06-08")
        .map(|r| r.value_mm)
        .collect();
    assert_eq!(first, vec![5.0]);
    assert_eq!(unit_total(&table, "Y"), Some(6.0));
}

#[test]
fn long_form_resums_to_explicit_totals() {
    let (table, _) = parse(
        "District,Taluka,06-08,08-10,Rain_Last_24_Hrs\n\
         Kutch,Bhuj,1.5,2.5,4.0\n\
         Kutch,Mandvi,,7.0,7.0\n",
    );
    let explicit = unit_totals(&table);
    let long = to_long_form(&table);
    for unit in &explicit {
        let resummed: f64 = long
            .iter()
            .filter(|r| r.unit_name == unit.unit_name)
            .map(|r| r.value_mm)
            .sum();
        assert!((resummed - unit.total_mm.unwrap()).abs() < 1e-9);
    }
}

#[test]
fn bad_cells_do_not_stop_aggregation() {
    let (table, report) = parse(
        "District,Taluka,Remarks,06-08,08-10\n\
         Surat,Olpad,ok,12,abc\n\
         Surat,Kamrej,ok,-4,20\n",
    );
    assert_eq!(report.malformed_values(), 2);
    assert_eq!(report.unknown_columns(), vec!["Remarks"]);
    assert_eq!(unit_total(&table, "Olpad"), Some(12.0));
    assert_eq!(unit_total(&table, "Kamrej"), Some(20.0));
}

#[test]
fn top_n_is_deterministic_across_calls() {
    let (table, _) = parse(
        "Taluka,Rain_Last_24_Hrs\nVapi,40\nAmreli,40\nBhuj,\nPardi,12\n",
    );
    let totals = unit_totals(&table);
    let first = top_n(&totals, Some(3));
    let second = top_n(&totals, Some(3));
    assert_eq!(first, second);
    let names: Vec<&str> = first.iter().map(|u| u.unit_name.as_str()).collect();
    assert_eq!(names, vec!["Amreli", "Vapi", "Pardi"]);
}

#[test]
fn dashboard_from_configured_sheet() {
    let cfg = AppConfig::from_toml(
        r#"
        [aliases]
        version = 1
        [aliases.names]
        Morvi = "Morbi"

        [zones]
        Morbi = "Saurashtra"
        Rajkot = "Saurashtra"
        Valsad = "South Gujarat"
        "#,
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master2hrs_2025-07-14.csv");
    std::fs::write(
        &path,
        "District,Taluka,06-08,08-10,00-02\n\
         Morvi,Morvi,1.0,2.0,\n\
         Rajkot,Gondal,0,0,0\n\
         Valsad,Vapi,30.0,45.5,80.0\n",
    )
    .unwrap();

    let mut cache = TableCache::new(Duration::from_secs(cfg.cache.ttl_secs));
    let (table, _) = cache
        .get_or_load(&path, |p| load_table(p, &cfg.columns, &cfg.slots, Some(&cfg.aliases)))
        .unwrap();
    assert_eq!(table.rows[0].unit_name, "Morbi");

    let d = Dashboard::build(&table, &cfg.slots, &GroupBy::Zone(&cfg.zones), cfg.report.threshold_mm);
    assert!(d.has_data());
    assert_eq!(d.latest_slot.as_ref().unwrap().label, "00-02");
    assert_eq!(d.units_above_threshold, 1);
    assert_eq!(d.zones.len(), 2);
    assert_eq!(d.summary.wettest_unit_label().as_deref(), Some("Vapi (Valsad)"));

    let ranking = reports::ranking_report(&d.totals, cfg.report.top_n);
    assert_eq!(ranking[0].unit, "Vapi");
    assert_eq!(ranking[0].total_mm, "155.5");
    assert_eq!(ranking[0].category, "Very Heavy");
    assert_eq!(ranking.len(), 3);
}
