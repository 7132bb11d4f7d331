// Entry point and high-level CLI flow.
//
// - Option [1] loads the day's sheet (through the table cache) and prints
//   what had to be recovered while parsing.
// - Option [2] builds the dashboard views, writes the report files and
//   previews each one on the console.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
//
// `--batch` skips the menu and runs [1] then [2] once.
use chrono::{Local, NaiveDate};
use clap::Parser;
use rainfall_report::aggregate::GroupBy;
use rainfall_report::config::{AppConfig, DataKind};
use rainfall_report::dashboard::Dashboard;
use rainfall_report::error::RainfallError;
use rainfall_report::loader::{load_table, TableCache};
use rainfall_report::types::RainfallTable;
use rainfall_report::{observability, output, reports, util};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "rainfall_report", about = "Rainfall bulletin tiles and reports")]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reporting date (YYYY-MM-DD), defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long, value_enum)]
    kind: Option<DataKind>,

    /// Read this CSV instead of the dated sheet under the data directory.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Load and generate once, without the interactive menu.
    #[arg(long)]
    batch: bool,
}

// Everything the menu needs between choices. The cache keeps a loaded
// sheet for `cache.ttl_secs` so option [1] can be repeated cheaply.
struct Session {
    config: AppConfig,
    kind: DataKind,
    date: NaiveDate,
    path: PathBuf,
    cache: TableCache,
    data: Option<RainfallTable>,
}

/// One trimmed line from `input`, or `None` once it is closed or unreadable.
fn read_trimmed_line<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// Returns `None` when stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    read_trimmed_line(&mut io::stdin().lock())
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N` (or
/// stdin is closed).
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let Some(resp) = read_trimmed_line(&mut io::stdin().lock()) else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the sheet for the selected date.
///
/// Returns `false` when the sheet could not be loaded.
fn handle_load(session: &mut Session) -> bool {
    let Session { config, path, cache, .. } = session;
    let loaded = cache.get_or_load(path, |p| {
        load_table(p, &config.columns, &config.slots, Some(&config.aliases))
    });
    match loaded {
        Ok((table, load_report)) => {
            println!(
                "Processing {} for {}... ({} rows read, {} units loaded)",
                session.kind.title(),
                session.date.format("%Y-%m-%d"),
                util::format_int(load_report.total_rows),
                util::format_int(load_report.loaded_rows)
            );
            if load_report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped (no unit name).",
                    util::format_int(load_report.skipped_rows)
                );
            }
            let malformed = load_report.malformed_values();
            if malformed > 0 {
                println!(
                    "Note: {} cells could not be read and were treated as missing.",
                    util::format_int(malformed)
                );
            }
            let unknown = load_report.unknown_columns();
            if !unknown.is_empty() {
                println!("Info: Ignored columns: {}", unknown.join(", "));
            }
            println!();
            session.data = Some(table);
            true
        }
        Err(e) => {
            error!(path = %session.path.display(), error = %e, "failed to load sheet");
            eprintln!("Failed to load file: {}\n", e);
            false
        }
    }
}

fn print_tiles(dashboard: &Dashboard) {
    let s = &dashboard.summary;
    println!(
        "State Avg Rainfall: {} mm ({})",
        util::format_mm(s.state_avg_mm),
        s.state_category
    );
    if let (Some(label), Some(unit)) = (s.wettest_unit_label(), &s.wettest_unit) {
        println!("Max Rainfall (Unit): {} {} mm", label, util::format_mm(Some(unit.total_mm)));
    }
    if let Some(group) = &s.wettest_group {
        println!("Top Group (Avg): {} {} mm", group.group, util::format_mm(Some(group.mean_mm)));
    }
    println!(
        "Units > State Avg: {}% ({} / {})",
        util::format_number(s.percent_above_avg, 1),
        s.units_above_avg,
        s.reporting_units
    );
    println!(
        "Units > {} mm: {}",
        util::format_number(dashboard.threshold_mm, 1),
        dashboard.units_above_threshold
    );
    if let Some(slot) = &s.latest_slot {
        println!("Latest slot with data: {}", slot);
    }
    println!();
}

/// Handle option [2]: build every view, write the report files and preview
/// them.
fn handle_generate_reports(session: &Session) -> Result<(), RainfallError> {
    let Some(table) = &session.data else {
        println!("Error: No data loaded. Please load the sheet first (option 1).\n");
        return Ok(());
    };
    let cfg = &session.config;
    let dashboard = Dashboard::build(
        table,
        &cfg.slots,
        &GroupBy::Zone(&cfg.zones),
        cfg.report.threshold_mm,
    );
    if !dashboard.has_data() {
        println!("No data available for this date.\n");
        return Ok(());
    }

    let out_dir = &cfg.report.output_dir;
    std::fs::create_dir_all(out_dir)?;
    let preview = cfg.report.preview_rows;
    println!("Generating reports...");
    println!("Outputs saved to {}\n", out_dir.display());

    print_tiles(&dashboard);

    let r1 = reports::unit_total_report(&dashboard.totals);
    let file1 = out_dir.join("unit_totals.csv");
    output::write_csv(&file1, &r1)?;
    println!("Report 1: Rainfall by Unit\n");
    output::preview_table_rows(&r1, preview);
    println!("(Full table exported to {})\n", file1.display());

    let r2 = reports::group_mean_report(&dashboard.groups);
    let file2 = out_dir.join("group_means.csv");
    output::write_csv(&file2, &r2)?;
    println!("Report 2: Average Rainfall by Group\n");
    output::preview_table_rows(&r2, preview);
    println!("(Full table exported to {})\n", file2.display());

    if !dashboard.zones.is_empty() {
        let rz = reports::group_mean_report(&dashboard.zones);
        let file = out_dir.join("zone_means.csv");
        output::write_csv(&file, &rz)?;
        println!("Report 2b: Average Rainfall by Zone\n");
        output::preview_table_rows(&rz, preview);
        println!("(Full table exported to {})\n", file.display());
    }

    let r3 = reports::ranking_report(&dashboard.totals, cfg.report.top_n);
    let file3 = out_dir.join("top_units.csv");
    output::write_csv(&file3, &r3)?;
    println!("Report 3: Top {} Units by Rainfall\n", cfg.report.top_n);
    output::preview_table_rows(&r3, preview);
    println!("(Full table exported to {})\n", file3.display());

    if !dashboard.slots.is_empty() {
        let r4 = reports::slot_report(&dashboard.slots);
        let file4 = out_dir.join("slot_summary.csv");
        output::write_csv(&file4, &r4)?;
        println!("Report 4: Rainfall by Time Slot\n");
        output::preview_table_rows(&r4, r4.len());
        println!("(Full table exported to {})\n", file4.display());
    }

    let legend = reports::legend_report(&dashboard.totals);
    let legend_file = out_dir.join("legend.csv");
    output::write_csv(&legend_file, &legend)?;
    println!("Category Legend\n");
    output::preview_table_rows(&legend, legend.len());

    let summary_file = out_dir.join("summary.json");
    output::write_json(&summary_file, &dashboard.summary)?;
    println!("Summary Stats ({}) written.\n", summary_file.display());
    info!(units = dashboard.totals.len(), dir = %out_dir.display(), "reports generated");
    Ok(())
}

fn generate(session: &Session) -> bool {
    match handle_generate_reports(session) {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "report generation failed");
            eprintln!("Write error: {}", e);
            false
        }
    }
}

fn main() {
    observability::init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to read config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };
    let kind = args.kind.unwrap_or(config.data.kind);
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let path = args
        .file
        .clone()
        .unwrap_or_else(|| config.data.sheet_path(kind, date));
    let cache = TableCache::new(Duration::from_secs(config.cache.ttl_secs));
    let mut session = Session { config, kind, date, path, cache, data: None };

    if args.batch {
        if !handle_load(&mut session) || !generate(&session) {
            std::process::exit(1);
        }
        return;
    }

    loop {
        println!("Rainfall Dashboard: {} ({})", session.kind.title(), session.date);
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice() else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => {
                handle_load(&mut session);
            }
            "2" => {
                println!();
                generate(&session);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
