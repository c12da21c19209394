use std::fs::File;
use std::io::Write;

use crate::assign::types::{BackfillReport, RowAssignment};

/// Formats a band/mode pair as a bracketed tag, e.g. "[20m CW]".
pub fn format_slot_tag(band: &str, mode: &str) -> String {
    match (band.is_empty(), mode.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("[{}]", band),
        (true, false) => format!("[{}]", mode),
        (false, false) => format!("[{} {}]", band, mode),
    }
}

fn format_report_line(row: &RowAssignment) -> String {
    let tag = format_slot_tag(&row.band, &row.mode);
    let call = row.assigned_call.as_deref().unwrap_or("[NONE]");
    let kept = if row.kept_existing { " (kept)" } else { "" };
    format!(
        "{} {} {} {} -> {}{}",
        row.date, row.time, tag, row.operator, call, kept
    )
}

/// Prints a backfill report in a readable format
pub fn print_backfill_report(report: &BackfillReport) {
    let mode = if report.committed { "commit" } else { "dry-run" };
    println!("\n=== Callsign Backfill ({}) ===", mode);
    println!(
        "Assigned: {}  Kept: {}  Unassigned: {}  Skipped: {}",
        report.assigned, report.kept, report.unassigned, report.skipped
    );
    if report.conflicts_retried > 0 {
        println!("Conflicts retried: {}", report.conflicts_retried);
    }

    if report.unassigned > 0 {
        println!("\n⚠️  Slots with no callsign left:");
        for row in report.rows.iter().filter(|r| r.assigned_call.is_none()) {
            println!("  - {}", format_report_line(row));
        }
    }

    println!("\nAssignments by slot:");
    for row in &report.rows {
        println!("  {}", format_report_line(row));
    }
}

/// Writes a backfill report to a file, one row per line
pub fn write_backfill_report(
    report: &BackfillReport,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    let mode = if report.committed { "commit" } else { "dry-run" };
    writeln!(file, "** Callsign Backfill ({}) **", mode)?;
    for row in &report.rows {
        writeln!(file, "{}", format_report_line(row))?;
    }

    Ok(())
}
