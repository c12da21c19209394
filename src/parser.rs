use csv::Reader;
use std::path::Path;

use crate::assign::slot_clock::canonical_slot;
use crate::store::ScheduleRow;

/// Loads schedule rows from a CSV export of the schedule table.
///
/// Columns are found by header name (date, time, operator, band, mode,
/// assigned call) with positional fallbacks, so dumps from different
/// tools still load. Rows missing a date, time, or operator are skipped,
/// as are rows whose slot does not parse.
pub fn load_schedule_rows<P: AsRef<Path>>(
    csv_path: P,
) -> Result<Vec<ScheduleRow>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(csv_path)?;

    // Find column indices
    let headers = reader.headers()?;
    let find = |needle: &str| {
        headers
            .iter()
            .position(|h| h.to_lowercase().contains(needle))
    };
    let date_col = find("date").unwrap_or(0);
    let time_col = find("time").unwrap_or(1);
    let operator_col = headers
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            (h.contains("operator") || h.contains("callsign")) && !h.contains("assigned")
        })
        .unwrap_or(2);
    let band_col = find("band").unwrap_or(3);
    let mode_col = find("mode").unwrap_or(4);
    let assigned_col = find("assigned").unwrap_or(5);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        let date = record.get(date_col).unwrap_or("").trim().to_string();
        let time = record.get(time_col).unwrap_or("").trim().to_string();
        let operator = record.get(operator_col).unwrap_or("").trim().to_uppercase();

        // Skip if essential fields are missing
        if date.is_empty() || time.is_empty() || operator.is_empty() {
            continue;
        }
        let (date, time) = match canonical_slot(&date, &time) {
            Ok(slot) => slot,
            Err(e) => {
                tracing::warn!(error = %e, "skipping CSV row with unparseable slot");
                continue;
            }
        };

        let band = record.get(band_col).unwrap_or("").trim().to_string();
        let mode = record.get(mode_col).unwrap_or("").trim().to_string();
        let assigned = record.get(assigned_col).unwrap_or("").trim().to_uppercase();

        rows.push(ScheduleRow {
            date,
            time,
            operator,
            band,
            mode,
            assigned_call: if assigned.is_empty() {
                None
            } else {
                Some(assigned)
            },
        });
    }

    Ok(rows)
}

/// Writes schedule rows back out as CSV, assigned calls included.
pub fn write_schedule_rows<P: AsRef<Path>>(
    csv_path: P,
    rows: &[ScheduleRow],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(csv_path)?;
    wtr.write_record(["date", "time", "operator", "band", "mode", "assigned_call"])?;
    for row in rows {
        wtr.write_record([
            row.date.as_str(),
            row.time.as_str(),
            row.operator.as_str(),
            row.band.as_str(),
            row.mode.as_str(),
            row.assigned_call.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
