use callsign_rotation::assign::{backfill_assignments, order_for_slot, BackfillOptions};
use callsign_rotation::config::AssignConfig;
use callsign_rotation::display::{print_backfill_report, write_backfill_report};
use callsign_rotation::parser::{load_schedule_rows, write_schedule_rows};
use callsign_rotation::store::MemoryScheduleStore;

fn print_usage() {
    println!("Usage:");
    println!("  callsign-rotation order <date> <time> [band] [mode]");
    println!("      Preview the rotation order for one slot");
    println!("  callsign-rotation backfill <schedule.csv> [--commit] [--clear] [--out <file>]");
    println!("      Recompute assigned callsigns for historical rows (dry-run by default)");
    println!();
    println!("Config is read from $CALLSIGN_CONFIG or ./callsigns.json");
}

fn load_config() -> AssignConfig {
    let path = std::env::var("CALLSIGN_CONFIG").unwrap_or_else(|_| "callsigns.json".to_string());
    if std::path::Path::new(&path).exists() {
        match AssignConfig::load(&path) {
            Ok(config) => return config,
            Err(e) => eprintln!("Failed to load config {}: {}", path, e),
        }
    } else {
        eprintln!("No config file at {}, using defaults (empty pool)", path);
    }
    AssignConfig::default()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };

    let config = load_config();

    match command.as_str() {
        "order" => {
            let (Some(date), Some(time)) = (args.get(2), args.get(3)) else {
                print_usage();
                return Ok(());
            };
            let band = args.get(4).map(|s| s.as_str());
            let mode = args.get(5).map(|s| s.as_str());

            let order = order_for_slot(&config, date, time, mode, band)?;
            if order.is_empty() {
                println!("Pool is empty, nothing to rotate");
                return Ok(());
            }
            println!("Rotation order for {} {}:", date, time);
            for (i, call) in order.iter().enumerate() {
                println!("  {}. {}", i + 1, call);
            }
        }
        "backfill" => {
            let Some(csv_path) = args.get(2) else {
                print_usage();
                return Ok(());
            };
            let commit = args.iter().any(|a| a == "--commit");
            let clear = args.iter().any(|a| a == "--clear");
            let out_file = args
                .iter()
                .position(|a| a == "--out")
                .and_then(|i| args.get(i + 1));

            println!("Loading schedule rows from {}...", csv_path);
            let mut rows = load_schedule_rows(csv_path)?;
            println!("Loaded {} schedule rows", rows.len());

            if clear {
                // Recompute from scratch: forget every stored assignment.
                for row in rows.iter_mut() {
                    row.assigned_call = None;
                }
                println!("Cleared existing assignments");
            }

            let store = MemoryScheduleStore::new(rows.clone());
            let report = backfill_assignments(&config, &store, &rows, &BackfillOptions { commit })?;
            print_backfill_report(&report);

            if let Some(out_file) = out_file {
                if commit {
                    write_schedule_rows(out_file, &store.snapshot())?;
                    println!("\nUpdated schedule written to {}", out_file);
                } else {
                    write_backfill_report(&report, out_file)?;
                    println!("\nReport written to {}", out_file);
                }
            }
        }
        _ => print_usage(),
    }

    Ok(())
}
