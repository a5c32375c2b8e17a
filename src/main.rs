use tracing::{info, warn};

use slotguard::config::{self, Venue};
use slotguard::model::{Hour, Weekday};
use slotguard::selection::{Selection, SelectionState};

const USAGE: &str = "usage: slotguard <day> <mark>... [confirm]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let catalog = std::env::var("SLOTGUARD_CATALOG").unwrap_or_else(|_| "./catalog.json".into());
    let option_id = std::env::var("SLOTGUARD_OPTION").ok();
    let bookings_path = std::env::var("SLOTGUARD_BOOKINGS").ok();
    let days_ahead: Option<u32> = std::env::var("SLOTGUARD_DAYS_AHEAD")
        .ok()
        .and_then(|s| s.parse().ok());

    let mut args = std::env::args().skip(1);
    let day: Weekday = args.next().ok_or(USAGE)?.parse()?;

    let venue = Venue::load(&catalog)?;
    let option = match option_id.as_deref() {
        Some(id) => venue.option(id)?,
        None => venue.options.first().ok_or("catalog has no booking options")?,
    };
    let existing = match bookings_path.as_deref() {
        Some(path) => config::load_bookings(path)?,
        None => Vec::new(),
    };

    info!("option: {} ({})", option.title, option.id);
    info!("  day: {day}, open {}", venue.opening_hours);
    info!("  existing bookings: {}", existing.len());
    info!(
        "  days ahead: {}",
        days_ahead.map_or("unknown".to_string(), |d| d.to_string())
    );

    let plan = venue.day_plan(option, day, days_ahead, &existing)?;
    let mut selection = Selection::new(plan);

    for arg in args {
        if arg == "confirm" {
            match selection.confirm() {
                Ok(slot) => println!("confirmed {slot}"),
                Err(e) => {
                    warn!("confirmation rejected: {e}");
                    println!("rejected: {e}");
                    std::process::exit(1);
                }
            }
            continue;
        }
        let mark: Hour = arg.parse().map_err(|_| format!("not an hour mark: {arg}\n{USAGE}"))?;
        let state = selection.click(mark).clone();
        match state {
            SelectionState::Empty => println!("{mark}: selection cleared"),
            SelectionState::Valid => println!("{mark}: ok {:?}", selection.marks()),
            SelectionState::Invalid(e) => println!("{mark}: {e}"),
            SelectionState::Confirmed => println!("{mark}: confirmed"),
        }
    }

    Ok(())
}
