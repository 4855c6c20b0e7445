//! Concentration window commands for CLI.

use clap::Subcommand;
use timefinder_core::interval::parse_wall_clock;
use timefinder_core::storage::Database;

#[derive(Subcommand)]
pub enum FocusAction {
    /// Set the daily concentration window
    Set {
        /// User key (OIDC sub)
        sub: String,
        /// Window start, HH:MM
        start: String,
        /// Window end, HH:MM
        end: String,
    },
    /// Show the concentration window
    Show {
        /// User key (OIDC sub)
        sub: String,
    },
}

pub fn run(action: FocusAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        FocusAction::Set { sub, start, end } => {
            // Validate wall-clock syntax before persisting.
            let parsed_start = parse_wall_clock(&start)?;
            let parsed_end = parse_wall_clock(&end)?;
            if parsed_start >= parsed_end {
                return Err(format!("window end {end} must be after start {start}").into());
            }

            db.set_concentration_window(&sub, &start, &end)?;
            println!("concentration window set: {start}-{end}");
        }
        FocusAction::Show { sub } => {
            let user = db
                .find_user(&sub)?
                .ok_or_else(|| format!("user '{sub}' not found"))?;
            match user.concentration_window {
                Some((start, end)) => println!("{start}-{end}"),
                None => println!("no concentration window set"),
            }
        }
    }
    Ok(())
}
