//! User management commands for CLI.

use clap::Subcommand;
use timefinder_core::storage::Database;

#[derive(Subcommand)]
pub enum UserAction {
    /// Create or update a user
    Upsert {
        /// User key (OIDC sub)
        sub: String,
        /// Email address
        email: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Calendar provider access token
        #[arg(long)]
        token: Option<String>,
    },
    /// Show a user record
    Show {
        /// User key (OIDC sub)
        sub: String,
    },
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        UserAction::Upsert {
            sub,
            email,
            name,
            token,
        } => {
            db.upsert_user(&sub, &email, name.as_deref(), token.as_deref())?;
            println!("user upserted: {sub}");
        }
        UserAction::Show { sub } => match db.find_user(&sub)? {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => return Err(format!("user '{sub}' not found").into()),
        },
    }
    Ok(())
}
