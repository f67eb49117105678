//! Schema migration CLI command

use crate::error::Result;
use crate::storage::{config::Config, db::Database, schema};

/// Apply pending migrations, or only report them with `dry_run`
pub fn execute(config: &Config, dry_run: bool) -> Result<()> {
    let url = config.database_url()?;
    let db = Database::open(&url, &config.database)?;

    if dry_run {
        let conn = db.conn()?;
        let current = schema::current_version(&conn)?;
        let latest = schema::latest_version();
        if current >= latest {
            println!("{}: schema is up to date (v{})", url, current);
        } else {
            println!(
                "{}: would migrate schema v{} → v{} [dry run]",
                url, current, latest
            );
        }
        return Ok(());
    }

    let applied = db.migrate()?;
    if applied == 0 {
        println!("{}: schema is up to date (v{})", url, schema::latest_version());
    } else {
        println!(
            "{}: applied {} migration(s), now at v{}",
            url,
            applied,
            schema::latest_version()
        );
    }
    Ok(())
}
