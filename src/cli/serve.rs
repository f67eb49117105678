//! Web server CLI command

use crate::api::{self, state::AppState};
use crate::error::Result;
use crate::storage::{config::Config, db::Database};

/// Open the database, migrate it, and serve the API until shutdown
pub async fn execute(config: &Config) -> Result<()> {
    let url = config.database_url()?;
    let db = Database::open(&url, &config.database)?;
    db.migrate()?;

    if config.cors.allows_any() {
        tracing::warn!("CORS allows any origin");
    }

    let app = api::create_router(AppState::new(db), &config.cors);
    api::start_server(&config.server, app).await?;
    Ok(())
}
