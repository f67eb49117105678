//! Stats CLI command

use crate::error::Result;
use crate::storage::{config::Config, db::Database, stats};

/// 打印任务统计（JSON）
pub fn execute(config: &Config) -> Result<()> {
    let db = Database::open(&config.database_url()?, &config.database)?;
    db.migrate()?;

    let stats = db.unit_of_work_blocking(|tx| stats::get_stats(tx))?;
    let json = serde_json::to_string_pretty(&stats)?;
    println!("{}", json);
    Ok(())
}
