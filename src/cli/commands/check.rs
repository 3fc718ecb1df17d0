use crate::config::Config;
use crate::db::Store;
use tracing::info;

/// Opens the store (which applies migrations) and runs `SELECT 1`.
pub async fn cmd_check(config: &Config) -> anyhow::Result<()> {
    info!("Running storage check...");

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    store.ping().await?;

    let equipment = store.list_equipment().await?.len();
    let history = store.list_history().await?.len();
    println!("✓ Database reachable: {}", config.general.database_path);
    println!("  {equipment} equipment units, {history} history entries");

    store.close().await?;
    info!("Check complete");
    Ok(())
}
