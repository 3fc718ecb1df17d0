use crate::config::Config;
use crate::db::Store;

pub async fn cmd_history(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let entries = store.recent_history(limit).await?;

    if entries.is_empty() {
        println!("No equipment history.");
        store.close().await?;
        return Ok(());
    }

    println!("Recent Changes (last {}):", entries.len());
    println!("{:-<70}", "");

    for entry in entries {
        println!(
            "• [{}] {} ({})",
            entry.action, entry.equipment_name, entry.equipment_inventory_number
        );
        println!("  {}", entry.details);
        println!("  By: {} | {}", entry.changed_by, entry.changed_at);
    }

    store.close().await?;
    Ok(())
}
