//! List equipment command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_equipment(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let items = store.list_equipment().await?;

    if items.is_empty() {
        println!("No equipment recorded.");
        store.close().await?;
        return Ok(());
    }

    println!("Equipment ({} total)", items.len());
    println!("{:-<70}", "");

    for item in items {
        println!("• {} [{}]", item.name, item.inventory_number);
        println!(
            "  Category: {} | Cabinet: {} | Added: {}",
            item.category, item.location, item.date_added
        );
        if let Some(by) = item.last_modified_by.as_deref() {
            println!("  Last modified by {} at {}", by, item.updated_at);
        }
    }

    store.close().await?;
    Ok(())
}
