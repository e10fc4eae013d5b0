use indicatif::{ProgressBar, ProgressStyle};
use mindsync_client::SupabaseClient;
use mindsync_config::MindsyncConfig;
use mindsync_core::REPLICATED_TABLES;
use mindsync_migrate::{PAGE_SIZE, copy_table};

/// Handle `msync migrate`: bulk-copy every replicated table in registry
/// order, fail-fast on the first error.
pub async fn handle(config: &MindsyncConfig) -> anyhow::Result<()> {
    let source = SupabaseClient::new(&config.source)?;
    let target = SupabaseClient::new(&config.target)?;

    let bar = ProgressBar::new(REPLICATED_TABLES.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut total_rows = 0u64;
    for table in REPLICATED_TABLES {
        bar.set_message(table);
        let copy = copy_table(&source, &target, table, PAGE_SIZE).await?;
        total_rows += copy.rows;
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "copied {total_rows} rows across {} tables",
        REPLICATED_TABLES.len()
    );
    Ok(())
}
