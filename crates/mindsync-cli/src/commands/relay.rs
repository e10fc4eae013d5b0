use mindsync_config::MindsyncConfig;
use tokio::sync::watch;
use tracing::info;

/// Handle `msync relay`: run the change relay until ctrl-c, then report
/// what was applied and what was dropped.
pub async fn handle(config: &MindsyncConfig) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, draining in-flight writes");
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = mindsync_relay::run_relay(config, shutdown_rx).await?;

    for (table, totals) in &summary.per_table {
        println!(
            "{table}: applied {}, dropped {}",
            totals.applied, totals.dropped
        );
    }
    println!(
        "relay stopped: {} applied, {} dropped",
        summary.applied(),
        summary.dropped()
    );
    Ok(())
}
