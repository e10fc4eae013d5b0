use mindsync_config::MindsyncConfig;
use tracing::debug;

use crate::cli::VerifyArgs;

/// Handle `msync verify`: exact `verified` on stdout and exit 0 only when
/// every table count matches and the CDN sample passes; any failure
/// propagates to stderr with exit 1.
pub async fn handle(config: &MindsyncConfig, args: &VerifyArgs) -> anyhow::Result<()> {
    let mut config = config.clone();
    config.verify.accumulate = config.verify.accumulate || args.accumulate;

    let report = mindsync_verify::run_verify(&config).await?;
    debug!(
        tables = report.checks.len(),
        cdn_sampled = report.cdn.sampled,
        verified_at = %report.verified_at,
        "verification finished"
    );

    println!("verified");
    Ok(())
}
