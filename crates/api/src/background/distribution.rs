//! Daily scheduled distribution run.
//!
//! Ticks hourly and fires one `schedule` run per UTC day once the configured
//! hour has passed. The run ledger is the dedup state, so a restart after
//! today's run already happened does not fire a second one, and a service
//! that was down at the configured hour catches up on the next tick.

use std::time::Duration;

use chrono::{Timelike, Utc};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use lockdesk_db::repositories::DistributionRepo;
use lockdesk_provisioning::{DistributionRunner, RunTrigger};

/// How often the scheduler checks whether today's run is due.
const TICK_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the distribution scheduling loop until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    runner: DistributionRunner,
    distribution_hour: u32,
    cancel: CancellationToken,
) {
    tracing::info!(
        distribution_hour,
        tick_secs = TICK_INTERVAL.as_secs(),
        "Distribution scheduler started"
    );

    let mut interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Distribution scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = tick(&pool, &runner, distribution_hour).await {
                    tracing::error!(error = %e, "Distribution scheduler tick failed");
                }
            }
        }
    }
}

/// Fire today's run if it is due and has not happened yet.
async fn tick(
    pool: &PgPool,
    runner: &DistributionRunner,
    distribution_hour: u32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let now = Utc::now();
    if now.hour() < distribution_hour {
        return Ok(());
    }

    let today = now.date_naive();
    if DistributionRepo::scheduled_run_exists(pool, today).await? {
        tracing::debug!(%today, "Distribution run already recorded for today");
        return Ok(());
    }

    tracing::info!(%today, "Starting scheduled distribution run");
    let run = runner.execute_for_date(RunTrigger::Schedule, today).await?;
    tracing::info!(
        run_id = run.id,
        total = run.total,
        provisioned = run.provisioned,
        skipped = run.skipped,
        failed = run.failed,
        "Scheduled distribution run finished"
    );
    Ok(())
}
