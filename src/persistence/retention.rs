//! Retention service for time-based template purge.
//!
//! Runs as a background task deleting rejected templates whose review is
//! older than `retention_days`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::template_repo::TemplateRepo;
use crate::Result;

const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Spawn the retention purge background task.
///
/// The task runs hourly. A `retention_days` of 0 disables purging.
#[must_use]
pub fn spawn_retention_task(
    repo: Arc<TemplateRepo>,
    retention_days: u32,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if retention_days == 0 {
            info!("template retention disabled");
            return;
        }
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("retention task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = purge(&repo, retention_days).await {
                        error!(?err, "retention purge failed");
                    }
                }
            }
        }
    })
}

/// Delete rejected templates reviewed more than `retention_days` ago.
///
/// # Errors
///
/// Returns `AppError::Db` if the delete fails.
pub async fn purge(repo: &TemplateRepo, retention_days: u32) -> Result<u64> {
    let cutoff = Utc::now() - chrono::Duration::days(i64::from(retention_days));
    let purged = repo.purge_rejected_before(cutoff).await?;
    info!(retention_days, purged, "retention purge completed");
    Ok(purged)
}
