//! Hourly inactive-ticket sweep.
//!
//! A scheduled job walks the tracked tickets and force-closes any that
//! sat idle past the threshold. Channels are processed independently:
//! one failed deletion is logged and retried on the next sweep, and a
//! record whose channel no longer exists is dropped on the spot.

use crate::core::tickets::TicketController;
use crate::errors::Result;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Starts the hourly sweep over tracked tickets.
pub async fn start(
    http: Arc<serenity::Http>,
    tickets: Arc<Mutex<TicketController>>,
    idle_hours: i64,
) -> Result<()> {
    let scheduler = JobScheduler::new().await?;

    let job_http = Arc::clone(&http);
    let job_tickets = Arc::clone(&tickets);

    // Top of every hour.
    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let http = Arc::clone(&job_http);
        let tickets = Arc::clone(&job_tickets);
        Box::pin(async move {
            sweep(&http, &tickets, idle_hours).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Inactive ticket sweep scheduled (hourly, {idle_hours}h threshold)");
    Ok(())
}

async fn sweep(
    http: &Arc<serenity::Http>,
    tickets: &Arc<Mutex<TicketController>>,
    idle_hours: i64,
) {
    info!("Running inactive ticket check...");
    let now = Utc::now().timestamp_millis();
    let stale = { tickets.lock().await.expired_tickets(now) };

    for channel in stale {
        let channel_id = serenity::ChannelId::new(channel);
        match http.get_channel(channel_id).await {
            Ok(_) => {
                if let Err(e) = channel_id
                    .say(http, format!("Ticket closed due to inactivity ({idle_hours}h)."))
                    .await
                {
                    error!("Failed to post closure notice in {channel_id}: {e}");
                }
                if let Err(e) = channel_id.delete(http).await {
                    error!("Failed to close ticket {channel_id}: {e}");
                    // Record kept; the next sweep tries again.
                    continue;
                }
                purge(tickets, channel).await;
            }
            Err(_) => {
                // The channel vanished outside our control; drop the record.
                purge(tickets, channel).await;
            }
        }
    }
}

async fn purge(tickets: &Arc<Mutex<TicketController>>, channel: u64) {
    if let Err(e) = tickets.lock().await.end_ticket(channel) {
        error!("Failed to purge ticket record {channel}: {e}");
    }
}
