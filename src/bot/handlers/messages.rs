//! Message handlers: activity tracking, the onboarding gates, and the
//! hidden cooldown reset.
//!
//! Every non-bot message in a tracked ticket refreshes its activity
//! timestamp. Messages in a gated channel are then offered to the
//! region and screenshot stages, which decide whether the message
//! counts, is ignored, or has to be removed.

use crate::bot::{Data, is_staff_author};
use crate::core::tickets::{RegionCapture, ScreenshotGate};
use crate::errors::Result;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, warn};

/// Seconds a gate warning stays visible before it removes itself.
const WARNING_TTL_SECS: u64 = 5;

/// Prefix of the hidden owner-only cooldown reset.
const RESET_PREFIX: &str = "!resetcooldown";

/// Handles one inbound message.
pub async fn handle(ctx: &serenity::Context, msg: &serenity::Message, data: &Data) -> Result<()> {
    if msg.author.bot {
        return Ok(());
    }

    if msg.content.starts_with(RESET_PREFIX) {
        return reset_cooldown(ctx, msg, data).await;
    }

    let channel = msg.channel_id.get();
    let now = Utc::now().timestamp_millis();

    if let Err(e) = { data.tickets.lock().await.record_activity(channel, now) } {
        error!("Failed to persist ticket activity for {channel}: {e}");
    }

    let staff = is_staff_author(&data.settings, msg.member.as_deref());

    let region_outcome = {
        data.tickets
            .lock()
            .await
            .capture_region(channel, &msg.content, staff)
    };
    match region_outcome {
        RegionCapture::AwaitScreenshot => {
            if let Err(e) = msg
                .channel_id
                .say(
                    &ctx.http,
                    "📍 Region recorded. Now post a screenshot of your account stats to finish.",
                )
                .await
            {
                warn!("Failed to post screenshot prompt in {channel}: {e}");
            }
            return Ok(());
        }
        RegionCapture::Completed { region } => {
            if let Err(e) = msg
                .channel_id
                .say(
                    &ctx.http,
                    format!(
                        "🎉 Verification complete! Region: **{region}**. \
                         A staff member will be with you shortly."
                    ),
                )
                .await
            {
                warn!("Failed to post completion notice in {channel}: {e}");
            }
            return Ok(());
        }
        RegionCapture::NotPending | RegionCapture::Ignored => {}
    }

    let gate = {
        data.tickets
            .lock()
            .await
            .screenshot_gate(channel, !msg.attachments.is_empty(), staff)
    };
    match gate {
        ScreenshotGate::Blocked => {
            if let Err(e) = msg.delete(&ctx.http).await {
                warn!("Failed to remove non-screenshot message in {channel}: {e}");
            }
            post_short_lived_warning(
                ctx,
                msg.channel_id,
                "⚠️ Please post a screenshot (image attachment) to continue.",
            )
            .await;
        }
        ScreenshotGate::Verified { region } => {
            let text = match region {
                Some(region) => format!(
                    "🎉 Verification complete! Region: **{region}**. \
                     A staff member will be with you shortly."
                ),
                None => {
                    "🎉 Verification complete! A staff member will be with you shortly."
                        .to_string()
                }
            };
            if let Err(e) = msg.channel_id.say(&ctx.http, text).await {
                warn!("Failed to post completion notice in {channel}: {e}");
            }
        }
        ScreenshotGate::NotPending | ScreenshotGate::Bypassed => {}
    }
    Ok(())
}

/// Posts a warning that deletes itself after a short delay.
async fn post_short_lived_warning(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    text: &str,
) {
    match channel_id.say(&ctx.http, text).await {
        Ok(warning) => {
            let http = Arc::clone(&ctx.http);
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_secs(WARNING_TTL_SECS)).await;
                if let Err(e) = warning.delete(&http).await {
                    warn!("Failed to remove gate warning: {e}");
                }
            });
        }
        Err(e) => warn!("Failed to post gate warning in {channel_id}: {e}"),
    }
}

/// The hidden `!resetcooldown <user>` command: only the configured owner
/// may use it, and the trigger message disappears no matter what.
async fn reset_cooldown(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<()> {
    let authorized = data
        .settings
        .owner_id
        .is_some_and(|owner| owner == msg.author.id.get());

    if authorized {
        if let Some(target) = parse_user_arg(&msg.content) {
            let removed = { data.tickets.lock().await.reset_cooldown(target) };
            let note = match removed {
                Ok(true) => format!("Cooldown reset for <@{target}>."),
                Ok(false) => format!("No cooldown recorded for <@{target}>."),
                Err(e) => {
                    error!("Failed to persist cooldown reset: {e}");
                    format!("Could not reset cooldown for <@{target}>.")
                }
            };
            if let Err(e) = msg
                .author
                .dm(&ctx.http, serenity::CreateMessage::new().content(note))
                .await
            {
                warn!("Failed to DM cooldown reset result: {e}");
            }
        }
    }

    if let Err(e) = msg.delete(&ctx.http).await {
        warn!("Failed to remove reset trigger: {e}");
    }
    Ok(())
}

/// Extracts the target user from `!resetcooldown <mention or id>`.
fn parse_user_arg(content: &str) -> Option<u64> {
    let arg = content.split_whitespace().nth(1)?;
    let digits = arg
        .trim_start_matches("<@")
        .trim_start_matches('!')
        .trim_end_matches('>');
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_ids_and_mentions() {
        assert_eq!(parse_user_arg("!resetcooldown 123456789012345678"), Some(123_456_789_012_345_678));
        assert_eq!(parse_user_arg("!resetcooldown <@123456789012345678>"), Some(123_456_789_012_345_678));
        assert_eq!(parse_user_arg("!resetcooldown <@!123456789012345678>"), Some(123_456_789_012_345_678));
    }

    #[test]
    fn rejects_missing_or_malformed_targets() {
        assert_eq!(parse_user_arg("!resetcooldown"), None);
        assert_eq!(parse_user_arg("!resetcooldown soon"), None);
        assert_eq!(parse_user_arg("!resetcooldown <@#123>"), None);
    }
}
