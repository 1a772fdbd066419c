//! Gateway event dispatch.
//!
//! Everything that is not a slash command arrives here: button clicks,
//! plain messages (activity tracking and the onboarding gates), and
//! member joins.

/// Button interaction handlers (ticket creation, topic acknowledgment)
pub mod interactions;
/// Message handlers (activity, region capture, screenshot gate, hidden reset)
pub mod messages;

use crate::bot::{Data, Error};
use crate::errors::Result;
use poise::serenity_prelude as serenity;
use tracing::warn;

/// Routes gateway events to their handlers.
pub async fn dispatch(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<()> {
    match event {
        serenity::FullEvent::InteractionCreate { interaction } => {
            interactions::handle(ctx, interaction, data).await
        }
        serenity::FullEvent::Message { new_message } => {
            messages::handle(ctx, new_message, data).await
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            welcome(ctx, new_member, data).await;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Greets a new member in the configured welcome channel.
async fn welcome(ctx: &serenity::Context, member: &serenity::Member, data: &Data) {
    let Some(channel) = data.settings.welcome_channel else {
        return;
    };
    let Some(template) = data.content.welcome.message.as_deref() else {
        return;
    };

    let mut text = template.replace("{user}", &format!("<@{}>", member.user.id));
    if let Some(rules) = data.settings.rules_channel {
        text = text.replace("{rules}", &format!("<#{rules}>"));
    }
    if let Some(giveaway) = data.settings.giveaway_channel {
        text = text.replace("{giveaway}", &format!("<#{giveaway}>"));
    }

    if let Err(e) = serenity::ChannelId::new(channel).say(&ctx.http, text).await {
        warn!("Failed to send welcome message: {e}");
    }
}
