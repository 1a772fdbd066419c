//! Button interaction handlers.
//!
//! Two families of buttons exist: the panel's create-ticket button, and
//! one acknowledgment button per configured FAQ topic inside a ticket.
//! Topic buttons reply ephemerally with the FAQ text and drive the
//! unlock state machine as a side effect.

use crate::bot::Data;
use crate::config::content::Stage;
use crate::core::cooldown::{self, Gate};
use crate::core::tickets::Ack;
use crate::errors::Result;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use tracing::{error, warn};

/// Routes a component interaction by custom id.
pub async fn handle(
    ctx: &serenity::Context,
    interaction: &serenity::Interaction,
    data: &Data,
) -> Result<()> {
    let Some(component) = interaction.as_message_component() else {
        return Ok(());
    };
    match component.data.custom_id.as_str() {
        "create_ticket" => create_ticket(ctx, component, data).await,
        other => match other.strip_prefix("topic_") {
            Some(topic_id) => acknowledge_topic(ctx, component, data, topic_id).await,
            None => Ok(()),
        },
    }
}

/// Creates a ticket channel for the clicking user, unless their
/// cooldown is still running.
async fn create_ticket(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<()> {
    component
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let Some(guild_id) = component.guild_id else {
        return Ok(());
    };
    let user = &component.user;
    let now = Utc::now().timestamp_millis();

    let gate = { data.tickets.lock().await.cooldown_gate(user.id.get(), now) };
    if let Gate::Denied(remaining) = gate {
        component
            .edit_response(
                &ctx.http,
                serenity::EditInteractionResponse::new().content(format!(
                    "⏳ You already created a ticket recently. Try again in {}.",
                    cooldown::format_remaining(remaining)
                )),
            )
            .await?;
        return Ok(());
    }

    let settings = &data.settings;
    let gating = { data.tickets.lock().await.gating_enabled() };
    let bot_id = { ctx.cache.current_user().id };

    // Hidden from the guild, visible to the requester (send withheld
    // until the topics are read), full access for the bot and staff.
    let mut requester_allow = serenity::Permissions::VIEW_CHANNEL;
    let mut requester_deny = serenity::Permissions::SEND_MESSAGES;
    if !gating {
        requester_allow |= serenity::Permissions::SEND_MESSAGES;
        requester_deny = serenity::Permissions::empty();
    }
    let mut overwrites = vec![
        serenity::PermissionOverwrite {
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id.get())),
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL,
        },
        serenity::PermissionOverwrite {
            kind: serenity::PermissionOverwriteType::Member(user.id),
            allow: requester_allow,
            deny: requester_deny,
        },
        serenity::PermissionOverwrite {
            kind: serenity::PermissionOverwriteType::Member(bot_id),
            allow: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
            deny: serenity::Permissions::empty(),
        },
    ];
    for role in settings.staff_roles() {
        overwrites.push(serenity::PermissionOverwrite {
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(role)),
            allow: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
            deny: serenity::Permissions::empty(),
        });
    }

    let mut builder = serenity::CreateChannel::new(format!("ticket-{}", user.name))
        .kind(serenity::ChannelType::Text)
        .permissions(overwrites);
    if let Some(category) = settings.ticket_category {
        builder = builder.category(serenity::ChannelId::new(category));
    }

    let channel = match guild_id.create_channel(&ctx.http, builder).await {
        Ok(channel) => channel,
        Err(e) => {
            warn!("Error creating ticket for {}: {e}", user.name);
            component
                .edit_response(
                    &ctx.http,
                    serenity::EditInteractionResponse::new()
                        .content(format!("Failed to create ticket.\n**Reason:** {e}")),
                )
                .await?;
            return Ok(());
        }
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!("Hello {}", user.name))
        .description(if gating {
            "Welcome to support! Read through the topics below to unlock the chat, \
             or wait for a staff member."
        } else {
            "Welcome to support! Choose an option below to get instant help, \
             or wait for a staff member."
        })
        .color(0x0034_98DB);

    let mut message = serenity::CreateMessage::new()
        .content(format!("Hello <@{}> | Welcome to support!", user.id))
        .embed(embed);
    let buttons: Vec<_> = data
        .content
        .topics
        .iter()
        .map(|t| {
            serenity::CreateButton::new(format!("topic_{}", t.id))
                .label(t.label.clone())
                .style(serenity::ButtonStyle::Secondary)
        })
        .collect();
    if !buttons.is_empty() {
        message = message.components(vec![serenity::CreateActionRow::Buttons(buttons)]);
    }

    if let Err(e) = channel.id.send_message(&ctx.http, message).await {
        warn!("Failed to send ticket welcome in {}: {e}", channel.id);
    }

    if let Err(e) = {
        data.tickets
            .lock()
            .await
            .register_ticket(channel.id.get(), user.id.get(), now)
    } {
        error!("Failed to persist new ticket {}: {e}", channel.id);
    }

    component
        .edit_response(
            &ctx.http,
            serenity::EditInteractionResponse::new()
                .content(format!("Ticket created: <#{}>", channel.id)),
        )
        .await?;
    Ok(())
}

/// Shows the FAQ text for a topic and advances the unlock progress.
async fn acknowledge_topic(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
    topic_id: &str,
) -> Result<()> {
    component
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let Some(topic) = data.content.topic(topic_id) else {
        component
            .edit_response(
                &ctx.http,
                serenity::EditInteractionResponse::new()
                    .content("That topic is no longer configured."),
            )
            .await?;
        return Ok(());
    };

    component
        .edit_response(
            &ctx.http,
            serenity::EditInteractionResponse::new().content(topic.response.clone()),
        )
        .await?;

    let channel_id = component.channel_id;
    let outcome = {
        data.tickets
            .lock()
            .await
            .acknowledge_topic(channel_id.get(), topic_id)
    };
    match outcome {
        Ack::UnknownTopic | Ack::AlreadyUnlocked => {}
        Ack::Progress { done, total } => {
            let remaining = total - done;
            if let Err(e) = channel_id
                .say(
                    &ctx.http,
                    format!("📖 Progress: {done}/{total} topics read - {remaining} to go."),
                )
                .await
            {
                warn!("Failed to post progress notice in {channel_id}: {e}");
            }
        }
        Ack::Unlocked { next } => unlock(ctx, channel_id, data, next).await,
    }
    Ok(())
}

/// Grants the ticket owner send permission and announces the next step.
/// The channel may have been closed meanwhile; failures are logged only.
async fn unlock(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    data: &Data,
    next: Option<Stage>,
) {
    let owner = { data.tickets.lock().await.owner(channel_id.get()) };
    if let Some(owner) = owner {
        let overwrite = serenity::PermissionOverwrite {
            kind: serenity::PermissionOverwriteType::Member(serenity::UserId::new(owner)),
            allow: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
            deny: serenity::Permissions::empty(),
        };
        if let Err(e) = channel_id.create_permission(&ctx.http, overwrite).await {
            warn!("Failed to unlock chat in {channel_id}: {e}");
        }
    }

    let notice = match next {
        Some(Stage::Region) => {
            "✅ All topics read - chat unlocked! First, what region do you play in? \
             Type it below."
        }
        Some(Stage::Screenshot) => {
            "✅ All topics read - chat unlocked! Please post a screenshot of your \
             account stats."
        }
        None => "✅ All topics read - chat unlocked! A staff member will be with you shortly.",
    };
    if let Err(e) = channel_id.say(&ctx.http, notice).await {
        warn!("Failed to post unlock notice in {channel_id}: {e}");
    }
}
