//! Ticket desk slash commands - panel setup, announcements, and closing.
//!
//! All three commands are hidden behind the administrator permission in
//! Discord's own command metadata, and additionally checked in the
//! handler so a misconfigured guild cannot leak them to regular members.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, has_any_role},
        core::transcript,
        errors::Result,
    };
    use poise::serenity_prelude as serenity;
    use std::sync::Arc;
    use tracing::{error, info, warn};

    /// Seconds between the close announcement and channel deletion.
    const CLOSE_GRACE_SECS: u64 = 5;

    /// Whether the invoker may use the staff commands: administrator
    /// permission or the configured moderator role.
    async fn invoker_is_staff(ctx: &Context<'_>) -> bool {
        let mod_roles: Vec<u64> = ctx.data().settings.moderator_role.into_iter().collect();
        match ctx.author_member().await {
            Some(member) => {
                member.permissions.is_some_and(|p| p.administrator())
                    || has_any_role(&member.roles, &mod_roles)
            }
            None => false,
        }
    }

    async fn deny(ctx: &Context<'_>) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .content(
                    "⛔ Permission Denied: You must be an Administrator or a Moderator \
                     to use this command.",
                )
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Posts the ticket-creation panel.
    ///
    /// The panel goes to the configured panel channel when one is set,
    /// otherwise to the channel the command was invoked in.
    #[poise::command(
        slash_command,
        guild_only,
        rename = "setup-ticket",
        default_member_permissions = "ADMINISTRATOR"
    )]
    pub async fn setup_ticket(ctx: Context<'_>) -> Result<()> {
        if !invoker_is_staff(&ctx).await {
            return deny(&ctx).await;
        }
        ctx.defer_ephemeral().await?;

        let target = ctx
            .data()
            .settings
            .panel_channel
            .map_or_else(|| ctx.channel_id(), serenity::ChannelId::new);

        let embed = serenity::CreateEmbed::new()
            .title("tryout ticket")
            .description("Click the button below to create a ticket.")
            .color(0x0034_98DB);
        let row = serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new("create_ticket")
                .label("Create Ticket")
                .emoji('📩')
                .style(serenity::ButtonStyle::Secondary),
        ]);

        target
            .send_message(
                ctx,
                serenity::CreateMessage::new().embed(embed).components(vec![row]),
            )
            .await?;
        ctx.say("Ticket panel created!").await?;
        Ok(())
    }

    /// Broadcasts an announcement to a channel.
    #[poise::command(slash_command, guild_only, default_member_permissions = "ADMINISTRATOR")]
    pub async fn announce(
        ctx: Context<'_>,
        #[description = "The message to announce"] message: String,
        #[description = "Channel to send to (optional)"] channel: Option<serenity::ChannelId>,
    ) -> Result<()> {
        if !invoker_is_staff(&ctx).await {
            return deny(&ctx).await;
        }
        ctx.defer_ephemeral().await?;

        let target = channel.unwrap_or_else(|| ctx.channel_id());
        match target
            .say(ctx, format!("**Announcement**\n\n{message}"))
            .await
        {
            Ok(_) => {
                ctx.say("Announcement sent!").await?;
            }
            Err(e) => {
                ctx.say(format!("Failed to send announcement: {e}")).await?;
            }
        }
        Ok(())
    }

    /// Closes the current ticket after a short grace delay.
    ///
    /// Before deletion the most recent messages are rendered into a
    /// plain-text transcript and DMed to the ticket requester; failures
    /// there are logged, never surfaced.
    #[poise::command(slash_command, guild_only, default_member_permissions = "ADMINISTRATOR")]
    pub async fn close(ctx: Context<'_>) -> Result<()> {
        let authorized = match ctx.author_member().await {
            Some(member) => {
                member.permissions.is_some_and(|p| p.administrator())
                    || has_any_role(&member.roles, &ctx.data().settings.closing_roles())
            }
            None => false,
        };
        if !authorized {
            ctx.send(
                poise::CreateReply::default()
                    .content("⛔ Permission Denied: You are not allowed to close tickets.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }

        let channel_id = ctx.channel_id();
        let tracked = ctx.data().tickets.lock().await.is_tracked(channel_id.get());
        let guild_channel = channel_id.to_channel(ctx).await?.guild();
        // Channels created before tracking began are still closable by name.
        let looks_like_ticket = guild_channel
            .as_ref()
            .is_some_and(|c| c.name.starts_with("ticket-"));
        if !tracked && !looks_like_ticket {
            ctx.send(
                poise::CreateReply::default()
                    .content("This command can only be used in ticket channels.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }

        ctx.say(format!("Closing ticket in {CLOSE_GRACE_SECS} seconds..."))
            .await?;

        if let Some(channel) = guild_channel {
            if let Err(e) = deliver_transcript(&ctx, &channel).await {
                warn!("Could not deliver transcript for {}: {e}", channel.id);
            }
        }

        let http = Arc::clone(&ctx.serenity_context().http);
        let tickets = Arc::clone(&ctx.data().tickets);
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(CLOSE_GRACE_SECS)).await;
            if let Err(e) = channel_id.delete(&http).await {
                error!("Failed to delete ticket channel {channel_id}: {e}");
            }
            if let Err(e) = tickets.lock().await.end_ticket(channel_id.get()) {
                error!("Failed to purge ticket record {channel_id}: {e}");
            }
        });
        Ok(())
    }

    /// Renders the channel's recent history and DMs it to the requester.
    async fn deliver_transcript(
        ctx: &Context<'_>,
        channel: &serenity::GuildChannel,
    ) -> Result<()> {
        let bot_id = { ctx.serenity_context().cache.current_user().id };

        let members: Vec<u64> = channel
            .permission_overwrites
            .iter()
            .filter_map(|o| match o.kind {
                serenity::PermissionOverwriteType::Member(user_id) => Some(user_id.get()),
                _ => None,
            })
            .collect();
        let Some(requester) = transcript::requester(&members, bot_id.get()) else {
            info!("No requester found in {}; skipping transcript", channel.id);
            return Ok(());
        };

        let messages = channel
            .id
            .messages(
                ctx,
                serenity::GetMessages::new().limit(transcript::FETCH_LIMIT),
            )
            .await?;
        // The API returns newest first; transcripts read oldest first.
        let lines: Vec<transcript::Line> = messages
            .iter()
            .rev()
            .map(|m| transcript::Line {
                author: m.author.name.clone(),
                content: m.content.clone(),
                attachments: m.attachments.iter().map(|a| a.filename.clone()).collect(),
            })
            .collect();
        let text = transcript::render(&lines);

        let file = serenity::CreateAttachment::bytes(
            text.into_bytes(),
            format!("transcript-{}.txt", channel.name),
        );
        let dm = serenity::UserId::new(requester)
            .create_dm_channel(ctx)
            .await?;
        dm.id
            .send_message(
                ctx,
                serenity::CreateMessage::new()
                    .content("Here is the transcript of your closed ticket.")
                    .add_file(file),
            )
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
