//! Bot layer - Discord-specific interface and event handlers
//!
//! This module wires the ticket state machine to the gateway: slash
//! commands, button and message handlers, the shared bot context, and
//! the scheduled inactivity sweep.

/// Slash command implementations (setup-ticket, announce, close)
pub mod commands;
/// Gateway event dispatch (buttons, messages, member joins)
pub mod handlers;
/// Hourly inactive-ticket sweep
pub mod reaper;

use crate::config::{content::Content, settings::Settings};
use crate::core::tickets::TicketController;
use crate::errors;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared data available to all commands and event handlers.
pub struct Data {
    /// Settings resolved from the environment.
    pub settings: Arc<Settings>,
    /// Onboarding content (topics, stages, templates).
    pub content: Arc<Content>,
    /// The ticket state machine. One lock around all map mutation keeps
    /// the event handlers and the hourly sweep serialized, matching the
    /// single-threaded event delivery the design assumes.
    pub tickets: Arc<Mutex<TicketController>>,
}

pub(crate) type Error = errors::Error;
pub(crate) type Context<'a> = poise::Context<'a, Data, Error>;

/// Whether any of `roles` appears in the `wanted` id list.
pub(crate) fn has_any_role(roles: &[serenity::RoleId], wanted: &[u64]) -> bool {
    roles.iter().any(|role| wanted.contains(&role.get()))
}

/// Whether a message author counts as staff (administrator permission or
/// any configured staff role). Staff bypass the onboarding gates.
pub(crate) fn is_staff_author(
    settings: &Settings,
    member: Option<&serenity::PartialMember>,
) -> bool {
    member.is_some_and(|m| {
        m.permissions.is_some_and(|p| p.administrator())
            || has_any_role(&m.roles, &settings.staff_roles())
    })
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            panic!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                tracing::error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the client until it stops.
pub async fn run_bot(
    token: String,
    settings: Arc<Settings>,
    content: Arc<Content>,
    controller: TicketController,
) -> errors::Result<()> {
    let tickets = Arc::new(Mutex::new(controller));
    let data = Data {
        settings: Arc::clone(&settings),
        content: Arc::clone(&content),
        tickets: Arc::clone(&tickets),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::setup_ticket(),
                commands::announce(),
                commands::close(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::dispatch(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = settings.guild_id {
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        serenity::GuildId::new(guild_id),
                    )
                    .await?;
                    info!("Registered commands in guild {guild_id}");
                } else {
                    poise::builtins::register_globally(ctx, &framework.options().commands)
                        .await?;
                    info!("Registered commands globally");
                }

                if let Some(text) = content.presence.playing.as_deref() {
                    ctx.set_activity(Some(serenity::ActivityData::playing(text)));
                }

                reaper::start(
                    Arc::clone(&ctx.http),
                    Arc::clone(&tickets),
                    settings.idle_hours,
                )
                .await?;

                Ok(data)
            })
        })
        .build();

    // The member and message-content intents feed the welcome handler
    // and the onboarding gates.
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await;

    match client {
        Ok(mut c) => {
            info!("Starting bot client...");
            if let Err(why) = c.start().await {
                tracing::error!("Client error: {why:?}");
                return Err(why.into());
            }
        }
        Err(e) => {
            tracing::error!("Error creating client: {e:?}");
            return Err(e.into());
        }
    }
    Ok(())
}
