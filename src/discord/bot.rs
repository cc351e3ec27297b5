//! Discord bot setup and event dispatch.
//!
//! Wires gateway events to the command handler and message rewriter, and
//! tracks connection health for the liveness endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};
use serenity::gateway::{ConnectionStage, ShardStageUpdateEvent};
use serenity::model::application::{Command, CommandInteraction, Interaction};
use serenity::model::channel::Message;
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::discord::commands::{self, CommandHandler};
use crate::discord::rewriter::MessageRewriter;
use crate::store::ReplacementStore;

/// Discord event handler.
pub struct Handler {
    commands: CommandHandler,
    rewriter: MessageRewriter,
    /// Shared with the liveness endpoint.
    connected: Arc<AtomicBool>,
}

impl Handler {
    pub fn new(store: Arc<ReplacementStore>, connected: Arc<AtomicBool>) -> Self {
        Self {
            commands: CommandHandler::new(store.clone()),
            rewriter: MessageRewriter::new(store),
            connected,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
        self.connected.store(true, Ordering::Relaxed);

        match Command::create_global_command(&ctx.http, commands::definition()).await {
            Ok(command) => info!("Registered command: {}", command.name),
            Err(e) => error!("Failed to register command: {}", e),
        }
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        self.connected.store(true, Ordering::Relaxed);
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        let connected = matches!(event.new, ConnectionStage::Connected);
        self.connected.store(connected, Ordering::Relaxed);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore our own messages
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        self.rewriter.handle_message(&ctx, &msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != commands::COMMAND_NAME {
            return;
        }
        let Some(guild_id) = command.guild_id else {
            return;
        };
        // Guild must be resolved in the cache before dispatch
        if ctx.cache.guild(guild_id).is_none() {
            debug!("Dropping interaction for unresolved guild {}", guild_id);
            return;
        }

        if let Err(e) = self.commands.dispatch(&ctx, &command, guild_id).await {
            error!("Command error: {}", e);
            deliver_error_reply(&ctx, &command).await;
        }
    }
}

/// Generic failure reply, as a followup if the response was already sent.
async fn deliver_error_reply(ctx: &Context, command: &CommandInteraction) {
    let content = "❌ An error occurred while processing the command.";

    let reply = CreateInteractionResponseMessage::new()
        .content(content)
        .ephemeral(true);
    if command
        .create_response(&ctx.http, CreateInteractionResponse::Message(reply))
        .await
        .is_err()
    {
        let followup = CreateInteractionResponseFollowup::new()
            .content(content)
            .ephemeral(true);
        if let Err(e) = command.create_followup(&ctx.http, followup).await {
            error!("Failed to deliver error reply: {}", e);
        }
    }
}

/// Create the Discord client with the gateway intents the bot needs.
pub async fn build_client(
    token: &str,
    store: Arc<ReplacementStore>,
    connected: Arc<AtomicBool>,
) -> Result<Client, serenity::Error> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    Client::builder(token, intents)
        .event_handler(Handler::new(store, connected))
        .await
}
