//! The `/correct` slash command.
//!
//! Three guild-scoped subcommands manage replacement rules: `add`, `rm`
//! and `ls`. All replies are ephemeral.

use std::sync::Arc;

use anyhow::Context as _;
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{
    CommandInteraction, CommandOptionType, ResolvedOption, ResolvedValue,
};
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::*;
use tracing::info;

use crate::store::{ReplacementStore, RuleSet};

pub const COMMAND_NAME: &str = "correct";

/// Build the command definition for registration.
pub fn definition() -> CreateCommand {
    CreateCommand::new(COMMAND_NAME)
        .description("Manage mention replacements")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "add",
                "Add a mention replacement",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::User,
                    "target",
                    "User whose mentions should be replaced",
                )
                .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "replacement",
                    "Text to replace mentions with",
                )
                .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "rm",
                "Remove a mention replacement",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "target", "User to stop replacing")
                    .required(true),
            ),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "ls",
            "List all configured replacements",
        ))
}

/// Command handler for the replacement rule surface.
pub struct CommandHandler {
    store: Arc<ReplacementStore>,
}

impl CommandHandler {
    pub fn new(store: Arc<ReplacementStore>) -> Self {
        Self { store }
    }

    /// Dispatch one `/correct` invocation to its subcommand.
    pub async fn dispatch(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        guild_id: GuildId,
    ) -> anyhow::Result<()> {
        let options = command.data.options();
        let Some(sub) = options.first() else {
            return Ok(());
        };
        let ResolvedValue::SubCommand(ref args) = sub.value else {
            return Ok(());
        };

        match sub.name {
            "add" => self.handle_add(ctx, command, guild_id, args).await,
            "rm" => self.handle_remove(ctx, command, guild_id, args).await,
            "ls" => self.handle_list(ctx, command, guild_id).await,
            _ => Ok(()),
        }
    }

    async fn handle_add(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        guild_id: GuildId,
        args: &[ResolvedOption<'_>],
    ) -> anyhow::Result<()> {
        let target = user_option(args, "target").context("missing required option 'target'")?;
        let text =
            string_option(args, "replacement").context("missing required option 'replacement'")?;

        self.store
            .add(&guild_id.to_string(), &target.id.to_string(), text)?;

        respond(
            ctx,
            command,
            format!(
                "✅ Mentions for <@{}> will now be replaced with '{}'",
                target.id, text
            ),
        )
        .await?;

        info!("Set replacement for {}: '{}'", target.name, text);
        Ok(())
    }

    async fn handle_remove(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        guild_id: GuildId,
        args: &[ResolvedOption<'_>],
    ) -> anyhow::Result<()> {
        let target = user_option(args, "target").context("missing required option 'target'")?;

        let removed = self
            .store
            .remove(&guild_id.to_string(), &target.id.to_string())?;

        if !removed {
            respond(
                ctx,
                command,
                format!("❌ No replacement configured for <@{}>", target.id),
            )
            .await?;
            return Ok(());
        }

        respond(
            ctx,
            command,
            format!("✅ Removed replacement for <@{}>", target.id),
        )
        .await?;

        info!("Removed replacement for {}", target.name);
        Ok(())
    }

    async fn handle_list(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        guild_id: GuildId,
    ) -> anyhow::Result<()> {
        let rules = self.store.get(&guild_id.to_string())?;

        if rules.is_empty() {
            respond(ctx, command, "No replacements configured.").await?;
            return Ok(());
        }

        let list = format_rule_list(&rules);
        respond(ctx, command, format!("**Configured Replacements:**\n{list}")).await?;
        Ok(())
    }
}

/// Render a rule set as one `- <@id> → "text"` line per rule, in the
/// set's iteration order.
pub(crate) fn format_rule_list(rules: &RuleSet) -> String {
    rules
        .iter()
        .map(|(id, text)| format!("- <@{id}> → \"{text}\""))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn respond(
    ctx: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
) -> Result<(), serenity::Error> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
}

fn user_option<'a>(args: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a User> {
    args.iter().find_map(|option| match &option.value {
        ResolvedValue::User(user, _) if option.name == name => Some(*user),
        _ => None,
    })
}

fn string_option<'a>(args: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    args.iter().find_map(|option| match &option.value {
        ResolvedValue::String(text) if option.name == name => Some(*text),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_renders_one_line_per_rule() {
        let rules: RuleSet = [
            ("111".to_string(), "x".to_string()),
            ("222".to_string(), "y".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            format_rule_list(&rules),
            "- <@111> → \"x\"\n- <@222> → \"y\""
        );
    }

    #[test]
    fn test_list_follows_iteration_order() {
        let rules: RuleSet = [
            ("222".to_string(), "y".to_string()),
            ("111".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect();

        let formatted = format_rule_list(&rules);
        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines[0], "- <@111> → \"x\"");
        assert_eq!(lines[1], "- <@222> → \"y\"");
    }
}
