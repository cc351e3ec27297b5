//! Message rewriting.
//!
//! When a guild message mentions a user with a configured replacement, the
//! original message is deleted and its content reposted with every mention
//! token for that user substituted. Only the first configured target found
//! in the rule set is replaced, in the rule set's iteration order.

use std::sync::Arc;

use fancy_regex::Regex;
use serenity::model::channel::{ChannelType, Message};
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::*;
use tracing::{debug, error};

use crate::store::{ReplacementStore, RuleSet};

pub struct MessageRewriter {
    store: Arc<ReplacementStore>,
}

impl MessageRewriter {
    pub fn new(store: Arc<ReplacementStore>) -> Self {
        Self { store }
    }

    /// Rewrite one incoming message if it mentions a configured target.
    pub async fn handle_message(&self, ctx: &Context, msg: &Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            return;
        };
        if !can_send(ctx, guild_id, msg.channel_id) {
            return;
        }

        let rules = match self.store.get(&guild_id.to_string()) {
            Ok(rules) => rules,
            Err(e) => {
                error!("Failed to load replacements for guild {}: {}", guild_id, e);
                return;
            }
        };
        if rules.is_empty() {
            return;
        }

        let mentioned: Vec<UserId> = msg.mentions.iter().map(|user| user.id).collect();
        let Some((target, replacement)) = select_replacement(&rules, &mentioned) else {
            return;
        };

        // Delete-then-send is not transactional: if the send fails the
        // original message is already gone. Accepted, log and stop.
        if let Err(e) = self.replace(ctx, msg, target, replacement).await {
            error!("Failed to process message: {}", e);
        }
    }

    async fn replace(
        &self,
        ctx: &Context,
        msg: &Message,
        target: &str,
        replacement: &str,
    ) -> anyhow::Result<()> {
        msg.delete(&ctx.http).await?;

        let rewritten = substitute_mentions(&msg.content, target, replacement)?;
        let urls: Vec<String> = msg.attachments.iter().map(|a| a.url.clone()).collect();
        let content = build_repost(msg.author.display_name(), &rewritten, &urls);

        msg.channel_id.say(&ctx.http, content).await?;

        debug!("Replaced mention from {}", msg.author.name);
        Ok(())
    }
}

/// Whether the channel can receive the repost, according to the cache.
fn can_send(ctx: &Context, guild_id: GuildId, channel_id: ChannelId) -> bool {
    let Some(guild) = ctx.cache.guild(guild_id) else {
        return false;
    };
    if let Some(channel) = guild.channels.get(&channel_id) {
        return matches!(
            channel.kind,
            ChannelType::Text | ChannelType::News | ChannelType::Voice | ChannelType::Stage
        );
    }
    guild.threads.iter().any(|thread| thread.id == channel_id)
}

/// First configured target mentioned in the message, in rule-set iteration
/// order. An empty replacement text counts as "no rule".
pub(crate) fn select_replacement<'a>(
    rules: &'a RuleSet,
    mentioned: &[UserId],
) -> Option<(&'a str, &'a str)> {
    let (target, text) = find_target(rules, mentioned)?;
    if text.is_empty() {
        return None;
    }
    Some((target, text))
}

fn find_target<'a>(rules: &'a RuleSet, mentioned: &[UserId]) -> Option<(&'a str, &'a str)> {
    rules
        .iter()
        .map(|(id, text)| (id.as_str(), text.as_str()))
        .find(|(id, _)| mentioned.iter().any(|user| user.to_string() == *id))
}

/// Substitute every `<@ID>` and `<@!ID>` token for the target with the
/// replacement text, inserted literally.
pub(crate) fn substitute_mentions(
    content: &str,
    target_id: &str,
    replacement: &str,
) -> Result<String, fancy_regex::Error> {
    let pattern = Regex::new(&format!("<@!?{}>", fancy_regex::escape(target_id)))?;
    let rewritten = pattern.replace_all(content, |_: &fancy_regex::Captures<'_>| {
        replacement.to_string()
    });
    Ok(rewritten.into_owned())
}

/// Repost content: author label, rewritten text, attachment URLs appended.
pub(crate) fn build_repost(author: &str, content: &str, attachment_urls: &[String]) -> String {
    let mut out = format!("**{author}:** {content}");
    for url in attachment_urls {
        out.push(' ');
        out.push_str(url);
    }
    out
}
