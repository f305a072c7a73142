//! Admin-only commands: `refresh`, `say`, `webhook-say`.
//!
//! The dispatcher has already checked the Administrator capability before any of
//! these run.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    domain::ChannelRef,
    errors::Error,
    formatting::{code_block, discord_timestamp, inline_code, TimestampStyle},
    messaging::types::{
        Embed, OutgoingMessage, Reply, WebhookMessage, COLOR_AUDIT, COLOR_GREEN, COLOR_RED,
    },
    utils::{clip_chars, summarize_argument},
    Result,
};

use super::{CommandContext, CommandHandler, CommandSpec, Invocation, ParamKind, ParamSpec};

/// Commands listed in the refresh confirmation.
const REFRESH_LISTED_MAX: usize = 15;
const SAY_ECHO_MAX: usize = 500;
const WEBHOOK_ECHO_MAX: usize = 300;
const WEBHOOK_URL_SHOWN: usize = 50;

fn permission_error(description: String) -> Reply {
    Reply::embed(
        Embed::new("❌ Permission Error")
            .description(description)
            .color(COLOR_RED),
    )
}

fn channel_arg(inv: &Invocation) -> String {
    inv.channel_option("channel")
        .map(|c| c.mention())
        .unwrap_or_else(|| "Current".to_string())
}

fn message_arg(inv: &Invocation) -> String {
    summarize_argument(inv.string("message").unwrap_or_default())
}

pub struct Refresh;

#[async_trait]
impl CommandHandler for Refresh {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("refresh", "[ADMIN] Refresh bot commands")
            .admin_only()
            .deferred()
            .error_title("❌ Refresh Failed")
    }

    async fn run(&self, ctx: &CommandContext, inv: &Invocation) -> Result<Reply> {
        ctx.registry.reload().await;
        let specs = ctx.registry.specs().await;
        let synced = ctx.platform.sync_commands(&specs).await?;
        info!(count = synced.len(), admin = inv.actor.user.id.0, "commands refreshed");

        let mut embed = Embed::new("🔄 Commands Refreshed")
            .description(format!(
                "✅ Successfully synced **{}** commands",
                synced.len()
            ))
            .color(COLOR_GREEN);

        let listed = specs
            .iter()
            .take(REFRESH_LISTED_MAX)
            .map(|s| format!("• `/{}` - {}", s.name, s.description))
            .collect::<Vec<_>>();
        if !listed.is_empty() {
            embed = embed.field("📋 Available Commands", listed.join("\n"), false);
        }

        ctx.audit
            .notice_if_cached(
                Embed::new("🔄 Commands Refreshed by Admin")
                    .description(format!(
                        "**Admin:** {}\n**Commands:** {} synced",
                        inv.actor.user.mention(),
                        synced.len()
                    ))
                    .color(COLOR_AUDIT)
                    .timestamp(Utc::now()),
            )
            .await;

        Ok(Reply::embed(embed))
    }
}

pub struct Say;

#[async_trait]
impl CommandHandler for Say {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("say", "[ADMIN] Make the bot say something")
            .param(ParamSpec::required(
                "message",
                "Message to send",
                ParamKind::String,
            ))
            .param(ParamSpec::optional(
                "channel",
                "Channel to send to (defaults to current)",
                ParamKind::Channel,
            ))
            .admin_only()
            .deferred()
            .error_title("❌ Failed to Send Message")
    }

    fn audit_args(&self, inv: &Invocation) -> Vec<(String, String)> {
        vec![
            ("message".to_string(), message_arg(inv)),
            ("channel".to_string(), channel_arg(inv)),
        ]
    }

    async fn run(&self, ctx: &CommandContext, inv: &Invocation) -> Result<Reply> {
        let message = inv.require_string("message")?;
        let target: ChannelRef = inv.target_channel("channel");

        let perms = ctx.platform.bot_permissions(target.id).await?;
        if !perms.send_messages {
            return Ok(permission_error(format!(
                "I don't have permission to send messages in {}",
                target.mention()
            )));
        }

        ctx.platform
            .send_message(target.id, OutgoingMessage::Text(message.to_string()))
            .await?;

        Ok(Reply::embed(
            Embed::new("✅ Message Sent")
                .description(format!("Message sent to {}", target.mention()))
                .color(COLOR_GREEN)
                .field(
                    "📝 Message",
                    code_block(clip_chars(message, SAY_ECHO_MAX)),
                    false,
                ),
        ))
    }
}

pub struct WebhookSay;

#[async_trait]
impl CommandHandler for WebhookSay {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("webhook-say", "[ADMIN] Send a message via webhook (cool style)")
            .param(ParamSpec::required(
                "message",
                "Message to send",
                ParamKind::String,
            ))
            .param(ParamSpec::optional(
                "username",
                "Webhook username (defaults to bot name)",
                ParamKind::String,
            ))
            .param(ParamSpec::optional(
                "channel",
                "Channel to send to",
                ParamKind::Channel,
            ))
            .admin_only()
            .deferred()
            .error_title("❌ Webhook Failed")
    }

    fn audit_args(&self, inv: &Invocation) -> Vec<(String, String)> {
        let username = inv
            .string("username")
            .map(summarize_argument)
            .unwrap_or_else(|| "Default".to_string());
        vec![
            ("message".to_string(), message_arg(inv)),
            ("username".to_string(), username),
            ("channel".to_string(), channel_arg(inv)),
        ]
    }

    async fn run(&self, ctx: &CommandContext, inv: &Invocation) -> Result<Reply> {
        let message = inv.require_string("message")?;
        let target = inv.target_channel("channel");

        let perms = ctx.platform.bot_permissions(target.id).await?;
        if !perms.manage_webhooks {
            return Ok(permission_error(format!(
                "I need **Manage Webhooks** permission in {}",
                target.mention()
            )));
        }

        let bot = ctx
            .platform
            .bot_user()
            .ok_or(Error::NotReady("bot user unknown"))?;

        let hook = ctx
            .webhooks
            .find_or_create(
                ctx.platform.as_ref(),
                target.id,
                bot.id,
                &ctx.cfg.webhook_name,
            )
            .await?;

        let username = inv
            .string("username")
            .map(str::to_string)
            .unwrap_or_else(|| bot.name.clone());

        let sent = ctx
            .platform
            .execute_webhook(
                &hook,
                WebhookMessage {
                    content: message.to_string(),
                    username: username.clone(),
                    avatar_url: Some(bot.avatar_url.clone()),
                },
            )
            .await;
        if let Err(e) = sent {
            // The webhook may have been deleted since it was cached.
            warn!(webhook = hook.id.0, error = %e, "webhook execute failed");
            ctx.webhooks.forget(target.id).await;
            return Err(e);
        }

        let embed = Embed::new("✅ Webhook Message Sent")
            .description(format!("Message sent via webhook to {}", target.mention()))
            .color(ctx.cfg.webhook_color)
            .field("👤 Webhook Name", inline_code(&username), true)
            .field(
                "🔗 Webhook URL",
                inline_code(&format!("{}...", clip_chars(&hook.url, WEBHOOK_URL_SHOWN))),
                true,
            )
            .field(
                "📝 Message",
                code_block(clip_chars(message, WEBHOOK_ECHO_MAX)),
                false,
            )
            .field(
                "🔄 Webhook Info",
                format!(
                    "**ID:** {}\n**Channel:** {}\n**Created:** {}",
                    inline_code(&hook.id.0.to_string()),
                    hook.channel_id.mention(),
                    discord_timestamp(hook.created_at, TimestampStyle::Relative)
                ),
                true,
            )
            .footer("Sent via webhook");

        Ok(Reply::embed(embed))
    }
}
