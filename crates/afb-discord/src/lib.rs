//! Discord adapter (serenity).
//!
//! This crate implements the `afb-core` ports over the Discord gateway and REST API.

use std::{
    sync::{Arc, OnceLock, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::{
    all::{
        ChannelType, Command, CommandOptionType, Context, OnlineStatus, Permissions, ShardManager,
        Timestamp, User, Webhook,
    },
    builder::{
        CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter, CreateMessage,
        CreateWebhook, ExecuteWebhook,
    },
    gateway::ActivityData,
};

pub mod handlers;
pub mod router;

use afb_core::{
    commands::{CommandSpec, ParamKind},
    domain::{ChannelId, GuildId, MemberInfo, UserId, UserRef, WebhookId},
    errors::Error,
    messaging::{
        port::PlatformPort,
        types::{
            BotPermissions, ChannelHandle, Embed, OutgoingMessage, RegisteredCommand,
            WebhookHandle, WebhookMessage,
        },
    },
    presence::{ActivityDescriptor, PresenceMode, PresencePort},
    Result,
};

/// Live handle to the gateway session.
///
/// Empty until the first `ready` event hands over a serenity [`Context`]; every port
/// call made before that fails with [`Error::NotReady`].
#[derive(Default)]
pub struct DiscordPlatform {
    ctx: RwLock<Option<Context>>,
    shard_manager: OnceLock<Arc<ShardManager>>,
}

impl DiscordPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, ctx: Context) {
        if let Ok(mut slot) = self.ctx.write() {
            *slot = Some(ctx);
        }
    }

    pub fn attach_shard_manager(&self, manager: Arc<ShardManager>) {
        let _ = self.shard_manager.set(manager);
    }

    fn ctx(&self) -> Result<Context> {
        self.ctx
            .read()
            .ok()
            .and_then(|slot| slot.clone())
            .ok_or(Error::NotReady("discord session not ready"))
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::Platform(format!("discord error: {e}"))
    }
}

pub(crate) fn to_utc(ts: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or_default()
}

pub(crate) fn user_ref(user: &User, member: Option<MemberInfo>) -> UserRef {
    UserRef {
        id: UserId(user.id.get()),
        name: user.name.clone(),
        avatar_url: user.face(),
        created_at: to_utc(user.id.created_at()),
        member,
    }
}

fn online_status(mode: PresenceMode) -> OnlineStatus {
    match mode {
        PresenceMode::Online => OnlineStatus::Online,
        PresenceMode::Idle => OnlineStatus::Idle,
        PresenceMode::Dnd => OnlineStatus::DoNotDisturb,
    }
}

fn snowflake<T: From<std::num::NonZeroU64>>(raw: u64) -> Result<T> {
    std::num::NonZeroU64::new(raw)
        .map(T::from)
        .ok_or_else(|| Error::InvalidInput("snowflake id must be non-zero".to_string()))
}

pub(crate) fn build_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(ref title) = embed.title {
        builder = builder.title(title);
    }
    if let Some(ref desc) = embed.description {
        builder = builder.description(desc);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(ref url) = embed.image_url {
        builder = builder.image(url);
    }
    if let Some(ref footer) = embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(at) = embed.timestamp {
        if let Ok(ts) = Timestamp::from_unix_timestamp(at.timestamp()) {
            builder = builder.timestamp(ts);
        }
    }
    builder
}

pub(crate) fn build_command(spec: &CommandSpec) -> CreateCommand {
    let mut cmd = CreateCommand::new(spec.name).description(spec.description);
    for p in &spec.params {
        let kind = match p.kind {
            ParamKind::String => CommandOptionType::String,
            ParamKind::User => CommandOptionType::User,
            ParamKind::Channel => CommandOptionType::Channel,
        };
        let mut opt = CreateCommandOption::new(kind, p.name, p.description).required(p.required);
        if p.kind == ParamKind::Channel {
            opt = opt.channel_types(vec![ChannelType::Text]);
        }
        cmd = cmd.add_option(opt);
    }
    if spec.admin_only {
        cmd = cmd.default_member_permissions(Permissions::ADMINISTRATOR);
    }
    cmd
}

#[async_trait]
impl PresencePort for DiscordPlatform {
    fn is_ready(&self) -> bool {
        self.ctx.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    async fn apply_presence(&self, presence: &ActivityDescriptor) -> Result<()> {
        let ctx = self.ctx()?;
        ctx.set_presence(
            Some(ActivityData::playing(presence.activity.clone())),
            online_status(presence.mode),
        );
        Ok(())
    }
}

#[async_trait]
impl PlatformPort for DiscordPlatform {
    fn bot_user(&self) -> Option<UserRef> {
        let ctx = self.ctx().ok()?;
        let me = ctx.cache.current_user().clone();
        Some(user_ref(&me, None))
    }

    async fn latency(&self) -> Option<Duration> {
        let ctx = self.ctx().ok()?;
        let manager = self.shard_manager.get()?;
        let runners = manager.runners.lock().await;
        runners.get(&ctx.shard_id).and_then(|r| r.latency)
    }

    fn guild_count(&self) -> usize {
        self.ctx().map(|ctx| ctx.cache.guild_count()).unwrap_or(0)
    }

    async fn resolve_text_channel(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Option<ChannelHandle>> {
        let ctx = self.ctx()?;
        let (Ok(guild_id), Ok(channel_id)) = (
            snowflake::<serenity::all::GuildId>(guild.0),
            snowflake::<serenity::all::ChannelId>(channel.0),
        ) else {
            return Ok(None);
        };

        let channels = guild_id.channels(&ctx).await.map_err(Self::map_err)?;
        Ok(channels
            .get(&channel_id)
            .filter(|c| matches!(c.kind, ChannelType::Text | ChannelType::News))
            .map(|c| ChannelHandle {
                id: channel,
                name: c.name.clone(),
            }))
    }

    async fn send_message(&self, channel: ChannelId, message: OutgoingMessage) -> Result<()> {
        let ctx = self.ctx()?;
        let builder = match message {
            OutgoingMessage::Text(text) => CreateMessage::new().content(text),
            OutgoingMessage::Embed(embed) => CreateMessage::new().embed(build_embed(&embed)),
        };
        snowflake::<serenity::all::ChannelId>(channel.0)?
            .send_message(&ctx, builder)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn bot_permissions(&self, channel: ChannelId) -> Result<BotPermissions> {
        let ctx = self.ctx()?;
        let resolved = snowflake::<serenity::all::ChannelId>(channel.0)?
            .to_channel(&ctx)
            .await
            .map_err(Self::map_err)?;

        let Some(gc) = resolved.guild() else {
            // DMs: the bot can always talk, but webhooks only exist in guilds.
            return Ok(BotPermissions {
                send_messages: true,
                manage_webhooks: false,
            });
        };

        let me = ctx.cache.current_user().id;
        let perms = gc.permissions_for_user(&ctx, me).map_err(Self::map_err)?;
        Ok(BotPermissions {
            send_messages: perms.send_messages(),
            manage_webhooks: perms.manage_webhooks(),
        })
    }

    async fn list_webhooks(&self, channel: ChannelId) -> Result<Vec<WebhookHandle>> {
        let ctx = self.ctx()?;
        let hooks = snowflake::<serenity::all::ChannelId>(channel.0)?
            .webhooks(&ctx)
            .await
            .map_err(Self::map_err)?;
        Ok(hooks.iter().map(|w| webhook_handle(w, channel)).collect())
    }

    async fn create_webhook(
        &self,
        channel: ChannelId,
        name: &str,
        reason: &str,
    ) -> Result<WebhookHandle> {
        let ctx = self.ctx()?;
        let hook = snowflake::<serenity::all::ChannelId>(channel.0)?
            .create_webhook(&ctx, CreateWebhook::new(name).audit_log_reason(reason))
            .await
            .map_err(Self::map_err)?;
        Ok(webhook_handle(&hook, channel))
    }

    async fn execute_webhook(
        &self,
        webhook: &WebhookHandle,
        message: WebhookMessage,
    ) -> Result<()> {
        let ctx = self.ctx()?;
        if webhook.url.is_empty() {
            return Err(Error::Platform(format!(
                "webhook {} has no token",
                webhook.id.0
            )));
        }
        let hook = Webhook::from_url(&ctx, &webhook.url)
            .await
            .map_err(Self::map_err)?;

        let mut builder = ExecuteWebhook::new()
            .content(message.content)
            .username(message.username);
        if let Some(url) = message.avatar_url {
            builder = builder.avatar_url(url);
        }
        hook.execute(&ctx, true, builder)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn sync_commands(&self, commands: &[CommandSpec]) -> Result<Vec<RegisteredCommand>> {
        let ctx = self.ctx()?;
        let synced =
            Command::set_global_commands(&ctx, commands.iter().map(build_command).collect())
                .await
                .map_err(Self::map_err)?;
        Ok(synced
            .into_iter()
            .map(|c| RegisteredCommand {
                name: c.name,
                description: c.description,
            })
            .collect())
    }
}

fn webhook_handle(hook: &Webhook, fallback_channel: ChannelId) -> WebhookHandle {
    WebhookHandle {
        id: WebhookId(hook.id.get()),
        channel_id: hook
            .channel_id
            .map(|c| ChannelId(c.get()))
            .unwrap_or(fallback_channel),
        owner_id: hook.user.as_ref().map(|u| UserId(u.id.get())),
        // Only webhooks carrying a token (i.e. ones we can execute) have a URL.
        url: hook.url().unwrap_or_default(),
        created_at: to_utc(hook.id.created_at()),
    }
}
