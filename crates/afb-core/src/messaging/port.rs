use std::time::Duration;

use async_trait::async_trait;

use crate::{
    commands::CommandSpec,
    domain::{ChannelId, GuildId, UserRef},
    messaging::types::{
        BotPermissions, ChannelHandle, OutgoingMessage, RegisteredCommand, Reply, WebhookHandle,
        WebhookMessage,
    },
    Result,
};

/// Everything the core needs from the chat platform outside of a single interaction.
///
/// Discord is the only implementation; keeping it behind a trait lets the dispatcher,
/// audit log and webhook policy be exercised against in-memory fakes.
#[async_trait]
pub trait PlatformPort: Send + Sync {
    /// The bot's own identity, once the session is ready.
    fn bot_user(&self) -> Option<UserRef>;

    /// Gateway heartbeat latency, if known yet.
    async fn latency(&self) -> Option<Duration>;

    fn guild_count(&self) -> usize;

    /// Look up `channel` inside `guild`. `Ok(None)` when either does not exist or is not
    /// visible to the bot.
    async fn resolve_text_channel(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> Result<Option<ChannelHandle>>;

    async fn send_message(&self, channel: ChannelId, message: OutgoingMessage) -> Result<()>;

    async fn bot_permissions(&self, channel: ChannelId) -> Result<BotPermissions>;

    async fn list_webhooks(&self, channel: ChannelId) -> Result<Vec<WebhookHandle>>;

    async fn create_webhook(
        &self,
        channel: ChannelId,
        name: &str,
        reason: &str,
    ) -> Result<WebhookHandle>;

    async fn execute_webhook(&self, webhook: &WebhookHandle, message: WebhookMessage)
        -> Result<()>;

    /// Replace the platform's command set with `commands`.
    async fn sync_commands(&self, commands: &[CommandSpec]) -> Result<Vec<RegisteredCommand>>;
}

/// Response channel for a single command interaction.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Placeholder acknowledgement for commands that will take longer than the
    /// platform's response window.
    async fn defer(&self, ephemeral: bool) -> Result<()>;

    /// Initial (non-deferred) response.
    async fn respond(&self, reply: Reply) -> Result<()>;

    /// Follow-up after a deferred acknowledgement.
    async fn followup(&self, reply: Reply) -> Result<()>;
}
