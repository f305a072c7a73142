//! Command audit log: mirrors every command invocation into a fixed Discord channel.
//!
//! Delivery is at-most-once and best-effort. Nothing in here ever reports failure to
//! the caller; problems end up in the local log only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    domain::{ChannelId, GuildContext, GuildId, UserRef},
    formatting::{discord_timestamp, inline_code, TimestampStyle},
    messaging::{
        port::PlatformPort,
        types::{ChannelHandle, Embed, OutgoingMessage, COLOR_AUDIT},
    },
    utils::clip_chars,
};

/// Longest "Arguments" field the audit embed carries.
pub const AUDIT_ARGUMENTS_MAX: usize = 500;

/// One command invocation, as mirrored to the audit channel.
#[derive(Clone, Debug)]
pub struct AuditRecord {
    pub command_name: String,
    pub actor: UserRef,
    pub guild: Option<GuildContext>,
    /// Already-summarized argument values, in declaration order.
    pub arguments: Vec<(String, String)>,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        command_name: impl Into<String>,
        actor: UserRef,
        guild: Option<GuildContext>,
        arguments: Vec<(String, String)>,
    ) -> Self {
        Self {
            command_name: command_name.into(),
            actor,
            guild,
            arguments,
            timestamp: Utc::now(),
        }
    }

    pub fn to_embed(&self) -> Embed {
        let mut embed = Embed::new("📝 Command Executed")
            .color(COLOR_AUDIT)
            .timestamp(self.timestamp)
            .field(
                "👤 User",
                format!("{}\nID: {}", self.actor.mention(), self.actor.id.0),
                true,
            )
            .field(
                "🏷️ Command",
                inline_code(&format!("/{}", self.command_name)),
                true,
            );

        if let Some(g) = &self.guild {
            embed = embed.field("🛡️ Server", format!("{}\nID: {}", g.name, g.id.0), true);
        }

        if !self.arguments.is_empty() {
            let args = self
                .arguments
                .iter()
                .map(|(k, v)| format!("{}: {v}", inline_code(k)))
                .collect::<Vec<_>>()
                .join("\n");
            embed = embed.field(
                "📊 Arguments",
                clip_chars(&args, AUDIT_ARGUMENTS_MAX),
                false,
            );
        }

        embed.field(
            "🕐 Time",
            discord_timestamp(self.timestamp, TimestampStyle::LongDateTime),
            true,
        )
    }
}

pub struct CommandAuditLog {
    platform: Arc<dyn PlatformPort>,
    server_id: GuildId,
    channel_id: ChannelId,
    cached: Mutex<Option<ChannelHandle>>,
}

impl CommandAuditLog {
    pub fn new(platform: Arc<dyn PlatformPort>, server_id: GuildId, channel_id: ChannelId) -> Self {
        Self {
            platform,
            server_id,
            channel_id,
            cached: Mutex::new(None),
        }
    }

    pub async fn cached_channel(&self) -> Option<ChannelHandle> {
        self.cached.lock().await.clone()
    }

    /// Resolve (and cache) the audit channel. Failures are not cached, so the next
    /// call tries again.
    pub async fn resolve(&self) -> Option<ChannelHandle> {
        if let Some(hit) = self.cached.lock().await.clone() {
            return Some(hit);
        }

        match self
            .platform
            .resolve_text_channel(self.server_id, self.channel_id)
            .await
        {
            Ok(Some(handle)) => {
                info!(channel = %handle.name, id = handle.id.0, "audit channel resolved");
                *self.cached.lock().await = Some(handle.clone());
                Some(handle)
            }
            Ok(None) => {
                warn!(
                    server = self.server_id.0,
                    channel = self.channel_id.0,
                    "audit channel not found"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "audit channel lookup failed");
                None
            }
        }
    }

    /// Mirror one invocation. Never fails; a record that cannot be delivered is dropped.
    pub async fn record(&self, record: AuditRecord) {
        let Some(channel) = self.resolve().await else {
            debug!(command = %record.command_name, "audit record dropped (no channel)");
            return;
        };

        let embed = record.to_embed();
        if let Err(e) = self
            .platform
            .send_message(channel.id, OutgoingMessage::Embed(embed))
            .await
        {
            warn!(command = %record.command_name, error = %e, "failed to log command");
        }
    }

    /// Operational notice (startup, refresh) with the same best-effort policy.
    pub async fn notice(&self, embed: Embed) {
        let Some(channel) = self.resolve().await else {
            return;
        };
        if let Err(e) = self
            .platform
            .send_message(channel.id, OutgoingMessage::Embed(embed))
            .await
        {
            warn!(error = %e, "failed to send audit notice");
        }
    }

    /// Like [`notice`](Self::notice) but only if the channel is already cached.
    pub async fn notice_if_cached(&self, embed: Embed) {
        let Some(channel) = self.cached_channel().await else {
            return;
        };
        if let Err(e) = self
            .platform
            .send_message(channel.id, OutgoingMessage::Embed(embed))
            .await
        {
            warn!(error = %e, "failed to send audit notice");
        }
    }
}
