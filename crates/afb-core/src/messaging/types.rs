use chrono::{DateTime, Utc};

use crate::domain::{ChannelId, UserId, WebhookId};

pub const COLOR_GREEN: u32 = 0x00FF00;
pub const COLOR_RED: u32 = 0xFF0000;
pub const COLOR_YELLOW: u32 = 0xFFFF00;
pub const COLOR_AUDIT: u32 = 0x3498db;

/// Platform-neutral rich embed.
///
/// The Discord adapter converts this into a serenity `CreateEmbed`; the core only
/// ever builds these.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
    pub image_url: Option<String>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// A reply to a command invocation (initial response or follow-up).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Self::default()
        }
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }
}

/// A plain channel message (not tied to an interaction).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutgoingMessage {
    Text(String),
    Embed(Embed),
}

/// A resolved text channel (audit log destination).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: ChannelId,
    pub name: String,
}

/// A channel webhook as seen by the bot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookHandle {
    pub id: WebhookId,
    pub channel_id: ChannelId,
    /// User that created the webhook, if the platform reports one.
    pub owner_id: Option<UserId>,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookMessage {
    pub content: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// What the bot itself may do in a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BotPermissions {
    pub send_messages: bool,
    pub manage_webhooks: bool,
}

/// A command as acknowledged by the platform after a sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredCommand {
    pub name: String,
    pub description: String,
}
