//! Slash commands: parameter schemas, the invocation model and the handler table.
//!
//! Each command is a [`CommandHandler`] that declares its own [`CommandSpec`]. The
//! [`CommandRegistry`] owns the live table; `refresh` rebuilds it and re-syncs it with
//! the platform.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    audit::CommandAuditLog,
    config::Config,
    domain::{Actor, ChannelRef, GuildContext, UserRef},
    errors::Error,
    fetch::RemoteContentFetcher,
    messaging::{port::PlatformPort, types::Reply},
    presence::PresenceRotator,
    utils::summarize_argument,
    webhooks::WebhookCache,
    Result,
};

pub mod admin;
pub mod avatar;
pub mod content;
pub mod eightball;
pub mod status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    String,
    User,
    /// A guild text channel.
    Channel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
        }
    }

    pub fn optional(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
        }
    }

    /// Placeholder used in the help menu: `[@user]`, `[message]`.
    pub fn usage(&self) -> String {
        match self.kind {
            ParamKind::User => format!("[@{}]", self.name),
            ParamKind::String | ParamKind::Channel => format!("[{}]", self.name),
        }
    }
}

/// Static description of one slash command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    /// Requires the Administrator capability.
    pub admin_only: bool,
    /// Acknowledge with a deferred response before running the handler.
    pub deferred: bool,
    /// Title of the embed shown when the handler fails.
    pub error_title: &'static str,
}

impl CommandSpec {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            params: Vec::new(),
            admin_only: false,
            deferred: false,
            error_title: "❌ Error",
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    pub fn error_title(mut self, title: &'static str) -> Self {
        self.error_title = title;
        self
    }

    /// Admin command output is only shown to the invoking admin.
    pub fn ephemeral(&self) -> bool {
        self.admin_only
    }

    /// `/name [param] ...` for the help menu.
    pub fn usage(&self) -> String {
        let mut out = format!("/{}", self.name);
        for p in &self.params {
            out.push(' ');
            out.push_str(&p.usage());
        }
        out
    }
}

#[derive(Clone, Debug)]
pub enum OptionValue {
    String(String),
    User(UserRef),
    Channel(ChannelRef),
}

/// One inbound slash-command call, already converted from the platform's types.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub command: String,
    pub actor: Actor,
    pub guild: Option<GuildContext>,
    pub channel: ChannelRef,
    /// Supplied options, in the order the platform sent them.
    pub options: Vec<(String, OptionValue)>,
}

impl Invocation {
    pub fn new(command: impl Into<String>, actor: Actor, channel: ChannelRef) -> Self {
        Self {
            command: command.into(),
            actor,
            guild: None,
            channel,
            options: Vec::new(),
        }
    }

    pub fn in_guild(mut self, guild: GuildContext) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.push((name.into(), value));
        self
    }

    fn find(&self, name: &str) -> Option<&OptionValue> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.find(name) {
            Some(OptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<&UserRef> {
        match self.find(name) {
            Some(OptionValue::User(u)) => Some(u),
            _ => None,
        }
    }

    pub fn channel_option(&self, name: &str) -> Option<ChannelRef> {
        match self.find(name) {
            Some(OptionValue::Channel(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn require_string(&self, name: &str) -> Result<&str> {
        self.string(name)
            .ok_or_else(|| Error::InvalidInput(format!("missing required option `{name}`")))
    }

    /// The channel named by `name`, or the one the command was invoked in.
    pub fn target_channel(&self, name: &str) -> ChannelRef {
        self.channel_option(name).unwrap_or(self.channel)
    }
}

/// Shared state every handler runs against.
pub struct CommandContext {
    pub cfg: Arc<Config>,
    pub platform: Arc<dyn PlatformPort>,
    pub rotator: Arc<PresenceRotator>,
    pub fetcher: RemoteContentFetcher,
    pub audit: Arc<CommandAuditLog>,
    pub webhooks: WebhookCache,
    pub registry: CommandRegistry,
    pub started_at: DateTime<Utc>,
}

impl CommandContext {
    pub fn new(
        cfg: Arc<Config>,
        platform: Arc<dyn PlatformPort>,
        rotator: Arc<PresenceRotator>,
    ) -> Result<Self> {
        let fetcher = RemoteContentFetcher::new(cfg.fetch_timeout)?;
        let audit = Arc::new(CommandAuditLog::new(
            platform.clone(),
            cfg.log_server_id,
            cfg.log_channel_id,
        ));
        Ok(Self {
            cfg,
            platform,
            rotator,
            fetcher,
            audit,
            webhooks: WebhookCache::new(),
            registry: CommandRegistry::new(),
            started_at: Utc::now(),
        })
    }

    /// Bot display name, falling back to the webhook name before the session is ready.
    pub fn bot_name(&self) -> String {
        self.platform
            .bot_user()
            .map(|u| u.name)
            .unwrap_or_else(|| self.cfg.webhook_name.clone())
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn spec(&self) -> CommandSpec;

    /// Argument summary mirrored to the audit channel.
    ///
    /// Default: every supplied option in order, free text summarized, users as
    /// `name (id)`, channels as mentions.
    fn audit_args(&self, inv: &Invocation) -> Vec<(String, String)> {
        inv.options
            .iter()
            .map(|(name, value)| {
                let shown = match value {
                    OptionValue::String(s) => summarize_argument(s),
                    OptionValue::User(u) => format!("{} ({})", u.name, u.id.0),
                    OptionValue::Channel(c) => c.mention(),
                };
                (name.clone(), shown)
            })
            .collect()
    }

    async fn run(&self, ctx: &CommandContext, inv: &Invocation) -> Result<Reply>;
}

/// The built-in command set, in registration order.
pub fn builtin() -> Vec<Arc<dyn CommandHandler>> {
    vec![
        Arc::new(content::ContentCommand::projects()),
        Arc::new(content::ContentCommand::moddl()),
        Arc::new(avatar::Avatar),
        Arc::new(eightball::EightBall),
        Arc::new(status::Uptime),
        Arc::new(admin::Refresh),
        Arc::new(admin::Say),
        Arc::new(admin::WebhookSay),
        Arc::new(status::Ping),
        Arc::new(status::Help),
    ]
}

/// Live command table.
pub struct CommandRegistry {
    table: RwLock<Vec<Arc<dyn CommandHandler>>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::with_handlers(builtin())
    }

    pub fn with_handlers(handlers: Vec<Arc<dyn CommandHandler>>) -> Self {
        Self {
            table: RwLock::new(handlers),
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.table
            .read()
            .await
            .iter()
            .find(|h| h.spec().name == name)
            .cloned()
    }

    pub async fn specs(&self) -> Vec<CommandSpec> {
        self.table.read().await.iter().map(|h| h.spec()).collect()
    }

    /// Rebuild the table from the built-in set. Returns the new command count.
    pub async fn reload(&self) -> usize {
        let fresh = builtin();
        let n = fresh.len();
        *self.table.write().await = fresh;
        n
    }
}
