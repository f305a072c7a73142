//! In-memory fakes for the platform ports, shared by unit tests.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::{
    commands::{CommandContext, CommandSpec},
    config::Config,
    domain::{Actor, ChannelId, ChannelRef, GuildContext, GuildId, UserId, UserRef, WebhookId},
    errors::Error,
    messaging::{
        port::{PlatformPort, Responder},
        types::{
            BotPermissions, ChannelHandle, OutgoingMessage, RegisteredCommand, Reply,
            WebhookHandle, WebhookMessage,
        },
    },
    presence::{ActivityDescriptor, PresencePort, PresenceRotator},
    Result,
};

pub const BOT_ID: UserId = UserId(900);

pub fn user(id: u64, name: &str) -> UserRef {
    UserRef {
        id: UserId(id),
        name: name.to_string(),
        avatar_url: format!("https://cdn.discordapp.com/avatars/{id}/a.png?size=1024"),
        created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        member: None,
    }
}

pub fn actor(is_admin: bool) -> Actor {
    Actor {
        user: user(42, "frosty"),
        is_admin,
    }
}

pub fn guild() -> GuildContext {
    GuildContext {
        id: GuildId(7),
        name: "Frost Hub".to_string(),
    }
}

pub fn channel(id: u64) -> ChannelRef {
    ChannelRef { id: ChannelId(id) }
}

/// Command context over `platform` with default config and a ready presence port.
pub fn context(platform: Arc<FakePlatform>) -> CommandContext {
    context_with(Config::with_token("test-token"), platform)
}

pub fn context_with(cfg: Config, platform: Arc<FakePlatform>) -> CommandContext {
    let rotator = Arc::new(PresenceRotator::new(Arc::new(FakePresence::ready())));
    CommandContext::new(Arc::new(cfg), platform, rotator).unwrap()
}

#[derive(Default)]
pub struct FakePresence {
    ready: AtomicBool,
    fail: AtomicBool,
    applied: Mutex<Vec<ActivityDescriptor>>,
}

impl FakePresence {
    pub fn ready() -> Self {
        let p = Self::default();
        p.ready.store(true, Ordering::SeqCst);
        p
    }

    pub fn not_ready() -> Self {
        Self::default()
    }

    pub fn fail_applies(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn applied(&self) -> Vec<ActivityDescriptor> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl PresencePort for FakePresence {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn apply_presence(&self, presence: &ActivityDescriptor) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Platform("gateway hiccup".to_string()));
        }
        self.applied.lock().unwrap().push(presence.clone());
        Ok(())
    }
}

/// Scriptable platform: records every outbound call, fails on request.
#[derive(Default)]
pub struct FakePlatform {
    pub audit_channel: Mutex<Option<ChannelHandle>>,
    pub fail_resolve: AtomicBool,
    pub fail_send: AtomicBool,
    pub fail_sync: AtomicBool,
    pub permissions: Mutex<BotPermissions>,
    pub resolve_calls: AtomicUsize,
    pub sent: Mutex<Vec<(ChannelId, OutgoingMessage)>>,
    pub webhooks: Mutex<Vec<WebhookHandle>>,
    pub list_calls: AtomicUsize,
    pub created: AtomicUsize,
    pub executed: Mutex<Vec<(WebhookId, WebhookMessage)>>,
    pub synced: Mutex<Vec<Vec<String>>>,
}

impl FakePlatform {
    /// Audit channel resolvable, bot allowed to do everything.
    pub fn new() -> Self {
        let p = Self::default();
        *p.audit_channel.lock().unwrap() = Some(ChannelHandle {
            id: ChannelId(555),
            name: "bot-logs".to_string(),
        });
        *p.permissions.lock().unwrap() = BotPermissions {
            send_messages: true,
            manage_webhooks: true,
        };
        p
    }

    pub fn sent(&self) -> Vec<(ChannelId, OutgoingMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_embeds_to(&self, channel: ChannelId) -> Vec<crate::messaging::types::Embed> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .filter_map(|(_, m)| match m {
                OutgoingMessage::Embed(e) => Some(e),
                OutgoingMessage::Text(_) => None,
            })
            .collect()
    }

    pub fn add_webhook(&self, id: u64, channel: ChannelId, owner: Option<UserId>) {
        self.webhooks.lock().unwrap().push(webhook(id, channel, owner));
    }
}

pub fn webhook(id: u64, channel: ChannelId, owner: Option<UserId>) -> WebhookHandle {
    WebhookHandle {
        id: WebhookId(id),
        channel_id: channel,
        owner_id: owner,
        url: format!("https://discord.com/api/webhooks/{id}/secret-token-value"),
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
    }
}

#[async_trait]
impl PlatformPort for FakePlatform {
    fn bot_user(&self) -> Option<UserRef> {
        Some(user(BOT_ID.0, "AquaFrost"))
    }

    async fn latency(&self) -> Option<Duration> {
        Some(Duration::from_millis(42))
    }

    fn guild_count(&self) -> usize {
        3
    }

    async fn resolve_text_channel(
        &self,
        _guild: GuildId,
        _channel: ChannelId,
    ) -> Result<Option<ChannelHandle>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(Error::Platform("unknown guild".to_string()));
        }
        Ok(self.audit_channel.lock().unwrap().clone())
    }

    async fn send_message(&self, channel: ChannelId, message: OutgoingMessage) -> Result<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Error::Platform("missing access".to_string()));
        }
        self.sent.lock().unwrap().push((channel, message));
        Ok(())
    }

    async fn bot_permissions(&self, _channel: ChannelId) -> Result<BotPermissions> {
        Ok(*self.permissions.lock().unwrap())
    }

    async fn list_webhooks(&self, channel: ChannelId) -> Result<Vec<WebhookHandle>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .webhooks
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.channel_id == channel)
            .cloned()
            .collect())
    }

    async fn create_webhook(
        &self,
        channel: ChannelId,
        _name: &str,
        _reason: &str,
    ) -> Result<WebhookHandle> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) as u64;
        let hook = webhook(10_000 + n, channel, Some(BOT_ID));
        self.webhooks.lock().unwrap().push(hook.clone());
        Ok(hook)
    }

    async fn execute_webhook(
        &self,
        webhook: &WebhookHandle,
        message: WebhookMessage,
    ) -> Result<()> {
        self.executed.lock().unwrap().push((webhook.id, message));
        Ok(())
    }

    async fn sync_commands(&self, commands: &[CommandSpec]) -> Result<Vec<RegisteredCommand>> {
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(Error::Platform("sync rejected".to_string()));
        }
        self.synced
            .lock()
            .unwrap()
            .push(commands.iter().map(|c| c.name.to_string()).collect());
        Ok(commands
            .iter()
            .map(|c| RegisteredCommand {
                name: c.name.to_string(),
                description: c.description.to_string(),
            })
            .collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Defer { ephemeral: bool },
    Respond(Reply),
    Followup(Reply),
}

#[derive(Default)]
pub struct FakeResponder {
    pub log: Mutex<Vec<Response>>,
    pub fail_first_followup: AtomicBool,
}

impl FakeResponder {
    pub fn log(&self) -> Vec<Response> {
        self.log.lock().unwrap().clone()
    }

    /// The last reply sent, deferred or not.
    pub fn last_reply(&self) -> Option<Reply> {
        self.log().into_iter().rev().find_map(|r| match r {
            Response::Respond(reply) | Response::Followup(reply) => Some(reply),
            Response::Defer { .. } => None,
        })
    }
}

#[async_trait]
impl Responder for FakeResponder {
    async fn defer(&self, ephemeral: bool) -> Result<()> {
        self.log.lock().unwrap().push(Response::Defer { ephemeral });
        Ok(())
    }

    async fn respond(&self, reply: Reply) -> Result<()> {
        self.log.lock().unwrap().push(Response::Respond(reply));
        Ok(())
    }

    async fn followup(&self, reply: Reply) -> Result<()> {
        if self.fail_first_followup.swap(false, Ordering::SeqCst) {
            return Err(Error::Platform("content too long".to_string()));
        }
        self.log.lock().unwrap().push(Response::Followup(reply));
        Ok(())
    }
}
