use chrono::{DateTime, Utc};

/// Discord user id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

/// Discord guild ("server") id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GuildId(pub u64);

/// Discord channel id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Discord webhook id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WebhookId(pub u64);

impl UserId {
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

impl ChannelId {
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

/// Guild membership data carried alongside a user, when the platform provides it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub joined_at: Option<DateTime<Utc>>,
    /// Role count, not counting the implicit `@everyone` role.
    pub role_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    /// Display avatar URL (Discord serves these with `?size=1024`).
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub member: Option<MemberInfo>,
}

impl UserRef {
    pub fn mention(&self) -> String {
        self.id.mention()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuildContext {
    pub id: GuildId,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: ChannelId,
}

impl ChannelRef {
    pub fn mention(&self) -> String {
        self.id.mention()
    }
}

/// The invoking user plus what the dispatcher needs to gate admin commands.
#[derive(Clone, Debug)]
pub struct Actor {
    pub user: UserRef,
    pub is_admin: bool,
}
