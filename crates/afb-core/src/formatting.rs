//! Discord markdown helpers shared by command replies and the audit log.

use chrono::{DateTime, Utc};

/// Discord timestamp styles used by the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampStyle {
    /// "Tuesday, 20 April 2021 16:20"
    LongDateTime,
    /// "2 months ago"
    Relative,
}

/// `<t:UNIX:STYLE>`, rendered client-side in the reader's timezone.
pub fn discord_timestamp(at: DateTime<Utc>, style: TimestampStyle) -> String {
    let flag = match style {
        TimestampStyle::LongDateTime => 'F',
        TimestampStyle::Relative => 'R',
    };
    format!("<t:{}:{flag}>", at.timestamp())
}

pub fn inline_code(text: &str) -> String {
    format!("`{text}`")
}

pub fn code_block(text: &str) -> String {
    format!("```{text}```")
}

/// Swap the `size` query parameter on a Discord CDN URL (`?size=1024` by default).
pub fn with_avatar_size(url: &str, size: u32) -> String {
    url.replace("?size=1024", &format!("?size={size}"))
}
