use std::{env, fs, path::Path, time::Duration};

use crate::{
    domain::{ChannelId, GuildId},
    errors::Error,
    Result,
};

pub const DEFAULT_PROJECTS_URL: &str = "https://org.aquafrost.ct.ws/discord/projects.txt";
pub const DEFAULT_MODDL_URL: &str = "https://org.aquafrost.ct.ws/discord/moddl.txt";

const DEFAULT_LOG_SERVER_ID: u64 = 1445061695520116860;
const DEFAULT_LOG_CHANNEL_ID: u64 = 1454112006180442193;

/// Typed configuration for the bot.
///
/// Everything except the token has a default matching the production bot, so a
/// bare `DISCORD_TOKEN=... afb` is enough to run it.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub discord_token: String,

    // Audit channel
    pub log_server_id: GuildId,
    pub log_channel_id: ChannelId,

    // Remote content
    pub projects_url: String,
    pub moddl_url: String,
    pub fetch_timeout: Duration,

    // Presence rotation
    pub activity_rotate_every: Duration,
    pub mode_rotate_every: Duration,

    // Appearance
    pub default_color: u32,
    pub webhook_color: u32,
    pub webhook_name: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars
        let discord_token = env_str("DISCORD_TOKEN").unwrap_or_default();
        if discord_token.trim().is_empty() {
            return Err(Error::Config(
                "DISCORD_TOKEN environment variable is required".to_string(),
            ));
        }

        let log_server_id = GuildId(env_u64("LOG_SERVER_ID").unwrap_or(DEFAULT_LOG_SERVER_ID));
        let log_channel_id =
            ChannelId(env_u64("LOG_CHANNEL_ID").unwrap_or(DEFAULT_LOG_CHANNEL_ID));

        let projects_url = env_str("PROJECTS_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_PROJECTS_URL.to_string());
        let moddl_url = env_str("MODDL_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_MODDL_URL.to_string());
        let fetch_timeout = Duration::from_millis(env_u64("FETCH_TIMEOUT_MS").unwrap_or(10_000));

        // Zero would make tokio's interval panic.
        let activity_rotate_every =
            Duration::from_secs(env_u64("ACTIVITY_ROTATE_SECS").unwrap_or(5).max(1));
        let mode_rotate_every =
            Duration::from_secs(env_u64("MODE_ROTATE_SECS").unwrap_or(10).max(1));

        let default_color = env_color("DEFAULT_COLOR").unwrap_or(0x00FFFF);
        let webhook_color = env_color("WEBHOOK_COLOR").unwrap_or(0x00FFF0);
        let webhook_name = env_str("WEBHOOK_NAME")
            .and_then(non_empty)
            .unwrap_or_else(|| "AquaFrost Bot".to_string());

        Ok(Self {
            discord_token,
            log_server_id,
            log_channel_id,
            projects_url,
            moddl_url,
            fetch_timeout,
            activity_rotate_every,
            mode_rotate_every,
            default_color,
            webhook_color,
            webhook_name,
        })
    }

    /// Config with production defaults and a placeholder token (tests, tooling).
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            discord_token: token.into(),
            log_server_id: GuildId(DEFAULT_LOG_SERVER_ID),
            log_channel_id: ChannelId(DEFAULT_LOG_CHANNEL_ID),
            projects_url: DEFAULT_PROJECTS_URL.to_string(),
            moddl_url: DEFAULT_MODDL_URL.to_string(),
            fetch_timeout: Duration::from_secs(10),
            activity_rotate_every: Duration::from_secs(5),
            mode_rotate_every: Duration::from_secs(10),
            default_color: 0x00FFFF,
            webhook_color: 0x00FFF0,
            webhook_name: "AquaFrost Bot".to_string(),
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_color(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| parse_color(&s))
}

/// Accepts `0x00FFFF`, `#00FFFF` or plain decimal.
fn parse_color(raw: &str) -> Option<u32> {
    let s = raw.trim();
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('#'));
    let value = match hex {
        Some(h) => u32::from_str_radix(h, 16).ok()?,
        None => s.parse::<u32>().ok()?,
    };
    (value <= 0xFF_FF_FF).then_some(value)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal_colors() {
        assert_eq!(parse_color("0x00FFFF"), Some(0x00FFFF));
        assert_eq!(parse_color("#3498db"), Some(0x3498db));
        assert_eq!(parse_color("65535"), Some(0xFFFF));
        assert_eq!(parse_color("0x1000000"), None);
        assert_eq!(parse_color("teal"), None);
    }

    #[test]
    fn with_token_uses_production_defaults() {
        let cfg = Config::with_token("t");
        assert_eq!(cfg.log_server_id, GuildId(1445061695520116860));
        assert_eq!(cfg.log_channel_id, ChannelId(1454112006180442193));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
        assert_eq!(cfg.activity_rotate_every, Duration::from_secs(5));
        assert_eq!(cfg.mode_rotate_every, Duration::from_secs(10));
        assert_eq!(cfg.webhook_name, "AquaFrost Bot");
    }
}
