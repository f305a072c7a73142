//! Informational commands: `uptime`, `ping`, `help`.

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    formatting::{discord_timestamp, TimestampStyle},
    messaging::types::{Embed, Reply},
    presence::ACTIVITIES,
    utils::Elapsed,
    Result,
};

use super::{CommandContext, CommandHandler, CommandSpec, Invocation};

pub struct Uptime;

#[async_trait]
impl CommandHandler for Uptime {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("uptime", "Check how long the bot has been online")
    }

    async fn run(&self, ctx: &CommandContext, _inv: &Invocation) -> Result<Reply> {
        let now = Utc::now();
        let uptime = Elapsed::between(ctx.started_at, now);
        let (activity, mode) = ctx.rotator.current().await;

        let embed = Embed::new("⏱️ Bot Uptime")
            .color(ctx.cfg.default_color)
            .timestamp(now)
            .field(
                "📅 Start Time",
                format!(
                    "{}\n({})",
                    discord_timestamp(ctx.started_at, TimestampStyle::LongDateTime),
                    discord_timestamp(ctx.started_at, TimestampStyle::Relative)
                ),
                true,
            )
            .field("⏳ Current Uptime", format!("**{}**", uptime.long()), true)
            .field(
                "🔄 Status",
                format!(
                    "Playing: Every {}s\nMode: Every {}s",
                    ctx.cfg.activity_rotate_every.as_secs(),
                    ctx.cfg.mode_rotate_every.as_secs()
                ),
                false,
            )
            .field(
                "🎮 Current Activity",
                format!("{} Playing **{activity}**", mode.emoji()),
                true,
            )
            .footer(format!("Bot started by {}", ctx.bot_name()));

        Ok(Reply::embed(embed))
    }
}

pub struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("ping", "Check bot latency")
    }

    async fn run(&self, ctx: &CommandContext, _inv: &Invocation) -> Result<Reply> {
        let latency = match ctx.platform.latency().await {
            Some(d) => format!("{}ms", d.as_millis()),
            None => "unknown".to_string(),
        };
        let uptime = Elapsed::between(ctx.started_at, Utc::now());
        let (activity, _) = ctx.rotator.current().await;

        let embed = Embed::new("🏓 Pong!")
            .description(format!("**Latency:** {latency}"))
            .color(ctx.cfg.default_color)
            .field("⏱️ Uptime", uptime.short(), true)
            .field("📊 Servers", ctx.platform.guild_count().to_string(), true)
            .field("🎮 Status", format!("Playing {activity}"), true);

        Ok(Reply::embed(embed))
    }
}

pub struct Help;

#[async_trait]
impl CommandHandler for Help {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("help", "Show all commands")
    }

    async fn run(&self, ctx: &CommandContext, _inv: &Invocation) -> Result<Reply> {
        let specs = ctx.registry.specs().await;

        let mut public = Vec::new();
        let mut admin = Vec::new();
        for spec in &specs {
            if spec.admin_only {
                let desc = spec.description.trim_start_matches("[ADMIN] ");
                admin.push(format!("**`{}`** ⚠️\n{desc} (Admin only)", spec.usage()));
            } else {
                public.push(format!("**`{}`**\n{}", spec.usage(), spec.description));
            }
        }

        let clients = ACTIVITIES
            .iter()
            .map(|c| format!("• {c}"))
            .collect::<Vec<_>>()
            .join("\n");

        let mut embed = Embed::new("🛠️ AquaFrost Help Menu")
            .description("Minecraft Client Download Bot")
            .color(ctx.cfg.default_color)
            .field("🔧 Public Commands", public.join("\n\n"), false);
        if !admin.is_empty() {
            embed = embed.field("🛡️ Admin Commands", admin.join("\n\n"), false);
        }
        let embed = embed
            .field(
                "🎮 Clients",
                format!("**Available Clients:**\n{clients}"),
                true,
            )
            .field(
                "🔄 Bot Status",
                format!(
                    "**Status Rotation:**\n• Playing: Every {}s\n• Online/Idle/DND: Every {}s",
                    ctx.cfg.activity_rotate_every.as_secs(),
                    ctx.cfg.mode_rotate_every.as_secs()
                ),
                true,
            )
            .footer("Bot by AquaFrost Team | Admin commands marked with ⚠️");

        Ok(Reply::embed(embed))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{actor, channel, context, FakePlatform};

    fn inv(name: &str) -> Invocation {
        Invocation::new(name, actor(false), channel(1))
    }

    #[tokio::test]
    async fn uptime_reports_rotation_and_activity() {
        let ctx = context(Arc::new(FakePlatform::new()));
        let embed = Uptime.run(&ctx, &inv("uptime")).await.unwrap().embed.unwrap();

        assert_eq!(embed.title.as_deref(), Some("⏱️ Bot Uptime"));
        assert_eq!(
            embed.field_value("🔄 Status"),
            Some("Playing: Every 5s\nMode: Every 10s")
        );
        assert_eq!(
            embed.field_value("🎮 Current Activity"),
            Some("🟢 Playing **Aqua Client**")
        );
        assert!(embed.field_value("⏳ Current Uptime").unwrap().ends_with("s**"));
        assert_eq!(embed.footer.as_deref(), Some("Bot started by AquaFrost"));
    }

    #[tokio::test]
    async fn uptime_tracks_rotator_state() {
        let ctx = context(Arc::new(FakePlatform::new()));
        ctx.rotator.advance_activity().await;
        ctx.rotator.advance_mode().await;

        let embed = Uptime.run(&ctx, &inv("uptime")).await.unwrap().embed.unwrap();
        assert_eq!(
            embed.field_value("🎮 Current Activity"),
            Some("🌙 Playing **Apple Client**")
        );
    }

    #[tokio::test]
    async fn ping_reports_latency_and_servers() {
        let ctx = context(Arc::new(FakePlatform::new()));
        let embed = Ping.run(&ctx, &inv("ping")).await.unwrap().embed.unwrap();

        assert_eq!(embed.description.as_deref(), Some("**Latency:** 42ms"));
        assert_eq!(embed.field_value("📊 Servers"), Some("3"));
        assert_eq!(embed.field_value("🎮 Status"), Some("Playing Aqua Client"));
        assert!(embed.field_value("⏱️ Uptime").unwrap().starts_with("0h 0m "));
    }

    #[tokio::test]
    async fn help_splits_public_and_admin_commands() {
        let ctx = context(Arc::new(FakePlatform::new()));
        let embed = Help.run(&ctx, &inv("help")).await.unwrap().embed.unwrap();

        let public = embed.field_value("🔧 Public Commands").unwrap();
        let admin = embed.field_value("🛡️ Admin Commands").unwrap();
        assert!(public.contains("**`/avatar [@user]`**"));
        assert!(public.contains("**`/8ball [question]`**"));
        assert!(!public.contains("/refresh"));
        assert!(admin.contains("**`/webhook-say [message] [username] [channel]`** ⚠️"));
        assert!(admin.contains("Refresh bot commands (Admin only)"));
        assert!(embed.field_value("🎮 Clients").unwrap().contains("• Unifix Client"));
    }
}
