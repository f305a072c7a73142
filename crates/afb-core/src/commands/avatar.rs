use async_trait::async_trait;
use chrono::Utc;

use crate::{
    formatting::{discord_timestamp, inline_code, with_avatar_size, TimestampStyle},
    messaging::types::{Embed, Reply},
    Result,
};

use super::{CommandContext, CommandHandler, CommandSpec, Invocation, ParamKind, ParamSpec};

pub struct Avatar;

#[async_trait]
impl CommandHandler for Avatar {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new("avatar", "Get a user's avatar").param(ParamSpec::optional(
            "user",
            "User to get avatar from (defaults to yourself)",
            ParamKind::User,
        ))
    }

    fn audit_args(&self, inv: &Invocation) -> Vec<(String, String)> {
        inv.user("user")
            .map(|u| vec![("user".to_string(), format!("{} ({})", u.name, u.id.0))])
            .unwrap_or_default()
    }

    async fn run(&self, ctx: &CommandContext, inv: &Invocation) -> Result<Reply> {
        let target = inv.user("user").unwrap_or(&inv.actor.user);
        let url = &target.avatar_url;

        let links = [256, 512, 1024, 2048]
            .iter()
            .map(|size| format!("[{size}px]({})", with_avatar_size(url, *size)))
            .collect::<Vec<_>>()
            .join(" | ");

        let mut embed = Embed::new(format!("👤 {}'s Avatar", target.name))
            .color(ctx.cfg.default_color)
            .timestamp(Utc::now())
            .image(url.clone())
            .field("📥 Download Links", links, false)
            .field(
                "👤 User Info",
                format!(
                    "**Name:** {}\n**ID:** {}\n**Account Created:** {}",
                    target.mention(),
                    inline_code(&target.id.0.to_string()),
                    discord_timestamp(target.created_at, TimestampStyle::Relative)
                ),
                true,
            );

        // Membership data only exists for guild invocations.
        if let (Some(_), Some(member)) = (&inv.guild, &target.member) {
            if let Some(joined) = member.joined_at {
                embed = embed.field(
                    "🛡️ Server Info",
                    format!(
                        "**Joined:** {}\n**Roles:** {}",
                        discord_timestamp(joined, TimestampStyle::Relative),
                        member.role_count
                    ),
                    true,
                );
            }
        }

        Ok(Reply::embed(
            embed.footer(format!("Requested by {}", inv.actor.user.name)),
        ))
    }
}
