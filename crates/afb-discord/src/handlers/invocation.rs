use serenity::all::{CommandInteraction, Context, Member, PartialMember, ResolvedValue};

use afb_core::{
    commands::{Invocation, OptionValue},
    domain::{Actor, ChannelId, ChannelRef, GuildContext, GuildId, MemberInfo},
};

use crate::{to_utc, user_ref};

fn member_info(member: &Member) -> MemberInfo {
    MemberInfo {
        joined_at: member.joined_at.map(to_utc),
        role_count: member.roles.len(),
    }
}

fn partial_member_info(member: &PartialMember) -> MemberInfo {
    MemberInfo {
        joined_at: member.joined_at.map(to_utc),
        role_count: member.roles.len(),
    }
}

/// Convert a slash-command interaction into the platform-neutral invocation.
pub fn to_invocation(ctx: &Context, cmd: &CommandInteraction) -> Invocation {
    let member = cmd.member.as_deref();
    let is_admin = member
        .and_then(|m| m.permissions)
        .map(|p| p.administrator())
        .unwrap_or(false);

    let actor = Actor {
        user: user_ref(&cmd.user, member.map(member_info)),
        is_admin,
    };

    let mut inv = Invocation::new(
        cmd.data.name.clone(),
        actor,
        ChannelRef {
            id: ChannelId(cmd.channel_id.get()),
        },
    );

    if let Some(guild_id) = cmd.guild_id {
        // The cache guard must not outlive this expression.
        let name = ctx
            .cache
            .guild(guild_id)
            .map(|g| g.name.clone())
            .unwrap_or_default();
        inv = inv.in_guild(GuildContext {
            id: GuildId(guild_id.get()),
            name,
        });
    }

    for opt in cmd.data.options() {
        let value = match opt.value {
            ResolvedValue::String(s) => OptionValue::String(s.to_string()),
            ResolvedValue::User(user, member) => {
                OptionValue::User(user_ref(user, member.map(partial_member_info)))
            }
            ResolvedValue::Channel(channel) => OptionValue::Channel(ChannelRef {
                id: ChannelId(channel.id.get()),
            }),
            _ => continue,
        };
        inv = inv.option(opt.name, value);
    }

    inv
}
