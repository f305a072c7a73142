//! Command dispatch pipeline: gate, acknowledge, audit, run, reply.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    audit::AuditRecord,
    commands::{CommandContext, CommandHandler, CommandSpec, Invocation},
    errors::Error,
    formatting::code_block,
    messaging::{
        port::Responder,
        types::{Embed, Reply, COLOR_RED},
    },
    utils::{clip_chars, ERROR_TEXT_MAX},
};

const ADMIN_REQUIRED: &str = "❌ You need the **Administrator** permission to use this command.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler ran and its reply was delivered.
    Completed,
    /// Handler (or delivery) failed; the user got an error reply where possible.
    Failed,
    /// Admin-only command invoked without the Administrator capability.
    Rejected,
    /// No handler registered under that name.
    Unknown,
}

pub fn error_reply(spec: &CommandSpec, err: &Error) -> Reply {
    Reply::embed(
        Embed::new(spec.error_title)
            .description(code_block(clip_chars(&err.to_string(), ERROR_TEXT_MAX)))
            .color(COLOR_RED),
    )
    .ephemeral(spec.ephemeral())
}

pub struct CommandDispatcher {
    ctx: Arc<CommandContext>,
}

impl CommandDispatcher {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<CommandContext> {
        &self.ctx
    }

    pub async fn dispatch(&self, inv: Invocation, responder: &dyn Responder) -> DispatchOutcome {
        let Some(handler) = self.ctx.registry.get(&inv.command).await else {
            warn!(command = %inv.command, "unknown command");
            let _ = responder
                .respond(Reply::text("❓ Unknown command").ephemeral(true))
                .await;
            return DispatchOutcome::Unknown;
        };
        let spec = handler.spec();

        if spec.admin_only && !inv.actor.is_admin {
            info!(
                command = spec.name,
                user = inv.actor.user.id.0,
                "rejected non-admin invocation"
            );
            let reply = Reply::embed(
                Embed::new("❌ Permission Denied")
                    .description(ADMIN_REQUIRED)
                    .color(COLOR_RED),
            )
            .ephemeral(true);
            if let Err(e) = responder.respond(reply).await {
                warn!(command = spec.name, error = %e, "failed to send rejection");
            }
            return DispatchOutcome::Rejected;
        }

        if spec.deferred {
            if let Err(e) = responder.defer(spec.ephemeral()).await {
                // Without an acknowledgement there is nothing left to reply to.
                warn!(command = spec.name, error = %e, "failed to defer interaction");
                return DispatchOutcome::Failed;
            }
        }

        let record = AuditRecord::new(
            spec.name,
            inv.actor.user.clone(),
            inv.guild.clone(),
            handler.audit_args(&inv),
        );
        let audit = self.ctx.audit.clone();
        tokio::spawn(async move { audit.record(record).await });

        debug!(command = spec.name, user = inv.actor.user.id.0, "running command");

        // Run on its own task so a panicking handler only fails this invocation.
        let ctx = self.ctx.clone();
        let task = tokio::spawn(async move { handler.run(&ctx, &inv).await });
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(Error::External(format!("command task failed: {e}"))),
        };

        match result {
            Ok(mut reply) => {
                reply.ephemeral |= spec.ephemeral();
                match send(responder, &spec, reply).await {
                    Ok(()) => DispatchOutcome::Completed,
                    Err(e) => {
                        warn!(command = spec.name, error = %e, "reply failed; sending error");
                        report(responder, &spec, &e).await;
                        DispatchOutcome::Failed
                    }
                }
            }
            Err(e) => {
                error!(command = spec.name, error = %e, "command failed");
                report(responder, &spec, &e).await;
                DispatchOutcome::Failed
            }
        }
    }
}

async fn send(responder: &dyn Responder, spec: &CommandSpec, reply: Reply) -> crate::Result<()> {
    if spec.deferred {
        responder.followup(reply).await
    } else {
        responder.respond(reply).await
    }
}

async fn report(responder: &dyn Responder, spec: &CommandSpec, err: &Error) {
    if let Err(e) = send(responder, spec, error_reply(spec, err)).await {
        warn!(command = spec.name, error = %e, "failed to deliver error reply");
    }
}
