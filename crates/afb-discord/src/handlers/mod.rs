//! Discord interaction handlers.
//!
//! Each slash-command interaction is converted into a core [`Invocation`] and handed
//! to the core dispatcher together with a [`responder::InteractionResponder`].

use std::sync::Arc;

use serenity::all::{CommandInteraction, Context, Interaction};
use tracing::debug;

use crate::router::AppState;

mod invocation;
mod responder;

pub use invocation::to_invocation;
pub use responder::InteractionResponder;

pub async fn handle_interaction(ctx: Context, interaction: Interaction, state: Arc<AppState>) {
    // Components, autocomplete and modals are not used by this bot.
    let Interaction::Command(cmd) = interaction else {
        return;
    };
    handle_command(ctx, cmd, state).await;
}

async fn handle_command(ctx: Context, cmd: CommandInteraction, state: Arc<AppState>) {
    let inv = to_invocation(&ctx, &cmd);
    let responder = InteractionResponder::new(ctx, cmd);
    let outcome = state.dispatcher.dispatch(inv, &responder).await;
    debug!(command = %responder.command_name(), ?outcome, "interaction handled");
}
