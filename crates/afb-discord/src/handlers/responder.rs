use async_trait::async_trait;
use serenity::{
    all::{CommandInteraction, Context},
    builder::{
        CreateInteractionResponse, CreateInteractionResponseFollowup,
        CreateInteractionResponseMessage,
    },
};

use afb_core::{
    errors::Error,
    messaging::{port::Responder, types::Reply},
    Result,
};

use crate::build_embed;

/// Replies to one command interaction.
pub struct InteractionResponder {
    ctx: Context,
    interaction: CommandInteraction,
}

impl InteractionResponder {
    pub fn new(ctx: Context, interaction: CommandInteraction) -> Self {
        Self { ctx, interaction }
    }

    pub fn command_name(&self) -> &str {
        &self.interaction.data.name
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::Platform(format!("discord error: {e}"))
    }
}

fn message(reply: Reply) -> CreateInteractionResponseMessage {
    let mut msg = CreateInteractionResponseMessage::new().ephemeral(reply.ephemeral);
    if let Some(content) = reply.content {
        msg = msg.content(content);
    }
    if let Some(embed) = reply.embed {
        msg = msg.embed(build_embed(&embed));
    }
    msg
}

fn followup(reply: Reply) -> CreateInteractionResponseFollowup {
    let mut msg = CreateInteractionResponseFollowup::new().ephemeral(reply.ephemeral);
    if let Some(content) = reply.content {
        msg = msg.content(content);
    }
    if let Some(embed) = reply.embed {
        msg = msg.embed(build_embed(&embed));
    }
    msg
}

#[async_trait]
impl Responder for InteractionResponder {
    async fn defer(&self, ephemeral: bool) -> Result<()> {
        let response = CreateInteractionResponse::Defer(
            CreateInteractionResponseMessage::new().ephemeral(ephemeral),
        );
        self.interaction
            .create_response(&self.ctx, response)
            .await
            .map_err(Self::map_err)
    }

    async fn respond(&self, reply: Reply) -> Result<()> {
        self.interaction
            .create_response(&self.ctx, CreateInteractionResponse::Message(message(reply)))
            .await
            .map_err(Self::map_err)
    }

    async fn followup(&self, reply: Reply) -> Result<()> {
        self.interaction
            .create_followup(&self.ctx, followup(reply))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}
