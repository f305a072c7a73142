//! `projects` and `moddl`: relay a remote text file as the reply.

use async_trait::async_trait;

use crate::{
    config::Config,
    formatting::inline_code,
    messaging::types::{Embed, Reply, COLOR_RED},
    Result,
};

use super::{CommandContext, CommandHandler, CommandSpec, Invocation};

pub struct ContentCommand {
    name: &'static str,
    description: &'static str,
    failure_title: &'static str,
    url: fn(&Config) -> &str,
}

impl ContentCommand {
    pub fn projects() -> Self {
        Self {
            name: "projects",
            description: "AquaFrost's Projects and project links",
            failure_title: "❌ Could Not Fetch Projects",
            url: |cfg| cfg.projects_url.as_str(),
        }
    }

    pub fn moddl() -> Self {
        Self {
            name: "moddl",
            description: "Minecraft Mod Download Link",
            failure_title: "❌ Download Failed",
            url: |cfg| cfg.moddl_url.as_str(),
        }
    }
}

#[async_trait]
impl CommandHandler for ContentCommand {
    fn spec(&self) -> CommandSpec {
        CommandSpec::new(self.name, self.description).deferred()
    }

    async fn run(&self, ctx: &CommandContext, _inv: &Invocation) -> Result<Reply> {
        let url = (self.url)(&ctx.cfg);

        // An empty body counts as a failed fetch.
        match ctx.fetcher.fetch(url).await {
            Some(body) if !body.is_empty() => Ok(Reply::text(body)),
            _ => Ok(Reply::embed(
                Embed::new(self.failure_title)
                    .description(format!("Failed to fetch from:\n{}", inline_code(url)))
                    .color(COLOR_RED),
            )),
        }
    }
}
