use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context as _;
use chrono::Utc;
use serenity::{
    all::{Context, GatewayIntents, Interaction, Ready},
    async_trait,
    prelude::EventHandler,
    Client,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use afb_core::{
    commands::CommandContext,
    config::Config,
    dispatch::CommandDispatcher,
    messaging::{
        port::PlatformPort,
        types::{Embed, COLOR_GREEN},
    },
    presence::PresenceRotator,
};

use crate::{handlers, DiscordPlatform};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub platform: Arc<DiscordPlatform>,
    pub rotator: Arc<PresenceRotator>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(cfg: Arc<Config>) -> afb_core::Result<Self> {
        let platform = Arc::new(DiscordPlatform::new());
        let rotator = Arc::new(PresenceRotator::new(platform.clone()));
        let ctx = CommandContext::new(cfg.clone(), platform.clone(), rotator.clone())?;
        Ok(Self {
            cfg,
            platform,
            rotator,
            dispatcher: Arc::new(CommandDispatcher::new(Arc::new(ctx))),
            shutdown: CancellationToken::new(),
        })
    }
}

struct Handler {
    state: Arc<AppState>,
    rotation_started: AtomicBool,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let state = &self.state;
        state.platform.attach(ctx.clone());

        info!(
            user = %ready.user.name,
            id = ready.user.id.get(),
            servers = ready.guilds.len(),
            "logged in"
        );

        let commands = state.dispatcher.context().registry.specs().await;
        let loaded = match state.platform.sync_commands(&commands).await {
            Ok(synced) => {
                info!(count = synced.len(), "synced commands");
                synced.len()
            }
            Err(e) => {
                warn!(error = %e, "command sync failed");
                commands.len()
            }
        };

        let audit = &state.dispatcher.context().audit;
        match audit.resolve().await {
            Some(channel) => {
                info!(channel = %channel.name, id = channel.id.0, "logging channel ready");
                let startup = Embed::new("🚀 Bot Started")
                    .description(format!(
                        "**Bot:** {}\n**ID:** {}",
                        ready.user.name,
                        ready.user.id.get()
                    ))
                    .color(COLOR_GREEN)
                    .timestamp(Utc::now())
                    .field("Servers", ready.guilds.len().to_string(), true)
                    .field("Users", ctx.cache.user_count().to_string(), true)
                    .field("Commands", format!("{loaded} commands loaded"), true)
                    .footer("Command logging active");
                audit.notice(startup).await;
            }
            None => warn!("command logging disabled until the log channel resolves"),
        }

        if !self.rotation_started.swap(true, Ordering::SeqCst) {
            info!(
                activity_every = ?state.cfg.activity_rotate_every,
                mode_every = ?state.cfg.mode_rotate_every,
                "presence rotation active"
            );
            state.rotator.spawn(
                state.cfg.activity_rotate_every,
                state.cfg.mode_rotate_every,
                state.shutdown.clone(),
            );
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        handlers::handle_interaction(ctx, interaction, self.state.clone()).await;
    }
}

/// Connect to the gateway and serve until Ctrl-C or a fatal gateway error.
pub async fn run_gateway(cfg: Arc<Config>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(cfg.clone())?);

    let handler = Handler {
        state: state.clone(),
        rotation_started: AtomicBool::new(false),
    };

    let mut client = Client::builder(&cfg.discord_token, GatewayIntents::GUILDS)
        .event_handler(handler)
        .await
        .context("failed to build Discord gateway client")?;
    state
        .platform
        .attach_shard_manager(client.shard_manager.clone());

    let shard_manager = client.shard_manager.clone();
    let result = tokio::select! {
        res = client.start() => res.context("Discord gateway client stopped"),
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    };

    state.shutdown.cancel();
    shard_manager.shutdown_all().await;
    result
}
