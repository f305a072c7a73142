//! Find-or-create for the bot's per-channel webhook.
//!
//! There is no lock around the lookup and the creation: two concurrent `webhook-say`
//! calls on a channel without a bot webhook can both miss and both create one. The
//! next lookup then simply picks the first bot-owned webhook it sees.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::info;

use crate::{
    domain::{ChannelId, UserId},
    messaging::{port::PlatformPort, types::WebhookHandle},
    Result,
};

const CREATE_REASON: &str = "Created for webhook-say command";

#[derive(Default)]
pub struct WebhookCache {
    by_channel: Mutex<HashMap<ChannelId, WebhookHandle>>,
}

impl WebhookCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the bot's webhook in `channel`, creating one named `name` if none exists.
    pub async fn find_or_create(
        &self,
        platform: &dyn PlatformPort,
        channel: ChannelId,
        bot_id: UserId,
        name: &str,
    ) -> Result<WebhookHandle> {
        if let Some(hit) = self.by_channel.lock().await.get(&channel).cloned() {
            return Ok(hit);
        }

        let existing = platform
            .list_webhooks(channel)
            .await?
            .into_iter()
            .find(|w| w.owner_id == Some(bot_id));

        let hook = match existing {
            Some(hook) => hook,
            None => {
                let hook = platform.create_webhook(channel, name, CREATE_REASON).await?;
                info!(channel = channel.0, webhook = hook.id.0, "created webhook");
                hook
            }
        };

        self.by_channel.lock().await.insert(channel, hook.clone());
        Ok(hook)
    }

    /// Drop a cached handle (e.g. after the platform reports it gone).
    pub async fn forget(&self, channel: ChannelId) {
        self.by_channel.lock().await.remove(&channel);
    }
}
