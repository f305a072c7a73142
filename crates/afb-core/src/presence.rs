//! Presence rotation.
//!
//! Two independent counters (activity text, online/idle/dnd mode) advance on their own
//! timers and both feed the same "apply presence" call. The tokio runtime is
//! multi-threaded, so the counters sit behind a mutex; the lock is released before the
//! platform call is awaited.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::Result;

pub const ACTIVITIES: [&str; 5] = [
    "Aqua Client",
    "Apple Client",
    "Jet Client",
    "Loup Client",
    "Unifix Client",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresenceMode {
    Online,
    Idle,
    Dnd,
}

pub const MODES: [PresenceMode; 3] = [PresenceMode::Online, PresenceMode::Idle, PresenceMode::Dnd];

impl PresenceMode {
    pub fn emoji(self) -> &'static str {
        match self {
            PresenceMode::Online => "🟢",
            PresenceMode::Idle => "🌙",
            PresenceMode::Dnd => "⛔",
        }
    }
}

/// The presence pushed to the platform: a "Playing ..." activity plus a mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityDescriptor {
    pub activity: String,
    pub mode: PresenceMode,
}

/// Port for pushing presence to the gateway session.
#[async_trait]
pub trait PresencePort: Send + Sync {
    /// Whether the session is connected and ready to accept presence updates.
    fn is_ready(&self) -> bool;

    async fn apply_presence(&self, presence: &ActivityDescriptor) -> Result<()>;
}

/// Circular indices over the fixed activity and mode lists.
#[derive(Clone, Debug)]
pub struct RotationState {
    activity_index: usize,
    mode_index: usize,
    activities: Vec<String>,
    modes: Vec<PresenceMode>,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            activity_index: 0,
            mode_index: 0,
            activities: ACTIVITIES.iter().map(|s| s.to_string()).collect(),
            modes: MODES.to_vec(),
        }
    }
}

impl RotationState {
    pub fn activity_index(&self) -> usize {
        self.activity_index
    }

    pub fn mode_index(&self) -> usize {
        self.mode_index
    }

    pub fn current_activity(&self) -> &str {
        &self.activities[self.activity_index]
    }

    pub fn current_mode(&self) -> PresenceMode {
        self.modes[self.mode_index]
    }

    /// Returns the pre-advance activity with the (unchanged) current mode.
    fn step_activity(&mut self) -> ActivityDescriptor {
        let activity = self.activities[self.activity_index].clone();
        self.activity_index = (self.activity_index + 1) % self.activities.len();
        ActivityDescriptor {
            activity,
            mode: self.current_mode(),
        }
    }

    /// Returns the pre-advance mode with the current activity.
    fn step_mode(&mut self) -> ActivityDescriptor {
        let mode = self.modes[self.mode_index];
        self.mode_index = (self.mode_index + 1) % self.modes.len();
        ActivityDescriptor {
            activity: self.current_activity().to_string(),
            mode,
        }
    }
}

pub struct PresenceRotator {
    state: Mutex<RotationState>,
    port: Arc<dyn PresencePort>,
}

impl PresenceRotator {
    pub fn new(port: Arc<dyn PresencePort>) -> Self {
        Self {
            state: Mutex::new(RotationState::default()),
            port,
        }
    }

    /// Advance the activity counter and push the new presence.
    ///
    /// `None` (and no state change) while the session is not ready.
    pub async fn advance_activity(&self) -> Option<ActivityDescriptor> {
        if !self.port.is_ready() {
            return None;
        }
        let presence = { self.state.lock().await.step_activity() };
        self.apply(&presence).await;
        Some(presence)
    }

    /// Advance the mode counter and push the new presence.
    ///
    /// `None` (and no state change) while the session is not ready.
    pub async fn advance_mode(&self) -> Option<PresenceMode> {
        if !self.port.is_ready() {
            return None;
        }
        let presence = { self.state.lock().await.step_mode() };
        self.apply(&presence).await;
        Some(presence.mode)
    }

    /// Current activity text and mode, for status replies.
    pub async fn current(&self) -> (String, PresenceMode) {
        let st = self.state.lock().await;
        (st.current_activity().to_string(), st.current_mode())
    }

    pub async fn snapshot(&self) -> RotationState {
        self.state.lock().await.clone()
    }

    // State has already advanced; a failed push is simply superseded by the next tick.
    async fn apply(&self, presence: &ActivityDescriptor) {
        match self.port.apply_presence(presence).await {
            Ok(()) => debug!(activity = %presence.activity, mode = ?presence.mode, "presence updated"),
            Err(e) => warn!(error = %e, "failed to update presence"),
        }
    }

    /// Start the two rotation loops. Both stop when `cancel` fires.
    pub fn spawn(
        self: &Arc<Self>,
        activity_every: Duration,
        mode_every: Duration,
        cancel: CancellationToken,
    ) -> (JoinHandle<()>, JoinHandle<()>) {
        let activity_task = {
            let rotator = Arc::clone(self);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut ticker = interval(activity_every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            rotator.advance_activity().await;
                        }
                    }
                }
            })
        };

        let mode_task = {
            let rotator = Arc::clone(self);
            tokio::spawn(async move {
                let mut ticker = interval(mode_every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            rotator.advance_mode().await;
                        }
                    }
                }
            })
        };

        (activity_task, mode_task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePresence;

    fn rotator(port: &Arc<FakePresence>) -> PresenceRotator {
        PresenceRotator::new(port.clone())
    }

    #[tokio::test]
    async fn activity_cycles_with_period_five() {
        let port = Arc::new(FakePresence::ready());
        let r = rotator(&port);

        let mut seen = Vec::new();
        for _ in 0..10 {
            seen.push(r.advance_activity().await.unwrap().activity);
        }
        assert_eq!(&seen[..5], &ACTIVITIES.map(String::from)[..]);
        assert_eq!(seen[..5], seen[5..]);
        assert_eq!(r.snapshot().await.activity_index(), 0);
    }

    #[tokio::test]
    async fn activity_period_is_independent_of_mode_advances() {
        let port = Arc::new(FakePresence::ready());
        let r = rotator(&port);

        for n in 1..=12 {
            r.advance_activity().await.unwrap();
            if n % 2 == 0 {
                r.advance_mode().await.unwrap();
            }
            assert_eq!(r.snapshot().await.activity_index(), n % 5);
        }
    }

    #[tokio::test]
    async fn mode_cycles_with_period_three() {
        let port = Arc::new(FakePresence::ready());
        let r = rotator(&port);
        r.advance_activity().await.unwrap();
        r.advance_activity().await.unwrap();

        let modes: Vec<_> = {
            let mut out = Vec::new();
            for _ in 0..6 {
                out.push(r.advance_mode().await.unwrap());
            }
            out
        };
        assert_eq!(modes[..3], MODES);
        assert_eq!(modes[..3], modes[3..]);
        // Activity index untouched by mode advances.
        assert_eq!(r.snapshot().await.activity_index(), 2);
    }

    #[tokio::test]
    async fn activity_advance_pairs_previous_activity_with_current_mode() {
        let port = Arc::new(FakePresence::ready());
        let r = rotator(&port);
        r.advance_mode().await.unwrap(); // mode index -> 1 (Idle)

        let d = r.advance_activity().await.unwrap();
        assert_eq!(d.activity, "Aqua Client");
        assert_eq!(d.mode, PresenceMode::Idle);
        assert_eq!(port.applied().last(), Some(&d));
    }

    #[tokio::test]
    async fn mode_advance_applies_current_activity() {
        let port = Arc::new(FakePresence::ready());
        let r = rotator(&port);
        r.advance_activity().await.unwrap(); // activity index -> 1

        let mode = r.advance_mode().await.unwrap();
        assert_eq!(mode, PresenceMode::Online);
        assert_eq!(
            port.applied().last(),
            Some(&ActivityDescriptor {
                activity: "Apple Client".to_string(),
                mode: PresenceMode::Online,
            })
        );
    }

    #[tokio::test]
    async fn not_ready_is_a_noop() {
        let port = Arc::new(FakePresence::not_ready());
        let r = rotator(&port);

        assert!(r.advance_activity().await.is_none());
        assert!(r.advance_mode().await.is_none());
        let st = r.snapshot().await;
        assert_eq!((st.activity_index(), st.mode_index()), (0, 0));
        assert!(port.applied().is_empty());
    }

    #[tokio::test]
    async fn apply_failure_still_advances() {
        let port = Arc::new(FakePresence::ready());
        port.fail_applies(true);
        let r = rotator(&port);

        assert!(r.advance_activity().await.is_some());
        assert!(r.advance_mode().await.is_some());
        let st = r.snapshot().await;
        assert_eq!((st.activity_index(), st.mode_index()), (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loops_tick_independently_and_stop_on_cancel() {
        let port = Arc::new(FakePresence::ready());
        let r = Arc::new(rotator(&port));
        let cancel = CancellationToken::new();

        let (a, m) = r.spawn(Duration::from_secs(5), Duration::from_secs(10), cancel.clone());

        // Ticks at t=0 for both, then t=5 (activity), t=10 (both).
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        let st = r.snapshot().await;
        assert_eq!(st.activity_index(), 3);
        assert_eq!(st.mode_index(), 2);

        cancel.cancel();
        a.await.unwrap();
        m.await.unwrap();

        let before = port.applied().len();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(port.applied().len(), before);
    }
}
