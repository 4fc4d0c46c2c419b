use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;

use super::mode::ConnectivityMode;
use super::mode::HubStatus;
use crate::backend::HubBackend;
use crate::directory::DeviceCache;

/// Result of an availability check or a switch attempt.
///
/// Validation failures are data, not errors: the UI renders `message` instead
/// of walking an exception path.
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub available: bool,
    pub message: String,
}

impl Availability {
    fn ok(message: &str) -> Self {
        Self {
            available: true,
            message: message.to_string(),
        }
    }

    fn unavailable(message: &str) -> Self {
        Self {
            available: false,
            message: message.to_string(),
        }
    }
}

/// Choices presented while Home mode has lost the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    RetryProbe,
    SwitchToCloud,
}

/// Blocking prompt shown instead of a stale or absent device list.
#[derive(Debug, Clone, Serialize)]
pub struct GatePrompt {
    pub message: String,
    pub actions: Vec<GateAction>,
}

/// Connectivity state shared by every UI surface.
///
/// `ConnectivityMode` has exactly one writer: `switch_mode` on this type.
/// `HubStatus` has exactly one writer: the probe loop. Everything else reads
/// through watch subscriptions.
pub struct ModeSession {
    mode: watch::Sender<ConnectivityMode>,
    status: watch::Receiver<HubStatus>,
    hub: Option<Arc<dyn HubBackend>>,
    cloud_enabled: bool,
    cache: Arc<DeviceCache>,
    probe_timeout: Duration,
}

impl ModeSession {
    pub fn new(
        initial_mode: ConnectivityMode,
        hub: Option<Arc<dyn HubBackend>>,
        cloud_enabled: bool,
        status: watch::Receiver<HubStatus>,
        cache: Arc<DeviceCache>,
        probe_timeout: Duration,
    ) -> Self {
        let (mode, _) = watch::channel(initial_mode);
        Self {
            mode,
            status,
            hub,
            cloud_enabled,
            cache,
            probe_timeout,
        }
    }

    pub fn mode(&self) -> ConnectivityMode {
        *self.mode.borrow()
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<ConnectivityMode> {
        self.mode.subscribe()
    }

    pub fn hub_status(&self) -> HubStatus {
        *self.status.borrow()
    }

    /// Whether a mode is currently available to switch to.
    ///
    /// Cloud availability is a local flag check on the linked hub connection,
    /// no network involved. Home availability issues a bounded reachability
    /// probe right now.
    pub async fn check_availability(&self, target: ConnectivityMode) -> Availability {
        match target {
            ConnectivityMode::Cloud => {
                if self.cloud_enabled {
                    Availability::ok("Cloud Mode Available")
                } else {
                    Availability::unavailable("Cloud Mode Unavailable")
                }
            }
            ConnectivityMode::Home => match &self.hub {
                None => Availability::unavailable("No home hub is paired with this account"),
                Some(hub) => {
                    if hub.probe(self.probe_timeout).await {
                        Availability::ok("Home hub is reachable")
                    } else {
                        Availability::unavailable("Home hub did not respond on this network")
                    }
                }
            },
        }
    }

    /// Switch the active mode. The only path that writes `ConnectivityMode`.
    ///
    /// Availability is re-validated here; a prior positive check is never
    /// trusted. On failure nothing changes and the structured result says
    /// why. On success the destination's cached device list is cleared
    /// before the mode commits, forcing the next assembly to refetch.
    pub async fn switch_mode(&self, target: ConnectivityMode, user_id: &str) -> Availability {
        let availability = self.check_availability(target).await;
        if !availability.available {
            info!(
                "refusing switch to {} mode for {}: {}",
                target, user_id, availability.message
            );
            return availability;
        }

        self.cache.invalidate(user_id, target);
        self.mode.send_replace(target);
        info!("connectivity mode switched to {} for {}", target, user_id);
        availability
    }

    /// The blocking choice owed to the user when Home mode has lost the hub.
    ///
    /// While this returns a prompt, directory assembly must not proceed with
    /// stale or absent data.
    pub fn gate_prompt(&self) -> Option<GatePrompt> {
        if self.mode() == ConnectivityMode::Home && self.hub_status() == HubStatus::Unreachable {
            Some(GatePrompt {
                message: "The home hub is unreachable. Retry the connection or switch to \
                          Cloud Mode."
                    .to_string(),
                actions: vec![GateAction::RetryProbe, GateAction::SwitchToCloud],
            })
        } else {
            None
        }
    }
}

/// Handle to the background probe loop.
pub struct ProbeHandle {
    status: watch::Receiver<HubStatus>,
    kick: Arc<Notify>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// Cloneable trigger for an immediate probe, handed to the API layer so a
/// gate retry can bypass the regular cadence.
#[derive(Clone)]
pub struct ProbeKick(Arc<Notify>);

impl ProbeKick {
    pub fn kick(&self) {
        self.0.notify_one();
    }
}

impl ProbeHandle {
    pub fn status(&self) -> watch::Receiver<HubStatus> {
        self.status.clone()
    }

    /// Request an immediate probe outside the regular cadence (gate retry).
    pub fn kick(&self) {
        self.kick.notify_one();
    }

    pub fn kicker(&self) -> ProbeKick {
        ProbeKick(Arc::clone(&self.kick))
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

/// Spawn the probe loop, the single writer of `HubStatus`.
///
/// Probes once at startup, then on every interval tick and on every kick.
pub fn spawn_probe_loop(
    hub: Arc<dyn HubBackend>,
    interval: Duration,
    timeout: Duration,
) -> ProbeHandle {
    let (status_tx, status_rx) = watch::channel(HubStatus::Unknown);
    let kick = Arc::new(Notify::new());
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let loop_kick = Arc::clone(&kick);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = loop_kick.notified() => {}
                _ = &mut shutdown_rx => break,
            }

            if *status_tx.borrow() == HubStatus::Unknown {
                status_tx.send_replace(HubStatus::Checking);
            }

            let ok = hub.probe(timeout).await;
            let current = *status_tx.borrow();
            let next = current.after_probe(ok);
            if next != current {
                debug!("hub status {} -> {}", current, next);
            }
            status_tx.send_replace(next);
        }
    });

    ProbeHandle {
        status: status_rx,
        kick,
        shutdown: Some(shutdown_tx),
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockHub;
    use crate::directory::Device;

    fn session_with_hub(
        hub: Option<Arc<MockHub>>,
        cloud_enabled: bool,
        initial_mode: ConnectivityMode,
        status: HubStatus,
    ) -> (ModeSession, Arc<DeviceCache>, watch::Sender<HubStatus>) {
        let cache = Arc::new(DeviceCache::new());
        let (status_tx, status_rx) = watch::channel(status);
        let session = ModeSession::new(
            initial_mode,
            hub.map(|h| h as Arc<dyn HubBackend>),
            cloud_enabled,
            status_rx,
            Arc::clone(&cache),
            Duration::from_secs(2),
        );
        (session, cache, status_tx)
    }

    #[tokio::test]
    async fn cloud_availability_is_a_flag_check() {
        let (session, _, _tx) =
            session_with_hub(None, false, ConnectivityMode::Home, HubStatus::Unknown);
        let availability = session.check_availability(ConnectivityMode::Cloud).await;
        assert!(!availability.available);
        assert_eq!(availability.message, "Cloud Mode Unavailable");

        let refused = session.switch_mode(ConnectivityMode::Cloud, "alice").await;
        assert!(!refused.available);
        assert_eq!(session.mode(), ConnectivityMode::Home);
    }

    #[tokio::test]
    async fn switch_to_home_revalidates_the_probe() {
        let hub = Arc::new(MockHub::reachable(vec![]));
        let (session, _, _tx) = session_with_hub(
            Some(Arc::clone(&hub)),
            true,
            ConnectivityMode::Cloud,
            HubStatus::Reachable,
        );

        // A positive check is not a license to switch later.
        assert!(session.check_availability(ConnectivityMode::Home).await.available);

        hub.set_reachable(false);
        let refused = session.switch_mode(ConnectivityMode::Home, "alice").await;
        assert!(!refused.available);
        assert_eq!(session.mode(), ConnectivityMode::Cloud);
        // Both the check and the switch issued their own probe.
        assert_eq!(hub.probe_count(), 2);
    }

    #[tokio::test]
    async fn successful_switch_clears_the_destination_cache() {
        let hub = Arc::new(MockHub::reachable(vec![]));
        let (session, cache, _tx) = session_with_hub(
            Some(hub),
            true,
            ConnectivityMode::Cloud,
            HubStatus::Reachable,
        );

        cache.store(
            "alice",
            ConnectivityMode::Home,
            vec![Device::for_test("light.a", "on", "Kitchen", &["Light"])],
        );
        cache.store(
            "alice",
            ConnectivityMode::Cloud,
            vec![Device::for_test("light.b", "on", "Kitchen", &["Light"])],
        );

        let result = session.switch_mode(ConnectivityMode::Home, "alice").await;
        assert!(result.available);
        assert_eq!(session.mode(), ConnectivityMode::Home);

        // The destination entry is gone; the other mode's entry is untouched.
        assert!(cache.get("alice", ConnectivityMode::Home).is_none());
        assert!(cache.get("alice", ConnectivityMode::Cloud).is_some());
    }

    #[tokio::test]
    async fn gate_prompt_only_when_home_and_unreachable() {
        let (session, _, status_tx) =
            session_with_hub(None, true, ConnectivityMode::Home, HubStatus::Reachable);
        assert!(session.gate_prompt().is_none());

        status_tx.send_replace(HubStatus::Unreachable);
        let prompt = session.gate_prompt().expect("gate expected");
        assert_eq!(
            prompt.actions,
            vec![GateAction::RetryProbe, GateAction::SwitchToCloud]
        );

        let cloud = session.switch_mode(ConnectivityMode::Cloud, "alice").await;
        assert!(cloud.available);
        assert!(session.gate_prompt().is_none());
    }

    #[tokio::test]
    async fn probe_loop_walks_the_status_machine() {
        let hub = Arc::new(MockHub::reachable(vec![]));
        let handle = spawn_probe_loop(
            Arc::clone(&hub) as Arc<dyn HubBackend>,
            Duration::from_secs(3600),
            Duration::from_secs(2),
        );
        let mut status = handle.status();

        wait_for(&mut status, HubStatus::Reachable).await;

        hub.set_reachable(false);
        handle.kick();
        wait_for(&mut status, HubStatus::Reconnecting).await;

        handle.kick();
        wait_for(&mut status, HubStatus::Unreachable).await;

        hub.set_reachable(true);
        handle.kick();
        wait_for(&mut status, HubStatus::Reachable).await;

        handle.shutdown().await;
    }

    async fn wait_for(status: &mut watch::Receiver<HubStatus>, want: HubStatus) {
        tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| *s == want))
            .await
            .expect("status change timed out")
            .expect("probe loop ended");
    }
}
