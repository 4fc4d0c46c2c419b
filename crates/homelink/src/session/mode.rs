use serde::Deserialize;
use serde::Serialize;
use strum::Display;

/// Which backend is authoritative for the device directory right now.
///
/// Changed only through the guarded switch on `ModeSession`; everything else
/// holds a read-only subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityMode {
    /// The local hub, reachable only on the home network.
    Home,

    /// The cloud platform, reachable from anywhere.
    Cloud,
}

/// Reachability of the local hub as seen by the probe loop.
///
/// Derived state: recomputed on every probe, never persisted. The probe loop
/// is the only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum HubStatus {
    /// No probe has run yet.
    Unknown,

    /// First probe is in flight.
    Checking,

    Reachable,

    /// One probe failed while reachable. A single dropped packet must not
    /// flap the UI, so a second consecutive failure is required before
    /// declaring the hub unreachable.
    Reconnecting,

    Unreachable,
}

impl HubStatus {
    /// Next status after a probe result.
    pub fn after_probe(self, ok: bool) -> Self {
        match (self, ok) {
            (_, true) => Self::Reachable,
            (Self::Reachable, false) => Self::Reconnecting,
            (_, false) => Self::Unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_failure_while_reachable_goes_to_reconnecting() {
        assert_eq!(
            HubStatus::Reachable.after_probe(false),
            HubStatus::Reconnecting
        );
        assert_eq!(
            HubStatus::Reconnecting.after_probe(false),
            HubStatus::Unreachable
        );
    }

    #[test]
    fn any_success_restores_reachable() {
        for status in [
            HubStatus::Unknown,
            HubStatus::Checking,
            HubStatus::Reconnecting,
            HubStatus::Unreachable,
        ] {
            assert_eq!(status.after_probe(true), HubStatus::Reachable);
        }
    }

    #[test]
    fn initial_probe_failure_is_unreachable() {
        assert_eq!(HubStatus::Checking.after_probe(false), HubStatus::Unreachable);
        assert_eq!(HubStatus::Unknown.after_probe(false), HubStatus::Unreachable);
    }

    #[test]
    fn modes_render_for_messages() {
        assert_eq!(ConnectivityMode::Home.to_string(), "Home");
        assert_eq!(ConnectivityMode::Cloud.to_string(), "Cloud");
    }
}
