//! Connectivity state: which backend is authoritative, whether the hub is
//! reachable, and the guarded operations that change either.

mod machine;
mod mode;
pub mod network;

pub use machine::spawn_probe_loop;
pub use machine::Availability;
pub use machine::GateAction;
pub use machine::GatePrompt;
pub use machine::ModeSession;
pub use machine::ProbeHandle;
pub use machine::ProbeKick;
pub use mode::ConnectivityMode;
pub use mode::HubStatus;
