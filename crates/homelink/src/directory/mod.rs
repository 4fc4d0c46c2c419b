//! Device-directory assembly: pick the active backend, fetch, classify,
//! filter by access rules, merge cached overrides, and hand the final list to
//! UI and automation callers.

mod access;
mod assembler;
mod cache;
mod device;
mod overrides;


pub use access::filter_by_area;
pub use access::Role;
pub use access::UserContext;
pub use assembler::DeviceDirectory;
pub use assembler::DirectoryError;
pub use cache::DeviceCache;
pub use device::Device;
pub use overrides::apply_travel_overrides;
pub use overrides::cover_entity_ids;
pub use overrides::COVER_DOMAIN;
