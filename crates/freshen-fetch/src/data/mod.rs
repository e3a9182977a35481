//! Configuration values passed into every fetch.

mod capability;
mod config;

pub use capability::BackendCapability;
pub use config::{ClientHandle, FallbackPolicy, TransportConfig};
