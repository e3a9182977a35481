//! Fetching remote bytes through interchangeable transport backends.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Configuration values and backend identities
//! - [`core`] - Pure string transformations (proxy normalization, URL helpers)
//! - [`effects`] - Backends, the fallback chain and persistence
//!
//! # Backends
//!
//! Each backend is a Cargo feature, all enabled by default. They are tried in
//! this order:
//!
//! | feature    | backend                                   |
//! |------------|-------------------------------------------|
//! | `stream`   | [`BackendCapability::StreamingClient`]    |
//! | `pooled`   | [`BackendCapability::PooledClient`]       |
//! | `baseline` | [`BackendCapability::StdlibOnly`]         |
//!
//! With none of them enabled the crate still builds; every fetch then yields
//! no result.
//!
//! # Failures
//!
//! Nothing anticipated escapes [`DownloadManager`]: failures are turned into
//! notifications through a [`freshen_notify::Notifier`] and the call yields
//! `None` or `false`.

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{DEFAULT_PROXY_SCHEME, extension_from_url, is_url, normalize_proxy};
pub use crate::data::{BackendCapability, ClientHandle, FallbackPolicy, TransportConfig};
pub use crate::effects::{
    BoxStream, CHUNK_SIZE, CONNECT_TIMEOUT, CancelHandle, ChunkStream, DownloadManager, Saved,
    StreamState, Transport, TransportChain, rechunk, save_stream,
};

#[cfg(feature = "baseline")]
pub use effects::BaselineTransport;
#[cfg(feature = "pooled")]
pub use effects::PooledTransport;
#[cfg(feature = "stream")]
pub use effects::StreamingTransport;

pub use error::{Error, ErrorKind, Result};

pub use async_trait::async_trait;
