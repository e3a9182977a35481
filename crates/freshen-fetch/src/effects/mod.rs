//! Network and filesystem effects.

mod manager;
mod stream;
mod transport;

pub use manager::{DownloadManager, Saved, save_stream};
pub use stream::{BoxStream, CHUNK_SIZE, CancelHandle, ChunkStream, StreamState, rechunk};
pub use transport::{CONNECT_TIMEOUT, Transport, TransportChain};

#[cfg(feature = "baseline")]
pub use transport::BaselineTransport;
#[cfg(feature = "pooled")]
pub use transport::PooledTransport;
#[cfg(feature = "stream")]
pub use transport::StreamingTransport;
