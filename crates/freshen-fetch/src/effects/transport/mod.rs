//! Backends and the ordered chain that selects among them.

use std::time::Duration;

use async_trait::async_trait;
use freshen_notify::{Guard, Handler, Notifier, Source, TotalGuard};
use tracing::debug;

use crate::data::{BackendCapability, FallbackPolicy, TransportConfig};
use crate::effects::stream::ChunkStream;
use crate::error::{Error, ErrorKind, Result};

#[cfg(feature = "baseline")]
mod baseline;
#[cfg(any(feature = "stream", feature = "pooled"))]
mod client;
#[cfg(feature = "pooled")]
mod pooled;
#[cfg(feature = "stream")]
mod streaming;

#[cfg(feature = "baseline")]
pub use baseline::BaselineTransport;
#[cfg(feature = "pooled")]
pub use pooled::PooledTransport;
#[cfg(feature = "stream")]
pub use streaming::StreamingTransport;

/// How long any backend waits for a TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// One way of issuing a GET request and streaming its body.
///
/// Implementations:
/// - [`StreamingTransport`]: reqwest body streams, optionally on a caller's client
/// - [`PooledTransport`]: a reqwest client kept for the configuration's lifetime
/// - [`BaselineTransport`]: HTTP/1.0 over a plain TCP socket
/// - Scripted transports in tests
#[async_trait]
pub trait Transport: Send + Sync {
    /// The backend this transport stands for, used for ordering and logs.
    fn capability(&self) -> BackendCapability;

    /// Issue a GET for `url` and hand back the response body.
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to fetch
    /// * `config` - Proxy and user agent to apply to the request
    ///
    /// # Returns
    ///
    /// `Some` stream of body chunks for a 200 response, reached after
    /// following redirects. `None` for any other final status: the chain
    /// treats that as "no content" and does not try another backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be completed (invalid URL,
    /// unsupported scheme, bad proxy, DNS or connection failure, timeout,
    /// malformed response). The chain reports it and moves on to the next
    /// backend.
    async fn open(&self, url: &str, config: &TransportConfig) -> Result<Option<ChunkStream>>;
}

/// Outcome of one guarded `open`.
#[derive(Debug, Default)]
enum Opened {
    Stream(ChunkStream),
    NoContent,
    #[default]
    Failed,
}

impl From<Option<ChunkStream>> for Opened {
    fn from(stream: Option<ChunkStream>) -> Self {
        stream.map_or(Opened::NoContent, Opened::Stream)
    }
}

/// Backends in precedence order.
pub struct TransportChain {
    transports: Vec<Box<dyn Transport>>,
    fallback: FallbackPolicy,
}

impl TransportChain {
    /// Builds every backend compiled into this build for `config`.
    ///
    /// A backend that cannot be set up (for instance because the proxy is
    /// unusable) is reported and left out.
    pub fn probe(config: &TransportConfig, notifier: &Notifier) -> Self {
        let guard = Guard::<Error, Option<Box<dyn Transport>>>::new(notifier.clone()).otherwise(
            Handler::new("cache")
                .message(Source::Name)
                .detail(Source::Display),
        );

        let transports: Vec<_> = BackendCapability::detect()
            .into_iter()
            .filter_map(|capability| guard.run(|| build(capability, config)))
            .collect();

        debug!(
            backends = ?transports.iter().map(|t| t.capability()).collect::<Vec<_>>(),
            "probed transport backends"
        );
        Self {
            transports,
            fallback: FallbackPolicy::default(),
        }
    }

    /// A chain with no backends; every fetch yields no result.
    pub fn empty() -> Self {
        Self {
            transports: Vec::new(),
            fallback: FallbackPolicy::default(),
        }
    }

    /// Appends a backend with the lowest precedence so far.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transports.push(Box::new(transport));
        self
    }

    #[must_use]
    pub fn fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    pub fn capabilities(&self) -> Vec<BackendCapability> {
        self.transports.iter().map(|t| t.capability()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Opens `url` through the first backend that does not fail.
    ///
    /// Failures are reported through `notifier` and never returned:
    /// connection failures under `cacheConnection`, anything else under
    /// `cache` with the failure name as message and its text as detail.
    pub async fn fetch(
        &self,
        url: &str,
        config: &TransportConfig,
        notifier: &Notifier,
    ) -> Option<ChunkStream> {
        if self.transports.is_empty() {
            debug!(url, "no transport backend available");
            return None;
        }

        let guard = open_guard(notifier);
        for transport in &self.transports {
            let backend = transport.capability();
            debug!(url, %backend, "opening");

            let opened = guard
                .run_async(async { transport.open(url, config).await.map(Opened::from) })
                .await;
            match opened {
                Opened::Stream(stream) => return Some(stream),
                Opened::NoContent => {
                    debug!(url, %backend, "no content");
                    return None;
                }
                Opened::Failed if self.fallback == FallbackPolicy::FirstOnly => break,
                Opened::Failed => debug!(url, %backend, "backend failed, trying next"),
            }
        }
        None
    }
}

impl std::fmt::Debug for TransportChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportChain")
            .field("transports", &self.capabilities())
            .field("fallback", &self.fallback)
            .finish()
    }
}

fn open_guard(notifier: &Notifier) -> TotalGuard<Error, Opened> {
    Guard::<Error, Opened>::new(notifier.clone())
        .on(
            ErrorKind::Connection,
            Handler::new("cacheConnection").message(Source::Display),
        )
        .otherwise(
            Handler::new("cache")
                .message(Source::Name)
                .detail(Source::Display),
        )
}

#[allow(unused_variables)]
fn build(capability: BackendCapability, config: &TransportConfig) -> Result<Option<Box<dyn Transport>>> {
    let transport: Box<dyn Transport> = match capability {
        #[cfg(feature = "stream")]
        BackendCapability::StreamingClient => Box::new(StreamingTransport::new(config)?),
        #[cfg(feature = "pooled")]
        BackendCapability::PooledClient => Box::new(PooledTransport::new(config)?),
        #[cfg(feature = "baseline")]
        BackendCapability::StdlibOnly => Box::new(BaselineTransport),
        #[allow(unreachable_patterns)]
        _ => return Ok(None),
    };
    Ok(Some(transport))
}
