use std::path::{Path, PathBuf};

use freshen_fs::StagedFile;
use freshen_notify::{Guard, Handler, Notifier, Source, TotalGuard};
use tracing::{debug, info};

use crate::data::{FallbackPolicy, TransportConfig};
use crate::effects::stream::ChunkStream;
use crate::effects::transport::TransportChain;
use crate::error::{Error, ErrorKind, Result};

/// Result of persisting a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub path: PathBuf,
    pub bytes_written: u64,
    /// The whole body, when it was requested.
    pub data: Option<Vec<u8>>,
}

/// Writes `stream` to `destination` one chunk at a time, in arrival order.
///
/// The destination is replaced only after the last chunk has been written
/// and synced. On any failure, cancellation included, a previously cached
/// file stays as it was and no partial file is left behind.
///
/// # Arguments
///
/// * `stream` - The body to persist; it is consumed and released
/// * `destination` - The file to create or replace
/// * `keep` - Also collect the body in memory
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if the stream was cancelled before its end,
/// the chunk error if the body failed mid-way, or [`Error::Fs`] if the
/// staging file could not be created, written or renamed.
pub async fn save_stream(
    mut stream: ChunkStream,
    destination: impl AsRef<Path>,
    keep: bool,
) -> Result<Saved> {
    let mut staged = StagedFile::create(destination)?;
    let mut data = keep.then(Vec::new);

    while let Some(chunk) = stream.next_chunk().await {
        let chunk = chunk?;
        staged.write_chunk(&chunk).await?;
        if let Some(data) = data.as_mut() {
            data.extend_from_slice(&chunk);
        }
    }
    if stream.was_cancelled() {
        return Err(Error::Cancelled);
    }

    let bytes_written = staged.written();
    let path = staged.commit().await?;
    info!(path = %path.display(), bytes = bytes_written, backend = %stream.backend(), "saved download");
    Ok(Saved {
        path,
        bytes_written,
        data,
    })
}

/// Owns the transport settings and the backends probed for them.
#[derive(Debug)]
pub struct DownloadManager {
    config: TransportConfig,
    chain: TransportChain,
    notifier: Notifier,
    probed: bool,
}

impl DownloadManager {
    /// Probes the compiled-in backends for `config`.
    pub fn new(config: TransportConfig, notifier: Notifier) -> Self {
        let chain = TransportChain::probe(&config, &notifier);
        Self {
            config,
            chain,
            notifier,
            probed: true,
        }
    }

    /// Uses a caller-assembled chain. It is kept as is when settings change.
    pub fn with_chain(config: TransportConfig, chain: TransportChain, notifier: Notifier) -> Self {
        Self {
            config,
            chain,
            notifier,
            probed: false,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn chain(&self) -> &TransportChain {
        &self.chain
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Normalizes and stores the proxy, then rebuilds the probed backends.
    pub fn set_proxy(&mut self, raw: Option<&str>) {
        self.config.set_proxy(raw);
        if self.probed {
            let fallback = self.chain.fallback_policy();
            self.chain = TransportChain::probe(&self.config, &self.notifier).fallback(fallback);
        }
    }

    pub fn set_user_agent(&mut self, user_agent: Option<&str>) {
        self.config.set_user_agent(user_agent);
    }

    pub fn set_fallback(&mut self, fallback: FallbackPolicy) {
        let chain = std::mem::replace(&mut self.chain, TransportChain::empty());
        self.chain = chain.fallback(fallback);
    }

    /// Opens `url`; `None` when no backend produced a body.
    pub async fn fetch(&self, url: &str) -> Option<ChunkStream> {
        self.chain.fetch(url, &self.config, &self.notifier).await
    }

    /// Fetches `url` into `destination`, replacing any existing file.
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to fetch
    /// * `destination` - The cached file to create or replace
    ///
    /// # Returns
    ///
    /// `true` only if a body was received and completely written. Failures
    /// are never returned: they are reported to the notifier (`cacheSave`,
    /// `cacheConnection` or `cache`) and yield `false`. "No content" and an
    /// empty chain yield `false` without a report.
    pub async fn download_save(&self, url: &str, destination: impl AsRef<Path>) -> bool {
        self.download(url, destination.as_ref(), false).await.is_some()
    }

    /// Like [`download_save`](Self::download_save), also returning the body.
    pub async fn download_save_with_data(
        &self,
        url: &str,
        destination: impl AsRef<Path>,
    ) -> Option<Vec<u8>> {
        self.download(url, destination.as_ref(), true)
            .await
            .and_then(|saved| saved.data)
    }

    async fn download(&self, url: &str, destination: &Path, keep: bool) -> Option<Saved> {
        let stream = self.fetch(url).await?;
        match save_stream(stream, destination, keep).await {
            Ok(saved) => Some(saved),
            Err(Error::Cancelled) => {
                debug!(url, "download cancelled, destination untouched");
                None
            }
            Err(err) => save_guard(&self.notifier, destination).handle(err),
        }
    }
}

fn save_guard(notifier: &Notifier, destination: &Path) -> TotalGuard<Error, Option<Saved>> {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| destination.display().to_string());

    Guard::<Error, Option<Saved>>::new(notifier.clone())
        .on(
            ErrorKind::Io,
            Handler::new("cacheSave")
                .message(name)
                .detail(Source::Display),
        )
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
