use std::fmt;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::data::BackendCapability;
use crate::error::Result;

pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Size of the chunks the streaming backend hands out.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Lifecycle of a [`ChunkStream`].
///
/// `Closed` is reachable from either other state and is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Running,
    CancelRequested,
    Closed,
}

/// Finite, single-pass sequence of response body chunks.
///
/// The underlying response (and its connection) is released exactly once:
/// when the body is exhausted, when a chunk fails, when the stream is
/// cancelled, or when the stream is dropped.
pub struct ChunkStream {
    backend: BackendCapability,
    inner: Option<BoxStream<'static, Result<Bytes>>>,
    cancel: CancellationToken,
    closed: CancellationToken,
}

impl ChunkStream {
    /// Wraps a response body opened by `backend`.
    ///
    /// # Arguments
    ///
    /// * `backend` - The backend that opened the response
    /// * `body` - The body chunks; dropping it releases the connection
    pub fn new(
        backend: BackendCapability,
        body: impl Stream<Item = Result<Bytes>> + Send + 'static,
    ) -> Self {
        Self {
            backend,
            inner: Some(Box::pin(body)),
            cancel: CancellationToken::new(),
            closed: CancellationToken::new(),
        }
    }

    /// A stream over chunks already in memory.
    pub fn from_chunks(backend: BackendCapability, chunks: Vec<Bytes>) -> Self {
        Self::new(backend, stream::iter(chunks.into_iter().map(Ok)))
    }

    /// The backend that opened this stream.
    pub fn backend(&self) -> BackendCapability {
        self.backend
    }

    pub fn state(&self) -> StreamState {
        if self.closed.is_cancelled() {
            StreamState::Closed
        } else if self.cancel.is_cancelled() {
            StreamState::CancelRequested
        } else {
            StreamState::Running
        }
    }

    /// Whether the stream ended because it was cancelled rather than exhausted.
    pub fn was_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A handle other tasks can use to stop this stream.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancel: self.cancel.clone(),
            closed: self.closed.clone(),
        }
    }

    /// Waits for the next chunk.
    ///
    /// # Returns
    ///
    /// `Some(Ok(chunk))` while the body lasts, `None` once it is exhausted,
    /// closed or cancelled. A pending read is abandoned as soon as
    /// cancellation is requested; the stream then closes and yields `None`
    /// instead of an error.
    ///
    /// # Errors
    ///
    /// Yields `Some(Err(_))` once if the backend fails mid-body (reset
    /// connection, timeout, early EOF). The stream is closed afterwards.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        let inner = self.inner.as_mut()?;
        let next = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            item = inner.next() => item,
        };
        match next {
            Some(Ok(chunk)) => Some(Ok(chunk)),
            Some(Err(err)) => {
                self.close();
                Some(Err(err))
            }
            None => {
                self.close();
                None
            }
        }
    }

    /// Cancels any in-flight read and closes the stream.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        self.close();
    }

    /// Releases the underlying response. Calling it again does nothing.
    pub fn close(&mut self) {
        if let Some(inner) = self.inner.take() {
            drop(inner);
            tracing::trace!(backend = %self.backend, "released response body");
        }
        self.closed.cancel();
    }

    /// Adapts this stream into a plain `Stream`, keeping cancellation.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes>> {
        stream::unfold(self, |mut chunks| async move {
            let next = chunks.next_chunk().await?;
            Some((next, chunks))
        })
        .boxed()
    }
}

impl Drop for ChunkStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkStream")
            .field("backend", &self.backend)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Remote control for a [`ChunkStream`] owned elsewhere.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancel: CancellationToken,
    closed: CancellationToken,
}

impl CancelHandle {
    /// Interrupts the pending read, if any. The owner observes `None`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancels, then waits until the owner has released the response.
    ///
    /// Resolves once the owner's pending `next_chunk` returns or the stream
    /// is dropped.
    pub async fn cancel_and_wait(&self) {
        self.cancel.cancel();
        self.closed.cancelled().await;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

/// Re-slices a body into chunks of exactly `size` bytes, the last one shorter.
pub fn rechunk<S>(body: S, size: usize) -> BoxStream<'static, Result<Bytes>>
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
{
    struct Rechunk {
        body: BoxStream<'static, Result<Bytes>>,
        buffer: BytesMut,
        done: bool,
    }

    let size = size.max(1);
    let state = Rechunk {
        body: Box::pin(body),
        buffer: BytesMut::new(),
        done: false,
    };

    stream::unfold(state, move |mut st| async move {
        loop {
            if st.buffer.len() >= size {
                let chunk = st.buffer.split_to(size).freeze();
                return Some((Ok(chunk), st));
            }
            if st.done {
                if st.buffer.is_empty() {
                    return None;
                }
                let chunk = st.buffer.split().freeze();
                return Some((Ok(chunk), st));
            }
            match st.body.next().await {
                Some(Ok(bytes)) => st.buffer.extend_from_slice(&bytes),
                Some(Err(err)) => {
                    st.done = true;
                    st.buffer.clear();
                    return Some((Err(err), st));
                }
                None => st.done = true,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_exhaustion_closes() {
        let mut chunks = ChunkStream::from_chunks(
            BackendCapability::StreamingClient,
            vec![Bytes::from_static(b"ab"), Bytes::from_static(b"c")],
        );

        assert_eq!(chunks.next_chunk().await.unwrap().unwrap(), "ab");
        assert_eq!(chunks.state(), StreamState::Running);
        assert_eq!(chunks.next_chunk().await.unwrap().unwrap(), "c");
        assert!(chunks.next_chunk().await.is_none());
        assert_eq!(chunks.state(), StreamState::Closed);
        assert!(!chunks.was_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_read() {
        let mut chunks = ChunkStream::new(BackendCapability::PooledClient, stream::pending());
        let handle = chunks.cancel_handle();

        let (next, ()) = tokio::join!(chunks.next_chunk(), handle.cancel_and_wait());

        assert!(next.is_none());
        assert!(handle.is_closed());
        assert!(chunks.was_cancelled());
        assert_eq!(chunks.state(), StreamState::Closed);
    }

    #[tokio::test]
    async fn test_cancel_before_read() {
        let mut chunks =
            ChunkStream::from_chunks(BackendCapability::StdlibOnly, vec![Bytes::from_static(b"x")]);
        let handle = chunks.cancel_handle();
        handle.cancel();
        assert_eq!(chunks.state(), StreamState::CancelRequested);

        assert!(chunks.next_chunk().await.is_none());
        assert_eq!(chunks.state(), StreamState::Closed);
    }

    #[tokio::test]
    async fn test_drop_marks_closed() {
        let chunks = ChunkStream::new(BackendCapability::StreamingClient, stream::pending());
        let handle = chunks.cancel_handle();
        drop(chunks);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_error_closes_stream() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(Error::Connection("reset by peer".into())),
            Ok(Bytes::from_static(b"never")),
        ]);
        let mut chunks = ChunkStream::new(BackendCapability::PooledClient, body);

        assert!(chunks.next_chunk().await.unwrap().is_ok());
        assert!(chunks.next_chunk().await.unwrap().is_err());
        assert!(chunks.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn test_rechunk_fixed_sizes() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"defgh")),
            Ok(Bytes::from_static(b"i")),
        ]);

        let sizes: Vec<_> = rechunk(body, 4)
            .map(|chunk| chunk.unwrap().len())
            .collect()
            .await;

        assert_eq!(sizes, vec![4, 4, 1]);
    }

    #[tokio::test]
    async fn test_into_stream_yields_all_chunks() {
        let chunks = ChunkStream::from_chunks(
            BackendCapability::StdlibOnly,
            vec![Bytes::from_static(b"1"), Bytes::from_static(b"2")],
        );
        let all: Vec<_> = chunks.into_stream().map(|c| c.unwrap()).collect().await;
        assert_eq!(all, vec![Bytes::from_static(b"1"), Bytes::from_static(b"2")]);
    }
}
