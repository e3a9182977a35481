use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::Client;

use super::Transport;
use super::client::{accept, build_client, get};
use crate::data::{BackendCapability, TransportConfig};
use crate::effects::stream::{CHUNK_SIZE, ChunkStream, rechunk};
use crate::error::{Error, Result};

/// Streams the body of a reqwest response in [`CHUNK_SIZE`] pieces.
///
/// Uses the caller's [`ClientHandle`](crate::ClientHandle) when the
/// configuration carries one.
#[derive(Debug, Clone)]
pub struct StreamingTransport {
    client: Client,
    chunk_size: usize,
}

impl StreamingTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = match config.client_handle() {
            Some(handle) => handle.client().clone(),
            None => build_client(config)?,
        };
        Ok(Self {
            client,
            chunk_size: CHUNK_SIZE,
        })
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

#[async_trait]
impl Transport for StreamingTransport {
    fn capability(&self) -> BackendCapability {
        BackendCapability::StreamingClient
    }

    async fn open(&self, url: &str, config: &TransportConfig) -> Result<Option<ChunkStream>> {
        let response = get(&self.client, url, config).send().await?;
        let Some(response) = accept(url, response) else {
            return Ok(None);
        };

        let body = response.bytes_stream().map_err(Error::from);
        Ok(Some(ChunkStream::new(
            self.capability(),
            rechunk(body, self.chunk_size),
        )))
    }
}
