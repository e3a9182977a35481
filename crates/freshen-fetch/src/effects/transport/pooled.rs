use async_trait::async_trait;
use futures_util::stream;
use reqwest::{Client, Response};

use super::Transport;
use super::client::{accept, build_client, get};
use crate::data::{BackendCapability, TransportConfig};
use crate::effects::stream::ChunkStream;
use crate::error::{Error, Result};

/// Reads the body chunk by chunk from a client kept for the whole
/// configuration lifetime.
#[derive(Debug, Clone)]
pub struct PooledTransport {
    client: Client,
}

impl PooledTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for PooledTransport {
    fn capability(&self) -> BackendCapability {
        BackendCapability::PooledClient
    }

    async fn open(&self, url: &str, config: &TransportConfig) -> Result<Option<ChunkStream>> {
        let response = get(&self.client, url, config).send().await?;
        Ok(accept(url, response).map(|response| ChunkStream::new(self.capability(), body(response))))
    }
}

fn body(response: Response) -> impl futures_util::Stream<Item = Result<bytes::Bytes>> + Send {
    stream::unfold(Some(response), |state| async move {
        let mut response = state?;
        match response.chunk().await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(response))),
            Ok(None) => None,
            Err(e) => Some((Err(Error::from(e)), None)),
        }
    })
}
