#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use freshen_fetch::{
    BackendCapability, ChunkStream, Error, Result, Transport, TransportConfig, async_trait,
};
use freshen_notify::{MemorySink, Notifier};

type Respond = dyn Fn(BackendCapability) -> Result<Option<ChunkStream>> + Send + Sync;

/// A backend whose answer is fixed by the test.
pub struct Scripted {
    capability: BackendCapability,
    calls: Arc<AtomicUsize>,
    respond: Box<Respond>,
}

impl Scripted {
    pub fn new(
        capability: BackendCapability,
        respond: impl Fn(BackendCapability) -> Result<Option<ChunkStream>> + Send + Sync + 'static,
    ) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let transport = Self {
            capability,
            calls: calls.clone(),
            respond: Box::new(respond),
        };
        (transport, calls)
    }

    pub fn chunks(capability: BackendCapability, chunks: Vec<Bytes>) -> (Self, Arc<AtomicUsize>) {
        Self::new(capability, move |c| {
            Ok(Some(ChunkStream::from_chunks(c, chunks.clone())))
        })
    }

    pub fn no_content(capability: BackendCapability) -> (Self, Arc<AtomicUsize>) {
        Self::new(capability, |_| Ok(None))
    }

    pub fn failing(
        capability: BackendCapability,
        error: impl Fn() -> Error + Send + Sync + 'static,
    ) -> (Self, Arc<AtomicUsize>) {
        Self::new(capability, move |_| Err(error()))
    }
}

#[async_trait]
impl Transport for Scripted {
    fn capability(&self) -> BackendCapability {
        self.capability
    }

    async fn open(&self, _url: &str, _config: &TransportConfig) -> Result<Option<ChunkStream>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(self.capability)
    }
}

pub fn recording() -> (Arc<MemorySink>, Notifier) {
    let sink = Arc::new(MemorySink::default());
    (sink.clone(), Notifier::new(sink))
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
