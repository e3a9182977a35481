mod common;

use std::path::Path;

use bytes::Bytes;
use common::{Scripted, recording};
use freshen_fetch::{
    BackendCapability, ChunkStream, DownloadManager, Error, TransportChain, TransportConfig,
    save_stream,
};
use futures_util::stream;
use tempfile::tempdir;

const URL: &str = "https://cdn.example/archive.bin";

fn leftovers(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".part"))
        .collect()
}

#[tokio::test]
async fn test_three_chunks_are_written_in_order() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("archive.bin");
    let chunks = vec![
        Bytes::from(vec![1u8; 1024 * 1024]),
        Bytes::from(vec![2u8; 1024 * 1024]),
        Bytes::from(vec![3u8; 10]),
    ];
    let expected: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    let (streaming, _) = Scripted::chunks(BackendCapability::StreamingClient, chunks);
    let (sink, notifier) = recording();
    let manager = DownloadManager::with_chain(
        TransportConfig::new(),
        TransportChain::empty().with_transport(streaming),
        notifier,
    );

    assert!(manager.download_save(URL, &dest).await);

    assert_eq!(std::fs::read(&dest).unwrap(), expected);
    assert!(leftovers(dir.path()).is_empty());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_no_backend_returns_false_without_reports() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("feed.json");
    let (sink, notifier) = recording();
    let manager =
        DownloadManager::with_chain(TransportConfig::new(), TransportChain::empty(), notifier);

    assert!(manager.fetch(URL).await.is_none());
    assert!(!manager.download_save(URL, &dest).await);
    assert!(!dest.exists());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_failure_mid_stream_keeps_previous_file() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("thumb.png");
    std::fs::write(&dest, b"cached").unwrap();

    let (pooled, _) = Scripted::new(BackendCapability::PooledClient, |capability| {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"fresh-")),
            Err(Error::Connection("connection reset".into())),
        ]);
        Ok(Some(ChunkStream::new(capability, body)))
    });
    let (sink, notifier) = recording();
    let manager = DownloadManager::with_chain(
        TransportConfig::new(),
        TransportChain::empty().with_transport(pooled),
        notifier,
    );

    assert!(!manager.download_save(URL, &dest).await);

    assert_eq!(std::fs::read(&dest).unwrap(), b"cached");
    assert!(leftovers(dir.path()).is_empty());
    assert_eq!(sink.categories(), vec!["cacheConnection"]);
}

#[tokio::test]
async fn test_unwritable_destination_reports_cache_save() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("missing").join("cover.jpg");
    let (baseline, _) =
        Scripted::chunks(BackendCapability::StdlibOnly, vec![Bytes::from_static(b"jpeg")]);
    let (sink, notifier) = recording();
    let manager = DownloadManager::with_chain(
        TransportConfig::new(),
        TransportChain::empty().with_transport(baseline),
        notifier,
    );

    assert!(!manager.download_save(URL, &dest).await);

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].category, "cacheSave");
    assert_eq!(reports[0].message, "cover.jpg");
    assert!(reports[0].detail.is_some());
}

#[tokio::test]
async fn test_with_data_returns_body() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("meta.json");
    let (streaming, _) = Scripted::chunks(
        BackendCapability::StreamingClient,
        vec![Bytes::from_static(b"{\"a\":"), Bytes::from_static(b"1}")],
    );
    let (_, notifier) = recording();
    let manager = DownloadManager::with_chain(
        TransportConfig::new(),
        TransportChain::empty().with_transport(streaming),
        notifier,
    );

    let data = manager.download_save_with_data(URL, &dest).await.unwrap();

    assert_eq!(data, b"{\"a\":1}");
    assert_eq!(std::fs::read(&dest).unwrap(), data);
}

#[tokio::test]
async fn test_empty_body_is_a_successful_download() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("empty.txt");
    std::fs::write(&dest, b"stale").unwrap();
    let (streaming, _) = Scripted::chunks(BackendCapability::StreamingClient, Vec::new());
    let (_, notifier) = recording();
    let manager = DownloadManager::with_chain(
        TransportConfig::new(),
        TransportChain::empty().with_transport(streaming),
        notifier,
    );

    assert!(manager.download_save(URL, &dest).await);
    assert!(std::fs::read(&dest).unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_stream_is_not_committed() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("big.iso");
    std::fs::write(&dest, b"previous").unwrap();
    let chunks = ChunkStream::from_chunks(
        BackendCapability::StreamingClient,
        vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")],
    );
    chunks.cancel_handle().cancel();

    let err = save_stream(chunks, &dest, false).await.unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_settings_keep_custom_chain() {
    let (streaming, _) = Scripted::no_content(BackendCapability::StreamingClient);
    let (_, notifier) = recording();
    let mut manager = DownloadManager::with_chain(
        TransportConfig::new(),
        TransportChain::empty().with_transport(streaming),
        notifier,
    );

    manager.set_proxy(Some("corp:3128"));
    manager.set_user_agent(Some("freshen-test/1"));

    assert_eq!(manager.config().proxy(), Some("http://corp:3128"));
    assert_eq!(manager.config().user_agent(), Some("freshen-test/1"));
    assert_eq!(
        manager.chain().capabilities(),
        vec![BackendCapability::StreamingClient]
    );
}
