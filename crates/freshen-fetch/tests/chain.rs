mod common;

use bytes::Bytes;
use common::{Scripted, calls, recording};
use freshen_fetch::{BackendCapability, Error, FallbackPolicy, TransportChain, TransportConfig};

const URL: &str = "https://cdn.example/feed.json";

#[tokio::test]
async fn test_highest_precedence_backend_wins() {
    let (sink, notifier) = recording();
    let (streaming, streaming_calls) =
        Scripted::chunks(BackendCapability::StreamingClient, vec![Bytes::from_static(b"{}")]);
    let (pooled, pooled_calls) =
        Scripted::chunks(BackendCapability::PooledClient, vec![Bytes::from_static(b"[]")]);
    let chain = TransportChain::empty()
        .with_transport(streaming)
        .with_transport(pooled);

    let stream = chain.fetch(URL, &TransportConfig::new(), &notifier).await.unwrap();

    assert_eq!(stream.backend(), BackendCapability::StreamingClient);
    assert_eq!(calls(&streaming_calls), 1);
    assert_eq!(calls(&pooled_calls), 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_failure_falls_through_once_per_backend() {
    let (sink, notifier) = recording();
    let (streaming, streaming_calls) = Scripted::failing(BackendCapability::StreamingClient, || {
        Error::Connection("dns lookup failed".into())
    });
    let (pooled, pooled_calls) =
        Scripted::chunks(BackendCapability::PooledClient, vec![Bytes::from_static(b"ok")]);
    let chain = TransportChain::empty()
        .with_transport(streaming)
        .with_transport(pooled);

    let stream = chain.fetch(URL, &TransportConfig::new(), &notifier).await.unwrap();

    assert_eq!(stream.backend(), BackendCapability::PooledClient);
    assert_eq!((calls(&streaming_calls), calls(&pooled_calls)), (1, 1));
    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].category, "cacheConnection");
    assert_eq!(reports[0].message, "connection failed: dns lookup failed");
}

#[tokio::test]
async fn test_first_only_does_not_fall_through() {
    let (sink, notifier) = recording();
    let (streaming, _) = Scripted::failing(BackendCapability::StreamingClient, || {
        Error::Timeout("30s".into())
    });
    let (baseline, baseline_calls) =
        Scripted::chunks(BackendCapability::StdlibOnly, vec![Bytes::from_static(b"ok")]);
    let chain = TransportChain::empty()
        .with_transport(streaming)
        .with_transport(baseline)
        .fallback(FallbackPolicy::FirstOnly);

    assert!(chain.fetch(URL, &TransportConfig::new(), &notifier).await.is_none());
    assert_eq!(calls(&baseline_calls), 0);
    assert_eq!(sink.categories(), vec!["cacheConnection"]);
}

#[tokio::test]
async fn test_no_content_is_final_and_silent() {
    let (sink, notifier) = recording();
    let (pooled, _) = Scripted::no_content(BackendCapability::PooledClient);
    let (baseline, baseline_calls) =
        Scripted::chunks(BackendCapability::StdlibOnly, vec![Bytes::from_static(b"x")]);
    let chain = TransportChain::empty()
        .with_transport(pooled)
        .with_transport(baseline);

    assert!(chain.fetch(URL, &TransportConfig::new(), &notifier).await.is_none());
    assert_eq!(calls(&baseline_calls), 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_transport_errors_report_name_and_text() {
    let (sink, notifier) = recording();
    let (streaming, _) = Scripted::failing(BackendCapability::StreamingClient, || {
        Error::MalformedResponse("bad status line".into())
    });
    let (baseline, _) = Scripted::failing(BackendCapability::StdlibOnly, || {
        Error::UnsupportedScheme("ftp".into())
    });
    let chain = TransportChain::empty()
        .with_transport(streaming)
        .with_transport(baseline);

    assert!(chain.fetch(URL, &TransportConfig::new(), &notifier).await.is_none());

    let reports = sink.reports();
    assert_eq!(sink.categories(), vec!["cache", "cache"]);
    assert_eq!(reports[0].message, "MalformedResponse");
    assert_eq!(
        reports[0].detail.as_deref(),
        Some("malformed response: bad status line")
    );
    assert_eq!(reports[1].message, "UnsupportedScheme");
}

#[tokio::test]
async fn test_empty_chain_reports_nothing() {
    let (sink, notifier) = recording();
    let chain = TransportChain::empty();

    assert!(chain.fetch(URL, &TransportConfig::new(), &notifier).await.is_none());
    assert!(chain.capabilities().is_empty());
    assert!(sink.is_empty());
}
