use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, stream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use url::{Host, Position, Url};

use super::{CONNECT_TIMEOUT, Transport};
use crate::data::{BackendCapability, TransportConfig};
use crate::effects::stream::ChunkStream;
use crate::error::{Error, Result};

const READ_SIZE: usize = 64 * 1024;
const MAX_HEAD: usize = 64 * 1024;
const MAX_REDIRECTS: usize = 10;

/// HTTP/1.0 GET over a bare TCP socket.
///
/// Only plain `http` URLs are supported, directly or through an `http`
/// proxy. Redirects are followed up to ten times. The connection is closed
/// by the server after the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineTransport;

#[async_trait]
impl Transport for BaselineTransport {
    fn capability(&self) -> BackendCapability {
        BackendCapability::StdlibOnly
    }

    async fn open(&self, url: &str, config: &TransportConfig) -> Result<Option<ChunkStream>> {
        let mut target = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;

        for _ in 0..=MAX_REDIRECTS {
            let (socket, head) = request(&target, config).await?;
            match head.status {
                200 => {
                    return Ok(Some(ChunkStream::new(
                        self.capability(),
                        body(socket, head.content_length),
                    )));
                }
                301 | 302 | 303 | 307 | 308 => {
                    let Some(location) = head.location else {
                        tracing::debug!(url, status = head.status, "redirect without Location");
                        return Ok(None);
                    };
                    target = target
                        .join(&location)
                        .map_err(|e| Error::InvalidUrl(format!("{location}: {e}")))?;
                    tracing::debug!(url, status = head.status, to = %target, "following redirect");
                }
                status => {
                    tracing::debug!(url, status, "server returned no content");
                    return Ok(None);
                }
            }
        }
        Err(Error::Http(format!("too many redirects fetching {url}")))
    }
}

/// Sends one GET for `target` and reads the response head.
async fn request(
    target: &Url,
    config: &TransportConfig,
) -> Result<(BufReader<TcpStream>, ResponseHead)> {
    if target.scheme() != "http" {
        return Err(Error::UnsupportedScheme(target.scheme().to_owned()));
    }

    let (peer, request_target) = match config.proxy() {
        Some(proxy) => {
            let proxy = Url::parse(proxy).map_err(|e| Error::Proxy(format!("{proxy}: {e}")))?;
            if proxy.scheme() != "http" {
                return Err(Error::Proxy(format!(
                    "{} proxies need an HTTP library backend",
                    proxy.scheme()
                )));
            }
            let peer = endpoint(&proxy).ok_or_else(|| Error::Proxy(proxy.to_string()))?;
            (peer, &target[..Position::AfterQuery])
        }
        None => {
            let peer = endpoint(target).ok_or_else(|| Error::InvalidUrl(target.to_string()))?;
            (peer, &target[Position::BeforePath..Position::AfterQuery])
        }
    };

    let (host, port) = peer;
    let socket = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port)))
        .await
        .map_err(|_| Error::Timeout(format!("connecting to {host}:{port}")))?
        .map_err(|e| Error::Connection(format!("{host}:{port}: {e}")))?;
    let mut socket = BufReader::new(socket);

    let head = request_head(target, request_target, config.user_agent());
    socket.get_mut().write_all(head.as_bytes()).await?;

    let head = read_head(&mut socket).await?;
    Ok((socket, head))
}

fn endpoint(url: &Url) -> Option<(String, u16)> {
    let host = match url.host()? {
        Host::Domain(domain) => domain.to_owned(),
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => addr.to_string(),
    };
    Some((host, url.port_or_known_default()?))
}

fn request_head(target: &Url, request_target: &str, user_agent: Option<&str>) -> String {
    let host = target.host_str().unwrap_or_default();
    let mut head = match target.port() {
        Some(port) => format!("GET {request_target} HTTP/1.0\r\nHost: {host}:{port}\r\n"),
        None => format!("GET {request_target} HTTP/1.0\r\nHost: {host}\r\n"),
    };
    if let Some(user_agent) = user_agent {
        head.push_str("User-Agent: ");
        head.push_str(user_agent);
        head.push_str("\r\n");
    }
    head.push_str("Connection: close\r\n\r\n");
    head
}

#[derive(Debug, PartialEq, Eq)]
struct ResponseHead {
    status: u16,
    content_length: Option<u64>,
    location: Option<String>,
}

async fn read_head<R>(reader: &mut R) -> Result<ResponseHead>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let mut consumed = read_head_line(reader, &mut line, MAX_HEAD).await?;
    let status = parse_status(&line)?;

    let mut content_length = None;
    let mut location = None;
    loop {
        line.clear();
        consumed += read_head_line(reader, &mut line, MAX_HEAD - consumed).await?;

        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        let Some((name, value)) = header.split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.eq_ignore_ascii_case("content-length") {
            let length = value
                .parse()
                .map_err(|_| Error::MalformedResponse(format!("bad Content-Length: {value}")))?;
            content_length = Some(length);
        } else if name.eq_ignore_ascii_case("location") {
            location = Some(value.to_owned());
        }
    }

    Ok(ResponseHead {
        status,
        content_length,
        location,
    })
}

/// Reads one newline-terminated line of at most `budget` bytes.
async fn read_head_line<R>(reader: &mut R, line: &mut String, budget: usize) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let read = (&mut *reader).take(budget as u64).read_line(line).await?;
    if line.ends_with('\n') {
        Ok(read)
    } else if read == budget {
        Err(Error::MalformedResponse("response head too large".into()))
    } else {
        Err(Error::MalformedResponse("headers ended early".into()))
    }
}

fn parse_status(line: &str) -> Result<u16> {
    let mut parts = line.split_whitespace();
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(Error::MalformedResponse(format!(
            "bad status line: {}",
            line.trim_end()
        )));
    }
    parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| Error::MalformedResponse(format!("bad status line: {}", line.trim_end())))
}

struct Body {
    reader: BufReader<TcpStream>,
    remaining: Option<u64>,
}

fn body(
    reader: BufReader<TcpStream>,
    content_length: Option<u64>,
) -> impl Stream<Item = Result<Bytes>> + Send {
    let state = Body {
        reader,
        remaining: content_length,
    };
    stream::unfold(Some(state), |state| async move {
        let mut body = state?;
        let want = match body.remaining {
            Some(0) => return None,
            Some(left) => left.min(READ_SIZE as u64) as usize,
            None => READ_SIZE,
        };

        let mut buffer = BytesMut::with_capacity(want);
        let read = (&mut body.reader).take(want as u64).read_buf(&mut buffer).await;
        match read {
            Ok(0) => body.remaining.map(|left| {
                let err = Error::Connection(format!("connection closed with {left} bytes outstanding"));
                (Err(err), None)
            }),
            Ok(read) => {
                if let Some(left) = body.remaining.as_mut() {
                    *left -= read as u64;
                }
                Some((Ok(buffer.freeze()), Some(body)))
            }
            Err(e) => Some((Err(Error::from(e)), None)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_head_direct_and_proxied() {
        let target = Url::parse("http://cdn.example:8080/a/b.json?v=2#x").unwrap();

        let direct = request_head(&target, &target[Position::BeforePath..Position::AfterQuery], None);
        assert_eq!(
            direct,
            "GET /a/b.json?v=2 HTTP/1.0\r\nHost: cdn.example:8080\r\nConnection: close\r\n\r\n"
        );

        let proxied = request_head(&target, &target[..Position::AfterQuery], Some("freshen"));
        assert!(proxied.starts_with("GET http://cdn.example:8080/a/b.json?v=2 HTTP/1.0\r\n"));
        assert!(proxied.contains("User-Agent: freshen\r\n"));
    }

    #[tokio::test]
    async fn test_read_head() {
        let raw: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\ncontent-length: 5\r\n\r\nhello";
        let mut reader = BufReader::new(raw);

        let head = read_head(&mut reader).await.unwrap();

        assert_eq!(
            head,
            ResponseHead {
                status: 200,
                content_length: Some(5),
                location: None,
            }
        );
        let mut rest = String::new();
        reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "hello");
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let mut reader = BufReader::new(&b"SSH-2.0-OpenSSH\r\n"[..]);
        let err = read_head(&mut reader).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_read_head_keeps_location() {
        let raw: &[u8] = b"HTTP/1.0 302 Found\r\nLocation:  /v2/feed.json \r\n\r\n";
        let head = read_head(&mut BufReader::new(raw)).await.unwrap();

        assert_eq!(head.status, 302);
        assert_eq!(head.location.as_deref(), Some("/v2/feed.json"));
    }

    #[tokio::test]
    async fn test_unterminated_status_line_is_bounded() {
        let raw = vec![b'a'; MAX_HEAD + 4096];
        let mut reader = BufReader::new(&raw[..]);

        let err = read_head(&mut reader).await.unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(ref m) if m == "response head too large"));
    }

    #[tokio::test]
    async fn test_oversized_headers_are_bounded() {
        let mut raw = b"HTTP/1.1 200 OK\r\n".to_vec();
        raw.extend_from_slice(b"X-Padding: ");
        raw.extend(std::iter::repeat_n(b'x', MAX_HEAD));
        raw.extend_from_slice(b"\r\n\r\n");
        let mut reader = BufReader::new(&raw[..]);

        let err = read_head(&mut reader).await.unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(ref m) if m == "response head too large"));
    }

    #[tokio::test]
    async fn test_truncated_head_ended_early() {
        let mut reader = BufReader::new(&b"HTTP/1.1 200 OK\r\nContent-Len"[..]);
        let err = read_head(&mut reader).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(ref m) if m == "headers ended early"));
    }

    #[test]
    fn test_endpoint_defaults_port() {
        let url = Url::parse("http://[::1]/x").unwrap();
        assert_eq!(endpoint(&url), Some(("::1".to_owned(), 80)));
    }
}
