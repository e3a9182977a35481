use std::fmt;

/// A transport backend, in fallback precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendCapability {
    /// Streams the response body from a reqwest client, optionally one the
    /// caller supplied.
    StreamingClient,
    /// A reqwest client kept alive for the configuration it was built from.
    PooledClient,
    /// HTTP/1.0 over a plain TCP socket; needs no HTTP library.
    StdlibOnly,
}

impl BackendCapability {
    pub const ALL: [BackendCapability; 3] = [
        BackendCapability::StreamingClient,
        BackendCapability::PooledClient,
        BackendCapability::StdlibOnly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackendCapability::StreamingClient => "streaming",
            BackendCapability::PooledClient => "pooled",
            BackendCapability::StdlibOnly => "baseline",
        }
    }

    /// Whether this backend was compiled in.
    pub fn available(self) -> bool {
        match self {
            BackendCapability::StreamingClient => cfg!(feature = "stream"),
            BackendCapability::PooledClient => cfg!(feature = "pooled"),
            BackendCapability::StdlibOnly => cfg!(feature = "baseline"),
        }
    }

    /// Backends compiled into this build, highest precedence first.
    pub fn detect() -> Vec<BackendCapability> {
        Self::ALL.into_iter().filter(|c| c.available()).collect()
    }
}

impl fmt::Display for BackendCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
