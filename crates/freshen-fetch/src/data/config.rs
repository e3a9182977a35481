use crate::core::normalize_proxy;

/// A caller-supplied HTTP client for the streaming backend.
///
/// The client is used as is: the proxy of the [`TransportConfig`] is not
/// applied to it, only the user agent.
#[cfg(feature = "stream")]
#[derive(Debug, Clone)]
pub struct ClientHandle(reqwest::Client);

#[cfg(feature = "stream")]
impl ClientHandle {
    pub fn new(client: reqwest::Client) -> Self {
        Self(client)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.0
    }
}

#[cfg(feature = "stream")]
impl From<reqwest::Client> for ClientHandle {
    fn from(client: reqwest::Client) -> Self {
        Self(client)
    }
}

/// Without the `stream` backend no client handle can exist.
#[cfg(not(feature = "stream"))]
#[derive(Debug, Clone)]
pub enum ClientHandle {}

/// Per-orchestrator transport settings.
///
/// # Examples
///
/// ```
/// use freshen_fetch::TransportConfig;
///
/// let config = TransportConfig::new()
///     .with_proxy(Some("myproxy:8080"))
///     .with_user_agent(Some("freshen/0.1"));
/// assert_eq!(config.proxy(), Some("http://myproxy:8080"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    proxy: Option<String>,
    user_agent: Option<String>,
    client: Option<ClientHandle>,
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the proxy from raw user input; the normalized form is stored.
    #[must_use]
    pub fn with_proxy(mut self, raw: Option<&str>) -> Self {
        self.set_proxy(raw);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: Option<&str>) -> Self {
        self.set_user_agent(user_agent);
        self
    }

    /// Hands the streaming backend a long-lived client to reuse.
    #[cfg(feature = "stream")]
    #[must_use]
    pub fn with_client(mut self, client: impl Into<ClientHandle>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn set_proxy(&mut self, raw: Option<&str>) {
        self.proxy = normalize_proxy(raw);
    }

    pub fn set_user_agent(&mut self, user_agent: Option<&str>) {
        self.user_agent = user_agent
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .map(str::to_owned);
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn client_handle(&self) -> Option<&ClientHandle> {
        self.client.as_ref()
    }
}

/// What the chain does after a backend raised a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Try the next available backend; each backend is tried at most once.
    #[default]
    NextOnFailure,
    /// Only the highest-precedence backend is attempted.
    FirstOnly,
}
