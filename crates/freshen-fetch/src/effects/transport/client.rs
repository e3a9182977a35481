use reqwest::{Client, Proxy, RequestBuilder, Response, StatusCode, header};

use super::CONNECT_TIMEOUT;
use crate::data::TransportConfig;
use crate::error::{Error, Result};

/// A client routed through the configured proxy, or through none at all.
///
/// System proxy variables are ignored so that an unset proxy means a direct
/// connection.
pub(crate) fn build_client(config: &TransportConfig) -> Result<Client> {
    let builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
    let builder = match config.proxy() {
        Some(proxy) => builder
            .proxy(Proxy::all(proxy).map_err(|e| Error::Proxy(format!("{proxy}: {e}")))?),
        None => builder.no_proxy(),
    };
    Ok(builder.build()?)
}

pub(crate) fn get(client: &Client, url: &str, config: &TransportConfig) -> RequestBuilder {
    let request = client.get(url);
    match config.user_agent() {
        Some(user_agent) => request.header(header::USER_AGENT, user_agent),
        None => request,
    }
}

/// The response if it is a 200, otherwise `None`.
pub(crate) fn accept(url: &str, response: Response) -> Option<Response> {
    if response.status() == StatusCode::OK {
        Some(response)
    } else {
        tracing::debug!(url, status = %response.status(), "server returned no content");
        None
    }
}
