use anyhow::Result;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};
use url::Url;

use super::client::HttpClientConfig;
use crate::error::ResolveError;

/// Default local SOCKS endpoint of the onion-routing relay
pub const DEFAULT_RELAY: &str = "127.0.0.1:9050";

/// Endpoint fetched through the relay before it is trusted
pub const DEFAULT_TOR_CHECK_URL: &str = "https://check.torproject.org/";

/// What a probe needs from a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    /// URL of the last response after redirects
    pub final_url: Url,
    /// Only read for 200 responses; empty for every other status
    pub body: String,
}

/// HTTP capability used by the probe workers.
///
/// Workers depend only on this trait; which implementation backs it is decided
/// once per run.
pub trait Transport: Send + Sync {
    fn clone_box(&self) -> Box<dyn Transport>;

    fn get<'a>(
        &'a self,
        url: &'a str,
        user_agent: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProbeResponse>> + Send + 'a>>;

    /// Whether traffic leaves through the anonymizing relay
    fn is_anonymized(&self) -> bool;
}

async fn fetch(client: &Client, url: &str, user_agent: &str) -> Result<ProbeResponse> {
    let response = client.get(url).header(USER_AGENT, user_agent).send().await?;
    let status = response.status().as_u16();
    let final_url = response.url().clone();
    let body = if status == 200 {
        response.text().await?
    } else {
        String::new()
    };

    Ok(ProbeResponse {
        status,
        final_url,
        body,
    })
}

/// Plain client talking to sites directly
#[derive(Clone)]
pub struct DirectTransport {
    client: Client,
}

impl DirectTransport {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        Ok(DirectTransport {
            client: config.build_client()?,
        })
    }
}

impl Transport for DirectTransport {
    fn clone_box(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
        user_agent: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProbeResponse>> + Send + 'a>> {
        Box::pin(fetch(&self.client, url, user_agent))
    }

    fn is_anonymized(&self) -> bool {
        false
    }
}

/// Client routed through a local SOCKS5 relay into the onion network
#[derive(Clone)]
pub struct OnionTransport {
    client: Client,
    relay: String,
}

impl OnionTransport {
    /// Builds the proxied client and validates it with one request to
    /// `check_url`.
    ///
    /// # Errors
    ///
    /// Returns `RelayUnreachable` when the client cannot be built or the
    /// check request fails. There is no fallback to a direct client.
    pub async fn connect(
        config: &HttpClientConfig,
        relay: &str,
        check_url: &str,
    ) -> Result<Self, ResolveError> {
        let unreachable = |reason: String| ResolveError::RelayUnreachable {
            relay: relay.to_string(),
            reason,
        };

        let proxied = config
            .clone()
            .with_proxy(Some(format!("socks5h://{}", relay)));
        let client = proxied
            .build_client()
            .map_err(|e| unreachable(e.to_string()))?;

        debug!(relay, check_url, "validating anonymizing relay");
        let response = client
            .get(check_url)
            .send()
            .await
            .map_err(|e| unreachable(format!("are you connected to the Tor network? {}", e)))?;

        if !response.status().is_success() {
            return Err(unreachable(format!(
                "check endpoint answered {}",
                response.status()
            )));
        }

        info!(relay, "anonymizing relay validated");
        Ok(OnionTransport {
            client,
            relay: relay.to_string(),
        })
    }

    pub fn relay(&self) -> &str {
        &self.relay
    }
}

impl Transport for OnionTransport {
    fn clone_box(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
        user_agent: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ProbeResponse>> + Send + 'a>> {
        Box::pin(fetch(&self.client, url, user_agent))
    }

    fn is_anonymized(&self) -> bool {
        true
    }
}
