use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Common HTTP client configuration shared by both transports.
///
/// This struct centralizes the logic for building a `reqwest::Client` with
/// proxy, timeout and TLS settings so the direct and onion transports do not
/// duplicate the same builder code. The User-Agent is set per request by the
/// probe worker.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout: u64,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Optional proxy URL (e.g. "socks5h://127.0.0.1:9050")
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            insecure: false,
            proxy: None,
        }
    }
}

impl HttpClientConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Build a `reqwest::Client` from this configuration.
    ///
    /// Redirects are followed with reqwest's default policy so the final URL
    /// of a response can be compared against the requested one.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is invalid or the client fails to build.
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder().timeout(Duration::from_secs(self.timeout));

        if self.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(builder.build()?)
    }
}
