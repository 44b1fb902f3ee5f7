// Network module
//
// HTTP client construction, the transport capability used by the probe
// workers (direct or onion-routed) and the User-Agent pool.

pub mod client;
pub mod transport;
pub mod user_agent;

pub use client::HttpClientConfig;
pub use transport::{DirectTransport, OnionTransport, ProbeResponse, Transport};
pub use user_agent::AgentPool;
