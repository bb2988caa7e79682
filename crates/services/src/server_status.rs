use anyhow::{anyhow, Context, Result};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use url::Url;

/// Result of probing the inference server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// Something accepted a TCP connection at the address.
    Reachable(SocketAddr),
    /// Nothing is listening, or the host does not resolve.
    Unreachable(String),
}

impl ServerStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ServerStatus::Reachable(_))
    }
}

/// Resolve the socket address behind a server base URL.
fn resolve(base_url: &str) -> Result<Vec<SocketAddr>> {
    let url = Url::parse(base_url).with_context(|| format!("invalid server URL: {}", base_url))?;
    // Unlike host_str(), this keeps IPv6 literals resolvable.
    let addrs = url
        .socket_addrs(|| None)
        .with_context(|| format!("could not resolve {}", base_url))?;
    if addrs.is_empty() {
        return Err(anyhow!("{} did not resolve", base_url));
    }
    Ok(addrs)
}

/// Check whether the inference server is listening.
pub fn check_server(base_url: &str, timeout: Duration) -> ServerStatus {
    let addrs = match resolve(base_url) {
        Ok(addrs) => addrs,
        Err(e) => return ServerStatus::Unreachable(format!("{:#}", e)),
    };

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return ServerStatus::Reachable(addr),
            Err(e) => last_error = Some(format!("{} ({})", addr, e)),
        }
    }
    let reason = last_error.unwrap_or_else(|| base_url.to_string());
    tracing::debug!(server = base_url, %reason, "inference server unreachable");
    ServerStatus::Unreachable(reason)
}
