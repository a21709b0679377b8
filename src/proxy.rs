use std::{fmt, str::FromStr, time::Duration};

use reqwest::{
    header::{HeaderValue, USER_AGENT},
    Client, Proxy,
};
use serde::Deserialize;

use crate::{constants, errors::EntryError};

/// `username:password@host:port`
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: String,
}

impl ProxyDescriptor {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn split_pair(part: &str) -> Option<(&str, &str)> {
    let (left, right) = part.split_once(':')?;

    if left.is_empty() || right.is_empty() || right.contains(':') {
        return None;
    }

    Some((left, right))
}

impl FromStr for ProxyDescriptor {
    type Err = EntryError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let malformed = || EntryError::MalformedProxy(descriptor.to_string());

        let (auth, host_port) = descriptor.split_once('@').ok_or_else(malformed)?;
        if host_port.contains('@') {
            return Err(malformed());
        }

        let (username, password) = split_pair(auth).ok_or_else(malformed)?;
        let (host, port) = split_pair(host_port).ok_or_else(malformed)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            host: host.to_string(),
            port: port.to_string(),
        })
    }
}

// Never prints the password
impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}

impl fmt::Debug for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyDescriptor")
            .field("username", &self.username)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// An HTTP client whose every request is tunnelled through one proxy.
#[derive(Clone, Debug)]
pub struct ProxyHandle {
    pub descriptor: ProxyDescriptor,
    pub client: Client,
}

impl ProxyHandle {
    pub fn new(descriptor: ProxyDescriptor, timeout: Option<Duration>) -> Result<Self, EntryError> {
        let proxy = Proxy::all(descriptor.url())
            .map_err(|e| EntryError::MalformedProxy(format!("{descriptor}: {e}")))?
            .basic_auth(&descriptor.username, &descriptor.password);

        let mut builder = Client::builder().proxy(proxy);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|err| {
            tracing::error!("Failed to build a client with proxy: {descriptor}. Error: {err}");
            EntryError::MalformedProxy(format!("{descriptor}: {err}"))
        })?;

        Ok(Self { descriptor, client })
    }

    pub fn parse(descriptor: &str, timeout: Option<Duration>) -> Result<Self, EntryError> {
        Self::new(descriptor.parse()?, timeout)
    }
}

#[derive(Deserialize)]
struct IpEcho {
    ip: Option<String>,
}

/// Lightweight GET through the proxy to an IP-echo endpoint. Any failure means unhealthy.
pub async fn verify(handle: &ProxyHandle, ip_check_url: &str) -> bool {
    let response = handle
        .client
        .get(ip_check_url)
        .header(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT))
        .send()
        .await
        .and_then(|response| response.error_for_status());

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Proxy test failed for {}: {e}", handle.descriptor);
            return false;
        }
    };

    match response.json::<IpEcho>().await {
        Ok(IpEcho { ip: Some(ip) }) => tracing::info!("Proxy is working. IP: {ip}"),
        _ => tracing::info!("Proxy is working. IP: unknown"),
    }

    true
}
