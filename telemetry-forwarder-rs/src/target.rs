// telemetry-forwarder-rs/src/target.rs
//
// Transport Resolver: turns the operator-configured destination string
// into a concrete scheme/host/port/path. Collector endpoints often sit
// behind custom listeners (e.g. port 20001), so the port is resolved
// here explicitly instead of leaving it to the HTTP client's defaults.

use url::Url;

use crate::ForwarderError;

/// Closed set of wire transports, chosen by URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Encrypted,
}

impl Transport {
    pub fn scheme(self) -> &'static str {
        match self {
            Transport::Plain => "http",
            Transport::Encrypted => "https",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Transport::Plain => 80,
            Transport::Encrypted => 443,
        }
    }
}

/// Everything needed to issue one outbound request, recomputed per
/// dispatch from the immutable configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportTarget {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub path_and_query: String,
    pub auth_token: Option<String>,
}

impl TransportTarget {
    /// Parse the destination URL. Scheme `https` selects the encrypted
    /// transport (default port 443); any other scheme is treated as
    /// plain HTTP (default port 80). An explicit port always wins.
    pub fn resolve(destination: &str, auth_token: Option<&str>) -> Result<Self, ForwarderError> {
        let parsed = Url::parse(destination).map_err(|e| {
            ForwarderError::Configuration(format!(
                "invalid telemetry destination {:?}: {}",
                destination, e
            ))
        })?;

        let transport = if parsed.scheme() == "https" {
            Transport::Encrypted
        } else {
            Transport::Plain
        };

        let host = parsed
            .host_str()
            .ok_or_else(|| {
                ForwarderError::Configuration(format!(
                    "telemetry destination {:?} has no host",
                    destination
                ))
            })?
            .to_string();

        // Never leave the port unset on the wire
        let port = parsed.port().unwrap_or_else(|| transport.default_port());

        let mut path_and_query = parsed.path().to_string();
        if path_and_query.is_empty() {
            path_and_query.push('/');
        }
        if let Some(query) = parsed.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Ok(Self {
            transport,
            host,
            port,
            path_and_query,
            auth_token: auth_token.map(str::to_string),
        })
    }

    /// Full request URL with the resolved port always explicit
    pub fn request_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.transport.scheme(),
            self.host,
            self.port,
            self.path_and_query
        )
    }
}
