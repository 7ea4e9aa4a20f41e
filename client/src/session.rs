use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace};
use url::Url;

use habitdoku_common::protocol::Request;
use habitdoku_common::wire;

use crate::ClientError;

/// Endpoint used when the server runs alongside the client.
pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:5555";

/// Request-reply session with a habitdoku server.
///
/// Owns the session state: the authentication token (empty before login)
/// and the coin balance cached from the most recent reply that carried
/// one. Each round trip opens a fresh connection and tears it down after
/// the reply; `&mut self` keeps at most one exchange in flight.
///
/// Not safe for concurrent use by multiple logical callers; give each
/// caller its own session or serialize access externally.
pub struct Session {
    host: String,
    port: u16,
    endpoint: String,
    token: String,
    coins: i64,
}

impl Session {
    /// Create a session for a `tcp://host:port` endpoint.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let url = Url::parse(endpoint)
            .map_err(|e| ClientError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if url.scheme() != "tcp" {
            return Err(ClientError::InvalidEndpoint(format!(
                "{endpoint}: expected a tcp:// address"
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::InvalidEndpoint(format!("{endpoint}: missing host")))?
            .to_string();
        let port = url
            .port()
            .ok_or_else(|| ClientError::InvalidEndpoint(format!("{endpoint}: missing port")))?;

        Ok(Self {
            host,
            port,
            endpoint: endpoint.to_string(),
            token: String::new(),
            coins: 0,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The current authentication token; empty before a successful login.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Coin balance cached from the most recent reply that carried one.
    pub fn coins(&self) -> i64 {
        self.coins
    }

    pub(crate) fn set_coins(&mut self, coins: i64) {
        self.coins = coins;
    }

    /// One complete exchange: connect, send the request, block until the
    /// reply arrives, decode it, disconnect.
    pub async fn round_trip<R>(&mut self, request: &Request) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|source| ClientError::Connect {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        debug!("connected to {}", self.endpoint);

        let (reader, mut writer) = stream.into_split();

        let mut line = wire::encode(request)?;
        trace!("sending request: {}", line);
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;

        let mut reply = String::new();
        let mut reader = BufReader::new(reader);
        reader.read_line(&mut reply).await?;
        if reply.is_empty() {
            return Err(ClientError::ConnectionClosed);
        }
        trace!("received reply: {}", reply.trim_end());

        // Dropping the stream halves tears the connection down.
        Ok(wire::decode(reply.trim_end())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_tcp_endpoint() {
        let session = Session::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(session.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(session.token(), "");
        assert_eq!(session.coins(), 0);
    }

    #[test]
    fn rejects_non_tcp_schemes() {
        assert!(matches!(
            Session::new("http://127.0.0.1:5555"),
            Err(ClientError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn rejects_an_endpoint_without_a_port() {
        assert!(matches!(
            Session::new("tcp://127.0.0.1"),
            Err(ClientError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn rejects_unparseable_endpoints() {
        assert!(matches!(
            Session::new("not an endpoint"),
            Err(ClientError::InvalidEndpoint(_))
        ));
    }
}
