//! TCP client for the Liquidsoap server socket

use crate::error::{Error, Result};
use crate::protocol::{strip_trailers, validate_station_name, Command};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Default Liquidsoap telnet host
pub const DEFAULT_HOST: &str = "localhost";

/// Default Liquidsoap telnet port
pub const DEFAULT_PORT: u16 = 1234;

/// Default deadline covering connect + command + read (2 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Liquidsoap telnet client
///
/// Cheap to clone; holds no connection state.
#[derive(Debug, Clone)]
pub struct LiquidsoapClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl LiquidsoapClient {
    /// Create a client with default settings
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> LiquidsoapClientBuilder {
        LiquidsoapClientBuilder::default()
    }

    /// The address this client connects to
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Runs one command over a fresh connection and returns the cleaned
    /// response
    ///
    /// The whole exchange (connect, write, read to EOF) is bounded by the
    /// client timeout.
    pub async fn command(&self, command: &Command) -> Result<String> {
        let addr = self.address();

        let exchange = async {
            let mut stream = TcpStream::connect(&addr).await?;

            // One command per session; quit makes the peer close so we can
            // read to EOF instead of parsing END mid-stream.
            let payload = format!("{}\n{}\n", command, Command::Quit);
            stream.write_all(payload.as_bytes()).await?;

            let mut raw = Vec::new();
            stream.read_to_end(&mut raw).await?;
            Ok::<_, std::io::Error>(raw)
        };

        let raw = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout(command.to_string()))??;

        let text = String::from_utf8_lossy(&raw);
        let cleaned = strip_trailers(&text);
        debug!(command = %command, response_len = cleaned.len(), "Liquidsoap exchange");

        Ok(cleaned)
    }

    /// Returns the name of the station currently on air
    pub async fn station_get(&self) -> Result<String> {
        let response = self.command(&Command::StationGet).await?;
        if response.is_empty() {
            return Err(Error::EmptyResponse(Command::StationGet.to_string()));
        }
        Ok(response)
    }

    /// Switches to the named station and returns Liquidsoap's acknowledgement
    ///
    /// The name is validated before it reaches the wire.
    pub async fn station_set(&self, name: &str) -> Result<String> {
        validate_station_name(name)?;
        self.command(&Command::StationSet(name.trim().to_string()))
            .await
    }

    /// Returns the server's command listing
    pub async fn help(&self) -> Result<String> {
        self.command(&Command::Help).await
    }

    /// Returns the server state listing
    pub async fn list(&self) -> Result<String> {
        self.command(&Command::List).await
    }
}

impl Default for LiquidsoapClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`LiquidsoapClient`]
pub struct LiquidsoapClientBuilder {
    host: String,
    port: u16,
    timeout: Duration,
}

impl Default for LiquidsoapClientBuilder {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl LiquidsoapClientBuilder {
    /// Set the host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the exchange deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> LiquidsoapClient {
        LiquidsoapClient {
            host: self.host,
            port: self.port,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Spawns a one-shot mock Liquidsoap peer and returns its port
    ///
    /// The peer reads whatever the client sends, records it, and replies
    /// with the canned response before closing.
    async fn mock_peer(response: &'static str) -> (u16, tokio::sync::oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let received = String::from_utf8_lossy(&buf[..n]).to_string();

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = tx.send(received);
        });

        (port, rx)
    }

    fn client_for(port: u16) -> LiquidsoapClient {
        LiquidsoapClient::builder()
            .host("127.0.0.1")
            .port(port)
            .timeout(Duration::from_millis(500))
            .build()
    }

    #[tokio::test]
    async fn test_station_get_round_trip() {
        let (port, rx) = mock_peer("AUTODJ\nEND\nBye!\n").await;
        let client = client_for(port);

        let station = client.station_get().await.unwrap();
        assert_eq!(station, "AUTODJ");

        // Only the documented commands went over the wire
        let sent = rx.await.unwrap();
        assert_eq!(sent, "station.get\nquit\n");
    }

    #[tokio::test]
    async fn test_station_set_round_trip() {
        let (port, rx) = mock_peer("Station set to Noisefloor\nEND\nBye!\n").await;
        let client = client_for(port);

        let ack = client.station_set("Noisefloor").await.unwrap();
        assert_eq!(ack, "Station set to Noisefloor");

        let sent = rx.await.unwrap();
        assert_eq!(sent, "station.set Noisefloor\nquit\n");
    }

    #[tokio::test]
    async fn test_station_set_rejects_bad_name_before_connecting() {
        // Port 1 is never listening; validation must fail first
        let client = client_for(1);
        let result = client.station_set("evil\nshutdown").await;
        assert!(matches!(result, Err(Error::InvalidStationName(_))));
    }

    #[tokio::test]
    async fn test_empty_station_response_is_an_error() {
        let (port, _rx) = mock_peer("END\nBye!\n").await;
        let client = client_for(port);

        let result = client.station_get().await;
        assert!(matches!(result, Err(Error::EmptyResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_an_io_error() {
        let client = client_for(1);
        let result = client.station_get().await;
        assert!(matches!(result, Err(Error::Io(_) | Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        // Listener that accepts but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = client_for(port);
        let result = client.station_get().await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }
}
