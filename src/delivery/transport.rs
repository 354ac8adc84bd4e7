//! Transport primitives for the delivery engine.

use std::{
    io::{self, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use native_tls::{TlsConnector, TlsStream};
use thiserror::Error;

/// Failure to establish an outbound connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Host name resolution failed or produced no addresses.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// Every resolved address refused or timed out.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The TLS handshake did not complete.
    #[error("TLS handshake with {domain} failed: {reason}")]
    Tls { domain: String, reason: String },
}

/// Source of fresh duplex streams for the connection manager.
///
/// The connection manager only writes and flushes, so any `Write` stream
/// works; tests plug in scripted in-memory streams here.
pub trait Connector: Send + 'static {
    type Stream: Write + Send;

    /// Open a new stream to the fixed remote endpoint.
    fn connect(&mut self) -> Result<Self::Stream, ConnectionError>;

    /// Human-readable endpoint used in diagnostics.
    fn endpoint(&self) -> String;
}

/// TCP transport configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpTransport {
    /// Hostname or IP address to connect to.
    pub host: String,
    /// TCP port number.
    pub port: u16,
    /// Optional TLS configuration.
    pub tls: Option<TlsOptions>,
}

impl TcpTransport {
    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn socket_addrs(&self) -> Result<Vec<SocketAddr>, ConnectionError> {
        let resolve_err = |source| ConnectionError::Resolve {
            endpoint: self.endpoint(),
            source,
        };
        let addrs: Vec<_> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(resolve_err)?
            .collect();
        if addrs.is_empty() {
            return Err(resolve_err(io::Error::new(
                io::ErrorKind::NotFound,
                "no addresses returned",
            )));
        }
        Ok(addrs)
    }
}

/// TLS connection options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsOptions {
    /// Domain name presented during the TLS handshake.
    pub domain: String,
    /// Skip certificate validation when true (intended for tests).
    pub insecure_skip_verify: bool,
}

impl TlsOptions {
    fn connector(&self) -> Result<TlsConnector, ConnectionError> {
        let mut builder = TlsConnector::builder();
        if self.insecure_skip_verify {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        builder.build().map_err(|err| ConnectionError::Tls {
            domain: self.domain.clone(),
            reason: err.to_string(),
        })
    }
}

/// Live socket produced by [`TcpConnector`].
pub enum Connection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::PlainTcp(stream) => stream.write(buf),
            Connection::Tls(stream) => stream.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Connection::PlainTcp(stream) => stream.write_all(buf),
            Connection::Tls(stream) => stream.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::PlainTcp(stream) => stream.flush(),
            Connection::Tls(stream) => stream.flush(),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Connection::Tls(stream) = self {
            let _ = stream.shutdown();
        }
    }
}

/// Connector opening TCP (optionally TLS) streams to a fixed endpoint.
#[derive(Clone, Debug)]
pub struct TcpConnector {
    transport: TcpTransport,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl TcpConnector {
    pub fn new(
        transport: TcpTransport,
        connect_timeout: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            connect_timeout,
            write_timeout,
        }
    }

    fn connect_tcp(&self) -> Result<TcpStream, ConnectionError> {
        let mut last_err = None;
        for addr in self.transport.socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(ConnectionError::Connect {
            endpoint: self.transport.endpoint(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::NotConnected, "no address accepted")
            }),
        })
    }

    fn configure(&self, stream: &TcpStream) -> Result<(), ConnectionError> {
        let io_err = |source| ConnectionError::Connect {
            endpoint: self.transport.endpoint(),
            source,
        };
        stream.set_nodelay(true).map_err(io_err)?;
        stream
            .set_write_timeout(Some(self.write_timeout))
            .map_err(io_err)
    }

    fn wrap_tls(
        &self,
        stream: TcpStream,
        tls: &TlsOptions,
    ) -> Result<TlsStream<TcpStream>, ConnectionError> {
        let connector = tls.connector()?;
        let tls_err = |reason: String| ConnectionError::Tls {
            domain: tls.domain.clone(),
            reason,
        };
        // Bound the handshake by the connect timeout, then restore the
        // steady-state timeouts.
        stream
            .set_read_timeout(Some(self.connect_timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.connect_timeout)))
            .map_err(|err| tls_err(err.to_string()))?;
        let stream = connector
            .connect(&tls.domain, stream)
            .map_err(|err| tls_err(err.to_string()))?;
        let tcp_ref = stream.get_ref();
        tcp_ref
            .set_read_timeout(None)
            .and_then(|()| tcp_ref.set_write_timeout(Some(self.write_timeout)))
            .map_err(|err| tls_err(err.to_string()))?;
        Ok(stream)
    }
}

impl Connector for TcpConnector {
    type Stream = Connection;

    fn connect(&mut self) -> Result<Connection, ConnectionError> {
        let stream = self.connect_tcp()?;
        self.configure(&stream)?;
        match &self.transport.tls {
            Some(tls) => Ok(Connection::Tls(Box::new(self.wrap_tls(stream, tls)?))),
            None => Ok(Connection::PlainTcp(stream)),
        }
    }

    fn endpoint(&self) -> String {
        self.transport.endpoint()
    }
}
