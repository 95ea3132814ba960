//! TLS configuration and certificate loading.

use std::path::Path;
use std::time::Duration;

use axum_server::accept::Accept;
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::config::TlsConfig;

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    // Basic validation
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}

/// How accepted TCP streams are turned into session streams.
#[derive(Clone)]
pub enum Transport {
    Plain,
    Tls(RustlsAcceptor),
}

impl Transport {
    /// Build the transport from config. Invalid key material is an error.
    pub async fn from_config(ssl_enabled: bool, tls: Option<&TlsConfig>) -> Result<Self, std::io::Error> {
        if !ssl_enabled {
            return Ok(Transport::Plain);
        }
        let tls = tls.ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "ssl_enabled is set but no [tls] section is configured",
            )
        })?;

        let config = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
        tracing::info!(
            cert_path = %tls.cert_path,
            handshake_timeout_secs = tls.handshake_timeout_secs,
            "TLS enabled"
        );
        Ok(Transport::tls(config, tls.handshake_timeout()))
    }

    pub fn tls(config: RustlsConfig, handshake_timeout: Duration) -> Self {
        Transport::Tls(RustlsAcceptor::new(config).handshake_timeout(handshake_timeout))
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }
}

/// Either side of [`Transport`] after the handshake.
pub enum SessionStream {
    Plain(TcpStream),
    Tls(Box<<RustlsAcceptor as Accept<TcpStream, ()>>::Stream>),
}

impl Transport {
    /// Run the handshake, if any, for one accepted connection.
    pub async fn establish(&self, stream: TcpStream) -> Result<SessionStream, std::io::Error> {
        match self {
            Transport::Plain => Ok(SessionStream::Plain(stream)),
            Transport::Tls(acceptor) => {
                let (tls, ()) = acceptor.accept(stream, ()).await?;
                Ok(SessionStream::Tls(Box::new(tls)))
            }
        }
    }
}

impl AsyncRead for SessionStream {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        match self.get_mut() {
            SessionStream::Plain(s) => std::pin::Pin::new(s).poll_read(cx, buf),
            SessionStream::Tls(s) => std::pin::Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SessionStream {
    fn poll_write(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<std::io::Result<usize>> {
        match self.get_mut() {
            SessionStream::Plain(s) => std::pin::Pin::new(s).poll_write(cx, buf),
            SessionStream::Tls(s) => std::pin::Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        match self.get_mut() {
            SessionStream::Plain(s) => std::pin::Pin::new(s).poll_flush(cx),
            SessionStream::Tls(s) => std::pin::Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        match self.get_mut() {
            SessionStream::Plain(s) => std::pin::Pin::new(s).poll_shutdown(cx),
            SessionStream::Tls(s) => std::pin::Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}
