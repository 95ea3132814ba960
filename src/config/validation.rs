//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//! - Check option combinations (TLS material present when SSL is on)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.linuxpath.trim().is_empty() {
        errors.push(ValidationError::new("linuxpath", "corpus path must be set"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new(
            "listener.max_connections",
            "must be greater than zero",
        ));
    }

    if config.session.max_query_bytes == 0 {
        errors.push(ValidationError::new(
            "session.max_query_bytes",
            "must be greater than zero",
        ));
    }

    if config.session.idle_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "session.idle_timeout_secs",
            "must be greater than zero; omit it to disable the idle timeout",
        ));
    }

    if config.ssl_enabled {
        match &config.tls {
            None => errors.push(ValidationError::new(
                "tls",
                "ssl_enabled requires a [tls] section with cert_path and key_path",
            )),
            Some(tls) => {
                if tls.cert_path.trim().is_empty() {
                    errors.push(ValidationError::new("tls.cert_path", "must be set"));
                }
                if tls.key_path.trim().is_empty() {
                    errors.push(ValidationError::new("tls.key_path", "must be set"));
                }
                if tls.handshake_timeout_secs == 0 {
                    errors.push(ValidationError::new(
                        "tls.handshake_timeout_secs",
                        "must be greater than zero",
                    ));
                }
            }
        }
    }

    if config.watch_corpus && config.reread_on_query {
        errors.push(ValidationError::new(
            "watch_corpus",
            "only applies to the cached strategy (reread_on_query = false)",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    fn valid() -> ServerConfig {
        ServerConfig {
            linuxpath: "/srv/corpus.txt".into(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn accepts_minimal_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.max_connections = 0;
        config.session.max_query_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "linuxpath",
                "listener.bind_address",
                "listener.max_connections",
                "session.max_query_bytes",
            ]
        );
    }

    #[test]
    fn ssl_requires_tls_section() {
        let mut config = valid();
        config.ssl_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "tls");

        config.tls = Some(TlsConfig {
            cert_path: "cert.pem".into(),
            key_path: "key.pem".into(),
            handshake_timeout_secs: 10,
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn watcher_rejected_in_streaming_mode() {
        let mut config = valid();
        config.reread_on_query = true;
        config.watch_corpus = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "watch_corpus");
    }

    #[test]
    fn zero_idle_timeout_rejected() {
        let mut config = valid();
        config.session.idle_timeout_secs = Some(0);
        assert!(validate_config(&config).is_err());
    }
}
