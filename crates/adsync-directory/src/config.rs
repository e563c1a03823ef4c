//! Connection configuration
//!
//! Configuration for the directory connection: server address, bind
//! credentials and transport security.

use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, DirectoryResult};

/// Transport security for the directory connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain LDAP without transport security.
    #[default]
    Plain,
    /// LDAP over TLS (ldaps).
    Tls,
    /// Plain connection upgraded with STARTTLS.
    StartTls,
}

impl Protocol {
    /// Check whether the transport is encrypted.
    pub fn is_encrypted(self) -> bool {
        matches!(self, Protocol::Tls | Protocol::StartTls)
    }

    /// Get the URL scheme for this protocol.
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Tls => "ldaps",
            Protocol::Plain | Protocol::StartTls => "ldap",
        }
    }
}

/// Configuration for a directory connection.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Directory server hostname or IP address.
    pub host: String,

    /// Directory server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Transport security.
    #[serde(default)]
    pub protocol: Protocol,

    /// Base DN for all searches (e.g. "dc=example,dc=com").
    pub base_dn: String,

    /// Bind DN for authentication.
    pub bind_dn: String,

    /// Bind password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("base_dn", &self.base_dn)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

fn default_port() -> u16 {
    389
}

fn default_connect_timeout() -> u64 {
    30
}

impl LdapConfig {
    /// Create a new config with the required fields.
    pub fn new(
        host: impl Into<String>,
        base_dn: impl Into<String>,
        bind_dn: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            protocol: Protocol::Plain,
            base_dn: base_dn.into(),
            bind_dn: bind_dn.into(),
            bind_password: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// Set the bind password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = Some(password.into());
        self
    }

    /// Enable LDAPS and switch to the default LDAPS port.
    #[must_use]
    pub fn with_tls(mut self) -> Self {
        self.protocol = Protocol::Tls;
        self.port = 636;
        self
    }

    /// Enable STARTTLS on the plain port.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.protocol = Protocol::StartTls;
        self
    }

    /// Set a non-default port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the connection URL.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.host.is_empty() {
            return Err(DirectoryError::configuration("host must not be empty"));
        }
        if self.base_dn.is_empty() {
            return Err(DirectoryError::configuration("base DN must not be empty"));
        }
        if self.bind_dn.is_empty() {
            return Err(DirectoryError::configuration("bind DN must not be empty"));
        }
        Ok(())
    }
}
