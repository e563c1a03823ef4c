//! Directory error types
//!
//! Error definitions with transient/permanent classification.

use thiserror::Error;

/// Error that can occur while mapping or exchanging directory entries.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Configuration errors (permanent, raised at model-build time)
    /// A descriptor table or connection configuration is invalid.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    // Conversion errors (permanent)
    /// An attribute value could not be converted to or from its field type.
    #[error("conversion failed for attribute '{attribute}': {message}")]
    Conversion { attribute: String, message: String },

    /// A distinguished name string could not be parsed.
    #[error("invalid distinguished name: '{text}'")]
    InvalidDn { text: String },

    /// An entry is missing its distinguished name and cannot be addressed.
    #[error("entry has no distinguished name")]
    MissingDn,

    // Connection errors (usually transient)
    /// An operation was attempted before `connect`.
    #[error("not connected to the directory server")]
    NotConnected,

    /// Failed to establish a connection to the directory server.
    #[error("connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The bind was rejected because the credentials are wrong.
    #[error("authentication failed: invalid bind credentials")]
    InvalidCredentials,

    // Protocol errors
    /// A search or modify operation failed on the server side.
    #[error("directory operation failed: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A group that must exist in the directory was not found.
    #[error("required group '{name}' not found")]
    GroupNotFound { name: String },
}

impl DirectoryError {
    /// Check if this error is transient and the operation may be retried
    /// by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::NotConnected | DirectoryError::Connection { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    // Convenience constructors

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        DirectoryError::Configuration {
            message: message.into(),
        }
    }

    /// Create a conversion error for the named attribute.
    pub fn conversion(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        DirectoryError::Conversion {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        DirectoryError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        DirectoryError::Protocol {
            message: message.into(),
            source: None,
        }
    }

    /// Create a protocol error with source.
    pub fn protocol_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Protocol {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
