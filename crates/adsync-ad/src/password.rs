//! AD password encoding
//!
//! Active Directory sets passwords through the `unicodePwd` attribute: the
//! plaintext is surrounded with double quotes and encoded as UTF-16LE, and
//! the server rejects the modification unless the connection is encrypted.

use adsync_directory::prelude::*;

/// Encode a plaintext password for the unicodePwd attribute.
///
/// The result is the quoted password in UTF-16LE, ready for the raw
/// attribute path. Empty passwords are rejected.
pub fn encode_password(password: &str) -> DirectoryResult<Vec<u8>> {
    if password.is_empty() {
        return Err(DirectoryError::configuration("password must not be empty"));
    }

    let quoted = format!("\"{password}\"");
    Ok(quoted.encode_utf16().flat_map(u16::to_le_bytes).collect())
}

/// Check that the connection is suitable for password operations.
///
/// AD rejects unicodePwd modifications over unencrypted connections, so
/// both LDAPS and STARTTLS qualify.
pub fn require_encrypted(protocol: Protocol) -> DirectoryResult<()> {
    if !protocol.is_encrypted() {
        return Err(DirectoryError::configuration(
            "an encrypted connection (TLS or STARTTLS) is required for password operations",
        ));
    }
    Ok(())
}
