//! Directory tree façade
//!
//! The synchronous-looking boundary to the directory server: connect and
//! bind, subtree searches, and replace-semantics attribute modification.
//! All network I/O lives here; the mapping engine above it is purely
//! functional.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Mod, Scope, SearchEntry};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::attribute::{AttributeValues, Attributes};
use crate::config::{LdapConfig, Protocol};
use crate::descriptor::AccessMode;
use crate::dn::Dn;
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{DirectoryEntry, EntryModel};

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// A connected view of the directory tree.
///
/// The connection handle is established by [`connect`](Self::connect) and
/// cheaply cloned per operation, so a tree can be shared across tasks.
pub struct LdapTree {
    config: LdapConfig,
    connection: Arc<RwLock<Option<Ldap>>>,
}

impl LdapTree {
    /// Create a tree for the given connection configuration.
    pub fn new(config: LdapConfig) -> DirectoryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    /// Connect to the directory server and bind.
    #[instrument(skip(self), fields(url = %self.config.url()))]
    pub async fn connect(&self) -> DirectoryResult<()> {
        let url = self.config.url();
        debug!("connecting to directory server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .set_starttls(self.config.protocol == Protocol::StartTls);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                DirectoryError::connection_with_source(
                    format!("failed to connect to directory server at {url}"),
                    e,
                )
            })?;

        // Drive the connection until it closes
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "directory connection driver error");
            }
        });

        let bind_dn = &self.config.bind_dn;
        let bind_password = self.config.bind_password.as_deref().unwrap_or("");

        debug!(bind_dn = %bind_dn, "performing simple bind");
        let result = ldap.simple_bind(bind_dn, bind_password).await.map_err(|e| {
            DirectoryError::connection_with_source(format!("bind failed for {bind_dn}"), e)
        })?;

        if result.rc == RC_INVALID_CREDENTIALS {
            return Err(DirectoryError::InvalidCredentials);
        }
        if result.rc != 0 {
            return Err(DirectoryError::connection(format!(
                "bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        *self.connection.write().await = Some(ldap);
        info!(host = %self.config.host, "directory connection established");
        Ok(())
    }

    /// Disconnect from the directory server.
    ///
    /// A no-op when not connected.
    pub async fn disconnect(&self) -> DirectoryResult<()> {
        let mut guard = self.connection.write().await;
        if let Some(mut ldap) = guard.take() {
            if let Err(e) = ldap.unbind().await {
                warn!(error = %e, "error during unbind");
            }
            info!("directory connection closed");
        }
        Ok(())
    }

    /// Check whether the tree is connected.
    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    /// Get a handle for one operation.
    async fn handle(&self) -> DirectoryResult<Ldap> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(DirectoryError::NotConnected)
    }

    /// Search the subtree under the configured base DN.
    ///
    /// Returns the raw attribute sets of every matching entry; zero
    /// matches is an empty list, not an error. When `attributes` is
    /// `None`, all attributes are returned.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &str,
        attributes: Option<&[&str]>,
    ) -> DirectoryResult<Vec<Attributes>> {
        let mut ldap = self.handle().await?;

        let requested: Vec<&str> = attributes.map_or_else(|| vec!["*"], <[&str]>::to_vec);

        let result = ldap
            .search(&self.config.base_dn, Scope::Subtree, filter, requested)
            .await
            .map_err(|e| DirectoryError::protocol_with_source("search failed", e))?;

        let (entries, _res) = result
            .success()
            .map_err(|e| DirectoryError::protocol_with_source("search failed", e))?;

        debug!(entries = entries.len(), "search completed");
        Ok(entries
            .into_iter()
            .map(|entry| entry_to_attributes(SearchEntry::construct(entry)))
            .collect())
    }

    /// Search for entries of a typed domain kind.
    ///
    /// Composes `T`'s filter template with the extra sub-filter (which may
    /// be empty) and parses every result through the entry model.
    pub async fn search_entries<T: DirectoryEntry>(
        &self,
        extra_filter: &str,
    ) -> DirectoryResult<Vec<T>> {
        let model = EntryModel::<T>::build()?;
        let filter = compose_filter(T::query_format(), extra_filter);

        let raw = self.search(&filter, None).await?;
        raw.iter().map(|attrs| model.parse_entry(attrs)).collect()
    }

    /// Replace the given attributes on the entry at `dn`.
    ///
    /// Only the named attributes are touched; an empty set is a no-op.
    #[instrument(skip(self, attributes), fields(dn = %dn))]
    pub async fn modify(&self, dn: &Dn, attributes: &Attributes) -> DirectoryResult<()> {
        if attributes.is_empty() {
            debug!("nothing to modify");
            return Ok(());
        }

        let mut ldap = self.handle().await?;

        let mods: Vec<Mod<Vec<u8>>> = attributes
            .iter()
            .map(|(name, values)| {
                let encoded: HashSet<Vec<u8>> = match values {
                    AttributeValues::Text(list) => {
                        list.iter().map(|v| v.clone().into_bytes()).collect()
                    }
                    AttributeValues::Binary(list) => list.iter().cloned().collect(),
                };
                Mod::Replace(name.as_bytes().to_vec(), encoded)
            })
            .collect();

        let target = dn.to_string();
        ldap.modify(&target, mods)
            .await
            .map_err(|e| {
                DirectoryError::protocol_with_source(format!("modify failed for {target}"), e)
            })?
            .success()
            .map_err(|e| {
                DirectoryError::protocol_with_source(format!("modify failed for {target}"), e)
            })?;

        debug!(attributes = attributes.len(), "entry modified");
        Ok(())
    }

    /// Modify an entry from a typed entity.
    ///
    /// Builds the write-permitted attribute set of `entity` (restricted to
    /// `names` when given, unset fields skipped) and replaces those
    /// attributes on the entry at `dn`. A no-op when nothing qualifies.
    pub async fn modify_entry<T: DirectoryEntry>(
        &self,
        dn: &Dn,
        entity: &T,
        names: Option<&[&str]>,
    ) -> DirectoryResult<()> {
        let model = EntryModel::<T>::build()?;
        let attributes = model.to_attributes(entity, AccessMode::Write, names)?;
        self.modify(dn, &attributes).await
    }
}

impl std::fmt::Debug for LdapTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapTree")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Substitute the extra sub-filter into a type's filter template.
pub fn compose_filter(template: &str, extra_filter: &str) -> String {
    template.replacen("{}", extra_filter, 1)
}

/// Escape special characters in a filter value (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Convert a protocol-level search entry to the attribute wire model.
///
/// The entry DN is carried under the `dn` pseudo-attribute; binary-valued
/// attributes stay binary for the raw path.
fn entry_to_attributes(entry: SearchEntry) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("dn", AttributeValues::single(entry.dn));

    for (name, values) in entry.attrs {
        attrs.insert(name, AttributeValues::Text(values));
    }
    for (name, values) in entry.bin_attrs {
        attrs.insert(name, AttributeValues::Binary(values));
    }
    attrs
}
