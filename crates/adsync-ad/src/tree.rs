//! Active Directory tree
//!
//! A thin AD-flavored wrapper around the generic directory tree, handing
//! out the user and group repositories.

use adsync_directory::prelude::*;

use crate::groups::GroupsRepository;
use crate::users::UsersRepository;

/// An Active Directory tree.
///
/// Owns the underlying connection façade; repositories borrow it, so one
/// connected tree serves any number of query batches.
#[derive(Debug)]
pub struct AdTree {
    ldap: LdapTree,
}

impl AdTree {
    /// Create a tree for the given connection configuration.
    pub fn new(config: LdapConfig) -> DirectoryResult<Self> {
        Ok(Self {
            ldap: LdapTree::new(config)?,
        })
    }

    /// Get the underlying directory tree for direct operations.
    pub fn ldap(&self) -> &LdapTree {
        &self.ldap
    }

    /// Connect to the domain controller and bind.
    pub async fn connect(&self) -> DirectoryResult<()> {
        self.ldap.connect().await
    }

    /// Disconnect from the domain controller.
    pub async fn disconnect(&self) -> DirectoryResult<()> {
        self.ldap.disconnect().await
    }

    /// Check whether the tree is connected.
    pub async fn is_connected(&self) -> bool {
        self.ldap.is_connected().await
    }

    /// Get the user repository of this tree.
    pub fn users(&self) -> UsersRepository<'_> {
        UsersRepository::new(self)
    }

    /// Get the group repository of this tree.
    pub fn groups(&self) -> GroupsRepository<'_> {
        GroupsRepository::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tree() -> AdTree {
        AdTree::new(LdapConfig::new(
            "dc1.example.com",
            "dc=example,dc=com",
            "cn=sync,dc=example,dc=com",
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_not_connected_initially() {
        let tree = test_tree();
        assert!(!tree.is_connected().await);
    }

    #[tokio::test]
    async fn test_queries_require_connection() {
        let tree = test_tree();
        let err = tree.users().query_users(None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotConnected));

        let err = tree.groups().query_groups(None).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotConnected));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(AdTree::new(LdapConfig::new("", "", "")).is_err());
    }
}
