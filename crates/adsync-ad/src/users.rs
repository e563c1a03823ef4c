//! User repository
//!
//! Domain-specific queries and updates for user entries, built on the
//! directory tree façade and the entry mapper.

use tracing::{debug, instrument};

use adsync_directory::prelude::*;

use crate::group::AdGroup;
use crate::password::{encode_password, require_encrypted};
use crate::tree::AdTree;
use crate::user::AdUser;

/// Repository of the user entries contained in an AD tree.
pub struct UsersRepository<'a> {
    tree: &'a AdTree,
}

impl<'a> UsersRepository<'a> {
    pub(crate) fn new(tree: &'a AdTree) -> Self {
        Self { tree }
    }

    /// Query users, optionally narrowed by an extra LDAP sub-filter.
    pub async fn query_users(&self, filter: Option<&str>) -> DirectoryResult<Vec<AdUser>> {
        self.tree
            .ldap()
            .search_entries::<AdUser>(filter.unwrap_or(""))
            .await
    }

    /// Find the user with the given account name (sAMAccountName).
    #[instrument(skip(self))]
    pub async fn query_user_by_account_name(
        &self,
        account_name: &str,
    ) -> DirectoryResult<Option<AdUser>> {
        let users = self
            .query_users(Some(&account_name_filter(account_name)))
            .await?;
        // The account name is unique; keep the first match regardless
        Ok(users.into_iter().next())
    }

    /// Find the user with the given DN.
    pub async fn query_user_by_dn(&self, dn: &Dn) -> DirectoryResult<Option<AdUser>> {
        let filter = format!(
            "(distinguishedName={})",
            escape_filter_value(&dn.to_string())
        );
        let users = self.query_users(Some(&filter)).await?;
        Ok(users.into_iter().next())
    }

    /// Query users by name.
    ///
    /// `name` may contain LDAP wildcards; with `with_mail` only users with
    /// a mail address are returned.
    pub async fn query_users_by_name(
        &self,
        name: &str,
        with_mail: bool,
    ) -> DirectoryResult<Vec<AdUser>> {
        self.query_users(Some(&name_filter(name, with_mail))).await
    }

    /// Query the users that are members of the given group.
    pub async fn query_group_members(
        &self,
        group: &AdGroup,
        with_mail: bool,
    ) -> DirectoryResult<Vec<AdUser>> {
        let group_dn = group
            .entry
            .distinguished_name
            .as_ref()
            .ok_or(DirectoryError::MissingDn)?;
        self.query_users(Some(&member_of_filter(&group_dn.to_string(), with_mail)))
            .await
    }

    /// Write a user's modified attributes back to the directory.
    ///
    /// Restricted to `names` when given; write-denied and unset fields are
    /// skipped, so untouched attributes stay intact.
    #[instrument(skip(self, user, names))]
    pub async fn modify_user(
        &self,
        user: &AdUser,
        names: Option<&[&str]>,
    ) -> DirectoryResult<()> {
        let dn = user
            .entry
            .distinguished_name
            .as_ref()
            .ok_or(DirectoryError::MissingDn)?;
        self.tree.ldap().modify_entry(dn, user, names).await
    }

    /// Change a user's password.
    ///
    /// Encodes the plaintext for the unicodePwd attribute and replaces it
    /// on the user's entry. Requires an encrypted connection.
    #[instrument(skip(self, user, new_password))]
    pub async fn change_password(
        &self,
        user: &AdUser,
        new_password: &str,
    ) -> DirectoryResult<()> {
        require_encrypted(self.tree.ldap().config().protocol)?;

        let dn = user
            .entry
            .distinguished_name
            .as_ref()
            .ok_or(DirectoryError::MissingDn)?;

        let mut attributes = Attributes::new();
        attributes.insert(
            "unicodePwd",
            AttributeValues::binary(encode_password(new_password)?),
        );
        self.tree.ldap().modify(dn, &attributes).await?;

        debug!(dn = %dn, "password changed");
        Ok(())
    }
}

fn account_name_filter(account_name: &str) -> String {
    format!("(sAMAccountName={})", escape_filter_value(account_name))
}

fn name_filter(name: &str, with_mail: bool) -> String {
    let mut filter = format!("(name={name})");
    if with_mail {
        filter.push_str("(mail=*)");
    }
    filter
}

fn member_of_filter(group_dn: &str, with_mail: bool) -> String {
    let mut filter = format!("(memberOf={})", escape_filter_value(group_dn));
    if with_mail {
        filter.push_str("(mail=*)");
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_name_filter_escapes_metacharacters() {
        assert_eq!(account_name_filter("alice"), "(sAMAccountName=alice)");
        assert_eq!(account_name_filter("a*b"), "(sAMAccountName=a\\2ab)");
    }

    #[test]
    fn test_name_filter_keeps_wildcards() {
        assert_eq!(name_filter("Ali*", false), "(name=Ali*)");
        assert_eq!(name_filter("Ali*", true), "(name=Ali*)(mail=*)");
    }

    #[test]
    fn test_member_of_filter() {
        assert_eq!(
            member_of_filter("CN=Staff,DC=example,DC=com", false),
            "(memberOf=CN=Staff,DC=example,DC=com)"
        );
        assert_eq!(
            member_of_filter("CN=Staff,DC=example,DC=com", true),
            "(memberOf=CN=Staff,DC=example,DC=com)(mail=*)"
        );
    }

    #[test]
    fn test_composed_user_query() {
        let filter = compose_filter(AdUser::query_format(), &account_name_filter("alice"));
        assert_eq!(filter, "(&(objectCategory=Person)(sAMAccountName=alice))");
    }
}
