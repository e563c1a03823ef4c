//! Group repository
//!
//! Domain-specific queries for group entries: security groups,
//! distribution lists, and the built-in Administrators group.

use tracing::instrument;

use adsync_directory::prelude::*;

use crate::entry::AdEntry;
use crate::group::AdGroup;
use crate::tree::AdTree;

/// Name of the built-in administrators group, present in every AD domain.
const ADMINISTRATORS_GROUP: &str = "Administrators";

/// Bit-match rule identifier for groupType filters (LDAP_MATCHING_RULE_BIT_AND).
const BIT_AND_RULE: &str = "1.2.840.113556.1.4.803";

/// Repository of the group entries contained in an AD tree.
pub struct GroupsRepository<'a> {
    tree: &'a AdTree,
}

impl<'a> GroupsRepository<'a> {
    pub(crate) fn new(tree: &'a AdTree) -> Self {
        Self { tree }
    }

    /// Query groups, optionally narrowed by an extra LDAP sub-filter.
    pub async fn query_groups(&self, filter: Option<&str>) -> DirectoryResult<Vec<AdGroup>> {
        self.tree
            .ldap()
            .search_entries::<AdGroup>(filter.unwrap_or(""))
            .await
    }

    /// Find the group with the given DN.
    pub async fn query_group_by_dn(&self, dn: &Dn) -> DirectoryResult<Option<AdGroup>> {
        let filter = format!(
            "(distinguishedName={})",
            escape_filter_value(&dn.to_string())
        );
        let groups = self.query_groups(Some(&filter)).await?;
        Ok(groups.into_iter().next())
    }

    /// Query groups by name.
    ///
    /// `name` may contain LDAP wildcards; with `with_mail` only groups
    /// with a mail address are returned.
    pub async fn query_groups_by_name(
        &self,
        name: &str,
        with_mail: bool,
    ) -> DirectoryResult<Vec<AdGroup>> {
        self.query_groups(Some(&name_filter(name, with_mail))).await
    }

    /// Query distribution lists by name.
    ///
    /// A distribution list is a group without the security flag in its
    /// groupType word.
    pub async fn query_distribution_lists_by_name(
        &self,
        name: &str,
        with_mail: bool,
    ) -> DirectoryResult<Vec<AdGroup>> {
        self.query_groups(Some(&distribution_list_filter(name, with_mail)))
            .await
    }

    /// Query the groups an entry belongs to.
    pub async fn query_entry_groups(
        &self,
        entry: &AdEntry,
        with_mail: bool,
    ) -> DirectoryResult<Vec<AdGroup>> {
        let dn = entry
            .distinguished_name
            .as_ref()
            .ok_or(DirectoryError::MissingDn)?;
        self.query_groups(Some(&member_filter(&dn.to_string(), with_mail)))
            .await
    }

    /// Get the built-in Administrators group.
    ///
    /// The group always exists in an AD domain, so its absence is an
    /// error rather than an empty result.
    #[instrument(skip(self))]
    pub async fn administrators_group(&self) -> DirectoryResult<AdGroup> {
        let groups = self
            .query_groups_by_name(ADMINISTRATORS_GROUP, false)
            .await?;
        groups
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::GroupNotFound {
                name: ADMINISTRATORS_GROUP.to_string(),
            })
    }
}

fn name_filter(name: &str, with_mail: bool) -> String {
    let mut filter = format!("(name={name})");
    if with_mail {
        filter.push_str("(mail=*)");
    }
    filter
}

fn distribution_list_filter(name: &str, with_mail: bool) -> String {
    let mut filter = format!(
        "(name={name})(!(groupType:{BIT_AND_RULE}:={}))",
        crate::group::GROUP_TYPE_SECURITY_ENABLED
    );
    if with_mail {
        filter.push_str("(mail=*)");
    }
    filter
}

fn member_filter(entry_dn: &str, with_mail: bool) -> String {
    let mut filter = format!("(member={})", escape_filter_value(entry_dn));
    if with_mail {
        filter.push_str("(mail=*)");
    }
    filter
}
