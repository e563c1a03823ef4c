//! Common Active Directory entry attributes
//!
//! The attribute block shared by every AD entity kind (users, groups,
//! computers): identity, naming and mail attributes plus group
//! memberships. Concrete entity types embed this block and contribute its
//! descriptors through [`entry_fields`], flattening the hierarchy at
//! registration time.

use chrono::{DateTime, Utc};

use adsync_directory::prelude::*;

use crate::group::AdGroup;

/// Attributes common to every entry in the AD tree.
///
/// `member_of` holds the DNs of the groups the entry belongs to, in
/// server order. `when_changed` and the distinguished name are maintained
/// by the directory and mapped read-only.
#[derive(Debug, Clone, Default)]
pub struct AdEntry {
    /// The entry's own distinguished name.
    pub distinguished_name: Option<Dn>,
    /// The account name (sAMAccountName).
    pub account_name: Option<String>,
    /// The common name (cn).
    pub common_name: Option<String>,
    /// The display name.
    pub name: Option<String>,
    /// The mail address.
    pub mail: Option<String>,
    /// DNs of the groups this entry is a member of.
    pub member_of: Vec<String>,
    /// Timestamp of the last modification of the entry.
    pub when_changed: Option<DateTime<Utc>>,
}

impl AdEntry {
    /// Check whether this entry belongs to a group with the given DN.
    pub fn is_member_of_dn(&self, group_dn: &str) -> bool {
        self.member_of
            .iter()
            .any(|dn| dn.eq_ignore_ascii_case(group_dn))
    }

    /// Check whether this entry belongs to the given group.
    pub fn is_member_of(&self, group: &AdGroup) -> bool {
        group
            .entry
            .distinguished_name
            .as_ref()
            .is_some_and(|dn| self.is_member_of_dn(&dn.to_string()))
    }
}

/// Contribute the common entry descriptors to a concrete entity type.
///
/// `get`/`get_mut` project the embedded [`AdEntry`] block out of the
/// entity. Callers list these descriptors first so their own declarations
/// can override by attribute name.
pub fn entry_fields<T: 'static>(
    get: fn(&T) -> &AdEntry,
    get_mut: fn(&mut T) -> &mut AdEntry,
) -> Vec<FieldDescriptor<T>> {
    vec![
        FieldDescriptor::scalar(
            "distinguishedName",
            AccessMode::Read,
            move |t: &T| &get(t).distinguished_name,
            move |t: &mut T| &mut get_mut(t).distinguished_name,
        ),
        FieldDescriptor::scalar(
            "sAMAccountName",
            AccessMode::ReadWrite,
            move |t: &T| &get(t).account_name,
            move |t: &mut T| &mut get_mut(t).account_name,
        ),
        FieldDescriptor::scalar(
            "cn",
            AccessMode::ReadWrite,
            move |t: &T| &get(t).common_name,
            move |t: &mut T| &mut get_mut(t).common_name,
        ),
        FieldDescriptor::scalar(
            "name",
            AccessMode::ReadWrite,
            move |t: &T| &get(t).name,
            move |t: &mut T| &mut get_mut(t).name,
        ),
        FieldDescriptor::scalar(
            "mail",
            AccessMode::ReadWrite,
            move |t: &T| &get(t).mail,
            move |t: &mut T| &mut get_mut(t).mail,
        ),
        // memberOf is computed by the server from the groups' member lists
        FieldDescriptor::multi(
            "memberOf",
            AccessMode::Read,
            move |t: &T| &get(t).member_of,
            move |t: &mut T| &mut get_mut(t).member_of,
        ),
        FieldDescriptor::scalar(
            "whenChanged",
            AccessMode::Read,
            move |t: &T| &get(t).when_changed,
            move |t: &mut T| &mut get_mut(t).when_changed,
        ),
    ]
}
