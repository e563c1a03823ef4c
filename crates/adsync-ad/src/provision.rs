//! Account-system attribute mapping
//!
//! Translates between AD attribute names and the attribute names of the
//! external account system being provisioned. The default maps cover the
//! attributes the account system mirrors; deployments extend them through
//! [`AttributeMap`].

use adsync_directory::prelude::*;

use crate::user::AdUser;

/// The default AD → account-system attribute map for users.
pub fn default_user_mapping() -> AttributeMap {
    AttributeMap::new()
        .map("cn", "cn")
        .map("name", "displayName")
        .map("givenName", "givenName")
        .map("sn", "sn")
        .map("distinguishedName", "externalDn")
}

/// The default AD → account-system attribute map for groups.
///
/// Group attributes are not mirrored by default; deployments opt in per
/// attribute.
pub fn default_group_mapping() -> AttributeMap {
    AttributeMap::new()
}

/// Build the account-system attribute set of a user.
///
/// Reads the user's mapped fields and keys them by the account-system
/// names. Unset fields are omitted.
pub fn map_user_for_account(
    user: &AdUser,
    mapping: &AttributeMap,
) -> DirectoryResult<Attributes> {
    let model = EntryModel::<AdUser>::build()?;
    model.map_fields_into_attributes(user, AccessMode::Read, mapping)
}

/// Apply account-system attribute changes to a user entity.
///
/// The reverse direction: values keyed by account-system names are
/// translated back through the mapping and written into the user's
/// write-permitted fields, ready for [`modify_user`].
///
/// [`modify_user`]: crate::users::UsersRepository::modify_user
pub fn apply_account_changes(
    user: &mut AdUser,
    changes: &Attributes,
    mapping: &AttributeMap,
) -> DirectoryResult<()> {
    let model = EntryModel::<AdUser>::build()?;
    model.fill_fields_from_attributes(user, changes, mapping)
}
