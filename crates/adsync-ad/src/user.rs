//! Active Directory user entries

use uuid::Uuid;

use adsync_directory::prelude::*;

use crate::entry::{entry_fields, AdEntry};

/// userAccountControl flag: account is disabled.
pub const UAC_ACCOUNT_DISABLE: i64 = 0x0002;

/// userAccountControl flag: normal user account.
pub const UAC_NORMAL_ACCOUNT: i64 = 0x0200;

/// A user entry in the AD tree.
///
/// The GUID and password travel on the raw path: `object_guid` is the
/// server-assigned binary identifier, `unicode_pwd` is write-only and
/// carries the already-encoded password bytes (see
/// [`crate::password::encode_password`]).
#[derive(Debug, Clone, Default)]
pub struct AdUser {
    /// Attributes shared with other entry kinds.
    pub entry: AdEntry,
    /// The user's given name.
    pub given_name: Option<String>,
    /// The user's surname (sn).
    pub surname: Option<String>,
    /// The user principal name (login in `user@realm` form).
    pub user_principal_name: Option<String>,
    /// The server-assigned binary GUID of the entry.
    pub object_guid: Option<Vec<u8>>,
    /// Encoded password bytes for a pending password change.
    pub unicode_pwd: Option<Vec<u8>>,
    /// The userAccountControl flag word.
    pub user_account_control: Option<i64>,
}

impl AdUser {
    /// Decode the entry GUID.
    ///
    /// AD stores GUIDs with the first three fields little-endian; returns
    /// `None` when the attribute is absent or not 16 bytes.
    pub fn guid(&self) -> Option<Uuid> {
        let bytes: [u8; 16] = self.object_guid.as_deref()?.try_into().ok()?;
        Some(Uuid::from_bytes_le(bytes))
    }

    /// Check whether the account is disabled.
    pub fn is_disabled(&self) -> bool {
        self.user_account_control
            .is_some_and(|uac| uac & UAC_ACCOUNT_DISABLE != 0)
    }
}

impl DirectoryEntry for AdUser {
    fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = entry_fields(|u: &AdUser| &u.entry, |u: &mut AdUser| &mut u.entry);
        fields.extend([
            FieldDescriptor::scalar(
                "givenName",
                AccessMode::ReadWrite,
                |u: &AdUser| &u.given_name,
                |u: &mut AdUser| &mut u.given_name,
            ),
            FieldDescriptor::scalar(
                "sn",
                AccessMode::ReadWrite,
                |u: &AdUser| &u.surname,
                |u: &mut AdUser| &mut u.surname,
            ),
            FieldDescriptor::scalar(
                "userPrincipalName",
                AccessMode::ReadWrite,
                |u: &AdUser| &u.user_principal_name,
                |u: &mut AdUser| &mut u.user_principal_name,
            ),
            FieldDescriptor::raw(
                "objectGUID",
                AccessMode::Read,
                |u: &AdUser| &u.object_guid,
                |u: &mut AdUser| &mut u.object_guid,
            ),
            FieldDescriptor::raw(
                "unicodePwd",
                AccessMode::Write,
                |u: &AdUser| &u.unicode_pwd,
                |u: &mut AdUser| &mut u.unicode_pwd,
            ),
            FieldDescriptor::scalar(
                "userAccountControl",
                AccessMode::ReadWrite,
                |u: &AdUser| &u.user_account_control,
                |u: &mut AdUser| &mut u.user_account_control,
            ),
        ]);
        fields
    }

    fn query_format() -> &'static str {
        "(&(objectCategory=Person){})"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_directory::prelude::*;

    #[test]
    fn test_parse_user_entry() {
        let attrs = Attributes::new()
            .with(
                "distinguishedName",
                AttributeValues::single("CN=Alice,OU=Staff,DC=example,DC=com"),
            )
            .with("sAMAccountName", AttributeValues::single("alice"))
            .with("givenName", AttributeValues::single("Alice"))
            .with("sn", AttributeValues::single("Price"))
            .with("mail", AttributeValues::single("alice@example.com"))
            .with(
                "memberOf",
                AttributeValues::text([
                    "CN=Staff,DC=example,DC=com",
                    "CN=Admins,DC=example,DC=com",
                ]),
            )
            .with("whenChanged", AttributeValues::single("20240312090730.0Z"))
            .with("userAccountControl", AttributeValues::single("514"));

        let user: AdUser = parse_entry(&attrs).unwrap();
        assert_eq!(
            user.entry.distinguished_name,
            Some(Dn::parse("cn=alice,ou=staff,dc=example,dc=com").unwrap())
        );
        assert_eq!(user.entry.account_name.as_deref(), Some("alice"));
        assert_eq!(user.given_name.as_deref(), Some("Alice"));
        assert_eq!(user.surname.as_deref(), Some("Price"));
        assert_eq!(user.entry.member_of.len(), 2);
        assert!(user.entry.when_changed.is_some());
        // 514 = NORMAL_ACCOUNT | ACCOUNTDISABLE
        assert!(user.is_disabled());
    }

    #[test]
    fn test_guid_decoding() {
        let mut user = AdUser::default();
        assert!(user.guid().is_none());

        user.object_guid = Some(vec![
            0x04, 0x03, 0x02, 0x01, // data1, little-endian
            0x06, 0x05, // data2
            0x08, 0x07, // data3
            0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
        ]);
        let guid = user.guid().unwrap();
        assert_eq!(
            guid.to_string(),
            "01020304-0506-0708-090a-0b0c0d0e0f10"
        );

        user.object_guid = Some(vec![0x01, 0x02]);
        assert!(user.guid().is_none());
    }

    #[test]
    fn test_password_is_write_only() {
        let attrs = Attributes::new().with(
            "unicodePwd",
            AttributeValues::binary(vec![0x22, 0x00]),
        );
        let user: AdUser = parse_entry(&attrs).unwrap();
        assert!(user.unicode_pwd.is_none());
    }

    #[test]
    fn test_guid_never_enters_write_set() {
        let user = AdUser {
            object_guid: Some(vec![0u8; 16]),
            given_name: Some("Alice".to_string()),
            ..Default::default()
        };
        let attrs = entry_attributes(&user, AccessMode::Write, None).unwrap();
        assert!(!attrs.contains("objectGUID"));
        assert!(attrs.contains("givenName"));
    }

    #[test]
    fn test_enabled_account_is_not_disabled() {
        let user = AdUser {
            user_account_control: Some(UAC_NORMAL_ACCOUNT),
            ..Default::default()
        };
        assert!(!user.is_disabled());

        let unknown = AdUser::default();
        assert!(!unknown.is_disabled());
    }
}
