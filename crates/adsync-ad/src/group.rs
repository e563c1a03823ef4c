//! Active Directory group entries

use adsync_directory::prelude::*;

use crate::entry::{entry_fields, AdEntry};

/// groupType flag: security-enabled group (distribution lists have it
/// clear). Stored by AD as the sign bit of a 32-bit integer.
pub const GROUP_TYPE_SECURITY_ENABLED: i64 = 0x8000_0000;

/// A group entry in the AD tree: a security group or a distribution list.
#[derive(Debug, Clone, Default)]
pub struct AdGroup {
    /// Attributes shared with other entry kinds.
    pub entry: AdEntry,
    /// DNs of the entries that belong to this group, in server order.
    pub members: Vec<String>,
    /// The groupType flag word.
    pub group_type: Option<i64>,
}

impl AdGroup {
    /// Check whether an entry with the given DN belongs to this group.
    pub fn is_member_dn(&self, dn: &str) -> bool {
        self.members.iter().any(|member| member.eq_ignore_ascii_case(dn))
    }

    /// Check whether an AD entry belongs to this group.
    pub fn is_member(&self, entry: &AdEntry) -> bool {
        entry
            .distinguished_name
            .as_ref()
            .is_some_and(|dn| self.is_member_dn(&dn.to_string()))
    }

    /// Check whether this is a security group rather than a distribution
    /// list.
    ///
    /// The flag occupies the sign bit, so values read from the directory
    /// are negative for security groups.
    pub fn is_security_group(&self) -> bool {
        self.group_type
            .is_some_and(|group_type| group_type & GROUP_TYPE_SECURITY_ENABLED != 0)
    }
}

impl DirectoryEntry for AdGroup {
    fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = entry_fields(|g: &AdGroup| &g.entry, |g: &mut AdGroup| &mut g.entry);
        fields.extend([
            FieldDescriptor::multi(
                "member",
                AccessMode::ReadWrite,
                |g: &AdGroup| &g.members,
                |g: &mut AdGroup| &mut g.members,
            ),
            FieldDescriptor::scalar(
                "groupType",
                AccessMode::Read,
                |g: &AdGroup| &g.group_type,
                |g: &mut AdGroup| &mut g.group_type,
            ),
        ]);
        fields
    }

    fn query_format() -> &'static str {
        "(&(objectCategory=Group){})"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_directory::prelude::*;

    #[test]
    fn test_parse_group_entry() {
        let attrs = Attributes::new()
            .with(
                "distinguishedName",
                AttributeValues::single("CN=Staff,DC=example,DC=com"),
            )
            .with("cn", AttributeValues::single("Staff"))
            .with(
                "member",
                AttributeValues::text([
                    "CN=Alice,DC=example,DC=com",
                    "CN=Bob,DC=example,DC=com",
                ]),
            )
            // -2147483646 = security flag | global scope
            .with("groupType", AttributeValues::single("-2147483646"));

        let group: AdGroup = parse_entry(&attrs).unwrap();
        assert_eq!(group.entry.common_name.as_deref(), Some("Staff"));
        assert_eq!(
            group.members,
            vec!["CN=Alice,DC=example,DC=com", "CN=Bob,DC=example,DC=com"]
        );
        assert!(group.is_security_group());
    }

    #[test]
    fn test_distribution_list_is_not_security_group() {
        let group = AdGroup {
            group_type: Some(2),
            ..Default::default()
        };
        assert!(!group.is_security_group());

        let unknown = AdGroup::default();
        assert!(!unknown.is_security_group());
    }

    #[test]
    fn test_membership_checks() {
        let group = AdGroup {
            members: vec!["CN=Alice,DC=example,DC=com".to_string()],
            ..Default::default()
        };
        assert!(group.is_member_dn("cn=alice,dc=example,dc=com"));
        assert!(!group.is_member_dn("cn=bob,dc=example,dc=com"));

        let entry = AdEntry {
            distinguished_name: Some(Dn::parse("CN=Alice,DC=example,DC=com").unwrap()),
            ..Default::default()
        };
        assert!(group.is_member(&entry));
        assert!(!group.is_member(&AdEntry::default()));
    }

    #[test]
    fn test_member_order_round_trip() {
        let attrs = Attributes::new().with("member", AttributeValues::text(["dn1", "dn2"]));
        let group: AdGroup = parse_entry(&attrs).unwrap();
        assert_eq!(group.members, vec!["dn1", "dn2"]);

        let rebuilt = entry_attributes(&group, AccessMode::Write, Some(&["member"])).unwrap();
        assert_eq!(
            rebuilt.get("member").unwrap().as_text().unwrap(),
            &["dn1".to_string(), "dn2".to_string()]
        );
    }
}
