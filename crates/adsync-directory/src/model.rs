//! Entry model and mapper
//!
//! The descriptor table for one domain type, and the bidirectional mapping
//! between raw directory attribute sets and typed entities: parsing search
//! results into structs, building selective attribute sets for
//! modification, and renaming attributes for an external account system.

use std::collections::HashMap;

use tracing::debug;

use crate::attribute::Attributes;
use crate::descriptor::{AccessMode, FieldDescriptor};
use crate::error::{DirectoryError, DirectoryResult};

/// A domain type mapped onto directory entries.
///
/// Implementors declare their attribute-bound fields as an explicit
/// descriptor list. A derived type contributes its base type's descriptors
/// first (through a projection helper) and its own afterwards, flattening
/// the hierarchy at registration time; a later descriptor for an already
/// declared attribute name overrides the earlier one.
pub trait DirectoryEntry: Default {
    /// The declared attribute-bound fields of this type.
    fn attribute_fields() -> Vec<FieldDescriptor<Self>>;

    /// The search filter template for this type, containing exactly one
    /// `{}` placeholder for an additional sub-filter.
    fn query_format() -> &'static str;
}

/// The descriptor table of one domain type, indexed by attribute name.
#[derive(Debug)]
pub struct EntryModel<T> {
    fields: Vec<FieldDescriptor<T>>,
    index: HashMap<String, usize>,
}

impl<T: DirectoryEntry> EntryModel<T> {
    /// Build the descriptor table for `T`.
    ///
    /// Fails with a configuration error when the type declares no mapped
    /// fields: such a type could never round-trip through the directory.
    /// Duplicate attribute names resolve to the last declaration, so the
    /// most-derived descriptor wins.
    pub fn build() -> DirectoryResult<Self> {
        let fields = T::attribute_fields();
        if fields.is_empty() {
            return Err(DirectoryError::configuration(
                "entry type has no attributes to be returned",
            ));
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            index.insert(field.attribute().to_ascii_lowercase(), position);
        }

        debug!(
            attributes = index.len(),
            declared = fields.len(),
            "built entry descriptor table"
        );
        Ok(Self { fields, index })
    }
}

impl<T> EntryModel<T> {
    /// Look up the effective descriptor for an attribute name.
    pub fn descriptor(&self, attribute: &str) -> Option<&FieldDescriptor<T>> {
        self.index
            .get(&attribute.to_ascii_lowercase())
            .map(|&position| &self.fields[position])
    }

    /// Iterate over the effective descriptors in declaration order.
    ///
    /// Overridden declarations (same attribute name earlier in the list)
    /// are skipped.
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter().enumerate().filter_map(|(position, field)| {
            let effective = self.index[&field.attribute().to_ascii_lowercase()];
            (effective == position).then_some(field)
        })
    }

    /// Get the number of mapped attributes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// A built model is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Convert a raw directory entry into a typed entity.
    ///
    /// Fields whose attribute is absent, or whose policy denies reading,
    /// keep their default value; a missing attribute is never an error.
    /// A conversion failure aborts the whole parse, so a partially
    /// populated entity is never returned.
    pub fn parse_entry(&self, attributes: &Attributes) -> DirectoryResult<T>
    where
        T: Default,
    {
        let mut entity = T::default();
        for field in self.descriptors() {
            if !field.permits(AccessMode::Read) {
                continue;
            }
            if let Some(values) = attributes.get(field.attribute()) {
                field.write_to(&mut entity, values)?;
            }
        }
        Ok(entity)
    }

    /// Build the attribute set of an entity for a directory write.
    ///
    /// When `names` is given the set is restricted to those attributes;
    /// names the type does not declare are silently ignored. Only fields
    /// whose policy satisfies `requested` and whose value is set are
    /// included — unset fields are omitted entirely, never written as an
    /// explicit clear, so untouched attributes stay intact on the server.
    pub fn to_attributes(
        &self,
        entity: &T,
        requested: AccessMode,
        names: Option<&[&str]>,
    ) -> DirectoryResult<Attributes> {
        let mut attributes = Attributes::new();
        match names {
            Some(names) => {
                for name in names {
                    let Some(field) = self.descriptor(name) else {
                        continue;
                    };
                    self.collect(field, entity, requested, &mut attributes)?;
                }
            }
            None => {
                for field in self.descriptors() {
                    self.collect(field, entity, requested, &mut attributes)?;
                }
            }
        }
        Ok(attributes)
    }

    fn collect(
        &self,
        field: &FieldDescriptor<T>,
        entity: &T,
        requested: AccessMode,
        attributes: &mut Attributes,
    ) -> DirectoryResult<()> {
        if !field.permits(requested) {
            return Ok(());
        }
        if let Some(values) = field.read_from(entity)? {
            attributes.insert(field.attribute().to_string(), values);
        }
        Ok(())
    }

    /// Build an attribute set with names translated for an external
    /// system.
    ///
    /// Only fields present in the mapping participate; the usual policy
    /// and null-skip rules apply.
    pub fn map_fields_into_attributes(
        &self,
        entity: &T,
        requested: AccessMode,
        mapping: &AttributeMap,
    ) -> DirectoryResult<Attributes> {
        let mut attributes = Attributes::new();
        for field in self.descriptors() {
            let Some(target) = mapping.target(field.attribute()) else {
                continue;
            };
            if !field.permits(requested) {
                continue;
            }
            if let Some(values) = field.read_from(entity)? {
                attributes.insert(target.to_string(), values);
            }
        }
        Ok(attributes)
    }

    /// Fill entity fields from external-system attribute values.
    ///
    /// The reverse of [`map_fields_into_attributes`]: values keyed by the
    /// external names are translated back through the mapping and written
    /// into write-permitted fields. Missing values are ignored.
    ///
    /// [`map_fields_into_attributes`]: Self::map_fields_into_attributes
    pub fn fill_fields_from_attributes(
        &self,
        entity: &mut T,
        attributes: &Attributes,
        mapping: &AttributeMap,
    ) -> DirectoryResult<()> {
        for field in self.descriptors() {
            let Some(target) = mapping.target(field.attribute()) else {
                continue;
            };
            if !field.permits(AccessMode::Write) {
                continue;
            }
            if let Some(values) = attributes.get(target) {
                field.write_to(entity, values)?;
            }
        }
        Ok(())
    }
}

/// Convert one raw directory entry into a typed entity.
///
/// Convenience wrapper building the descriptor table first; batch callers
/// should build an [`EntryModel`] once and reuse it.
pub fn parse_entry<T: DirectoryEntry>(attributes: &Attributes) -> DirectoryResult<T> {
    EntryModel::<T>::build()?.parse_entry(attributes)
}

/// Build an entity's attribute set for a directory write.
///
/// Convenience wrapper around [`EntryModel::to_attributes`].
pub fn entry_attributes<T: DirectoryEntry>(
    entity: &T,
    requested: AccessMode,
    names: Option<&[&str]>,
) -> DirectoryResult<Attributes> {
    EntryModel::<T>::build()?.to_attributes(entity, requested, names)
}

/// A directory-attribute → external-attribute rename table.
///
/// Lookup is case-insensitive on the directory side. When the same source
/// attribute is mapped twice, the last mapping wins.
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
}

impl AttributeMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping from a directory attribute to an external attribute.
    #[must_use]
    pub fn map(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&source))
        {
            entry.1 = target;
        } else {
            self.entries.push((source, target));
        }
        self
    }

    /// Look up the external name for a directory attribute.
    pub fn target(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(source))
            .map(|(_, target)| target.as_str())
    }

    /// Iterate over the (directory, external) attribute name pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(source, target)| (source.as_str(), target.as_str()))
    }

    /// Get the number of mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeValues;
    use crate::descriptor::FieldDescriptor;

    #[derive(Debug, Default)]
    struct Person {
        name: Option<String>,
        email: Option<String>,
        groups: Vec<String>,
    }

    impl DirectoryEntry for Person {
        fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
            vec![
                FieldDescriptor::scalar(
                    "cn",
                    AccessMode::ReadWrite,
                    |p: &Person| &p.name,
                    |p: &mut Person| &mut p.name,
                ),
                FieldDescriptor::scalar(
                    "mail",
                    AccessMode::Read,
                    |p: &Person| &p.email,
                    |p: &mut Person| &mut p.email,
                ),
                FieldDescriptor::multi(
                    "member",
                    AccessMode::ReadWrite,
                    |p: &Person| &p.groups,
                    |p: &mut Person| &mut p.groups,
                ),
            ]
        }

        fn query_format() -> &'static str {
            "(&(objectCategory=Person){})"
        }
    }

    #[derive(Debug, Default)]
    struct Empty;

    impl DirectoryEntry for Empty {
        fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
            Vec::new()
        }

        fn query_format() -> &'static str {
            "(&(objectClass=*){})"
        }
    }

    #[test]
    fn test_empty_model_fails_to_build() {
        let err = EntryModel::<Empty>::build().unwrap_err();
        match err {
            DirectoryError::Configuration { message } => {
                assert!(message.contains("no attributes"));
            }
            other => panic!("expected configuration error, got {other}"),
        }
    }

    #[test]
    fn test_parse_entry_populates_read_fields() {
        let attrs = Attributes::new()
            .with("cn", AttributeValues::single("Alice"))
            .with("mail", AttributeValues::single("a@x.com"));

        let person: Person = parse_entry(&attrs).unwrap();
        assert_eq!(person.name.as_deref(), Some("Alice"));
        assert_eq!(person.email.as_deref(), Some("a@x.com"));
        assert!(person.groups.is_empty());
    }

    #[test]
    fn test_parse_entry_ignores_missing_attributes() {
        let attrs = Attributes::new().with("cn", AttributeValues::single("Alice"));
        let person: Person = parse_entry(&attrs).unwrap();
        assert_eq!(person.name.as_deref(), Some("Alice"));
        assert!(person.email.is_none());
    }

    #[test]
    fn test_write_only_field_is_invisible_to_parse() {
        #[derive(Debug, Default)]
        struct Secretive {
            token: Option<String>,
        }

        impl DirectoryEntry for Secretive {
            fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
                vec![FieldDescriptor::scalar(
                    "token",
                    AccessMode::Write,
                    |s: &Secretive| &s.token,
                    |s: &mut Secretive| &mut s.token,
                )]
            }

            fn query_format() -> &'static str {
                "(&(objectClass=*){})"
            }
        }

        let attrs = Attributes::new().with("token", AttributeValues::single("sekrit"));
        let parsed: Secretive = parse_entry(&attrs).unwrap();
        assert!(parsed.token.is_none());
    }

    #[test]
    fn test_read_only_field_never_written() {
        let person = Person {
            name: Some("Bob".to_string()),
            email: Some("b@x.com".to_string()),
            groups: Vec::new(),
        };
        let attrs = entry_attributes(&person, AccessMode::Write, None).unwrap();
        assert!(attrs.contains("cn"));
        // mail is Read-only and must not appear in a write set
        assert!(!attrs.contains("mail"));
    }

    #[test]
    fn test_null_fields_are_omitted() {
        let person = Person {
            name: Some("Bob".to_string()),
            email: None,
            groups: Vec::new(),
        };
        let attrs =
            entry_attributes(&person, AccessMode::Read, Some(&["cn", "mail"])).unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.first_text("cn"), Some("Bob"));
        assert!(!attrs.contains("mail"));
    }

    #[test]
    fn test_unknown_names_silently_ignored() {
        let person = Person {
            name: Some("Bob".to_string()),
            ..Default::default()
        };
        let attrs =
            entry_attributes(&person, AccessMode::Read, Some(&["cn", "noSuchAttr"])).unwrap();
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_multi_value_round_trip_preserves_order() {
        let attrs = Attributes::new().with("member", AttributeValues::text(["dn1", "dn2"]));
        let person: Person = parse_entry(&attrs).unwrap();
        assert_eq!(person.groups, vec!["dn1", "dn2"]);

        let rebuilt = entry_attributes(&person, AccessMode::Write, Some(&["member"])).unwrap();
        assert_eq!(
            rebuilt.get("member").unwrap().as_text().unwrap(),
            &["dn1".to_string(), "dn2".to_string()]
        );
    }

    #[test]
    fn test_conversion_failure_aborts_parse() {
        #[derive(Debug, Default)]
        struct Numbered {
            count: Option<i32>,
        }

        impl DirectoryEntry for Numbered {
            fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
                vec![FieldDescriptor::scalar(
                    "count",
                    AccessMode::ReadWrite,
                    |n: &Numbered| &n.count,
                    |n: &mut Numbered| &mut n.count,
                )]
            }

            fn query_format() -> &'static str {
                "(&(objectClass=*){})"
            }
        }

        let attrs = Attributes::new().with("count", AttributeValues::single("elephant"));
        let result: DirectoryResult<Numbered> = parse_entry(&attrs);
        assert!(matches!(
            result,
            Err(DirectoryError::Conversion { .. })
        ));
    }

    #[test]
    fn test_most_derived_declaration_wins() {
        // Simulates a derived type re-declaring an inherited attribute:
        // base descriptors come first, the override follows.
        #[derive(Debug, Default)]
        struct Derived {
            base_name: Option<String>,
            own_name: Option<String>,
        }

        impl DirectoryEntry for Derived {
            fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
                vec![
                    FieldDescriptor::scalar(
                        "cn",
                        AccessMode::ReadWrite,
                        |d: &Derived| &d.base_name,
                        |d: &mut Derived| &mut d.base_name,
                    ),
                    FieldDescriptor::scalar(
                        "cn",
                        AccessMode::ReadWrite,
                        |d: &Derived| &d.own_name,
                        |d: &mut Derived| &mut d.own_name,
                    ),
                ]
            }

            fn query_format() -> &'static str {
                "(&(objectClass=*){})"
            }
        }

        let model = EntryModel::<Derived>::build().unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.descriptors().count(), 1);

        let attrs = Attributes::new().with("cn", AttributeValues::single("Alice"));
        let derived = model.parse_entry(&attrs).unwrap();
        assert!(derived.base_name.is_none());
        assert_eq!(derived.own_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_map_fields_into_attributes_renames() {
        let person = Person {
            name: Some("Alice".to_string()),
            email: Some("a@x.com".to_string()),
            groups: Vec::new(),
        };
        let mapping = AttributeMap::new()
            .map("cn", "displayName")
            .map("mail", "externalMail");

        let model = EntryModel::<Person>::build().unwrap();
        let attrs = model
            .map_fields_into_attributes(&person, AccessMode::Read, &mapping)
            .unwrap();
        assert_eq!(attrs.first_text("displayName"), Some("Alice"));
        assert_eq!(attrs.first_text("externalMail"), Some("a@x.com"));
        assert!(!attrs.contains("cn"));
    }

    #[test]
    fn test_fill_fields_from_attributes() {
        let mapping = AttributeMap::new()
            .map("cn", "displayName")
            .map("mail", "externalMail");
        let changes = Attributes::new()
            .with("displayName", AttributeValues::single("Alice Renamed"))
            .with("externalMail", AttributeValues::single("new@x.com"));

        let model = EntryModel::<Person>::build().unwrap();
        let mut person = Person::default();
        model
            .fill_fields_from_attributes(&mut person, &changes, &mapping)
            .unwrap();
        assert_eq!(person.name.as_deref(), Some("Alice Renamed"));
        // mail is Read-only: external changes must not flow into it
        assert!(person.email.is_none());
    }

    #[test]
    fn test_attribute_map_last_mapping_wins() {
        let mapping = AttributeMap::new().map("cn", "first").map("CN", "second");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.target("cn"), Some("second"));
    }
}
