//! Attribute wire model
//!
//! Directory attributes are named, ordered lists of values. Values are
//! exchanged as text except on the raw path, where binary payloads (GUIDs,
//! passwords) are carried through without conversion.

/// The ordered values of one directory attribute.
///
/// Directory attributes are inherently multi-valued; single-valued fields
/// use the first element only. An attribute with zero values is treated as
/// absent and is never stored in an [`Attributes`] set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValues {
    /// Text values, in server order.
    Text(Vec<String>),
    /// Binary values carried through unconverted (raw path).
    Binary(Vec<Vec<u8>>),
}

impl AttributeValues {
    /// Create a single text value.
    pub fn single(value: impl Into<String>) -> Self {
        AttributeValues::Text(vec![value.into()])
    }

    /// Create text values from an ordered list.
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeValues::Text(values.into_iter().map(Into::into).collect())
    }

    /// Create a single binary value.
    pub fn binary(value: Vec<u8>) -> Self {
        AttributeValues::Binary(vec![value])
    }

    /// Get the first value as text, if this is a text attribute.
    pub fn first(&self) -> Option<&str> {
        match self {
            AttributeValues::Text(values) => values.first().map(String::as_str),
            AttributeValues::Binary(_) => None,
        }
    }

    /// Get the text values, if this is a text attribute.
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            AttributeValues::Text(values) => Some(values),
            AttributeValues::Binary(_) => None,
        }
    }

    /// Get the binary values, if this is a binary attribute.
    pub fn as_binary(&self) -> Option<&[Vec<u8>]> {
        match self {
            AttributeValues::Binary(values) => Some(values),
            AttributeValues::Text(_) => None,
        }
    }

    /// Get the number of values.
    pub fn len(&self) -> usize {
        match self {
            AttributeValues::Text(values) => values.len(),
            AttributeValues::Binary(values) => values.len(),
        }
    }

    /// Check whether the value list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered set of named attributes, the representation exchanged with
/// the directory server.
///
/// Insertion order is preserved so multi-attribute writes reach the server
/// in a deterministic order. Names compare ASCII case-insensitively,
/// matching directory attribute semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValues)>,
}

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing an existing one with the same name.
    ///
    /// Empty value lists are dropped: an attribute without values is absent.
    pub fn insert(&mut self, name: impl Into<String>, values: AttributeValues) {
        if values.is_empty() {
            return;
        }
        let name = name.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            entry.1 = values;
        } else {
            self.entries.push((name, values));
        }
    }

    /// Insert an attribute using the builder pattern.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, values: AttributeValues) -> Self {
        self.insert(name, values);
        self
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValues> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, values)| values)
    }

    /// Get the first text value of an attribute.
    pub fn first_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValues::first)
    }

    /// Check whether an attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over all attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over all attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValues)> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values))
    }

    /// Get the number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
