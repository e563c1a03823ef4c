//! Distinguished name model
//!
//! A DN is the hierarchical identity of a directory entry: an ordered list
//! of relative distinguished names, most specific first. The text form is
//! comma-separated `name=value` tokens; equality is case-insensitive over
//! the canonical text.

use std::fmt;
use std::str::FromStr;

use crate::error::{DirectoryError, DirectoryResult};

/// One level of a distinguished name: an attribute name/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    attribute: String,
    value: String,
}

impl Rdn {
    /// Create a new RDN from an attribute name and value.
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Get the attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Get the attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// A distinguished name: ordered RDNs, leaf (most specific) first.
#[derive(Debug, Clone, Default)]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    /// Create an empty DN for incremental, bottom-up composition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a DN from its text form.
    ///
    /// Splits on `,`, then splits each token at the first `=`. A token
    /// without `=` fails the whole parse; no partial DN is produced. An
    /// empty input is invalid (a DN must have at least one RDN).
    pub fn parse(text: &str) -> DirectoryResult<Self> {
        let invalid = || DirectoryError::InvalidDn {
            text: text.to_string(),
        };

        if text.is_empty() {
            return Err(invalid());
        }

        let mut rdns = Vec::new();
        for token in text.split(',') {
            let (attribute, value) = token.split_once('=').ok_or_else(invalid)?;
            rdns.push(Rdn::new(attribute, value));
        }
        Ok(Self { rdns })
    }

    /// Get the leaf RDN, the most specific level.
    pub fn leaf(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// Get the RDN at the given level, where level 0 is the leaf.
    pub fn level(&self, level: usize) -> Option<&Rdn> {
        self.rdns.get(level)
    }

    /// Insert an RDN at the given level, shifting the levels above it up.
    pub fn insert_at_level(&mut self, rdn: Rdn, level: usize) {
        self.rdns.insert(level, rdn);
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    /// Check whether the DN has no levels yet.
    ///
    /// Only a DN under incremental composition can be empty; `parse` never
    /// returns one.
    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Iterate over the RDNs, leaf first.
    pub fn rdns(&self) -> impl Iterator<Item = &Rdn> {
        self.rdns.iter()
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq_ignore_ascii_case(&other.to_string())
    }
}

impl Eq for Dn {}

impl FromStr for Dn {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
