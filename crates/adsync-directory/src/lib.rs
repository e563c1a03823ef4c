//! # adsync-directory
//!
//! Metadata-driven mapping between LDAP directory entries and typed Rust
//! structs.
//!
//! Directory entries are loosely typed, multi-valued attribute sets. This
//! crate binds them to strongly typed domain structs through explicit
//! field descriptors: each mapped field declares its attribute name, an
//! access policy, and a conversion strategy, and the entry model drives
//! both directions — parsing search results into structs and building
//! selective attribute sets for modification.
//!
//! ## Crate organization
//!
//! - [`attribute`] - the attribute wire model (named, ordered value lists)
//! - [`dn`] - distinguished name parsing and identity
//! - [`convert`] - value conversion between attribute text and field types
//! - [`descriptor`] - field descriptors, access policy, custom codecs
//! - [`model`] - the per-type descriptor table and the entry mapper
//! - [`config`] - connection configuration
//! - [`tree`] - the network façade (connect, search, modify)
//! - [`error`] - error types
//!
//! ## Example
//!
//! ```ignore
//! use adsync_directory::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     name: Option<String>,
//!     mail: Option<String>,
//! }
//!
//! impl DirectoryEntry for Person {
//!     fn attribute_fields() -> Vec<FieldDescriptor<Self>> {
//!         vec![
//!             FieldDescriptor::scalar("cn", AccessMode::ReadWrite,
//!                 |p: &Person| &p.name, |p: &mut Person| &mut p.name),
//!             FieldDescriptor::scalar("mail", AccessMode::Read,
//!                 |p: &Person| &p.mail, |p: &mut Person| &mut p.mail),
//!         ]
//!     }
//!
//!     fn query_format() -> &'static str {
//!         "(&(objectCategory=Person){})"
//!     }
//! }
//!
//! let tree = LdapTree::new(
//!     LdapConfig::new("dc1.example.com", "dc=example,dc=com", "cn=sync").with_tls(),
//! )?;
//! tree.connect().await?;
//! let people: Vec<Person> = tree.search_entries("(mail=*)").await?;
//! ```

pub mod attribute;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod dn;
pub mod error;
pub mod model;
pub mod tree;

/// Prelude module for convenient imports.
///
/// ```
/// use adsync_directory::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attribute::{AttributeValues, Attributes};
    pub use crate::config::{LdapConfig, Protocol};
    pub use crate::convert::{AttributeType, ConvertError};
    pub use crate::descriptor::{AccessMode, AttributeCodec, FieldDescriptor};
    pub use crate::dn::{Dn, Rdn};
    pub use crate::error::{DirectoryError, DirectoryResult};
    pub use crate::model::{
        entry_attributes, parse_entry, AttributeMap, DirectoryEntry, EntryModel,
    };
    pub use crate::tree::{compose_filter, escape_filter_value, LdapTree};
}
