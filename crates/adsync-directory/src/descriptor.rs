//! Field descriptors and access policy
//!
//! A field descriptor binds one field of a domain type to one directory
//! attribute: the attribute name, the access policy, the raw flag and the
//! conversion strategy. Descriptors are plain values registered by each
//! domain type at compile time; there is no runtime discovery.

use std::fmt;
use std::sync::Arc;

use crate::attribute::AttributeValues;
use crate::convert::{
    decode_list, decode_scalar, encode_list, encode_scalar, AttributeType, ConvertError,
};
use crate::error::{DirectoryError, DirectoryResult};

/// Access policy of a mapped attribute.
///
/// The policy gates both mapping directions: read-denied fields are never
/// populated from search results, write-denied fields never appear in
/// attribute sets built for modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// The attribute may only be read from the directory.
    Read,
    /// The attribute may only be written to the directory.
    Write,
    /// The attribute may be read and written.
    ReadWrite,
}

impl AccessMode {
    /// Check whether this policy satisfies the requested permission.
    ///
    /// `ReadWrite` satisfies every request; otherwise the policy must
    /// equal the request exactly.
    pub fn permits(self, requested: AccessMode) -> bool {
        self == AccessMode::ReadWrite || self == requested
    }
}

/// A pluggable conversion strategy for field types outside the built-in
/// set.
///
/// Codecs are passed as values when the descriptor is registered. Both
/// directions are fail-fast: a codec that cannot handle its values must
/// return an error rather than leave the field untouched.
pub trait AttributeCodec<T>: Send + Sync {
    /// Decode the attribute values into the entity's field.
    fn decode(&self, entity: &mut T, values: &AttributeValues) -> Result<(), ConvertError>;

    /// Encode the entity's field as attribute values.
    ///
    /// Returns `None` when the field is unset, which omits the attribute
    /// from the built set.
    fn encode(&self, entity: &T) -> Result<Option<AttributeValues>, ConvertError>;
}

type EncodeFn<T> = Box<dyn Fn(&T) -> Result<Option<AttributeValues>, ConvertError> + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&mut T, &AttributeValues) -> Result<(), ConvertError> + Send + Sync>;

/// Metadata binding one field of `T` to one directory attribute.
pub struct FieldDescriptor<T> {
    attribute: String,
    access: AccessMode,
    raw: bool,
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
}

impl<T> FieldDescriptor<T> {
    /// Describe a single-valued field backed by a built-in conversion.
    ///
    /// Decoding uses the first attribute value only; encoding a `None`
    /// field produces no attribute.
    pub fn scalar<V, G, S>(attribute: impl Into<String>, access: AccessMode, get: G, set: S) -> Self
    where
        V: AttributeType + 'static,
        G: Fn(&T) -> &Option<V> + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut Option<V> + Send + Sync + 'static,
    {
        Self {
            attribute: attribute.into(),
            access,
            raw: false,
            encode: Box::new(move |entity| {
                let values = encode_scalar(get(entity).as_ref());
                Ok((!values.is_empty()).then(|| AttributeValues::Text(values)))
            }),
            decode: Box::new(move |entity, values| {
                if let Some(value) = decode_scalar(expect_text(values)?)? {
                    *set(entity) = Some(value);
                }
                Ok(())
            }),
        }
    }

    /// Describe a multi-valued field backed by a built-in conversion.
    ///
    /// Value order is preserved in both directions. An empty collection is
    /// treated as unset and omitted on encode.
    pub fn multi<V, G, S>(attribute: impl Into<String>, access: AccessMode, get: G, set: S) -> Self
    where
        V: AttributeType + 'static,
        G: Fn(&T) -> &Vec<V> + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut Vec<V> + Send + Sync + 'static,
    {
        Self {
            attribute: attribute.into(),
            access,
            raw: false,
            encode: Box::new(move |entity| {
                let values = encode_list(get(entity));
                Ok((!values.is_empty()).then(|| AttributeValues::Text(values)))
            }),
            decode: Box::new(move |entity, values| {
                *set(entity) = decode_list(expect_text(values)?)?;
                Ok(())
            }),
        }
    }

    /// Describe a binary field that bypasses conversion entirely.
    ///
    /// Used for values that must be exchanged binary-safe (GUIDs,
    /// passwords). Text values arriving on this path are carried through
    /// as their UTF-8 bytes.
    pub fn raw<G, S>(attribute: impl Into<String>, access: AccessMode, get: G, set: S) -> Self
    where
        G: Fn(&T) -> &Option<Vec<u8>> + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut Option<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            attribute: attribute.into(),
            access,
            raw: true,
            encode: Box::new(move |entity| {
                Ok(get(entity)
                    .as_ref()
                    .map(|bytes| AttributeValues::binary(bytes.clone())))
            }),
            decode: Box::new(move |entity, values| {
                let bytes = match values {
                    AttributeValues::Binary(list) => list.first().cloned(),
                    AttributeValues::Text(list) => {
                        list.first().map(|s| s.as_bytes().to_vec())
                    }
                };
                if let Some(bytes) = bytes {
                    *set(entity) = Some(bytes);
                }
                Ok(())
            }),
        }
    }

    /// Describe a field converted by a caller-supplied codec.
    pub fn custom<C>(attribute: impl Into<String>, access: AccessMode, codec: C) -> Self
    where
        C: AttributeCodec<T> + 'static,
    {
        let codec = Arc::new(codec);
        let encoder = Arc::clone(&codec);
        Self {
            attribute: attribute.into(),
            access,
            raw: false,
            encode: Box::new(move |entity| encoder.encode(entity)),
            decode: Box::new(move |entity, values| codec.decode(entity, values)),
        }
    }

    /// Get the directory attribute name this field is bound to.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Get the access policy.
    pub fn access(&self) -> AccessMode {
        self.access
    }

    /// Check whether the policy satisfies the requested permission.
    pub fn permits(&self, requested: AccessMode) -> bool {
        self.access.permits(requested)
    }

    /// Check whether the field bypasses conversion.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Encode the entity's field, attaching the attribute name to any
    /// conversion failure. Returns `None` for unset fields.
    pub fn read_from(&self, entity: &T) -> DirectoryResult<Option<AttributeValues>> {
        (self.encode)(entity)
            .map_err(|err| DirectoryError::conversion(&self.attribute, err.to_string()))
    }

    /// Decode attribute values into the entity's field, attaching the
    /// attribute name to any conversion failure.
    pub fn write_to(&self, entity: &mut T, values: &AttributeValues) -> DirectoryResult<()> {
        (self.decode)(entity, values)
            .map_err(|err| DirectoryError::conversion(&self.attribute, err.to_string()))
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("attribute", &self.attribute)
            .field("access", &self.access)
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

fn expect_text(values: &AttributeValues) -> Result<&[String], ConvertError> {
    values
        .as_text()
        .ok_or_else(|| ConvertError::new("expected text values, got binary"))
}
