//! Type conversion engine
//!
//! Stateless conversions between directory attribute text values and the
//! typed field representations. Conversion is fail-fast: a malformed value
//! raises an error instead of silently leaving the field at its default,
//! since a sync system must not propagate half-parsed entries.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::dn::Dn;

/// Timestamp layout used by the directory (GMT generalized time).
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_DIGITS: usize = 14;

/// Error raised when a single attribute value cannot be converted.
///
/// Carries the cause only; the descriptor layer attaches the attribute
/// name before propagating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ConvertError {
    message: String,
}

impl ConvertError {
    /// Create a new conversion error with the given cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A field type convertible to and from a directory attribute value.
///
/// Implemented for the closed set of built-in kinds; anything beyond it
/// goes through a custom codec registered on the field descriptor.
pub trait AttributeType: Sized {
    /// Parse a typed value from one attribute value.
    fn parse_attribute(value: &str) -> Result<Self, ConvertError>;

    /// Format the typed value as one attribute value.
    fn format_attribute(&self) -> String;
}

impl AttributeType for String {
    fn parse_attribute(value: &str) -> Result<Self, ConvertError> {
        Ok(value.to_string())
    }

    fn format_attribute(&self) -> String {
        self.clone()
    }
}

impl AttributeType for bool {
    fn parse_attribute(value: &str) -> Result<Self, ConvertError> {
        if value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConvertError::new(format!("'{value}' is not a boolean")))
        }
    }

    fn format_attribute(&self) -> String {
        // Directory servers expect the uppercase boolean literals
        if *self { "TRUE" } else { "FALSE" }.to_string()
    }
}

impl AttributeType for char {
    fn parse_attribute(value: &str) -> Result<Self, ConvertError> {
        value
            .chars()
            .next()
            .ok_or_else(|| ConvertError::new("empty value is not a character"))
    }

    fn format_attribute(&self) -> String {
        self.to_string()
    }
}

macro_rules! numeric_attribute_type {
    ($($ty:ty => $label:literal),* $(,)?) => {
        $(
            impl AttributeType for $ty {
                fn parse_attribute(value: &str) -> Result<Self, ConvertError> {
                    value.parse().map_err(|_| {
                        ConvertError::new(format!(concat!("'{}' is not ", $label), value))
                    })
                }

                fn format_attribute(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

numeric_attribute_type! {
    u8 => "an 8-bit integer",
    i16 => "a 16-bit integer",
    i32 => "a 32-bit integer",
    i64 => "a 64-bit integer",
    f32 => "a 32-bit float",
    f64 => "a 64-bit float",
}

impl AttributeType for DateTime<Utc> {
    /// Parse a GMT generalized-time value.
    ///
    /// Only the leading `YYYYMMDDHHMMSS` digits are significant; a trailing
    /// fraction or zone suffix (`.0Z`, `Z`) is accepted and ignored, which
    /// is how Active Directory formats `whenChanged`.
    fn parse_attribute(value: &str) -> Result<Self, ConvertError> {
        let digits = value
            .get(..TIMESTAMP_DIGITS)
            .ok_or_else(|| ConvertError::new(format!("'{value}' is not a timestamp")))?;
        let naive = NaiveDateTime::parse_from_str(digits, TIMESTAMP_FORMAT)
            .map_err(|_| ConvertError::new(format!("'{value}' is not a timestamp")))?;
        Ok(Utc.from_utc_datetime(&naive))
    }

    fn format_attribute(&self) -> String {
        format!("{}Z", self.format(TIMESTAMP_FORMAT))
    }
}

impl AttributeType for Dn {
    fn parse_attribute(value: &str) -> Result<Self, ConvertError> {
        Dn::parse(value)
            .map_err(|_| ConvertError::new(format!("'{value}' is not a distinguished name")))
    }

    fn format_attribute(&self) -> String {
        self.to_string()
    }
}

/// Decode a scalar field from an attribute value list.
///
/// Only the first value is used; an empty list yields `None`.
pub fn decode_scalar<V: AttributeType>(values: &[String]) -> Result<Option<V>, ConvertError> {
    values.first().map(|v| V::parse_attribute(v)).transpose()
}

/// Decode a collection field from an attribute value list, preserving
/// order. Fails fast on the first malformed value.
pub fn decode_list<V: AttributeType>(values: &[String]) -> Result<Vec<V>, ConvertError> {
    values.iter().map(|v| V::parse_attribute(v)).collect()
}

/// Encode a scalar field into an attribute value list; `None` encodes to
/// no values.
pub fn encode_scalar<V: AttributeType>(value: Option<&V>) -> Vec<String> {
    value.map(V::format_attribute).into_iter().collect()
}

/// Encode a collection field into an attribute value list, preserving
/// order.
pub fn encode_list<V: AttributeType>(values: &[V]) -> Vec<String> {
    values.iter().map(V::format_attribute).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bool_round_trip() {
        assert!(bool::parse_attribute("TRUE").unwrap());
        assert!(bool::parse_attribute("true").unwrap());
        assert!(!bool::parse_attribute("FALSE").unwrap());
        assert_eq!(true.format_attribute(), "TRUE");
        assert_eq!(false.format_attribute(), "FALSE");
        assert!(bool::parse_attribute("yes").is_err());
    }

    #[test]
    fn test_numeric_round_trip() {
        assert_eq!(i32::parse_attribute("-42").unwrap(), -42);
        assert_eq!(i64::parse_attribute("513").unwrap(), 513);
        assert_eq!(u8::parse_attribute("200").unwrap(), 200);
        assert_eq!(i16::parse_attribute("-1").unwrap(), -1);
        assert_eq!(f64::parse_attribute("1.5").unwrap(), 1.5);
        assert_eq!(513i64.format_attribute(), "513");
        assert_eq!(
            f32::parse_attribute(&1.25f32.format_attribute()).unwrap(),
            1.25
        );
    }

    #[test]
    fn test_numeric_garbage_fails() {
        assert!(i32::parse_attribute("abc").is_err());
        assert!(i64::parse_attribute("").is_err());
        assert!(f64::parse_attribute("1,5").is_err());
    }

    #[test]
    fn test_char() {
        assert_eq!(char::parse_attribute("M").unwrap(), 'M');
        assert_eq!('M'.format_attribute(), "M");
        assert!(char::parse_attribute("").is_err());
    }

    #[test]
    fn test_timestamp_round_trip() {
        let parsed = <DateTime<Utc>>::parse_attribute("20240312090730Z").unwrap();
        assert_eq!(parsed.format_attribute(), "20240312090730Z");
    }

    #[test]
    fn test_timestamp_accepts_ad_fraction_suffix() {
        // whenChanged comes back as e.g. 20240312090730.0Z
        let parsed = <DateTime<Utc>>::parse_attribute("20240312090730.0Z").unwrap();
        assert_eq!(parsed.format_attribute(), "20240312090730Z");
    }

    #[test]
    fn test_timestamp_garbage_fails() {
        assert!(<DateTime<Utc>>::parse_attribute("not-a-date").is_err());
        assert!(<DateTime<Utc>>::parse_attribute("2024").is_err());
        // 13th hour of month 99 does not exist
        assert!(<DateTime<Utc>>::parse_attribute("20249912000000Z").is_err());
    }

    #[test]
    fn test_dn_round_trip() {
        let dn = Dn::parse_attribute("CN=Alice,DC=example,DC=com").unwrap();
        assert_eq!(dn.format_attribute(), "CN=Alice,DC=example,DC=com");
        assert!(Dn::parse_attribute("garbage").is_err());
    }

    #[test]
    fn test_decode_scalar_uses_first_value() {
        let value: Option<String> =
            decode_scalar(&strings(&["first", "second"])).unwrap();
        assert_eq!(value.as_deref(), Some("first"));

        let none: Option<String> = decode_scalar(&[]).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_decode_list_preserves_order() {
        let values: Vec<i32> = decode_list(&strings(&["3", "1", "2"])).unwrap();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_decode_list_fails_fast() {
        let result: Result<Vec<i32>, _> = decode_list(&strings(&["1", "x", "3"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_round_trip() {
        let values = strings(&["10", "20"]);
        let decoded: Vec<i64> = decode_list(&values).unwrap();
        assert_eq!(encode_list(&decoded), values);

        assert_eq!(encode_scalar(Some(&42i32)), vec!["42".to_string()]);
        assert!(encode_scalar::<i32>(None).is_empty());
    }
}
