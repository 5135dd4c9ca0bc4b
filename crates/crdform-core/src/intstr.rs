//! Integer-or-string scalar
//!
//! Kubernetes uses `IntOrString` for fields such as ports and percentages. The
//! representation chosen by the caller is preserved: a string that looks like a
//! number stays a string, and an integer never becomes a string.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A value that is exactly one of an integer or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntOrString {
    Int(i64),
    String(String),
}

impl IntOrString {
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::String(s) => Some(s),
        }
    }

    /// Encode as a manifest token.
    ///
    /// Integers are bare numbers. Strings are always double-quoted so that
    /// `"80"` can never be read back as the integer `80`.
    pub fn to_token(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::String(s) => quote(s),
        }
    }
}

/// Double-quote a string with YAML escapes
///
/// Every character outside the YAML printable set is escaped, along with
/// U+2028/U+2029 and the byte order mark, so the token always parses.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => match u32::from(c) {
                n @ 0..=0xff => out.push_str(&format!("\\x{:02X}", n)),
                n @ 0x100..=0xffff => out.push_str(&format!("\\u{:04X}", n)),
                n => out.push_str(&format!("\\U{:08X}", n)),
            },
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Characters a YAML scalar cannot carry literally
pub(crate) fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}'
            | '\u{b}'..='\u{c}'
            | '\u{e}'..='\u{1f}'
            | '\u{7f}'..='\u{9f}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{feff}'
            | '\u{fffe}'
            | '\u{ffff}'
    )
}

impl From<i64> for IntOrString {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for IntOrString {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<String> for IntOrString {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for IntOrString {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for IntOrString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for IntOrString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct IntOrStringVisitor;

        impl Visitor<'_> for IntOrStringVisitor {
            type Value = IntOrString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(IntOrString::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                i64::try_from(v)
                    .map(IntOrString::Int)
                    .map_err(|_| E::custom(format!("integer {} out of range for i64", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(IntOrString::String(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
                Ok(IntOrString::String(v))
            }
        }

        deserializer.deserialize_any(IntOrStringVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_never_encodes_as_int() {
        let s = IntOrString::from("80");
        let i = IntOrString::from(80);
        assert_ne!(s.to_token(), i.to_token());
        assert_eq!(s.to_token(), "\"80\"");
        assert_eq!(i.to_token(), "80");
    }

    #[test]
    fn test_tokens() {
        assert_eq!(IntOrString::from(0).to_token(), "0");
        assert_eq!(IntOrString::from(-1).to_token(), "-1");
        assert_eq!(IntOrString::from("").to_token(), "\"\"");
        assert_eq!(IntOrString::from("https").to_token(), "\"https\"");
        assert_eq!(IntOrString::from("a\"b").to_token(), r#""a\"b""#);
    }

    #[test]
    fn test_control_characters_are_escaped() {
        assert_eq!(quote("a\u{7f}b"), r#""a\x7Fb""#);
        assert_eq!(quote("a\u{85}b"), r#""a\x85b""#);
        assert_eq!(quote("\u{2028}"), r#""\u2028""#);
        assert_eq!(quote("tab\there"), r#""tab\there""#);
        assert_eq!(quote("caf\u{e9}"), "\"caf\u{e9}\"");

        let cases = [
            "a\u{7f}b",
            "a\u{85}b",
            "\u{0}\u{1b}",
            "x\u{2028}y\u{2029}",
            "\u{feff}bom",
            "back\\slash",
        ];
        for s in cases {
            let parsed: String = serde_yaml::from_str(&quote(s)).unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn test_yaml_preserves_tag() {
        let cases = [
            IntOrString::from(0),
            IntOrString::from(-1),
            IntOrString::from(""),
            IntOrString::from("80"),
            IntOrString::from("abc"),
        ];
        for case in cases {
            let parsed: IntOrString = serde_yaml::from_str(&case.to_token()).unwrap();
            assert_eq!(parsed, case);
        }
    }

    #[test]
    fn test_json_serialize() {
        assert_eq!(serde_json::to_string(&IntOrString::from(443)).unwrap(), "443");
        assert_eq!(serde_json::to_string(&IntOrString::from("443")).unwrap(), "\"443\"");
    }

    #[test]
    fn test_deserialize_rejects_other_types() {
        assert!(serde_json::from_str::<IntOrString>("true").is_err());
        assert!(serde_json::from_str::<IntOrString>("1.5").is_err());
    }
}
