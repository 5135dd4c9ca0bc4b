//! Deterministic manifest assembly
//!
//! Serializes a [`DocumentTree`] into block-style YAML. The output is a pure
//! function of the tree and the identity:
//!
//! - absent nodes emit nothing, null nodes emit `null`
//! - objects emit fields in schema-declaration order
//! - maps emit entries in sorted key order
//! - lists keep their order; empty collections emit `[]` / `{}`
//! - strings are plain only when a YAML parser reads the plain token back as
//!   the same string and no YAML 1.1 resolver would type it; int-or-string
//!   strings are always quoted
//! - keys too long for an implicit key use the explicit `? key` form

use regex::Regex;
use serde_yaml::Value as YamlValue;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use crate::document::{DocumentTree, Field, Node, ObjectEntry, Scalar};
use crate::error::{CoreError, Result};
use crate::intstr::{needs_escape, quote};
use crate::path::FieldPath;
use crate::presence::Presence;
use crate::schema::{API_VERSION_KEY, KIND_KEY, ResourceSchema};

const INDENT: usize = 2;

/// Longest key token YAML parsers accept as an implicit key
const IMPLICIT_KEY_LIMIT: usize = 1024;

/// Plain tokens YAML 1.1 parsers read as booleans
const YAML11_BOOLS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off",
    "OFF",
];

/// Plain tokens YAML 1.1 resolvers read as ints, floats, timestamps, merge
/// or value keys
static YAML11_TYPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"[-+]?0b[0-1_]+",
        r"|[-+]?0[0-7_]+",
        r"|[-+]?(?:0|[1-9][0-9_]*)",
        r"|[-+]?0x[0-9a-fA-F_]+",
        r"|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+",
        r"|[-+]?(?:[0-9][0-9_]*)?\.[0-9_]*(?:[eE][-+]?[0-9]+)?",
        r"|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*",
        r"|[-+]?[0-9][0-9_]*[eE][-+]?[0-9]+",
        r"|[-+]?\.(?:inf|Inf|INF)",
        r"|\.(?:nan|NaN|NAN)",
        r"|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}",
        r"(?:(?:[Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]*)?",
        r"(?:[ \t]*Z|[ \t]*[-+][0-9]{1,2}(?::[0-9]{2})?)?)?",
        r"|<<|=",
        r")$",
    ))
    .expect("valid regex")
});

/// Identity stamped onto every manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestIdentity {
    pub api_version: String,
    pub kind: String,
}

impl ManifestIdentity {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    pub fn of(schema: &ResourceSchema) -> Self {
        Self::new(schema.api_version(), schema.kind.clone())
    }
}

/// An assembled manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest(String);

impl Manifest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// SHA256 of the manifest bytes, hex encoded
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Parse the manifest back into a generic YAML value
    pub fn to_value(&self) -> Result<YamlValue> {
        Ok(serde_yaml::from_str(&self.0)?)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stamp `identity` onto `tree` and serialize it
pub fn assemble(tree: &DocumentTree<'_>, identity: &ManifestIdentity) -> Result<Manifest> {
    let root = inject_identity(tree.entries(), identity);
    let mut emitter = Emitter::default();
    emitter.object(&root, 0, false, &FieldPath::root())?;
    debug!(
        kind = %identity.kind,
        bytes = emitter.out.len(),
        "assembled manifest"
    );
    Ok(Manifest(emitter.out))
}

/// Root entries with the identity keys first, replacing any caller values
fn inject_identity(entries: &[ObjectEntry], identity: &ManifestIdentity) -> Vec<ObjectEntry> {
    let stamp = |key: &str, value: &str| ObjectEntry {
        name: key.to_string(),
        key: key.to_string(),
        value: Presence::Set(Node::string(value)),
    };
    let mut root = vec![
        stamp(API_VERSION_KEY, &identity.api_version),
        stamp(KIND_KEY, &identity.kind),
    ];
    root.extend(
        entries
            .iter()
            .filter(|e| e.key != API_VERSION_KEY && e.key != KIND_KEY)
            .cloned(),
    );
    root
}

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat_n(' ', indent));
    }

    fn object(
        &mut self,
        entries: &[ObjectEntry],
        indent: usize,
        inline_first: bool,
        path: &FieldPath,
    ) -> Result<()> {
        let present = entries
            .iter()
            .filter(|e| !e.value.is_absent())
            .map(|e| (e.key.as_str(), path.field(&e.name), &e.value));
        self.entries(present, indent, inline_first)
    }

    fn entries<'a, I>(&mut self, entries: I, indent: usize, inline_first: bool) -> Result<()>
    where
        I: Iterator<Item = (&'a str, FieldPath, &'a Field)>,
    {
        for (i, (key, path, value)) in entries.enumerate() {
            if i > 0 || !inline_first {
                self.pad(indent);
            }
            let token = encode_string(key);
            if token.len() < IMPLICIT_KEY_LIMIT {
                self.out.push_str(&token);
            } else {
                self.out.push_str("? ");
                self.out.push_str(&token);
                self.out.push('\n');
                self.pad(indent);
            }
            self.out.push(':');
            match value {
                Presence::Set(node) => self.after_key(node, indent, &path)?,
                Presence::Null => self.out.push_str(" null\n"),
                Presence::Absent => {}
            }
        }
        Ok(())
    }

    fn items(
        &mut self,
        items: &[Field],
        indent: usize,
        inline_first: bool,
        path: &FieldPath,
    ) -> Result<()> {
        let present = items.iter().enumerate().filter(|(_, f)| !f.is_absent());
        for (n, (i, item)) in present.enumerate() {
            if n > 0 || !inline_first {
                self.pad(indent);
            }
            self.out.push_str("- ");
            match item {
                Presence::Set(node) => self.in_sequence(node, indent + INDENT, &path.index(i))?,
                Presence::Null => self.out.push_str("null\n"),
                Presence::Absent => {}
            }
        }
        Ok(())
    }

    /// Value following `key:`
    fn after_key(&mut self, node: &Node, indent: usize, path: &FieldPath) -> Result<()> {
        if let Some(token) = self.inline_token(node, path)? {
            self.out.push(' ');
            self.out.push_str(&token);
            self.out.push('\n');
            return Ok(());
        }
        self.out.push('\n');
        self.block(node, indent + INDENT, false, path)
    }

    /// Value following `- `
    fn in_sequence(&mut self, node: &Node, indent: usize, path: &FieldPath) -> Result<()> {
        if let Some(token) = self.inline_token(node, path)? {
            self.out.push_str(&token);
            self.out.push('\n');
            return Ok(());
        }
        self.block(node, indent, true, path)
    }

    fn block(
        &mut self,
        node: &Node,
        indent: usize,
        inline_first: bool,
        path: &FieldPath,
    ) -> Result<()> {
        match node {
            Node::List(items) => self.items(items, indent, inline_first, path),
            Node::Map(entries) => {
                let present = entries
                    .iter()
                    .filter(|(_, v)| !v.is_absent())
                    .map(|(k, v)| (k.as_str(), path.key(k), v));
                self.entries(present, indent, inline_first)
            }
            Node::Object(entries) => self.object(entries, indent, inline_first, path),
            Node::Scalar(_) => Err(CoreError::assembly(path, "scalar emitted as a block")),
        }
    }

    /// Token for scalars and empty collections; `None` for block content
    fn inline_token(&self, node: &Node, path: &FieldPath) -> Result<Option<String>> {
        Ok(match node {
            Node::Scalar(scalar) => Some(encode_scalar(scalar, path)?),
            Node::List(_) if node.is_empty_container() => Some("[]".to_string()),
            Node::Map(_) | Node::Object(_) if node.is_empty_container() => Some("{}".to_string()),
            _ => None,
        })
    }
}

fn encode_scalar(scalar: &Scalar, path: &FieldPath) -> Result<String> {
    Ok(match scalar {
        Scalar::String(s) => encode_string(s),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => encode_float(*f, path)?,
        Scalar::IntOrString(v) => v.to_token(),
    })
}

fn encode_float(f: f64, path: &FieldPath) -> Result<String> {
    if !f.is_finite() {
        return Err(CoreError::assembly(
            path,
            format!("float {} has no manifest representation", f),
        ));
    }
    // Debug formatting keeps a fractional part (`1.0`), so the token reads back as a float
    Ok(format!("{:?}", f))
}

/// Plain when unambiguous, double-quoted otherwise
pub fn encode_string(s: &str) -> String {
    if is_plain_safe(s) {
        s.to_string()
    } else {
        quote(s)
    }
}

fn is_plain_safe(s: &str) -> bool {
    if s.is_empty() || s.trim() != s || s.contains(['\n', '\r', '\t']) {
        return false;
    }
    if s.chars().any(needs_escape) {
        return false;
    }
    if YAML11_BOOLS.contains(&s) || YAML11_TYPED.is_match(s) {
        return false;
    }
    matches!(
        serde_yaml::from_str::<YamlValue>(s),
        Ok(YamlValue::String(parsed)) if parsed == s
    )
}
