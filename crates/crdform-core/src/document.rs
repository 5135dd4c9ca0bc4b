//! Presence-tracked document tree
//!
//! A [`DocumentTree`] mirrors one resource schema: every declared field exists
//! in the tree from the start and carries its own [`Presence`]. The tree is
//! built per invocation and handed to the assembler; nothing else keeps it.

use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::intstr::IntOrString;
use crate::path::{FieldPath, Segment};
use crate::presence::Presence;
use crate::schema::{FieldSchema, Shape, empty_entries, find_field};

/// A presence-tracked node
pub type Field = Presence<Node>;

/// Scalar leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    IntOrString(IntOrString),
}

impl Scalar {
    fn matches(&self, shape: &Shape) -> bool {
        matches!(
            (self, shape),
            (Self::String(_), Shape::String)
                | (Self::Bool(_), Shape::Bool)
                | (Self::Int(_), Shape::Int)
                | (Self::Float(_), Shape::Float)
                | (Self::IntOrString(_), Shape::IntOrString)
        )
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::IntOrString(_) => "int-or-string",
        }
    }
}

/// One field of an object node
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    /// Attribute name
    pub name: String,
    /// Manifest key
    pub key: String,
    pub value: Field,
}

/// Document node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    /// Ordered sequence
    List(Vec<Field>),
    /// String-keyed mapping; iteration is in sorted key order
    Map(BTreeMap<String, Field>),
    /// Fixed field set in schema-declaration order
    Object(Vec<ObjectEntry>),
}

impl Node {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::Scalar(Scalar::Float(value))
    }

    pub fn int_or_string(value: impl Into<IntOrString>) -> Self {
        Self::Scalar(Scalar::IntOrString(value.into()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.type_name(),
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// A container with no present child
    pub fn is_empty_container(&self) -> bool {
        match self {
            Self::Scalar(_) => false,
            Self::List(items) => items.iter().all(Presence::is_absent),
            Self::Map(entries) => entries.values().all(Presence::is_absent),
            Self::Object(entries) => entries.iter().all(|e| e.value.is_absent()),
        }
    }

    /// Child at one path segment
    pub fn child(&self, segment: &Segment) -> Option<&Field> {
        match (self, segment) {
            (Self::Object(entries), Segment::Field(name)) => {
                entries.iter().find(|e| &e.name == name).map(|e| &e.value)
            }
            (Self::Map(entries), Segment::Key(key)) => entries.get(key),
            (Self::List(items), Segment::Index(index)) => items.get(*index),
            _ => None,
        }
    }
}

/// Check `node` against its declared shape, recursively
pub fn check_shape(node: &Node, shape: &Shape, path: &FieldPath) -> Result<()> {
    match (node, shape) {
        (Node::Scalar(s), _) if s.matches(shape) => Ok(()),
        (Node::List(items), Shape::List { items: item_shape }) => {
            for (i, item) in items.iter().enumerate() {
                if let Presence::Set(n) = item {
                    check_shape(n, item_shape, &path.index(i))?;
                }
            }
            Ok(())
        }
        (Node::Map(entries), Shape::Map { values }) => {
            for (key, value) in entries {
                if let Presence::Set(n) = value {
                    check_shape(n, values, &path.key(key))?;
                }
            }
            Ok(())
        }
        (Node::Object(entries), Shape::Object { fields }) => check_entries(entries, fields, path),
        _ => Err(CoreError::violation(
            path,
            format!("expected {}, got {}", shape.describe(), node.type_name()),
        )),
    }
}

fn check_entries(entries: &[ObjectEntry], fields: &[FieldSchema], path: &FieldPath) -> Result<()> {
    if entries.len() != fields.len() || entries.iter().zip(fields).any(|(e, f)| e.name != f.name) {
        return Err(CoreError::violation(
            path,
            "object entries do not match the declared fields",
        ));
    }
    for (entry, field) in entries.iter().zip(fields) {
        let child = path.field(&field.name);
        match &entry.value {
            Presence::Set(n) => check_shape(n, &field.shape, &child)?,
            Presence::Null if !field.nullable => {
                return Err(CoreError::violation(child, "field is not nullable"));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Declaration addressed by a path
#[derive(Clone, Copy)]
struct Target<'s> {
    shape: &'s Shape,
    /// Declaration, when the target is an object field
    schema: Option<&'s FieldSchema>,
}

/// Slot addressed by a path, with its declaration
struct Slot<'n, 's> {
    field: &'n mut Field,
    shape: &'s Shape,
    /// Declaration, when the slot is an object field
    schema: Option<&'s FieldSchema>,
}

/// Presence-tracked document for one resource
#[derive(Debug, Clone)]
pub struct DocumentTree<'s> {
    fields: &'s [FieldSchema],
    entries: Vec<ObjectEntry>,
}

impl<'s> DocumentTree<'s> {
    /// Empty tree: every declared field absent
    pub fn new(fields: &'s [FieldSchema]) -> Self {
        Self {
            fields,
            entries: empty_entries(fields),
        }
    }

    /// Build from already populated root entries, checking them against the schema
    pub fn from_entries(fields: &'s [FieldSchema], entries: Vec<ObjectEntry>) -> Result<Self> {
        check_entries(&entries, fields, &FieldPath::root())?;
        Ok(Self { fields, entries })
    }

    pub fn fields(&self) -> &'s [FieldSchema] {
        self.fields
    }

    /// Root entries in declaration order
    pub fn entries(&self) -> &[ObjectEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ObjectEntry> {
        self.entries
    }

    /// Presence at `path`; descendants of an absent or null node are absent
    pub fn get(&self, path: &FieldPath) -> Presence<&Node> {
        let Some((first, rest)) = path.segments().split_first() else {
            return Presence::Absent;
        };
        let Segment::Field(name) = first else {
            return Presence::Absent;
        };
        let Some(mut current) = self.entries.iter().find(|e| &e.name == name).map(|e| &e.value)
        else {
            return Presence::Absent;
        };
        for segment in rest {
            match current.as_set().and_then(|node| node.child(segment)) {
                Some(child) => current = child,
                None => return Presence::Absent,
            }
        }
        current.as_ref()
    }

    /// Mark the node at `path` as set, promoting absent ancestors
    ///
    /// A failed call leaves the tree untouched.
    pub fn set(&mut self, path: &FieldPath, node: Node) -> Result<()> {
        let target = self.resolve(path)?;
        check_shape(&node, target.shape, path)?;
        let slot = self.slot(path, true)?.ok_or_else(|| unreachable_slot(path))?;
        *slot.field = Presence::Set(node);
        Ok(())
    }

    /// Mark the field at `path` as explicitly null
    ///
    /// Only object fields declared nullable can be cleared.
    pub fn clear(&mut self, path: &FieldPath) -> Result<()> {
        match self.resolve(path)?.schema {
            Some(schema) if schema.nullable => {}
            Some(_) => return Err(CoreError::violation(path, "field is not nullable")),
            None => return Err(CoreError::violation(path, "only object fields can be cleared")),
        }
        let slot = self.slot(path, true)?.ok_or_else(|| unreachable_slot(path))?;
        *slot.field = Presence::Null;
        Ok(())
    }

    /// Return the node at `path` to absent
    pub fn omit(&mut self, path: &FieldPath) -> Result<()> {
        if let Some(slot) = self.slot(path, false)? {
            *slot.field = Presence::Absent;
        }
        Ok(())
    }

    /// Walk the schema alongside the current tree without changing it
    fn resolve(&self, path: &FieldPath) -> Result<Target<'s>> {
        if path.is_root() {
            return Err(CoreError::violation(path, "the document root cannot be addressed"));
        }
        let mut target: Option<Target<'s>> = None;
        let mut existing: Option<&Node> = None;
        for segment in path.segments() {
            let (next, child) = match target {
                None => {
                    let (index, schema) = field_at(self.fields, segment, path)?;
                    let child = self.entries.get(index).and_then(|e| e.value.as_set());
                    (Target::field(schema), child)
                }
                Some(parent) => {
                    if parent.shape.empty_node().is_none() {
                        return Err(CoreError::violation(
                            path,
                            format!("cannot address into a {}", parent.shape.describe()),
                        ));
                    }
                    let child = existing
                        .and_then(|node| node.child(segment))
                        .and_then(Presence::as_set);
                    match (parent.shape, segment) {
                        (Shape::Object { fields }, Segment::Field(_)) => {
                            let (_, schema) = field_at(fields, segment, path)?;
                            (Target::field(schema), child)
                        }
                        (Shape::Map { values }, Segment::Key(_)) => {
                            (Target::element(values), child)
                        }
                        (Shape::List { items }, Segment::Index(index)) => {
                            let len = match existing {
                                Some(Node::List(current)) => current.len(),
                                _ => 0,
                            };
                            if *index > len {
                                return Err(CoreError::violation(
                                    path,
                                    format!("index {} is past the end of the list", index),
                                ));
                            }
                            (Target::element(items), child)
                        }
                        (shape, _) => {
                            return Err(CoreError::violation(
                                path,
                                format!("segment does not address a {}", shape.describe()),
                            ));
                        }
                    }
                }
            };
            target = Some(next);
            existing = child;
        }
        target.ok_or_else(|| unreachable_slot(path))
    }

    fn slot(&mut self, path: &FieldPath, promote: bool) -> Result<Option<Slot<'_, 's>>> {
        if path.is_root() {
            return Err(CoreError::violation(path, "the document root cannot be addressed"));
        }
        let fields = self.fields;
        object_slot(&mut self.entries, fields, path.segments(), path, promote)
    }
}

impl<'s> Target<'s> {
    fn field(schema: &'s FieldSchema) -> Self {
        Self {
            shape: &schema.shape,
            schema: Some(schema),
        }
    }

    fn element(shape: &'s Shape) -> Self {
        Self {
            shape,
            schema: None,
        }
    }
}

fn unreachable_slot(path: &FieldPath) -> CoreError {
    CoreError::violation(path, "path could not be resolved")
}

/// Declared field named by `segment`
fn field_at<'s>(
    fields: &'s [FieldSchema],
    segment: &Segment,
    path: &FieldPath,
) -> Result<(usize, &'s FieldSchema)> {
    let Segment::Field(name) = segment else {
        return Err(CoreError::violation(path, "expected a field name for an object"));
    };
    find_field(fields, name)
        .ok_or_else(|| CoreError::violation(path, format!("unknown field '{}'", name)))
}

fn object_slot<'n, 's>(
    entries: &'n mut [ObjectEntry],
    fields: &'s [FieldSchema],
    segments: &[Segment],
    path: &FieldPath,
    promote: bool,
) -> Result<Option<Slot<'n, 's>>> {
    let (segment, rest) = segments
        .split_first()
        .ok_or_else(|| unreachable_slot(path))?;
    let (index, schema) = field_at(fields, segment, path)?;
    let field = &mut entries[index].value;
    if rest.is_empty() {
        return Ok(Some(Slot {
            field,
            shape: &schema.shape,
            schema: Some(schema),
        }));
    }
    descend(field, &schema.shape, rest, path, promote)
}

fn descend<'n, 's>(
    field: &'n mut Field,
    shape: &'s Shape,
    segments: &[Segment],
    path: &FieldPath,
    promote: bool,
) -> Result<Option<Slot<'n, 's>>> {
    let Some(empty) = shape.empty_node() else {
        return Err(CoreError::violation(
            path,
            format!("cannot address into a {}", shape.describe()),
        ));
    };
    if !field.is_set() {
        if !promote {
            return Ok(None);
        }
        *field = Presence::Set(empty);
    }
    let Some(node) = field.as_set_mut() else {
        return Ok(None);
    };
    let (segment, rest) = segments
        .split_first()
        .ok_or_else(|| unreachable_slot(path))?;

    match (shape, node, segment) {
        (Shape::Object { fields }, Node::Object(entries), Segment::Field(_)) => {
            object_slot(entries, fields, segments, path, promote)
        }
        (Shape::Map { values }, Node::Map(entries), Segment::Key(key)) => {
            let child = if promote {
                entries.entry(key.clone()).or_default()
            } else {
                match entries.get_mut(key) {
                    Some(child) => child,
                    None => return Ok(None),
                }
            };
            element_slot(child, values, rest, path, promote)
        }
        (Shape::List { items: item_shape }, Node::List(items), Segment::Index(index)) => {
            if *index == items.len() && promote {
                items.push(Presence::Absent);
            }
            match items.get_mut(*index) {
                Some(child) => element_slot(child, item_shape, rest, path, promote),
                None if promote => Err(CoreError::violation(
                    path,
                    format!("index {} is past the end of the list", index),
                )),
                None => Ok(None),
            }
        }
        (shape, _, _) => Err(CoreError::violation(
            path,
            format!("segment does not address a {}", shape.describe()),
        )),
    }
}

fn element_slot<'n, 's>(
    child: &'n mut Field,
    shape: &'s Shape,
    rest: &[Segment],
    path: &FieldPath,
    promote: bool,
) -> Result<Option<Slot<'n, 's>>> {
    if rest.is_empty() {
        Ok(Some(Slot {
            field: child,
            shape,
            schema: None,
        }))
    } else {
        descend(child, shape, rest, path, promote)
    }
}
