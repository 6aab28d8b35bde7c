//! Edge labels and their path rendering.

use std::fmt;

use super::node::{Field, MapKey, Tag};

/// The label of an edge from one node to a child.
///
/// Integer indices address elements of arrays and sequences and fields of
/// records by position. Map keys address map entries and, when they hold a
/// `String`, record fields by name. [`Key::Elem`] is the edge from a pointer or
/// dynamic reference to its target.
///
/// When the crawler enters a record field it records the edge as
/// [`Key::Field`], whatever key was passed in.
#[derive(Debug, Clone)]
pub enum Key {
    Index(usize),
    Field(FieldKey),
    Map(MapKey),
    Elem,
}

impl Key {
    /// Returns the index if this is an index key.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// Returns the field key if this is a field edge.
    pub fn as_field(&self) -> Option<&FieldKey> {
        match self {
            Key::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Returns the map key if this is a map edge.
    pub fn as_map(&self) -> Option<&MapKey> {
        match self {
            Key::Map(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_elem(&self) -> bool {
        matches!(self, Key::Elem)
    }

    /// Appends the escaped path segment of this edge.
    ///
    /// With `full`, a promoted field renders as every field name along its
    /// embedding chain.
    pub fn append_segment(&self, buf: &mut String, full: bool) {
        match self {
            Key::Index(index) => buf.push_str(&index.to_string()),
            Key::Field(field) if full => {
                for (i, link) in field.chain().enumerate() {
                    if i > 0 {
                        buf.push('/');
                    }
                    append_escaped(buf, link.name());
                }
            }
            Key::Field(field) => append_escaped(buf, field.name()),
            Key::Map(key) => append_escaped(buf, key.text()),
            Key::Elem => {}
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Map(MapKey::new(name.to_owned()))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Map(MapKey::new(name))
    }
}

impl From<MapKey> for Key {
    fn from(key: MapKey) -> Self {
        Key::Map(key)
    }
}

impl From<FieldKey> for Key {
    fn from(field: FieldKey) -> Self {
        Key::Field(field)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segment = String::new();
        self.append_segment(&mut segment, false);
        f.write_str(&segment)
    }
}

/// A record field edge.
///
/// Fields promoted from embedded records keep the chain of embedded fields
/// they were reached through, so paths can be rendered in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    via: Vec<(usize, &'static Field)>,
    index: usize,
    field: &'static Field,
}

impl FieldKey {
    pub(crate) fn direct(index: usize, field: &'static Field) -> Self {
        FieldKey {
            via: Vec::new(),
            index,
            field,
        }
    }

    pub(crate) fn promoted(via: Vec<(usize, &'static Field)>, index: usize, field: &'static Field) -> Self {
        FieldKey { via, index, field }
    }

    /// The field the edge leads to.
    pub fn field(&self) -> &'static Field {
        self.field
    }

    /// Position of the field in its declaring record.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        self.field.name()
    }

    pub fn tag(&self) -> Tag {
        self.field.tag()
    }

    /// Whether the field was reached through embedded records.
    pub fn is_promoted(&self) -> bool {
        !self.via.is_empty()
    }

    /// The embedded fields passed through, then the field itself.
    pub fn chain(&self) -> impl Iterator<Item = &'static Field> + '_ {
        self.via
            .iter()
            .map(|(_, field)| *field)
            .chain(std::iter::once(self.field))
    }

    /// Field positions along [`chain`](Self::chain).
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.via
            .iter()
            .map(|(index, _)| *index)
            .chain(std::iter::once(self.index))
    }

    /// Whether any field along the chain is not exported.
    pub fn is_exported(&self) -> bool {
        self.chain().all(Field::is_exported)
    }

    pub(crate) fn links(&self) -> impl Iterator<Item = (usize, &'static Field)> + '_ {
        self.via
            .iter()
            .copied()
            .chain(std::iter::once((self.index, self.field)))
    }
}

/// Appends `text` to `buf`, escaping `\` as `\\` and `/` as `\/`.
pub fn append_escaped(buf: &mut String, text: &str) {
    for c in text.chars() {
        if c == '\\' || c == '/' {
            buf.push('\\');
        }
        buf.push(c);
    }
}

/// Returns `text` with `\` and `/` escaped.
pub fn escape(text: &str) -> String {
    let mut buf = String::with_capacity(text.len());
    append_escaped(&mut buf, text);
    buf
}
