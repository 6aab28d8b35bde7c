//! The graph crawler: a cursor over a graph of [`Walk`] values.
//!
//! A [`Crawler`] holds the path of edges from its root to the current node.
//! Entering a child pushes an edge, leaving pops it. The crawler also tracks
//! two access flags per node:
//!
//! - **addressable**: the node is a stable place in memory. Values reached
//!   through dynamic references or map lookups are treated as copies and are
//!   not addressable until a pointer is dereferenced again.
//! - **read-only**: the node is a non-`pub` field or lies below one. Read-only
//!   nodes report no children and never hand out a reference.

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use super::identity::Identity;
use super::key::{FieldKey, Key};
use super::node::{Field, MapKey, Shape, Walk};
use super::route::Route;
use crate::error::IntoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Access {
    addressable: bool,
    readonly: bool,
}

impl Access {
    const ROOT: Access = Access {
        addressable: true,
        readonly: false,
    };

    fn field(self, exported: bool) -> Self {
        Access {
            addressable: self.addressable,
            readonly: self.readonly || !exported,
        }
    }

    fn element(self) -> Self {
        Access {
            addressable: true,
            readonly: self.readonly,
        }
    }

    fn target(self, addressable: bool) -> Self {
        Access {
            addressable,
            readonly: self.readonly,
        }
    }
}

/// An edge from `src` to the next node on the path.
struct Edge<'a> {
    src: &'a dyn Walk,
    access: Access,
    key: Key,
}

/// A stateful cursor over a graph of values.
///
/// If the graph changes while it is crawled (through a `OnceCell`), the
/// crawler stays valid only for nodes left and entered again.
pub struct Crawler<'a> {
    path: Vec<Edge<'a>>,
    node: &'a dyn Walk,
    access: Access,
    size: usize,
}

fn size_of(node: &dyn Walk, access: Access) -> usize {
    if access.readonly {
        0
    } else {
        node.size()
    }
}

impl<'a> Crawler<'a> {
    /// Creates a crawler positioned at `root`.
    pub fn new(root: &'a dyn Walk) -> Self {
        Self::at(root, Access::ROOT)
    }

    /// Creates a crawler positioned at the target of a pointer or dynamic
    /// reference.
    ///
    /// Returns `None` if `ptr` is neither or if its target is nil.
    pub fn from_pointer(ptr: &'a dyn Walk) -> Option<Self> {
        let shape = ptr.shape();
        if !shape.is_indirect() {
            return None;
        }
        let target = ptr.target()?;
        Some(Self::at(target, Access::ROOT.target(shape == Shape::Pointer)))
    }

    fn at(node: &'a dyn Walk, access: Access) -> Self {
        Crawler {
            path: Vec::new(),
            node,
            access,
            size: size_of(node, access),
        }
    }

    /// The number of enterable children of the current node.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The number of nodes entered and not yet left.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Whether the integers in `0..size()` are valid keys for [`enter`](Self::enter).
    pub fn ordered(&self) -> bool {
        self.node.shape().is_ordered()
    }

    pub fn shape(&self) -> Shape {
        self.node.shape()
    }

    /// The current node, regardless of access restrictions.
    pub fn node(&self) -> &'a dyn Walk {
        self.node
    }

    /// Descends into a child and reports whether it succeeded.
    ///
    /// On a pointer or dynamic reference, any key that does not resolve
    /// otherwise enters the target. A failed call changes nothing.
    pub fn enter(&mut self, key: impl Into<Key>) -> bool {
        match self.resolve(key.into()) {
            Some((key, node, access)) => {
                self.path.push(Edge {
                    src: self.node,
                    access: self.access,
                    key,
                });
                self.node = node;
                self.access = access;
                self.size = size_of(node, access);
                true
            }
            None => false,
        }
    }

    fn resolve(&self, key: Key) -> Option<(Key, &'a dyn Walk, Access)> {
        let node = self.node;
        let shape = node.shape();
        let access = self.access;

        let direct = match &key {
            Key::Index(index) => {
                // indices are only valid below size, even for maps
                if *index >= self.size {
                    return None;
                }
                match shape {
                    Shape::Record => {
                        let field = node.fields().get(*index)?;
                        let child = node.child(*index)?;
                        let exported = field.is_exported();
                        Some((Key::Field(FieldKey::direct(*index, field)), child, access.field(exported)))
                    }
                    Shape::Array => node.child(*index).map(|child| (key.clone(), child, access)),
                    Shape::Sequence => node
                        .child(*index)
                        .map(|child| (key.clone(), child, access.element())),
                    _ => None,
                }
            }
            Key::Map(map_key) if shape == Shape::Record => {
                let name = map_key.downcast_ref::<String>()?;
                let (field, child) = find_field(node, name)?;
                let exported = field.is_exported();
                Some((Key::Field(field), child, access.field(exported)))
            }
            Key::Field(field) if shape == Shape::Record => {
                let child = follow_field(node, field)?;
                Some((key.clone(), child, access.field(field.is_exported())))
            }
            _ => None,
        };
        if direct.is_some() {
            return direct;
        }

        match shape {
            Shape::Pointer | Shape::Dynamic => {
                let target = node.target()?;
                Some((Key::Elem, target, access.target(shape == Shape::Pointer)))
            }
            Shape::Map => {
                let map_key = match key {
                    Key::Index(index) => MapKey::new(index),
                    Key::Map(map_key) => map_key,
                    _ => return None,
                };
                let value = node.entry(map_key.as_any())?;
                Some((Key::Map(map_key), value, access.target(false)))
            }
            _ => None,
        }
    }

    /// Reverts the last successful [`enter`](Self::enter). Does nothing at the root.
    pub fn leave(&mut self) {
        if let Some(edge) = self.path.pop() {
            self.node = edge.src;
            self.access = edge.access;
            self.size = size_of(edge.src, edge.access);
        }
    }

    /// Leaves nodes until the crawler is at `depth`.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is greater than the current depth.
    pub fn return_to(&mut self, depth: usize) {
        let current = self.depth();
        assert!(depth <= current, "bad depth: {depth}");
        for _ in depth..current {
            self.leave();
        }
    }

    /// Dereferences pointers and dynamic references until the current node is
    /// neither, and reports whether a value was reached.
    ///
    /// Nothing is restored on failure; use [`return_to`](Self::return_to)
    /// with the prior depth to get back.
    pub fn follow(&mut self) -> bool {
        let mut passed: Vec<Identity> = Vec::new();
        while self.node.shape().is_indirect() {
            let identity = self.identity();
            if passed.contains(&identity) {
                trace!(%identity, "pointer cycle without a value");
                return false;
            }
            passed.push(identity);
            if !self.enter(Key::Elem) {
                return false;
            }
        }
        true
    }

    /// Follows a path of keys, dereferencing pointers and dynamic references
    /// before each key. Those dereferences must not be part of `keys`.
    ///
    /// On failure the crawler returns to the node it started at.
    pub fn enter_path<I>(&mut self, keys: I) -> Result<(), IntoError>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        let start = self.depth();
        for (index, key) in keys.into_iter().enumerate() {
            if !self.follow() || !self.enter(key) {
                let entered = self.depth() - start;
                self.return_to(start);
                return Err(IntoError { index, entered });
            }
        }
        Ok(())
    }

    /// A reference to the current node, if it is addressable and accessible.
    pub fn reference(&self) -> Option<&'a dyn Walk> {
        (self.access.addressable && !self.access.readonly).then_some(self.node)
    }

    pub fn is_addressable(&self) -> bool {
        self.access.addressable
    }

    /// Whether the current node lies outside any non-`pub` field.
    pub fn is_accessible(&self) -> bool {
        !self.access.readonly
    }

    pub fn identity(&self) -> Identity {
        Identity::of(self.node)
    }

    /// Retrieves a tag of the record field the current node was entered by.
    ///
    /// The empty key retrieves the full tag. Nodes not entered as a record
    /// field have no tags.
    pub fn tag(&self, key: &str) -> String {
        match self.path.last().map(|edge| &edge.key) {
            Some(Key::Field(field)) => field.tag().get(key),
            _ => String::new(),
        }
    }

    /// The key used to leave the node at `depth`.
    ///
    /// # Panics
    ///
    /// Panics if there is no edge at `depth`.
    pub fn key(&self, depth: usize) -> &Key {
        match self.path.get(depth) {
            Some(edge) => &edge.key,
            None => panic!("no key at depth {depth}, crawler is at depth {}", self.depth()),
        }
    }

    /// The type name of the node at `depth`.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is greater than the current depth.
    pub fn type_name(&self, depth: usize) -> &'static str {
        match depth.cmp(&self.path.len()) {
            Ordering::Less => self.path[depth].src.type_name(),
            Ordering::Equal => self.node.type_name(),
            Ordering::Greater => panic!("no node at depth {depth}, crawler is at depth {}", self.depth()),
        }
    }

    /// Appends the escaped path from the root to the current node.
    ///
    /// Segments are separated by `/`. Dereferences contribute empty segments.
    /// With `full`, fields promoted from embedded records are preceded by the
    /// names of the embedded fields.
    pub fn append_path(&self, buf: &mut String, full: bool) {
        for (i, edge) in self.path.iter().enumerate() {
            if i > 0 {
                buf.push('/');
            }
            edge.key.append_segment(buf, full);
        }
    }

    /// The full path from the root to the current node.
    pub fn path(&self) -> String {
        let mut buf = String::new();
        self.append_path(&mut buf, true);
        buf
    }

    /// An owned route from the root to the current node, for replaying the
    /// path once the graph is no longer borrowed.
    pub fn route(&self) -> Route {
        Route::from_keys(self.path.iter().map(|edge| &edge.key), self.path())
    }
}

impl fmt::Debug for Crawler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crawler")
            .field("path", &self.path())
            .field("type", &self.node.type_name())
            .field("size", &self.size)
            .field("addressable", &self.access.addressable)
            .field("readonly", &self.access.readonly)
            .finish()
    }
}

/// Records to search at one embedding level, with the embedded fields leading
/// to each.
type Level<'a> = Vec<(Vec<(usize, &'static Field)>, &'a dyn Walk)>;

/// Looks up a field by name, promoting fields of embedded records.
///
/// Embedding levels are searched breadth first. The first level with a match
/// decides: one match wins, several are ambiguous.
fn find_field<'a>(record: &'a dyn Walk, name: &str) -> Option<(FieldKey, &'a dyn Walk)> {
    let mut level: Level<'a> = vec![(Vec::new(), record)];
    while !level.is_empty() {
        let mut found = None;
        let mut matches = 0;
        let mut next: Level<'a> = Vec::new();
        for (via, node) in &level {
            let node: &'a dyn Walk = *node;
            for (index, field) in node.fields().iter().enumerate() {
                if field.name() == name {
                    matches += 1;
                    if let Some(child) = node.child(index) {
                        found = Some((FieldKey::promoted(via.clone(), index, field), child));
                    }
                } else if field.is_embedded() {
                    if let Some(child) = node.child(index).filter(|c| c.shape() == Shape::Record) {
                        let mut chain = via.clone();
                        chain.push((index, field));
                        next.push((chain, child));
                    }
                }
            }
        }
        match matches {
            0 => level = next,
            1 => return found,
            _ => return None,
        }
    }
    None
}

/// Walks the chain of a field key, checking it against each field table.
fn follow_field<'a>(record: &'a dyn Walk, key: &FieldKey) -> Option<&'a dyn Walk> {
    let mut node = record;
    for (index, field) in key.links() {
        if node.shape() != Shape::Record || node.fields().get(index) != Some(field) {
            return None;
        }
        node = node.child(index)?;
    }
    Some(node)
}
