//! The node capability: everything the crawler needs to know about a value.
//!
//! Rust has no runtime reflection, so every type that takes part in a walk
//! describes itself through [`Walk`]. Records get their implementation from
//! `#[derive(Walk)]`, which emits a static [`Field`] table and positional child
//! access. Sequences, maps, pointers and scalars are implemented here for the
//! standard library types.
//!
//! The `*_mut` methods mirror the read-only ones for writing through a
//! [`Route`](super::Route). Shared pointers (`Rc`, `Arc`) only hand out their
//! target while they are the sole owner, and `&T` never does.
//!
//! ## Shapes
//!
//! | shape | types |
//! |---|---|
//! | [`Shape::Record`] | `#[derive(Walk)]` structs |
//! | [`Shape::Array`] | `[T; N]` |
//! | [`Shape::Sequence`] | `Vec<T>` |
//! | [`Shape::Map`] | `HashMap<K, V>`, `BTreeMap<K, V>` |
//! | [`Shape::Pointer`] | `Box<T>`, `Rc<T>`, `Arc<T>`, `&T`, `Option<T>`, `OnceCell<T>` |
//! | [`Shape::Dynamic`] | [`Dynamic`] |
//! | [`Shape::Scalar`] | primitives, `String`, `Duration`, `char`, `()` |

use std::any::Any;
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::value::Leaf;

// ============================================================================
// Shape
// ============================================================================

/// The structural kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A struct with named fields.
    Record,
    /// A fixed-size array.
    Array,
    /// A resizable sequence.
    Sequence,
    /// A key-value map.
    Map,
    /// A reference to exactly one other value, or nil.
    Pointer,
    /// A dynamically typed reference to one other value, or nil.
    Dynamic,
    /// A value without children.
    Scalar,
}

impl Shape {
    /// Whether integer indices in `0..size` address the children.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            Shape::Record | Shape::Array | Shape::Sequence | Shape::Pointer | Shape::Dynamic
        )
    }

    /// Whether the node refers to its only child through a dereference edge.
    pub fn is_indirect(self) -> bool {
        matches!(self, Shape::Pointer | Shape::Dynamic)
    }

    /// Whether the scanner turns the node into a module.
    pub fn is_composite(self) -> bool {
        matches!(self, Shape::Record | Shape::Array | Shape::Sequence)
    }

    /// Returns the string representation used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Record => "record",
            Shape::Array => "array",
            Shape::Sequence => "sequence",
            Shape::Map => "map",
            Shape::Pointer => "pointer",
            Shape::Dynamic => "dynamic",
            Shape::Scalar => "scalar",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field descriptors
// ============================================================================

/// A raw field tag in the conventional `key:"value" key2:"value2"` format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tag(&'static str);

impl Tag {
    /// Wraps a raw tag string.
    pub const fn new(raw: &'static str) -> Self {
        Tag(raw)
    }

    /// The full, unparsed tag.
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Looks up the value associated with `key`.
    ///
    /// Returns `None` if the key is absent or the tag is malformed before the
    /// key is reached.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut rest = self.0.as_bytes();
        loop {
            while let [b' ', tail @ ..] = rest {
                rest = tail;
            }
            if rest.is_empty() {
                return None;
            }

            let name_len = rest
                .iter()
                .position(|&b| b <= b' ' || b == b':' || b == b'"' || b == 0x7f)
                .unwrap_or(rest.len());
            if name_len == 0 || name_len + 1 >= rest.len() {
                return None;
            }
            if rest[name_len] != b':' || rest[name_len + 1] != b'"' {
                return None;
            }
            let name = &rest[..name_len];
            rest = &rest[name_len + 1..];

            // rest starts with the opening quote
            let mut end = 1;
            while end < rest.len() && rest[end] != b'"' {
                if rest[end] == b'\\' {
                    end += 1;
                }
                end += 1;
            }
            if end >= rest.len() {
                return None;
            }
            let quoted = &rest[1..end];
            rest = &rest[end + 1..];

            if name == key.as_bytes() {
                return Some(unquote(quoted));
            }
        }
    }

    /// Like [`lookup`](Self::lookup), but the full tag for an empty key and an
    /// empty string for missing keys.
    pub fn get(&self, key: &str) -> String {
        if key.is_empty() {
            return self.0.to_owned();
        }
        self.lookup(key).unwrap_or_default()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn unquote(quoted: &[u8]) -> String {
    let text = String::from_utf8_lossy(quoted);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Static description of one record field, emitted by `#[derive(Walk)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    name: &'static str,
    tag: Tag,
    exported: bool,
    embedded: bool,
}

impl Field {
    /// Describes a field.
    ///
    /// `exported` marks fields visible outside their module; `embedded` marks
    /// record fields whose own fields are promoted into the parent for lookup
    /// by name.
    pub const fn new(name: &'static str, tag: &'static str, exported: bool, embedded: bool) -> Self {
        Field {
            name,
            tag: Tag::new(tag),
            exported,
            embedded,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }
}

// ============================================================================
// Map keys
// ============================================================================

/// A type-erased map key together with its printable form.
#[derive(Clone)]
pub struct MapKey {
    value: Rc<dyn Any>,
    text: Rc<str>,
}

impl MapKey {
    /// Wraps a key value.
    pub fn new<K: fmt::Display + 'static>(key: K) -> Self {
        let text: Rc<str> = Rc::from(key.to_string());
        MapKey {
            value: Rc::new(key),
            text,
        }
    }

    /// The key as a dynamically typed value, for lookups in typed maps.
    pub fn as_any(&self) -> &dyn Any {
        &*self.value
    }

    /// The key as a `K`, if that is its type.
    pub fn downcast_ref<K: 'static>(&self) -> Option<&K> {
        self.as_any().downcast_ref::<K>()
    }

    /// The key as rendered in paths, before escaping.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MapKey").field(&&*self.text).finish()
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// The Walk capability
// ============================================================================

/// A value the crawler can inspect.
///
/// Only [`shape`](Walk::shape) is required; every other method has a default
/// matching a scalar without children. Implementations must be consistent:
/// `child(i)` and `fields()[i]` exist exactly for `i < size()` on records,
/// `child(i)` exists for `i < size()` on arrays and sequences, `target()` is
/// `Some` exactly when `size() == 1` on pointers and dynamic references, and
/// `entry(k)` finds every key returned by `keys()` on maps.
pub trait Walk {
    fn shape(&self) -> Shape;

    /// The concrete type of the node, used for identities and diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The number of children.
    fn size(&self) -> usize {
        0
    }

    /// Field table of a record.
    fn fields(&self) -> &'static [Field] {
        &[]
    }

    /// Field or element at a position.
    fn child(&self, _index: usize) -> Option<&dyn Walk> {
        None
    }

    /// The value a pointer or dynamic reference refers to.
    fn target(&self) -> Option<&dyn Walk> {
        None
    }

    /// Snapshot of the keys of a map.
    fn keys(&self) -> Vec<MapKey> {
        Vec::new()
    }

    /// The map value stored under `key`, if `key` has the map's key type.
    fn entry(&self, _key: &dyn Any) -> Option<&dyn Walk> {
        None
    }

    /// The leaf codec view of a scalar.
    fn leaf(&self) -> Option<&dyn Leaf> {
        None
    }

    /// Mutable counterpart of [`child`](Walk::child).
    fn child_mut(&mut self, _index: usize) -> Option<&mut dyn Walk> {
        None
    }

    /// Mutable counterpart of [`target`](Walk::target); `None` where the
    /// target is shared.
    fn target_mut(&mut self) -> Option<&mut dyn Walk> {
        None
    }

    fn entry_mut(&mut self, _key: &dyn Any) -> Option<&mut dyn Walk> {
        None
    }

    fn leaf_mut(&mut self) -> Option<&mut dyn Leaf> {
        None
    }
}

macro_rules! walk_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Walk for $ty {
                fn shape(&self) -> Shape {
                    Shape::Scalar
                }

                fn leaf(&self) -> Option<&dyn Leaf> {
                    Some(self)
                }

                fn leaf_mut(&mut self) -> Option<&mut dyn Leaf> {
                    Some(self)
                }
            }
        )*
    };
}

walk_leaf!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, Duration,
);

// scalars without a codec
impl Walk for char {
    fn shape(&self) -> Shape {
        Shape::Scalar
    }
}

impl Walk for () {
    fn shape(&self) -> Shape {
        Shape::Scalar
    }
}

impl<T: Walk> Walk for Vec<T> {
    fn shape(&self) -> Shape {
        Shape::Sequence
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn child(&self, index: usize) -> Option<&dyn Walk> {
        self.get(index).map(|v| v as &dyn Walk)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut dyn Walk> {
        self.get_mut(index).map(|v| v as &mut dyn Walk)
    }
}

impl<T: Walk, const N: usize> Walk for [T; N] {
    fn shape(&self) -> Shape {
        Shape::Array
    }

    fn size(&self) -> usize {
        N
    }

    fn child(&self, index: usize) -> Option<&dyn Walk> {
        self.get(index).map(|v| v as &dyn Walk)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut dyn Walk> {
        self.get_mut(index).map(|v| v as &mut dyn Walk)
    }
}

macro_rules! walk_pointer {
    ($($ptr:ident($this:ident) => $target_mut:expr),* $(,)?) => {
        $(
            impl<T: Walk> Walk for $ptr<T> {
                fn shape(&self) -> Shape {
                    Shape::Pointer
                }

                fn size(&self) -> usize {
                    1
                }

                fn target(&self) -> Option<&dyn Walk> {
                    Some(&**self as &dyn Walk)
                }

                fn target_mut(&mut self) -> Option<&mut dyn Walk> {
                    let $this = self;
                    let target: Option<&mut T> = $target_mut;
                    target.map(|v| v as &mut dyn Walk)
                }
            }
        )*
    };
}

walk_pointer!(
    Box(this) => Some(&mut **this),
    Rc(this) => Rc::get_mut(this),
    Arc(this) => Arc::get_mut(this),
);

impl<T: Walk> Walk for &T {
    fn shape(&self) -> Shape {
        Shape::Pointer
    }

    fn size(&self) -> usize {
        1
    }

    fn target(&self) -> Option<&dyn Walk> {
        Some(*self as &dyn Walk)
    }
}

impl<T: Walk> Walk for Option<T> {
    fn shape(&self) -> Shape {
        Shape::Pointer
    }

    fn size(&self) -> usize {
        usize::from(self.is_some())
    }

    fn target(&self) -> Option<&dyn Walk> {
        self.as_ref().map(|v| v as &dyn Walk)
    }

    fn target_mut(&mut self) -> Option<&mut dyn Walk> {
        self.as_mut().map(|v| v as &mut dyn Walk)
    }
}

/// A slot filled at most once; the usual way to close a cycle after the
/// nodes on it were allocated.
impl<T: Walk> Walk for OnceCell<T> {
    fn shape(&self) -> Shape {
        Shape::Pointer
    }

    fn size(&self) -> usize {
        usize::from(self.get().is_some())
    }

    fn target(&self) -> Option<&dyn Walk> {
        self.get().map(|v| v as &dyn Walk)
    }

    fn target_mut(&mut self) -> Option<&mut dyn Walk> {
        self.get_mut().map(|v| v as &mut dyn Walk)
    }
}

impl<K, V, S> Walk for HashMap<K, V, S>
where
    K: Eq + Hash + Clone + fmt::Display + 'static,
    V: Walk,
    S: BuildHasher,
{
    fn shape(&self) -> Shape {
        Shape::Map
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn keys(&self) -> Vec<MapKey> {
        HashMap::keys(self).map(|k| MapKey::new(k.clone())).collect()
    }

    fn entry(&self, key: &dyn Any) -> Option<&dyn Walk> {
        let key = key.downcast_ref::<K>()?;
        self.get(key).map(|v| v as &dyn Walk)
    }

    fn entry_mut(&mut self, key: &dyn Any) -> Option<&mut dyn Walk> {
        let key = key.downcast_ref::<K>()?;
        self.get_mut(key).map(|v| v as &mut dyn Walk)
    }
}

impl<K, V> Walk for BTreeMap<K, V>
where
    K: Ord + Clone + fmt::Display + 'static,
    V: Walk,
{
    fn shape(&self) -> Shape {
        Shape::Map
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn keys(&self) -> Vec<MapKey> {
        BTreeMap::keys(self).map(|k| MapKey::new(k.clone())).collect()
    }

    fn entry(&self, key: &dyn Any) -> Option<&dyn Walk> {
        let key = key.downcast_ref::<K>()?;
        self.get(key).map(|v| v as &dyn Walk)
    }

    fn entry_mut(&mut self, key: &dyn Any) -> Option<&mut dyn Walk> {
        let key = key.downcast_ref::<K>()?;
        self.get_mut(key).map(|v| v as &mut dyn Walk)
    }
}

// ============================================================================
// Dynamic references
// ============================================================================

/// A dynamically typed reference to any walkable value, or nil.
///
/// The referenced value is treated like a copy held by the reference: the
/// crawler reports it as not addressable, so a scalar held directly is never
/// bound as a parameter. Store a pointer (`Rc<T>`, `Box<T>`) to share a
/// bindable value.
#[derive(Default)]
pub struct Dynamic(Option<Box<dyn Walk>>);

impl Dynamic {
    pub fn new<T: Walk + 'static>(value: T) -> Self {
        Dynamic(Some(Box::new(value)))
    }

    /// A reference to nothing.
    pub fn nil() -> Self {
        Dynamic(None)
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// The referenced value.
    pub fn get(&self) -> Option<&dyn Walk> {
        self.0.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut dyn Walk> {
        match &mut self.0 {
            Some(value) => Some(&mut **value),
            None => None,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "Dynamic({})", value.type_name()),
            None => f.write_str("Dynamic(nil)"),
        }
    }
}

impl Walk for Dynamic {
    fn shape(&self) -> Shape {
        Shape::Dynamic
    }

    fn size(&self) -> usize {
        usize::from(self.0.is_some())
    }

    fn target(&self) -> Option<&dyn Walk> {
        self.get()
    }

    fn target_mut(&mut self) -> Option<&mut dyn Walk> {
        self.get_mut()
    }
}

// ============================================================================
// Tests
// ============================================================================
