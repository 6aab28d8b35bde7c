//! The configuration tree produced by a scan.
//!
//! A [`Module`] collects the [`Parameter`]s and nested modules found below a
//! record, array or sequence. Both borrow the scanned graph; a parameter's
//! [`Route`] does not, and writes new values once the tree is dropped.

use std::fmt;

use crate::error::ValueError;
use crate::value::{Leaf, LeafValue};
use crate::walk::{Route, Tag};

/// Name and tags of a tree entry.
///
/// Record fields carry their declared (or renamed) name and struct tag;
/// array and sequence elements are named by their decimal index and have no
/// tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    name: String,
    tag: Tag,
}

impl FieldInfo {
    pub(crate) fn new(name: impl Into<String>, tag: Tag) -> Self {
        FieldInfo {
            name: name.into(),
            tag,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(String::new(), Tag::new(""))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retrieves a tag value; the empty key retrieves the full tag.
    pub fn tag(&self, key: &str) -> String {
        self.tag.get(key)
    }
}

/// A configurable leaf value.
pub struct Parameter<'a> {
    field: FieldInfo,
    value: &'a dyn Leaf,
    route: Route,
}

impl<'a> Parameter<'a> {
    pub(crate) fn new(field: FieldInfo, value: &'a dyn Leaf, route: Route) -> Self {
        Parameter { field, value, route }
    }

    pub fn name(&self) -> &str {
        self.field.name()
    }

    pub fn tag(&self, key: &str) -> String {
        self.field.tag(key)
    }

    /// The codec bound to the value.
    pub fn value(&self) -> &'a dyn Leaf {
        self.value
    }

    /// The current value in text form.
    pub fn format(&self) -> String {
        self.value.format()
    }

    pub fn get(&self) -> LeafValue {
        self.value.get()
    }

    /// The route from the scan root to the value.
    ///
    /// Clone it and replay it with [`Route::set`] against the mutably
    /// borrowed root to change the value.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Parses `text` with the value's codec.
    pub fn parse(&self, text: &str) -> Result<LeafValue, ValueError> {
        self.value.parse(text)
    }

    pub fn is_bool_flag(&self) -> bool {
        self.value.is_bool_flag()
    }
}

impl fmt::Debug for Parameter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.field.name)
            .field("tag", &self.field.tag.as_str())
            .field("value", &self.format())
            .field("route", &self.route.path())
            .finish()
    }
}

/// A collection of parameters and nested modules, in discovery order.
#[derive(Debug)]
pub struct Module<'a> {
    field: FieldInfo,
    modules: Vec<Module<'a>>,
    params: Vec<Parameter<'a>>,
}

impl<'a> Module<'a> {
    pub(crate) fn new(field: FieldInfo) -> Self {
        Module {
            field,
            modules: Vec::new(),
            params: Vec::new(),
        }
    }

    pub(crate) fn push_module(&mut self, module: Module<'a>) {
        self.modules.push(module);
    }

    pub(crate) fn push_parameter(&mut self, param: Parameter<'a>) {
        self.params.push(param);
    }

    /// The field name; empty for the root module.
    pub fn name(&self) -> &str {
        self.field.name()
    }

    pub fn tag(&self, key: &str) -> String {
        self.field.tag(key)
    }

    /// The first nested module called `name`.
    pub fn module(&self, name: &str) -> Option<&Module<'a>> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn modules(&self) -> &[Module<'a>] {
        &self.modules
    }

    /// The first parameter called `name`.
    pub fn parameter(&self, name: &str) -> Option<&Parameter<'a>> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn parameters(&self) -> &[Parameter<'a>] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.params.is_empty()
    }

    fn append_indented(&self, buf: &mut String, prefix: &str) {
        let path = format!("{prefix}{}/", self.name());
        buf.push_str(&path);
        buf.push('\n');
        for module in &self.modules {
            module.append_indented(buf, &path);
        }
        for param in &self.params {
            buf.push_str(&path);
            buf.push_str(param.name());
            buf.push('\n');
        }
    }
}

/// Lists every module path followed by `/`, then the parameter paths below
/// it, one per line.
impl fmt::Display for Module<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        self.append_indented(&mut buf, "");
        f.write_str(&buf)
    }
}
