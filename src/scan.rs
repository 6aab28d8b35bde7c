//! Scanning a record into a tree of modules and parameters.
//!
//! The scanner walks every field of the root record with a [`Crawler`].
//! Leaf values become [`Parameter`]s, records, arrays and sequences become
//! nested [`Module`]s, and everything else is skipped. Pointers and dynamic
//! references are dereferenced on the way; each value reached through a
//! pointer is registered, so values shared by several paths appear once and
//! cycles terminate.
//!
//! Registration and skip bookkeeping is delegated to a [`Registry`]. The
//! silent [`Guard`] only tracks identities; the [`Tracer`] also records the
//! paths that lead to duplicates and skipped fields.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ScanError, ScanResult};
use crate::trace::{ScanWarnings, Tracer};
use crate::types::{FieldInfo, Module, Parameter};
use crate::walk::{Crawler, Identity, Key, Shape, Tag, Walk};

// ============================================================================
// Options
// ============================================================================

/// How much bookkeeping a scan does about anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Diagnostics {
    /// Duplicates and skipped fields are left out of the tree silently.
    #[default]
    Silent,
    /// Duplicates and skipped fields are reported as [`ScanWarnings`].
    Trace,
}

/// Configuration options for [`scan_with`].
///
/// # Example
///
/// ```
/// use confwalk::{Diagnostics, ScanOptions};
///
/// let options = ScanOptions::default();
/// assert_eq!(options.diagnostics, Diagnostics::Silent);
///
/// let options = ScanOptions::new().with_diagnostics(Diagnostics::Trace);
/// assert_eq!(options.diagnostics, Diagnostics::Trace);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    pub diagnostics: Diagnostics,
}

impl ScanOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Bookkeeping strategy of a scan.
///
/// Every `enter` is matched by a `leave` with the same name.
pub trait Registry {
    /// Called before a field or element is scanned.
    fn enter(&mut self, name: &str);

    /// Called after a field or element was scanned.
    fn leave(&mut self, name: &str);

    /// Records a visited value and reports whether it was recorded before.
    fn register(&mut self, identity: Identity) -> bool;

    /// Called when the current field or element is left out of the tree.
    fn skip(&mut self);
}

/// A [`Registry`] that only remembers identities.
#[derive(Debug, Default)]
pub struct Guard {
    known: HashSet<Identity>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Registry for Guard {
    fn enter(&mut self, _name: &str) {}

    fn leave(&mut self, _name: &str) {}

    fn register(&mut self, identity: Identity) -> bool {
        !self.known.insert(identity)
    }

    fn skip(&mut self) {}
}

// ============================================================================
// Scanner
// ============================================================================

#[derive(Debug, Default)]
struct Counts {
    params: usize,
    modules: usize,
    skipped: usize,
}

struct Scanner<'a, 'r, R: Registry + ?Sized> {
    crawler: Crawler<'a>,
    registry: &'r mut R,
    counts: Counts,
}

impl<'a, R: Registry + ?Sized> Scanner<'a, '_, R> {
    /// Adds the fields of a record or the elements of an array or sequence
    /// to `module`. Returns false for any other node.
    fn scan_children(&mut self, module: &mut Module<'a>) -> bool {
        if !self.crawler.shape().is_composite() {
            return false;
        }
        let depth = self.crawler.depth();
        let fields = self.crawler.node().fields();
        for index in 0..self.crawler.size() {
            let field = match fields.get(index) {
                Some(field) => FieldInfo::new(field.name(), field.tag()),
                None => FieldInfo::new(index.to_string(), Tag::default()),
            };
            self.registry.enter(field.name());
            let added = self.crawler.enter(index) && self.scan_value(module, &field);
            self.crawler.return_to(depth);
            if !added {
                self.counts.skipped += 1;
                self.registry.skip();
                debug!(parent = %self.crawler.path(), field = field.name(), "skipped field");
            }
            self.registry.leave(field.name());
        }
        true
    }

    /// Adds the value at the crawler to `module` as a parameter or module.
    ///
    /// The crawler may be left below the value; the caller restores it.
    fn scan_value(&mut self, module: &mut Module<'a>, field: &FieldInfo) -> bool {
        if !self.crawler.is_accessible() {
            return false;
        }

        let mut registered = false;
        loop {
            let node = self.crawler.node();
            match node.shape() {
                Shape::Pointer => {
                    let Some(target) = node.target() else {
                        return false;
                    };
                    if self.registry.register(Identity::of(target)) {
                        debug!(path = %self.crawler.path(), "duplicate reference");
                        return false;
                    }
                    registered = true;
                }
                Shape::Dynamic => {
                    if node.target().is_none() {
                        return false;
                    }
                }
                _ => break,
            }
            if !self.crawler.enter(Key::Elem) {
                return false;
            }
        }

        if let Some(node) = self.crawler.reference() {
            if !registered && self.registry.register(self.crawler.identity()) {
                debug!(path = %self.crawler.path(), "duplicate reference");
                return false;
            }
            if let Some(value) = node.leaf() {
                module.push_parameter(Parameter::new(field.clone(), value, self.crawler.route()));
                self.counts.params += 1;
                return true;
            }
        }

        let mut nested = Module::new(field.clone());
        if !self.scan_children(&mut nested) {
            return false;
        }
        module.push_module(nested);
        self.counts.modules += 1;
        true
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Scans `root` with a caller-provided registry.
///
/// The root identity is registered before its fields are scanned.
pub fn scan_into<'a, R>(root: &'a dyn Walk, registry: &mut R) -> ScanResult<Module<'a>>
where
    R: Registry + ?Sized,
{
    if root.shape() != Shape::Record {
        return Err(ScanError::NotARecord {
            type_name: root.type_name(),
        });
    }
    registry.register(Identity::of(root));

    let mut scanner = Scanner {
        crawler: Crawler::new(root),
        registry,
        counts: Counts::default(),
    };
    let mut module = Module::new(FieldInfo::root());
    scanner.scan_children(&mut module);

    let counts = scanner.counts;
    debug!(
        root = root.type_name(),
        params = counts.params,
        modules = counts.modules,
        skipped = counts.skipped,
        "scan complete"
    );
    Ok(module)
}

/// Scans the fields of a record into a tree of modules and parameters.
///
/// Values reachable by more than one path appear only at the first path.
///
/// # Example
///
/// ```
/// use confwalk::{scan, Walk};
///
/// #[derive(Walk, Default)]
/// struct Http {
///     #[walk(tag = r#"env:"PORT""#)]
///     pub port: u16,
/// }
///
/// #[derive(Walk, Default)]
/// struct Config {
///     pub http: Http,
///     pub debug: bool,
/// }
///
/// let config = Config::default();
/// let module = scan(&config).unwrap();
/// let port = module.module("http").unwrap().parameter("port").unwrap();
/// assert_eq!(port.tag("env"), "PORT");
/// assert_eq!(port.format(), "0");
/// assert_eq!(module.to_string(), "/\n/http/\n/http/port\n/debug\n");
/// ```
pub fn scan(root: &dyn Walk) -> ScanResult<Module<'_>> {
    scan_into(root, &mut Guard::new())
}

/// Like [`scan`], and also reports duplicates and skipped fields.
///
/// The warnings are `None` when every reachable field made it into the tree
/// exactly once.
pub fn scan_warn(root: &dyn Walk) -> ScanResult<(Module<'_>, Option<ScanWarnings>)> {
    let mut tracer = Tracer::new();
    let module = scan_into(root, &mut tracer)?;
    Ok((module, tracer.into_warnings()))
}

/// Scans with explicit options.
///
/// Warnings are only collected with [`Diagnostics::Trace`].
pub fn scan_with(
    root: &dyn Walk,
    options: ScanOptions,
) -> ScanResult<(Module<'_>, Option<ScanWarnings>)> {
    match options.diagnostics {
        Diagnostics::Silent => scan(root).map(|module| (module, None)),
        Diagnostics::Trace => scan_warn(root),
    }
}

// ============================================================================
// Tests
// ============================================================================
