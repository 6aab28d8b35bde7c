//! Owned routes from a root to one of its nodes.
//!
//! A [`Route`] remembers how a [`Crawler`](super::Crawler) reached a node
//! without borrowing the graph. It can be replayed later against the same
//! root, read-only or mutably, which is how scanned parameters write their
//! values back once the scan result is no longer borrowed.

use std::fmt;

use super::key::Key;
use super::node::{MapKey, Walk};
use crate::error::SetError;
use crate::value::LeafValue;

/// One edge of a [`Route`].
#[derive(Debug, Clone)]
pub enum Step {
    /// A record field, array element or sequence element by position.
    Child(usize),
    /// A map entry.
    Entry(MapKey),
    /// The target of a pointer or dynamic reference.
    Target,
}

/// A replayable path from a root to a node.
///
/// ```
/// use confwalk::{scan, Walk};
///
/// #[derive(Walk, Default)]
/// struct Config {
///     pub port: u16,
/// }
///
/// let mut config = Config::default();
/// let route = {
///     let module = scan(&config).unwrap();
///     module.parameter("port").unwrap().route().clone()
/// };
/// route.set(&mut config, "8080").unwrap();
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Route {
    steps: Vec<Step>,
    path: String,
}

impl Route {
    /// The route to the root itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a route from the keys a crawler recorded and its rendered path.
    pub(crate) fn from_keys<'k>(keys: impl IntoIterator<Item = &'k Key>, path: String) -> Self {
        let mut steps = Vec::new();
        for key in keys {
            match key {
                Key::Index(index) => steps.push(Step::Child(*index)),
                Key::Field(field) => steps.extend(field.indices().map(Step::Child)),
                Key::Map(map_key) => steps.push(Step::Entry(map_key.clone())),
                Key::Elem => steps.push(Step::Target),
            }
        }
        Route { steps, path }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The escaped path of the node, as rendered by the crawler.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The node at the end of the route below `root`.
    pub fn resolve<'w>(&self, root: &'w dyn Walk) -> Option<&'w dyn Walk> {
        let mut node = root;
        for step in &self.steps {
            node = match step {
                Step::Child(index) => node.child(*index)?,
                Step::Entry(key) => node.entry(key.as_any())?,
                Step::Target => node.target()?,
            };
        }
        Some(node)
    }

    /// The node at the end of the route below `root`, for writing.
    ///
    /// Returns `None` if a step is missing or passes a shared pointer.
    pub fn resolve_mut<'w>(&self, root: &'w mut dyn Walk) -> Option<&'w mut dyn Walk> {
        let mut node = root;
        for step in &self.steps {
            node = match step {
                Step::Child(index) => node.child_mut(*index)?,
                Step::Entry(key) => node.entry_mut(key.as_any())?,
                Step::Target => node.target_mut()?,
            };
        }
        Some(node)
    }

    /// The current value of the leaf at the end of the route.
    pub fn get(&self, root: &dyn Walk) -> Option<LeafValue> {
        self.resolve(root)?.leaf().map(|leaf| leaf.get())
    }

    /// Parses `text` into the leaf at the end of the route.
    pub fn set(&self, root: &mut dyn Walk, text: &str) -> Result<(), SetError> {
        let leaf = self
            .resolve_mut(root)
            .and_then(|node| node.leaf_mut())
            .ok_or_else(|| SetError::Unreachable {
                path: self.path.clone(),
            })?;
        leaf.set(text)?;
        Ok(())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
