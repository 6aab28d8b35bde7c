//! Generic traversal of graphs of values.
//!
//! - [`node`]: the [`Walk`] capability every traversed type implements
//! - [`crawl`]: [`Crawler`], a cursor with enter/leave navigation and path rendering
//! - [`iterator`]: [`ChildIter`], enumeration of one node's children
//! - [`unique`]: [`UniqueWalker`], a depth-first walk visiting each node once
//! - [`route`]: [`Route`], an owned path that writes leaf values back

pub mod crawl;
pub mod identity;
pub mod iterator;
pub mod key;
pub mod node;
pub mod route;
pub mod unique;

pub use crawl::Crawler;
pub use identity::Identity;
pub use iterator::ChildIter;
pub use key::{append_escaped, escape, FieldKey, Key};
pub use node::{Dynamic, Field, MapKey, Shape, Tag, Walk};
pub use route::{Route, Step};
pub use unique::{walk_unique, UniqueWalker, Walker};
