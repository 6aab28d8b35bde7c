//! Per-node child enumeration.

use super::crawl::Crawler;
use super::key::Key;
use super::node::{MapKey, Shape};

/// Enumerates the children of the node a [`Crawler`] was at when the
/// iterator was created.
///
/// The iterator only holds a cursor; every call takes the crawler, which must
/// be back at that node.
#[derive(Debug, Clone)]
pub enum ChildIter {
    /// A node without children.
    Empty,
    /// Ordered children, entered by index.
    Sequential { next: usize },
    /// Map entries, entered by the keys present at creation.
    Map { keys: Vec<MapKey>, next: usize },
}

impl ChildIter {
    pub fn new(crawler: &Crawler<'_>) -> Self {
        if crawler.size() == 0 {
            return ChildIter::Empty;
        }
        if crawler.ordered() {
            return ChildIter::Sequential { next: 0 };
        }
        if crawler.shape() == Shape::Map {
            return ChildIter::Map {
                keys: crawler.node().keys(),
                next: 0,
            };
        }
        ChildIter::Empty
    }

    pub fn has_next(&self, crawler: &Crawler<'_>) -> bool {
        match self {
            ChildIter::Empty => false,
            ChildIter::Sequential { next } => *next < crawler.size(),
            ChildIter::Map { keys, next } => *next < keys.len(),
        }
    }

    /// Enters the next child and reports whether it succeeded.
    ///
    /// Map keys that no longer resolve are passed over.
    pub fn enter_next(&mut self, crawler: &mut Crawler<'_>) -> bool {
        match self {
            ChildIter::Empty => false,
            ChildIter::Sequential { next } => {
                if *next >= crawler.size() || !crawler.enter(*next) {
                    return false;
                }
                *next += 1;
                true
            }
            ChildIter::Map { keys, next } => {
                while let Some(key) = keys.get(*next) {
                    *next += 1;
                    if crawler.enter(Key::Map(key.clone())) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Leaves the child entered last.
    pub fn leave(&self, crawler: &mut Crawler<'_>) {
        crawler.leave();
    }

    /// Starts over; a map iterator takes a new snapshot of the keys.
    pub fn reset(&mut self, crawler: &Crawler<'_>) {
        match self {
            ChildIter::Empty => {}
            ChildIter::Sequential { next } => *next = 0,
            ChildIter::Map { .. } => *self = ChildIter::new(crawler),
        }
    }
}

impl Crawler<'_> {
    /// An iterator over the children of the current node.
    pub fn children(&self) -> ChildIter {
        ChildIter::new(self)
    }
}
