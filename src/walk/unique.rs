//! Depth-first traversal that reports every node once.

use std::collections::HashSet;

use tracing::trace;

use super::crawl::Crawler;
use super::identity::Identity;
use super::iterator::ChildIter;
use super::node::Walk;

/// Walks the nodes of a graph of values.
///
/// Accessors report on the node returned by the last successful
/// [`next`](Walker::next).
pub trait Walker<'a> {
    /// Moves to the next node and reports whether there was one.
    fn next(&mut self) -> bool;

    /// Retrieves a tag of the current record field; the empty key retrieves
    /// the full tag.
    fn tag(&self, key: &str) -> String;

    /// A reference to the current node, if it is addressable and accessible.
    fn reference(&self) -> Option<&'a dyn Walk>;

    /// The length of the path from the root to the current node.
    fn depth(&self) -> usize;

    /// The type name of the current node.
    fn type_name(&self) -> &'static str;

    /// The full escaped path to the current node, starting with `/`.
    fn path(&self) -> String;
}

#[derive(Debug)]
struct Frame {
    children: ChildIter,
    depth: usize,
}

/// A depth-first [`Walker`] that enters every node identity at most once.
///
/// The root counts as visited before the walk starts. When a child leads back
/// to a visited node, the walker leaves it again without reporting it, so
/// cyclic graphs terminate.
#[derive(Debug)]
pub struct UniqueWalker<'a> {
    crawler: Crawler<'a>,
    frames: Vec<Frame>,
    seen: HashSet<Identity>,
}

impl<'a> UniqueWalker<'a> {
    pub fn new(root: &'a dyn Walk) -> Self {
        Self::start(Crawler::new(root))
    }

    /// Walks from the target of a pointer or dynamic reference.
    ///
    /// Returns `None` if `ptr` is neither or if its target is nil.
    pub fn from_pointer(ptr: &'a dyn Walk) -> Option<Self> {
        Crawler::from_pointer(ptr).map(Self::start)
    }

    fn start(crawler: Crawler<'a>) -> Self {
        let frames = vec![Frame {
            children: crawler.children(),
            depth: crawler.depth(),
        }];
        let seen = HashSet::from([crawler.identity()]);
        UniqueWalker {
            crawler,
            frames,
            seen,
        }
    }

    /// The underlying crawler, positioned at the current node.
    pub fn crawler(&self) -> &Crawler<'a> {
        &self.crawler
    }
}

impl<'a> Walker<'a> for UniqueWalker<'a> {
    fn next(&mut self) -> bool {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return false;
            };
            if !frame.children.enter_next(&mut self.crawler) {
                self.frames.pop();
                match self.frames.last() {
                    Some(parent) => self.crawler.return_to(parent.depth),
                    None => return false,
                }
                continue;
            }
            let identity = self.crawler.identity();
            if !self.seen.insert(identity) {
                trace!(path = %self.crawler.path(), %identity, "node already walked");
                self.crawler.leave();
                continue;
            }
            self.frames.push(Frame {
                children: self.crawler.children(),
                depth: self.crawler.depth(),
            });
            return true;
        }
    }

    fn tag(&self, key: &str) -> String {
        self.crawler.tag(key)
    }

    fn reference(&self) -> Option<&'a dyn Walk> {
        self.crawler.reference()
    }

    fn depth(&self) -> usize {
        self.crawler.depth()
    }

    fn type_name(&self) -> &'static str {
        self.crawler.type_name(self.crawler.depth())
    }

    fn path(&self) -> String {
        let mut buf = String::from("/");
        self.crawler.append_path(&mut buf, true);
        buf
    }
}

/// Returns a walker that visits each node reachable from `root` once, depth
/// first.
pub fn walk_unique(root: &dyn Walk) -> UniqueWalker<'_> {
    UniqueWalker::new(root)
}
