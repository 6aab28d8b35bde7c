//! Scan diagnostics: duplicate references and skipped fields.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::scan::Registry;
use crate::walk::{append_escaped, Identity};

/// The slash-separated path of field names and indices the scanner is at.
#[derive(Debug, Default)]
pub(crate) struct ScanPath {
    buf: String,
    marks: Vec<usize>,
}

impl ScanPath {
    pub(crate) fn enter(&mut self, name: &str) {
        self.marks.push(self.buf.len());
        if !self.buf.is_empty() {
            self.buf.push('/');
        }
        append_escaped(&mut self.buf, name);
    }

    pub(crate) fn leave(&mut self) {
        let mark = self.marks.pop().unwrap_or(0);
        self.buf.truncate(mark);
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.buf
    }
}

/// A [`Registry`] that records the path of every registration and skip.
#[derive(Debug, Default)]
pub struct Tracer {
    path: ScanPath,
    /// Index into `groups` per registered identity.
    pointers: HashMap<Identity, usize>,
    /// Registration paths per identity, in order of first registration.
    groups: Vec<Vec<String>>,
    skipped: Vec<String>,
    duplicates: usize,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected warnings, or `None` if nothing was duplicated or
    /// skipped.
    pub fn into_warnings(self) -> Option<ScanWarnings> {
        if self.duplicates == 0 && self.skipped.is_empty() {
            return None;
        }
        let duplicates = self
            .groups
            .into_iter()
            .filter(|group| group.len() > 1)
            .collect();
        Some(ScanWarnings {
            duplicates,
            skipped: self.skipped,
        })
    }
}

impl Registry for Tracer {
    fn enter(&mut self, name: &str) {
        self.path.enter(name);
    }

    fn leave(&mut self, _name: &str) {
        self.path.leave();
    }

    fn register(&mut self, identity: Identity) -> bool {
        let path = self.path.as_str().to_owned();
        match self.pointers.get(&identity) {
            Some(&group) => {
                let paths = &mut self.groups[group];
                if paths.len() == 1 {
                    self.duplicates += 1;
                }
                paths.push(path);
                true
            }
            None => {
                self.pointers.insert(identity, self.groups.len());
                self.groups.push(vec![path]);
                false
            }
        }
    }

    fn skip(&mut self) {
        self.skipped.push(self.path.as_str().to_owned());
    }
}

/// Warnings generated while scanning.
///
/// A path lists the field names and element indices leading from the root to
/// a value, separated by `/`. The root itself has the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanWarnings {
    /// Groups of paths that lead to the same value. Only the first path of
    /// each group is part of the tree.
    pub duplicates: Vec<Vec<String>>,

    /// Paths of skipped fields.
    ///
    /// A field is skipped if it is a duplicate, non-`pub`, a nil pointer or
    /// dynamic reference, or neither a leaf nor a record, array or sequence.
    pub skipped: Vec<String>,
}

impl ScanWarnings {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.skipped.is_empty()
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, group: &[String]) -> fmt::Result {
    for (i, path) in group.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(path)?;
    }
    Ok(())
}

impl fmt::Display for ScanWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.duplicates.is_empty() {
            f.write_str("found duplicates (")?;
            for (i, group) in self.duplicates.iter().enumerate() {
                if i > 0 {
                    f.write_str("), (")?;
                }
                write_group(f, group)?;
            }
            f.write_str(")")?;
        }
        if !self.skipped.is_empty() {
            if !self.duplicates.is_empty() {
                f.write_str(" and ")?;
            }
            f.write_str("skipped ")?;
            write_group(f, &self.skipped)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScanWarnings {}

#[cfg(test)]
mod tests {
    use super::*;

    mod path {
        use super::*;

        #[test]
        fn enter_and_leave() {
            let mut p = ScanPath::default();
            assert_eq!(p.as_str(), "");
            p.enter("A");
            p.enter("0");
            p.enter("a/b");
            assert_eq!(p.as_str(), r"A/0/a\/b");
            p.leave();
            assert_eq!(p.as_str(), "A/0");
            p.leave();
            p.leave();
            assert_eq!(p.as_str(), "");
            p.leave();
            assert_eq!(p.as_str(), "");
        }
    }

    mod tracer {
        use super::*;

        fn id(value: &dyn crate::walk::Walk) -> Identity {
            Identity::of(value)
        }

        #[test]
        fn no_events_no_warnings() {
            let mut t = Tracer::new();
            t.enter("A");
            assert!(!t.register(id(&1u8)));
            t.leave("A");
            assert_eq!(t.into_warnings(), None);
        }

        #[test]
        fn groups_duplicates_in_registration_order() {
            let (x, y) = (1i32, 2i32);
            let mut t = Tracer::new();
            for (name, value) in [("A", &x), ("B", &y), ("C", &y), ("D", &x), ("E", &y)] {
                t.enter(name);
                if t.register(id(value)) {
                    t.skip();
                }
                t.leave(name);
            }
            let warnings = t.into_warnings().expect("warnings");
            assert_eq!(
                warnings.duplicates,
                vec![vec!["A", "D"], vec!["B", "C", "E"]]
            );
            assert_eq!(warnings.skipped, vec!["C", "D", "E"]);
        }

        #[test]
        fn skips_alone_are_reported() {
            let mut t = Tracer::new();
            t.enter("M");
            t.enter("0");
            t.skip();
            t.leave("0");
            t.leave("M");
            let warnings = t.into_warnings().expect("warnings");
            assert!(warnings.duplicates.is_empty());
            assert_eq!(warnings.skipped, vec!["M/0"]);
        }
    }

    mod message {
        use super::*;

        fn strings(paths: &[&str]) -> Vec<String> {
            paths.iter().map(|p| p.to_string()).collect()
        }

        #[test]
        fn empty_warnings_have_empty_message() {
            let w = ScanWarnings::default();
            assert!(w.is_empty());
            assert_eq!(w.to_string(), "");
        }

        #[test]
        fn formats_duplicates_and_skips() {
            let mut w = ScanWarnings {
                duplicates: vec![strings(&["D0a/D0a_", "D0b"])],
                skipped: Vec::new(),
            };
            assert_eq!(w.to_string(), "found duplicates (D0a/D0a_, D0b)");

            w.duplicates.push(strings(&["D1a", "D1b"]));
            assert_eq!(
                w.to_string(),
                "found duplicates (D0a/D0a_, D0b), (D1a, D1b)"
            );

            w.skipped = strings(&["S0/S0_", "S1"]);
            assert_eq!(
                w.to_string(),
                "found duplicates (D0a/D0a_, D0b), (D1a, D1b) and skipped S0/S0_, S1"
            );

            w.duplicates.clear();
            assert_eq!(w.to_string(), "skipped S0/S0_, S1");
        }
    }
}
