//! Error types for scanning, path navigation, leaf conversion and writing.
//!
//! Structural problems with a scan root are the only fatal scan errors. Every
//! per-field problem (unsupported shape, duplicate reference, nil pointer,
//! inaccessible field) is a skip and is reported, if at all, through
//! [`ScanWarnings`](crate::trace::ScanWarnings).

use thiserror::Error;

// ============================================================================
// Scan errors
// ============================================================================

/// Errors that prevent a scan from producing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The root is not a record.
    #[error("cannot scan {type_name}: root must be a record")]
    NotARecord { type_name: &'static str },
}

/// Result type for scans.
pub type ScanResult<T> = Result<T, ScanError>;

// ============================================================================
// Path navigation
// ============================================================================

/// Failure of [`Crawler::enter_path`](crate::walk::Crawler::enter_path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("error following path, invalid key at index {index}, failed after {entered} nodes")]
pub struct IntoError {
    /// Index of the key that could not be entered.
    pub index: usize,
    /// Number of nodes entered before the failure, dereferences included.
    pub entered: usize,
}

// ============================================================================
// Leaf conversion
// ============================================================================

/// Errors produced when parsing the text form of a leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("parsing {text:?} as {kind}: invalid syntax")]
    Syntax { kind: &'static str, text: String },

    #[error("parsing {text:?} as {kind}: value out of range")]
    Range { kind: &'static str, text: String },
}

impl ValueError {
    pub(crate) fn syntax(kind: &'static str, text: &str) -> Self {
        ValueError::Syntax {
            kind,
            text: text.to_owned(),
        }
    }

    pub(crate) fn range(kind: &'static str, text: &str) -> Self {
        ValueError::Range {
            kind,
            text: text.to_owned(),
        }
    }

    /// The leaf kind that failed to parse.
    pub fn kind(&self) -> &'static str {
        match self {
            ValueError::Syntax { kind, .. } | ValueError::Range { kind, .. } => kind,
        }
    }
}

// ============================================================================
// Writing values
// ============================================================================

/// Errors produced when writing a value through a [`Route`](crate::walk::Route).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    /// A step of the route is missing or only reachable through a shared
    /// pointer, or the node at its end is not a leaf.
    #[error("cannot set {path:?}: value is not reachable for writing")]
    Unreachable { path: String },

    #[error(transparent)]
    Value(#[from] ValueError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod messages {
        use super::*;

        #[test]
        fn not_a_record_names_type() {
            let err = ScanError::NotARecord { type_name: "i32" };
            assert_eq!(err.to_string(), "cannot scan i32: root must be a record");
        }

        #[test]
        fn into_error_reports_index_and_count() {
            let err = IntoError {
                index: 2,
                entered: 3,
            };
            assert_eq!(
                err.to_string(),
                "error following path, invalid key at index 2, failed after 3 nodes"
            );
        }

        #[test]
        fn value_errors_quote_text() {
            assert_eq!(
                ValueError::syntax("i8", "x").to_string(),
                r#"parsing "x" as i8: invalid syntax"#
            );
            assert_eq!(
                ValueError::range("u8", "256").to_string(),
                r#"parsing "256" as u8: value out of range"#
            );
            assert_eq!(ValueError::range("u8", "256").kind(), "u8");
        }

        #[test]
        fn set_errors_name_path_or_forward_value_error() {
            let err = SetError::Unreachable {
                path: "Listeners/0/Addr".to_string(),
            };
            assert_eq!(
                err.to_string(),
                r#"cannot set "Listeners/0/Addr": value is not reachable for writing"#
            );
            let err = SetError::from(ValueError::syntax("bool", "yes"));
            assert_eq!(err.to_string(), r#"parsing "yes" as bool: invalid syntax"#);
        }
    }
}
