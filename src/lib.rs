//! confwalk: cycle-safe traversal of in-memory data graphs.
//!
//! Types describe themselves through the [`Walk`] capability, derived for
//! records with `#[derive(Walk)]` and implemented for the standard
//! containers, pointers and scalars. On top of that the crate provides:
//!
//! - A graph crawler with enter/leave navigation and escaped path rendering
//!   ([`walk::Crawler`])
//! - A depth-first walker that visits every node once, even in cyclic graphs
//!   ([`walk_unique`])
//! - A scanner that turns a record into a tree of configurable parameters and
//!   modules ([`scan`], [`scan_warn`])
//! - Leaf codecs that format, parse and set scalar values ([`Leaf`])
//! - Owned routes that write new values into a scanned record
//!   ([`walk::Route`])
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use confwalk::{scan_warn, Walk};
//!
//! #[derive(Walk)]
//! struct Limits {
//!     pub timeout: Duration,
//!     pub retries: u8,
//! }
//!
//! #[derive(Walk)]
//! struct Config {
//!     #[walk(tag = r#"env:"NAME""#)]
//!     pub name: String,
//!     pub limits: Limits,
//!     secret: String,
//! }
//!
//! let config = Config {
//!     name: "svc".to_string(),
//!     limits: Limits { timeout: Duration::from_secs(90), retries: 3 },
//!     secret: String::new(),
//! };
//! let (module, warnings) = scan_warn(&config).unwrap();
//!
//! let timeout = module.module("limits").unwrap().parameter("timeout").unwrap();
//! assert_eq!(timeout.format(), "1m30s");
//! assert_eq!(module.parameter("name").unwrap().tag("env"), "NAME");
//!
//! // the non-pub field is not configurable
//! assert_eq!(warnings.unwrap().skipped, ["secret"]);
//!
//! let retries = module.module("limits").unwrap().parameter("retries").unwrap().route().clone();
//! drop(module);
//! let mut config = config;
//! retries.set(&mut config, "5").unwrap();
//! assert_eq!(config.limits.retries, 5);
//! ```

extern crate self as confwalk;

pub mod error;
pub mod scan;
pub mod trace;
pub mod types;
pub mod value;
pub mod walk;

pub use confwalk_derive::Walk;
pub use error::{IntoError, ScanError, ScanResult, SetError, ValueError};
pub use scan::{scan, scan_into, scan_warn, scan_with, Diagnostics, Guard, Registry, ScanOptions};
pub use trace::{ScanWarnings, Tracer};
pub use types::{FieldInfo, Module, Parameter};
pub use value::{Leaf, LeafValue};
pub use walk::{walk_unique, Crawler, Dynamic, Route, UniqueWalker, Walk, Walker};
