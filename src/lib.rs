//! # Anchor Routes
//!
//! Static HTTP route extraction for annotated controller sources.
//!
//! Anchor Routes reads Java-style controller classes, finds the mapping
//! annotations on classes and methods (`@RequestMapping`, `@GetMapping`, …)
//! and produces a canonical route table that documentation or gateway
//! tooling can consume.
//!
//! ## Key Features
//!
//! - **Tolerant**: only declaration structure is parsed; method bodies and
//!   unfamiliar syntax are skipped, never fatal
//! - **Deterministic**: routes are sorted by path, verb and handler, and carry
//!   stable hash IDs
//! - **Conflict-checked**: two handlers on the same verb and path are
//!   reported, and both routes are kept
//! - **Parallel**: each source unit is processed independently
//!
//! ## Quick Start
//!
//! ```rust
//! use anchor_routes::{extract, SourceUnit};
//!
//! let unit = SourceUnit::new(
//!     "ItemController.java",
//!     r#"
//!     @RestController
//!     @RequestMapping("/api")
//!     class ItemController {
//!         @GetMapping("/items/{id}")
//!         Item get(@PathVariable long id) { return repo.find(id); }
//!     }
//!     "#,
//! );
//!
//! let table = extract(&[unit]);
//! assert_eq!(table.routes()[0].path, "/api/items/{id}");
//! assert!(table.diagnostics().is_empty());
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod parser;
pub mod resolve;
pub mod scan;
pub mod source;
pub mod table;

// Re-exports for convenience
pub use config::ExtractConfig;
pub use error::{Result, RouteError};
pub use extract::{extract, Extractor};
pub use source::SourceUnit;
pub use table::{Diagnostic, Route, RouteTable, Severity, Verb};
