//! Route table model and the merge step that builds it.

pub mod builder;
pub mod types;

pub use builder::{RouteTableBuilder, UnitExtraction};
pub use types::{
    route_id, Diagnostic, Route, RouteCandidate, RouteTable, Severity, SourceRef, Verb,
};
