//! Resolution: annotations → bindings → composed route candidates.

pub mod annotation;
pub mod compose;

pub use annotation::{
    resolve_annotation, resolve_class_bases, resolve_method, ResolvedBinding, ShapeError,
};
pub use compose::{compose, compose_path, normalize_path};
