//
//  types.rs
//  Anchor
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::Result;

// ── Verbs ────────────────────────────────────────────────────────────────────

/// HTTP verb a route is bound to.
///
/// `Any` only exists between resolution and composition: the composer
/// expands it into the five concrete verbs, so a finished [`Route`] never
/// carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Any,
}

impl Verb {
    /// The five verbs a route can actually be served under.
    pub const CONCRETE: [Verb; 5] = [Verb::Get, Verb::Post, Verb::Put, Verb::Patch, Verb::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Any => "ANY",
        }
    }

    /// Parse the last segment of a verb symbol (`RequestMethod.PUT` → `PUT`).
    ///
    /// Only concrete verbs are accepted; `ANY` is never written in source.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let last = symbol.rsplit('.').next().unwrap_or(symbol).trim();
        match last {
            "GET" => Some(Verb::Get),
            "POST" => Some(Verb::Post),
            "PUT" => Some(Verb::Put),
            "PATCH" => Some(Verb::Patch),
            "DELETE" => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn is_concrete(self) -> bool {
        self != Verb::Any
    }

    /// Concrete verbs this verb stands for.
    pub fn expand(self) -> &'static [Verb] {
        match self {
            Verb::Get => &[Verb::Get],
            Verb::Post => &[Verb::Post],
            Verb::Put => &[Verb::Put],
            Verb::Patch => &[Verb::Patch],
            Verb::Delete => &[Verb::Delete],
            Verb::Any => &Verb::CONCRETE,
        }
    }
}

// Route ordering compares verbs by their textual form.
impl Ord for Verb {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Verb {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── Source references ────────────────────────────────────────────────────────

/// Where a binding or diagnostic came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub unit: String,
    pub line: u32,
    pub class: Option<String>,
    pub method: Option<String>,
}

impl SourceRef {
    pub fn unit(unit: impl Into<String>, line: u32) -> Self {
        Self {
            unit: unit.into(),
            line,
            class: None,
            method: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// `Class.method`, `Class`, or empty when neither is known.
    pub fn handler(&self) -> String {
        match (&self.class, &self.method) {
            (Some(c), Some(m)) => format!("{c}.{m}"),
            (Some(c), None) => c.clone(),
            (None, Some(m)) => m.clone(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.line)?;
        let handler = self.handler();
        if !handler.is_empty() {
            write!(f, " {handler}")?;
        }
        Ok(())
    }
}

// ── Diagnostics ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A non-fatal problem found while extracting routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(rename = "sourceRef")]
    pub source_ref: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>, source: &SourceRef) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            source_ref: source.to_string(),
        }
    }

    pub fn error(message: impl Into<String>, source: &SourceRef) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            source_ref: source.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.source_ref)
    }
}

// ── Routes ───────────────────────────────────────────────────────────────────

/// A route before deduplication: concrete verb, normalized path, handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCandidate {
    pub verb: Verb,
    pub path: String,
    pub handler: String,
    pub source: SourceRef,
}

/// One resolved (verb, path, handler) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub verb: Verb,
    pub path: String,
    pub handler: String,
    pub id: String,
}

impl Route {
    pub fn new(verb: Verb, path: impl Into<String>, handler: impl Into<String>) -> Self {
        let path = path.into();
        let handler = handler.into();
        let id = route_id(verb, &path, &handler);
        Self {
            verb,
            path,
            handler,
            id,
        }
    }

    /// Sort key: path, then verb, then handler.
    pub fn sort_key(&self) -> (&str, Verb, &str) {
        (&self.path, self.verb, &self.handler)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.verb, self.path, self.handler)
    }
}

/// Stable identifier for a route: hex `xxh3_64` over verb, path and handler.
pub fn route_id(verb: Verb, path: &str, handler: &str) -> String {
    let mut key = String::with_capacity(verb.as_str().len() + path.len() + handler.len() + 2);
    key.push_str(verb.as_str());
    key.push('\0');
    key.push_str(path);
    key.push('\0');
    key.push_str(handler);
    format!("{:016x}", xxh3_64(key.as_bytes()))
}

// ── Route table ──────────────────────────────────────────────────────────────

/// The result of one extraction run. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
    diagnostics: Vec<Diagnostic>,
}

impl RouteTable {
    pub(crate) fn from_parts(routes: Vec<Route>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            routes,
            diagnostics,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True if any error-severity diagnostic was collected.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Routes served by `handler` (`Class.method`).
    pub fn routes_for<'a>(&'a self, handler: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes.iter().filter(move |r| r.handler == handler)
    }

    pub fn into_parts(self) -> (Vec<Route>, Vec<Diagnostic>) {
        (self.routes, self.diagnostics)
    }

    /// Pretty-printed JSON: `{"routes": [...], "diagnostics": [...]}`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
