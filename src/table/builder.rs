//
//  builder.rs
//  Anchor
//
//  Created by hak (tharun)
//

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use super::types::*;

/// Everything one source unit contributed, before the global merge.
#[derive(Debug, Clone, Default)]
pub struct UnitExtraction {
    pub unit: String,
    /// Declared package, or the unit's package hint.
    pub package: Option<String>,
    pub candidates: Vec<RouteCandidate>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Merges per-unit results into a [`RouteTable`].
///
/// The result does not depend on the order units are added in.
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    candidates: Vec<RouteCandidate>,
    diagnostics: Vec<Diagnostic>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: UnitExtraction) {
        debug!(
            unit = %unit.unit,
            candidates = unit.candidates.len(),
            diagnostics = unit.diagnostics.len(),
            "merging unit"
        );
        self.candidates.extend(unit.candidates);
        self.diagnostics.extend(unit.diagnostics);
    }

    pub fn add_candidate(&mut self, candidate: RouteCandidate) {
        self.candidates.push(candidate);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn build(self) -> RouteTable {
        let mut unique: BTreeMap<(String, Verb, String), Claim> = BTreeMap::new();
        for candidate in self.candidates {
            let source = candidate.source.to_string();
            let claim = unique
                .entry((candidate.path, candidate.verb, candidate.handler))
                .or_insert_with(|| Claim {
                    source: source.clone(),
                    units: BTreeSet::new(),
                });
            if source < claim.source {
                claim.source = source;
            }
            claim.units.insert(candidate.source.unit);
        }

        let mut diagnostics = self.diagnostics;
        diagnostics.extend(detect_conflicts(&unique));
        diagnostics.extend(detect_redeclarations(&unique));
        diagnostics.sort_by(|a, b| {
            (&a.source_ref, &a.message, a.severity).cmp(&(&b.source_ref, &b.message, b.severity))
        });
        diagnostics.dedup();

        let routes: Vec<Route> = unique
            .into_keys()
            .map(|(path, verb, handler)| Route::new(verb, path, handler))
            .collect();

        for diagnostic in &diagnostics {
            warn!(
                severity = %diagnostic.severity,
                source = %diagnostic.source_ref,
                "{}",
                diagnostic.message
            );
        }
        info!(
            routes = routes.len(),
            diagnostics = diagnostics.len(),
            "route table built"
        );

        RouteTable::from_parts(routes, diagnostics)
    }
}

/// Who declared one (path, verb, handler) route.
#[derive(Debug)]
struct Claim {
    /// Smallest source reference seen.
    source: String,
    units: BTreeSet<String>,
}

type Claims = BTreeMap<(String, Verb, String), Claim>;

/// One error per (verb, path) claimed by more than one handler.
fn detect_conflicts(unique: &Claims) -> Vec<Diagnostic> {
    let mut claims: BTreeMap<(&str, Verb), BTreeSet<(&str, &str)>> = BTreeMap::new();
    for ((path, verb, handler), claim) in unique {
        claims
            .entry((path.as_str(), *verb))
            .or_default()
            .insert((handler.as_str(), claim.source.as_str()));
    }

    claims
        .into_iter()
        .filter(|(_, handlers)| handlers.len() > 1)
        .map(|((path, verb), handlers)| {
            let names: Vec<&str> = handlers.iter().map(|(h, _)| *h).collect();
            let source_ref = handlers
                .iter()
                .next()
                .map(|(_, s)| s.to_string())
                .unwrap_or_default();
            Diagnostic {
                severity: Severity::Error,
                message: format!(
                    "conflicting handlers for {verb} {path}: {}",
                    names.join(", ")
                ),
                source_ref,
            }
        })
        .collect()
}

/// One error per route whose handler is declared in more than one unit.
fn detect_redeclarations(unique: &Claims) -> Vec<Diagnostic> {
    unique
        .iter()
        .filter(|(_, claim)| claim.units.len() > 1)
        .map(|((path, verb, handler), claim)| {
            let units: Vec<&str> = claim.units.iter().map(String::as_str).collect();
            Diagnostic {
                severity: Severity::Error,
                message: format!(
                    "handler {handler} for {verb} {path} is declared in several units: {}",
                    units.join(", ")
                ),
                source_ref: claim.source.clone(),
            }
        })
        .collect()
}
