//
//  annotation.rs
//  Anchor
//
//  Created by hak (tharun)
//

//! Annotation resolver: one mapping annotation → one `{verbs, paths}` binding.

use thiserror::Error;

use crate::parser::{AnnotationKind, AnnotationUse, ArgValue, ClassNode, MethodNode};
use crate::table::{Diagnostic, SourceRef, Verb};

/// Attributes naming the path(s) of a mapping. Positional means `value`.
const PATH_ATTRIBUTES: &[&str] = &["value", "path"];

/// Attribute holding the verb list of a generic mapping.
const VERB_ATTRIBUTE: &str = "method";

/// Intermediate result for one mapping annotation.
///
/// `verbs` and `paths` are never empty; a missing path is `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub verbs: Vec<Verb>,
    pub paths: Vec<String>,
    pub source: SourceRef,
}

/// Why an annotation's arguments could not be turned into a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("verb list `method` is not allowed on a verb-specific mapping")]
    VerbListOnVerbMapping,

    #[error("path `{0}` is not a string literal and cannot be resolved statically")]
    UnresolvedPath(String),

    #[error("path must be a string or an array of strings, found {0}")]
    UnexpectedPathValue(&'static str),

    #[error("more than one positional argument")]
    MultiplePositional,

    #[error("attribute `{0}` given more than once")]
    DuplicateAttribute(String),

    #[error("`{0}` is not one of GET, POST, PUT, PATCH, DELETE")]
    UnknownVerb(String),

    #[error("verb list must be a verb or an array of verbs, found {0}")]
    UnexpectedVerbValue(&'static str),
}

/// Resolve a single annotation.
///
/// Non-mapping annotations resolve to `Ok(None)`. A mapping annotation with
/// an argument shape that cannot be read yields an error diagnostic naming
/// its source.
pub fn resolve_annotation(
    annotation: &AnnotationUse,
    source: &SourceRef,
) -> Result<Option<ResolvedBinding>, Diagnostic> {
    let fixed_verb = match annotation.kind {
        AnnotationKind::Mapping(verb) => Some(verb),
        AnnotationKind::GenericMapping => None,
        _ => return Ok(None),
    };

    read_binding(annotation, fixed_verb, source)
        .map(Some)
        .map_err(|e| {
            Diagnostic::error(format!("@{}: {e}", annotation.simple_name()), source)
        })
}

fn read_binding(
    annotation: &AnnotationUse,
    fixed_verb: Option<Verb>,
    source: &SourceRef,
) -> Result<ResolvedBinding, ShapeError> {
    let mut paths: Vec<String> = Vec::new();
    let mut verb_list: Option<Vec<Verb>> = None;
    let mut seen_positional = false;
    let mut seen_named: Vec<&str> = Vec::new();

    for arg in &annotation.args {
        match arg.name.as_deref() {
            None => {
                if seen_positional {
                    return Err(ShapeError::MultiplePositional);
                }
                seen_positional = true;
                paths.extend(path_fragments(&arg.value)?);
            }
            Some(name) => {
                if seen_named.contains(&name) {
                    return Err(ShapeError::DuplicateAttribute(name.to_string()));
                }
                seen_named.push(name);

                if PATH_ATTRIBUTES.contains(&name) {
                    paths.extend(path_fragments(&arg.value)?);
                } else if name == VERB_ATTRIBUTE {
                    if fixed_verb.is_some() {
                        return Err(ShapeError::VerbListOnVerbMapping);
                    }
                    verb_list = Some(verbs(&arg.value)?);
                }
                // produces, consumes, params, headers, name: no effect on routing
            }
        }
    }

    let verbs = match (fixed_verb, verb_list) {
        (Some(verb), _) => vec![verb],
        (None, Some(list)) if !list.is_empty() => list,
        (None, _) => vec![Verb::Any],
    };

    if paths.is_empty() {
        paths.push(String::new());
    }
    dedup_in_order(&mut paths);

    Ok(ResolvedBinding {
        verbs,
        paths,
        source: source.clone(),
    })
}

fn path_fragments(value: &ArgValue) -> Result<Vec<String>, ShapeError> {
    match value {
        ArgValue::Str(path) => Ok(vec![path.clone()]),
        ArgValue::Array(items) => items
            .iter()
            .map(|item| match item {
                ArgValue::Str(path) => Ok(path.clone()),
                ArgValue::Symbol(raw) | ArgValue::Expr(raw) => {
                    Err(ShapeError::UnresolvedPath(raw.clone()))
                }
                ArgValue::Array(_) => Err(ShapeError::UnexpectedPathValue("nested array")),
            })
            .collect(),
        ArgValue::Symbol(raw) | ArgValue::Expr(raw) => Err(ShapeError::UnresolvedPath(raw.clone())),
    }
}

/// An empty list means every verb.
fn verbs(value: &ArgValue) -> Result<Vec<Verb>, ShapeError> {
    let mut verbs = match value {
        ArgValue::Symbol(symbol) => vec![verb_symbol(symbol)?],
        ArgValue::Array(items) => items
            .iter()
            .map(|item| match item {
                ArgValue::Symbol(symbol) => verb_symbol(symbol),
                other => Err(ShapeError::UnexpectedVerbValue(other.describe())),
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(ShapeError::UnexpectedVerbValue(other.describe())),
    };
    verbs.sort();
    verbs.dedup();
    Ok(verbs)
}

fn verb_symbol(symbol: &str) -> Result<Verb, ShapeError> {
    Verb::from_symbol(symbol).ok_or_else(|| ShapeError::UnknownVerb(symbol.to_string()))
}

fn dedup_in_order(paths: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
}

// ── Class / method level ─────────────────────────────────────────────────────

/// Bindings declared on one method, plus diagnostics for the ones dropped.
pub fn resolve_method(
    unit_id: &str,
    class: &ClassNode,
    method: &MethodNode,
) -> (Vec<ResolvedBinding>, Vec<Diagnostic>) {
    let mut bindings = Vec::new();
    let mut diagnostics = Vec::new();
    for annotation in &method.annotations {
        let source = SourceRef::unit(unit_id, annotation.line)
            .with_class(class.qualified_name.clone())
            .with_method(method.name.clone());
        match resolve_annotation(annotation, &source) {
            Ok(Some(binding)) => bindings.push(binding),
            Ok(None) => {}
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }
    (bindings, diagnostics)
}

/// Base path fragments contributed by class-level mappings.
///
/// Falls back to a single `""` when the class declares no usable mapping.
/// Class-level verb lists do not narrow method verbs.
pub fn resolve_class_bases(unit_id: &str, class: &ClassNode) -> (Vec<String>, Vec<Diagnostic>) {
    let mut bases = Vec::new();
    let mut diagnostics = Vec::new();
    for annotation in &class.annotations {
        let source = SourceRef::unit(unit_id, annotation.line).with_class(class.qualified_name.clone());
        match resolve_annotation(annotation, &source) {
            Ok(Some(binding)) => bases.extend(binding.paths),
            Ok(None) => {}
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }
    if bases.is_empty() {
        bases.push(String::new());
    }
    dedup_in_order(&mut bases);
    (bases, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Argument;
    use crate::table::Severity;

    fn annotation(kind: AnnotationKind, args: Vec<Argument>) -> AnnotationUse {
        AnnotationUse {
            name: "Mapping".to_string(),
            kind,
            args,
            line: 7,
        }
    }

    fn src() -> SourceRef {
        SourceRef::unit("Ctl.java", 7)
            .with_class("Ctl")
            .with_method("handle")
    }

    fn resolve(kind: AnnotationKind, args: Vec<Argument>) -> Result<Option<ResolvedBinding>, Diagnostic> {
        resolve_annotation(&annotation(kind, args), &src())
    }

    fn s(v: &str) -> ArgValue {
        ArgValue::Str(v.to_string())
    }

    fn sym(v: &str) -> ArgValue {
        ArgValue::Symbol(v.to_string())
    }

    #[test]
    fn test_verb_mapping_without_arguments() {
        let binding = resolve(AnnotationKind::Mapping(Verb::Get), vec![]).unwrap().unwrap();
        assert_eq!(binding.verbs, vec![Verb::Get]);
        assert_eq!(binding.paths, vec![""]);
    }

    #[test]
    fn test_verb_mapping_path_forms() {
        let positional = resolve(
            AnnotationKind::Mapping(Verb::Post),
            vec![Argument::positional(s("/items"))],
        )
        .unwrap()
        .unwrap();
        assert_eq!(positional.paths, vec!["/items"]);

        let named = resolve(
            AnnotationKind::Mapping(Verb::Post),
            vec![
                Argument::named("path", ArgValue::Array(vec![s("/a"), s("/b"), s("/a")])),
                Argument::named("produces", sym("MediaType.APPLICATION_JSON_VALUE")),
            ],
        )
        .unwrap()
        .unwrap();
        assert_eq!(named.verbs, vec![Verb::Post]);
        assert_eq!(named.paths, vec!["/a", "/b"]);
    }

    #[test]
    fn test_generic_mapping_with_verbs() {
        let binding = resolve(
            AnnotationKind::GenericMapping,
            vec![
                Argument::named("value", ArgValue::Array(vec![s("/fallback"), s("/legacy")])),
                Argument::named("method", sym("RequestMethod.PUT")),
            ],
        )
        .unwrap()
        .unwrap();
        assert_eq!(binding.verbs, vec![Verb::Put]);
        assert_eq!(binding.paths, vec!["/fallback", "/legacy"]);
    }

    #[test]
    fn test_generic_mapping_without_verbs_is_any() {
        let binding = resolve(AnnotationKind::GenericMapping, vec![Argument::positional(s("/x"))])
            .unwrap()
            .unwrap();
        assert_eq!(binding.verbs, vec![Verb::Any]);

        let empty = resolve(
            AnnotationKind::GenericMapping,
            vec![Argument::named("method", ArgValue::Array(vec![]))],
        )
        .unwrap()
        .unwrap();
        assert_eq!(empty.verbs, vec![Verb::Any]);
    }

    #[test]
    fn test_generic_mapping_verb_array() {
        let binding = resolve(
            AnnotationKind::GenericMapping,
            vec![Argument::named(
                "method",
                ArgValue::Array(vec![sym("RequestMethod.POST"), sym("GET"), sym("POST")]),
            )],
        )
        .unwrap()
        .unwrap();
        assert_eq!(binding.verbs, vec![Verb::Get, Verb::Post]);
    }

    #[test]
    fn test_non_mapping_is_ignored() {
        assert_eq!(resolve(AnnotationKind::Other, vec![Argument::positional(sym("X"))]), Ok(None));
        assert_eq!(resolve(AnnotationKind::Unrecognized, vec![]), Ok(None));
    }

    #[test]
    fn test_malformed_shapes_are_errors() {
        let cases = vec![
            (
                AnnotationKind::Mapping(Verb::Get),
                vec![Argument::named("method", sym("RequestMethod.GET"))],
            ),
            (
                AnnotationKind::Mapping(Verb::Get),
                vec![Argument::positional(ArgValue::Expr("BASE + \"/x\"".into()))],
            ),
            (AnnotationKind::Mapping(Verb::Get), vec![Argument::positional(sym("Paths.ROOT"))]),
            (
                AnnotationKind::Mapping(Verb::Get),
                vec![Argument::positional(s("/a")), Argument::positional(s("/b"))],
            ),
            (
                AnnotationKind::GenericMapping,
                vec![Argument::named("method", sym("RequestMethod.HEAD"))],
            ),
            (AnnotationKind::GenericMapping, vec![Argument::named("method", s("PUT"))]),
            (
                AnnotationKind::GenericMapping,
                vec![Argument::named("path", s("/a")), Argument::named("path", s("/b"))],
            ),
        ];
        for (kind, args) in cases {
            let err = resolve(kind, args).unwrap_err();
            assert_eq!(err.severity, Severity::Error);
            assert_eq!(err.source_ref, "Ctl.java:7 Ctl.handle");
            assert!(err.message.starts_with("@Mapping: "));
        }
    }

    #[test]
    fn test_class_bases() {
        let mut class = ClassNode::new(
            "Ctl",
            vec![annotation(
                AnnotationKind::GenericMapping,
                vec![Argument::positional(ArgValue::Array(vec![s("/v1"), s("/v2")]))],
            )],
            1,
        );
        let (bases, diags) = resolve_class_bases("Ctl.java", &class);
        assert_eq!(bases, vec!["/v1", "/v2"]);
        assert!(diags.is_empty());

        class.annotations.clear();
        let (bases, _) = resolve_class_bases("Ctl.java", &class);
        assert_eq!(bases, vec![""]);
    }

    #[test]
    fn test_method_collects_every_mapping() {
        let class = ClassNode::new("Ctl", vec![], 1);
        let method = MethodNode {
            name: "handle".into(),
            annotations: vec![
                annotation(AnnotationKind::Mapping(Verb::Get), vec![Argument::positional(s("/a"))]),
                annotation(AnnotationKind::Other, vec![]),
                annotation(
                    AnnotationKind::Mapping(Verb::Post),
                    vec![Argument::positional(sym("CONST"))],
                ),
                annotation(AnnotationKind::Mapping(Verb::Delete), vec![]),
            ],
            params: vec![],
            line: 8,
        };
        let (bindings, diags) = resolve_method("Ctl.java", &class, &method);
        assert_eq!(bindings.len(), 2);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("CONST"));
    }
}
