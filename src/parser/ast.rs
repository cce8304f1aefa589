//
//  ast.rs
//  Anchor
//
//  Created by hak (tharun)
//

use crate::table::{Diagnostic, Verb};

/// What an annotation means for route extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// Verb-specific mapping (`@GetMapping`, …). Always a concrete verb.
    Mapping(Verb),
    /// Generic mapping with an optional verb list (`@RequestMapping`).
    GenericMapping,
    /// Controller stereotype (`@RestController`, `@Controller`).
    Stereotype,
    /// Any other well-formed annotation. Ignored.
    Other,
    /// Annotation whose syntax could not be read.
    Unrecognized,
}

impl AnnotationKind {
    pub fn is_mapping(self) -> bool {
        matches!(self, AnnotationKind::Mapping(_) | AnnotationKind::GenericMapping)
    }
}

/// One annotation argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// A string literal, decoded.
    Str(String),
    /// A bare or qualified name: `PUT`, `RequestMethod.PUT`, `Paths.ROOT`.
    Symbol(String),
    /// `{a, b, ...}`
    Array(Vec<ArgValue>),
    /// Anything else, kept as raw source text (`"/a" + BASE`, `42`, `@Nested(...)`).
    Expr(String),
}

impl ArgValue {
    pub fn describe(&self) -> &'static str {
        match self {
            ArgValue::Str(_) => "string",
            ArgValue::Symbol(_) => "symbol",
            ArgValue::Array(_) => "array",
            ArgValue::Expr(_) => "expression",
        }
    }
}

/// Positional (`name == None`) or named argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: ArgValue,
}

impl Argument {
    pub fn positional(value: ArgValue) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: ArgValue) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// One annotation occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationUse {
    /// Name as written, possibly qualified.
    pub name: String,
    pub kind: AnnotationKind,
    pub args: Vec<Argument>,
    pub line: u32,
}

impl AnnotationUse {
    /// Last segment of the name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }
}

pub(crate) fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodNode {
    pub name: String,
    pub annotations: Vec<AnnotationUse>,
    /// Declared parameter types as written (`long`, `List<String>`).
    pub params: Vec<String>,
    pub line: u32,
}

/// A class-like declaration. Nested declarations are separate nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    pub name: String,
    /// Name qualified by enclosing classes (`Outer.Inner`).
    pub qualified_name: String,
    pub annotations: Vec<AnnotationUse>,
    pub methods: Vec<MethodNode>,
    pub line: u32,
}

impl ClassNode {
    pub fn new(name: impl Into<String>, annotations: Vec<AnnotationUse>, line: u32) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.clone(),
            name,
            annotations,
            methods: Vec::new(),
            line,
        }
    }

    /// Nest this class inside `outer`.
    pub fn within(mut self, outer: &ClassNode) -> Self {
        self.qualified_name = format!("{}.{}", outer.qualified_name, self.name);
        self
    }

    /// True if another method of this class shares `name`.
    pub fn is_overloaded(&self, name: &str) -> bool {
        self.methods.iter().filter(|m| m.name == name).count() > 1
    }

    pub fn is_controller(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| a.kind == AnnotationKind::Stereotype)
    }
}

/// Syntax tree of one source unit.
#[derive(Debug, Clone, Default)]
pub struct ParsedUnit {
    pub package: Option<String>,
    pub classes: Vec<ClassNode>,
    pub diagnostics: Vec<Diagnostic>,
}
