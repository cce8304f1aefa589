//
//  structure.rs
//  Anchor
//
//  Created by hak (tharun)
//

//! Structural parser: tokens → classes, methods and their annotations.
//!
//! Only declaration headers are understood. Method bodies, field
//! initializers, initializer blocks and parameter lists are skipped as
//! balanced bracket runs, so unfamiliar syntax inside them never matters.

use tracing::debug;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use super::AnnotationCatalog;
use crate::source::SourceUnit;
use crate::table::{Diagnostic, SourceRef};

/// Words that can precede `(` in a member header without naming a method.
const NON_METHOD_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "new", "throw", "assert",
    "super", "this",
];

/// Parse one source unit into its class nodes.
pub fn parse_unit(unit: &SourceUnit, catalog: &AnnotationCatalog) -> ParsedUnit {
    let tokens: Vec<Token<'_>> = Lexer::new(unit.text()).collect();
    let mut parser = StructureParser {
        src: unit.text(),
        unit_id: unit.id(),
        tokens,
        pos: 0,
        catalog,
        classes: Vec::new(),
        diagnostics: Vec::new(),
        package: unit.package().map(str::to_string),
    };
    parser.parse_members(None, false);

    debug!(
        unit = unit.id(),
        classes = parser.classes.len(),
        warnings = parser.diagnostics.len(),
        "parsed source unit"
    );

    ParsedUnit {
        package: parser.package,
        classes: parser.classes,
        diagnostics: parser.diagnostics,
    }
}

struct StructureParser<'a, 'src> {
    src: &'src str,
    unit_id: &'a str,
    tokens: Vec<Token<'src>>,
    pos: usize,
    catalog: &'a AnnotationCatalog,
    classes: Vec<ClassNode>,
    diagnostics: Vec<Diagnostic>,
    package: Option<String>,
}

impl<'a, 'src> StructureParser<'a, 'src> {
    // ─── Cursor ─────────────────────────────────────────────────

    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token<'src>> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    /// Skip an opener and everything up to its matching closer.
    /// Bracket kinds are not cross-checked; broken input just unwinds at EOF.
    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.bump() {
            if tok.kind.is_open() {
                depth += 1;
            } else if tok.kind.is_close() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
    }

    /// Skip to the end of a statement, stopping before an unmatched `}`.
    fn skip_statement(&mut self) {
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Semi => {
                    self.pos += 1;
                    return;
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => return,
                k if k.is_open() => self.skip_balanced(),
                _ => self.pos += 1,
            }
        }
    }

    fn source_ref(&self, line: u32, class_slot: Option<usize>) -> SourceRef {
        let src = SourceRef::unit(self.unit_id, line);
        match class_slot.and_then(|slot| self.classes.get(slot)) {
            Some(class) => src.with_class(class.qualified_name.clone()),
            None => src,
        }
    }

    // ─── Declarations ───────────────────────────────────────────

    /// Parse declarations until the closing brace of the current body
    /// (consumed) or EOF. `class_slot` is `None` at file level.
    fn parse_members(&mut self, class_slot: Option<usize>, enum_body: bool) {
        if enum_body {
            self.skip_enum_constants(class_slot);
        }
        let mut pending: Vec<AnnotationUse> = Vec::new();

        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    if class_slot.is_some() {
                        return;
                    }
                    pending.clear();
                }
                TokenKind::Semi => {
                    self.pos += 1;
                    pending.clear();
                }
                TokenKind::LBrace => {
                    // Initializer block.
                    self.skip_balanced();
                    pending.clear();
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    self.pos += 1;
                }
                TokenKind::Ident if class_slot.is_none() && tok.text == "package" => {
                    self.parse_package();
                    pending.clear();
                }
                TokenKind::Ident if class_slot.is_none() && tok.text == "import" => {
                    self.skip_statement();
                    pending.clear();
                }
                _ => {
                    let annotations = std::mem::take(&mut pending);
                    self.parse_member(class_slot, annotations);
                }
            }
        }
    }

    /// One member: a nested class, a method, a field, or something skippable.
    /// Annotations seen before or among the modifiers attach to it.
    fn parse_member(&mut self, class_slot: Option<usize>, mut annotations: Vec<AnnotationUse>) {
        let mut prev: Option<Token<'src>> = None;

        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::At => {
                    if self.peek_at(1).is_some_and(|t| t.is_ident("interface")) {
                        self.pos += 1;
                        self.parse_class(class_slot, annotations);
                        return;
                    }
                    let annotation = self.parse_annotation(class_slot);
                    annotations.push(annotation);
                }
                TokenKind::Ident if self.at_class_keyword() => {
                    self.parse_class(class_slot, annotations);
                    return;
                }
                TokenKind::LParen => {
                    let name = prev
                        .filter(|p| p.kind == TokenKind::Ident)
                        .filter(|p| !NON_METHOD_WORDS.contains(&p.text));
                    let params = self.parse_parameter_types();
                    self.skip_method_tail();
                    if let (Some(slot), Some(name)) = (class_slot, name) {
                        self.classes[slot].methods.push(MethodNode {
                            name: name.text.to_string(),
                            annotations,
                            params,
                            line: name.line,
                        });
                    }
                    return;
                }
                TokenKind::Eq => {
                    self.skip_statement();
                    return;
                }
                TokenKind::Semi => {
                    self.pos += 1;
                    return;
                }
                TokenKind::LBrace => {
                    self.skip_balanced();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    prev = Some(tok);
                    self.pos += 1;
                }
            }
        }
    }

    /// Consume a parameter list starting at `(` and return each
    /// parameter's type text, annotations and modifiers removed.
    fn parse_parameter_types(&mut self) -> Vec<String> {
        let open = self.pos;
        self.skip_balanced();
        let end = self.pos;
        let close = match self.tokens.get(end - 1) {
            Some(t) if t.kind == TokenKind::RParen && end - 1 > open => end - 1,
            _ => end,
        };

        let mut params = Vec::new();
        let mut depth = 0usize;
        let mut from = open + 1;
        for i in open + 1..close {
            let tok = self.tokens[i];
            match tok.kind {
                k if k.is_open() => depth += 1,
                k if k.is_close() => depth = depth.saturating_sub(1),
                TokenKind::Other if tok.text == "<" => depth += 1,
                TokenKind::Other if tok.text == ">" => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    params.extend(parameter_type(&self.tokens[from..i]));
                    from = i + 1;
                }
                _ => {}
            }
        }
        params.extend(parameter_type(&self.tokens[from..close]));
        params
    }

    /// After a parameter list: `throws …`, array dims, `default …`, then a
    /// body or `;`.
    fn skip_method_tail(&mut self) {
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::LBrace => {
                    self.skip_balanced();
                    return;
                }
                TokenKind::Semi => {
                    self.pos += 1;
                    return;
                }
                TokenKind::RBrace => return,
                TokenKind::LParen | TokenKind::LBracket => self.skip_balanced(),
                _ => self.pos += 1,
            }
        }
    }

    fn at_class_keyword(&self) -> bool {
        let Some(tok) = self.peek() else {
            return false;
        };
        let named = self
            .peek_at(1)
            .is_some_and(|t| t.kind == TokenKind::Ident);
        match tok.text {
            "class" | "interface" | "enum" => named,
            // `record` is contextual: `record Name(` or `record Name<`.
            "record" => {
                named
                    && self
                        .peek_at(2)
                        .is_some_and(|t| t.kind == TokenKind::LParen || t.text == "<")
            }
            _ => false,
        }
    }

    /// Parse a class-like declaration starting at its keyword.
    fn parse_class(&mut self, outer: Option<usize>, annotations: Vec<AnnotationUse>) {
        let Some(keyword) = self.bump() else {
            return;
        };
        let is_enum = keyword.text == "enum";
        let Some(name) = self.peek().filter(|t| t.kind == TokenKind::Ident) else {
            return;
        };
        self.pos += 1;

        // Header: type parameters, record components, extends/implements.
        loop {
            match self.peek_kind() {
                Some(TokenKind::LBrace) => break,
                Some(TokenKind::LParen) => self.skip_balanced(),
                Some(TokenKind::At) => {
                    self.parse_annotation(outer);
                }
                Some(TokenKind::Semi) => {
                    self.pos += 1;
                    return;
                }
                Some(TokenKind::RBrace) | None => return,
                Some(_) => self.pos += 1,
            }
        }
        self.pos += 1;

        let mut class = ClassNode::new(name.text, annotations, keyword.line);
        if let Some(enclosing) = outer.and_then(|slot| self.classes.get(slot)) {
            class = class.within(enclosing);
        }
        let slot = self.classes.len();
        self.classes.push(class);
        self.parse_members(Some(slot), is_enum);
    }

    /// Enum constants run up to the first top-level `;` or the closing brace.
    fn skip_enum_constants(&mut self, class_slot: Option<usize>) {
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Semi => {
                    self.pos += 1;
                    return;
                }
                TokenKind::RBrace => return,
                TokenKind::At => {
                    self.parse_annotation(class_slot);
                }
                k if k.is_open() => self.skip_balanced(),
                _ => self.pos += 1,
            }
        }
    }

    fn parse_package(&mut self) {
        self.pos += 1;
        let mut name = String::new();
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Ident | TokenKind::Dot => {
                    name.push_str(tok.text);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        self.skip_statement();
        if self.package.is_none() && !name.is_empty() {
            self.package = Some(name);
        }
    }

    // ─── Annotations ────────────────────────────────────────────

    /// Parse `@Name`, `@a.b.Name` or `@Name(args)` starting at `@`.
    fn parse_annotation(&mut self, class_slot: Option<usize>) -> AnnotationUse {
        let at = self.bump().map(|t| t.line).unwrap_or_default();

        let mut name = String::new();
        while let Some(tok) = self.peek() {
            let expect_ident = name.is_empty() || name.ends_with('.');
            match tok.kind {
                TokenKind::Ident if expect_ident => name.push_str(tok.text),
                TokenKind::Dot if !expect_ident => name.push('.'),
                _ => break,
            }
            self.pos += 1;
        }

        if name.is_empty() || name.ends_with('.') {
            return self.unrecognized(name, at, class_slot, "missing annotation name");
        }

        let kind = self.catalog.classify(&name);
        if self.peek_kind() != Some(TokenKind::LParen) {
            return AnnotationUse {
                name,
                kind,
                args: Vec::new(),
                line: at,
            };
        }

        match self.parse_arguments() {
            Ok(args) => AnnotationUse {
                name,
                kind,
                args,
                line: at,
            },
            Err(reason) => self.unrecognized(name, at, class_slot, reason),
        }
    }

    fn unrecognized(
        &mut self,
        name: String,
        line: u32,
        class_slot: Option<usize>,
        reason: &str,
    ) -> AnnotationUse {
        let source = self.source_ref(line, class_slot);
        self.diagnostics.push(Diagnostic::warning(
            format!("unrecognized annotation shape `@{name}`: {reason}"),
            &source,
        ));
        AnnotationUse {
            name,
            kind: AnnotationKind::Unrecognized,
            args: Vec::new(),
            line,
        }
    }

    /// Parse a parenthesized argument list starting at `(`.
    ///
    /// On failure the cursor is left at the offending token (a `;`, an
    /// unmatched closer or EOF), never past it.
    fn parse_arguments(&mut self) -> Result<Vec<Argument>, &'static str> {
        self.pos += 1;
        let mut groups: Vec<Vec<Token<'src>>> = vec![Vec::new()];
        let mut stack: Vec<TokenKind> = Vec::new();

        loop {
            let Some(tok) = self.peek() else {
                return Err("unterminated argument list");
            };
            match tok.kind {
                TokenKind::Semi => return Err("unterminated argument list"),
                TokenKind::UnterminatedStr => {
                    self.pos += 1;
                    return Err("unterminated string literal");
                }
                TokenKind::RParen if stack.is_empty() => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Comma if stack.is_empty() => {
                    groups.push(Vec::new());
                    self.pos += 1;
                    continue;
                }
                k if k.is_open() => stack.push(closer_for(k)),
                k if k.is_close() => {
                    if stack.pop() != Some(k) {
                        return Err("unbalanced brackets in argument list");
                    }
                }
                _ => {}
            }
            if let Some(group) = groups.last_mut() {
                group.push(tok);
            }
            self.pos += 1;
        }

        if groups.len() == 1 && groups[0].is_empty() {
            return Ok(Vec::new());
        }
        groups
            .iter()
            .map(|group| self.argument(group))
            .collect()
    }

    fn argument(&self, tokens: &[Token<'src>]) -> Result<Argument, &'static str> {
        match tokens {
            [] => Err("empty argument"),
            [name, eq, value @ ..] if name.kind == TokenKind::Ident && eq.kind == TokenKind::Eq => {
                // `a == b` is an expression, not a named argument.
                if value.first().is_some_and(|t| t.kind == TokenKind::Eq) {
                    return Ok(Argument::positional(self.value(tokens)?));
                }
                Ok(Argument::named(name.text, self.value(value)?))
            }
            _ => Ok(Argument::positional(self.value(tokens)?)),
        }
    }

    fn value(&self, tokens: &[Token<'src>]) -> Result<ArgValue, &'static str> {
        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Err("missing argument value");
        };

        if tokens.len() == 1 && first.kind == TokenKind::Str {
            return Ok(ArgValue::Str(first.string_value().unwrap_or_default()));
        }

        if first.kind == TokenKind::LBrace
            && last.kind == TokenKind::RBrace
            && matching_close(tokens) == Some(tokens.len() - 1)
        {
            let inner = &tokens[1..tokens.len() - 1];
            let mut items = Vec::new();
            let elements = split_top_level(inner);
            let count = elements.len();
            for (i, element) in elements.into_iter().enumerate() {
                // Array initializers allow one trailing comma.
                if element.is_empty() && i + 1 == count {
                    continue;
                }
                items.push(self.value(element)?);
            }
            return Ok(ArgValue::Array(items));
        }

        if is_qualified_name(tokens) {
            let symbol: String = tokens.iter().map(|t| t.text).collect();
            return Ok(ArgValue::Symbol(symbol));
        }

        Ok(ArgValue::Expr(self.src[first.start..last.end()].to_string()))
    }
}

fn closer_for(open: TokenKind) -> TokenKind {
    match open {
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::LBrace => TokenKind::RBrace,
        _ => TokenKind::RBracket,
    }
}

/// Index of the token closing `tokens[0]`.
fn matching_close(tokens: &[Token<'_>]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind.is_open() {
            depth += 1;
        } else if tok.kind.is_close() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split on commas outside nested brackets. An empty input yields no parts.
fn split_top_level<'t, 'src>(tokens: &'t [Token<'src>]) -> Vec<&'t [Token<'src>]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind.is_open() {
            depth += 1;
        } else if tok.kind.is_close() {
            depth = depth.saturating_sub(1);
        } else if tok.kind == TokenKind::Comma && depth == 0 {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// `Ident ( . Ident )*`
fn is_qualified_name(tokens: &[Token<'_>]) -> bool {
    tokens.len() % 2 == 1
        && tokens.iter().enumerate().all(|(i, t)| {
            if i % 2 == 0 {
                t.kind == TokenKind::Ident
            } else {
                t.kind == TokenKind::Dot
            }
        })
}

/// Type text of one parameter: `@PathVariable("id") final long id` → `long`.
fn parameter_type(tokens: &[Token<'_>]) -> Option<String> {
    let mut kept: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        if tok.kind == TokenKind::At {
            // `@` Name (`.` Name)*
            i += 2;
            while tokens.get(i).is_some_and(|t| t.kind == TokenKind::Dot)
                && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Ident)
            {
                i += 2;
            }
            if tokens.get(i).is_some_and(|t| t.kind == TokenKind::LParen) {
                let mut depth = 0usize;
                while let Some(t) = tokens.get(i) {
                    i += 1;
                    if t.kind.is_open() {
                        depth += 1;
                    } else if t.kind.is_close() {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                }
            }
            continue;
        }
        if !tok.is_ident("final") {
            kept.push(tok.text);
        }
        i += 1;
    }

    // The trailing identifier is the parameter name.
    if kept.len() > 1 {
        kept.pop();
    }
    if kept.is_empty() {
        None
    } else {
        Some(kept.concat())
    }
}
