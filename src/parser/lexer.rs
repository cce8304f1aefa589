//
//  lexer.rs
//  Anchor
//
//  Created by hak (tharun)
//

//! Structural tokenizer for annotated controller sources.
//!
//! The lexer only needs to be good enough to find class declarations,
//! method headers and annotation argument lists. Everything else is
//! passed through as `Other` tokens. Comments and whitespace are dropped.

/// Kinds of tokens the structural parser cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// String literal or text block, terminated.
    Str,
    /// String literal that hit a line break or EOF before its closing quote.
    UnterminatedStr,
    Char,
    Number,
    At,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semi,
    Eq,
    Other,
}

impl TokenKind {
    pub fn is_open(self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket)
    }

    pub fn is_close(self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket)
    }
}

/// A token borrowing its text from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Raw text, including quotes for string literals.
    pub text: &'src str,
    /// Byte offset of the first character.
    pub start: usize,
    /// 1-based line of the first character.
    pub line: u32,
}

impl<'src> Token<'src> {
    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    /// Decoded value of a terminated string literal.
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::Str {
            return None;
        }
        if let Some(body) = self
            .text
            .strip_prefix("\"\"\"")
            .and_then(|t| t.strip_suffix("\"\"\""))
        {
            return Some(text_block_value(body));
        }
        let body = &self.text[1..self.text.len() - 1];
        Some(unescape(body))
    }
}

/// Lazy token stream over a source buffer.
///
/// The lexer is `Clone`, so a stream can be restarted from any point by
/// cloning it, or from the beginning with [`Lexer::reset`].
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
    line: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.line = 1;
    }

    fn peek_byte(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Skip whitespace and comments. Unterminated block comments run to EOF.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.bump_char();
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.bump_char();
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        match self.peek_byte() {
                            None => break,
                            Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            _ => {
                                self.bump_char();
                            }
                        }
                    }
                }
                Some(_) => {
                    // Non-ASCII whitespace (e.g. NBSP) is trivia too.
                    match self.peek_char() {
                        Some(c) if c.is_whitespace() => {
                            self.bump_char();
                        }
                        _ => return,
                    }
                }
                None => return,
            }
        }
    }

    fn lex_string(&mut self) -> TokenKind {
        if self.src[self.pos..].starts_with("\"\"\"") {
            return self.lex_text_block();
        }
        self.pos += 1;
        loop {
            match self.peek_char() {
                None | Some('\n') | Some('\r') => return TokenKind::UnterminatedStr,
                Some('\\') => {
                    self.bump_char();
                    // An escaped line break still ends the literal.
                    match self.peek_char() {
                        None | Some('\n') | Some('\r') => return TokenKind::UnterminatedStr,
                        _ => {
                            self.bump_char();
                        }
                    }
                }
                Some('"') => {
                    self.pos += 1;
                    return TokenKind::Str;
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
    }

    fn lex_text_block(&mut self) -> TokenKind {
        self.pos += 3;
        loop {
            if self.src[self.pos..].starts_with("\"\"\"") {
                self.pos += 3;
                return TokenKind::Str;
            }
            match self.bump_char() {
                None => return TokenKind::UnterminatedStr,
                Some('\\') => {
                    self.bump_char();
                }
                Some(_) => {}
            }
        }
    }

    fn lex_char(&mut self) -> TokenKind {
        self.pos += 1;
        loop {
            match self.peek_char() {
                None | Some('\n') => return TokenKind::Other,
                Some('\\') => {
                    self.bump_char();
                    self.bump_char();
                }
                Some('\'') => {
                    self.pos += 1;
                    return TokenKind::Char;
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        self.skip_trivia();
        let start = self.pos;
        let line = self.line;
        let c = self.peek_char()?;

        let kind = match c {
            '"' => self.lex_string(),
            '\'' => self.lex_char(),
            c if is_ident_start(c) => {
                while self.peek_char().is_some_and(is_ident_continue) {
                    self.bump_char();
                }
                TokenKind::Ident
            }
            c if c.is_ascii_digit() => {
                while self
                    .peek_char()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
                {
                    self.bump_char();
                }
                TokenKind::Number
            }
            _ => {
                self.bump_char();
                match c {
                    '@' => TokenKind::At,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    ',' => TokenKind::Comma,
                    '.' => TokenKind::Dot,
                    ';' => TokenKind::Semi,
                    '=' => TokenKind::Eq,
                    _ => TokenKind::Other,
                }
            }
        };

        Some(Token {
            kind,
            text: &self.src[start..self.pos],
            start,
            line,
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Decode backslash escapes. Unknown escapes keep the escaped character.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                let max_digits = if d <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Text block content: drop the opening line break and common indentation.
fn text_block_value(body: &str) -> String {
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    let indent = body
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let joined = body
        .lines()
        .map(|l| l.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    unescape(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(|t| t.kind).collect()
    }

    #[test]
    fn test_annotation_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"@GetMapping(value = {"/a", "/b"})"#),
            vec![At, Ident, LParen, Ident, Eq, LBrace, Str, Comma, Str, RBrace, RParen]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens: Vec<_> = Lexer::new("// @GetMapping\n/* @PostMapping */ class A {}")
            .map(|t| t.text)
            .collect();
        assert_eq!(tokens, vec!["class", "A", "{", "}"]);
    }

    #[test]
    fn test_escaped_string() {
        let tok = Lexer::new(r#""/a\"b\\cA""#).next().unwrap();
        assert_eq!(tok.kind, TokenKind::Str);
        assert_eq!(tok.string_value().as_deref(), Some("/a\"b\\cA"));
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let tokens: Vec<_> = Lexer::new("\"/oops\nclass").collect();
        assert_eq!(tokens[0].kind, TokenKind::UnterminatedStr);
        assert!(tokens[1].is_ident("class"));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_text_block() {
        let src = "\"\"\"\n    /docs\n    \"\"\"";
        let tok = Lexer::new(src).next().unwrap();
        assert_eq!(tok.kind, TokenKind::Str);
        assert_eq!(tok.string_value().as_deref(), Some("/docs\n"));
    }

    #[test]
    fn test_char_literal_with_brace() {
        use TokenKind::*;
        assert_eq!(kinds("c = '{';"), vec![Ident, Eq, Char, Semi]);
    }

    #[test]
    fn test_lines_are_tracked() {
        let lines: Vec<_> = Lexer::new("a\n\nb /* x\n */ c").map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
    }

    #[test]
    fn test_lexer_restarts() {
        let mut lexer = Lexer::new("@A class B");
        let first: Vec<_> = lexer.by_ref().collect();
        lexer.reset();
        let second: Vec<_> = lexer.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}
