use std::fmt::Display;
use std::ops::Range;

use logos::Logos;

use crate::diag::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token<'a> {
    // Top-level
    #[token("package")]
    Package,
    #[token("world")]
    World,
    #[token("interface")]
    Interface,
    // Statements
    #[token("use")]
    Use,
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("include")]
    Include,
    #[token("as")]
    As,
    #[token("with")]
    With,
    // Type definitions
    #[token("type")]
    Type,
    #[token("record")]
    Record,
    #[token("variant")]
    Variant,
    #[token("enum")]
    Enum,
    #[token("flags")]
    Flags,
    #[token("resource")]
    Resource,
    #[token("constructor")]
    Constructor,
    #[token("method")]
    Method,
    #[token("static")]
    Static,
    #[token("func")]
    Func,
    // Type constructors
    #[token("option")]
    Option,
    #[token("result")]
    Result,
    #[token("tuple")]
    Tuple,
    #[token("list")]
    List,
    #[token("own")]
    Own,
    #[token("borrow")]
    Borrow,
    #[token("stream")]
    Stream,
    #[token("future")]
    Future,
    // Punctuation
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Period,
    #[token("/")]
    Slash,
    #[token("@")]
    At,
    #[token("=")]
    Equals,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("->")]
    RightArrow,
    #[token("*")]
    Star,
    #[token("_")]
    Underscore,
    // Literals
    #[regex(r"[0-9]+\.[0-9]+\.[0-9]+(?:[-+.][0-9a-zA-Z-]+)*")]
    SemVer(&'a str),
    #[regex("[0-9]+")]
    Integer(&'a str),
    #[regex("[a-zA-Z][a-zA-Z0-9_-]*")]
    Identifier(&'a str),
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Token::*;
        match self {
            Package => "package",
            World => "world",
            Interface => "interface",
            Use => "use",
            Import => "import",
            Export => "export",
            Include => "include",
            As => "as",
            With => "with",
            Type => "type",
            Record => "record",
            Variant => "variant",
            Enum => "enum",
            Flags => "flags",
            Resource => "resource",
            Constructor => "constructor",
            Method => "method",
            Static => "static",
            Func => "func",
            Option => "option",
            Result => "result",
            Tuple => "tuple",
            List => "list",
            Own => "own",
            Borrow => "borrow",
            Stream => "stream",
            Future => "future",
            Colon => ":",
            Semicolon => ";",
            Comma => ",",
            Period => ".",
            Slash => "/",
            At => "@",
            Equals => "=",
            LeftParen => "(",
            RightParen => ")",
            LeftBrace => "{",
            RightBrace => "}",
            LessThan => "<",
            GreaterThan => ">",
            RightArrow => "->",
            Star => "*",
            Underscore => "_",
            SemVer(text) => *text,
            Integer(text) => *text,
            Identifier(id) => *id,
        }
        .fmt(f)
    }
}

/// Byte-offset to 1-based line/column mapping for a source file.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> (u32, u32) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let column = offset - self.line_starts[line];
        (line as u32 + 1, column as u32 + 1)
    }
}

/// Tokenizes a whole file up front. Unlexable input becomes a positioned
/// error; the surrounding tokens are still returned so the parser can keep
/// collecting its own diagnostics.
pub fn tokenize(source: &str) -> (Vec<(Token<'_>, Range<usize>)>, Vec<ParseError>) {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                let (line, column) = index.position(span.start);
                errors.push(ParseError::new(
                    line,
                    column,
                    format!("unexpected character `{}`", &source[span.clone()]),
                ));
            }
        }
    }
    (tokens, errors)
}
