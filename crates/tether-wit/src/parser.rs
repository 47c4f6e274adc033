//! Recursive-descent parser for the WIT surface syntax.
//!
//! The parser never gives up on the first error: each item records its
//! diagnostic and synchronizes on `;` or the enclosing `}`, so a single run
//! reports every problem in the file. Callers treat any accumulated error
//! as fatal for that file.

use std::ops::Range;

use crate::ast::{
    EnumDecl, ExternItem, FlagsDecl, FuncDecl, InterfaceDecl, InterfaceItem, NamedType, RecordDecl,
    ResourceDecl, SourceFile, TopLevelItem, TypeAliasDecl, VariantCaseDecl, VariantDecl, WorldDecl,
    WorldItem,
};
use crate::diag::ParseError;
use crate::lexer::{tokenize, LineIndex, Token};

/// Parses a WIT file into a syntax tree, accumulating every lexer and
/// parser error. A partial tree is returned even on error so that callers
/// can still inspect what parsed.
pub fn parse(source: &str) -> (SourceFile, Vec<ParseError>) {
    let (tokens, mut errors) = tokenize(source);
    let mut parser = Parser {
        tokens,
        pos: 0,
        index: LineIndex::new(source),
        source_len: source.len(),
        errors: Vec::new(),
    };
    let file = parser.parse_file();
    errors.append(&mut parser.errors);
    (file, errors)
}

struct Parser<'a> {
    tokens: Vec<(Token<'a>, Range<usize>)>,
    pos: usize,
    index: LineIndex,
    source_len: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token<'static>, context: &str) -> bool {
        if self.eat(&token) {
            true
        } else {
            let found = match self.peek() {
                Some(other) => format!("`{other}`"),
                None => "end of file".to_string(),
            };
            self.error_here(format!("expected `{token}` {context}, found {found}"));
            false
        }
    }

    fn ident(&mut self, what: &str) -> Option<String> {
        match self.peek() {
            Some(Token::Identifier(id)) => {
                let id = id.to_string();
                self.pos += 1;
                Some(id)
            }
            Some(other) => {
                let message = format!("expected {what}, found `{other}`");
                self.error_here(message);
                None
            }
            None => {
                self.error_here(format!("expected {what}, found end of file"));
                None
            }
        }
    }

    fn error_here(&mut self, message: String) {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source_len);
        let (line, column) = self.index.position(offset);
        self.errors.push(ParseError::new(line, column, message));
    }

    /// Skips to just past the next `;` at the current brace depth, or stops
    /// before a closing `}` so the enclosing block can terminate normally.
    fn recover_item(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::Semicolon if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                Token::LeftBrace => {
                    depth += 1;
                    self.pos += 1;
                }
                Token::RightBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_file(&mut self) -> SourceFile {
        let mut file = SourceFile::default();
        while let Some(token) = self.peek() {
            match token {
                Token::Package => {
                    self.pos += 1;
                    let text = self.take_until_semicolon("in package declaration");
                    // Only the first declaration names the file's package.
                    if file.package.is_none() && !text.is_empty() {
                        file.package = Some(text);
                    }
                }
                Token::Interface => {
                    if let Some(decl) = self.parse_interface() {
                        file.items.push(TopLevelItem::Interface(decl));
                    }
                }
                Token::World => {
                    if let Some(decl) = self.parse_world() {
                        file.items.push(TopLevelItem::World(decl));
                    }
                }
                Token::Use => {
                    self.pos += 1;
                    if let Some(path) = self.parse_use_tail() {
                        file.items.push(TopLevelItem::Use(path));
                    }
                }
                other => {
                    let other = other.clone();
                    self.error_here(format!(
                        "expected `package`, `interface`, `world`, or `use`, found `{other}`"
                    ));
                    self.pos += 1;
                    self.recover_item();
                }
            }
        }
        file
    }

    /// Collects raw token text up to (and through) the next `;`. Used for
    /// the package declaration, which is recorded verbatim.
    fn take_until_semicolon(&mut self, context: &str) -> String {
        let mut text = String::new();
        loop {
            match self.peek() {
                Some(Token::Semicolon) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::LeftBrace) | Some(Token::RightBrace) | None => {
                    self.error_here(format!("expected `;` {context}"));
                    break;
                }
                Some(token) => {
                    text.push_str(&token.to_string());
                    self.pos += 1;
                }
            }
        }
        text
    }

    fn parse_interface(&mut self) -> Option<InterfaceDecl> {
        self.pos += 1; // `interface`
        let Some(name) = self.ident("interface name") else {
            self.recover_item();
            return None;
        };
        if !self.expect(Token::LeftBrace, "after interface name") {
            self.recover_item();
            return None;
        }
        let items = self.parse_interface_items();
        self.expect(Token::RightBrace, "to close interface body");
        Some(InterfaceDecl { name, items })
    }

    fn parse_interface_items(&mut self) -> Vec<InterfaceItem> {
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            match token {
                Token::RightBrace => break,
                Token::Record
                | Token::Variant
                | Token::Enum
                | Token::Flags
                | Token::Type
                | Token::Resource => {
                    if let Some(item) = self.parse_type_def_item() {
                        items.push(item);
                    }
                }
                Token::Use => {
                    self.pos += 1;
                    if let Some(path) = self.parse_use_tail() {
                        items.push(InterfaceItem::Use(path));
                    }
                }
                Token::Identifier(_) => {
                    if let Some(func) = self.parse_func_item() {
                        items.push(InterfaceItem::Func(func));
                    }
                }
                other => {
                    let other = other.clone();
                    self.error_here(format!("unexpected `{other}` in interface body"));
                    self.pos += 1;
                    self.recover_item();
                }
            }
        }
        items
    }

    /// Parses one of the type-definition items shared by interface bodies
    /// and world bodies: `record`, `variant`, `enum`, `flags`, `type`,
    /// `resource`.
    fn parse_type_def_item(&mut self) -> Option<InterfaceItem> {
        match self.peek() {
            Some(Token::Record) => self.parse_record().map(InterfaceItem::Record),
            Some(Token::Variant) => self.parse_variant().map(InterfaceItem::Variant),
            Some(Token::Enum) => self.parse_enum().map(InterfaceItem::Enum),
            Some(Token::Flags) => self.parse_flags().map(InterfaceItem::Flags),
            Some(Token::Type) => self.parse_type_alias().map(InterfaceItem::TypeAlias),
            Some(Token::Resource) => self.parse_resource().map(InterfaceItem::Resource),
            _ => None,
        }
    }

    fn parse_record(&mut self) -> Option<RecordDecl> {
        self.pos += 1; // `record`
        let Some(name) = self.ident("record name") else {
            self.recover_item();
            return None;
        };
        if !self.expect(Token::LeftBrace, "after record name") {
            self.recover_item();
            return None;
        }
        let mut fields = Vec::new();
        while !matches!(self.peek(), Some(Token::RightBrace) | None) {
            let Some(field) = self.parse_named_type("field name") else {
                self.skip_to_close_brace();
                break;
            };
            fields.push(field);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightBrace, "to close record body");
        Some(RecordDecl { name, fields })
    }

    fn parse_named_type(&mut self, what: &str) -> Option<NamedType> {
        let name = self.ident(what)?;
        if !self.expect(Token::Colon, &format!("after {what}")) {
            return None;
        }
        let ty = self.parse_type()?;
        Some(NamedType { name, ty })
    }

    fn parse_variant(&mut self) -> Option<VariantDecl> {
        self.pos += 1; // `variant`
        let Some(name) = self.ident("variant name") else {
            self.recover_item();
            return None;
        };
        if !self.expect(Token::LeftBrace, "after variant name") {
            self.recover_item();
            return None;
        }
        let mut cases = Vec::new();
        while !matches!(self.peek(), Some(Token::RightBrace) | None) {
            let Some(case_name) = self.ident("variant case name") else {
                self.skip_to_close_brace();
                break;
            };
            let mut payload = None;
            if self.eat(&Token::LeftParen) {
                let Some(ty) = self.parse_type() else {
                    self.skip_to_close_brace();
                    break;
                };
                payload = Some(ty);
                if !self.expect(Token::RightParen, "to close variant case payload") {
                    self.skip_to_close_brace();
                    break;
                }
            }
            cases.push(VariantCaseDecl {
                name: case_name,
                payload,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightBrace, "to close variant body");
        Some(VariantDecl { name, cases })
    }

    fn parse_enum(&mut self) -> Option<EnumDecl> {
        self.pos += 1; // `enum`
        let Some(name) = self.ident("enum name") else {
            self.recover_item();
            return None;
        };
        let cases = self.parse_name_list("enum case name")?;
        Some(EnumDecl { name, cases })
    }

    fn parse_flags(&mut self) -> Option<FlagsDecl> {
        self.pos += 1; // `flags`
        let Some(name) = self.ident("flags name") else {
            self.recover_item();
            return None;
        };
        let flags = self.parse_name_list("flag name")?;
        Some(FlagsDecl { name, flags })
    }

    /// Parses `{ a, b, c }` as used by `enum` and `flags` bodies.
    fn parse_name_list(&mut self, what: &str) -> Option<Vec<String>> {
        if !self.expect(Token::LeftBrace, "to begin case list") {
            self.recover_item();
            return None;
        }
        let mut names = Vec::new();
        while !matches!(self.peek(), Some(Token::RightBrace) | None) {
            let Some(name) = self.ident(what) else {
                self.skip_to_close_brace();
                break;
            };
            names.push(name);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightBrace, "to close case list");
        Some(names)
    }

    fn parse_type_alias(&mut self) -> Option<TypeAliasDecl> {
        self.pos += 1; // `type`
        let Some(name) = self.ident("type alias name") else {
            self.recover_item();
            return None;
        };
        if !self.expect(Token::Equals, "after type alias name") {
            self.recover_item();
            return None;
        }
        let Some(ty) = self.parse_type() else {
            self.recover_item();
            return None;
        };
        if !self.expect(Token::Semicolon, "after type alias") {
            self.recover_item();
        }
        Some(TypeAliasDecl { name, ty })
    }

    fn parse_resource(&mut self) -> Option<ResourceDecl> {
        self.pos += 1; // `resource`
        let Some(name) = self.ident("resource name") else {
            self.recover_item();
            return None;
        };
        let mut functions = Vec::new();
        if self.eat(&Token::Semicolon) {
            return Some(ResourceDecl { name, functions });
        }
        if !self.expect(Token::LeftBrace, "after resource name") {
            self.recover_item();
            return None;
        }
        while let Some(token) = self.peek() {
            match token {
                Token::RightBrace => break,
                Token::Constructor => {
                    self.pos += 1;
                    let Some(params) = self.parse_params() else {
                        self.recover_item();
                        continue;
                    };
                    if !self.expect(Token::Semicolon, "after constructor") {
                        self.recover_item();
                    }
                    functions.push(FuncDecl {
                        name: "constructor".to_string(),
                        params,
                        results: Vec::new(),
                    });
                }
                Token::Identifier(_) => {
                    let Some(func_name) = self.ident("method name") else {
                        self.recover_item();
                        continue;
                    };
                    if !self.expect(Token::Colon, "after method name") {
                        self.recover_item();
                        continue;
                    }
                    let _ = self.eat(&Token::Static);
                    if !self.expect(Token::Func, "to begin method type") {
                        self.recover_item();
                        continue;
                    }
                    let Some((params, results)) = self.parse_func_type() else {
                        self.recover_item();
                        continue;
                    };
                    if !self.expect(Token::Semicolon, "after method") {
                        self.recover_item();
                    }
                    functions.push(FuncDecl {
                        name: func_name,
                        params,
                        results,
                    });
                }
                other => {
                    let other = other.clone();
                    self.error_here(format!("unexpected `{other}` in resource body"));
                    self.pos += 1;
                    self.recover_item();
                }
            }
        }
        self.expect(Token::RightBrace, "to close resource body");
        Some(ResourceDecl { name, functions })
    }

    fn parse_func_item(&mut self) -> Option<FuncDecl> {
        let name = self.ident("function name")?;
        if !self.expect(Token::Colon, "after function name") {
            self.recover_item();
            return None;
        }
        if !self.expect(Token::Func, "to begin function type") {
            self.recover_item();
            return None;
        }
        let Some((params, results)) = self.parse_func_type() else {
            self.recover_item();
            return None;
        };
        if !self.expect(Token::Semicolon, "after function declaration") {
            self.recover_item();
        }
        Some(FuncDecl {
            name,
            params,
            results,
        })
    }

    /// Parses the part of a function type after the `func` keyword:
    /// `(params)` and an optional `-> T` or `-> (name: T, ...)` result list.
    /// Result names are dropped; only the types survive into the tree.
    fn parse_func_type(&mut self) -> Option<(Vec<NamedType>, Vec<String>)> {
        let params = self.parse_params()?;
        let mut results = Vec::new();
        if self.eat(&Token::RightArrow) {
            if self.eat(&Token::LeftParen) {
                while !matches!(self.peek(), Some(Token::RightParen) | None) {
                    self.ident("result name")?;
                    if !self.expect(Token::Colon, "after result name") {
                        return None;
                    }
                    results.push(self.parse_type()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                if !self.expect(Token::RightParen, "to close result list") {
                    return None;
                }
            } else {
                results.push(self.parse_type()?);
            }
        }
        Some((params, results))
    }

    fn parse_params(&mut self) -> Option<Vec<NamedType>> {
        if !self.expect(Token::LeftParen, "to begin parameter list") {
            return None;
        }
        let mut params = Vec::new();
        while !matches!(self.peek(), Some(Token::RightParen) | None) {
            let param = self.parse_named_type("parameter name")?;
            params.push(param);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        if !self.expect(Token::RightParen, "to close parameter list") {
            return None;
        }
        Some(params)
    }

    /// Parses a type reference and renders it back to canonical text with no
    /// interior whitespace, e.g. `list<option<u32>>` or `tuple<u32,string>`.
    fn parse_type(&mut self) -> Option<String> {
        match self.peek().cloned() {
            Some(Token::List) => {
                self.pos += 1;
                self.angled_one("list")
            }
            Some(Token::Option) => {
                self.pos += 1;
                self.angled_one("option")
            }
            Some(Token::Own) => {
                self.pos += 1;
                self.angled_one("own")
            }
            Some(Token::Borrow) => {
                self.pos += 1;
                self.angled_one("borrow")
            }
            Some(Token::Stream) => {
                self.pos += 1;
                if matches!(self.peek(), Some(Token::LessThan)) {
                    self.angled_one("stream")
                } else {
                    Some("stream".to_string())
                }
            }
            Some(Token::Future) => {
                self.pos += 1;
                if matches!(self.peek(), Some(Token::LessThan)) {
                    self.angled_one("future")
                } else {
                    Some("future".to_string())
                }
            }
            Some(Token::Tuple) => {
                self.pos += 1;
                if !self.expect(Token::LessThan, "after `tuple`") {
                    return None;
                }
                let mut parts = Vec::new();
                loop {
                    parts.push(self.parse_type()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                if !self.expect(Token::GreaterThan, "to close `tuple`") {
                    return None;
                }
                Some(format!("tuple<{}>", parts.join(",")))
            }
            Some(Token::Result) => {
                self.pos += 1;
                if !self.eat(&Token::LessThan) {
                    return Some("result".to_string());
                }
                let ok = if self.eat(&Token::Underscore) {
                    "_".to_string()
                } else {
                    self.parse_type()?
                };
                if self.eat(&Token::Comma) {
                    let err = self.parse_type()?;
                    if !self.expect(Token::GreaterThan, "to close `result`") {
                        return None;
                    }
                    Some(format!("result<{ok},{err}>"))
                } else {
                    if !self.expect(Token::GreaterThan, "to close `result`") {
                        return None;
                    }
                    Some(format!("result<{ok}>"))
                }
            }
            Some(Token::Identifier(id)) => {
                self.pos += 1;
                Some(id.to_string())
            }
            Some(other) => {
                self.error_here(format!("expected a type, found `{other}`"));
                None
            }
            None => {
                self.error_here("expected a type, found end of file".to_string());
                None
            }
        }
    }

    fn angled_one(&mut self, head: &str) -> Option<String> {
        if !self.expect(Token::LessThan, &format!("after `{head}`")) {
            return None;
        }
        let inner = self.parse_type()?;
        if !self.expect(Token::GreaterThan, &format!("to close `{head}`")) {
            return None;
        }
        Some(format!("{head}<{inner}>"))
    }

    fn parse_world(&mut self) -> Option<WorldDecl> {
        self.pos += 1; // `world`
        let Some(name) = self.ident("world name") else {
            self.recover_item();
            return None;
        };
        if !self.expect(Token::LeftBrace, "after world name") {
            self.recover_item();
            return None;
        }
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            match token {
                Token::RightBrace => break,
                Token::Import => {
                    self.pos += 1;
                    if let Some(item) = self.parse_extern() {
                        items.push(WorldItem::Import(item));
                    }
                }
                Token::Export => {
                    self.pos += 1;
                    if let Some(item) = self.parse_extern() {
                        items.push(WorldItem::Export(item));
                    }
                }
                Token::Use => {
                    self.pos += 1;
                    if let Some(path) = self.parse_use_tail() {
                        items.push(WorldItem::Use(path));
                    }
                }
                Token::Include => {
                    self.pos += 1;
                    if let Some(path) = self.parse_include_tail() {
                        items.push(WorldItem::Include(path));
                    }
                }
                Token::Record
                | Token::Variant
                | Token::Enum
                | Token::Flags
                | Token::Type
                | Token::Resource => {
                    if let Some(item) = self.parse_type_def_item() {
                        items.push(WorldItem::Type(Box::new(item)));
                    }
                }
                other => {
                    let other = other.clone();
                    self.error_here(format!("unexpected `{other}` in world body"));
                    self.pos += 1;
                    self.recover_item();
                }
            }
        }
        self.expect(Token::RightBrace, "to close world body");
        Some(WorldDecl { name, items })
    }

    fn parse_extern(&mut self) -> Option<ExternItem> {
        let Some(first) = self.ident("import or export target") else {
            self.recover_item();
            return None;
        };
        if self.eat(&Token::Colon) {
            match self.peek() {
                Some(Token::Func) => {
                    self.pos += 1;
                    let Some((params, results)) = self.parse_func_type() else {
                        self.recover_item();
                        return None;
                    };
                    if !self.expect(Token::Semicolon, "after function item") {
                        self.recover_item();
                    }
                    Some(ExternItem::Func {
                        name: first.clone(),
                        func: FuncDecl {
                            name: first,
                            params,
                            results,
                        },
                    })
                }
                Some(Token::Interface) => {
                    self.pos += 1;
                    if !self.expect(Token::LeftBrace, "after `interface`") {
                        self.recover_item();
                        return None;
                    }
                    let items = self.parse_interface_items();
                    self.expect(Token::RightBrace, "to close inline interface");
                    Some(ExternItem::Interface { name: first, items })
                }
                Some(Token::Identifier(_)) => {
                    // A package-qualified path: `ns:name/iface@version`.
                    let mut path = first;
                    path.push(':');
                    path.push_str(&self.ident("package name")?);
                    if !self.finish_path(&mut path) {
                        return None;
                    }
                    if !self.expect(Token::Semicolon, "after import path") {
                        self.recover_item();
                    }
                    Some(ExternItem::Path(path))
                }
                _ => {
                    self.error_here(
                        "expected `func`, `interface`, or a package path after `:`".to_string(),
                    );
                    self.recover_item();
                    None
                }
            }
        } else {
            let mut path = first;
            if !self.finish_path(&mut path) {
                return None;
            }
            if !self.expect(Token::Semicolon, "after import path") {
                self.recover_item();
            }
            Some(ExternItem::Path(path))
        }
    }

    /// Appends `/segment` repetitions and an optional `@version` suffix.
    fn finish_path(&mut self, path: &mut String) -> bool {
        while self.eat(&Token::Slash) {
            let Some(segment) = self.ident("interface name") else {
                self.recover_item();
                return false;
            };
            path.push('/');
            path.push_str(&segment);
        }
        if self.eat(&Token::At) {
            match self.peek() {
                Some(Token::SemVer(version)) => {
                    path.push('@');
                    path.push_str(version);
                    self.pos += 1;
                }
                _ => {
                    self.error_here("expected a version after `@`".to_string());
                    self.recover_item();
                    return false;
                }
            }
        }
        true
    }

    /// Parses the remainder of a `use` item after the keyword: a path,
    /// an optional `.{ a, b as c }` list, and the closing `;`. Only the
    /// path is recorded.
    fn parse_use_tail(&mut self) -> Option<String> {
        let Some(first) = self.ident("use path") else {
            self.recover_item();
            return None;
        };
        let mut path = first;
        if self.eat(&Token::Colon) {
            path.push(':');
            let Some(package) = self.ident("package name") else {
                self.recover_item();
                return None;
            };
            path.push_str(&package);
        }
        if !self.finish_path(&mut path) {
            return None;
        }
        if self.eat(&Token::Period) {
            if !self.expect(Token::LeftBrace, "after `.` in use item") {
                self.recover_item();
                return None;
            }
            while !matches!(self.peek(), Some(Token::RightBrace) | None) {
                if self.eat(&Token::Star) {
                    // wildcard import
                } else {
                    if self.ident("imported name").is_none() {
                        self.skip_to_close_brace();
                        break;
                    }
                    if self.eat(&Token::As) && self.ident("alias name").is_none() {
                        self.skip_to_close_brace();
                        break;
                    }
                }
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RightBrace, "to close use item");
        }
        if !self.expect(Token::Semicolon, "after use item") {
            self.recover_item();
        }
        Some(path)
    }

    /// Parses the remainder of an `include` item: a path, an optional
    /// `with { a as b }` clause, and the closing `;`.
    fn parse_include_tail(&mut self) -> Option<String> {
        let Some(first) = self.ident("include path") else {
            self.recover_item();
            return None;
        };
        let mut path = first;
        if self.eat(&Token::Colon) {
            path.push(':');
            let Some(package) = self.ident("package name") else {
                self.recover_item();
                return None;
            };
            path.push_str(&package);
        }
        if !self.finish_path(&mut path) {
            return None;
        }
        if self.eat(&Token::With) {
            if !self.expect(Token::LeftBrace, "after `with`") {
                self.recover_item();
                return None;
            }
            while !matches!(self.peek(), Some(Token::RightBrace) | None) {
                if self.ident("included name").is_none() {
                    self.skip_to_close_brace();
                    break;
                }
                if !self.expect(Token::As, "in include rename") {
                    self.skip_to_close_brace();
                    break;
                }
                if self.ident("renamed name").is_none() {
                    self.skip_to_close_brace();
                    break;
                }
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RightBrace, "to close include renames");
        }
        if !self.expect(Token::Semicolon, "after include item") {
            self.recover_item();
        }
        Some(path)
    }

    /// Skips ahead to the closing `}` of the current block without
    /// consuming it, balancing any nested braces on the way.
    fn skip_to_close_brace(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token {
                Token::LeftBrace => {
                    depth += 1;
                    self.pos += 1;
                }
                Token::RightBrace if depth == 0 => return,
                Token::RightBrace => {
                    depth -= 1;
                    self.pos += 1;
                }
                _ => {
                    self.pos += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::*;

    fn parse_ok(source: &str) -> SourceFile {
        let (file, errors) = parse(source);
        assert_eq!(errors, Vec::new(), "unexpected parse errors");
        file
    }

    #[test]
    fn parses_a_primitive_interface_and_world() {
        let file = parse_ok(
            "package example:p;\n\
             interface i { f: func(a: u32, b: u32) -> bool; }\n\
             world w { export i; }",
        );
        assert_eq!(file.package.as_deref(), Some("example:p"));
        assert_eq!(file.items.len(), 2);

        let TopLevelItem::Interface(iface) = &file.items[0] else {
            panic!("expected an interface");
        };
        assert_eq!(iface.name, "i");
        assert_eq!(
            iface.items,
            vec![InterfaceItem::Func(FuncDecl {
                name: "f".to_string(),
                params: vec![
                    NamedType {
                        name: "a".to_string(),
                        ty: "u32".to_string()
                    },
                    NamedType {
                        name: "b".to_string(),
                        ty: "u32".to_string()
                    },
                ],
                results: vec!["bool".to_string()],
            })]
        );

        let TopLevelItem::World(world) = &file.items[1] else {
            panic!("expected a world");
        };
        assert_eq!(world.name, "w");
        assert_eq!(
            world.items,
            vec![WorldItem::Export(ExternItem::Path("i".to_string()))]
        );
    }

    #[test]
    fn records_package_text_with_version() {
        let file = parse_ok("package wasi:clocks@0.2.0;");
        assert_eq!(file.package.as_deref(), Some("wasi:clocks@0.2.0"));
    }

    #[test]
    fn parses_type_definitions() {
        let file = parse_ok(
            "package example:p;\n\
             interface e {\n\
                 enum color { red, green, blue }\n\
                 variant v { none, some(u32) }\n\
                 record pair { left: u32, right: string }\n\
                 f: func(c: color, x: v) -> v;\n\
             }",
        );
        let TopLevelItem::Interface(iface) = &file.items[0] else {
            panic!("expected an interface");
        };
        assert_eq!(iface.items.len(), 4);
        assert_eq!(
            iface.items[0],
            InterfaceItem::Enum(EnumDecl {
                name: "color".to_string(),
                cases: vec!["red".into(), "green".into(), "blue".into()],
            })
        );
        assert_eq!(
            iface.items[1],
            InterfaceItem::Variant(VariantDecl {
                name: "v".to_string(),
                cases: vec![
                    VariantCaseDecl {
                        name: "none".to_string(),
                        payload: None
                    },
                    VariantCaseDecl {
                        name: "some".to_string(),
                        payload: Some("u32".to_string())
                    },
                ],
            })
        );
    }

    #[test]
    fn renders_types_in_canonical_form() {
        let file = parse_ok(
            "interface t {\n\
                 f: func(a: list< option< u32 > >, b: tuple<u32, string>) -> result<u32, string>;\n\
                 g: func() -> result<_, string>;\n\
                 h: func() -> result;\n\
             }",
        );
        let TopLevelItem::Interface(iface) = &file.items[0] else {
            panic!("expected an interface");
        };
        let InterfaceItem::Func(f) = &iface.items[0] else {
            panic!("expected a function");
        };
        assert_eq!(f.params[0].ty, "list<option<u32>>");
        assert_eq!(f.params[1].ty, "tuple<u32,string>");
        assert_eq!(f.results, vec!["result<u32,string>".to_string()]);
        let InterfaceItem::Func(g) = &iface.items[1] else {
            panic!("expected a function");
        };
        assert_eq!(g.results, vec!["result<_,string>".to_string()]);
        let InterfaceItem::Func(h) = &iface.items[2] else {
            panic!("expected a function");
        };
        assert_eq!(h.results, vec!["result".to_string()]);
    }

    #[test]
    fn parses_named_result_lists_dropping_names() {
        let file = parse_ok("interface t { f: func() -> (a: u32, b: string); }");
        let TopLevelItem::Interface(iface) = &file.items[0] else {
            panic!("expected an interface");
        };
        let InterfaceItem::Func(f) = &iface.items[0] else {
            panic!("expected a function");
        };
        assert_eq!(f.results, vec!["u32".to_string(), "string".to_string()]);
    }

    #[test]
    fn parses_world_level_functions_and_inline_interfaces() {
        let file = parse_ok(
            "package example:p;\n\
             world w {\n\
                 import log: func(msg: string);\n\
                 export host-api: interface { ping: func() -> bool; }\n\
                 import wasi:clocks/monotonic-clock@0.2.0;\n\
             }",
        );
        let TopLevelItem::World(world) = &file.items[0] else {
            panic!("expected a world");
        };
        assert_eq!(world.items.len(), 3);
        let WorldItem::Import(ExternItem::Func { name, func }) = &world.items[0] else {
            panic!("expected a function import");
        };
        assert_eq!(name, "log");
        assert_eq!(func.params[0].ty, "string");
        let WorldItem::Export(ExternItem::Interface { name, items }) = &world.items[1] else {
            panic!("expected an inline interface export");
        };
        assert_eq!(name, "host-api");
        assert_eq!(items.len(), 1);
        let WorldItem::Import(ExternItem::Path(path)) = &world.items[2] else {
            panic!("expected a path import");
        };
        assert_eq!(path, "wasi:clocks/monotonic-clock@0.2.0");
    }

    #[test]
    fn parses_unbound_constructs_without_error() {
        parse_ok(
            "package example:p;\n\
             interface i {\n\
                 use other-interface.{shared, thing as renamed};\n\
                 flags perms { read, write }\n\
                 type code = u32;\n\
                 resource blob {\n\
                     constructor(size: u32);\n\
                     read: func(offset: u32) -> list<u8>;\n\
                     merge: static func(a: borrow<blob>) -> own<blob>;\n\
                 }\n\
             }\n\
             world w {\n\
                 include example:base/common with { run as start };\n\
                 export i;\n\
             }",
        );
    }

    #[test]
    fn accumulates_multiple_errors_with_positions() {
        let source = "interface i {\n\
                      f: func() -> bool\n\
                      }\n\
                      interface j {\n\
                      g: fun() -> u32;\n\
                      }";
        let (_, errors) = parse(source);
        assert!(errors.len() >= 2, "expected at least two errors: {errors:?}");
        assert!(errors.iter().any(|e| e.line == 3));
        assert!(errors.iter().any(|e| e.line == 5));
    }

    #[test]
    fn reparsing_yields_an_equal_tree() {
        let source = "package example:p;\n\
                      interface i { f: func(a: u32) -> list<string>; }\n\
                      world w { import i; }";
        let (first, errors) = parse(source);
        assert!(errors.is_empty());
        let (second, errors) = parse(source);
        assert!(errors.is_empty());
        assert_eq!(first, second);
    }
}
