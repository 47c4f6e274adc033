//! Mapping from WIT type references to cmcpp canonical-ABI types.
//!
//! Input is the canonical type text the front end records (no interior
//! whitespace, e.g. `list<option<u32>>`). Compound forms are taken apart
//! with balanced angle-bracket matching, never `find`/`rfind`, so nested
//! generics resolve correctly.

use std::fmt::{self, Display};

use crate::identifier::sanitize;

/// The unit type used for payload-less variant cases and result holes.
pub const MONOSTATE: &str = "cmcpp::monostate";

/// Resolves locally declared type names while mapping. Implemented over
/// the enclosing interface by the emitter.
pub trait TypeScope {
    /// Returns true when `name` is a record, variant, or enum declared in
    /// the enclosing interface.
    fn declares(&self, name: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CppType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    S8,
    S16,
    S32,
    S64,
    F32,
    F64,
    Char,
    String,
    List(Box<CppType>),
    Option(Box<CppType>),
    Result {
        ok: Option<Box<CppType>>,
        err: Option<Box<CppType>>,
    },
    Tuple(Vec<CppType>),
    /// A name declared in the enclosing interface; rendered sanitized.
    Named(String),
    /// An unknown name; rendered exactly as written so the downstream
    /// compiler surfaces it.
    Verbatim(String),
    /// `stream`, `future`, `own`, `borrow`: recognized but never bound.
    Unsupported(String),
}

impl CppType {
    /// Unknown names referenced anywhere inside this type, in source order.
    pub fn unknown_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_unknown(&mut names);
        names
    }

    fn collect_unknown(&self, out: &mut Vec<String>) {
        match self {
            CppType::Verbatim(name) => out.push(name.clone()),
            CppType::List(inner) | CppType::Option(inner) => inner.collect_unknown(out),
            CppType::Result { ok, err } => {
                if let Some(inner) = ok {
                    inner.collect_unknown(out);
                }
                if let Some(inner) = err {
                    inner.collect_unknown(out);
                }
            }
            CppType::Tuple(items) => {
                for item in items {
                    item.collect_unknown(out);
                }
            }
            _ => {}
        }
    }

    /// The first unsupported construct inside this type, if any.
    pub fn unsupported(&self) -> Option<&str> {
        match self {
            CppType::Unsupported(text) => Some(text),
            CppType::List(inner) | CppType::Option(inner) => inner.unsupported(),
            CppType::Result { ok, err } => ok
                .as_ref()
                .and_then(|inner| inner.unsupported())
                .or_else(|| err.as_ref().and_then(|inner| inner.unsupported())),
            CppType::Tuple(items) => items.iter().find_map(|item| item.unsupported()),
            _ => None,
        }
    }
}

impl Display for CppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CppType::Bool => f.write_str("cmcpp::bool_t"),
            CppType::U8 => f.write_str("uint8_t"),
            CppType::U16 => f.write_str("uint16_t"),
            CppType::U32 => f.write_str("uint32_t"),
            CppType::U64 => f.write_str("uint64_t"),
            CppType::S8 => f.write_str("int8_t"),
            CppType::S16 => f.write_str("int16_t"),
            CppType::S32 => f.write_str("int32_t"),
            CppType::S64 => f.write_str("int64_t"),
            CppType::F32 => f.write_str("cmcpp::float32_t"),
            CppType::F64 => f.write_str("cmcpp::float64_t"),
            CppType::Char => f.write_str("cmcpp::char_t"),
            CppType::String => f.write_str("cmcpp::string_t"),
            CppType::List(inner) => write!(f, "cmcpp::list_t<{inner}>"),
            CppType::Option(inner) => write!(f, "cmcpp::option_t<{inner}>"),
            CppType::Result { ok: Some(ok), err: Some(err) } => {
                write!(f, "cmcpp::result_t<{ok}, {err}>")
            }
            CppType::Result { ok: Some(ok), err: None } => write!(f, "cmcpp::result_t<{ok}>"),
            CppType::Result { ok: None, err: Some(err) } => {
                write!(f, "cmcpp::result_t<{MONOSTATE}, {err}>")
            }
            CppType::Result { ok: None, err: None } => f.write_str("cmcpp::result_t<>"),
            CppType::Tuple(items) => {
                f.write_str("cmcpp::tuple_t<")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(">")
            }
            CppType::Named(name) => f.write_str(&sanitize(name)),
            CppType::Verbatim(name) | CppType::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Maps a WIT type reference to its cmcpp rendering, resolving user-defined
/// names against `scope`. Whitespace is stripped before matching.
pub fn map_type(text: &str, scope: &dyn TypeScope) -> CppType {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    parse_type(&cleaned, scope)
}

fn parse_type(text: &str, scope: &dyn TypeScope) -> CppType {
    match text {
        "bool" => return CppType::Bool,
        "u8" => return CppType::U8,
        "u16" => return CppType::U16,
        "u32" => return CppType::U32,
        "u64" => return CppType::U64,
        "s8" => return CppType::S8,
        "s16" => return CppType::S16,
        "s32" => return CppType::S32,
        "s64" => return CppType::S64,
        "f32" => return CppType::F32,
        "f64" => return CppType::F64,
        "char" => return CppType::Char,
        "string" => return CppType::String,
        "result" => return CppType::Result { ok: None, err: None },
        "stream" | "future" => return CppType::Unsupported(text.to_string()),
        _ => {}
    }

    if let Some(inner) = generic_inner(text, "list") {
        return CppType::List(Box::new(parse_type(inner, scope)));
    }
    if let Some(inner) = generic_inner(text, "option") {
        return CppType::Option(Box::new(parse_type(inner, scope)));
    }
    if let Some(inner) = generic_inner(text, "result") {
        let parts = split_top_level(inner);
        return match parts.as_slice() {
            [ok] => CppType::Result {
                ok: Some(Box::new(parse_type(ok, scope))),
                err: None,
            },
            [ok, err] => CppType::Result {
                ok: (*ok != "_").then(|| Box::new(parse_type(ok, scope))),
                err: Some(Box::new(parse_type(err, scope))),
            },
            _ => CppType::Verbatim(text.to_string()),
        };
    }
    if let Some(inner) = generic_inner(text, "tuple") {
        return CppType::Tuple(
            split_top_level(inner)
                .into_iter()
                .map(|part| parse_type(part, scope))
                .collect(),
        );
    }
    for head in ["stream", "future", "own", "borrow"] {
        if generic_inner(text, head).is_some() {
            return CppType::Unsupported(text.to_string());
        }
    }

    if scope.declares(text) {
        CppType::Named(text.to_string())
    } else {
        CppType::Verbatim(text.to_string())
    }
}

/// For `head<...>` returns the inner text, provided the `<` opened right
/// after `head` closes exactly at the end of the string. Nested brackets
/// are balanced on the way.
fn generic_inner<'t>(text: &'t str, head: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(head)?.strip_prefix('<')?;
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return (i == rest.len() - 1).then(|| &rest[..i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits generic arguments on commas at bracket depth zero.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct NoScope;

    impl TypeScope for NoScope {
        fn declares(&self, _name: &str) -> bool {
            false
        }
    }

    struct Declared(&'static [&'static str]);

    impl TypeScope for Declared {
        fn declares(&self, name: &str) -> bool {
            self.0.contains(&name)
        }
    }

    fn render(text: &str) -> String {
        map_type(text, &NoScope).to_string()
    }

    #[test]
    fn maps_primitives() {
        assert_eq!(render("bool"), "cmcpp::bool_t");
        assert_eq!(render("u8"), "uint8_t");
        assert_eq!(render("u64"), "uint64_t");
        assert_eq!(render("s16"), "int16_t");
        assert_eq!(render("f32"), "cmcpp::float32_t");
        assert_eq!(render("f64"), "cmcpp::float64_t");
        assert_eq!(render("char"), "cmcpp::char_t");
        assert_eq!(render("string"), "cmcpp::string_t");
    }

    #[test]
    fn maps_compound_forms() {
        assert_eq!(render("list<string>"), "cmcpp::list_t<cmcpp::string_t>");
        assert_eq!(render("option<u32>"), "cmcpp::option_t<uint32_t>");
        assert_eq!(
            render("result<u32,string>"),
            "cmcpp::result_t<uint32_t, cmcpp::string_t>"
        );
        assert_eq!(render("result<u32>"), "cmcpp::result_t<uint32_t>");
        assert_eq!(
            render("result<_,string>"),
            "cmcpp::result_t<cmcpp::monostate, cmcpp::string_t>"
        );
        assert_eq!(render("result"), "cmcpp::result_t<>");
        assert_eq!(
            render("tuple<u32,string>"),
            "cmcpp::tuple_t<uint32_t, cmcpp::string_t>"
        );
    }

    #[test]
    fn nested_generics_require_balanced_matching() {
        assert_eq!(
            render("list<option<u32>>"),
            "cmcpp::list_t<cmcpp::option_t<uint32_t>>"
        );
        assert_eq!(
            render("tuple<list<u8>,string>"),
            "cmcpp::tuple_t<cmcpp::list_t<uint8_t>, cmcpp::string_t>"
        );
        assert_eq!(
            render("result<list<string>,tuple<u32,u32>>"),
            "cmcpp::result_t<cmcpp::list_t<cmcpp::string_t>, cmcpp::tuple_t<uint32_t, uint32_t>>"
        );
    }

    #[test]
    fn whitespace_is_stripped_before_matching() {
        assert_eq!(
            render("tuple< u32 , string >"),
            "cmcpp::tuple_t<uint32_t, cmcpp::string_t>"
        );
    }

    #[test]
    fn declared_names_are_sanitized_and_unknown_names_pass_through() {
        let scope = Declared(&["color", "key-value"]);
        assert_eq!(map_type("color", &scope).to_string(), "color");
        assert_eq!(map_type("key-value", &scope).to_string(), "key_value");

        let unknown = map_type("mystery", &scope);
        assert_eq!(unknown.to_string(), "mystery");
        assert_eq!(unknown.unknown_names(), vec!["mystery".to_string()]);
    }

    #[test]
    fn unknown_names_are_collected_through_compounds() {
        let ty = map_type("list<option<v>>", &NoScope);
        assert_eq!(ty.unknown_names(), vec!["v".to_string()]);
        assert!(ty.unsupported().is_none());
    }

    #[test]
    fn handle_and_async_types_are_unsupported() {
        assert!(map_type("stream<u8>", &NoScope).unsupported().is_some());
        assert!(map_type("future", &NoScope).unsupported().is_some());
        assert!(map_type("own<blob>", &NoScope).unsupported().is_some());
        assert!(map_type("borrow<blob>", &NoScope).unsupported().is_some());
        assert_eq!(
            map_type("list<stream<u8>>", &NoScope).unsupported(),
            Some("stream<u8>")
        );
    }
}
