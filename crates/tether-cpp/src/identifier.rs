use std::collections::HashMap;

use heck::ToShoutySnakeCase;

/// C++ words that a sanitized WIT identifier must not collide with.
pub const RESERVED: &[&str] = &[
    "and", "or", "not", "xor", "bool", "char", "int", "float", "double", "void", "return", "if",
    "else", "while", "for", "do", "switch", "case", "default", "break", "continue", "namespace",
    "class", "struct", "enum", "union", "typedef", "using", "public", "private", "protected",
    "virtual", "override", "final", "const", "static", "extern", "inline",
];

/// Substitutes `_` for every separator character WIT allows in names.
pub fn replace_separators(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '-' | '.' | ':' | '/' => '_',
            other => other,
        })
        .collect()
}

/// Rewrites a WIT identifier for emission: every `-`, `.`, `:`, `/` becomes
/// `_`, and a trailing `_` is appended when the result is a C++ reserved
/// word.
pub fn sanitize(name: &str) -> String {
    let mut out = replace_separators(name);
    if RESERVED.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Include-guard text for an output file stem, e.g. `GENERATED_SAMPLE_HPP`.
pub fn include_guard(stem: &str) -> String {
    format!("generated_{stem}_hpp").to_shouty_snake_case()
}

/// Sanitization maps distinct source names such as `a-b` and `a_b` to the
/// same emitted identifier. Returns the first pair of distinct input names
/// that collide, in input order.
pub fn find_collision<'a, I>(names: I) -> Option<(String, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashMap<String, &str> = HashMap::new();
    for name in names {
        let sanitized = sanitize(name);
        match seen.get(sanitized.as_str()) {
            Some(&first) if first != name => {
                return Some((first.to_string(), name.to_string()));
            }
            Some(_) => {}
            None => {
                seen.insert(sanitized, name);
            }
        }
    }
    None
}
