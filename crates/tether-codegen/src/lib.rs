pub mod bindings;
pub mod header;

pub use bindings::{generate_glue, generate_glue_header};
pub use header::generate_header;

use tether_cpp::types::{map_type, CppType, TypeScope};
use tether_cpp::sanitize;
use tether_wit::ir::{Direction, FunctionSignature, Interface};

/// Resolves user-defined names against the interface that declares them.
pub(crate) struct InterfaceScope<'a>(pub(crate) &'a Interface);

impl TypeScope for InterfaceScope<'_> {
    fn declares(&self, name: &str) -> bool {
        self.0.declares_type(name)
    }
}

/// One function signature mapped to C++, along with everything the skip
/// policy needs: unknown local names and unsupported constructs found
/// anywhere in the signature.
pub(crate) struct MappedFunction {
    pub return_type: String,
    /// `(sanitized parameter name, mapped type)` pairs in source order.
    pub params: Vec<(String, String)>,
    pub unknown: Vec<String>,
    pub unsupported: Vec<String>,
}

impl MappedFunction {
    pub fn param_types(&self) -> Vec<&str> {
        self.params.iter().map(|(_, ty)| ty.as_str()).collect()
    }
}

pub(crate) fn map_function(func: &FunctionSignature, iface: &Interface) -> MappedFunction {
    let scope = InterfaceScope(iface);
    let mut unknown = Vec::new();
    let mut unsupported = Vec::new();

    let mut params = Vec::new();
    for param in &func.params {
        let ty = map_type(&param.ty, &scope);
        note(&ty, &mut unknown, &mut unsupported);
        params.push((sanitize(&param.name), ty.to_string()));
    }

    let results: Vec<CppType> = func
        .results
        .iter()
        .map(|result| map_type(result, &scope))
        .collect();
    for ty in &results {
        note(ty, &mut unknown, &mut unsupported);
    }
    let return_type = match results.len() {
        0 => "void".to_string(),
        1 => results[0].to_string(),
        // A named result tuple becomes one tuple_t return value.
        _ => CppType::Tuple(results).to_string(),
    };

    MappedFunction {
        return_type,
        params,
        unknown,
        unsupported,
    }
}

fn note(ty: &CppType, unknown: &mut Vec<String>, unsupported: &mut Vec<String>) {
    for name in ty.unknown_names() {
        if !unknown.contains(&name) {
            unknown.push(name);
        }
    }
    if let Some(text) = ty.unsupported() {
        if !unsupported.iter().any(|existing| existing == text) {
            unsupported.push(text.to_string());
        }
    }
}

pub(crate) fn partition(interfaces: &[Interface]) -> (Vec<&Interface>, Vec<&Interface>) {
    let imports = interfaces
        .iter()
        .filter(|iface| iface.direction == Direction::Import)
        .collect();
    let exports = interfaces
        .iter()
        .filter(|iface| iface.direction == Direction::Export)
        .collect();
    (imports, exports)
}
