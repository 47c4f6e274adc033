//! Typed intermediate representation consumed by the emitters.
//!
//! Every record here is a plain value with no interior references; the
//! pipeline owns a flat `Vec<Interface>` and the emitters read it once.

/// Which side of the ABI boundary implements a function.
///
/// `Import` means the host implements it and the guest calls it; `Export`
/// means the guest implements it and the host calls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Import,
    Export,
}

/// A `(name, type)` pair used for record fields and function parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedField {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<NamedField>,
    /// Result type references; empty for void, more than one for a named
    /// result tuple.
    pub results: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<NamedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCase {
    pub name: String,
    /// `None` for a payload-less case; the case order defines the
    /// discriminant ordinal.
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDef {
    pub name: String,
    pub cases: Vec<VariantCase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub cases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Raw package identifier of the declaring file, e.g. `example:sample`.
    /// Empty when the file had no package declaration.
    pub package: String,
    pub name: String,
    pub direction: Direction,
    pub records: Vec<RecordDef>,
    pub variants: Vec<VariantDef>,
    pub enums: Vec<EnumDef>,
    pub functions: Vec<FunctionSignature>,
    /// True when this interface was materialized from a world-level
    /// standalone function and carries exactly that one function.
    pub synthetic: bool,
}

impl Interface {
    /// Returns true when `name` is a record, variant, or enum declared in
    /// this interface.
    pub fn declares_type(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
            || self.variants.iter().any(|v| v.name == name)
            || self.enums.iter().any(|e| e.name == name)
    }

    /// The module string the runtime resolves imports against:
    /// `<package>/<interface>`, or `$root` for world-level functions.
    pub fn module_name(&self) -> String {
        if self.synthetic {
            "$root".to_string()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }
}

/// Splits a package identifier `ns:name[@version]` into its name component,
/// with any version suffix stripped. Returns `None` when the text has no
/// `:` separator.
pub fn package_name_component(package: &str) -> Option<&str> {
    let (_, name) = package.split_once(':')?;
    let name = name.split_once('@').map(|(n, _)| n).unwrap_or(name);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
