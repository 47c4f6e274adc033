//! Collapses a parsed syntax tree into IR records.
//!
//! Interfaces are collected in parse order. World items then assign a
//! direction to each referenced interface through a small state machine:
//! an interface seen under both `import` and `export` fans out into two IR
//! records (Import first), and an interface named by no world item
//! defaults to Export. World-level standalone functions materialize as
//! synthetic single-function interfaces appended after the regular ones.

use indexmap::IndexMap;

use crate::ast::{ExternItem, InterfaceDecl, InterfaceItem, SourceFile, TopLevelItem, WorldItem};
use crate::diag::Diagnostics;
use crate::ir::{
    Direction, EnumDef, FunctionSignature, Interface, NamedField, RecordDef, VariantCase,
    VariantDef,
};

/// IR produced from a single WIT file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileIr {
    /// Raw package identifier, empty when the file declared none.
    pub package: String,
    pub interfaces: Vec<Interface>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Import,
    Export,
    Both,
}

pub fn build(file: &SourceFile, diags: &mut Diagnostics) -> FileIr {
    let package = file.package.clone().unwrap_or_default();

    let mut interfaces: Vec<Interface> = Vec::new();
    for item in &file.items {
        match item {
            TopLevelItem::Interface(decl) => {
                interfaces.push(build_interface(&package, decl, diags));
            }
            TopLevelItem::Use(path) => diags.warn(format!(
                "top-level use `{path}` is not bound; its types are treated as unknown"
            )),
            TopLevelItem::World(_) => {}
        }
    }

    let mut marks: IndexMap<String, Mark> = IndexMap::new();
    let mut synthetics: Vec<Interface> = Vec::new();
    for item in &file.items {
        let TopLevelItem::World(world) = item else {
            continue;
        };
        for world_item in &world.items {
            match world_item {
                WorldItem::Import(ext) => apply_extern(
                    ext,
                    Direction::Import,
                    &package,
                    &mut marks,
                    &mut interfaces,
                    &mut synthetics,
                    diags,
                ),
                WorldItem::Export(ext) => apply_extern(
                    ext,
                    Direction::Export,
                    &package,
                    &mut marks,
                    &mut interfaces,
                    &mut synthetics,
                    diags,
                ),
                WorldItem::Use(path) => diags.warn(format!(
                    "world `{}`: use `{path}` is not bound; skipped",
                    world.name
                )),
                WorldItem::Include(path) => diags.warn(format!(
                    "world `{}`: include `{path}` is not supported; skipped",
                    world.name
                )),
                WorldItem::Type(_) => diags.warn(format!(
                    "world `{}`: world-level type definitions are not bound; skipped",
                    world.name
                )),
            }
        }
    }

    let mut out = Vec::with_capacity(interfaces.len() + synthetics.len());
    for mut iface in interfaces {
        match marks.get(&iface.name).copied() {
            Some(Mark::Import) => {
                iface.direction = Direction::Import;
                out.push(iface);
            }
            Some(Mark::Both) => {
                let mut import_copy = iface.clone();
                import_copy.direction = Direction::Import;
                out.push(import_copy);
                iface.direction = Direction::Export;
                out.push(iface);
            }
            // An interface named by no world item defaults to Export.
            Some(Mark::Export) | None => {
                iface.direction = Direction::Export;
                out.push(iface);
            }
        }
    }
    out.extend(synthetics);

    FileIr {
        package,
        interfaces: out,
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_extern(
    ext: &ExternItem,
    direction: Direction,
    package: &str,
    marks: &mut IndexMap<String, Mark>,
    interfaces: &mut Vec<Interface>,
    synthetics: &mut Vec<Interface>,
    diags: &mut Diagnostics,
) {
    match ext {
        ExternItem::Path(path) => mark(marks, path, direction),
        ExternItem::Func { name, func } => {
            let signature = build_function(func, name, diags);
            synthetics.push(Interface {
                package: package.to_string(),
                name: name.clone(),
                direction,
                records: Vec::new(),
                variants: Vec::new(),
                enums: Vec::new(),
                functions: vec![signature],
                synthetic: true,
            });
        }
        ExternItem::Interface { name, items } => {
            if !interfaces.iter().any(|iface| iface.name == *name) {
                let decl = InterfaceDecl {
                    name: name.clone(),
                    items: items.clone(),
                };
                interfaces.push(build_interface(package, &decl, diags));
            }
            mark(marks, name, direction);
        }
    }
}

fn mark(marks: &mut IndexMap<String, Mark>, name: &str, direction: Direction) {
    let next = match (marks.get(name), direction) {
        (None, Direction::Import) => Mark::Import,
        (None, Direction::Export) => Mark::Export,
        (Some(Mark::Import), Direction::Export) => Mark::Both,
        (Some(Mark::Export), Direction::Import) => Mark::Both,
        (Some(existing), _) => *existing,
    };
    marks.insert(name.to_string(), next);
}

fn build_interface(package: &str, decl: &InterfaceDecl, diags: &mut Diagnostics) -> Interface {
    let mut iface = Interface {
        package: package.to_string(),
        name: decl.name.clone(),
        direction: Direction::Export,
        records: Vec::new(),
        variants: Vec::new(),
        enums: Vec::new(),
        functions: Vec::new(),
        synthetic: false,
    };

    for item in &decl.items {
        match item {
            InterfaceItem::Record(record) => {
                check_unique(
                    record.fields.iter().map(|f| f.name.as_str()),
                    &format!("field in record `{}`", record.name),
                    diags,
                );
                iface.records.push(RecordDef {
                    name: record.name.clone(),
                    fields: record
                        .fields
                        .iter()
                        .map(|f| NamedField {
                            name: f.name.clone(),
                            ty: f.ty.clone(),
                        })
                        .collect(),
                });
            }
            InterfaceItem::Variant(variant) => {
                check_unique(
                    variant.cases.iter().map(|c| c.name.as_str()),
                    &format!("case in variant `{}`", variant.name),
                    diags,
                );
                iface.variants.push(VariantDef {
                    name: variant.name.clone(),
                    cases: variant
                        .cases
                        .iter()
                        .map(|c| VariantCase {
                            name: c.name.clone(),
                            payload: c.payload.clone(),
                        })
                        .collect(),
                });
            }
            InterfaceItem::Enum(decl) => {
                check_unique(
                    decl.cases.iter().map(String::as_str),
                    &format!("case in enum `{}`", decl.name),
                    diags,
                );
                iface.enums.push(EnumDef {
                    name: decl.name.clone(),
                    cases: decl.cases.clone(),
                });
            }
            InterfaceItem::Func(func) => {
                if iface.functions.iter().any(|f| f.name == func.name) {
                    diags.warn(format!(
                        "duplicate function `{}` in interface `{}`",
                        func.name, iface.name
                    ));
                }
                let signature = build_function(func, &iface.name, diags);
                iface.functions.push(signature);
            }
            InterfaceItem::Flags(decl) => diags.warn(format!(
                "flags `{}` in interface `{}` are not supported; skipped",
                decl.name, iface.name
            )),
            InterfaceItem::TypeAlias(decl) => diags.warn(format!(
                "type alias `{}` in interface `{}` is not supported; skipped",
                decl.name, iface.name
            )),
            InterfaceItem::Resource(decl) => diags.warn(format!(
                "resource `{}` in interface `{}` is not supported; skipped",
                decl.name, iface.name
            )),
            InterfaceItem::Use(path) => diags.warn(format!(
                "use `{path}` in interface `{}` is not bound; its types are treated as unknown",
                iface.name
            )),
        }
    }

    iface
}

fn build_function(
    func: &crate::ast::FuncDecl,
    scope: &str,
    diags: &mut Diagnostics,
) -> FunctionSignature {
    check_unique(
        func.params.iter().map(|p| p.name.as_str()),
        &format!("parameter of function `{}` in `{scope}`", func.name),
        diags,
    );
    FunctionSignature {
        name: func.name.clone(),
        params: func
            .params
            .iter()
            .map(|p| NamedField {
                name: p.name.clone(),
                ty: p.ty.clone(),
            })
            .collect(),
        results: func.results.clone(),
    }
}

fn check_unique<'n>(
    names: impl Iterator<Item = &'n str>,
    what: &str,
    diags: &mut Diagnostics,
) {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if seen.contains(&name) {
            diags.warn(format!("duplicate {what}: `{name}`"));
        } else {
            seen.push(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::parse;

    fn build_source(source: &str) -> (FileIr, Diagnostics) {
        let (file, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let mut diags = Diagnostics::default();
        let ir = build(&file, &mut diags);
        (ir, diags)
    }

    #[test]
    fn exported_interface_gets_export_direction() {
        let (ir, _) = build_source(
            "package example:p;\n\
             interface i { f: func(a: u32, b: u32) -> bool; }\n\
             world w { export i; }",
        );
        assert_eq!(ir.package, "example:p");
        assert_eq!(ir.interfaces.len(), 1);
        assert_eq!(ir.interfaces[0].direction, Direction::Export);
        assert_eq!(ir.interfaces[0].functions.len(), 1);
        assert!(!ir.interfaces[0].synthetic);
    }

    #[test]
    fn import_and_export_of_same_interface_fans_out() {
        let (ir, _) = build_source(
            "package example:p;\n\
             interface i { f: func(a: u32, b: u32) -> bool; }\n\
             world w { import i; export i; }",
        );
        assert_eq!(ir.interfaces.len(), 2);
        assert_eq!(ir.interfaces[0].direction, Direction::Import);
        assert_eq!(ir.interfaces[1].direction, Direction::Export);
        assert_eq!(ir.interfaces[0].name, ir.interfaces[1].name);
    }

    #[test]
    fn unreferenced_interface_defaults_to_export() {
        let (ir, _) = build_source(
            "package example:p;\n\
             interface quiet { f: func() -> u32; }\n\
             world w { import log: func(msg: string); }",
        );
        let quiet = ir.interfaces.iter().find(|i| i.name == "quiet").unwrap();
        assert_eq!(quiet.direction, Direction::Export);
    }

    #[test]
    fn world_level_function_becomes_synthetic_interface() {
        let (ir, _) = build_source(
            "package example:p;\n\
             world w { import log: func(msg: string); }",
        );
        assert_eq!(ir.interfaces.len(), 1);
        let log = &ir.interfaces[0];
        assert!(log.synthetic);
        assert_eq!(log.name, "log");
        assert_eq!(log.direction, Direction::Import);
        assert_eq!(log.functions.len(), 1);
        assert_eq!(log.functions[0].params[0].ty, "string");
        assert_eq!(log.module_name(), "$root");
    }

    #[test]
    fn synthetic_interfaces_follow_regular_ones() {
        let (ir, _) = build_source(
            "package example:p;\n\
             interface i { f: func() -> u32; }\n\
             world w { export i; export done: func(); }",
        );
        assert_eq!(ir.interfaces.len(), 2);
        assert!(!ir.interfaces[0].synthetic);
        assert!(ir.interfaces[1].synthetic);
        assert_eq!(ir.interfaces[1].name, "done");
        assert_eq!(ir.interfaces[1].direction, Direction::Export);
    }

    #[test]
    fn inline_interface_is_materialized_and_marked() {
        let (ir, _) = build_source(
            "package example:p;\n\
             world w { import host-api: interface { ping: func() -> bool; } }",
        );
        assert_eq!(ir.interfaces.len(), 1);
        let api = &ir.interfaces[0];
        assert_eq!(api.name, "host-api");
        assert_eq!(api.direction, Direction::Import);
        assert!(!api.synthetic);
        assert_eq!(api.functions.len(), 1);
    }

    #[test]
    fn type_definitions_are_collected_in_order() {
        let (ir, _) = build_source(
            "package example:p;\n\
             interface e {\n\
                 enum color { red, green, blue }\n\
                 variant v { none, some(u32) }\n\
                 record pair { left: u32, right: string }\n\
                 f: func(c: color, x: v) -> v;\n\
             }\n\
             world w { export e; }",
        );
        let e = &ir.interfaces[0];
        assert_eq!(e.enums[0].cases, vec!["red", "green", "blue"]);
        assert_eq!(e.variants[0].cases.len(), 2);
        assert_eq!(e.variants[0].cases[1].payload.as_deref(), Some("u32"));
        assert_eq!(e.records[0].fields[1].ty, "string");
        assert!(e.declares_type("color"));
        assert!(e.declares_type("v"));
        assert!(!e.declares_type("missing"));
    }

    #[test]
    fn unsupported_items_warn_but_do_not_fail() {
        let (ir, diags) = build_source(
            "package example:p;\n\
             interface i {\n\
                 flags perms { read, write }\n\
                 type code = u32;\n\
                 resource blob { read: func() -> list<u8>; }\n\
                 f: func() -> u32;\n\
             }\n\
             world w { export i; }",
        );
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings.len(), 3);
        assert_eq!(ir.interfaces[0].functions.len(), 1);
    }

    #[test]
    fn duplicate_names_are_reported() {
        let (_, diags) = build_source(
            "package example:p;\n\
             interface i { f: func(a: u32, a: u32); f: func(); }\n\
             world w { export i; }",
        );
        assert!(diags
            .warnings
            .iter()
            .any(|w| w.contains("duplicate parameter")));
        assert!(diags
            .warnings
            .iter()
            .any(|w| w.contains("duplicate function `f`")));
    }
}
