//! Emits the `<prefix>.hpp` header: type declarations plus host function
//! declarations for every Import interface and guest signature aliases for
//! every Export interface.

use std::fmt::Write;

use anyhow::{bail, Result};
use tether_cpp::{find_collision, include_guard, replace_separators, sanitize, MONOSTATE};
use tether_cpp::types::map_type;
use tether_wit::ir::Interface;

use crate::{map_function, partition, InterfaceScope};

pub fn generate_header(interfaces: &[Interface], stem: &str) -> Result<String> {
    for iface in interfaces {
        check_collisions(iface)?;
    }

    let guard = include_guard(stem);
    let mut out = String::new();
    writeln!(out, "#pragma once")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include <cmcpp.hpp>")?;
    writeln!(out)?;
    writeln!(out, "// Generated host function declarations from WIT")?;
    writeln!(
        out,
        "// - 'host' namespace: Guest imports (host implements these)"
    )?;
    writeln!(
        out,
        "// - 'guest' namespace: Guest exports (guest implements these, host calls them)"
    )?;
    writeln!(out)?;

    let (imports, exports) = partition(interfaces);

    if !imports.is_empty() {
        writeln!(out, "namespace host {{")?;
        writeln!(out)?;
        // World-level functions come first, directly inside `host`.
        for iface in imports.iter().filter(|iface| iface.synthetic) {
            emit_host_standalone(&mut out, iface)?;
        }
        for iface in imports.iter().filter(|iface| !iface.synthetic) {
            emit_host_interface(&mut out, iface)?;
        }
        writeln!(out, "}} // namespace host")?;
        writeln!(out)?;
    }

    if !exports.is_empty() {
        writeln!(out, "namespace guest {{")?;
        writeln!(out)?;
        for iface in &exports {
            if iface.synthetic {
                emit_guest_standalone(&mut out, iface)?;
            } else {
                emit_guest_interface(&mut out, iface)?;
            }
        }
        writeln!(out, "}} // namespace guest")?;
        writeln!(out)?;
    }

    writeln!(out, "#endif // {guard}")?;
    Ok(out)
}

/// No silent overwrite: two distinct WIT names that sanitize to the same
/// C++ identifier inside one interface abort emission.
fn check_collisions(iface: &Interface) -> Result<()> {
    let names = iface
        .records
        .iter()
        .map(|r| r.name.as_str())
        .chain(iface.variants.iter().map(|v| v.name.as_str()))
        .chain(iface.enums.iter().map(|e| e.name.as_str()))
        .chain(iface.functions.iter().map(|f| f.name.as_str()));
    if let Some((first, second)) = find_collision(names) {
        bail!(
            "in interface `{}`: `{first}` and `{second}` map to the same C++ identifier `{}`",
            iface.name,
            sanitize(&first),
        );
    }
    Ok(())
}

fn emit_host_standalone(out: &mut String, iface: &Interface) -> Result<()> {
    writeln!(out, "// Standalone function: {}", iface.name)?;
    if !iface.package.is_empty() {
        writeln!(out, "// Package: {}", iface.package)?;
    }
    for func in &iface.functions {
        emit_host_function(out, iface, func)?;
    }
    Ok(())
}

fn emit_host_interface(out: &mut String, iface: &Interface) -> Result<()> {
    writeln!(out, "// Interface: {}", iface.name)?;
    if !iface.package.is_empty() {
        writeln!(out, "// Package: {}", iface.package)?;
    }
    writeln!(out, "namespace {} {{", sanitize(&iface.name))?;
    writeln!(out)?;
    emit_type_definitions(out, iface)?;
    for func in &iface.functions {
        emit_host_function(out, iface, func)?;
    }
    writeln!(out, "}} // namespace {}", sanitize(&iface.name))?;
    writeln!(out)?;
    Ok(())
}

fn emit_host_function(
    out: &mut String,
    iface: &Interface,
    func: &tether_wit::ir::FunctionSignature,
) -> Result<()> {
    let mapped = map_function(func, iface);
    if !mapped.unsupported.is_empty() {
        writeln!(
            out,
            "// TODO: {} - uses unsupported types ({}); no binding generated",
            func.name,
            mapped.unsupported.join(", ")
        )?;
        writeln!(out)?;
        return Ok(());
    }
    // Host declarations are emitted even with unknown types so the host
    // application sees the problem at compile time.
    for name in &mapped.unknown {
        eprintln!("Warning: Unknown type '{name}', using as-is");
        writeln!(out, "// warning: unknown type '{name}', using as-is")?;
    }
    let params: Vec<String> = mapped
        .params
        .iter()
        .map(|(name, ty)| format!("{ty} {name}"))
        .collect();
    writeln!(
        out,
        "{} {}({});",
        mapped.return_type,
        sanitize(&func.name),
        params.join(", ")
    )?;
    writeln!(out)?;
    Ok(())
}

fn emit_guest_standalone(out: &mut String, iface: &Interface) -> Result<()> {
    writeln!(out, "// Standalone function: {}", iface.name)?;
    if !iface.package.is_empty() {
        writeln!(out, "// Package: {}", iface.package)?;
    }
    for func in &iface.functions {
        emit_guest_function(out, iface, func)?;
    }
    Ok(())
}

fn emit_guest_interface(out: &mut String, iface: &Interface) -> Result<()> {
    writeln!(out, "// Interface: {}", iface.name)?;
    if !iface.package.is_empty() {
        writeln!(out, "// Package: {}", iface.package)?;
    }
    writeln!(out, "namespace {} {{", sanitize(&iface.name))?;
    writeln!(out)?;
    emit_type_definitions(out, iface)?;
    for func in &iface.functions {
        emit_guest_function(out, iface, func)?;
    }
    writeln!(out, "}} // namespace {}", sanitize(&iface.name))?;
    writeln!(out)?;
    Ok(())
}

fn emit_guest_function(
    out: &mut String,
    iface: &Interface,
    func: &tether_wit::ir::FunctionSignature,
) -> Result<()> {
    let mapped = map_function(func, iface);
    if !mapped.unsupported.is_empty() {
        writeln!(
            out,
            "// TODO: {} - uses unsupported types ({}); no binding generated",
            func.name,
            mapped.unsupported.join(", ")
        )?;
        writeln!(out)?;
        return Ok(());
    }
    // The host cannot call through an alias whose types do not exist, so
    // the whole signature is skipped.
    if !mapped.unknown.is_empty() {
        writeln!(
            out,
            "// TODO: {} - Type definitions for local types ({}) are missing; signature skipped",
            func.name,
            mapped.unknown.join(", ")
        )?;
        writeln!(out)?;
        return Ok(());
    }
    // The `_t` suffix keeps aliases clear of C++ keywords on its own.
    let alias = format!("{}_t", replace_separators(&func.name));
    writeln!(
        out,
        "// Guest function signature for use with guest_function<{alias}>()"
    )?;
    writeln!(
        out,
        "using {alias} = {}({});",
        mapped.return_type,
        mapped.param_types().join(", ")
    )?;
    writeln!(out)?;
    Ok(())
}

fn emit_type_definitions(out: &mut String, iface: &Interface) -> Result<()> {
    let scope = InterfaceScope(iface);

    for enum_def in &iface.enums {
        writeln!(out, "enum class {} {{", sanitize(&enum_def.name))?;
        for (i, case) in enum_def.cases.iter().enumerate() {
            let comma = if i + 1 < enum_def.cases.len() { "," } else { "" };
            writeln!(out, "    {}{comma}", sanitize(case))?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
    }

    for variant in &iface.variants {
        let cases: Vec<String> = variant
            .cases
            .iter()
            .map(|case| match &case.payload {
                Some(payload) => map_type(payload, &scope).to_string(),
                None => MONOSTATE.to_string(),
            })
            .collect();
        writeln!(
            out,
            "using {} = cmcpp::variant_t<{}>;",
            sanitize(&variant.name),
            cases.join(", ")
        )?;
        writeln!(out)?;
    }

    for record in &iface.records {
        writeln!(out, "struct {} {{", sanitize(&record.name))?;
        for field in &record.fields {
            writeln!(
                out,
                "    {} {};",
                map_type(&field.ty, &scope),
                sanitize(&field.name)
            )?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
    }

    Ok(())
}
