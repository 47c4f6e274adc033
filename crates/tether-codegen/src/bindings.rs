//! Emits the WAMR registration glue: `<prefix>_wamr.cpp` with one
//! `NativeSymbol` array per Import interface plus the register/unregister
//! helpers, and the `<prefix>_wamr.hpp` header declaring its public
//! surface.

use std::fmt::Write;

use anyhow::{bail, Result};
use tether_cpp::{find_collision, sanitize};
use tether_wit::ir::{Direction, Interface};

use crate::map_function;

/// Generates `<prefix>_wamr.cpp`. `glue_header` and `header` are the file
/// names referenced from include directives and comments.
pub fn generate_glue(
    interfaces: &[Interface],
    package: &str,
    glue_header: &str,
    header: &str,
) -> Result<String> {
    let imports: Vec<&Interface> = interfaces
        .iter()
        .filter(|iface| iface.direction == Direction::Import)
        .collect();
    if let Some((first, second)) = find_collision(imports.iter().map(|iface| iface.name.as_str()))
    {
        bail!(
            "import interfaces `{first}` and `{second}` map to the same symbol array name `{}_symbols`",
            sanitize(&first),
        );
    }

    let mut out = String::new();
    writeln!(out, "#include \"{glue_header}\"")?;
    writeln!(out)?;
    writeln!(out, "#include <stdexcept>")?;
    writeln!(out, "#include <vector>")?;
    writeln!(out)?;
    writeln!(out, "// Generated WAMR bindings for package: {package}")?;
    writeln!(
        out,
        "// These symbol arrays can be used with wasm_runtime_register_natives_raw()"
    )?;
    writeln!(
        out,
        "// NOTE: You must implement the functions declared in the host namespace"
    )?;
    writeln!(
        out,
        "// (See {header} for declarations, provide implementations in your host code)"
    )?;
    writeln!(out)?;
    writeln!(out, "using namespace cmcpp;")?;
    writeln!(out)?;
    writeln!(out, "// WAMR Native Symbol arrays organized by interface")?;
    writeln!(
        out,
        "// Register these with wasm_runtime_register_natives_raw(namespace, array, count)"
    )?;
    writeln!(out)?;

    // (module name, array name, registered entry count)
    let mut registrations: Vec<(String, String, usize)> = Vec::new();
    for iface in &imports {
        let array = format!("{}_symbols", sanitize(&iface.name));
        let module = iface.module_name();

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        for func in &iface.functions {
            let mapped = map_function(func, iface);
            if !mapped.unsupported.is_empty() {
                skipped.push(func.name.as_str());
                continue;
            }
            // Entries pair the original kebab-case WIT name with the
            // sanitized host function the runtime should dispatch to.
            let target = if iface.synthetic {
                format!("host::{}", sanitize(&func.name))
            } else {
                format!("host::{}::{}", sanitize(&iface.name), sanitize(&func.name))
            };
            entries.push(format!("    host_function(\"{}\", {target}),", func.name));
        }

        writeln!(out, "// Import interface: {}", iface.name)?;
        writeln!(
            out,
            "// Register with: wasm_runtime_register_natives_raw(\"{module}\", {array}, {})",
            entries.len()
        )?;
        writeln!(out, "NativeSymbol {array}[] = {{")?;
        for entry in &entries {
            writeln!(out, "{entry}")?;
        }
        for name in &skipped {
            writeln!(out, "    // TODO: {name} - uses unsupported types; not registered")?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;

        registrations.push((module, array, entries.len()));
    }

    writeln!(out, "// Get all import interfaces for registration")?;
    writeln!(out, "// Usage:")?;
    writeln!(out, "//   for (const auto& reg : get_import_registrations()) {{")?;
    writeln!(
        out,
        "//       wasm_runtime_register_natives_raw(reg.module_name, reg.symbols, reg.count);"
    )?;
    writeln!(out, "//   }}")?;
    writeln!(
        out,
        "std::vector<NativeRegistration> get_import_registrations() {{"
    )?;
    writeln!(out, "    return {{")?;
    for (module, array, count) in &registrations {
        writeln!(out, "        {{\"{module}\", {array}, {count}}},")?;
    }
    writeln!(out, "    }};")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(
        out,
        "// Helper function to register all import interfaces at once"
    )?;
    writeln!(out, "// Returns the number of functions registered")?;
    writeln!(out, "int register_all_imports() {{")?;
    writeln!(out, "    int count = 0;")?;
    writeln!(out, "    for (const auto& reg : get_import_registrations()) {{")?;
    writeln!(
        out,
        "        if (!wasm_runtime_register_natives_raw(reg.module_name, reg.symbols, reg.count)) {{"
    )?;
    writeln!(out, "            return -1;  // Registration failed")?;
    writeln!(out, "        }}")?;
    writeln!(out, "        count += reg.count;")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    return count;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "// Helper function to unregister all import interfaces")?;
    writeln!(out, "void unregister_all_imports() {{")?;
    writeln!(out, "    for (const auto& reg : get_import_registrations()) {{")?;
    writeln!(
        out,
        "        wasm_runtime_unregister_natives(reg.module_name, reg.symbols);"
    )?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "// WASM file utilities")?;
    writeln!(out, "namespace wasm_utils {{")?;
    writeln!(out)?;
    writeln!(out, "const uint32_t DEFAULT_STACK_SIZE = 8192;")?;
    writeln!(out, "const uint32_t DEFAULT_HEAP_SIZE = 8192;")?;
    writeln!(out)?;
    writeln!(out, "}} // namespace wasm_utils")?;

    Ok(out)
}

/// Generates `<prefix>_wamr.hpp`, the public surface of the glue file.
pub fn generate_glue_header(package: &str, header: &str) -> Result<String> {
    let guard = "GENERATED_WAMR_BINDINGS_HPP";
    let mut out = String::new();
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "// Generated WAMR helper functions for package: {package}")?;
    writeln!(
        out,
        "// This header provides utility functions for initializing and using WAMR with Component Model bindings"
    )?;
    writeln!(out)?;
    writeln!(out, "#include <wamr.hpp>")?;
    writeln!(out, "#include <cmcpp.hpp>")?;
    writeln!(out, "#include \"{header}\"")?;
    writeln!(out)?;
    writeln!(out, "#include <span>")?;
    writeln!(out, "#include <stdexcept>")?;
    writeln!(out, "#include <vector>")?;
    writeln!(out)?;
    writeln!(out, "// Forward declarations")?;
    writeln!(out, "struct NativeSymbol;")?;
    writeln!(out, "struct NativeRegistration {{")?;
    writeln!(out, "    const char* module_name;")?;
    writeln!(out, "    NativeSymbol* symbols;")?;
    writeln!(out, "    size_t count;")?;
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "// Get all import interface registrations")?;
    writeln!(
        out,
        "// Returns a vector of all import interfaces that need to be registered with WAMR"
    )?;
    writeln!(out, "std::vector<NativeRegistration> get_import_registrations();")?;
    writeln!(out)?;
    writeln!(out, "// Register all import interfaces at once")?;
    writeln!(
        out,
        "// Returns the number of functions registered, or -1 on failure"
    )?;
    writeln!(out, "int register_all_imports();")?;
    writeln!(out)?;
    writeln!(out, "// Unregister all import interfaces")?;
    writeln!(out, "void unregister_all_imports();")?;
    writeln!(out)?;
    writeln!(out, "// WASM file utilities")?;
    writeln!(out, "namespace wasm_utils {{")?;
    writeln!(out)?;
    writeln!(out, "// Default WAMR runtime configuration")?;
    writeln!(out, "extern const uint32_t DEFAULT_STACK_SIZE;")?;
    writeln!(out, "extern const uint32_t DEFAULT_HEAP_SIZE;")?;
    writeln!(out)?;
    writeln!(out, "}} // namespace wasm_utils")?;
    writeln!(out)?;
    writeln!(out, "#endif // {guard}")?;
    Ok(out)
}
