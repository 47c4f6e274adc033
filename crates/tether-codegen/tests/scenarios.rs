//! End-to-end checks over the parse -> build -> emit pipeline.

use tether_codegen::{generate_glue, generate_glue_header, generate_header};
use tether_wit::diag::Diagnostics;
use tether_wit::ir::{Direction, Interface};
use tether_wit::{builder, parser};

fn compile(source: &str) -> Vec<Interface> {
    let (file, errors) = parser::parse(source);
    assert!(errors.is_empty(), "parse errors: {errors:?}");
    let mut diags = Diagnostics::default();
    let ir = builder::build(&file, &mut diags);
    assert!(!diags.has_errors(), "build errors: {:?}", diags.errors);
    ir.interfaces
}

fn header_for(source: &str) -> String {
    generate_header(&compile(source), "sample").unwrap()
}

fn glue_for(source: &str, package: &str) -> String {
    generate_glue(&compile(source), package, "sample_wamr.hpp", "sample.hpp").unwrap()
}

#[test]
fn primitive_only_export_interface() {
    let header = header_for(
        "package example:p;\n\
         interface i { f: func(a: u32, b: u32) -> bool; }\n\
         world w { export i; }",
    );
    assert!(header.contains("namespace guest {"));
    assert!(header.contains("namespace i {"));
    assert!(header.contains("using f_t = cmcpp::bool_t(uint32_t, uint32_t);"));
    assert!(!header.contains("namespace host {"));
}

#[test]
fn import_and_export_of_the_same_interface() {
    let source = "package example:p;\n\
                  interface i { f: func(a: u32, b: u32) -> bool; }\n\
                  world w { import i; export i; }";
    let interfaces = compile(source);

    // Direction completeness: exactly one record per direction.
    assert_eq!(interfaces.len(), 2);
    assert_eq!(
        interfaces
            .iter()
            .filter(|i| i.direction == Direction::Import)
            .count(),
        1
    );
    assert_eq!(
        interfaces
            .iter()
            .filter(|i| i.direction == Direction::Export)
            .count(),
        1
    );

    let header = generate_header(&interfaces, "sample").unwrap();
    assert!(header.contains("cmcpp::bool_t f(uint32_t a, uint32_t b);"));
    assert!(header.contains("using f_t = cmcpp::bool_t(uint32_t, uint32_t);"));
}

#[test]
fn world_level_function_lands_at_the_top_of_the_host_section() {
    let source = "package example:p;\n\
                  interface i { g: func() -> u32; }\n\
                  world w { import i; import log: func(msg: string); }";
    let header = header_for(source);

    assert!(header.contains("// Standalone function: log"));
    assert!(header.contains("void log(cmcpp::string_t msg);"));
    let standalone = header.find("// Standalone function: log").unwrap();
    let interface = header.find("// Interface: i").unwrap();
    assert!(standalone < interface, "standalone functions come first");

    let glue = glue_for(source, "example:p");
    assert!(glue.contains("    host_function(\"log\", host::log),"));
    assert!(glue.contains("{\"$root\", log_symbols, 1},"));
    assert!(glue.contains("{\"example:p/i\", i_symbols, 1},"));
}

#[test]
fn variant_and_enum_definitions_precede_the_alias() {
    let header = header_for(
        "package example:p;\n\
         interface e {\n\
             enum color { red, green, blue }\n\
             variant v { none, some(u32) }\n\
             f: func(c: color, x: v) -> v;\n\
         }\n\
         world w { export e; }",
    );
    assert!(header.contains("enum class color {\n    red,\n    green,\n    blue\n};"));
    assert!(header.contains("using v = cmcpp::variant_t<cmcpp::monostate, uint32_t>;"));
    let types_pos = header.find("enum class color").unwrap();
    let alias_pos = header.find("using f_t = v(color, v);").unwrap();
    assert!(types_pos < alias_pos);
}

#[test]
fn undefined_local_type_skips_the_guest_signature() {
    let header = header_for(
        "package example:p;\n\
         interface x { f: func(v: v) -> v; }\n\
         world w { export x; }",
    );
    assert!(header.contains("// TODO: f - Type definitions for local types"));
    assert!(!header.contains("using f_t"));
}

#[test]
fn undefined_local_type_still_declares_the_host_function() {
    let source = "package example:p;\n\
                  interface x { f: func(v: v) -> v; }\n\
                  world w { import x; export x; }";
    let header = header_for(source);
    // Host side: declared verbatim with an inline warning.
    assert!(header.contains("// warning: unknown type 'v', using as-is"));
    assert!(header.contains("v f(v v);"));
    // Guest side: skipped.
    assert!(header.contains("// TODO: f - Type definitions for local types"));
    assert!(!header.contains("using f_t"));
}

#[test]
fn symbol_array_counts_match_import_function_counts() {
    let source = "package example:p;\n\
                  interface logging {\n\
                      log-bool: func(a: bool, s: string);\n\
                      log-u32: func(a: u32, s: string);\n\
                      log-str: func(a: string, s: string);\n\
                  }\n\
                  world w { import logging; }";
    let interfaces = compile(source);
    let import_functions: usize = interfaces
        .iter()
        .filter(|i| i.direction == Direction::Import)
        .map(|i| i.functions.len())
        .sum();
    assert_eq!(import_functions, 3);

    let glue = generate_glue(&interfaces, "example:p", "sample_wamr.hpp", "sample.hpp").unwrap();
    assert!(glue.contains("{\"example:p/logging\", logging_symbols, 3},"));
    assert!(glue.contains("    host_function(\"log-bool\", host::logging::log_bool),"));
    assert!(glue.contains("    host_function(\"log-u32\", host::logging::log_u32),"));
    assert!(glue.contains("    host_function(\"log-str\", host::logging::log_str),"));
}

#[test]
fn reparsing_the_same_input_yields_an_equal_ir() {
    let source = "package example:p;\n\
                  interface e {\n\
                      enum color { red, green, blue }\n\
                      variant v { none, some(u32) }\n\
                      f: func(c: color, x: v) -> v;\n\
                  }\n\
                  world w { import e; export e; import log: func(msg: string); }";
    assert_eq!(compile(source), compile(source));
}

#[test]
fn colliding_sanitized_names_abort_emission() {
    let interfaces = compile(
        "package example:p;\n\
         interface i { a-b: func(); a_b: func(); }\n\
         world w { export i; }",
    );
    let err = generate_header(&interfaces, "sample").unwrap_err();
    assert!(err.to_string().contains("a-b"));
    assert!(err.to_string().contains("a_b"));
}

#[test]
fn stream_typed_functions_become_todo_comments_everywhere() {
    let source = "package example:p;\n\
                  interface s { pump: func(input: stream<u8>) -> u32; ok: func() -> u32; }\n\
                  world w { import s; export s; }";
    let header = header_for(source);
    assert!(header.contains("// TODO: pump - uses unsupported types (stream<u8>); no binding generated"));
    assert!(!header.contains("uint32_t pump("));
    assert!(!header.contains("using pump_t"));
    // The supported sibling function is unaffected.
    assert!(header.contains("uint32_t ok();"));
    assert!(header.contains("using ok_t = uint32_t();"));

    let glue = glue_for(source, "example:p");
    assert!(glue.contains("    // TODO: pump - uses unsupported types; not registered"));
    assert!(glue.contains("{\"example:p/s\", s_symbols, 1},"));
}

#[test]
fn generated_files_reference_each_other() {
    let source = "package example:sample;\n\
                  interface i { f: func() -> u32; }\n\
                  world w { import i; }";
    let interfaces = compile(source);
    let header = generate_header(&interfaces, "sample").unwrap();
    let glue_header = generate_glue_header("example:sample", "sample.hpp").unwrap();
    let glue =
        generate_glue(&interfaces, "example:sample", "sample_wamr.hpp", "sample.hpp").unwrap();

    assert!(header.contains("#ifndef GENERATED_SAMPLE_HPP"));
    assert!(header.contains("#endif // GENERATED_SAMPLE_HPP"));
    assert!(glue_header.contains("#include \"sample.hpp\""));
    assert!(glue.contains("#include \"sample_wamr.hpp\""));
    assert!(glue.contains("// Generated WAMR bindings for package: example:sample"));
}
