//! Syntax tree produced by the parser.
//!
//! The tree covers the full WIT surface syntax. Constructs the binding
//! emitter does not handle (resources, flags, type aliases, `include`,
//! `use`) still appear here; the IR builder decides what to keep.
//!
//! Type references are stored as canonical text with interior whitespace
//! removed (`tuple<u32,string>`), the form the type mapper consumes.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFile {
    /// Raw text of the first `package` declaration, e.g. `example:sample@1.0.0`.
    pub package: Option<String>,
    pub items: Vec<TopLevelItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopLevelItem {
    Interface(InterfaceDecl),
    World(WorldDecl),
    Use(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub items: Vec<InterfaceItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceItem {
    Record(RecordDecl),
    Variant(VariantDecl),
    Enum(EnumDecl),
    Flags(FlagsDecl),
    TypeAlias(TypeAliasDecl),
    Func(FuncDecl),
    Use(String),
    Resource(ResourceDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<NamedType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDecl {
    pub name: String,
    pub cases: Vec<VariantCaseDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCaseDecl {
    pub name: String,
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub cases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagsDecl {
    pub name: String,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<NamedType>,
    pub results: Vec<String>,
}

/// Parsed but never bound; methods and constructors are kept only so the
/// parser can validate the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDecl {
    pub name: String,
    pub functions: Vec<FuncDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldDecl {
    pub name: String,
    pub items: Vec<WorldItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldItem {
    Import(ExternItem),
    Export(ExternItem),
    Use(String),
    Include(String),
    Type(Box<InterfaceItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternItem {
    /// `import i;` or `import wasi:clocks/monotonic-clock;`
    Path(String),
    /// `import log: func(msg: string);`
    Func { name: String, func: FuncDecl },
    /// `import host: interface { ... }`
    Interface {
        name: String,
        items: Vec<InterfaceItem>,
    },
}
