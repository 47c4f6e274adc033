pub mod identifier;
pub mod types;

pub use identifier::{find_collision, include_guard, replace_separators, sanitize};
pub use types::{map_type, CppType, TypeScope, MONOSTATE};
