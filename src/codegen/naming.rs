use check_keyword::CheckKeyword;
use heck::{ToShoutySnakeCase, ToSnakeCase};

use crate::ast::namespace_segments;

/// Names the generated method bodies bind themselves. Parameters spelled the
/// same way get a trailing underscore.
const RESERVED_LOCALS: &[&str] = &["request", "reply", "response", "status", "ret"];

/// Turns an IDL name into a usable Rust identifier.
pub fn ident(name: &str) -> String {
    if ["crate", "self", "super", "Self"].contains(&name) {
        // Not allowed as raw identifiers.
        format!("{name}_")
    } else if name.is_keyword() {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

pub fn module_name(name: &str) -> String {
    ident(&name.to_snake_case())
}

pub fn method_name(name: &str) -> String {
    ident(&name.to_snake_case())
}

pub fn param_name(name: &str) -> String {
    let snake = name.to_snake_case();
    if RESERVED_LOCALS.contains(&snake.as_str()) {
        format!("{snake}_")
    } else {
        ident(&snake)
    }
}

pub fn field_name(name: &str) -> String {
    ident(&name.to_snake_case())
}

pub fn const_name(name: &str) -> String {
    ident(&name.to_shouty_snake_case())
}

/// The module path of a namespace, relative to the generated root
/// (`Das::ExportInterface` -> `das::export_interface`).
pub fn namespace_path(namespace: &str) -> Vec<String> {
    namespace_segments(namespace).map(module_name).collect()
}
