use tracing::debug;

use crate::extractor::context::ConversionContext;
use crate::parser::expr::{root_call, Expr};
use crate::parser::names::to_pascal_case;
use crate::parser::ts_parser::Module;

/// Builder names recognized by the registry pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderNames {
    /// Functions that declare a table.
    pub tables: Vec<String>,
    /// Functions that declare a named enum type.
    pub enums: Vec<String>,
}

impl Default for BuilderNames {
    fn default() -> Self {
        Self {
            tables: ["pgTable", "mysqlTable", "sqliteTable"]
                .map(String::from)
                .to_vec(),
            enums: ["pgEnum", "mysqlEnum"].map(String::from).to_vec(),
        }
    }
}

impl BuilderNames {
    /// Whether `name` declares a table.
    pub fn is_table_builder(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t == name)
    }

    /// Whether `name` declares an enum type.
    pub fn is_enum_builder(&self, name: &str) -> bool {
        self.enums.iter().any(|e| e == name)
    }
}

/// Entity name for a table declaration.
///
/// A string-literal table name is converted from snake_case; otherwise the
/// declaring variable is used.
pub fn derive_entity_name(variable: &str, first_arg: Option<&Expr>) -> String {
    match first_arg.and_then(Expr::as_str) {
        Some(table_name) => to_pascal_case(table_name),
        None => to_pascal_case(variable),
    }
}

/// Pass 1: register every table and enum declaration across all modules.
pub fn register_modules(modules: &[Module], builders: &BuilderNames, ctx: &mut ConversionContext) {
    for module in modules {
        for declaration in &module.declarations {
            let Some(root) = root_call(&declaration.init) else {
                continue;
            };

            if builders.is_table_builder(root.name) {
                let first = root.arg(0);
                let name = derive_entity_name(&declaration.name, first);
                let table_name = first
                    .and_then(Expr::as_str)
                    .unwrap_or(&declaration.name)
                    .to_string();
                let entity =
                    ctx.register_table(&declaration.name, &name, &table_name, &module.file_name);
                debug!(
                    variable = %declaration.name,
                    entity = %entity.name,
                    file = %module.file_name,
                    "registered table"
                );
            } else if builders.is_enum_builder(root.name) {
                let values = root
                    .arg(1)
                    .and_then(Expr::as_array)
                    .map(|items| items.iter().filter_map(enum_literal).collect())
                    .unwrap_or_default();
                ctx.register_enum(&declaration.name, values);
            }
        }
    }
}

/// String value of an enum member: a string literal or a symbolic member
/// access such as `Role.Admin`, which contributes its member name.
pub fn enum_literal(expr: &Expr) -> Option<String> {
    match expr.unparen() {
        Expr::Str(value) => Some(value.clone()),
        member @ Expr::Member { .. } => member.member_property().map(str::to_string),
        _ => None,
    }
}
