use indexmap::IndexMap;
use tracing::debug;

use crate::extractor::context::ConversionContext;
use crate::extractor::registry::enum_literal;
use crate::extractor::type_map;
use crate::generator::model::{Column, DefaultValue};
use crate::parser::expr::{call_chain, CallFrame, Expr};

/// Property name whose column is stamped on insert.
pub const CREATED_AT: &str = "createdAt";
/// Property name whose column is stamped on update.
pub const UPDATED_AT: &str = "updatedAt";

/// Literal emitted for defaults that read the current timestamp.
pub const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";

/// Extract every column of a table's column definition argument.
///
/// Accepts both the object form `{ id: uuid() }` and the callback form
/// `(t) => ({ id: t.uuid() })`.
pub fn extract_columns(definition: &Expr, ctx: &ConversionContext) -> IndexMap<String, Column> {
    let object = match definition.as_arrow() {
        Some((_, body)) => body,
        None => definition.unparen(),
    };
    let Some(entries) = object.as_object() else {
        debug!("column definition is not an object literal; no columns extracted");
        return IndexMap::new();
    };
    entries
        .iter()
        .map(|(property, value)| (property.clone(), extract_column(value, property, ctx)))
        .collect()
}

/// Turn one column-builder expression into a column descriptor.
///
/// Never fails: shapes outside the builder vocabulary produce a nullable
/// `text` column.
pub fn extract_column(expr: &Expr, property: &str, ctx: &ConversionContext) -> Column {
    let mut column = Column::default();
    let frames = call_chain(expr);

    if let Some((root, modifiers)) = frames.split_last() {
        apply_root(&mut column, root, property, ctx);
        for frame in modifiers.iter().rev() {
            apply_modifier(&mut column, frame, property);
        }
    } else {
        debug!(property, "column initializer is not a builder call");
    }

    apply_conventions(&mut column, property);
    column
}

fn apply_root(column: &mut Column, root: &CallFrame<'_>, property: &str, ctx: &ConversionContext) {
    if let Some(values) = ctx.enum_values(root.name) {
        column.column_type = "enum".to_string();
        column.enum_values = values.to_vec();
    } else {
        match type_map::column_type(root.name) {
            Some(ty) => column.column_type = ty.to_string(),
            None => debug!(
                property,
                builder = root.name,
                "unknown column builder, using {}",
                type_map::FALLBACK_TYPE
            ),
        }
        if type_map::is_increment_builder(root.name) {
            column.generated = Some("increment".to_string());
        }
    }

    if let Some(name) = root.arg(0).and_then(Expr::as_str) {
        if name != property {
            column.name = Some(name.to_string());
        }
    }

    let config = [root.arg(0), root.arg(1)]
        .into_iter()
        .flatten()
        .find(|arg| arg.as_object().is_some());
    if let Some(config) = config {
        apply_config(column, config);
    }
}

fn apply_config(column: &mut Column, config: &Expr) {
    column.length = config.get("length").and_then(as_size);
    column.precision = config.get("precision").and_then(as_size);
    column.scale = config.get("scale").and_then(as_size);

    if let Some(items) = config.get("enum").and_then(Expr::as_array) {
        column.column_type = "enum".to_string();
        column.enum_values = items.iter().filter_map(enum_literal).collect();
    }

    if config.get("withTimezone").and_then(Expr::as_bool) == Some(true) {
        column.column_type = "timestamptz".to_string();
    }
}

fn as_size(expr: &Expr) -> Option<u32> {
    let value = expr.as_number()?;
    (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

fn apply_modifier(column: &mut Column, frame: &CallFrame<'_>, property: &str) {
    match frame.name {
        "notNull" => column.nullable = false,
        "primaryKey" => {
            column.primary = true;
            column.nullable = false;
        }
        "unique" => column.unique = true,
        "array" => column.array = true,
        "$onUpdate" | "$onUpdateFn" => column.update_date = true,
        "default" => column.default = Some(coerce_default(frame.arg(0))),
        "$default" | "$defaultFn" => column.default = Some(DefaultValue::Computed),
        "defaultRandom" => {
            column.generated = Some("uuid".to_string());
            column.column_type = "uuid".to_string();
            column.nullable = false;
        }
        "defaultNow" => {
            if property != CREATED_AT {
                column.default = Some(DefaultValue::Computed);
            }
        }
        "generatedAlwaysAsIdentity" | "generatedByDefaultAsIdentity" => {
            column.generated = Some("increment".to_string());
            column.nullable = false;
        }
        "references" => apply_reference(column, frame),
        _ => {}
    }
}

/// Coerce a `.default(...)` argument into a default value.
pub fn coerce_default(arg: Option<&Expr>) -> DefaultValue {
    match arg.map(Expr::unparen) {
        Some(Expr::Number(value)) => DefaultValue::Number(*value),
        Some(Expr::Str(value)) | Some(Expr::Template(value)) => DefaultValue::Str(value.clone()),
        Some(Expr::Bool(value)) => DefaultValue::Bool(*value),
        Some(Expr::Null) => DefaultValue::Null,
        Some(Expr::TaggedTemplate { text, .. }) if is_current_timestamp(text) => {
            DefaultValue::Str(CURRENT_TIMESTAMP.to_string())
        }
        _ => DefaultValue::Computed,
    }
}

fn is_current_timestamp(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("current_timestamp") || lower.contains("now()")
}

fn apply_reference(column: &mut Column, frame: &CallFrame<'_>) {
    let target = frame.arg(0).map(|arg| match arg.as_arrow() {
        Some((_, body)) => body,
        None => arg,
    });
    match target.and_then(Expr::member_root) {
        Some(variable) => column.references_var = Some(variable.to_string()),
        None => debug!("references() target is not a property access"),
    }

    if let Some(options) = frame.arg(1).filter(|o| o.as_object().is_some()) {
        if let Some(action) = options.get("onDelete").and_then(Expr::as_str) {
            column.on_delete = Some(action.to_string());
        }
        if let Some(action) = options.get("onUpdate").and_then(Expr::as_str) {
            column.on_update = Some(action.to_string());
        }
        if let Some(cascade) = options.get("cascade").and_then(Expr::as_bool) {
            column.cascade = Some(cascade);
        }
    }
}

fn apply_conventions(column: &mut Column, property: &str) {
    if property == CREATED_AT {
        column.create_date = true;
        column.nullable = false;
    } else if property == UPDATED_AT {
        column.update_date = true;
    }
    if column.primary {
        column.nullable = false;
    }
}
