use tracing::{debug, warn};

use crate::generator::model::{Entity, Index};
use crate::parser::expr::{call_chain, chain_receiver, CallFrame, Expr};

/// Apply a table's extra-configuration callback to its entity.
///
/// The callback may return an object literal (`{ pk: primaryKey(...) }`) or
/// an array literal (`[primaryKey(...), index(...)]`). Composite primary keys
/// flag their columns; index builders append [`Index`] entries.
pub fn apply_table_extras(entity: &mut Entity, extras: &Expr) {
    let body = match extras.as_arrow() {
        Some((_, body)) => body,
        None => extras.unparen(),
    };

    let entries: Vec<(Option<&str>, &Expr)> = if let Some(object) = body.as_object() {
        object
            .iter()
            .map(|(key, value)| (Some(key.as_str()), value))
            .collect()
    } else if let Some(items) = body.as_array() {
        items.iter().map(|item| (None, item)).collect()
    } else {
        debug!(entity = %entity.name, "table extras are neither an object nor an array");
        return;
    };

    for (key, value) in entries {
        let frames = call_chain(value);
        let Some(root) = frames.last() else {
            continue;
        };
        match root.name {
            "primaryKey" => apply_primary_key(entity, root),
            "index" | "uniqueIndex" | "unique" => {
                let index = build_index(&entity.table_name, key, &frames);
                entity.indices.push(index);
            }
            other => debug!(entity = %entity.name, builder = other, "ignoring table extra"),
        }
    }
}

fn apply_primary_key(entity: &mut Entity, root: &CallFrame<'_>) {
    let columns: Vec<&str> = match root.arg(0).and_then(|cfg| cfg.get("columns")) {
        Some(list) => list
            .as_array()
            .unwrap_or_default()
            .iter()
            .filter_map(Expr::member_property)
            .collect(),
        None => root.args.iter().filter_map(Expr::member_property).collect(),
    };

    for property in columns {
        match entity.columns.get_mut(property) {
            Some(column) => {
                column.primary = true;
                column.nullable = false;
            }
            None => warn!(
                entity = %entity.name,
                column = property,
                "composite primary key names an unknown column"
            ),
        }
    }
}

fn build_index(table_name: &str, key: Option<&str>, frames: &[CallFrame<'_>]) -> Index {
    let root = frames.last();
    let unique = root.is_some_and(|r| r.name != "index");

    let columns: Vec<String> = frames
        .iter()
        .rev()
        .filter(|frame| frame.name == "on")
        .flat_map(|frame| frame.args.iter())
        .filter_map(|arg| index_column(table_name, arg))
        .collect();

    let name = root
        .and_then(|r| r.arg(0))
        .and_then(Expr::as_str)
        .map(str::to_string)
        .or_else(|| key.map(str::to_string))
        .unwrap_or_else(|| format!("{table_name}_{}_idx", columns.join("_")));

    Index {
        name,
        columns,
        unique,
    }
}

/// Column named by one `.on(...)` argument.
///
/// Ordering modifiers such as `t.col.desc()` resolve to their column. Other
/// expressions are kept by their text when they have one.
fn index_column(table_name: &str, arg: &Expr) -> Option<String> {
    let receiver = chain_receiver(arg);
    if let Some(column) = receiver.member_property().or_else(|| receiver.as_str()) {
        return Some(column.to_string());
    }

    let text = match receiver {
        Expr::TaggedTemplate { tag, text } => Some(format!("{tag}`{text}`")),
        Expr::Template(text) => Some(text.clone()),
        Expr::Ident(name) => Some(name.clone()),
        _ => None,
    };
    match &text {
        Some(text) => warn!(table = table_name, expression = %text, "index argument is not a column; keeping its text"),
        None => warn!(table = table_name, "index argument is not a column and has no text; dropping it"),
    }
    text
}
