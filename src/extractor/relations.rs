use tracing::{debug, warn};

use crate::extractor::context::ConversionContext;
use crate::generator::model::{Column, Relation, RelationKind, RelationType};
use crate::parser::expr::{root_call, Expr};
use crate::parser::names::{to_pascal_case, to_snake_case};
use crate::parser::ts_parser::Module;

/// Name of the relation-declaration function.
pub const RELATIONS_BUILDER: &str = "relations";

/// Pass 3: turn every `relations(...)` declaration into relation stubs.
///
/// Must run after every table's columns are extracted: foreign-key discovery
/// reads the columns of the target entity.
pub fn collect_relations(modules: &[Module], ctx: &mut ConversionContext) {
    let mut stubs = Vec::new();

    for module in modules {
        for declaration in &module.declarations {
            let Some(root) = root_call(&declaration.init) else {
                continue;
            };
            if root.name != RELATIONS_BUILDER {
                continue;
            }

            let Some(owner_var) = root.arg(0).and_then(Expr::as_ident) else {
                debug!(declaration = %declaration.name, "relations() without a table variable");
                continue;
            };
            if ctx.entity_for_var(owner_var).is_none() {
                warn!(
                    declaration = %declaration.name,
                    table = owner_var,
                    file = %module.file_name,
                    "relations() for an unknown table; skipping"
                );
                continue;
            }

            let Some((params, body)) = root.arg(1).and_then(Expr::as_arrow) else {
                debug!(declaration = %declaration.name, "relations() without a callback");
                continue;
            };
            if params.len() > 1 {
                debug!(declaration = %declaration.name, "relations() callback takes more than one parameter");
            }
            let Some(entries) = body.as_object() else {
                continue;
            };

            for (local_name, value) in entries {
                if let Some(stub) = build_stub(ctx, owner_var, local_name, value) {
                    stubs.push(stub);
                }
            }
        }
    }

    debug!(count = stubs.len(), "collected relation stubs");
    ctx.stubs.extend(stubs);
}

/// Build a one-directional relation stub for `from_var.local_name`.
pub fn build_stub(
    ctx: &ConversionContext,
    from_var: &str,
    local_name: &str,
    value: &Expr,
) -> Option<Relation> {
    let from = ctx.entity_for_var(from_var)?;
    let root = root_call(value)?;
    let orig_kind = RelationKind::from_builder(root.name);

    let Some(to_var) = root.arg(0).and_then(Expr::as_ident) else {
        debug!(relation = local_name, "relation builder without a target table");
        return None;
    };
    let target = ctx.entity_for_var(to_var);
    let to_entity = match target {
        Some(entity) => entity.name.clone(),
        None => {
            warn!(
                entity = %from.name,
                relation = local_name,
                target = to_var,
                "relation targets an unknown table"
            );
            to_pascal_case(to_var)
        }
    };

    let options = root.arg(1).filter(|o| o.as_object().is_some());
    let fields = options
        .and_then(|o| o.get("fields"))
        .and_then(Expr::as_array)
        .filter(|items| !items.is_empty());
    let explicit_fields = fields.is_some();

    let rel_type = match orig_kind {
        RelationKind::Many => RelationType::OneToMany,
        RelationKind::One if explicit_fields => RelationType::ManyToOne,
        RelationKind::One => RelationType::OneToOne,
        RelationKind::Other(ref name) => {
            debug!(relation = local_name, builder = %name, "unknown relation builder, assuming many-to-one");
            RelationType::ManyToOne
        }
    };

    let (fk_property, fk_column): (Option<&str>, Option<&Column>) =
        match fields.and_then(|f| f.first()).and_then(Expr::member_property) {
            Some(field) => (
                Some(field),
                from.column(field)
                    .or_else(|| target.and_then(|t| t.column(field))),
            ),
            None => target
                .and_then(|t| {
                    t.columns
                        .iter()
                        .find(|(_, c)| c.references_var.as_deref() == Some(from_var))
                })
                .map_or((None, None), |(key, column)| (Some(key.as_str()), Some(column))),
        };

    let join_column_name = fk_property.map(|fk| {
        from.column(fk)
            .and_then(|c| c.name.clone())
            .or_else(|| target.and_then(|t| t.column(fk)).and_then(|c| c.name.clone()))
            .unwrap_or_else(|| to_snake_case(fk))
    });

    let option_str = |key: &str| {
        options
            .and_then(|o| o.get(key))
            .and_then(Expr::as_str)
            .map(str::to_string)
    };
    let on_delete = option_str("onDelete").or_else(|| fk_column.and_then(|c| c.on_delete.clone()));
    let on_update = option_str("onUpdate").or_else(|| fk_column.and_then(|c| c.on_update.clone()));
    let cascade = options
        .and_then(|o| o.get("cascade"))
        .and_then(Expr::as_bool)
        .or_else(|| fk_column.and_then(|c| c.cascade));

    let is_owner = rel_type.is_singular() && join_column_name.is_some();

    Some(Relation {
        from_entity: from.name.clone(),
        from_var: from_var.to_string(),
        local_name: local_name.to_string(),
        to_entity,
        to_var: to_var.to_string(),
        rel_type,
        inverse_side: None,
        join_column_name,
        is_owner,
        on_delete,
        on_update,
        cascade,
        orig_kind,
        explicit_fields,
        custom_name: option_str("relationName"),
    })
}
