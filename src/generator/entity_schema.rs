use std::fmt::Write;

use crate::extractor::type_map::type_category;
use crate::generator::model::{Column, DefaultValue, Entity, Index, Relation, RelationType};

/// Module the generated schemas import `EntitySchema` from.
const RUNTIME_MODULE: &str = "typeorm";

/// Render one output unit containing every entity of a source file.
pub fn render_file(entities: &[&Entity]) -> String {
    let mut out = String::new();
    writeln!(out, "import {{ EntitySchema }} from '{RUNTIME_MODULE}';").unwrap();

    for entity in entities {
        writeln!(out).unwrap();
        out.push_str(&render_type_annotation(entity));
        writeln!(out).unwrap();
        out.push_str(&render_entity(entity));
    }

    out
}

/// Render the JSDoc typedef describing an entity's properties.
pub fn render_type_annotation(entity: &Entity) -> String {
    let mut out = String::new();
    writeln!(out, "/**").unwrap();
    writeln!(out, " * @typedef {{Object}} {}", entity.name).unwrap();
    for (property, column) in &entity.columns {
        writeln!(out, " * @property {{{}}} {property}", annotation_type(column)).unwrap();
    }
    writeln!(out, " */").unwrap();
    out
}

fn annotation_type(column: &Column) -> String {
    let base = if column.column_type == "enum" && !column.enum_values.is_empty() {
        let union = column
            .enum_values
            .iter()
            .map(|v| js_string(v))
            .collect::<Vec<_>>()
            .join(" | ");
        if column.array {
            format!("({union})")
        } else {
            union
        }
    } else {
        type_category(&column.column_type).to_string()
    };

    if column.array {
        format!("{base}[]")
    } else {
        base
    }
}

/// Render the `EntitySchema` declaration of one entity.
pub fn render_entity(entity: &Entity) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "export const {}Entity = new EntitySchema({{",
        entity.name
    )
    .unwrap();
    writeln!(out, "  name: {},", js_string(&entity.name)).unwrap();
    writeln!(out, "  tableName: {},", js_string(&entity.table_name)).unwrap();

    writeln!(out, "  columns: {{").unwrap();
    for (property, column) in &entity.columns {
        writeln!(out, "    {}: {{", js_key(property)).unwrap();
        for (field, value) in column_fields(column) {
            writeln!(out, "      {field}: {value},").unwrap();
        }
        writeln!(out, "    }},").unwrap();
    }
    writeln!(out, "  }},").unwrap();

    if !entity.relations.is_empty() {
        writeln!(out, "  relations: {{").unwrap();
        for relation in &entity.relations {
            writeln!(out, "    {}: {{", js_key(&relation.local_name)).unwrap();
            for (field, value) in relation_fields(relation) {
                writeln!(out, "      {field}: {value},").unwrap();
            }
            writeln!(out, "    }},").unwrap();
        }
        writeln!(out, "  }},").unwrap();
    }

    if !entity.indices.is_empty() {
        writeln!(out, "  indices: [").unwrap();
        for index in &entity.indices {
            writeln!(out, "    {{").unwrap();
            for (field, value) in index_fields(index) {
                writeln!(out, "      {field}: {value},").unwrap();
            }
            writeln!(out, "    }},").unwrap();
        }
        writeln!(out, "  ],").unwrap();
    }

    writeln!(out, "}});").unwrap();
    out
}

/// Column fields in emission order: type, enum, precision, scale, length,
/// name, array, primary, generated, unique, nullable, default, createDate,
/// updateDate.
fn column_fields(column: &Column) -> Vec<(&'static str, String)> {
    let mut fields = vec![("type", js_string(&column.column_type))];
    let is_enum = column.column_type == "enum";

    if !column.enum_values.is_empty() {
        fields.push(("enum", js_array(&column.enum_values)));
    }
    if let Some(precision) = column.precision {
        fields.push(("precision", precision.to_string()));
    }
    if let Some(scale) = column.scale {
        fields.push(("scale", scale.to_string()));
    }
    if let Some(length) = column.length.filter(|_| !is_enum) {
        fields.push(("length", length.to_string()));
    }
    if let Some(name) = &column.name {
        fields.push(("name", js_string(name)));
    }
    if column.array {
        fields.push(("array", "true".to_string()));
    }
    if column.primary {
        fields.push(("primary", "true".to_string()));
    }
    if let Some(generated) = &column.generated {
        fields.push(("generated", js_string(generated)));
    }
    if column.unique {
        fields.push(("unique", "true".to_string()));
    }
    fields.push(("nullable", column.nullable.to_string()));
    if let Some(default) = &column.default {
        fields.push(("default", default_literal(default)));
    }
    if column.create_date {
        fields.push(("createDate", "true".to_string()));
    }
    if column.update_date {
        fields.push(("updateDate", "true".to_string()));
    }

    fields
}

fn default_literal(default: &DefaultValue) -> String {
    match default {
        DefaultValue::Number(value) => value.to_string(),
        DefaultValue::Str(value) => js_string(value),
        DefaultValue::Bool(value) => value.to_string(),
        DefaultValue::Null => "null".to_string(),
        DefaultValue::Computed => "true".to_string(),
    }
}

fn relation_fields(relation: &Relation) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("target", js_string(&relation.to_entity)),
        ("type", js_string(relation.rel_type.as_str())),
    ];

    if let Some(inverse) = &relation.inverse_side {
        fields.push(("inverseSide", js_string(inverse)));
    }

    let singular = relation.rel_type.is_singular();
    if singular && relation.is_owner {
        if let Some(join_column) = &relation.join_column_name {
            fields.push(("joinColumn", format!("{{ name: {} }}", js_string(join_column))));
        }
    }
    if relation.rel_type == RelationType::ManyToMany && relation.is_owner {
        fields.push(("joinTable", "true".to_string()));
    }

    if singular {
        if let Some(cascade) = relation.cascade {
            fields.push(("cascade", cascade.to_string()));
        }
        if let Some(action) = &relation.on_delete {
            fields.push(("onDelete", js_string(&referential_action(action))));
        }
        if let Some(action) = &relation.on_update {
            fields.push(("onUpdate", js_string(&referential_action(action))));
        }
    }

    fields
}

fn index_fields(index: &Index) -> Vec<(&'static str, String)> {
    vec![
        ("name", js_string(&index.name)),
        ("columns", js_array(&index.columns)),
        ("unique", index.unique.to_string()),
    ]
}

/// Upper-case a referential action (`"set null"` -> `"SET NULL"`).
fn referential_action(action: &str) -> String {
    action.trim().to_ascii_uppercase()
}

/// Single-quoted JavaScript string literal.
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn js_array(values: &[String]) -> String {
    let items = values.iter().map(|v| js_string(v)).collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

/// Object key, quoted only when it is not a plain identifier.
fn js_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        js_string(key)
    }
}
