/// Column type used when a builder is not in the table.
pub const FALLBACK_TYPE: &str = "text";

/// Column builder name → target column type.
const COLUMN_TYPES: &[(&str, &str)] = &[
    ("uuid", "uuid"),
    ("text", "text"),
    ("varchar", "varchar"),
    ("char", "char"),
    ("citext", "citext"),
    ("integer", "int"),
    ("int", "int"),
    ("smallint", "smallint"),
    ("bigint", "bigint"),
    ("serial", "int"),
    ("smallserial", "smallint"),
    ("bigserial", "bigint"),
    ("real", "real"),
    ("doublePrecision", "double precision"),
    ("double", "double precision"),
    ("numeric", "numeric"),
    ("decimal", "decimal"),
    ("boolean", "boolean"),
    ("timestamp", "timestamp"),
    ("date", "date"),
    ("time", "time"),
    ("interval", "interval"),
    ("json", "json"),
    ("jsonb", "jsonb"),
    ("inet", "inet"),
    ("cidr", "cidr"),
    ("macaddr", "macaddr"),
    ("bytea", "bytea"),
    ("blob", "blob"),
];

/// Builders whose values the database generates from a sequence.
const INCREMENT_BUILDERS: &[&str] = &["serial", "smallserial", "bigserial"];

/// Map a column builder name to its target type, if known.
pub fn column_type(builder: &str) -> Option<&'static str> {
    COLUMN_TYPES
        .iter()
        .find(|(name, _)| *name == builder)
        .map(|(_, ty)| *ty)
}

/// Whether the builder implies an auto-increment column.
pub fn is_increment_builder(builder: &str) -> bool {
    INCREMENT_BUILDERS.contains(&builder)
}

/// Primitive category of a column type for generated type annotations.
///
/// Returns one of `string`, `number`, `boolean`, `Date` or `object`.
pub fn type_category(column_type: &str) -> &'static str {
    match column_type {
        "int" | "smallint" | "real" | "double precision" => "number",
        "bigint" | "numeric" | "decimal" => "string",
        "boolean" => "boolean",
        "timestamp" | "timestamptz" | "date" => "Date",
        "json" | "jsonb" => "object",
        _ => "string",
    }
}
