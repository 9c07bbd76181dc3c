//! Normalized entity model shared by the extractors, the resolver and the
//! emitter.
//!
//! Entities are created by the registry pass, filled with columns, keys and
//! indices by the table pass, and receive their relations only after every
//! entity exists. Emission reads the model and never mutates it.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// One input file: its name and full source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name, used to group entities and to name the output unit.
    pub file_name: String,
    /// Full TypeScript source.
    pub content: String,
}

impl SourceFile {
    /// Build a source file from a name and its content.
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Column default value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// Numeric literal.
    Number(f64),
    /// String literal, emitted re-quoted.
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Explicit `null` default.
    Null,
    /// The column has a default computed at runtime; its value is unknown.
    Computed,
}

/// Storage type and constraints of one entity property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Target column type, `"text"` when the builder is unknown.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Part of the primary key.
    pub primary: bool,
    /// Single-column unique constraint.
    pub unique: bool,
    /// Array column.
    pub array: bool,
    /// Generation strategy (`"uuid"` or `"increment"`).
    pub generated: Option<String>,
    /// Declared default.
    pub default: Option<DefaultValue>,
    /// Set on insert by the runtime.
    pub create_date: bool,
    /// Refreshed on update by the runtime.
    pub update_date: bool,
    /// Allowed values of an enum column, in declaration order.
    #[serde(rename = "enum")]
    pub enum_values: Vec<String>,
    /// Character length.
    pub length: Option<u32>,
    /// Numeric precision.
    pub precision: Option<u32>,
    /// Numeric scale.
    pub scale: Option<u32>,
    /// Physical column name, only when it differs from the property key.
    pub name: Option<String>,
    /// Table variable this column references through `references()`.
    pub references_var: Option<String>,
    /// Referential action on delete, as written in the source.
    pub on_delete: Option<String>,
    /// Referential action on update, as written in the source.
    pub on_update: Option<String>,
    /// Cascade flag passed alongside the reference.
    pub cascade: Option<bool>,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            column_type: "text".to_string(),
            nullable: true,
            primary: false,
            unique: false,
            array: false,
            generated: None,
            default: None,
            create_date: false,
            update_date: false,
            enum_values: Vec::new(),
            length: None,
            precision: None,
            scale: None,
            name: None,
            references_var: None,
            on_delete: None,
            on_update: None,
            cascade: None,
        }
    }
}

/// Final cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    /// This entity has many of the target.
    OneToMany,
    /// Many of this entity point at one target.
    ManyToOne,
    /// One-to-one association.
    OneToOne,
    /// Many-to-many association through a join table.
    ManyToMany,
}

impl RelationType {
    /// Name used by the target runtime.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::OneToMany => "one-to-many",
            RelationType::ManyToOne => "many-to-one",
            RelationType::OneToOne => "one-to-one",
            RelationType::ManyToMany => "many-to-many",
        }
    }

    /// True for the kinds that may hold a join column.
    pub fn is_singular(self) -> bool {
        matches!(self, RelationType::ManyToOne | RelationType::OneToOne)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relation builder as declared in the source, before any refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum RelationKind {
    /// `many(target)`.
    Many,
    /// `one(target, ...)`.
    One,
    /// Any other builder name.
    Other(String),
}

impl RelationKind {
    /// Classify a relation builder name.
    pub fn from_builder(name: &str) -> Self {
        match name {
            "many" => RelationKind::Many,
            "one" => RelationKind::One,
            other => RelationKind::Other(other.to_string()),
        }
    }
}

/// A relation property of an entity.
///
/// The collector produces one-directional stubs with `inverse_side` unset;
/// the resolver pairs them and refines `rel_type` and `is_owner`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    /// Entity declaring the relation.
    pub from_entity: String,
    /// Table variable of the declaring entity.
    pub from_var: String,
    /// Relation property name on the declaring entity.
    pub local_name: String,
    /// Target entity.
    pub to_entity: String,
    /// Table variable of the target entity.
    pub to_var: String,
    /// Inferred, then refined, cardinality.
    pub rel_type: RelationType,
    /// Property name of the paired relation on the target.
    pub inverse_side: Option<String>,
    /// Physical join column, when one could be resolved.
    pub join_column_name: Option<String>,
    /// Holds the foreign key or the join table.
    pub is_owner: bool,
    /// Referential action on delete.
    pub on_delete: Option<String>,
    /// Referential action on update.
    pub on_update: Option<String>,
    /// Cascade flag.
    pub cascade: Option<bool>,
    /// Declared builder.
    pub orig_kind: RelationKind,
    /// The declaration listed explicit foreign-key `fields`.
    pub explicit_fields: bool,
    /// `relationName` grouping label. Pairing does not consult it.
    pub custom_name: Option<String>,
}

/// A named index over one or more properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Property names in source order.
    pub columns: Vec<String>,
    /// Unique index.
    pub unique: bool,
}

/// Logical record type derived from one table declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Unique entity name.
    pub name: String,
    /// Physical table name.
    pub table_name: String,
    /// Variable the table was declared as.
    pub variable: String,
    /// File the declaration came from.
    pub file_name: String,
    /// Columns keyed by property name, in declaration order.
    pub columns: IndexMap<String, Column>,
    /// Resolved relations, in collection order.
    pub relations: Vec<Relation>,
    /// Indices, in declaration order.
    pub indices: Vec<Index>,
}

impl Entity {
    /// Create an entity with no columns, relations or indices.
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        variable: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            variable: variable.into(),
            file_name: file_name.into(),
            columns: IndexMap::new(),
            relations: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Look up a column by property name.
    pub fn column(&self, property: &str) -> Option<&Column> {
        self.columns.get(property)
    }

    /// Look up a relation by property name.
    pub fn relation(&self, local_name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.local_name == local_name)
    }
}
