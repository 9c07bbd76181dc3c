/// Column descriptors from column-builder chains.
pub mod columns;
/// Conversion state threaded through the extraction passes.
pub mod context;
/// Pass 1: table and enum registration.
pub mod registry;
/// Pass 3: relation stubs from `relations(...)` declarations.
pub mod relations;
/// Composite primary keys and indices from the table's third argument.
pub mod table_extras;
/// Builder name to column type lookup.
pub mod type_map;
