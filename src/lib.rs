//! Convert Drizzle ORM table definitions into TypeORM `EntitySchema` sources.
#![warn(missing_docs)]

/// Conversion pipeline entry point and options.
pub mod convert;
/// Crate error type.
pub mod error;
/// Extraction passes: entity registry, columns, table extras and relation stubs.
pub mod extractor;
/// Sparse git checkout of a schema folder.
pub mod fetch;
/// Entity model, relation resolution and `EntitySchema` rendering.
pub mod generator;
/// File output and run summaries.
pub mod output;
/// TypeScript parsing and expression lowering.
pub mod parser;

pub use convert::{convert_sources, Conversion, ConvertOptions};
pub use error::{Error, Result};
pub use generator::model::SourceFile;
