use std::fmt::Write;
use std::path::Path;

use crate::convert::Conversion;
use crate::generator::model::RelationType;

/// One-line summary printed after a successful run.
pub fn build_summary(conversion: &Conversion, output_dir: &Path) -> String {
    format!(
        "Converted {} file(s) ({} entities) into {}",
        conversion.outputs.len(),
        conversion.entities.len(),
        output_dir.display()
    )
}

/// Per-entity breakdown printed with `--verbose`.
pub fn build_details(conversion: &Conversion) -> String {
    let mut details = String::new();

    for entity in &conversion.entities {
        writeln!(
            details,
            "{} ({}) from {}: {} columns, {} relations, {} indices",
            entity.name,
            entity.table_name,
            entity.file_name,
            entity.columns.len(),
            entity.relations.len(),
            entity.indices.len()
        )
        .unwrap();

        for relation in &entity.relations {
            let inverse = relation.inverse_side.as_deref().unwrap_or("-");
            let marker = match (relation.rel_type, relation.is_owner) {
                (RelationType::ManyToMany, true) => " [join table]",
                (_, true) => " [owner]",
                _ => "",
            };
            writeln!(
                details,
                "  {} -> {} {} (inverse: {inverse}){marker}",
                relation.local_name, relation.to_entity, relation.rel_type
            )
            .unwrap();
        }
    }

    details
}
