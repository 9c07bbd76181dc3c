/// Writes the generated units (and optionally the entity model) to disk.
pub mod formatter;
/// Run summaries printed by the CLI.
pub mod report;
