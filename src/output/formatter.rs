use std::path::{Component, Path, PathBuf};

use crate::convert::Conversion;
use crate::error::{Error, Result};

/// File the resolved entity model is dumped to with `--emit-model`.
pub const MODEL_FILE: &str = "entities.model.json";

/// Write every generated unit into `output_dir`.
///
/// All names are validated before anything is written, so a bad name leaves
/// the directory untouched. Returns the written paths in name order.
pub fn write_output(output_dir: &Path, conversion: &Conversion, emit_model: bool) -> Result<Vec<PathBuf>> {
    for name in conversion.outputs.keys() {
        validate_output_name(name)?;
    }

    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(conversion.outputs.len() + 1);
    for (name, content) in &conversion.outputs {
        let path = output_dir.join(name);
        std::fs::write(&path, content)?;
        written.push(path);
    }

    if emit_model {
        let path = output_dir.join(MODEL_FILE);
        let json = serde_json::to_string_pretty(&conversion.entities)?;
        std::fs::write(&path, json)?;
        written.push(path);
    }

    Ok(written)
}

fn validate_output_name(name: &str) -> Result<()> {
    let invalid = |reason| Error::InvalidOutputName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("output name must not be empty"));
    }
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return Err(invalid("absolute paths are not allowed"));
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return Err(invalid("traversal segments are not allowed"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("path separators are not allowed"));
    }
    Ok(())
}
