use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion run.
///
/// Structural mismatches inside otherwise valid sources (unknown column types,
/// unresolved foreign keys, missing relation targets) are not errors: they are
/// logged and the conversion degrades instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Source text could not be parsed as TypeScript.
    #[error("{file}:{line}:{column}: syntax error near `{snippet}`")]
    Parse {
        /// Name of the offending source file.
        file: String,
        /// 1-based line of the first syntax error.
        line: usize,
        /// 1-based column of the first syntax error.
        column: usize,
        /// Source text of the erroneous node, truncated.
        snippet: String,
    },

    /// The TypeScript grammar could not be loaded into the parser.
    #[error("failed to load TypeScript grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization of the entity model failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A `git` invocation exited unsuccessfully.
    #[error("`git {args}` failed: {stderr}")]
    Git {
        /// Space-joined git arguments.
        args: String,
        /// Captured standard error of the git process.
        stderr: String,
    },

    /// The requested subfolder does not exist after the sparse checkout.
    #[error("subfolder '{subfolder}' not found in {}", checkout.display())]
    SubfolderMissing {
        /// Subfolder requested by the caller.
        subfolder: String,
        /// Checkout directory that was searched.
        checkout: PathBuf,
    },

    /// An output file name would escape the output directory.
    #[error("invalid output name '{name}': {reason}")]
    InvalidOutputName {
        /// Rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },
}
