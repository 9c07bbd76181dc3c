//! CLI entry point for `drizzle2typeorm`.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use drizzle2typeorm::convert::{convert_sources, ConvertOptions};
use drizzle2typeorm::fetch;
use drizzle2typeorm::generator::model::SourceFile;
use drizzle2typeorm::output::{formatter, report};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "drizzle2typeorm",
    about = "Convert Drizzle ORM table definitions into TypeORM EntitySchema files"
)]
struct Cli {
    /// Directory holding the Drizzle schema files
    #[arg(long, default_value = "drizzle")]
    input_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "typeorm-output")]
    output_dir: PathBuf,

    /// Git repository to fetch the schema from
    #[arg(long, requires = "subfolder")]
    repo: Option<String>,

    /// Folder inside the repository holding the schema files
    #[arg(long, requires = "repo")]
    subfolder: Option<String>,

    /// Extension of the generated files
    #[arg(long, default_value = "js")]
    extension: String,

    /// Also write the resolved entity model as JSON
    #[arg(long)]
    emit_model: bool,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Fetch mode clones into the input dir; those files are removed once converted.
    let fetched = match (&cli.repo, &cli.subfolder) {
        (Some(repo), Some(subfolder)) => {
            match fetch::fetch_subfolder(repo, subfolder, &cli.input_dir) {
                Ok(files) => Some(files),
                Err(e) => {
                    eprintln!("Error fetching {repo}: {e}");
                    process::exit(2);
                }
            }
        }
        _ => None,
    };

    let sources = match read_sources(&cli.input_dir) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.input_dir.display());
            process::exit(2);
        }
    };

    if sources.is_empty() {
        eprintln!("No .ts files found in {}", cli.input_dir.display());
        process::exit(2);
    }

    let options = ConvertOptions {
        output_extension: cli.extension.trim_start_matches('.').to_string(),
        ..ConvertOptions::default()
    };
    let conversion = match convert_sources(&sources, &options) {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("Conversion error: {e}");
            process::exit(2);
        }
    };

    if let Err(e) = formatter::write_output(&cli.output_dir, &conversion, cli.emit_model) {
        eprintln!("Error writing output: {e}");
        process::exit(2);
    }

    if let Some(files) = fetched {
        for file in files {
            if let Err(e) = std::fs::remove_file(&file) {
                warn!(file = %file.display(), "failed to remove fetched file: {e}");
            }
        }
    }

    if cli.verbose {
        eprint!("{}", report::build_details(&conversion));
    }
    println!("{}", report::build_summary(&conversion, &cli.output_dir));
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_sources(dir: &Path) -> std::io::Result<Vec<SourceFile>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "ts") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(file = %file_name, bytes = content.len(), "read source");
        sources.push(SourceFile::new(file_name, content));
    }
    Ok(sources)
}
