//! Conversion pipeline: registry pass, table pass, relation pass,
//! resolution and emission.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::extractor::columns::extract_columns;
use crate::extractor::context::ConversionContext;
use crate::extractor::registry::{register_modules, BuilderNames};
use crate::extractor::relations::collect_relations;
use crate::extractor::table_extras::apply_table_extras;
use crate::generator::entity_schema::render_file;
use crate::generator::model::{Entity, SourceFile};
use crate::generator::resolver::resolve_relations;
use crate::parser::expr::root_call;
use crate::parser::names::with_extension;
use crate::parser::ts_parser::{parse_module, Module};

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Recognized table and enum builder names.
    pub builders: BuilderNames,
    /// Extension given to output units, without the dot.
    pub output_extension: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            builders: BuilderNames::default(),
            output_extension: "js".to_string(),
        }
    }
}

/// Result of a conversion run.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Output file name → generated source, one entry per input file that
    /// declares at least one table.
    pub outputs: BTreeMap<String, String>,
    /// Resolved entity model, in registration order.
    pub entities: Vec<Entity>,
}

/// Convert an ordered list of source files.
///
/// Any parse failure aborts the whole batch; structural mismatches degrade
/// without failing.
pub fn convert_sources(files: &[SourceFile], options: &ConvertOptions) -> Result<Conversion> {
    let modules = files
        .iter()
        .map(|file| parse_module(&file.file_name, &file.content))
        .collect::<Result<Vec<Module>>>()?;

    let ctx = build_model(&modules, &options.builders);

    let mut outputs = BTreeMap::new();
    for file in files {
        let entities: Vec<&Entity> = ctx.entities_in_file(&file.file_name).collect();
        if entities.is_empty() {
            debug!(file = %file.file_name, "no tables declared; nothing to emit");
            continue;
        }
        let output_name = with_extension(&file.file_name, &options.output_extension);
        outputs.insert(output_name, render_file(&entities));
    }

    info!(
        files = files.len(),
        outputs = outputs.len(),
        entities = ctx.entities().len(),
        "conversion finished"
    );

    Ok(Conversion {
        outputs,
        entities: ctx.into_entities(),
    })
}

/// Run the three extraction passes and relation resolution over parsed
/// modules.
pub fn build_model(modules: &[Module], builders: &BuilderNames) -> ConversionContext {
    let mut ctx = ConversionContext::new();

    register_modules(modules, builders, &mut ctx);
    extract_tables(modules, builders, &mut ctx);
    collect_relations(modules, &mut ctx);
    resolve_relations(&mut ctx);

    ctx
}

fn extract_tables(modules: &[Module], builders: &BuilderNames, ctx: &mut ConversionContext) {
    for module in modules {
        for declaration in &module.declarations {
            let Some(root) = root_call(&declaration.init) else {
                continue;
            };
            if !builders.is_table_builder(root.name) {
                continue;
            }
            if !ctx.mark_populated(&declaration.name) {
                debug!(
                    variable = %declaration.name,
                    file = %module.file_name,
                    "table variable declared again; keeping the first column map"
                );
                continue;
            }

            let columns = match root.arg(1) {
                Some(definition) => extract_columns(definition, ctx),
                None => Default::default(),
            };
            let Some(entity) = ctx.entity_for_var_mut(&declaration.name) else {
                continue;
            };
            entity.columns = columns;
            if let Some(extras) = root.arg(2) {
                apply_table_extras(entity, extras);
            }
        }
    }
}
