use std::collections::{HashMap, HashSet};

use crate::generator::model::{Entity, Relation};

/// State threaded through the three extraction passes of one run.
///
/// Entities live in a `Vec` so iteration follows registration order; the
/// maps only index into it.
#[derive(Debug, Clone, Default)]
pub struct ConversionContext {
    entities: Vec<Entity>,
    by_var: HashMap<String, usize>,
    enums: HashMap<String, Vec<String>>,
    populated: HashSet<String>,
    /// One-directional relation stubs, in collection order.
    pub stubs: Vec<Relation>,
}

impl ConversionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) a table variable.
    ///
    /// Re-registering a variable overwrites its entity name, table name and
    /// file in place. A derived name already taken by another variable gets a
    /// numeric suffix so entity names stay unique.
    pub fn register_table(
        &mut self,
        variable: &str,
        derived_name: &str,
        table_name: &str,
        file_name: &str,
    ) -> &Entity {
        let existing = self.by_var.get(variable).copied();
        let name = self.unique_name(derived_name, existing);

        let idx = match existing {
            Some(idx) => {
                let entity = &mut self.entities[idx];
                entity.name = name;
                entity.table_name = table_name.to_string();
                entity.file_name = file_name.to_string();
                idx
            }
            None => {
                self.entities
                    .push(Entity::new(name, table_name, variable, file_name));
                let idx = self.entities.len() - 1;
                self.by_var.insert(variable.to_string(), idx);
                idx
            }
        };
        &self.entities[idx]
    }

    fn unique_name(&self, derived: &str, skip: Option<usize>) -> String {
        let taken = |candidate: &str| {
            self.entities
                .iter()
                .enumerate()
                .any(|(idx, e)| Some(idx) != skip && e.name == candidate)
        };
        if !taken(derived) {
            return derived.to_string();
        }
        (2..)
            .map(|n| format!("{derived}{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| derived.to_string())
    }

    /// Register the values of an enum builder variable.
    pub fn register_enum(&mut self, variable: &str, values: Vec<String>) {
        self.enums.insert(variable.to_string(), values);
    }

    /// Values of a registered enum builder variable.
    pub fn enum_values(&self, variable: &str) -> Option<&[String]> {
        self.enums.get(variable).map(Vec::as_slice)
    }

    /// Entity declared by a table variable.
    pub fn entity_for_var(&self, variable: &str) -> Option<&Entity> {
        self.by_var.get(variable).map(|&idx| &self.entities[idx])
    }

    /// Mutable entity declared by a table variable.
    pub fn entity_for_var_mut(&mut self, variable: &str) -> Option<&mut Entity> {
        let idx = *self.by_var.get(variable)?;
        self.entities.get_mut(idx)
    }

    /// Entity with the given name.
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Entities originating from `file_name`, in registration order.
    pub fn entities_in_file<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .iter()
            .filter(move |e| e.file_name == file_name)
    }

    /// All entities in registration order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Consume the context, returning its entities.
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    /// Mark a table variable's columns as extracted.
    ///
    /// Returns `false` when they already were; the first declaration's
    /// column map is kept.
    pub fn mark_populated(&mut self, variable: &str) -> bool {
        self.populated.insert(variable.to_string())
    }
}
