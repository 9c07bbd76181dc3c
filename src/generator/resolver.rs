//! Pairs one-directional relation stubs into bidirectional relations.
//!
//! Pairing is by entity pair only: the first unpaired stub pointing back
//! wins. With several relations between the same two entities the result
//! depends on declaration order; `relationName` labels are not consulted.

use tracing::{debug, warn};

use crate::extractor::context::ConversionContext;
use crate::generator::model::{Relation, RelationKind, RelationType};

/// Pair the context's stubs and attach the finished relations to their
/// owning entities.
pub fn resolve_relations(ctx: &mut ConversionContext) {
    let stubs = std::mem::take(&mut ctx.stubs);
    for relation in pair_stubs(stubs) {
        let Some(entity) = ctx.entity_for_var_mut(&relation.from_var) else {
            continue;
        };
        if entity.relation(&relation.local_name).is_some() {
            warn!(
                entity = %entity.name,
                relation = %relation.local_name,
                "duplicate relation name; keeping the first"
            );
            continue;
        }
        entity.relations.push(relation);
    }
}

/// Pair stubs with their reverse and refine cardinality and ownership.
///
/// Order is preserved; unpaired stubs are returned unchanged.
pub fn pair_stubs(mut stubs: Vec<Relation>) -> Vec<Relation> {
    let mut paired = vec![false; stubs.len()];

    for i in 0..stubs.len() {
        if paired[i] {
            continue;
        }
        let partner = (0..stubs.len()).find(|&j| {
            j != i
                && !paired[j]
                && stubs[j].from_entity == stubs[i].to_entity
                && stubs[j].to_entity == stubs[i].from_entity
        });
        let Some(j) = partner else {
            debug!(
                entity = %stubs[i].from_entity,
                relation = %stubs[i].local_name,
                "relation has no inverse"
            );
            continue;
        };

        paired[i] = true;
        paired[j] = true;
        let (first, second) = pair_mut(&mut stubs, i, j);
        link(first, second);
    }

    stubs
}

fn pair_mut(stubs: &mut [Relation], i: usize, j: usize) -> (&mut Relation, &mut Relation) {
    debug_assert!(i < j);
    let (head, tail) = stubs.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

fn is_plain_one(relation: &Relation) -> bool {
    relation.orig_kind == RelationKind::One && !relation.explicit_fields
}

fn link(first: &mut Relation, second: &mut Relation) {
    first.inverse_side = Some(second.local_name.clone());
    second.inverse_side = Some(first.local_name.clone());

    if first.orig_kind == RelationKind::Many && second.orig_kind == RelationKind::Many {
        first.rel_type = RelationType::ManyToMany;
        second.rel_type = RelationType::ManyToMany;
        first.is_owner = true;
        second.is_owner = false;
    } else if is_plain_one(first) && is_plain_one(second) {
        first.rel_type = RelationType::OneToOne;
        second.rel_type = RelationType::OneToOne;
        first.is_owner = first.join_column_name.is_some();
        second.is_owner = !first.is_owner && second.join_column_name.is_some();
    } else {
        for side in [first, second] {
            if side.rel_type == RelationType::OneToOne {
                side.rel_type = RelationType::ManyToOne;
                side.is_owner = side.join_column_name.is_some();
            }
        }
    }
}
