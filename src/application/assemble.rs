//! Whole-document batch assembly.

use crate::application::{
    builder::{OPS_PER_SLIDE, build},
    segment::segment,
};
use crate::domain::{
    ids::IdentifierGenerator,
    slides::{Batch, SlideSpec},
};

/// A document's batch together with the spec of every slide in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledBatch {
    pub specs: Vec<SlideSpec>,
    pub ops: Batch,
}

impl AssembledBatch {
    pub fn slide_count(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Segment `document` and concatenate the requests of every slide in order.
pub fn assemble<G>(document: &str, delimiter: &str, ids: &mut G) -> Batch
where
    G: IdentifierGenerator + ?Sized,
{
    assemble_with_specs(document, delimiter, ids).ops
}

pub fn assemble_with_specs<G>(document: &str, delimiter: &str, ids: &mut G) -> AssembledBatch
where
    G: IdentifierGenerator + ?Sized,
{
    let fragments = segment(document, delimiter);
    let mut assembled = AssembledBatch {
        specs: Vec::with_capacity(fragments.len()),
        ops: Vec::with_capacity(fragments.len() * OPS_PER_SLIDE),
    };

    for (index, fragment) in fragments.into_iter().enumerate() {
        let (spec, ops) = build(fragment, index, ids);
        assembled.ops.extend(ops);
        assembled.specs.push(spec);
    }

    assembled
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::application::segment::DEFAULT_DELIMITER;
    use crate::domain::{
        ids::SequentialIds,
        slides::{CreateSlide, MutationOp},
    };

    #[test]
    fn slides_are_indexed_in_document_order() {
        let mut ids = SequentialIds::new("deck").expect("prefix");
        let batch = assemble("# A\n---\n# B\n---\n# C", DEFAULT_DELIMITER, &mut ids);
        assert_eq!(batch.len(), 3 * OPS_PER_SLIDE);

        let indices: Vec<_> = batch
            .iter()
            .filter_map(|op| match op {
                MutationOp::CreateSlide(CreateSlide {
                    insertion_index, ..
                }) => Some(*insertion_index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn created_object_ids_are_unique_across_the_batch() {
        let mut ids = SequentialIds::random();
        let document = (0..20)
            .map(|n| format!("# Slide {n}\n\nbody {n}"))
            .collect::<Vec<_>>()
            .join("\n---\n");
        let batch = assemble(&document, DEFAULT_DELIMITER, &mut ids);

        let created: Vec<_> = batch
            .iter()
            .filter(|op| op.creates_object())
            .map(MutationOp::object_id)
            .collect();
        let distinct: HashSet<_> = created.iter().collect();
        assert_eq!(created.len(), 60);
        assert_eq!(distinct.len(), created.len());
    }

    #[test]
    fn blank_document_assembles_to_nothing() {
        let mut ids = SequentialIds::new("deck").expect("prefix");
        let assembled = assemble_with_specs("\n---\n  \n", DEFAULT_DELIMITER, &mut ids);
        assert!(assembled.is_empty());
        assert_eq!(assembled.slide_count(), 0);
    }
}
