//! Property-based tests for the offset index and node locator
//!
//! Random paragraph trees with nested inline elements, empty leaves and
//! multi-byte text; every global offset must survive the trip through the
//! locator and back.

use doc_model::{
    compute_paragraph_offsets, global_offset_of, locate_global, Bias, BlockSpec, DocumentTree,
    InlineSpec, ParagraphOffsets,
};
use proptest::prelude::*;

fn inline_strategy() -> BoxedStrategy<InlineSpec> {
    let leaf = "[a-zé ]{0,5}".prop_map(InlineSpec::Text);
    leaf.prop_recursive(3, 16, 4, |inner| {
        (
            prop::sample::select(vec!["em", "b", "a"]),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, children)| InlineSpec::element(tag, children))
    })
    .boxed()
}

fn blocks_strategy() -> impl Strategy<Value = Vec<BlockSpec>> {
    let paragraph = prop::collection::vec(inline_strategy(), 0..4).prop_map(BlockSpec::paragraph);
    let block = prop_oneof![
        3 => paragraph.clone(),
        1 => prop::collection::vec(paragraph, 1..3).prop_map(BlockSpec::container),
    ];
    prop::collection::vec(block, 1..5)
}

proptest! {
    #[test]
    fn offset_table_matches_plain_text(blocks in blocks_strategy()) {
        let tree = DocumentTree::from_blocks(&blocks).unwrap();
        let table = compute_paragraph_offsets(&tree);

        prop_assert_eq!(table.len(), tree.paragraphs().len() + 1);
        prop_assert_eq!(table[0], 0);
        prop_assert_eq!(*table.last().unwrap(), tree.plain_text().chars().count());
        prop_assert!(table.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn start_biased_offsets_round_trip(blocks in blocks_strategy()) {
        let tree = DocumentTree::from_blocks(&blocks).unwrap();
        let offsets = ParagraphOffsets::compute(&tree);
        let text: Vec<char> = tree.plain_text().chars().collect();

        for global in 0..offsets.total_len() {
            let (_, point) = locate_global(&tree, &offsets, global, Bias::Start).unwrap();
            let leaf: Vec<char> = tree.text(point.leaf).unwrap().chars().collect();

            prop_assert_eq!(global_offset_of(&tree, &offsets, point.leaf, point.offset).unwrap(), global);
            prop_assert_eq!(leaf[point.offset], text[global]);
        }
        prop_assert!(locate_global(&tree, &offsets, offsets.total_len(), Bias::Start).is_none());
    }

    #[test]
    fn end_biased_offsets_round_trip(blocks in blocks_strategy()) {
        let tree = DocumentTree::from_blocks(&blocks).unwrap();
        let offsets = ParagraphOffsets::compute(&tree);

        for global in 1..=offsets.total_len() {
            let (_, point) = locate_global(&tree, &offsets, global, Bias::End).unwrap();

            prop_assert!(point.offset >= 1);
            prop_assert_eq!(global_offset_of(&tree, &offsets, point.leaf, point.offset).unwrap(), global);
        }
    }
}
