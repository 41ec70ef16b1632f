//! Property-based tests over the storage core's column and archetype
//! operations, styled after
//! `bruno1308-nomai-engine/crates/nomai-ecs/tests/proptest_ecs.rs`'s
//! operation-sequence strategy.

mod support;

use proptest::prelude::*;

use ecs_core::alloc::SystemAllocator;
use ecs_core::column::TypedColumn;
use ecs_core::world::World;
use support::CountingAllocator;

#[derive(Debug, Clone)]
enum ColumnOp {
    Append(u32),
    Pop,
    SwapRemove(usize),
}

fn column_op() -> impl Strategy<Value = ColumnOp> {
    prop_oneof![
        any::<u32>().prop_map(ColumnOp::Append),
        Just(ColumnOp::Pop),
        (0usize..8).prop_map(ColumnOp::SwapRemove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn column_len_matches_a_model_vec(ops in prop::collection::vec(column_op(), 0..64)) {
        let alloc = SystemAllocator;
        let mut col: TypedColumn<u32> = TypedColumn::empty();
        let mut len = 0usize;
        let mut model: Vec<u32> = Vec::new();

        for op in ops {
            match op {
                ColumnOp::Append(v) => {
                    len = col.append(&alloc, v, len).unwrap();
                    model.push(v);
                }
                ColumnOp::Pop => {
                    let popped = col.pop(len);
                    let expected = model.pop();
                    prop_assert_eq!(popped, expected);
                    if popped.is_some() {
                        len -= 1;
                    }
                }
                ColumnOp::SwapRemove(i) => {
                    if len > 0 {
                        let i = i % len;
                        let removed = col.swap_remove(i, len);
                        let expected = model.swap_remove(i);
                        prop_assert_eq!(removed, expected);
                        len -= 1;
                    }
                }
            }
            prop_assert_eq!(len, model.len());
            for (i, expected) in model.iter().enumerate() {
                prop_assert_eq!(unsafe { *col.get(i) }, *expected);
            }
        }
        col.deinit(&alloc, len);
    }

    #[test]
    fn allocation_count_tracks_growth_steps_only(k in 0usize..40) {
        let alloc = CountingAllocator::default();
        let mut col: TypedColumn<u32> = TypedColumn::empty();
        let mut len = 0usize;
        let mut prev_capacity = col.capacity();
        let mut growth_steps = 0u32;

        for v in 0..k as u32 {
            len = col.append(&alloc, v, len).unwrap();
            if col.capacity() != prev_capacity {
                growth_steps += 1;
                prev_capacity = col.capacity();
            }
        }

        prop_assert_eq!(alloc.alloc_calls.get(), growth_steps);
        col.deinit(&alloc, len);
    }

    #[test]
    fn entity_ids_increase_by_one_each_call(n in 1usize..20) {
        let mut world = World::init(Box::new(SystemAllocator));
        let mut last: Option<u64> = None;
        for _ in 0..n {
            let e = world.create_entity::<(u32,)>().unwrap();
            if let Some(prev) = last {
                prop_assert_eq!(e.id, prev + 1);
            }
            last = Some(e.id);
        }
    }
}

#[test]
fn zst_column_never_allocates() {
    struct Tag;
    let alloc = CountingAllocator::default();
    let mut col: TypedColumn<Tag> = TypedColumn::empty();
    let mut len = 0;
    for _ in 0..10 {
        len = col.append(&alloc, Tag, len).unwrap();
    }
    assert_eq!(alloc.alloc_calls.get(), 0);
    assert_eq!(col.capacity(), usize::MAX);
    col.deinit(&alloc, len);
}

#[test]
fn hash_compound_matches_runtime_fold_over_resolved_infos() {
    use ecs_core::entity::Bundle;
    use ecs_core::hash::hash_compound_info;

    let world = World::init(Box::new(SystemAllocator));
    let from_bundle = ecs_core::hash::hash_compound::<(u32, f32)>();
    let infos = <(u32, f32)>::type_infos(&world);
    let from_infos = hash_compound_info(&infos);
    assert_eq!(from_bundle, from_infos);
}
