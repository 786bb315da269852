//! Property-based tests for type layout.
//!
//! Random acyclic pools (scalars, pointers, bit-fields, nested members, owned
//! and shared bases, dispatch slots) are generated and every type in them is
//! checked for:
//! 1. Determinism: a reused engine and a fresh one agree
//! 2. Shape: alignment is a power of two, size is a positive multiple of it
//! 3. Containment: members and bases lie inside the data size, disjoint
//! 4. Directives: forced alignment never shrinks, packing never grows
//! 5. Growth: appending a field never shrinks the type
//! 6. Shared bases are placed once

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use tyl_ir::{BaseKind, BaseSpec, FieldSpec, FieldType, TypeDescriptor, TypeIdx, TypePool};
use tyl_layout::{layout, LayoutEngine, TargetModel, TypeLayout};

// -- Pool Generation Strategies --

#[derive(Clone, Debug)]
enum Member {
    Scalar(u64),
    Bits(u64, u32),
    Pointer,
    /// Index into the types generated before this one.
    Nested(usize),
}

#[derive(Clone, Debug)]
struct Shape {
    members: Vec<Member>,
    bases: Vec<(usize, bool)>,
    polymorphic: bool,
}

fn member_strategy() -> impl Strategy<Value = Member> {
    prop_oneof![
        3 => prop::sample::select(vec![1u64, 2, 4, 8]).prop_map(Member::Scalar),
        2 => (prop::sample::select(vec![1u64, 2, 4]), 0u32..=8)
            .prop_map(|(size, width)| Member::Bits(size, width)),
        1 => Just(Member::Pointer),
        2 => any::<usize>().prop_map(Member::Nested),
    ]
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (
        prop::collection::vec(member_strategy(), 0..6),
        prop::collection::vec((any::<usize>(), any::<bool>()), 0..3),
        prop::bool::weighted(0.25),
    )
        .prop_map(|(members, bases, polymorphic)| Shape {
            members,
            bases,
            polymorphic,
        })
}

fn pool_strategy() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(shape_strategy(), 1..8)
}

/// Build a pool in which every reference points at an earlier type.
fn build(shapes: &[Shape]) -> (TypePool, Vec<TypeIdx>) {
    let mut pool = TypePool::new();
    let mut ids: Vec<TypeIdx> = Vec::with_capacity(shapes.len());

    for (i, shape) in shapes.iter().enumerate() {
        let mut desc = TypeDescriptor::new(format!("T{i}"));
        for (j, member) in shape.members.iter().enumerate() {
            let name = format!("f{j}");
            let field = match *member {
                Member::Scalar(size) => FieldSpec::scalar(name, size, size),
                Member::Bits(size, width) => FieldSpec::scalar(name, size, size).bits(width),
                Member::Pointer => FieldSpec::new(name, FieldType::Pointer),
                Member::Nested(r) if i > 0 => FieldSpec::composite(name, ids[r % i]),
                Member::Nested(_) => FieldSpec::new(name, FieldType::CHAR),
            };
            desc = desc.field(field);
        }
        if i > 0 {
            for &(r, shared) in &shape.bases {
                let ty = ids[r % i];
                desc = desc.base(if shared {
                    BaseSpec::shared(ty)
                } else {
                    BaseSpec::owned(ty)
                });
            }
        }
        if shape.polymorphic {
            desc = desc.polymorphic();
        }
        ids.push(pool.add(desc));
    }

    (pool, ids)
}

fn lay(pool: &TypePool, idx: TypeIdx) -> TypeLayout {
    layout(pool, idx, &TargetModel::LP64).unwrap()
}

/// Byte intervals occupied by members and non-empty bases.
fn occupied(l: &TypeLayout) -> Vec<(u64, u64)> {
    let mut spans: Vec<(u64, u64)> = l
        .fields
        .iter()
        .filter(|f| f.size > 0)
        .map(|f| (f.offset, f.offset + f.size))
        .chain(
            l.bases
                .iter()
                .filter(|b| b.size > 0)
                .map(|b| (b.offset, b.offset + b.size)),
        )
        .collect();
    if let Some(slot) = l.dispatch_offset {
        if !l.bases.iter().any(|b| b.size > 0 && b.offset <= slot && slot < b.offset + b.size) {
            spans.push((slot, slot + TargetModel::LP64.pointer_size));
        }
    }
    spans.sort_unstable();
    // Bit-fields sharing a storage unit report the same span.
    spans.dedup();
    spans
}

/// Re-add the descriptor at `idx` after applying `edit`.
fn variant(pool: &mut TypePool, idx: TypeIdx, edit: impl FnOnce(TypeDescriptor) -> TypeDescriptor) -> TypeIdx {
    let desc = pool.get(idx).cloned().unwrap();
    pool.add(edit(desc))
}

// -- Property Tests --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_engine_reuse_is_deterministic(shapes in pool_strategy()) {
        let (pool, ids) = build(&shapes);
        let mut engine = LayoutEngine::new(&pool, TargetModel::LP64);
        for &idx in ids.iter().rev() {
            prop_assert_eq!(engine.layout(idx).unwrap(), lay(&pool, idx));
        }
    }

    #[test]
    fn prop_size_is_a_multiple_of_alignment(shapes in pool_strategy()) {
        let (pool, ids) = build(&shapes);
        for &idx in &ids {
            let l = lay(&pool, idx);
            prop_assert!(l.align.is_power_of_two());
            prop_assert!(l.size >= 1);
            prop_assert_eq!(l.size % l.align, 0);
            prop_assert!(l.data_size <= l.size);
        }
    }

    #[test]
    fn prop_members_are_disjoint_and_contained(shapes in pool_strategy()) {
        let (pool, ids) = build(&shapes);
        for &idx in &ids {
            let l = lay(&pool, idx);
            let spans = occupied(&l);
            for pair in spans.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
            }
            if let Some(last) = spans.last() {
                prop_assert!(last.1 <= l.size);
            }
        }
    }

    #[test]
    fn prop_forced_alignment_never_shrinks(shapes in pool_strategy()) {
        let (mut pool, ids) = build(&shapes);
        let top = *ids.last().unwrap();
        let base = lay(&pool, top);
        let forced = base.align * 2;
        let aligned = variant(&mut pool, top, |d| d.align_as(forced));

        let l = lay(&pool, aligned);
        prop_assert_eq!(l.align, forced);
        prop_assert!(l.size >= base.size);
        prop_assert_eq!(l.field_offsets().collect::<Vec<_>>(), base.field_offsets().collect::<Vec<_>>());
    }

    #[test]
    fn prop_packing_never_grows(shapes in pool_strategy()) {
        let (mut pool, ids) = build(&shapes);
        let top = *ids.last().unwrap();
        let base = lay(&pool, top);
        let packed = variant(&mut pool, top, |d| d.packed(1));

        let l = lay(&pool, packed);
        prop_assert_eq!(l.align, 1);
        prop_assert!(l.size <= base.size);
    }

    #[test]
    fn prop_appending_a_field_never_shrinks(shapes in pool_strategy()) {
        let (mut pool, ids) = build(&shapes);
        let top = *ids.last().unwrap();
        let base = lay(&pool, top);
        let grown = variant(&mut pool, top, |d| d.field(FieldSpec::new("appended", FieldType::INT)));

        let l = lay(&pool, grown);
        prop_assert!(l.size >= base.size);
        prop_assert!(l.data_size >= base.data_size);
    }

    #[test]
    fn prop_shared_bases_are_placed_once(shapes in pool_strategy()) {
        let (pool, ids) = build(&shapes);
        for &idx in &ids {
            let l = lay(&pool, idx);
            let mut shared: Vec<TypeIdx> = l
                .bases
                .iter()
                .filter(|b| b.kind == BaseKind::Shared)
                .map(|b| b.ty)
                .collect();
            let placed = shared.len();
            shared.sort_unstable();
            shared.dedup();
            prop_assert_eq!(shared.len(), placed);
        }
    }
}
