#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use tyl_classify::{classify, TypeClassification};
use tyl_layout::{layout, TailPadding, TargetModel, TypeLayout};

use super::{Catalogue, Topic};

fn find(catalogue: &Catalogue, name: &str) -> tyl_ir::TypeIdx {
    let hits = catalogue.lookup(name);
    assert_eq!(hits.len(), 1, "`{name}` should name exactly one entry");
    hits[0].ty
}

fn lay(catalogue: &Catalogue, name: &str) -> TypeLayout {
    layout(catalogue.pool(), find(catalogue, name), &TargetModel::LP64).unwrap()
}

#[test]
fn every_entry_lays_out() {
    let catalogue = Catalogue::builtin();
    for entry in catalogue.entries() {
        for target in [TargetModel::LP64, TargetModel::ILP32] {
            assert!(
                layout(catalogue.pool(), entry.ty, &target).is_ok(),
                "{} failed on {target}",
                entry.name
            );
        }
    }
}

#[test]
fn names_are_unique() {
    let catalogue = Catalogue::builtin();
    let mut names: Vec<&str> = catalogue.entries().iter().map(|e| e.name.as_str()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn every_topic_has_entries() {
    let catalogue = Catalogue::builtin();
    for topic in Topic::ALL {
        assert!(!catalogue.lookup(topic.name()).is_empty(), "{topic} is empty");
    }
}

#[test]
fn lookup_by_short_name() {
    let catalogue = Catalogue::builtin();
    let hits = catalogue.lookup("T2");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "pod::T2");

    // Ambiguous short names return every match.
    assert!(catalogue.lookup("D").len() > 1);
    assert!(catalogue.lookup("nothing").is_empty());
}

#[test]
fn alignment_sizes() {
    let catalogue = Catalogue::builtin();
    let sizes: Vec<(u64, u64)> = [
        "alignment::Interleaved",
        "alignment::CharsFirst",
        "alignment::IntsFirst",
        "alignment::FourChars",
        "alignment::Buffer",
        "alignment::WithDouble",
        "alignment::Aligned16",
        "alignment::Packed",
    ]
    .iter()
    .map(|name| {
        let l = lay(&catalogue, name);
        (l.size, l.align)
    })
    .collect();

    assert_eq!(
        sizes,
        vec![(16, 4), (12, 4), (12, 4), (12, 4), (4, 4), (24, 8), (16, 16), (15, 1)]
    );
}

#[test]
fn bitfield_sizes() {
    let catalogue = Catalogue::builtin();
    let mixed = lay(&catalogue, "bitfields::Mixed");
    let uniform = lay(&catalogue, "bitfields::Uniform");
    let flushed = lay(&catalogue, "bitfields::Flushed");

    assert_eq!((mixed.size, mixed.align), (6, 2));
    assert_eq!((uniform.size, uniform.align), (4, 4));
    assert_eq!(flushed.field_offset("high"), Some(4));
    assert_eq!(flushed.size, 8);
}

#[test]
fn inheritance_matches_composition() {
    let catalogue = Catalogue::builtin();
    let derived = lay(&catalogue, "inheritance::Derived");
    let example = lay(&catalogue, "inheritance::Example");

    assert_eq!(derived.size, 12);
    assert_eq!(derived.size, example.size);
    assert_eq!(derived.field_offset("c"), example.field_offset("c"));
}

#[test]
fn polymorphic_derived_and_tail_padding() {
    let catalogue = Catalogue::builtin();
    let derived = find(&catalogue, "polymorphism::Derived1");

    let plain = layout(catalogue.pool(), derived, &TargetModel::LP64).unwrap();
    assert_eq!((plain.size, plain.field_offset("c")), (24, Some(16)));
    assert_eq!(plain.dispatch_offset, Some(0));

    let reuse = TargetModel::LP64.with_tail_padding(TailPadding::ReuseNonPod);
    let tight = layout(catalogue.pool(), derived, &reuse).unwrap();
    assert_eq!((tight.size, tight.field_offset("c")), (16, Some(12)));

    assert_eq!(lay(&catalogue, "polymorphism::Impl").size, 8);
}

#[test]
fn empty_bases() {
    let catalogue = Catalogue::builtin();
    assert_eq!(lay(&catalogue, "ebo::Base").size, 1);
    assert_eq!(lay(&catalogue, "ebo::Derived").size, 1);
    assert_eq!(lay(&catalogue, "ebo::WithData").size, 4);
    assert_eq!(lay(&catalogue, "ebo::Member").size, 8);
}

#[test]
fn pod_matrix() {
    let catalogue = Catalogue::builtin();
    let pool = catalogue.pool();
    let verdict = |name: &str| {
        let c = classify(pool, find(&catalogue, name));
        (c.is_trivial, c.is_standard_layout)
    };

    let expected = [
        ("pod::T1", (true, true)),
        ("pod::T2", (true, false)),
        ("pod::T3", (true, true)),
        ("pod::T4", (true, true)),
        ("pod::T6", (false, true)),
        ("pod::T7", (false, true)),
        ("pod::T8", (false, false)),
        ("pod::S1", (true, true)),
        ("pod::S2", (true, true)),
        ("pod::S3", (true, true)),
        ("pod::S6", (false, true)),
        ("pod::S8", (true, false)),
        ("pod::Derived1", (true, true)),
        ("pod::Derived2", (true, true)),
        ("pod::Derived3", (true, true)),
        ("pod::Derived4", (true, false)),
        ("pod::Derived5", (true, false)),
        ("pod::D", (true, false)),
    ];
    for (name, want) in expected {
        assert_eq!(verdict(name), want, "{name}");
    }
}

#[test]
fn diamonds() {
    let catalogue = Catalogue::builtin();
    let shared = lay(&catalogue, "diamond::shared::D");
    let owned = lay(&catalogue, "diamond::owned::D");

    assert_eq!(shared.size, 16);
    assert_eq!(owned.size, 20);

    let classifier = tyl_classify::Classifier::new(catalogue.pool());
    assert!(!classifier.is_trivial(find(&catalogue, "diamond::D")));
    assert!(!classifier.is_standard_layout(find(&catalogue, "diamond::shared::D")));
}
