use pretty_assertions::assert_eq;

use super::*;

#[test]
fn builder_keeps_declaration_order() {
    let desc = TypeDescriptor::new("Padding")
        .field(FieldSpec::new("c1", FieldType::CHAR))
        .field(FieldSpec::new("n1", FieldType::INT))
        .field(FieldSpec::new("c2", FieldType::CHAR));

    let names: Vec<&str> = desc.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["c1", "n1", "c2"]);
}

#[test]
fn access_groups_are_distinct_in_first_seen_order() {
    let desc = TypeDescriptor::new("T2").fields([
        FieldSpec::new("i", FieldType::INT),
        FieldSpec::new("j", FieldType::INT).with_access(Access::Protected),
        FieldSpec::new("k", FieldType::INT),
        FieldSpec::new("z", FieldType::INT).with_access(Access::Private),
    ]);

    assert_eq!(
        desc.access_groups().as_slice(),
        &[Access::Public, Access::Protected, Access::Private]
    );
}

#[test]
fn flush_markers_do_not_count_as_data() {
    let desc = TypeDescriptor::new("Flush")
        .field(FieldSpec::new("", FieldType::INT).bits(0).with_access(Access::Private));

    assert!(!desc.declares_data());
    assert!(desc.access_groups().is_empty());
}

#[test]
fn special_members_accumulate() {
    let desc = TypeDescriptor::new("T")
        .user_provided(SpecialMembers::CONSTRUCT)
        .user_provided(SpecialMembers::DESTROY);

    assert!(desc.special_members.contains(SpecialMembers::CONSTRUCT));
    assert!(desc.special_members.contains(SpecialMembers::DESTROY));
    assert!(!desc.special_members.contains(SpecialMembers::COPY));
}

#[test]
fn bases_split_by_kind() {
    let mut pool = TypePool::new();
    let a = pool.add(TypeDescriptor::new("A"));
    let b = pool.add(TypeDescriptor::new("B"));
    let d = TypeDescriptor::new("D")
        .base(BaseSpec::shared(a))
        .base(BaseSpec::owned(b).with_access(Access::Private));

    assert_eq!(d.owned_bases().map(|b| b.ty).collect::<Vec<_>>(), vec![b]);
    assert_eq!(d.shared_bases().map(|b| b.ty).collect::<Vec<_>>(), vec![a]);
    assert_eq!(d.bases[1].access, Access::Private);
}

#[test]
fn field_builders() {
    let f = FieldSpec::scalar("number1", 2, 2).bits(10).align_as(8);
    assert!(f.is_bit_field());
    assert!(!f.is_flush_marker());
    assert_eq!(f.forced_align, Some(8));
    assert_eq!(f.ty, FieldType::SHORT);

    let mut pool = TypePool::new();
    let inner = pool.add(TypeDescriptor::new("Inner"));
    let member = FieldSpec::composite("base", inner).with_default_init();
    assert_eq!(member.ty.composite(), Some(inner));
    assert!(member.default_init);
    assert!(FieldSpec::new("", FieldType::CHAR).is_anonymous());
}
