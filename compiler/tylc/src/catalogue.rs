//! Built-in catalogue of example types.
//!
//! Covers field ordering and padding, forced alignment, packing, bit-fields,
//! inheritance with and without dispatch, the empty base optimisation, the
//! trivial / standard-layout matrix, and diamond hierarchies.

use std::fmt;

use tyl_ir::{
    Access, BaseSpec, FieldSpec, FieldType, SpecialMembers, TypeDescriptor, TypeIdx, TypePool,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Alignment,
    Bitfields,
    Inheritance,
    Polymorphism,
    Ebo,
    Pod,
    Diamond,
}

impl Topic {
    pub const ALL: [Topic; 7] = [
        Topic::Alignment,
        Topic::Bitfields,
        Topic::Inheritance,
        Topic::Polymorphism,
        Topic::Ebo,
        Topic::Pod,
        Topic::Diamond,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Topic::Alignment => "alignment",
            Topic::Bitfields => "bitfields",
            Topic::Inheritance => "inheritance",
            Topic::Polymorphism => "polymorphism",
            Topic::Ebo => "ebo",
            Topic::Pod => "pod",
            Topic::Diamond => "diamond",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A catalogue type worth showing on its own.
#[derive(Clone, Debug)]
pub struct Entry {
    pub ty: TypeIdx,
    /// Qualified name, also the type's name in the pool.
    pub name: String,
    pub topic: Topic,
    pub note: &'static str,
}

pub struct Catalogue {
    pool: TypePool,
    entries: Vec<Entry>,
}

impl Catalogue {
    pub fn builtin() -> Self {
        let mut b = Builder::default();
        alignment(&mut b);
        bitfields(&mut b);
        inheritance(&mut b);
        polymorphism(&mut b);
        ebo(&mut b);
        pod(&mut b);
        diamond(&mut b);
        Self {
            pool: b.pool,
            entries: b.entries,
        }
    }

    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries matching `query`: a topic name, a qualified name, or the last
    /// path segment of one (`T2` finds `pod::T2`).
    pub fn lookup(&self, query: &str) -> Vec<&Entry> {
        if let Some(topic) = Topic::from_name(query) {
            return self.entries.iter().filter(|e| e.topic == topic).collect();
        }
        if let Some(exact) = self.entries.iter().find(|e| e.name == query) {
            return vec![exact];
        }
        self.entries
            .iter()
            .filter(|e| e.name.rsplit("::").next() == Some(query))
            .collect()
    }
}

#[derive(Default)]
struct Builder {
    pool: TypePool,
    entries: Vec<Entry>,
}

impl Builder {
    fn show(&mut self, topic: Topic, note: &'static str, desc: TypeDescriptor) -> TypeIdx {
        let name = desc.name.clone();
        let ty = self.pool.add(desc);
        self.entries.push(Entry {
            ty,
            name,
            topic,
            note,
        });
        ty
    }
}

fn char_(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldType::CHAR)
}

fn int(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldType::INT)
}

fn double(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldType::DOUBLE)
}

const U8: FieldType = FieldType::scalar(1, 1);
const U16: FieldType = FieldType::scalar(2, 2);
const U32: FieldType = FieldType::scalar(4, 4);

fn alignment(b: &mut Builder) {
    use Topic::Alignment as T;

    b.show(
        T,
        "chars between ints: every int starts a new 4-byte block",
        TypeDescriptor::new("alignment::Interleaved").fields([
            char_("c1"),
            int("number1"),
            char_("c2"),
            char_("c3"),
            int("number2"),
        ]),
    );
    b.show(
        T,
        "chars grouped before the ints",
        TypeDescriptor::new("alignment::CharsFirst").fields([
            char_("c1"),
            char_("c2"),
            char_("c3"),
            int("number1"),
            int("number2"),
        ]),
    );
    b.show(
        T,
        "ints first, chars in the tail padding",
        TypeDescriptor::new("alignment::IntsFirst").fields([
            int("number1"),
            int("number2"),
            char_("c1"),
            char_("c2"),
            char_("c3"),
        ]),
    );
    b.show(
        T,
        "four chars fill the first block exactly",
        TypeDescriptor::new("alignment::FourChars").fields([
            char_("c1"),
            char_("c2"),
            char_("c3"),
            char_("c4"),
            int("number1"),
            int("number2"),
        ]),
    );
    b.show(
        T,
        "a byte buffer aligned like the widest of int and char",
        TypeDescriptor::new("alignment::Buffer")
            .field(FieldSpec::scalar("buffer", 4, 1))
            .align_as(4),
    );
    b.show(
        T,
        "a double raises the block size to 8",
        TypeDescriptor::new("alignment::WithDouble").fields([
            char_("c1"),
            double("flag"),
            char_("c2"),
            char_("c3"),
            int("number"),
        ]),
    );
    b.show(
        T,
        "alignas(16) on the type",
        TypeDescriptor::new("alignment::Aligned16")
            .fields([
                int("number1"),
                char_("c1"),
                char_("c2"),
                char_("c3"),
                int("number2"),
                int("number3"),
            ])
            .align_as(16),
    );
    b.show(
        T,
        "#pragma pack(1): no padding at all",
        TypeDescriptor::new("alignment::Packed")
            .fields([
                char_("c1"),
                double("flag"),
                char_("c2"),
                char_("c3"),
                int("number"),
            ])
            .packed(1),
    );
}

fn bitfields(b: &mut Builder) {
    use Topic::Bitfields as T;

    b.show(
        T,
        "mixed storage units split into three regions",
        TypeDescriptor::new("bitfields::Mixed").fields([
            FieldSpec::new("number1", U16).bits(10),
            FieldSpec::new("c1", U8).bits(4),
            FieldSpec::new("c2", U8).bits(4),
            FieldSpec::new("c3", U8).bits(4),
            FieldSpec::new("number2", U16).bits(10),
        ]),
    );
    b.show(
        T,
        "one 32-bit unit holds all 32 bits",
        TypeDescriptor::new("bitfields::Uniform").fields([
            FieldSpec::new("number1", U32).bits(10),
            FieldSpec::new("c1", U32).bits(4),
            FieldSpec::new("c2", U32).bits(4),
            FieldSpec::new("c3", U32).bits(4),
            FieldSpec::new("number2", U32).bits(10),
        ]),
    );
    b.show(
        T,
        "an unnamed zero-width field starts a new unit",
        TypeDescriptor::new("bitfields::Flushed").fields([
            FieldSpec::new("low", U32).bits(3),
            FieldSpec::new("", U32).bits(0),
            FieldSpec::new("high", U32).bits(3),
        ]),
    );
}

fn inheritance(b: &mut Builder) {
    use Topic::Inheritance as T;

    let base = b.show(
        T,
        "int then char: three bytes of tail padding",
        TypeDescriptor::new("inheritance::Base").fields([int("number"), char_("c")]),
    );
    b.show(
        T,
        "derived field starts after the base's padding",
        TypeDescriptor::new("inheritance::Derived")
            .base(BaseSpec::owned(base))
            .field(char_("c")),
    );
    b.show(
        T,
        "the base as a member lays out the same",
        TypeDescriptor::new("inheritance::Example")
            .field(FieldSpec::composite("base", base))
            .field(char_("c")),
    );
}

fn polymorphism(b: &mut Builder) {
    use Topic::Polymorphism as T;

    let base = b.show(
        T,
        "dispatch slot first, then the int",
        TypeDescriptor::new("polymorphism::Base")
            .field(int("number"))
            .polymorphic(),
    );
    for name in ["polymorphism::Derived1", "polymorphism::Derived2"] {
        b.show(
            T,
            "overrides reuse the base's slot; try --reuse-tail-padding",
            TypeDescriptor::new(name)
                .base(BaseSpec::owned(base))
                .field(char_("c"))
                .polymorphic(),
        );
    }
    let interface = b.show(
        T,
        "no fields: just the dispatch slot",
        TypeDescriptor::new("polymorphism::Interface").polymorphic(),
    );
    b.show(
        T,
        "an override adds no second slot",
        TypeDescriptor::new("polymorphism::Impl")
            .base(BaseSpec::owned(interface))
            .polymorphic(),
    );
}

fn ebo(b: &mut Builder) {
    use Topic::Ebo as T;

    let base = b.show(
        T,
        "an empty type still occupies one byte",
        TypeDescriptor::new("ebo::Base"),
    );
    b.show(
        T,
        "an empty base adds nothing",
        TypeDescriptor::new("ebo::Derived").base(BaseSpec::owned(base)),
    );
    b.show(
        T,
        "an empty base shares its address with the first field",
        TypeDescriptor::new("ebo::WithData")
            .base(BaseSpec::owned(base))
            .field(int("number")),
    );
    b.show(
        T,
        "an empty member is not optimised away",
        TypeDescriptor::new("ebo::Member")
            .field(FieldSpec::composite("empty", base))
            .field(int("number")),
    );
}

fn pod(b: &mut Builder) {
    use Topic::Pod as T;

    let protected = |f: FieldSpec| f.with_access(Access::Protected);
    let private = |f: FieldSpec| f.with_access(Access::Private);

    b.show(T, "empty", TypeDescriptor::new("pod::T1"));
    b.show(
        T,
        "mixed access: trivial, not standard layout",
        TypeDescriptor::new("pod::T2").fields([
            int("i"),
            protected(int("j")),
            private(int("z")),
        ]),
    );
    b.show(
        T,
        "every special member defaulted",
        TypeDescriptor::new("pod::T3"),
    );
    b.show(
        T,
        "a converting constructor does not count",
        TypeDescriptor::new("pod::T4").field(protected(int("_number"))),
    );
    b.show(
        T,
        "default member initializer",
        TypeDescriptor::new("pod::T6").field(private(int("a").with_default_init())),
    );
    b.show(
        T,
        "user-provided default constructor",
        TypeDescriptor::new("pod::T7")
            .field(protected(int("a")))
            .user_provided(SpecialMembers::CONSTRUCT),
    );
    b.show(
        T,
        "virtual destructor",
        TypeDescriptor::new("pod::T8").polymorphic(),
    );

    let s1 = b.show(T, "empty", TypeDescriptor::new("pod::S1"));
    let s2 = b.show(
        T,
        "one private field",
        TypeDescriptor::new("pod::S2").field(private(int("z"))),
    );
    let s3 = b.show(T, "every special member defaulted", TypeDescriptor::new("pod::S3"));
    b.show(
        T,
        "user-provided constructor, single access group",
        TypeDescriptor::new("pod::S6")
            .field(protected(int("a")))
            .user_provided(SpecialMembers::CONSTRUCT),
    );
    b.show(
        T,
        "three access groups",
        TypeDescriptor::new("pod::S8").fields([
            int("i"),
            protected(int("j")),
            private(int("z")),
        ]),
    );

    b.show(
        T,
        "empty base, no fields",
        TypeDescriptor::new("pod::Derived1").base(BaseSpec::owned(s1)),
    );
    b.show(
        T,
        "fields only in the most-derived layer",
        TypeDescriptor::new("pod::Derived2")
            .base(BaseSpec::owned(s1))
            .field(FieldSpec::composite("s2", s2))
            .field(FieldSpec::composite("s3", s3)),
    );
    b.show(
        T,
        "fields only in one base",
        TypeDescriptor::new("pod::Derived3")
            .base(BaseSpec::owned(s1))
            .base(BaseSpec::owned(s2)),
    );
    b.show(
        T,
        "first field has a base's type",
        TypeDescriptor::new("pod::Derived4")
            .base(BaseSpec::owned(s1).with_access(Access::Private))
            .field(private(FieldSpec::composite("s1", s1))),
    );
    b.show(
        T,
        "fields in two layers",
        TypeDescriptor::new("pod::Derived5")
            .base(BaseSpec::owned(s1).with_access(Access::Private))
            .base(BaseSpec::owned(s2).with_access(Access::Private))
            .field(private(int("number"))),
    );

    let a = b.show(T, "empty root", TypeDescriptor::new("pod::A"));
    let left = b.show(T, "owns A", TypeDescriptor::new("pod::B").base(BaseSpec::owned(a)));
    let right = b.show(T, "owns A", TypeDescriptor::new("pod::C").base(BaseSpec::owned(a)));
    b.show(
        T,
        "A reached twice",
        TypeDescriptor::new("pod::D")
            .base(BaseSpec::owned(left))
            .base(BaseSpec::owned(right)),
    );
}

fn diamond(b: &mut Builder) {
    use Topic::Diamond as T;

    let lifecycle = SpecialMembers::CONSTRUCT | SpecialMembers::DESTROY;

    let a = b.show(
        T,
        "root with its own constructor and destructor",
        TypeDescriptor::new("diamond::A").user_provided(lifecycle),
    );
    let left = b.show(
        T,
        "virtual A",
        TypeDescriptor::new("diamond::B")
            .base(BaseSpec::shared(a))
            .user_provided(lifecycle),
    );
    let right = b.show(
        T,
        "virtual A",
        TypeDescriptor::new("diamond::C")
            .base(BaseSpec::shared(a))
            .user_provided(lifecycle),
    );
    b.show(
        T,
        "one A subobject, constructed once",
        TypeDescriptor::new("diamond::D")
            .base(BaseSpec::owned(left))
            .base(BaseSpec::owned(right))
            .user_provided(lifecycle),
    );

    for (prefix, shared) in [("diamond::shared", true), ("diamond::owned", false)] {
        let edge = |ty| {
            if shared {
                BaseSpec::shared(ty)
            } else {
                BaseSpec::owned(ty)
            }
        };
        let a = b.show(
            T,
            "root with data",
            TypeDescriptor::new(format!("{prefix}::A")).field(int("a")),
        );
        let left = b.show(
            T,
            "left arm",
            TypeDescriptor::new(format!("{prefix}::B"))
                .base(edge(a))
                .field(int("b")),
        );
        let right = b.show(
            T,
            "right arm",
            TypeDescriptor::new(format!("{prefix}::C"))
                .base(edge(a))
                .field(int("c")),
        );
        b.show(
            T,
            if shared {
                "A placed once, after D's own part"
            } else {
                "A placed once per arm"
            },
            TypeDescriptor::new(format!("{prefix}::D"))
                .base(BaseSpec::owned(left))
                .base(BaseSpec::owned(right))
                .field(int("d")),
        );
    }
}

#[cfg(test)]
mod tests;
