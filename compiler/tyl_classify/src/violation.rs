//! Rules a type can break, and the per-type explanation built from them.

use std::fmt;

use smallvec::SmallVec;
use tyl_ir::{Access, SpecialMembers, TypeIdx};

use crate::Classification;

/// A broken triviality or standard-layout rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// The type itself introduces a dispatch pointer.
    DispatchPointer,
    /// A direct base is shared (virtual).
    SharedBase(TypeIdx),
    /// One or more special-member categories are user-provided.
    UserProvided(SpecialMembers),
    /// A field has a default member initializer.
    DefaultMemberInit(String),
    NonTrivialBase(TypeIdx),
    NonTrivialField(String),
    NonStandardBase(TypeIdx),
    NonStandardField(String),
    /// Fields carry more than one access tag.
    MixedAccess(SmallVec<[Access; 3]>),
    /// More than one type in the hierarchy declares fields.
    FieldsInMultipleLayers(Vec<TypeIdx>),
    /// An owned base is reached along more than one path.
    RepeatedBase(TypeIdx),
    /// The first field's type is also a base of the type.
    FirstFieldIsBase { field: String, base: TypeIdx },
    /// The type, or something it contains, is declared but not defined.
    Unresolved(TypeIdx),
    /// The type contains itself through bases or members.
    Cyclic(TypeIdx),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DispatchPointer => f.write_str("introduces a dispatch pointer"),
            Violation::SharedBase(b) => write!(f, "has shared base {b}"),
            Violation::UserProvided(members) => {
                write!(f, "user-provided special members {members:?}")
            }
            Violation::DefaultMemberInit(name) => {
                write!(f, "field `{name}` has a default member initializer")
            }
            Violation::NonTrivialBase(b) => write!(f, "base {b} is not trivial"),
            Violation::NonTrivialField(name) => write!(f, "field `{name}` is not trivial"),
            Violation::NonStandardBase(b) => write!(f, "base {b} is not standard layout"),
            Violation::NonStandardField(name) => {
                write!(f, "field `{name}` is not standard layout")
            }
            Violation::MixedAccess(groups) => {
                f.write_str("fields mix access groups:")?;
                for access in groups {
                    write!(f, " {access}")?;
                }
                Ok(())
            }
            Violation::FieldsInMultipleLayers(layers) => {
                f.write_str("fields are declared in more than one layer:")?;
                for layer in layers {
                    write!(f, " {layer}")?;
                }
                Ok(())
            }
            Violation::RepeatedBase(b) => write!(f, "owned base {b} is reached along several paths"),
            Violation::FirstFieldIsBase { field, base } => {
                write!(f, "first field `{field}` has the type of base {base}")
            }
            Violation::Unresolved(idx) => write!(f, "type {idx} is not defined"),
            Violation::Cyclic(idx) => write!(f, "type {idx} contains itself"),
        }
    }
}

/// Verdicts together with the rules that decided them.
///
/// Each verdict holds iff its violation list is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Explanation {
    pub classification: Classification,
    pub trivial_violations: Vec<Violation>,
    pub standard_layout_violations: Vec<Violation>,
}

impl Explanation {
    pub(crate) fn from_violations(trivial: Vec<Violation>, standard_layout: Vec<Violation>) -> Self {
        Self {
            classification: Classification {
                is_trivial: trivial.is_empty(),
                is_standard_layout: standard_layout.is_empty(),
            },
            trivial_violations: trivial,
            standard_layout_violations: standard_layout,
        }
    }

    /// Both verdicts fail for the same reason.
    pub(crate) fn conservative(reason: Violation) -> Self {
        Self::from_violations(vec![reason.clone()], vec![reason])
    }
}
