//! Type descriptor model for the tyl layout engine.
//!
//! This crate provides the input side of the engines:
//!
//! - **Fields** ([`FieldSpec`], [`FieldType`]): scalars, pointers, nested
//!   composites, optional bit width and member-level forced alignment.
//! - **Bases** ([`BaseSpec`]): owned (replicated per path) or shared
//!   (placed once per most-derived object).
//! - **Types** ([`TypeDescriptor`]): ordered bases and fields plus the
//!   polymorphism flag, forced alignment, packing clamp, and user-provided
//!   special members.
//! - **Pool** ([`TypePool`], [`TypeIdx`]): an arena in which base and
//!   member references are resolved to indices before any engine runs.
//!
//! The engines never resolve names. Everything they see is an index into a
//! pool that they borrow immutably.

mod base;
mod descriptor;
mod field;
mod idx;
mod pool;

pub use base::{BaseKind, BaseSpec};
pub use descriptor::{SpecialMembers, TypeDescriptor};
pub use field::{Access, FieldSpec, FieldType};
pub use idx::TypeIdx;
pub use pool::{DefineError, TypePool};

#[cfg(test)]
mod tests;
