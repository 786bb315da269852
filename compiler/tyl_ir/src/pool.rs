//! Append-only arena of type descriptors.
//!
//! The authoring layer builds a pool, resolving named base references into
//! [`TypeIdx`] handles, then hands `&TypePool` to the engines. A shared
//! borrow is what "closed" means: nothing can change a descriptor while a
//! layout or classification is running over it.
//!
//! Forward references (a member whose type is declared later, or a recursive
//! type that the engines must reject) go through [`TypePool::declare`] followed
//! by exactly one [`TypePool::define`].

use thiserror::Error;

use crate::{TypeDescriptor, TypeIdx};

/// Error from [`TypePool::define`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefineError {
    #[error("type index {0} does not belong to this pool")]
    UnknownIndex(TypeIdx),
    #[error("type `{name}` ({idx}) is already defined")]
    AlreadyDefined { idx: TypeIdx, name: String },
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    desc: Option<TypeDescriptor>,
}

#[derive(Clone, Debug, Default)]
pub struct TypePool {
    entries: Vec<Entry>,
}

impl TypePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fully defined type.
    pub fn add(&mut self, desc: TypeDescriptor) -> TypeIdx {
        let idx = self.next_idx();
        self.entries.push(Entry {
            name: desc.name.clone(),
            desc: Some(desc),
        });
        idx
    }

    /// Reserve an index for a type that will be defined later.
    pub fn declare(&mut self, name: impl Into<String>) -> TypeIdx {
        let idx = self.next_idx();
        self.entries.push(Entry {
            name: name.into(),
            desc: None,
        });
        idx
    }

    /// Fill a declared slot. The descriptor's name replaces the declared one.
    pub fn define(&mut self, idx: TypeIdx, desc: TypeDescriptor) -> Result<(), DefineError> {
        let entry = self
            .entries
            .get_mut(idx.index())
            .ok_or(DefineError::UnknownIndex(idx))?;
        if entry.desc.is_some() {
            return Err(DefineError::AlreadyDefined {
                idx,
                name: entry.name.clone(),
            });
        }
        entry.name.clone_from(&desc.name);
        entry.desc = Some(desc);
        Ok(())
    }

    /// The descriptor at `idx`, or `None` if out of range or only declared.
    pub fn get(&self, idx: TypeIdx) -> Option<&TypeDescriptor> {
        self.entries.get(idx.index()).and_then(|e| e.desc.as_ref())
    }

    pub fn contains(&self, idx: TypeIdx) -> bool {
        idx.index() < self.entries.len()
    }

    pub fn is_defined(&self, idx: TypeIdx) -> bool {
        self.get(idx).is_some()
    }

    /// Name of a declared or defined type.
    pub fn name(&self, idx: TypeIdx) -> Option<&str> {
        self.entries.get(idx.index()).map(|e| e.name.as_str())
    }

    /// First type with the given name.
    pub fn find(&self, name: &str) -> Option<TypeIdx> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(TypeIdx::from_raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every index in declaration order.
    pub fn indices(&self) -> impl Iterator<Item = TypeIdx> + '_ {
        (0..self.entries.len())
            .filter_map(|i| u32::try_from(i).ok())
            .map(TypeIdx::from_raw)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "pools beyond u32::MAX entries are not supported"
    )]
    fn next_idx(&self) -> TypeIdx {
        TypeIdx::from_raw(self.entries.len() as u32)
    }
}
