//! Memoised, cycle-safe classifier.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tyl_ir::{FieldType, TypeDescriptor, TypeIdx, TypePool};
use tyl_stack::ensure_sufficient_stack;

use crate::{Classification, Explanation, TypeClassification, Violation};

/// Classify one type with a fresh classifier.
pub fn classify(pool: &TypePool, idx: TypeIdx) -> Classification {
    Classifier::new(pool).classification(idx)
}

/// Classify one type and report every rule it breaks.
pub fn explain(pool: &TypePool, idx: TypeIdx) -> Explanation {
    Classifier::new(pool).explain(idx)
}

/// Structural facts about a type's whole inheritance graph.
#[derive(Debug, Default)]
struct Hierarchy {
    /// Every transitive base type, first-seen pre-order, without duplicates.
    bases: Vec<TypeIdx>,
    base_set: FxHashSet<TypeIdx>,
    /// Types in the hierarchy (the type included) that declare fields.
    data_layers: Vec<TypeIdx>,
    /// How many owned-base subobjects of each type the object contains,
    /// in first-seen order.
    owned_counts: Vec<(TypeIdx, u32)>,
    owned_slots: FxHashMap<TypeIdx, usize>,
}

impl Hierarchy {
    fn note_base(&mut self, ty: TypeIdx) {
        if self.base_set.insert(ty) {
            self.bases.push(ty);
        }
    }

    fn note_layer(&mut self, ty: TypeIdx) {
        if !self.data_layers.contains(&ty) {
            self.data_layers.push(ty);
        }
    }

    fn add_owned(&mut self, ty: TypeIdx, count: u32) {
        match self.owned_slots.get(&ty) {
            Some(&slot) => self.owned_counts[slot].1 += count,
            None => {
                self.owned_slots.insert(ty, self.owned_counts.len());
                self.owned_counts.push((ty, count));
            }
        }
    }

    fn has_base(&self, ty: TypeIdx) -> bool {
        self.base_set.contains(&ty)
    }

    fn repeated_base(&self) -> Option<TypeIdx> {
        self.owned_counts
            .iter()
            .find(|&&(_, n)| n > 1)
            .map(|&(ty, _)| ty)
    }
}

/// Classifier over a borrowed pool.
///
/// Verdicts and hierarchy facts are cached per index. The pool cannot change
/// while borrowed, so a cached answer stays valid for the classifier's
/// lifetime. `RefCell` keeps the query methods on `&self`; a classifier is
/// meant for one thread, and concurrent callers each build their own.
pub struct Classifier<'pool> {
    pool: &'pool TypePool,
    cache: RefCell<FxHashMap<TypeIdx, Classification>>,
    hierarchies: RefCell<FxHashMap<TypeIdx, Result<Rc<Hierarchy>, Violation>>>,
    /// Types whose verdict is being computed; re-entry means a cycle.
    classifying: RefCell<FxHashSet<TypeIdx>>,
    /// Types whose hierarchy is being walked.
    walking: RefCell<FxHashSet<TypeIdx>>,
}

impl<'pool> Classifier<'pool> {
    pub fn new(pool: &'pool TypePool) -> Self {
        Self {
            pool,
            cache: RefCell::new(FxHashMap::default()),
            hierarchies: RefCell::new(FxHashMap::default()),
            classifying: RefCell::new(FxHashSet::default()),
            walking: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn pool(&self) -> &'pool TypePool {
        self.pool
    }

    /// Verdicts plus the violated rules, computed for `idx` itself.
    ///
    /// Bases and composite members are looked up through the cache, so their
    /// own reasons are summarised as a single `NonTrivialBase`-style entry.
    pub fn explain(&self, idx: TypeIdx) -> Explanation {
        ensure_sufficient_stack(|| self.explain_inner(idx))
    }

    fn classify_cached(&self, idx: TypeIdx) -> Classification {
        if let Some(&cached) = self.cache.borrow().get(&idx) {
            return cached;
        }
        let result = self.explain(idx).classification;
        self.cache.borrow_mut().insert(idx, result);
        result
    }

    fn explain_inner(&self, idx: TypeIdx) -> Explanation {
        let Some(desc) = self.pool.get(idx) else {
            tracing::warn!(idx = %idx, "classifying an undefined type");
            return Explanation::conservative(Violation::Unresolved(idx));
        };

        if !self.classifying.borrow_mut().insert(idx) {
            tracing::warn!(ty = %desc.name, "classifying a type that contains itself");
            return Explanation::conservative(Violation::Cyclic(idx));
        }

        let result = match self.hierarchy(idx) {
            Ok(hierarchy) => self.explain_defined(desc, &hierarchy),
            Err(reason) => Explanation::conservative(reason),
        };

        self.classifying.borrow_mut().remove(&idx);

        tracing::debug!(
            ty = %desc.name,
            trivial = result.classification.is_trivial,
            standard_layout = result.classification.is_standard_layout,
            "classified type"
        );
        result
    }

    fn explain_defined(&self, desc: &TypeDescriptor, hierarchy: &Hierarchy) -> Explanation {
        let mut trivial = Vec::new();
        let mut standard = Vec::new();

        if desc.introduces_dispatch {
            trivial.push(Violation::DispatchPointer);
            standard.push(Violation::DispatchPointer);
        }

        for base in &desc.bases {
            if base.is_shared() {
                trivial.push(Violation::SharedBase(base.ty));
                standard.push(Violation::SharedBase(base.ty));
            }
            let verdict = self.classify_cached(base.ty);
            if !verdict.is_trivial {
                trivial.push(Violation::NonTrivialBase(base.ty));
            }
            if !verdict.is_standard_layout {
                standard.push(Violation::NonStandardBase(base.ty));
            }
        }

        if !desc.special_members.is_empty() {
            trivial.push(Violation::UserProvided(desc.special_members));
        }

        for field in &desc.fields {
            if field.default_init {
                trivial.push(Violation::DefaultMemberInit(field.name.clone()));
            }
            let verdict = self.field_classification(field.ty);
            if !verdict.is_trivial {
                trivial.push(Violation::NonTrivialField(field.name.clone()));
            }
            if !verdict.is_standard_layout {
                standard.push(Violation::NonStandardField(field.name.clone()));
            }
        }

        let groups = desc.access_groups();
        if groups.len() > 1 {
            standard.push(Violation::MixedAccess(groups));
        }

        if hierarchy.data_layers.len() > 1 {
            standard.push(Violation::FieldsInMultipleLayers(
                hierarchy.data_layers.clone(),
            ));
        }

        if let Some(repeated) = hierarchy.repeated_base() {
            standard.push(Violation::RepeatedBase(repeated));
        }

        let first = desc.fields.iter().find(|f| !f.is_flush_marker());
        if let Some(field) = first {
            if let Some(ty) = field.ty.composite() {
                if hierarchy.has_base(ty) {
                    standard.push(Violation::FirstFieldIsBase {
                        field: field.name.clone(),
                        base: ty,
                    });
                }
            }
        }

        Explanation::from_violations(trivial, standard)
    }

    fn field_classification(&self, ty: FieldType) -> Classification {
        match ty {
            FieldType::Scalar { .. } | FieldType::Pointer => Classification::POD,
            FieldType::Composite(idx) => self.classify_cached(idx),
        }
    }

    /// Inheritance facts for `idx`, or the reason the graph below it cannot
    /// be walked.
    fn hierarchy(&self, idx: TypeIdx) -> Result<Rc<Hierarchy>, Violation> {
        if let Some(cached) = self.hierarchies.borrow().get(&idx) {
            return cached.clone();
        }

        let desc = self.pool.get(idx).ok_or(Violation::Unresolved(idx))?;
        if !self.walking.borrow_mut().insert(idx) {
            return Err(Violation::Cyclic(idx));
        }

        let result = ensure_sufficient_stack(|| self.walk_hierarchy(idx, desc)).map(Rc::new);

        self.walking.borrow_mut().remove(&idx);
        self.hierarchies.borrow_mut().insert(idx, result.clone());
        result
    }

    fn walk_hierarchy(&self, idx: TypeIdx, desc: &TypeDescriptor) -> Result<Hierarchy, Violation> {
        let mut out = Hierarchy::default();
        if desc.declares_data() {
            out.note_layer(idx);
        }

        for base in &desc.bases {
            let below = self.hierarchy(base.ty)?;
            out.note_base(base.ty);
            for &ty in &below.bases {
                out.note_base(ty);
            }
            for &ty in &below.data_layers {
                out.note_layer(ty);
            }
            // A shared base already breaks standard layout; its subobjects
            // are not counted per path.
            if !base.is_shared() {
                out.add_owned(base.ty, 1);
                for &(ty, n) in &below.owned_counts {
                    out.add_owned(ty, n);
                }
            }
        }

        Ok(out)
    }
}

impl TypeClassification for Classifier<'_> {
    fn classification(&self, idx: TypeIdx) -> Classification {
        self.classify_cached(idx)
    }
}
