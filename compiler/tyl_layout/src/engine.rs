//! Single-threaded layout engine.

use tyl_ir::{TypeIdx, TypePool};

use crate::placer::Placer;
use crate::validate::Validator;
use crate::{InvalidSpecError, TargetModel, TypeLayout};

/// Lays out types of one pool for one target.
///
/// Validation results and placed regions are memoised, so laying out every
/// type of a pool through one engine costs one pass over each descriptor.
/// For concurrent access use [`LayoutCache`](crate::LayoutCache).
pub struct LayoutEngine<'pool> {
    pool: &'pool TypePool,
    target: TargetModel,
    validator: Validator<'pool>,
    placer: Placer<'pool>,
}

impl<'pool> LayoutEngine<'pool> {
    pub fn new(pool: &'pool TypePool, target: TargetModel) -> Self {
        Self {
            pool,
            target,
            validator: Validator::new(pool, target),
            placer: Placer::new(pool, target),
        }
    }

    pub fn pool(&self) -> &'pool TypePool {
        self.pool
    }

    pub fn target(&self) -> TargetModel {
        self.target
    }

    pub fn layout(&mut self, idx: TypeIdx) -> Result<TypeLayout, InvalidSpecError> {
        self.validator.validate(idx)?;
        Ok(self.placer.place(idx)?.layout.clone())
    }
}
