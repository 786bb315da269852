//! Thread-safe, compute-once layout cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tyl_ir::{TypeIdx, TypePool};

use crate::{layout, InvalidSpecError, TargetModel, TypeLayout};

type Slot = Arc<OnceLock<Result<Arc<TypeLayout>, InvalidSpecError>>>;

/// Layouts of one pool for one target, shared between threads.
///
/// Each type is computed at most once. Concurrent requests for the same type
/// wait on its slot instead of recomputing; the map lock is held only long
/// enough to fetch the slot.
pub struct LayoutCache<'pool> {
    pool: &'pool TypePool,
    target: TargetModel,
    slots: Mutex<FxHashMap<TypeIdx, Slot>>,
    computed: AtomicUsize,
}

impl<'pool> LayoutCache<'pool> {
    pub fn new(pool: &'pool TypePool, target: TargetModel) -> Self {
        Self {
            pool,
            target,
            slots: Mutex::new(FxHashMap::default()),
            computed: AtomicUsize::new(0),
        }
    }

    pub fn target(&self) -> TargetModel {
        self.target
    }

    pub fn get(&self, idx: TypeIdx) -> Result<Arc<TypeLayout>, InvalidSpecError> {
        let slot = Arc::clone(self.slots.lock().entry(idx).or_default());
        slot.get_or_init(|| {
            self.computed.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(idx = %idx, "computing layout");
            layout(self.pool, idx, &self.target).map(Arc::new)
        })
        .clone()
    }

    /// Number of layouts computed so far, errors included.
    pub fn computed(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }
}
