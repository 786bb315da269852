//! Stack growth for recursive hierarchy walks.
//!
//! Layout and classification both recurse through base types and composite
//! members. Hierarchies built programmatically can be arbitrarily deep (a
//! generated chain of ten thousand single-inheritance layers is a legitimate
//! input), so every recursive step goes through [`ensure_sufficient_stack`].
//!
//! On native targets the stack is grown on demand with `stacker`; on WASM
//! the closure is called directly.

/// Grow the stack when less than this much remains (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (1MB).
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if fewer than [`RED_ZONE`] bytes remain.
///
/// ```text
/// fn depth(&self, idx: TypeIdx) -> usize {
///     ensure_sufficient_stack(|| {
///         1 + self.bases(idx).map(|b| self.depth(b)).max().unwrap_or(0)
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
