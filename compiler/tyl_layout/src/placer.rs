//! Placement: offsets, padding, dispatch slots and shared-base hoisting.
//!
//! Every type is placed as two parts. The non-virtual part holds the dispatch
//! slot, the owned bases and the fields; it is what a derived type embeds for
//! an owned base. The shared bases of the whole hierarchy follow it, each
//! placed once, and only in the most-derived object.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tyl_classify::{Classifier, TypeClassification};
use tyl_ir::{BaseKind, FieldSpec, FieldType, TypeDescriptor, TypeIdx, TypePool};
use tyl_stack::ensure_sufficient_stack;

use crate::align::checked_align_up;
use crate::bitfield::{pack_bits, BitMember};
use crate::{
    BasePlacement, BitPlacement, FieldPlacement, InvalidSpecError, TailPadding, TargetModel,
    TypeLayout,
};

/// A placed type.
#[derive(Debug)]
pub(crate) struct Region {
    /// The type as a complete object.
    pub(crate) layout: TypeLayout,
    /// End of the non-virtual part's data.
    nv_data_size: u64,
    /// The non-virtual part rounded to its alignment; zero when it is empty.
    nv_size: u64,
    nv_align: u64,
    /// Dispatch slot within the non-virtual part.
    nv_dispatch: Option<u64>,
    /// Every shared base of the hierarchy, depth-first pre-order, each once.
    shared: Vec<TypeIdx>,
}

/// Running state while one type's members are placed. Every move is
/// checked; `None` means the offset no longer fits in a `u64`.
struct Cursor {
    offset: u64,
    align: u64,
    pack_clamp: Option<u64>,
}

impl Cursor {
    fn new(pack_clamp: Option<u64>) -> Self {
        Self {
            offset: 0,
            align: 1,
            pack_clamp,
        }
    }

    fn clamp(&self, align: u64) -> u64 {
        self.pack_clamp.map_or(align, |clamp| align.min(clamp))
    }

    /// Fold a clamped `align` into the type's alignment without moving.
    fn fold(&mut self, align: u64) {
        self.align = self.align.max(self.clamp(align));
    }

    /// Fold `align` in and round the cursor up to it. Returns the aligned
    /// offset.
    fn align_to(&mut self, align: u64) -> Option<u64> {
        self.fold(align);
        self.skip_to(align)
    }

    /// Round the cursor up without affecting the type's alignment.
    fn skip_to(&mut self, align: u64) -> Option<u64> {
        self.offset = checked_align_up(self.offset, self.clamp(align))?;
        Some(self.offset)
    }

    /// Move to `from + len`.
    fn end_at(&mut self, from: u64, len: u64) -> Option<()> {
        self.offset = from.checked_add(len)?;
        Some(())
    }
}

/// Memoising placer. Only ever sees descriptors that passed validation.
pub(crate) struct Placer<'pool> {
    pool: &'pool TypePool,
    target: TargetModel,
    regions: FxHashMap<TypeIdx, Rc<Region>>,
    classifier: Classifier<'pool>,
}

impl<'pool> Placer<'pool> {
    pub(crate) fn new(pool: &'pool TypePool, target: TargetModel) -> Self {
        Self {
            pool,
            target,
            regions: FxHashMap::default(),
            classifier: Classifier::new(pool),
        }
    }

    pub(crate) fn place(&mut self, idx: TypeIdx) -> Result<Rc<Region>, InvalidSpecError> {
        if let Some(region) = self.regions.get(&idx) {
            return Ok(Rc::clone(region));
        }
        let pool = self.pool;
        let desc = pool.get(idx).ok_or_else(|| InvalidSpecError::UndefinedType {
            idx,
            name: pool.name(idx).unwrap_or_default().to_owned(),
        })?;

        let region = Rc::new(ensure_sufficient_stack(|| self.place_type(desc))?);
        tracing::debug!(
            ty = %desc.name,
            size = region.layout.size,
            align = region.layout.align,
            "placed type"
        );
        self.regions.insert(idx, Rc::clone(&region));
        Ok(region)
    }

    fn place_type(&mut self, desc: &TypeDescriptor) -> Result<Region, InvalidSpecError> {
        let ptr = self.target.pointer_size;
        let overflow = || InvalidSpecError::SizeOverflow {
            ty: desc.name.clone(),
        };
        let mut cursor = Cursor::new(desc.pack_clamp);
        let mut bases = Vec::with_capacity(desc.bases.len());
        let mut dispatch = None;

        let owned = desc
            .owned_bases()
            .map(|base| Ok((base.ty, self.place(base.ty)?)))
            .collect::<Result<SmallVec<[_; 2]>, InvalidSpecError>>()?;

        // An owned base that already has a slot lends it to this type.
        let inherits_dispatch = owned.iter().any(|(_, r)| r.nv_dispatch.is_some());
        if desc.introduces_dispatch && !inherits_dispatch {
            let slot = cursor.align_to(ptr).ok_or_else(overflow)?;
            cursor.end_at(slot, ptr).ok_or_else(overflow)?;
            dispatch = Some(slot);
        }

        for (ty, region) in &owned {
            // An empty base shares its address with whatever follows.
            if region.nv_data_size == 0 {
                cursor.fold(region.nv_align);
                bases.push(BasePlacement {
                    ty: *ty,
                    offset: cursor.offset,
                    size: 0,
                    kind: BaseKind::Owned,
                });
                continue;
            }
            let offset = cursor.align_to(region.nv_align).ok_or_else(overflow)?;
            let advance = if self.reuses_tail_of(*ty) {
                region.nv_data_size
            } else {
                region.nv_size
            };
            tracing::trace!(base = %ty, offset, advance, "owned base");
            bases.push(BasePlacement {
                ty: *ty,
                offset,
                size: region.nv_size,
                kind: BaseKind::Owned,
            });
            cursor.end_at(offset, advance).ok_or_else(overflow)?;
            if dispatch.is_none() {
                dispatch = region.nv_dispatch.map(|slot| offset + slot);
            }
        }

        let fields = self
            .place_fields(desc, &mut cursor)?
            .ok_or_else(overflow)?;

        if let Some(forced) = desc.forced_align {
            cursor.align = cursor.align.max(forced);
        }
        let nv_data_size = cursor.offset;
        let nv_align = cursor.align;
        let nv_size = if nv_data_size == 0 {
            0
        } else {
            checked_align_up(nv_data_size, nv_align).ok_or_else(overflow)?
        };
        let nv_dispatch = dispatch;

        let shared = self.collect_shared(desc, &owned)?;
        for &ty in &shared {
            let region = self.place(ty)?;
            let (offset, size) = if region.nv_data_size == 0 {
                cursor.fold(region.nv_align);
                (cursor.offset, 0)
            } else {
                let offset = cursor.align_to(region.nv_align).ok_or_else(overflow)?;
                (offset, region.nv_size)
            };
            tracing::trace!(base = %ty, offset, size, "shared base");
            bases.push(BasePlacement {
                ty,
                offset,
                size,
                kind: BaseKind::Shared,
            });
            cursor.end_at(offset, size).ok_or_else(overflow)?;
            if dispatch.is_none() {
                dispatch = region.nv_dispatch.map(|slot| offset + slot);
            }
        }

        let data_size = cursor.offset;
        let align = cursor.align;
        let size = checked_align_up(data_size.max(1), align).ok_or_else(overflow)?;

        Ok(Region {
            layout: TypeLayout {
                size,
                align,
                data_size,
                dispatch_offset: dispatch,
                fields,
                bases,
            },
            nv_data_size,
            nv_size,
            nv_align,
            nv_dispatch,
            shared,
        })
    }

    /// Under [`TailPadding::ReuseNonPod`], members following a non-POD
    /// owned base may start inside its tail padding.
    fn reuses_tail_of(&self, base: TypeIdx) -> bool {
        self.target.tail_padding == TailPadding::ReuseNonPod && !self.classifier.is_pod(base)
    }

    /// `Ok(None)` when the fields run past the end of the address space.
    fn place_fields(
        &mut self,
        desc: &TypeDescriptor,
        cursor: &mut Cursor,
    ) -> Result<Option<Vec<FieldPlacement>>, InvalidSpecError> {
        let mut placed = Vec::with_capacity(desc.fields.len());
        let mut rest = desc.fields.as_slice();

        while let Some((field, tail)) = rest.split_first() {
            match field.bit_width {
                Some(0) => {
                    let Some(offset) = cursor.skip_to(storage_unit(field)) else {
                        return Ok(None);
                    };
                    placed.push(FieldPlacement {
                        name: field.name.clone(),
                        offset,
                        size: 0,
                        bits: Some(BitPlacement {
                            bit_offset: 0,
                            bit_width: 0,
                        }),
                    });
                    rest = tail;
                }
                Some(_) => {
                    let unit = storage_unit(field);
                    let len = rest
                        .iter()
                        .take_while(|f| {
                            f.bit_width.is_some_and(|w| w > 0) && storage_unit(f) == unit
                        })
                        .count();
                    let (run, tail) = rest.split_at(len);
                    if place_run(run, unit, cursor, &mut placed).is_none() {
                        return Ok(None);
                    }
                    rest = tail;
                }
                None => {
                    let (size, natural) = self.extent(field.ty)?;
                    let align = natural.max(field.forced_align.unwrap_or(1));
                    let Some(offset) = cursor.align_to(align) else {
                        return Ok(None);
                    };
                    tracing::trace!(field = %field.name, offset, size, "field");
                    placed.push(FieldPlacement {
                        name: field.name.clone(),
                        offset,
                        size,
                        bits: None,
                    });
                    if cursor.end_at(offset, size).is_none() {
                        return Ok(None);
                    }
                    rest = tail;
                }
            }
        }

        Ok(Some(placed))
    }

    /// Size and natural alignment of a non-bit-field member.
    fn extent(&mut self, ty: FieldType) -> Result<(u64, u64), InvalidSpecError> {
        Ok(match ty {
            FieldType::Scalar { size, align } => (size, align),
            FieldType::Pointer => (self.target.pointer_size, self.target.pointer_size),
            FieldType::Composite(nested) => {
                let region = self.place(nested)?;
                (region.layout.size, region.layout.align)
            }
        })
    }

    fn collect_shared(
        &mut self,
        desc: &TypeDescriptor,
        owned: &[(TypeIdx, Rc<Region>)],
    ) -> Result<Vec<TypeIdx>, InvalidSpecError> {
        let mut seen = FxHashSet::default();
        let mut shared = Vec::new();
        let mut owned = owned.iter();

        for base in &desc.bases {
            let region = if base.is_shared() {
                if seen.insert(base.ty) {
                    shared.push(base.ty);
                }
                self.place(base.ty)?
            } else {
                match owned.next() {
                    Some((_, region)) => Rc::clone(region),
                    None => self.place(base.ty)?,
                }
            };
            for &ty in &region.shared {
                if seen.insert(ty) {
                    shared.push(ty);
                }
            }
        }

        Ok(shared)
    }
}

/// Storage unit of a validated bit-field: its scalar size.
fn storage_unit(field: &FieldSpec) -> u64 {
    match field.ty {
        FieldType::Scalar { size, .. } => size,
        FieldType::Pointer | FieldType::Composite(_) => 1,
    }
}

fn place_run(
    run: &[FieldSpec],
    unit: u64,
    cursor: &mut Cursor,
    placed: &mut Vec<FieldPlacement>,
) -> Option<()> {
    let members: SmallVec<[BitMember<'_>; 8]> = run
        .iter()
        .map(|f| BitMember {
            name: &f.name,
            width: f.bit_width.unwrap_or(0),
        })
        .collect();
    let region = pack_bits(&members, unit);
    let start = cursor.align_to(region.align)?;
    cursor.end_at(start, region.size)?;
    let unit_bits = unit * 8;

    for bit in &region.bits {
        let unit_index = bit.bit_offset / unit_bits;
        tracing::trace!(field = bit.name, unit = unit_index, bit = bit.bit_offset % unit_bits, "bit-field");
        placed.push(FieldPlacement {
            name: bit.name.to_owned(),
            offset: start + unit_index * unit,
            size: unit,
            bits: Some(BitPlacement {
                bit_offset: bit.bit_offset % unit_bits,
                bit_width: bit.width,
            }),
        });
    }
    Some(())
}
