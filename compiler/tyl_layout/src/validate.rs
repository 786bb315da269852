//! Descriptor validation.
//!
//! Runs over every type reachable from the requested one (through bases and
//! composite members) before placement starts, so placement never sees a
//! malformed descriptor and never has to unwind half-computed state.

use rustc_hash::{FxHashMap, FxHashSet};
use tyl_ir::{FieldSpec, FieldType, TypeDescriptor, TypeIdx, TypePool};
use tyl_stack::ensure_sufficient_stack;

use crate::{InvalidSpecError, TargetModel};

/// Validates reachable descriptors, remembering each valid type's final
/// alignment so shared subgraphs are checked once.
pub(crate) struct Validator<'pool> {
    pool: &'pool TypePool,
    target: TargetModel,
    valid: FxHashMap<TypeIdx, u64>,
    visiting: FxHashSet<TypeIdx>,
}

impl<'pool> Validator<'pool> {
    pub(crate) fn new(pool: &'pool TypePool, target: TargetModel) -> Self {
        Self {
            pool,
            target,
            valid: FxHashMap::default(),
            visiting: FxHashSet::default(),
        }
    }

    /// Check `idx` and everything it reaches.
    pub(crate) fn validate(&mut self, idx: TypeIdx) -> Result<(), InvalidSpecError> {
        let result = self.visit(idx).map(|_| ());
        // An error unwinds straight here, leaving its path marked.
        self.visiting.clear();
        result
    }

    /// Returns the final alignment of a valid type.
    fn visit(&mut self, idx: TypeIdx) -> Result<u64, InvalidSpecError> {
        if let Some(&align) = self.valid.get(&idx) {
            return Ok(align);
        }
        if !self.pool.contains(idx) {
            return Err(InvalidSpecError::UnknownType(idx));
        }
        let pool = self.pool;
        let desc = pool.get(idx).ok_or_else(|| InvalidSpecError::UndefinedType {
            idx,
            name: pool.name(idx).unwrap_or_default().to_owned(),
        })?;
        if !self.visiting.insert(idx) {
            return Err(InvalidSpecError::CyclicHierarchy {
                ty: desc.name.clone(),
            });
        }

        let align = ensure_sufficient_stack(|| self.check(desc))?;

        self.visiting.remove(&idx);
        self.valid.insert(idx, align);
        Ok(align)
    }

    fn check(&mut self, desc: &TypeDescriptor) -> Result<u64, InvalidSpecError> {
        let ty = || desc.name.clone();

        if desc.forced_align.is_some() && desc.pack_clamp.is_some() {
            return Err(InvalidSpecError::ForcedAlignmentAndPackClamp { ty: ty() });
        }
        if let Some(forced) = desc.forced_align {
            power_of_two(desc, "the type's forced alignment", forced)?;
        }
        if let Some(clamp) = desc.pack_clamp {
            power_of_two(desc, "the packing clamp", clamp)?;
        }

        let mut required = if desc.introduces_dispatch {
            self.target.pointer_size
        } else {
            1
        };

        for base in &desc.bases {
            required = required.max(self.visit(base.ty)?);
        }

        let mut names = FxHashSet::default();
        for field in &desc.fields {
            if !field.is_anonymous() && !names.insert(field.name.as_str()) {
                return Err(InvalidSpecError::DuplicateField {
                    ty: ty(),
                    field: field.name.clone(),
                });
            }
            let align = self.check_field(desc, field)?;
            if !field.is_flush_marker() {
                required = required.max(align);
            }
        }

        match (desc.forced_align, desc.pack_clamp) {
            (Some(forced), _) if forced < required => Err(InvalidSpecError::ForcedAlignmentTooSmall {
                ty: ty(),
                forced,
                required,
            }),
            (Some(forced), _) => Ok(forced),
            (None, Some(clamp)) => Ok(required.min(clamp)),
            (None, None) => Ok(required),
        }
    }

    /// Returns the alignment the field asks for before any packing clamp.
    fn check_field(
        &mut self,
        desc: &TypeDescriptor,
        field: &FieldSpec,
    ) -> Result<u64, InvalidSpecError> {
        let member = || format!("field `{}`", field.name);

        // Bit-fields are aligned to their storage unit and nothing else.
        if field.is_bit_field() && field.forced_align.is_some() {
            return Err(InvalidSpecError::AlignedBitField {
                ty: desc.name.clone(),
                field: field.name.clone(),
            });
        }

        let natural = match field.ty {
            FieldType::Scalar { size, align } => {
                if size == 0 {
                    return Err(InvalidSpecError::ZeroSizedField {
                        ty: desc.name.clone(),
                        field: field.name.clone(),
                    });
                }
                // A bit-field region is aligned to its storage unit size.
                let align = if field.is_bit_field() { size } else { align };
                power_of_two(desc, &member(), align)?;
                if align > self.target.max_natural_align {
                    return Err(InvalidSpecError::AlignmentExceedsMaximum {
                        ty: desc.name.clone(),
                        member: member(),
                        align,
                        max: self.target.max_natural_align,
                    });
                }
                if let Some(width) = field.bit_width {
                    if u64::from(width) > size * 8 {
                        return Err(InvalidSpecError::BitWidthTooWide {
                            ty: desc.name.clone(),
                            field: field.name.clone(),
                            width,
                            storage_bits: size * 8,
                        });
                    }
                }
                align
            }
            FieldType::Pointer | FieldType::Composite(_) if field.is_bit_field() => {
                return Err(InvalidSpecError::NonScalarBitField {
                    ty: desc.name.clone(),
                    field: field.name.clone(),
                });
            }
            FieldType::Pointer => self.target.pointer_size,
            FieldType::Composite(nested) => self.visit(nested)?,
        };

        match field.forced_align {
            Some(forced) => {
                power_of_two(desc, &member(), forced)?;
                Ok(natural.max(forced))
            }
            None => Ok(natural),
        }
    }
}

fn power_of_two(desc: &TypeDescriptor, member: &str, align: u64) -> Result<(), InvalidSpecError> {
    if align.is_power_of_two() {
        Ok(())
    } else {
        Err(InvalidSpecError::NonPowerOfTwoAlignment {
            ty: desc.name.clone(),
            member: member.to_owned(),
            align,
        })
    }
}
