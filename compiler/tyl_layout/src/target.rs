//! Target model: the platform parameters the layout policy depends on.

use std::fmt;

/// What may be placed in an owned base's tail padding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TailPadding {
    /// Every owned base occupies its full rounded size.
    #[default]
    Never,
    /// Members following a non-POD owned base start right after the base's
    /// last data byte, inside its tail padding.
    ReuseNonPod,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetModel {
    /// Size and alignment of data pointers and of the dispatch slot.
    pub pointer_size: u64,
    /// Largest natural alignment a scalar may declare. Forced alignment is
    /// not bounded by it.
    pub max_natural_align: u64,
    pub tail_padding: TailPadding,
}

impl TargetModel {
    /// 64-bit pointers, 16-byte maximum scalar alignment.
    pub const LP64: Self = Self {
        pointer_size: 8,
        max_natural_align: 16,
        tail_padding: TailPadding::Never,
    };

    /// 32-bit pointers, 8-byte maximum scalar alignment.
    pub const ILP32: Self = Self {
        pointer_size: 4,
        max_natural_align: 8,
        tail_padding: TailPadding::Never,
    };

    /// Look up a preset by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lp64" => Some(Self::LP64),
            "ilp32" => Some(Self::ILP32),
            _ => None,
        }
    }

    #[must_use]
    pub const fn with_tail_padding(mut self, tail_padding: TailPadding) -> Self {
        self.tail_padding = tail_padding;
        self
    }
}

impl Default for TargetModel {
    fn default() -> Self {
        Self::LP64
    }
}

impl fmt::Display for TargetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-bit pointers, max scalar alignment {}",
            self.pointer_size * 8,
            self.max_natural_align
        )?;
        if self.tail_padding == TailPadding::ReuseNonPod {
            f.write_str(", non-POD tail padding reused")?;
        }
        Ok(())
    }
}
