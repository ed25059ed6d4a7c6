//! Header Layout - Bit-field positions of the packed header word
//!
//! The header word is a single `u32`. Its layout is owned by the host runtime
//! and must stay bit-exact with it; every shift and mask used by the codec is
//! derived from the constants in this module.
//!
//! Standard layout (default):
//! ┌──────────────────────────────┬──────────┬──────────────┐
//! │        length (21 bits)      │ shift(3) │   kind (8)   │
//! │            31-11             │  10-8    │     7-0      │
//! └──────────────────────────────┴──────────┴──────────────┘
//!
//! Compact layout:
//! ┌──────────┬──────────┬──────────────────────────────────┐
//! │ kind (2) │ shift(2) │          length (28 bits)        │
//! │  31-30   │  29-28   │               27-0               │
//! └──────────┴──────────┴──────────────────────────────────┘

use crate::error::HeaderField;
use crate::kind::ObjectKind;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

/// Width of the packed header word in bits
pub const HEADER_BITS: u32 = u32::BITS;

/// Widest element-size shift field accepted (shift values 0-7)
pub const MAX_SHIFT_WIDTH: u32 = 3;

/// A contiguous run of bits inside the header word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitField {
    /// Position of the least significant bit
    pub shift: u32,
    /// Number of bits
    pub width: u32,
}

impl BitField {
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    /// Largest value the field can hold
    #[inline(always)]
    pub const fn max_value(self) -> u32 {
        if self.width >= HEADER_BITS {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Field bits in place within the header word
    #[inline(always)]
    pub const fn mask(self) -> u32 {
        self.max_value() << self.shift
    }

    #[inline(always)]
    pub const fn fits(self, value: u32) -> bool {
        value <= self.max_value()
    }

    /// Place `value` into the field; bits beyond the field width are dropped
    #[inline(always)]
    pub const fn insert(self, value: u32) -> u32 {
        (value << self.shift) & self.mask()
    }

    #[inline(always)]
    pub const fn extract(self, word: u32) -> u32 {
        (word >> self.shift) & self.max_value()
    }

    const fn in_bounds(self) -> bool {
        self.width > 0 && self.shift < HEADER_BITS && self.width <= HEADER_BITS - self.shift
    }

    const fn overlaps(self, other: Self) -> bool {
        self.mask() & other.mask() != 0
    }
}

/// Layout errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{field} field [{shift}:{end}) does not fit a 32-bit header")]
    OutOfBounds {
        field: HeaderField,
        shift: u32,
        end: u32,
    },

    #[error("{a} and {b} fields overlap")]
    Overlap { a: HeaderField, b: HeaderField },

    #[error("kind field holds at most {max}, needs {needed}")]
    KindTooNarrow { max: u32, needed: u32 },

    #[error("elem_size_shift field is {width} bits wide, at most 3 allowed")]
    ShiftTooWide { width: u32 },
}

/// Bit positions of every header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderLayout {
    pub kind: BitField,
    pub elem_size_shift: BitField,
    pub length: BitField,
}

impl HeaderLayout {
    /// kind [0:8), elem_size_shift [8:11), length [11:32)
    pub const STANDARD: Self = Self {
        kind: BitField::new(0, 8),
        elem_size_shift: BitField::new(8, 3),
        length: BitField::new(11, 21),
    };

    /// length [0:28), elem_size_shift [28:30), kind [30:32)
    pub const COMPACT: Self = Self {
        kind: BitField::new(30, 2),
        elem_size_shift: BitField::new(28, 2),
        length: BitField::new(0, 28),
    };

    /// Look up a built-in layout by name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::STANDARD),
            "compact" => Some(Self::COMPACT),
            _ => None,
        }
    }

    /// Preset name, or `"custom"`
    pub fn name(&self) -> &'static str {
        if *self == Self::STANDARD {
            "standard"
        } else if *self == Self::COMPACT {
            "compact"
        } else {
            "custom"
        }
    }

    #[inline(always)]
    pub const fn field(&self, field: HeaderField) -> BitField {
        match field {
            HeaderField::Kind => self.kind,
            HeaderField::ElemSizeShift => self.elem_size_shift,
            HeaderField::Length => self.length,
        }
    }

    /// Bits not claimed by any field
    pub const fn reserved_mask(&self) -> u32 {
        !(self.kind.mask() | self.elem_size_shift.mask() | self.length.mask())
    }

    pub const fn is_disjoint(&self) -> bool {
        !self.kind.overlaps(self.elem_size_shift)
            && !self.kind.overlaps(self.length)
            && !self.elem_size_shift.overlaps(self.length)
    }

    /// Compile-time friendly form of [`HeaderLayout::validate`]
    pub const fn is_valid(&self) -> bool {
        self.kind.in_bounds()
            && self.elem_size_shift.in_bounds()
            && self.length.in_bounds()
            && self.is_disjoint()
            && self.kind.fits(ObjectKind::MAX as u32)
            && self.elem_size_shift.width <= MAX_SHIFT_WIDTH
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        const FIELDS: [HeaderField; 3] =
            [HeaderField::Kind, HeaderField::ElemSizeShift, HeaderField::Length];

        for field in FIELDS {
            let bits = self.field(field);
            if !bits.in_bounds() {
                return Err(LayoutError::OutOfBounds {
                    field,
                    shift: bits.shift,
                    end: bits.shift.saturating_add(bits.width),
                });
            }
        }

        for (i, &a) in FIELDS.iter().enumerate() {
            for &b in &FIELDS[i + 1..] {
                if self.field(a).overlaps(self.field(b)) {
                    return Err(LayoutError::Overlap { a, b });
                }
            }
        }

        if !self.kind.fits(ObjectKind::MAX.tag()) {
            return Err(LayoutError::KindTooNarrow {
                max: self.kind.max_value(),
                needed: ObjectKind::MAX.tag(),
            });
        }

        if self.elem_size_shift.width > MAX_SHIFT_WIDTH {
            return Err(LayoutError::ShiftTooWide {
                width: self.elem_size_shift.width,
            });
        }

        Ok(())
    }
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

const_assert!(HeaderLayout::STANDARD.is_valid());
const_assert!(HeaderLayout::COMPACT.is_valid());
const_assert!(HeaderLayout::STANDARD.reserved_mask() == 0);
const_assert!(HeaderLayout::COMPACT.reserved_mask() == 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_masks() {
        let layout = HeaderLayout::STANDARD;
        assert_eq!(layout.kind.mask(), 0x0000_00FF);
        assert_eq!(layout.elem_size_shift.mask(), 0x0000_0700);
        assert_eq!(layout.length.mask(), 0xFFFF_F800);
        assert_eq!(layout.elem_size_shift.max_value(), 7);
        assert_eq!(layout.length.max_value(), (1 << 21) - 1);
    }

    #[test]
    fn test_compact_masks() {
        let layout = HeaderLayout::COMPACT;
        assert_eq!(layout.kind.mask(), 0xC000_0000);
        assert_eq!(layout.elem_size_shift.mask(), 0x3000_0000);
        assert_eq!(layout.length.mask(), 0x0FFF_FFFF);
    }

    #[test]
    fn test_insert_extract() {
        let field = BitField::new(8, 3);
        assert_eq!(field.insert(5), 5 << 8);
        assert_eq!(field.extract(0xFFFF_FFFF), 7);
        assert_eq!(field.extract(field.insert(6) | 0xFF), 6);
        assert!(field.fits(7));
        assert!(!field.fits(8));
    }

    #[test]
    fn test_full_width_field() {
        let field = BitField::new(0, 32);
        assert_eq!(field.max_value(), u32::MAX);
        assert_eq!(field.mask(), u32::MAX);
        assert_eq!(field.extract(0xDEAD_BEEF), 0xDEAD_BEEF);
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let layout = HeaderLayout {
            kind: BitField::new(0, 8),
            elem_size_shift: BitField::new(7, 3),
            length: BitField::new(11, 21),
        };
        assert_eq!(
            layout.validate(),
            Err(LayoutError::Overlap {
                a: HeaderField::Kind,
                b: HeaderField::ElemSizeShift,
            })
        );
        assert!(!layout.is_valid());
    }

    #[test]
    fn test_validate_rejects_out_of_bounds() {
        let layout = HeaderLayout {
            length: BitField::new(11, 22),
            ..HeaderLayout::STANDARD
        };
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::OutOfBounds {
                field: HeaderField::Length,
                end: 33,
                ..
            })
        ));

        let empty = HeaderLayout {
            kind: BitField::new(0, 0),
            ..HeaderLayout::STANDARD
        };
        assert!(matches!(
            empty.validate(),
            Err(LayoutError::OutOfBounds {
                field: HeaderField::Kind,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_narrow_kind() {
        let layout = HeaderLayout {
            kind: BitField::new(0, 1),
            elem_size_shift: BitField::new(1, 3),
            length: BitField::new(4, 28),
        };
        assert_eq!(
            layout.validate(),
            Err(LayoutError::KindTooNarrow { max: 1, needed: 3 })
        );
    }

    #[test]
    fn test_validate_rejects_wide_shift() {
        let layout = HeaderLayout {
            kind: BitField::new(0, 8),
            elem_size_shift: BitField::new(8, 4),
            length: BitField::new(12, 20),
        };
        assert_eq!(layout.validate(), Err(LayoutError::ShiftTooWide { width: 4 }));
    }

    #[test]
    fn test_partial_layout_keeps_reserved_bits() {
        let layout = HeaderLayout {
            kind: BitField::new(0, 4),
            elem_size_shift: BitField::new(8, 3),
            length: BitField::new(16, 16),
        };
        assert!(layout.validate().is_ok());
        assert_eq!(layout.reserved_mask(), 0x0000_F8F0);
    }

    #[test]
    fn test_presets() {
        assert_eq!(HeaderLayout::from_preset("standard"), Some(HeaderLayout::STANDARD));
        assert_eq!(HeaderLayout::from_preset(" Compact "), Some(HeaderLayout::COMPACT));
        assert_eq!(HeaderLayout::from_preset("wide"), None);
        assert_eq!(HeaderLayout::default(), HeaderLayout::STANDARD);
        assert_eq!(HeaderLayout::COMPACT.name(), "compact");
        let custom = HeaderLayout {
            length: BitField::new(11, 20),
            ..HeaderLayout::STANDARD
        };
        assert_eq!(custom.name(), "custom");
    }
}
