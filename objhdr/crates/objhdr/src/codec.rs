//! Header Codec - packing and unpacking of the header word
//!
//! Encoding validates every field against the active [`HeaderLayout`];
//! decoding is total and accepts any `u32`.

use crate::error::{HeaderError, HeaderField, Result};
use crate::kind::ObjectKind;
use crate::layout::{HeaderLayout, LayoutError};
use serde::Serialize;

/// Decoded view of a header word
///
/// `kind` is the raw tag; use [`ArrayHeader::object_kind`] to interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArrayHeader {
    pub kind: u32,
    pub elem_size_shift: u32,
    pub length: u32,
}

impl ArrayHeader {
    pub const fn new(kind: ObjectKind, elem_size_shift: u32, length: u32) -> Self {
        Self {
            kind: kind.tag(),
            elem_size_shift,
            length,
        }
    }

    /// Checked interpretation of the raw kind tag
    pub fn object_kind(&self) -> Result<ObjectKind> {
        ObjectKind::try_from(self.kind)
    }

    /// Element size in bytes, `None` for a shift of 64 or more
    #[inline]
    pub const fn elem_size(&self) -> Option<u64> {
        1u64.checked_shl(self.elem_size_shift)
    }

    /// Payload size in bytes, `None` if it does not fit a `u64`
    pub fn payload_bytes(&self) -> Option<u64> {
        self.elem_size()
            .and_then(|size| u64::from(self.length).checked_mul(size))
    }
}

/// Encoder/decoder bound to one layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCodec {
    layout: HeaderLayout,
}

impl HeaderCodec {
    pub const STANDARD: Self = Self {
        layout: HeaderLayout::STANDARD,
    };

    pub const COMPACT: Self = Self {
        layout: HeaderLayout::COMPACT,
    };

    /// Create a codec for `layout`, rejecting layouts the codec cannot use
    pub fn new(layout: HeaderLayout) -> std::result::Result<Self, LayoutError> {
        layout.validate()?;
        Ok(Self { layout })
    }

    #[inline(always)]
    pub const fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// Pack a header word
    ///
    /// # Errors
    /// - `InvalidKind` if `kind` is not an [`ObjectKind`] tag
    /// - `FieldOverflow` if `elem_size_shift` or `length` exceeds its field
    #[inline]
    pub fn encode(&self, kind: u32, elem_size_shift: u32, length: u32) -> Result<u32> {
        let kind = ObjectKind::try_from(kind)?;
        self.encode_kind(kind, elem_size_shift, length)
    }

    /// Pack a header word for an already validated kind
    #[inline]
    pub fn encode_kind(&self, kind: ObjectKind, elem_size_shift: u32, length: u32) -> Result<u32> {
        let layout = &self.layout;
        self.check(HeaderField::ElemSizeShift, elem_size_shift)?;
        self.check(HeaderField::Length, length)?;

        Ok(layout.kind.insert(kind.tag())
            | layout.elem_size_shift.insert(elem_size_shift)
            | layout.length.insert(length))
    }

    pub fn encode_header(&self, header: &ArrayHeader) -> Result<u32> {
        self.encode(header.kind, header.elem_size_shift, header.length)
    }

    /// Unpack a header word. Never fails; unknown kinds surface later
    /// through [`ArrayHeader::object_kind`].
    #[inline]
    pub const fn decode(&self, packed: u32) -> ArrayHeader {
        ArrayHeader {
            kind: self.layout.kind.extract(packed),
            elem_size_shift: self.layout.elem_size_shift.extract(packed),
            length: self.layout.length.extract(packed),
        }
    }

    #[inline(always)]
    fn check(&self, field: HeaderField, value: u32) -> Result<()> {
        let bits = self.layout.field(field);
        if bits.fits(value) {
            Ok(())
        } else {
            Err(HeaderError::FieldOverflow {
                field,
                value: i64::from(value),
                max: bits.max_value(),
            })
        }
    }
}

impl Default for HeaderCodec {
    fn default() -> Self {
        Self::STANDARD
    }
}
