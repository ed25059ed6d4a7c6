//! Object kinds recognised by the collector.

use crate::error::{HeaderError, Result};
use serde::{Deserialize, Serialize};

/// Kind tag stored in the header's kind field.
///
/// The set is closed: any other tag is rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ObjectKind {
    /// Fixed-layout block with pointer fields
    Regular = 0,
    /// Array of references the GC must trace
    RefArray = 1,
    /// Pointer-free array of fixed-size elements
    ValArray = 2,
    /// Block owned by foreign code, opaque to the GC
    Extern = 3,
}

impl ObjectKind {
    pub const MAX: Self = Self::Extern;
    pub const COUNT: usize = Self::MAX as usize + 1;
    pub const ALL: [Self; Self::COUNT] =
        [Self::Regular, Self::RefArray, Self::ValArray, Self::Extern];

    /// Raw tag value
    #[inline(always)]
    pub const fn tag(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(Self::Regular),
            1 => Some(Self::RefArray),
            2 => Some(Self::ValArray),
            3 => Some(Self::Extern),
            _ => None,
        }
    }

    /// Whether the collector must scan the payload for references
    #[inline]
    pub const fn is_traced(self) -> bool {
        matches!(self, Self::Regular | Self::RefArray)
    }
}

impl TryFrom<u32> for ObjectKind {
    type Error = HeaderError;

    fn try_from(tag: u32) -> Result<Self> {
        Self::from_tag(tag).ok_or(HeaderError::InvalidKind { kind: tag as i64 })
    }
}

impl TryFrom<i32> for ObjectKind {
    type Error = HeaderError;

    fn try_from(tag: i32) -> Result<Self> {
        u32::try_from(tag)
            .ok()
            .and_then(Self::from_tag)
            .ok_or(HeaderError::InvalidKind { kind: tag as i64 })
    }
}

impl From<ObjectKind> for u32 {
    fn from(kind: ObjectKind) -> u32 {
        kind.tag()
    }
}
