//! Error Module - objhdr Error Types
//!
//! Defines the error types returned by header construction and mutation.
//!
//! # Error Categories
//!
//! ## Construction Errors
//! - `InvalidKind` - Kind tag outside the closed [`ObjectKind`](crate::ObjectKind) set
//! - `FieldOverflow` - Shift or length does not fit its bit field
//!
//! ## Mutation Errors
//! - `InvalidReference` - Object address rejected before the header write

use std::fmt;
use thiserror::Error;

/// Header field identifier, used to report which field overflowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Kind,
    ElemSizeShift,
    Length,
}

impl HeaderField {
    /// Field name as it appears in layout descriptions
    pub const fn name(self) -> &'static str {
        match self {
            HeaderField::Kind => "kind",
            HeaderField::ElemSizeShift => "elem_size_shift",
            HeaderField::Length => "length",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type for all header operations
///
/// # Examples
///
/// ```rust
/// use objhdr::{HeaderError, HeaderField};
///
/// fn handle_error(err: HeaderError) {
///     match err {
///         HeaderError::FieldOverflow { field: HeaderField::Length, value, max } => {
///             eprintln!("array too long: {} > {}", value, max);
///         }
///         _ => {
///             eprintln!("Other error: {}", err);
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Unrecognized object-kind tag
    ///
    /// **When returned:** Construction with a tag outside the kind enumeration,
    /// or a verified write whose packed word carries such a tag
    ///
    /// **Recovery strategy:** Reject the construction request; never coerce
    /// the tag into a valid one
    #[error("Invalid object kind tag: {kind}")]
    InvalidKind { kind: i64 },

    /// Field value does not fit its reserved bits
    ///
    /// **When returned:** `elem_size_shift` or `length` (or a negative value
    /// for either) cannot be represented in the header layout
    ///
    /// **Recovery strategy:** None for the allocation in progress. The value
    /// would otherwise be truncated and misread by the collector.
    #[error("Header field overflow: {field} = {value} exceeds maximum {max}")]
    FieldOverflow {
        field: HeaderField,
        value: i64,
        max: u32,
    },

    /// Object reference rejected before the header write
    ///
    /// **When returned:** Null or misaligned object address
    ///
    /// **Recovery strategy:** Fix caller; nothing has been written
    #[error("Invalid object reference {address:#x}: {reason}")]
    InvalidReference { address: usize, reason: &'static str },
}

impl HeaderError {
    /// Check if the caller can reject the request and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HeaderError::InvalidKind { .. })
    }

    /// Check if this error indicates a bug in the calling code
    pub fn is_bug(&self) -> bool {
        matches!(self, HeaderError::InvalidReference { .. })
    }
}

/// Result type alias for header operations
pub type Result<T> = std::result::Result<T, HeaderError>;
