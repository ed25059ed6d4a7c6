//! Object Prefix - where the header word lives in memory
//!
//! Object references handed out by the runtime point at the payload. The
//! 8-byte prefix sits directly in front of it:
//! ┌─────────────────────────────────────────┐
//! │      Reference count (4 bytes)          │  <- payload - 8
//! ├─────────────────────────────────────────┤
//! │      Header word / meta (4 bytes)       │  <- payload - 4
//! ├─────────────────────────────────────────┤
//! │      Payload ...                        │  <- object reference
//! └─────────────────────────────────────────┘
//!
//! The prefix memory is owned by the collector. This module only reads and
//! writes the meta word; it never allocates or frees.

use crate::error::{HeaderError, Result};
use std::mem::{align_of, offset_of, size_of};
use std::ptr::NonNull;

/// In-memory object prefix
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectPrefix {
    /// Reference count, maintained by the runtime
    pub rc: i32,
    /// Packed header word
    pub meta: u32,
}

/// Size of the object prefix in bytes
pub const HEADER_SIZE: usize = size_of::<ObjectPrefix>();

/// Offset of the meta word inside the prefix
pub const META_OFFSET: usize = offset_of!(ObjectPrefix, meta);

/// Required alignment of object references
pub const OBJECT_ALIGNMENT: usize = align_of::<ObjectPrefix>();

static_assertions::const_assert_eq!(HEADER_SIZE, 8);
static_assertions::const_assert_eq!(META_OFFSET, 4);

/// Handle to a live object, identified by its payload address
///
/// Only [`ObjectRef::from_raw`] can create one, and only
/// [`ObjectRef::write_meta`] writes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRef {
    payload: NonNull<u8>,
}

impl ObjectRef {
    /// Wrap a payload pointer handed over by the runtime
    ///
    /// Null and misaligned pointers are rejected with `InvalidReference`.
    ///
    /// # Safety
    /// For as long as the returned handle is used, `payload` must point just
    /// past a live, writable [`ObjectPrefix`], i.e. `payload - HEADER_SIZE`
    /// must be the start of memory the collector allocated for this object.
    /// None of this can be checked here; violating it is undefined behavior.
    pub unsafe fn from_raw(payload: *mut u8) -> Result<Self> {
        let address = payload as usize;
        let payload = NonNull::new(payload).ok_or(HeaderError::InvalidReference {
            address,
            reason: "null object",
        })?;

        if address % OBJECT_ALIGNMENT != 0 {
            return Err(HeaderError::InvalidReference {
                address,
                reason: "misaligned object",
            });
        }

        if address < HEADER_SIZE {
            return Err(HeaderError::InvalidReference {
                address,
                reason: "no room for object prefix",
            });
        }

        Ok(Self { payload })
    }

    /// Payload address
    #[inline(always)]
    pub fn address(&self) -> usize {
        self.payload.as_ptr() as usize
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *mut u8 {
        self.payload.as_ptr()
    }

    #[inline(always)]
    fn prefix_ptr(&self) -> *mut ObjectPrefix {
        // SAFETY: from_raw's contract guarantees a prefix precedes the payload
        unsafe { self.payload.as_ptr().sub(HEADER_SIZE).cast::<ObjectPrefix>() }
    }

    /// Overwrite the header word
    ///
    /// Plain, unsynchronized store. Callers that race this against a
    /// collector reading the same header must provide their own exclusion.
    #[inline(always)]
    pub fn write_meta(&self, meta: u32) {
        // SAFETY: prefix is live and writable per from_raw's contract; only the
        // meta field is touched
        unsafe { std::ptr::addr_of_mut!((*self.prefix_ptr()).meta).write(meta) }
    }

    /// Read the header word
    #[inline(always)]
    pub fn read_meta(&self) -> u32 {
        // SAFETY: prefix is live per from_raw's contract
        unsafe { std::ptr::addr_of!((*self.prefix_ptr()).meta).read() }
    }
}
