//! C ABI Tests
//!
//! Drives the exported functions the way generated code does, with object
//! memory obtained from the C allocator.

use objhdr::{HEADER_SIZE, META_OFFSET};
use objhdr_runtime::*;
use std::ffi::c_void;

/// Zeroed C allocation holding a prefix and `payload` bytes
struct CObject {
    base: *mut u8,
    size: usize,
}

impl CObject {
    fn calloc(payload: usize) -> Self {
        let size = HEADER_SIZE + payload;
        let base = unsafe { libc::calloc(1, size) }.cast::<u8>();
        assert!(!base.is_null(), "calloc failed");
        Self { base, size }
    }

    fn payload(&self) -> *mut c_void {
        unsafe { self.base.add(HEADER_SIZE) }.cast()
    }

    fn bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.base, self.size) }
    }
}

impl Drop for CObject {
    fn drop(&mut self) {
        unsafe { libc::free(self.base.cast()) };
    }
}

#[test]
fn test_make_array_header_example() {
    assert!(objhdr_init());
    let meta = objhdr_make_array_header(2, 3, 5);
    assert_eq!(meta, 2 | (3 << 8) | (5 << 11));
}

#[test]
fn test_try_make_reports_status() {
    let mut out = 0i32;

    let status = unsafe { objhdr_try_make_array_header(1, 3, 10, &mut out) };
    assert_eq!(status, HeaderStatus::Ok as i32);
    assert_eq!(out, objhdr_make_array_header(1, 3, 10));

    let mut untouched = -7i32;
    let status = unsafe { objhdr_try_make_array_header(9, 0, 1, &mut untouched) };
    assert_eq!(status, HeaderStatus::InvalidKind as i32);
    assert_eq!(untouched, -7);

    let status = unsafe { objhdr_try_make_array_header(1, 9, 1, &mut untouched) };
    assert_eq!(status, HeaderStatus::FieldOverflow as i32);

    let status = unsafe { objhdr_try_make_array_header(1, 0, -1, &mut untouched) };
    assert_eq!(status, HeaderStatus::FieldOverflow as i32);

    let status = unsafe { objhdr_try_make_array_header(1, 0, 1, std::ptr::null_mut()) };
    assert_eq!(status, HeaderStatus::InvalidReference as i32);
}

#[test]
fn test_allocate_then_stamp() {
    let meta = objhdr_make_array_header(2, 3, 4);
    let payload = objhdr_array_payload_size(meta as u32);
    assert_eq!(payload, 32);

    let object = CObject::calloc(payload as usize);
    unsafe { objhdr_set_array_header(object.payload(), meta as u32) };

    assert_eq!(unsafe { objhdr_get_array_header(object.payload()) }, meta as u32);

    let bytes = object.bytes();
    assert_eq!(&bytes[META_OFFSET..HEADER_SIZE], &(meta as u32).to_ne_bytes());
    assert!(bytes[..META_OFFSET].iter().all(|&b| b == 0));
    assert!(bytes[HEADER_SIZE..].iter().all(|&b| b == 0));
}

#[test]
fn test_restamp_after_resize() {
    let object = CObject::calloc(64);

    let meta = objhdr_make_array_header(1, 3, 8) as u32;
    let status = unsafe { objhdr_try_set_array_header(object.payload(), meta) };
    assert_eq!(status, HeaderStatus::Ok as i32);

    let shrunk = objhdr_make_array_header(1, 3, 2) as u32;
    let status = unsafe { objhdr_try_set_array_header(object.payload(), shrunk) };
    assert_eq!(status, HeaderStatus::Ok as i32);
    assert_eq!(unsafe { objhdr_get_array_header(object.payload()) }, shrunk);
}

#[test]
fn test_null_object_is_ignored() {
    let status = unsafe { objhdr_try_set_array_header(std::ptr::null_mut(), 1) };
    assert_eq!(status, HeaderStatus::InvalidReference as i32);

    // Must not crash
    unsafe { objhdr_set_array_header(std::ptr::null_mut(), 1) };
    assert_eq!(unsafe { objhdr_get_array_header(std::ptr::null()) }, 0);
}

#[test]
fn test_misaligned_object_is_rejected() {
    let object = CObject::calloc(16);
    let misaligned = unsafe { object.payload().cast::<u8>().add(1) }.cast::<c_void>();

    let status = unsafe { objhdr_try_set_array_header(misaligned, 0x2B02) };
    assert_eq!(status, HeaderStatus::InvalidReference as i32);
    assert!(object.bytes().iter().all(|&b| b == 0));
}
