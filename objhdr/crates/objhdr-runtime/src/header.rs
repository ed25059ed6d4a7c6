//! Header Runtime - C FFI wrapper for objhdr
//!
//! Provides C-compatible functions for array header construction and
//! stamping. The factory is configured once from the environment
//! (`OBJHDR_*` variables) and read-only afterwards.
//!
//! An invalid environment configuration is fatal: the first entry point
//! that needs the factory logs the error and aborts. Only `objhdr_init`
//! reports it as `false`, and keeps doing so on every call.

use objhdr::logging::{self, HeaderEvent, HeaderLoggerConfig};
use objhdr::{ArrayHeaderFactory, ConfigError, HeaderConfig, HeaderError, ObjectRef};
use std::ffi::c_void;
use std::sync::OnceLock;

static FACTORY: OnceLock<ArrayHeaderFactory> = OnceLock::new();

/// Status codes returned by the `objhdr_try_*` entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum HeaderStatus {
    Ok = 0,
    InvalidKind = 1,
    FieldOverflow = 2,
    InvalidReference = 3,
}

impl From<&HeaderError> for HeaderStatus {
    fn from(err: &HeaderError) -> Self {
        match err {
            HeaderError::InvalidKind { .. } => HeaderStatus::InvalidKind,
            HeaderError::FieldOverflow { .. } => HeaderStatus::FieldOverflow,
            HeaderError::InvalidReference { .. } => HeaderStatus::InvalidReference,
        }
    }
}

fn build_factory() -> Result<ArrayHeaderFactory, ConfigError> {
    let config = HeaderConfig::from_env()?;

    if config.log_events {
        logging::configure_logger(HeaderLoggerConfig {
            level: config.log_level,
            console: true,
            ..Default::default()
        });
    }

    let factory = ArrayHeaderFactory::new(&config)?;
    log::info!(
        "objhdr initialized ({} layout, verify_writes={})",
        config.layout.name(),
        config.verify_writes
    );
    if config.log_events {
        logging::log_event(HeaderEvent::Initialized {
            layout: config.layout.name().to_string(),
            verify_writes: config.verify_writes,
        });
    }
    Ok(factory)
}

fn factory() -> &'static ArrayHeaderFactory {
    FACTORY.get_or_init(|| match build_factory() {
        Ok(built) => built,
        Err(e) => fatal("invalid objhdr configuration", &e),
    })
}

/// Log `err` and abort; used where the C signature has no error channel
fn fatal(context: &str, err: &dyn std::fmt::Display) -> ! {
    log::error!("fatal: {}: {}", context, err);
    eprintln!("objhdr: {}: {}", context, err);
    std::process::abort();
}

fn object_ref(object: *mut c_void) -> Result<ObjectRef, HeaderError> {
    // SAFETY: the C caller promises `object` is a live runtime object; only
    // null and alignment can be checked here
    let result = unsafe { ObjectRef::from_raw(object.cast::<u8>()) };
    if let Err(e) = &result {
        log::error!("rejected object reference: {}", e);
        logging::log_event(HeaderEvent::BadReference {
            address: object as usize,
            reason: e.to_string(),
        });
    }
    result
}

/// Configure the runtime from the environment
///
/// Returns `false` if the configuration is invalid; nothing is installed
/// then, so every later call re-reads the environment and fails again.
/// Once a factory is installed, later calls return `true`.
#[no_mangle]
pub extern "C" fn objhdr_init() -> bool {
    if FACTORY.get().is_some() {
        return true;
    }

    match build_factory() {
        Ok(built) => {
            let _ = FACTORY.set(built);
            true
        },
        Err(e) => {
            log::error!("failed to initialize objhdr: {}", e);
            false
        },
    }
}

/// Build the header word for a new array
///
/// The C signature has no error channel, so an invalid request is fatal:
/// the error is logged and the process aborts rather than returning a
/// truncated header.
#[no_mangle]
pub extern "C" fn objhdr_make_array_header(kind: i32, elem_size_shift: i32, length: i32) -> i32 {
    match factory().make_array_header(kind, elem_size_shift, length) {
        Ok(meta) => meta as i32,
        Err(e) => fatal("cannot build array header", &e),
    }
}

/// Build the header word for a new array, reporting failure as a status
///
/// # Safety
/// `out` must be null or valid for a 4-byte write.
#[no_mangle]
pub unsafe extern "C" fn objhdr_try_make_array_header(
    kind: i32,
    elem_size_shift: i32,
    length: i32,
    out: *mut i32,
) -> i32 {
    if out.is_null() {
        return HeaderStatus::InvalidReference as i32;
    }

    match factory().make_array_header(kind, elem_size_shift, length) {
        Ok(meta) => {
            // SAFETY: caller guarantees `out` is writable
            unsafe { out.write(meta as i32) };
            HeaderStatus::Ok as i32
        },
        Err(e) => HeaderStatus::from(&e) as i32,
    }
}

/// Stamp `meta` into the header of `object`
///
/// Null or misaligned objects are logged and ignored. A word refused by
/// write verification is fatal, like an invalid request to
/// [`objhdr_make_array_header`]: the object would otherwise keep a stale
/// header.
///
/// # Safety
/// `object` must be null or the payload address of a live object whose
/// 8-byte prefix is writable. The write is not synchronized with other
/// readers or writers of the same header.
#[no_mangle]
pub unsafe extern "C" fn objhdr_set_array_header(object: *mut c_void, meta: u32) {
    let obj = match object_ref(object) {
        Ok(obj) => obj,
        Err(_) => return,
    };

    if let Err(e) = factory().set_array_header(obj, meta) {
        fatal("refusing to stamp array header", &e);
    }
}

/// Stamp `meta` into the header of `object`, reporting failure as a status
///
/// # Safety
/// Same contract as [`objhdr_set_array_header`].
#[no_mangle]
pub unsafe extern "C" fn objhdr_try_set_array_header(object: *mut c_void, meta: u32) -> i32 {
    let result = object_ref(object).and_then(|obj| factory().set_array_header(obj, meta));
    match result {
        Ok(()) => HeaderStatus::Ok as i32,
        Err(e) => HeaderStatus::from(&e) as i32,
    }
}

/// Read the header word of `object`; `0` for null or misaligned objects
///
/// # Safety
/// `object` must be null or the payload address of a live object.
#[no_mangle]
pub unsafe extern "C" fn objhdr_get_array_header(object: *const c_void) -> u32 {
    match object_ref(object.cast_mut()) {
        Ok(obj) => obj.read_meta(),
        Err(_) => 0,
    }
}

/// Payload size in bytes described by a header word
///
/// Saturates at `u64::MAX`.
#[no_mangle]
pub extern "C" fn objhdr_array_payload_size(meta: u32) -> u64 {
    factory()
        .codec()
        .decode(meta)
        .payload_bytes()
        .unwrap_or(u64::MAX)
}
