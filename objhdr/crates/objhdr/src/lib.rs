//! # objhdr - Runtime Object-Header Encoding
//!
//! objhdr builds and stamps the packed header word a managed runtime keeps in
//! front of every array object. The collector, the bounds checker and the type
//! system all read this word, so an unrepresentable length or an unknown kind
//! must be caught before memory is allocated, never truncated.
//!
//! ## Quick Start
//!
//! ```rust
//! use objhdr::{ArrayHeaderFactory, HeaderConfig, ObjectKind};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = ArrayHeaderFactory::new(&HeaderConfig::default())?;
//!
//!     // kind = ValArray, 8-byte elements, 5 elements
//!     let meta = factory.make_array_header(2, 3, 5)?;
//!     assert_eq!(meta, 2 | (3 << 8) | (5 << 11));
//!
//!     let header = factory.codec().decode(meta);
//!     assert_eq!(header.object_kind()?, ObjectKind::ValArray);
//!     assert_eq!(header.payload_bytes(), Some(40));
//!     Ok(())
//! }
//! ```
//!
//! ## Memory Layout
//!
//! ```text
//! ┌──────────────┬──────────────┬───────────────────────────┐
//! │  rc (i32)    │  meta (u32)  │  payload ...              │
//! └──────────────┴──────────────┴───────────────────────────┘
//!                               ^ object reference
//! ```
//!
//! `set_array_header` writes `meta` only. The write is an unsynchronized
//! store; a collector reading the same header concurrently must be excluded
//! by the caller.
//!
//! ## Modules
//!
//! - [`codec`]: Pack/unpack of the header word
//! - [`config`]: Layout selection and write verification
//! - [`error`]: Error types
//! - [`factory`]: `make_array_header` / `set_array_header`
//! - [`kind`]: The closed set of object kinds
//! - [`layout`]: Bit-field constants of the header word
//! - [`logging`]: Structured header event log
//! - [`object`]: Object prefix and the raw header write

pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod kind;
pub mod layout;
pub mod logging;
pub mod object;

pub use codec::{ArrayHeader, HeaderCodec};
pub use config::{ConfigError, HeaderConfig};
pub use error::{HeaderError, HeaderField, Result};
pub use factory::ArrayHeaderFactory;
pub use kind::ObjectKind;
pub use layout::{BitField, HeaderLayout, LayoutError};
pub use object::{ObjectPrefix, ObjectRef, HEADER_SIZE, META_OFFSET, OBJECT_ALIGNMENT};

/// objhdr version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static_assertions::assert_impl_all!(HeaderCodec: Send, Sync, Copy);
static_assertions::assert_impl_all!(ArrayHeaderFactory: Send, Sync);

/// Factory for the standard layout, configured from the environment
///
/// # Examples
///
/// ```rust
/// let factory = objhdr::init()?;
/// let meta = factory.make_array_header(1, 3, 16)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn init() -> std::result::Result<ArrayHeaderFactory, ConfigError> {
    init_with_config(&HeaderConfig::from_env()?)
}

/// Factory for a custom configuration
pub fn init_with_config(
    config: &HeaderConfig,
) -> std::result::Result<ArrayHeaderFactory, ConfigError> {
    config.validate()?;
    ArrayHeaderFactory::new(config)
}
