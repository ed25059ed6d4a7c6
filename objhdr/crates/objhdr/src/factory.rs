//! Array Header Factory - the two entry points used by generated code
//!
//! Allocation sequence emitted by the compiler:
//! 1. `make_array_header(kind, shift, length)` - all validation happens here,
//!    before any memory is requested
//! 2. allocator reserves `HEADER_SIZE + (length << shift)` bytes
//! 3. `set_array_header(object, meta)` - stamps the word, no re-validation
//!    unless `verify_writes` is configured

use crate::codec::{ArrayHeader, HeaderCodec};
use crate::config::{ConfigError, HeaderConfig};
use crate::error::{HeaderError, HeaderField, Result};
use crate::kind::ObjectKind;
use crate::logging::{self, HeaderEvent};
use crate::object::ObjectRef;

/// Builds and stamps array headers for one layout
#[derive(Debug, Clone)]
pub struct ArrayHeaderFactory {
    codec: HeaderCodec,
    verify_writes: bool,
    log_events: bool,
}

impl ArrayHeaderFactory {
    pub fn new(config: &HeaderConfig) -> std::result::Result<Self, ConfigError> {
        let codec = HeaderCodec::new(config.layout)?;
        Ok(Self {
            codec,
            verify_writes: config.verify_writes,
            log_events: config.log_events,
        })
    }

    /// Factory over an existing codec with checks and event logging off
    pub const fn with_codec(codec: HeaderCodec) -> Self {
        Self {
            codec,
            verify_writes: false,
            log_events: false,
        }
    }

    #[inline(always)]
    pub const fn codec(&self) -> &HeaderCodec {
        &self.codec
    }

    #[inline(always)]
    pub const fn verifies_writes(&self) -> bool {
        self.verify_writes
    }

    /// Construct the header for a new array
    ///
    /// Pure and deterministic; call it before allocating, since the result
    /// fixes the payload size.
    ///
    /// # Errors
    /// - `InvalidKind` for a negative or unknown kind
    /// - `FieldOverflow` for a negative value or one wider than its field
    pub fn make_array_header(&self, kind: i32, elem_size_shift: i32, length: i32) -> Result<u32> {
        let result = self
            .convert(kind, elem_size_shift, length)
            .and_then(|(tag, shift, len)| self.codec.encode_kind(tag, shift, len));

        match &result {
            Ok(packed) => {
                log::trace!(
                    "array header kind={} shift={} length={} -> {:#010x}",
                    kind,
                    elem_size_shift,
                    length,
                    packed
                );
                if self.log_events {
                    logging::log_event(HeaderEvent::Encoded {
                        kind,
                        elem_size_shift,
                        length,
                        packed: *packed,
                    });
                }
            },
            Err(e) => {
                log::warn!(
                    "rejected array header kind={} shift={} length={}: {}",
                    kind,
                    elem_size_shift,
                    length,
                    e
                );
                if self.log_events {
                    logging::log_event(HeaderEvent::Rejected {
                        kind,
                        elem_size_shift,
                        length,
                        reason: e.to_string(),
                    });
                }
            },
        }

        result
    }

    /// Overwrite the header word of an existing object
    ///
    /// `meta` is trusted unless the factory verifies writes, in which case a
    /// word whose kind is unknown is refused and nothing is written.
    /// The write is a plain store; see [`ObjectRef::write_meta`].
    #[inline]
    pub fn set_array_header(&self, object: ObjectRef, meta: u32) -> Result<()> {
        if self.verify_writes {
            self.verify(meta)?;
        }

        object.write_meta(meta);
        log::trace!("stamped header {:#010x} at {:#x}", meta, object.address());
        if self.log_events {
            logging::log_event(HeaderEvent::Stamped {
                address: object.address(),
                packed: meta,
            });
        }
        Ok(())
    }

    /// Decode the header word currently stored in `object`
    #[inline]
    pub fn array_header(&self, object: ObjectRef) -> ArrayHeader {
        self.codec.decode(object.read_meta())
    }

    fn verify(&self, meta: u32) -> Result<()> {
        let header = self.codec.decode(meta);
        if let Err(e) = header.object_kind() {
            log::warn!("refusing to stamp header {:#010x}: {}", meta, e);
            if self.log_events {
                logging::log_event(HeaderEvent::Rejected {
                    kind: header.kind as i32,
                    elem_size_shift: header.elem_size_shift as i32,
                    length: header.length as i32,
                    reason: e.to_string(),
                });
            }
            return Err(e);
        }
        Ok(())
    }

    /// Map the signed C-level arguments onto codec inputs
    fn convert(
        &self,
        kind: i32,
        elem_size_shift: i32,
        length: i32,
    ) -> Result<(ObjectKind, u32, u32)> {
        let kind = ObjectKind::try_from(kind)?;
        let shift = self.non_negative(HeaderField::ElemSizeShift, elem_size_shift)?;
        let length = self.non_negative(HeaderField::Length, length)?;
        Ok((kind, shift, length))
    }

    fn non_negative(&self, field: HeaderField, value: i32) -> Result<u32> {
        u32::try_from(value).map_err(|_| HeaderError::FieldOverflow {
            field,
            value: i64::from(value),
            max: self.codec.layout().field(field).max_value(),
        })
    }
}

impl Default for ArrayHeaderFactory {
    fn default() -> Self {
        Self::with_codec(HeaderCodec::STANDARD)
    }
}
