//! objhdr Runtime Library
//!
//! C ABI used by compiler-generated allocation sequences:
//! - Array header construction
//! - In-place header stamping

mod header;

pub use header::*;
