//! Flat JSON codec: objects whose values are strings, numbers, booleans or null.
//!
//! Encoding goes through [`ObjectWriter`]; decoding produces a [`FlatMap`] of raw
//! strings and leaves all type interpretation to the caller.

mod decode;
mod encode;

pub use decode::{decode, FlatMap, NULL_SENTINEL};
pub use encode::{encode_array, escape, ObjectWriter, ToFlatJson};

/// `yyyy-MM-dd`
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `yyyy-MM-ddTHH:mm:ss`
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
