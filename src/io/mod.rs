//! Reading the AvaSoft binary file formats.
//!
//! Each format family gets its own module with a reader type that decodes a
//! complete in-memory buffer into one of the containers in
//! [`crate::spectrum`]. Everything here is little-endian and goes through
//! [`BinaryCursor`] so the byte-level decisions live in one place.

pub mod avs;
mod cursor;
pub mod descriptor;
pub mod dstr;
mod error;
mod infer_format;
#[cfg(test)]
pub(crate) mod test_util;

pub use crate::io::avs::AvsReader;
pub use crate::io::cursor::BinaryCursor;
pub use crate::io::descriptor::{ArrayFlags, ChannelDescriptor};
pub use crate::io::dstr::StrReader;
pub use crate::io::error::{AvaReadError, ErrorKind};
pub use crate::io::infer_format::{
    infer_from_buffer, infer_from_path, read_bytes, read_path, AvantesFile, AvantesFormat,
    FormatVariant,
};
