//! A library to read the binary spectrum files written by Avantes' AvaSoft 8
//! acquisition software, and a data model for the spectra they contain.
//!
//! Two file families are supported: multichannel files (`AVS` tag, one
//! spectrum per connected spectrometer channel) decoded by
//! [`AvsReader`] into a [`MultichannelFile`], and Store-to-RAM files
//! (`STR` tag, a kinetic series of frames from one channel) decoded by
//! [`StrReader`] into a [`MultiframeFile`]. [`read_path`] and [`read_bytes`]
//! dispatch on the in-file tag when the family is not known up front.

pub mod io;
pub mod meta;
pub mod spectrum;

pub use crate::io::{
    infer_from_buffer, infer_from_path, read_bytes, read_path, AvaReadError, AvantesFile,
    AvantesFormat, AvsReader, BinaryCursor, ErrorKind, FormatVariant, StrReader,
};
pub use crate::meta::{AcquisitionSettings, ChannelIdentity};
pub use crate::spectrum::{
    CalibrationError, ChannelRecord, MultichannelFile, MultiframeFile, WavelengthCalibration,
};
