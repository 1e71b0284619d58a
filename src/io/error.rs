use std::io;

use thiserror::Error;

use crate::spectrum::calibration::CalibrationError;

/// The broad classes of decode failure.
///
/// Byte offsets, lengths, and field names carried by [`AvaReadError`] are
/// diagnostic payload only; callers and tests should branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The buffer ended before a declared or implied field could be read.
    TruncatedData,
    /// A field decoded successfully but its value is semantically invalid.
    MalformedHeader,
    /// The file is an AvaSoft file, but of a version this crate does not
    /// implement.
    UnsupportedVariant,
    /// The magic bytes do not identify an AvaSoft file at all.
    UnrecognizedFormat,
    /// An IO error occurred while loading the file from disk.
    Io,
}

/// Errors produced while decoding an AvaSoft file.
///
/// Every failure aborts the whole decode; no partial container is ever
/// returned. Decoding is deterministic over a fixed buffer, so nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum AvaReadError {
    #[error(
        "data ended at offset {offset} while reading {field}: needed {needed} bytes, {available} available"
    )]
    TruncatedData {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("malformed {field}: {reason}")]
    MalformedHeader {
        field: &'static str,
        reason: String,
    },

    #[error("invalid calibration for channel {channel}")]
    Calibration {
        channel: usize,
        #[source]
        source: CalibrationError,
    },

    #[error("file version {version} is an AvaSoft format this crate does not support")]
    UnsupportedVariant { version: String },

    #[error("magic bytes {magic:?} do not identify an AvaSoft file")]
    UnrecognizedFormat { magic: [u8; 3] },

    #[error("an IO error occurred while reading: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

impl AvaReadError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            field,
            reason: reason.into(),
        }
    }

    /// The class of failure, independent of the diagnostic payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TruncatedData { .. } => ErrorKind::TruncatedData,
            Self::MalformedHeader { .. } | Self::Calibration { .. } => ErrorKind::MalformedHeader,
            Self::UnsupportedVariant { .. } => ErrorKind::UnsupportedVariant,
            Self::UnrecognizedFormat { .. } => ErrorKind::UnrecognizedFormat,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<AvaReadError> for io::Error {
    fn from(value: AvaReadError) -> Self {
        match value {
            AvaReadError::Io(e) => e,
            AvaReadError::TruncatedData { .. } => {
                Self::new(io::ErrorKind::UnexpectedEof, value)
            }
            _ => Self::new(io::ErrorKind::InvalidData, value),
        }
    }
}
